use std::io::Write;

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::debug;

use rspk_core::periph::{Color, Screen};

/// Commands crossing from the engine to the renderer thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScreenCommand {
    DrawText(String),
    Clear(Color),
    PlotPixel(u16, u16, Color),
    SetColor(Color),
    ResetScroll,
}

/// ANSI foreground code for a palette colour. The dim palette half maps
/// to the classic colours, the bright half to their bright variants.
fn ansi_code(color: Color) -> u8 {
    match color {
        Color::Black => 30,
        Color::Blue3 => 34,
        Color::Green3 => 32,
        Color::Cyan3 => 36,
        Color::Red3 => 31,
        Color::Magenta3 => 35,
        Color::Brown3 => 33,
        Color::Gray => 37,
        Color::Gray3 => 90,
        Color::Blue => 94,
        Color::Green => 92,
        Color::Cyan => 96,
        Color::Red => 91,
        Color::Magenta => 95,
        Color::Yellow => 93,
        Color::White => 97,
    }
}

fn console_thread(rx: Receiver<ScreenCommand>) {
    let stdout = std::io::stdout();
    let mut color = Color::White;

    loop {
        let cmd = match rx.recv() {
            Ok(cmd) => cmd,
            _ => break,
        };

        match cmd {
            ScreenCommand::DrawText(text) => {
                let mut out = stdout.lock();
                let _ = write!(out, "\x1b[{}m{}\x1b[0m", ansi_code(color), text);
                let _ = out.flush();
            }
            ScreenCommand::Clear(background) => {
                debug!("screen: clear {}", background.name());
                let mut out = stdout.lock();
                let _ = write!(out, "\x1b[2J\x1b[H");
                let _ = out.flush();
            }
            ScreenCommand::PlotPixel(x, y, pixel) => {
                debug!("screen: pixel ({}, {}) {}", x, y, pixel.name());
            }
            ScreenCommand::SetColor(new_color) => {
                color = new_color;
            }
            ScreenCommand::ResetScroll => {
                let mut out = stdout.lock();
                let _ = write!(out, "\x1b[H");
                let _ = out.flush();
            }
        }
    }
}

///
/// Console-backed display sink. The engine pushes commands down an
/// unbounded channel and never waits; a spawned renderer thread drains
/// them onto stdout at its own pace. Dropping the screen closes the
/// channel and ends the thread.
///
pub struct ConsoleScreen {
    tx: Sender<ScreenCommand>,
}

impl ConsoleScreen {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        std::thread::spawn(move || console_thread(rx));
        ConsoleScreen { tx }
    }

    /// Route commands to an existing channel instead of a renderer
    /// thread.
    pub fn with_sender(tx: Sender<ScreenCommand>) -> Self {
        ConsoleScreen { tx }
    }
}

impl Default for ConsoleScreen {
    fn default() -> Self {
        ConsoleScreen::new()
    }
}

impl Screen for ConsoleScreen {
    fn draw_text(&mut self, text: &str) {
        let _ = self.tx.send(ScreenCommand::DrawText(text.to_string()));
    }

    fn clear(&mut self, color: Color) {
        let _ = self.tx.send(ScreenCommand::Clear(color));
    }

    fn plot_pixel(&mut self, x: u16, y: u16, color: Color) {
        let _ = self.tx.send(ScreenCommand::PlotPixel(x, y, color));
    }

    fn set_color(&mut self, color: Color) {
        let _ = self.tx.send(ScreenCommand::SetColor(color));
    }

    fn reset_scroll(&mut self) {
        let _ = self.tx.send(ScreenCommand::ResetScroll);
    }
}

#[cfg(test)]
mod console_tests {
    use super::*;

    #[test]
    fn commands_cross_the_channel_in_order() {
        let (tx, rx) = unbounded();
        let mut screen = ConsoleScreen::with_sender(tx);

        screen.draw_text("Hi");
        screen.set_color(Color::Yellow);
        screen.clear(Color::Black);
        screen.plot_pixel(3, 4, Color::Red);
        screen.reset_scroll();

        let seen: Vec<ScreenCommand> = rx.try_iter().collect();
        assert_eq!(
            vec![
                ScreenCommand::DrawText("Hi".into()),
                ScreenCommand::SetColor(Color::Yellow),
                ScreenCommand::Clear(Color::Black),
                ScreenCommand::PlotPixel(3, 4, Color::Red),
                ScreenCommand::ResetScroll,
            ],
            seen
        );
    }

    #[test]
    fn sends_never_block_after_the_receiver_is_gone() {
        let (tx, rx) = unbounded();
        let mut screen = ConsoleScreen::with_sender(tx);
        drop(rx);

        // Fire-and-forget: the engine side must not notice
        screen.draw_text("into the void");
        screen.clear(Color::Blue);
    }

    #[test]
    fn bright_and_dim_palette_halves_get_distinct_ansi_codes() {
        assert_eq!(31, ansi_code(Color::Red3));
        assert_eq!(91, ansi_code(Color::Red));
        assert_eq!(97, ansi_code(Color::White));
    }
}
