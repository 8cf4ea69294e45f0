use thiserror::Error;

/// The sixteen display colours, addressed by a 4-bit code in the
/// clear/pixel/text-colour syscalls. The palette order is part of the
/// syscall ABI; do not reorder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Color {
    Black,
    Blue3,
    Green3,
    Cyan3,
    Red3,
    Magenta3,
    Brown3,
    Gray,
    Gray3,
    Blue,
    Green,
    Cyan,
    Red,
    Magenta,
    Yellow,
    White,
}

pub const PALETTE: [Color; 16] = [
    Color::Black,
    Color::Blue3,
    Color::Green3,
    Color::Cyan3,
    Color::Red3,
    Color::Magenta3,
    Color::Brown3,
    Color::Gray,
    Color::Gray3,
    Color::Blue,
    Color::Green,
    Color::Cyan,
    Color::Red,
    Color::Magenta,
    Color::Yellow,
    Color::White,
];

impl Color {
    /// Codes outside the palette map to `None`; the dispatcher treats
    /// that as a no-op.
    pub fn from_code(code: u32) -> Option<Color> {
        PALETTE.get(code as usize).copied()
    }

    pub fn name(self) -> &'static str {
        match self {
            Color::Black => "black",
            Color::Blue3 => "blue3",
            Color::Green3 => "green3",
            Color::Cyan3 => "cyan3",
            Color::Red3 => "red3",
            Color::Magenta3 => "magenta3",
            Color::Brown3 => "brown3",
            Color::Gray => "gray",
            Color::Gray3 => "gray3",
            Color::Blue => "blue",
            Color::Green => "green",
            Color::Cyan => "cyan",
            Color::Red => "red",
            Color::Magenta => "magenta",
            Color::Yellow => "yellow",
            Color::White => "white",
        }
    }
}

/// Display collaborator. Implementations run on their own execution
/// context and must accept commands at arbitrary rates; the engine never
/// waits for completion.
pub trait Screen {
    fn draw_text(&mut self, text: &str);
    fn clear(&mut self, color: Color);
    fn plot_pixel(&mut self, x: u16, y: u16, color: Color);
    fn set_color(&mut self, color: Color);
    fn reset_scroll(&mut self);
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("no such entry: {0}")]
    NotFound(String),
    #[error("not a directory: {0}")]
    NotADirectory(String),
    #[error("not a file: {0}")]
    NotAFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WriteMode {
    Overwrite,
    Append,
}

/// Filesystem collaborator: a hierarchical name-to-entry store with a
/// current directory. No syscall targets it in this ISA revision; it is
/// kept at the interface boundary for the ones that will.
pub trait FileStore {
    fn list(&self) -> Vec<String>;
    fn change_dir(&mut self, dir: &str) -> Result<(), StoreError>;
    fn make_dir(&mut self, name: &str);
    fn create_file(&mut self, name: &str);
    fn remove(&mut self, name: &str) -> Result<(), StoreError>;
    fn write_file(&mut self, name: &str, text: &str, mode: WriteMode) -> Result<(), StoreError>;
}

/// Blocking acknowledgment point for the single-step and breakpoint
/// interrupts. The engine suspends inside the call and resumes when it
/// returns.
pub trait DebugHook {
    fn on_single_step(&mut self, pc: usize);
    fn on_breakpoint(&mut self, pc: usize);
}

/// Hook that acknowledges immediately.
#[derive(Debug, Default)]
pub struct NopHook;

impl DebugHook for NopHook {
    fn on_single_step(&mut self, _pc: usize) {}

    fn on_breakpoint(&mut self, _pc: usize) {}
}

#[cfg(test)]
mod color_tests {
    use super::Color;

    #[test]
    fn palette_codes() {
        assert_eq!(Some(Color::Black), Color::from_code(0x0));
        assert_eq!(Some(Color::Blue3), Color::from_code(0x1));
        assert_eq!(Some(Color::Gray3), Color::from_code(0x8));
        assert_eq!(Some(Color::Yellow), Color::from_code(0xE));
        assert_eq!(Some(Color::White), Color::from_code(0xF));
        assert_eq!(None, Color::from_code(0x10));
    }
}
