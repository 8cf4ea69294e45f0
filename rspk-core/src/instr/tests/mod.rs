use std::sync::mpsc::{channel, Receiver, Sender};

use crate::consts;
use crate::cpu::SpkCpu;
use crate::mem::SpkMemoryMap;
use crate::periph::{Color, DebugHook, NopHook, Screen};

/// Everything the machine can tell its collaborators, flattened for
/// assertions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    SingleStep(usize),
    Breakpoint(usize),
    DrawText(String),
    Clear(Color),
    Pixel(u16, u16, Color),
    SetColor(Color),
    ResetScroll,
}

pub struct NullScreen;

impl Screen for NullScreen {
    fn draw_text(&mut self, _text: &str) {}
    fn clear(&mut self, _color: Color) {}
    fn plot_pixel(&mut self, _x: u16, _y: u16, _color: Color) {}
    fn set_color(&mut self, _color: Color) {}
    fn reset_scroll(&mut self) {}
}

pub struct RecordingScreen {
    tx: Sender<Event>,
}

impl Screen for RecordingScreen {
    fn draw_text(&mut self, text: &str) {
        let _ = self.tx.send(Event::DrawText(text.to_string()));
    }

    fn clear(&mut self, color: Color) {
        let _ = self.tx.send(Event::Clear(color));
    }

    fn plot_pixel(&mut self, x: u16, y: u16, color: Color) {
        let _ = self.tx.send(Event::Pixel(x, y, color));
    }

    fn set_color(&mut self, color: Color) {
        let _ = self.tx.send(Event::SetColor(color));
    }

    fn reset_scroll(&mut self) {
        let _ = self.tx.send(Event::ResetScroll);
    }
}

pub struct RecordingHook {
    tx: Sender<Event>,
}

impl DebugHook for RecordingHook {
    fn on_single_step(&mut self, pc: usize) {
        let _ = self.tx.send(Event::SingleStep(pc));
    }

    fn on_breakpoint(&mut self, pc: usize) {
        let _ = self.tx.send(Event::Breakpoint(pc));
    }
}

#[allow(dead_code)]
pub fn init_spk(image: &[u8]) -> SpkCpu {
    let mut mem = SpkMemoryMap::new(consts::MEM_SIZE);
    mem.load_image(image).unwrap();
    SpkCpu::new(mem, Box::new(NullScreen), Box::new(NopHook))
}

#[allow(dead_code)]
pub fn init_spk_with_mem(mem: SpkMemoryMap) -> SpkCpu {
    SpkCpu::new(mem, Box::new(NullScreen), Box::new(NopHook))
}

#[allow(dead_code)]
pub fn init_spk_recording(image: &[u8]) -> (SpkCpu, Receiver<Event>) {
    let (tx, rx) = channel();
    let mut mem = SpkMemoryMap::new(consts::MEM_SIZE);
    mem.load_image(image).unwrap();
    let cpu = SpkCpu::new(
        mem,
        Box::new(RecordingScreen { tx: tx.clone() }),
        Box::new(RecordingHook { tx }),
    );
    (cpu, rx)
}

/// Assemble source and load it into a fresh machine.
#[allow(dead_code)]
pub fn assemble_and_load(source: &str) -> SpkCpu {
    init_spk(&crate::asm::assemble(source).unwrap())
}

#[allow(dead_code)]
pub fn assemble_and_load_recording(source: &str) -> (SpkCpu, Receiver<Event>) {
    init_spk_recording(&crate::asm::assemble(source).unwrap())
}

mod init_tests {
    #[test]
    fn helloworld() {
        let _ = env_logger::builder().is_test(true).try_init();
    }
}

mod ldst;
