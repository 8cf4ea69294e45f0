mod ram;
mod regs;

pub use ram::SpkRam;
pub use regs::{Reg, SpkRegs, REG_COUNT};

use thiserror::Error;

use crate::consts;
use crate::consts::memmap;

const REG_WIN_END: usize = memmap::REG_LOC + REG_COUNT - 1;

#[derive(Debug, Error, PartialEq, Eq)]
#[error("memory image ({image} cells) exceeds memory size ({memory})")]
pub struct ImageTooLarge {
    pub image: usize,
    pub memory: usize,
}

///
/// Memory map of the machine. A flat RAM buffer with the register file
/// aliased over its top addresses: reads and writes landing on the alias
/// window are routed to the register file instead of the backing store,
/// the same way every other address range here is routed by a match on
/// the absolute address.
///
/// The pristine program image is retained on load so the restart syscall
/// can return the machine to its initial state without re-assembling.
///
pub struct SpkMemoryMap {
    ram: ram::SpkRam,
    regs: regs::SpkRegs,
    original: Vec<u8>,
}

impl SpkMemoryMap {
    /// Sizes below the default are clamped up: the reserved region
    /// (interrupt cell, data window, register aliases) must exist.
    pub fn new(size: usize) -> SpkMemoryMap {
        let size = size.max(consts::MEM_SIZE);
        SpkMemoryMap {
            ram: ram::SpkRam::new(size),
            regs: regs::SpkRegs::new(),
            original: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.ram.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ram.is_empty()
    }

    pub fn load_image(&mut self, image: &[u8]) -> Result<(), ImageTooLarge> {
        if image.len() > self.ram.len() {
            return Err(ImageTooLarge {
                image: image.len(),
                memory: self.ram.len(),
            });
        }
        self.ram.load(image);
        self.original = image.to_vec();
        Ok(())
    }

    /// Drop every mutation since `load_image` and restore the pristine
    /// program image.
    pub fn reload_original(&mut self) {
        let image = std::mem::take(&mut self.original);
        self.ram.load(&image);
        self.original = image;
    }

    pub fn read(&self, idx: usize) -> u8 {
        match idx {
            memmap::REG_LOC..=REG_WIN_END => {
                let reg = regs::Reg::from_code((idx - memmap::REG_LOC) as u32).unwrap();
                self.regs.read(reg) as u8
            }
            _ => self.ram.read(idx),
        }
    }

    pub fn write(&mut self, idx: usize, value: u8) {
        match idx {
            memmap::REG_LOC..=REG_WIN_END => {
                let reg = regs::Reg::from_code((idx - memmap::REG_LOC) as u32).unwrap();
                self.regs.write(reg, value as i32);
            }
            _ => self.ram.write(idx, value),
        }
    }

    pub fn read_reg(&self, reg: regs::Reg) -> i32 {
        self.regs.read(reg)
    }

    pub fn write_reg(&mut self, reg: regs::Reg, value: i32) {
        self.regs.write(reg, value);
    }

    pub fn reset_regs(&mut self) {
        self.regs.reset();
    }

    pub fn contents(&self) -> &[u8] {
        self.ram.contents()
    }
}
