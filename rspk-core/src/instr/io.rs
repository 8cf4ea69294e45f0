use crate::consts::memmap;
use crate::cpu::{Fault, SpkCpu};

/// Port I/O against the COM0 communication cell.
pub trait SpkIo {
    fn inb(&mut self) -> Result<(), Fault>;
    fn outb(&mut self) -> Result<(), Fault>;
}

impl SpkIo for SpkCpu {
    fn inb(&mut self) -> Result<(), Fault> {
        let op = self.fetch_operand()?;
        if let Some(reg) = self.reg_operand(op) {
            let value = self.mem.read(memmap::COM0) as i32;
            self.set_reg(reg, value);
        }
        Ok(())
    }

    fn outb(&mut self) -> Result<(), Fault> {
        let op = self.fetch_operand()?;
        let value = self.resolve(op);
        self.mem.write(memmap::COM0, (value & 0xFF) as u8);
        Ok(())
    }
}
