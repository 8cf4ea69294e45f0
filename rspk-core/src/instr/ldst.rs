use log::warn;

use crate::consts::{memmap, mode};
use crate::cpu::{Fault, SpkCpu};
use crate::instr::Operand;

pub trait SpkLoadStore {
    fn mov(&mut self) -> Result<(), Fault>;
    fn uld(&mut self) -> Result<(), Fault>;
}

impl SpkLoadStore for SpkCpu {
    ///
    /// `mov mode, dest, src`. Mode 0x07 masks an immediate source to
    /// 8 bits, mode 0x06 to 16; a register source is copied whole. All
    /// three operand cells are consumed before anything is validated so
    /// a bad mode or destination can never desynchronize the decode.
    ///
    fn mov(&mut self) -> Result<(), Fault> {
        let mode_op = self.fetch_operand()?;
        let dest_op = self.fetch_operand()?;
        let src_op = self.fetch_operand()?;

        let mode = self.resolve(mode_op);
        let mask = match mode as u8 {
            mode::REG_IM8 => 0xFF,
            mode::REG_IM16 => 0xFFFF,
            _ => {
                warn!("invalid addressing mode {:#04x} at address {:#06x}", mode, self.pc);
                return Ok(());
            }
        };

        let dest = match self.reg_operand(dest_op) {
            Some(reg) => reg,
            None => return Ok(()),
        };

        let value = match src_op {
            Operand::Reg(reg) => self.reg(reg),
            Operand::Imm(value) => (value & mask) as i32,
        };

        self.set_reg(dest, value);
        Ok(())
    }

    /// Unload the data window: zero every byte written since the last
    /// `uld` and rewind the index, so the next data byte lands at offset
    /// zero again.
    fn uld(&mut self) -> Result<(), Fault> {
        for i in 0..self.data_index {
            self.mem.write(memmap::VAR_LOC + i, 0x0);
        }
        self.data_index = 0;
        Ok(())
    }
}
