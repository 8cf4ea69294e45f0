use crate::cpu::{Fault, SpkCpu};
use crate::mem::Reg;

pub trait SpkControlFlow {
    fn jmp(&mut self) -> Result<(), Fault>;
    fn je(&mut self) -> Result<(), Fault>;
    fn jne(&mut self) -> Result<(), Fault>;
    fn jz(&mut self) -> Result<(), Fault>;
    fn jnz(&mut self) -> Result<(), Fault>;
}

impl SpkControlFlow for SpkCpu {
    fn jmp(&mut self) -> Result<(), Fault> {
        let op = self.fetch_operand()?;
        self.pc = self.resolve(op) as u32 as usize;
        Ok(())
    }

    fn je(&mut self) -> Result<(), Fault> {
        let value = self.fetch_operand()?;
        let target = self.fetch_operand()?;

        if self.reg(Reg::Rs) == self.resolve(value) {
            self.pc = self.resolve(target) as u32 as usize;
        }
        Ok(())
    }

    fn jne(&mut self) -> Result<(), Fault> {
        let value = self.fetch_operand()?;
        let target = self.fetch_operand()?;

        if self.reg(Reg::Rs) != self.resolve(value) {
            self.pc = self.resolve(target) as u32 as usize;
        }
        Ok(())
    }

    fn jz(&mut self) -> Result<(), Fault> {
        let target = self.fetch_operand()?;

        if self.reg(Reg::Rs) == 0 {
            self.pc = self.resolve(target) as u32 as usize;
        }
        Ok(())
    }

    fn jnz(&mut self) -> Result<(), Fault> {
        let target = self.fetch_operand()?;

        if self.reg(Reg::Rs) != 0 {
            self.pc = self.resolve(target) as u32 as usize;
        }
        Ok(())
    }
}
