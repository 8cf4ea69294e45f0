use log::warn;

use crate::cpu::{Fault, SpkCpu};

pub trait SpkArith {
    fn add(&mut self) -> Result<(), Fault>;
    fn sub(&mut self) -> Result<(), Fault>;
    fn mul(&mut self) -> Result<(), Fault>;
    fn div(&mut self) -> Result<(), Fault>;
    fn inc(&mut self) -> Result<(), Fault>;
    fn dec(&mut self) -> Result<(), Fault>;
}

impl SpkArith for SpkCpu {
    fn add(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        self.alu_result(n1.wrapping_add(n2));
        Ok(())
    }

    fn sub(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        self.alu_result(n1.wrapping_sub(n2));
        Ok(())
    }

    fn mul(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        self.alu_result(n1.wrapping_mul(n2));
        Ok(())
    }

    /// Integer division, truncating toward zero. A zero divisor is
    /// reported and leaves RS at zero.
    fn div(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        if n2 == 0 {
            warn!("division by zero at address {:#06x}", self.pc);
            self.alu_result(0);
            return Ok(());
        }
        self.alu_result(n1.wrapping_div(n2));
        Ok(())
    }

    fn inc(&mut self) -> Result<(), Fault> {
        let op = self.fetch_operand()?;
        if let Some(reg) = self.reg_operand(op) {
            let value = self.reg(reg).wrapping_add(1);
            self.set_reg(reg, value);
        }
        Ok(())
    }

    fn dec(&mut self) -> Result<(), Fault> {
        let op = self.fetch_operand()?;
        if let Some(reg) = self.reg_operand(op) {
            let value = self.reg(reg).wrapping_sub(1);
            self.set_reg(reg, value);
        }
        Ok(())
    }
}
