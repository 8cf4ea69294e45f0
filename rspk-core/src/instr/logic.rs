use crate::cpu::{Fault, SpkCpu};

/// Truthiness logic over the result register. `and`/`or`/`nor` test
/// strict positivity of their resolved operands and write 1 or 0 to RS;
/// this is the ISA's logical semantics, not a bitwise one. `cmp` writes
/// the difference so `jz`/`jnz` act as equal/not-equal branches.
pub trait SpkLogic {
    fn and(&mut self) -> Result<(), Fault>;
    fn or(&mut self) -> Result<(), Fault>;
    fn nor(&mut self) -> Result<(), Fault>;
    fn cmp(&mut self) -> Result<(), Fault>;
}

impl SpkLogic for SpkCpu {
    fn and(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        self.alu_result((n1 > 0 && n2 > 0) as i32);
        Ok(())
    }

    fn or(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        self.alu_result((n1 > 0 || n2 > 0) as i32);
        Ok(())
    }

    fn nor(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        self.alu_result(!(n1 > 0 || n2 > 0) as i32);
        Ok(())
    }

    fn cmp(&mut self) -> Result<(), Fault> {
        let (n1, n2) = self.fetch_pair()?;
        self.alu_result(n1.wrapping_sub(n2));
        Ok(())
    }
}
