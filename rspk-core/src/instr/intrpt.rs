use log::debug;

use crate::consts::{memmap, rupt, sys};
use crate::cpu::{Fault, Flags, Section, SpkCpu};
use crate::mem::Reg;
use crate::periph::Color;

pub trait SpkInterrupt {
    fn int(&mut self) -> Result<(), Fault>;
}

impl SpkInterrupt for SpkCpu {
    /// Store the code into the interrupt cell and dispatch: the reserved
    /// syscall code routes to the dispatcher, single-step and breakpoint
    /// block on the debug hook, anything else is a typed fault.
    fn int(&mut self) -> Result<(), Fault> {
        let op = self.fetch_operand()?;
        let code = (self.resolve(op) & 0xFF) as u8;
        self.mem.write(memmap::INT_LOC, code);
        self.handle_interrupt()
    }
}

impl SpkCpu {
    fn handle_interrupt(&mut self) -> Result<(), Fault> {
        if self.in_interrupt {
            return Err(Fault::DoubleFault { pc: self.pc });
        }

        self.in_interrupt = true;
        self.ps.e = true;

        let code = self.mem.read(memmap::INT_LOC);
        let res = if code == sys::SYSCALL {
            self.syscall();
            Ok(())
        } else {
            self.raise_interrupt(code)
        };

        self.in_interrupt = false;
        self.ps.e = false;
        res
    }

    fn raise_interrupt(&mut self, code: u8) -> Result<(), Fault> {
        match code {
            rupt::SINGLE_STEP => {
                debug!("CPU: Interrupt: SingleStepInterrupt: {:#06x}", self.pc);
                self.hook.on_single_step(self.pc);
                Ok(())
            }
            rupt::BREAKPOINT => {
                debug!("CPU: Interrupt: Breakpoint: {:#06x}", self.pc - 1);
                self.hook.on_breakpoint(self.pc - 1);
                Ok(())
            }
            _ => Err(Fault::Interrupt { code, pc: self.pc }),
        }
    }

    ///
    /// Syscall dispatcher: number in EAX, subcode in EBX. Unmodeled
    /// number/subcode combinations are ignored on purpose; a program
    /// probing for a service this revision does not provide keeps
    /// running.
    ///
    fn syscall(&mut self) {
        let number = self.reg(Reg::Eax);
        let subcode = self.reg(Reg::Ebx);

        match number {
            sys::WRITE => self.sys_write(subcode),
            sys::RESTART => self.sys_restart(),
            _ => {
                debug!("CPU: Interrupt: Syscall: unmodeled number {:#x}, ignored", number);
            }
        }
    }

    fn sys_write(&mut self, subcode: i32) {
        match subcode {
            sys::WRITE_TEXT => {
                let len = self.reg(Reg::Edx).max(0) as usize;
                let len = len.min(self.mem.len() - memmap::VAR_LOC);

                let mut text = String::new();
                for i in 0..len {
                    text.push(self.mem.read(memmap::VAR_LOC + i) as char);
                }
                debug!("CPU: Interrupt: Syscall: Write: Stdout: {}", text);
                self.screen.draw_text(&text);
            }
            sys::WRITE_CLEAR => {
                if let Some(color) = Color::from_code(self.reg(Reg::Edx) as u32) {
                    debug!("CPU: Interrupt: Syscall: Write: Clear: {}", color.name());
                    self.screen.clear(color);
                }
            }
            sys::WRITE_PIXEL => {
                if let Some(color) = Color::from_code(self.reg(Reg::Edx) as u32) {
                    let x = self.reg(Reg::Ax) as u16;
                    let y = self.reg(Reg::Bx) as u16;
                    debug!("CPU: Interrupt: Syscall: Write: DrawPixel: {}", color.name());
                    self.screen.plot_pixel(x, y, color);
                }
            }
            sys::WRITE_COLOR => {
                if let Some(color) = Color::from_code(self.reg(Reg::Edx) as u32) {
                    self.screen.set_color(color);
                }
            }
            _ => {}
        }
    }

    /// Full engine reset without re-assembling: the pristine image comes
    /// back, every register and flag goes to zero, the display clears.
    /// The restart flag is picked up at the top of the next iteration.
    fn sys_restart(&mut self) {
        debug!("CPU: Interrupt: Syscall: Restart");

        self.mem.reload_original();
        self.mem.reset_regs();
        self.pc = 0;
        self.data_index = 0;
        self.section = Section::Text;
        self.ps = Flags::default();
        self.ps.r = true;

        self.screen.clear(Color::Black);
        self.screen.set_color(Color::White);
        self.screen.reset_scroll();
    }
}
