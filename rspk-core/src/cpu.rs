use log::{debug, error, info, trace, warn};
use thiserror::Error;

use crate::consts::{memmap, opcode, section, tag};
use crate::instr;
use crate::instr::{Operand, SpkArith, SpkControlFlow, SpkInterrupt, SpkIo, SpkLoadStore, SpkLogic};
use crate::mem::{Reg, SpkMemoryMap};
use crate::periph::{DebugHook, Screen};

/// Fatal engine faults. Invalid opcodes, invalid register codes and
/// division by zero are reported through the log and tolerated instead;
/// see `execute`.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    #[error("OutOfMemory: fetch at {addr:#06x}")]
    OutOfMemory { addr: usize },

    #[error("DoubleFault: interrupt raised at {pc:#06x} while one was being serviced")]
    DoubleFault { pc: usize },

    #[error("unhandled interrupt {code:#04x} at {pc:#06x}")]
    Interrupt { code: u8, pc: usize },
}

/// CPU status flags. All zero on construction and after a restart.
/// `full` packs the byte as Z C O S B T I E, bit 7 down to bit 0; the
/// restart flag is internal and stays out of the packed form.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Flags {
    pub z: bool, // ALU result was zero
    pub c: bool, // carry/borrow
    pub o: bool, // signed overflow
    pub s: bool, // ALU result was negative
    pub b: bool, // busy
    pub t: bool, // trap, single-step every iteration
    pub i: bool, // interrupts disabled
    pub e: bool, // interrupt pending
    pub r: bool, // restart requested
}

impl Flags {
    pub fn full(&self) -> u8 {
        (self.z as u8) << 7
            | (self.c as u8) << 6
            | (self.o as u8) << 5
            | (self.s as u8) << 4
            | (self.b as u8) << 3
            | (self.t as u8) << 2
            | (self.i as u8) << 1
            | self.e as u8
    }
}

/// Which section's rules apply to the bytes being fetched. Switched by
/// the sentinel cells in the image, `text` until told otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Section {
    Data,
    Rom,
    Text,
}

/// Outcome of one fetch-decode-execute iteration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    Continue,
    Halted,
    Restarted,
}

/// Terminal outcome of `run`. After `Restarted` the image has been
/// reloaded and the engine is ready at PC 0; the caller re-invokes `run`
/// to resume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Halted,
    Restarted,
}

pub struct SpkCpu {
    pub mem: SpkMemoryMap,
    pub pc: usize,
    pub ps: Flags,
    pub(crate) section: Section,
    pub(crate) data_index: usize,
    pub(crate) in_interrupt: bool,
    pub(crate) screen: Box<dyn Screen>,
    pub(crate) hook: Box<dyn DebugHook>,
}

impl SpkCpu {
    pub fn new(mem: SpkMemoryMap, screen: Box<dyn Screen>, hook: Box<dyn DebugHook>) -> SpkCpu {
        SpkCpu {
            mem,
            pc: 0,
            ps: Flags::default(),
            section: Section::Text,
            data_index: 0,
            in_interrupt: false,
            screen,
            hook,
        }
    }

    pub fn reg(&self, reg: Reg) -> i32 {
        self.mem.read_reg(reg)
    }

    pub fn set_reg(&mut self, reg: Reg, value: i32) {
        self.mem.write_reg(reg, value);
    }

    pub(crate) fn fetch_byte(&mut self) -> Result<u8, Fault> {
        if self.pc >= self.mem.len() {
            return Err(Fault::OutOfMemory { addr: self.pc });
        }
        let value = self.mem.read(self.pc);
        self.pc += 1;
        Ok(value)
    }

    pub(crate) fn fetch_word(&mut self) -> Result<u16, Fault> {
        let high = self.fetch_byte()?;
        let low = self.fetch_byte()?;
        Ok((high as u16) << 8 | low as u16)
    }

    /// Fetch one operand cell: a tag byte and its payload. A register
    /// cell with an unknown code, or a byte that is no tag at all, is the
    /// footprint of a misaligned decode; both are reported and read as
    /// immediates so execution can keep going.
    pub(crate) fn fetch_operand(&mut self) -> Result<Operand, Fault> {
        let tag_byte = self.fetch_byte()?;
        match tag_byte {
            tag::IMM8 => Ok(Operand::Imm(self.fetch_byte()? as u32)),
            tag::IMM16 => Ok(Operand::Imm(self.fetch_word()? as u32)),
            tag::REG => {
                let code = self.fetch_byte()?;
                match Reg::from_code(code as u32) {
                    Some(reg) => Ok(Operand::Reg(reg)),
                    None => {
                        warn!(
                            "invalid register code {:#04x} at address {:#06x}",
                            code,
                            self.pc - 1
                        );
                        Ok(Operand::Imm(code as u32))
                    }
                }
            }
            other => {
                warn!(
                    "invalid operand tag {:#04x} at address {:#06x}",
                    other,
                    self.pc - 1
                );
                Ok(Operand::Imm(other as u32))
            }
        }
    }

    /// A register reference reads the register's current value, an
    /// immediate is the value itself.
    pub(crate) fn resolve(&self, op: Operand) -> i32 {
        match op {
            Operand::Imm(value) => value as i32,
            Operand::Reg(reg) => self.reg(reg),
        }
    }

    /// Interpret an operand as a register named by code: either a
    /// register-reference cell or an immediate holding a register code.
    /// Unknown codes are reported and yield `None`; the caller skips the
    /// write.
    pub(crate) fn reg_operand(&mut self, op: Operand) -> Option<Reg> {
        match op {
            Operand::Reg(reg) => Some(reg),
            Operand::Imm(code) => {
                let reg = Reg::from_code(code);
                if reg.is_none() {
                    warn!(
                        "invalid register code {:#x} at address {:#06x}",
                        code, self.pc
                    );
                }
                reg
            }
        }
    }

    pub(crate) fn fetch_pair(&mut self) -> Result<(i32, i32), Fault> {
        let op1 = self.fetch_operand()?;
        let op2 = self.fetch_operand()?;
        Ok((self.resolve(op1), self.resolve(op2)))
    }

    /// Every arithmetic, comparison and logic result lands in RS and
    /// refreshes the zero and sign flags.
    pub(crate) fn alu_result(&mut self, value: i32) {
        self.set_reg(Reg::Rs, value);
        self.ps.z = value == 0;
        self.ps.s = value < 0;
    }

    ///
    /// One iteration of the engine protocol: service the trap flag,
    /// honour a pending restart, stop at the end of memory, fetch one
    /// cell and either switch sections or interpret it under the active
    /// section's rules.
    ///
    pub fn step(&mut self) -> Result<Step, Fault> {
        if self.ps.t {
            self.hook.on_single_step(self.pc);
        }

        if self.ps.r {
            self.ps = Flags::default();
            return Ok(Step::Restarted);
        }

        if self.pc >= self.mem.len() {
            return Ok(Step::Halted);
        }

        let ins = self.fetch_byte()?;
        match ins {
            section::DATA => {
                self.section = Section::Data;
                return Ok(Step::Continue);
            }
            section::ROM => {
                self.section = Section::Rom;
                return Ok(Step::Continue);
            }
            section::TEXT => {
                self.section = Section::Text;
                return Ok(Step::Continue);
            }
            _ => {}
        }

        match self.section {
            Section::Text => self.execute(ins),
            // Reserved section, contents skipped
            Section::Rom => Ok(Step::Continue),
            Section::Data => self.data_byte(ins),
        }
    }

    /// Drive `step` to a terminal state.
    pub fn run(&mut self) -> Result<ExitStatus, Fault> {
        loop {
            match self.step() {
                Ok(Step::Continue) => {}
                Ok(Step::Halted) => return Ok(ExitStatus::Halted),
                Ok(Step::Restarted) => return Ok(ExitStatus::Restarted),
                Err(fault) => {
                    error!("CPU: Interrupt: {}", fault);
                    return Err(fault);
                }
            }
        }
    }

    fn execute(&mut self, ins: u8) -> Result<Step, Fault> {
        trace!("{:#06x}: {}", self.pc - 1, instr::mnemonic(ins));

        match ins {
            opcode::NOP => return Ok(Step::Continue),
            opcode::HLT => return Ok(Step::Halted),
            opcode::BREAKPOINT => self.breakpoint()?,
            opcode::MOV => self.mov()?,
            opcode::INT => self.int()?,
            opcode::JMP => self.jmp()?,
            opcode::ADD => self.add()?,
            opcode::SUB => self.sub()?,
            opcode::MUL => self.mul()?,
            opcode::DIV => self.div()?,
            opcode::INC => self.inc()?,
            opcode::DEC => self.dec()?,
            opcode::JNE => self.jne()?,
            opcode::JE => self.je()?,
            opcode::JZ => self.jz()?,
            opcode::JNZ => self.jnz()?,
            opcode::AND => self.and()?,
            opcode::OR => self.or()?,
            opcode::CMP => self.cmp()?,
            opcode::NOR => self.nor()?,
            opcode::INB => self.inb()?,
            opcode::OUTB => self.outb()?,
            opcode::ULD => self.uld()?,
            _ => self.report_invalid_opcode(ins),
        }

        Ok(Step::Continue)
    }

    /// The interrupt cell and the populated part of the data window hold
    /// legitimately non-instruction bytes; a decode that wanders into
    /// them is misalignment, not a fault worth reporting.
    fn report_invalid_opcode(&mut self, ins: u8) {
        let addr = self.pc - 1;
        let window_end = memmap::VAR_LOC + self.data_index;
        if addr != memmap::INT_LOC && (addr < memmap::VAR_LOC || addr > window_end) {
            warn!("InvalidOpcode: {:#04x} at address {:#06x}", ins, addr);
        }
    }

    fn breakpoint(&mut self) -> Result<(), Fault> {
        debug!("CPU: Interrupt: Breakpoint: {:#06x}", self.pc - 1);
        self.hook.on_breakpoint(self.pc - 1);
        Ok(())
    }

    /// Data-section bytes accumulate at the data window; zero bytes are
    /// the stream's no-op delimiter. The window ends where the register
    /// aliases begin.
    fn data_byte(&mut self, value: u8) -> Result<Step, Fault> {
        if value == 0 {
            return Ok(Step::Continue);
        }

        let addr = memmap::VAR_LOC + self.data_index;
        if addr >= memmap::REG_LOC {
            return Err(Fault::OutOfMemory { addr });
        }

        self.mem.write(addr, value);
        self.data_index += 1;
        Ok(Step::Continue)
    }

    pub fn print_state(&self) {
        info!("=========================================================");
        info!(
            "EAX: {:08x} EBX: {:08x} ECX: {:08x} EDX: {:08x}",
            self.reg(Reg::Eax),
            self.reg(Reg::Ebx),
            self.reg(Reg::Ecx),
            self.reg(Reg::Edx)
        );
        info!(
            "AX: {:04x} BX: {:04x} CX: {:04x} DX: {:04x} RS: {:08x}",
            self.reg(Reg::Ax),
            self.reg(Reg::Bx),
            self.reg(Reg::Cx),
            self.reg(Reg::Dx),
            self.reg(Reg::Rs)
        );
        info!("PC: {:#06x} | PS: {:#010b}", self.pc, self.ps.full());
    }
}

#[cfg(test)]
mod cpu_tests {
    use super::*;
    use crate::instr::tests::init_spk;

    #[test]
    fn flags_pack_in_declared_bit_order() {
        let mut ps = Flags::default();
        assert_eq!(0b0000_0000, ps.full());

        ps.z = true;
        assert_eq!(0b1000_0000, ps.full());

        ps.e = true;
        assert_eq!(0b1000_0001, ps.full());

        ps.c = true;
        ps.o = true;
        ps.s = true;
        ps.b = true;
        ps.t = true;
        ps.i = true;
        assert_eq!(0b1111_1111, ps.full());

        // Restart is not part of the packed byte
        ps.r = true;
        assert_eq!(0b1111_1111, ps.full());
    }

    #[test]
    fn empty_memory_halts_by_exhaustion() {
        // Zeroed memory is all nops in the text section; the engine
        // walks off the end and halts.
        let mut cpu = init_spk(&[]);
        assert_eq!(Ok(ExitStatus::Halted), cpu.run());
        assert_eq!(cpu.mem.len(), cpu.pc);
    }

    #[test]
    fn invalid_opcode_is_reported_but_execution_continues() {
        use crate::consts::{opcode, section};

        let mut cpu = init_spk(&[section::TEXT, 0x7B, opcode::HLT]);
        assert_eq!(Ok(ExitStatus::Halted), cpu.run());
        assert_eq!(3, cpu.pc);
    }

    #[test]
    fn rom_section_bytes_are_skipped() {
        use crate::consts::{opcode, section, tag};

        // The 0x7B inside the rom section must not be decoded; back in
        // text, the add still runs.
        let image = [
            section::ROM,
            0x7B,
            0x7B,
            section::TEXT,
            opcode::ADD,
            tag::IMM8,
            2,
            tag::IMM8,
            3,
            opcode::HLT,
        ];
        let mut cpu = init_spk(&image);
        assert_eq!(Ok(ExitStatus::Halted), cpu.run());
        assert_eq!(5, cpu.reg(Reg::Rs));
    }

    #[test]
    fn operand_fetch_past_the_end_is_an_out_of_memory_fault() {
        use crate::consts::{opcode, section, tag};

        let mut mem = SpkMemoryMap::new(0);
        let len = mem.len();
        let mut image = vec![0u8; len];
        image[len - 3] = section::TEXT;
        image[len - 2] = opcode::ADD;
        image[len - 1] = tag::IMM8;
        mem.load_image(&image).unwrap();

        let mut cpu = crate::instr::tests::init_spk_with_mem(mem);
        cpu.pc = len - 3;
        assert_eq!(Err(Fault::OutOfMemory { addr: len }), cpu.run());
    }

    #[test]
    fn trap_flag_blocks_on_the_hook_each_iteration() {
        use crate::consts::{opcode, section};
        use crate::instr::tests::{init_spk_recording, Event};

        let (mut cpu, events) = init_spk_recording(&[section::TEXT, opcode::NOP, opcode::HLT]);
        cpu.ps.t = true;
        assert_eq!(Ok(ExitStatus::Halted), cpu.run());

        let seen: Vec<Event> = events.try_iter().collect();
        // Sentinel, nop and hlt iterations each hit the hook
        assert_eq!(
            vec![
                Event::SingleStep(0),
                Event::SingleStep(1),
                Event::SingleStep(2)
            ],
            seen
        );
    }

    #[test]
    fn data_window_overflow_faults_before_touching_the_aliases() {
        use crate::consts::section;

        let mut image = vec![section::DATA];
        image.resize(1 + (memmap::REG_LOC - memmap::VAR_LOC) + 1, 0x41);

        let mut cpu = init_spk(&image);
        assert_eq!(
            Err(Fault::OutOfMemory { addr: memmap::REG_LOC }),
            cpu.run()
        );
        // The faulting byte never landed on the first alias cell
        assert_eq!(0, cpu.reg(Reg::Eax));
    }
}
