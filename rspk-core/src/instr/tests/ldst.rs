use crate::consts::{memmap, opcode, section};
use crate::cpu::ExitStatus;
use crate::instr::tests::{assemble_and_load, init_spk};
use crate::mem::Reg;

#[test]
fn mov_8bit_immediate_masks_the_source() {
    let mut cpu = assemble_and_load(".text\nmov 7, ebx, 0x1FF\nhlt");
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());
    assert_eq!(0xFF, cpu.reg(Reg::Ebx));
}

#[test]
fn mov_16bit_immediate_keeps_the_word() {
    let mut cpu = assemble_and_load(".text\nmov 6, ebx, 0x1234\nhlt");
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());
    assert_eq!(0x1234, cpu.reg(Reg::Ebx));
}

#[test]
fn mov_register_source_copies_the_whole_value() {
    // An 8-bit mode does not narrow a register-to-register copy
    let mut cpu = assemble_and_load(".text\nmov 6, eax, 0xABC\nmov 7, ebx, eax\nhlt");
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());
    assert_eq!(0xABC, cpu.reg(Reg::Ebx));
}

#[test]
fn mov_with_an_unknown_mode_still_consumes_its_operands() {
    // The hlt right after must decode cleanly
    let mut cpu = assemble_and_load(".text\nmov 9, 1, 5\nhlt");
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());
    assert_eq!(0, cpu.reg(Reg::Ebx));
    assert_eq!(9, cpu.pc);
}

#[test]
fn data_section_bytes_populate_the_window() {
    let mut cpu = assemble_and_load(".data\nmsg: \"Hi\"\n.text\nhlt");
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());
    assert_eq!(b'H', cpu.mem.read(memmap::VAR_LOC));
    assert_eq!(b'i', cpu.mem.read(memmap::VAR_LOC + 1));
}

#[test]
fn zero_data_bytes_are_skipped_not_stored() {
    let image = [
        section::DATA,
        0x41,
        0x00,
        0x42,
        section::TEXT,
        opcode::HLT,
    ];
    let mut cpu = init_spk(&image);
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());
    assert_eq!(0x41, cpu.mem.read(memmap::VAR_LOC));
    assert_eq!(0x42, cpu.mem.read(memmap::VAR_LOC + 1));
}

#[test]
fn uld_zeroes_the_window_and_rewinds_the_index() {
    let image = [
        section::DATA,
        b'A',
        b'B',
        section::TEXT,
        opcode::ULD,
        section::DATA,
        b'C',
        section::TEXT,
        opcode::HLT,
    ];
    let mut cpu = init_spk(&image);
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());

    // The next data byte landed at offset zero again and the old tail
    // reads back as zero
    assert_eq!(b'C', cpu.mem.read(memmap::VAR_LOC));
    assert_eq!(0x00, cpu.mem.read(memmap::VAR_LOC + 1));
}

#[test]
fn uld_with_an_empty_window_is_a_no_op() {
    let mut cpu = assemble_and_load(".text\nuld\nhlt");
    assert_eq!(Ok(ExitStatus::Halted), cpu.run());
}
