use crate::emulator::instruction::{Instruction, Opcode};
use crate::errors::{ExecutionError, LoadProgramError};
use crate::hardware::memory::Memory;
use crate::hardware::registers::{Flags, INTERRUPT_MASK, INTERRUPT_STATUS, Registers};
use std::fmt::{Debug, Formatter};
use std::io::Write;

pub(crate) mod alu;
pub mod instruction;
pub(crate) mod opcodes;
#[cfg(test)]
pub(crate) mod test_helpers;

/// First cell of the interrupt vector table; one handler address per
/// interrupt number 0-7, up to the top of memory.
const INTERRUPT_VECTORS: u8 = 0xF8;

/// Outcome a handler reports back to the run loop, which is the sole owner
/// of the program counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Flow {
    /// Advance the PC by the instruction width.
    Advance,
    /// Set the PC to the target address.
    Jump(u8),
    /// Stop cleanly.
    Halt,
}

/// The public facing emulator used to run LS-8 programs.
pub struct Emulator {
    registers: Registers,
    memory: Memory,
    interrupts_enabled: bool,
}
impl Default for Emulator {
    fn default() -> Self {
        Self::new()
    }
}
impl Emulator {
    /// Constructor method, all parameters according to the machine spec:
    /// 256 bytes of zeroed memory, 8 registers, stack pointer at 0xF4.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            registers: Registers::new(),
            memory: Memory::new(),
            interrupts_enabled: true,
        }
    }

    /// Writes a program image into memory starting at address 0.
    ///
    /// # Errors
    /// - Program longer than the 256-byte memory; memory is left unmodified.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadProgramError> {
        self.memory.load_program(program)
    }

    /// Runs the fetch-decode-execute loop until the machine halts.
    ///
    /// `Ok(())` is a clean HLT; the error is the fault that stopped the
    /// machine. PRN/PRA write their lines to `output`.
    ///
    /// # Errors
    /// - Unknown instruction (byte at PC outside the opcode map)
    /// - Division or modulo by a zero source register
    /// - Writing to `output` failed
    pub fn run(&mut self, output: &mut impl Write) -> Result<(), ExecutionError> {
        loop {
            self.service_pending_interrupt();
            let address = self.registers.pc();
            let byte = self.memory[address];
            let Some(opcode) = Opcode::n(byte) else {
                return Err(ExecutionError::UnknownInstruction {
                    opcode: byte,
                    address,
                });
            };
            let a = self.memory[address.wrapping_add(1)];
            let b = self.memory[address.wrapping_add(2)];
            let instruction = Instruction::decode(opcode, a, b);
            match self.execute(instruction, address, output)? {
                Flow::Advance => self.registers.set_pc(address.wrapping_add(opcode.width())),
                Flow::Jump(target) => self.registers.set_pc(target),
                Flow::Halt => return Ok(()),
            }
        }
    }

    fn execute(
        &mut self,
        instruction: Instruction,
        address: u8,
        output: &mut impl Write,
    ) -> Result<Flow, ExecutionError> {
        let r = &mut self.registers;
        let m = &mut self.memory;
        let flow = match instruction {
            Instruction::Nop => Flow::Advance,
            Instruction::Hlt => Flow::Halt,
            Instruction::Ldi { register, value } => opcodes::ldi(register, value, r),
            Instruction::Ld {
                register,
                address_register,
            } => opcodes::ld(register, address_register, r, m),
            Instruction::St {
                address_register,
                register,
            } => opcodes::st(address_register, register, r, m),
            Instruction::Push { register } => opcodes::push(register, r, m),
            Instruction::Pop { register } => opcodes::pop(register, r, m),
            Instruction::Prn { register } => opcodes::prn(register, r, output)?,
            Instruction::Pra { register } => opcodes::pra(register, r, output)?,
            Instruction::Binary { op, dst, src } => {
                alu::binary(op, r, dst, src, address)?;
                Flow::Advance
            }
            Instruction::Unary { op, dst } => {
                alu::unary(op, r, dst);
                Flow::Advance
            }
            Instruction::Jmp { register } => opcodes::jmp(register, r),
            Instruction::Branch {
                condition,
                register,
            } => opcodes::branch(condition, register, r),
            Instruction::Call { register } => {
                opcodes::call(register, address.wrapping_add(2), r, m)
            }
            Instruction::Ret => opcodes::ret(r, m),
            Instruction::Int { register } => opcodes::int(register, r),
            Instruction::Iret => self.iret(),
        };
        Ok(flow)
    }

    /// Services the lowest pending unmasked interrupt, if any. Runs between
    /// instruction steps only, so no instruction is ever observable half-done.
    fn service_pending_interrupt(&mut self) {
        if !self.interrupts_enabled {
            return;
        }
        let pending =
            self.registers.get(INTERRUPT_MASK) & self.registers.get(INTERRUPT_STATUS);
        if pending == 0 {
            return;
        }
        #[expect(
            clippy::cast_possible_truncation,
            reason = "trailing_zeros of a nonzero u8 is at most 7"
        )]
        let number = pending.trailing_zeros() as u8;
        self.interrupts_enabled = false;
        let status = self.registers.get(INTERRUPT_STATUS) & !(1 << number);
        self.registers.set(INTERRUPT_STATUS, status);
        opcodes::push_byte(self.registers.pc(), &mut self.registers, &mut self.memory);
        opcodes::push_byte(
            self.registers.flags().to_bits(),
            &mut self.registers,
            &mut self.memory,
        );
        for register in 0..=6 {
            opcodes::push_byte(
                self.registers.get(register),
                &mut self.registers,
                &mut self.memory,
            );
        }
        let handler = self.memory[INTERRUPT_VECTORS.wrapping_add(number)];
        self.registers.set_pc(handler);
    }

    /// IRET: restores R6-R0, the flags and the PC saved at interrupt entry,
    /// and re-enables interrupt servicing.
    fn iret(&mut self) -> Flow {
        for register in (0..=6).rev() {
            let value = opcodes::pop_byte(&mut self.registers, &self.memory);
            self.registers.set(register, value);
        }
        let flags = Flags::from_bits(opcodes::pop_byte(&mut self.registers, &self.memory));
        self.registers.set_flags(flags);
        let return_address = opcodes::pop_byte(&mut self.registers, &self.memory);
        self.interrupts_enabled = true;
        Flow::Jump(return_address)
    }
}

/// Trace format: PC, the three bytes at PC, then R0-R7, all in hex.
impl Debug for Emulator {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let pc = self.registers.pc();
        write!(
            f,
            "PC: {pc:02X} | {:02X} {:02X} {:02X} |",
            self.memory[pc],
            self.memory[pc.wrapping_add(1)],
            self.memory[pc.wrapping_add(2)]
        )?;
        for register in 0..8 {
            write!(f, " {:02X}", self.registers.get(register))?;
        }
        Ok(())
    }
}

/// Parses the `.ls8` text format into a program image: one 8-bit binary
/// literal per line, `#` starts a comment, blank lines are skipped.
///
/// # Errors
/// - A non-empty line that is not an 8-bit binary literal, reported with its
///   1-based line number.
pub fn parse_program_source(source: &str) -> Result<Vec<u8>, LoadProgramError> {
    let mut program = Vec::new();
    for (index, line) in source.lines().enumerate() {
        let token = line.split('#').next().unwrap_or_default().trim();
        if token.is_empty() {
            continue;
        }
        let byte =
            u8::from_str_radix(token, 2).map_err(|_| LoadProgramError::InvalidSourceLine {
                line_number: index + 1,
                token: token.to_string(),
            })?;
        program.push(byte);
    }
    Ok(program)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emulator::test_helpers::run_program;
    use googletest::prelude::*;
    use yare::parameterized;

    const NOP: u8 = Opcode::Nop as u8;
    const HLT: u8 = Opcode::Hlt as u8;
    const LDI: u8 = Opcode::Ldi as u8;
    const LD: u8 = Opcode::Ld as u8;
    const ST: u8 = Opcode::St as u8;
    const PUSH: u8 = Opcode::Push as u8;
    const POP: u8 = Opcode::Pop as u8;
    const PRN: u8 = Opcode::Prn as u8;
    const PRA: u8 = Opcode::Pra as u8;
    const MUL: u8 = Opcode::Mul as u8;
    const DIV: u8 = Opcode::Div as u8;
    const CMP: u8 = Opcode::Cmp as u8;
    const CALL: u8 = Opcode::Call as u8;
    const RET: u8 = Opcode::Ret as u8;
    const INT: u8 = Opcode::Int as u8;
    const IRET: u8 = Opcode::Iret as u8;
    const JMP: u8 = Opcode::Jmp as u8;
    const JEQ: u8 = Opcode::Jeq as u8;
    const JNE: u8 = Opcode::Jne as u8;

    #[gtest]
    pub fn test_print8() {
        let (_emu, output, result) = run_program(&[LDI, 0, 8, PRN, 0, HLT]);
        result.unwrap();
        expect_that!(output, eq("8\n"));
    }
    #[parameterized(
        zero = { 0 },
        one = { 1 },
        mid = { 127 },
        almost_max = { 254 },
        max = { 255 },
    )]
    pub fn test_ldi_prn_prints_exactly_the_immediate(value: u8) {
        let (_emu, output, result) = run_program(&[LDI, 3, value, PRN, 3, HLT]);
        result.unwrap();
        assert_that!(output, eq(&format!("{value}\n")));
    }
    #[gtest]
    pub fn test_mult_scenario() {
        let program = [LDI, 0, 8, LDI, 1, 9, MUL, 0, 1, PRN, 0, HLT];
        let (emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("72\n"));
        expect_that!(emu.registers.get(0), eq(72));
        expect_that!(emu.registers.get(1), eq(9));
    }
    #[gtest]
    pub fn test_division_by_zero_scenario() {
        // R1 stays zero-initialized
        let program = [LDI, 0, 5, DIV, 0, 1, HLT];
        let (emu, output, result) = run_program(&program);
        let err = result.unwrap_err();
        expect_that!(err.to_string(), eq("Division by zero at address 0x03"));
        expect_that!(emu.registers.get(0), eq(5));
        expect_that!(output, eq(""));
    }
    #[gtest]
    pub fn test_unknown_instruction_reports_opcode_and_address() {
        let program = [NOP, 0b1111_1111, HLT];
        let (_emu, _output, result) = run_program(&program);
        let err = result.unwrap_err();
        expect_that!(
            err.to_string(),
            eq("Unknown instruction 0b11111111 at address 0x01")
        );
    }
    #[gtest]
    pub fn test_pra_prints_characters() {
        let program = [LDI, 0, b'L', PRA, 0, LDI, 0, b'S', PRA, 0, HLT];
        let (_emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("L\nS\n"));
    }
    #[gtest]
    pub fn test_ld_st_through_memory() {
        // store 77 at address 0x40, load it back into R3, print
        let program = [
            LDI, 0, 0x40, LDI, 1, 77, ST, 0, 1, LD, 3, 0, PRN, 3, HLT,
        ];
        let (emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("77\n"));
        expect_that!(emu.memory[0x40], eq(77));
    }
    #[gtest]
    pub fn test_push_pop_roundtrip() {
        let program = [LDI, 0, 42, PUSH, 0, LDI, 0, 0, POP, 1, PRN, 1, HLT];
        let (emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("42\n"));
        expect_that!(
            emu.registers.get(crate::hardware::registers::STACK_POINTER),
            eq(crate::hardware::registers::STACK_POINTER_INIT)
        );
    }
    #[gtest]
    pub fn test_call_ret_resumes_after_call() {
        // subroutine at address 10 sets R2 and returns
        let program = [
            LDI, 1, 10, // 0
            CALL, 1, // 3
            PRN, 2, // 5: resumes here
            HLT, // 7
            NOP, NOP, // 8
            LDI, 2, 7, // 10
            RET, // 13
        ];
        let (emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("7\n"));
        expect_that!(emu.registers.pc(), eq(7));
    }
    #[gtest]
    pub fn test_conditional_jump_taken_and_fallthrough() {
        // CMP equal -> JEQ taken (skips PRN 0), JNE falls through (prints 1)
        let program = [
            LDI, 0, 5, // 0..=2
            LDI, 1, 5, // 3..=5
            LDI, 2, 18, // 6..=8: target of JEQ
            CMP, 0, 1, // 9..=11
            JEQ, 2, // 12..=13
            PRN, 0, // 14..=15: skipped
            HLT, // 16
            NOP, // 17
            JNE, 2, // 18..=19: not taken, falls through
            LDI, 3, 1, // 20..=22
            PRN, 3, // 23..=24
            HLT, // 25
        ];
        let (_emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("1\n"));
    }
    #[gtest]
    pub fn test_jmp_unconditional() {
        let program = [
            LDI, 0, 8, // 0..=2
            JMP, 0, // 3..=4
            HLT, // 5: skipped
            NOP, NOP, // 6..=7
            LDI, 1, 3, // 8..=10
            PRN, 1, // 11..=12
            HLT, // 13
        ];
        let (_emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("3\n"));
    }
    #[gtest]
    pub fn test_interrupt_serviced_and_resumed() {
        let mut program = vec![0u8; 256];
        let main = [
            LDI, 5, 1, // 0..=2: IM bit 0
            LDI, 0, 0, // 3..=5: interrupt number
            INT, 0, // 6..=7
            LDI, 1, 11, // 8..=10: resumes here after the handler
            PRN, 1, // 11..=12
            HLT, // 13
        ];
        let handler = [
            LDI, 1, 99, // clobbers R1; IRET restores it
            PRN, 1, IRET,
        ];
        program[..main.len()].copy_from_slice(&main);
        program[0x20..0x20 + handler.len()].copy_from_slice(&handler);
        program[0xF8] = 0x20;
        let (emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("99\n11\n"));
        // IS bit cleared at entry, stack fully unwound
        expect_that!(emu.registers.get(INTERRUPT_STATUS), eq(0));
        expect_that!(
            emu.registers.get(crate::hardware::registers::STACK_POINTER),
            eq(crate::hardware::registers::STACK_POINTER_INIT)
        );
    }
    #[gtest]
    pub fn test_masked_interrupt_is_not_serviced() {
        // IM stays 0, so the raised interrupt is pending but never vectors
        let program = [
            LDI, 0, 0, // 0..=2
            INT, 0, // 3..=4
            LDI, 1, 7, // 5..=7
            PRN, 1, // 8..=9
            HLT, // 10
        ];
        let (emu, output, result) = run_program(&program);
        result.unwrap();
        expect_that!(output, eq("7\n"));
        expect_that!(emu.registers.get(INTERRUPT_STATUS), eq(0b0000_0001));
    }
    #[gtest]
    pub fn test_load_program_too_large() {
        let mut emu = Emulator::new();
        let program = vec![0x0u8; 257];
        let err = emu.load_program(&program).unwrap_err();
        expect_that!(
            err.to_string(),
            eq("Program too large, got 257 bytes while memory capacity is 256")
        );
        // failure committed nothing; a smaller retry works
        emu.load_program(&[HLT]).unwrap();
    }
    #[gtest]
    pub fn test_trace_format() {
        let mut emu = Emulator::new();
        emu.load_program(&[LDI, 0, 8, HLT]).unwrap();
        expect_that!(
            format!("{emu:?}"),
            eq("PC: 00 | 82 00 08 | 00 00 00 00 00 00 00 F4")
        );
    }

    #[gtest]
    pub fn test_parse_program_source() {
        let source = "\
# mult.ls8: print 8 * 9

10000010 # LDI R0,8
00000000
00001000
10000010 # LDI R1,9
00000001
00001001
10100010 # MUL R0,R1
00000000
00000001
01000111 # PRN R0
00000000
00000001 # HLT
";
        let program = parse_program_source(source).unwrap();
        expect_that!(
            program,
            eq(&vec![LDI, 0, 8, LDI, 1, 9, MUL, 0, 1, PRN, 0, HLT])
        );
    }
    #[gtest]
    pub fn test_demo_programs_run_clean() {
        for (source, expected) in [
            (include_str!("../../demos/print8.ls8"), "8\n"),
            (include_str!("../../demos/mult.ls8"), "72\n"),
            (include_str!("../../demos/stack.ls8"), "2\n1\n"),
            (include_str!("../../demos/call.ls8"), "42\n"),
        ] {
            let program = parse_program_source(source).unwrap();
            let (_emu, output, result) = run_program(&program);
            result.unwrap();
            assert_that!(output, eq(expected));
        }
    }
    #[gtest]
    pub fn test_parse_program_source_rejects_bad_token() {
        let err = parse_program_source("10000010\n\n2\n").unwrap_err();
        expect_that!(
            err.to_string(),
            eq("Line 3 is not an 8-bit binary pattern: \"2\"")
        );
    }
    #[gtest]
    pub fn test_parse_program_source_rejects_too_wide_token() {
        let err = parse_program_source("110000010\n").unwrap_err();
        expect_that!(
            err.to_string(),
            eq("Line 1 is not an 8-bit binary pattern: \"110000010\"")
        );
    }
}
