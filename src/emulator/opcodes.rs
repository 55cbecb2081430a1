//! Non-ALU instruction handlers.
//!
//! Each handler performs one instruction's effect on the hardware and
//! returns the [`Flow`] outcome the run loop applies to the program counter.
use crate::emulator::Flow;
use crate::emulator::instruction::BranchCondition;
use crate::errors::ExecutionError;
use crate::hardware::memory::Memory;
use crate::hardware::registers::{INTERRUPT_STATUS, Registers, STACK_POINTER};
use std::io::Write;

/// LDI: set a register to an immediate value.
/// ```text
/// 10000010 LDI register immediate
/// ```
pub(crate) fn ldi(register: u8, value: u8, r: &mut Registers) -> Flow {
    r.set(register, value);
    Flow::Advance
}

/// LD: load a register from the memory cell addressed by another register.
/// ```text
/// 10000011 LD register address_register
/// ```
pub(crate) fn ld(register: u8, address_register: u8, r: &mut Registers, m: &Memory) -> Flow {
    let value = m[r.get(address_register)];
    r.set(register, value);
    Flow::Advance
}

/// ST: store a register into the memory cell addressed by another register.
/// ```text
/// 10000100 ST address_register register
/// ```
pub(crate) fn st(address_register: u8, register: u8, r: &Registers, m: &mut Memory) -> Flow {
    m[r.get(address_register)] = r.get(register);
    Flow::Advance
}

/// PRN: print the register value as a decimal line on the output sink.
/// ```text
/// 01000111 PRN register
/// ```
pub(crate) fn prn(
    register: u8,
    r: &Registers,
    output: &mut impl Write,
) -> Result<Flow, ExecutionError> {
    writeln!(output, "{}", r.get(register))?;
    Ok(Flow::Advance)
}

/// PRA: print the register value as a character line on the output sink.
/// ```text
/// 01001000 PRA register
/// ```
pub(crate) fn pra(
    register: u8,
    r: &Registers,
    output: &mut impl Write,
) -> Result<Flow, ExecutionError> {
    writeln!(output, "{}", char::from(r.get(register)))?;
    Ok(Flow::Advance)
}

/// PUSH: decrement the stack pointer, then write the register value there.
/// ```text
/// 01000101 PUSH register
/// ```
pub(crate) fn push(register: u8, r: &mut Registers, m: &mut Memory) -> Flow {
    push_byte(r.get(register), r, m);
    Flow::Advance
}

/// POP: read the value at the stack pointer into the register, then
/// increment the stack pointer.
/// ```text
/// 01000110 POP register
/// ```
pub(crate) fn pop(register: u8, r: &mut Registers, m: &Memory) -> Flow {
    let value = pop_byte(r, m);
    r.set(register, value);
    Flow::Advance
}

/// JMP: jump to the address held in the register.
/// ```text
/// 01010100 JMP register
/// ```
pub(crate) fn jmp(register: u8, r: &Registers) -> Flow {
    Flow::Jump(r.get(register))
}

/// JEQ/JNE/JGT/JLT/JLE/JGE: jump to the address held in the register when
/// the flags from the most recent CMP satisfy the condition, otherwise fall
/// through.
/// ```text
/// 010101cc Jcc register
/// ```
pub(crate) fn branch(condition: BranchCondition, register: u8, r: &Registers) -> Flow {
    if condition.taken(r.flags()) {
        Flow::Jump(r.get(register))
    } else {
        Flow::Advance
    }
}

/// CALL: push the address of the next instruction, then jump to the address
/// held in the register.
/// ```text
/// 01010000 CALL register
/// ```
pub(crate) fn call(register: u8, return_address: u8, r: &mut Registers, m: &mut Memory) -> Flow {
    push_byte(return_address, r, m);
    Flow::Jump(r.get(register))
}

/// RET: pop the return address into the program counter.
/// ```text
/// 00010001 RET
/// ```
pub(crate) fn ret(r: &mut Registers, m: &Memory) -> Flow {
    Flow::Jump(pop_byte(r, m))
}

/// INT: raise the interrupt numbered by the register value by setting that
/// bit in the interrupt status register R6. Servicing happens between
/// instruction steps, in the run loop.
/// ```text
/// 01010010 INT register
/// ```
pub(crate) fn int(register: u8, r: &mut Registers) -> Flow {
    let number = r.get(register) & 0b111;
    let status = r.get(INTERRUPT_STATUS) | 1 << number;
    r.set(INTERRUPT_STATUS, status);
    Flow::Advance
}

pub(crate) fn push_byte(value: u8, r: &mut Registers, m: &mut Memory) {
    let sp = r.get(STACK_POINTER).wrapping_sub(1);
    r.set(STACK_POINTER, sp);
    m[sp] = value;
}

pub(crate) fn pop_byte(r: &mut Registers, m: &Memory) -> u8 {
    let sp = r.get(STACK_POINTER);
    let value = m[sp];
    r.set(STACK_POINTER, sp.wrapping_add(1));
    value
}
