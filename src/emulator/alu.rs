//! The arithmetic-logic unit: pure integer operations over register values,
//! everything wrapping modulo 256.
use crate::emulator::instruction::{BinaryAluOp, UnaryAluOp};
use crate::errors::ExecutionError;
use crate::hardware::registers::{Flags, Registers};

/// Applies a two-register ALU operation, mutating the destination register
/// in place (CMP mutates only the flags). `address` is the address of the
/// executing instruction, reported on a fault.
///
/// # Errors
/// - Division or modulo by a zero source register; the destination register
///   is left untouched.
pub(crate) fn binary(
    op: BinaryAluOp,
    r: &mut Registers,
    dst: u8,
    src: u8,
    address: u8,
) -> Result<(), ExecutionError> {
    let a = r.get(dst);
    let b = r.get(src);
    let result = match op {
        BinaryAluOp::Add => a.wrapping_add(b),
        BinaryAluOp::Sub => a.wrapping_sub(b),
        BinaryAluOp::Mul => a.wrapping_mul(b),
        BinaryAluOp::Div => {
            if b == 0 {
                return Err(ExecutionError::DivisionByZero { address });
            }
            a / b
        }
        BinaryAluOp::Mod => {
            if b == 0 {
                return Err(ExecutionError::ModuloByZero { address });
            }
            a % b
        }
        BinaryAluOp::Cmp => {
            r.set_flags(Flags::compare(a, b));
            return Ok(());
        }
        BinaryAluOp::And => a & b,
        BinaryAluOp::Or => a | b,
        BinaryAluOp::Xor => a ^ b,
        // shifted-out bits are discarded; shifting by 8 or more empties the register
        BinaryAluOp::Shl => a.checked_shl(u32::from(b)).unwrap_or(0),
        BinaryAluOp::Shr => a.checked_shr(u32::from(b)).unwrap_or(0),
    };
    r.set(dst, result);
    Ok(())
}

/// Applies a single-register ALU operation, mutating the register in place.
pub(crate) fn unary(op: UnaryAluOp, r: &mut Registers, dst: u8) {
    let a = r.get(dst);
    let result = match op {
        UnaryAluOp::Inc => a.wrapping_add(1),
        UnaryAluOp::Dec => a.wrapping_sub(1),
        UnaryAluOp::Not => !a,
    };
    r.set(dst, result);
}
