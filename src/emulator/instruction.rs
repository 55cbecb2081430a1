//! LS-8 instruction encoding and decoding.
//!
//! An opcode byte has the layout `AABCDDDD`:
//! - `AA` (bits 7-6): number of operand bytes following the opcode (0-2)
//! - `B` (bit 5): set when the operation is carried out by the ALU
//! - `CDDDD`: operation number
use crate::hardware::registers::Flags;

/// The closed set of LS-8 opcodes, discriminants equal to the encoded byte.
/// `Opcode::n` turns a fetched byte back into a variant; a byte outside this
/// set is an unknown-instruction fault.
#[repr(u8)]
#[derive(enumn::N, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Opcode {
    Nop = 0b0000_0000,
    Hlt = 0b0000_0001,
    Ldi = 0b1000_0010,
    Ld = 0b1000_0011,
    St = 0b1000_0100,
    Push = 0b0100_0101,
    Pop = 0b0100_0110,
    Prn = 0b0100_0111,
    Pra = 0b0100_1000,
    // ALU
    Add = 0b1010_0000,
    Sub = 0b1010_0001,
    Mul = 0b1010_0010,
    Div = 0b1010_0011,
    Mod = 0b1010_0100,
    Inc = 0b0110_0101,
    Dec = 0b0110_0110,
    Cmp = 0b1010_0111,
    And = 0b1010_1000,
    Not = 0b0110_1001,
    Or = 0b1010_1010,
    Xor = 0b1010_1011,
    Shl = 0b1010_1100,
    Shr = 0b1010_1101,
    // PC mutators
    Call = 0b0101_0000,
    Ret = 0b0001_0001,
    Int = 0b0101_0010,
    Iret = 0b0001_0011,
    Jmp = 0b0101_0100,
    Jeq = 0b0101_0101,
    Jne = 0b0101_0110,
    Jgt = 0b0101_0111,
    Jlt = 0b0101_1000,
    Jle = 0b0101_1001,
    Jge = 0b0101_1010,
}

impl Opcode {
    /// Number of operand bytes following this opcode in memory.
    #[must_use]
    pub const fn operand_count(self) -> u8 {
        (self as u8) >> 6
    }
    /// Total width of the instruction, the default PC advance.
    #[must_use]
    pub const fn width(self) -> u8 {
        1 + self.operand_count()
    }
    #[must_use]
    pub const fn is_alu(self) -> bool {
        (self as u8) & 0b0010_0000 != 0
    }
}

/// ALU operations over a destination and a source register.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryAluOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
    Cmp,
    And,
    Or,
    Xor,
    Shl,
    Shr,
}

/// ALU operations over the destination register only.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryAluOp {
    Inc,
    Dec,
    Not,
}

/// Flag condition a conditional jump branches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchCondition {
    Equal,
    NotEqual,
    Greater,
    Less,
    LessOrEqual,
    GreaterOrEqual,
}

impl BranchCondition {
    pub(crate) const fn taken(self, flags: Flags) -> bool {
        match self {
            Self::Equal => flags.is_equal(),
            Self::NotEqual => !flags.is_equal(),
            Self::Greater => flags.is_greater(),
            Self::Less => flags.is_less(),
            Self::LessOrEqual => flags.is_less() || flags.is_equal(),
            Self::GreaterOrEqual => flags.is_greater() || flags.is_equal(),
        }
    }
}

/// A decoded instruction: each variant carries exactly the operands its
/// operation consumes. Register indexes are masked to 3 bits here, which is
/// what lets `Registers::get`/`set` treat out-of-range indexes as internal
/// bugs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Instruction {
    Nop,
    Hlt,
    /// Set `register` to the immediate `value`.
    Ldi { register: u8, value: u8 },
    /// Load `register` from the memory cell addressed by `address_register`.
    Ld { register: u8, address_register: u8 },
    /// Store `register` into the memory cell addressed by `address_register`.
    St { address_register: u8, register: u8 },
    Push { register: u8 },
    Pop { register: u8 },
    /// Print the register value as a decimal line.
    Prn { register: u8 },
    /// Print the register value as a character line.
    Pra { register: u8 },
    Binary { op: BinaryAluOp, dst: u8, src: u8 },
    Unary { op: UnaryAluOp, dst: u8 },
    /// Jump to the address held in `register`.
    Jmp { register: u8 },
    /// Conditional jump to the address held in `register`.
    Branch { condition: BranchCondition, register: u8 },
    Call { register: u8 },
    Ret,
    /// Raise the interrupt numbered by the value in `register`.
    Int { register: u8 },
    Iret,
}

const fn reg(operand: u8) -> u8 {
    operand & 0b111
}

impl Instruction {
    /// Decodes an opcode and the two bytes following it in memory. Operand
    /// bytes beyond `opcode.operand_count()` are ignored.
    #[must_use]
    pub const fn decode(opcode: Opcode, a: u8, b: u8) -> Self {
        match opcode {
            Opcode::Nop => Self::Nop,
            Opcode::Hlt => Self::Hlt,
            Opcode::Ldi => Self::Ldi { register: reg(a), value: b },
            Opcode::Ld => Self::Ld { register: reg(a), address_register: reg(b) },
            Opcode::St => Self::St { address_register: reg(a), register: reg(b) },
            Opcode::Push => Self::Push { register: reg(a) },
            Opcode::Pop => Self::Pop { register: reg(a) },
            Opcode::Prn => Self::Prn { register: reg(a) },
            Opcode::Pra => Self::Pra { register: reg(a) },
            Opcode::Add => Self::binary(BinaryAluOp::Add, a, b),
            Opcode::Sub => Self::binary(BinaryAluOp::Sub, a, b),
            Opcode::Mul => Self::binary(BinaryAluOp::Mul, a, b),
            Opcode::Div => Self::binary(BinaryAluOp::Div, a, b),
            Opcode::Mod => Self::binary(BinaryAluOp::Mod, a, b),
            Opcode::Cmp => Self::binary(BinaryAluOp::Cmp, a, b),
            Opcode::And => Self::binary(BinaryAluOp::And, a, b),
            Opcode::Or => Self::binary(BinaryAluOp::Or, a, b),
            Opcode::Xor => Self::binary(BinaryAluOp::Xor, a, b),
            Opcode::Shl => Self::binary(BinaryAluOp::Shl, a, b),
            Opcode::Shr => Self::binary(BinaryAluOp::Shr, a, b),
            Opcode::Inc => Self::Unary { op: UnaryAluOp::Inc, dst: reg(a) },
            Opcode::Dec => Self::Unary { op: UnaryAluOp::Dec, dst: reg(a) },
            Opcode::Not => Self::Unary { op: UnaryAluOp::Not, dst: reg(a) },
            Opcode::Jmp => Self::Jmp { register: reg(a) },
            Opcode::Jeq => Self::branch(BranchCondition::Equal, a),
            Opcode::Jne => Self::branch(BranchCondition::NotEqual, a),
            Opcode::Jgt => Self::branch(BranchCondition::Greater, a),
            Opcode::Jlt => Self::branch(BranchCondition::Less, a),
            Opcode::Jle => Self::branch(BranchCondition::LessOrEqual, a),
            Opcode::Jge => Self::branch(BranchCondition::GreaterOrEqual, a),
            Opcode::Call => Self::Call { register: reg(a) },
            Opcode::Ret => Self::Ret,
            Opcode::Int => Self::Int { register: reg(a) },
            Opcode::Iret => Self::Iret,
        }
    }
    const fn binary(op: BinaryAluOp, a: u8, b: u8) -> Self {
        Self::Binary { op, dst: reg(a), src: reg(b) }
    }
    const fn branch(condition: BranchCondition, a: u8) -> Self {
        Self::Branch { condition, register: reg(a) }
    }
}
