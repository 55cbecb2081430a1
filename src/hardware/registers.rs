/// R7 doubles as the stack pointer.
pub const STACK_POINTER: u8 = 7;
/// R6 holds the interrupt status bits (IS).
pub const INTERRUPT_STATUS: u8 = 6;
/// R5 holds the interrupt mask bits (IM).
pub const INTERRUPT_MASK: u8 = 5;
/// Initial stack pointer, one past the top of the downward-growing stack.
pub const STACK_POINTER_INIT: u8 = 0xF4;

pub struct Registers {
    general_purpose: [u8; 8],
    pc: u8,
    flags: Flags,
}

impl Registers {
    pub const fn new() -> Self {
        let mut general_purpose = [0u8; 8];
        general_purpose[STACK_POINTER as usize] = STACK_POINTER_INIT;
        Self {
            general_purpose,
            pc: 0,
            flags: Flags::new(),
        }
    }

    pub fn get(&self, r: u8) -> u8 {
        assert!(r <= 7, "Invalid general purpose register get");
        self.general_purpose[usize::from(r)]
    }
    pub fn set(&mut self, r: u8, value: u8) {
        assert!(r <= 7, "Invalid general purpose register set");
        self.general_purpose[usize::from(r)] = value;
    }

    pub const fn pc(&self) -> u8 {
        self.pc
    }
    pub const fn set_pc(&mut self, address: u8) {
        self.pc = address;
    }

    pub const fn flags(&self) -> Flags {
        self.flags
    }
    pub const fn set_flags(&mut self, flags: Flags) {
        self.flags = flags;
    }
}

/// Comparison outcome of the most recent CMP, consumed by conditional jumps.
/// Packs to `0b0000_0LGE` when saved on the stack during interrupt entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flags {
    None,
    Equal,
    Greater,
    Less,
}

impl Flags {
    const EQUAL_BIT: u8 = 1 << 0;
    const GREATER_BIT: u8 = 1 << 1;
    const LESS_BIT: u8 = 1 << 2;

    /// No CMP executed yet; every conditional jump falls through.
    pub const fn new() -> Self {
        Self::None
    }
    pub fn compare(a: u8, b: u8) -> Self {
        match a.cmp(&b) {
            std::cmp::Ordering::Equal => Self::Equal,
            std::cmp::Ordering::Greater => Self::Greater,
            std::cmp::Ordering::Less => Self::Less,
        }
    }

    pub const fn is_equal(self) -> bool {
        matches!(self, Self::Equal)
    }
    pub const fn is_greater(self) -> bool {
        matches!(self, Self::Greater)
    }
    pub const fn is_less(self) -> bool {
        matches!(self, Self::Less)
    }

    pub const fn to_bits(self) -> u8 {
        match self {
            Self::None => 0,
            Self::Equal => Self::EQUAL_BIT,
            Self::Greater => Self::GREATER_BIT,
            Self::Less => Self::LESS_BIT,
        }
    }
    pub const fn from_bits(bits: u8) -> Self {
        // CMP sets exactly one bit; anything else decodes as no comparison
        match bits {
            Self::EQUAL_BIT => Self::Equal,
            Self::GREATER_BIT => Self::Greater,
            Self::LESS_BIT => Self::Less,
            _ => Self::None,
        }
    }
}
