use thiserror::Error;

/// Errors producing or loading a program image, before execution starts.
#[derive(Error, Debug)]
pub enum LoadProgramError {
    #[error("Program too large, got {actual_bytes:?} bytes while memory capacity is {capacity:?}")]
    ProgramTooLarge { actual_bytes: usize, capacity: usize },
    #[error("Line {line_number:?} is not an 8-bit binary pattern: {token:?}")]
    InvalidSourceLine { line_number: usize, token: String },
}

/// Fatal faults during execution. `Emulator::run` returning one of these
/// means the machine transitioned to HALTED mid-program; a clean HLT is `Ok`.
#[derive(Error, Debug)]
pub enum ExecutionError {
    #[error("Unknown instruction 0b{opcode:08b} at address 0x{address:02X}")]
    UnknownInstruction { opcode: u8, address: u8 },
    #[error("Division by zero at address 0x{address:02X}")]
    DivisionByZero { address: u8 },
    #[error("Modulo by zero at address 0x{address:02X}")]
    ModuloByZero { address: u8 },
    #[error("Error writing program output: {0}")]
    Output(#[from] std::io::Error),
}
