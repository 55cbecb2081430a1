//! # LS-8 Emulator.
//!
//! `ls8-emulator` is an emulator of the LS-8, an 8-bit register machine with
//! 256 bytes of memory and 8 general-purpose registers.
//! Usage starts with loading a program image via `emulator::Emulator::load_program`,
//! then `run` executes it until a HLT instruction or a fatal fault.
//!
//!  # Example
//! ```
//! use ls8_emulator::emulator::Emulator;
//! let mut emu = Emulator::new();
//! // LDI R0,8; PRN R0; HLT
//! emu.load_program(&[0b1000_0010, 0, 8, 0b0100_0111, 0, 0b0000_0001]).unwrap();
//! let mut output = Vec::new();
//! emu.run(&mut output).unwrap();
//! assert_eq!(String::from_utf8(output).unwrap(), "8\n");
//! ```
//! # Errors
//! - Program image longer than the 256-byte memory
//! - Unknown instruction byte at the program counter
//! - Division or modulo by a zero source register

pub mod emulator;
pub mod errors;
pub(crate) mod hardware;
