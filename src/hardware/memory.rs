use crate::errors::LoadProgramError;
use std::fmt::{Debug, Formatter};
use std::ops::{Index, IndexMut};

/// Number of addressable cells. Addresses are `u8`, so every address a
/// program can name is valid by construction.
pub const MEMORY_SIZE: usize = 256;

/// The flat byte-addressable LS-8 memory, holding program, data and stack.
pub struct Memory {
    /// Index equals memory address
    data: [u8; MEMORY_SIZE],
    program_len: usize,
}

impl Debug for Memory {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let slice = self.program_slice();
        write!(
            f,
            "Program bytes: {:?}, contents: {slice:?}",
            slice.len()
        )
    }
}

impl Index<u8> for Memory {
    type Output = u8;
    fn index(&self, index: u8) -> &Self::Output {
        &self.data[usize::from(index)]
    }
}
impl IndexMut<u8> for Memory {
    fn index_mut(&mut self, index: u8) -> &mut Self::Output {
        &mut self.data[usize::from(index)]
    }
}

impl Memory {
    pub const fn new() -> Self {
        Self {
            data: [0x0u8; MEMORY_SIZE],
            program_len: 0,
        }
    }
    /// Writes a program image into memory starting at address 0.
    ///
    /// # Errors
    /// - Program too large; memory is left unmodified, so the caller can
    ///   retry with a smaller image.
    pub fn load_program(&mut self, program: &[u8]) -> Result<(), LoadProgramError> {
        if program.len() > MEMORY_SIZE {
            return Err(LoadProgramError::ProgramTooLarge {
                actual_bytes: program.len(),
                capacity: MEMORY_SIZE,
            });
        }
        self.program_len = program.len();
        self.data[..program.len()].copy_from_slice(program);
        Ok(())
    }
    pub fn program_slice(&self) -> &[u8] {
        &self.data[..self.program_len]
    }
}
