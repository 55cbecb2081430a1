use crate::emulator::Emulator;
use crate::errors::ExecutionError;

/// Loads and runs a program against a captured output sink, returning the
/// final machine state, the collected output and the termination result.
pub fn run_program(program: &[u8]) -> (Emulator, String, Result<(), ExecutionError>) {
    let mut emu = Emulator::new();
    emu.load_program(program).expect("program fits into memory");
    let mut output = Vec::with_capacity(120);
    let result = emu.run(&mut output);
    let output = String::from_utf8(output).expect("PRN/PRA output is valid UTF-8");
    (emu, output, result)
}
