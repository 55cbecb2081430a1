use ls8_emulator::emulator::{self, Emulator};
use std::error::Error;
use std::io::Write;
use std::process::ExitCode;
use std::{env, fs, io};

fn main() -> ExitCode {
    let Some(path) = env::args().nth(1) else {
        eprintln!("usage: ls8-emulator <program.ls8>");
        return ExitCode::from(2);
    };
    match load_and_run(&path, &mut io::stdout().lock()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn load_and_run(path: &str, output: &mut impl Write) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(path)?;
    let program = emulator::parse_program_source(&source)?;
    let mut emu = Emulator::new();
    emu.load_program(&program)?;
    emu.run(output)?;
    Ok(())
}
