use basic64::mach::{Program, Runtime, Screen};
use basic64::{prg, term};
use clap::Parser;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::{Arc, Mutex};
use std::{env, fs};

/// Run a Commodore 64 BASIC V2 program in a terminal screen emulation.
#[derive(Parser, Debug)]
#[command(name = "basic64")]
#[command(version)]
#[command(about = "Commodore 64 BASIC V2 interpreter")]
struct Cli {
    /// BASIC program to run: plain text, or a PRG image with --prg
    program: PathBuf,

    /// Decode the file as a tokenized C64 PRG image
    #[arg(long)]
    prg: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let source = if cli.prg {
        let bytes = match fs::read(&cli.program) {
            Ok(bytes) => bytes,
            Err(e) => {
                eprintln!("error: cannot read {}: {}", cli.program.display(), e);
                return ExitCode::from(1);
            }
        };
        match prg::detokenize(&bytes) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("error: {}: {}", cli.program.display(), e);
                return ExitCode::from(1);
            }
        }
    } else {
        match fs::read_to_string(&cli.program) {
            Ok(source) => source,
            Err(e) => {
                eprintln!("error: cannot read {}: {}", cli.program.display(), e);
                return ExitCode::from(1);
            }
        }
    };

    let program = match Program::parse(&source) {
        Ok(program) => program,
        Err(e) => {
            eprintln!("?{}", e);
            return ExitCode::from(1);
        }
    };

    // SEED=n forces the RND sequence for reproducible runs
    let seed = env::var("SEED").ok().and_then(|s| s.parse::<u64>().ok());
    let screen = Arc::new(Mutex::new(Screen::new()));
    let mut runtime = Runtime::new(program, screen, seed);

    match term::run(&mut runtime) {
        Ok(term::Outcome::Finished) | Ok(term::Outcome::Quit) => ExitCode::SUCCESS,
        Ok(term::Outcome::Failed(e)) => {
            eprintln!("?{}", e);
            ExitCode::from(2)
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::from(2)
        }
    }
}
