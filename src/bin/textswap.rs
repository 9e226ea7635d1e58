//! Replace text in documents from the command line.
//!
//! Usage:
//!   textswap <old-text> <new-text> <file>...
//!
//! ZIP inputs run through the archive batch pipeline; everything else is
//! dispatched by extension. Each input gets one result line; the exit code
//! is non-zero if any input failed.

use std::path::PathBuf;
use std::process::ExitCode;

use textswap::{is_archive, replace_in_archive, replace_in_file, ReplacementSpec};

fn main() -> ExitCode {
    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.len() < 3 {
        eprintln!("Usage: textswap <old-text> <new-text> <file>...");
        return ExitCode::from(2);
    }

    let spec = match ReplacementSpec::new(args[0].clone(), args[1].clone()) {
        Ok(spec) => spec,
        Err(error) => {
            eprintln!("Error: {error}");
            return ExitCode::from(2);
        }
    };

    let mut failures = 0usize;
    for raw in &args[2..] {
        let path = PathBuf::from(raw);
        let outcome = if is_archive(&path) {
            replace_in_archive(&path, &spec).map(|result| result.map(|file| file.output_path))
        } else {
            replace_in_file(&path, &spec).map(|file| Some(file.output_path))
        };
        match outcome {
            Ok(Some(output)) => println!("{} -> {}", path.display(), output.display()),
            Ok(None) => println!("{} -> no supported content", path.display()),
            Err(error) => {
                eprintln!("{}: {}", path.display(), error);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
