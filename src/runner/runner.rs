use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use std::{fs, process};

use encoding_rs::UTF_8;
use encoding_rs_io::DecodeReaderBytesBuilder;
use log::error;

use crate::interpreter::Interpreter;

pub static HAD_ERROR: AtomicBool = AtomicBool::new(false);
pub static HAD_RUNTIME_ERROR: AtomicBool = AtomicBool::new(false);

/// Reads and runs a whole script file, then exits with the conventional
/// `sysexits.h` codes: 65 for a malformed program, 70 for a runtime error
/// that surfaced during evaluation.
pub fn run_file(path: &str) {
    let raw = fs::read(path).unwrap_or_else(|err| {
        error!("could not read {path}: {err}");
        process::exit(74);
    });

    // Scripts aren't guaranteed to be UTF-8 on disk; transcode defensively
    // rather than lossily truncating on the first invalid byte.
    let mut decoder = DecodeReaderBytesBuilder::new()
        .encoding(Some(UTF_8))
        .build(raw.as_slice());
    let mut source = String::new();
    if let Err(err) = decoder.read_to_string(&mut source) {
        error!("could not decode {path}: {err}");
        process::exit(74);
    }

    run(&source);

    if HAD_ERROR.load(Ordering::Relaxed) {
        process::exit(65);
    }
    if HAD_RUNTIME_ERROR.load(Ordering::Relaxed) {
        process::exit(70);
    }
}

/// A line-at-a-time REPL. Bindings persist across lines by sharing one
/// environment for the whole session — each line is still lexed, parsed,
/// and evaluated independently.
pub fn run_prompt() {
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let env = Interpreter::new_environment();

    loop {
        print!(">> ");
        stdout.flush().unwrap();

        let mut line = String::new();
        let bytes_read = stdin.read_line(&mut line).unwrap();
        if bytes_read == 0 {
            println!();
            break;
        }

        if line.trim().is_empty() {
            continue;
        }

        match Interpreter::evaluate_in(&line, &env) {
            Ok(value) => println!("{}", value.inspect()),
            Err(errors) => {
                for message in errors {
                    println!("\t{message}");
                }
            }
        }

        HAD_ERROR.store(false, Ordering::Relaxed);
    }
}

fn run(source: &str) {
    match Interpreter::evaluate(source) {
        Ok(value) => {
            if value.is_error() {
                error!("{}", value.inspect());
                HAD_RUNTIME_ERROR.store(true, Ordering::Relaxed);
            } else {
                println!("{}", value.inspect());
            }
        }
        Err(errors) => {
            HAD_ERROR.store(true, Ordering::Relaxed);
            for message in errors {
                eprintln!("{message}");
            }
        }
    }
}
