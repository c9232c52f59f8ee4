//! Ansiloom Dump
//!
//! A headless runner for testing and automation. Reads escape-laden text
//! from stdin or a file, runs it through a console buffer, and prints the
//! resulting state as plain text or a JSON snapshot.

use std::io::{self, Read};
use std::process::ExitCode;

use ansiloom::buffer::ConsoleBuffer;
use ansiloom::core::VecMirror;

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

fn main() -> ExitCode {
    // Initialize logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let args: Vec<String> = std::env::args().collect();

    // Parse command line arguments
    let mut input_file: Option<String> = None;
    let mut output_format = OutputFormat::Text;
    let mut show_help = false;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-f" | "--file" => {
                i += 1;
                if i < args.len() {
                    input_file = Some(args[i].clone());
                }
            }
            "-j" | "--json" => {
                output_format = OutputFormat::Json;
            }
            "-t" | "--text" => {
                output_format = OutputFormat::Text;
            }
            "-h" | "--help" => {
                show_help = true;
            }
            _ => {
                // Treat as input file if no flag
                if input_file.is_none() && !args[i].starts_with('-') {
                    input_file = Some(args[i].clone());
                }
            }
        }
        i += 1;
    }

    if show_help {
        print_help();
        return ExitCode::SUCCESS;
    }

    // Read input
    let input = match &input_file {
        Some(path) => match std::fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) => {
                eprintln!("Error reading file '{}': {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => {
            // Read from stdin
            let mut text = String::new();
            if let Err(e) = io::stdin().read_to_string(&mut text) {
                eprintln!("Error reading stdin: {}", e);
                return ExitCode::FAILURE;
            }
            text
        }
    };

    // Process input
    let mut buffer = ConsoleBuffer::<VecMirror>::new();
    buffer.process(&input);
    let snapshot = buffer.snapshot();

    // Output result
    match output_format {
        OutputFormat::Text => {
            println!("Buffer state ({} lines):", snapshot.lines.len());
            println!("Cursor: ({}, {})", snapshot.cursor.row, snapshot.cursor.column);
            println!("---");
            println!("{}", snapshot.to_text());
            println!("---");
        }
        OutputFormat::Json => match snapshot.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing snapshot: {}", e);
                return ExitCode::FAILURE;
            }
        },
    }

    ExitCode::SUCCESS
}

#[derive(Clone, Copy)]
enum OutputFormat {
    Text,
    Json,
}

fn print_help() {
    println!("Ansiloom Dump");
    println!();
    println!("Usage: ansiloom-dump [OPTIONS] [INPUT_FILE]");
    println!();
    println!("Options:");
    println!("  -f, --file <PATH>  Read input from file");
    println!("  -j, --json         Output snapshot as JSON");
    println!("  -t, --text         Output snapshot as text (default)");
    println!("  -h, --help         Show this help message");
    println!();
    println!("If no input file is specified, reads from stdin.");
    println!();
    println!("Examples:");
    println!("  printf 'Hello \\x1b[31mWorld\\x1b[0m' | ansiloom-dump");
    println!("  ansiloom-dump --json session.log > snapshot.json");
}
