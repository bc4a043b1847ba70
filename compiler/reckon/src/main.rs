//! Reckon CLI
//!
//! Runs worksheets from the command line.

use reckon::commands::{check_file, chunks_file, doctest_file, lex_file, run_file};
use reckon::{init_tracing, parse_sheet_options, SheetOptions};
use reckon_eval::DEFAULT_RECURSION_LIMIT;

fn main() {
    init_tracing();
    let args: Vec<String> = std::env::args().collect();

    if args.len() < 2 {
        print_usage();
        return;
    }

    let command = &args[1];

    match command.as_str() {
        "run" => run_file(&sheet_options("run", &args[2..])),
        "check" => check_file(&sheet_options("check", &args[2..])),
        "chunks" => chunks_file(&sheet_options("chunks", &args[2..])),
        "doctest" => doctest_file(&sheet_options("doctest", &args[2..])),
        "lex" => {
            if args.len() < 3 {
                eprintln!("Usage: reckon lex <file>");
                std::process::exit(1);
            }
            lex_file(&args[2]);
        }
        "help" | "--help" | "-h" => print_usage(),
        "version" | "--version" | "-V" => {
            println!("reckon {}", env!("CARGO_PKG_VERSION"));
        }
        _ => {
            eprintln!("Unknown command: {command}");
            eprintln!();
            print_usage();
            std::process::exit(1);
        }
    }
}

/// Parse the options of a worksheet command, exiting with its usage on error.
fn sheet_options(command: &str, args: &[String]) -> SheetOptions {
    let options = match parse_sheet_options(args) {
        Ok(options) => options,
        Err(err) => {
            eprintln!("error: {err}");
            print_command_usage(command);
            std::process::exit(1);
        }
    };
    if options.path.is_none() {
        eprintln!("error: missing file path");
        print_command_usage(command);
        std::process::exit(1);
    }
    options
}

fn print_command_usage(command: &str) {
    eprintln!("Usage: reckon {command} <file> [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --background, -b        Calculate on a worker thread");
    eprintln!("  --recursion-limit <n>   Maximum call depth (default: {DEFAULT_RECURSION_LIMIT})");
}

fn print_usage() {
    println!("Reckon (incremental worksheets)");
    println!();
    println!("Usage: reckon <command> [options]");
    println!();
    println!("Commands:");
    println!("  run <file>        Calculate a worksheet and print it with results");
    println!("  check <file>      Compile every statement and report syntax errors");
    println!("  chunks <file>     Show how a worksheet is split into chunks");
    println!("  doctest <file>    Print a calculated worksheet as doctest input");
    println!("  lex <file>        Tokenize and display tokens");
    println!("  help              Show this help message");
    println!("  version           Show version information");
    println!();
    println!("Worksheet options:");
    println!("  --background, -b        Calculate on a worker thread");
    println!("  --recursion-limit <n>   Maximum call depth (default: {DEFAULT_RECURSION_LIMIT})");
    println!();
    println!("Logging:");
    println!("  RUST_LOG=<filter>       Enable tracing output on stderr");
    println!("  RECKON_LOG_TREE=1       Print spans as an indented tree");
}
