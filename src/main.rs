use std::env;
use std::fs;
use std::process;

use pl0c::codegen::instruction::render_code_file;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: pl0c <file.pl0> [-o <output>]");
        process::exit(1);
    }

    let output_path = parse_output_flag(&args);

    let source = fs::read_to_string(&args[1]).unwrap_or_else(|err| {
        eprintln!("Failed to read file: {}", err);
        process::exit(1);
    });

    let program = pl0c::compile_source(&source).unwrap_or_else(|err| {
        eprintln!("{}", err);
        process::exit(1);
    });

    let listing = render_code_file(&program.code);
    match output_path {
        Some(path) => {
            if let Err(err) = fs::write(&path, listing) {
                eprintln!("Failed to write {}: {}", path, err);
                process::exit(1);
            }
        }
        None => print!("{}", listing),
    }
}

fn parse_output_flag(args: &[String]) -> Option<String> {
    args.iter()
        .position(|a| a == "-o")
        .and_then(|i| args.get(i + 1))
        .cloned()
}
