use std::env;
use std::fs;
use std::process;

use pl0c::codegen::instruction::{parse_code_file, Instruction, Opcode};
use pl0c::trace::{TextTrace, Trace};
use pl0c::vm::VirtualMachine;

fn main() {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: pl0vm <code-file> [--input <file>] [--trace]");
        process::exit(1);
    }

    let code_text = fs::read_to_string(&args[1]).unwrap_or_else(|err| {
        eprintln!("Failed to read {}: {}", args[1], err);
        process::exit(1);
    });
    let code = parse_code_file(&code_text).unwrap_or_else(|err| {
        eprintln!("Malformed code file: {}", err);
        process::exit(1);
    });

    let input = read_input(&args);
    let mut vm = VirtualMachine::new(code, input);

    if args.iter().any(|a| a == "--trace") {
        run_with_trace(&mut vm);
    } else {
        match vm.run() {
            Ok(result) => {
                for value in result.output {
                    print!("{}", value);
                }
                println!();
            }
            Err(fault) => {
                eprintln!("{}", fault);
                process::exit(1);
            }
        }
    }
}

fn read_input(args: &[String]) -> Vec<i32> {
    let path = args
        .iter()
        .position(|a| a == "--input")
        .and_then(|i| args.get(i + 1));
    match path {
        Some(path) => fs::read_to_string(path)
            .unwrap_or_else(|err| {
                eprintln!("Failed to read {}: {}", path, err);
                process::exit(1);
            })
            .split_whitespace()
            .map(|tok| {
                tok.parse().unwrap_or_else(|_| {
                    eprintln!("Invalid integer in input file: {}", tok);
                    process::exit(1);
                })
            })
            .collect(),
        None => Vec::new(),
    }
}

fn run_with_trace(vm: &mut VirtualMachine) {
    let mut trace = TextTrace::new(std::io::stdout());
    loop {
        let addr = vm.pc();
        let word = vm.peek();
        match vm.step() {
            Ok(true) => {
                let word = word.expect("step succeeded, so an instruction was fetched");
                let op = Opcode::from_u8(word.op).expect("step validated this opcode");
                let ins = Instruction::new(op, word.r, word.l, word.m);
                trace.step(addr, ins, vm).expect("write to stdout");
            }
            Ok(false) => {
                trace.halted(vm).expect("write to stdout");
                break;
            }
            Err(fault) => {
                trace.fault(&fault).expect("write to stdout");
                process::exit(1);
            }
        }
    }
}
