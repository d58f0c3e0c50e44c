use super::*;

fn run(code: Vec<Instruction>, input: Vec<i32>) -> ExecutionResult {
    VirtualMachine::from_compiled(&code, input)
        .run()
        .expect("expected clean halt")
}

#[test]
fn literal_and_write() {
    // begin write 5 end. (no variables, flat header only)
    let code = vec![
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Lit, 0, 0, 5),
        Instruction::new(Opcode::SioWrite, 0, 0, 1),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let result = run(code, vec![]);
    assert_eq!(result.output, vec![5]);
}

#[test]
fn arithmetic_combines_two_registers() {
    // write (3 + 4) * 2 = 14
    let code = vec![
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Lit, 0, 0, 3),
        Instruction::new(Opcode::Lit, 1, 0, 4),
        Instruction::new(Opcode::Add, 0, 0, 1),
        Instruction::new(Opcode::Lit, 1, 0, 2),
        Instruction::new(Opcode::Mul, 0, 0, 1),
        Instruction::new(Opcode::SioWrite, 0, 0, 1),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let result = run(code, vec![]);
    assert_eq!(result.output, vec![14]);
}

#[test]
fn read_then_write_round_trips_input() {
    let code = vec![
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Inc, 0, 0, 1), // var x at address 4
        Instruction::new(Opcode::SioRead, 0, 0, 2),
        Instruction::new(Opcode::Sto, 0, 0, 4),
        Instruction::new(Opcode::Lod, 0, 0, 4),
        Instruction::new(Opcode::SioWrite, 0, 0, 1),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let result = run(code, vec![42]);
    assert_eq!(result.output, vec![42]);
}

#[test]
fn while_loop_writes_once_per_iteration() {
    // var x := 0; while x < 3 do (write x; x := x + 1) end.
    let code = vec![
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Inc, 0, 0, 1), // x at 4
        Instruction::new(Opcode::Lit, 0, 0, 0),
        Instruction::new(Opcode::Sto, 0, 0, 4), // x := 0
        // loop top (index 4):
        Instruction::new(Opcode::Lod, 0, 0, 4),
        Instruction::new(Opcode::Lit, 1, 0, 3),
        Instruction::new(Opcode::Lss, 0, 0, 1), // x < 3
        Instruction::new(Opcode::Jpc, 0, 0, 15), // exit if false -> index 15 (SIO_HALT)
        Instruction::new(Opcode::Lod, 0, 0, 4),
        Instruction::new(Opcode::SioWrite, 0, 0, 1),
        Instruction::new(Opcode::Lod, 0, 0, 4),
        Instruction::new(Opcode::Lit, 1, 0, 1),
        Instruction::new(Opcode::Add, 0, 0, 1),
        Instruction::new(Opcode::Sto, 0, 0, 4), // index 13
        Instruction::new(Opcode::Jmp, 0, 0, 4),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let result = run(code, vec![]);
    assert_eq!(result.output, vec![0, 1, 2]);
}

#[test]
fn procedure_call_links_frames_and_returns() {
    // program: var x; procedure p; begin x := 1 end; begin call p end.
    let code = vec![
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Inc, 0, 0, 1), // x at 4, index 1
        Instruction::new(Opcode::Jmp, 0, 0, 7), // jump over p's body to the call site
        // p's body, entry at index 3:
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Lit, 0, 0, 1),
        Instruction::new(Opcode::Sto, 0, 1, 4), // x one level up
        Instruction::new(Opcode::Rtn, 0, 0, 0),
        // main body (index 7):
        Instruction::new(Opcode::Cal, 0, 0, 3),
        Instruction::new(Opcode::Lod, 0, 0, 4),
        Instruction::new(Opcode::SioWrite, 0, 0, 1),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let result = run(code, vec![]);
    assert_eq!(result.output, vec![1]);
}

#[test]
fn division_by_zero_is_a_fault() {
    let code = vec![
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Lit, 0, 0, 10),
        Instruction::new(Opcode::Lit, 1, 0, 0),
        Instruction::new(Opcode::Div, 0, 0, 1),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let fault = VirtualMachine::from_compiled(&code, vec![])
        .run()
        .unwrap_err();
    assert!(matches!(fault, RuntimeFault::DivisionByZero { address: 3 }));
}

#[test]
fn modulo_by_zero_is_a_fault() {
    let code = vec![
        Instruction::new(Opcode::Inc, 0, 0, 4),
        Instruction::new(Opcode::Lit, 0, 0, 10),
        Instruction::new(Opcode::Lit, 1, 0, 0),
        Instruction::new(Opcode::Mod, 0, 0, 1),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let fault = VirtualMachine::from_compiled(&code, vec![])
        .run()
        .unwrap_err();
    assert!(matches!(fault, RuntimeFault::ModuloByZero { address: 3 }));
}

#[test]
fn illegal_opcode_is_a_fault() {
    let code = vec![CodeWord {
        op: 200,
        r: 0,
        l: 0,
        m: 0,
    }];
    let fault = VirtualMachine::new(code, vec![]).run().unwrap_err();
    assert!(matches!(
        fault,
        RuntimeFault::IllegalOpcode { address: 0, op: 200 }
    ));
}

#[test]
fn pc_running_off_the_end_of_code_is_a_fault() {
    let code = vec![Instruction::new(Opcode::Lit, 0, 0, 1)];
    let fault = VirtualMachine::from_compiled(&code, vec![])
        .run()
        .unwrap_err();
    assert!(matches!(fault, RuntimeFault::PcOutOfRange { address: 1 }));
}

#[test]
fn stack_overflow_is_a_fault() {
    let code = vec![Instruction::new(Opcode::Inc, 0, 0, MAX_STACK as i32 + 1)];
    let fault = VirtualMachine::from_compiled(&code, vec![])
        .run()
        .unwrap_err();
    assert!(matches!(fault, RuntimeFault::StackOverflow { address: 0 }));
}

#[test]
fn odd_reports_parity_as_a_boolean() {
    let code = vec![
        Instruction::new(Opcode::Lit, 0, 0, 7),
        Instruction::new(Opcode::Odd, 0, 0, 0),
        Instruction::new(Opcode::SioWrite, 0, 0, 1),
        Instruction::new(Opcode::SioHalt, 0, 0, 3),
    ];
    let result = run(code, vec![]);
    assert_eq!(result.output, vec![1]);
}
