//! # Trace Sinks
//!
//! Formatted code listings and execution traces are a thin, external
//! concern — the compiler and VM never format output themselves, they hand
//! a caller the data (an `&[Instruction]`, a `&VirtualMachine`) and the
//! caller renders it through a [`Trace`] (Non-goal: "a fancy dump format is
//! out of scope for the core toolchain").
//!
//! [`TextTrace`] is the one sink this crate ships, grounded on the original
//! `dumpInstructions`/`dumpStack`, reworked to report a [`RuntimeFault`]
//! explicitly instead of the original's unconditional `"HLT"` regardless of
//! why the machine stopped.

use crate::codegen::instruction::Instruction;
use crate::error::RuntimeFault;
use crate::vm::VirtualMachine;
use std::io::{self, Write};

/// A seam for rendering compiled code and running VM state. Implement this
/// to plug in a different listing format without touching the compiler or
/// the VM.
pub trait Trace {
    /// One line per instruction, in address order.
    fn code_listing(&mut self, code: &[Instruction]) -> io::Result<()>;
    /// Called after every successfully executed instruction, reporting the
    /// instruction just run (`addr`, `ins`) alongside the resulting VM state
    /// (`spec.md` §4.5's `# OP R L M PC BP SP STK` row).
    fn step(&mut self, addr: usize, ins: Instruction, vm: &VirtualMachine) -> io::Result<()>;
    /// Called once, after `SIO_HALT` runs.
    fn halted(&mut self, vm: &VirtualMachine) -> io::Result<()>;
    /// Called once, if execution stops on a fault instead of `SIO_HALT`.
    fn fault(&mut self, fault: &RuntimeFault) -> io::Result<()>;
}

/// Plain-text trace sink over any [`Write`]r.
pub struct TextTrace<W: Write> {
    out: W,
}

impl<W: Write> TextTrace<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl<W: Write> Trace for TextTrace<W> {
    fn code_listing(&mut self, code: &[Instruction]) -> io::Result<()> {
        for (addr, instruction) in code.iter().enumerate() {
            writeln!(
                self.out,
                "{:>4}  {:<9} {} {} {}",
                addr,
                instruction.op.mnemonic(),
                instruction.r,
                instruction.l,
                instruction.m
            )?;
        }
        Ok(())
    }

    fn step(&mut self, addr: usize, ins: Instruction, vm: &VirtualMachine) -> io::Result<()> {
        writeln!(
            self.out,
            "{:>4}  {:<9} {} {} {}  pc={:<4} bp={:<4} sp={:<4} stack: {}",
            addr,
            ins.op.mnemonic(),
            ins.r,
            ins.l,
            ins.m,
            vm.pc(),
            vm.bp(),
            vm.sp(),
            vm.render_stack()
        )
    }

    fn halted(&mut self, vm: &VirtualMachine) -> io::Result<()> {
        writeln!(self.out, "HALT  stack: {}", vm.render_stack())
    }

    fn fault(&mut self, fault: &RuntimeFault) -> io::Result<()> {
        writeln!(self.out, "FAULT {}: {}", fault.address(), fault)
    }
}
