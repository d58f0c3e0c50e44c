//! # Instructions
//!
//! The 24-opcode instruction set of the stack-frame virtual machine
//! (`spec.md` §4.4), modeled as a tagged enum rather than a raw integer
//! `switch` (Design Note: "Opcode dispatch").

use std::fmt;
use std::str::FromStr;

/// A single VM instruction: opcode plus the three operand fields `r`, `l`,
/// `m`, whose meaning depends on `op` (`spec.md` §3, §4.4).
///
/// This is the compiler's and trace sinks' view of code — `op` is already
/// known to be one of the 24 frozen opcodes. The VM instead runs on
/// [`CodeWord`], which keeps `op` as the raw byte from the code file so an
/// out-of-range opcode surfaces as a runtime fault rather than a load-time
/// rejection (`spec.md` §6).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Instruction {
    pub op: Opcode,
    pub r: u8,
    pub l: i32,
    pub m: i32,
}

impl Instruction {
    pub fn new(op: Opcode, r: u8, l: i32, m: i32) -> Self {
        Self { op, r, l, m }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.op as u8, self.r, self.l, self.m)
    }
}

impl From<Instruction> for CodeWord {
    fn from(i: Instruction) -> Self {
        CodeWord {
            op: i.op as u8,
            r: i.r,
            l: i.l,
            m: i.m,
        }
    }
}

/// The 24 opcodes frozen by `spec.md` §4.4/§6.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Opcode {
    Lit = 1,
    Rtn = 2,
    Lod = 3,
    Sto = 4,
    Cal = 5,
    Inc = 6,
    Jmp = 7,
    Jpc = 8,
    SioWrite = 9,
    SioRead = 10,
    SioHalt = 11,
    Neg = 12,
    Add = 13,
    Sub = 14,
    Mul = 15,
    Div = 16,
    Odd = 17,
    Mod = 18,
    Eql = 19,
    Neq = 20,
    Lss = 21,
    Leq = 22,
    Gtr = 23,
    Geq = 24,
}

impl Opcode {
    pub fn mnemonic(self) -> &'static str {
        use Opcode::*;
        match self {
            Lit => "LIT",
            Rtn => "RTN",
            Lod => "LOD",
            Sto => "STO",
            Cal => "CAL",
            Inc => "INC",
            Jmp => "JMP",
            Jpc => "JPC",
            SioWrite => "SIO_WRITE",
            SioRead => "SIO_READ",
            SioHalt => "SIO_HALT",
            Neg => "NEG",
            Add => "ADD",
            Sub => "SUB",
            Mul => "MUL",
            Div => "DIV",
            Odd => "ODD",
            Mod => "MOD",
            Eql => "EQL",
            Neq => "NEQ",
            Lss => "LSS",
            Leq => "LEQ",
            Gtr => "GTR",
            Geq => "GEQ",
        }
    }

    /// Decode from the raw opcode number used by the emitted code file
    /// format (`spec.md` §6). Returns `None` for 0 or any number outside
    /// the frozen table — the caller reports this as an illegal opcode.
    pub fn from_u8(value: u8) -> Option<Opcode> {
        use Opcode::*;
        Some(match value {
            1 => Lit,
            2 => Rtn,
            3 => Lod,
            4 => Sto,
            5 => Cal,
            6 => Inc,
            7 => Jmp,
            8 => Jpc,
            9 => SioWrite,
            10 => SioRead,
            11 => SioHalt,
            12 => Neg,
            13 => Add,
            14 => Sub,
            15 => Mul,
            16 => Div,
            17 => Odd,
            18 => Mod,
            19 => Eql,
            20 => Neq,
            21 => Lss,
            22 => Leq,
            23 => Gtr,
            24 => Geq,
            _ => return None,
        })
    }
}

/// One line of the emitted code file: `op r l m`, decimal, whitespace
/// separated (`spec.md` §6). `op` is kept raw rather than decoded eagerly —
/// a malformed line is a load error, but a well-formed line naming an
/// unrecognized opcode is not rejected at load time; it's the VM's fetch
/// step that turns it into an `IllegalOpcode` fault.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodeWord {
    pub op: u8,
    pub r: u8,
    pub l: i32,
    pub m: i32,
}

impl fmt::Display for CodeWord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {} {}", self.op, self.r, self.l, self.m)
    }
}

/// Error parsing one line of a code file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeWordParseError;

impl fmt::Display for CodeWordParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "expected four whitespace-separated decimal fields: op r l m")
    }
}

impl std::error::Error for CodeWordParseError {}

impl FromStr for CodeWord {
    type Err = CodeWordParseError;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut fields = line.split_whitespace();
        let mut next = || fields.next().ok_or(CodeWordParseError);
        let op: u8 = next()?.parse().map_err(|_| CodeWordParseError)?;
        let r: u8 = next()?.parse().map_err(|_| CodeWordParseError)?;
        let l: i32 = next()?.parse().map_err(|_| CodeWordParseError)?;
        let m: i32 = next()?.parse().map_err(|_| CodeWordParseError)?;
        if fields.next().is_some() {
            return Err(CodeWordParseError);
        }
        Ok(CodeWord { op, r, l, m })
    }
}

/// Parse a whole code file: one instruction per non-blank line.
pub fn parse_code_file(text: &str) -> Result<Vec<CodeWord>, CodeWordParseError> {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::parse)
        .collect()
}

/// Render a code file: one `op r l m` line per instruction, in address order.
pub fn render_code_file(code: &[Instruction]) -> String {
    let mut out = String::new();
    for instruction in code {
        out.push_str(&instruction.to_string());
        out.push('\n');
    }
    out
}
