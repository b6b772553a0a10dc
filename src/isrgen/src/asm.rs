//! Typed model of the (small) subset of x86-64 assembly the generator emits.
//!
//! Everything the generator produces goes through [`Line`], so the same
//! program can be rendered as GNU `as` AT&T or Intel syntax, and can be
//! executed by the test machine without re-parsing text.

use crate::{Error, Result};
use core::fmt;
use serde::{Deserialize, Serialize};

/// 64-bit general-purpose registers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Register {
    Rax,
    Rbx,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    Rbp,
    Rsp,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl Register {
    pub const ALL: [Self; 16] = [
        Self::Rax,
        Self::Rbx,
        Self::Rcx,
        Self::Rdx,
        Self::Rsi,
        Self::Rdi,
        Self::Rbp,
        Self::Rsp,
        Self::R8,
        Self::R9,
        Self::R10,
        Self::R11,
        Self::R12,
        Self::R13,
        Self::R14,
        Self::R15,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rax => "rax",
            Self::Rbx => "rbx",
            Self::Rcx => "rcx",
            Self::Rdx => "rdx",
            Self::Rsi => "rsi",
            Self::Rdi => "rdi",
            Self::Rbp => "rbp",
            Self::Rsp => "rsp",
            Self::R8 => "r8",
            Self::R9 => "r9",
            Self::R10 => "r10",
            Self::R11 => "r11",
            Self::R12 => "r12",
            Self::R13 => "r13",
            Self::R14 => "r14",
            Self::R15 => "r15",
        }
    }
}

impl fmt::Display for Register {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Assembler dialect used when rendering a listing.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Syntax {
    #[default]
    Att,
    Intel,
}

/// Register names GNU `as` accepts without a numeric suffix.
const NAMED_REGISTERS: &[&str] = &[
    "al", "bl", "cl", "dl", "ah", "bh", "ch", "dh", "sil", "dil", "bpl", "spl", "ax", "bx", "cx", "dx", "si", "di",
    "bp", "sp", "eax", "ebx", "ecx", "edx", "esi", "edi", "ebp", "esp", "rip", "eip", "cs", "ds", "es", "fs", "gs",
    "ss", "st",
];

/// Register families spelled `<prefix><n>`, with the valid range of `n`.
const NUMBERED_REGISTERS: &[(&str, core::ops::Range<u8>)] = &[
    ("r", 8..16),
    ("cr", 0..16),
    ("dr", 0..16),
    ("tr", 0..8),
    ("st", 0..8),
    ("mm", 0..8),
    ("xmm", 0..32),
    ("ymm", 0..32),
    ("zmm", 0..32),
    ("k", 0..8),
    ("bnd", 0..4),
    ("tmm", 0..8),
];

/// Whether `as` would parse `name` as a register operand, in any width or class.
fn is_register_name(name: &str) -> bool {
    let name = name.to_ascii_lowercase();
    if Register::ALL.iter().any(|register| register.as_str() == name) || NAMED_REGISTERS.contains(&name.as_str()) {
        return true;
    }

    NUMBERED_REGISTERS.iter().any(|(prefix, range)| {
        let Some(mut index) = name.strip_prefix(*prefix) else { return false };
        // `r8b`, `r9w`, `r10d`, `r11l`
        if *prefix == "r" {
            index = index.strip_suffix(&['b', 'w', 'd', 'l'][..]).unwrap_or(index);
        }

        index.parse::<u8>().is_ok_and(|n| range.contains(&n) && n.to_string() == index)
    })
}

/// An assembler symbol (label or external name).
///
/// Register names of every class are rejected, since `noprefix` Intel syntax can't
/// tell them apart from symbols.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Symbol(String);

impl Symbol {
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();

        let mut chars = name.chars();
        let head_valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '.');
        let tail_valid = chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '.' | '$'));

        if head_valid && tail_valid && !is_register_name(&name) {
            Ok(Self(name))
        } else {
            Err(Error::InvalidSymbol(name))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Symbol {
    type Error = Error;

    fn try_from(name: String) -> Result<Self> {
        Self::new(name)
    }
}

impl From<Symbol> for String {
    fn from(symbol: Symbol) -> Self {
        symbol.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Instruction {
    /// Push a quadword immediate. Only values representable as a
    /// sign-extended 32-bit immediate are ever emitted.
    PushImm(u32),
    SubImm { dst: Register, imm: usize },
    AddImm { dst: Register, imm: usize },
    /// Store `src` to `[base + disp]`.
    Store { src: Register, base: Register, disp: usize },
    /// Load `dst` from `[base + disp]`.
    Load { base: Register, disp: usize, dst: Register },
    Mov { src: Register, dst: Register },
    Cld,
    Call(Symbol),
    Jmp(Symbol),
    Iretq,
}

impl Instruction {
    pub fn display(&self, syntax: Syntax) -> impl fmt::Display + '_ {
        Rendered { item: self, syntax }
    }

    fn fmt_att(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushImm(imm) => write!(f, "pushq ${imm}"),
            Self::SubImm { dst, imm } => write!(f, "subq ${imm}, %{dst}"),
            Self::AddImm { dst, imm } => write!(f, "addq ${imm}, %{dst}"),
            Self::Store { src, base, disp } => write!(f, "movq %{src}, {disp}(%{base})"),
            Self::Load { base, disp, dst } => write!(f, "movq {disp}(%{base}), %{dst}"),
            Self::Mov { src, dst } => write!(f, "movq %{src}, %{dst}"),
            Self::Cld => f.write_str("cld"),
            Self::Call(target) => write!(f, "call {target}"),
            Self::Jmp(target) => write!(f, "jmp {target}"),
            Self::Iretq => f.write_str("iretq"),
        }
    }

    fn fmt_intel(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::PushImm(imm) => write!(f, "push {imm}"),
            Self::SubImm { dst, imm } => write!(f, "sub {dst}, {imm}"),
            Self::AddImm { dst, imm } => write!(f, "add {dst}, {imm}"),
            Self::Store { src, base, disp } => write!(f, "mov qword ptr [{base} + {disp}], {src}"),
            Self::Load { base, disp, dst } => write!(f, "mov {dst}, qword ptr [{base} + {disp}]"),
            Self::Mov { src, dst } => write!(f, "mov {dst}, {src}"),
            Self::Cld => f.write_str("cld"),
            Self::Call(target) => write!(f, "call {target}"),
            Self::Jmp(target) => write!(f, "jmp {target}"),
            Self::Iretq => f.write_str("iretq"),
        }
    }
}

/// Assembler directives. These read the same in both dialects.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Directive {
    Text,
    Code64,
    IntelSyntax,
    Global(Symbol),
    Align(usize),
    Quad(Symbol),
    Size(Symbol, usize),
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => f.write_str(".text"),
            Self::Code64 => f.write_str(".code64"),
            Self::IntelSyntax => f.write_str(".intel_syntax noprefix"),
            Self::Global(symbol) => write!(f, ".global {symbol}"),
            Self::Align(align) => write!(f, ".balign {align}"),
            Self::Quad(symbol) => write!(f, ".quad {symbol}"),
            Self::Size(symbol, size) => write!(f, ".size {symbol}, {size}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Line {
    Directive(Directive),
    Label(Symbol),
    Instruction(Instruction),
    Comment(String),
    Blank,
}

impl Line {
    pub fn display(&self, syntax: Syntax) -> impl fmt::Display + '_ {
        Rendered { item: self, syntax }
    }
}

impl From<Instruction> for Line {
    fn from(instruction: Instruction) -> Self {
        Self::Instruction(instruction)
    }
}

impl From<Directive> for Line {
    fn from(directive: Directive) -> Self {
        Self::Directive(directive)
    }
}

struct Rendered<'a, T> {
    item: &'a T,
    syntax: Syntax,
}

impl fmt::Display for Rendered<'_, Instruction> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.syntax {
            Syntax::Att => self.item.fmt_att(f),
            Syntax::Intel => self.item.fmt_intel(f),
        }
    }
}

impl fmt::Display for Rendered<'_, Line> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.item {
            Line::Directive(directive) => write!(f, "\t{directive}"),
            Line::Label(symbol) => write!(f, "{symbol}:"),
            Line::Instruction(instruction) => write!(f, "\t{}", instruction.display(self.syntax)),
            Line::Comment(text) => write!(f, "\t# {text}"),
            Line::Blank => Ok(()),
        }
    }
}
