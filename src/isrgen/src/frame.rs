//! The frame the dispatch handler sees through its single pointer argument.
//!
//! Lowest address first: the register save block, the vector number and error code
//! pushed by the entry stub, then the CPU's interrupt return frame.

use crate::{
    Error, Result,
    layout::{REGISTER_WIDTH, RegisterLayout},
    stub::PUSH_WIDTH,
};
use core::fmt;

/// Values pushed by the entry stub, top of stack first.
const STUB_FIELDS: [&str; 2] = ["intno", "error"];
/// Values pushed by the CPU, top of stack first.
const CPU_FIELDS: [&str; 5] = ["rip", "cs", "rflags", "rsp", "ss"];

const _: () = assert!(REGISTER_WIDTH == PUSH_WIDTH);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub name: &'static str,
    pub offset: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrameLayout {
    fields: Vec<Field>,
}

impl FrameLayout {
    pub fn new(layout: &RegisterLayout) -> Self {
        let names = layout.registers().iter().map(|register| register.as_str()).chain(STUB_FIELDS).chain(CPU_FIELDS);
        let fields = names.enumerate().map(|(index, name)| Field { name, offset: index * REGISTER_WIDTH }).collect();

        Self { fields }
    }

    pub fn fields(&self) -> &[Field] {
        &self.fields
    }

    pub fn offset(&self, name: &str) -> Option<usize> {
        self.fields.iter().find(|field| field.name == name).map(|field| field.offset)
    }

    pub fn size(&self) -> usize {
        self.fields.len() * REGISTER_WIDTH
    }

    /// Renders the frame as a packed C structure named `struct_name`.
    pub fn c_header<'a>(&'a self, struct_name: &'a str) -> Result<impl fmt::Display + 'a> {
        let mut chars = struct_name.chars();
        let valid = chars.next().is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');

        if valid { Ok(CHeader { frame: self, struct_name }) } else { Err(Error::InvalidSymbol(struct_name.into())) }
    }
}

struct CHeader<'a> {
    frame: &'a FrameLayout,
    struct_name: &'a str,
}

impl fmt::Display for CHeader<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let guard = format!("__{}_H__", self.struct_name.to_ascii_uppercase());

        writeln!(f, "/* Generated by isrgen. Do not edit. */")?;
        writeln!(f, "#ifndef {guard}")?;
        writeln!(f, "#define {guard}")?;
        writeln!(f)?;
        writeln!(f, "struct {} {{", self.struct_name)?;
        for field in self.frame.fields() {
            writeln!(f, "\tunsigned long {}; /* {:#x} */", field.name, field.offset)?;
        }
        writeln!(f, "}} __attribute__((packed));")?;
        writeln!(f)?;
        writeln!(
            f,
            "_Static_assert(sizeof(struct {0}) == {1}, \"struct {0} does not match the generated entry code\");",
            self.struct_name,
            self.frame.size()
        )?;
        writeln!(f)?;
        writeln!(f, "#endif /*{guard}*/")
    }
}
