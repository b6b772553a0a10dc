//! Per-vector entry stubs.
//!
//! The CPU only pushes an error code for a handful of exceptions. Each stub makes
//! up the difference, so by the time control reaches the common trampoline the
//! stack always holds, from the top: the vector number, then the error code (or a
//! zero placeholder), then the CPU's interrupt return frame.

use crate::{
    Result,
    asm::{Instruction, Line, Symbol},
    vector::Vector,
};

/// Width of each value a stub pushes, in bytes.
pub const PUSH_WIDTH: usize = 8;

/// Number of values every stub leaves on the stack: the error code slot and the vector.
pub const PUSHED_VALUES: usize = 2;

/// Stand-in error code for vectors the CPU pushes no error code for.
pub const ERROR_CODE_PLACEHOLDER: u32 = 0;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntryStub {
    vector: Vector,
    label: Symbol,
    body: Vec<Instruction>,
}

impl EntryStub {
    /// Builds the stub for `vector`, labeled `<prefix><vector>`, that jumps to `target`.
    pub fn new(vector: Vector, prefix: &str, target: &Symbol) -> Result<Self> {
        let label = Symbol::new(format!("{prefix}{vector}"))?;

        let mut body = Vec::with_capacity(3);
        if vector.delivers_error_code() {
            trace!("vector {vector}: hardware error code");
        } else {
            body.push(Instruction::PushImm(ERROR_CODE_PLACEHOLDER));
        }
        body.push(Instruction::PushImm(u32::from(vector.get())));
        body.push(Instruction::Jmp(target.clone()));

        Ok(Self { vector, label, body })
    }

    pub const fn vector(&self) -> Vector {
        self.vector
    }

    pub fn label(&self) -> &Symbol {
        &self.label
    }

    pub fn body(&self) -> &[Instruction] {
        &self.body
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        let comment = self.vector.exception_name().map(|name| Line::Comment(format!("vector {}: {name}", self.vector)));

        comment
            .into_iter()
            .chain(core::iter::once(Line::Label(self.label.clone())))
            .chain(self.body.iter().cloned().map(Line::Instruction))
    }
}
