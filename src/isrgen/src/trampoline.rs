//! The shared save/dispatch/restore routine every entry stub jumps to.

use crate::{
    asm::{Instruction, Line, Register, Symbol},
    layout::RegisterLayout,
    stub::{PUSH_WIDTH, PUSHED_VALUES},
};

/// Bytes the CPU pushes for its interrupt return frame (`rip`, `cs`, `rflags`, `rsp`, `ss`).
pub const IRET_FRAME_SIZE: usize = 5 * 8;

/// Stack bytes released by the epilogue: the register block plus both values pushed by the entry stub.
///
/// Getting this wrong makes `iretq` pop a garbage return frame.
pub fn frame_adjustment(layout: &RegisterLayout) -> usize {
    layout.size() + (PUSHED_VALUES * PUSH_WIDTH)
}

pub struct CommonTrampoline<'a> {
    label: &'a Symbol,
    handler: &'a Symbol,
    layout: &'a RegisterLayout,
}

impl<'a> CommonTrampoline<'a> {
    pub const fn new(label: &'a Symbol, handler: &'a Symbol, layout: &'a RegisterLayout) -> Self {
        Self { label, handler, layout }
    }

    pub const fn label(&self) -> &Symbol {
        self.label
    }

    /// Reserves the register block and stores every register to its slot.
    pub fn prologue(&self) -> Vec<Instruction> {
        core::iter::once(Instruction::SubImm { dst: Register::Rsp, imm: self.layout.size() })
            .chain(self.layout.slots().map(|(src, disp)| Instruction::Store { src, base: Register::Rsp, disp }))
            .chain(core::iter::once(Instruction::Cld))
            .collect()
    }

    /// Hands the address of the register block to the handler.
    pub fn dispatch(&self) -> Vec<Instruction> {
        vec![Instruction::Mov { src: Register::Rsp, dst: Register::Rdi }, Instruction::Call(self.handler.clone())]
    }

    /// Reloads every register from the (possibly handler-modified) block, drops the
    /// block and the stub's pushes in one adjustment, and returns from the interrupt.
    pub fn epilogue(&self) -> Vec<Instruction> {
        self.layout
            .slots()
            .map(|(dst, disp)| Instruction::Load { base: Register::Rsp, disp, dst })
            .chain([Instruction::AddImm { dst: Register::Rsp, imm: frame_adjustment(self.layout) }, Instruction::Iretq])
            .collect()
    }

    pub fn instructions(&self) -> Vec<Instruction> {
        let mut instructions = self.prologue();
        instructions.extend(self.dispatch());
        instructions.extend(self.epilogue());
        instructions
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> {
        core::iter::once(Line::Label(self.label.clone())).chain(self.instructions().into_iter().map(Line::Instruction))
    }
}
