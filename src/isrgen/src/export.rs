use crate::{
    asm::{Directive, Line, Symbol},
    table::VectorTable,
};

/// Width of one table entry (a code address), in bytes.
pub const POINTER_WIDTH: usize = 8;

/// The globally visible array of stub addresses the kernel installs into its IDT.
///
/// Entry `i` is always the stub for vector `i`.
#[derive(Debug, Clone)]
pub struct ExportTable {
    symbol: Symbol,
    entries: Vec<Symbol>,
}

impl ExportTable {
    pub fn new(symbol: Symbol, table: &VectorTable) -> Self {
        Self { symbol, entries: table.labels().cloned().collect() }
    }

    pub fn symbol(&self) -> &Symbol {
        &self.symbol
    }

    pub fn entries(&self) -> &[Symbol] {
        &self.entries
    }

    /// Size of the table, in bytes.
    pub fn size(&self) -> usize {
        self.entries.len() * POINTER_WIDTH
    }

    pub fn lines(&self) -> impl Iterator<Item = Line> + '_ {
        [
            Line::from(Directive::Global(self.symbol.clone())),
            Line::from(Directive::Align(POINTER_WIDTH)),
            Line::Label(self.symbol.clone()),
        ]
        .into_iter()
        .chain(self.entries.iter().map(|entry| Line::from(Directive::Quad(entry.clone()))))
        .chain(core::iter::once(Line::from(Directive::Size(self.symbol.clone(), self.size()))))
    }
}
