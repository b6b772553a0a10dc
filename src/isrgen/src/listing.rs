use crate::{
    Result,
    asm::{Directive, Line, Syntax},
    config::{Config, ResolvedSymbols},
    export::ExportTable,
    frame::FrameLayout,
    layout::RegisterLayout,
    table::VectorTable,
    trampoline::CommonTrampoline,
};
use core::fmt;

/// Everything generated from one configuration.
#[derive(Debug, Clone)]
pub struct Listing {
    syntax: Syntax,
    symbols: ResolvedSymbols,
    layout: RegisterLayout,
    table: VectorTable,
    export: ExportTable,
}

impl Listing {
    pub fn generate(config: &Config) -> Result<Self> {
        let layout = config.layout()?;
        let symbols = config.resolve_symbols()?;
        debug!("register block: {} registers, {} bytes", layout.len(), layout.size());

        let table = VectorTable::build(&symbols.stub_prefix, &symbols.common)?;
        let export = ExportTable::new(symbols.table.clone(), &table);
        debug!("export table `{}`: {} entries, {} bytes", export.symbol(), export.entries().len(), export.size());

        Ok(Self { syntax: config.syntax, symbols, layout, table, export })
    }

    pub fn layout(&self) -> &RegisterLayout {
        &self.layout
    }

    pub fn symbols(&self) -> &ResolvedSymbols {
        &self.symbols
    }

    pub fn table(&self) -> &VectorTable {
        &self.table
    }

    pub fn export(&self) -> &ExportTable {
        &self.export
    }

    pub fn trampoline(&self) -> CommonTrampoline<'_> {
        CommonTrampoline::new(&self.symbols.common, &self.symbols.handler, &self.layout)
    }

    pub fn frame(&self) -> FrameLayout {
        FrameLayout::new(&self.layout)
    }

    pub fn lines(&self) -> Vec<Line> {
        let mut lines = Vec::new();

        if self.syntax == Syntax::Intel {
            lines.push(Line::from(Directive::IntelSyntax));
        }
        lines.push(Line::from(Directive::Text));
        lines.push(Line::from(Directive::Code64));
        lines.push(Line::Blank);

        lines.extend(self.trampoline().lines());
        lines.push(Line::Blank);

        lines.extend(self.table.lines());
        lines.push(Line::Blank);

        lines.extend(self.export.lines());

        lines
    }
}

impl fmt::Display for Listing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for line in self.lines() {
            writeln!(f, "{}", line.display(self.syntax))?;
        }

        Ok(())
    }
}
