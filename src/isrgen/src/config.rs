use crate::{
    Error, Result,
    asm::{Register, Symbol, Syntax},
    layout::{DEFAULT_ORDER, RegisterLayout},
    vector::Vector,
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Symbols {
    /// Globally visible table of stub addresses.
    pub table: String,
    /// Shared routine every stub jumps to.
    pub common: String,
    /// External handler called with a pointer to the saved frame.
    pub handler: String,
    /// Stubs are labeled `<stub_prefix><vector>`.
    pub stub_prefix: String,
}

impl Default for Symbols {
    fn default() -> Self {
        Self {
            table: "isr_entry".into(),
            common: "common_isr".into(),
            handler: "isr_common_handler".into(),
            stub_prefix: "entry".into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub syntax: Syntax,
    /// Save order of the general-purpose registers.
    pub registers: Vec<Register>,
    /// Name of the C structure describing the handler's frame.
    pub frame_struct: String,
    pub symbols: Symbols,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            syntax: Syntax::default(),
            registers: DEFAULT_ORDER.to_vec(),
            frame_struct: "interrupt_frame".into(),
            symbols: Symbols::default(),
        }
    }
}

impl Config {
    pub fn from_toml(source: &str) -> Result<Self> {
        Ok(toml::from_str(source)?)
    }

    pub fn to_toml(&self) -> core::result::Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn layout(&self) -> Result<RegisterLayout> {
        RegisterLayout::new(&self.registers)
    }

    /// Validates the table, common routine, and handler names and every stub label,
    /// and checks that none of them collides with another.
    pub fn resolve_symbols(&self) -> Result<ResolvedSymbols> {
        let table = Symbol::new(self.symbols.table.as_str())?;
        let common = Symbol::new(self.symbols.common.as_str())?;
        let handler = Symbol::new(self.symbols.handler.as_str())?;

        if table == common || table == handler {
            return Err(Error::DuplicateSymbol(table.to_string()));
        }
        if common == handler {
            return Err(Error::DuplicateSymbol(common.to_string()));
        }

        let stub_prefix = self.symbols.stub_prefix.clone();
        let stub_labels =
            Vector::all().map(|vector| Symbol::new(format!("{stub_prefix}{vector}"))).collect::<Result<Vec<_>>>()?;
        for symbol in [&table, &common, &handler] {
            if stub_labels.contains(symbol) {
                return Err(Error::DuplicateSymbol(symbol.to_string()));
            }
        }

        Ok(ResolvedSymbols { table, common, handler, stub_prefix })
    }
}

/// Symbol names after validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedSymbols {
    pub table: Symbol,
    pub common: Symbol,
    pub handler: Symbol,
    pub stub_prefix: String,
}
