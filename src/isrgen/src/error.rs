use crate::asm::Register;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("interrupt vector {0} is outside of the vector table (0..128)")]
    VectorOutOfRange(u16),

    #[error("register `{0}` appears more than once in the register set")]
    DuplicateRegister(Register),

    #[error("register `{0}` cannot be saved into the register block")]
    UnsavableRegister(Register),

    #[error("register `{0}` is missing from the register set")]
    MissingRegister(Register),

    #[error("`{0}` is not a valid assembler symbol")]
    InvalidSymbol(String),

    #[error("symbol `{0}` is defined more than once")]
    DuplicateSymbol(String),

    #[error("failed to parse generator configuration")]
    Config(#[from] toml::de::Error),
}

pub type Result<T> = core::result::Result<T, Error>;
