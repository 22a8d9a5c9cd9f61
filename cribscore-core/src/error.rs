use std::io;
use thiserror::Error;

/// Reasons a model (or its alphabet) cannot be built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConstructionError {
    #[error("alphabet is empty")]
    EmptyAlphabet,
    #[error("symbol {symbol:?} appears more than once (position {position})")]
    DuplicateSymbol { symbol: char, position: usize },
    #[error("symbol {symbol:?} does not fit in a byte")]
    SymbolOutOfRange { symbol: char },
    #[error("alphabet of {len} symbols needs more than 7 bits per symbol")]
    TooManySymbols { len: usize },
    #[error("count limit {limit} is below the minimum of {min} for this alphabet")]
    CountLimitTooSmall { limit: u32, min: u32 },
    #[error("count table of {slots} counters cannot be allocated")]
    TableTooLarge { slots: usize },
}

pub type Result<T> = core::result::Result<T, Error>;

/// Errors raised while saving or loading a model.
#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error(transparent)]
    Construction(#[from] ConstructionError),
    #[error("not a cribscore model")]
    BadMagic,
    #[error("unsupported model version {0}")]
    UnsupportedVersion(u16),
    #[error("corrupt model: {0}")]
    Corrupt(&'static str),
}
