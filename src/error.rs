//! The crate-wide error type.
//!
//! One variant per failure kind the interpreter can surface, compile time
//! and runtime alike. Variants that point at source text carry a [`Loc`] so
//! the reporter can underline them.

use thiserror::Error;

use crate::diag::Loc;

pub type Result<T> = std::result::Result<T, Error>;

/// Which stage raised an error that can occur in more than one.
///
/// An undefined variable is normally caught by the parser, but the
/// evaluator can hit one too: a block-local name whose only assignment sat
/// behind a branch that never ran has no slot when the read executes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Compile,
    Runtime,
}

#[derive(Debug, Error)]
pub enum Error {
    /// Source file or stream failure.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The tokenizer met a character no token starts with.
    #[error("unrecognized lexeme")]
    Lex { loc: Loc },

    /// The token stream violates the grammar.
    #[error("{message}")]
    Parse { loc: Loc, message: String },

    /// A variable was read before any assignment declared it.
    #[error("undefined variable '{name}'")]
    UndefinedVariable { loc: Loc, name: String, phase: Phase },

    /// An operator received a value variant it is not defined for.
    #[error("invalid operand of operator")]
    InvalidOperand { loc: Loc },

    /// Division or modulo with a zero right operand.
    #[error("division by zero")]
    DivisionByZero { loc: Loc },

    /// `?` could not parse an integer from the input stream.
    #[error("invalid integer on input")]
    InputFormat { loc: Loc },
}

impl Error {
    /// The source range this error points at, when it has one.
    pub fn loc(&self) -> Option<Loc> {
        match self {
            Error::Io(_) => None,
            Error::Lex { loc }
            | Error::Parse { loc, .. }
            | Error::UndefinedVariable { loc, .. }
            | Error::InvalidOperand { loc }
            | Error::DivisionByZero { loc }
            | Error::InputFormat { loc } => Some(*loc),
        }
    }

    /// True for errors raised while building the program, false for errors
    /// raised while running it.
    pub fn is_compile_error(&self) -> bool {
        match self {
            Error::Lex { .. } | Error::Parse { .. } => true,
            Error::UndefinedVariable { phase, .. } => *phase == Phase::Compile,
            _ => false,
        }
    }
}
