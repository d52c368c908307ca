//! Error types. Only bounds violations are non-fatal, and those never become an error value;
//! they are logged by the resolver.

use thiserror::Error;

use crate::bytecode::{Opcode, Word};

/// Failure to turn one ROM line into an `Instruction`.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
  #[error("`{name}` is not an operation")]
  NotAnOperation {
    name: String
  },
  #[error("{operation} requires 3 operands but was given {given}")]
  WrongArity {
    operation: Opcode,
    given: usize
  },
  #[error("malformed instruction: `{text}`")]
  Malformed {
    text: String
  },
}

#[derive(Debug, Error)]
pub enum MachineError {
  #[error("cannot decode ROM line {pc}: {source}")]
  Decode {
    pc: Word,
    #[source]
    source: DecodeError
  },
  #[error("program counter {pc} is outside the {len} line ROM")]
  OutsideRom {
    pc: Word,
    len: usize
  },
  #[error("I/O error: {0}")]
  Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
  #[error("cannot read prewritten RAM file: {0}")]
  Io(#[from] std::io::Error),
  #[error("malformed prewritten RAM entry on line {line}: `{text}`")]
  Malformed {
    line: usize,
    text: String
  },
  #[error("the memory window must hold at least one cell")]
  EmptyWindow,
}
