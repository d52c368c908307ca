use std::fmt::{Display, Formatter};

use strum_macros::{Display as StrumDisplay, EnumIter, EnumString, IntoStaticStr};
use num_enum::{IntoPrimitive, TryFromPrimitive};

use crate::address::AddressNumberType;

/**
  Opcodes of the machine. There are no jumps: control flow is a conditional write to cell 0
  with `Mnz` or `Mlz`. The text form of each variant is its assembly mnemonic.
*/
#[derive(
  StrumDisplay, IntoStaticStr, EnumString, EnumIter,
  Clone,        Copy,          Eq, PartialEq,  Debug,    Hash
)]
pub enum Opcode {
  // Conditional moves //
  #[strum(to_string = "MNZ")] Mnz, // move if not zero
  #[strum(to_string = "MLZ")] Mlz, // move if less than zero

  // Arithmetic //
  #[strum(to_string = "ADD")] Add,
  #[strum(to_string = "SUB")] Sub,

  // Bitwise //
  #[strum(to_string = "AND")] And,
  #[strum(to_string = "OR" )] Or,
  #[strum(to_string = "XOR")] Xor,
  #[strum(to_string = "ANT")] Ant, // and-not

  // Shifts //
  #[strum(to_string = "SL" )] Sl,
  #[strum(to_string = "SRL")] Srl,
  #[strum(to_string = "SRA")] Sra,
  #[strum(to_string = "SRU")] Sru,
  #[strum(to_string = "SRE")] Sre,
}

/// The number of times an operand's literal is dereferenced. The text form is the prefix
/// letter used in assembly.
#[derive(
  StrumDisplay, EnumString, TryFromPrimitive, IntoPrimitive,
  Clone,        Copy,       Eq, PartialEq,     Debug,         Hash
)]
#[repr(u8)]
pub enum AddressingMode {
  #[strum(to_string = "")]  Direct = 0,
  #[strum(to_string = "A")] Indirect = 1,
  #[strum(to_string = "B")] DoubleIndirect = 2,
  #[strum(to_string = "C")] TripleIndirect = 3,
}

impl AddressingMode {
  pub fn depth(&self) -> u8 {
    Into::<u8>::into(*self)
  }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Operand {
  pub mode: AddressingMode,
  pub literal: AddressNumberType,
}

impl Operand {
  pub fn new(mode: AddressingMode, literal: AddressNumberType) -> Operand {
    Operand { mode, literal }
  }

  pub fn direct(literal: AddressNumberType) -> Operand {
    Operand::new(AddressingMode::Direct, literal)
  }
}

impl Display for Operand {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}{}", self.mode, self.literal)
  }
}

/// A decoded ROM line. Immutable once decoded.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub struct Instruction {
  pub opcode: Opcode,
  pub operands: [Operand; 3],
}

impl Display for Instruction {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    let [a, b, c] = &self.operands;
    write!(f, "{} {} {} {}", self.opcode, a, b, c)
  }
}


#[cfg(test)]
mod tests {
  use super::*;
  use std::convert::TryFrom;
  use std::str::FromStr;
  use strum::IntoEnumIterator;

  #[test]
  fn mnemonics_round_trip() {
    for opcode in Opcode::iter() {
      let text: &'static str = opcode.into();
      assert_eq!(Opcode::from_str(text), Ok(opcode));
    }
    assert_eq!(Opcode::iter().count(), 13);
    assert!(Opcode::from_str("JMP").is_err());
    assert!(Opcode::from_str("add").is_err());
  }

  #[test]
  fn mode_depths() {
    assert_eq!(AddressingMode::Direct.depth(), 0);
    assert_eq!(AddressingMode::from_str("B"), Ok(AddressingMode::DoubleIndirect));
    assert_eq!(AddressingMode::try_from(3u8).ok(), Some(AddressingMode::TripleIndirect));
    assert!(AddressingMode::try_from(4u8).is_err());
  }

  #[test]
  fn display() {
    let instruction = Instruction {
      opcode: Opcode::Add,
      operands: [
        Operand::new(AddressingMode::Indirect, 100),
        Operand::direct(-1),
        Operand::new(AddressingMode::TripleIndirect, 7)
      ]
    };
    assert_eq!(instruction.to_string(), "ADD A100 -1 C7");
  }

}
