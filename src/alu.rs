//! The opcode table. Each opcode is a pure function of three resolved words.

use crate::bytecode::{Opcode, Word};

/// A result waiting to be committed at the start of the next cycle.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct WriteBack {
  pub value: Word,
  pub destination: Word,
}

/**
  Computes the write-back for `opcode` on operands `a`, `b` and destination `c`, or `None`
  if a conditional move does not fire.

  Shift counts are not masked: shifting a 16 bit word by 16 or more gives zero. `Sra` only
  looks at the low byte of `a`, keeping bit 7 and shifting bits 0 to 6.
*/
pub fn execute(opcode: Opcode, a: Word, b: Word, c: Word) -> Option<WriteBack> {
  let write = |value: Word| Some(WriteBack { value, destination: c });

  match opcode {
    Opcode::Mnz => if a != 0        { write(b) } else { None },
    Opcode::Mlz => if a >> 15 == 1  { write(b) } else { None },
    Opcode::Add => write(a.wrapping_add(b)),
    Opcode::Sub => write(a.wrapping_sub(b)),
    Opcode::And => write(a & b),
    Opcode::Or  => write(a | b),
    Opcode::Xor => write(a ^ b),
    Opcode::Ant => write(a & !b),
    Opcode::Sl  => write(a.checked_shl(b as u32).unwrap_or(0)),
    Opcode::Srl => write(a.checked_shr(b as u32).unwrap_or(0)),
    Opcode::Sra => write((a & 0x80) ^ (a & 0x7F).checked_shr(b as u32).unwrap_or(0)),
    Opcode::Sru => write(b >> 1),
    Opcode::Sre => write(b >> 8),
  }
}
