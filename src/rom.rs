/*!
  Program memory. A ROM line stays raw text until the first time the program counter reaches
  it, at which point it is decoded and the decoded form replaces the text for good. Programs
  cannot modify their own ROM, so the cached form never goes stale.
*/

use crate::bytecode::{parse_line, Instruction, Word};
use crate::error::MachineError;

#[derive(Clone, Debug, Eq, PartialEq)]
enum RomSlot {
  Raw(String),
  Decoded(Instruction),
}

pub struct Rom {
  slots: Vec<RomSlot>,
  /// How many times each line has been fetched.
  reads: Vec<u64>,
}

impl Rom {

  /// Builds a ROM from program text, one instruction per non-blank line.
  pub fn from_text(text: &str) -> Rom {
    let slots: Vec<RomSlot> =
      text.lines()
          .filter(|line| !line.trim().is_empty())
          .map(|line| RomSlot::Raw(line.to_string()))
          .collect();
    let reads = vec![0; slots.len()];
    Rom { slots, reads }
  }

  /// Builds a ROM from instructions that are already decoded.
  pub fn from_instructions(instructions: Vec<Instruction>) -> Rom {
    let reads = vec![0; instructions.len()];
    Rom {
      slots: instructions.into_iter().map(RomSlot::Decoded).collect(),
      reads
    }
  }

  pub fn len(&self) -> usize {
    self.slots.len()
  }

  pub fn is_empty(&self) -> bool {
    self.slots.is_empty()
  }

  /// Fetches the instruction at `pc`, decoding and caching it on first use.
  pub fn fetch(&mut self, pc: Word) -> Result<Instruction, MachineError> {
    let index = pc as usize;
    let slot = match self.slots.get(index) {
      Some(slot) => slot,
      None => return Err(MachineError::OutsideRom { pc, len: self.slots.len() })
    };
    self.reads[index] += 1;

    let instruction = match slot {
      RomSlot::Decoded(instruction) => return Ok(*instruction),
      RomSlot::Raw(text) => {
        let (number, instruction) =
          parse_line(text).map_err(|source| MachineError::Decode { pc, source })?;
        if number != index as i64 {
          log::warn!("ROM line {} is numbered {}", index, number);
        }
        instruction
      }
    };

    self.slots[index] = RomSlot::Decoded(instruction);
    Ok(instruction)
  }

  pub fn reads(&self) -> &[u64] {
    &self.reads
  }

}
