/*!
  Memory cells and the addressing resolver.

  Every cell carries an access counter next to its value. The counter is bumped by every
  engine read and write, never affects the value, and exists only for profiling. The
  codec, the streaming port and the diagnostics go through the uncounted `peek`/`poke`.
*/

use crate::address::{AddressNumberType, AddressSpace, ADDRESS_SPACE};
use crate::bytecode::{Operand, Word};
use crate::config::Config;
use crate::error::ConfigError;

/// Cell 0 doubles as the program counter.
pub const PC_ADDRESS: AddressNumberType = 0;

#[derive(Clone, Copy, Default, Debug, Eq, PartialEq)]
pub struct Cell {
  pub value: Word,
  pub accesses: u64,
}

/// Where a dereference came from, for bounds warnings.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Origin {
  pub pc: Word,
  pub step: u64,
  /// 1, 2 or 3.
  pub operand: usize,
}

/// Reduces a literal or a dereferenced value into a machine word.
pub fn to_word(value: AddressNumberType) -> Word {
  value.rem_euclid(ADDRESS_SPACE) as Word
}

pub struct Memory {
  cells: Vec<Cell>,
  space: AddressSpace,
  bounds_warnings: u64,
}

impl Memory {

  pub fn new(config: &Config) -> Result<Memory, ConfigError> {
    config.validate()?;
    let space = AddressSpace::new(config);
    let mut memory = Memory {
      cells: vec![Cell::default(); space.window()],
      space,
      bounds_warnings: 0,
    };
    for &(address, value) in &config.prewritten {
      memory.poke(address, value);
    }
    Ok(memory)
  }

  // region Cell access

  pub fn read(&mut self, address: AddressNumberType) -> Word {
    let cell = &mut self.cells[self.space.idx(address)];
    cell.accesses += 1;
    cell.value
  }

  pub fn write(&mut self, address: AddressNumberType, value: Word) {
    let cell = &mut self.cells[self.space.idx(address)];
    cell.accesses += 1;
    cell.value = value;
  }

  /// Reads without counting the access.
  pub fn peek(&self, address: AddressNumberType) -> Cell {
    self.cells[self.space.idx(address)]
  }

  /// Writes without counting the access.
  pub fn poke(&mut self, address: AddressNumberType, value: Word) {
    let idx = self.space.idx(address);
    self.cells[idx].value = value;
  }

  /// Adds one to the program counter. Counts as a single write.
  pub fn advance_pc(&mut self) {
    let pc = self.peek(PC_ADDRESS).value.wrapping_add(1);
    self.write(PC_ADDRESS, pc);
  }

  // endregion

  /**
    Resolves an operand to the value the ALU sees. A direct operand is its literal reduced
    into 16 bits and never touches memory. Otherwise the literal is used as an address and
    dereferenced once per level of indirection.

    Each address is checked before it is read. An address in the overflow band is logged and
    counted, and the read goes ahead on the wrapped address anyway.
  */
  pub fn resolve(&mut self, operand: &Operand, origin: Origin) -> Word {
    let mut value = operand.literal;

    for _ in 0..operand.mode.depth() {
      if self.space.is_out_of_bounds(value) {
        log::warn!(
          "Address overflow at pc {} with address {} (d{}), n_steps: {}",
          origin.pc, value, origin.operand, origin.step
        );
        self.bounds_warnings += 1;
      }
      value = self.read(value) as AddressNumberType;
    }

    to_word(value)
  }

  pub fn cells(&self) -> &[Cell] {
    &self.cells
  }

  pub fn bounds_warnings(&self) -> u64 {
    self.bounds_warnings
  }

}
