//! The QFTASM address space. Raw addresses are whatever an operand literal or a memory cell
//! says; they are classified here and reduced into the installed memory window.

use crate::config::Config;

/// Raw addresses are signed because ROM literals may be negative.
pub type AddressNumberType = i64;

/// Size of the architectural address space.
pub const ADDRESS_SPACE: AddressNumberType = 1 << 16;

#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum Region {
  /// Ordinary memory, from cell 0 up to the top of the output stack.
  Heap,
  /// Between the heap and the negative buffer. Nothing should live here.
  Overflow,
  /// The top-of-space buffer addressed with two's complement style "negative" addresses,
  /// or a literal that is negative outright.
  Negative,
  /// Wider than 16 bits. Only a ROM literal can be this large.
  Wide,
}

/// Boundaries of the address space for one machine configuration.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub struct AddressSpace {
  window: usize,
  heap_max: AddressNumberType,
  negative_floor: AddressNumberType,
}

impl AddressSpace {

  pub fn new(config: &Config) -> AddressSpace {
    AddressSpace {
      window         : config.memory_wrap,
      heap_max       : config.heap_max(),
      negative_floor : ADDRESS_SPACE - config.negative_buffer_size as AddressNumberType,
    }
  }

  /// Converts a raw address to an index into the memory window.
  pub fn idx(&self, address: AddressNumberType) -> usize {
    address.rem_euclid(self.window as AddressNumberType) as usize
  }

  pub fn window(&self) -> usize {
    self.window
  }

  pub fn region(&self, address: AddressNumberType) -> Region {
    match address {
      a if a < 0                   => Region::Negative,
      a if a <= self.heap_max      => Region::Heap,
      a if a < self.negative_floor => Region::Overflow,
      a if a < ADDRESS_SPACE       => Region::Negative,
      _                            => Region::Wide,
    }
  }

  /// True if dereferencing `address` deserves a bounds warning.
  pub fn is_out_of_bounds(&self, address: AddressNumberType) -> bool {
    self.region(address) == Region::Overflow
  }

}
