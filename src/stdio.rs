/*!
  Standard I/O through memory.

  In buffered mode the whole of stdin is packed into memory before the first cycle, two
  bytes per word with the first byte in the low half, starting at `Config::stdin_base` and
  growing upward. The program pushes output bytes on a stack that grows downward from
  `Config::stdout_base`, keeping the next free address in cell 2. After the machine halts the
  stack is read from its top down to cell 2's address + 1, one byte per cell, which gives the
  bytes back in the order they were pushed.

  In streaming mode cell 1 and cell 2 are character ports, see `StreamingPort`.
*/

use std::io::Write;

use crate::address::AddressNumberType;
use crate::bytecode::Word;
use crate::memory::Memory;

/// Cell 1 is the stdin port in streaming mode.
pub const STDIN_ADDRESS: AddressNumberType = 1;
/// Cell 2 is the stdout port in streaming mode and the output stack pointer in buffered mode.
pub const STDOUT_ADDRESS: AddressNumberType = 2;

/// Written to the stdin port by a program that wants the next byte.
pub const STDIO_OPEN: Word = 1 << 8;
/// Written to the stdout port by a program that is about to emit a byte.
pub const STDIO_CLOSED: Word = 1 << 9;

/// Packs bytes two to a word, low byte first. An odd trailing byte gets a zero high byte.
pub fn pack(bytes: &[u8]) -> Vec<Word> {
  bytes
    .chunks(2)
    .map(|pair| {
      let low = pair[0] as Word;
      let high = pair.get(1).copied().unwrap_or(0) as Word;
      low | (high << 8)
    })
    .collect()
}

/// The inverse of `pack`, including any zero padding.
pub fn unpack(words: &[Word]) -> Vec<u8> {
  words
    .iter()
    .flat_map(|&word| vec![(word & 0xFF) as u8, (word >> 8) as u8])
    .collect()
}

/**
  Writes packed input into memory. Each word counts as one access of its cell.

  The buffer ends at the top of the memory window. Input that does not fit is dropped with a
  warning instead of wrapping around onto the program counter and the ports.
*/
pub fn load_stdin(memory: &mut Memory, base: Word, bytes: &[u8]) {
  let capacity = memory.cells().len().saturating_sub(base as usize);
  let words = pack(bytes);

  if words.len() > capacity {
    let dropped = bytes.len() - (capacity * 2).min(bytes.len());
    log::warn!(
      "Input is {} bytes but only {} fit above address {}; dropping the last {}",
      bytes.len(), capacity * 2, base, dropped
    );
  }

  for (offset, word) in words.into_iter().take(capacity).enumerate() {
    memory.write(base as AddressNumberType + offset as AddressNumberType, word);
  }
  log::debug!("Loaded {} bytes of input at address {}", bytes.len().min(capacity * 2), base);
}

/// Reads the output stack, top first, keeping the low byte of every cell.
pub fn drain_stdout(memory: &Memory, stdout_base: Word) -> Vec<u8> {
  let bottom = memory.peek(STDOUT_ADDRESS).value as AddressNumberType + 1;
  let top = stdout_base as AddressNumberType;

  (bottom..=top)
    .rev()
    .map(|address| (memory.peek(address).value & 0xFF) as u8)
    .collect()
}

/**
  The unbuffered character protocol. After each cycle:

   * if the stdin port holds `STDIO_OPEN`, the next input byte is stored there, or 0 once the
     input is used up;
   * if the stdout port holds `STDIO_CLOSED` the port becomes ready, and the next different
     value written there is emitted as one byte.

  The first two cycles are ignored so that a program can initialize its ports.
*/
pub struct StreamingPort {
  input: Vec<u8>,
  cursor: usize,
  stdout_ready: bool,
}

impl StreamingPort {

  pub fn new(input: Vec<u8>) -> StreamingPort {
    StreamingPort {
      input,
      cursor: 0,
      stdout_ready: false,
    }
  }

  /// Services both ports after the cycle that executed the instruction at `pc`.
  pub fn service<W: Write>(&mut self, pc: Word, memory: &mut Memory, out: &mut W)
    -> std::io::Result<()>
  {
    if pc <= 1 {
      return Ok(());
    }

    if memory.peek(STDIN_ADDRESS).value == STDIO_OPEN {
      let next = match self.input.get(self.cursor) {
        Some(&byte) => {
          self.cursor += 1;
          byte as Word
        }
        None => 0
      };
      memory.poke(STDIN_ADDRESS, next);
    }

    let stdout = memory.peek(STDOUT_ADDRESS).value;
    if stdout == STDIO_CLOSED {
      self.stdout_ready = true;
    } else if self.stdout_ready {
      out.write_all(&[(stdout & 0xFF) as u8])?;
      out.flush()?;
      self.stdout_ready = false;
    }

    Ok(())
  }

}
