/*!
  Machine configuration. A single `Config` value is built once at startup and handed to
  `Machine::new`; nothing here is global.

  The memory window is deliberately smaller than the 16 bit address space: QFTASM address
  fields are 16 bits wide but the machine only has `memory_wrap` cells installed, so every
  address is reduced modulo the window before it touches a cell.
*/

use std::fs;
use std::path::Path;

use nom::{
  character::complete::{char as one_char, digit1, not_line_ending, space0, space1},
  combinator::{all_consuming, map_res, opt, recognize},
  sequence::{pair, preceded, separated_pair, terminated, tuple},
  IResult
};

use crate::bytecode::Word;
use crate::error::ConfigError;

/// How the standard streams are connected to memory.
#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum StdioMode {
  /// No input is loaded and no output is produced.
  Disabled,
  /// Stdin is packed into RAM before the first cycle and the output stack is unpacked after
  /// the machine halts.
  Buffered,
  /// Cell 1 and cell 2 act as character ports serviced after every cycle.
  Streaming,
}

#[derive(Clone, Debug)]
pub struct Config {
  /// Number of installed memory cells.
  pub memory_wrap: usize,
  /// First cell of the packed stdin buffer. The buffer grows upward.
  pub stdin_base: Word,
  /// Top of the output stack. The program pushes downward from here and keeps the next free
  /// address in cell 2.
  pub stdout_base: Word,
  /// Size of the region at the top of the 16 bit space reserved for negative addresses.
  pub negative_buffer_size: Word,
  pub stdio: StdioMode,
  /// Print the end-of-run report to stderr.
  pub ram_dump: bool,
  /// `(address, value)` pairs stored into memory before the program starts.
  pub prewritten: Vec<(i64, Word)>,
}

impl Default for Config {
  fn default() -> Config {
    Config {
      memory_wrap          : 1024,
      stdin_base           : 350,
      stdout_base          : 823,
      negative_buffer_size : 200,
      stdio                : StdioMode::Buffered,
      ram_dump             : true,
      prewritten           : vec![],
    }
  }
}

impl Config {

  /// The highest address a program may touch without leaving the heap.
  pub fn heap_max(&self) -> i64 {
    self.stdout_base as i64 + 1
  }

  /// Checks the settings that would leave the machine unable to address memory.
  pub fn validate(&self) -> Result<(), ConfigError> {
    if self.memory_wrap == 0 {
      return Err(ConfigError::EmptyWindow);
    }
    Ok(())
  }

  /// Reads a prewritten RAM file and appends its entries to `self.prewritten`.
  pub fn load_prewritten<P: AsRef<Path>>(&mut self, path: P) -> Result<(), ConfigError> {
    let text = fs::read_to_string(path)?;
    self.prewritten.extend(parse_prewritten(&text)?);
    Ok(())
  }

}

fn integer(input: &str) -> IResult<&str, i64> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |digits: &str| digits.parse::<i64>()
  )(input)
}

fn word(input: &str) -> IResult<&str, Word> {
  map_res(digit1, |digits: &str| digits.parse::<Word>())(input)
}

/// `<address> <value> [; comment]`
fn prewritten_entry(input: &str) -> IResult<&str, (i64, Word)> {
  terminated(
    preceded(space0, separated_pair(integer, space1, word)),
    tuple((space0, opt(preceded(one_char(';'), not_line_ending))))
  )(input)
}

/**
  Parses the prewritten RAM format: one `<address> <value>` pair per line. Blank lines and
  lines holding only a `;` comment are skipped. Line numbers in errors count from 1.
*/
pub fn parse_prewritten(text: &str) -> Result<Vec<(i64, Word)>, ConfigError> {
  let mut entries = Vec::new();

  for (index, line) in text.lines().enumerate() {
    let line = line.trim();
    if line.is_empty() || line.starts_with(';') {
      continue;
    }
    match all_consuming(prewritten_entry)(line) {
      Ok((_, entry)) => entries.push(entry),
      Err(_) => {
        return Err(ConfigError::Malformed { line: index + 1, text: line.to_string() });
      }
    }
  }

  Ok(entries)
}
