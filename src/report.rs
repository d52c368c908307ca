/*!
  End-of-run diagnostics: how long the program ran, how much of memory it touched, and
  snapshots of both ends of the heap. None of this affects the program's output.
*/

use std::fmt::{Display, Formatter};

use prettytable::{format as TableFormat, Table};

use crate::address::AddressNumberType;
use crate::machine::Machine;
use crate::memory::Cell;
use crate::stdio::{self, STDOUT_ADDRESS};

/// Number of cells shown at each end of the heap.
const SNAPSHOT_SIZE: AddressNumberType = 20;
/// Number of ROM lines shown in the fetch ranking.
const HOT_LINES: usize = 10;

pub struct Report {
  rom_size: usize,
  steps: u64,
  bounds_warnings: u64,
  touched_cells: usize,
  max_touched: Option<usize>,
  stdin_buffer: String,
  head: Vec<(AddressNumberType, Cell)>,
  tail: Vec<(AddressNumberType, Cell)>,
  stack_pointer: AddressNumberType,
  hot_lines: Vec<(usize, u64)>,
}

impl Report {

  pub fn new(machine: &Machine) -> Report {
    let memory = machine.memory();
    let config = machine.config();

    let touched: Vec<usize> =
      memory.cells()
            .iter()
            .enumerate()
            .filter(|(_, cell)| cell.accesses > 0)
            .map(|(i, _)| i)
            .collect();

    // The stdin buffer runs up to its first zero word.
    let stdin_base = config.stdin_base as AddressNumberType;
    let stdin_words: Vec<_> =
      (stdin_base..stdin_base + memory.cells().len() as AddressNumberType)
        .map(|address| memory.peek(address).value)
        .take_while(|&word| word != 0)
        .collect();
    let stdin_bytes = stdio::unpack(&stdin_words);
    let stdin_buffer = String::from_utf8_lossy(&stdin_bytes).trim_end_matches('\0').to_string();

    let head = (0..SNAPSHOT_SIZE)
      .map(|address| (address, memory.peek(address)))
      .collect();
    let top = config.stdout_base as AddressNumberType;
    let tail = (top - SNAPSHOT_SIZE..=top)
      .rev()
      .map(|address| (address, memory.peek(address)))
      .collect();

    let mut hot_lines: Vec<(usize, u64)> =
      machine.rom()
             .reads()
             .iter()
             .copied()
             .enumerate()
             .filter(|&(_, reads)| reads > 0)
             .collect();
    hot_lines.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    hot_lines.truncate(HOT_LINES);

    Report {
      rom_size        : machine.rom().len(),
      steps           : machine.steps(),
      bounds_warnings : memory.bounds_warnings(),
      touched_cells   : touched.len(),
      max_touched     : touched.last().copied(),
      stdin_buffer,
      head,
      tail,
      stack_pointer   : memory.peek(STDOUT_ADDRESS).value as AddressNumberType,
      hot_lines,
    }
  }

  fn make_cell_table(cells: &[(AddressNumberType, Cell)], highlight: AddressNumberType) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Address", ubl->"Value", ubl->"Accesses"]);

    for (address, cell) in cells {
      let label = match *address == highlight {
        true  => format!("* --> [{}] =", address),
        false => format!("[{}] =", address),
      };
      table.add_row(row![r->label, cell.value, cell.accesses]);
    }
    table
  }

  fn make_rom_table(lines: &[(usize, u64)]) -> Table {
    let mut table = Table::new();

    table.set_format(*TABLE_DISPLAY_FORMAT);
    table.set_titles(row![ubr->"Line", ubl->"Fetches"]);

    for (line, reads) in lines {
      table.add_row(row![r->line, reads]);
    }
    table
  }

}

lazy_static! {
  static ref TABLE_DISPLAY_FORMAT: TableFormat::TableFormat =
    TableFormat::FormatBuilder::new()
      .column_separator('│')
      .borders(' ')
      .separator(
        TableFormat::LinePosition::Title,
        TableFormat::LineSeparator::new('─', '┼', ' ', ' ')
      )
      .separator(
        TableFormat::LinePosition::Bottom,
        TableFormat::LineSeparator::new('─', '┴', ' ', ' ')
      )
      .padding(1, 1)
      .build();
}

impl Display for Report {
  fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
    writeln!(f, "stdin buffer: {}", self.stdin_buffer.escape_debug())?;
    writeln!(f, "ROM size: {}", self.rom_size)?;
    writeln!(f, "n_steps: {}", self.steps)?;
    writeln!(f, "Bounds warnings: {}", self.bounds_warnings)?;
    writeln!(f, "Nonzero write count ram addresses: {}", self.touched_cells)?;
    match self.max_touched {
      Some(address) => writeln!(f, "Nonzero write count ram max address: {}", address)?,
      None          => writeln!(f, "Nonzero write count ram max address: none")?,
    }

    let head_table = Report::make_cell_table(&self.head, -1);
    let tail_table = Report::make_cell_table(&self.tail, self.stack_pointer);
    let rom_table  = Report::make_rom_table(&self.hot_lines);

    let mut combined_table = table!([head_table, tail_table, rom_table]);
    combined_table.set_titles(row![ub->"Low Memory", ub->"Output Stack", ub->"Hottest Lines"]);
    combined_table.set_format(*TABLE_DISPLAY_FORMAT);

    write!(f, "{}", combined_table)
  }
}
