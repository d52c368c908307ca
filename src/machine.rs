//! The QFTASM machine: memory, ROM and the pipeline that runs one instruction per cycle.

use std::io::Write;

use crate::alu::{self, WriteBack};
use crate::bytecode::Word;
use crate::config::{Config, StdioMode};
use crate::error::{ConfigError, MachineError};
use crate::memory::{Memory, Origin, PC_ADDRESS};
use crate::rom::Rom;
use crate::stdio::{self, StreamingPort};

#[derive(Copy, Clone, Eq, PartialEq, Debug)]
pub enum State {
  Running,
  Halted,
}

pub struct Machine {
  config: Config,
  memory: Memory,
  rom: Rom,
  state: State,
  /// The result computed last cycle, committed at the start of this one.
  pending: Option<WriteBack>,
  steps: u64,
  port: Option<StreamingPort>,
}

impl Machine {

  pub fn new(config: Config, rom: Rom) -> Result<Machine, ConfigError> {
    let memory = Memory::new(&config)?;
    Ok(Machine {
      config,
      memory,
      rom,
      state: State::Running,
      pending: None,
      steps: 0,
      port: None,
    })
  }

  /**
    Connects the program's input. Must be called before the first cycle. In buffered mode the
    bytes are packed into memory right away; in streaming mode they are handed out through
    the stdin port as the program asks for them.
  */
  pub fn load_input(&mut self, bytes: Vec<u8>) {
    match self.config.stdio {
      StdioMode::Buffered  => stdio::load_stdin(&mut self.memory, self.config.stdin_base, &bytes),
      StdioMode::Streaming => self.port = Some(StreamingPort::new(bytes)),
      StdioMode::Disabled  => {}
    }
  }

  // region Pipeline

  /**
    Runs one cycle:

     1. fetch the program counter from cell 0 and halt if it is past the end of the ROM,
     2. decode the ROM line if this is its first fetch,
     3. commit the previous cycle's write-back,
     4. resolve the three operands in order,
     5. compute this cycle's write-back,
     6. advance the program counter.

    Because the commit comes after the fetch, a write to cell 0 takes effect as a jump one
    instruction late.
  */
  pub fn step<W: Write>(&mut self, out: &mut W) -> Result<State, MachineError> {
    if self.state == State::Halted {
      return Ok(State::Halted);
    }

    let pc = self.memory.read(PC_ADDRESS);
    if pc as usize >= self.rom.len() {
      self.halt();
      return Ok(State::Halted);
    }

    let instruction = self.rom.fetch(pc)?;

    if let Some(write_back) = self.pending.take() {
      self.commit(write_back);
    }

    let step = self.steps;
    let mut values: [Word; 3] = [0; 3];
    for (index, operand) in instruction.operands.iter().enumerate() {
      values[index] = self.memory.resolve(operand, Origin { pc, step, operand: index + 1 });
    }
    let [a, b, c] = values;

    self.pending = alu::execute(instruction.opcode, a, b, c);

    #[cfg(feature = "trace_computation")]
    log::trace!(
      "step {:>8}  pc {:>5}  {:<24} a={:<5} b={:<5} c={:<5} -> {}",
      step, pc, instruction.to_string(), a, b, c,
      match self.pending {
        Some(WriteBack { value, destination }) => format!("[{}] := {}", destination, value),
        None => "no write".to_string()
      }
    );

    self.memory.advance_pc();

    if let Some(port) = self.port.as_mut() {
      port.service(pc, &mut self.memory, out)?;
    }

    self.steps += 1;
    Ok(State::Running)
  }

  /// Runs until the program counter leaves the ROM, then writes buffered output to `out`.
  /// A program that never leaves the ROM never returns.
  pub fn run<W: Write>(&mut self, out: &mut W) -> Result<(), MachineError> {
    while self.step(out)? == State::Running {}

    if self.config.stdio == StdioMode::Buffered {
      out.write_all(&self.output())?;
      out.flush()?;
    }
    Ok(())
  }

  fn commit(&mut self, write_back: WriteBack) {
    self.memory.write(write_back.destination as i64, write_back.value);
  }

  /// The last instruction's result is still in flight when the program counter runs off the
  /// ROM. It is committed so that the final state reflects every instruction executed.
  fn halt(&mut self) {
    if let Some(write_back) = self.pending.take() {
      self.commit(write_back);
    }
    self.state = State::Halted;
    log::debug!("Halted after {} steps", self.steps);
  }

  // endregion

  /// The contents of the output stack.
  pub fn output(&self) -> Vec<u8> {
    stdio::drain_stdout(&self.memory, self.config.stdout_base)
  }

  pub fn state(&self) -> State {
    self.state
  }

  pub fn steps(&self) -> u64 {
    self.steps
  }

  pub fn memory(&self) -> &Memory {
    &self.memory
  }

  pub fn rom(&self) -> &Rom {
    &self.rom
  }

  pub fn config(&self) -> &Config {
    &self.config
  }

}


#[cfg(test)]
mod tests {
  use super::*;
  use crate::bytecode::decode_line;
  use crate::memory::Cell;

  fn machine(program: &str) -> Machine {
    Machine::new(Config::default(), Rom::from_text(program)).unwrap()
  }

  fn run(machine: &mut Machine) -> Vec<u8> {
    let mut out = Vec::new();
    machine.run(&mut out).unwrap();
    out
  }

  fn value_at(machine: &Machine, address: i64) -> Word {
    machine.memory().peek(address).value
  }

  #[test]
  fn result_is_visible_the_next_cycle() {
    let mut machine = machine("0. ADD 5 7 100\n1. ADD A100 0 101\n");
    run(&mut machine);
    assert_eq!(value_at(&machine, 100), 12);
    assert_eq!(value_at(&machine, 101), 12);
    assert_eq!(machine.steps(), 2);
  }

  #[test]
  fn result_is_not_visible_the_same_cycle() {
    let mut machine = machine("0. ADD 5 0 10\n1. ADD A10 0 11\n2. ADD A10 0 12\n");
    let mut out = Vec::new();

    machine.step(&mut out).unwrap();
    // Computed but not yet committed.
    assert_eq!(value_at(&machine, 10), 0);

    machine.step(&mut out).unwrap();
    assert_eq!(value_at(&machine, 10), 5);

    machine.run(&mut out).unwrap();
    assert_eq!(value_at(&machine, 11), 5);
    assert_eq!(value_at(&machine, 12), 5);
  }

  #[test]
  fn consecutive_updates_of_one_cell_both_land() {
    let mut machine = machine("0. ADD A10 1 10\n1. ADD A10 1 10\n");
    run(&mut machine);
    assert_eq!(value_at(&machine, 10), 2);
  }

  #[test]
  fn halts_when_pc_reaches_rom_length() {
    let mut machine = machine("0. ADD 0 0 50\n1. ADD 0 0 50\n2. ADD 0 0 50\n");
    let mut out = Vec::new();
    assert_eq!(machine.step(&mut out).unwrap(), State::Running);
    assert_eq!(machine.step(&mut out).unwrap(), State::Running);
    assert_eq!(machine.step(&mut out).unwrap(), State::Running);
    assert_eq!(value_at(&machine, 0), 3);
    assert_eq!(machine.step(&mut out).unwrap(), State::Halted);
    assert_eq!(machine.state(), State::Halted);
    assert_eq!(machine.steps(), 3);
    // Halted machines stay halted.
    assert_eq!(machine.step(&mut out).unwrap(), State::Halted);
  }

  #[test]
  fn last_line_writing_the_pc_still_halts() {
    let mut machine = machine("0. ADD 1 0 50\n1. ADD 0 0 0\n");
    let mut out = Vec::new();
    machine.run(&mut out).unwrap();
    assert_eq!(machine.state(), State::Halted);
    // The drained write put 0 back in the program counter.
    assert_eq!(value_at(&machine, 0), 0);
    assert_eq!(value_at(&machine, 50), 1);
    assert_eq!(machine.steps(), 2);
    assert_eq!(machine.step(&mut out).unwrap(), State::Halted);
    assert_eq!(machine.steps(), 2);
  }

  #[test]
  fn empty_rom_halts_immediately() {
    let mut machine = machine("");
    let mut out = Vec::new();
    assert_eq!(machine.step(&mut out).unwrap(), State::Halted);
    assert_eq!(machine.steps(), 0);
    assert!(out.is_empty());
  }

  #[test]
  fn pc_cell_is_read_and_written_every_cycle() {
    let mut machine = machine("0. ADD 0 0 50\n1. ADD 0 0 50\n");
    run(&mut machine);
    // Two fetches and two advances, plus the fetch that halted.
    assert_eq!(machine.memory().peek(PC_ADDRESS), Cell { value: 2, accesses: 5 });
  }

  #[test]
  fn write_to_pc_jumps_one_instruction_late() {
    // Instruction 0 jumps to 3 (the write lands as 2 and the advance makes it 3).
    // Instruction 1 still runs; instruction 2 is skipped.
    let program = "\
      0. MNZ 1 2 0\n\
      1. ADD 1 0 60\n\
      2. ADD 1 0 61\n\
      3. ADD 1 0 62\n";
    let mut machine = machine(program);
    run(&mut machine);
    assert_eq!(value_at(&machine, 60), 1);
    assert_eq!(value_at(&machine, 61), 0);
    assert_eq!(value_at(&machine, 62), 1);
    assert_eq!(machine.steps(), 3);
  }

  #[test]
  fn loop_counts_down() {
    // 40 counts down from 3; while it is non-zero jump back to 0. Line 3 runs in the jump's
    // delay slot.
    let program = "\
      0. SUB A40 1 40\n\
      1. ADD A41 1 41\n\
      2. MNZ A40 -1 0\n\
      3. ADD 0 0 99\n";
    let mut config = Config::default();
    config.prewritten = vec![(40, 3)];
    let mut machine = Machine::new(config, Rom::from_text(program)).unwrap();
    run(&mut machine);
    assert_eq!(value_at(&machine, 40), 0);
    assert_eq!(value_at(&machine, 41), 3);
  }

  #[test]
  fn mlz_branches_on_negative() {
    let program = "\
      0. MLZ -5 99 70\n\
      1. MLZ 5 99 71\n\
      2. MNZ 0 99 72\n";
    let mut machine = machine(program);
    run(&mut machine);
    assert_eq!(value_at(&machine, 70), 99);
    assert_eq!(value_at(&machine, 71), 0);
    assert_eq!(value_at(&machine, 72), 0);
  }

  #[test]
  fn indirect_destination() {
    // Cell 30 holds 80; `A30` as destination resolves to 80.
    let mut config = Config::default();
    config.prewritten = vec![(30, 80)];
    let mut machine = Machine::new(config, Rom::from_text("0. ADD 4 4 A30\n")).unwrap();
    run(&mut machine);
    assert_eq!(value_at(&machine, 80), 8);
    assert_eq!(value_at(&machine, 30), 80);
  }

  #[test]
  fn echoes_stdin_through_the_buffers() {
    // Copies the two input words at 350 and 351 into the output stack one byte at a time.
    let program = "\
      0. AND A350 255 823\n\
      1. SRE 0 A350 822\n\
      2. AND A351 255 821\n\
      3. ADD 820 0 2\n";
    let mut machine = machine(program);
    machine.load_input(b"abc".to_vec());
    assert_eq!(run(&mut machine), b"abc".to_vec());
    assert_eq!(machine.output(), b"abc".to_vec());
  }

  #[test]
  fn oversized_input_leaves_the_pc_alone() {
    let mut machine = machine("0. ADD 65 0 823\n1. ADD 822 0 2\n");
    machine.load_input(vec![b'z'; 1400]);
    assert_eq!(value_at(&machine, 0), 0);
    assert_eq!(run(&mut machine), b"A".to_vec());
    assert_eq!(machine.steps(), 2);
  }

  #[test]
  fn empty_window_is_rejected() {
    let mut config = Config::default();
    config.memory_wrap = 0;
    assert!(Machine::new(config, Rom::from_text("0. ADD 0 0 99\n")).is_err());
  }

  #[test]
  fn streaming_mode_echo() {
    let mut config = Config::default();
    config.stdio = StdioMode::Streaming;
    let program = "\
      0. ADD 256 0 1\n\
      1. ADD 512 0 2\n\
      2. ADD 0 0 99\n\
      3. ADD A1 0 2\n\
      4. ADD 0 0 99\n";
    let mut machine = Machine::new(config, Rom::from_text(program)).unwrap();
    machine.load_input(b"q".to_vec());
    assert_eq!(run(&mut machine), b"q".to_vec());
  }

  #[test]
  fn disabled_stdio_produces_nothing() {
    let mut config = Config::default();
    config.stdio = StdioMode::Disabled;
    let mut machine = Machine::new(config, Rom::from_text("0. ADD 65 0 823\n1. ADD 822 0 2\n")).unwrap();
    machine.load_input(b"zz".to_vec());
    assert!(run(&mut machine).is_empty());
    assert_eq!(value_at(&machine, 350), 0);
  }

  #[test]
  fn decode_error_is_fatal() {
    let mut machine = machine("0. ADD 1 1 40\n1. NOP 0 0 0\n");
    let mut out = Vec::new();
    match machine.run(&mut out) {
      Err(MachineError::Decode { pc, .. }) => assert_eq!(pc, 1),
      _ => panic!("expected a decode error")
    }
  }

  #[test]
  fn predecoded_rom_runs_the_same() {
    let instructions = vec![
      decode_line("0. ADD 5 7 100").unwrap(),
      decode_line("1. ADD A100 0 101").unwrap(),
    ];
    let mut machine = Machine::new(Config::default(), Rom::from_instructions(instructions)).unwrap();
    run(&mut machine);
    assert_eq!(value_at(&machine, 101), 12);
  }

}
