//! qftasm: runs a QFTASM ROM with stdin packed into memory and prints the output stack.
//!
//! Usage: `qftasm <rom-file> [<prewritten-ram-file>]`

use std::env;
use std::fs;
use std::io::{self, Read};

use anyhow::{bail, Context};

use qftasm::{Config, Machine, Report, Rom};

fn main() -> anyhow::Result<()> {
  env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

  #[cfg(feature = "trace_computation")]
  log::debug!("Computation tracing ENABLED");

  let args: Vec<String> = env::args().skip(1).collect();
  let (rom_path, prewritten_path) = match args.as_slice() {
    [rom]             => (rom, None),
    [rom, prewritten] => (rom, Some(prewritten)),
    _                 => bail!("usage: qftasm <rom-file> [<prewritten-ram-file>]"),
  };

  let mut config = Config::default();
  if let Some(path) = prewritten_path {
    config.load_prewritten(path)
          .with_context(|| format!("loading prewritten RAM from {}", path))?;
  }

  let text = fs::read_to_string(rom_path)
    .with_context(|| format!("reading ROM from {}", rom_path))?;
  let rom = Rom::from_text(&text);
  log::debug!("Loaded {} ROM lines from {}", rom.len(), rom_path);

  let mut input = Vec::new();
  io::stdin().read_to_end(&mut input).context("reading stdin")?;

  let ram_dump = config.ram_dump;
  let mut machine = Machine::new(config, rom).context("configuring the machine")?;
  machine.load_input(input);

  let stdout = io::stdout();
  let mut out = stdout.lock();
  machine.run(&mut out).with_context(|| format!("running {}", rom_path))?;

  if ram_dump {
    eprintln!();
    eprintln!("{}", Report::new(&machine));
  }

  Ok(())
}
