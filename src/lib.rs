//! An interpreter for QFTASM, a 16 bit, three-operand, memory-to-memory instruction set with a
//! one-cycle write-back pipeline and memory-mapped standard I/O.

#[macro_use] extern crate prettytable;
#[macro_use] extern crate lazy_static;
extern crate strum;
extern crate strum_macros;
extern crate nom;

pub mod address;
pub mod alu;
pub mod bytecode;
pub mod config;
pub mod error;
pub mod machine;
pub mod memory;
pub mod report;
pub mod rom;
pub mod stdio;

pub use config::{Config, StdioMode};
pub use machine::{Machine, State};
pub use report::Report;
pub use rom::Rom;
