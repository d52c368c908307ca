/*!

  QFTASM instructions are three-operand and memory-to-memory: there are no registers besides
  memory cell 0, which holds the program counter. Every operand is a literal plus an
  addressing mode, the number of times the literal is dereferenced through memory before
  the operation sees it. Memory words are 16 bits wide.

  Programs arrive as text, one instruction per line:

  ```text
  <lineno>. <OPCODE> [A|B|C]<int> [A|B|C]<int> [A|B|C]<int> [; comment]
  ```

  The letters select one, two or three levels of indirection. Labels have already been
  resolved into integers by the time text reaches this module.

*/

mod assembly;
mod instruction;

pub use assembly::{decode_line, parse_line};
pub use instruction::{AddressingMode, Instruction, Opcode, Operand};

/// The machine word. Every memory cell holds one.
pub type Word = u16;
