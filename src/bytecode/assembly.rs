/*!
  The human readable textual form of a QFTASM instruction. This module leverages the `strum`
  derives of the instruction related enums to deserialize assembly text into an
  `Instruction`.

  A line looks like this:

  ```text
  12. ADD A100 -1 B3 ; comment
  ```

  The line number and the comment are checked for syntax and then thrown away.
*/

use std::str::FromStr;

use nom::{
  character::complete::{
    alpha1,
    char as one_char,
    digit1,
    not_line_ending,
    one_of,
    space0,
    space1
  },
  combinator::{all_consuming, map, map_res, opt, recognize},
  multi::many0,
  sequence::{pair, preceded, terminated, tuple},
  IResult
};

use crate::address::AddressNumberType;
use crate::bytecode::{AddressingMode, Instruction, Opcode, Operand};
use crate::error::DecodeError;

fn integer(input: &str) -> IResult<&str, AddressNumberType> {
  map_res(
    recognize(pair(opt(one_char('-')), digit1)),
    |digits: &str| digits.parse::<AddressNumberType>()
  )(input)
}

/// An operand without a mode letter is direct.
fn addressing_mode(input: &str) -> IResult<&str, AddressingMode> {
  map(
    opt(map_res(recognize(one_of("ABC")), AddressingMode::from_str)),
    |mode: Option<AddressingMode>| mode.unwrap_or(AddressingMode::Direct)
  )(input)
}

fn operand(input: &str) -> IResult<&str, Operand> {
  map(
    pair(addressing_mode, integer),
    |(mode, literal)| Operand::new(mode, literal)
  )(input)
}

fn line_number(input: &str) -> IResult<&str, AddressNumberType> {
  terminated(integer, preceded(space0, one_char('.')))(input)
}

fn comment(input: &str) -> IResult<&str, &str> {
  preceded(one_char(';'), not_line_ending)(input)
}

/// Splits a line into its line number, mnemonic and operands. The operand count is not
/// checked here so that an arity error can be told apart from a syntax error.
fn line(input: &str) -> IResult<&str, (AddressNumberType, &str, Vec<Operand>)> {
  let (rest, (number, name, operands, _, _, _)) = all_consuming(
    tuple((
      preceded(space0, line_number),
      preceded(space0, alpha1),
      many0(preceded(space1, operand)),
      space0,
      opt(comment),
      space0
    ))
  )(input)?;
  Ok((rest, (number, name, operands)))
}

/**
  Decodes one ROM line into its line number and instruction. Decoding is pure: a line decodes
  to the same result every time.
*/
pub fn parse_line(text: &str) -> Result<(AddressNumberType, Instruction), DecodeError> {
  let text = text.trim_end();

  let (number, name, operands) = match line(text) {
    Ok((_rest, parsed)) => parsed,
    Err(_e) => {
      return Err(DecodeError::Malformed { text: text.to_string() });
    }
  };

  let opcode = match Opcode::from_str(name) {
    Ok(opcode) => opcode,
    Err(_e) => {
      return Err(DecodeError::NotAnOperation { name: name.to_string() });
    }
  };

  match operands.as_slice() {
    &[a, b, c] => Ok((number, Instruction { opcode, operands: [a, b, c] })),
    other      => Err(DecodeError::WrongArity { operation: opcode, given: other.len() })
  }
}

/// Decodes one ROM line, discarding its line number.
pub fn decode_line(text: &str) -> Result<Instruction, DecodeError> {
  parse_line(text).map(|(_number, instruction)| instruction)
}
