use thiserror::Error;

use crate::asm::lexer::Token;
use crate::consts::{opcode, section, tag};
use crate::instr;
use crate::mem::Reg;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EncodeError {
    #[error("invalid instruction \"{0}\"")]
    UnknownInstruction(String),

    #[error("invalid number of arguments for {0} instruction")]
    MissingOperands(String),

    #[error("invalid operand \"{operand}\" for {mnemonic} instruction")]
    BadOperand { mnemonic: String, operand: String },

    #[error("unknown register \"{0}\"")]
    UnknownRegister(String),

    #[error("cannot have label with specified type at token \"{0}\"")]
    BadLabelBody(String),

    #[error("label body character {0:?} does not fit the data encoding")]
    NonByteChar(char),

    #[error("number {0:#x} does not fit in an operand")]
    OperandRange(u32),

    #[error("expected instruction, header, or label at token \"{0}\"")]
    UnexpectedToken(String),
}

fn emit_number(out: &mut Vec<u8>, value: u32) -> Result<(), EncodeError> {
    if value <= 0xFF {
        out.push(tag::IMM8);
        out.push(value as u8);
    } else if value <= 0xFFFF {
        out.push(tag::IMM16);
        out.push((value >> 8) as u8);
        out.push(value as u8);
    } else {
        return Err(EncodeError::OperandRange(value));
    }
    Ok(())
}

///
/// Encode the token sequence into the packed binary image in one
/// left-to-right pass with an explicit cursor. Stops at the first error;
/// nothing is handed to the caller on failure, so a bad program can
/// never leave a half-written file behind.
///
/// Headers become section sentinel cells, comments are skipped, a label
/// plus its string body becomes raw data bytes (with `\n` escapes
/// expanded), an instruction becomes its opcode byte followed by one
/// tagged cell per declared operand. `nop` is the one asymmetry: the
/// token is legal but no byte is emitted for it.
///
pub fn encode(tokens: &[Token]) -> Result<Vec<u8>, EncodeError> {
    let mut out = Vec::new();
    let mut pos = 0;

    while pos < tokens.len() {
        match &tokens[pos] {
            Token::Header(name) => {
                out.push(match name.as_str() {
                    "data" => section::DATA,
                    _ => section::TEXT,
                });
            }
            Token::Comment(_) => {}
            Token::Label(_) => {
                pos += 1;
                match tokens.get(pos) {
                    Some(Token::Str(body)) => {
                        for ch in body.replace("\\n", "\n").chars() {
                            let value = u32::from(ch);
                            if value >= u32::from(section::TEXT) {
                                return Err(EncodeError::NonByteChar(ch));
                            }
                            out.push(value as u8);
                        }
                    }
                    Some(other) => return Err(EncodeError::BadLabelBody(other.text())),
                    None => return Err(EncodeError::BadLabelBody(String::from("end of input"))),
                }
            }
            Token::Instruction(mnemonic) => {
                let desc = instr::by_mnemonic(mnemonic)
                    .ok_or_else(|| EncodeError::UnknownInstruction(mnemonic.clone()))?;

                // Elided to keep images small: the token is legal, the
                // byte never appears.
                if desc.opcode != opcode::NOP {
                    out.push(desc.opcode);
                }

                for _ in 0..desc.operands {
                    pos += 1;
                    match tokens.get(pos) {
                        Some(Token::Number(value)) => emit_number(&mut out, *value)?,
                        Some(Token::Register(name)) => {
                            let reg = Reg::from_name(&name.to_lowercase())
                                .ok_or_else(|| EncodeError::UnknownRegister(name.clone()))?;
                            out.push(tag::REG);
                            out.push(reg.code());
                        }
                        Some(other) => {
                            return Err(EncodeError::BadOperand {
                                mnemonic: mnemonic.clone(),
                                operand: other.text(),
                            })
                        }
                        None => return Err(EncodeError::MissingOperands(mnemonic.clone())),
                    }
                }
            }
            other => return Err(EncodeError::UnexpectedToken(other.text())),
        }

        pos += 1;
    }

    Ok(out)
}
