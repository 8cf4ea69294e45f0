use thiserror::Error;

use crate::instr;
use crate::mem::Reg;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Instruction(String),
    Str(String),
    Number(u32),
    Header(String),
    Label(String),
    Register(String),
    Comment(String),
}

impl Token {
    /// Source-facing rendering used in diagnostics.
    pub fn text(&self) -> String {
        match self {
            Token::Instruction(s)
            | Token::Str(s)
            | Token::Header(s)
            | Token::Label(s)
            | Token::Register(s)
            | Token::Comment(s) => s.clone(),
            Token::Number(v) => v.to_string(),
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("invalid header at line {row}, column {column}")]
    InvalidHeader { row: usize, column: usize },

    #[error("invalid syntax \"{text}\" at line {row}, column {column}")]
    InvalidSyntax { text: String, row: usize, column: usize },

    #[error("malformed number \"{text}\" at line {row}, column {column}")]
    MalformedNumber { text: String, row: usize, column: usize },

    #[error("unrecognized token \"{ch}\" at line {row}, column {column}")]
    UnrecognizedToken { ch: char, row: usize, column: usize },
}

fn is_ident_char(c: char) -> bool {
    c.is_ascii_alphabetic() || c == '_'
}

/// Base auto-detection: an `0x` prefix is hexadecimal, everything else
/// decimal.
fn parse_number(text: &str) -> Option<u32> {
    let lower = text.to_lowercase();
    match lower.strip_prefix("0x") {
        Some(hex) => u32::from_str_radix(hex, 16).ok(),
        None => lower.parse::<u32>().ok(),
    }
}

///
/// Scan the full source text into a flat token sequence. Stops at the
/// first error; the row and column in the error point at the failure.
///
/// Spaces and tabs are skippers, a newline resets the column counter,
/// `,` separates and is discarded, `*` opens a line comment (the token
/// is kept, the encoder skips it), `.` opens a section header, `"` and
/// `'` delimit string literals verbatim. An identifier becomes an
/// instruction if the mnemonic table knows it, a label if it ends in
/// `:`, else a register if the register table knows its lowercase form.
///
pub fn tokenize(buffer: &str) -> Result<Vec<Token>, LexError> {
    let chars: Vec<char> = buffer.chars().collect();
    let mut pos = 0;
    let mut column = 1;
    let mut row = 0;

    let mut tokens = Vec::new();

    while pos < chars.len() {
        let current = chars[pos];

        match current {
            ' ' | '\t' => {
                column += 1;
                pos += 1;
            }
            '\n' => {
                column = 1;
                row += 1;
                pos += 1;
            }
            '"' | '\'' => {
                let quote = current;
                pos += 1;
                column += 1;

                let mut res = String::new();
                while pos < chars.len() && chars[pos] != quote {
                    res.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }

                // Past the closing quote
                pos += 1;
                column += 1;
                tokens.push(Token::Str(res));
            }
            '*' => {
                let mut res = String::new();
                while pos < chars.len() && chars[pos] != '\n' {
                    res.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }
                tokens.push(Token::Comment(res));
            }
            '.' => {
                pos += 1;
                column += 1;

                let mut res = String::new();
                while pos < chars.len() && is_ident_char(chars[pos]) {
                    res.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }

                match res.as_str() {
                    "data" | "text" => tokens.push(Token::Header(res)),
                    _ => return Err(LexError::InvalidHeader { row, column }),
                }
            }
            ',' => {
                pos += 1;
                column += 1;
            }
            c if is_ident_char(c) => {
                let mut res = String::new();
                while pos < chars.len() && (is_ident_char(chars[pos]) || chars[pos] == ':') {
                    res.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }

                if instr::by_mnemonic(&res).is_some() {
                    tokens.push(Token::Instruction(res));
                } else if res.ends_with(':') {
                    tokens.push(Token::Label(res));
                } else if Reg::from_name(&res.to_lowercase()).is_some() {
                    tokens.push(Token::Register(res));
                } else {
                    return Err(LexError::InvalidSyntax { text: res, row, column });
                }
            }
            c if c.is_ascii_digit() => {
                let mut res = String::new();
                while pos < chars.len()
                    && (chars[pos].is_ascii_digit() || is_ident_char(chars[pos]) || chars[pos] == 'x')
                {
                    res.push(chars[pos]);
                    pos += 1;
                    column += 1;
                }

                match parse_number(&res) {
                    Some(value) => tokens.push(Token::Number(value)),
                    None => return Err(LexError::MalformedNumber { text: res, row, column }),
                }
            }
            c => return Err(LexError::UnrecognizedToken { ch: c, row, column }),
        }
    }

    Ok(tokens)
}
