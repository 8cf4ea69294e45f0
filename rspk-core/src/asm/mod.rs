pub mod encoder;
pub mod lexer;

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AsmError {
    #[error(transparent)]
    Lex(#[from] lexer::LexError),

    #[error(transparent)]
    Encode(#[from] encoder::EncodeError),
}

/// Assemble mnemonic source text into the packed binary image. Fails
/// fast on the first lexical or encoding error; no partial image is
/// produced.
pub fn assemble(source: &str) -> Result<Vec<u8>, AsmError> {
    let tokens = lexer::tokenize(source)?;
    let image = encoder::encode(&tokens)?;
    Ok(image)
}
