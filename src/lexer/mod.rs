mod lexer;
mod token;

pub use lexer::{LexError, Lexer};
pub use token::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LexOutcome {
    Empty,
    Tokens(Vec<Token>),
}

/// Decodes a raw input line. The error position counts characters, like
/// the other lexer positions.
pub fn decode(bytes: &[u8]) -> Result<&str, LexError> {
    std::str::from_utf8(bytes).map_err(|e| {
        let valid = String::from_utf8_lossy(&bytes[..e.valid_up_to()]);
        LexError::InvalidUtf8(valid.chars().count())
    })
}

pub fn tokenize(line: &str) -> Result<LexOutcome, LexError> {
    let tokens = Lexer::new(line).tokenize()?;
    if tokens.is_empty() {
        Ok(LexOutcome::Empty)
    } else {
        Ok(LexOutcome::Tokens(tokens))
    }
}
