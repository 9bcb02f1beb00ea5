#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    Word(String),   // command, argument or redirection target
    Pipe,           // |
    Background,     // &
    RedirectIn,     // <
    RedirectOut,    // >
}

impl Token {
    /// Operator token for `ch`, if `ch` is one of `& | < >`.
    pub fn operator(ch: char) -> Option<Token> {
        match ch {
            '&' => Some(Token::Background),
            '|' => Some(Token::Pipe),
            '<' => Some(Token::RedirectIn),
            '>' => Some(Token::RedirectOut),
            _ => None,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            Token::Word(s) => s,
            Token::Pipe => "|",
            Token::Background => "&",
            Token::RedirectIn => "<",
            Token::RedirectOut => ">",
        }
    }

    pub fn into_text(self) -> String {
        match self {
            Token::Word(s) => s,
            other => other.text().to_string(),
        }
    }

    pub fn is_word(&self) -> bool {
        matches!(self, Token::Word(_))
    }

    pub fn as_word(&self) -> Option<&str> {
        match self {
            Token::Word(s) => Some(s),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operator_text() {
        for ch in ['&', '|', '<', '>'] {
            let tok = Token::operator(ch).unwrap();
            assert_eq!(tok.text(), ch.to_string());
            assert!(!tok.is_word());
        }
        assert_eq!(Token::operator('a'), None);
    }

    #[test]
    fn test_word_text() {
        let tok = Token::Word("foo bar".to_string());
        assert_eq!(tok.as_word(), Some("foo bar"));
        assert_eq!(tok.into_text(), "foo bar");
    }
}
