use std::fmt;
use super::token::Token;

#[derive(Debug, PartialEq, Eq, Clone)]
pub enum LexError {
    UnterminatedQuote(char, usize),
    InvalidUtf8(usize),
}

impl fmt::Display for LexError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LexError::UnterminatedQuote(c, pos) => {
                write!(f, "unterminated quote {} starting at position {}", c, pos)
            }
            LexError::InvalidUtf8(pos) => write!(f, "invalid UTF-8 in input at position {}", pos),
        }
    }
}

impl std::error::Error for LexError {}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Start,
    InWord,
    InSingleQuote,
    InDoubleQuote,
}

pub struct Lexer<'a> {
    chars: std::iter::Enumerate<std::str::Chars<'a>>,
    state: State,
    buf: String,
    quote_start: usize,
    tokens: Vec<Token>,
}

impl<'a> Lexer<'a> {
    pub fn new(input: &'a str) -> Self {
        Lexer {
            chars: input.chars().enumerate(),
            state: State::Start,
            buf: String::new(),
            quote_start: 0,
            tokens: Vec::new(),
        }
    }

    /// Runs the DFA to the end of the line (end of input, `\n` or NUL).
    /// A blank line yields an empty vector.
    pub fn tokenize(mut self) -> Result<Vec<Token>, LexError> {
        loop {
            let next = self.chars.next().filter(|&(_, c)| c != '\n' && c != '\0');
            let Some((pos, ch)) = next else {
                return self.finish();
            };
            self.step(pos, ch);
        }
    }

    fn step(&mut self, pos: usize, ch: char) {
        match self.state {
            State::Start | State::InWord => match ch {
                '\'' => self.open_quote(State::InSingleQuote, pos),
                '"' => self.open_quote(State::InDoubleQuote, pos),
                c if c.is_whitespace() => {
                    self.close_word();
                    self.state = State::Start;
                }
                c => match Token::operator(c) {
                    Some(op) => {
                        self.close_word();
                        self.tokens.push(op);
                        self.state = State::Start;
                    }
                    None => {
                        self.buf.push(c);
                        self.state = State::InWord;
                    }
                },
            },
            State::InSingleQuote => self.quoted(ch, '\''),
            State::InDoubleQuote => self.quoted(ch, '"'),
        }
    }

    fn open_quote(&mut self, state: State, pos: usize) {
        self.quote_start = pos;
        self.state = state;
    }

    // Quoted text is copied verbatim; the matching quote falls back into the word.
    fn quoted(&mut self, ch: char, quote: char) {
        if ch == quote {
            self.state = State::InWord;
        } else {
            self.buf.push(ch);
        }
    }

    fn close_word(&mut self) {
        if self.state == State::InWord {
            self.tokens.push(Token::Word(std::mem::take(&mut self.buf)));
        }
    }

    fn finish(mut self) -> Result<Vec<Token>, LexError> {
        match self.state {
            State::InSingleQuote => Err(LexError::UnterminatedQuote('\'', self.quote_start)),
            State::InDoubleQuote => Err(LexError::UnterminatedQuote('"', self.quote_start)),
            State::Start | State::InWord => {
                self.close_word();
                Ok(self.tokens)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn word(s: &str) -> Token {
        Token::Word(s.to_string())
    }

    fn lex(input: &str) -> Vec<Token> {
        Lexer::new(input).tokenize().unwrap()
    }

    #[test]
    fn test_tokenize_simple_words() {
        assert_eq!(lex("echo hello"), vec![word("echo"), word("hello")]);
    }

    #[test]
    fn test_tokenize_operators_without_spaces() {
        assert_eq!(
            lex("cat<in|sort>out&"),
            vec![
                word("cat"),
                Token::RedirectIn,
                word("in"),
                Token::Pipe,
                word("sort"),
                Token::RedirectOut,
                word("out"),
                Token::Background,
            ]
        );
    }

    #[test]
    fn test_single_quoted_word() {
        assert_eq!(lex("ls 'foo bar'"), vec![word("ls"), word("foo bar")]);
    }

    #[test]
    fn test_double_quoted_operators_are_literal() {
        assert_eq!(lex("echo \"a | b > c &\""), vec![word("echo"), word("a | b > c &")]);
    }

    #[test]
    fn test_quotes_join_adjacent_text() {
        assert_eq!(lex("a'b c'\"d\"e"), vec![word("ab cde")]);
    }

    #[test]
    fn test_no_escape_processing_in_quotes() {
        assert_eq!(lex(r#"echo 'a\nb' "c\"#), vec![word("echo"), word(r"a\nb"), word(r"c\")]);
    }

    #[test]
    fn test_empty_quotes_make_empty_word() {
        assert_eq!(lex("echo '' x"), vec![word("echo"), word(""), word("x")]);
    }

    #[test]
    fn test_other_quote_kind_is_plain_text() {
        assert_eq!(lex("echo \"it's\""), vec![word("echo"), word("it's")]);
    }

    #[test]
    fn test_unterminated_single_quote() {
        let result = Lexer::new("echo 'foo").tokenize();
        assert_eq!(result, Err(LexError::UnterminatedQuote('\'', 5)));
    }

    #[test]
    fn test_unterminated_double_quote_at_newline() {
        let result = Lexer::new("echo \"foo\nbar\"").tokenize();
        assert_eq!(result, Err(LexError::UnterminatedQuote('"', 5)));
    }

    #[test]
    fn test_stops_at_newline_and_nul() {
        assert_eq!(lex("ls -l\n"), vec![word("ls"), word("-l")]);
        assert_eq!(lex("ls\0 ignored"), vec![word("ls")]);
    }

    #[test]
    fn test_blank_lines_yield_nothing() {
        assert_eq!(lex(""), vec![]);
        assert_eq!(lex(" \t  \n"), vec![]);
    }

    #[test]
    fn test_error_message() {
        let err = LexError::UnterminatedQuote('"', 3);
        assert_eq!(err.to_string(), "unterminated quote \" starting at position 3");
    }
}
