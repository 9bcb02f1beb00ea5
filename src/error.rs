use std::fmt;
use std::io;
use crate::executor::ExecError;
use crate::lexer::LexError;
use crate::parser::ParseError;

#[derive(Debug)]
pub enum ShellError {
    Lex(LexError),
    Parse(ParseError),
    Exec(ExecError),
    Io(io::Error),
}

impl ShellError {
    /// Errors that end the interactive loop with status 1.
    pub fn is_fatal(&self) -> bool {
        match self {
            ShellError::Exec(e) => e.is_fatal(),
            ShellError::Io(_) => true,
            _ => false,
        }
    }
}

impl fmt::Display for ShellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShellError::Lex(e) => write!(f, "{}", e),
            ShellError::Parse(e) => write!(f, "{}", e),
            ShellError::Exec(e) => write!(f, "{}", e),
            ShellError::Io(e) => write!(f, "IO error: {}", e),
        }
    }
}

impl std::error::Error for ShellError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ShellError::Lex(e) => Some(e),
            ShellError::Parse(e) => Some(e),
            ShellError::Exec(e) => Some(e),
            ShellError::Io(e) => Some(e),
        }
    }
}

impl From<LexError> for ShellError {
    fn from(e: LexError) -> Self {
        ShellError::Lex(e)
    }
}

impl From<ParseError> for ShellError {
    fn from(e: ParseError) -> Self {
        ShellError::Parse(e)
    }
}

impl From<ExecError> for ShellError {
    fn from(e: ExecError) -> Self {
        ShellError::Exec(e)
    }
}

impl From<io::Error> for ShellError {
    fn from(e: io::Error) -> Self {
        ShellError::Io(e)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::jobs::JobError;
    use nix::errno::Errno;

    #[test]
    fn test_messages_pass_through() {
        let e: ShellError = ParseError::MissingDestination.into();
        assert_eq!(e.to_string(), "pipe or redirection destination is not specified");
        let e: ShellError = LexError::UnterminatedQuote('"', 5).into();
        assert_eq!(e.to_string(), "unterminated quote \" starting at position 5");
    }

    #[test]
    fn test_fatality() {
        assert!(!ShellError::from(ParseError::MisplacedBackground).is_fatal());
        assert!(!ShellError::from(ExecError::Builtin("cd: too many arguments".into())).is_fatal());
        assert!(ShellError::from(ExecError::Fork(Errno::EAGAIN)).is_fatal());
        assert!(!ShellError::from(ExecError::Jobs(JobError::Full)).is_fatal());
        assert!(!ShellError::from(LexError::InvalidUtf8(3)).is_fatal());
        assert!(ShellError::from(io::Error::from(io::ErrorKind::BrokenPipe)).is_fatal());
    }
}
