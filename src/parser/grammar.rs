use std::fmt;
use crate::lexer::Token;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    MissingDestination,
    MultipleStdout,
    MultipleStdin,
    MissingInputFile,
    MisplacedBackground,
    MissingCommand,
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingDestination => {
                write!(f, "pipe or redirection destination is not specified")
            }
            ParseError::MultipleStdout => write!(f, "multiple redirection of standard output"),
            ParseError::MultipleStdin => write!(f, "multiple redirection of standard input"),
            ParseError::MissingInputFile => {
                write!(f, "standard input redirection without file name")
            }
            ParseError::MisplacedBackground => write!(f, "wrong syntax using &"),
            ParseError::MissingCommand => write!(f, "command is not specified"),
        }
    }
}

impl std::error::Error for ParseError {}

/// Checks the pipeline grammar of a lexed line:
/// `&` only last and never first, every `|` between two words,
/// at most one `>` with nothing piped after it, at most one `<` with
/// nothing piped before it, and at least one word per stage.
pub fn validate(tokens: &[Token]) -> Result<(), ParseError> {
    let mut inputs = 0;
    let mut outputs = 0;
    let mut pipes = 0;
    let mut stage_words = 0;
    let mut target_pending = false;

    for (i, tok) in tokens.iter().enumerate() {
        let prev = i.checked_sub(1).and_then(|j| tokens.get(j));
        let next = tokens.get(i + 1);
        let next_is_word = next.is_some_and(Token::is_word);

        match tok {
            Token::Word(_) => {
                if target_pending {
                    target_pending = false;
                } else {
                    stage_words += 1;
                }
            }
            Token::Background => {
                if i == 0 || i + 1 != tokens.len() {
                    return Err(ParseError::MisplacedBackground);
                }
            }
            Token::Pipe => {
                if !prev.is_some_and(Token::is_word) || !next_is_word {
                    return Err(ParseError::MissingDestination);
                }
                if outputs > 0 {
                    return Err(ParseError::MultipleStdout);
                }
                if stage_words == 0 {
                    return Err(ParseError::MissingCommand);
                }
                pipes += 1;
                stage_words = 0;
            }
            Token::RedirectOut => {
                if !next_is_word {
                    return Err(ParseError::MissingDestination);
                }
                if outputs > 0 {
                    return Err(ParseError::MultipleStdout);
                }
                outputs += 1;
                target_pending = true;
            }
            Token::RedirectIn => {
                match next {
                    None => return Err(ParseError::MissingDestination),
                    Some(t) if !t.is_word() => return Err(ParseError::MissingInputFile),
                    Some(_) => {}
                }
                if inputs > 0 || pipes > 0 {
                    return Err(ParseError::MultipleStdin);
                }
                inputs += 1;
                target_pending = true;
            }
        }
    }

    if !tokens.is_empty() && stage_words == 0 {
        return Err(ParseError::MissingCommand);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::Lexer;

    fn check(line: &str) -> Result<(), ParseError> {
        let tokens = Lexer::new(line).tokenize().unwrap();
        validate(&tokens)
    }

    #[test]
    fn test_valid_lines() {
        for line in [
            "echo hello",
            "sleep 5 &",
            "cat file.txt | sort | uniq",
            "echo hi > out.txt",
            "sort < in.txt > out.txt",
            "cat < in.txt | sort | uniq > out.txt &",
            "< in.txt cat",
            "echo a > out.txt b",
        ] {
            assert_eq!(check(line), Ok(()), "line: {}", line);
        }
    }

    #[test]
    fn test_leading_pipe() {
        assert_eq!(check("| ls"), Err(ParseError::MissingDestination));
    }

    #[test]
    fn test_trailing_and_doubled_pipes() {
        assert_eq!(check("ls |"), Err(ParseError::MissingDestination));
        assert_eq!(check("ls | | wc"), Err(ParseError::MissingDestination));
        assert_eq!(check("ls | > out"), Err(ParseError::MissingDestination));
    }

    #[test]
    fn test_background_placement() {
        assert_eq!(check("&"), Err(ParseError::MisplacedBackground));
        assert_eq!(check("& ls"), Err(ParseError::MisplacedBackground));
        assert_eq!(check("sleep 1 & ls"), Err(ParseError::MisplacedBackground));
        assert_eq!(check("sleep 1 & &"), Err(ParseError::MisplacedBackground));
    }

    #[test]
    fn test_output_redirection_rules() {
        assert_eq!(check("ls >"), Err(ParseError::MissingDestination));
        assert_eq!(check("ls > &"), Err(ParseError::MissingDestination));
        assert_eq!(check("ls > a > b"), Err(ParseError::MultipleStdout));
        assert_eq!(check("ls > a | wc"), Err(ParseError::MultipleStdout));
    }

    #[test]
    fn test_input_redirection_rules() {
        assert_eq!(check("cat <"), Err(ParseError::MissingDestination));
        assert_eq!(check("cat < | wc"), Err(ParseError::MissingInputFile));
        assert_eq!(check("cat < a < b"), Err(ParseError::MultipleStdin));
        assert_eq!(check("ls | wc < a"), Err(ParseError::MultipleStdin));
    }

    #[test]
    fn test_stage_without_command() {
        assert_eq!(check("> out.txt"), Err(ParseError::MissingCommand));
        assert_eq!(check("< in.txt | wc"), Err(ParseError::MissingCommand));
    }

    #[test]
    fn test_empty_sequence_is_valid() {
        assert_eq!(validate(&[]), Ok(()));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            ParseError::MissingDestination.to_string(),
            "pipe or redirection destination is not specified"
        );
        assert_eq!(
            ParseError::MultipleStdout.to_string(),
            "multiple redirection of standard output"
        );
        assert_eq!(
            ParseError::MultipleStdin.to_string(),
            "multiple redirection of standard input"
        );
    }
}
