use std::ffi::{CString, NulError};
use crate::lexer::Token;

/// One command of a pipeline. Only the first stage can carry an input
/// file and only the last one an output file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stage {
    pub argv: Vec<String>,
    pub input: Option<String>,
    pub output: Option<String>,
}

impl Stage {
    pub fn program(&self) -> &str {
        self.argv.first().map(String::as_str).unwrap_or("")
    }

    /// Argument vector ready for `execve`; nix appends the null sentinel.
    pub fn argv_cstrings(&self) -> Result<Vec<CString>, NulError> {
        self.argv.iter().map(|a| CString::new(a.as_bytes())).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pipeline {
    pub stages: Vec<Stage>,
    pub background: bool,
}

impl Pipeline {
    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn pipe_count(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }

    pub fn input(&self) -> Option<&str> {
        self.stages.first().and_then(|s| s.input.as_deref())
    }

    pub fn output(&self) -> Option<&str> {
        self.stages.last().and_then(|s| s.output.as_deref())
    }
}

/// Strips a trailing `&` and reports whether it was there.
pub fn take_background(tokens: &mut Vec<Token>) -> bool {
    if tokens.last() == Some(&Token::Background) {
        tokens.pop();
        true
    } else {
        false
    }
}

pub fn stage_count(tokens: &[Token]) -> usize {
    1 + tokens.iter().filter(|t| **t == Token::Pipe).count()
}

pub fn take_input(tokens: &mut Vec<Token>) -> Option<String> {
    take_redirect(tokens, &Token::RedirectIn)
}

pub fn take_output(tokens: &mut Vec<Token>) -> Option<String> {
    take_redirect(tokens, &Token::RedirectOut)
}

fn take_redirect(tokens: &mut Vec<Token>, op: &Token) -> Option<String> {
    let pos = tokens.iter().position(|t| t == op)?;
    if pos + 1 >= tokens.len() {
        return None;
    }
    tokens.remove(pos);
    Some(tokens.remove(pos).into_text())
}

/// Words of the `index`-th stage: everything between the surrounding
/// pipes, minus any redirection operator and the word after it.
pub fn stage_argv(tokens: &[Token], index: usize) -> Vec<String> {
    let mut argv = Vec::new();
    let mut skip_target = false;
    for tok in tokens.split(|t| *t == Token::Pipe).nth(index).unwrap_or(&[]) {
        match tok {
            Token::RedirectIn | Token::RedirectOut => skip_target = true,
            Token::Word(_) if skip_target => skip_target = false,
            Token::Word(w) => argv.push(w.clone()),
            Token::Pipe | Token::Background => {}
        }
    }
    argv
}

/// Splits a validated token sequence into pipeline stages.
pub fn segment(mut tokens: Vec<Token>) -> Pipeline {
    let background = take_background(&mut tokens);
    let input = take_input(&mut tokens);
    let output = take_output(&mut tokens);

    let count = stage_count(&tokens);
    let mut stages: Vec<Stage> = (0..count)
        .map(|i| Stage {
            argv: stage_argv(&tokens, i),
            input: None,
            output: None,
        })
        .collect();

    if let Some(first) = stages.first_mut() {
        first.input = input;
    }
    if let Some(last) = stages.last_mut() {
        last.output = output;
    }

    Pipeline { stages, background }
}
