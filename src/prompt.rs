use std::io::{self, Write};

pub struct ShellPrompt {
    prompt: String,
}

impl Default for ShellPrompt {
    fn default() -> Self {
        ShellPrompt::new("% ")
    }
}

impl ShellPrompt {
    pub fn new(prompt: &str) -> Self {
        ShellPrompt { prompt: prompt.to_string() }
    }

    pub fn show_prompt(&self, out: &mut dyn Write) -> io::Result<()> {
        write!(out, "{}", self.prompt)?;
        out.flush()
    }

    /// Shows a line read from the startup file as if it had been typed.
    pub fn echo(&self, out: &mut dyn Write, line: &str) -> io::Result<()> {
        writeln!(out, "{}{}", self.prompt, line)?;
        out.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_and_echo() {
        let prompt = ShellPrompt::default();
        let mut out = Vec::new();
        prompt.show_prompt(&mut out).unwrap();
        prompt.echo(&mut out, "echo hi").unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "% % echo hi\n");
    }

    #[test]
    fn test_custom_prompt() {
        let prompt = ShellPrompt::new("ish> ");
        let mut out = Vec::new();
        prompt.show_prompt(&mut out).unwrap();
        assert_eq!(out, b"ish> ");
    }
}
