use std::io::{self, Write};
use crate::environment::Environment;
use crate::error::ShellError;
use crate::executor::{BuiltinContext, BuiltinManager, ExecOutcome, Executor};
use crate::io::{LineReader, Source};
use crate::jobs::JobTable;
use crate::lexer::{self, LexOutcome};
use crate::parser;
use crate::prompt::ShellPrompt;
use crate::signal::NoticeQueue;

/// The interactive loop: read, dispatch to a built-in or the executor,
/// report, repeat.
pub struct Shell<'a, E: Executor> {
    executor: E,
    builtins: BuiltinManager,
    env: Environment,
    jobs: &'a JobTable,
    notices: &'a NoticeQueue,
    prompt: ShellPrompt,
}

impl<'a, E: Executor> Shell<'a, E> {
    pub fn new(
        executor: E,
        env: Environment,
        jobs: &'a JobTable,
        notices: &'a NoticeQueue,
        prompt: ShellPrompt,
    ) -> Self {
        Shell {
            executor,
            builtins: BuiltinManager::new(),
            env,
            jobs,
            notices,
            prompt,
        }
    }

    pub fn env(&self) -> &Environment {
        &self.env
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    /// Runs until `exit`, end of input or a fatal error and returns the
    /// exit status.
    pub fn run(&mut self, reader: &mut LineReader, out: &mut dyn Write) -> i32 {
        loop {
            match self.step(reader, out) {
                Ok(None) => {}
                Ok(Some(code)) => return code,
                Err(e) if e.is_fatal() => {
                    log::error!("giving up: {}", e);
                    eprintln!("ish: {}", e);
                    return 1;
                }
                Err(e) => eprintln!("ish: {}", e),
            }
        }
    }

    fn step(&mut self, reader: &mut LineReader, out: &mut dyn Write) -> Result<Option<i32>, ShellError> {
        self.report_notices(out)?;

        let interactive = reader.next_is_interactive();
        if interactive {
            self.prompt.show_prompt(out)?;
        }
        let Some(line) = reader.read_line()? else {
            if interactive {
                writeln!(out)?;
            }
            return Ok(Some(0));
        };
        if line.source == Source::Startup {
            self.prompt.echo(out, &line.lossy())?;
        }

        let text = lexer::decode(&line.bytes)?;
        match self.process_line(text, out)? {
            ExecOutcome::Continue => Ok(None),
            ExecOutcome::Exit(code) => Ok(Some(code)),
        }
    }

    /// Prints the background completions collected since the last call.
    pub fn report_notices(&self, out: &mut dyn Write) -> io::Result<()> {
        let mut any = false;
        for notice in self.notices.drain() {
            log::debug!("reporting {:?}", notice);
            writeln!(out, "{}", notice)?;
            any = true;
        }
        if any {
            out.flush()?;
        }
        Ok(())
    }

    /// Tokenizes, validates and dispatches one line.
    pub fn process_line(&mut self, line: &str, out: &mut dyn Write) -> Result<ExecOutcome, ShellError> {
        let tokens = match lexer::tokenize(line)? {
            LexOutcome::Empty => return Ok(ExecOutcome::Continue),
            LexOutcome::Tokens(tokens) => tokens,
        };
        parser::validate(&tokens)?;

        if let Some(name) = tokens[0].as_word() {
            if self.builtins.is_builtin(name) {
                let mut ctx = BuiltinContext {
                    env: &mut self.env,
                    jobs: self.jobs,
                    out: &mut *out,
                };
                let outcome = self.builtins.execute(name, &tokens[1..], &mut ctx)?;
                out.flush()?;
                return Ok(outcome);
            }
        }

        let pipeline = parser::segment(tokens);
        Ok(self.executor.run(&pipeline, &self.env)?)
    }
}
