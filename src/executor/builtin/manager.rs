use std::collections::HashMap;
use std::io::Write;
use crate::environment::Environment;
use crate::executor::{ ExecStatus, ExecError };
use crate::jobs::JobTable;
use crate::lexer::Token;
use super::commands::{
    SetenvCommand,
    UnsetenvCommand,
    CdCommand,
    ExitCommand,
    FgCommand,
};

/// What a built-in may touch. Built-ins run inside the shell process.
pub struct BuiltinContext<'a> {
    pub env: &'a mut Environment,
    pub jobs: &'a JobTable,
    pub out: &'a mut dyn Write,
}

pub trait BuiltinCommand {
    fn name(&self) -> &'static str;
    /// `args` are the tokens after the command name.
    fn run(&self, args: &[Token], ctx: &mut BuiltinContext<'_>) -> ExecStatus;
}

pub struct BuiltinManager {
    commands: HashMap<&'static str, Box<dyn BuiltinCommand>>,
}

impl Default for BuiltinManager {
    fn default() -> Self {
        Self::new()
    }
}

impl BuiltinManager {
    pub fn new() -> Self {
        let mut mgr = BuiltinManager {
            commands: HashMap::new(),
        };
        mgr.register(Box::new(SetenvCommand));
        mgr.register(Box::new(UnsetenvCommand));
        mgr.register(Box::new(CdCommand));
        mgr.register(Box::new(ExitCommand));
        mgr.register(Box::new(FgCommand));
        mgr
    }

    pub fn register(&mut self, cmd: Box<dyn BuiltinCommand>) {
        self.commands.insert(cmd.name(), cmd);
    }

    pub fn is_builtin(&self, name: &str) -> bool {
        self.commands.contains_key(name)
    }

    pub fn execute(
        &self,
        name: &str,
        args: &[Token],
        ctx: &mut BuiltinContext<'_>,
    ) -> ExecStatus {
        if let Some(cmd) = self.commands.get(name) {
            log::debug!("builtin {} with {} argument(s)", name, args.len());
            cmd.run(args, ctx)
        } else {
            Err(ExecError::NoSuchBuiltin(name.to_string()))
        }
    }
}
