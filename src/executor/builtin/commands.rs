use nix::unistd::chdir;
use crate::executor::{ ExecStatus, ExecOutcome, ExecError };
use crate::executor::builtin::manager::{ BuiltinCommand, BuiltinContext };
use crate::jobs::Role;
use crate::lexer::Token;
use crate::signal::SignalBlock;

/// Word arguments, or `None` if any argument is an operator.
fn words(args: &[Token]) -> Option<Vec<&str>> {
    args.iter().map(Token::as_word).collect()
}

pub struct SetenvCommand;

impl BuiltinCommand for SetenvCommand {
    fn name(&self) -> &'static str {
        "setenv"
    }
    fn run(&self, args: &[Token], ctx: &mut BuiltinContext<'_>) -> ExecStatus {
        match words(args).as_deref() {
            Some([name]) => ctx.env.set(name, ""),
            Some([name, value]) => ctx.env.set(name, value),
            _ => return Err(ExecError::Builtin("setenv takes one or two parameters".into())),
        }
        Ok(ExecOutcome::Continue)
    }
}

pub struct UnsetenvCommand;

impl BuiltinCommand for UnsetenvCommand {
    fn name(&self) -> &'static str {
        "unsetenv"
    }
    fn run(&self, args: &[Token], ctx: &mut BuiltinContext<'_>) -> ExecStatus {
        match words(args).as_deref() {
            Some([name]) => ctx.env.unset(name),
            _ => return Err(ExecError::Builtin("unsetenv takes one parameter".into())),
        }
        Ok(ExecOutcome::Continue)
    }
}

pub struct CdCommand;

impl BuiltinCommand for CdCommand {
    fn name(&self) -> &'static str {
        "cd"
    }
    fn run(&self, args: &[Token], ctx: &mut BuiltinContext<'_>) -> ExecStatus {
        let target = match words(args).as_deref() {
            Some([]) => match ctx.env.home() {
                Some(home) => home.to_string(),
                None => return Err(ExecError::Builtin("cd: HOME not set".into())),
            },
            Some([dir]) => dir.to_string(),
            _ => return Err(ExecError::Builtin("cd: too many arguments".into())),
        };
        chdir(target.as_str())
            .map_err(|e| ExecError::Builtin(format!("cd: {}: {}", target, e.desc())))?;
        if let Ok(cwd) = std::env::current_dir() {
            ctx.env.set("PWD", &cwd.to_string_lossy());
        }
        Ok(ExecOutcome::Continue)
    }
}

pub struct ExitCommand;

impl BuiltinCommand for ExitCommand {
    fn name(&self) -> &'static str {
        "exit"
    }
    fn run(&self, _args: &[Token], _ctx: &mut BuiltinContext<'_>) -> ExecStatus {
        Ok(ExecOutcome::Exit(0))
    }
}

pub struct FgCommand;

impl BuiltinCommand for FgCommand {
    fn name(&self) -> &'static str {
        "fg"
    }
    fn run(&self, _args: &[Token], ctx: &mut BuiltinContext<'_>) -> ExecStatus {
        // The entry cannot be reaped between lookup and retagging.
        let block = SignalBlock::new().map_err(ExecError::Signal)?;
        let Some(pid) = ctx.jobs.last_background() else {
            writeln!(ctx.out, "no background process")?;
            return Ok(ExecOutcome::Continue);
        };

        writeln!(ctx.out, "[{}] Latest background process is executing", pid)?;
        ctx.out.flush()?;
        ctx.jobs.set_role(pid, Role::Foreground);
        block.wait_until(|| !ctx.jobs.contains(pid));
        writeln!(ctx.out, "[{}] Done", pid)?;
        Ok(ExecOutcome::Continue)
    }
}
