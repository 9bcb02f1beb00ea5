use std::{io, fmt};
use std::ffi::NulError;
use nix::errno::Errno;
use crate::environment::Environment;
use crate::jobs::JobError;
use crate::parser::Pipeline;

pub type ExecStatus = Result<ExecOutcome, ExecError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecOutcome {
    Continue,
    Exit(i32),
}

#[derive(Debug)]
pub enum ExecError {
    Fork(Errno),
    Pipe(Errno),
    Signal(Errno),
    Jobs(JobError),
    Io(io::Error),
    InvalidArgument(NulError),
    NoSuchBuiltin(String),
    Builtin(String),
}

impl ExecError {
    /// Resource exhaustion the shell cannot recover from. A full job
    /// table only costs the pipeline that did not fit.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ExecError::Fork(_) | ExecError::Pipe(_) | ExecError::Signal(_)
        )
    }
}

impl fmt::Display for ExecError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecError::Fork(e) => write!(f, "fork: {}", e.desc()),
            ExecError::Pipe(e) => write!(f, "pipe: {}", e.desc()),
            ExecError::Signal(e) => write!(f, "signal mask: {}", e.desc()),
            ExecError::Jobs(e) => write!(f, "{}", e),
            ExecError::Io(e) => write!(f, "IO error: {}", e),
            ExecError::InvalidArgument(_) => write!(f, "argument contains a NUL byte"),
            ExecError::NoSuchBuiltin(name) => write!(f, "No such builtin command: {}", name),
            ExecError::Builtin(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ExecError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ExecError::Io(e) => Some(e),
            ExecError::Jobs(e) => Some(e),
            ExecError::InvalidArgument(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for ExecError {
    fn from(e: io::Error) -> Self {
        ExecError::Io(e)
    }
}

impl From<JobError> for ExecError {
    fn from(e: JobError) -> Self {
        ExecError::Jobs(e)
    }
}

impl From<NulError> for ExecError {
    fn from(e: NulError) -> Self {
        ExecError::InvalidArgument(e)
    }
}

/// Runs one segmented pipeline on behalf of the interactive loop.
pub trait Executor {
    fn run(&mut self, pipeline: &Pipeline, env: &Environment) -> ExecStatus;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::Stage;
    use nix::unistd::Pid;

    struct TestExecutor {
        pub log: Vec<String>,
    }

    impl Executor for TestExecutor {
        fn run(&mut self, pipeline: &Pipeline, _env: &Environment) -> ExecStatus {
            for stage in &pipeline.stages {
                self.log.push(format!("stage: {:?}", stage.argv));
            }
            if pipeline.background {
                self.log.push("background".to_string());
            }
            Ok(ExecOutcome::Continue)
        }
    }

    fn stage(argv: &[&str]) -> Stage {
        Stage {
            argv: argv.iter().map(|s| s.to_string()).collect(),
            input: None,
            output: None,
        }
    }

    #[test]
    fn test_executor_trait_object() {
        let pipeline = Pipeline {
            stages: vec![stage(&["ls"]), stage(&["wc", "-l"])],
            background: true,
        };
        let mut exec = TestExecutor { log: vec![] };
        let exec_ref: &mut dyn Executor = &mut exec;
        let result = exec_ref.run(&pipeline, &Environment::empty());
        assert!(matches!(result, Ok(ExecOutcome::Continue)));
        assert_eq!(
            exec.log,
            vec!["stage: [\"ls\"]", "stage: [\"wc\", \"-l\"]", "background"]
        );
    }

    #[test]
    fn test_fatal_errors() {
        assert!(ExecError::Fork(Errno::EAGAIN).is_fatal());
        assert!(ExecError::Pipe(Errno::EMFILE).is_fatal());
        assert!(ExecError::Signal(Errno::EINVAL).is_fatal());
        assert!(!ExecError::from(JobError::Full).is_fatal());
        assert!(!ExecError::from(JobError::Duplicate(Pid::from_raw(7))).is_fatal());
        assert!(!ExecError::Builtin("cd: too many arguments".into()).is_fatal());
        assert!(!ExecError::NoSuchBuiltin("nope".into()).is_fatal());
    }

    #[test]
    fn test_messages() {
        assert_eq!(
            ExecError::Fork(Errno::EAGAIN).to_string(),
            format!("fork: {}", Errno::EAGAIN.desc())
        );
        assert_eq!(
            ExecError::Builtin("unsetenv takes one parameter".into()).to_string(),
            "unsetenv takes one parameter"
        );
    }
}
