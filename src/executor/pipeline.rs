use std::ffi::CString;
use std::io::{self, Write};
use std::os::fd::{AsRawFd, OwnedFd, RawFd};
use nix::sys::signal::{kill, Signal};
use nix::unistd::{fork, pipe, ForkResult, Pid};
use crate::environment::Environment;
use crate::jobs::{JobError, JobTable, Role};
use crate::parser::{Pipeline, Stage};
use crate::signal::SignalBlock;
use super::child;
use super::executor::{ExecError, ExecOutcome, ExecStatus, Executor};
use super::path_resolver::PathResolver;

/// The `n - 1` pipes of an `n`-stage pipeline. Pipe `i` connects stage
/// `i` (write end) to stage `i + 1` (read end).
#[derive(Debug)]
pub struct PipeSet {
    pipes: Vec<(OwnedFd, OwnedFd)>,
}

impl PipeSet {
    pub fn allocate(count: usize) -> nix::Result<Self> {
        let mut pipes = Vec::with_capacity(count);
        for _ in 0..count {
            pipes.push(pipe()?);
        }
        Ok(PipeSet { pipes })
    }

    pub fn len(&self) -> usize {
        self.pipes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pipes.is_empty()
    }

    pub fn read_end(&self, index: usize) -> RawFd {
        self.pipes[index].0.as_raw_fd()
    }

    pub fn write_end(&self, index: usize) -> RawFd {
        self.pipes[index].1.as_raw_fd()
    }

    pub fn raw_fds(&self) -> impl Iterator<Item = RawFd> + '_ {
        self.pipes
            .iter()
            .flat_map(|(r, w)| [r.as_raw_fd(), w.as_raw_fd()])
    }

    /// Closes every descriptor and returns how many were closed.
    pub fn close_all(self) -> usize {
        let closed = self.pipes.len() * 2;
        drop(self.pipes);
        closed
    }
}

/// Everything a child needs to launch one stage, built before forking so
/// the child does not allocate.
pub(super) struct StagePlan {
    pub name: String,
    pub program: Option<CString>,
    pub argv: Vec<CString>,
    pub input: Option<CString>,
    pub output: Option<CString>,
}

impl StagePlan {
    fn prepare(stage: &Stage, resolver: &PathResolver, env: &Environment) -> Result<Self, ExecError> {
        let program = resolver
            .resolve(stage.program(), env.get("PATH"))
            .map(|path| CString::new(path.into_os_string().into_encoded_bytes()))
            .transpose()?;
        Ok(StagePlan {
            name: stage.program().to_string(),
            program,
            argv: stage.argv_cstrings()?,
            input: stage.input.as_deref().map(CString::new).transpose()?,
            output: stage.output.as_deref().map(CString::new).transpose()?,
        })
    }
}

/// Launches every stage as a forked child and tracks it in the job table.
pub struct ForkExecutor {
    jobs: &'static JobTable,
    resolver: PathResolver,
}

impl ForkExecutor {
    pub fn new(jobs: &'static JobTable) -> Self {
        ForkExecutor { jobs, resolver: PathResolver }
    }
}

impl ForkExecutor {
    fn register(&self, pids: &[Pid], role: Role) -> Result<(), JobError> {
        pids.iter().try_for_each(|&pid| self.jobs.add(pid, role))
    }
}

impl Executor for ForkExecutor {
    fn run(&mut self, pipeline: &Pipeline, env: &Environment) -> ExecStatus {
        let plans = pipeline
            .stages
            .iter()
            .map(|stage| StagePlan::prepare(stage, &self.resolver, env))
            .collect::<Result<Vec<_>, _>>()?;
        let envp = env.to_envp()?;
        let role = if pipeline.background { Role::Background } else { Role::Foreground };

        // Held until the pids are registered, so no child can be reaped
        // before the table knows about it.
        let block = SignalBlock::new().map_err(ExecError::Signal)?;
        let pipes = PipeSet::allocate(pipeline.pipe_count()).map_err(ExecError::Pipe)?;
        io::stdout().flush()?;

        let mut pids: Vec<Pid> = Vec::with_capacity(plans.len());
        for (index, plan) in plans.iter().enumerate() {
            match unsafe { fork() } {
                Ok(ForkResult::Child) => child::exec_stage(plan, index, &pipes, &envp, &block),
                Ok(ForkResult::Parent { child }) => {
                    log::debug!("forked {} for stage {} ({})", child, index, plan.name);
                    pids.push(child);
                }
                Err(e) => return Err(ExecError::Fork(e)),
            }
        }

        let closed = pipes.close_all();
        log::debug!("closed {} pipe descriptors", closed);

        if let Err(e) = self.register(&pids, role) {
            // Untracked children would never be waited for; take the
            // whole pipeline down and let the handler reap it.
            log::warn!("cannot track {:?}: {}", pids, e);
            for &pid in &pids {
                let _ = kill(pid, Signal::SIGKILL);
            }
            block.wait_until(|| pids.iter().all(|&pid| !self.jobs.contains(pid)));
            return Err(e.into());
        }
        log::debug!("registered {:?} as {:?}", pids, role);

        if role == Role::Foreground {
            block.wait_until(|| pids.iter().all(|&pid| !self.jobs.contains(pid)));
            log::debug!("foreground pipeline {:?} finished", pids);
        }
        Ok(ExecOutcome::Continue)
    }
}
