use std::ffi::{CStr, CString};
use std::os::fd::RawFd;
use nix::errno::Errno;
use nix::fcntl::{open, OFlag};
use nix::sys::stat::Mode;
use nix::unistd::{close, dup2, execve};
use crate::signal::{self, SignalBlock};
use super::pipeline::{PipeSet, StagePlan};

const STDIN: RawFd = libc::STDIN_FILENO;
const STDOUT: RawFd = libc::STDOUT_FILENO;

/// Runs in the forked child: wires stdin/stdout, closes the remaining
/// pipe ends and replaces the image. Never returns into the shell.
pub(super) fn exec_stage(
    plan: &StagePlan,
    index: usize,
    pipes: &PipeSet,
    envp: &[CString],
    block: &SignalBlock,
) -> ! {
    if let Err(e) = signal::reset_in_child(block) {
        fail("ish", e);
    }

    if index > 0 {
        if let Err(e) = dup2(pipes.read_end(index - 1), STDIN) {
            fail(&plan.name, e);
        }
    }
    if index < pipes.len() {
        if let Err(e) = dup2(pipes.write_end(index), STDOUT) {
            fail(&plan.name, e);
        }
    }

    if let Some(path) = &plan.input {
        redirect(path, OFlag::O_RDONLY, STDIN);
    }
    if let Some(path) = &plan.output {
        redirect(path, OFlag::O_WRONLY | OFlag::O_CREAT | OFlag::O_TRUNC, STDOUT);
    }

    for fd in pipes.raw_fds() {
        let _ = close(fd);
    }

    let err = match &plan.program {
        Some(program) => match execve(program, &plan.argv, envp) {
            Err(e) => e,
            Ok(never) => match never {},
        },
        None => Errno::ENOENT,
    };
    fail(&plan.name, err)
}

fn redirect(path: &CStr, flags: OFlag, target: RawFd) {
    let name = path.to_string_lossy();
    let fd = match open(path, flags, Mode::S_IRUSR | Mode::S_IWUSR) {
        Ok(fd) => fd,
        Err(e) => fail(&name, e),
    };
    if let Err(e) = dup2(fd, target) {
        fail(&name, e);
    }
    let _ = close(fd);
}

fn fail(name: &str, err: Errno) -> ! {
    eprintln!("{}: {}", name, err.desc());
    unsafe { libc::_exit(1) }
}
