//! Asynchronous signal handling for the shell.
//!
//! Handlers only touch atomics and issue async-signal-safe syscalls
//! (`waitpid`, `kill`, `alarm`, `write`, `_exit`). Anything the user
//! should read about a finished background job goes through the notice
//! queue and is printed by the main loop.

mod mask;
mod notice;
mod quit;

use std::ptr;
use std::sync::atomic::{AtomicPtr, AtomicU32, Ordering};
use libc::c_int;
use nix::sys::signal::{self, kill, sigaction, SaFlags, SigAction, SigHandler, Signal};
use nix::sys::wait::{waitpid, WaitPidFlag, WaitStatus};
use nix::unistd::{alarm, Pid};
use crate::jobs::{JobTable, Role};

pub use mask::SignalBlock;
pub use notice::{Notice, NoticeQueue, Termination, NOTICE_CAPACITY};
pub use quit::{QuitAction, QuitPhase, QuitState};

static JOB_TABLE: AtomicPtr<JobTable> = AtomicPtr::new(ptr::null_mut());
static NOTICES: NoticeQueue = NoticeQueue::new();
static QUIT: QuitState = QuitState::new();
static QUIT_WINDOW: AtomicU32 = AtomicU32::new(5);

/// Installs the four handlers and makes sure none of the signals is
/// blocked. The handlers observe `jobs` from then on.
pub fn install(jobs: &'static JobTable, quit_window_secs: u32) -> nix::Result<()> {
    JOB_TABLE.store(ptr::from_ref(jobs).cast_mut(), Ordering::Release);
    QUIT_WINDOW.store(quit_window_secs.max(1), Ordering::Relaxed);

    let handlers: [(Signal, extern "C" fn(c_int), SaFlags); 4] = [
        (Signal::SIGCHLD, on_child_exit, SaFlags::SA_RESTART | SaFlags::SA_NOCLDSTOP),
        (Signal::SIGINT, on_interrupt, SaFlags::SA_RESTART),
        (Signal::SIGQUIT, on_quit, SaFlags::SA_RESTART),
        (Signal::SIGALRM, on_alarm, SaFlags::SA_RESTART),
    ];
    for (sig, handler, flags) in handlers {
        let action = SigAction::new(SigHandler::Handler(handler), flags, mask::shell_sigset());
        unsafe { sigaction(sig, &action) }?;
    }

    signal::sigprocmask(signal::SigmaskHow::SIG_UNBLOCK, Some(&mask::shell_sigset()), None)?;
    log::debug!("signal handlers installed, quit window {}s", quit_window_secs);
    Ok(())
}

/// Background completions waiting to be reported.
pub fn notices() -> &'static NoticeQueue {
    &NOTICES
}

pub fn quit_phase() -> QuitPhase {
    QUIT.phase()
}

/// Called in a forked child before `execve`: default dispositions for
/// the shell's signals, then the mask the parent had before `block`.
pub fn reset_in_child(block: &SignalBlock) -> nix::Result<()> {
    for sig in mask::SHELL_SIGNALS {
        unsafe { signal::signal(sig, SigHandler::SigDfl) }?;
    }
    block.restore_in_child()
}

fn job_table() -> Option<&'static JobTable> {
    let jobs = JOB_TABLE.load(Ordering::Acquire);
    // Only ever set from a `&'static JobTable`.
    unsafe { jobs.as_ref() }
}

fn forward(sig: Signal) {
    if let Some(jobs) = job_table() {
        for pid in jobs.pids() {
            let _ = kill(pid, sig);
        }
    }
}

extern "C" fn on_child_exit(_: c_int) {
    let _errno = ErrnoGuard::save();
    loop {
        let status = match waitpid(Pid::from_raw(-1), Some(WaitPidFlag::WNOHANG)) {
            Ok(WaitStatus::StillAlive) | Err(_) => break,
            Ok(status) => status,
        };
        let Some((pid, termination)) = Termination::from_wait_status(status) else {
            continue;
        };
        let removed = job_table().and_then(|jobs| jobs.remove(pid));
        if removed == Some(Role::Background) {
            NOTICES.push(Notice { pid, termination });
        }
    }
}

extern "C" fn on_interrupt(_: c_int) {
    let _errno = ErrnoGuard::save();
    forward(Signal::SIGINT);
}

extern "C" fn on_quit(_: c_int) {
    let _errno = ErrnoGuard::save();
    match QUIT.on_quit() {
        QuitAction::Terminate => unsafe { libc::_exit(0) },
        QuitAction::Confirm => {
            let window = QUIT_WINDOW.load(Ordering::Relaxed);
            write_quit_prompt(window);
            alarm::set(window);
            forward(Signal::SIGQUIT);
        }
    }
}

extern "C" fn on_alarm(_: c_int) {
    let _errno = ErrnoGuard::save();
    QUIT.on_alarm();
    alarm::cancel();
}

fn write_quit_prompt(window: u32) {
    let mut digits = [0u8; 10];
    let len = format_decimal(window, &mut digits);
    write_stdout(b"\nType Ctrl-\\ again within ");
    write_stdout(&digits[..len]);
    write_stdout(b" seconds to exit.\n");
}

fn write_stdout(bytes: &[u8]) {
    unsafe {
        libc::write(libc::STDOUT_FILENO, bytes.as_ptr().cast(), bytes.len());
    }
}

// Allocation-free number formatting for use inside handlers.
fn format_decimal(mut n: u32, buf: &mut [u8; 10]) -> usize {
    let mut len = 0;
    loop {
        buf[len] = b'0' + (n % 10) as u8;
        len += 1;
        n /= 10;
        if n == 0 {
            break;
        }
    }
    buf[..len].reverse();
    len
}

struct ErrnoGuard(c_int);

impl ErrnoGuard {
    fn save() -> Self {
        ErrnoGuard(std::io::Error::last_os_error().raw_os_error().unwrap_or(0))
    }
}

impl Drop for ErrnoGuard {
    fn drop(&mut self) {
        unsafe {
            *errno_location() = self.0;
        }
    }
}

#[cfg(target_os = "linux")]
unsafe fn errno_location() -> *mut c_int {
    unsafe { libc::__errno_location() }
}

#[cfg(any(target_os = "macos", target_os = "ios", target_os = "freebsd"))]
unsafe fn errno_location() -> *mut c_int {
    unsafe { libc::__error() }
}
