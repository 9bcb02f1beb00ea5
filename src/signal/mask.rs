use nix::sys::signal::{sigprocmask, SigSet, SigmaskHow, Signal};

pub(crate) const SHELL_SIGNALS: [Signal; 4] =
    [Signal::SIGCHLD, Signal::SIGINT, Signal::SIGQUIT, Signal::SIGALRM];

pub(crate) fn shell_sigset() -> SigSet {
    let mut set = SigSet::empty();
    for sig in SHELL_SIGNALS {
        set.add(sig);
    }
    set
}

/// Keeps the shell's signals blocked for as long as it lives and puts
/// the previous mask back when dropped.
pub struct SignalBlock {
    previous: SigSet,
}

impl SignalBlock {
    pub fn new() -> nix::Result<Self> {
        let mut previous = SigSet::empty();
        sigprocmask(SigmaskHow::SIG_BLOCK, Some(&shell_sigset()), Some(&mut previous))?;
        Ok(SignalBlock { previous })
    }

    /// Sleeps until a signal handler has run, with the mask that was in
    /// effect before this block was taken.
    pub fn suspend(&self) {
        // sigsuspend always returns -1/EINTR once a handler ran.
        unsafe {
            libc::sigsuspend(self.previous.as_ref());
        }
    }

    /// Blocks in `suspend` until `done` holds. `done` is re-evaluated
    /// with the signals blocked, so a wakeup cannot slip in between the
    /// check and the sleep.
    pub fn wait_until(&self, mut done: impl FnMut() -> bool) {
        while !done() {
            self.suspend();
        }
    }

    /// In a freshly forked child: drop back to the mask the parent had
    /// before blocking.
    pub fn restore_in_child(&self) -> nix::Result<()> {
        sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None)
    }
}

impl Drop for SignalBlock {
    fn drop(&mut self) {
        if let Err(e) = sigprocmask(SigmaskHow::SIG_SETMASK, Some(&self.previous), None) {
            log::error!("failed to restore signal mask: {}", e);
        }
    }
}
