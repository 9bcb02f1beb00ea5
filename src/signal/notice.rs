use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};
use nix::sys::wait::WaitStatus;
use nix::unistd::Pid;

/// One slot per trackable job, so a burst of completions is never dropped.
pub const NOTICE_CAPACITY: usize = crate::jobs::JOB_CAPACITY;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Termination {
    Exited(i32),
    Signaled(i32),
}

impl Termination {
    pub fn from_wait_status(status: WaitStatus) -> Option<(Pid, Termination)> {
        match status {
            WaitStatus::Exited(pid, code) => Some((pid, Termination::Exited(code))),
            WaitStatus::Signaled(pid, sig, _) => Some((pid, Termination::Signaled(sig as i32))),
            _ => None,
        }
    }

    fn encode(self) -> i32 {
        match self {
            Termination::Exited(code) => code,
            Termination::Signaled(sig) => -sig,
        }
    }

    fn decode(raw: i32) -> Self {
        if raw < 0 {
            Termination::Signaled(-raw)
        } else {
            Termination::Exited(raw)
        }
    }
}

/// A background child that has been reaped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Notice {
    pub pid: Pid,
    pub termination: Termination,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.termination {
            Termination::Exited(_) => write!(f, "child {} terminated normally", self.pid),
            Termination::Signaled(sig) => {
                write!(f, "child {} terminated by signal {}", self.pid, sig)
            }
        }
    }
}

struct Entry {
    pid: AtomicI32,
    status: AtomicI32,
}

/// Single-producer single-consumer ring. The child-termination handler
/// pushes, the main loop pops; when full, new notices are dropped.
pub struct NoticeQueue {
    entries: [Entry; NOTICE_CAPACITY],
    head: AtomicUsize,
    tail: AtomicUsize,
}

impl Default for NoticeQueue {
    fn default() -> Self {
        Self::new()
    }
}

impl NoticeQueue {
    pub const fn new() -> Self {
        NoticeQueue {
            entries: [const {
                Entry {
                    pid: AtomicI32::new(0),
                    status: AtomicI32::new(0),
                }
            }; NOTICE_CAPACITY],
            head: AtomicUsize::new(0),
            tail: AtomicUsize::new(0),
        }
    }

    pub fn push(&self, notice: Notice) -> bool {
        let tail = self.tail.load(Ordering::Relaxed);
        let head = self.head.load(Ordering::Acquire);
        if tail.wrapping_sub(head) >= NOTICE_CAPACITY {
            return false;
        }
        let entry = &self.entries[tail % NOTICE_CAPACITY];
        entry.pid.store(notice.pid.as_raw(), Ordering::Relaxed);
        entry.status.store(notice.termination.encode(), Ordering::Relaxed);
        self.tail.store(tail.wrapping_add(1), Ordering::Release);
        true
    }

    pub fn pop(&self) -> Option<Notice> {
        let head = self.head.load(Ordering::Relaxed);
        let tail = self.tail.load(Ordering::Acquire);
        if head == tail {
            return None;
        }
        let entry = &self.entries[head % NOTICE_CAPACITY];
        let notice = Notice {
            pid: Pid::from_raw(entry.pid.load(Ordering::Relaxed)),
            termination: Termination::decode(entry.status.load(Ordering::Relaxed)),
        };
        self.head.store(head.wrapping_add(1), Ordering::Release);
        Some(notice)
    }

    pub fn drain(&self) -> impl Iterator<Item = Notice> + '_ {
        std::iter::from_fn(move || self.pop())
    }
}
