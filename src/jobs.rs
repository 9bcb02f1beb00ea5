//! Registry of live children.
//!
//! Every slot is a set of atomics so the table can be read and emptied
//! from signal handlers while the main loop is in the middle of an
//! insertion. Only the main loop inserts; removal is left to the
//! child-termination handler.

use std::fmt;
use std::sync::atomic::{AtomicI32, AtomicU64, AtomicU8, Ordering};
use nix::unistd::Pid;

/// Well above the per-user process limit of a typical interactive session.
pub const JOB_CAPACITY: usize = 4096;

const FREE: i32 = 0;
const RESERVED: i32 = -1;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Role {
    Foreground = 0,
    Background = 1,
}

impl Role {
    const FOREGROUND: u8 = Role::Foreground as u8;
    const BACKGROUND: u8 = Role::Background as u8;

    fn from_u8(v: u8) -> Option<Role> {
        match v {
            Self::FOREGROUND => Some(Role::Foreground),
            Self::BACKGROUND => Some(Role::Background),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    Full,
    Duplicate(Pid),
    InvalidPid(Pid),
}

impl fmt::Display for JobError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            JobError::Full => write!(f, "job table is full ({} entries)", JOB_CAPACITY),
            JobError::Duplicate(pid) => write!(f, "process {} is already tracked", pid),
            JobError::InvalidPid(pid) => write!(f, "invalid process id {}", pid),
        }
    }
}

impl std::error::Error for JobError {}

struct Slot {
    pid: AtomicI32,
    role: AtomicU8,
    seq: AtomicU64,
}

impl Slot {
    const fn new() -> Self {
        Slot {
            pid: AtomicI32::new(FREE),
            role: AtomicU8::new(Role::Foreground as u8),
            seq: AtomicU64::new(0),
        }
    }

    fn live_pid(&self) -> Option<Pid> {
        let raw = self.pid.load(Ordering::Acquire);
        (raw > 0).then(|| Pid::from_raw(raw))
    }
}

pub struct JobTable {
    slots: [Slot; JOB_CAPACITY],
    next_seq: AtomicU64,
}

impl Default for JobTable {
    fn default() -> Self {
        Self::new()
    }
}

impl JobTable {
    pub const fn new() -> Self {
        JobTable {
            slots: [const { Slot::new() }; JOB_CAPACITY],
            next_seq: AtomicU64::new(1),
        }
    }

    pub fn add(&self, pid: Pid, role: Role) -> Result<(), JobError> {
        if pid.as_raw() <= 0 {
            return Err(JobError::InvalidPid(pid));
        }
        if self.contains(pid) {
            return Err(JobError::Duplicate(pid));
        }
        for slot in &self.slots {
            if slot
                .pid
                .compare_exchange(FREE, RESERVED, Ordering::AcqRel, Ordering::Relaxed)
                .is_ok()
            {
                slot.role.store(role as u8, Ordering::Relaxed);
                slot.seq
                    .store(self.next_seq.fetch_add(1, Ordering::Relaxed), Ordering::Relaxed);
                // Publishing the pid makes the entry visible to handlers.
                slot.pid.store(pid.as_raw(), Ordering::Release);
                return Ok(());
            }
        }
        Err(JobError::Full)
    }

    /// Returns the role the entry had, or `None` if `pid` was not tracked.
    /// Removing an absent pid leaves the table untouched.
    pub fn remove(&self, pid: Pid) -> Option<Role> {
        let slot = self.find(pid)?;
        let role = Role::from_u8(slot.role.load(Ordering::Relaxed));
        slot.pid
            .compare_exchange(pid.as_raw(), FREE, Ordering::AcqRel, Ordering::Relaxed)
            .ok()
            .and(role)
    }

    pub fn contains(&self, pid: Pid) -> bool {
        self.find(pid).is_some()
    }

    pub fn role(&self, pid: Pid) -> Option<Role> {
        self.find(pid)
            .and_then(|slot| Role::from_u8(slot.role.load(Ordering::Relaxed)))
    }

    pub fn set_role(&self, pid: Pid, role: Role) -> bool {
        match self.find(pid) {
            Some(slot) => {
                slot.role.store(role as u8, Ordering::Relaxed);
                true
            }
            None => false,
        }
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|s| s.live_pid().is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Most recently added entry still tagged background.
    pub fn last_background(&self) -> Option<Pid> {
        self.slots
            .iter()
            .filter_map(|s| {
                let pid = s.live_pid()?;
                let role = Role::from_u8(s.role.load(Ordering::Relaxed));
                (role == Some(Role::Background)).then(|| (s.seq.load(Ordering::Relaxed), pid))
            })
            .max_by_key(|&(seq, _)| seq)
            .map(|(_, pid)| pid)
    }

    /// Live pids, without allocating.
    pub fn pids(&self) -> impl Iterator<Item = Pid> + '_ {
        self.slots.iter().filter_map(Slot::live_pid)
    }

    fn find(&self, pid: Pid) -> Option<&Slot> {
        if pid.as_raw() <= 0 {
            return None;
        }
        self.slots
            .iter()
            .find(|s| s.pid.load(Ordering::Acquire) == pid.as_raw())
    }
}
