use std::sync::atomic::{AtomicU8, Ordering};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitPhase {
    Normal,
    AwaitingSecondQuit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitAction {
    /// First quit: ask for confirmation and arm the timer.
    Confirm,
    /// Second quit inside the window.
    Terminate,
}

const NORMAL: u8 = 0;
const AWAITING: u8 = 1;

/// Two-phase quit confirmation. Each transition is a single atomic swap,
/// so a second quit and the timer expiry cannot both win.
pub struct QuitState(AtomicU8);

impl Default for QuitState {
    fn default() -> Self {
        Self::new()
    }
}

impl QuitState {
    pub const fn new() -> Self {
        QuitState(AtomicU8::new(NORMAL))
    }

    pub fn phase(&self) -> QuitPhase {
        match self.0.load(Ordering::Acquire) {
            AWAITING => QuitPhase::AwaitingSecondQuit,
            _ => QuitPhase::Normal,
        }
    }

    pub fn on_quit(&self) -> QuitAction {
        match self.0.swap(AWAITING, Ordering::AcqRel) {
            AWAITING => QuitAction::Terminate,
            _ => QuitAction::Confirm,
        }
    }

    /// Timer expiry. Returns true if a pending confirmation lapsed.
    pub fn on_alarm(&self) -> bool {
        self.0
            .compare_exchange(AWAITING, NORMAL, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }
}
