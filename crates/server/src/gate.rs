//! Per-user input cooldown.
//!
//! One raw device signal is sometimes reported twice against a freshly
//! redrawn menu. The gate admits at most one input per user per cooldown
//! window, measured from the last admitted input.
//!
//! The gate is not consulted while a session is transitioning; those inputs
//! are dropped before they reach it and do not move the window.

use std::collections::HashMap;

use realmkeep_model::UserId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateResult {
    Admitted,
    /// Dropped; `elapsed_ms` since the last admitted input.
    Cooldown { elapsed_ms: u64 },
}

#[derive(Debug)]
pub struct InputGate {
    window_ms: u64,
    last_admitted: HashMap<UserId, u64>,
}

impl InputGate {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            last_admitted: HashMap::new(),
        }
    }

    /// Admit or drop one input received at `at_ms`.
    pub fn try_admit(&mut self, user: UserId, at_ms: u64) -> GateResult {
        if let Some(&last) = self.last_admitted.get(&user) {
            let elapsed_ms = at_ms.saturating_sub(last);
            if elapsed_ms < self.window_ms {
                return GateResult::Cooldown { elapsed_ms };
            }
        }
        self.last_admitted.insert(user, at_ms);
        GateResult::Admitted
    }

    /// Forget a user entirely (disconnect).
    pub fn forget(&mut self, user: UserId) {
        self.last_admitted.remove(&user);
    }

    /// Drop entries whose window ended before `at_ms`.
    pub fn evict_before(&mut self, at_ms: u64) {
        let window = self.window_ms;
        self.last_admitted
            .retain(|_, &mut last| last.saturating_add(window) > at_ms);
    }

    #[cfg(test)]
    pub fn has_entry(&self, user: UserId) -> bool {
        self.last_admitted.contains_key(&user)
    }
}
