// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Write-path health accounting.

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Derived health of the write path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Degraded,
}

crate::simple_display! {
    HealthStatus {
        Healthy => "healthy",
        Degraded => "degraded",
    }
}

#[derive(Debug, Default)]
struct HealthState {
    consecutive_errors: u32,
    history: VecDeque<String>,
}

/// Tracks consecutive write failures and a bounded history of their messages.
///
/// The monitor is `Degraded` once `max_consecutive_errors` failures happen in
/// a row; any success brings it back to `Healthy`. The history holds at most
/// `max_history` messages, oldest first.
#[derive(Debug)]
pub struct HealthMonitor {
    state: Mutex<HealthState>,
    max_consecutive_errors: u32,
    max_history: usize,
}

impl HealthMonitor {
    pub fn new(max_consecutive_errors: u32, max_history: usize) -> Self {
        Self {
            state: Mutex::new(HealthState {
                consecutive_errors: 0,
                history: VecDeque::with_capacity(max_history),
            }),
            max_consecutive_errors,
            max_history,
        }
    }

    /// Clears the consecutive count. History is kept.
    pub fn record_success(&self) {
        self.state.lock().consecutive_errors = 0;
    }

    pub fn record_error(&self, message: impl Into<String>) {
        let message = message.into();
        let mut state = self.state.lock();
        let was_degraded = state.consecutive_errors >= self.max_consecutive_errors;
        state.consecutive_errors = state.consecutive_errors.saturating_add(1);
        if self.max_history > 0 {
            while state.history.len() >= self.max_history {
                state.history.pop_front();
            }
            state.history.push_back(message);
        }
        if !was_degraded && state.consecutive_errors >= self.max_consecutive_errors {
            tracing::error!(
                consecutive_errors = state.consecutive_errors,
                "write path degraded"
            );
        }
    }

    pub fn status(&self) -> HealthStatus {
        if self.state.lock().consecutive_errors >= self.max_consecutive_errors {
            HealthStatus::Degraded
        } else {
            HealthStatus::Healthy
        }
    }

    pub fn consecutive_error_count(&self) -> u32 {
        self.state.lock().consecutive_errors
    }

    /// Error messages, oldest first.
    pub fn recent_errors(&self) -> Vec<String> {
        self.state.lock().history.iter().cloned().collect()
    }

    pub fn reset(&self) {
        let mut state = self.state.lock();
        state.consecutive_errors = 0;
        state.history.clear();
    }

    pub fn max_consecutive_errors(&self) -> u32 {
        self.max_consecutive_errors
    }

    pub fn max_history(&self) -> usize {
        self.max_history
    }
}

#[cfg(test)]
#[path = "health_tests.rs"]
mod tests;
