// SPDX-FileCopyrightText: 2025 Jason Pena <jasonpena@awkless.com>
// SPDX-License-Identifier: MIT

//! Operator-facing messages.
//!
//! Dry-run command echoes and failure hints are meant for the human running
//! the release, not for diagnostics. They go through a [`Log`] capability
//! handed to the [`Publisher`](crate::publish::Publisher), so they can be
//! captured and inspected independently of any tracing subscriber.

use tracing::{info, warn};

/// Sink for operator-facing messages.
pub trait Log {
    /// Emit informational message, e.g., a dry-run command echo.
    fn info(&self, message: &str);

    /// Emit advisory message, e.g., a hint attached to a failure.
    fn warn(&self, message: &str);
}

impl<T> Log for &T
where
    T: Log + ?Sized,
{
    fn info(&self, message: &str) {
        (**self).info(message)
    }

    fn warn(&self, message: &str) {
        (**self).warn(message)
    }
}

/// Forward operator-facing messages to [`tracing`].
#[derive(Debug, Default, Clone)]
pub struct TracingLog;

impl Log for TracingLog {
    fn info(&self, message: &str) {
        info!("{message}");
    }

    fn warn(&self, message: &str) {
        warn!("{message}");
    }
}
