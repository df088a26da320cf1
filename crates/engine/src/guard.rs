//! Timeout guard: bounded draining of the completion channel.
//!
//! Timing contract, per [`DeadlinePolicy`]:
//!
//! - `PerOutcome`: each receive waits at most `deadline`, and the timer is
//!   re-armed after every outcome. A drain therefore ends no later than
//!   `deadline` after the most recent outcome arrived (or after draining
//!   started, if nothing arrived). The total wall time can exceed `deadline`
//!   when outcomes keep trickling in just under it.
//! - `Overall`: a single deadline measured from when draining starts. The
//!   drain never lasts longer than `deadline`.
//!
//! [`drain_before`] additionally caps every wait at a fixed instant, so a
//! caller with its own budget never waits past it, whatever the policy.
//!
//! A timeout is soft: keys whose outcome has not arrived are simply missing
//! from the result. Outcomes already queued when the timer fires are still
//! collected.

use std::time::Duration;

use tokio::sync::mpsc;
use tokio::time::{timeout_at, Instant};

use crate::config::DeadlinePolicy;
use crate::fanout::LookupOutcome;

/// What the guard managed to collect.
#[derive(Debug)]
pub struct Drained<K, E> {
    pub outcomes: Vec<LookupOutcome<K, E>>,
    /// `true` if draining stopped because the deadline elapsed.
    pub timed_out: bool,
}

impl<K, E> Drained<K, E> {
    /// Number of expected outcomes that never arrived.
    pub fn missing(&self, expected: usize) -> usize {
        expected.saturating_sub(self.outcomes.len())
    }
}

/// Drain up to `expected` outcomes from `rx`, bounded by `deadline`.
///
/// The receiver is dropped on return, so lookups finishing later fail their
/// send instead of blocking.
pub async fn drain_bounded<K, E>(
    rx: mpsc::Receiver<LookupOutcome<K, E>>,
    expected: usize,
    deadline: Duration,
    policy: DeadlinePolicy,
) -> Drained<K, E> {
    drain(rx, expected, deadline, policy, None).await
}

/// Like [`drain_bounded`], but never waits past `ceiling`.
pub async fn drain_before<K, E>(
    rx: mpsc::Receiver<LookupOutcome<K, E>>,
    expected: usize,
    deadline: Duration,
    policy: DeadlinePolicy,
    ceiling: Instant,
) -> Drained<K, E> {
    drain(rx, expected, deadline, policy, Some(ceiling)).await
}

async fn drain<K, E>(
    mut rx: mpsc::Receiver<LookupOutcome<K, E>>,
    expected: usize,
    deadline: Duration,
    policy: DeadlinePolicy,
    ceiling: Option<Instant>,
) -> Drained<K, E> {
    let mut outcomes = Vec::with_capacity(expected);
    let overall = Instant::now() + deadline;
    let mut timed_out = false;

    while outcomes.len() < expected {
        let wait_until = match policy {
            DeadlinePolicy::PerOutcome => Instant::now() + deadline,
            DeadlinePolicy::Overall => overall,
        };
        let wait_until = ceiling.map_or(wait_until, |c| wait_until.min(c));

        let next = timeout_at(wait_until, rx.recv()).await;

        match next {
            Ok(Some(outcome)) => outcomes.push(outcome),
            // Every producer is gone; nothing more can arrive.
            Ok(None) => break,
            Err(_) => {
                timed_out = true;
                break;
            }
        }
    }

    if timed_out {
        while outcomes.len() < expected {
            match rx.try_recv() {
                Ok(outcome) => outcomes.push(outcome),
                Err(_) => break,
            }
        }
    }

    Drained { outcomes, timed_out }
}
