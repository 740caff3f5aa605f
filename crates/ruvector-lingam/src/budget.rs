//! Compute budget for the ordering loop.
//!
//! The ordering engine asks [`BudgetEnforcer::admit`] for permission before
//! each iteration. Scoring inside an iteration is never interrupted, so a
//! run overshoots `max_time` by at most one iteration.

use std::time::{Duration, Instant};

use tracing::{trace, warn};

use crate::error::LingamError;
use crate::types::ComputeBudget;

/// Run-scoped budget tracker.
///
/// # Example
///
/// ```
/// use ruvector_lingam::budget::BudgetEnforcer;
/// use ruvector_lingam::types::ComputeBudget;
///
/// let mut enforcer = BudgetEnforcer::new(ComputeBudget::default());
/// enforcer.admit(0, 3).unwrap();
/// assert_eq!(enforcer.admitted(), 1);
/// ```
pub struct BudgetEnforcer {
    started: Instant,
    budget: ComputeBudget,
    admitted: usize,
}

impl BudgetEnforcer {
    /// Start the clock.
    pub fn new(budget: ComputeBudget) -> Self {
        Self {
            started: Instant::now(),
            budget,
            admitted: 0,
        }
    }

    /// Admit the next ordering iteration, with `placed` of `total`
    /// variables already ordered.
    ///
    /// # Errors
    ///
    /// [`LingamError::BudgetExhausted`] when the iteration limit or the wall
    /// time has run out. The reason names which one and how far the run got.
    pub fn admit(&mut self, placed: usize, total: usize) -> Result<(), LingamError> {
        let elapsed = self.elapsed();

        let reason = if self.admitted >= self.budget.max_iterations {
            Some(format!(
                "iteration limit {} reached with {placed}/{total} variables ordered",
                self.budget.max_iterations,
            ))
        } else if elapsed > self.budget.max_time {
            Some(format!(
                "wall-clock limit {:.2?} exceeded ({elapsed:.2?}) with {placed}/{total} variables ordered",
                self.budget.max_time,
            ))
        } else {
            None
        };

        if let Some(reason) = reason {
            warn!(placed, total, ?elapsed, %reason, "discovery budget exhausted");
            return Err(LingamError::BudgetExhausted { reason, elapsed });
        }

        self.admitted += 1;
        trace!(placed, remaining = ?self.remaining_time(), "ordering iteration admitted");
        Ok(())
    }

    /// Time since [`new`](Self::new).
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.started.elapsed()
    }

    /// Iterations admitted so far.
    #[inline]
    pub fn admitted(&self) -> usize {
        self.admitted
    }

    /// Wall time left before the limit, zero once it has passed.
    pub fn remaining_time(&self) -> Duration {
        self.budget.max_time.saturating_sub(self.elapsed())
    }
}
