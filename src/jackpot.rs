// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Global Jackpot

//! Cross-auction jackpot pool.
//!
//! Every accepted bid on every auction feeds a fixed fraction of its
//! amount here. The pool grows monotonically between claims and drains
//! to zero atomically when claimed. Its lock is independent of any
//! auction's lock: feeds and claims take amounts by value, so no caller
//! ever holds an auction lock and the jackpot lock for longer than the
//! arithmetic itself.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::types::Lari;

// ─── JackpotAccumulator ──────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JackpotAccumulator {
    total: Lari,
    /// Fraction of each fed amount that lands in the pool (default 2%).
    rate: Decimal,
}

impl Default for JackpotAccumulator {
    fn default() -> Self {
        Self::new(dec!(0.02))
    }
}

impl JackpotAccumulator {
    pub fn new(rate: Decimal) -> Self {
        Self {
            total: Lari::zero(),
            rate,
        }
    }

    /// Add `amount * rate` to the pool; returns the contribution.
    pub fn feed(&mut self, amount: Lari) -> Lari {
        let contribution = Lari(amount.0 * self.rate);
        self.total += contribution;
        contribution
    }

    /// Drain the pool to zero, returning everything accumulated.
    pub fn claim(&mut self) -> Lari {
        std::mem::replace(&mut self.total, Lari::zero())
    }

    pub fn total(&self) -> Lari {
        self.total
    }

    pub fn rate(&self) -> Decimal {
        self.rate
    }
}

// ─── SharedJackpot ───────────────────────────────────────────────────────────

/// Process-wide handle shared by all auctions and the host.
#[derive(Debug, Clone, Default)]
pub struct SharedJackpot(Arc<Mutex<JackpotAccumulator>>);

impl SharedJackpot {
    pub fn new(rate: Decimal) -> Self {
        Self(Arc::new(Mutex::new(JackpotAccumulator::new(rate))))
    }

    pub fn feed(&self, amount: Lari) -> Lari {
        self.0.lock().expect("jackpot lock poisoned").feed(amount)
    }

    pub fn claim(&self) -> Lari {
        self.0.lock().expect("jackpot lock poisoned").claim()
    }

    pub fn total(&self) -> Lari {
        self.0.lock().expect("jackpot lock poisoned").total()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
