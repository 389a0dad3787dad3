// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Rival Bidders

//! Scheduling policy for rival (synthetic) bidders.
//!
//! Rivals are ordinary registered users: their bids go through the same
//! validation, wallet debit, and timer extension as everyone else's, and
//! the engine never special-cases them. Only the decision of WHEN to bid
//! lives here -- a seeded random policy that strikes in the final seconds
//! of the countdown, exactly like a sniping human.

use std::time::Duration;

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::types::{AuctionSnapshot, UserId};

/// Display names for the rival pool.
pub const RIVAL_NAMES: [&str; 15] = [
    "nika23", "data77", "mari_ge", "luka2024", "ana_k", "saba99", "nino_t", "giorgi_m",
    "keti15", "temo88", "sophie_g", "alex_tbilisi", "maka_cute", "oto_king", "nata_geo",
];

// ─── RivalScheduler ──────────────────────────────────────────────────────────

/// Decides, once per second, whether a rival snipes the auction.
pub struct RivalScheduler {
    rng: ChaCha8Rng,
    /// Chance that a rival bids on an eligible second (default 0.7).
    pub bid_probability: f64,
    /// Rivals only strike when `window_min < time_left <= window_max`:
    /// late enough to build tension, never on the very last second.
    pub window_min: u32,
    pub window_max: u32,
    /// Reaction delay bounds for the threaded loop (default 500-1500ms).
    pub delay_min_ms: u64,
    pub delay_max_ms: u64,
}

impl RivalScheduler {
    pub fn new(rng: ChaCha8Rng) -> Self {
        Self {
            rng,
            bid_probability: 0.7,
            window_min: 1,
            window_max: 4,
            delay_min_ms: 500,
            delay_max_ms: 1500,
        }
    }

    /// Pick the rival who bids right now, if any.
    ///
    /// Returns `None` outside the strike window, when the auction is
    /// over, when the roster is empty, or when the dice say wait.
    pub fn decide(&mut self, snapshot: &AuctionSnapshot, roster: &[UserId]) -> Option<UserId> {
        if !snapshot.phase.is_active() || roster.is_empty() {
            return None;
        }
        if snapshot.time_left <= self.window_min || snapshot.time_left > self.window_max {
            return None;
        }
        if self.rng.gen::<f64>() >= self.bid_probability {
            return None;
        }
        let pick = self.rng.gen_range(0..roster.len());
        Some(roster[pick].clone())
    }

    /// Randomized reaction delay before the next strike attempt.
    pub fn next_delay(&mut self) -> Duration {
        let ms = self.rng.gen_range(self.delay_min_ms..=self.delay_max_ms);
        Duration::from_millis(ms)
    }
}

/// Poisson sample via Knuth's algorithm -- arrival counts for load
/// generation in the validation runner.
pub fn poisson_arrivals(rng: &mut ChaCha8Rng, lambda: f64) -> u32 {
    if lambda <= 0.0 {
        return 0;
    }
    let l = (-lambda).exp();
    let mut k: u32 = 0;
    let mut p: f64 = 1.0;
    loop {
        k += 1;
        p *= rng.gen::<f64>();
        if p <= l {
            return k - 1;
        }
    }
}

// ─── AutoBidder ──────────────────────────────────────────────────────────────

/// The player-side autobidder toggle: re-bids automatically when the
/// countdown gets dangerous and credits remain.
#[derive(Debug, Clone, Copy)]
pub struct AutoBidder {
    /// Bid when `0 < time_left <= threshold` (default 3).
    pub threshold: u32,
}

impl Default for AutoBidder {
    fn default() -> Self {
        Self { threshold: 3 }
    }
}

impl AutoBidder {
    pub fn should_bid(&self, snapshot: &AuctionSnapshot, credits: u32) -> bool {
        snapshot.phase.is_active()
            && snapshot.time_left > 0
            && snapshot.time_left <= self.threshold
            && credits > 0
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
