// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Auction Parameters

//! Construction-time auction configuration.
//!
//! Parameters are validated once, when an auction is built; a malformed
//! set (non-positive increment, zero countdown) aborts construction
//! instead of being handled per-call.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::ConfigError;
use crate::types::Lari;

// ─── AuctionParams ───────────────────────────────────────────────────────────

/// Economic configuration of one auction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionParams {
    /// Item price before any bid.
    pub starting_price: Lari,
    /// Price increase per accepted bid. Must be > 0.
    pub increment: Lari,
    /// Fee one bid credit was purchased for; the pool and jackpot are
    /// funded from this, not from the item price.
    pub bid_cost: Lari,
    /// Initial countdown AND the value the timer is re-armed to on
    /// every accepted bid. Must be > 0.
    pub countdown_secs: u32,
    /// Fraction of each bid's derived amount fed to the global jackpot.
    pub jackpot_rate: Decimal,
    /// Fraction of each bid fee accrued to this auction's prize pool.
    pub pool_share_of_bid: Decimal,
    /// Bid credits granted per bonus ("lucky coin") collection.
    pub bonus_credits: u32,
    /// Whether rival (synthetic) bidders may collect the bonus. Game
    /// modes differ on this, so it is configuration, not policy.
    #[serde(default)]
    pub bots_can_collect_bonus: bool,
}

impl Default for AuctionParams {
    fn default() -> Self {
        Self {
            starting_price: Lari(dec!(0.01)),
            increment: Lari(dec!(0.01)),
            bid_cost: Lari(dec!(0.60)),
            countdown_secs: 10,
            jackpot_rate: dec!(0.02),
            pool_share_of_bid: dec!(0.60),
            bonus_credits: 1,
            bots_can_collect_bonus: false,
        }
    }
}

impl AuctionParams {
    /// Check the construction invariants.
    ///
    /// # Errors
    /// - `NonPositiveIncrement` if `increment <= 0`.
    /// - `NonPositiveBidCost` if `bid_cost <= 0`.
    /// - `ZeroCountdown` if `countdown_secs == 0`.
    /// - `RateOutOfRange` if `jackpot_rate` or `pool_share_of_bid` is
    ///   outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.increment.0 <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveIncrement(self.increment.0));
        }
        if self.bid_cost.0 <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveBidCost(self.bid_cost.0));
        }
        if self.countdown_secs == 0 {
            return Err(ConfigError::ZeroCountdown);
        }
        for rate in [self.jackpot_rate, self.pool_share_of_bid] {
            if rate < Decimal::ZERO || rate > Decimal::ONE {
                return Err(ConfigError::RateOutOfRange(rate));
            }
        }
        Ok(())
    }

    /// Pool accrual per accepted bid: `bid_cost * pool_share_of_bid`.
    pub fn pool_contribution(&self) -> Lari {
        Lari(self.bid_cost.0 * self.pool_share_of_bid)
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
