// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Auction Engine

//! The auction lifecycle state machine.
//!
//! One engine instance owns one auction's mutable state: derived price,
//! countdown, bid ledger, prize pool, and the per-cycle bonus flag. All
//! mutating operations take `&mut self`; the hosting process provides
//! the one-lock-per-auction serialization boundary, so every operation
//! observes and produces a consistent state.
//!
//! Transitions:
//!   Pending --open()--> Active
//!   Active  --place_bid()--> Active       (timer extended, never shortened)
//!   Active  --tick()--> Active | Ended    (the only path to Ended)
//!   Ended   --end_auction()--> Ended      (idempotent, returns stored results)

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::errors::{CommandError, ConfigError};
use crate::jackpot::SharedJackpot;
use crate::ledger::BidLedger;
use crate::params::AuctionParams;
use crate::prize::PrizeCalculator;
use crate::types::{
    AuctionId, AuctionPhase, AuctionResults, AuctionSnapshot, Lari, LeaderRef, UserId,
};
use crate::wallet::WalletRegistry;

// ─── Auction ─────────────────────────────────────────────────────────────────

/// One auction's state. Current price is always derived from the ledger
/// length, so `price == starting_price + increment * bid_count` holds by
/// construction after every mutation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Auction {
    pub id: AuctionId,
    pub title: String,
    pub description: String,
    pub params: AuctionParams,
    pub prize_pool: Lari,
    pub time_left: u32,
    pub phase: AuctionPhase,
    pub bids: BidLedger,
    pub final_results: Option<AuctionResults>,
}

impl Auction {
    pub fn current_price(&self) -> Lari {
        self.params.starting_price + self.params.increment * self.bids.len() as u64
    }
}

// ─── AuctionEngine ───────────────────────────────────────────────────────────

pub struct AuctionEngine {
    auction: Auction,
    calculator: PrizeCalculator,
    /// Whether the bonus was already collected in the current countdown
    /// cycle. Re-armed when the timer is re-armed, never by a tick.
    bonus_collected: bool,
    tick_count: u64,
}

impl AuctionEngine {
    /// Build an engine for a fresh auction in `Pending` phase.
    ///
    /// Malformed parameters abort construction; a running auction never
    /// sees them.
    pub fn new(
        id: AuctionId,
        title: &str,
        description: &str,
        params: AuctionParams,
    ) -> Result<Self, ConfigError> {
        params.validate()?;
        let time_left = params.countdown_secs;
        Ok(Self {
            auction: Auction {
                bids: BidLedger::new(id.clone()),
                id,
                title: title.to_string(),
                description: description.to_string(),
                params,
                prize_pool: Lari::zero(),
                time_left,
                phase: AuctionPhase::Pending,
                final_results: None,
            },
            calculator: PrizeCalculator::default(),
            bonus_collected: false,
            tick_count: 0,
        })
    }

    /// Replace the prize schedule (defaults otherwise).
    pub fn with_calculator(mut self, calculator: PrizeCalculator) -> Self {
        self.calculator = calculator;
        self
    }

    /// Open the auction for bidding: `Pending -> Active`, timer armed.
    /// No-op on an already-open or ended auction.
    pub fn open(&mut self) {
        if self.auction.phase == AuctionPhase::Pending {
            self.auction.phase = AuctionPhase::Active;
            self.auction.time_left = self.auction.params.countdown_secs;
            self.bonus_collected = false;
        }
    }

    /// Apply one bid from `bidder`.
    ///
    /// On success: one credit is consumed, the bid lands in the ledger
    /// (raising the derived price by exactly one increment), the pool
    /// accrues its share of the bid fee, the countdown is extended to
    /// `max(time_left, countdown_secs)`, and the jackpot is fed. On any
    /// failure nothing is mutated.
    pub fn place_bid(
        &mut self,
        wallets: &mut WalletRegistry,
        jackpot: &SharedJackpot,
        bidder: &UserId,
    ) -> Result<AuctionSnapshot, CommandError> {
        match self.auction.phase {
            AuctionPhase::Active => {}
            AuctionPhase::Ended => {
                return Err(CommandError::AuctionEnded(self.auction.id.clone()))
            }
            AuctionPhase::Pending => return Err(CommandError::InvalidBid),
        }
        let username = wallets.fetch(bidder)?.username.clone();
        wallets.spend_bid_credit(bidder)?;

        let amount = self.auction.params.starting_price
            + self.auction.params.increment * (self.auction.bids.len() as u64 + 1);
        self.auction
            .bids
            .append(bidder.clone(), username, amount, self.tick_count);
        self.auction.prize_pool += self.auction.params.pool_contribution();

        // Extension never shortens an already-longer window. When the
        // timer is re-armed to its full value the bonus cycle restarts.
        let extension = self.auction.params.countdown_secs;
        if extension >= self.auction.time_left {
            self.auction.time_left = extension;
            self.bonus_collected = false;
        }

        jackpot.feed(amount);
        Ok(self.snapshot())
    }

    /// Advance the countdown by one second.
    ///
    /// The sole transition source to `Ended`: when the timer runs out
    /// the auction ends and settles exactly once. Ticking a `Pending` or
    /// `Ended` auction is a no-op, so a straggling timer event after
    /// settlement cannot re-fire anything.
    pub fn tick<R: Rng>(
        &mut self,
        wallets: &mut WalletRegistry,
        jackpot: &SharedJackpot,
        rng: &mut R,
    ) -> AuctionSnapshot {
        if !self.auction.phase.is_active() {
            return self.snapshot();
        }
        self.tick_count += 1;
        if self.auction.time_left <= 1 {
            self.auction.time_left = 0;
            self.end_auction(wallets, jackpot, rng);
        } else {
            self.auction.time_left -= 1;
        }
        self.snapshot()
    }

    /// Collect the bonus ("lucky coin") for the current countdown cycle.
    ///
    /// Exclusive within a cycle: the first collection wins, later
    /// attempts fail until a bid re-arms the timer. Rival bidders are
    /// rejected unless the auction is configured to allow them.
    pub fn collect_bonus(
        &mut self,
        wallets: &mut WalletRegistry,
        collector: &UserId,
    ) -> Result<u32, CommandError> {
        if !self.auction.phase.is_active() {
            return Err(CommandError::AuctionEnded(self.auction.id.clone()));
        }
        let user = wallets.fetch(collector)?;
        if user.is_bot && !self.auction.params.bots_can_collect_bonus {
            return Err(CommandError::BonusNotForBots);
        }
        if self.bonus_collected {
            return Err(CommandError::BonusAlreadyCollected);
        }
        let credits = wallets.grant_credits(collector, self.auction.params.bonus_credits)?;
        self.bonus_collected = true;
        Ok(credits)
    }

    /// End the auction and settle prizes. Idempotent: the first call
    /// computes and pays the distribution; every later call returns the
    /// stored results without recomputing or paying again.
    ///
    /// An auction nobody bid on ends with no results and pays nothing.
    pub fn end_auction<R: Rng>(
        &mut self,
        wallets: &mut WalletRegistry,
        jackpot: &SharedJackpot,
        rng: &mut R,
    ) -> Option<&AuctionResults> {
        if self.auction.phase == AuctionPhase::Ended {
            return self.auction.final_results.as_ref();
        }
        self.auction.phase = AuctionPhase::Ended;
        self.auction.time_left = 0;

        let mut results =
            match self
                .calculator
                .compute_results(self.auction.prize_pool, &self.auction.bids, rng)
            {
                Some(r) => r,
                None => return None,
            };

        if results.jackpot_triggered {
            let amount = jackpot.claim();
            results.jackpot_winner = Some(results.winner.user.clone());
            results.jackpot_amount = Some(amount);
            let _ = wallets.award_prize(&results.winner.user, amount);
        }

        // Recipients unknown to the registry are skipped, not fatal.
        let _ = wallets.award_win(&results.winner.user, results.winner.prize);
        for payout in results
            .second
            .iter()
            .chain(results.third.iter())
            .chain(results.random_rewards.iter())
        {
            let _ = wallets.award_prize(&payout.user, payout.prize);
        }

        self.auction.final_results = Some(results);
        self.auction.final_results.as_ref()
    }

    /// Observable state for the presentation layer.
    pub fn snapshot(&self) -> AuctionSnapshot {
        AuctionSnapshot {
            auction_id: self.auction.id.clone(),
            title: self.auction.title.clone(),
            phase: self.auction.phase,
            current_price: self.auction.current_price(),
            time_left: self.auction.time_left,
            leader: self.auction.bids.leader().map(|bid| LeaderRef {
                user: bid.bidder.clone(),
                username: bid.username.clone(),
            }),
            bid_count: self.auction.bids.len(),
            prize_pool: self.auction.prize_pool,
            results: self.auction.final_results.clone(),
        }
    }

    pub fn id(&self) -> &AuctionId {
        &self.auction.id
    }

    pub fn phase(&self) -> AuctionPhase {
        self.auction.phase
    }

    pub fn auction(&self) -> &Auction {
        &self.auction
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
