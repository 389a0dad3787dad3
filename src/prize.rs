// Copyright (c) 2026 Hypermesh Foundation. All rights reserved.
// Licensed under the Business Source License 1.1.
// See the LICENSE file in the repository root for full license text.

//! Prize distribution -- splitting a finished auction's pool among the
//! winner, the runners-up, and a handful of random reward recipients.
//!
//! No value creation occurs here. Payouts are computed in rank order
//! against a running remainder of the pool and clamped to it, so the
//! distribution can never exceed the pool even though the nominal
//! percentages (80 + 25 + 10 + 3×6) sum above 100%.

use rand::Rng;
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::ledger::BidLedger;
use crate::types::{AuctionResults, Lari, PlacePayout, WinnerPayout};

// ─── PrizeCalculator ─────────────────────────────────────────────────────────

/// Stateless prize splitter -- holds the share schedule.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrizeCalculator {
    /// Winner's base share of the pool, in whole percent (default 50).
    pub winner_base_pct: u32,
    /// Extra winner percent per bid the winner placed (default 2).
    pub winner_per_bid_pct: u32,
    /// Winner share ceiling, in whole percent (default 80).
    pub winner_cap_pct: u32,
    /// Runner-up share (default 0.25).
    pub second_share: Decimal,
    /// Third-place share (default 0.10).
    pub third_share: Decimal,
    /// Random reward draw bounds as pool fractions (default 1%..6%).
    pub random_min: f64,
    pub random_max: f64,
    /// How many random reward slots beyond the podium (default 3).
    pub random_slots: usize,
    /// Probability that this auction also triggers the global jackpot
    /// (default 0.10).
    pub jackpot_probability: f64,
}

impl Default for PrizeCalculator {
    fn default() -> Self {
        Self {
            winner_base_pct: 50,
            winner_per_bid_pct: 2,
            winner_cap_pct: 80,
            second_share: dec!(0.25),
            third_share: dec!(0.10),
            random_min: 0.01,
            random_max: 0.06,
            random_slots: 3,
            jackpot_probability: 0.10,
        }
    }
}

impl PrizeCalculator {
    /// Winner bonus percentage for a winner who placed `winner_bids`
    /// bids: `min(base + per_bid * n, cap)`.
    pub fn winner_bonus_pct(&self, winner_bids: usize) -> u32 {
        let raw = self.winner_base_pct + self.winner_per_bid_pct * winner_bids as u32;
        raw.min(self.winner_cap_pct)
    }

    /// Compute the distribution for a finished auction.
    ///
    /// Returns `None` when the ledger is empty -- an auction nobody bid
    /// on has no winner and pays nothing. The jackpot trigger is drawn
    /// here, but the jackpot amount is filled in by the caller at claim
    /// time (the accumulator is shared and must be drained atomically).
    ///
    /// Randomness comes exclusively from `rng`; seed it for determinism.
    pub fn compute_results<R: Rng>(
        &self,
        prize_pool: Lari,
        ledger: &BidLedger,
        rng: &mut R,
    ) -> Option<AuctionResults> {
        let ranked = ledger.distinct_bidders();
        let winner_id = ranked.first()?.clone();

        let name_of = |id: &crate::types::UserId| {
            ledger.username_of(id).unwrap_or_default().to_string()
        };

        // Clamp each payout to whatever is left of the pool.
        fn take(raw: Lari, remaining: &mut Lari) -> Lari {
            let paid = raw.min(*remaining);
            *remaining = *remaining - paid;
            paid
        }
        let mut remaining = prize_pool;

        let bonus_pct = self.winner_bonus_pct(ledger.bids_by(&winner_id));
        let winner_raw = Lari(prize_pool.0 * Decimal::from(bonus_pct) / dec!(100));
        let winner = WinnerPayout {
            username: name_of(&winner_id),
            user: winner_id,
            prize: take(winner_raw, &mut remaining),
            bonus_pct,
        };

        let second = ranked.get(1).map(|id| PlacePayout {
            user: id.clone(),
            username: name_of(id),
            prize: take(Lari(prize_pool.0 * self.second_share), &mut remaining),
        });

        let third = ranked.get(2).map(|id| PlacePayout {
            user: id.clone(),
            username: name_of(id),
            prize: take(Lari(prize_pool.0 * self.third_share), &mut remaining),
        });

        let random_rewards: Vec<PlacePayout> = ranked
            .iter()
            .skip(3)
            .take(self.random_slots)
            .map(|id| {
                let fraction = rng.gen_range(self.random_min..self.random_max);
                let raw = Lari(
                    prize_pool.0
                        * Decimal::from_f64(fraction).unwrap_or(Decimal::ZERO),
                );
                PlacePayout {
                    user: id.clone(),
                    username: name_of(id),
                    prize: take(raw, &mut remaining),
                }
            })
            .collect();

        let jackpot_triggered = rng.gen::<f64>() < self.jackpot_probability;

        Some(AuctionResults {
            winner,
            second,
            third,
            random_rewards,
            jackpot_triggered,
            jackpot_winner: None,
            jackpot_amount: None,
        })
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AuctionId, UserId};
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    fn ledger_with(bidders: &[&str]) -> BidLedger {
        let mut ledger = BidLedger::new(AuctionId::from("a-1"));
        for (i, name) in bidders.iter().enumerate() {
            ledger.append(
                UserId::from(*name),
                name.to_string(),
                Lari(dec!(0.01)) * (i as u64 + 1),
                i as u64,
            );
        }
        ledger
    }

    fn rng(seed: u64) -> ChaCha8Rng {
        ChaCha8Rng::seed_from_u64(seed)
    }

    #[test]
    fn winner_bonus_schedule() {
        let calc = PrizeCalculator::default();
        assert_eq!(calc.winner_bonus_pct(0), 50);
        assert_eq!(calc.winner_bonus_pct(3), 56);
        assert_eq!(calc.winner_bonus_pct(15), 80);
        assert_eq!(calc.winner_bonus_pct(100), 80);
    }

    #[test]
    fn winner_with_three_of_seven_bids() {
        // Winner placed 3 of 7 bids, pool 12.8:
        // bonus = min(50+6, 80) = 56%, prize = 12.8 * 0.56 = 7.168
        let calc = PrizeCalculator::default();
        let ledger = ledger_with(&["a", "w", "b", "w", "b", "a", "w"]);

        let results = calc
            .compute_results(Lari(dec!(12.8)), &ledger, &mut rng(7))
            .expect("has bids");
        assert_eq!(results.winner.user, UserId::from("w"));
        assert_eq!(results.winner.bonus_pct, 56);
        assert_eq!(results.winner.prize, Lari(dec!(7.168)));
    }

    #[test]
    fn podium_shares() {
        let calc = PrizeCalculator::default();
        let ledger = ledger_with(&["third", "second", "winner"]);
        let results = calc
            .compute_results(Lari(dec!(100)), &ledger, &mut rng(1))
            .expect("has bids");

        // Winner placed 1 bid: 52%
        assert_eq!(results.winner.prize, Lari(dec!(52)));
        assert_eq!(results.second.as_ref().unwrap().prize, Lari(dec!(25)));
        assert_eq!(results.second.as_ref().unwrap().user, UserId::from("second"));
        assert_eq!(results.third.as_ref().unwrap().prize, Lari(dec!(10)));
        assert!(results.random_rewards.is_empty());
    }

    #[test]
    fn lone_bidder_gets_only_winner_slot() {
        let calc = PrizeCalculator::default();
        let ledger = ledger_with(&["solo", "solo", "solo"]);
        let results = calc
            .compute_results(Lari(dec!(10)), &ledger, &mut rng(3))
            .expect("has bids");
        assert!(results.second.is_none());
        assert!(results.third.is_none());
        assert!(results.random_rewards.is_empty());
        // 50 + 2*3 = 56%
        assert_eq!(results.winner.prize, Lari(dec!(5.6)));
    }

    #[test]
    fn empty_ledger_yields_no_results() {
        let calc = PrizeCalculator::default();
        let ledger = BidLedger::new(AuctionId::from("a-1"));
        assert!(calc
            .compute_results(Lari(dec!(10)), &ledger, &mut rng(0))
            .is_none());
    }

    #[test]
    fn random_rewards_bounded_and_capped_at_three() {
        let calc = PrizeCalculator::default();
        let ledger = ledger_with(&["r5", "r4", "r3", "r2", "r1", "third", "second", "winner"]);
        let pool = Lari(dec!(100));
        let results = calc
            .compute_results(pool, &ledger, &mut rng(42))
            .expect("has bids");

        assert_eq!(results.random_rewards.len(), 3);
        for payout in &results.random_rewards {
            assert!(payout.prize >= Lari(dec!(1)), "below 1%: {}", payout.prize);
            assert!(payout.prize <= Lari(dec!(6)), "above 6%: {}", payout.prize);
        }
    }

    #[test]
    fn same_seed_same_draws() {
        let calc = PrizeCalculator::default();
        let ledger = ledger_with(&["e", "d", "c", "b", "a", "w"]);
        let first = calc.compute_results(Lari(dec!(50)), &ledger, &mut rng(9));
        let second = calc.compute_results(Lari(dec!(50)), &ledger, &mut rng(9));
        assert_eq!(first, second);
    }

    #[test]
    fn payouts_never_exceed_pool() {
        // Degenerate schedule: every share maxed so the nominal sum is
        // far above 100%. The clamp must hold for any seed.
        let calc = PrizeCalculator {
            winner_base_pct: 80,
            winner_per_bid_pct: 0,
            winner_cap_pct: 80,
            ..PrizeCalculator::default()
        };
        let ledger = ledger_with(&["f", "e", "d", "c", "b", "a"]);
        let pool = Lari(dec!(12.8));
        for seed in 0..200 {
            let results = calc
                .compute_results(pool, &ledger, &mut rng(seed))
                .expect("has bids");
            assert!(
                results.pool_payout_total() <= pool,
                "seed {} overpaid: {} > {}",
                seed,
                results.pool_payout_total(),
                pool
            );
        }
    }

    #[test]
    fn jackpot_trigger_rate_near_ten_percent() {
        let calc = PrizeCalculator::default();
        let ledger = ledger_with(&["a", "b"]);
        let n = 10_000;
        let mut triggered = 0;
        let mut r = rng(1234);
        for _ in 0..n {
            let results = calc
                .compute_results(Lari(dec!(10)), &ledger, &mut r)
                .expect("has bids");
            if results.jackpot_triggered {
                triggered += 1;
            }
        }
        let rate = triggered as f64 / n as f64;
        assert!((rate - 0.10).abs() < 0.02, "trigger rate {} far from 10%", rate);
    }
}
