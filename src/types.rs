// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Type Definitions

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub};

// ─── Identifiers ─────────────────────────────────────────────────────────────

/// Unique user identifier, assigned by the wallet registry at registration.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for UserId {
    fn from(s: String) -> Self { UserId(s) }
}

impl From<&str> for UserId {
    fn from(s: &str) -> Self { UserId(s.to_string()) }
}

/// Unique auction identifier.
#[derive(Debug, Clone, Hash, Eq, PartialEq, Serialize, Deserialize)]
pub struct AuctionId(pub String);

impl fmt::Display for AuctionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<String> for AuctionId {
    fn from(s: String) -> Self { AuctionId(s) }
}

impl From<&str> for AuctionId {
    fn from(s: &str) -> Self { AuctionId(s.to_string()) }
}

/// Per-auction bid sequence number.
///
/// Assigned inside the auction's serialized boundary at the moment a bid
/// passes validation; numeric order IS chronological order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BidId(pub u64);

impl fmt::Display for BidId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// ─── Lari ────────────────────────────────────────────────────────────────────

/// Lari denomination backed by `rust_decimal::Decimal`.
///
/// All monetary amounts in the suite are exact fixed-point: repeated
/// addition of a 0.01 increment over thousands of bids must not drift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Lari(pub Decimal);

impl Lari {
    /// Zero value
    pub fn zero() -> Self {
        Self(Decimal::ZERO)
    }

    /// Create from a `Decimal` value
    pub fn from_decimal(d: Decimal) -> Self {
        Self(d)
    }

    /// Whether the value is exactly zero
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Subtraction that refuses to go negative.
    pub fn checked_sub(self, rhs: Self) -> Option<Self> {
        if rhs.0 > self.0 {
            None
        } else {
            Some(Self(self.0 - rhs.0))
        }
    }
}

impl Add for Lari {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Lari {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sub for Lari {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self(self.0 - rhs.0)
    }
}

impl Mul<u64> for Lari {
    type Output = Self;
    fn mul(self, rhs: u64) -> Self::Output {
        Self(self.0 * Decimal::from(rhs))
    }
}

impl fmt::Display for Lari {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}₾", self.0)
    }
}

// ─── User ────────────────────────────────────────────────────────────────────

/// A registered participant: human player or rival (synthetic) bidder.
///
/// Rivals go through the exact same bid path as humans; `is_bot` exists
/// only for policy decisions that live outside the bidding rules (bonus
/// collection eligibility).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: UserId,
    pub username: String,
    /// Spendable currency balance. Never observably negative.
    pub balance: Lari,
    /// Prepaid bid credits; one credit buys one bid placement.
    pub credits: u32,
    pub total_winnings: Lari,
    pub auctions_won: u32,
    pub total_bids: u64,
    #[serde(default)]
    pub is_bot: bool,
}

// ─── Bid ─────────────────────────────────────────────────────────────────────

/// One accepted bid. Immutable once appended to the ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: BidId,
    pub auction_id: AuctionId,
    pub bidder: UserId,
    /// Display-name snapshot at placement time.
    pub username: String,
    /// Derived item price after this bid was applied.
    pub amount: Lari,
    /// Engine tick on which the bid landed (display ordering only;
    /// `id` is the authoritative ordering key).
    pub placed_at_tick: u64,
}

// ─── AuctionPhase ────────────────────────────────────────────────────────────

/// Auction lifecycle state. Born at `Pending`, dies at `Ended`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AuctionPhase {
    /// Created but not yet open for bids.
    Pending,
    /// Countdown running, bids accepted.
    Active,
    /// TERMINAL: timer expired, results computed, immutable.
    Ended,
}

impl AuctionPhase {
    /// Whether this phase is terminal (no further transitions)
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Ended)
    }

    /// Whether bids are currently accepted
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }
}

// ─── Prize payouts ───────────────────────────────────────────────────────────

/// The winner's cut of the prize pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WinnerPayout {
    pub user: UserId,
    pub username: String,
    pub prize: Lari,
    /// Bonus percentage applied: 50 + 2 per winner bid, capped at 80.
    pub bonus_pct: u32,
}

/// A non-winner payout (second, third, or random reward).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlacePayout {
    pub user: UserId,
    pub username: String,
    pub prize: Lari,
}

/// Final prize distribution of one finished auction.
///
/// Computed exactly once at auction end and stored immutably; repeated
/// settlement calls return this stored value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuctionResults {
    pub winner: WinnerPayout,
    pub second: Option<PlacePayout>,
    pub third: Option<PlacePayout>,
    /// Up to three extra recipients beyond the podium, 1-6% of pool each.
    pub random_rewards: Vec<PlacePayout>,
    pub jackpot_triggered: bool,
    #[serde(default)]
    pub jackpot_winner: Option<UserId>,
    #[serde(default)]
    pub jackpot_amount: Option<Lari>,
}

impl AuctionResults {
    /// Sum of all pool-funded payouts (excludes the jackpot, which is
    /// funded by the cross-auction accumulator, not this pool).
    pub fn pool_payout_total(&self) -> Lari {
        let mut total = self.winner.prize;
        if let Some(p) = &self.second {
            total += p.prize;
        }
        if let Some(p) = &self.third {
            total += p.prize;
        }
        for p in &self.random_rewards {
            total += p.prize;
        }
        total
    }
}

// ─── AuctionSnapshot ─────────────────────────────────────────────────────────

/// Current leader reference carried in snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeaderRef {
    pub user: UserId,
    pub username: String,
}

/// Observable auction state, emitted after every accepted command and
/// every tick. This is the entire contract between the engine and the
/// presentation layer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuctionSnapshot {
    pub auction_id: AuctionId,
    pub title: String,
    pub phase: AuctionPhase,
    pub current_price: Lari,
    pub time_left: u32,
    pub leader: Option<LeaderRef>,
    pub bid_count: usize,
    pub prize_pool: Lari,
    /// Present once the auction has ended and at least one bid was placed.
    #[serde(default)]
    pub results: Option<AuctionResults>,
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn lari_exact_repeated_addition() {
        let mut total = Lari::zero();
        for _ in 0..10_000 {
            total += Lari(dec!(0.01));
        }
        assert_eq!(total, Lari(dec!(100.00)));
    }

    #[test]
    fn lari_checked_sub_refuses_negative() {
        let a = Lari(dec!(1.00));
        assert_eq!(a.checked_sub(Lari(dec!(0.40))), Some(Lari(dec!(0.60))));
        assert_eq!(a.checked_sub(Lari(dec!(1.01))), None);
        assert_eq!(a.checked_sub(a), Some(Lari::zero()));
    }

    #[test]
    fn lari_mul_count() {
        assert_eq!(Lari(dec!(0.01)) * 3, Lari(dec!(0.03)));
        assert_eq!(Lari(dec!(0.02)) * 0, Lari::zero());
    }

    #[test]
    fn phase_terminality() {
        assert!(AuctionPhase::Ended.is_terminal());
        assert!(!AuctionPhase::Active.is_terminal());
        assert!(AuctionPhase::Active.is_active());
        assert!(!AuctionPhase::Pending.is_active());
    }

    #[test]
    fn results_pool_total_sums_all_payouts() {
        let results = AuctionResults {
            winner: WinnerPayout {
                user: UserId::from("u-1"),
                username: "vako12".to_string(),
                prize: Lari(dec!(7.168)),
                bonus_pct: 56,
            },
            second: Some(PlacePayout {
                user: UserId::from("u-2"),
                username: "nika23".to_string(),
                prize: Lari(dec!(3.2)),
            }),
            third: None,
            random_rewards: vec![PlacePayout {
                user: UserId::from("u-3"),
                username: "data77".to_string(),
                prize: Lari(dec!(0.5)),
            }],
            jackpot_triggered: false,
            jackpot_winner: None,
            jackpot_amount: None,
        };
        assert_eq!(results.pool_payout_total(), Lari(dec!(10.868)));
    }
}
