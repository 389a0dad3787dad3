// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Bid Ledger

//! Append-only ordered bid log for one auction.
//!
//! The ledger is the single source of truth for leader identity and the
//! prize ranking. Bids carry a monotonically increasing sequence number
//! assigned at append time; ties are impossible.

use serde::{Deserialize, Serialize};

use crate::types::{AuctionId, Bid, BidId, Lari, UserId};

// ─── BidLedger ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BidLedger {
    auction_id: AuctionId,
    bids: Vec<Bid>,
    next_seq: u64,
}

impl BidLedger {
    pub fn new(auction_id: AuctionId) -> Self {
        Self {
            auction_id,
            bids: Vec::new(),
            next_seq: 1,
        }
    }

    /// Append an already-validated bid and return a reference to it.
    ///
    /// Phase and wallet validation happen in the engine, inside the same
    /// serialized boundary as this call; the ledger only assigns the
    /// ordering key. Price and bid count are both derived from the log
    /// length, so they can never be observed out of step with each other.
    pub fn append(
        &mut self,
        bidder: UserId,
        username: String,
        amount: Lari,
        placed_at_tick: u64,
    ) -> &Bid {
        let bid = Bid {
            id: BidId(self.next_seq),
            auction_id: self.auction_id.clone(),
            bidder,
            username,
            amount,
            placed_at_tick,
        };
        self.next_seq += 1;
        self.bids.push(bid);
        self.bids.last().expect("just pushed")
    }

    /// The current leader: bidder of the most recent append, or None on
    /// an empty log.
    pub fn leader(&self) -> Option<&Bid> {
        self.bids.last()
    }

    /// Bidders ranked most-recent-first, deduplicated keeping the first
    /// (i.e. most recent) occurrence. This is the prize ranking: index 0
    /// is the winner, 1 the runner-up, and so on.
    pub fn distinct_bidders(&self) -> Vec<UserId> {
        let mut seen: Vec<UserId> = Vec::new();
        for bid in self.bids.iter().rev() {
            if !seen.contains(&bid.bidder) {
                seen.push(bid.bidder.clone());
            }
        }
        seen
    }

    /// How many bids `user` placed in this auction.
    pub fn bids_by(&self, user: &UserId) -> usize {
        self.bids.iter().filter(|b| &b.bidder == user).count()
    }

    /// Display name recorded on `user`'s most recent bid.
    pub fn username_of(&self, user: &UserId) -> Option<&str> {
        self.bids
            .iter()
            .rev()
            .find(|b| &b.bidder == user)
            .map(|b| b.username.as_str())
    }

    pub fn len(&self) -> usize {
        self.bids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Bid> {
        self.bids.iter()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn ledger() -> BidLedger {
        BidLedger::new(AuctionId::from("a-1"))
    }

    fn put(l: &mut BidLedger, user: &str, tick: u64) {
        let n = l.len() as u64 + 1;
        l.append(
            UserId::from(user),
            user.to_string(),
            Lari(dec!(0.01)) * n,
            tick,
        );
    }

    #[test]
    fn empty_ledger_has_no_leader() {
        let l = ledger();
        assert!(l.leader().is_none());
        assert!(l.is_empty());
        assert!(l.distinct_bidders().is_empty());
    }

    #[test]
    fn leader_is_last_appended() {
        let mut l = ledger();
        put(&mut l, "nika23", 1);
        put(&mut l, "data77", 2);
        put(&mut l, "nika23", 3);
        assert_eq!(l.leader().unwrap().bidder, UserId::from("nika23"));
        assert_eq!(l.len(), 3);
    }

    #[test]
    fn sequence_is_strictly_increasing() {
        let mut l = ledger();
        for tick in 0..50 {
            put(&mut l, "mari_ge", tick);
        }
        let ids: Vec<u64> = l.iter().map(|b| b.id.0).collect();
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn distinct_bidders_most_recent_first() {
        let mut l = ledger();
        put(&mut l, "nika23", 1);
        put(&mut l, "data77", 2);
        put(&mut l, "mari_ge", 3);
        put(&mut l, "data77", 4); // data77 re-bids, jumps to front

        let ranked = l.distinct_bidders();
        assert_eq!(
            ranked,
            vec![
                UserId::from("data77"),
                UserId::from("mari_ge"),
                UserId::from("nika23"),
            ]
        );
    }

    #[test]
    fn per_user_bid_counts() {
        let mut l = ledger();
        put(&mut l, "saba99", 1);
        put(&mut l, "ana_k", 2);
        put(&mut l, "saba99", 3);
        assert_eq!(l.bids_by(&UserId::from("saba99")), 2);
        assert_eq!(l.bids_by(&UserId::from("ana_k")), 1);
        assert_eq!(l.bids_by(&UserId::from("ghost")), 0);
    }

    #[test]
    fn username_snapshot_survives() {
        let mut l = ledger();
        l.append(UserId::from("u-1"), "OldName".into(), Lari(dec!(0.01)), 1);
        assert_eq!(l.username_of(&UserId::from("u-1")), Some("OldName"));
        assert_eq!(l.username_of(&UserId::from("u-2")), None);
    }
}
