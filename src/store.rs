// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Persistence Collaborator

//! The persistence/subscription contract between the core and the
//! outside world.
//!
//! The core treats persistence as a key-value store accessed by id plus
//! two push channels: auction-state updates and newly accepted bids.
//! Validation never lives here -- bids reach `append_bid` only after
//! passing the engine's serialized checks, so the store persists
//! accepted records and fans them out to subscribers.
//!
//! `InMemoryStore` is the session-lifetime implementation used by tests
//! and the validation runner; a networked backend would implement the
//! same trait.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::types::{AuctionId, AuctionSnapshot, Bid, User, UserId};

/// Callback invoked with every persisted auction snapshot.
pub type SnapshotCallback = Arc<dyn Fn(&AuctionSnapshot) + Send + Sync>;
/// Callback invoked with every accepted bid.
pub type BidCallback = Arc<dyn Fn(&Bid) + Send + Sync>;

// ─── GameStore ───────────────────────────────────────────────────────────────

pub trait GameStore: Send + Sync {
    fn fetch_user(&self, id: &UserId) -> Option<User>;
    fn save_user(&self, user: &User);

    fn fetch_auction(&self, id: &AuctionId) -> Option<AuctionSnapshot>;
    /// Persist a snapshot and notify auction-update subscribers.
    fn save_auction(&self, snapshot: &AuctionSnapshot);

    /// Bids for one auction, most recent first.
    fn fetch_bids(&self, auction: &AuctionId) -> Vec<Bid>;
    /// Persist an accepted bid and notify new-bid subscribers.
    fn append_bid(&self, bid: &Bid);

    fn subscribe_auction_updates(&self, auction: &AuctionId, callback: SnapshotCallback);
    fn subscribe_new_bids(&self, auction: &AuctionId, callback: BidCallback);
}

// ─── InMemoryStore ───────────────────────────────────────────────────────────

#[derive(Default)]
pub struct InMemoryStore {
    users: Mutex<HashMap<UserId, User>>,
    auctions: Mutex<HashMap<AuctionId, AuctionSnapshot>>,
    bids: Mutex<HashMap<AuctionId, Vec<Bid>>>,
    auction_subs: Mutex<HashMap<AuctionId, Vec<SnapshotCallback>>>,
    bid_subs: Mutex<HashMap<AuctionId, Vec<BidCallback>>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GameStore for InMemoryStore {
    fn fetch_user(&self, id: &UserId) -> Option<User> {
        self.users.lock().expect("store lock").get(id).cloned()
    }

    fn save_user(&self, user: &User) {
        self.users
            .lock()
            .expect("store lock")
            .insert(user.id.clone(), user.clone());
    }

    fn fetch_auction(&self, id: &AuctionId) -> Option<AuctionSnapshot> {
        self.auctions.lock().expect("store lock").get(id).cloned()
    }

    fn save_auction(&self, snapshot: &AuctionSnapshot) {
        self.auctions
            .lock()
            .expect("store lock")
            .insert(snapshot.auction_id.clone(), snapshot.clone());

        // Snapshot the subscriber list, then invoke outside the lock so
        // a callback may read the store again.
        let subs: Vec<SnapshotCallback> = self
            .auction_subs
            .lock()
            .expect("store lock")
            .get(&snapshot.auction_id)
            .cloned()
            .unwrap_or_default();
        for callback in subs {
            callback(snapshot);
        }
    }

    fn fetch_bids(&self, auction: &AuctionId) -> Vec<Bid> {
        let mut bids = self
            .bids
            .lock()
            .expect("store lock")
            .get(auction)
            .cloned()
            .unwrap_or_default();
        bids.reverse();
        bids
    }

    fn append_bid(&self, bid: &Bid) {
        self.bids
            .lock()
            .expect("store lock")
            .entry(bid.auction_id.clone())
            .or_default()
            .push(bid.clone());

        let subs: Vec<BidCallback> = self
            .bid_subs
            .lock()
            .expect("store lock")
            .get(&bid.auction_id)
            .cloned()
            .unwrap_or_default();
        for callback in subs {
            callback(bid);
        }
    }

    fn subscribe_auction_updates(&self, auction: &AuctionId, callback: SnapshotCallback) {
        self.auction_subs
            .lock()
            .expect("store lock")
            .entry(auction.clone())
            .or_default()
            .push(callback);
    }

    fn subscribe_new_bids(&self, auction: &AuctionId, callback: BidCallback) {
        self.bid_subs
            .lock()
            .expect("store lock")
            .entry(auction.clone())
            .or_default()
            .push(callback);
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
