// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Game Host

//! The hosting process for a set of concurrent auctions.
//!
//! The host owns the wallet registry (one lock), one engine per auction
//! (one lock per auction id -- the single-writer boundary every mutating
//! command funnels through), and the shared jackpot (its own lock).
//! Lock order is fixed: engine, then wallets, then rng; the jackpot is
//! only ever taken transiently below all of them, and store callbacks
//! run with no lock held at all.
//!
//! Presentation talks to the host exclusively through the command
//! methods here and the snapshots/subscriptions of the injected store.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use rust_decimal_macros::dec;

use crate::clock::{Ticker, TickerHandle};
use crate::engine::{Auction, AuctionEngine};
use crate::errors::{CommandError, ConfigError};
use crate::jackpot::SharedJackpot;
use crate::params::AuctionParams;
use crate::rivals::RivalScheduler;
use crate::store::GameStore;
use crate::types::{AuctionId, AuctionSnapshot, Lari, User, UserId};
use crate::wallet::WalletRegistry;

// ─── GameHost ────────────────────────────────────────────────────────────────

pub struct GameHost {
    wallets: Mutex<WalletRegistry>,
    engines: Mutex<HashMap<AuctionId, Arc<Mutex<AuctionEngine>>>>,
    history: Mutex<Vec<Auction>>,
    jackpot: SharedJackpot,
    store: Arc<dyn GameStore>,
    rng: Mutex<ChaCha8Rng>,
    next_auction_seq: AtomicU64,
    credit_price: Lari,
}

impl GameHost {
    pub fn new(store: Arc<dyn GameStore>) -> Self {
        Self::with_seed(store, rand::random::<u64>())
    }

    /// Deterministic host: every stochastic draw (prize rewards, jackpot
    /// trigger) derives from `seed`.
    pub fn with_seed(store: Arc<dyn GameStore>, seed: u64) -> Self {
        Self {
            wallets: Mutex::new(WalletRegistry::new()),
            engines: Mutex::new(HashMap::new()),
            history: Mutex::new(Vec::new()),
            jackpot: SharedJackpot::default(),
            store,
            rng: Mutex::new(ChaCha8Rng::seed_from_u64(seed)),
            next_auction_seq: AtomicU64::new(0),
            credit_price: Lari(dec!(0.60)),
        }
    }

    // ─── Registration ────────────────────────────────────────────────────

    pub fn register_player(&self, username: &str) -> UserId {
        let mut wallets = self.lock_wallets();
        let id = wallets.register(username);
        let row = wallets.fetch(&id).expect("just registered").clone();
        drop(wallets);
        self.store.save_user(&row);
        id
    }

    pub fn register_rival(&self, username: &str, credits: u32) -> UserId {
        let mut wallets = self.lock_wallets();
        let id = wallets.register_rival(username, credits);
        let row = wallets.fetch(&id).expect("just registered").clone();
        drop(wallets);
        self.store.save_user(&row);
        id
    }

    // ─── Commands ────────────────────────────────────────────────────────

    /// Open a new auction, immediately active. Malformed parameters
    /// abort here; nothing is registered.
    pub fn create_auction(
        &self,
        title: &str,
        description: &str,
        params: AuctionParams,
    ) -> Result<AuctionId, ConfigError> {
        let seq = self.next_auction_seq.fetch_add(1, Ordering::SeqCst) + 1;
        let id = AuctionId(format!("a-{}", seq));
        let mut engine = AuctionEngine::new(id.clone(), title, description, params)?;
        engine.open();
        let snapshot = engine.snapshot();
        self.lock_engines()
            .insert(id.clone(), Arc::new(Mutex::new(engine)));
        self.store.save_auction(&snapshot);
        Ok(id)
    }

    pub fn place_bid(
        &self,
        auction: &AuctionId,
        user: &UserId,
    ) -> Result<AuctionSnapshot, CommandError> {
        let engine = self.engine(auction)?;
        let mut engine = engine.lock().expect("engine lock poisoned");
        let mut wallets = self.lock_wallets();
        let snapshot = engine.place_bid(&mut wallets, &self.jackpot, user)?;
        let accepted = engine.auction().bids.leader().cloned();
        let row = wallets.fetch(user)?.clone();
        drop(wallets);
        drop(engine);

        if let Some(bid) = accepted {
            self.store.append_bid(&bid);
        }
        self.store.save_user(&row);
        self.store.save_auction(&snapshot);
        Ok(snapshot)
    }

    /// Deliver one countdown second to an auction. Expiry settles the
    /// auction and archives it; ticking an ended auction is a no-op.
    pub fn tick(&self, auction: &AuctionId) -> Result<AuctionSnapshot, CommandError> {
        let engine = self.engine(auction)?;
        let mut engine = engine.lock().expect("engine lock poisoned");
        let was_active = engine.phase().is_active();
        let mut wallets = self.lock_wallets();
        let snapshot = {
            let mut rng = self.rng.lock().expect("rng lock poisoned");
            engine.tick(&mut wallets, &self.jackpot, &mut *rng)
        };

        let ended_now = was_active && snapshot.phase.is_terminal();
        let archived = ended_now.then(|| engine.auction().clone());
        let payees: Vec<User> = match (&snapshot.results, ended_now) {
            (Some(results), true) => {
                let mut ids = vec![results.winner.user.clone()];
                ids.extend(results.second.iter().map(|p| p.user.clone()));
                ids.extend(results.third.iter().map(|p| p.user.clone()));
                ids.extend(results.random_rewards.iter().map(|p| p.user.clone()));
                ids.iter()
                    .filter_map(|id| wallets.fetch(id).ok().cloned())
                    .collect()
            }
            _ => Vec::new(),
        };
        drop(wallets);
        drop(engine);

        if let Some(auction) = archived {
            self.history.lock().expect("history lock poisoned").push(auction);
        }
        for row in &payees {
            self.store.save_user(row);
        }
        self.store.save_auction(&snapshot);
        Ok(snapshot)
    }

    /// Buy bid credits at the house price. Atomic: a failed purchase
    /// changes neither balance nor credits.
    pub fn buy_credits(&self, user: &UserId, quantity: u32) -> Result<u32, CommandError> {
        let mut wallets = self.lock_wallets();
        let credits = wallets.purchase_credits(user, quantity, self.credit_price)?;
        let row = wallets.fetch(user)?.clone();
        drop(wallets);
        self.store.save_user(&row);
        Ok(credits)
    }

    pub fn collect_bonus(&self, auction: &AuctionId, user: &UserId) -> Result<u32, CommandError> {
        let engine = self.engine(auction)?;
        let mut engine = engine.lock().expect("engine lock poisoned");
        let mut wallets = self.lock_wallets();
        let credits = engine.collect_bonus(&mut wallets, user)?;
        let row = wallets.fetch(user)?.clone();
        drop(wallets);
        drop(engine);
        self.store.save_user(&row);
        Ok(credits)
    }

    /// Drain the global jackpot into `user`'s balance.
    pub fn claim_jackpot(&self, user: &UserId) -> Result<Lari, CommandError> {
        let mut wallets = self.lock_wallets();
        wallets.fetch(user)?;
        let amount = self.jackpot.claim();
        wallets.award_prize(user, amount)?;
        let row = wallets.fetch(user)?.clone();
        drop(wallets);
        self.store.save_user(&row);
        Ok(amount)
    }

    // ─── Reads ───────────────────────────────────────────────────────────

    pub fn snapshot(&self, auction: &AuctionId) -> Result<AuctionSnapshot, CommandError> {
        let engine = self.engine(auction)?;
        let engine = engine.lock().expect("engine lock poisoned");
        Ok(engine.snapshot())
    }

    pub fn user(&self, id: &UserId) -> Result<User, CommandError> {
        Ok(self.lock_wallets().fetch(id)?.clone())
    }

    pub fn leaderboard(&self) -> Vec<User> {
        self.lock_wallets().leaderboard()
    }

    /// Ended auctions, oldest first.
    pub fn history(&self) -> Vec<Auction> {
        self.history.lock().expect("history lock poisoned").clone()
    }

    pub fn jackpot_total(&self) -> Lari {
        self.jackpot.total()
    }

    // ─── Schedulers ──────────────────────────────────────────────────────

    /// Drive an auction with one tick per `period` until it ends. The
    /// returned handle cancels the loop; the loop also quits by itself
    /// once the auction is over, so no timer outlives settlement.
    pub fn start_ticker(self: &Arc<Self>, auction: &AuctionId, period: Duration) -> TickerHandle {
        let host = Arc::clone(self);
        let id = auction.clone();
        Ticker::spawn(period, move || {
            host.tick(&id)
                .map(|snapshot| !snapshot.phase.is_terminal())
                .unwrap_or(false)
        })
    }

    /// Let a roster of rival bidders snipe an auction until it ends.
    /// Each loop iteration sleeps the scheduler's randomized reaction
    /// delay, then maybe places one ordinary bid.
    pub fn spawn_rivals(
        self: &Arc<Self>,
        auction: &AuctionId,
        roster: Vec<UserId>,
        mut scheduler: RivalScheduler,
    ) -> TickerHandle {
        let stop = Arc::new(AtomicBool::new(false));
        let flag = stop.clone();
        let host = Arc::clone(self);
        let id = auction.clone();
        let thread = std::thread::spawn(move || loop {
            if flag.load(Ordering::SeqCst) {
                break;
            }
            std::thread::sleep(scheduler.next_delay());
            if flag.load(Ordering::SeqCst) {
                break;
            }
            let snapshot = match host.snapshot(&id) {
                Ok(s) => s,
                Err(_) => break,
            };
            if snapshot.phase.is_terminal() {
                break;
            }
            if let Some(rival) = scheduler.decide(&snapshot, &roster) {
                // Losing the race against expiry is an ordinary rejection.
                let _ = host.place_bid(&id, &rival);
            }
        });
        TickerHandle::from_parts(stop, thread)
    }

    // ─── Internals ───────────────────────────────────────────────────────

    fn engine(&self, id: &AuctionId) -> Result<Arc<Mutex<AuctionEngine>>, CommandError> {
        self.lock_engines()
            .get(id)
            .cloned()
            .ok_or_else(|| CommandError::AuctionNotFound(id.clone()))
    }

    fn lock_wallets(&self) -> std::sync::MutexGuard<'_, WalletRegistry> {
        self.wallets.lock().expect("wallet lock poisoned")
    }

    fn lock_engines(
        &self,
    ) -> std::sync::MutexGuard<'_, HashMap<AuctionId, Arc<Mutex<AuctionEngine>>>> {
        self.engines.lock().expect("engine map lock poisoned")
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryStore;
    use rust_decimal_macros::dec;

    fn host() -> Arc<GameHost> {
        Arc::new(GameHost::with_seed(Arc::new(InMemoryStore::new()), 7))
    }

    #[test]
    fn create_and_snapshot() {
        let host = host();
        let id = host
            .create_auction("Samsung Galaxy S25 Ultra", "Flagship", AuctionParams::default())
            .unwrap();
        let snapshot = host.snapshot(&id).unwrap();
        assert!(snapshot.phase.is_active());
        assert_eq!(snapshot.time_left, 10);
        assert_eq!(snapshot.current_price, Lari(dec!(0.01)));
    }

    #[test]
    fn unknown_auction_reported() {
        let host = host();
        let ghost = AuctionId::from("a-404");
        assert!(matches!(
            host.place_bid(&ghost, &UserId::from("u-1")),
            Err(CommandError::AuctionNotFound(_))
        ));
        assert!(matches!(
            host.tick(&ghost),
            Err(CommandError::AuctionNotFound(_))
        ));
    }

    #[test]
    fn bad_params_create_nothing() {
        let host = host();
        let err = host.create_auction(
            "broken",
            "",
            AuctionParams {
                increment: Lari(dec!(-1)),
                ..AuctionParams::default()
            },
        );
        assert!(err.is_err());
        assert!(host.history().is_empty());
    }

    #[test]
    fn buy_credits_then_bid() {
        let host = host();
        let id = host
            .create_auction("item", "", AuctionParams::default())
            .unwrap();
        let player = host.register_player("vako12"); // balance 10.00
        let credits = host.buy_credits(&player, 16).unwrap(); // 9.60
        assert_eq!(credits, 16);
        assert_eq!(host.user(&player).unwrap().balance, Lari(dec!(0.40)));

        let snapshot = host.place_bid(&id, &player).unwrap();
        assert_eq!(snapshot.bid_count, 1);
        assert_eq!(host.user(&player).unwrap().credits, 15);
    }

    #[test]
    fn expiry_archives_auction() {
        let host = host();
        let id = host
            .create_auction("item", "", AuctionParams::default())
            .unwrap();
        let rival = host.register_rival("nika23", 10);
        host.place_bid(&id, &rival).unwrap();
        for _ in 0..10 {
            host.tick(&id).unwrap();
        }
        let snapshot = host.snapshot(&id).unwrap();
        assert!(snapshot.phase.is_terminal());

        let history = host.history();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, id);
        assert!(history[0].final_results.is_some());

        // Repeated ticks after the end archive nothing further
        host.tick(&id).unwrap();
        assert_eq!(host.history().len(), 1);
    }

    #[test]
    fn claim_jackpot_credits_user_and_resets_pool() {
        let host = host();
        let id = host
            .create_auction("item", "", AuctionParams::default())
            .unwrap();
        let rival = host.register_rival("data77", 10);
        for _ in 0..5 {
            host.place_bid(&id, &rival).unwrap();
        }
        let pot = host.jackpot_total();
        assert!(!pot.is_zero());

        let player = host.register_player("vako12");
        let claimed = host.claim_jackpot(&player).unwrap();
        assert_eq!(claimed, pot);
        assert!(host.jackpot_total().is_zero());
        let user = host.user(&player).unwrap();
        assert_eq!(user.balance, Lari(dec!(10.00)) + pot);
        assert_eq!(user.total_winnings, pot);
    }

    #[test]
    fn store_mirrors_accepted_commands() {
        let store = Arc::new(InMemoryStore::new());
        let host = Arc::new(GameHost::with_seed(store.clone(), 7));
        let id = host
            .create_auction("item", "", AuctionParams::default())
            .unwrap();
        let rival = host.register_rival("mari_ge", 5);

        use crate::store::GameStore;
        host.place_bid(&id, &rival).unwrap();
        host.place_bid(&id, &rival).unwrap();

        let bids = store.fetch_bids(&id);
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0].amount, Lari(dec!(0.03))); // most recent first
        let persisted = store.fetch_auction(&id).unwrap();
        assert_eq!(persisted.bid_count, 2);
        let user_row = store.fetch_user(&rival).unwrap();
        assert_eq!(user_row.credits, 3);
    }
}
