// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit")

pub mod types;
pub mod params;
pub mod errors;
pub mod ledger;
pub mod wallet;
pub mod jackpot;
pub mod prize;
pub mod engine;
pub mod rivals;
pub mod store;
pub mod clock;
pub mod host;

pub use engine::{Auction, AuctionEngine};
pub use errors::{CommandError, ConfigError};
pub use host::GameHost;
pub use jackpot::{JackpotAccumulator, SharedJackpot};
pub use ledger::BidLedger;
pub use params::AuctionParams;
pub use prize::PrizeCalculator;
pub use store::{GameStore, InMemoryStore};
pub use types::*;
pub use wallet::WalletRegistry;
