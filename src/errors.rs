// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Error Taxonomy

use rust_decimal::Decimal;

use crate::types::{AuctionId, UserId};

// ─── CommandError ────────────────────────────────────────────────────────────

/// Recoverable business failures, surfaced to the caller as typed
/// results and shown to players as messages. A rejected command never
/// mutates wallet or auction state.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CommandError {
    #[error("bid rejected -- auction is not accepting bids")]
    InvalidBid,

    #[error("auction {0} has already ended")]
    AuctionEnded(AuctionId),

    #[error("auction {0} not found")]
    AuctionNotFound(AuctionId),

    #[error("user {0} not found")]
    UserNotFound(UserId),

    #[error("user {0} has no bid credits left")]
    InsufficientCredits(UserId),

    #[error("user {user} cannot cover {required}")]
    InsufficientFunds { user: UserId, required: Decimal },

    #[error("bonus already collected this countdown cycle")]
    BonusAlreadyCollected,

    #[error("bonus collection is reserved for human players")]
    BonusNotForBots,
}

// ─── ConfigError ─────────────────────────────────────────────────────────────

/// Construction-time invariant violations. These abort auction
/// construction; they are never produced by a running auction.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("bid increment must be positive, got {0}")]
    NonPositiveIncrement(Decimal),

    #[error("bid cost must be positive, got {0}")]
    NonPositiveBidCost(Decimal),

    #[error("countdown must be at least one second")]
    ZeroCountdown,

    #[error("rate must lie in [0, 1], got {0}")]
    RateOutOfRange(Decimal),
}
