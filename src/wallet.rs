// Copyright 2026 Hypermesh Foundation. All rights reserved.
// Penny Auction Suite ("The Pit") - Credit Wallets

//! Per-user currency and bid-credit accounting.
//!
//! One registry instance per hosting process, injected wherever wallet
//! access is needed; there is no ambient global store. Every mutation is check-then-apply under the
//! registry's exclusive borrow, so a rejected operation leaves balances
//! untouched and no composite operation is observable half-applied.

use std::collections::HashMap;

use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::errors::CommandError;
use crate::types::{Lari, User, UserId};

/// Currency balance granted to a fresh registration.
const STARTING_BALANCE: Lari = Lari(dec!(10.00));

// ─── WalletRegistry ──────────────────────────────────────────────────────────

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct WalletRegistry {
    users: HashMap<UserId, User>,
    next_seq: u64,
}

impl WalletRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a human player with the standard starting balance and no
    /// credits (credits are purchased separately).
    pub fn register(&mut self, username: &str) -> UserId {
        self.insert(username, STARTING_BALANCE, 0, false)
    }

    /// Register a rival (synthetic) bidder pre-funded with credits so it
    /// can participate through the ordinary bid path.
    pub fn register_rival(&mut self, username: &str, credits: u32) -> UserId {
        self.insert(username, Lari::zero(), credits, true)
    }

    fn insert(&mut self, username: &str, balance: Lari, credits: u32, is_bot: bool) -> UserId {
        self.next_seq += 1;
        let id = UserId(format!("u-{}", self.next_seq));
        self.users.insert(
            id.clone(),
            User {
                id: id.clone(),
                username: username.to_string(),
                balance,
                credits,
                total_winnings: Lari::zero(),
                auctions_won: 0,
                total_bids: 0,
                is_bot,
            },
        );
        id
    }

    pub fn fetch(&self, id: &UserId) -> Result<&User, CommandError> {
        self.users
            .get(id)
            .ok_or_else(|| CommandError::UserNotFound(id.clone()))
    }

    fn fetch_mut(&mut self, id: &UserId) -> Result<&mut User, CommandError> {
        self.users
            .get_mut(id)
            .ok_or_else(|| CommandError::UserNotFound(id.clone()))
    }

    /// Consume one bid credit and count the bid against the user's
    /// lifetime total. Fails without mutation when no credit is left.
    pub fn spend_bid_credit(&mut self, id: &UserId) -> Result<(), CommandError> {
        let user = self.fetch_mut(id)?;
        if user.credits == 0 {
            return Err(CommandError::InsufficientCredits(id.clone()));
        }
        user.credits -= 1;
        user.total_bids += 1;
        Ok(())
    }

    /// Debit currency. Fails without mutation when the balance cannot
    /// cover `amount`; the balance is never observably negative.
    pub fn debit_funds(&mut self, id: &UserId, amount: Lari) -> Result<(), CommandError> {
        let user = self.fetch_mut(id)?;
        match user.balance.checked_sub(amount) {
            Some(rest) => {
                user.balance = rest;
                Ok(())
            }
            None => Err(CommandError::InsufficientFunds {
                user: id.clone(),
                required: amount.0,
            }),
        }
    }

    /// Credit currency. Always succeeds for a known user.
    pub fn credit_funds(&mut self, id: &UserId, amount: Lari) -> Result<(), CommandError> {
        let user = self.fetch_mut(id)?;
        user.balance += amount;
        Ok(())
    }

    /// Composite purchase: debit `quantity * unit_price`, then credit
    /// `quantity` bid credits. Atomic -- a failed debit leaves the credit
    /// count untouched, and the credit grant cannot fail after the debit.
    pub fn purchase_credits(
        &mut self,
        id: &UserId,
        quantity: u32,
        unit_price: Lari,
    ) -> Result<u32, CommandError> {
        let cost = unit_price * u64::from(quantity);
        let user = self.fetch_mut(id)?;
        let rest = user
            .balance
            .checked_sub(cost)
            .ok_or(CommandError::InsufficientFunds {
                user: id.clone(),
                required: cost.0,
            })?;
        user.balance = rest;
        user.credits += quantity;
        Ok(user.credits)
    }

    /// Grant free bid credits (bonus collection path).
    pub fn grant_credits(&mut self, id: &UserId, quantity: u32) -> Result<u32, CommandError> {
        let user = self.fetch_mut(id)?;
        user.credits += quantity;
        Ok(user.credits)
    }

    /// Pay out a prize: balance and lifetime winnings both grow.
    pub fn award_prize(&mut self, id: &UserId, amount: Lari) -> Result<(), CommandError> {
        let user = self.fetch_mut(id)?;
        user.balance += amount;
        user.total_winnings += amount;
        Ok(())
    }

    /// Pay out the winner's prize and count the auction as won.
    pub fn award_win(&mut self, id: &UserId, amount: Lari) -> Result<(), CommandError> {
        self.award_prize(id, amount)?;
        let user = self.fetch_mut(id)?;
        user.auctions_won += 1;
        Ok(())
    }

    /// All users ordered by lifetime winnings, best first.
    pub fn leaderboard(&self) -> Vec<User> {
        let mut board: Vec<User> = self.users.values().cloned().collect();
        board.sort_by(|a, b| b.total_winnings.cmp(&a.total_winnings));
        board
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_grants_starting_balance() {
        let mut reg = WalletRegistry::new();
        let id = reg.register("vako12");
        let user = reg.fetch(&id).unwrap();
        assert_eq!(user.balance, Lari(dec!(10.00)));
        assert_eq!(user.credits, 0);
        assert!(!user.is_bot);
    }

    #[test]
    fn rival_registration_is_marked_bot() {
        let mut reg = WalletRegistry::new();
        let id = reg.register_rival("nika23", 100);
        let user = reg.fetch(&id).unwrap();
        assert!(user.is_bot);
        assert_eq!(user.credits, 100);
        assert!(user.balance.is_zero());
    }

    #[test]
    fn spend_credit_decrements_and_counts() {
        let mut reg = WalletRegistry::new();
        let id = reg.register_rival("data77", 2);
        reg.spend_bid_credit(&id).unwrap();
        let user = reg.fetch(&id).unwrap();
        assert_eq!(user.credits, 1);
        assert_eq!(user.total_bids, 1);
    }

    #[test]
    fn spend_credit_with_zero_credits_fails_clean() {
        let mut reg = WalletRegistry::new();
        let id = reg.register("mari_ge");
        let err = reg.spend_bid_credit(&id).expect_err("no credits");
        assert!(matches!(err, CommandError::InsufficientCredits(_)));
        let user = reg.fetch(&id).unwrap();
        assert_eq!(user.credits, 0);
        assert_eq!(user.total_bids, 0);
    }

    #[test]
    fn debit_never_goes_negative() {
        let mut reg = WalletRegistry::new();
        let id = reg.register("luka2024"); // 10.00
        let err = reg.debit_funds(&id, Lari(dec!(10.01))).expect_err("short");
        assert!(matches!(err, CommandError::InsufficientFunds { .. }));
        assert_eq!(reg.fetch(&id).unwrap().balance, Lari(dec!(10.00)));

        reg.debit_funds(&id, Lari(dec!(10.00))).unwrap();
        assert!(reg.fetch(&id).unwrap().balance.is_zero());
    }

    #[test]
    fn purchase_is_atomic() {
        let mut reg = WalletRegistry::new();
        let id = reg.register("ana_k"); // 10.00

        // 16 credits at 0.60 = 9.60, leaves 0.40
        let credits = reg.purchase_credits(&id, 16, Lari(dec!(0.60))).unwrap();
        assert_eq!(credits, 16);
        assert_eq!(reg.fetch(&id).unwrap().balance, Lari(dec!(0.40)));

        // One more credit costs 0.60 > 0.40: both fields unchanged
        let err = reg
            .purchase_credits(&id, 1, Lari(dec!(0.60)))
            .expect_err("cannot afford");
        assert!(matches!(err, CommandError::InsufficientFunds { .. }));
        let user = reg.fetch(&id).unwrap();
        assert_eq!(user.balance, Lari(dec!(0.40)));
        assert_eq!(user.credits, 16);
    }

    #[test]
    fn award_win_updates_all_counters() {
        let mut reg = WalletRegistry::new();
        let id = reg.register("saba99");
        reg.award_win(&id, Lari(dec!(7.168))).unwrap();
        let user = reg.fetch(&id).unwrap();
        assert_eq!(user.balance, Lari(dec!(17.168)));
        assert_eq!(user.total_winnings, Lari(dec!(7.168)));
        assert_eq!(user.auctions_won, 1);
    }

    #[test]
    fn leaderboard_sorted_by_winnings() {
        let mut reg = WalletRegistry::new();
        let a = reg.register("first");
        let b = reg.register("second");
        let c = reg.register("third");
        reg.award_prize(&b, Lari(dec!(50))).unwrap();
        reg.award_prize(&a, Lari(dec!(20))).unwrap();
        reg.award_prize(&c, Lari(dec!(80))).unwrap();

        let board = reg.leaderboard();
        let names: Vec<&str> = board.iter().map(|u| u.username.as_str()).collect();
        assert_eq!(names, vec!["third", "second", "first"]);
    }

    #[test]
    fn unknown_user_is_reported() {
        let mut reg = WalletRegistry::new();
        let ghost = UserId::from("u-404");
        assert!(matches!(
            reg.spend_bid_credit(&ghost),
            Err(CommandError::UserNotFound(_))
        ));
        assert!(matches!(
            reg.fetch(&ghost),
            Err(CommandError::UserNotFound(_))
        ));
    }
}
