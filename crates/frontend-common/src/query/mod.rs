//! Cached server queries

pub mod balance;

pub use balance::{BalanceQuery, BalanceState};
