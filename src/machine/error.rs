//! Rejection types for machine operations.
//!
//! A rejection is a reported outcome: the machine keeps its state and
//! balance and carries on with the next command.

use thiserror::Error;

use crate::Amount;
use crate::model::ProductId;

/// Top-level error returned by [`VendingMachine::apply`](super::VendingMachine::apply).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum MachineError {
    #[error("coin rejected: {0}")]
    Coin(#[from] CoinError),

    #[error("selection rejected: {0}")]
    Selection(#[from] SelectionError),

    #[error("dispense rejected: {0}")]
    Dispense(#[from] DispenseError),

    #[error("refund rejected: {0}")]
    Refund(#[from] RefundError),
}

/// Rejection of an inserted coin.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CoinError {
    #[error("invalid coin amount {0}")]
    InvalidAmount(Amount),
    #[error("coin {0} would overflow the balance")]
    Overflow(Amount),
    #[error("please wait, dispensing product")]
    Busy,
}

/// Rejection of a product selection.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SelectionError {
    #[error("please insert coin first")]
    NoCoin,
    #[error("product {0} not found")]
    ProductNotFound(ProductId),
    #[error("insufficient funds for {product}: price {price}, balance {balance}, need {remainder} more")]
    InsufficientFunds {
        product: ProductId,
        price: Amount,
        balance: Amount,
        remainder: Amount,
    },
    #[error("please wait, dispensing product")]
    Busy,
}

/// Rejection of a dispense request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispenseError {
    #[error("please insert coin first")]
    NoCoin,
    #[error("please select a product first")]
    NoSelection,
}

/// Rejection of a refund request.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RefundError {
    #[error("no coins to refund")]
    NothingToRefund,
    #[error("cannot refund while dispensing")]
    Dispensing,
}
