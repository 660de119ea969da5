//! Core domain types for the vending machine.

use std::fmt;

use crate::Amount;

/// Product identifier, e.g. the `A1` slot code.
pub type ProductId = String;

/// An item offered by the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub price: Amount,
}

impl Product {
    pub fn new(id: impl Into<ProductId>, name: impl Into<String>, price: Amount) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            price,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {} - ${}", self.id, self.name, self.price)
    }
}

/// A command representing the possible inputs of the machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Add money to the balance.
    InsertCoin { amount: Amount },
    /// Pick a product by id; moves to dispensing if the balance covers it.
    SelectProduct { product: ProductId },
    /// Hand out the selected product and return change.
    Dispense,
    /// Return the whole balance.
    Refund,
}

impl Command {
    /// Short name used in logs and transcripts.
    pub fn kind(&self) -> &'static str {
        match self {
            Command::InsertCoin { .. } => "insert_coin",
            Command::SelectProduct { .. } => "select_product",
            Command::Dispense => "dispense",
            Command::Refund => "refund",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::InsertCoin { amount } => write!(f, "insert_coin {amount}"),
            Command::SelectProduct { product } => write!(f, "select_product {product}"),
            Command::Dispense | Command::Refund => f.write_str(self.kind()),
        }
    }
}

/// The successful result of an operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Coin credited; `balance` is the total after crediting.
    CoinInserted { amount: Amount, balance: Amount },
    /// Product captured for dispensing.
    ProductSelected { product: Product },
    /// Product handed out; `change` is zero when the balance was exact.
    Dispensed { product: Product, change: Amount },
    /// Whole balance returned.
    Refunded { amount: Amount },
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Outcome::CoinInserted { amount, balance } => {
                write!(f, "coin inserted: ${amount} (balance ${balance})")
            }
            Outcome::ProductSelected { product } => {
                write!(f, "selected {} - ${}", product.name, product.price)
            }
            Outcome::Dispensed { product, change } if change.is_positive() => {
                write!(f, "dispensing {}; returning change: ${change}", product.name)
            }
            Outcome::Dispensed { product, .. } => write!(f, "dispensing {}", product.name),
            Outcome::Refunded { amount } => write!(f, "refunded: ${amount}"),
        }
    }
}
