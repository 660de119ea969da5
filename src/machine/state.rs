//! The closed set of machine states and their per-operation behavior.
//!
//! Each operation is total over [`MachineState`]: every variant either
//! produces a [`Step`] or a rejection. A step may request a transition,
//! which the machine applies after the call returns.

use std::fmt;

use tracing::warn;

use super::error::{CoinError, DispenseError, RefundError, SelectionError};
use super::till::Till;
use crate::Amount;
use crate::catalog::Catalog;
use crate::model::{Outcome, Product};

/// The active state of the machine.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum MachineState {
    /// Waiting for money.
    #[default]
    NoCoin,
    /// Holding a positive balance, waiting for a selection.
    HasCoin,
    /// Product captured at selection time, waiting to be handed out.
    Dispensing(Product),
}

/// Result of a successful operation, with the transition it requests.
#[derive(Debug)]
pub(crate) struct Step {
    pub outcome: Outcome,
    pub next: Option<MachineState>,
}

impl Step {
    fn stay(outcome: Outcome) -> Self {
        Self {
            outcome,
            next: None,
        }
    }

    fn to(outcome: Outcome, next: MachineState) -> Self {
        Self {
            outcome,
            next: Some(next),
        }
    }
}

impl MachineState {
    /// Variant name, without payload.
    pub fn name(&self) -> &'static str {
        match self {
            MachineState::NoCoin => "NoCoin",
            MachineState::HasCoin => "HasCoin",
            MachineState::Dispensing(_) => "Dispensing",
        }
    }

    /// `amount` has already been checked to be positive.
    pub(crate) fn insert_coin(&self, till: &mut Till, amount: Amount) -> Result<Step, CoinError> {
        match self {
            MachineState::NoCoin => {
                let balance = till.credit(amount).ok_or(CoinError::Overflow(amount))?;
                let outcome = Outcome::CoinInserted { amount, balance };
                Ok(Step::to(outcome, MachineState::HasCoin))
            }
            MachineState::HasCoin => {
                let balance = till.credit(amount).ok_or(CoinError::Overflow(amount))?;
                Ok(Step::stay(Outcome::CoinInserted { amount, balance }))
            }
            MachineState::Dispensing(_) => Err(CoinError::Busy),
        }
    }

    pub(crate) fn select_product(
        &self,
        till: &Till,
        catalog: &Catalog,
        id: &str,
    ) -> Result<Step, SelectionError> {
        match self {
            MachineState::NoCoin => Err(SelectionError::NoCoin),
            MachineState::HasCoin => {
                let product = catalog
                    .get(id)
                    .ok_or_else(|| SelectionError::ProductNotFound(id.to_string()))?;

                let balance = till.balance();
                if balance < product.price {
                    return Err(SelectionError::InsufficientFunds {
                        product: product.id.clone(),
                        price: product.price,
                        balance,
                        remainder: product.price - balance,
                    });
                }

                let outcome = Outcome::ProductSelected {
                    product: product.clone(),
                };
                Ok(Step::to(outcome, MachineState::Dispensing(product.clone())))
            }
            MachineState::Dispensing(_) => Err(SelectionError::Busy),
        }
    }

    pub(crate) fn dispense(&self, till: &mut Till) -> Result<Step, DispenseError> {
        match self {
            MachineState::NoCoin => Err(DispenseError::NoCoin),
            MachineState::HasCoin => Err(DispenseError::NoSelection),
            MachineState::Dispensing(product) => {
                let balance = till.reset();
                let mut change = balance - product.price;
                // Dispensing is only entered with balance >= price
                if change < Amount::ZERO {
                    warn!(
                        product = %product.id,
                        balance = %balance,
                        price = %product.price,
                        "balance below price while dispensing"
                    );
                    change = Amount::ZERO;
                }
                let outcome = Outcome::Dispensed {
                    product: product.clone(),
                    change,
                };
                Ok(Step::to(outcome, MachineState::NoCoin))
            }
        }
    }

    pub(crate) fn refund(&self, till: &mut Till) -> Result<Step, RefundError> {
        match self {
            MachineState::NoCoin => Err(RefundError::NothingToRefund),
            MachineState::HasCoin => {
                let amount = till.reset();
                Ok(Step::to(Outcome::Refunded { amount }, MachineState::NoCoin))
            }
            MachineState::Dispensing(_) => Err(RefundError::Dispensing),
        }
    }
}

impl fmt::Display for MachineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MachineState::Dispensing(product) => write!(f, "Dispensing({})", product.name),
            other => f.write_str(other.name()),
        }
    }
}
