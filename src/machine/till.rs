use crate::Amount;

/// The money currently held for the customer.
///
/// Only state-variant logic may credit or reset it.
#[derive(Debug, Default)]
pub struct Till {
    balance: Amount,
}

impl Till {
    pub fn balance(&self) -> Amount {
        self.balance
    }

    /// Add to the balance, returning the new total. `None` on overflow,
    /// leaving the balance untouched.
    pub(crate) fn credit(&mut self, amount: Amount) -> Option<Amount> {
        self.balance = self.balance.checked_add(amount)?;
        Some(self.balance)
    }

    /// Empty the till, returning what it held.
    pub(crate) fn reset(&mut self) -> Amount {
        std::mem::take(&mut self.balance)
    }
}
