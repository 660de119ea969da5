//! Vending machine context.
//!
//! The machine owns the balance, the active state and the catalog. Every
//! operation, whether called directly or fed in through [`VendingMachine::run`]
//! from a command stream, is delegated to the active [`MachineState`], which
//! may request a transition; rejections leave state and balance untouched.

use tokio_stream::{Stream, StreamExt};
use tracing::{debug, info};

use crate::Amount;
use crate::catalog::Catalog;
use crate::model::{Command, Outcome, Product};

mod state;
pub use state::MachineState;
use state::Step;

mod till;
pub use till::Till;

mod error;
pub use error::{CoinError, DispenseError, MachineError, RefundError, SelectionError};

/// One processed command, with the machine's balance and state afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub command: Command,
    pub result: Result<Outcome, MachineError>,
    pub balance: Amount,
    pub state: MachineState,
}

/// The vending machine.
#[derive(Debug, Default)]
pub struct VendingMachine {
    state: MachineState,
    till: Till,
    catalog: Catalog,
}

/// Public API
impl VendingMachine {
    /// A machine stocked with the default catalog.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_catalog(catalog: Catalog) -> Self {
        Self {
            state: MachineState::NoCoin,
            till: Till::default(),
            catalog,
        }
    }

    pub fn state(&self) -> &MachineState {
        &self.state
    }

    pub fn balance(&self) -> Amount {
        self.till.balance()
    }

    /// Enumerate available products in id order.
    pub fn products(&self) -> impl Iterator<Item = &Product> + '_ {
        self.catalog.products()
    }

    pub fn insert_coin(&mut self, amount: Amount) -> Result<Outcome, CoinError> {
        if !amount.is_positive() {
            return Err(CoinError::InvalidAmount(amount));
        }
        let step = self.state.insert_coin(&mut self.till, amount)?;
        Ok(self.commit(step))
    }

    pub fn select_product(&mut self, id: &str) -> Result<Outcome, SelectionError> {
        let step = self.state.select_product(&self.till, &self.catalog, id)?;
        Ok(self.commit(step))
    }

    pub fn dispense(&mut self) -> Result<Outcome, DispenseError> {
        let step = self.state.dispense(&mut self.till)?;
        Ok(self.commit(step))
    }

    pub fn refund(&mut self) -> Result<Outcome, RefundError> {
        let step = self.state.refund(&mut self.till)?;
        Ok(self.commit(step))
    }

    /// Apply a single command on top of the current machine state
    pub fn apply(&mut self, command: &Command) -> Result<Outcome, MachineError> {
        let result = match command {
            Command::InsertCoin { amount } => self.insert_coin(*amount).map_err(Into::into),
            Command::SelectProduct { product } => {
                self.select_product(product).map_err(Into::into)
            }
            Command::Dispense => self.dispense().map_err(Into::into),
            Command::Refund => self.refund().map_err(Into::into),
        };
        self.log_result(command, &result);
        result
    }

    /// Run the machine over the given command stream, returning the transcript.
    pub async fn run(&mut self, mut stream: impl Stream<Item = Command> + Unpin) -> Vec<Entry> {
        let mut transcript = Vec::new();
        while let Some(command) = stream.next().await {
            // a rejection never stops the machine
            let result = self.apply(&command);
            transcript.push(Entry {
                command,
                result,
                balance: self.balance(),
                state: self.state.clone(),
            });
        }
        transcript
    }
}

/// Private API
impl VendingMachine {
    /// Apply the transition requested by a step, if any.
    fn commit(&mut self, step: Step) -> Outcome {
        if let Some(next) = step.next {
            self.set_state(next);
        }
        step.outcome
    }

    /// Replace the active state. No legality check: transitions only come
    /// from the active variant's own logic.
    fn set_state(&mut self, next: MachineState) {
        debug!(from = %self.state, to = %next, "state transition");
        self.state = next;
    }

    fn log_result(&self, command: &Command, result: &Result<Outcome, MachineError>) {
        let kind = command.kind();
        match result {
            Ok(outcome) => {
                info!(
                    command = %command,
                    balance = %self.balance(),
                    state = %self.state,
                    outcome = %outcome,
                    "{kind} applied"
                );
            }
            Err(e) => {
                info!(
                    command = %command,
                    balance = %self.balance(),
                    state = %self.state,
                    reason = %e,
                    "{kind} rejected"
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // test utils

    fn dollars(cents: i64) -> Amount {
        Amount::from_cents(cents)
    }

    fn insert(cents: i64) -> Command {
        Command::InsertCoin {
            amount: dollars(cents),
        }
    }

    fn select(id: &str) -> Command {
        Command::SelectProduct {
            product: id.to_string(),
        }
    }

    fn cola() -> Product {
        Catalog::default().get("A1").unwrap().clone()
    }

    fn assert_idle(machine: &VendingMachine) {
        assert_eq!(machine.balance(), Amount::ZERO);
        assert_eq!(machine.state(), &MachineState::NoCoin);
    }

    #[test]
    fn new_machine() {
        let machine = VendingMachine::new();
        assert_idle(&machine);
        assert_eq!(machine.products().count(), 3);
    }

    #[test]
    fn products_are_listed_in_id_order() {
        let machine = VendingMachine::new();
        let ids: Vec<_> = machine.products().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["A1", "A2", "A3"]);
    }

    // Scenario 1

    #[test]
    fn select_without_coin_is_rejected() {
        let mut machine = VendingMachine::new();
        let result = machine.select_product("A1");
        assert_eq!(result, Err(SelectionError::NoCoin));
        assert_idle(&machine);
    }

    // Scenario 2

    #[test]
    fn select_with_insufficient_funds_reports_remainder() {
        let mut machine = VendingMachine::new();
        machine.insert_coin(dollars(100)).unwrap();
        assert_eq!(machine.state(), &MachineState::HasCoin);
        assert_eq!(machine.balance(), dollars(100));

        let result = machine.select_product("A1");
        assert_eq!(
            result,
            Err(SelectionError::InsufficientFunds {
                product: "A1".to_string(),
                price: dollars(150),
                balance: dollars(100),
                remainder: dollars(50),
            })
        );

        // State unchanged
        assert_eq!(machine.state(), &MachineState::HasCoin);
        assert_eq!(machine.balance(), dollars(100));
    }

    // Scenario 3

    #[test]
    fn purchase_with_change() {
        let mut machine = VendingMachine::new();
        machine.insert_coin(dollars(100)).unwrap();
        machine.select_product("A1").unwrap_err();
        machine.insert_coin(dollars(100)).unwrap();
        assert_eq!(machine.balance(), dollars(200));

        let selected = machine.select_product("A1").unwrap();
        assert_eq!(selected, Outcome::ProductSelected { product: cola() });
        assert_eq!(machine.state(), &MachineState::Dispensing(cola()));

        let dispensed = machine.dispense().unwrap();
        assert_eq!(
            dispensed,
            Outcome::Dispensed {
                product: cola(),
                change: dollars(50),
            }
        );
        assert_idle(&machine);
    }

    // Scenario 4

    #[test]
    fn refund_returns_whole_balance() {
        let mut machine = VendingMachine::new();
        machine.insert_coin(dollars(200)).unwrap();

        let refunded = machine.refund().unwrap();
        assert_eq!(refunded, Outcome::Refunded { amount: dollars(200) });
        assert_idle(&machine);
    }

    // Scenario 5

    #[test]
    fn select_unknown_product_is_rejected() {
        let mut machine = VendingMachine::new();
        machine.insert_coin(dollars(200)).unwrap();

        let result = machine.select_product("Z9");
        assert_eq!(result, Err(SelectionError::ProductNotFound("Z9".to_string())));
        assert_eq!(machine.state(), &MachineState::HasCoin);
        assert_eq!(machine.balance(), dollars(200));
    }

    // Scenario 6

    #[test]
    fn refund_while_dispensing_is_rejected() {
        let mut machine = VendingMachine::new();
        machine.insert_coin(dollars(200)).unwrap();
        machine.select_product("A1").unwrap();

        let result = machine.refund();
        assert_eq!(result, Err(RefundError::Dispensing));
        assert_eq!(machine.state(), &MachineState::Dispensing(cola()));
        assert_eq!(machine.balance(), dollars(200));
    }

    // Coins

    #[test]
    fn repeated_coins_accumulate_without_transition() {
        let mut machine = VendingMachine::new();
        machine.insert_coin(dollars(25)).unwrap();
        for _ in 0..3 {
            machine.insert_coin(dollars(25)).unwrap();
            assert_eq!(machine.state(), &MachineState::HasCoin);
        }
        assert_eq!(machine.balance(), dollars(100));
    }

    #[test]
    fn non_positive_coin_is_rejected_in_every_state() {
        let mut machine = VendingMachine::new();
        assert_eq!(
            machine.insert_coin(Amount::ZERO),
            Err(CoinError::InvalidAmount(Amount::ZERO))
        );
        assert_idle(&machine);

        machine.insert_coin(dollars(100)).unwrap();
        assert_eq!(
            machine.insert_coin(dollars(-50)),
            Err(CoinError::InvalidAmount(dollars(-50)))
        );
        assert_eq!(machine.balance(), dollars(100));
        assert_eq!(machine.state(), &MachineState::HasCoin);
    }

    #[test]
    fn coin_overflowing_balance_is_rejected() {
        let mut machine = VendingMachine::new();
        let huge = Amount::from_cents(i64::MAX - 50);
        machine.insert_coin(huge).unwrap();

        let result = machine.apply(&insert(100));
        assert_eq!(
            result,
            Err(MachineError::Coin(CoinError::Overflow(dollars(100))))
        );

        // State and balance unchanged, and still refundable
        assert_eq!(machine.state(), &MachineState::HasCoin);
        assert_eq!(machine.balance(), huge);
        assert!(machine.balance() >= Amount::ZERO);
        assert_eq!(machine.refund(), Ok(Outcome::Refunded { amount: huge }));
        assert_idle(&machine);
    }

    #[test]
    fn coin_while_dispensing_is_rejected() {
        let mut machine = VendingMachine::new();
        machine.insert_coin(dollars(100)).unwrap();
        machine.select_product("A2").unwrap();

        assert_eq!(machine.insert_coin(dollars(100)), Err(CoinError::Busy));
        assert_eq!(machine.balance(), dollars(100));
    }

    // Dispense

    #[test]
    fn dispense_before_selection_is_rejected() {
        let mut machine = VendingMachine::new();
        assert_eq!(machine.dispense(), Err(DispenseError::NoCoin));

        machine.insert_coin(dollars(100)).unwrap();
        assert_eq!(machine.dispense(), Err(DispenseError::NoSelection));
        assert_eq!(machine.state(), &MachineState::HasCoin);
    }

    #[test]
    fn refund_without_coin_is_rejected() {
        let mut machine = VendingMachine::new();
        assert_eq!(machine.refund(), Err(RefundError::NothingToRefund));
        assert_idle(&machine);
    }

    #[test]
    fn machine_runs_many_cycles() {
        let mut machine = VendingMachine::new();
        for _ in 0..5 {
            machine.insert_coin(dollars(100)).unwrap();
            machine.select_product("A3").unwrap();
            let outcome = machine.dispense().unwrap();
            assert!(matches!(
                outcome,
                Outcome::Dispensed { change, .. } if change == dollars(25)
            ));
            assert_idle(&machine);
        }
    }

    #[test]
    fn custom_catalog() {
        let catalog =
            Catalog::from_products([Product::new("B1", "Water", dollars(90))]).unwrap();
        let mut machine = VendingMachine::with_catalog(catalog);
        machine.insert_coin(dollars(100)).unwrap();

        assert!(matches!(
            machine.select_product("A1"),
            Err(SelectionError::ProductNotFound(_))
        ));
        machine.select_product("B1").unwrap();
        assert!(matches!(
            machine.dispense(),
            Ok(Outcome::Dispensed { change, .. }) if change == dollars(10)
        ));
    }

    // apply()

    #[test]
    fn apply_wraps_rejections() {
        let mut machine = VendingMachine::new();
        assert_eq!(
            machine.apply(&select("A1")),
            Err(MachineError::Selection(SelectionError::NoCoin))
        );
        assert_eq!(
            machine.apply(&Command::Refund),
            Err(MachineError::Refund(RefundError::NothingToRefund))
        );
        assert_eq!(
            machine.apply(&insert(0)),
            Err(MachineError::Coin(CoinError::InvalidAmount(Amount::ZERO)))
        );
        assert_eq!(
            machine.apply(&Command::Dispense),
            Err(MachineError::Dispense(DispenseError::NoCoin))
        );
    }

    #[test]
    fn rejection_messages() {
        let err = MachineError::from(SelectionError::InsufficientFunds {
            product: "A1".to_string(),
            price: dollars(150),
            balance: dollars(100),
            remainder: dollars(50),
        });
        assert_eq!(
            err.to_string(),
            "selection rejected: insufficient funds for A1: price 1.50, balance 1.00, need 0.50 more"
        );
        assert_eq!(
            MachineError::from(RefundError::Dispensing).to_string(),
            "refund rejected: cannot refund while dispensing"
        );
    }

    //  Async run()

    #[tokio::test]
    async fn run_processes_all_commands() {
        let mut machine = VendingMachine::new();
        let commands = vec![insert(100), insert(100), select("A1"), Command::Dispense];

        let transcript = machine.run(tokio_stream::iter(commands)).await;

        assert_eq!(transcript.len(), 4);
        assert_eq!(transcript[1].balance, dollars(200));
        assert_eq!(transcript[2].state, MachineState::Dispensing(cola()));
        assert_eq!(
            transcript[3].result,
            Ok(Outcome::Dispensed {
                product: cola(),
                change: dollars(50),
            })
        );
        assert_eq!(transcript[3].state, MachineState::NoCoin);
        assert_idle(&machine);
    }

    #[tokio::test]
    async fn run_skips_rejected_commands_and_continues() {
        let mut machine = VendingMachine::new();
        let commands = vec![
            select("A1"), // rejected: no coin
            insert(200),
            select("Z9"), // rejected: not found
            Command::Refund,
        ];

        let transcript = machine.run(tokio_stream::iter(commands)).await;

        assert!(transcript[0].result.is_err());
        assert!(transcript[2].result.is_err());
        assert_eq!(transcript[2].balance, dollars(200));
        assert_eq!(
            transcript[3].result,
            Ok(Outcome::Refunded { amount: dollars(200) })
        );
        assert_idle(&machine);
    }

    #[test]
    fn balance_never_negative_over_mixed_commands() {
        let mut machine = VendingMachine::new();
        let commands = [
            insert(-100),
            Command::Dispense,
            insert(50),
            select("A3"),
            insert(50),
            select("A3"),
            Command::Refund,
            insert(10),
            Command::Dispense,
            select("A1"),
            Command::Refund,
            Command::Refund,
        ];
        for command in &commands {
            let before = machine.state().clone();
            let result = machine.apply(command);
            assert!(machine.balance() >= Amount::ZERO);
            if result.is_err() {
                assert_eq!(machine.state(), &before);
            }
            if let MachineState::Dispensing(product) = machine.state() {
                assert!(machine.balance() >= product.price);
            }
        }
        assert_idle(&machine);
    }
}
