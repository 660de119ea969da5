pub mod amount;
pub mod catalog;
pub mod csv;
pub mod machine;
pub mod model;

pub use amount::Amount;
pub use catalog::Catalog;
pub use machine::VendingMachine;
pub use model::{Command, Outcome, Product, ProductId};
