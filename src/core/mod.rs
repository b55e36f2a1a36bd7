pub mod error;
pub mod ledger;
pub mod node;
pub mod obligation;
