//! Expense records: the immutable financial spec plus editable metadata.
//!
//! Nothing here touches balances. Editing an expense's name, notes or images
//! never changes who owes whom.

pub mod book;
pub mod expense;

pub use book::ExpenseBook;
pub use expense::{Expense, ExpenseUpdate};
