//! Split calculation: turning one expense into per-participant owed amounts.
//!
//! Pure functions only. Every variant reconciles to the expense total to the
//! cent by letting the last listed participant absorb the rounding remainder
//! (EXACT excepted, which takes the amounts as given).

pub mod calculator;
pub mod expense_spec;
pub mod split;

pub use calculator::{Share, SplitResult, calculate_split};
pub use expense_spec::ExpenseSpec;
pub use split::{Split, SplitKind};
