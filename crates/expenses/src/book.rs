use std::collections::HashMap;

use tally_core::{DomainError, DomainResult, ExpenseId, ParticipantId};

use crate::expense::{Expense, ExpenseUpdate};

/// In-memory register of expenses, remembering recording order.
#[derive(Debug, Clone, Default)]
pub struct ExpenseBook {
    expenses: HashMap<ExpenseId, Expense>,
    history: Vec<ExpenseId>,
}

impl ExpenseBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, expense: Expense) -> DomainResult<()> {
        let id = expense.id_typed();
        if self.expenses.contains_key(&id) {
            return Err(DomainError::invariant(format!("expense {id} already recorded")));
        }
        self.expenses.insert(id, expense);
        self.history.push(id);
        Ok(())
    }

    pub fn get(&self, id: &ExpenseId) -> Option<&Expense> {
        self.expenses.get(id)
    }

    /// Update an expense's metadata. Fails with `NotFound` for unknown ids.
    pub fn update_details(&mut self, id: &ExpenseId, update: ExpenseUpdate) -> DomainResult<&Expense> {
        let expense = self
            .expenses
            .get_mut(id)
            .ok_or_else(|| DomainError::not_found(format!("expense {id}")))?;
        expense.apply_update(update);
        Ok(expense)
    }

    /// Expenses in recording order.
    pub fn iter(&self) -> impl Iterator<Item = &Expense> {
        self.history.iter().filter_map(|id| self.expenses.get(id))
    }

    /// Every expense `participant` paid for or took part in, oldest first.
    pub fn passbook(&self, participant: &ParticipantId) -> Vec<&Expense> {
        self.iter().filter(|e| e.involves(participant)).collect()
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tally_splitting::{ExpenseSpec, Split};

    fn p(id: &str) -> ParticipantId {
        ParticipantId::new(id).unwrap()
    }

    fn expense(name: &str, payer: &str, participants: &[&str]) -> Expense {
        let spec = ExpenseSpec::new(
            p(payer),
            "100".parse().unwrap(),
            Split::Equal,
            participants.iter().map(|id| p(id)).collect(),
        );
        Expense::new(ExpenseId::new(), name, spec, Utc::now())
    }

    #[test]
    fn update_changes_metadata_only() {
        let mut book = ExpenseBook::new();
        let original = expense("Dinner", "u1", &["u1", "u2"]);
        let id = original.id_typed();
        book.record(original.clone()).unwrap();

        let updated = book
            .update_details(
                &id,
                ExpenseUpdate {
                    name: Some("Team dinner".into()),
                    notes: Some("paid by card".into()),
                    image_urls: Some(vec!["https://img/1.png".into()]),
                },
            )
            .unwrap();

        assert_eq!(updated.name(), "Team dinner");
        assert_eq!(updated.notes(), "paid by card");
        assert_eq!(updated.image_urls(), ["https://img/1.png".to_string()]);
        assert_eq!(updated.spec(), original.spec());
    }

    #[test]
    fn blank_name_is_ignored_and_images_are_replaced() {
        let mut book = ExpenseBook::new();
        let e = expense("Taxi", "u1", &["u2"]);
        let id = e.id_typed();
        book.record(e).unwrap();

        book.update_details(
            &id,
            ExpenseUpdate {
                image_urls: Some(vec!["a".into(), "b".into()]),
                ..ExpenseUpdate::default()
            },
        )
        .unwrap();
        let e = book
            .update_details(
                &id,
                ExpenseUpdate {
                    name: Some("   ".into()),
                    image_urls: Some(vec!["c".into()]),
                    ..ExpenseUpdate::default()
                },
            )
            .unwrap();

        assert_eq!(e.name(), "Taxi");
        assert_eq!(e.image_urls(), ["c".to_string()]);
    }

    #[test]
    fn updating_unknown_expense_is_not_found() {
        let mut book = ExpenseBook::new();
        let err = book
            .update_details(&ExpenseId::new(), ExpenseUpdate::default())
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn duplicate_ids_are_rejected() {
        let mut book = ExpenseBook::new();
        let e = expense("Lunch", "u1", &["u2"]);
        book.record(e.clone()).unwrap();
        assert!(matches!(book.record(e), Err(DomainError::InvariantViolation(_))));
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn passbook_lists_paid_and_shared_expenses_in_order() {
        let mut book = ExpenseBook::new();
        book.record(expense("first", "u1", &["u2"])).unwrap();
        book.record(expense("second", "u3", &["u3", "u4"])).unwrap();
        book.record(expense("third", "u2", &["u1"])).unwrap();

        let names: Vec<&str> = book.passbook(&p("u1")).iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["first", "third"]);
        assert!(book.passbook(&p("u9")).is_empty());
    }

    #[test]
    fn spec_values_survive_recording() {
        let spec = ExpenseSpec::new(
            p("u1"),
            "10".parse().unwrap(),
            Split::Percent(vec![dec!(40), dec!(60)]),
            vec![p("u2"), p("u3")],
        );
        let e = Expense::new(ExpenseId::new(), "Snacks", spec, Utc::now());
        assert_eq!(e.split().values(), &[dec!(40), dec!(60)]);
        assert_eq!(e.amount(), "10".parse().unwrap());
        assert_eq!(e.participants().len(), 2);
    }
}
