//! The shared expense-sharing service.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::Utc;
use tracing::{debug, info, warn};

use tally_core::{Aggregate, AggregateRoot, DomainError, ExpenseId, LedgerId, ParticipantId};
use tally_events::{EventBus, EventEnvelope, InMemoryEventBus, Subscription};
use tally_expenses::{Expense, ExpenseBook, ExpenseUpdate};
use tally_ledger::{
    BalanceSheet, Ledger, LedgerCommand, LedgerEvent, RecordExpense, SetSimplification,
    UserBalances,
};
use tally_splitting::ExpenseSpec;

use crate::config::ServiceConfig;
use crate::error::{ServiceError, ServiceResult};

pub type LedgerEnvelope = EventEnvelope<LedgerEvent>;

#[derive(Debug)]
struct State {
    ledger: Ledger,
    book: ExpenseBook,
}

/// One group's ledger and expense records behind a reader/writer lock.
///
/// Writers (`record_expense`, `set_simplification_enabled`, `update_expense`)
/// take the lock exclusively, so a reader never sees a half-applied expense.
/// Events are published once the write lock has been released.
#[derive(Debug)]
pub struct SharingService<B> {
    state: RwLock<State>,
    bus: B,
}

impl SharingService<InMemoryEventBus<LedgerEnvelope>> {
    pub fn in_memory(config: ServiceConfig) -> Self {
        Self::new(config, InMemoryEventBus::new())
    }
}

impl<B> SharingService<B>
where
    B: EventBus<LedgerEnvelope>,
{
    pub fn new(config: ServiceConfig, bus: B) -> Self {
        let mut ledger = Ledger::with_options(LedgerId::new(), config.simplify_options());
        if config.simplify_on_start {
            let command = LedgerCommand::SetSimplification(SetSimplification {
                enabled: true,
                occurred_at: Utc::now(),
            });
            // Toggling an empty ledger cannot be rejected.
            if let Ok(events) = ledger.handle(&command) {
                for event in &events {
                    ledger.apply(event);
                }
            }
        }

        info!(
            ledger_id = %ledger.id_typed(),
            simplify = ledger.simplification_enabled(),
            max_passes = config.max_simplify_passes,
            "sharing service started"
        );

        Self {
            state: RwLock::new(State {
                ledger,
                book: ExpenseBook::new(),
            }),
            bus,
        }
    }

    pub fn ledger_id(&self) -> ServiceResult<LedgerId> {
        Ok(self.read()?.ledger.id_typed())
    }

    /// Subscribe to ledger events published after this call.
    pub fn subscribe(&self) -> Subscription<LedgerEnvelope> {
        self.bus.subscribe()
    }

    /// Split an expense and fold its debts into the ledger.
    ///
    /// Either the whole expense is applied or, on error, nothing is.
    pub fn record_expense(
        &self,
        name: impl Into<String>,
        spec: ExpenseSpec,
    ) -> ServiceResult<ExpenseId> {
        let expense_id = ExpenseId::new();
        let now = Utc::now();
        let kind = spec.split.kind();
        let payer = spec.payer.clone();
        let total = spec.total;

        let envelopes = {
            let mut state = self.write()?;
            let command = LedgerCommand::RecordExpense(RecordExpense {
                expense_id,
                spec: spec.clone(),
                occurred_at: now,
            });
            let events = state.ledger.handle(&command).inspect_err(|err| {
                debug!(%payer, %total, %kind, error = %err, "expense rejected");
            })?;

            state.book.record(Expense::new(expense_id, name, spec, now))?;
            let envelopes = Self::apply_all(&mut state.ledger, events);
            Self::log_simplification(&state.ledger);
            envelopes
        };

        info!(%expense_id, %payer, %total, %kind, "expense recorded");
        self.publish_all(envelopes);
        Ok(expense_id)
    }

    /// Switch between the pairwise-netted view and the simplified view.
    pub fn set_simplification_enabled(&self, enabled: bool) -> ServiceResult<()> {
        let envelopes = {
            let mut state = self.write()?;
            let command = LedgerCommand::SetSimplification(SetSimplification {
                enabled,
                occurred_at: Utc::now(),
            });
            let events = state.ledger.handle(&command)?;
            if events.is_empty() {
                debug!(enabled, "simplification already in requested mode");
                return Ok(());
            }
            let envelopes = Self::apply_all(&mut state.ledger, events);
            Self::log_simplification(&state.ledger);
            envelopes
        };

        info!(enabled, "simplification toggled");
        self.publish_all(envelopes);
        Ok(())
    }

    pub fn simplification_enabled(&self) -> ServiceResult<bool> {
        Ok(self.read()?.ledger.simplification_enabled())
    }

    pub fn all_balances(&self) -> ServiceResult<BalanceSheet> {
        Ok(self.read()?.ledger.all_balances())
    }

    pub fn user_balances(&self, participant: &ParticipantId) -> ServiceResult<UserBalances> {
        Ok(self.read()?.ledger.user_balances(participant))
    }

    pub fn expense(&self, expense_id: &ExpenseId) -> ServiceResult<Expense> {
        self.read()?
            .book
            .get(expense_id)
            .cloned()
            .ok_or_else(|| DomainError::not_found(format!("expense {expense_id}")).into())
    }

    /// Edit an expense's descriptive fields. Balances are not affected.
    pub fn update_expense(
        &self,
        expense_id: &ExpenseId,
        update: ExpenseUpdate,
    ) -> ServiceResult<Expense> {
        let mut state = self.write()?;
        let expense = state.book.update_details(expense_id, update)?.clone();
        debug!(%expense_id, "expense details updated");
        Ok(expense)
    }

    /// Every expense the participant paid for or shares in, oldest first.
    pub fn passbook(&self, participant: &ParticipantId) -> ServiceResult<Vec<Expense>> {
        Ok(self.read()?.book.passbook(participant).into_iter().cloned().collect())
    }

    fn read(&self) -> ServiceResult<RwLockReadGuard<'_, State>> {
        self.state.read().map_err(|_| ServiceError::Poisoned)
    }

    fn write(&self) -> ServiceResult<RwLockWriteGuard<'_, State>> {
        self.state.write().map_err(|_| ServiceError::Poisoned)
    }

    fn apply_all(ledger: &mut Ledger, events: Vec<LedgerEvent>) -> Vec<LedgerEnvelope> {
        let stream = ledger.id_typed().to_string();
        events
            .into_iter()
            .map(|event| {
                ledger.apply(&event);
                EventEnvelope::wrap(stream.clone(), ledger.version(), event)
            })
            .collect()
    }

    fn log_simplification(ledger: &Ledger) {
        let Some(simplification) = ledger.simplification() else {
            return;
        };
        debug!(
            passes = simplification.passes,
            collapses = simplification.collapses,
            edges = simplification.graph.edge_count(),
            "simplified view refreshed"
        );
        if !simplification.converged {
            warn!(
                passes = simplification.passes,
                "simplification stopped at pass ceiling before reaching a fixpoint"
            );
        }
    }

    fn publish_all(&self, envelopes: Vec<LedgerEnvelope>) {
        for envelope in envelopes {
            let event_type = envelope.event_type().to_string();
            let sequence = envelope.sequence_number();
            if let Err(err) = self.bus.publish(envelope) {
                warn!(%event_type, sequence, error = ?err, "failed to publish ledger event");
            }
        }
    }
}
