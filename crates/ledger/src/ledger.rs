use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_core::{Aggregate, AggregateRoot, DomainError, ExpenseId, LedgerId, Money, ParticipantId};
use tally_events::Event;
use tally_splitting::{ExpenseSpec, Share, calculate_split};

use crate::balances::{BalanceSheet, UserBalances};
use crate::graph::DebtGraph;
use crate::simplify::{Simplification, SimplifyOptions, collapse_chains};

/// Aggregate root: Ledger (netted debts of one group).
///
/// The netted graph is the only authoritative state. When simplification is
/// enabled, a simplified copy is recomputed after every change and reads are
/// served from it; the netted graph itself is never rewritten, so turning
/// simplification off again restores the pairwise view.
#[derive(Debug, Clone)]
pub struct Ledger {
    id: LedgerId,
    graph: DebtGraph,
    options: SimplifyOptions,
    simplified: Option<Simplification>,
    version: u64,
}

impl Ledger {
    /// Empty aggregate for rehydration.
    pub fn empty(id: LedgerId) -> Self {
        Self::with_options(id, SimplifyOptions::default())
    }

    pub fn with_options(id: LedgerId, options: SimplifyOptions) -> Self {
        Self {
            id,
            graph: DebtGraph::new(),
            options,
            simplified: None,
            version: 0,
        }
    }

    /// Rebuild a ledger from its event history.
    pub fn replay<'a>(
        id: LedgerId,
        options: SimplifyOptions,
        events: impl IntoIterator<Item = &'a LedgerEvent>,
    ) -> Self {
        let mut ledger = Self::with_options(id, options);
        for event in events {
            ledger.apply(event);
        }
        ledger
    }

    pub fn id_typed(&self) -> LedgerId {
        self.id
    }

    pub fn simplification_enabled(&self) -> bool {
        self.simplified.is_some()
    }

    pub fn options(&self) -> SimplifyOptions {
        self.options
    }

    /// The canonical netted graph, regardless of simplification mode.
    pub fn netted_graph(&self) -> &DebtGraph {
        &self.graph
    }

    /// Statistics of the current simplified view, when enabled.
    pub fn simplification(&self) -> Option<&Simplification> {
        self.simplified.as_ref()
    }

    /// The graph reads are served from: simplified when enabled, netted otherwise.
    pub fn current_graph(&self) -> &DebtGraph {
        match &self.simplified {
            Some(s) => &s.graph,
            None => &self.graph,
        }
    }

    pub fn all_balances(&self) -> BalanceSheet {
        BalanceSheet::from_graph(self.current_graph())
    }

    pub fn user_balances(&self, participant: &ParticipantId) -> UserBalances {
        UserBalances::from_graph(self.current_graph(), participant)
    }

    fn refresh_simplified(&mut self) {
        if self.simplified.is_some() {
            self.simplified = Some(collapse_chains(&self.graph, self.options));
        }
    }
}

impl AggregateRoot for Ledger {
    type Id = LedgerId;

    fn id(&self) -> &Self::Id {
        &self.id
    }

    fn version(&self) -> u64 {
        self.version
    }
}

/// Command: RecordExpense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordExpense {
    pub expense_id: ExpenseId,
    pub spec: ExpenseSpec,
    pub occurred_at: DateTime<Utc>,
}

/// Command: SetSimplification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetSimplification {
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerCommand {
    RecordExpense(RecordExpense),
    SetSimplification(SetSimplification),
}

/// Event: ExpenseRecorded (shares already computed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseRecorded {
    pub expense_id: ExpenseId,
    pub payer: ParticipantId,
    pub shares: Vec<Share>,
    pub occurred_at: DateTime<Utc>,
}

/// Event: SimplificationToggled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimplificationToggled {
    pub enabled: bool,
    pub occurred_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerEvent {
    ExpenseRecorded(ExpenseRecorded),
    SimplificationToggled(SimplificationToggled),
}

impl Event for LedgerEvent {
    fn event_type(&self) -> &'static str {
        match self {
            LedgerEvent::ExpenseRecorded(_) => "ledger.expense_recorded",
            LedgerEvent::SimplificationToggled(_) => "ledger.simplification_toggled",
        }
    }

    fn version(&self) -> u32 {
        1
    }

    fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            LedgerEvent::ExpenseRecorded(e) => e.occurred_at,
            LedgerEvent::SimplificationToggled(e) => e.occurred_at,
        }
    }
}

impl Aggregate for Ledger {
    type Command = LedgerCommand;
    type Event = LedgerEvent;
    type Error = DomainError;

    fn apply(&mut self, event: &Self::Event) {
        match event {
            LedgerEvent::ExpenseRecorded(e) => {
                self.graph.record_debts(&e.payer, &e.shares);
                self.refresh_simplified();
            }
            LedgerEvent::SimplificationToggled(e) => {
                self.simplified = if e.enabled {
                    Some(collapse_chains(&self.graph, self.options))
                } else {
                    None
                };
            }
        }

        self.version += 1;
    }

    fn handle(&self, command: &Self::Command) -> Result<Vec<Self::Event>, Self::Error> {
        match command {
            LedgerCommand::RecordExpense(cmd) => self.handle_record(cmd),
            LedgerCommand::SetSimplification(cmd) => self.handle_set_simplification(cmd),
        }
    }
}

impl Ledger {
    fn handle_record(&self, cmd: &RecordExpense) -> Result<Vec<LedgerEvent>, DomainError> {
        let split = calculate_split(&cmd.spec)?;
        self.ensure_in_range(&cmd.spec.payer, split.shares())?;

        Ok(vec![LedgerEvent::ExpenseRecorded(ExpenseRecorded {
            expense_id: cmd.expense_id,
            payer: cmd.spec.payer.clone(),
            shares: split.into_shares(),
            occurred_at: cmd.occurred_at,
        })])
    }

    /// Reject an expense that could push any balance past [`Money::MAX`].
    ///
    /// Every stored debt, net position and simplified debt is bounded by the
    /// total outstanding amount of the netted graph, so keeping that total
    /// representable keeps every derived figure exact.
    fn ensure_in_range(&self, payer: &ParticipantId, shares: &[Share]) -> Result<(), DomainError> {
        shares
            .iter()
            .filter(|share| &share.participant != payer)
            .try_fold(self.graph.total_outstanding(), |acc, share| {
                acc.checked_add(share.amount.checked_abs()?)
            })
            .map(|_: Money| ())
            .ok_or_else(|| {
                DomainError::validation("expense would push ledger balances out of range")
            })
    }

    fn handle_set_simplification(
        &self,
        cmd: &SetSimplification,
    ) -> Result<Vec<LedgerEvent>, DomainError> {
        // Already in the requested mode: nothing to record.
        if cmd.enabled == self.simplification_enabled() {
            return Ok(vec![]);
        }

        Ok(vec![LedgerEvent::SimplificationToggled(SimplificationToggled {
            enabled: cmd.enabled,
            occurred_at: cmd.occurred_at,
        })])
    }
}
