//! Read-only balance projections over a [`DebtGraph`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use tally_core::{Money, ParticipantId};

use crate::graph::DebtGraph;

/// `from` owes `to` the given amount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Debt {
    pub from: ParticipantId,
    pub to: ParticipantId,
    pub amount: Money,
}

impl Debt {
    /// The other party of this debt, seen from `participant`.
    pub fn counterparty(&self, participant: &ParticipantId) -> &ParticipantId {
        if &self.from == participant { &self.to } else { &self.from }
    }
}

/// Snapshot of every outstanding debt, ordered by debtor then creditor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceSheet {
    debts: Vec<Debt>,
}

impl BalanceSheet {
    pub fn from_graph(graph: &DebtGraph) -> Self {
        let mut debts: Vec<Debt> = graph
            .edges()
            .filter_map(|(from, to, amount)| {
                Some(Debt {
                    from: graph.participant(from)?.clone(),
                    to: graph.participant(to)?.clone(),
                    amount,
                })
            })
            .collect();
        debts.sort_by(|a, b| (&a.from, &a.to).cmp(&(&b.from, &b.to)));
        Self { debts }
    }

    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    pub fn owed(&self, from: &ParticipantId, to: &ParticipantId) -> Money {
        self.debts
            .iter()
            .find(|d| &d.from == from && &d.to == to)
            .map(|d| d.amount)
            .unwrap_or(Money::ZERO)
    }

    pub fn len(&self) -> usize {
        self.debts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }

    pub fn total(&self) -> Money {
        self.debts.iter().map(|d| d.amount).sum()
    }

    /// Nested `debtor -> creditor -> amount` view.
    pub fn to_map(&self) -> BTreeMap<ParticipantId, BTreeMap<ParticipantId, Money>> {
        let mut map: BTreeMap<ParticipantId, BTreeMap<ParticipantId, Money>> = BTreeMap::new();
        for debt in &self.debts {
            map.entry(debt.from.clone())
                .or_default()
                .insert(debt.to.clone(), debt.amount);
        }
        map
    }
}

/// Every debt one participant is party to, as debtor or creditor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserBalances {
    participant: ParticipantId,
    debts: Vec<Debt>,
}

impl UserBalances {
    /// Merge the participant's row (what they owe) with the transposed
    /// column (what they are owed). The graph holds one direction per pair,
    /// so there is at most one debt per counterparty.
    pub fn from_graph(graph: &DebtGraph, participant: &ParticipantId) -> Self {
        let mut debts = Vec::new();
        if let Some(idx) = graph.index_of(participant) {
            for (from, to, amount) in graph.edges() {
                if from != idx && to != idx {
                    continue;
                }
                let (Some(from), Some(to)) = (graph.participant(from), graph.participant(to)) else {
                    continue;
                };
                debts.push(Debt {
                    from: from.clone(),
                    to: to.clone(),
                    amount,
                });
            }
        }
        debts.sort_by(|a, b| a.counterparty(participant).cmp(b.counterparty(participant)));

        Self {
            participant: participant.clone(),
            debts,
        }
    }

    pub fn participant(&self) -> &ParticipantId {
        &self.participant
    }

    /// Debts ordered by counterparty.
    pub fn debts(&self) -> &[Debt] {
        &self.debts
    }

    /// What the participant owes `creditor`.
    pub fn owes(&self, creditor: &ParticipantId) -> Money {
        self.debts
            .iter()
            .find(|d| d.from == self.participant && &d.to == creditor)
            .map(|d| d.amount)
            .unwrap_or(Money::ZERO)
    }

    /// What `debtor` owes the participant.
    pub fn owed_by(&self, debtor: &ParticipantId) -> Money {
        self.debts
            .iter()
            .find(|d| &d.from == debtor && d.to == self.participant)
            .map(|d| d.amount)
            .unwrap_or(Money::ZERO)
    }

    /// Owed to the participant minus owed by the participant.
    pub fn net(&self) -> Money {
        self.debts
            .iter()
            .map(|d| if d.to == self.participant { d.amount } else { -d.amount })
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.debts.is_empty()
    }
}
