//! Directed debt graph with incremental netting.
//!
//! Participants are interned to dense [`ParticipantIndex`] values the first
//! time they are seen; row `i` holds what participant `i` owes to others.
//! Rows are ordered maps, so every traversal is deterministic.
//!
//! Invariants maintained by every mutation:
//! - no pair of participants has positive debts in both directions;
//! - no participant owes themself;
//! - every stored amount is strictly positive (zeroed debts are removed).

use std::collections::{BTreeMap, HashMap};

use tally_core::{Money, ParticipantId};
use tally_splitting::Share;

/// Dense handle for a participant within one [`DebtGraph`].
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ParticipantIndex(usize);

impl ParticipantIndex {
    pub fn get(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, Default)]
pub struct DebtGraph {
    participants: Vec<ParticipantId>,
    index: HashMap<ParticipantId, ParticipantIndex>,
    owes: Vec<BTreeMap<ParticipantIndex, Money>>,
}

impl DebtGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// A graph that knows the same participants (same indices) but holds no debts.
    pub fn with_same_participants(&self) -> Self {
        Self {
            participants: self.participants.clone(),
            index: self.index.clone(),
            owes: vec![BTreeMap::new(); self.participants.len()],
        }
    }

    /// Intern `participant`, returning its index (stable for the graph's lifetime).
    pub fn register(&mut self, participant: &ParticipantId) -> ParticipantIndex {
        if let Some(idx) = self.index.get(participant) {
            return *idx;
        }
        let idx = ParticipantIndex(self.participants.len());
        self.participants.push(participant.clone());
        self.index.insert(participant.clone(), idx);
        self.owes.push(BTreeMap::new());
        idx
    }

    pub fn index_of(&self, participant: &ParticipantId) -> Option<ParticipantIndex> {
        self.index.get(participant).copied()
    }

    pub fn participant(&self, idx: ParticipantIndex) -> Option<&ParticipantId> {
        self.participants.get(idx.0)
    }

    /// Known participants in registration order.
    pub fn participants(&self) -> &[ParticipantId] {
        &self.participants
    }

    /// Indices of every known participant, in registration order.
    pub fn indices(&self) -> impl Iterator<Item = ParticipantIndex> + use<> {
        (0..self.participants.len()).map(ParticipantIndex)
    }

    pub fn participant_count(&self) -> usize {
        self.participants.len()
    }

    /// Amount `from` owes `to` (zero when there is no such debt).
    pub fn amount(&self, from: ParticipantIndex, to: ParticipantIndex) -> Money {
        self.owes
            .get(from.0)
            .and_then(|row| row.get(&to))
            .copied()
            .unwrap_or(Money::ZERO)
    }

    /// Amount `from` owes `to`, by participant id.
    pub fn owed(&self, from: &ParticipantId, to: &ParticipantId) -> Money {
        match (self.index_of(from), self.index_of(to)) {
            (Some(from), Some(to)) => self.amount(from, to),
            _ => Money::ZERO,
        }
    }

    /// Everything `from` owes, keyed by creditor.
    pub fn row(&self, from: ParticipantIndex) -> impl Iterator<Item = (ParticipantIndex, Money)> + '_ {
        self.owes
            .get(from.0)
            .into_iter()
            .flat_map(|row| row.iter().map(|(to, amount)| (*to, *amount)))
    }

    /// Record that `from` owes `to` an additional `amount`, netting it
    /// against any debt `to` already owes `from`.
    ///
    /// A negative amount is recorded as a debt in the opposite direction.
    /// Self-debts and zero amounts are ignored. Sums saturate at
    /// [`Money::MAX`]; the ledger rejects expenses that could get there.
    pub fn add_debt(&mut self, from: ParticipantIndex, to: ParticipantIndex, amount: Money) {
        if from == to || amount.is_zero() {
            return;
        }
        if amount.is_negative() {
            self.add_debt(to, from, amount.abs());
            return;
        }

        let reverse = self.amount(to, from);
        if reverse.is_positive() {
            if amount >= reverse {
                self.set(to, from, Money::ZERO);
                let current = self.amount(from, to);
                let net = amount - reverse;
                self.set(from, to, current.checked_add(net).unwrap_or(Money::MAX));
            } else {
                self.set(to, from, reverse - amount);
            }
        } else {
            let current = self.amount(from, to);
            self.set(from, to, current.checked_add(amount).unwrap_or(Money::MAX));
        }
    }

    /// Lower the debt `from` owes `to` by `amount`, removing it once it reaches zero.
    ///
    /// Never creates a debt in the other direction.
    pub fn reduce(&mut self, from: ParticipantIndex, to: ParticipantIndex, amount: Money) {
        let current = self.amount(from, to);
        let remaining = current - amount;
        self.set(from, to, if remaining.is_positive() { remaining } else { Money::ZERO });
    }

    /// Fold one expense into the graph: every participant other than the
    /// payer now owes the payer their share.
    pub fn record_debts(&mut self, payer: &ParticipantId, shares: &[Share]) {
        let payer_idx = self.register(payer);
        for share in shares {
            if &share.participant == payer {
                continue;
            }
            let idx = self.register(&share.participant);
            self.add_debt(idx, payer_idx, share.amount);
        }
    }

    /// All live debts as `(from, to, amount)`, ordered by debtor then creditor.
    pub fn edges(&self) -> impl Iterator<Item = (ParticipantIndex, ParticipantIndex, Money)> + '_ {
        self.owes.iter().enumerate().flat_map(|(from, row)| {
            row.iter()
                .map(move |(to, amount)| (ParticipantIndex(from), *to, *amount))
        })
    }

    pub fn edge_count(&self) -> usize {
        self.owes.iter().map(BTreeMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.owes.iter().all(BTreeMap::is_empty)
    }

    /// Sum of every outstanding debt.
    pub fn total_outstanding(&self) -> Money {
        self.edges().map(|(_, _, amount)| amount).sum()
    }

    /// What others owe `participant` minus what `participant` owes others.
    pub fn net_position(&self, participant: &ParticipantId) -> Money {
        let Some(idx) = self.index_of(participant) else {
            return Money::ZERO;
        };
        self.edges()
            .map(|(from, to, amount)| {
                if to == idx {
                    amount
                } else if from == idx {
                    -amount
                } else {
                    Money::ZERO
                }
            })
            .sum()
    }

    /// Net position of every known participant.
    pub fn net_positions(&self) -> BTreeMap<ParticipantId, Money> {
        let mut positions = vec![Money::ZERO; self.participants.len()];
        for (from, to, amount) in self.edges() {
            positions[from.0] -= amount;
            positions[to.0] += amount;
        }
        self.participants.iter().cloned().zip(positions).collect()
    }

    /// Whether the graph satisfies its structural invariants (positive
    /// amounts, no self-debts, at most one direction per pair).
    pub fn is_well_formed(&self) -> bool {
        self.edges().all(|(from, to, amount)| {
            amount.is_positive() && from != to && self.amount(to, from).is_zero()
        })
    }

    /// Store a debt as given, bypassing netting.
    #[cfg(test)]
    pub(crate) fn insert_raw(&mut self, from: ParticipantIndex, to: ParticipantIndex, amount: Money) {
        self.set(from, to, amount);
    }

    fn set(&mut self, from: ParticipantIndex, to: ParticipantIndex, amount: Money) {
        let Some(row) = self.owes.get_mut(from.0) else {
            return;
        };
        if amount.is_positive() {
            row.insert(to, amount);
        } else {
            row.remove(&to);
        }
    }
}
