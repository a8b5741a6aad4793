use serde::{Deserialize, Serialize};

use tally_core::{Money, ParticipantId};

use crate::split::Split;

/// The financial part of an expense: who paid, how much, and how to divide it.
///
/// Participant order matters: the last participant absorbs any rounding
/// remainder. Participants are not deduplicated; a repeated participant owes
/// the sum of their shares.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseSpec {
    pub payer: ParticipantId,
    pub total: Money,
    pub split: Split,
    pub participants: Vec<ParticipantId>,
}

impl ExpenseSpec {
    pub fn new(payer: ParticipantId, total: Money, split: Split, participants: Vec<ParticipantId>) -> Self {
        Self {
            payer,
            total,
            split,
            participants,
        }
    }

    /// Whether `participant` paid for or takes part in this expense.
    pub fn involves(&self, participant: &ParticipantId) -> bool {
        &self.payer == participant || self.participants.contains(participant)
    }
}
