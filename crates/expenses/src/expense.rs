use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use tally_core::{ExpenseId, Money, ParticipantId};
use tally_splitting::{ExpenseSpec, Split};

/// A recorded expense.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expense {
    id: ExpenseId,
    spec: ExpenseSpec,
    name: String,
    notes: String,
    image_urls: Vec<String>,
    created_at: DateTime<Utc>,
}

impl Expense {
    pub fn new(
        id: ExpenseId,
        name: impl Into<String>,
        spec: ExpenseSpec,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            spec,
            name: name.into(),
            notes: String::new(),
            image_urls: Vec::new(),
            created_at,
        }
    }

    pub fn id_typed(&self) -> ExpenseId {
        self.id
    }

    pub fn spec(&self) -> &ExpenseSpec {
        &self.spec
    }

    pub fn payer(&self) -> &ParticipantId {
        &self.spec.payer
    }

    pub fn amount(&self) -> Money {
        self.spec.total
    }

    pub fn split(&self) -> &Split {
        &self.spec.split
    }

    pub fn participants(&self) -> &[ParticipantId] {
        &self.spec.participants
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn image_urls(&self) -> &[String] {
        &self.image_urls
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn involves(&self, participant: &ParticipantId) -> bool {
        self.spec.involves(participant)
    }

    /// Apply a metadata update.
    ///
    /// A blank name is ignored; notes and image URLs replace the current
    /// values when present.
    pub fn apply_update(&mut self, update: ExpenseUpdate) {
        if let Some(name) = update.name {
            if !name.trim().is_empty() {
                self.name = name;
            }
        }
        if let Some(notes) = update.notes {
            self.notes = notes;
        }
        if let Some(image_urls) = update.image_urls {
            self.image_urls = image_urls;
        }
    }
}

/// Changes to an expense's non-financial metadata. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExpenseUpdate {
    pub name: Option<String>,
    pub notes: Option<String>,
    pub image_urls: Option<Vec<String>>,
}

impl ExpenseUpdate {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.notes.is_none() && self.image_urls.is_none()
    }
}
