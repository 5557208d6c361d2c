use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::errors::CoreError;

use super::money::Amount;

/// A movement of funds between two pockets, as confirmed by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transfer {
    pub id: String,
    pub from_pocket_id: String,
    pub to_pocket_id: String,
    pub amount: Amount,
    pub date: String,
    #[serde(default)]
    pub note: Option<String>,
}

/// Payload for `POST /transfers/{y}/{m}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransfer {
    pub from_pocket_id: String,
    pub to_pocket_id: String,
    pub amount: Amount,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewTransfer {
    pub fn new(
        from_pocket_id: impl Into<String>,
        to_pocket_id: impl Into<String>,
        amount: Amount,
        date: NaiveDate,
    ) -> Self {
        Self {
            from_pocket_id: from_pocket_id.into(),
            to_pocket_id: to_pocket_id.into(),
            amount,
            date,
            note: None,
        }
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = Some(note.into());
        self
    }

    pub fn validate(&self) -> Result<(), CoreError> {
        if self.amount <= 0 {
            return Err(CoreError::Validation(format!(
                "Transfer amount must be positive, got {}",
                self.amount
            )));
        }
        if self.from_pocket_id == self.to_pocket_id {
            return Err(CoreError::Validation(
                "Cannot transfer a pocket into itself".into(),
            ));
        }
        Ok(())
    }
}
