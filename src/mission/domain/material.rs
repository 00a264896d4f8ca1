//! Material usage encoded against a mission.

use super::{MaterialLineId, MissionDomainError, UserId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One line of material consumed during a mission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialLine {
    id: MaterialLineId,
    item: String,
    quantity: u32,
    comment: Option<String>,
}

impl MaterialLine {
    /// Creates a validated material line.
    ///
    /// # Errors
    ///
    /// Returns [`MissionDomainError::EmptyMaterialItem`] for a blank item or
    /// [`MissionDomainError::InvalidQuantity`] for a zero quantity.
    pub fn new(item: impl Into<String>, quantity: u32) -> Result<Self, MissionDomainError> {
        Ok(Self {
            id: MaterialLineId::new(),
            item: normalize_item(item.into())?,
            quantity: validate_quantity(quantity)?,
            comment: None,
        })
    }

    /// Attaches a free-text comment.
    #[must_use]
    pub fn with_comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    /// Returns the line identifier.
    #[must_use]
    pub const fn id(&self) -> MaterialLineId {
        self.id
    }

    /// Returns the material item label.
    #[must_use]
    pub fn item(&self) -> &str {
        &self.item
    }

    /// Returns the consumed quantity.
    #[must_use]
    pub const fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Returns the comment, if any.
    #[must_use]
    pub fn comment(&self) -> Option<&str> {
        self.comment.as_deref()
    }

    pub(super) fn apply(&mut self, change: MaterialLineChange) -> Result<(), MissionDomainError> {
        if let Some(quantity) = change.quantity {
            self.quantity = validate_quantity(quantity)?;
        }
        if let Some(comment) = change.comment {
            self.comment = Some(comment).filter(|text| !text.trim().is_empty());
        }
        Ok(())
    }
}

/// Partial update of a material line.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MaterialLineChange {
    /// New quantity, when changed.
    pub quantity: Option<u32>,
    /// New comment, when changed. A blank comment clears it.
    pub comment: Option<String>,
}

/// Request to add an item missing from the material catalogue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialItemRequest {
    /// Requested item label.
    pub label: String,
    /// User who asked for the item.
    pub requested_by: UserId,
    /// Request timestamp.
    pub requested_at: DateTime<Utc>,
}

fn normalize_item(item: String) -> Result<String, MissionDomainError> {
    let trimmed = item.trim();
    if trimmed.is_empty() {
        return Err(MissionDomainError::EmptyMaterialItem);
    }
    Ok(trimmed.to_owned())
}

const fn validate_quantity(quantity: u32) -> Result<u32, MissionDomainError> {
    if quantity == 0 {
        return Err(MissionDomainError::InvalidQuantity(quantity));
    }
    Ok(quantity)
}

pub(super) fn new_item_request(
    label: String,
    requested_by: UserId,
    requested_at: DateTime<Utc>,
) -> Result<MaterialItemRequest, MissionDomainError> {
    Ok(MaterialItemRequest {
        label: normalize_item(label)?,
        requested_by,
        requested_at,
    })
}
