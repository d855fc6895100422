//! Sales order payload types
//!
//! The payload is stored verbatim in the submission outbox for audit and
//! replay, so everything here round-trips through serde without loss.

use serde::{Deserialize, Serialize};

use crate::errors::{OrderBridgeError, Result};

/// A single order line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Product identifier as known by the ERP
    pub sku: String,
    /// Ordered quantity
    pub qty: u32,
    /// Unit price agreed at capture time
    pub price: f64,
}

/// A candidate sales order as assembled by the capture UI.
///
/// Field names follow the wire shape the boundary accepts; the struct is
/// persisted as verbatim JSON in `SubmissionRecord.payload`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload {
    /// Partner (customer) code in the ERP
    pub partner: i64,
    /// Order lines, at least one required
    pub items: Vec<OrderItem>,
    /// Computed order total
    #[serde(default)]
    pub total: f64,
}

impl OrderPayload {
    /// Validate the payload before anything is persisted.
    ///
    /// A payload that fails here is the caller's fault and never reaches the
    /// outbox, so the rules stay deliberately structural: a resolvable
    /// partner reference, at least one line, sane line values.
    pub fn validate(&self) -> Result<()> {
        if self.partner <= 0 {
            return Err(OrderBridgeError::Validation(
                "order requires a resolvable partner reference".into(),
            ));
        }
        if self.items.is_empty() {
            return Err(OrderBridgeError::Validation(
                "order requires at least one line item".into(),
            ));
        }
        for (idx, item) in self.items.iter().enumerate() {
            if item.sku.trim().is_empty() {
                return Err(OrderBridgeError::Validation(format!(
                    "line {idx}: sku must not be empty"
                )));
            }
            if item.qty == 0 {
                return Err(OrderBridgeError::Validation(format!(
                    "line {idx}: quantity must be positive"
                )));
            }
            if item.price < 0.0 || !item.price.is_finite() {
                return Err(OrderBridgeError::Validation(format!(
                    "line {idx}: price must be a non-negative number"
                )));
            }
        }
        if self.total < 0.0 || !self.total.is_finite() {
            return Err(OrderBridgeError::Validation("order total must be non-negative".into()));
        }
        Ok(())
    }

    /// Sum of line totals, used when the caller did not supply a total.
    pub fn computed_total(&self) -> f64 {
        self.items.iter().map(|item| f64::from(item.qty) * item.price).sum()
    }
}

/// Lead lifecycle states the pipeline cares about.
///
/// The pipeline only ever transitions a lead to `Won`; the other states are
/// read-only context.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LeadStatus {
    InProgress,
    Won,
    Lost,
}

impl LeadStatus {
    /// Storage representation.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InProgress => "in_progress",
            Self::Won => "won",
            Self::Lost => "lost",
        }
    }

    /// Parse the storage representation.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "in_progress" => Some(Self::InProgress),
            "won" => Some(Self::Won),
            "lost" => Some(Self::Lost),
            _ => None,
        }
    }
}
