//! Order draft and extraction fragment types
//!
//! An `OrderDraft` is the accumulated, session-scoped order state. An
//! `ExtractionFragment` is the transient output of one extraction call,
//! merged into the draft and then dropped.

use serde::{Deserialize, Serialize};

/// Customer portion of an order, as extracted and enriched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default)]
    pub exists: bool,
}

/// Product portion of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<i64>,
    #[serde(default)]
    pub exists: bool,
}

/// Driver portion of an order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
    #[serde(default)]
    pub exists: bool,
}

/// Partial extraction result for one inbound message, pre-merge.
///
/// Any sub-object may be absent when the extractor saw nothing for it.
/// Not persisted; ownership moves straight into the merge.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionFragment {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub customer: Option<CustomerInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product: Option<ProductInfo>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub driver: Option<DriverInfo>,
}

impl ExtractionFragment {
    /// Fragment carrying no information; merging it is a no-op.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.customer.is_none() && self.product.is_none() && self.driver.is_none()
    }
}

/// Accumulated per-session order state returned to the client after
/// every processed message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderDraft {
    #[serde(default)]
    pub customer: CustomerInfo,
    #[serde(default)]
    pub product: ProductInfo,
    #[serde(default)]
    pub driver: DriverInfo,
}

fn has_name(name: &Option<String>) -> bool {
    name.as_deref().is_some_and(|n| !n.is_empty())
}

impl OrderDraft {
    /// Merge one enriched fragment into the draft.
    ///
    /// Merges are monotonic overwrites: a sub-object is only replaced by an
    /// incoming one that carries a non-empty name, and a stored quantity is
    /// only replaced by an incoming positive one. Nothing is ever cleared.
    pub fn merge(&mut self, fragment: ExtractionFragment) {
        if let Some(customer) = fragment.customer {
            if has_name(&customer.name) {
                self.customer = customer;
            }
        }

        if let Some(product) = fragment.product {
            // Name and quantity are independent: a fragment may update either
            // without disturbing the other. Enrichment fields travel with the
            // name they were resolved for.
            if has_name(&product.name) {
                self.product.name = product.name;
                self.product.id = product.id;
                self.product.exists = product.exists;
            }
            if let Some(quantity) = product.quantity {
                if quantity > 0 {
                    self.product.quantity = Some(quantity);
                }
            }
        }

        if let Some(driver) = fragment.driver {
            if has_name(&driver.name) {
                self.driver = driver;
            }
        }
    }
}
