//! Reference data lookups used for enrichment.
//!
//! The relational stores behind customer/driver/product CRUD live outside
//! this service; the pipeline only needs exact-name lookups, expressed as
//! the `ReferenceDirectory` trait. An in-memory implementation ships for
//! tests and for seeding a standalone deployment from a JSON file.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::core::jargon::JargonEntry;

/// Reference store failure during enrichment. Treated as "not found" for
/// the affected field only.
#[derive(Debug, Error)]
pub enum LookupError {
    #[error("reference store unreachable: {0}")]
    Unreachable(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRecord {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverRecord {
    pub id: i64,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub license_plate: Option<String>,
}

/// Exact-name lookups against the reference stores. No fuzzy matching.
#[async_trait]
pub trait ReferenceDirectory: Send + Sync {
    async fn find_customer(&self, name: &str) -> Result<Option<CustomerRecord>, LookupError>;
    async fn find_product(&self, name: &str) -> Result<Option<ProductRecord>, LookupError>;
    async fn find_driver(&self, name: &str) -> Result<Option<DriverRecord>, LookupError>;
}

/// Seed file shape for a standalone deployment: customers, drivers,
/// products and jargon entries in one JSON document.
#[derive(Debug, Default, Deserialize)]
pub struct ReferenceSeed {
    #[serde(default)]
    pub customers: Vec<CustomerRecord>,
    #[serde(default)]
    pub products: Vec<ProductRecord>,
    #[serde(default)]
    pub drivers: Vec<DriverRecord>,
    #[serde(default)]
    pub jargon: Vec<JargonEntry>,
}

/// In-memory reference directory, keyed by exact name.
#[derive(Default)]
pub struct InMemoryDirectory {
    customers: RwLock<HashMap<String, CustomerRecord>>,
    products: RwLock<HashMap<String, ProductRecord>>,
    drivers: RwLock<HashMap<String, DriverRecord>>,
}

impl InMemoryDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_customer(&self, record: CustomerRecord) {
        self.customers.write().insert(record.name.clone(), record);
    }

    pub fn insert_product(&self, record: ProductRecord) {
        self.products.write().insert(record.name.clone(), record);
    }

    pub fn insert_driver(&self, record: DriverRecord) {
        self.drivers.write().insert(record.name.clone(), record);
    }

    pub fn load_seed(&self, seed: &ReferenceSeed) {
        for customer in &seed.customers {
            self.insert_customer(customer.clone());
        }
        for product in &seed.products {
            self.insert_product(product.clone());
        }
        for driver in &seed.drivers {
            self.insert_driver(driver.clone());
        }
    }
}

#[async_trait]
impl ReferenceDirectory for InMemoryDirectory {
    async fn find_customer(&self, name: &str) -> Result<Option<CustomerRecord>, LookupError> {
        Ok(self.customers.read().get(name).cloned())
    }

    async fn find_product(&self, name: &str) -> Result<Option<ProductRecord>, LookupError> {
        Ok(self.products.read().get(name).cloned())
    }

    async fn find_driver(&self, name: &str) -> Result<Option<DriverRecord>, LookupError> {
        Ok(self.drivers.read().get(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn lookup_is_exact_match() {
        let directory = InMemoryDirectory::new();
        directory.insert_customer(CustomerRecord {
            id: 1,
            name: "张三".to_string(),
            phone: Some("13800000000".to_string()),
        });

        let hit = directory.find_customer("张三").await.unwrap();
        assert_eq!(hit.unwrap().id, 1);

        // Prefix and fuzzy forms miss.
        assert!(directory.find_customer("张").await.unwrap().is_none());
        assert!(directory.find_customer("张三丰").await.unwrap().is_none());
    }

    #[test]
    fn seed_file_parses_with_missing_sections() {
        let seed: ReferenceSeed = serde_json::from_str(
            r#"{"customers":[{"id":1,"name":"张三"}],
                "jargon":[{"id":1,"slang_term":"红富士","canonical_term":"苹果"}]}"#,
        )
        .unwrap();
        assert_eq!(seed.customers.len(), 1);
        assert_eq!(seed.jargon.len(), 1);
        assert!(seed.drivers.is_empty());
        assert!(seed.products.is_empty());
    }
}
