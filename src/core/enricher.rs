//! Reference enrichment of extracted fragments.
//!
//! Each non-empty extracted name is resolved against the reference
//! directory by exact match. Found: id and supplemental fields are filled
//! and `exists` is set. Not found, or the store errored: the name is kept,
//! everything else is cleared and `exists` is false. Quantity is never
//! touched here.

use std::sync::Arc;

use tracing::warn;

use crate::core::directory::ReferenceDirectory;
use crate::core::order::ExtractionFragment;

pub struct ReferenceEnricher {
    directory: Arc<dyn ReferenceDirectory>,
}

impl ReferenceEnricher {
    pub fn new(directory: Arc<dyn ReferenceDirectory>) -> Self {
        Self { directory }
    }

    /// Resolve every named sub-object in place. Lookup failures degrade to
    /// `exists = false` for that field only.
    pub async fn enrich(&self, fragment: &mut ExtractionFragment) {
        if let Some(customer) = fragment.customer.as_mut() {
            if let Some(name) = customer.name.clone().filter(|n| !n.is_empty()) {
                match self.directory.find_customer(&name).await {
                    Ok(Some(record)) => {
                        customer.id = Some(record.id);
                        customer.phone = record.phone;
                        customer.exists = true;
                    }
                    Ok(None) => {
                        customer.id = None;
                        customer.phone = None;
                        customer.exists = false;
                    }
                    Err(e) => {
                        warn!("customer lookup failed for {name}: {e}");
                        customer.id = None;
                        customer.phone = None;
                        customer.exists = false;
                    }
                }
            }
        }

        if let Some(product) = fragment.product.as_mut() {
            if let Some(name) = product.name.clone().filter(|n| !n.is_empty()) {
                match self.directory.find_product(&name).await {
                    Ok(Some(record)) => {
                        product.id = Some(record.id);
                        product.exists = true;
                    }
                    Ok(None) => {
                        product.id = None;
                        product.exists = false;
                    }
                    Err(e) => {
                        warn!("product lookup failed for {name}: {e}");
                        product.id = None;
                        product.exists = false;
                    }
                }
            }
        }

        if let Some(driver) = fragment.driver.as_mut() {
            if let Some(name) = driver.name.clone().filter(|n| !n.is_empty()) {
                match self.directory.find_driver(&name).await {
                    Ok(Some(record)) => {
                        driver.id = Some(record.id);
                        driver.phone = record.phone;
                        driver.license_plate = record.license_plate;
                        driver.exists = true;
                    }
                    Ok(None) => {
                        driver.id = None;
                        driver.phone = None;
                        driver.license_plate = None;
                        driver.exists = false;
                    }
                    Err(e) => {
                        warn!("driver lookup failed for {name}: {e}");
                        driver.id = None;
                        driver.phone = None;
                        driver.license_plate = None;
                        driver.exists = false;
                    }
                }
            }
        }
    }
}
