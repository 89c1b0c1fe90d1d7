use async_trait::async_trait;
use lazy_static::lazy_static;
use regex::Regex;

use crate::search::CatalogEntry;

/// Remote product database queried on a cache miss. Implementations own their
/// own long-lived client and are injected through `AppState`.
#[async_trait]
pub trait BarcodeLookup: Send + Sync {
    async fn lookup(&self, barcode: &str) -> anyhow::Result<Option<CatalogEntry>>;
}

/// Lookup used when no network collaborator is configured: every barcode is
/// unknown.
#[derive(Debug, Default, Clone, Copy)]
pub struct OfflineLookup;

#[async_trait]
impl BarcodeLookup for OfflineLookup {
    async fn lookup(&self, _barcode: &str) -> anyhow::Result<Option<CatalogEntry>> {
        Ok(None)
    }
}

/// EAN-8, UPC-A, EAN-13 and GTIN-14 are all 8 to 14 digits.
pub fn is_valid_barcode(code: &str) -> bool {
    lazy_static! {
        static ref BARCODE_RE: Regex = Regex::new(r"^[0-9]{8,14}$").unwrap();
    }
    BARCODE_RE.is_match(code)
}
