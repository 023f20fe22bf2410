// file: src/registry/mod.rs
// description: filings registry capability trait and the EDGAR implementation

pub mod edgar;

use crate::error::Result;
use crate::models::{DocType, Filing};
use async_trait::async_trait;

pub use edgar::EdgarRegistry;

/// Capability interface over the public filings registry.
///
/// Returns the most recent filing of the requested type with every
/// constituent document downloaded. Concrete transports are substitutable,
/// which is what the test suite's stub registries rely on.
#[async_trait]
pub trait FilingRegistry: Send + Sync {
    async fn latest_filing(&self, ticker: &str, doc_type: DocType) -> Result<Filing>;
}
