// file: src/models/filing.rs
// description: filing and raw document models as returned by the registry
// reference: internal data structures

use chrono::NaiveDate;
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Supported SEC form types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
pub enum DocType {
    #[serde(rename = "10-K")]
    #[value(name = "10-K")]
    TenK,
    #[serde(rename = "10-Q")]
    #[value(name = "10-Q")]
    TenQ,
    #[serde(rename = "8-K")]
    #[value(name = "8-K")]
    EightK,
}

impl DocType {
    pub fn as_str(&self) -> &'static str {
        match self {
            DocType::TenK => "10-K",
            DocType::TenQ => "10-Q",
            DocType::EightK => "8-K",
        }
    }
}

impl fmt::Display for DocType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DocType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "10-K" => Ok(DocType::TenK),
            "10-Q" => Ok(DocType::TenQ),
            "8-K" => Ok(DocType::EightK),
            other => Err(format!("unsupported document type: {}", other)),
        }
    }
}

/// Position of a document within a filing manifest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Primary,
    Exhibit,
}

/// One constituent document of a filing, exclusively owned by its [`Filing`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawDocument {
    pub sequence: usize,
    pub name: String,
    pub kind: DocumentKind,
    #[serde(skip)]
    pub content: Vec<u8>,
}

impl RawDocument {
    /// File extension used when the document is persisted to the save dir.
    pub fn extension(&self) -> &str {
        std::path::Path::new(&self.name)
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("txt")
    }
}

/// A single regulatory submission, immutable once fetched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Filing {
    pub ticker: String,
    pub doc_type: DocType,
    pub filing_date: NaiveDate,
    pub accession: String,
    pub documents: Vec<RawDocument>,
}

impl Filing {
    /// Stable filing identifier, also the store-side key prefix.
    pub fn filing_id(&self) -> String {
        format!("{}|{}|{}", self.ticker, self.doc_type, self.filing_date)
    }

    /// Documents in ascending sequence order.
    pub fn ordered_documents(&self) -> Vec<&RawDocument> {
        let mut docs: Vec<&RawDocument> = self.documents.iter().collect();
        docs.sort_by_key(|doc| doc.sequence);
        docs
    }
}
