// file: src/fetcher.rs
// description: disk-cached filing fetcher layered over the registry capability
// reference: cache-before-network fetch stage

use crate::error::{PipelineError, Result};
use crate::models::{DocType, DocumentKind, Filing, RawDocument};
use crate::registry::FilingRegistry;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

const MANIFEST_FILE: &str = "manifest.json";

/// On-disk description of a cached filing; lives next to the document files.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct CacheManifest {
    ticker: String,
    doc_type: DocType,
    filing_date: NaiveDate,
    accession: String,
    documents: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct ManifestEntry {
    sequence: usize,
    name: String,
    kind: DocumentKind,
    file: String,
}

/// Fetches filings, serving from the save directory when a complete cached
/// copy exists and persisting every downloaded document otherwise.
///
/// Layout: `SAVE_DIR/<ticker>/<doc_type>/<filing_date>/<sequence>.<ext>` plus
/// a manifest. The path doubles as the cache key, so concurrent ingestion of
/// different filings never contends on the same files.
pub struct FilingFetcher {
    registry: Arc<dyn FilingRegistry>,
    save_dir: PathBuf,
}

impl FilingFetcher {
    pub fn new(registry: Arc<dyn FilingRegistry>, save_dir: impl Into<PathBuf>) -> Self {
        Self {
            registry,
            save_dir: save_dir.into(),
        }
    }

    /// Cache check precedes the network fetch.
    pub async fn fetch(&self, ticker: &str, doc_type: DocType) -> Result<Filing> {
        let ticker = ticker.to_ascii_uppercase();

        if let Some(filing) = self.load_cached(&ticker, doc_type)? {
            info!(
                ticker,
                %doc_type,
                filing_date = %filing.filing_date,
                "serving filing from disk cache"
            );
            return Ok(filing);
        }

        let filing = self.registry.latest_filing(&ticker, doc_type).await?;
        self.persist(&filing)?;
        Ok(filing)
    }

    /// Filing identity of the newest complete cached copy, without loading
    /// document bytes. Lets the pipeline run its exists-check before any
    /// fetch at all.
    pub fn cached_filing_id(&self, ticker: &str, doc_type: DocType) -> Option<String> {
        let ticker = ticker.to_ascii_uppercase();
        let type_dir = self.save_dir.join(&ticker).join(doc_type.as_str());
        let mut date_dirs: Vec<PathBuf> = std::fs::read_dir(&type_dir)
            .ok()?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        date_dirs.sort();

        for dir in date_dirs.into_iter().rev() {
            let Ok(raw) = std::fs::read_to_string(dir.join(MANIFEST_FILE)) else {
                continue;
            };
            let Ok(manifest) = serde_json::from_str::<CacheManifest>(&raw) else {
                continue;
            };
            if manifest
                .documents
                .iter()
                .all(|entry| dir.join(&entry.file).is_file())
            {
                return Some(format!(
                    "{}|{}|{}",
                    manifest.ticker, manifest.doc_type, manifest.filing_date
                ));
            }
        }
        None
    }

    fn filing_dir(&self, ticker: &str, doc_type: DocType, filing_date: NaiveDate) -> PathBuf {
        self.save_dir
            .join(ticker)
            .join(doc_type.as_str())
            .join(filing_date.to_string())
    }

    /// Most recent cached filing of the requested type, if complete.
    fn load_cached(&self, ticker: &str, doc_type: DocType) -> Result<Option<Filing>> {
        let type_dir = self.save_dir.join(ticker).join(doc_type.as_str());
        if !type_dir.is_dir() {
            return Ok(None);
        }

        let mut date_dirs: Vec<PathBuf> = std::fs::read_dir(&type_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_dir())
            .collect();
        // Date-named directories sort chronologically; newest last.
        date_dirs.sort();

        for dir in date_dirs.into_iter().rev() {
            match self.load_manifest(&dir) {
                Ok(Some(filing)) => return Ok(Some(filing)),
                Ok(None) => continue,
                Err(e) => {
                    warn!(dir = %dir.display(), error = %e, "ignoring unreadable cache entry");
                    continue;
                }
            }
        }

        Ok(None)
    }

    fn load_manifest(&self, dir: &Path) -> Result<Option<Filing>> {
        let manifest_path = dir.join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Ok(None);
        }

        let manifest: CacheManifest =
            serde_json::from_str(&std::fs::read_to_string(&manifest_path)?)?;

        let mut documents = Vec::with_capacity(manifest.documents.len());
        for entry in &manifest.documents {
            let doc_path = dir.join(&entry.file);
            if !doc_path.is_file() {
                debug!(file = %doc_path.display(), "cache entry incomplete");
                return Ok(None);
            }
            documents.push(RawDocument {
                sequence: entry.sequence,
                name: entry.name.clone(),
                kind: entry.kind,
                content: std::fs::read(&doc_path)?,
            });
        }

        Ok(Some(Filing {
            ticker: manifest.ticker,
            doc_type: manifest.doc_type,
            filing_date: manifest.filing_date,
            accession: manifest.accession,
            documents,
        }))
    }

    fn persist(&self, filing: &Filing) -> Result<()> {
        let dir = self.filing_dir(&filing.ticker, filing.doc_type, filing.filing_date);
        std::fs::create_dir_all(&dir)?;

        let mut entries = Vec::with_capacity(filing.documents.len());
        for doc in &filing.documents {
            let file = format!("{}.{}", doc.sequence, doc.extension());
            std::fs::write(dir.join(&file), &doc.content)?;
            entries.push(ManifestEntry {
                sequence: doc.sequence,
                name: doc.name.clone(),
                kind: doc.kind,
                file,
            });
        }

        let manifest = CacheManifest {
            ticker: filing.ticker.clone(),
            doc_type: filing.doc_type,
            filing_date: filing.filing_date,
            accession: filing.accession.clone(),
            documents: entries,
        };
        std::fs::write(
            dir.join(MANIFEST_FILE),
            serde_json::to_string_pretty(&manifest)?,
        )?;

        info!(
            ticker = filing.ticker,
            doc_type = %filing.doc_type,
            dir = %dir.display(),
            documents = filing.documents.len(),
            "persisted filing to save directory"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tempfile::TempDir;

    struct CountingRegistry {
        calls: AtomicUsize,
    }

    impl CountingRegistry {
        fn new() -> Self {
            Self {
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FilingRegistry for CountingRegistry {
        async fn latest_filing(&self, ticker: &str, doc_type: DocType) -> Result<Filing> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Filing {
                ticker: ticker.to_string(),
                doc_type,
                filing_date: NaiveDate::from_ymd_opt(2023, 1, 1).unwrap(),
                accession: "0000000000-23-000001".to_string(),
                documents: vec![
                    RawDocument {
                        sequence: 0,
                        name: "primary.htm".to_string(),
                        kind: DocumentKind::Primary,
                        content: b"primary body".to_vec(),
                    },
                    RawDocument {
                        sequence: 1,
                        name: "ex99.htm".to_string(),
                        kind: DocumentKind::Exhibit,
                        content: b"exhibit body".to_vec(),
                    },
                ],
            })
        }
    }

    #[tokio::test]
    async fn test_second_fetch_is_served_from_disk() {
        let tmp = TempDir::new().unwrap();
        let registry = Arc::new(CountingRegistry::new());
        let fetcher = FilingFetcher::new(registry.clone(), tmp.path());

        let first = fetcher.fetch("aapl", DocType::TenK).await.unwrap();
        assert_eq!(registry.calls(), 1);

        let second = fetcher.fetch("AAPL", DocType::TenK).await.unwrap();
        assert_eq!(registry.calls(), 1, "cache hit must not touch the registry");

        assert_eq!(first.filing_id(), second.filing_id());
        assert_eq!(first.documents.len(), second.documents.len());
        assert_eq!(second.documents[0].content, b"primary body");
    }

    #[tokio::test]
    async fn test_documents_persisted_under_derived_paths() {
        let tmp = TempDir::new().unwrap();
        let fetcher = FilingFetcher::new(Arc::new(CountingRegistry::new()), tmp.path());

        fetcher.fetch("AAPL", DocType::TenK).await.unwrap();

        let dir = tmp.path().join("AAPL").join("10-K").join("2023-01-01");
        assert!(dir.join("0.htm").is_file());
        assert!(dir.join("1.htm").is_file());
        assert!(dir.join("manifest.json").is_file());
    }

    #[tokio::test]
    async fn test_incomplete_cache_falls_back_to_registry() {
        let tmp = TempDir::new().unwrap();
        let registry = Arc::new(CountingRegistry::new());
        let fetcher = FilingFetcher::new(registry.clone(), tmp.path());

        fetcher.fetch("AAPL", DocType::TenK).await.unwrap();

        // Drop one document; the manifest no longer describes a complete copy.
        let dir = tmp.path().join("AAPL").join("10-K").join("2023-01-01");
        std::fs::remove_file(dir.join("1.htm")).unwrap();

        fetcher.fetch("AAPL", DocType::TenK).await.unwrap();
        assert_eq!(registry.calls(), 2);
    }

    #[tokio::test]
    async fn test_distinct_doc_types_use_distinct_cache_keys() {
        let tmp = TempDir::new().unwrap();
        let registry = Arc::new(CountingRegistry::new());
        let fetcher = FilingFetcher::new(registry.clone(), tmp.path());

        fetcher.fetch("AAPL", DocType::TenK).await.unwrap();
        fetcher.fetch("AAPL", DocType::TenQ).await.unwrap();
        assert_eq!(registry.calls(), 2);
    }
}
