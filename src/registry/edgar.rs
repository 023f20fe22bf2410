// file: src/registry/edgar.rs
// description: SEC EDGAR registry client for filing manifests and documents
// reference: https://www.sec.gov/os/accessing-edgar-data

use crate::config::EdgarConfig;
use crate::error::{PipelineError, Result};
use crate::models::{DocType, DocumentKind, Filing, RawDocument};
use crate::registry::FilingRegistry;
use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;
use tracing::{debug, info, warn};

const TICKERS_URL: &str = "https://www.sec.gov/files/company_tickers.json";
const SUBMISSIONS_BASE: &str = "https://data.sec.gov/submissions";
const ARCHIVES_BASE: &str = "https://www.sec.gov/Archives/edgar/data";

/// Registry client against SEC EDGAR.
///
/// EDGAR rejects requests without a declared User-Agent identity, so the
/// configured company and email ride on every request.
pub struct EdgarRegistry {
    client: Client,
}

#[derive(Debug, Deserialize)]
struct TickerEntry {
    cik_str: u64,
    ticker: String,
}

#[derive(Debug, Deserialize)]
struct Submissions {
    filings: SubmissionFilings,
}

#[derive(Debug, Deserialize)]
struct SubmissionFilings {
    recent: RecentFilings,
}

/// EDGAR's column-oriented recent-filings table.
#[derive(Debug, Deserialize)]
struct RecentFilings {
    #[serde(rename = "accessionNumber")]
    accession_number: Vec<String>,
    #[serde(rename = "filingDate")]
    filing_date: Vec<String>,
    form: Vec<String>,
    #[serde(rename = "primaryDocument")]
    primary_document: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct ArchiveIndex {
    directory: ArchiveDirectory,
}

#[derive(Debug, Deserialize)]
struct ArchiveDirectory {
    item: Vec<ArchiveItem>,
}

#[derive(Debug, Deserialize)]
struct ArchiveItem {
    name: String,
}

impl EdgarRegistry {
    pub fn new(config: &EdgarConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| PipelineError::RegistryUnavailable(e.to_string()))?;
        Ok(Self { client })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!(url, "GET json");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::RegistryUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::RegistryUnavailable(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| PipelineError::RegistryUnavailable(e.to_string()))
    }

    async fn get_bytes(&self, url: &str) -> Result<Vec<u8>> {
        debug!(url, "GET bytes");
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| PipelineError::RegistryUnavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(PipelineError::RegistryUnavailable(format!(
                "{} returned {}",
                url,
                response.status()
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| PipelineError::RegistryUnavailable(e.to_string()))?;
        Ok(bytes.to_vec())
    }

    async fn lookup_cik(&self, ticker: &str) -> Result<u64> {
        let table: HashMap<String, TickerEntry> = self.get_json(TICKERS_URL).await?;
        table
            .values()
            .find(|entry| entry.ticker.eq_ignore_ascii_case(ticker))
            .map(|entry| entry.cik_str)
            .ok_or_else(|| PipelineError::NotFound {
                ticker: ticker.to_string(),
                doc_type: DocType::TenK,
            })
    }

    fn select_latest(
        recent: &RecentFilings,
        ticker: &str,
        doc_type: DocType,
    ) -> Result<(String, NaiveDate, String)> {
        // Rows are newest-first; the first row matching the form wins.
        for (i, form) in recent.form.iter().enumerate() {
            if form != doc_type.as_str() {
                continue;
            }
            let accession = recent
                .accession_number
                .get(i)
                .cloned()
                .unwrap_or_default();
            let primary = recent.primary_document.get(i).cloned().unwrap_or_default();
            let date = recent
                .filing_date
                .get(i)
                .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                .ok_or_else(|| {
                    PipelineError::RegistryUnavailable(format!(
                        "malformed filing date for accession {}",
                        accession
                    ))
                })?;
            return Ok((accession, date, primary));
        }

        Err(PipelineError::NotFound {
            ticker: ticker.to_string(),
            doc_type,
        })
    }

    fn is_document_file(name: &str) -> bool {
        let lower = name.to_ascii_lowercase();
        lower.ends_with(".htm") || lower.ends_with(".html") || lower.ends_with(".txt")
    }

    async fn download_documents(
        &self,
        cik: u64,
        accession: &str,
        primary: &str,
    ) -> Result<Vec<RawDocument>> {
        let accession_flat = accession.replace('-', "");
        let base = format!("{}/{}/{}", ARCHIVES_BASE, cik, accession_flat);

        let index: ArchiveIndex = self.get_json(&format!("{}/index.json", base)).await?;

        let mut names: Vec<String> = index
            .directory
            .item
            .into_iter()
            .map(|item| item.name)
            .filter(|name| Self::is_document_file(name))
            .collect();
        names.sort();

        // The primary document always leads the sequence.
        if let Some(pos) = names.iter().position(|name| name == primary) {
            let primary_name = names.remove(pos);
            names.insert(0, primary_name);
        } else {
            warn!(primary, "primary document missing from archive index");
        }

        let mut documents = Vec::with_capacity(names.len());
        for (sequence, name) in names.into_iter().enumerate() {
            let content = self.get_bytes(&format!("{}/{}", base, name)).await?;
            let kind = if name == primary {
                DocumentKind::Primary
            } else {
                DocumentKind::Exhibit
            };
            documents.push(RawDocument {
                sequence,
                name,
                kind,
                content,
            });
        }

        Ok(documents)
    }
}

#[async_trait]
impl FilingRegistry for EdgarRegistry {
    async fn latest_filing(&self, ticker: &str, doc_type: DocType) -> Result<Filing> {
        let ticker = ticker.to_ascii_uppercase();

        let cik = self.lookup_cik(&ticker).await.map_err(|e| match e {
            PipelineError::NotFound { ticker, .. } => PipelineError::NotFound { ticker, doc_type },
            other => other,
        })?;
        debug!(ticker, cik, "resolved CIK");

        let submissions: Submissions = self
            .get_json(&format!("{}/CIK{:010}.json", SUBMISSIONS_BASE, cik))
            .await?;

        let (accession, filing_date, primary) =
            Self::select_latest(&submissions.filings.recent, &ticker, doc_type)?;
        info!(
            ticker,
            %doc_type,
            accession,
            %filing_date,
            "selected most recent filing"
        );

        let documents = self.download_documents(cik, &accession, &primary).await?;
        if documents.is_empty() {
            return Err(PipelineError::EmptyFiling(format!(
                "{}|{}|{}",
                ticker, doc_type, filing_date
            )));
        }

        Ok(Filing {
            ticker,
            doc_type,
            filing_date,
            accession,
            documents,
        })
    }
}
