// file: src/utils/validation.rs
// description: input validation helpers for CLI arguments and paths

use crate::error::{PipelineError, Result};
use std::path::Path;

pub struct Validator;

impl Validator {
    /// Tickers are 1-10 ASCII alphanumerics, dot or dash allowed (BRK.B, BF-B).
    pub fn validate_ticker(ticker: &str) -> Result<()> {
        let ok = !ticker.is_empty()
            && ticker.len() <= 10
            && ticker
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '.' || c == '-');

        if ok {
            Ok(())
        } else {
            Err(PipelineError::Config(format!(
                "invalid ticker symbol: {:?}",
                ticker
            )))
        }
    }

    /// The save directory must exist or be creatable.
    pub fn ensure_save_dir(path: &Path) -> Result<()> {
        if path.is_dir() {
            return Ok(());
        }
        std::fs::create_dir_all(path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_ticker_validation() {
        assert!(Validator::validate_ticker("AAPL").is_ok());
        assert!(Validator::validate_ticker("BRK.B").is_ok());
        assert!(Validator::validate_ticker("BF-B").is_ok());
        assert!(Validator::validate_ticker("").is_err());
        assert!(Validator::validate_ticker("WAY_TOO_LONG_TICKER").is_err());
        assert!(Validator::validate_ticker("AA PL").is_err());
    }

    #[test]
    fn test_save_dir_created_when_missing() {
        let tmp = TempDir::new().unwrap();
        let nested = tmp.path().join("a").join("b");
        Validator::ensure_save_dir(&nested).unwrap();
        assert!(nested.is_dir());
    }
}
