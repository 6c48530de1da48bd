//! Breed reference catalog client.
//!
//! # Responsibility
//! - Fetch valid breed names from an external catalog (TheCatAPI shape).
//! - Turn every catalog failure into `BreedLookup::Unavailable`.
//!
//! # Invariants
//! - A lookup never fails the caller's request; the breed check is advisory.
//! - Requests are bounded by the configured timeout.

use log::{debug, warn};
use serde::Deserialize;
use spycat_core::BreedLookup;
use std::time::{Duration, Instant};

pub const DEFAULT_BREED_API_URL: &str = "https://api.thecatapi.com/v1/breeds";
pub const DEFAULT_BREED_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Deserialize)]
struct BreedRecord {
    name: String,
}

/// HTTP client for the remote catalog.
#[derive(Debug, Clone)]
pub struct BreedClient {
    http: reqwest::Client,
    url: String,
}

impl BreedClient {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            url: url.into(),
        })
    }

    async fn fetch_names(&self) -> Result<Vec<String>, reqwest::Error> {
        let records: Vec<BreedRecord> = self
            .http
            .get(&self.url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(records.into_iter().map(|record| record.name).collect())
    }
}

/// Where breed names come from for this process.
#[derive(Debug, Clone)]
pub enum BreedSource {
    /// Breed check switched off.
    Disabled,
    /// Static list, used by tests and offline setups.
    Fixed(Vec<String>),
    Remote(BreedClient),
}

impl BreedSource {
    /// Resolves the catalog for one request.
    pub async fn lookup(&self) -> BreedLookup {
        match self {
            Self::Disabled => BreedLookup::Unavailable,
            Self::Fixed(names) => BreedLookup::Known(names.clone()),
            Self::Remote(client) => {
                let started_at = Instant::now();
                match client.fetch_names().await {
                    Ok(names) => {
                        debug!(
                            "event=breed_lookup module=api status=ok count={} duration_ms={}",
                            names.len(),
                            started_at.elapsed().as_millis()
                        );
                        BreedLookup::Known(names)
                    }
                    Err(err) => {
                        warn!(
                            "event=breed_lookup module=api status=skipped duration_ms={} error={err}",
                            started_at.elapsed().as_millis()
                        );
                        BreedLookup::Unavailable
                    }
                }
            }
        }
    }
}
