//! Listing persistence boundary + shared HTTP fetch utilities.

use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use chrono::{Duration as ChronoDuration, NaiveDate, Utc};
use jobscout_core::Listing;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::{Row, SqlitePool};
use thiserror::Error;
use tokio::sync::Semaphore;
use tracing::info_span;

pub const CRATE_NAME: &str = "jobscout-storage";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Projection used by the fuzzy duplicate check.
#[derive(Debug, Clone, PartialEq)]
pub struct RecentListing {
    pub title: String,
    pub company: String,
    pub posted_date: NaiveDate,
}

/// A persisted listing plus its externally-owned `applied` flag.
#[derive(Debug, Clone, PartialEq)]
pub struct StoredListing {
    pub listing: Listing,
    pub applied: bool,
}

/// The persistence boundary. Accepted listings are append-only: the first
/// record seen for an `external_id` wins, later inserts are silently
/// dropped. Implementations must be safe under concurrent callers.
#[async_trait]
pub trait ListingStore: Send + Sync {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError>;

    /// Listings with a `posted_date` inside the trailing window, for the
    /// fuzzy duplicate check.
    async fn recent(&self, window_days: i64) -> Result<Vec<RecentListing>, StoreError>;

    /// Insert-or-ignore on `external_id` conflict. Returns true when the
    /// row was actually inserted.
    async fn insert(&self, listing: &Listing) -> Result<bool, StoreError>;

    /// Mutated only by an external collaborator (the `mark-applied` CLI
    /// action), never by the pipeline. Returns true when a row matched.
    async fn mark_applied(&self, external_id: &str) -> Result<bool, StoreError>;
}

/// SQLite-backed [`ListingStore`].
#[derive(Debug, Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn open(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let options = SqliteConnectOptions::new()
            .filename(path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .with_context(|| format!("opening listing database {}", path.display()))?;
        let store = Self { pool };
        store.ensure_schema().await.context("creating listings table")?;
        Ok(store)
    }

    pub async fn open_in_memory() -> anyhow::Result<Self> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect("sqlite::memory:")
            .await
            .context("opening in-memory listing database")?;
        let store = Self { pool };
        store.ensure_schema().await.context("creating listings table")?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<(), StoreError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS listings (
                external_id TEXT PRIMARY KEY,
                source TEXT NOT NULL,
                title TEXT NOT NULL,
                company TEXT NOT NULL,
                location TEXT NOT NULL,
                link TEXT NOT NULL,
                description TEXT NOT NULL,
                posted_date TEXT NOT NULL,
                min_salary INTEGER,
                max_salary INTEGER,
                fit_rationale TEXT,
                applied INTEGER NOT NULL DEFAULT 0
            )",
        )
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    pub async fn get(&self, external_id: &str) -> Result<Option<StoredListing>, StoreError> {
        let row = sqlx::query(
            "SELECT source, title, company, location, link, description, posted_date,
                    min_salary, max_salary, fit_rationale, applied
             FROM listings WHERE external_id = ?",
        )
        .bind(external_id)
        .fetch_optional(&self.pool)
        .await?;
        row.map(|row| {
            Ok(StoredListing {
                listing: Listing {
                    source: row.try_get("source")?,
                    external_id: external_id.to_string(),
                    title: row.try_get("title")?,
                    company: row.try_get("company")?,
                    location: row.try_get("location")?,
                    link: row.try_get("link")?,
                    description: row.try_get("description")?,
                    posted_date: row.try_get("posted_date")?,
                    min_salary: row.try_get("min_salary")?,
                    max_salary: row.try_get("max_salary")?,
                    fit_rationale: row.try_get("fit_rationale")?,
                },
                applied: row.try_get("applied")?,
            })
        })
        .transpose()
    }
}

#[async_trait]
impl ListingStore for SqliteStore {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError> {
        let row = sqlx::query("SELECT 1 FROM listings WHERE external_id = ?")
            .bind(external_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(row.is_some())
    }

    async fn recent(&self, window_days: i64) -> Result<Vec<RecentListing>, StoreError> {
        let cutoff = Utc::now().date_naive() - ChronoDuration::days(window_days);
        let rows = sqlx::query(
            "SELECT title, company, posted_date FROM listings WHERE posted_date >= ?",
        )
        .bind(cutoff)
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter()
            .map(|row| {
                Ok(RecentListing {
                    title: row.try_get("title")?,
                    company: row.try_get("company")?,
                    posted_date: row.try_get("posted_date")?,
                })
            })
            .collect()
    }

    async fn insert(&self, listing: &Listing) -> Result<bool, StoreError> {
        let result = sqlx::query(
            "INSERT OR IGNORE INTO listings
                (external_id, source, title, company, location, link, description,
                 posted_date, min_salary, max_salary, fit_rationale, applied)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
        )
        .bind(&listing.external_id)
        .bind(&listing.source)
        .bind(&listing.title)
        .bind(&listing.company)
        .bind(&listing.location)
        .bind(&listing.link)
        .bind(&listing.description)
        .bind(listing.posted_date)
        .bind(listing.min_salary)
        .bind(listing.max_salary)
        .bind(listing.fit_rationale.as_deref())
        .execute(&self.pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn mark_applied(&self, external_id: &str) -> Result<bool, StoreError> {
        let result = sqlx::query("UPDATE listings SET applied = 1 WHERE external_id = ?")
            .bind(external_id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}

/// In-memory [`ListingStore`] mirroring the SQLite first-writer-wins
/// contract. Used by tests and dry runs.
#[derive(Debug, Default)]
pub struct MemoryStore {
    rows: Mutex<Vec<StoredListing>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, external_id: &str) -> Option<StoredListing> {
        self.rows
            .lock()
            .expect("listing rows lock poisoned")
            .iter()
            .find(|row| row.listing.external_id == external_id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.rows.lock().expect("listing rows lock poisoned").len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ListingStore for MemoryStore {
    async fn exists(&self, external_id: &str) -> Result<bool, StoreError> {
        Ok(self
            .rows
            .lock()
            .expect("listing rows lock poisoned")
            .iter()
            .any(|row| row.listing.external_id == external_id))
    }

    async fn recent(&self, window_days: i64) -> Result<Vec<RecentListing>, StoreError> {
        let cutoff = Utc::now().date_naive() - ChronoDuration::days(window_days);
        Ok(self
            .rows
            .lock()
            .expect("listing rows lock poisoned")
            .iter()
            .filter(|row| row.listing.posted_date >= cutoff)
            .map(|row| RecentListing {
                title: row.listing.title.clone(),
                company: row.listing.company.clone(),
                posted_date: row.listing.posted_date,
            })
            .collect())
    }

    async fn insert(&self, listing: &Listing) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().expect("listing rows lock poisoned");
        if rows
            .iter()
            .any(|row| row.listing.external_id == listing.external_id)
        {
            return Ok(false);
        }
        rows.push(StoredListing {
            listing: listing.clone(),
            applied: false,
        });
        Ok(true)
    }

    async fn mark_applied(&self, external_id: &str) -> Result<bool, StoreError> {
        let mut rows = self.rows.lock().expect("listing rows lock poisoned");
        match rows
            .iter_mut()
            .find(|row| row.listing.external_id == external_id)
        {
            Some(row) => {
                row.applied = true;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    pub timeout: Duration,
    pub user_agent: Option<String>,
    pub concurrency: usize,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            user_agent: None,
            concurrency: 16,
        }
    }
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("http status {status} for {url}")]
    HttpStatus { status: u16, url: String },
}

/// Shared outbound HTTP client. Every call carries the configured timeout
/// and counts against one global concurrency limit.
#[derive(Debug)]
pub struct HttpFetcher {
    client: reqwest::Client,
    limit: Arc<Semaphore>,
}

impl HttpFetcher {
    pub fn new(config: HttpClientConfig) -> anyhow::Result<Self> {
        let mut builder = reqwest::Client::builder()
            .gzip(true)
            .brotli(true)
            .timeout(config.timeout);

        if let Some(user_agent) = &config.user_agent {
            builder = builder.user_agent(user_agent.clone());
        }

        let client = builder.build().context("building reqwest client")?;
        Ok(Self {
            client,
            limit: Arc::new(Semaphore::new(config.concurrency.max(1))),
        })
    }

    pub async fn fetch_text(&self, source_id: &str, url: &str) -> Result<String, FetchError> {
        let _permit = self.limit.acquire().await.expect("semaphore not closed");
        let span = info_span!("http_fetch", source_id, url);
        let _guard = span.enter();

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response.text().await?)
    }

    pub async fn fetch_bytes(&self, source_id: &str, url: &str) -> Result<Vec<u8>, FetchError> {
        let _permit = self.limit.acquire().await.expect("semaphore not closed");
        let span = info_span!("http_fetch", source_id, url);
        let _guard = span.enter();

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::HttpStatus {
                status: status.as_u16(),
                url: response.url().to_string(),
            });
        }
        Ok(response.bytes().await?.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample_listing(external_id: &str, title: &str, days_ago: i64) -> Listing {
        Listing {
            source: "test".to_string(),
            external_id: external_id.to_string(),
            title: title.to_string(),
            company: "Acme".to_string(),
            location: "Remote".to_string(),
            link: format!("https://example.com/{external_id}"),
            description: "desc".to_string(),
            posted_date: Utc::now().date_naive() - ChronoDuration::days(days_ago),
            min_salary: Some(100_000),
            max_salary: Some(120_000),
            fit_rationale: None,
        }
    }

    #[tokio::test]
    async fn insert_or_ignore_keeps_first_writer() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        let first = sample_listing("a-1", "Data Analyst", 0);
        let mut second = sample_listing("a-1", "Completely Different Title", 0);
        second.min_salary = Some(1);

        assert!(store.insert(&first).await.unwrap());
        assert!(!store.insert(&second).await.unwrap());

        let stored = store.get("a-1").await.unwrap().unwrap();
        assert_eq!(stored.listing.title, "Data Analyst");
        assert_eq!(stored.listing.min_salary, Some(100_000));
    }

    #[tokio::test]
    async fn exists_reflects_inserted_rows() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        assert!(!store.exists("a-1").await.unwrap());
        store.insert(&sample_listing("a-1", "Data Analyst", 0)).await.unwrap();
        assert!(store.exists("a-1").await.unwrap());
        assert!(!store.exists("a-2").await.unwrap());
    }

    #[tokio::test]
    async fn recent_window_excludes_old_rows() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.insert(&sample_listing("a-1", "Fresh Role", 2)).await.unwrap();
        store.insert(&sample_listing("a-2", "Stale Role", 8)).await.unwrap();

        let recent = store.recent(7).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].title, "Fresh Role");
    }

    #[tokio::test]
    async fn mark_applied_flips_flag_once() {
        let store = SqliteStore::open_in_memory().await.unwrap();
        store.insert(&sample_listing("a-1", "Data Analyst", 0)).await.unwrap();

        assert!(store.mark_applied("a-1").await.unwrap());
        assert!(store.get("a-1").await.unwrap().unwrap().applied);
        assert!(!store.mark_applied("missing").await.unwrap());
    }

    #[tokio::test]
    async fn file_backed_store_survives_reopen() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("listings.db");

        {
            let store = SqliteStore::open(&path).await.unwrap();
            store.insert(&sample_listing("a-1", "Data Analyst", 0)).await.unwrap();
        }

        let reopened = SqliteStore::open(&path).await.unwrap();
        assert!(reopened.exists("a-1").await.unwrap());
    }

    #[tokio::test]
    async fn memory_store_mirrors_first_writer_wins() {
        let store = MemoryStore::new();
        let first = sample_listing("a-1", "Data Analyst", 0);
        let second = sample_listing("a-1", "Other Title", 0);

        assert!(store.insert(&first).await.unwrap());
        assert!(!store.insert(&second).await.unwrap());
        assert_eq!(store.len(), 1);
        assert_eq!(store.get("a-1").unwrap().listing.title, "Data Analyst");

        let recent = store.recent(7).await.unwrap();
        assert_eq!(recent.len(), 1);
    }
}
