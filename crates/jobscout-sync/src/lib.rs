//! Batch aggregation pipeline: fetch, dedup, score, persist, notify.

use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use jobscout_adapters::{adapter_for_source, AdapterSettings, SearchQuery, SourceAdapter};
use jobscout_core::{dedup_key, Listing};
use jobscout_storage::{
    HttpClientConfig, HttpFetcher, ListingStore, SqliteStore, StoreError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::task::JoinSet;
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, warn};
use uuid::Uuid;

pub const CRATE_NAME: &str = "jobscout-sync";

pub const DEFAULT_SCORE_THRESHOLD: u8 = 7;
pub const DEFAULT_SCORING_CONCURRENCY: usize = 3;
pub const FUZZY_WINDOW_DAYS: i64 = 7;
pub const SCORE_SCALE_MAX: u8 = 10;
/// Listing text sent to the oracle is bounded to keep request sizes flat.
const LISTING_TEXT_LIMIT: usize = 1500;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Operational knobs, read from the environment once at startup and passed
/// down explicitly.
#[derive(Debug, Clone)]
pub struct ScoutConfig {
    pub db_path: PathBuf,
    pub search_config: PathBuf,
    pub webhook_url: Option<String>,
    pub oracle_api_key: Option<String>,
    pub oracle_base_url: String,
    pub oracle_model: String,
    pub http_timeout_secs: u64,
    pub user_agent: String,
    pub sync_cron: String,
}

impl ScoutConfig {
    pub fn from_env() -> Self {
        Self {
            db_path: std::env::var("JOBSCOUT_DB_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("jobscout.db")),
            search_config: std::env::var("JOBSCOUT_SEARCH_CONFIG")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("search.yaml")),
            webhook_url: std::env::var("JOBSCOUT_WEBHOOK_URL")
                .ok()
                .filter(|v| !v.is_empty()),
            oracle_api_key: std::env::var("JOBSCOUT_ORACLE_API_KEY")
                .ok()
                .filter(|v| !v.is_empty()),
            oracle_base_url: std::env::var("JOBSCOUT_ORACLE_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com/v1".to_string()),
            oracle_model: std::env::var("JOBSCOUT_ORACLE_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            http_timeout_secs: std::env::var("JOBSCOUT_HTTP_TIMEOUT_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(20),
            user_agent: std::env::var("JOBSCOUT_USER_AGENT")
                .unwrap_or_else(|_| "jobscout/0.1".to_string()),
            sync_cron: std::env::var("JOBSCOUT_CRON")
                .unwrap_or_else(|_| "0 0 7 * * *".to_string()),
        }
    }
}

/// The search definition: what to look for, where, and how picky to be.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchConfig {
    pub keywords: Vec<String>,
    #[serde(default)]
    pub location: Option<String>,
    /// Fixed operator profile the oracle compares listings against.
    pub profile: String,
    #[serde(default = "default_score_threshold")]
    pub score_threshold: u8,
    #[serde(default)]
    pub salary_floor: Option<i64>,
    #[serde(default = "default_scoring_concurrency")]
    pub scoring_concurrency: usize,
    #[serde(default)]
    pub greenhouse_boards: Vec<String>,
    #[serde(default)]
    pub rss_feeds: Vec<String>,
    #[serde(default)]
    pub builtin_listing_url: Option<String>,
    pub sources: Vec<SourceToggle>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceToggle {
    pub source_id: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Run this source only every Nth day; used for rate- or cost-limited
    /// upstreams. 1 means every run.
    #[serde(default = "default_run_every_days")]
    pub run_every_days: u32,
}

fn default_true() -> bool {
    true
}

fn default_run_every_days() -> u32 {
    1
}

fn default_score_threshold() -> u8 {
    DEFAULT_SCORE_THRESHOLD
}

fn default_scoring_concurrency() -> usize {
    DEFAULT_SCORING_CONCURRENCY
}

impl SearchConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_yaml(text: &str) -> Result<Self> {
        serde_yaml::from_str(text).context("parsing search configuration")
    }
}

// ---------------------------------------------------------------------------
// Fetch orchestration
// ---------------------------------------------------------------------------

/// Whether the every-Nth-day policy lets a source run today.
fn due_today(run_every_days: u32, today: NaiveDate) -> bool {
    run_every_days <= 1 || today.ordinal() % run_every_days == 0
}

/// Run every adapter concurrently and flatten the results. A failing or
/// slow adapter never empties or blocks the others; its failure degrades to
/// an empty sequence plus a logged diagnostic. No deduplication happens
/// here.
pub async fn fetch_all(
    http: Arc<HttpFetcher>,
    adapters: Vec<Arc<dyn SourceAdapter>>,
    query: SearchQuery,
) -> Vec<Listing> {
    let mut tasks = JoinSet::new();
    for adapter in adapters {
        let http = Arc::clone(&http);
        let query = query.clone();
        tasks.spawn(async move {
            let source_id = adapter.source_id();
            match adapter.fetch(&http, &query).await {
                Ok(listings) => {
                    info!(source_id, count = listings.len(), "source fetched");
                    listings
                }
                Err(error) => {
                    warn!(source_id, %error, "source fetch failed");
                    Vec::new()
                }
            }
        });
    }

    let mut all = Vec::new();
    while let Some(joined) = tasks.join_next().await {
        match joined {
            Ok(listings) => all.extend(listings),
            Err(error) => warn!(%error, "source task panicked"),
        }
    }
    all
}

// ---------------------------------------------------------------------------
// Duplicate detection
// ---------------------------------------------------------------------------

/// Exact-id and fuzzy title+company duplicate checks against the store.
pub struct DedupEngine {
    store: Arc<dyn ListingStore>,
    window_days: i64,
}

impl DedupEngine {
    pub fn new(store: Arc<dyn ListingStore>) -> Self {
        Self {
            store,
            window_days: FUZZY_WINDOW_DAYS,
        }
    }

    /// True when the candidate's `external_id` is already persisted, or a
    /// record inside the trailing window has the same normalized
    /// title+company. Either positive discards the candidate.
    pub async fn is_duplicate(&self, candidate: &Listing) -> Result<bool, StoreError> {
        if self.store.exists(&candidate.external_id).await? {
            return Ok(true);
        }
        let key = dedup_key(&candidate.title, &candidate.company);
        let recent = self.store.recent(self.window_days).await?;
        Ok(recent
            .iter()
            .any(|record| dedup_key(&record.title, &record.company) == key))
    }
}

// ---------------------------------------------------------------------------
// Scoring gate
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FitAssessment {
    pub score: u8,
    pub reason: String,
    #[serde(default)]
    pub highlight: Option<String>,
}

#[derive(Debug, Error)]
pub enum OracleError {
    #[error("oracle request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("oracle returned http {status}: {message}")]
    Api { status: u16, message: String },
    #[error("malformed oracle response: {0}")]
    Malformed(String),
}

/// External text-comparison service rating a listing against the profile.
#[async_trait]
pub trait FitOracle: Send + Sync {
    async fn assess(&self, profile: &str, listing_text: &str)
        -> Result<FitAssessment, OracleError>;
}

const ORACLE_SYSTEM_PROMPT: &str = "You are a job-fit screener. Compare the candidate profile \
with the job listing and respond ONLY with JSON of the shape \
{\"score\": <integer 0-10>, \"reason\": <one sentence>, \"highlight\": <optional best-matching requirement>}.";

/// OpenAI-compatible chat-completions client.
pub struct ChatCompletionsOracle {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl ChatCompletionsOracle {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
        timeout: Duration,
    ) -> Result<Self, OracleError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
            model,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    response_format: ResponseFormat,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: &'static str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: Option<String>,
}

#[async_trait]
impl FitOracle for ChatCompletionsOracle {
    async fn assess(
        &self,
        profile: &str,
        listing_text: &str,
    ) -> Result<FitAssessment, OracleError> {
        let url = format!("{}/chat/completions", self.base_url);
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: ORACLE_SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: format!(
                        "Candidate profile:\n{profile}\n\nJob listing:\n{listing_text}"
                    ),
                },
            ],
            response_format: ResponseFormat {
                format_type: "json_object",
            },
        };

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Malformed(e.to_string()))?;
        let content = parsed
            .choices
            .first()
            .and_then(|choice| choice.message.content.as_deref())
            .ok_or_else(|| OracleError::Malformed("empty completion".to_string()))?;
        serde_json::from_str(content)
            .map_err(|e| OracleError::Malformed(format!("invalid JSON verdict: {e}")))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Verdict {
    Accepted { score: u8, rationale: String },
    Rejected { score: u8 },
}

/// Threshold gate in front of the oracle. Oracle failure is an automatic
/// non-match, never fatal.
pub struct ScoreGate {
    oracle: Arc<dyn FitOracle>,
    profile: String,
    threshold: u8,
}

impl ScoreGate {
    pub fn new(oracle: Arc<dyn FitOracle>, profile: String, threshold: u8) -> Self {
        Self {
            oracle,
            profile,
            threshold,
        }
    }

    pub async fn evaluate(&self, listing: &Listing) -> Verdict {
        let text = listing_text(listing);
        match self.oracle.assess(&self.profile, &text).await {
            Ok(assessment) => {
                let score = assessment.score.min(SCORE_SCALE_MAX);
                if score >= self.threshold {
                    Verdict::Accepted {
                        score,
                        rationale: assessment.reason,
                    }
                } else {
                    Verdict::Rejected { score }
                }
            }
            Err(error) => {
                warn!(
                    external_id = %listing.external_id,
                    %error,
                    "oracle call failed; scoring as non-match"
                );
                Verdict::Rejected { score: 0 }
            }
        }
    }
}

fn listing_text(listing: &Listing) -> String {
    let mut text = format!(
        "{} at {} ({})\n{}",
        listing.title, listing.company, listing.location, listing.description
    );
    if text.len() > LISTING_TEXT_LIMIT {
        let mut cut = LISTING_TEXT_LIMIT;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
    }
    text
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("webhook request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("webhook returned http {0}")]
    HttpStatus(u16),
}

/// One-way, fire-and-forget delivery of accepted listings.
#[async_trait]
pub trait Notifier: Send + Sync {
    async fn notify(&self, listing: &Listing, score: u8) -> Result<(), NotifyError>;
}

pub struct WebhookNotifier {
    client: reqwest::Client,
    url: String,
}

impl WebhookNotifier {
    pub fn new(url: String, timeout: Duration) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self { client, url })
    }
}

#[async_trait]
impl Notifier for WebhookNotifier {
    async fn notify(&self, listing: &Listing, score: u8) -> Result<(), NotifyError> {
        let payload = serde_json::json!({
            "content": format!("🎯 **New {} role found!**", listing.title),
            "embeds": [{
                "title": format!("{} is hiring", listing.company),
                "description": format!(
                    "📍 **Location:** {}\n⭐ **Fit:** {}/10 — {}\n🔗 [Apply here]({})",
                    listing.location,
                    score,
                    listing.fit_rationale.as_deref().unwrap_or(""),
                    listing.link
                ),
                "footer": { "text": format!("{} · {}", listing.source, listing.external_id) }
            }],
        });
        let response = self.client.post(&self.url).json(&payload).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus(status.as_u16()));
        }
        Ok(())
    }
}

/// Used when no webhook is configured.
pub struct NullNotifier;

#[async_trait]
impl Notifier for NullNotifier {
    async fn notify(&self, _listing: &Listing, _score: u8) -> Result<(), NotifyError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Run controller
// ---------------------------------------------------------------------------

/// Linear batch phases; a run never revisits an earlier phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Idle,
    Fetching,
    Filtering,
    Scoring,
    Done,
}

fn enter_phase(run_id: Uuid, phase: RunPhase) {
    info!(%run_id, ?phase, "entering phase");
}

#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub sources_run: usize,
    pub sources_skipped: usize,
    pub fetched: usize,
    pub duplicates: usize,
    pub below_floor: usize,
    pub scored: usize,
    /// Net-new accepted listings actually inserted this run.
    pub accepted: usize,
}

fn below_salary_floor(listing: &Listing, floor: Option<i64>) -> bool {
    let Some(floor) = floor else {
        return false;
    };
    match listing.max_salary.or(listing.min_salary) {
        Some(best) => best < floor,
        None => false,
    }
}

pub struct ScoutPipeline {
    search: SearchConfig,
    http: Arc<HttpFetcher>,
    store: Arc<dyn ListingStore>,
    oracle: Arc<dyn FitOracle>,
    notifier: Arc<dyn Notifier>,
    adapters: Option<Vec<Arc<dyn SourceAdapter>>>,
}

impl ScoutPipeline {
    pub fn new(
        search: SearchConfig,
        http: Arc<HttpFetcher>,
        store: Arc<dyn ListingStore>,
        oracle: Arc<dyn FitOracle>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            search,
            http,
            store,
            oracle,
            notifier,
            adapters: None,
        }
    }

    /// Replace the configured adapter set; used by tests and dry runs.
    pub fn with_adapters(mut self, adapters: Vec<Arc<dyn SourceAdapter>>) -> Self {
        self.adapters = Some(adapters);
        self
    }

    fn resolve_adapters(&self, today: NaiveDate) -> (Vec<Arc<dyn SourceAdapter>>, usize) {
        if let Some(adapters) = &self.adapters {
            return (adapters.clone(), 0);
        }
        let settings = AdapterSettings {
            greenhouse_boards: self.search.greenhouse_boards.clone(),
            rss_feeds: self.search.rss_feeds.clone(),
            builtin_listing_url: self.search.builtin_listing_url.clone(),
        };
        let mut adapters = Vec::new();
        let mut skipped = 0usize;
        for source in &self.search.sources {
            if !source.enabled {
                continue;
            }
            if !due_today(source.run_every_days, today) {
                info!(source_id = %source.source_id, "source not due today; skipping");
                skipped += 1;
                continue;
            }
            match adapter_for_source(&source.source_id, &settings) {
                Some(adapter) => adapters.push(Arc::from(adapter)),
                None => warn!(source_id = %source.source_id, "no adapter registered"),
            }
        }
        (adapters, skipped)
    }

    /// One batch pass. Adapter and oracle failures are contained; a store
    /// failure aborts the run.
    pub async fn run_once(&self) -> Result<RunSummary> {
        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        enter_phase(run_id, RunPhase::Idle);

        enter_phase(run_id, RunPhase::Fetching);
        let query = SearchQuery {
            keywords: self.search.keywords.clone(),
            location: self.search.location.clone(),
        };
        let (adapters, sources_skipped) = self.resolve_adapters(started_at.date_naive());
        let sources_run = adapters.len();
        let candidates = fetch_all(Arc::clone(&self.http), adapters, query).await;
        let fetched = candidates.len();

        enter_phase(run_id, RunPhase::Filtering);
        let dedup = DedupEngine::new(Arc::clone(&self.store));
        let mut pending = VecDeque::new();
        let mut duplicates = 0usize;
        let mut below_floor = 0usize;
        for candidate in candidates {
            if dedup.is_duplicate(&candidate).await? {
                duplicates += 1;
                continue;
            }
            if below_salary_floor(&candidate, self.search.salary_floor) {
                below_floor += 1;
                continue;
            }
            pending.push_back(candidate);
        }
        let scored = pending.len();

        enter_phase(run_id, RunPhase::Scoring);
        let gate = Arc::new(ScoreGate::new(
            Arc::clone(&self.oracle),
            self.search.profile.clone(),
            self.search.score_threshold,
        ));
        let pending = Arc::new(Mutex::new(pending));
        let accepted = Arc::new(AtomicUsize::new(0));
        let mut workers = JoinSet::new();
        for _ in 0..self.search.scoring_concurrency.max(1) {
            let pending = Arc::clone(&pending);
            let gate = Arc::clone(&gate);
            let store = Arc::clone(&self.store);
            let notifier = Arc::clone(&self.notifier);
            let accepted = Arc::clone(&accepted);
            workers.spawn(async move {
                loop {
                    let next = pending.lock().expect("pending queue lock poisoned").pop_front();
                    let Some(mut listing) = next else {
                        break;
                    };
                    match gate.evaluate(&listing).await {
                        Verdict::Accepted { score, rationale } => {
                            listing.fit_rationale = Some(rationale);
                            let inserted = store.insert(&listing).await?;
                            if inserted {
                                accepted.fetch_add(1, Ordering::Relaxed);
                                if let Err(error) = notifier.notify(&listing, score).await {
                                    warn!(
                                        external_id = %listing.external_id,
                                        %error,
                                        "notification failed"
                                    );
                                }
                            }
                        }
                        Verdict::Rejected { score } => {
                            debug!(
                                external_id = %listing.external_id,
                                score,
                                "candidate below threshold"
                            );
                        }
                    }
                }
                Ok::<(), StoreError>(())
            });
        }
        while let Some(joined) = workers.join_next().await {
            joined.context("scoring worker panicked")??;
        }

        enter_phase(run_id, RunPhase::Done);
        let accepted = accepted.load(Ordering::Relaxed);
        let finished_at = Utc::now();
        info!(
            %run_id,
            fetched,
            duplicates,
            below_floor,
            scored,
            accepted,
            "run complete"
        );

        Ok(RunSummary {
            run_id,
            started_at,
            finished_at,
            sources_run,
            sources_skipped,
            fetched,
            duplicates,
            below_floor,
            scored,
            accepted,
        })
    }
}

// ---------------------------------------------------------------------------
// Wiring
// ---------------------------------------------------------------------------

pub async fn build_pipeline(config: &ScoutConfig) -> Result<ScoutPipeline> {
    let search = SearchConfig::load(&config.search_config)?;
    let timeout = Duration::from_secs(config.http_timeout_secs);

    let http = Arc::new(HttpFetcher::new(HttpClientConfig {
        timeout,
        user_agent: Some(config.user_agent.clone()),
        ..Default::default()
    })?);

    let store: Arc<dyn ListingStore> = Arc::new(SqliteStore::open(&config.db_path).await?);

    if config.oracle_api_key.is_none() {
        warn!("no oracle api key configured; every candidate will score 0");
    }
    let oracle: Arc<dyn FitOracle> = Arc::new(ChatCompletionsOracle::new(
        config.oracle_api_key.clone().unwrap_or_default(),
        config.oracle_model.clone(),
        config.oracle_base_url.clone(),
        timeout,
    )?);

    let notifier: Arc<dyn Notifier> = match &config.webhook_url {
        Some(url) => Arc::new(WebhookNotifier::new(url.clone(), timeout)?),
        None => {
            info!("no webhook configured; notifications disabled");
            Arc::new(NullNotifier)
        }
    };

    Ok(ScoutPipeline::new(search, http, store, oracle, notifier))
}

pub async fn run_once_from_config(config: &ScoutConfig) -> Result<RunSummary> {
    let pipeline = build_pipeline(config).await?;
    pipeline.run_once().await
}

pub async fn run_once_from_env() -> Result<RunSummary> {
    let config = ScoutConfig::from_env();
    run_once_from_config(&config).await
}

/// Run batches on the configured cron schedule until ctrl-c.
pub async fn run_scheduler(config: ScoutConfig) -> Result<()> {
    let config = Arc::new(config);
    let sched = JobScheduler::new().await.context("creating scheduler")?;

    let cron = config.sync_cron.clone();
    let job_config = Arc::clone(&config);
    let job = Job::new_async(cron.as_str(), move |_id, _lock| {
        let config = Arc::clone(&job_config);
        Box::pin(async move {
            match run_once_from_config(&config).await {
                Ok(summary) => info!(
                    run_id = %summary.run_id,
                    accepted = summary.accepted,
                    "scheduled run complete"
                ),
                Err(error) => warn!(%error, "scheduled run failed"),
            }
        })
    })
    .with_context(|| format!("creating scheduler job for cron {cron}"))?;
    sched.add(job).await.context("adding scheduler job")?;
    sched.start().await.context("starting scheduler")?;

    info!(cron = %config.sync_cron, "scheduler running; ctrl-c to stop");
    tokio::signal::ctrl_c().await.context("waiting for ctrl-c")?;
    Ok(())
}
