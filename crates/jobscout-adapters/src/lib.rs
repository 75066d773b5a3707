//! Source adapter contract + the concrete job-board adapters.
//!
//! Each adapter translates one external source into [`Listing`]s filtered by
//! keyword relevance. Fetching and parsing are split so the translation
//! logic is testable against captured payloads without a network.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use jobscout_core::{normalize_salary, Listing};
use jobscout_storage::{FetchError, HttpFetcher};
use rss::Channel;
use scraper::{Html, Selector};
use serde::Deserialize;
use sha2::{Digest, Sha256};
use thiserror::Error;
use tracing::warn;

pub const CRATE_NAME: &str = "jobscout-adapters";

#[derive(Debug, Error)]
pub enum AdapterError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("malformed payload: {0}")]
    Payload(String),
}

impl From<serde_json::Error> for AdapterError {
    fn from(err: serde_json::Error) -> Self {
        AdapterError::Payload(err.to_string())
    }
}

/// Keyword set (and optional location filter) shared by every adapter.
#[derive(Debug, Clone, Default)]
pub struct SearchQuery {
    pub keywords: Vec<String>,
    pub location: Option<String>,
}

/// One external job source. Implementations own their network calls and
/// payload translation; the orchestrator owns failure containment and
/// scheduling policy.
#[async_trait]
pub trait SourceAdapter: Send + Sync {
    fn source_id(&self) -> &'static str;

    async fn fetch(
        &self,
        http: &HttpFetcher,
        query: &SearchQuery,
    ) -> Result<Vec<Listing>, AdapterError>;
}

fn title_matches(title: &str, keywords: &[String]) -> bool {
    let title = title.to_lowercase();
    keywords.iter().any(|k| title.contains(&k.to_lowercase()))
}

fn location_matches(location: &str, filter: &Option<String>) -> bool {
    match filter {
        Some(wanted) => location.to_lowercase().contains(&wanted.to_lowercase()),
        None => true,
    }
}

/// Stable identifier for sources without a native id: hex SHA-256 of the
/// canonical link, truncated to 16 characters. Repeated runs over the same
/// link always produce the same identifier.
fn link_digest(link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(link.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..16].to_string()
}

fn site_origin(url: &str) -> &str {
    match url.find("://") {
        Some(i) => match url[i + 3..].find('/') {
            Some(j) => &url[..i + 3 + j],
            None => url,
        },
        None => url,
    }
}

// ---------------------------------------------------------------------------
// Arbeitnow: one REST call against the public job-board API.
// ---------------------------------------------------------------------------

pub const ARBEITNOW_API_URL: &str = "https://www.arbeitnow.com/api/job-board-api";

#[derive(Debug, Clone, Copy, Default)]
pub struct ArbeitnowAdapter;

#[derive(Debug, Deserialize)]
struct ArbeitnowPage {
    data: Vec<ArbeitnowJob>,
}

#[derive(Debug, Deserialize)]
struct ArbeitnowJob {
    slug: String,
    title: String,
    company_name: String,
    #[serde(default)]
    location: String,
    url: String,
    #[serde(default)]
    description: String,
    #[serde(default)]
    created_at: Option<i64>,
}

pub fn parse_arbeitnow(
    body: &str,
    query: &SearchQuery,
    fetched_on: NaiveDate,
) -> Result<Vec<Listing>, AdapterError> {
    let page: ArbeitnowPage = serde_json::from_str(body)?;
    let mut listings = Vec::new();
    for job in page.data {
        if !title_matches(&job.title, &query.keywords)
            || !location_matches(&job.location, &query.location)
        {
            continue;
        }
        let (min_salary, max_salary) = normalize_salary(&job.description);
        let posted_date = job
            .created_at
            .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
            .map(|dt| dt.date_naive())
            .unwrap_or(fetched_on);
        listings.push(Listing {
            source: "arbeitnow".to_string(),
            external_id: format!("arbeitnow-{}", job.slug),
            title: job.title,
            company: job.company_name,
            location: job.location,
            link: job.url,
            description: job.description,
            posted_date,
            min_salary,
            max_salary,
            fit_rationale: None,
        });
    }
    Ok(listings)
}

#[async_trait]
impl SourceAdapter for ArbeitnowAdapter {
    fn source_id(&self) -> &'static str {
        "arbeitnow"
    }

    async fn fetch(
        &self,
        http: &HttpFetcher,
        query: &SearchQuery,
    ) -> Result<Vec<Listing>, AdapterError> {
        let body = http.fetch_text(self.source_id(), ARBEITNOW_API_URL).await?;
        parse_arbeitnow(&body, query, Utc::now().date_naive())
    }
}

// ---------------------------------------------------------------------------
// Greenhouse: one REST call per configured company board.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct GreenhouseAdapter {
    boards: Vec<String>,
}

impl GreenhouseAdapter {
    pub fn new(boards: Vec<String>) -> Self {
        Self { boards }
    }
}

fn greenhouse_board_url(board: &str) -> String {
    format!("https://boards-api.greenhouse.io/v1/boards/{board}/jobs?content=true")
}

#[derive(Debug, Deserialize)]
struct GreenhousePage {
    jobs: Vec<GreenhouseJob>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseJob {
    id: u64,
    title: String,
    absolute_url: String,
    #[serde(default)]
    location: Option<GreenhouseLocation>,
    #[serde(default)]
    content: String,
    #[serde(default)]
    updated_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GreenhouseLocation {
    name: String,
}

pub fn parse_greenhouse(
    body: &str,
    board: &str,
    query: &SearchQuery,
    fetched_on: NaiveDate,
) -> Result<Vec<Listing>, AdapterError> {
    let page: GreenhousePage = serde_json::from_str(body)?;
    let mut listings = Vec::new();
    for job in page.jobs {
        if !title_matches(&job.title, &query.keywords) {
            continue;
        }
        let (min_salary, max_salary) = normalize_salary(&job.content);
        let posted_date = job
            .updated_at
            .as_deref()
            .and_then(|ts| DateTime::parse_from_rfc3339(ts).ok())
            .map(|dt| dt.date_naive())
            .unwrap_or(fetched_on);
        listings.push(Listing {
            source: "greenhouse".to_string(),
            external_id: format!("greenhouse-{board}-{}", job.id),
            title: job.title,
            company: board.to_string(),
            location: job.location.map(|l| l.name).unwrap_or_default(),
            link: job.absolute_url,
            description: job.content,
            posted_date,
            min_salary,
            max_salary,
            fit_rationale: None,
        });
    }
    Ok(listings)
}

#[async_trait]
impl SourceAdapter for GreenhouseAdapter {
    fn source_id(&self) -> &'static str {
        "greenhouse"
    }

    async fn fetch(
        &self,
        http: &HttpFetcher,
        query: &SearchQuery,
    ) -> Result<Vec<Listing>, AdapterError> {
        let fetched_on = Utc::now().date_naive();
        let mut listings = Vec::new();
        for board in &self.boards {
            let url = greenhouse_board_url(board);
            let body = match http.fetch_text(self.source_id(), &url).await {
                Ok(body) => body,
                Err(error) => {
                    warn!(board = %board, %error, "board fetch failed; skipping");
                    continue;
                }
            };
            match parse_greenhouse(&body, board, query, fetched_on) {
                Ok(parsed) => listings.extend(parsed),
                Err(error) => warn!(board = %board, %error, "board payload unreadable; skipping"),
            }
        }
        Ok(listings)
    }
}

// ---------------------------------------------------------------------------
// We Work Remotely: one RSS fetch per configured category feed.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct WeWorkRemotelyAdapter {
    feeds: Vec<String>,
}

impl WeWorkRemotelyAdapter {
    pub fn new(feeds: Vec<String>) -> Self {
        Self { feeds }
    }
}

pub fn parse_wwr_feed(
    body: &[u8],
    query: &SearchQuery,
    fetched_on: NaiveDate,
) -> Result<Vec<Listing>, AdapterError> {
    let channel = Channel::read_from(body).map_err(|e| AdapterError::Payload(e.to_string()))?;
    let mut listings = Vec::new();
    for item in channel.items() {
        let Some(link) = item.link() else { continue };
        let raw_title = item.title().unwrap_or_default();
        // WWR item titles read "Company: Job Title".
        let (company, title) = match raw_title.split_once(':') {
            Some((company, title)) => (company.trim().to_string(), title.trim().to_string()),
            None => (String::new(), raw_title.trim().to_string()),
        };
        if !title_matches(&title, &query.keywords) {
            continue;
        }
        let description = item.description().unwrap_or_default().to_string();
        let (min_salary, max_salary) = normalize_salary(&description);
        let posted_date = item
            .pub_date()
            .and_then(|d| DateTime::parse_from_rfc2822(d).ok())
            .map(|dt| dt.date_naive())
            .unwrap_or(fetched_on);
        let native = item.guid().map(|g| g.value()).unwrap_or(link);
        listings.push(Listing {
            source: "weworkremotely".to_string(),
            external_id: format!("wwr-{}", link_digest(native)),
            title,
            company,
            location: "Remote".to_string(),
            link: link.to_string(),
            description,
            posted_date,
            min_salary,
            max_salary,
            fit_rationale: None,
        });
    }
    Ok(listings)
}

#[async_trait]
impl SourceAdapter for WeWorkRemotelyAdapter {
    fn source_id(&self) -> &'static str {
        "weworkremotely"
    }

    async fn fetch(
        &self,
        http: &HttpFetcher,
        query: &SearchQuery,
    ) -> Result<Vec<Listing>, AdapterError> {
        let fetched_on = Utc::now().date_naive();
        let mut listings = Vec::new();
        for feed in &self.feeds {
            let body = match http.fetch_bytes(self.source_id(), feed).await {
                Ok(body) => body,
                Err(error) => {
                    warn!(feed = %feed, %error, "feed fetch failed; skipping");
                    continue;
                }
            };
            match parse_wwr_feed(&body, query, fetched_on) {
                Ok(parsed) => listings.extend(parsed),
                Err(error) => warn!(feed = %feed, %error, "feed unreadable; skipping"),
            }
        }
        Ok(listings)
    }
}

// ---------------------------------------------------------------------------
// Built In: HTML scrape of a regional board listing page.
// ---------------------------------------------------------------------------

#[derive(Debug, Clone)]
pub struct BuiltInAdapter {
    listing_url: String,
}

impl BuiltInAdapter {
    pub fn new(listing_url: String) -> Self {
        Self { listing_url }
    }
}

fn selector(css: &str) -> Result<Selector, AdapterError> {
    Selector::parse(css).map_err(|e| AdapterError::Payload(e.to_string()))
}

fn element_text(element: scraper::ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn parse_builtin(
    body: &str,
    listing_url: &str,
    query: &SearchQuery,
    fetched_on: NaiveDate,
) -> Result<Vec<Listing>, AdapterError> {
    let document = Html::parse_document(body);
    let card_sel = selector("div.job-card")?;
    let title_sel = selector("h2 a")?;
    let company_sel = selector(".company-name")?;
    let location_sel = selector(".job-location")?;

    let origin = site_origin(listing_url);
    let mut listings = Vec::new();
    for card in document.select(&card_sel) {
        let Some(anchor) = card.select(&title_sel).next() else {
            continue;
        };
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let title = element_text(anchor);
        let company = card.select(&company_sel).next().map(element_text).unwrap_or_default();
        let location = card.select(&location_sel).next().map(element_text).unwrap_or_default();
        if !title_matches(&title, &query.keywords) || !location_matches(&location, &query.location)
        {
            continue;
        }
        let link = if href.starts_with("http") {
            href.to_string()
        } else {
            format!("{origin}{href}")
        };
        let description = element_text(card);
        let (min_salary, max_salary) = normalize_salary(&description);
        listings.push(Listing {
            source: "builtin".to_string(),
            external_id: format!("builtin-{}", link_digest(&link)),
            title,
            company,
            location,
            link,
            description,
            posted_date: fetched_on,
            min_salary,
            max_salary,
            fit_rationale: None,
        });
    }
    Ok(listings)
}

#[async_trait]
impl SourceAdapter for BuiltInAdapter {
    fn source_id(&self) -> &'static str {
        "builtin"
    }

    async fn fetch(
        &self,
        http: &HttpFetcher,
        query: &SearchQuery,
    ) -> Result<Vec<Listing>, AdapterError> {
        let body = http.fetch_text(self.source_id(), &self.listing_url).await?;
        parse_builtin(&body, &self.listing_url, query, Utc::now().date_naive())
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

/// Per-source settings carried from configuration into adapter construction.
#[derive(Debug, Clone, Default)]
pub struct AdapterSettings {
    pub greenhouse_boards: Vec<String>,
    pub rss_feeds: Vec<String>,
    pub builtin_listing_url: Option<String>,
}

pub fn adapter_for_source(
    source_id: &str,
    settings: &AdapterSettings,
) -> Option<Box<dyn SourceAdapter>> {
    match source_id {
        "arbeitnow" => Some(Box::new(ArbeitnowAdapter)),
        "greenhouse" => Some(Box::new(GreenhouseAdapter::new(
            settings.greenhouse_boards.clone(),
        ))),
        "weworkremotely" => Some(Box::new(WeWorkRemotelyAdapter::new(
            settings.rss_feeds.clone(),
        ))),
        "builtin" => settings
            .builtin_listing_url
            .clone()
            .map(|url| Box::new(BuiltInAdapter::new(url)) as Box<dyn SourceAdapter>),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn query(keywords: &[&str]) -> SearchQuery {
        SearchQuery {
            keywords: keywords.iter().map(ToString::to_string).collect(),
            location: None,
        }
    }

    fn fetched_on() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 3).unwrap()
    }

    const ARBEITNOW_BODY: &str = r#"{
        "data": [
            {
                "slug": "senior-data-analyst-berlin-1234",
                "company_name": "Acme GmbH",
                "title": "Senior Data Analyst",
                "description": "Crunch numbers. Salary: $120,000 - $150,000.",
                "remote": true,
                "url": "https://www.arbeitnow.com/jobs/senior-data-analyst-berlin-1234",
                "tags": ["Data"],
                "job_types": ["full time"],
                "location": "Berlin",
                "created_at": 1785591000
            },
            {
                "slug": "forklift-operator-5678",
                "company_name": "Warehouse Co",
                "title": "Forklift Operator",
                "description": "Move boxes.",
                "remote": false,
                "url": "https://www.arbeitnow.com/jobs/forklift-operator-5678",
                "tags": [],
                "job_types": [],
                "location": "Hamburg",
                "created_at": 1785591000
            }
        ]
    }"#;

    #[test]
    fn arbeitnow_filters_by_keyword_and_extracts_salary() {
        let listings =
            parse_arbeitnow(ARBEITNOW_BODY, &query(&["data analyst"]), fetched_on()).unwrap();
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.external_id, "arbeitnow-senior-data-analyst-berlin-1234");
        assert_eq!(listing.company, "Acme GmbH");
        assert_eq!(listing.min_salary, Some(120_000));
        assert_eq!(listing.max_salary, Some(150_000));
        assert_eq!(listing.posted_date, NaiveDate::from_ymd_opt(2026, 8, 1).unwrap());
    }

    #[test]
    fn arbeitnow_location_filter_applies() {
        let mut q = query(&["data analyst", "forklift"]);
        q.location = Some("berlin".to_string());
        let listings = parse_arbeitnow(ARBEITNOW_BODY, &q, fetched_on()).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].location, "Berlin");
    }

    #[test]
    fn arbeitnow_ids_are_deterministic_across_runs() {
        let first = parse_arbeitnow(ARBEITNOW_BODY, &query(&["data"]), fetched_on()).unwrap();
        let second = parse_arbeitnow(ARBEITNOW_BODY, &query(&["data"]), fetched_on()).unwrap();
        assert_eq!(
            first.iter().map(|l| &l.external_id).collect::<Vec<_>>(),
            second.iter().map(|l| &l.external_id).collect::<Vec<_>>()
        );
    }

    #[test]
    fn arbeitnow_malformed_payload_is_an_error() {
        let result = parse_arbeitnow("{not json", &query(&["data"]), fetched_on());
        assert!(matches!(result, Err(AdapterError::Payload(_))));
    }

    const GREENHOUSE_BODY: &str = r#"{
        "jobs": [
            {
                "id": 4455667788,
                "title": "Data Analyst, Growth",
                "updated_at": "2026-07-30T12:00:00-04:00",
                "location": { "name": "Remote - Americas" },
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/4455667788",
                "content": "You will analyze funnels. Pay range $130k-$160k.",
                "metadata": []
            },
            {
                "id": 99,
                "title": "Office Manager",
                "absolute_url": "https://boards.greenhouse.io/acme/jobs/99",
                "content": "Keep the office running."
            }
        ]
    }"#;

    #[test]
    fn greenhouse_scopes_ids_to_board_and_parses_salary() {
        let listings =
            parse_greenhouse(GREENHOUSE_BODY, "acme", &query(&["Data Analyst"]), fetched_on())
                .unwrap();
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.external_id, "greenhouse-acme-4455667788");
        assert_eq!(listing.company, "acme");
        assert_eq!(listing.location, "Remote - Americas");
        assert_eq!(listing.min_salary, Some(130_000));
        assert_eq!(listing.max_salary, Some(160_000));
        assert_eq!(listing.posted_date, NaiveDate::from_ymd_opt(2026, 7, 30).unwrap());
    }

    #[test]
    fn greenhouse_tolerates_missing_optional_fields() {
        let listings =
            parse_greenhouse(GREENHOUSE_BODY, "acme", &query(&["office"]), fetched_on()).unwrap();
        assert_eq!(listings.len(), 1);
        assert_eq!(listings[0].location, "");
        assert_eq!(listings[0].posted_date, fetched_on());
        assert_eq!(listings[0].min_salary, None);
    }

    const WWR_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0">
  <channel>
    <title>Remote Data Jobs</title>
    <link>https://weworkremotely.com</link>
    <description>feed</description>
    <item>
      <title>Acme Corp: Data Analyst</title>
      <link>https://weworkremotely.com/remote-jobs/acme-corp-data-analyst</link>
      <guid>https://weworkremotely.com/remote-jobs/acme-corp-data-analyst</guid>
      <pubDate>Mon, 03 Aug 2026 09:00:00 +0000</pubDate>
      <description>Own our dashboards. $120k-$140k.</description>
    </item>
    <item>
      <title>Globex: Staff Accountant</title>
      <link>https://weworkremotely.com/remote-jobs/globex-staff-accountant</link>
      <guid>https://weworkremotely.com/remote-jobs/globex-staff-accountant</guid>
      <pubDate>Sun, 02 Aug 2026 09:00:00 +0000</pubDate>
      <description>Close the books.</description>
    </item>
  </channel>
</rss>"#;

    #[test]
    fn wwr_splits_company_from_title_and_filters() {
        let listings =
            parse_wwr_feed(WWR_FEED.as_bytes(), &query(&["data analyst"]), fetched_on()).unwrap();
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.company, "Acme Corp");
        assert_eq!(listing.title, "Data Analyst");
        assert_eq!(listing.min_salary, Some(120_000));
        assert_eq!(listing.posted_date, NaiveDate::from_ymd_opt(2026, 8, 3).unwrap());
        assert!(listing.external_id.starts_with("wwr-"));
    }

    #[test]
    fn wwr_ids_are_stable_for_the_same_guid() {
        let first =
            parse_wwr_feed(WWR_FEED.as_bytes(), &query(&["data analyst"]), fetched_on()).unwrap();
        let second =
            parse_wwr_feed(WWR_FEED.as_bytes(), &query(&["data analyst"]), fetched_on()).unwrap();
        assert_eq!(first[0].external_id, second[0].external_id);
    }

    #[test]
    fn wwr_rejects_non_xml_payloads() {
        let result = parse_wwr_feed(b"<html>down for maintenance</html>", &query(&["x"]), fetched_on());
        assert!(matches!(result, Err(AdapterError::Payload(_))));
    }

    const BUILTIN_BODY: &str = r#"<html><body>
      <div class="job-card">
        <h2><a href="/job/data-analyst-42">Data Analyst</a></h2>
        <div class="company-name">Initech</div>
        <div class="job-location">Austin, TX</div>
        <p>Dashboards and SQL. $45-$60/hr contract.</p>
      </div>
      <div class="job-card">
        <h2><a href="/job/receptionist-7">Receptionist</a></h2>
        <div class="company-name">Initech</div>
        <div class="job-location">Austin, TX</div>
        <p>Front desk.</p>
      </div>
    </body></html>"#;

    #[test]
    fn builtin_scrape_extracts_cards_and_annualizes_hourly_pay() {
        let listings = parse_builtin(
            BUILTIN_BODY,
            "https://builtin.com/jobs?search=data",
            &query(&["data analyst"]),
            fetched_on(),
        )
        .unwrap();
        assert_eq!(listings.len(), 1);
        let listing = &listings[0];
        assert_eq!(listing.link, "https://builtin.com/job/data-analyst-42");
        assert_eq!(listing.company, "Initech");
        assert_eq!(listing.min_salary, Some(93_600));
        assert_eq!(listing.max_salary, Some(124_800));
        assert!(listing.external_id.starts_with("builtin-"));
    }

    #[test]
    fn builtin_location_filter_applies() {
        let mut q = query(&["data analyst", "receptionist"]);
        q.location = Some("austin".to_string());
        let listings = parse_builtin(
            BUILTIN_BODY,
            "https://builtin.com/jobs",
            &q,
            fetched_on(),
        )
        .unwrap();
        assert_eq!(listings.len(), 2);
        q.location = Some("boston".to_string());
        let listings = parse_builtin(
            BUILTIN_BODY,
            "https://builtin.com/jobs",
            &q,
            fetched_on(),
        )
        .unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn registry_resolves_known_sources() {
        let settings = AdapterSettings {
            greenhouse_boards: vec!["acme".to_string()],
            rss_feeds: vec!["https://weworkremotely.com/categories/remote-data-analysis-jobs.rss".to_string()],
            builtin_listing_url: Some("https://builtin.com/jobs".to_string()),
        };
        for source_id in ["arbeitnow", "greenhouse", "weworkremotely", "builtin"] {
            let adapter = adapter_for_source(source_id, &settings).expect("registered adapter");
            assert_eq!(adapter.source_id(), source_id);
        }
        assert!(adapter_for_source("unknown", &settings).is_none());
    }

    #[test]
    fn registry_requires_a_listing_url_for_builtin() {
        let settings = AdapterSettings::default();
        assert!(adapter_for_source("builtin", &settings).is_none());
    }

    #[tokio::test]
    async fn greenhouse_with_no_boards_fetches_nothing() {
        let adapter = GreenhouseAdapter::new(Vec::new());
        let http = jobscout_storage::HttpFetcher::new(jobscout_storage::HttpClientConfig::default())
            .expect("http client");
        let listings = adapter.fetch(&http, &query(&["data"])).await.unwrap();
        assert!(listings.is_empty());
    }

    #[test]
    fn link_digest_is_stable_and_short() {
        let a = link_digest("https://example.com/jobs/1");
        let b = link_digest("https://example.com/jobs/1");
        let c = link_digest("https://example.com/jobs/2");
        assert_eq!(a, b);
        assert_ne!(a, c);
        assert_eq!(a.len(), 16);
    }
}
