use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;
use tracing::{debug, info, warn};

use pubsync_core::{PublicationSource, RawRecord, ScholarConfig, SyncError};

use crate::error::{Result, ScholarError};
use crate::http::ThrottledClient;

const SOURCE_NAME: &str = "google_scholar";

static PUB_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"citation_for_view=[^:&]+:([^&#]+)").expect("valid regex"));
static TRAILING_YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r",\s*(?:1[5-9]|20)\d{2}\s*$").expect("valid regex"));
static YEAR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:1[5-9]|20)\d{2}\b").expect("valid regex"));
static COUNT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid regex"));

/// Captcha elements Scholar serves instead of a page when it rate-limits a client.
const CAPTCHA_SELECTOR: &str = "#gs_captcha_f, #captcha, #gs_captcha_ccl";
/// Only consulted when the expected content is missing; titles may contain it.
const BLOCK_PHRASE: &str = "unusual traffic";

/// Fields from a publication's citation page that refine a listing row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CitationDetails {
    pub authors: Option<String>,
    pub journal: Option<String>,
    pub conference: Option<String>,
    pub book: Option<String>,
    pub source: Option<String>,
    pub pub_year: Option<String>,
    pub citations: Option<String>,
}

impl CitationDetails {
    fn apply_to(self, record: &mut RawRecord) {
        if let Some(authors) = self.authors {
            record.author = Some(authors);
        }
        if let Some(venue) = self.conference.or(self.source) {
            record.venue = Some(venue);
        }
        if let Some(journal) = self.journal {
            record.journal = Some(journal);
        }
        if let Some(book) = self.book {
            record.booktitle = Some(book);
        }
        if let Some(year) = self.pub_year {
            record.pub_year = Some(Value::String(year));
        }
        if let Some(citations) = self.citations {
            record.num_citations = Some(Value::String(citations));
        }
    }
}

/// Scrapes a public Google Scholar author profile.
pub struct GoogleScholarSource {
    client: ThrottledClient,
    base_url: String,
    page_size: u32,
    max_pages: u32,
    fill_details: bool,
}

impl GoogleScholarSource {
    pub fn new(config: &ScholarConfig) -> Result<Self> {
        Ok(Self {
            client: ThrottledClient::new(
                Duration::from_millis(config.min_interval_ms),
                &config.user_agent,
            )?,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            page_size: config.page_size.max(1),
            max_pages: config.max_pages.max(1),
            fill_details: config.fill_details,
        })
    }

    /// Every publication on the profile, in listing order.
    pub async fn fetch_profile(&self, user_id: &str) -> Result<Vec<RawRecord>> {
        let mut records = Vec::new();

        for page in 0..self.max_pages {
            let url = self.list_url(user_id, page_start(page, self.page_size)?)?;
            let html = self.client.get(url.as_str()).await?;
            let rows = parse_profile_page(&html)?;
            let count = rows.len();
            debug!("profile page {page} returned {count} rows");
            records.extend(rows);

            if count < self.page_size as usize {
                break;
            }
            if page + 1 == self.max_pages {
                warn!(
                    "stopped after {} pages; profile may have more publications",
                    self.max_pages
                );
            }
        }

        if self.fill_details {
            self.fill_details(user_id, &mut records).await;
        }

        info!("fetched {} publications for Scholar user {user_id}", records.len());
        Ok(records)
    }

    /// Refine rows from their citation pages. A failed page keeps the listing row.
    async fn fill_details(&self, user_id: &str, records: &mut [RawRecord]) {
        for record in records.iter_mut() {
            let Some(pub_id) = record.author_pub_id.clone() else {
                continue;
            };
            match self.fetch_details(user_id, &pub_id).await {
                Ok(details) => details.apply_to(record),
                Err(e) => warn!("could not fill details for {pub_id}: {e}"),
            }
        }
    }

    async fn fetch_details(&self, user_id: &str, pub_id: &str) -> Result<CitationDetails> {
        let url = self.detail_url(user_id, pub_id)?;
        let html = self.client.get(url.as_str()).await?;
        parse_citation_page(&html)
    }

    fn list_url(&self, user_id: &str, cstart: u32) -> Result<Url> {
        let mut url = self.citations_url()?;
        url.query_pairs_mut()
            .append_pair("user", user_id)
            .append_pair("hl", "en")
            .append_pair("view_op", "list_works")
            .append_pair("sortby", "pubdate")
            .append_pair("cstart", &cstart.to_string())
            .append_pair("pagesize", &self.page_size.to_string());
        Ok(url)
    }

    fn detail_url(&self, user_id: &str, pub_id: &str) -> Result<Url> {
        let mut url = self.citations_url()?;
        url.query_pairs_mut()
            .append_pair("view_op", "view_citation")
            .append_pair("hl", "en")
            .append_pair("user", user_id)
            .append_pair("citation_for_view", &format!("{user_id}:{pub_id}"));
        Ok(url)
    }

    fn citations_url(&self) -> Result<Url> {
        let base = format!("{}/citations", self.base_url);
        Url::parse(&base).map_err(|e| ScholarError::Parse(format!("invalid URL {base}: {e}")))
    }
}

#[async_trait]
impl PublicationSource for GoogleScholarSource {
    fn name(&self) -> &str {
        SOURCE_NAME
    }

    async fn fetch_publications(&self, user_id: &str) -> pubsync_core::Result<Vec<RawRecord>> {
        self.fetch_profile(user_id)
            .await
            .map_err(|e| SyncError::fetch(SOURCE_NAME, e))
    }
}

// ─── Page parsing ─────────────────────────────────────────────────────────────

/// Rows of one profile listing page.
///
/// Fails when the page is a block page or has no publication table at all;
/// an empty table is a valid, empty page.
pub fn parse_profile_page(html: &str) -> Result<Vec<RawRecord>> {
    let table_selector = parse_selector("#gsc_a_b")?;
    let row_selector = parse_selector("tr.gsc_a_tr")?;
    let title_selector = parse_selector("a.gsc_a_at")?;
    let gray_selector = parse_selector("div.gs_gray")?;
    let citations_selector = parse_selector("a.gsc_a_ac")?;
    let year_selector = parse_selector("span.gsc_a_h")?;

    let document = Html::parse_document(html);
    check_not_blocked(&document)?;
    let Some(table) = document.select(&table_selector).next() else {
        return Err(missing_content(html, "profile page has no publication table"));
    };

    let mut records = Vec::new();
    for row in table.select(&row_selector) {
        let Some(title_el) = row.select(&title_selector).next() else {
            continue;
        };
        let title = element_text(&title_el);
        let author_pub_id = title_el
            .value()
            .attr("href")
            .or_else(|| title_el.value().attr("data-href"))
            .and_then(extract_pub_id);

        let mut gray = row.select(&gray_selector).map(|el| element_text(&el));
        let author = gray.next().filter(|s| !s.is_empty());
        let venue = gray
            .next()
            .map(|s| {
                TRAILING_YEAR_RE
                    .replace(&s, "")
                    .trim()
                    .trim_end_matches(',')
                    .trim_end()
                    .to_string()
            })
            .filter(|s| !s.is_empty());

        // An empty citations cell means zero citations, not unknown.
        let citations = row
            .select(&citations_selector)
            .next()
            .map(|el| element_text(&el))
            .map(|s| if s.is_empty() { "0".to_string() } else { s })
            .unwrap_or_else(|| "0".to_string());

        let year = row
            .select(&year_selector)
            .next()
            .map(|el| element_text(&el))
            .filter(|s| !s.is_empty());

        records.push(RawRecord {
            title: Some(title),
            author,
            venue,
            pub_year: year.map(Value::String),
            num_citations: Some(Value::String(citations)),
            author_pub_id,
            ..RawRecord::default()
        });
    }

    Ok(records)
}

/// Labelled fields of a single citation page.
pub fn parse_citation_page(html: &str) -> Result<CitationDetails> {
    let field_row_selector = parse_selector("#gsc_oci_table div.gs_scl")?;
    let label_selector = parse_selector("div.gsc_oci_field")?;
    let value_selector = parse_selector("div.gsc_oci_value")?;

    let document = Html::parse_document(html);
    check_not_blocked(&document)?;
    let mut details = CitationDetails::default();
    let mut seen_any = false;

    for row in document.select(&field_row_selector) {
        let Some(label) = row.select(&label_selector).next().map(|el| element_text(&el)) else {
            continue;
        };
        let Some(value) = row
            .select(&value_selector)
            .next()
            .map(|el| element_text(&el))
            .filter(|v| !v.is_empty())
        else {
            continue;
        };
        seen_any = true;

        match label.to_lowercase().as_str() {
            "authors" | "inventors" => details.authors = Some(value),
            "journal" => details.journal = Some(value),
            "conference" => details.conference = Some(value),
            "book" => details.book = Some(value),
            "source" => details.source = Some(value),
            "publication date" => {
                details.pub_year = YEAR_RE.find(&value).map(|m| m.as_str().to_string());
            }
            "total citations" => {
                details.citations = COUNT_RE.find(&value).map(|m| m.as_str().to_string());
            }
            _ => {}
        }
    }

    if !seen_any {
        return Err(missing_content(html, "citation page has no field table"));
    }
    Ok(details)
}

fn check_not_blocked(document: &Html) -> Result<()> {
    let captcha_selector = parse_selector(CAPTCHA_SELECTOR)?;
    match document.select(&captcha_selector).next() {
        Some(el) => Err(ScholarError::Blocked(format!(
            "page contains captcha element <{}>",
            el.value().name()
        ))),
        None => Ok(()),
    }
}

fn missing_content(html: &str, reason: &str) -> ScholarError {
    if html.to_lowercase().contains(BLOCK_PHRASE) {
        ScholarError::Blocked(format!("{reason}; page mentions {BLOCK_PHRASE:?}"))
    } else {
        ScholarError::Parse(reason.to_string())
    }
}

fn page_start(page: u32, page_size: u32) -> Result<u32> {
    page.checked_mul(page_size).ok_or_else(|| {
        ScholarError::Parse(format!("page {page} of size {page_size} is out of range"))
    })
}

fn extract_pub_id(href: &str) -> Option<String> {
    PUB_ID_RE
        .captures(href)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|id| !id.is_empty())
}

fn parse_selector(input: &str) -> Result<Selector> {
    Selector::parse(input).map_err(|e| ScholarError::Parse(format!("invalid selector {input}: {e}")))
}

fn element_text(element: &ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}
