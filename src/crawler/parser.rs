//! Link extractor: the default [`PageProcessor`] implementation
//!
//! A generic processor for crawls that have no site-specific parser: it
//! emits one record per page (URL, title, link count) and discovers every
//! same-host anchor as a child target. Site-specific field extraction
//! belongs in a custom `PageProcessor`, not here.

use crate::crawler::{
    CrawlTarget, FetchedContent, PageProcessor, ProcessError, ProcessOutcome,
};
use async_trait::async_trait;
use scraper::{Html, Selector};
use serde_json::json;
use url::Url;

pub struct LinkExtractor {
    /// Restrict discovered targets to the host of the page they came from
    same_host_only: bool,
}

impl LinkExtractor {
    pub fn new() -> Self {
        Self {
            same_host_only: true,
        }
    }

    pub fn with_any_host(mut self) -> Self {
        self.same_host_only = false;
        self
    }
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PageProcessor for LinkExtractor {
    async fn process(
        &self,
        content: &FetchedContent,
        target: &CrawlTarget,
    ) -> Result<ProcessOutcome, ProcessError> {
        if let Some(ct) = &content.content_type {
            if !ct.contains("text/html") {
                return Err(ProcessError::Parse(format!("expected HTML, got {}", ct)));
            }
        }

        let base = Url::parse(&content.final_url)
            .map_err(|e| ProcessError::Parse(format!("bad base URL: {}", e)))?;

        let (title, links) = extract(&content.body, &base, self.same_host_only);

        let record = json!({
            "url": content.final_url,
            "title": title,
            "kind": target.kind.to_string(),
            "depth": target.depth,
            "links-found": links.len(),
            "fetched-at": chrono::Utc::now().to_rfc3339(),
            "context": serde_json::Value::Object((*target.context).clone()),
        });

        let discovered = links
            .into_iter()
            .map(|url| target.child(url.to_string(), target.kind.clone()))
            .collect();

        Ok(ProcessOutcome {
            records: vec![record],
            discovered,
        })
    }
}

/// Pulls the title and anchor URLs out of an HTML body
///
/// Sync helper so the non-`Send` parsed document never lives across an
/// await point.
fn extract(body: &str, base: &Url, same_host_only: bool) -> (Option<String>, Vec<Url>) {
    let document = Html::parse_document(body);

    let title = Selector::parse("title")
        .ok()
        .and_then(|sel| {
            document
                .select(&sel)
                .next()
                .map(|el| el.text().collect::<String>().trim().to_string())
        })
        .filter(|t| !t.is_empty());

    let mut links = Vec::new();
    if let Ok(anchor) = Selector::parse("a[href]") {
        for element in document.select(&anchor) {
            let Some(href) = element.value().attr("href") else {
                continue;
            };
            let Ok(resolved) = base.join(href) else {
                continue;
            };
            if resolved.scheme() != "http" && resolved.scheme() != "https" {
                continue;
            }
            if same_host_only && resolved.host_str() != base.host_str() {
                continue;
            }
            links.push(resolved);
        }
    }

    (title, links)
}
