//! Best-effort full-text enrichment by scraping article links.
//!
//! The metadata API's free tier never includes article bodies, so enrichment
//! fetches each article's canonical URL and extracts readable text from the
//! page. Every part of this is best-effort: a timeout, a blocked request, or
//! a page with no extractable text just leaves that one article with
//! `content_available = false`. One article's failure never touches its
//! neighbors, and nothing here can fail the run.
//!
//! # Architecture
//!
//! Fetching goes through the [`ContentFetcher`] trait so tests can inject
//! failures deterministically:
//! - [`HttpContentFetcher`]: the real reqwest-based fetcher
//! - [`Enricher`]: drives a batch in order, with pacing between attempts
//!
//! # Extraction policy
//!
//! Ordered preference over content containers: `<article>`, else `<main>`,
//! else `<body>`. The chosen container is flattened to text (script, style,
//! and noscript blocks removed first, then all tags), blank runs collapsed,
//! and the result truncated to the configured cap.
//!
//! # Pacing
//!
//! Enrichment targets arbitrary third-party sites with a stricter
//! anti-scraping posture than the metadata source, so its delay is
//! independent of (and typically longer than) the pager's.

use crate::models::Article;
use crate::utils::{collapse_blank_lines, decode_entities, strip_tags, truncate_chars};
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use std::error::Error;
use std::time::Duration;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

const SCRAPE_TIMEOUT: Duration = Duration::from_secs(5);
/// Plain requests get blocked outright by some outlets; a browser UA is
/// enough for the text-friendly ones.
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

static CONTAINER_SELECTORS: Lazy<Vec<Selector>> = Lazy::new(|| {
    ["article", "main", "body"]
        .iter()
        .map(|s| Selector::parse(s).unwrap())
        .collect()
});

static NON_CONTENT_BLOCK_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)<script\b[^>]*>.*?</script>|<style\b[^>]*>.*?</style>|<noscript\b[^>]*>.*?</noscript>")
        .unwrap()
});

/// Fetches the raw HTML of an article page.
///
/// One method so the enricher can be exercised with injected fakes; the
/// real implementation is [`HttpContentFetcher`].
pub trait ContentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, Box<dyn Error>>;
}

/// reqwest-backed page fetcher with a bounded per-request timeout.
pub struct HttpContentFetcher {
    http: reqwest::Client,
}

impl HttpContentFetcher {
    pub fn new() -> Self {
        Self {
            http: reqwest::Client::new(),
        }
    }
}

impl Default for HttpContentFetcher {
    fn default() -> Self {
        Self::new()
    }
}

impl ContentFetcher for HttpContentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String, Box<dyn Error>> {
        let response = self
            .http
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .timeout(SCRAPE_TIMEOUT)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.text().await?)
    }
}

/// Extract readable text from a page, bounded to `cap` chars.
///
/// Returns `None` when no container yields any text after cleanup.
pub fn extract_content(html: &str, cap: usize) -> Option<String> {
    let document = Html::parse_document(html);

    let container = CONTAINER_SELECTORS
        .iter()
        .find_map(|selector| document.select(selector).next())?;

    let markup = NON_CONTENT_BLOCK_RE
        .replace_all(&container.inner_html(), "")
        .into_owned();
    let text = collapse_blank_lines(&decode_entities(&strip_tags(&markup)));

    if text.is_empty() {
        None
    } else {
        Some(truncate_chars(&text, cap))
    }
}

/// Drives best-effort enrichment over a batch of articles.
pub struct Enricher<F> {
    fetcher: F,
    scrape_delay: Duration,
    content_cap: usize,
}

impl<F> Enricher<F>
where
    F: ContentFetcher,
{
    pub fn new(fetcher: F, scrape_delay: Duration, content_cap: usize) -> Self {
        Self {
            fetcher,
            scrape_delay,
            content_cap,
        }
    }

    /// Attempt enrichment for every article, strictly in order, with the
    /// politeness delay between consecutive attempts. Returns how many
    /// articles ended up with full content.
    #[instrument(level = "info", skip_all, fields(count = articles.len()))]
    pub async fn enrich_all(&self, articles: &mut [Article]) -> usize {
        let mut enriched = 0usize;

        for (i, article) in articles.iter_mut().enumerate() {
            if i > 0 {
                sleep(self.scrape_delay).await;
            }

            let host = article.link_host().unwrap_or_else(|| "?".to_string());
            match self.fetcher.fetch_text(&article.link).await {
                Ok(html) => match extract_content(&html, self.content_cap) {
                    Some(content) => {
                        debug!(index = i, %host, chars = content.chars().count(), "Scraped article content");
                        article.full_content = Some(content);
                        article.content_available = Some(true);
                        enriched += 1;
                    }
                    None => {
                        warn!(index = i, %host, "Page had no extractable content");
                        article.full_content = None;
                        article.content_available = Some(false);
                    }
                },
                Err(e) => {
                    warn!(index = i, %host, error = %e, "Could not scrape article");
                    article.full_content = None;
                    article.content_available = Some(false);
                }
            }
        }

        info!(
            enriched,
            attempted = articles.len(),
            "Enrichment pass finished"
        );
        enriched
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    fn article(link: &str) -> Article {
        Article {
            id: None,
            title: "t".to_string(),
            link: link.to_string(),
            published_at: String::new(),
            summary: "s".to_string(),
            source: "test".to_string(),
            category: None,
            country: None,
            language: None,
            full_content: None,
            content_available: None,
        }
    }

    const PAGE: &str = r#"<html><head><style>p { color: red }</style></head>
        <body>
          <nav>Home | About</nav>
          <article>
            <script>trackPageView();</script>
            <h1>Headline</h1>
            <p>First paragraph of the story.</p>

            <p>Second paragraph.</p>
          </article>
          <footer>footer junk</footer>
        </body></html>"#;

    #[test]
    fn test_extract_prefers_article_container() {
        let text = extract_content(PAGE, 2000).unwrap();
        assert!(text.contains("Headline"));
        assert!(text.contains("First paragraph of the story."));
        assert!(!text.contains("Home | About"));
        assert!(!text.contains("footer junk"));
    }

    #[test]
    fn test_extract_strips_scripts_and_styles() {
        let text = extract_content(PAGE, 2000).unwrap();
        assert!(!text.contains("trackPageView"));
        assert!(!text.contains("color: red"));
    }

    #[test]
    fn test_extract_falls_back_to_main_then_body() {
        let with_main = "<html><body><main><p>main text</p></main><p>outside</p></body></html>";
        assert!(extract_content(with_main, 2000).unwrap().contains("main text"));

        let body_only = "<html><body><p>body text</p></body></html>";
        assert_eq!(extract_content(body_only, 2000).unwrap(), "body text");
    }

    #[test]
    fn test_extract_empty_page_is_none() {
        assert_eq!(extract_content("<html><body>   </body></html>", 2000), None);
        assert_eq!(
            extract_content("<html><body><script>only();</script></body></html>", 2000),
            None
        );
    }

    #[test]
    fn test_extract_respects_cap() {
        let html = format!("<html><body><article>{}</article></body></html>", "x".repeat(5000));
        let text = extract_content(&html, 2000).unwrap();
        assert_eq!(text.chars().count(), 2000);
    }

    /// Fake fetcher that fails on one scripted call index.
    struct FlakyFetcher {
        calls: Mutex<usize>,
        fail_on: usize,
    }

    impl ContentFetcher for FlakyFetcher {
        async fn fetch_text(&self, _url: &str) -> Result<String, Box<dyn Error>> {
            let mut calls = self.calls.lock().unwrap();
            *calls += 1;
            if *calls == self.fail_on {
                Err("connection reset by peer".into())
            } else {
                Ok(format!(
                    "<html><body><article>story {} text</article></body></html>",
                    *calls
                ))
            }
        }
    }

    #[tokio::test]
    async fn test_one_failure_does_not_affect_the_rest() {
        let fetcher = FlakyFetcher {
            calls: Mutex::new(0),
            fail_on: 3,
        };
        let enricher = Enricher::new(fetcher, Duration::ZERO, 2000);

        let mut batch: Vec<Article> = (1..=5)
            .map(|i| article(&format!("https://example.com/{i}")))
            .collect();
        let enriched = enricher.enrich_all(&mut batch).await;

        assert_eq!(enriched, 4);
        for (i, article) in batch.iter().enumerate() {
            if i == 2 {
                assert_eq!(article.content_available, Some(false));
                assert_eq!(article.full_content, None);
            } else {
                assert_eq!(article.content_available, Some(true));
                let content = article.full_content.as_deref().unwrap();
                assert!(!content.is_empty());
                // Order preserved: call i+1 produced article i.
                assert!(content.contains(&format!("story {}", i + 1)));
            }
        }
    }

    #[tokio::test]
    async fn test_enrichment_not_attempted_leaves_fields_unset() {
        let batch = vec![article("https://example.com/a")];
        assert_eq!(batch[0].content_available, None);
        assert_eq!(batch[0].full_content, None);
    }
}
