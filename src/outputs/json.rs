//! The sink: JSON artifact output.
//!
//! One artifact per run. The write replaces any previous output in full
//! (runs never merge), and the artifact is pretty-printed so it stays
//! human-inspectable.

use crate::models::Article;
use std::error::Error;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize the final ordered article sequence to `path`, overwriting any
/// prior artifact. Returns the number of articles written.
#[instrument(level = "info", skip_all, fields(path = %path))]
pub async fn persist(articles: &[Article], path: &str) -> Result<usize, Box<dyn Error>> {
    if let Some(parent) = Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).await?;
        }
    }

    let json = serde_json::to_string_pretty(articles)?;
    fs::write(path, json).await?;

    info!(count = articles.len(), "Wrote article artifact");
    Ok(articles.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn read_back(path: &str) -> Vec<Article> {
        let text = fs::read_to_string(path).await.unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn sample_articles() -> Vec<Article> {
        vec![
            Article {
                id: Some("a1".to_string()),
                title: "First".to_string(),
                link: "https://example.com/1".to_string(),
                published_at: "2025-11-03 08:00:00".to_string(),
                summary: "one".to_string(),
                source: "wire".to_string(),
                category: Some("technology".to_string()),
                country: None,
                language: Some("en".to_string()),
                full_content: Some("Full text".to_string()),
                content_available: Some(true),
            },
            Article {
                id: None,
                title: "Second".to_string(),
                link: "https://example.org/2".to_string(),
                published_at: "Mon, 03 Nov 2025 09:00:00 GMT".to_string(),
                summary: String::new(),
                source: "Example Feed".to_string(),
                category: None,
                country: None,
                language: None,
                full_content: None,
                content_available: Some(false),
            },
        ]
    }

    #[tokio::test]
    async fn test_round_trip_preserves_records_and_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let path = path.to_str().unwrap();

        let articles = sample_articles();
        let written = persist(&articles, path).await.unwrap();
        assert_eq!(written, 2);

        let back = read_back(path).await;
        assert_eq!(back, articles);
    }

    #[tokio::test]
    async fn test_persist_overwrites_previous_run() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("articles.json");
        let path = path.to_str().unwrap();

        persist(&sample_articles(), path).await.unwrap();
        let second_run = vec![sample_articles().remove(1)];
        persist(&second_run, path).await.unwrap();

        let back = read_back(path).await;
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].title, "Second");
    }

    #[tokio::test]
    async fn test_persist_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/out/articles.json");
        let path = path.to_str().unwrap();

        let written = persist(&sample_articles(), path).await.unwrap();
        assert_eq!(written, 2);
    }
}
