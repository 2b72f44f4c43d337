use anyhow::Context as _;
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_PIXABAY_URL: &str = "https://pixabay.com/api/";
const RESULTS_PER_PAGE: u32 = 5;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PhotoHit {
    #[serde(rename = "webformatURL")]
    pub preview_url: String,
}

#[async_trait]
pub trait PhotoSearch: Send + Sync {
    /// An empty list is a valid answer; `Err` means the search could not be made.
    async fn search(&self, query: &str) -> anyhow::Result<Vec<PhotoHit>>;
}

#[derive(Debug, Clone)]
pub struct PixabayClient {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl PixabayClient {
    pub fn new(client: reqwest::Client, base_url: &str, api_key: String) -> Self {
        Self {
            client,
            base_url: base_url.to_owned(),
            api_key,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    hits: Vec<PhotoHit>,
}

#[async_trait]
impl PhotoSearch for PixabayClient {
    async fn search(&self, query: &str) -> anyhow::Result<Vec<PhotoHit>> {
        let per_page = RESULTS_PER_PAGE.to_string();
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("q", query),
                ("image_type", "photo"),
                ("category", "food"),
                ("safesearch", "true"),
                ("per_page", per_page.as_str()),
            ])
            .send()
            .await
            .with_context(|| format!("GET {}", self.base_url))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            anyhow::bail!("photo search failed ({status}): {}", body.trim());
        }

        let parsed: SearchResponse = response.json().await.context("parse photo search response")?;
        Ok(parsed.hits)
    }
}

/// Looks up a representative image for a dish title.
///
/// Returns the first hit's preview URL, or `""` when the search finds nothing.
pub async fn enrich_image(search: &dyn PhotoSearch, title: &str) -> anyhow::Result<String> {
    let hits = search
        .search(title)
        .await
        .with_context(|| format!("search photos for {title:?}"))?;
    let url = hits
        .into_iter()
        .map(|hit| hit.preview_url)
        .find(|url| !url.trim().is_empty())
        .unwrap_or_default();
    if url.is_empty() {
        tracing::debug!(title, "no photo found");
    }
    Ok(url)
}
