//! Web scrape tool
//!
//! `web_scrape` fetches a page, extracts its readable text and passes it
//! through the bounded summarizer: the full text lands in the
//! `scrape_results` namespace and the agent only sees a truncated digest.
//!
//! Two extraction strategies exist. News-like URLs go to the article
//! extractor (daedra's page fetcher); everything else is fetched with reqwest
//! and reduced to the text of paragraphs, headings and article elements.

use crate::artifacts::ArtifactKind;
use crate::context::ToolContext;
use crate::summarize::SummaryMode;
use crate::tools::registry::Tool;
use crate::types::{AppError, Result};
use async_trait::async_trait;
use reqwest::Url;
use scraper::{ElementRef, Html, Selector};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::{Arc, LazyLock};
use std::time::Duration;

/// Network timeout for fetching a page
pub const SCRAPE_TIMEOUT: Duration = Duration::from_secs(15);

/// Default digest length in words
pub const DEFAULT_SCRAPE_TOKENS: usize = 300;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

const ARTICLE_KEYWORDS: [&str; 5] = ["news", "article", "blog", "story", "post"];

const PUBLISHER_DOMAINS: [&str; 6] = [
    "cnn.com",
    "bbc.com",
    "nytimes.com",
    "theguardian.com",
    "reuters.com",
    "apnews.com",
];

const CONTENT_TAGS: [&str; 5] = ["p", "h1", "h2", "h3", "article"];
const EXCLUDED_TAGS: [&str; 5] = ["script", "style", "nav", "footer", "header"];

static CONTENT_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(&CONTENT_TAGS.join(", ")).expect("content selector is valid CSS")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrapeStrategy {
    /// Readability-style article extraction
    Article,
    /// Paragraph and heading text from raw HTML
    HtmlText,
}

impl ScrapeStrategy {
    /// Pick a strategy from keywords in the host or path and known
    /// publisher domains. Query string and fragment are ignored.
    pub fn for_url(url: &Url) -> Self {
        let host = url.host_str().unwrap_or_default().to_lowercase();
        let path = url.path().to_lowercase();
        let news_like = ARTICLE_KEYWORDS
            .iter()
            .any(|k| host.contains(k) || path.contains(k))
            || PUBLISHER_DOMAINS.iter().any(|d| host.contains(d));

        if news_like {
            ScrapeStrategy::Article
        } else {
            ScrapeStrategy::HtmlText
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScrapeStrategy::Article => "article",
            ScrapeStrategy::HtmlText => "html",
        }
    }
}

/// Turns a URL into readable text
#[async_trait]
pub trait ContentExtractor: Send + Sync {
    async fn extract(&self, url: &str) -> Result<String>;
}

/// Article extraction through daedra's page fetcher
#[derive(Default)]
pub struct ArticleExtractor;

#[async_trait]
impl ContentExtractor for ArticleExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let fetch_args = daedra::VisitPageArgs {
            url: url.to_string(),
            include_images: false,
            selector: None,
        };

        match tokio::time::timeout(SCRAPE_TIMEOUT, daedra::tools::fetch::fetch_page(&fetch_args))
            .await
        {
            Ok(Ok(page)) => Ok(page.content),
            Ok(Err(e)) => Err(AppError::tool(
                "web_scrape",
                format!("Failed to scrape URL: {}", e),
            )),
            Err(_) => Err(timeout_error()),
        }
    }
}

/// Plain HTTP fetch followed by [`extract_text`]
pub struct HtmlTextExtractor {
    client: reqwest::Client,
}

impl HtmlTextExtractor {
    pub fn new() -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(SCRAPE_TIMEOUT)
            .user_agent(BROWSER_USER_AGENT)
            .build()
            .map_err(|e| AppError::Internal(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ContentExtractor for HtmlTextExtractor {
    async fn extract(&self, url: &str) -> Result<String> {
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml")
            .send()
            .await
            .map_err(map_request_error)?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::tool(
                "web_scrape",
                format!("HTTP error occurred: {}", status),
            ));
        }

        let html = response.text().await.map_err(map_request_error)?;
        Ok(extract_text(&html))
    }
}

fn timeout_error() -> AppError {
    AppError::tool(
        "web_scrape",
        format!(
            "Request timed out after {} seconds.",
            SCRAPE_TIMEOUT.as_secs()
        ),
    )
}

fn map_request_error(e: reqwest::Error) -> AppError {
    if e.is_timeout() {
        timeout_error()
    } else if e.is_connect() {
        AppError::tool("web_scrape", "Failed to connect to the server.")
    } else if let Some(status) = e.status() {
        AppError::tool("web_scrape", format!("HTTP error occurred: {}", status))
    } else {
        AppError::tool("web_scrape", format!("Failed to scrape URL: {}", e))
    }
}

/// Readable text of an HTML document.
///
/// Takes paragraphs, `h1`-`h3` headings and `article` elements in document
/// order, skips anything inside script, style, nav, footer or header
/// elements, and collapses whitespace. Content nested in an already selected
/// element is not repeated.
pub fn extract_text(html: &str) -> String {
    let document = Html::parse_document(html);
    let mut blocks = Vec::new();

    for element in document.select(&CONTENT_SELECTOR) {
        let inside_skipped = element.ancestors().filter_map(ElementRef::wrap).any(|a| {
            let name = a.value().name();
            EXCLUDED_TAGS.contains(&name) || CONTENT_TAGS.contains(&name)
        });
        if inside_skipped {
            continue;
        }

        let mut words = Vec::new();
        for node in element.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let excluded = node
                .ancestors()
                .take_while(|a| a.id() != element.id())
                .filter_map(ElementRef::wrap)
                .any(|a| EXCLUDED_TAGS.contains(&a.value().name()));
            if !excluded {
                words.extend(text.split_whitespace());
            }
        }

        if !words.is_empty() {
            blocks.push(words.join(" "));
        }
    }

    blocks.join(" ")
}

#[derive(Debug, Deserialize)]
struct ScrapeArgs {
    url: String,
    #[serde(default)]
    max_return_tokens: Option<usize>,
    #[serde(default)]
    use_article_extractor: Option<bool>,
}

/// `web_scrape(url, max_return_tokens, use_article_extractor)` tool
pub struct WebScrapeTool {
    article: Arc<dyn ContentExtractor>,
    html: Arc<dyn ContentExtractor>,
    default_tokens: usize,
}

impl WebScrapeTool {
    /// Tool using daedra for articles and reqwest for everything else
    pub fn new() -> Result<Self> {
        Ok(Self::with_extractors(
            Arc::new(ArticleExtractor),
            Arc::new(HtmlTextExtractor::new()?),
        ))
    }

    pub fn with_extractors(
        article: Arc<dyn ContentExtractor>,
        html: Arc<dyn ContentExtractor>,
    ) -> Self {
        Self {
            article,
            html,
            default_tokens: DEFAULT_SCRAPE_TOKENS,
        }
    }

    pub fn with_default_tokens(mut self, default_tokens: usize) -> Self {
        self.default_tokens = default_tokens;
        self
    }
}

#[async_trait]
impl Tool for WebScrapeTool {
    fn name(&self) -> &str {
        "web_scrape"
    }

    fn description(&self) -> &str {
        "Fetch a web page and return the first max_return_tokens words of its text, plus \
         file_path, a reference to the full extracted text readable with read_file."
    }

    fn parameters_schema(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute http(s) URL of the page"
                },
                "max_return_tokens": {
                    "type": "integer",
                    "description": "Maximum number of words returned inline (default: 300)",
                    "minimum": 0
                },
                "use_article_extractor": {
                    "type": "boolean",
                    "description": "Force (true) or disable (false) article extraction; chosen from the URL when omitted"
                }
            },
            "required": ["url"]
        })
    }

    async fn execute(&self, args: Value, ctx: ToolContext<'_>) -> Result<Value> {
        let args: ScrapeArgs = serde_json::from_value(args)
            .map_err(|e| AppError::invalid_args(self.name(), e.to_string()))?;

        let url = Url::parse(args.url.trim())
            .map_err(|e| AppError::invalid_args(self.name(), format!("invalid url: {}", e)))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(AppError::invalid_args(
                self.name(),
                format!("unsupported url scheme '{}'", url.scheme()),
            ));
        }

        let strategy = match args.use_article_extractor {
            Some(true) => ScrapeStrategy::Article,
            Some(false) => ScrapeStrategy::HtmlText,
            None => ScrapeStrategy::for_url(&url),
        };
        let extractor = match strategy {
            ScrapeStrategy::Article => &self.article,
            ScrapeStrategy::HtmlText => &self.html,
        };

        let text = extractor.extract(url.as_str()).await?;
        let budget = args.max_return_tokens.unwrap_or(self.default_tokens);

        let summary = ctx
            .summarizer()
            .summarize_with(
                SummaryMode::Truncate,
                ArtifactKind::ScrapeResult,
                &text,
                budget,
                self.name(),
            )
            .await?;

        tracing::info!(
            url = %url,
            strategy = strategy.as_str(),
            artifact = %summary.full_reference,
            "Page scraped"
        );

        Ok(json!({
            "text": summary.digest,
            "file_path": summary.full_reference,
        }))
    }
}
