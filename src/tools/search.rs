//! Web search backends.
//!
//! The default backend scrapes DuckDuckGo's HTML endpoint, which needs no API
//! key. Anything implementing [`SearchProvider`] can stand in for it.

use crate::error::SearchError;
use crate::llm::http_client::{BROWSER_USER_AGENT, build_client};
use async_trait::async_trait;
use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use url::Url;

pub const DEFAULT_DUCKDUCKGO_URL: &str = "https://html.duckduckgo.com/html/";
pub const DEFAULT_RESULT_COUNT: usize = 5;

/// Search capability: a query in, an ordered list of result snippets out.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    fn name(&self) -> &str;

    async fn search(&self, query: &str, result_count: usize) -> Result<Vec<String>, SearchError>;
}

/// One parsed organic result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchHit {
    pub title: String,
    pub url: Option<String>,
    pub snippet: String,
}

impl SearchHit {
    pub fn render(&self) -> String {
        match &self.url {
            Some(url) => format!("{}: {} ({url})", self.title, self.snippet),
            None => format!("{}: {}", self.title, self.snippet),
        }
    }
}

pub struct DuckDuckGoSearch {
    base_url: String,
    client: Client,
}

impl DuckDuckGoSearch {
    pub fn new(base_url: &str, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.to_string(),
            client: build_client(timeout_secs, BROWSER_USER_AGENT),
        }
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    fn name(&self) -> &str {
        "duckduckgo"
    }

    async fn search(&self, query: &str, result_count: usize) -> Result<Vec<String>, SearchError> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("q", query)])
            .send()
            .await
            .map_err(|e| SearchError::Unreachable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Status {
                status: status.as_u16(),
            });
        }

        let html = response
            .text()
            .await
            .map_err(|e| SearchError::Unreachable(e.to_string()))?;

        if is_captcha_page(&html) {
            return Err(SearchError::Blocked(
                "DuckDuckGo answered with a CAPTCHA page".to_string(),
            ));
        }

        Ok(parse_results(&html)
            .into_iter()
            .take(result_count)
            .map(|hit| hit.render())
            .collect())
    }
}

fn is_captcha_page(html: &str) -> bool {
    html.contains("anomaly-modal") || html.contains("Unfortunately, bots")
}

/// Extract organic results from a DuckDuckGo HTML results page.
pub fn parse_results(html: &str) -> Vec<SearchHit> {
    let document = Html::parse_document(html);
    let (Ok(result_sel), Ok(title_sel), Ok(snippet_sel)) = (
        Selector::parse("div.result"),
        Selector::parse("a.result__a"),
        Selector::parse(".result__snippet"),
    ) else {
        return Vec::new();
    };

    document
        .select(&result_sel)
        .filter(|result| !result.value().classes().any(|c| c == "result--ad"))
        .filter_map(|result| {
            let title_el = result.select(&title_sel).next()?;
            let title = element_text(title_el);
            if title.is_empty() {
                return None;
            }
            let snippet = result
                .select(&snippet_sel)
                .next()
                .map(element_text)
                .unwrap_or_default();
            let url = title_el.value().attr("href").and_then(resolve_result_url);
            Some(SearchHit {
                title,
                url,
                snippet,
            })
        })
        .collect()
}

fn element_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// DuckDuckGo wraps targets as `//duckduckgo.com/l/?uddg=<encoded>`.
fn resolve_result_url(href: &str) -> Option<String> {
    let absolute = if href.starts_with("//") {
        format!("https:{href}")
    } else {
        href.to_string()
    };
    let parsed = Url::parse(&absolute).ok()?;
    parsed
        .query_pairs()
        .find(|(key, _)| key == "uddg")
        .map(|(_, target)| target.into_owned())
        .or_else(|| Some(parsed.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const RESULTS_PAGE: &str = r#"
        <html><body>
          <div class="result results_links result--ad">
            <h2 class="result__title"><a class="result__a" href="https://ads.example">Sponsored</a></h2>
            <a class="result__snippet">Buy now</a>
          </div>
          <div class="result results_links web-result">
            <h2 class="result__title">
              <a class="result__a" href="//duckduckgo.com/l/?uddg=https%3A%2F%2Fwww.colosseum.it%2F&amp;rut=abc">Colosseum <b>Rome</b></a>
            </h2>
            <a class="result__snippet">Official site of the   Colosseum in <b>Rome</b>.</a>
          </div>
          <div class="result results_links web-result">
            <h2 class="result__title"><a class="result__a" href="https://example.org/trastevere">Trastevere food walk</a></h2>
            <a class="result__snippet">Where to eat in Rome.</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn parse_skips_ads_and_decodes_redirects() {
        let hits = parse_results(RESULTS_PAGE);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Colosseum Rome");
        assert_eq!(hits[0].url.as_deref(), Some("https://www.colosseum.it/"));
        assert_eq!(hits[0].snippet, "Official site of the Colosseum in Rome .");
        assert_eq!(hits[1].url.as_deref(), Some("https://example.org/trastevere"));
    }

    #[test]
    fn parse_empty_page_yields_nothing() {
        assert!(parse_results("<html><body>No results.</body></html>").is_empty());
    }

    #[test]
    fn render_includes_url_when_known() {
        let hit = SearchHit {
            title: "T".into(),
            url: Some("https://x".into()),
            snippet: "S".into(),
        };
        assert_eq!(hit.render(), "T: S (https://x)");
    }

    #[tokio::test]
    async fn search_truncates_to_result_count() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("q", "rome food"))
            .respond_with(ResponseTemplate::new(200).set_body_string(RESULTS_PAGE))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(&server.uri(), 5);
        let snippets = search.search("rome food", 1).await.unwrap();
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].starts_with("Colosseum Rome"));
    }

    #[tokio::test]
    async fn captcha_page_is_blocked_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(
                ResponseTemplate::new(200).set_body_string("<div class=\"anomaly-modal\"></div>"),
            )
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(&server.uri(), 5);
        let err = search.search("rome", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Blocked(_)));
    }

    #[tokio::test]
    async fn http_failure_is_status_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(503))
            .mount(&server)
            .await;

        let search = DuckDuckGoSearch::new(&server.uri(), 5);
        let err = search.search("rome", 5).await.unwrap_err();
        assert!(matches!(err, SearchError::Status { status: 503 }));
    }
}
