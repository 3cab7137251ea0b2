//! Browser driver seam.
//!
//! A driver launches a session; a session opens pages. Callers close pages
//! and sessions explicitly once a run ends, whatever the outcome.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::redirect::{Attempt, Policy};
use reqwest::Client;
use url::Url;

use crate::error::BrowserError;
use crate::text::same_site;

const MAX_REDIRECTS: usize = 5;

/// A navigated page after redirects.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPage {
    pub final_url: Url,
    pub html: String,
}

#[async_trait]
pub trait BrowserDriver: Send + Sync {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError>;
}

/// Isolated browsing context.
#[async_trait]
pub trait BrowserSession: Send {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, BrowserError>;

    /// Release the session. Safe to call more than once.
    async fn close(&mut self);
}

#[async_trait]
pub trait BrowserPage: Send {
    async fn goto(&mut self, url: &Url) -> Result<LoadedPage, BrowserError>;

    /// Release the page. Safe to call more than once.
    async fn close(&mut self);
}

/// Static-HTML driver over `reqwest`. Pages are fetched, not rendered, so
/// client-side content is invisible to it.
#[derive(Debug, Clone)]
pub struct HttpBrowser {
    client: Client,
}

impl HttpBrowser {
    pub fn new(user_agent: &str, navigation_timeout: Duration) -> Result<Self, BrowserError> {
        let client = Client::builder()
            .user_agent(user_agent)
            .timeout(navigation_timeout)
            .redirect(Policy::custom(same_site_redirects))
            .build()
            .map_err(|e| BrowserError::Launch(e.to_string()))?;
        Ok(Self { client })
    }
}

/// Follow redirects only while they stay on the site of the first request.
/// An off-site hop is not requested; the redirect response itself comes back.
fn same_site_redirects(attempt: Attempt) -> reqwest::redirect::Action {
    if attempt.previous().len() >= MAX_REDIRECTS {
        return attempt.error("too many redirects");
    }
    let on_site = attempt
        .previous()
        .first()
        .is_some_and(|origin| same_site(origin, attempt.url()));
    if on_site {
        attempt.follow()
    } else {
        attempt.stop()
    }
}

#[async_trait]
impl BrowserDriver for HttpBrowser {
    async fn launch(&self) -> Result<Box<dyn BrowserSession>, BrowserError> {
        Ok(Box::new(HttpSession {
            client: Some(self.client.clone()),
        }))
    }
}

struct HttpSession {
    client: Option<Client>,
}

#[async_trait]
impl BrowserSession for HttpSession {
    async fn new_page(&mut self) -> Result<Box<dyn BrowserPage>, BrowserError> {
        let client = self
            .client
            .clone()
            .ok_or_else(|| BrowserError::Launch("session is closed".to_string()))?;
        Ok(Box::new(HttpPage {
            client: Some(client),
        }))
    }

    async fn close(&mut self) {
        self.client = None;
    }
}

struct HttpPage {
    client: Option<Client>,
}

#[async_trait]
impl BrowserPage for HttpPage {
    async fn goto(&mut self, url: &Url) -> Result<LoadedPage, BrowserError> {
        let client = self.client.as_ref().ok_or_else(|| BrowserError::Navigation {
            url: url.to_string(),
            message: "page is closed".to_string(),
        })?;

        let response = client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| BrowserError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            })?;

        let final_url = response.url().clone();
        let status = response.status();
        if !status.is_success() {
            return Err(BrowserError::HttpStatus {
                url: final_url.to_string(),
                status: status.as_u16(),
            });
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        if !content_type.is_empty() && !content_type.contains("html") {
            return Err(BrowserError::NotHtml {
                url: final_url.to_string(),
                content_type,
            });
        }

        let html = response.text().await.map_err(|e| BrowserError::Navigation {
            url: final_url.to_string(),
            message: e.to_string(),
        })?;

        Ok(LoadedPage { final_url, html })
    }

    async fn close(&mut self) {
        self.client = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn page() -> Box<dyn BrowserPage> {
        let browser = HttpBrowser::new("test-agent", Duration::from_secs(2)).unwrap();
        let mut session = browser.launch().await.unwrap();
        session.new_page().await.unwrap()
    }

    #[tokio::test]
    async fn test_fetches_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_raw("<html><title>Hi</title></html>", "text/html; charset=utf-8"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&server.uri()).unwrap();
        let loaded = page().await.goto(&url).await.unwrap();
        assert!(loaded.html.contains("<title>Hi</title>"));
    }

    #[tokio::test]
    async fn test_rejects_error_status_and_non_html() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/report.pdf"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(vec![0u8; 4], "application/pdf"),
            )
            .mount(&server)
            .await;

        let mut page = page().await;
        let missing = Url::parse(&format!("{}/missing", server.uri())).unwrap();
        assert!(matches!(
            page.goto(&missing).await,
            Err(BrowserError::HttpStatus { status: 404, .. })
        ));
        let pdf = Url::parse(&format!("{}/report.pdf", server.uri())).unwrap();
        assert!(matches!(
            page.goto(&pdf).await,
            Err(BrowserError::NotHtml { .. })
        ));
    }

    #[tokio::test]
    async fn test_off_site_redirect_is_not_followed() {
        let server = MockServer::start().await;
        let elsewhere = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/go"))
            .respond_with(
                ResponseTemplate::new(302)
                    .insert_header("location", format!("{}/latest/meta-data", elsewhere.uri())),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_raw("<html></html>", "text/html"))
            .mount(&elsewhere)
            .await;

        let url = Url::parse(&format!("{}/go", server.uri())).unwrap();
        assert!(matches!(
            page().await.goto(&url).await,
            Err(BrowserError::HttpStatus { status: 302, .. })
        ));
        assert!(elsewhere.received_requests().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_on_site_redirect_is_followed() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/old"))
            .respond_with(ResponseTemplate::new(301).insert_header("location", "/new"))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/new"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw("<html>moved</html>", "text/html"),
            )
            .mount(&server)
            .await;

        let url = Url::parse(&format!("{}/old", server.uri())).unwrap();
        let loaded = page().await.goto(&url).await.unwrap();
        assert_eq!(loaded.final_url.path(), "/new");
        assert!(loaded.html.contains("moved"));
    }

    #[tokio::test]
    async fn test_closed_page_refuses_navigation() {
        let mut page = page().await;
        page.close().await;
        let url = Url::parse("http://127.0.0.1:9/").unwrap();
        assert!(matches!(
            page.goto(&url).await,
            Err(BrowserError::Navigation { .. })
        ));
    }
}
