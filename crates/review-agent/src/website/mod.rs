//! Website browsing sub-agent.
//!
//! A language model explores the merchant's site through a single
//! `visit_page` tool and writes a bounded summary. The run is limited in
//! pages, per-page navigation time and total wall-clock time; whatever was
//! gathered before a timeout is kept.

pub mod agent;
pub mod browser;
pub mod extract;

use review_model::{pricing, LanguageModel};
use review_types::WebsiteData;

use crate::config::WebsiteConfig;
use crate::text::parse_website;

pub use agent::VISIT_PAGE_TOOL;
pub use browser::{BrowserDriver, BrowserPage, BrowserSession, HttpBrowser, LoadedPage};
pub use extract::{extract_page, ExtractedPage};

/// Explore an organization's website.
///
/// Returns `None` when collection is disabled or no website is set. Failures
/// never escape: they are recorded in `scrape_error`.
pub async fn collect_website_data(
    website: Option<&str>,
    model: &dyn LanguageModel,
    driver: &dyn BrowserDriver,
    config: &WebsiteConfig,
) -> Option<WebsiteData> {
    if !config.enabled {
        return None;
    }
    let website = website.map(str::trim).filter(|website| !website.is_empty())?;

    let Some(seed) = parse_website(website) else {
        return Some(WebsiteData {
            base_url: website.to_string(),
            scrape_error: Some(format!("Invalid website URL: {}", website)),
            ..Default::default()
        });
    };

    let mut data = WebsiteData {
        base_url: seed.to_string(),
        ..Default::default()
    };

    let mut session = match driver.launch().await {
        Ok(session) => session,
        Err(e) => {
            tracing::warn!(url = %seed, error = %e, "Browser launch failed");
            data.scrape_error = Some(e.to_string());
            return Some(data);
        }
    };

    let mut page = match session.new_page().await {
        Ok(page) => page,
        Err(e) => {
            tracing::warn!(url = %seed, error = %e, "Browser page creation failed");
            session.close().await;
            data.scrape_error = Some(e.to_string());
            return Some(data);
        }
    };

    let mut state = agent::Exploration::default();
    let budget = config.overall_timeout();
    let outcome = tokio::time::timeout(
        budget,
        agent::explore(&mut state, page.as_mut(), model, &seed, config),
    )
    .await;

    page.close().await;
    session.close().await;

    match outcome {
        Ok(Ok(())) => {
            if state.summary.is_none() {
                data.scrape_error = Some("Website agent produced no summary".to_string());
            }
        }
        Ok(Err(e)) => {
            tracing::warn!(url = %seed, error = %e, "Website agent failed");
            data.scrape_error = Some(format!("Website agent failed: {}", e));
        }
        Err(_) => {
            tracing::warn!(
                url = %seed,
                pages = state.pages.len(),
                timeout_secs = budget.as_secs(),
                "Website collection timed out"
            );
            data.scrape_error = Some(format!(
                "Website exploration timed out after {}s",
                budget.as_secs()
            ));
        }
    }

    tracing::info!(
        url = %seed,
        pages = state.pages.len(),
        visits = state.visits,
        tokens = state.usage.total(),
        "Website collection finished"
    );

    data.usage = pricing::usage_info(model.model_name(), &state.usage);
    data.pages = state.pages;
    data.summary = state.summary;
    Some(data)
}
