//! Acceptable-use policy document.
//!
//! Documents are cached process-wide by URL, so every fetcher pointing at
//! the same URL shares one copy. A failed fetch is not cached: callers get
//! [`FALLBACK_POLICY`] and the next call tries the network again.

use std::collections::HashMap;
use std::sync::{OnceLock, PoisonError, RwLock};
use std::time::Duration;

use reqwest::Client;

use crate::config::PolicyConfig;
use crate::error::PolicyError;

static DOCUMENTS: OnceLock<RwLock<HashMap<String, String>>> = OnceLock::new();

fn documents() -> &'static RwLock<HashMap<String, String>> {
    DOCUMENTS.get_or_init(|| RwLock::new(HashMap::new()))
}

fn cached(url: &str) -> Option<String> {
    documents()
        .read()
        .unwrap_or_else(PoisonError::into_inner)
        .get(url)
        .cloned()
}

/// Keeps the first document stored for `url` and returns it.
fn store(url: &str, document: String) -> String {
    documents()
        .write()
        .unwrap_or_else(PoisonError::into_inner)
        .entry(url.to_string())
        .or_insert(document)
        .clone()
}

/// Used whenever the live document cannot be fetched.
pub const FALLBACK_POLICY: &str = r#"# Acceptable Use Policy

## 1. Supported businesses
Merchants may sell digital products and services they own or are licensed to
sell: software, SaaS subscriptions, digital downloads, courses, templates,
memberships, sponsorships and access to private repositories or communities.

## 2. Prohibited businesses
- Physical goods and shipping-dependent fulfilment
- Adult content and services, dating, escorting
- Gambling, lotteries, sweepstakes and games of chance
- Financial services: investment advice, trading signals, crypto exchanges,
  money transmission, loans, credit repair
- Regulated goods: drugs, supplements with health claims, weapons, tobacco,
  CBD, pharmaceuticals
- Get-rich-quick schemes, multi-level marketing, pyramid schemes
- Services that facilitate fraud, IP infringement, account resale or
  license key reselling
- Human services (consulting, coaching, freelance work) without a digital
  deliverable

## 3. Prohibited practices
- Misleading pricing, hidden recurring charges or fake scarcity
- Selling products the merchant cannot deliver
- Processing payments on behalf of another business
- Operating under a different identity than the verified one

## 4. Fulfilment
Every paid product must grant a benefit the platform can deliver or the
merchant can document: license keys, file downloads, repository or community
access, or a clearly described custom benefit.

## 5. Enforcement
Accounts that violate this policy are denied or blocked and pending payouts
may be withheld while a review is completed.
"#;

/// Fetches and caches the acceptable-use policy.
#[derive(Debug)]
pub struct PolicyDocumentFetcher {
    client: Client,
    url: String,
    fixed: Option<String>,
}

impl PolicyDocumentFetcher {
    pub fn new(config: &PolicyConfig) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self::with_client(client, config.url.clone())
    }

    pub fn with_client(client: Client, url: impl Into<String>) -> Self {
        Self {
            client,
            url: url.into(),
            fixed: None,
        }
    }

    /// Fixed document, never touches the network or the shared cache.
    pub fn fixed(document: impl Into<String>) -> Self {
        Self {
            fixed: Some(document.into()),
            ..Self::with_client(Client::new(), String::new())
        }
    }

    pub fn is_cached(&self) -> bool {
        self.fixed.is_some() || cached(&self.url).is_some()
    }

    /// Policy text, fetched on first use.
    ///
    /// Concurrent first callers may both fetch; the first to finish wins the
    /// cache slot and both return an identical document.
    pub async fn get(&self) -> String {
        if let Some(document) = self.fixed.clone().or_else(|| cached(&self.url)) {
            return document;
        }

        match self.fetch().await {
            Ok(document) => {
                tracing::info!(url = %self.url, bytes = document.len(), "Policy document fetched");
                store(&self.url, document)
            }
            Err(e) => {
                tracing::warn!(url = %self.url, error = %e, "Policy fetch failed, using fallback policy");
                FALLBACK_POLICY.to_string()
            }
        }
    }

    async fn fetch(&self) -> Result<String, PolicyError> {
        let response = self.client.get(&self.url).send().await?;

        if !response.status().is_success() {
            return Err(PolicyError::HttpStatus(response.status().as_u16()));
        }

        let document = response.text().await?;
        if document.trim().is_empty() {
            return Err(PolicyError::Empty);
        }
        Ok(document)
    }
}
