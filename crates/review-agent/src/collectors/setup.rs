//! Integration and checkout setup signals.

use std::collections::{BTreeSet, HashMap};

use review_types::{CheckoutLinkSummary, ProductRecord, SetupData, SetupRecords};
use uuid::Uuid;

use crate::text::domain_of;

pub fn collect_setup_data(records: &SetupRecords, products: &[ProductRecord]) -> SetupData {
    let by_id: HashMap<Uuid, &ProductRecord> =
        products.iter().map(|product| (product.id, product)).collect();

    let checkout_links: Vec<CheckoutLinkSummary> = records
        .checkout_links
        .iter()
        .map(|link| {
            let linked: Vec<&ProductRecord> = link
                .product_ids
                .iter()
                .filter_map(|id| by_id.get(id).copied())
                .collect();
            CheckoutLinkSummary {
                label: link.label.clone(),
                success_url_domain: link.success_url.as_deref().and_then(domain_of),
                product_names: linked.iter().map(|product| product.name.clone()).collect(),
                benefit_count: linked.iter().map(|product| product.benefits.len()).sum(),
            }
        })
        .collect();

    let checkout_success_domains: BTreeSet<String> = checkout_links
        .iter()
        .filter_map(|link| link.success_url_domain.clone())
        .collect();

    let webhook_domains: BTreeSet<String> = records
        .webhook_endpoints
        .iter()
        .filter_map(|endpoint| domain_of(&endpoint.url))
        .collect();

    SetupData {
        checkout_links_without_benefits: checkout_links
            .iter()
            .filter(|link| !link.product_names.is_empty() && link.benefit_count == 0)
            .count(),
        checkout_success_domains: checkout_success_domains.into_iter().collect(),
        checkout_links,
        webhook_endpoint_count: records.webhook_endpoints.len(),
        webhook_domains: webhook_domains.into_iter().collect(),
        api_token_count: records.api_token_count,
        has_integration: !records.webhook_endpoints.is_empty() || records.api_token_count > 0,
    }
}
