//! Product catalog.

use review_types::{PriceRecord, ProductRecord, ProductSummary, ProductsData, RecurringInterval};

fn format_amount(cents: i64, currency: &str) -> String {
    format!("{:.2} {}", cents as f64 / 100.0, currency.to_uppercase())
}

pub(crate) fn describe_price(price: &PriceRecord) -> String {
    match price {
        PriceRecord::Fixed {
            amount_cents,
            currency,
        } => format_amount(*amount_cents, currency),
        PriceRecord::Custom {
            minimum_amount_cents,
            currency,
        } => match minimum_amount_cents {
            Some(minimum) => format!("pay what you want (min {})", format_amount(*minimum, currency)),
            None => "pay what you want".to_string(),
        },
        PriceRecord::Free => "free".to_string(),
        PriceRecord::Metered {
            unit_amount_cents,
            currency,
            meter_name,
        } => format!(
            "{:.4} {} per unit of {}",
            unit_amount_cents / 100.0,
            currency.to_uppercase(),
            meter_name
        ),
    }
}

fn billing(interval: Option<RecurringInterval>) -> &'static str {
    match interval {
        None => "one_time",
        Some(RecurringInterval::Day) => "daily",
        Some(RecurringInterval::Week) => "weekly",
        Some(RecurringInterval::Month) => "monthly",
        Some(RecurringInterval::Year) => "yearly",
    }
}

pub fn collect_products_data(products: &[ProductRecord]) -> ProductsData {
    let summaries: Vec<ProductSummary> = products
        .iter()
        .map(|product| ProductSummary {
            name: product.name.clone(),
            description: product
                .description
                .as_deref()
                .map(str::trim)
                .filter(|description| !description.is_empty())
                .map(str::to_string),
            billing: billing(product.recurring_interval).to_string(),
            prices: product.prices.iter().map(describe_price).collect(),
            benefits: product
                .benefits
                .iter()
                .map(|benefit| format!("{}: {}", benefit.kind.as_str(), benefit.description))
                .collect(),
            archived: product.is_archived,
        })
        .collect();

    ProductsData {
        total_count: summaries.len(),
        active_count: summaries.iter().filter(|product| !product.archived).count(),
        products: summaries,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use review_types::{BenefitKind, BenefitRecord};
    use uuid::Uuid;

    fn product(name: &str, archived: bool, prices: Vec<PriceRecord>) -> ProductRecord {
        ProductRecord {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: None,
            is_archived: archived,
            recurring_interval: None,
            prices,
            benefits: Vec::new(),
        }
    }

    #[test]
    fn test_empty_catalog() {
        let data = collect_products_data(&[]);
        assert_eq!(data, ProductsData::default());
    }

    #[test]
    fn test_counts_and_prices() {
        let mut pro = product(
            "Pro",
            false,
            vec![PriceRecord::Fixed {
                amount_cents: 1900,
                currency: "usd".to_string(),
            }],
        );
        pro.recurring_interval = Some(RecurringInterval::Month);
        pro.benefits.push(BenefitRecord {
            id: Uuid::new_v4(),
            kind: BenefitKind::LicenseKeys,
            description: "Pro license".to_string(),
        });
        let legacy = product("Legacy", true, vec![PriceRecord::Free]);

        let data = collect_products_data(&[pro, legacy]);
        assert_eq!(data.total_count, 2);
        assert_eq!(data.active_count, 1);
        assert_eq!(data.products[0].billing, "monthly");
        assert_eq!(data.products[0].prices, vec!["19.00 USD"]);
        assert_eq!(data.products[0].benefits, vec!["license_keys: Pro license"]);
        assert_eq!(data.products[1].prices, vec!["free"]);
    }

    #[test]
    fn test_custom_price_minimum() {
        let price = PriceRecord::Custom {
            minimum_amount_cents: Some(500),
            currency: "eur".to_string(),
        };
        assert_eq!(describe_price(&price), "pay what you want (min 5.00 EUR)");
    }
}
