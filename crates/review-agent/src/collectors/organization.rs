//! Organization profile.

use review_types::{OrganizationData, OrganizationRecord};

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .map(str::to_string)
}

pub fn collect_organization_data(organization: &OrganizationRecord) -> OrganizationData {
    let details = &organization.details;
    OrganizationData {
        name: organization.name.clone(),
        slug: organization.slug.clone(),
        status: organization.status.as_str().to_string(),
        website: non_empty(&organization.website),
        email: non_empty(&organization.email),
        about: non_empty(&details.about),
        product_description: non_empty(&details.product_description),
        intended_use: non_empty(&details.intended_use),
        customer_acquisition: details.customer_acquisition.clone(),
        future_annual_revenue: details.future_annual_revenue,
        switching: details.switching,
        switching_from: non_empty(&details.switching_from),
        previous_annual_revenue: details.previous_annual_revenue,
        socials: organization.socials.clone(),
        created_at: organization.created_at,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use review_types::{OrganizationDetails, OrganizationStatus};
    use uuid::Uuid;

    #[test]
    fn test_blank_fields_become_none() {
        let record = OrganizationRecord {
            id: Uuid::new_v4(),
            slug: "acme".to_string(),
            name: "Acme".to_string(),
            status: OrganizationStatus::UnderReview,
            website: Some("  ".to_string()),
            email: Some("hi@acme.dev".to_string()),
            details: OrganizationDetails {
                about: Some("Developer tooling".to_string()),
                intended_use: Some(String::new()),
                ..Default::default()
            },
            socials: Vec::new(),
            account_id: None,
            created_at: Utc::now(),
            blocked_at: None,
        };

        let data = collect_organization_data(&record);
        assert_eq!(data.status, "under_review");
        assert!(data.website.is_none());
        assert!(data.intended_use.is_none());
        assert_eq!(data.about.as_deref(), Some("Developer tooling"));
        assert_eq!(data.email.as_deref(), Some("hi@acme.dev"));
    }
}
