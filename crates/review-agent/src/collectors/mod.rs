//! Collectors turning domain records into snapshot fragments.
//!
//! Every collector is total: missing records yield a defaulted fragment and
//! failed provider lookups degrade the fragment instead of failing the
//! review.

mod account;
mod history;
mod identity;
mod metrics;
mod organization;
mod products;
mod setup;

pub use account::collect_account_data;
pub use history::collect_history_data;
pub use identity::collect_identity_data;
pub use metrics::{collect_payment_metrics, percentile};
pub use organization::collect_organization_data;
pub use products::collect_products_data;
pub use setup::collect_setup_data;

pub use crate::website::collect_website_data;
