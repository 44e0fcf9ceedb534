//! Typed wrappers over the admin API endpoints.
//!
//! Each service owns one resource family and speaks through the shared
//! [`crate::api::ApiClient`]. Request bodies follow the backend's
//! resource-wrapped convention (`{"product": {...}}`); list responses come
//! back as [`green_mango_core::Paginated`] envelopes.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

use green_mango_core::{CategoryId, EntityStatus, SortDirection};

pub mod auth;
pub mod banners;
pub mod categories;
pub mod products;
pub mod users;

pub use auth::AuthService;
pub use banners::BannersService;
pub use categories::CategoriesService;
pub use products::ProductsService;
pub use users::UsersService;

/// Common listing parameters. Unset fields are omitted from the query
/// string entirely, so the backend applies its own defaults.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ListQuery {
    /// Free-text search.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    /// Lower bound on creation date (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub from_date: Option<NaiveDate>,
    /// Upper bound on creation date (inclusive).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub to_date: Option<NaiveDate>,
    /// Minimum price filter (products).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_price: Option<Decimal>,
    /// Maximum price filter (products).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_price: Option<Decimal>,
    /// Restrict to one category (products).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    /// Restrict to one parent (categories).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    /// Filter by lifecycle status.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    /// Column to sort by, backend-defined.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    /// Sort direction.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_dir: Option<SortDirection>,
    /// 1-based page number.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    /// Page size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub per_page: Option<u32>,
}

impl ListQuery {
    /// Query for one page with everything else defaulted.
    #[must_use]
    pub fn page(page: u32) -> Self {
        Self {
            page: Some(page),
            ..Self::default()
        }
    }
}
