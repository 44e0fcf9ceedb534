//! Promotional banner management, including display ordering.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use green_mango_core::{BannerId, EntityStatus, Paginated};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::services::ListQuery;

const BANNERS_PATH: &str = "admin/banners";
const PUBLIC_BANNERS_PATH: &str = "banners";

#[derive(Debug, Clone, Deserialize)]
pub struct Banner {
    pub id: BannerId,
    pub title: String,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub link_url: Option<String>,
    /// Position within the storefront carousel, ascending.
    pub display_order: i32,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a banner. The image arrives as a blob reference from
/// the upload coordinator; banners carry at most one image.
#[derive(Debug, Clone, Serialize)]
pub struct BannerCreate {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    pub display_order: i32,
    pub status: EntityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_signed_id: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BannerUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    /// Replaces the current image when set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_signed_id: Option<String>,
}

/// One entry in a bulk reorder: banner plus its new position.
#[derive(Debug, Clone, Serialize)]
pub struct BannerPosition {
    pub id: BannerId,
    pub display_order: i32,
}

#[derive(Serialize)]
struct BannerBody<T: Serialize> {
    banner: T,
}

#[derive(Serialize)]
struct ReorderBody<'a> {
    banners: &'a [BannerPosition],
}

#[derive(Deserialize)]
struct BannerEnvelope {
    banner: Banner,
}

#[derive(Clone)]
pub struct BannersService {
    api: ApiClient,
}

impl BannersService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip_all)]
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<Banner>, ApiError> {
        self.api.get_with(BANNERS_PATH, query).await
    }

    /// Active banners as the storefront sees them, ordered for display.
    /// Requires no session.
    pub async fn public_list(&self) -> Result<Vec<Banner>, ApiError> {
        self.api.get(PUBLIC_BANNERS_PATH).await
    }

    pub async fn get(&self, id: BannerId) -> Result<Banner, ApiError> {
        let envelope: BannerEnvelope = self.api.get(&format!("{BANNERS_PATH}/{id}")).await?;
        Ok(envelope.banner)
    }

    #[instrument(skip_all, fields(title = %params.title))]
    pub async fn create(&self, params: &BannerCreate) -> Result<Banner, ApiError> {
        let envelope: BannerEnvelope = self
            .api
            .post(BANNERS_PATH, &BannerBody { banner: params })
            .await?;
        Ok(envelope.banner)
    }

    #[instrument(skip_all, fields(%id))]
    pub async fn update(&self, id: BannerId, params: &BannerUpdate) -> Result<Banner, ApiError> {
        let envelope: BannerEnvelope = self
            .api
            .put(
                &format!("{BANNERS_PATH}/{id}"),
                &BannerBody { banner: params },
            )
            .await?;
        Ok(envelope.banner)
    }

    #[instrument(skip(self), fields(%id))]
    pub async fn delete(&self, id: BannerId) -> Result<(), ApiError> {
        self.api.delete(&format!("{BANNERS_PATH}/{id}")).await
    }

    /// Persist a new carousel ordering in one request.
    #[instrument(skip_all, fields(count = positions.len()))]
    pub async fn reorder(&self, positions: &[BannerPosition]) -> Result<(), ApiError> {
        self.api
            .patch_empty(
                &format!("{BANNERS_PATH}/reorder"),
                &ReorderBody { banners: positions },
            )
            .await
    }
}
