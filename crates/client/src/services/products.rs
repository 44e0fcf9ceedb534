//! Product catalog management, including image attachment reconciliation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use green_mango_core::{AttachmentId, CategoryId, EntityStatus, Paginated, Price, ProductId};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::services::ListQuery;
use crate::upload::AttachmentSet;

const PRODUCTS_PATH: &str = "admin/products";

/// An image already attached to a product.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ProductImage {
    /// Attachment ID, the handle used to keep or drop the image on update.
    pub id: AttachmentId,
    pub url: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub price: Price,
    pub stock_quantity: i32,
    pub status: EntityStatus,
    #[serde(default)]
    pub category_id: Option<CategoryId>,
    #[serde(default)]
    pub category_name: Option<String>,
    #[serde(default)]
    pub images: Vec<ProductImage>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields for creating a product. Images are attached by blob reference,
/// obtained from the upload coordinator beforehand.
#[derive(Debug, Clone, Serialize)]
pub struct ProductCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub price: Price,
    pub stock_quantity: i32,
    pub status: EntityStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub new_image_signed_ids: Vec<String>,
}

/// Partial product update.
///
/// Image reconciliation uses two channels: `image_attachment_ids` names the
/// existing attachments that survive (any existing attachment not listed is
/// detached), and `new_image_signed_ids` carries blob references for files
/// uploaded during the edit. When both are `None` the backend leaves the
/// images untouched.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<Price>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stock_quantity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_attachment_ids: Option<Vec<AttachmentId>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_image_signed_ids: Option<Vec<String>>,
}

impl ProductUpdate {
    /// Populate both image channels from a reconciled attachment set.
    #[must_use]
    pub fn apply_attachments(mut self, attachments: &AttachmentSet) -> Self {
        self.image_attachment_ids = Some(attachments.kept_existing_ids().to_vec());
        self.new_image_signed_ids = Some(attachments.new_blob_references().to_vec());
        self
    }
}

#[derive(Serialize)]
struct ProductBody<T: Serialize> {
    product: T,
}

#[derive(Deserialize)]
struct ProductEnvelope {
    product: Product,
}

#[derive(Clone)]
pub struct ProductsService {
    api: ApiClient,
}

impl ProductsService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip_all)]
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<Product>, ApiError> {
        self.api.get_with(PRODUCTS_PATH, query).await
    }

    pub async fn get(&self, id: ProductId) -> Result<Product, ApiError> {
        let envelope: ProductEnvelope = self.api.get(&format!("{PRODUCTS_PATH}/{id}")).await?;
        Ok(envelope.product)
    }

    #[instrument(skip_all, fields(name = %params.name))]
    pub async fn create(&self, params: &ProductCreate) -> Result<Product, ApiError> {
        let envelope: ProductEnvelope = self
            .api
            .post(PRODUCTS_PATH, &ProductBody { product: params })
            .await?;
        Ok(envelope.product)
    }

    #[instrument(skip_all, fields(%id))]
    pub async fn update(&self, id: ProductId, params: &ProductUpdate) -> Result<Product, ApiError> {
        let envelope: ProductEnvelope = self
            .api
            .put(
                &format!("{PRODUCTS_PATH}/{id}"),
                &ProductBody { product: params },
            )
            .await?;
        Ok(envelope.product)
    }

    #[instrument(skip(self), fields(%id))]
    pub async fn delete(&self, id: ProductId) -> Result<(), ApiError> {
        self.api.delete(&format!("{PRODUCTS_PATH}/{id}")).await
    }
}
