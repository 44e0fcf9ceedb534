//! Category tree management.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use green_mango_core::{CategoryId, EntityStatus, Paginated};

use crate::api::ApiClient;
use crate::error::ApiError;
use crate::services::ListQuery;

const CATEGORIES_PATH: &str = "admin/categories";

#[derive(Debug, Clone, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    /// Parent in the tree; `None` at the root level.
    #[serde(default)]
    pub parent_id: Option<CategoryId>,
    #[serde(default)]
    pub parent_name: Option<String>,
    pub status: EntityStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CategoryCreate {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    pub status: EntityStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct CategoryUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<CategoryId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<EntityStatus>,
}

#[derive(Serialize)]
struct CategoryBody<T: Serialize> {
    category: T,
}

#[derive(Deserialize)]
struct CategoryEnvelope {
    category: Category,
}

#[derive(Clone)]
pub struct CategoriesService {
    api: ApiClient,
}

impl CategoriesService {
    pub(crate) const fn new(api: ApiClient) -> Self {
        Self { api }
    }

    #[instrument(skip_all)]
    pub async fn list(&self, query: &ListQuery) -> Result<Paginated<Category>, ApiError> {
        self.api.get_with(CATEGORIES_PATH, query).await
    }

    pub async fn get(&self, id: CategoryId) -> Result<Category, ApiError> {
        let envelope: CategoryEnvelope =
            self.api.get(&format!("{CATEGORIES_PATH}/{id}")).await?;
        Ok(envelope.category)
    }

    #[instrument(skip_all, fields(name = %params.name))]
    pub async fn create(&self, params: &CategoryCreate) -> Result<Category, ApiError> {
        let envelope: CategoryEnvelope = self
            .api
            .post(CATEGORIES_PATH, &CategoryBody { category: params })
            .await?;
        Ok(envelope.category)
    }

    #[instrument(skip_all, fields(%id))]
    pub async fn update(
        &self,
        id: CategoryId,
        params: &CategoryUpdate,
    ) -> Result<Category, ApiError> {
        let envelope: CategoryEnvelope = self
            .api
            .put(
                &format!("{CATEGORIES_PATH}/{id}"),
                &CategoryBody { category: params },
            )
            .await?;
        Ok(envelope.category)
    }

    #[instrument(skip(self), fields(%id))]
    pub async fn delete(&self, id: CategoryId) -> Result<(), ApiError> {
        self.api.delete(&format!("{CATEGORIES_PATH}/{id}")).await
    }
}
