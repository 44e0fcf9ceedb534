//! Green Mango admin API client.
//!
//! Everything a front end needs to talk to the Green Mango backend: a
//! session manager that keeps the access token fresh, a request pipeline
//! that signs and decodes every call, a route guard for protected views,
//! direct-to-storage uploads, and typed services per resource family.
//!
//! # Usage
//!
//! ```no_run
//! use green_mango_client::{Client, config::ClientConfig};
//!
//! # async fn run() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::from_env()?)?;
//! let profile = client.auth().login("admin@greenmango.shop", "hunter2").await?;
//! println!("signed in as {}", profile.full_name);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

pub mod api;
pub mod config;
pub mod error;
pub mod guard;
pub mod services;
pub mod session;
pub mod upload;

pub use api::ApiClient;
pub use config::{ClientConfig, ConfigError, UploadConfig};
pub use error::{ApiError, UploadError, UploadStage};
pub use guard::{Access, RouteGuard, SIGN_IN_PATH};
pub use session::{Session, SessionManager, SessionSnapshot, UserProfile};
pub use upload::{AttachmentSet, LocalFile, UploadCoordinator};

use services::{AuthService, BannersService, CategoriesService, ProductsService, UsersService};
use session::store::{FileSessionStore, SessionStore};
use session::state::SharedSession;

/// Entry point owning one session and one connection pool.
///
/// Cheap to clone; all clones share state. There is no process-wide
/// singleton: construct one and pass it (or the handles it vends) to
/// whatever needs backend access.
#[derive(Clone)]
pub struct Client {
    session: SessionManager,
    api: ApiClient,
    uploads: UploadCoordinator,
    auth: AuthService,
    users: UsersService,
    products: ProductsService,
    categories: CategoriesService,
    banners: BannersService,
}

impl Client {
    /// Build a client that persists its session to the configured file.
    pub fn new(config: ClientConfig) -> Result<Self, ApiError> {
        let store = FileSessionStore::new(config.session_file.clone());
        Self::with_store(config, Box::new(store))
    }

    /// Build a client with a caller-provided session store. Lets embedders
    /// and tests substitute persistence (e.g. in-memory).
    pub fn with_store(
        config: ClientConfig,
        store: Box<dyn SessionStore>,
    ) -> Result<Self, ApiError> {
        let state = SharedSession::load(Arc::from(store));
        let api = ApiClient::new(&config, Arc::clone(&state))?;
        let session = SessionManager::new(state, api.clone());
        let uploads = UploadCoordinator::new(api.clone(), config.upload)?;

        Ok(Self {
            auth: AuthService::new(api.clone(), session.clone()),
            users: UsersService::new(api.clone()),
            products: ProductsService::new(api.clone()),
            categories: CategoriesService::new(api.clone()),
            banners: BannersService::new(api.clone()),
            uploads,
            session,
            api,
        })
    }

    /// The shared session manager.
    #[must_use]
    pub const fn session(&self) -> &SessionManager {
        &self.session
    }

    /// The raw request pipeline, for endpoints without a typed wrapper.
    #[must_use]
    pub const fn api(&self) -> &ApiClient {
        &self.api
    }

    /// A fresh route guard subscribed to this client's session.
    #[must_use]
    pub fn guard(&self) -> RouteGuard {
        RouteGuard::new(self.session.clone())
    }

    #[must_use]
    pub const fn uploads(&self) -> &UploadCoordinator {
        &self.uploads
    }

    #[must_use]
    pub const fn auth(&self) -> &AuthService {
        &self.auth
    }

    #[must_use]
    pub const fn users(&self) -> &UsersService {
        &self.users
    }

    #[must_use]
    pub const fn products(&self) -> &ProductsService {
        &self.products
    }

    #[must_use]
    pub const fn categories(&self) -> &CategoriesService {
        &self.categories
    }

    #[must_use]
    pub const fn banners(&self) -> &BannersService {
        &self.banners
    }
}
