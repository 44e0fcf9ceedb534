//! Listing and management commands for the admin resources.

use std::path::PathBuf;

use clap::{Args, ValueEnum};
use rust_decimal::Decimal;
use thiserror::Error;

use green_mango_client::services::ListQuery;
use green_mango_client::services::banners::{BannerCreate, BannerPosition};
use green_mango_client::services::categories::CategoryCreate;
use green_mango_client::services::products::ProductCreate;
use green_mango_client::services::users::UserCreate;
use green_mango_client::{ApiError, Client, LocalFile, UploadError};
use green_mango_core::{
    BannerId, CategoryId, EntityStatus, Paginated, Price, ProductId, SortDirection, UserId,
    UserRole,
};

#[derive(Debug, Error)]
pub enum EntityCommandError {
    #[error(transparent)]
    Api(#[from] ApiError),

    /// Attaching an image to a create call failed during the upload leg.
    #[error(transparent)]
    Upload(#[from] UploadError),
}

/// Listing filters shared by every resource family.
#[derive(Debug, Args)]
pub struct ListFilters {
    /// Free-text search
    #[arg(short, long)]
    q: Option<String>,

    /// Filter by lifecycle status
    #[arg(long, value_enum)]
    status: Option<StatusArg>,

    /// Column to sort by
    #[arg(long)]
    sort_by: Option<String>,

    /// Sort direction
    #[arg(long, value_enum)]
    sort_dir: Option<SortDirArg>,

    /// 1-based page number
    #[arg(long)]
    page: Option<u32>,

    /// Page size
    #[arg(long)]
    per_page: Option<u32>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum StatusArg {
    Active,
    Inactive,
}

impl From<StatusArg> for EntityStatus {
    fn from(status: StatusArg) -> Self {
        match status {
            StatusArg::Active => Self::Active,
            StatusArg::Inactive => Self::Inactive,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    User,
    Admin,
}

impl From<RoleArg> for UserRole {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::User => Self::User,
            RoleArg::Admin => Self::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum SortDirArg {
    Asc,
    Desc,
}

impl From<ListFilters> for ListQuery {
    fn from(filters: ListFilters) -> Self {
        Self {
            q: filters.q,
            status: filters.status.map(EntityStatus::from),
            sort_by: filters.sort_by,
            sort_dir: filters.sort_dir.map(|d| match d {
                SortDirArg::Asc => SortDirection::Asc,
                SortDirArg::Desc => SortDirection::Desc,
            }),
            page: filters.page,
            per_page: filters.per_page,
            ..Self::default()
        }
    }
}

/// Fields for `users create`.
#[derive(Debug, Args)]
pub struct UserCreateArgs {
    /// Email address
    #[arg(short, long)]
    email: String,

    /// Initial password (also used as the confirmation)
    #[arg(short, long)]
    password: String,

    /// Display name
    #[arg(long)]
    full_name: String,

    /// Back-office role
    #[arg(long, value_enum, default_value = "user")]
    role: RoleArg,

    /// Contact phone number
    #[arg(long)]
    phone: Option<String>,

    /// Avatar image file, uploaded and attached to the new account
    #[arg(long)]
    avatar: Option<PathBuf>,
}

/// Fields for `products create`.
#[derive(Debug, Args)]
pub struct ProductCreateArgs {
    /// Product name
    #[arg(long)]
    name: String,

    /// Long-form description
    #[arg(long)]
    description: Option<String>,

    /// Unit price, e.g. `12.50`
    #[arg(long)]
    price: Decimal,

    /// Units in stock
    #[arg(long, default_value_t = 0)]
    stock: i32,

    /// Category ID to file the product under
    #[arg(long)]
    category: Option<i32>,

    /// Lifecycle status
    #[arg(long, value_enum, default_value = "active")]
    status: StatusArg,

    /// Image files, uploaded and attached in order (repeatable)
    #[arg(long = "image")]
    images: Vec<PathBuf>,
}

/// Fields for `categories create`.
#[derive(Debug, Args)]
pub struct CategoryCreateArgs {
    /// Category name
    #[arg(long)]
    name: String,

    /// Long-form description
    #[arg(long)]
    description: Option<String>,

    /// Parent category ID for a subcategory
    #[arg(long)]
    parent: Option<i32>,

    /// Lifecycle status
    #[arg(long, value_enum, default_value = "active")]
    status: StatusArg,
}

/// Fields for `banners create`.
#[derive(Debug, Args)]
pub struct BannerCreateArgs {
    /// Banner title
    #[arg(long)]
    title: String,

    /// Click-through URL
    #[arg(long)]
    link: Option<String>,

    /// Position in the carousel, 1-based
    #[arg(long, default_value_t = 1)]
    order: i32,

    /// Lifecycle status
    #[arg(long, value_enum, default_value = "active")]
    status: StatusArg,

    /// Banner image file, uploaded and attached
    #[arg(long)]
    image: Option<PathBuf>,
}

#[allow(clippy::print_stdout)]
fn print_page_footer<T>(page: &Paginated<T>) {
    println!(
        "page {} of {} ({} total)",
        page.meta.page, page.meta.total_pages, page.meta.total_count
    );
}

#[allow(clippy::print_stdout)]
pub async fn list_users(client: &Client, filters: ListFilters) -> Result<(), ApiError> {
    let page = client.users().list(&filters.into()).await?;
    for user in &page.data {
        println!("{:>6}  {:<30}  {}", user.id, user.email, user.full_name);
    }
    print_page_footer(&page);
    Ok(())
}

/// Create a user, uploading the avatar first when one is given.
#[allow(clippy::print_stdout)]
pub async fn create_user(client: &Client, args: UserCreateArgs) -> Result<(), EntityCommandError> {
    let avatar = match args.avatar {
        Some(path) => {
            let file = LocalFile::from_path(&path).await?;
            Some(client.uploads().upload(&file).await?)
        }
        None => None,
    };

    let params = UserCreate {
        email: args.email,
        password: args.password.clone(),
        password_confirmation: args.password,
        full_name: args.full_name,
        role: args.role.into(),
        phone: args.phone,
        avatar,
    };
    let user = client.users().create(&params).await?;
    println!("Created user {} <{}>", user.id, user.email);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn delete_user(client: &Client, id: i32) -> Result<(), ApiError> {
    client.users().delete(UserId::new(id)).await?;
    println!("Deleted user {id}.");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn list_products(client: &Client, filters: ListFilters) -> Result<(), ApiError> {
    let page = client.products().list(&filters.into()).await?;
    for product in &page.data {
        println!(
            "{:>6}  {:<40}  {:>10}  {}",
            product.id, product.name, product.price, product.status
        );
    }
    print_page_footer(&page);
    Ok(())
}

/// Create a product, uploading any images first and carrying their blob
/// references on the create call.
#[allow(clippy::print_stdout)]
pub async fn create_product(
    client: &Client,
    args: ProductCreateArgs,
) -> Result<(), EntityCommandError> {
    let mut files = Vec::with_capacity(args.images.len());
    for path in &args.images {
        files.push(LocalFile::from_path(path).await?);
    }
    let references = client.uploads().upload_all(&files).await?;

    let params = ProductCreate {
        name: args.name,
        description: args.description,
        price: Price::new(args.price),
        stock_quantity: args.stock,
        status: args.status.into(),
        category_id: args.category.map(CategoryId::new),
        new_image_signed_ids: references,
    };
    let product = client.products().create(&params).await?;
    println!("Created product {}  {}", product.id, product.name);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn delete_product(client: &Client, id: i32) -> Result<(), ApiError> {
    client.products().delete(ProductId::new(id)).await?;
    println!("Deleted product {id}.");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn list_categories(client: &Client, filters: ListFilters) -> Result<(), ApiError> {
    let page = client.categories().list(&filters.into()).await?;
    for category in &page.data {
        let parent = category.parent_name.as_deref().unwrap_or("-");
        println!("{:>6}  {:<30}  parent: {}", category.id, category.name, parent);
    }
    print_page_footer(&page);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn create_category(
    client: &Client,
    args: CategoryCreateArgs,
) -> Result<(), ApiError> {
    let params = CategoryCreate {
        name: args.name,
        description: args.description,
        parent_id: args.parent.map(CategoryId::new),
        status: args.status.into(),
    };
    let category = client.categories().create(&params).await?;
    println!("Created category {}  {}", category.id, category.name);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn delete_category(client: &Client, id: i32) -> Result<(), ApiError> {
    client.categories().delete(CategoryId::new(id)).await?;
    println!("Deleted category {id}.");
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn list_banners(client: &Client, filters: ListFilters) -> Result<(), ApiError> {
    let page = client.banners().list(&filters.into()).await?;
    for banner in &page.data {
        println!(
            "{:>6}  #{:<3}  {:<40}  {}",
            banner.id, banner.display_order, banner.title, banner.status
        );
    }
    print_page_footer(&page);
    Ok(())
}

/// Create a banner, uploading the image first when one is given.
#[allow(clippy::print_stdout)]
pub async fn create_banner(
    client: &Client,
    args: BannerCreateArgs,
) -> Result<(), EntityCommandError> {
    let image_signed_id = match args.image {
        Some(path) => {
            let file = LocalFile::from_path(&path).await?;
            Some(client.uploads().upload(&file).await?)
        }
        None => None,
    };

    let params = BannerCreate {
        title: args.title,
        link_url: args.link,
        display_order: args.order,
        status: args.status.into(),
        image_signed_id,
    };
    let banner = client.banners().create(&params).await?;
    println!("Created banner {}  {}", banner.id, banner.title);
    Ok(())
}

#[allow(clippy::print_stdout)]
pub async fn delete_banner(client: &Client, id: i32) -> Result<(), ApiError> {
    client.banners().delete(BannerId::new(id)).await?;
    println!("Deleted banner {id}.");
    Ok(())
}

/// Rewrite banner display order from the given ID sequence.
#[allow(clippy::print_stdout)]
pub async fn reorder_banners(client: &Client, ids: &[i32]) -> Result<(), ApiError> {
    let positions: Vec<BannerPosition> = ids
        .iter()
        .enumerate()
        .map(|(index, id)| BannerPosition {
            id: BannerId::new(*id),
            display_order: i32::try_from(index + 1).unwrap_or(i32::MAX),
        })
        .collect();

    client.banners().reorder(&positions).await?;
    println!("Reordered {} banners.", positions.len());
    Ok(())
}
