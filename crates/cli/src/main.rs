//! Green Mango CLI - Admin API tools from the terminal.
//!
//! # Usage
//!
//! ```bash
//! # Sign in (session persists to GM_SESSION_FILE)
//! gm-cli auth login -e admin@example.com -p secret
//!
//! # Show the signed-in user
//! gm-cli auth whoami
//!
//! # List products matching a search
//! gm-cli products list -q mango --page 1
//!
//! # Upload images and print their blob references
//! gm-cli upload photo1.jpg photo2.png
//! ```
//!
//! # Commands
//!
//! - `auth login | logout | whoami` - Session management
//! - `users list | create | delete` - User administration
//! - `products list | create | delete` - Catalog administration
//! - `categories list | create | delete` - Category tree
//! - `banners list | create | delete | reorder` - Banner administration
//! - `upload` - Direct-to-storage file uploads
//!
//! Create commands that take an image path (`users create --avatar`,
//! `products create --image`, `banners create --image`) upload the file
//! first and attach the resulting blob reference to the create call.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use green_mango_client::{Client, ClientConfig};

mod commands;

#[derive(Parser)]
#[command(name = "gm-cli")]
#[command(author, version, about = "Green Mango admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage the saved session
    Auth {
        #[command(subcommand)]
        action: AuthAction,
    },
    /// Administer user accounts
    Users {
        #[command(subcommand)]
        action: UserAction,
    },
    /// Administer the product catalog
    Products {
        #[command(subcommand)]
        action: ProductAction,
    },
    /// Administer the category tree
    Categories {
        #[command(subcommand)]
        action: CategoryAction,
    },
    /// Administer promotional banners
    Banners {
        #[command(subcommand)]
        action: BannerAction,
    },
    /// Upload files to object storage and print their blob references
    Upload {
        /// Files to upload, in order
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[derive(Subcommand)]
enum AuthAction {
    /// Sign in and persist the session
    Login {
        /// Account email address
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long)]
        password: String,
    },
    /// Sign out and clear the saved session
    Logout,
    /// Show the signed-in user
    Whoami,
}

#[derive(Subcommand)]
enum UserAction {
    /// List users
    List {
        #[command(flatten)]
        filters: commands::entities::ListFilters,
    },
    /// Create a user, optionally uploading an avatar image
    Create {
        #[command(flatten)]
        args: commands::entities::UserCreateArgs,
    },
    /// Delete a user by ID
    Delete {
        /// User ID
        id: i32,
    },
}

#[derive(Subcommand)]
enum ProductAction {
    /// List products
    List {
        #[command(flatten)]
        filters: commands::entities::ListFilters,
    },
    /// Create a product, optionally uploading images
    Create {
        #[command(flatten)]
        args: commands::entities::ProductCreateArgs,
    },
    /// Delete a product by ID
    Delete {
        /// Product ID
        id: i32,
    },
}

#[derive(Subcommand)]
enum CategoryAction {
    /// List categories
    List {
        #[command(flatten)]
        filters: commands::entities::ListFilters,
    },
    /// Create a category
    Create {
        #[command(flatten)]
        args: commands::entities::CategoryCreateArgs,
    },
    /// Delete a category by ID
    Delete {
        /// Category ID
        id: i32,
    },
}

#[derive(Subcommand)]
enum BannerAction {
    /// List banners
    List {
        #[command(flatten)]
        filters: commands::entities::ListFilters,
    },
    /// Create a banner, optionally uploading its image
    Create {
        #[command(flatten)]
        args: commands::entities::BannerCreateArgs,
    },
    /// Delete a banner by ID
    Delete {
        /// Banner ID
        id: i32,
    },
    /// Rewrite the display order, e.g. `gm-cli banners reorder 3 1 2`
    Reorder {
        /// Banner IDs in the desired display order
        #[arg(required = true)]
        ids: Vec<i32>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result: Result<(), Box<dyn std::error::Error>> = run(cli).await;

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let client = Client::new(ClientConfig::from_env()?)?;

    match cli.command {
        Commands::Auth { action } => match action {
            AuthAction::Login { email, password } => {
                commands::auth::login(&client, &email, &password).await?;
            }
            AuthAction::Logout => commands::auth::logout(&client).await,
            AuthAction::Whoami => commands::auth::whoami(&client).await?,
        },
        Commands::Users { action } => match action {
            UserAction::List { filters } => {
                commands::entities::list_users(&client, filters).await?;
            }
            UserAction::Create { args } => {
                commands::entities::create_user(&client, args).await?;
            }
            UserAction::Delete { id } => {
                commands::entities::delete_user(&client, id).await?;
            }
        },
        Commands::Products { action } => match action {
            ProductAction::List { filters } => {
                commands::entities::list_products(&client, filters).await?;
            }
            ProductAction::Create { args } => {
                commands::entities::create_product(&client, args).await?;
            }
            ProductAction::Delete { id } => {
                commands::entities::delete_product(&client, id).await?;
            }
        },
        Commands::Categories { action } => match action {
            CategoryAction::List { filters } => {
                commands::entities::list_categories(&client, filters).await?;
            }
            CategoryAction::Create { args } => {
                commands::entities::create_category(&client, args).await?;
            }
            CategoryAction::Delete { id } => {
                commands::entities::delete_category(&client, id).await?;
            }
        },
        Commands::Banners { action } => match action {
            BannerAction::List { filters } => {
                commands::entities::list_banners(&client, filters).await?;
            }
            BannerAction::Create { args } => {
                commands::entities::create_banner(&client, args).await?;
            }
            BannerAction::Delete { id } => {
                commands::entities::delete_banner(&client, id).await?;
            }
            BannerAction::Reorder { ids } => {
                commands::entities::reorder_banners(&client, &ids).await?;
            }
        },
        Commands::Upload { files } => commands::upload::upload(&client, &files).await?,
    }
    Ok(())
}
