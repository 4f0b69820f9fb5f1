use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use twixxer_core::traits::{ChirpStore, ProfileStore};
use twixxer_core::PageRequest;
use twixxer_db::{Database, DatabaseConfig};

#[derive(Parser)]
#[command(name = "twixxer", version, about = "Twixxer administration")]
struct Cli {
    /// PostgreSQL connection string
    #[arg(long, global = true, env = "DATABASE_URL", hide_env_values = true)]
    database_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply pending database migrations
    Migrate,

    /// Mark an account verified without the emailed link
    Verify {
        /// Email address or username
        login: String,
    },

    /// List the newest accounts
    Users {
        /// Number of accounts to show
        #[arg(short, long, default_value_t = 20)]
        limit: usize,
    },

    /// Print a page of the feed
    Feed {
        /// Only chirps by this user
        #[arg(short, long)]
        user: Option<String>,

        #[arg(short, long, default_value_t = 0)]
        offset: usize,

        /// Page size (at most 50)
        #[arg(short, long, default_value_t = 20)]
        limit: usize,

        /// Print the page as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("twixxer=info".parse()?))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let db = connect_db(cli.database_url).await?;

    match cli.command {
        Commands::Migrate => {
            db.migrate().await?;
            println!("Migrations applied");
        }
        Commands::Verify { login } => cmd_verify(&db, &login).await?,
        Commands::Users { limit } => cmd_users(&db, limit).await?,
        Commands::Feed {
            user,
            offset,
            limit,
            json,
        } => {
            let page = PageRequest::new(Some(offset), Some(limit));
            cmd_feed(&db, user.as_deref(), page, json).await?;
        }
    }

    Ok(())
}

/// Connect using `--database-url`, falling back to the `DATABASE_*` variables.
async fn connect_db(url: Option<String>) -> Result<Database> {
    let config = match url {
        Some(url) => DatabaseConfig {
            url,
            max_connections: 2,
        },
        None => DatabaseConfig::from_env().context("Pass --database-url or set DATABASE_URL")?,
    };

    Database::connect(&config)
        .await
        .context("Failed to connect to database")
}

async fn cmd_verify(db: &Database, login: &str) -> Result<()> {
    let profiles = db.profile_repo();
    let profile = profiles
        .find_by_login(login)
        .await?
        .with_context(|| format!("No account matches '{login}'"))?;

    if profile.verified {
        println!("{} is already verified", profile.username);
        return Ok(());
    }

    profiles.mark_verified(profile.id).await?;
    tracing::info!(profile_id = %profile.id, "Profile verified from the command line");
    println!("Verified {} <{}>", profile.username, profile.email);

    Ok(())
}

async fn cmd_users(db: &Database, limit: usize) -> Result<()> {
    let profiles = db.profile_repo().list(limit).await?;

    if profiles.is_empty() {
        println!("No accounts yet");
        return Ok(());
    }

    for profile in &profiles {
        let status = if profile.verified {
            "verified"
        } else {
            "pending"
        };
        println!(
            "  [{:<8}] {} <{}> joined {}",
            status,
            profile.username,
            profile.email,
            profile.created_at.format("%Y-%m-%d %H:%M UTC"),
        );
    }
    println!("\nShowing {} accounts", profiles.len());

    Ok(())
}

async fn cmd_feed(db: &Database, user: Option<&str>, page: PageRequest, json: bool) -> Result<()> {
    let chirps = db.chirp_repo();

    let (result, total) = match user {
        Some(username) => {
            let profile = db
                .profile_repo()
                .find_by_username(username)
                .await?
                .with_context(|| format!("No user named '{username}'"))?;
            (
                chirps.profile_page(profile.id, page).await?,
                chirps.count(Some(profile.id)).await?,
            )
        }
        None => (chirps.feed_page(page).await?, chirps.count(None).await?),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
        return Ok(());
    }

    if result.items.is_empty() {
        println!("No chirps at offset {}", result.offset);
        return Ok(());
    }

    for chirp in &result.items {
        println!(
            "  {} @{}: {}",
            chirp.created_at.format("%Y-%m-%d %H:%M"),
            chirp.username,
            chirp.content,
        );
    }

    match result.next_offset {
        Some(next) => println!("\n{total} chirps total; next page: --offset {next}"),
        None => println!("\n{total} chirps total; end of feed"),
    }

    Ok(())
}
