//! `microblog` operator CLI: apply migrations, seed a sample network and print
//! feeds.

use std::io::Write as _;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Context, Result, eyre};
use mockable::{Clock, DefaultClock};
use sample_data::{SampleNetworkSpec, generate_sample_network};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use microblog::config::{AppSettings, LogFormat};
use microblog::domain::{
    FeedPage, FeedService, MicropostService, SocialGraphService, UserAccountsService,
};
use microblog::outbound::hashing::Argon2PasswordHasher;
use microblog::outbound::persistence::{
    DbPool, DieselMicropostRepository, DieselRelationshipRepository, DieselUserRepository,
    PoolConfig, run_migrations,
};
use microblog::seeding::{SeedServices, seed_network};

#[derive(Debug, Parser)]
#[command(name = "microblog", version, about = "Operate the microblog backend")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply pending database migrations.
    Migrate,
    /// Generate and store a deterministic sample network.
    Seed {
        /// RNG seed; the same seed always yields the same network.
        #[arg(long, default_value_t = 42)]
        seed: u64,
        /// Number of users, including the demo account.
        #[arg(long, default_value_t = 100)]
        users: usize,
        /// Posts written by each posting user.
        #[arg(long, default_value_t = 50)]
        posts_per_user: usize,
    },
    /// Print a user's feed as JSON lines, newest first.
    Feed {
        /// Email of the user whose feed to show.
        #[arg(long)]
        email: String,
        /// Maximum number of posts.
        #[arg(long)]
        limit: Option<usize>,
    },
}

struct Backend {
    accounts: UserAccountsService<DieselUserRepository, Argon2PasswordHasher>,
    graph: SocialGraphService<DieselUserRepository, DieselRelationshipRepository>,
    posts: MicropostService<DieselUserRepository, DieselMicropostRepository>,
    feed: FeedService<DieselUserRepository, DieselMicropostRepository>,
}

impl Backend {
    async fn connect(settings: &AppSettings, database_url: &str) -> Result<Self> {
        let pool = DbPool::new(
            PoolConfig::new(database_url).with_max_size(settings.pool_max_size()),
        )
        .await
        .wrap_err("failed to build database pool")?;
        let hasher = Argon2PasswordHasher::new(
            settings.hash_memory_kib(),
            settings.hash_iterations(),
            settings.hash_parallelism(),
        )
        .wrap_err("invalid password hashing parameters")?;

        let users = Arc::new(DieselUserRepository::new(pool.clone()));
        let posts = Arc::new(DieselMicropostRepository::new(pool.clone()));
        let relationships = Arc::new(DieselRelationshipRepository::new(pool));
        let clock: Arc<dyn Clock> = Arc::new(DefaultClock);

        Ok(Self {
            accounts: UserAccountsService::new(
                Arc::clone(&users),
                Arc::new(hasher),
                Arc::clone(&clock),
            ),
            graph: SocialGraphService::new(Arc::clone(&users), relationships, Arc::clone(&clock)),
            posts: MicropostService::new(Arc::clone(&users), Arc::clone(&posts), clock),
            feed: FeedService::new(users, posts),
        })
    }
}

fn init_tracing(format: LogFormat) {
    let builder = fmt().with_env_filter(EnvFilter::from_default_env());
    let result = match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
    };
    if let Err(e) = result {
        warn!(error = %e, "tracing init failed");
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    let settings = AppSettings::load_from_env().map_err(|err| eyre!(err))?;
    init_tracing(settings.log_format().map_err(|err| eyre!(err))?);

    let database_url = settings
        .database_url()
        .ok_or_else(|| eyre!("set MICROBLOG_DATABASE_URL or DATABASE_URL"))?;

    match cli.command {
        Command::Migrate => {
            let applied = run_migrations(&database_url)
                .await
                .wrap_err("migration failed")?;
            info!(applied = ?applied, "database schema is up to date");
        }
        Command::Seed {
            seed,
            users,
            posts_per_user,
        } => {
            let spec = SampleNetworkSpec::new(seed, users)
                .and_then(|spec| spec.try_with_posts_per_user(posts_per_user))
                .wrap_err("invalid sample network size")?;
            let network = generate_sample_network(&spec);
            let backend = Backend::connect(&settings, &database_url).await?;
            let services = SeedServices {
                accounts: &backend.accounts,
                graph: &backend.graph,
                posts: &backend.posts,
            };
            let report = seed_network(services, &network)
                .await
                .wrap_err("seeding failed")?;
            info!(?report, seed, "seed complete");
        }
        Command::Feed { email, limit } => {
            let backend = Backend::connect(&settings, &database_url).await?;
            let user = backend
                .accounts
                .find_by_email(&email)
                .await
                .wrap_err("user lookup failed")?
                .ok_or_else(|| eyre!("no user with email {email}"))?;
            let feed = backend
                .feed
                .feed(&user.id(), FeedPage::new(limit))
                .await
                .wrap_err("feed query failed")?;

            let mut out = std::io::stdout().lock();
            for post in &feed.posts {
                serde_json::to_writer(&mut out, post).wrap_err("failed to encode post")?;
                writeln!(out).wrap_err("failed to write feed")?;
            }
            if feed.next.is_some() {
                info!(shown = feed.posts.len(), "more posts available");
            }
        }
    }
    Ok(())
}
