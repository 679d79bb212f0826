//! Diesel adapters against an embedded PostgreSQL with the real migrations.
//!
//! Opt-in: run with `RUN_PG_EMBEDDED=1 cargo test -- --ignored`.

#[allow(dead_code)]
mod support;

use std::sync::Arc;

use microblog::domain::{
    ErrorCode, FeedPage, FeedService, FollowOutcome, MicropostService, SignupRequest,
    SocialGraphService, UserAccountsService, UserId,
};
use microblog::outbound::hashing::Argon2PasswordHasher;
use microblog::outbound::persistence::{
    DbPool, DieselMicropostRepository, DieselRelationshipRepository, DieselUserRepository,
    PoolConfig,
};
use microblog::test_support::{MutableClock, fixture_timestamp};
use mockable::Clock;
use rstest::{fixture, rstest};
use tokio::runtime::Runtime;

use support::{
    MigratedDatabase, embedded_postgres_enabled, handle_cluster_setup_failure,
    provision_migrated_database,
};

struct Backend {
    runtime: Runtime,
    clock: Arc<MutableClock>,
    accounts: UserAccountsService<DieselUserRepository, Argon2PasswordHasher>,
    graph: SocialGraphService<DieselUserRepository, DieselRelationshipRepository>,
    posts: MicropostService<DieselUserRepository, DieselMicropostRepository>,
    feed: FeedService<DieselUserRepository, DieselMicropostRepository>,
    database: MigratedDatabase,
}

impl Backend {
    fn connect(database: MigratedDatabase) -> Result<Self, String> {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(|err| err.to_string())?;
        let pool = runtime
            .block_on(DbPool::new(PoolConfig::new(database.url()).with_max_size(2)))
            .map_err(|err| err.to_string())?;
        let hasher = Argon2PasswordHasher::new(8, 1, 1).map_err(|err| err.to_string())?;

        let users = Arc::new(DieselUserRepository::new(pool.clone()));
        let posts = Arc::new(DieselMicropostRepository::new(pool.clone()));
        let relationships = Arc::new(DieselRelationshipRepository::new(pool));
        let clock = Arc::new(MutableClock::new(fixture_timestamp()));
        let shared_clock: Arc<dyn Clock> = clock.clone();

        Ok(Self {
            runtime,
            accounts: UserAccountsService::new(
                Arc::clone(&users),
                Arc::new(hasher),
                Arc::clone(&shared_clock),
            ),
            graph: SocialGraphService::new(
                Arc::clone(&users),
                relationships,
                Arc::clone(&shared_clock),
            ),
            posts: MicropostService::new(Arc::clone(&users), Arc::clone(&posts), shared_clock),
            feed: FeedService::new(users, posts),
            clock,
            database,
        })
    }

    fn sign_up(&self, name: &str, email: &str) -> UserId {
        self.runtime
            .block_on(self.accounts.sign_up(SignupRequest::new(name, email, "foobar")))
            .expect("sign-up succeeds")
            .id()
    }

    fn write_posts(&self, author: &UserId, count: usize) {
        for n in 0..count {
            self.clock.advance_seconds(1);
            self.runtime
                .block_on(self.posts.post(author, format!("post {n}")))
                .expect("post is stored");
        }
    }
}

#[fixture]
fn backend() -> Option<Backend> {
    if !embedded_postgres_enabled() {
        eprintln!("SKIP-TEST-CLUSTER: set RUN_PG_EMBEDDED=1 to run");
        return None;
    }
    let database = match provision_migrated_database() {
        Ok(database) => database,
        Err(reason) => return handle_cluster_setup_failure(reason),
    };
    match Backend::connect(database) {
        Ok(backend) => Some(backend),
        Err(reason) => handle_cluster_setup_failure(reason),
    }
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn emails_are_unique_case_insensitively(backend: Option<Backend>) {
    let Some(backend) = backend else { return };
    backend.sign_up("Michael", "Michael@Example.com");

    let stored = backend
        .runtime
        .block_on(backend.accounts.find_by_email("MICHAEL@example.COM"))
        .expect("lookup succeeds")
        .expect("user exists");
    assert_eq!(stored.email().as_ref(), "michael@example.com");

    let err = backend
        .runtime
        .block_on(
            backend
                .accounts
                .sign_up(SignupRequest::new("Copy", "MICHAEL@EXAMPLE.COM", "foobar")),
        )
        .expect_err("duplicate email is rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
    assert!(!err.field_messages("email").is_empty());
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn argon2_digests_authenticate(backend: Option<Backend>) {
    let Some(backend) = backend else { return };
    backend.sign_up("Lana", "lana@example.gov");

    let ok = backend
        .runtime
        .block_on(backend.accounts.authenticate("lana@example.gov", "foobar"))
        .expect("lookup succeeds");
    let wrong = backend
        .runtime
        .block_on(backend.accounts.authenticate("lana@example.gov", "foobaz"))
        .expect("lookup succeeds");
    assert!(ok.is_some());
    assert!(wrong.is_none());
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn follows_are_idempotent_and_self_follows_fail(backend: Option<Backend>) {
    let Some(backend) = backend else { return };
    let michael = backend.sign_up("Michael", "michael@example.com");
    let archer = backend.sign_up("Archer", "archer@example.gov");

    let first = backend
        .runtime
        .block_on(backend.graph.follow(&michael, &archer))
        .expect("follow succeeds");
    let second = backend
        .runtime
        .block_on(backend.graph.follow(&michael, &archer))
        .expect("repeat follow succeeds");
    assert_eq!(first, FollowOutcome::Followed);
    assert_eq!(second, FollowOutcome::AlreadyFollowing);

    let followers = backend
        .runtime
        .block_on(backend.graph.followers(&archer))
        .expect("followers load");
    assert_eq!(followers.len(), 1);
    assert_eq!(followers[0].id(), michael);

    let err = backend
        .runtime
        .block_on(backend.graph.follow(&michael, &michael))
        .expect_err("self-follow is rejected");
    assert_eq!(err.code(), ErrorCode::InvalidRequest);
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn following_sorts_names_in_byte_order(backend: Option<Backend>) {
    let Some(backend) = backend else { return };
    let reader = backend.sign_up("Reader", "reader@example.com");
    for (name, email) in [
        ("alice", "alice@example.com"),
        ("Zed", "zed@example.com"),
        ("\u{c9}mile", "emile@example.com"),
    ] {
        let followed = backend.sign_up(name, email);
        backend
            .runtime
            .block_on(backend.graph.follow(&reader, &followed))
            .expect("follow succeeds");
    }

    let names: Vec<String> = backend
        .runtime
        .block_on(backend.graph.following(&reader))
        .expect("following loads")
        .iter()
        .map(|user| user.name().to_string())
        .collect();
    assert_eq!(names, vec!["Zed", "alice", "\u{c9}mile"]);
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn feed_pages_through_followed_posts_newest_first(backend: Option<Backend>) {
    let Some(backend) = backend else { return };
    let michael = backend.sign_up("Michael", "michael@example.com");
    let lana = backend.sign_up("Lana", "lana@example.gov");
    let archer = backend.sign_up("Archer", "archer@example.gov");
    backend.write_posts(&michael, 4);
    backend.write_posts(&lana, 4);
    backend.write_posts(&archer, 4);
    backend
        .runtime
        .block_on(backend.graph.follow(&michael, &lana))
        .expect("follow succeeds");

    let mut seen = Vec::new();
    let mut page = FeedPage::new(Some(3));
    loop {
        let feed = backend
            .runtime
            .block_on(backend.feed.feed(&michael, page))
            .expect("feed loads");
        seen.extend(feed.posts);
        match feed.next {
            Some(cursor) => page = FeedPage::new(Some(3)).before(cursor),
            None => break,
        }
    }

    assert_eq!(seen.len(), 8);
    assert!(seen.iter().all(|post| post.author_id() != archer));
    assert!(
        seen.windows(2)
            .all(|pair| pair[0].created_at() > pair[1].created_at())
    );
}

#[rstest]
#[ignore = "requires embedded Postgres binaries; opt-in via RUN_PG_EMBEDDED=1"]
fn destroying_a_user_cascades(backend: Option<Backend>) {
    let Some(backend) = backend else { return };
    let michael = backend.sign_up("Michael", "michael@example.com");
    let lana = backend.sign_up("Lana", "lana@example.gov");
    backend.write_posts(&michael, 3);
    backend.write_posts(&lana, 2);
    backend
        .runtime
        .block_on(backend.graph.follow(&michael, &lana))
        .expect("follow succeeds");
    backend
        .runtime
        .block_on(backend.graph.follow(&lana, &michael))
        .expect("follow succeeds");

    let deleted = backend
        .runtime
        .block_on(backend.accounts.destroy(&michael))
        .expect("destroy succeeds");
    assert_eq!(deleted.microposts_removed, 3);
    assert_eq!(deleted.relationships_removed, 2);

    let mut client = backend.database.client().expect("client connects");
    let posts: i64 = client
        .query_one("SELECT count(*) FROM microposts", &[])
        .expect("count query")
        .get(0);
    let edges: i64 = client
        .query_one("SELECT count(*) FROM relationships", &[])
        .expect("count query")
        .get(0);
    assert_eq!(posts, 2);
    assert_eq!(edges, 0);
}
