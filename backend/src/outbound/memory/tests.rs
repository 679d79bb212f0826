//! Constraint coverage for the in-memory store.

use chrono::{Duration, Utc};
use rstest::{fixture, rstest};

use super::*;
use crate::domain::{MicropostContent, UserName};
use crate::test_support::fixture_timestamp;

fn user(name: &str, email: &str) -> User {
    User::new(
        UserId::random(),
        UserName::new(name).expect("valid name"),
        EmailAddress::new(email).expect("valid email"),
        fixture_timestamp(),
    )
}

fn post(author: UserId, minutes_ago: i64) -> Micropost {
    Micropost::new(
        MicropostId::random(),
        author,
        MicropostContent::new(format!("{minutes_ago} minutes ago")).expect("valid content"),
        fixture_timestamp() - Duration::minutes(minutes_ago),
    )
}

fn edge(follower: &User, followed: &User) -> Relationship {
    Relationship::new(follower.id(), followed.id(), Utc::now()).expect("distinct users")
}

#[fixture]
fn store() -> InMemoryStore {
    InMemoryStore::new()
}

async fn seeded(store: &InMemoryStore, users: &[&User]) {
    for user in users {
        UserRepository::insert(store, user)
            .await
            .expect("insert user");
    }
}

#[rstest]
#[tokio::test]
async fn duplicate_emails_are_rejected(store: InMemoryStore) {
    let first = user("First", "dup@example.com");
    let second = user("Second", "DUP@example.com");
    seeded(&store, &[&first]).await;

    let result = UserRepository::insert(&store, &second).await;
    assert!(matches!(
        result,
        Err(UserPersistenceError::DuplicateEmail { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn update_of_a_missing_user_is_not_found(store: InMemoryStore) {
    let ghost = user("Ghost", "ghost@example.com");
    let result = UserRepository::update(&store, &ghost).await;
    assert!(matches!(result, Err(UserPersistenceError::NotFound { .. })));
}

#[rstest]
#[tokio::test]
async fn posts_require_an_existing_author(store: InMemoryStore) {
    let result = MicropostRepository::insert(&store, &post(UserId::random(), 0)).await;
    assert!(matches!(
        result,
        Err(MicropostPersistenceError::AuthorNotFound { .. })
    ));
}

#[rstest]
#[tokio::test]
async fn edges_require_existing_endpoints(store: InMemoryStore) {
    let known = user("Known", "known@example.com");
    let unknown = user("Unknown", "unknown@example.com");
    seeded(&store, &[&known]).await;

    let result = RelationshipRepository::insert(&store, &edge(&known, &unknown)).await;
    assert_eq!(
        result,
        Err(RelationshipPersistenceError::unknown_user("followed_id"))
    );
    let result = RelationshipRepository::insert(&store, &edge(&unknown, &known)).await;
    assert_eq!(
        result,
        Err(RelationshipPersistenceError::unknown_user("follower_id"))
    );
}

#[rstest]
#[tokio::test]
async fn repeated_edges_are_reported_as_existing(store: InMemoryStore) {
    let a = user("A", "a@example.com");
    let b = user("B", "b@example.com");
    seeded(&store, &[&a, &b]).await;

    assert_eq!(RelationshipRepository::insert(&store, &edge(&a, &b)).await, Ok(true));
    assert_eq!(RelationshipRepository::insert(&store, &edge(&a, &b)).await, Ok(false));
    assert_eq!(store.following_count(&a.id()).await, Ok(1));
    assert_eq!(store.follower_count(&b.id()).await, Ok(1));
    assert_eq!(store.follower_count(&a.id()).await, Ok(0));
}

#[rstest]
#[tokio::test]
async fn deleting_a_user_cascades(store: InMemoryStore) {
    let doomed = user("Doomed", "doomed@example.com");
    let friend = user("Friend", "friend@example.com");
    seeded(&store, &[&doomed, &friend]).await;
    for minutes in 0..3 {
        MicropostRepository::insert(&store, &post(doomed.id(), minutes))
            .await
            .expect("insert post");
    }
    MicropostRepository::insert(&store, &post(friend.id(), 0))
        .await
        .expect("insert post");
    RelationshipRepository::insert(&store, &edge(&doomed, &friend))
        .await
        .expect("insert edge");
    RelationshipRepository::insert(&store, &edge(&friend, &doomed))
        .await
        .expect("insert edge");

    let deleted = UserRepository::delete(&store, &doomed.id())
        .await
        .expect("delete succeeds")
        .expect("user existed");

    assert_eq!(deleted.microposts_removed, 3);
    assert_eq!(deleted.relationships_removed, 2);
    assert_eq!(MicropostRepository::count(&store).await, Ok(1));
    assert_eq!(store.following_count(&friend.id()).await, Ok(0));
    assert_eq!(store.follower_count(&friend.id()).await, Ok(0));
    assert_eq!(UserRepository::delete(&store, &doomed.id()).await, Ok(None));
}

#[rstest]
#[tokio::test]
async fn followers_are_ordered_by_name(store: InMemoryStore) {
    let target = user("Target", "target@example.com");
    let zed = user("Zed", "zed@example.com");
    let amy = user("Amy", "amy@example.com");
    seeded(&store, &[&target, &zed, &amy]).await;
    for follower in [&zed, &amy] {
        RelationshipRepository::insert(&store, &edge(follower, &target))
            .await
            .expect("insert edge");
    }

    let names: Vec<String> = store
        .followers(&target.id())
        .await
        .expect("followers")
        .iter()
        .map(|user| user.name().to_string())
        .collect();
    assert_eq!(names, vec!["Amy", "Zed"]);
}

#[rstest]
#[tokio::test]
async fn names_sort_in_byte_order_like_the_database(store: InMemoryStore) {
    let reader = user("Reader", "reader@example.com");
    let lower = user("alice", "alice@example.com");
    let upper = user("Zed", "zed@example.com");
    let accented = user("\u{c9}mile", "emile@example.com");
    seeded(&store, &[&reader, &lower, &upper, &accented]).await;
    for followed in [&lower, &upper, &accented] {
        RelationshipRepository::insert(&store, &edge(&reader, followed))
            .await
            .expect("insert edge");
    }

    let names: Vec<String> = store
        .following(&reader.id())
        .await
        .expect("following")
        .iter()
        .map(|user| user.name().to_string())
        .collect();
    assert_eq!(names, vec!["Zed", "alice", "\u{c9}mile"]);
}

#[rstest]
#[tokio::test]
async fn feed_pages_walk_backwards_without_gaps(store: InMemoryStore) {
    let reader = user("Reader", "reader@example.com");
    let followed = user("Followed", "followed@example.com");
    let stranger = user("Stranger", "stranger@example.com");
    seeded(&store, &[&reader, &followed, &stranger]).await;
    RelationshipRepository::insert(&store, &edge(&reader, &followed))
        .await
        .expect("insert edge");
    for minutes in 0..5 {
        for author in [&reader, &followed, &stranger] {
            MicropostRepository::insert(&store, &post(author.id(), minutes))
                .await
                .expect("insert post");
        }
    }

    let first = store
        .feed(&reader.id(), &FeedPage::new(Some(4)))
        .await
        .expect("first page");
    let cursor = first.last().map(Micropost::cursor).expect("non-empty page");
    let rest = store
        .feed(&reader.id(), &FeedPage::new(Some(100)).before(cursor))
        .await
        .expect("second page");

    let all: Vec<&Micropost> = first.iter().chain(rest.iter()).collect();
    assert_eq!(all.len(), 10);
    assert!(all.iter().all(|post| post.author_id() != stranger.id()));
    assert!(all.windows(2).all(|pair| match pair {
        [newer, older] => (newer.created_at(), newer.id()) > (older.created_at(), older.id()),
        _ => true,
    }));
}
