//! In-memory adapter implementing every repository port.
//!
//! One [`InMemoryStore`] backs users, microposts and relationships together so
//! it can enforce the same constraints as the PostgreSQL schema: unique
//! lowercase emails, foreign keys, the self-follow check and cascading
//! deletes. All state sits behind a single mutex, which makes each operation
//! atomic.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;

use crate::domain::ports::{
    MicropostPersistenceError, MicropostRepository, RelationshipPersistenceError,
    RelationshipRepository, UserPersistenceError, UserRepository,
};
use crate::domain::relationship::fields;
use crate::domain::{
    DeletedUser, EmailAddress, FeedPage, Micropost, MicropostId, Relationship, User, UserId,
};

#[derive(Default)]
struct State {
    users: HashMap<UserId, User>,
    posts: HashMap<MicropostId, Micropost>,
    /// follower -> followed -> edge
    edges: BTreeMap<UserId, BTreeMap<UserId, Relationship>>,
}

impl State {
    fn email_holder(&self, email: &EmailAddress) -> Option<&User> {
        self.users.values().find(|user| user.email() == email)
    }

    fn follows(&self, user: &UserId) -> BTreeSet<UserId> {
        self.edges
            .get(user)
            .map(|followed| followed.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Byte-order name sort, matching the `COLLATE "C"` users.name column.
    fn users_sorted(&self, ids: impl Iterator<Item = UserId>) -> Vec<User> {
        let mut users: Vec<User> = ids.filter_map(|id| self.users.get(&id).cloned()).collect();
        users.sort_by(|a, b| a.name().cmp(b.name()).then_with(|| a.id().cmp(&b.id())));
        users
    }

    fn page(&self, page: &FeedPage, mut include: impl FnMut(&Micropost) -> bool) -> Vec<Micropost> {
        let mut posts: Vec<Micropost> = self
            .posts
            .values()
            .filter(|post| include(post))
            .filter(|post| page.cursor().is_none_or(|cursor| cursor.precedes(post)))
            .cloned()
            .collect();
        posts.sort_by(|a, b| {
            b.created_at()
                .cmp(&a.created_at())
                .then_with(|| b.id().cmp(&a.id()))
        });
        posts.truncate(page.limit());
        posts
    }
}

/// Shared in-memory store. Clones share state.
///
/// # Examples
/// ```
/// use microblog::outbound::memory::InMemoryStore;
///
/// let store = InMemoryStore::new();
/// let same = store.clone();
/// assert!(store.shares_state_with(&same));
/// ```
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<Mutex<State>>,
}

impl InMemoryStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether two handles point at the same state.
    pub fn shares_state_with(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.state, &other.state)
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|err| err.into_inner())
    }
}

fn count(len: usize) -> u64 {
    u64::try_from(len).unwrap_or(u64::MAX)
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        if state.email_holder(user.email()).is_some() {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        if state.users.contains_key(&user.id()) {
            return Err(UserPersistenceError::query("duplicate user id"));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), UserPersistenceError> {
        let mut state = self.lock();
        if !state.users.contains_key(&user.id()) {
            return Err(UserPersistenceError::not_found(user.id().to_string()));
        }
        if state
            .email_holder(user.email())
            .is_some_and(|holder| holder.id() != user.id())
        {
            return Err(UserPersistenceError::duplicate_email(user.email().as_ref()));
        }
        state.users.insert(user.id(), user.clone());
        Ok(())
    }

    async fn find_by_id(&self, id: &UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().users.get(id).cloned())
    }

    async fn find_by_email(
        &self,
        email: &EmailAddress,
    ) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock().email_holder(email).cloned())
    }

    async fn delete(&self, id: &UserId) -> Result<Option<DeletedUser>, UserPersistenceError> {
        let mut state = self.lock();
        if state.users.remove(id).is_none() {
            return Ok(None);
        }

        let posts_before = state.posts.len();
        state.posts.retain(|_, post| post.author_id() != *id);
        let microposts_removed = count(posts_before - state.posts.len());

        let outgoing = state.edges.remove(id).map_or(0, |followed| followed.len());
        let mut incoming = 0;
        for followed in state.edges.values_mut() {
            if followed.remove(id).is_some() {
                incoming += 1;
            }
        }
        state.edges.retain(|_, followed| !followed.is_empty());

        Ok(Some(DeletedUser {
            id: *id,
            microposts_removed,
            relationships_removed: count(outgoing + incoming),
        }))
    }

    async fn count(&self) -> Result<u64, UserPersistenceError> {
        Ok(count(self.lock().users.len()))
    }
}

#[async_trait]
impl MicropostRepository for InMemoryStore {
    async fn insert(&self, post: &Micropost) -> Result<(), MicropostPersistenceError> {
        let mut state = self.lock();
        if !state.users.contains_key(&post.author_id()) {
            return Err(MicropostPersistenceError::author_not_found(
                post.author_id().to_string(),
            ));
        }
        state.posts.insert(post.id(), post.clone());
        Ok(())
    }

    async fn find_by_id(
        &self,
        id: &MicropostId,
    ) -> Result<Option<Micropost>, MicropostPersistenceError> {
        Ok(self.lock().posts.get(id).cloned())
    }

    async fn delete(&self, id: &MicropostId) -> Result<bool, MicropostPersistenceError> {
        Ok(self.lock().posts.remove(id).is_some())
    }

    async fn list_by_author(
        &self,
        author: &UserId,
        page: &FeedPage,
    ) -> Result<Vec<Micropost>, MicropostPersistenceError> {
        let state = self.lock();
        Ok(state.page(page, |post| post.author_id() == *author))
    }

    async fn feed(
        &self,
        user: &UserId,
        page: &FeedPage,
    ) -> Result<Vec<Micropost>, MicropostPersistenceError> {
        let state = self.lock();
        let mut authors = state.follows(user);
        authors.insert(*user);
        Ok(state.page(page, |post| authors.contains(&post.author_id())))
    }

    async fn count(&self) -> Result<u64, MicropostPersistenceError> {
        Ok(count(self.lock().posts.len()))
    }

    async fn count_by_author(&self, author: &UserId) -> Result<u64, MicropostPersistenceError> {
        let state = self.lock();
        Ok(count(
            state
                .posts
                .values()
                .filter(|post| post.author_id() == *author)
                .count(),
        ))
    }
}

#[async_trait]
impl RelationshipRepository for InMemoryStore {
    async fn insert(
        &self,
        relationship: &Relationship,
    ) -> Result<bool, RelationshipPersistenceError> {
        let follower = relationship.follower_id();
        let followed = relationship.followed_id();
        let mut state = self.lock();
        if follower == followed {
            return Err(RelationshipPersistenceError::self_follow());
        }
        if !state.users.contains_key(&follower) {
            return Err(RelationshipPersistenceError::unknown_user(fields::FOLLOWER_ID));
        }
        if !state.users.contains_key(&followed) {
            return Err(RelationshipPersistenceError::unknown_user(fields::FOLLOWED_ID));
        }

        let edges = state.edges.entry(follower).or_default();
        if edges.contains_key(&followed) {
            return Ok(false);
        }
        edges.insert(followed, *relationship);
        Ok(true)
    }

    async fn delete(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        let mut state = self.lock();
        let Some(edges) = state.edges.get_mut(follower) else {
            return Ok(false);
        };
        let removed = edges.remove(followed).is_some();
        if edges.is_empty() {
            state.edges.remove(follower);
        }
        Ok(removed)
    }

    async fn exists(
        &self,
        follower: &UserId,
        followed: &UserId,
    ) -> Result<bool, RelationshipPersistenceError> {
        Ok(self
            .lock()
            .edges
            .get(follower)
            .is_some_and(|edges| edges.contains_key(followed)))
    }

    async fn followers(&self, user: &UserId) -> Result<Vec<User>, RelationshipPersistenceError> {
        let state = self.lock();
        let followers: Vec<UserId> = state
            .edges
            .iter()
            .filter(|(_, followed)| followed.contains_key(user))
            .map(|(follower, _)| *follower)
            .collect();
        Ok(state.users_sorted(followers.into_iter()))
    }

    async fn following(&self, user: &UserId) -> Result<Vec<User>, RelationshipPersistenceError> {
        let state = self.lock();
        let followed = state.follows(user);
        Ok(state.users_sorted(followed.into_iter()))
    }

    async fn follower_count(&self, user: &UserId) -> Result<u64, RelationshipPersistenceError> {
        let state = self.lock();
        Ok(count(
            state
                .edges
                .values()
                .filter(|followed| followed.contains_key(user))
                .count(),
        ))
    }

    async fn following_count(&self, user: &UserId) -> Result<u64, RelationshipPersistenceError> {
        Ok(count(
            self.lock().edges.get(user).map_or(0, BTreeMap::len),
        ))
    }
}

#[cfg(test)]
mod tests;
