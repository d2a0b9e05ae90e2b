//! In-memory store - used when no database is configured, and by tests.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use yatube_core::domain::{Group, NewGroup, NewPost, Post, PostFilter, User};
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, GroupRepository, PostRepository, UserRepository};

/// All three repositories over plain vectors behind async RwLocks.
///
/// Enforces the same constraints as the database schema: unique usernames
/// and slugs, and posts referencing an existing author and group.
/// Note: Data is lost on process restart.
pub struct InMemoryStore {
    users: RwLock<Vec<User>>,
    groups: RwLock<Vec<Group>>,
    posts: RwLock<Vec<Post>>,
    next_group_id: AtomicI64,
    next_post_id: AtomicI64,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            users: RwLock::new(Vec::new()),
            groups: RwLock::new(Vec::new()),
            posts: RwLock::new(Vec::new()),
            next_group_id: AtomicI64::new(1),
            next_post_id: AtomicI64::new(1),
        }
    }

    /// Newest first; ids break timestamp ties.
    fn newest_first(a: &Post, b: &Post) -> std::cmp::Ordering {
        b.created_at
            .cmp(&a.created_at)
            .then_with(|| b.id.cmp(&a.id))
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BaseRepository<User, Uuid> for InMemoryStore {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.id == id).cloned())
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        let mut users = self.users.write().await;

        if users
            .iter()
            .any(|u| u.username == user.username && u.id != user.id)
        {
            return Err(RepoError::Constraint(format!(
                "username '{}' is taken",
                user.username
            )));
        }

        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        Ok(user)
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        let mut users = self.users.write().await;
        let before = users.len();
        users.retain(|u| u.id != id);
        if users.len() == before {
            return Err(RepoError::NotFound);
        }
        drop(users);

        self.posts.write().await.retain(|p| p.author_id != id);
        Ok(())
    }
}

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn find_by_username(&self, username: &str) -> Result<Option<User>, RepoError> {
        let users = self.users.read().await;
        Ok(users.iter().find(|u| u.username == username).cloned())
    }
}

#[async_trait]
impl GroupRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Group>, RepoError> {
        let groups = self.groups.read().await;
        Ok(groups.iter().find(|g| g.id == id).cloned())
    }

    async fn find_by_slug(&self, slug: &str) -> Result<Option<Group>, RepoError> {
        let groups = self.groups.read().await;
        Ok(groups.iter().find(|g| g.slug == slug).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Group>, RepoError> {
        let mut groups = self.groups.read().await.clone();
        groups.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(groups)
    }

    async fn create(&self, new_group: NewGroup) -> Result<Group, RepoError> {
        let mut groups = self.groups.write().await;

        if groups.iter().any(|g| g.slug == new_group.slug) {
            return Err(RepoError::Constraint(format!(
                "slug '{}' is taken",
                new_group.slug
            )));
        }

        let group = Group {
            id: self.next_group_id.fetch_add(1, Ordering::Relaxed),
            title: new_group.title,
            slug: new_group.slug,
            description: new_group.description,
        };
        groups.push(group.clone());
        Ok(group)
    }
}

impl InMemoryStore {
    async fn check_references(
        &self,
        author_id: Uuid,
        group_id: Option<i64>,
    ) -> Result<(), RepoError> {
        if !self.users.read().await.iter().any(|u| u.id == author_id) {
            return Err(RepoError::Constraint(format!("no author {author_id}")));
        }
        if let Some(group_id) = group_id {
            if !self.groups.read().await.iter().any(|g| g.id == group_id) {
                return Err(RepoError::Constraint(format!("no group {group_id}")));
            }
        }
        Ok(())
    }
}

#[async_trait]
impl PostRepository for InMemoryStore {
    async fn find_by_id(&self, id: i64) -> Result<Option<Post>, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().find(|p| p.id == id).cloned())
    }

    async fn create(&self, new_post: NewPost) -> Result<Post, RepoError> {
        self.check_references(new_post.author_id, new_post.group_id)
            .await?;

        let post = Post {
            id: self.next_post_id.fetch_add(1, Ordering::Relaxed),
            text: new_post.text,
            author_id: new_post.author_id,
            group_id: new_post.group_id,
            created_at: new_post.created_at,
        };
        self.posts.write().await.push(post.clone());
        Ok(post)
    }

    async fn update(&self, changed: Post) -> Result<Post, RepoError> {
        self.check_references(changed.author_id, changed.group_id)
            .await?;

        let mut posts = self.posts.write().await;
        let existing = posts
            .iter_mut()
            .find(|p| p.id == changed.id)
            .ok_or(RepoError::NotFound)?;

        existing.text = changed.text;
        existing.group_id = changed.group_id;
        Ok(existing.clone())
    }

    async fn count(&self, filter: PostFilter) -> Result<u64, RepoError> {
        let posts = self.posts.read().await;
        Ok(posts.iter().filter(|p| filter.matches(p)).count() as u64)
    }

    async fn list(
        &self,
        filter: PostFilter,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Post>, RepoError> {
        let posts = self.posts.read().await;
        let mut matching: Vec<Post> = posts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        matching.sort_by(Self::newest_first);

        Ok(matching
            .into_iter()
            .skip(offset as usize)
            .take(limit as usize)
            .collect())
    }
}
