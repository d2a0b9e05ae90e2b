//! Shared fixture: the full app over an in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use actix_web::cookie::Cookie;
use actix_web::dev::ServiceResponse;
use actix_web::http::header;

use yatube_core::domain::{Group, NewGroup, NewPost, Post, PostFilter, User};
use yatube_core::ports::{BaseRepository, GroupRepository, PasswordService, PostRepository};
use yatube_infra::{Argon2PasswordService, InMemoryStore, JwtConfig, JwtTokenService};

use web_server::middleware::auth::SESSION_COOKIE;
use web_server::state::AppState;
use web_server::templating::{RenderedTemplate, Templates};

pub const PASSWORD: &str = "war-and-peace";

pub struct Fixture {
    pub state: AppState,
    pub store: Arc<InMemoryStore>,
    pub author: User,
    pub group: Group,
    pub post: Post,
}

impl Fixture {
    /// One author, one group and one post in that group.
    pub async fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let passwords = Argon2PasswordService::with_params(8, 1, 1).unwrap();
        let tokens = JwtTokenService::new(JwtConfig {
            secret: "test-secret".to_string(),
            ..JwtConfig::default()
        });

        let state = AppState::in_memory(
            store.clone(),
            Arc::new(tokens),
            Arc::new(passwords),
            Arc::new(Templates::builtin().unwrap()),
        );

        let author = create_user(&state, &store, "auth").await;
        let group = GroupRepository::create(
            &*store,
            NewGroup::new("Test group", "test-slug", "Test description"),
        )
        .await
        .unwrap();
        let post = PostRepository::create(
            &*store,
            NewPost::new(author.id, "Test post text", Some(group.id)),
        )
        .await
        .unwrap();

        Self {
            state,
            store,
            author,
            group,
            post,
        }
    }

    pub async fn create_user(&self, username: &str) -> User {
        create_user(&self.state, &self.store, username).await
    }

    /// Session cookie for `user`, as login would set it.
    pub fn session(&self, user: &User) -> Cookie<'static> {
        let token = self
            .state
            .tokens
            .generate_token(user.id, &user.username)
            .unwrap();
        Cookie::new(SESSION_COOKIE, token)
    }

    pub async fn add_posts(&self, count: usize, group_id: Option<i64>) {
        for i in 0..count {
            PostRepository::create(
                &*self.store,
                NewPost::new(self.author.id, format!("Post number {i}"), group_id),
            )
            .await
            .unwrap();
        }
    }

    pub async fn post_count(&self) -> u64 {
        PostRepository::count(&*self.store, PostFilter::All)
            .await
            .unwrap()
    }

    pub async fn find_post(&self, id: i64) -> Post {
        PostRepository::find_by_id(&*self.store, id)
            .await
            .unwrap()
            .unwrap()
    }
}

async fn create_user(state: &AppState, store: &InMemoryStore, username: &str) -> User {
    let hash = state.passwords.hash(PASSWORD).unwrap();
    let user = User::new(username, hash).with_name("Leo", "Tolstoy");
    store.save(user).await.unwrap()
}

/// Template name and context the response was rendered from.
pub fn rendered<B>(resp: &ServiceResponse<B>) -> RenderedTemplate {
    resp.response()
        .extensions()
        .get::<RenderedTemplate>()
        .cloned()
        .expect("response was not rendered from a template")
}

pub fn location<B>(resp: &ServiceResponse<B>) -> String {
    resp.headers()
        .get(header::LOCATION)
        .expect("no Location header")
        .to_str()
        .unwrap()
        .to_string()
}
