//! Post listings, the detail page and the create/edit forms.

use std::collections::HashMap;

use actix_web::{Either, HttpResponse, web};
use serde::Serialize;
use uuid::Uuid;

use yatube_core::DomainError;
use yatube_core::domain::{Group, NewPost, Post, PostFilter, User};
use yatube_core::forms::PostForm;
use yatube_core::pagination::{POSTS_PER_PAGE, Page, Paginator};
use yatube_shared::dto::PostFormData;

use super::{post_url, profile_url, redirect};
use crate::middleware::auth::{Identity, OptionalIdentity};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templating::{
    GROUP_LIST_TEMPLATE, INDEX_TEMPLATE, POST_DETAIL_TEMPLATE, POST_FORM_TEMPLATE,
    PROFILE_TEMPLATE, TemplateResponse,
};

/// A rendered page, or a redirect away from it.
type PageOrRedirect = Either<TemplateResponse, HttpResponse>;

/// Raw query pairs, so a repeated `?page=` cannot fail extraction.
pub type PageQuery = web::Query<Vec<(String, String)>>;

/// The last `page` value in the query, if any.
fn page_param(query: &PageQuery) -> Option<&str> {
    query
        .iter()
        .rev()
        .find(|(key, _)| key == "page")
        .map(|(_, value)| value.as_str())
}

#[derive(Debug, Clone, Serialize)]
pub struct AuthorCard {
    pub username: String,
    pub full_name: String,
}

impl From<&User> for AuthorCard {
    fn from(user: &User) -> Self {
        Self {
            username: user.username.clone(),
            full_name: user.full_name(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct GroupCard {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub description: String,
}

impl From<&Group> for GroupCard {
    fn from(group: &Group) -> Self {
        Self {
            id: group.id,
            title: group.title.clone(),
            slug: group.slug.clone(),
            description: group.description.clone(),
        }
    }
}

/// A post with its author and group resolved, as templates show it.
#[derive(Debug, Clone, Serialize)]
pub struct PostCard {
    pub id: i64,
    pub text: String,
    pub published: String,
    pub author: AuthorCard,
    pub group: Option<GroupCard>,
}

/// Resolves author and group references, fetching each one once.
#[derive(Default)]
struct CardBuilder {
    authors: HashMap<Uuid, AuthorCard>,
    groups: HashMap<i64, GroupCard>,
}

impl CardBuilder {
    async fn card(&mut self, state: &AppState, post: Post) -> AppResult<PostCard> {
        if !self.authors.contains_key(&post.author_id) {
            let author = state.users.find_by_id(post.author_id).await?.ok_or_else(|| {
                AppError::Internal(format!("post {} has no author {}", post.id, post.author_id))
            })?;
            self.authors.insert(post.author_id, AuthorCard::from(&author));
        }

        let group = match post.group_id {
            Some(group_id) => {
                if !self.groups.contains_key(&group_id) {
                    match state.groups.find_by_id(group_id).await? {
                        Some(group) => {
                            self.groups.insert(group_id, GroupCard::from(&group));
                        }
                        None => tracing::warn!(post_id = post.id, group_id, "Post group is gone"),
                    }
                }
                self.groups.get(&group_id).cloned()
            }
            None => None,
        };

        Ok(PostCard {
            id: post.id,
            published: post.created_at.format("%d %B %Y").to_string(),
            author: self.authors[&post.author_id].clone(),
            group,
            text: post.text,
        })
    }

    async fn cards(&mut self, state: &AppState, posts: Vec<Post>) -> AppResult<Vec<PostCard>> {
        let mut cards = Vec::with_capacity(posts.len());
        for post in posts {
            cards.push(self.card(state, post).await?);
        }
        Ok(cards)
    }
}

/// One listing page of the posts matching `filter`.
async fn post_page(
    state: &AppState,
    filter: PostFilter,
    raw_page: Option<&str>,
) -> AppResult<Page<PostCard>> {
    let count = state.posts.count(filter).await?;
    let window = Paginator::new(count, POSTS_PER_PAGE).get_page(raw_page);

    let posts = if window.limit == 0 {
        Vec::new()
    } else {
        state.posts.list(filter, window.offset, window.limit).await?
    };

    let cards = CardBuilder::default().cards(state, posts).await?;
    Ok(Page::new(cards, window))
}

async fn find_post(state: &AppState, post_id: i64) -> AppResult<Post> {
    state
        .posts
        .find_by_id(post_id)
        .await?
        .ok_or_else(|| DomainError::not_found("post", post_id).into())
}

/// GET /
pub async fn index(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    query: PageQuery,
) -> AppResult<TemplateResponse> {
    let page_obj = post_page(&state, PostFilter::All, page_param(&query)).await?;

    Ok(TemplateResponse::for_viewer(INDEX_TEMPLATE, viewer.identity())
        .insert("page_obj", &page_obj))
}

/// GET /group/{slug}/
pub async fn group_posts(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: PageQuery,
) -> AppResult<TemplateResponse> {
    let slug = path.into_inner();
    let group = state
        .groups
        .find_by_slug(&slug)
        .await?
        .ok_or_else(|| DomainError::not_found("group", &slug))?;

    let page_obj = post_page(&state, PostFilter::Group(group.id), page_param(&query)).await?;

    Ok(TemplateResponse::for_viewer(GROUP_LIST_TEMPLATE, viewer.identity())
        .insert("group", &GroupCard::from(&group))
        .insert("page_obj", &page_obj))
}

/// GET /profile/{username}/
pub async fn profile(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<String>,
    query: PageQuery,
) -> AppResult<TemplateResponse> {
    let username = path.into_inner();
    let author = state
        .users
        .find_by_username(&username)
        .await?
        .ok_or_else(|| DomainError::not_found("user", &username))?;

    let page_obj = post_page(&state, PostFilter::Author(author.id), page_param(&query)).await?;

    Ok(TemplateResponse::for_viewer(PROFILE_TEMPLATE, viewer.identity())
        .insert("author", &AuthorCard::from(&author))
        .insert("post_count", &page_obj.count)
        .insert("page_obj", &page_obj))
}

/// GET /posts/{post_id}/
pub async fn post_detail(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    path: web::Path<i64>,
) -> AppResult<TemplateResponse> {
    let post = find_post(&state, path.into_inner()).await?;
    let author_post_count = state.posts.count(PostFilter::Author(post.author_id)).await?;
    let can_edit = viewer
        .identity()
        .is_some_and(|identity| post.is_authored_by(identity.user_id));

    let post = CardBuilder::default().card(&state, post).await?;

    Ok(TemplateResponse::for_viewer(POST_DETAIL_TEMPLATE, viewer.identity())
        .insert("post", &post)
        .insert("author_post_count", &author_post_count)
        .insert("can_edit", &can_edit))
}

fn create_page(identity: &Identity, form: &PostForm, groups: &[Group]) -> TemplateResponse {
    TemplateResponse::for_viewer(POST_FORM_TEMPLATE, Some(identity))
        .insert("form", &form.context(groups))
        .insert("username", &identity.username)
}

fn edit_page(
    identity: &Identity,
    post_id: i64,
    form: &PostForm,
    groups: &[Group],
) -> TemplateResponse {
    create_page(identity, form, groups)
        .insert("is_edit", &true)
        .insert("post_id", &post_id)
}

/// GET /create/
pub async fn post_create_form(
    state: web::Data<AppState>,
    identity: Identity,
) -> AppResult<TemplateResponse> {
    let groups = state.groups.list_all().await?;
    Ok(create_page(&identity, &PostForm::unbound(), &groups))
}

/// POST /create/
pub async fn post_create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Form<PostFormData>,
) -> AppResult<PageOrRedirect> {
    let data = body.into_inner();
    let groups = state.groups.list_all().await?;

    let mut form = PostForm::bind(data.text, data.group);
    let Some(cleaned) = form.clean(&groups) else {
        tracing::debug!(errors = ?form.errors(), "Post form rejected");
        return Ok(Either::Left(create_page(&identity, &form, &groups)));
    };

    let post = state
        .posts
        .create(NewPost::new(identity.user_id, cleaned.text, cleaned.group_id))
        .await?;
    tracing::info!(post_id = post.id, author = %identity.username, "Post created");

    Ok(Either::Right(redirect(&profile_url(&identity.username))))
}

/// GET /posts/{post_id}/edit/
pub async fn post_edit_form(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
) -> AppResult<PageOrRedirect> {
    let post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        return Ok(Either::Right(redirect(&post_url(post.id))));
    }

    let groups = state.groups.list_all().await?;
    let form = PostForm::for_post(&post);
    Ok(Either::Left(edit_page(&identity, post.id, &form, &groups)))
}

/// POST /posts/{post_id}/edit/
pub async fn post_edit(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<i64>,
    body: web::Form<PostFormData>,
) -> AppResult<PageOrRedirect> {
    let mut post = find_post(&state, path.into_inner()).await?;
    if !post.is_authored_by(identity.user_id) {
        tracing::warn!(post_id = post.id, user = %identity.username, "Edit attempt by non-author");
        return Ok(Either::Right(redirect(&post_url(post.id))));
    }

    let data = body.into_inner();
    let groups = state.groups.list_all().await?;

    let mut form = PostForm::bind(data.text, data.group);
    let Some(cleaned) = form.clean(&groups) else {
        return Ok(Either::Left(edit_page(&identity, post.id, &form, &groups)));
    };

    post.text = cleaned.text;
    post.group_id = cleaned.group_id;
    let post = state.posts.update(post).await?;
    tracing::info!(post_id = post.id, "Post updated");

    Ok(Either::Right(redirect(&post_url(post.id))))
}
