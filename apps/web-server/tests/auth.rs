//! Signup, login and logout.

mod common;

use std::sync::Arc;

use actix_web::http::StatusCode;
use actix_web::test::{self, TestRequest};
use async_trait::async_trait;
use uuid::Uuid;

use common::{Fixture, PASSWORD, location, rendered};
use web_server::build_app;
use web_server::middleware::auth::SESSION_COOKIE;
use web_server::templating::{LOGGED_OUT_TEMPLATE, LOGIN_TEMPLATE, SIGNUP_TEMPLATE};
use yatube_core::domain::User;
use yatube_core::error::RepoError;
use yatube_core::ports::{BaseRepository, UserRepository};
use yatube_infra::InMemoryStore;
use yatube_shared::dto::{LoginForm, SignupForm};

/// Username lookups always miss, as when another signup commits the same
/// name between the lookup and the insert.
struct StaleLookups(Arc<InMemoryStore>);

#[async_trait]
impl BaseRepository<User, Uuid> for StaleLookups {
    async fn find_by_id(&self, id: Uuid) -> Result<Option<User>, RepoError> {
        <InMemoryStore as BaseRepository<User, Uuid>>::find_by_id(&self.0, id).await
    }

    async fn save(&self, user: User) -> Result<User, RepoError> {
        <InMemoryStore as BaseRepository<User, Uuid>>::save(&self.0, user).await
    }

    async fn delete(&self, id: Uuid) -> Result<(), RepoError> {
        <InMemoryStore as BaseRepository<User, Uuid>>::delete(&self.0, id).await
    }
}

#[async_trait]
impl UserRepository for StaleLookups {
    async fn find_by_username(&self, _username: &str) -> Result<Option<User>, RepoError> {
        Ok(None)
    }
}

fn login_form(username: &str, password: &str, next: Option<&str>) -> LoginForm {
    LoginForm {
        username: username.to_string(),
        password: password.to_string(),
        next: next.map(str::to_string),
    }
}

#[actix_web::test]
async fn test_login_sets_session_and_follows_next() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::post()
        .uri("/auth/login/")
        .set_form(login_form("auth", PASSWORD, Some("/create/")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/create/");

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("session cookie");
    assert!(!cookie.value().is_empty());

    let claims = fx.state.tokens.validate_token(cookie.value()).unwrap();
    assert_eq!(claims.user_id, fx.author.id);
}

#[actix_web::test]
async fn test_login_ignores_offsite_next() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::post()
        .uri("/auth/login/")
        .set_form(login_form("auth", PASSWORD, Some("https://evil.example/")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(location(&resp), "/");
}

#[actix_web::test]
async fn test_bad_credentials_rerender_login() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    for (username, password) in [("auth", "wrong-password"), ("nobody", PASSWORD)] {
        let req = TestRequest::post()
            .uri("/auth/login/")
            .set_form(login_form(username, password, Some("/create/")))
            .to_request();
        let resp = test::call_service(&app, req).await;

        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().next().is_none());

        let page = rendered(&resp);
        assert_eq!(page.name, LOGIN_TEMPLATE);
        assert_eq!(page.context["next"], "/create/");
        assert_eq!(page.context["form"]["non_field_errors"].as_array().unwrap().len(), 1);
    }
}

#[actix_web::test]
async fn test_login_page_carries_next() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::get()
        .uri("/auth/login/?next=/posts/1/edit/")
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(rendered(&resp).context["next"], "/posts/1/edit/");
}

#[actix_web::test]
async fn test_signup_creates_user_and_logs_in() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::post()
        .uri("/auth/signup/")
        .set_form(SignupForm {
            first_name: "Anna".to_string(),
            last_name: "Karenina".to_string(),
            username: "anna".to_string(),
            password1: "train-station".to_string(),
            password2: "train-station".to_string(),
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/");
    assert!(resp.response().cookies().any(|c| c.name() == SESSION_COOKIE));

    let user = fx.store.find_by_username("anna").await.unwrap().unwrap();
    assert_eq!(user.full_name(), "Anna Karenina");
    assert_ne!(user.password_hash, "train-station");
}

#[actix_web::test]
async fn test_signup_rejects_taken_username() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::post()
        .uri("/auth/signup/")
        .set_form(SignupForm {
            username: "auth".to_string(),
            password1: "train-station".to_string(),
            password2: "train-station".to_string(),
            ..SignupForm::default()
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let page = rendered(&resp);
    assert_eq!(page.name, SIGNUP_TEMPLATE);

    let username = &page.context["form"]["fields"][2];
    assert_eq!(username["name"], "username");
    assert_eq!(username["errors"][0], "A user with that username already exists.");
}

#[actix_web::test]
async fn test_signup_race_on_username_shows_form_error() {
    let fx = Fixture::new().await;
    let mut state = fx.state.clone();
    state.users = Arc::new(StaleLookups(fx.store.clone()));
    let app = test::init_service(build_app(state)).await;

    let req = TestRequest::post()
        .uri("/auth/signup/")
        .set_form(SignupForm {
            username: "auth".to_string(),
            password1: "train-station".to_string(),
            password2: "train-station".to_string(),
            ..SignupForm::default()
        })
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.response().cookies().next().is_none());

    let page = rendered(&resp);
    assert_eq!(page.name, SIGNUP_TEMPLATE);
    let username = &page.context["form"]["fields"][2];
    assert_eq!(username["value"], "auth");
    assert_eq!(username["errors"][0], "A user with that username already exists.");
}

#[actix_web::test]
async fn test_logout_clears_session() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::post()
        .uri("/auth/logout/")
        .cookie(fx.session(&fx.author))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let page = rendered(&resp);
    assert_eq!(page.name, LOGGED_OUT_TEMPLATE);
    assert_eq!(page.context["user"], serde_json::Value::Null);

    let cookie = resp
        .response()
        .cookies()
        .find(|c| c.name() == SESSION_COOKIE)
        .expect("removal cookie");
    assert!(cookie.value().is_empty());
}

#[actix_web::test]
async fn test_invalid_session_counts_as_anonymous() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;

    let req = TestRequest::get()
        .uri("/create/")
        .cookie(actix_web::cookie::Cookie::new(SESSION_COOKIE, "garbage"))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::FOUND);
    assert_eq!(location(&resp), "/auth/login/?next=/create/");
}

#[actix_web::test]
async fn test_bearer_header_is_accepted() {
    let fx = Fixture::new().await;
    let app = test::init_service(build_app(fx.state.clone())).await;
    let token = fx
        .state
        .tokens
        .generate_token(fx.author.id, &fx.author.username)
        .unwrap();

    let req = TestRequest::get()
        .uri("/create/")
        .insert_header(("Authorization", format!("Bearer {token}")))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::OK);
}
