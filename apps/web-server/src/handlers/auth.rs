//! Signup, login and logout pages.

use std::collections::BTreeMap;

use actix_web::http::header;
use actix_web::{Either, HttpRequest, HttpResponse, Responder, web};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationErrors};

use yatube_core::domain::User;
use yatube_core::error::RepoError;
use yatube_shared::dto::{LoginForm, SignupForm};

use crate::middleware::auth::{
    OptionalIdentity, expired_session_cookie, safe_next, session_cookie,
};
use crate::middleware::error::{AppError, AppResult};
use crate::state::AppState;
use crate::templating::{LOGGED_OUT_TEMPLATE, LOGIN_TEMPLATE, SIGNUP_TEMPLATE, TemplateResponse};

const INVALID_LOGIN_MESSAGE: &str = "Please enter a correct username and password. \
     Note that both fields may be case-sensitive.";
const USERNAME_TAKEN_MESSAGE: &str = "A user with that username already exists.";

/// Errors not tied to a single field.
const NON_FIELD_ERRORS: &str = "__all__";

#[derive(Debug, Deserialize)]
pub struct NextQuery {
    next: Option<String>,
}

/// One input of the signup or login form.
#[derive(Debug, Serialize)]
struct InputField {
    name: &'static str,
    label: &'static str,
    input_type: &'static str,
    value: String,
    errors: Vec<String>,
}

#[derive(Debug, Serialize)]
struct SimpleForm {
    fields: Vec<InputField>,
    non_field_errors: Vec<String>,
}

fn messages(errors: &ValidationErrors) -> BTreeMap<String, Vec<String>> {
    errors
        .errors()
        .iter()
        .filter_map(|(field, kind)| match kind {
            validator::ValidationErrorsKind::Field(errs) => Some((
                field.to_string(),
                errs.iter()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .collect(),
            )),
            _ => None,
        })
        .collect()
}

impl InputField {
    fn new(name: &'static str, label: &'static str, input_type: &'static str) -> Self {
        Self {
            name,
            label,
            input_type,
            value: String::new(),
            errors: Vec::new(),
        }
    }

    /// Fill in the submitted value and this field's errors.
    fn bind(mut self, value: &str, errors: &mut BTreeMap<String, Vec<String>>) -> Self {
        // Passwords are never echoed back.
        if self.input_type != "password" {
            self.value = value.to_string();
        }
        self.errors = errors.remove(self.name).unwrap_or_default();
        self
    }
}

fn signup_fields(data: &SignupForm, mut errors: BTreeMap<String, Vec<String>>) -> SimpleForm {
    let fields = vec![
        InputField::new("first_name", "First name", "text").bind(&data.first_name, &mut errors),
        InputField::new("last_name", "Last name", "text").bind(&data.last_name, &mut errors),
        InputField::new("username", "Username", "text").bind(&data.username, &mut errors),
        InputField::new("password1", "Password", "password").bind(&data.password1, &mut errors),
        InputField::new("password2", "Password confirmation", "password")
            .bind(&data.password2, &mut errors),
    ];

    SimpleForm {
        fields,
        non_field_errors: errors.remove(NON_FIELD_ERRORS).unwrap_or_default(),
    }
}

fn login_page(
    viewer: &OptionalIdentity,
    username: &str,
    next: Option<&str>,
    error: Option<&str>,
) -> TemplateResponse {
    let form = SimpleForm {
        fields: vec![
            InputField {
                value: username.to_string(),
                ..InputField::new("username", "Username", "text")
            },
            InputField::new("password", "Password", "password"),
        ],
        non_field_errors: error.map(str::to_string).into_iter().collect(),
    };

    TemplateResponse::for_viewer(LOGIN_TEMPLATE, viewer.identity())
        .insert("form", &form)
        .insert("next", &safe_next(next))
}

fn logged_in_redirect(state: &AppState, user: &User, location: &str) -> AppResult<HttpResponse> {
    let token = state.tokens.generate_token(user.id, &user.username)?;
    let cookie = session_cookie(token, state.tokens.expiration_seconds(), state.secure_cookies);

    Ok(HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .cookie(cookie)
        .finish())
}

fn username_taken(errors: &mut BTreeMap<String, Vec<String>>) {
    errors
        .entry("username".to_string())
        .or_default()
        .push(USERNAME_TAKEN_MESSAGE.to_string());
}

fn signup_page(
    viewer: &OptionalIdentity,
    data: &SignupForm,
    errors: BTreeMap<String, Vec<String>>,
) -> TemplateResponse {
    TemplateResponse::for_viewer(SIGNUP_TEMPLATE, viewer.identity())
        .insert("form", &signup_fields(data, errors))
}

/// GET /auth/signup/
pub async fn signup_form(viewer: OptionalIdentity) -> TemplateResponse {
    signup_page(&viewer, &SignupForm::default(), BTreeMap::new())
}

/// POST /auth/signup/
pub async fn signup(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    body: web::Form<SignupForm>,
) -> AppResult<Either<TemplateResponse, HttpResponse>> {
    let mut data = body.into_inner();
    data.username = data.username.trim().to_string();

    let mut errors = match data.validate() {
        Ok(()) => BTreeMap::new(),
        Err(e) => messages(&e),
    };
    if !errors.contains_key("username")
        && state.users.find_by_username(&data.username).await?.is_some()
    {
        username_taken(&mut errors);
    }

    if !errors.is_empty() {
        return Ok(Either::Left(signup_page(&viewer, &data, errors)));
    }

    let hash = state.passwords.hash(&data.password1)?;
    let user = User::new(data.username.clone(), hash)
        .with_name(data.first_name.clone(), data.last_name.clone());
    let user = match state.users.save(user).await {
        Ok(user) => user,
        // Another signup took the name after the lookup above.
        Err(RepoError::Constraint(reason)) => {
            tracing::debug!(%reason, "Signup rejected by the store");
            let mut errors = BTreeMap::new();
            username_taken(&mut errors);
            return Ok(Either::Left(signup_page(&viewer, &data, errors)));
        }
        Err(e) => return Err(e.into()),
    };
    tracing::info!(user_id = %user.id, username = %user.username, "User signed up");

    Ok(Either::Right(logged_in_redirect(&state, &user, "/")?))
}

/// GET /auth/login/
pub async fn login_form(
    viewer: OptionalIdentity,
    query: web::Query<NextQuery>,
) -> TemplateResponse {
    login_page(&viewer, "", query.next.as_deref(), None)
}

/// POST /auth/login/
///
/// Unknown usernames and wrong passwords get the same message.
pub async fn login(
    state: web::Data<AppState>,
    viewer: OptionalIdentity,
    body: web::Form<LoginForm>,
) -> AppResult<Either<TemplateResponse, HttpResponse>> {
    let form = body.into_inner();
    let username = form.username.trim();

    let user = match state.users.find_by_username(username).await? {
        Some(user) if state.passwords.verify(&form.password, &user.password_hash)? => user,
        _ => {
            tracing::debug!(username, "Login rejected");
            let next = form.next.as_deref();
            let page = login_page(&viewer, username, next, Some(INVALID_LOGIN_MESSAGE));
            return Ok(Either::Left(page));
        }
    };

    let target = safe_next(form.next.as_deref()).unwrap_or("/");
    tracing::info!(user_id = %user.id, "User logged in");
    Ok(Either::Right(logged_in_redirect(&state, &user, target)?))
}

/// GET or POST /auth/logout/
pub async fn logout(req: HttpRequest, viewer: OptionalIdentity) -> AppResult<HttpResponse> {
    if let Some(identity) = viewer.identity() {
        tracing::info!(user_id = %identity.user_id, "User logged out");
    }

    let mut response = TemplateResponse::for_viewer(LOGGED_OUT_TEMPLATE, None).respond_to(&req);
    response
        .add_cookie(&expired_session_cookie())
        .map_err(|e| AppError::Internal(e.to_string()))?;
    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signup_form_hides_passwords() {
        let data = SignupForm {
            username: "leo".to_string(),
            password1: "secret-password".to_string(),
            password2: "secret-password".to_string(),
            ..SignupForm::default()
        };
        let mut errors = BTreeMap::new();
        errors.insert("__all__".to_string(), vec!["mismatch".to_string()]);

        let form = signup_fields(&data, errors);

        assert_eq!(form.fields[2].value, "leo");
        assert!(form.fields[3].value.is_empty());
        assert_eq!(form.non_field_errors, vec!["mismatch".to_string()]);
    }

    #[test]
    fn test_validation_messages_by_field() {
        let data = SignupForm {
            username: "leo tolstoy".to_string(),
            password1: "short".to_string(),
            password2: "short".to_string(),
            ..SignupForm::default()
        };
        let errors = messages(&data.validate().unwrap_err());

        assert!(errors.contains_key("username"));
        assert!(errors.contains_key("password1"));
    }
}
