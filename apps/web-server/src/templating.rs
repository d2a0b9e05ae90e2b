//! HTML rendering with Tera.
//!
//! Handlers return a [`TemplateResponse`]: a template name plus a JSON
//! context. Rendering happens in the `Responder` impl, which also stores a
//! [`RenderedTemplate`] in the response extensions so middleware and tests
//! can see which template was used and with what context.

use std::path::Path;

use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::http::header::ContentType;
use actix_web::{HttpRequest, HttpResponse, Responder, ResponseError, web};
use chrono::Datelike;
use serde::Serialize;
use serde_json::{Map, Value};
use tera::{Context, Tera};

use crate::middleware::auth::Identity;
use crate::middleware::error::AppError;
use crate::state::AppState;

pub const INDEX_TEMPLATE: &str = "posts/index.html";
pub const GROUP_LIST_TEMPLATE: &str = "posts/group_list.html";
pub const PROFILE_TEMPLATE: &str = "posts/profile.html";
pub const POST_DETAIL_TEMPLATE: &str = "posts/post_detail.html";
pub const POST_FORM_TEMPLATE: &str = "posts/create_post.html";
pub const LOGIN_TEMPLATE: &str = "users/login.html";
pub const SIGNUP_TEMPLATE: &str = "users/signup.html";
pub const LOGGED_OUT_TEMPLATE: &str = "users/logged_out.html";
pub const ABOUT_AUTHOR_TEMPLATE: &str = "about/author.html";
pub const ABOUT_TECH_TEMPLATE: &str = "about/tech.html";
pub const NOT_FOUND_TEMPLATE: &str = "core/404.html";

/// Templates compiled into the binary.
const BUILTIN_TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("includes/header.html", include_str!("../templates/includes/header.html")),
    ("includes/footer.html", include_str!("../templates/includes/footer.html")),
    ("includes/paginator.html", include_str!("../templates/includes/paginator.html")),
    ("includes/macros.html", include_str!("../templates/includes/macros.html")),
    (INDEX_TEMPLATE, include_str!("../templates/posts/index.html")),
    (GROUP_LIST_TEMPLATE, include_str!("../templates/posts/group_list.html")),
    (PROFILE_TEMPLATE, include_str!("../templates/posts/profile.html")),
    (POST_DETAIL_TEMPLATE, include_str!("../templates/posts/post_detail.html")),
    (POST_FORM_TEMPLATE, include_str!("../templates/posts/create_post.html")),
    (LOGIN_TEMPLATE, include_str!("../templates/users/login.html")),
    (SIGNUP_TEMPLATE, include_str!("../templates/users/signup.html")),
    (LOGGED_OUT_TEMPLATE, include_str!("../templates/users/logged_out.html")),
    (ABOUT_AUTHOR_TEMPLATE, include_str!("../templates/about/author.html")),
    (ABOUT_TECH_TEMPLATE, include_str!("../templates/about/tech.html")),
    (NOT_FOUND_TEMPLATE, include_str!("../templates/core/404.html")),
];

/// The compiled template set.
pub struct Templates {
    tera: Tera,
}

impl Templates {
    /// The templates shipped with the binary.
    pub fn builtin() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(BUILTIN_TEMPLATES.iter().copied())?;
        Ok(Self { tera })
    }

    /// Every `*.html` file under `dir`, named by its relative path.
    pub fn from_dir(dir: &Path) -> Result<Self, tera::Error> {
        let glob = format!("{}/**/*.html", dir.display());
        Ok(Self {
            tera: Tera::new(&glob)?,
        })
    }

    pub fn load(dir: Option<&Path>) -> Result<Self, tera::Error> {
        match dir {
            Some(dir) => {
                tracing::info!(dir = %dir.display(), "Loading templates from disk");
                Self::from_dir(dir)
            }
            None => Self::builtin(),
        }
    }

    pub fn render(&self, name: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(name, context)
    }

    pub fn names(&self) -> Vec<&str> {
        self.tera.get_template_names().collect()
    }
}

/// What a response was rendered from. Stored in response extensions.
#[derive(Debug, Clone)]
pub struct RenderedTemplate {
    pub name: &'static str,
    pub context: Value,
}

/// A page to render: template name, context and status.
#[derive(Debug)]
pub struct TemplateResponse {
    template: &'static str,
    context: Map<String, Value>,
    status: StatusCode,
}

impl TemplateResponse {
    pub fn new(template: &'static str) -> Self {
        Self {
            template,
            context: Map::new(),
            status: StatusCode::OK,
        }
    }

    /// Start a page for the current viewer; sets `user`.
    pub fn for_viewer(template: &'static str, viewer: Option<&Identity>) -> Self {
        Self::new(template).insert("user", &viewer)
    }

    pub fn insert<T: Serialize + ?Sized>(mut self, key: &str, value: &T) -> Self {
        let value = serde_json::to_value(value).unwrap_or_else(|e| {
            tracing::error!(key, error = %e, "Failed to serialize template context value");
            Value::Null
        });
        self.context.insert(key.to_string(), value);
        self
    }

    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    pub fn template(&self) -> &'static str {
        self.template
    }
}

impl Responder for TemplateResponse {
    type Body = BoxBody;

    fn respond_to(self, req: &HttpRequest) -> HttpResponse<Self::Body> {
        let Some(state) = req.app_data::<web::Data<AppState>>() else {
            return AppError::Internal("application state missing".to_string()).error_response();
        };

        let mut context = self.context;
        context.entry("user").or_insert(Value::Null);
        context.insert("year".to_string(), Value::from(chrono::Utc::now().year()));
        let context = Value::Object(context);

        let html = Context::from_value(context.clone())
            .and_then(|ctx| state.templates.render(self.template, &ctx));
        let html = match html {
            Ok(html) => html,
            Err(e) => {
                return AppError::Internal(format!(
                    "rendering {} failed: {e:?}",
                    self.template
                ))
                .error_response();
            }
        };

        let mut response = HttpResponse::build(self.status)
            .content_type(ContentType::html())
            .body(html);
        response.extensions_mut().insert(RenderedTemplate {
            name: self.template,
            context,
        });
        response
    }
}
