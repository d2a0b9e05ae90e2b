//! HTTP handlers and route configuration.

mod about;
mod auth;
mod health;
mod posts;

use actix_web::body::MessageBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::{StatusCode, header};
use actix_web::middleware::ErrorHandlerResponse;
use actix_web::{HttpRequest, HttpResponse, Responder, web};
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};

use crate::middleware::auth::Identity;
use crate::middleware::error::{AppError, AppResult};
use crate::templating::{NOT_FOUND_TEMPLATE, TemplateResponse};

/// Characters kept verbatim in a path segment.
const SEGMENT_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~')
    .remove(b'@')
    .remove(b'+');

/// Configure all application routes.
pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    cfg.route("/", web::get().to(posts::index))
        .route("/group/{slug}/", web::get().to(posts::group_posts))
        .route("/profile/{username}/", web::get().to(posts::profile))
        .route("/posts/{post_id}/", web::get().to(posts::post_detail))
        .service(
            web::resource("/posts/{post_id}/edit/")
                .route(web::get().to(posts::post_edit_form))
                .route(web::post().to(posts::post_edit)),
        )
        .service(
            web::resource("/create/")
                .route(web::get().to(posts::post_create_form))
                .route(web::post().to(posts::post_create)),
        )
        .service(
            web::scope("/auth")
                .service(
                    web::resource("/signup/")
                        .route(web::get().to(auth::signup_form))
                        .route(web::post().to(auth::signup)),
                )
                .service(
                    web::resource("/login/")
                        .route(web::get().to(auth::login_form))
                        .route(web::post().to(auth::login)),
                )
                .service(
                    web::resource("/logout/")
                        .route(web::get().to(auth::logout))
                        .route(web::post().to(auth::logout)),
                ),
        )
        .service(
            web::scope("/about")
                .route("/author/", web::get().to(about::author))
                .route("/tech/", web::get().to(about::tech)),
        )
        .route("/health/", web::get().to(health::health_check));
}

/// Fallback for paths no route matches.
pub async fn not_found(req: HttpRequest) -> AppResult<HttpResponse> {
    Err(AppError::NotFound(req.path().to_string()))
}

/// Replace any 404 response with the rendered not-found page.
pub fn render_not_found<B>(
    res: ServiceResponse<B>,
) -> actix_web::Result<ErrorHandlerResponse<B>>
where
    B: MessageBody + 'static,
{
    let (req, _) = res.into_parts();
    let viewer = Identity::from_session(&req).ok();

    let page = TemplateResponse::for_viewer(NOT_FOUND_TEMPLATE, viewer.as_ref())
        .insert("path", req.path())
        .with_status(StatusCode::NOT_FOUND)
        .respond_to(&req);

    let res = ServiceResponse::new(req, page).map_into_right_body();
    Ok(ErrorHandlerResponse::Response(res))
}

pub(crate) fn profile_url(username: &str) -> String {
    format!("/profile/{}/", utf8_percent_encode(username, SEGMENT_ENCODE_SET))
}

pub(crate) fn post_url(post_id: i64) -> String {
    format!("/posts/{post_id}/")
}

pub(crate) fn redirect(location: &str) -> HttpResponse {
    HttpResponse::Found()
        .insert_header((header::LOCATION, location))
        .finish()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_profile_url_encodes_username() {
        assert_eq!(profile_url("auth"), "/profile/auth/");
        assert_eq!(profile_url("leo.t+1@x"), "/profile/leo.t+1@x/");
        assert_eq!(profile_url("лев"), "/profile/%D0%BB%D0%B5%D0%B2/");
    }

    #[test]
    fn test_redirect_sets_location() {
        let response = redirect(&post_url(3));
        assert_eq!(response.status(), StatusCode::FOUND);
        assert_eq!(response.headers().get(header::LOCATION).unwrap(), "/posts/3/");
    }
}
