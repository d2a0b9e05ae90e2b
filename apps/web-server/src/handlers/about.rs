//! Static "about" pages.

use crate::middleware::auth::OptionalIdentity;
use crate::templating::{ABOUT_AUTHOR_TEMPLATE, ABOUT_TECH_TEMPLATE, TemplateResponse};

/// GET /about/author/
pub async fn author(viewer: OptionalIdentity) -> TemplateResponse {
    TemplateResponse::for_viewer(ABOUT_AUTHOR_TEMPLATE, viewer.identity())
}

/// GET /about/tech/
pub async fn tech(viewer: OptionalIdentity) -> TemplateResponse {
    TemplateResponse::for_viewer(ABOUT_TECH_TEMPLATE, viewer.identity())
}
