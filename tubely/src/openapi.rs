//! OpenAPI documentation for the video API.
//!
//! Rendered with Scalar at `/docs`; the raw document is served at `/api-docs/openapi.json`.

use utoipa::{
    Modify, OpenApi,
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
};

use crate::{api, errors::ErrorResponse};

/// Bearer JWT security scheme
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.security_schemes.insert(
                "BearerAuth".to_string(),
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some(
                            "HS256 access token whose subject is the caller's user ID:\n\n\
                            ```\nAuthorization: Bearer <token>\n```",
                        ))
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "tubely",
        description = "Video records and thumbnail uploads"
    ),
    modifiers(&SecurityAddon),
    paths(
        api::handlers::videos::upload_thumbnail,
        api::handlers::videos::get_video,
    ),
    components(schemas(api::models::videos::VideoResponse, ErrorResponse)),
    tags(
        (name = "videos", description = "Video records and their thumbnails")
    )
)]
pub struct ApiDoc;
