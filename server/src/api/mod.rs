pub mod account;
pub mod admin;
pub mod allergens;
pub mod dishes;
pub mod public;

use serde::Serialize;
use utoipa::openapi::security::{Http, HttpAuthScheme, SecurityScheme};
use utoipa::{OpenApi, ToSchema};

/// Shared error response used by all endpoints
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    /// Per-field messages, present only for validation failures
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldErrorBody>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorResponse {
            error: error.into(),
            fields: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct FieldErrorBody {
    /// `None` for errors that concern the whole form
    pub field: Option<String>,
    pub message: String,
}

/// Generate the complete OpenAPI spec by merging all module specs
pub fn openapi() -> utoipa::openapi::OpenApi {
    #[derive(OpenApi)]
    #[openapi(
        info(title = "Platebook", description = "Dishes, nutrients and allergens"),
        components(schemas(ErrorResponse, FieldErrorBody))
    )]
    struct BaseApi;

    let mut spec = BaseApi::openapi();

    if let Some(components) = spec.components.as_mut() {
        components.add_security_scheme(
            "bearer_auth",
            SecurityScheme::Http(Http::new(HttpAuthScheme::Bearer)),
        );
    }

    let modules: Vec<utoipa::openapi::OpenApi> = vec![
        public::ApiDoc::openapi(),
        account::ApiDoc::openapi(),
        allergens::ApiDoc::openapi(),
        dishes::ApiDoc::openapi(),
        admin::ApiDoc::openapi(),
    ];

    for module_spec in modules {
        spec.paths.paths.extend(module_spec.paths.paths);

        if let Some(module_components) = module_spec.components {
            if let Some(spec_components) = spec.components.as_mut() {
                spec_components.schemas.extend(module_components.schemas);
            }
        }
    }

    spec
}
