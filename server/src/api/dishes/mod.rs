pub mod create;
pub mod delete;
pub mod form;
pub mod get;
pub mod list;
pub mod photo;
pub mod query;
pub mod store;
pub mod update;

use crate::AppState;
use axum::extract::DefaultBodyLimit;
use axum::routing::get;
use axum::Router;
use utoipa::OpenApi;

/// Returns the router for /api/dishes endpoints (mounted at /api/dishes)
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list::list_dishes).post(create::create_dish))
        .route(
            "/{id}",
            get(get::get_dish)
                .put(update::update_dish)
                .delete(delete::delete_dish),
        )
        .route("/{id}/photo", get(photo::get_dish_photo))
        .route("/{id}/photo/thumbnail", get(photo::get_dish_thumbnail))
        .layer(DefaultBodyLimit::max(form::MAX_DISH_BODY_SIZE))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        list::list_dishes,
        create::create_dish,
        get::get_dish,
        update::update_dish,
        delete::delete_dish,
        photo::get_dish_photo,
        photo::get_dish_thumbnail,
    ),
    components(schemas(
        create::CreateDishResponse,
        create::DishFormRequest,
        list::ListDishesResponse,
        list::PaginationResponse,
        list::AveragesResponse,
        list::AppliedFilters,
        store::DishResponse,
    ))
)]
pub struct ApiDoc;
