use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        // "categorys" is baked into stored media paths; the route spelling
        // matches the folder root.
        .nest("/categorys", category_routes())
        .nest("/products", product_routes())
        .nest("/users", user_routes())
}

fn category_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::category::list_categories,
            handlers::category::create_category
        ))
        .routes(routes!(
            handlers::category::get_category,
            handlers::category::update_category,
            handlers::category::delete_category
        ))
}

fn product_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(
            handlers::product::list_products,
            handlers::product::create_product
        ))
        .routes(routes!(
            handlers::product::get_product,
            handlers::product::update_product,
            handlers::product::delete_product
        ))
}

fn user_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::user::create_user))
        .routes(routes!(
            handlers::user::get_user,
            handlers::user::update_user
        ))
}
