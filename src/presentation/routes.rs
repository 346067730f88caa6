use crate::domain::repository::Store;
use crate::presentation::auth::{login, register};
use crate::presentation::error::ApiError;
use crate::presentation::handlers::{
    add_favorite, create_recipe, health_check, list_favorite_recipe_ids, list_favorites,
    list_recipes,
};
use actix_web::web;
use tracing::warn;

/// Registers every route on `cfg`. Paths are kept as the existing clients
/// expect them.
pub fn configure<R: Store>(cfg: &mut web::ServiceConfig) {
    cfg.app_data(json_config())
        .app_data(query_config())
        .route("/health", web::get().to(health_check))
        .route("/cadastro", web::post().to(register::<R>))
        .route("/login", web::post().to(login::<R>))
        .route("/favoritos", web::post().to(add_favorite::<R>))
        .route(
            "/favoritos/ids/{client_id}",
            web::get().to(list_favorite_recipe_ids::<R>),
        )
        .route("/favoritos/{client_id}", web::get().to(list_favorites::<R>))
        .service(
            web::resource("/receitas")
                .route(web::get().to(list_recipes::<R>))
                .route(web::post().to(create_recipe::<R>)),
        );
}

fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        warn!(error = %err, "Rejected JSON payload");
        ApiError::Validation("Corpo da requisição inválido".to_string()).into()
    })
}

fn query_config() -> web::QueryConfig {
    web::QueryConfig::default().error_handler(|err, _req| {
        warn!(error = %err, "Rejected query string");
        ApiError::Validation("Parâmetros de consulta inválidos".to_string()).into()
    })
}
