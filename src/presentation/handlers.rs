use crate::application::auth_service::AuthService;
use crate::application::favorite_service::FavoriteService;
use crate::application::recipe_service::RecipeService;
use crate::domain::favorite::{AddFavorite, Favorite, FavoriteWithRecipe};
use crate::domain::recipe::{CreateRecipe, PageParams, Recipe, RecipePage};
use crate::domain::repository::Store;
use crate::presentation::error::ApiError;
use actix_web::{HttpResponse, web};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};

// AppState holding the services, all sharing one store
pub struct AppState<R: Store> {
    pub auth_service: AuthService<R>,
    pub recipe_service: RecipeService<R>,
    pub favorite_service: FavoriteService<R>,
}

impl<R: Store> AppState<R> {
    pub fn new(store: Arc<R>) -> Self {
        Self {
            auth_service: AuthService::new(store.clone()),
            recipe_service: RecipeService::new(store.clone()),
            favorite_service: FavoriteService::new(store),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipeFeedQuery {
    pub take: Option<String>,
    pub skip: Option<String>,
    pub user_id: Option<String>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    timestamp: String,
}

#[derive(Serialize)]
struct FavoriteResponse {
    message: &'static str,
    favorite: Favorite,
}

#[derive(Serialize)]
struct FavoritesResponse {
    message: &'static str,
    favorites: Vec<FavoriteWithRecipe>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct RecipeIdsResponse {
    message: &'static str,
    recipe_ids: Vec<String>,
}

#[derive(Serialize)]
struct RecipeResponse {
    message: &'static str,
    recipe: Recipe,
}

#[derive(Serialize)]
struct RecipePageResponse {
    message: &'static str,
    #[serde(flatten)]
    page: RecipePage,
}

#[instrument]
pub async fn health_check() -> HttpResponse {
    let response = HealthResponse {
        status: "ok".to_string(),
        timestamp: Utc::now().to_rfc3339(),
    };
    HttpResponse::Ok().json(response)
}

#[instrument(skip(state))]
pub async fn add_favorite<R: Store>(
    state: web::Data<AppState<R>>,
    req: web::Json<AddFavorite>,
) -> Result<HttpResponse, ApiError> {
    let favorite = state
        .favorite_service
        .add(req.into_inner())
        .await
        .map_err(|e| ApiError::from_service(e, "Erro ao adicionar favorito"))?;

    info!(
        favorite_id = %favorite.id,
        client_id = %favorite.client_id,
        recipe_id = %favorite.recipe_id,
        "Favorite added"
    );
    Ok(HttpResponse::Created().json(FavoriteResponse {
        message: "Receita adicionada aos favoritos com sucesso!",
        favorite,
    }))
}

#[instrument(skip(state), fields(client_id = %*path))]
pub async fn list_favorites<R: Store>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client_id = path.into_inner();
    let favorites = state
        .favorite_service
        .list_by_client(&client_id)
        .await
        .map_err(|e| ApiError::from_service(e, "Erro ao buscar favoritos"))?;

    let message = if favorites.is_empty() {
        "Nenhum favorito encontrado para este usuário."
    } else {
        "Favoritos encontrados"
    };
    info!(count = favorites.len(), "Favorites listed");
    Ok(HttpResponse::Ok().json(FavoritesResponse { message, favorites }))
}

#[instrument(skip(state), fields(client_id = %*path))]
pub async fn list_favorite_recipe_ids<R: Store>(
    state: web::Data<AppState<R>>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let client_id = path.into_inner();
    let recipe_ids = state
        .favorite_service
        .list_recipe_ids_by_client(&client_id)
        .await
        .map_err(|e| ApiError::from_service(e, "Erro ao buscar favoritos"))?;

    let message = if recipe_ids.is_empty() {
        "Nenhum favorito"
    } else {
        "IDs das receitas favoritas encontrados"
    };
    info!(count = recipe_ids.len(), "Favorite recipe ids listed");
    Ok(HttpResponse::Ok().json(RecipeIdsResponse {
        message,
        recipe_ids,
    }))
}

#[instrument(skip(state))]
pub async fn list_recipes<R: Store>(
    state: web::Data<AppState<R>>,
    query: web::Query<RecipeFeedQuery>,
) -> Result<HttpResponse, ApiError> {
    let page = PageParams::parse(query.skip.as_deref(), query.take.as_deref())?;
    let page = state
        .recipe_service
        .get_page(query.user_id.as_deref(), page)
        .await
        .map_err(|e| ApiError::from_service(e, "Erro ao buscar receitas"))?;

    info!(
        returned = page.recipes.len(),
        total_recipes = page.total_recipes,
        total_pages = page.total_pages,
        "Recipe page served"
    );
    Ok(HttpResponse::Ok().json(RecipePageResponse {
        message: "Receitas encontradas",
        page,
    }))
}

#[instrument(skip(state))]
pub async fn create_recipe<R: Store>(
    state: web::Data<AppState<R>>,
    req: web::Json<CreateRecipe>,
) -> Result<HttpResponse, ApiError> {
    let recipe = state
        .recipe_service
        .create(req.into_inner())
        .await
        .map_err(|e| ApiError::from_service(e, "Erro ao criar receita"))?;

    info!(recipe_id = %recipe.id, "Recipe created");
    Ok(HttpResponse::Created().json(RecipeResponse {
        message: "Receita criada com sucesso!",
        recipe,
    }))
}
