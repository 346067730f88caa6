use crate::domain::client::present;
use crate::domain::error::{CLIENT_NOT_FOUND, DomainError, FAVORITE_EXISTS, RECIPE_NOT_FOUND};
use crate::domain::favorite::{AddFavorite, Favorite, FavoriteWithRecipe};
use crate::domain::repository::{ClientRepository, FavoriteRepository, RecipeRepository};
use anyhow::Result;
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

pub struct FavoriteService<R: FavoriteRepository + ClientRepository + RecipeRepository> {
    repository: Arc<R>,
}

impl<R: FavoriteRepository + ClientRepository + RecipeRepository> FavoriteService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// The existence pre-check gives the friendly error; the store's own
    /// uniqueness guard settles concurrent inserts.
    #[instrument(skip(self, req), fields(client_id = ?req.client_id, recipe_id = ?req.recipe_id))]
    pub async fn add(&self, req: AddFavorite) -> Result<Favorite> {
        let client_id = present(req.client_id.as_deref())
            .ok_or_else(|| DomainError::Validation("clientId é obrigatório".to_string()))?;
        let recipe_id = present(req.recipe_id.as_deref())
            .ok_or_else(|| DomainError::Validation("recipeId é obrigatório".to_string()))?;

        if self.repository.find_client_by_id(client_id).await?.is_none() {
            warn!(client_id = %client_id, "Client not found");
            return Err(DomainError::NotFound(CLIENT_NOT_FOUND.to_string()).into());
        }
        if self.repository.find_recipe_by_id(recipe_id).await?.is_none() {
            warn!(recipe_id = %recipe_id, "Recipe not found");
            return Err(DomainError::NotFound(RECIPE_NOT_FOUND.to_string()).into());
        }
        if self
            .repository
            .find_favorite(client_id, recipe_id)
            .await?
            .is_some()
        {
            warn!(client_id = %client_id, recipe_id = %recipe_id, "Favorite already exists");
            return Err(DomainError::Conflict(FAVORITE_EXISTS.to_string()).into());
        }

        let favorite = Favorite {
            id: Uuid::new_v4().to_string(),
            client_id: client_id.to_string(),
            recipe_id: recipe_id.to_string(),
        };
        self.repository.insert_favorite(favorite.clone()).await?;

        info!(favorite_id = %favorite.id, "Favorite added");
        Ok(favorite)
    }

    #[instrument(skip(self))]
    pub async fn list_by_client(&self, client_id: &str) -> Result<Vec<FavoriteWithRecipe>> {
        self.repository.list_favorites_with_recipes(client_id).await
    }

    /// Empty when the client has no favorites; "no favorites" is not an error.
    #[instrument(skip(self))]
    pub async fn list_recipe_ids_by_client(&self, client_id: &str) -> Result<Vec<String>> {
        self.repository.list_favorite_recipe_ids(client_id).await
    }
}
