use crate::domain::client::Client;
use crate::domain::favorite::{Favorite, FavoriteWithRecipe};
use crate::domain::recipe::{PageParams, Recipe};
use anyhow::Result;
use async_trait::async_trait;

#[async_trait]
pub trait ClientRepository: Send + Sync {
    /// Fails with `DomainError::Conflict` when the email is already taken.
    async fn insert_client(&self, client: Client) -> Result<()>;
    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>>;
    async fn find_client_by_id(&self, id: &str) -> Result<Option<Client>>;
}

#[async_trait]
pub trait RecipeRepository: Send + Sync {
    /// Fails with `DomainError::NotFound` when the owning client is unknown.
    async fn insert_recipe(&self, recipe: Recipe) -> Result<()>;
    async fn find_recipe_by_id(&self, id: &str) -> Result<Option<Recipe>>;
    /// Recipes the client has not favorited, in storage order. `None`
    /// excludes nothing.
    async fn list_recipes_not_favorited_by(
        &self,
        client_id: Option<&str>,
        page: PageParams,
    ) -> Result<Vec<Recipe>>;
    async fn count_recipes_not_favorited_by(&self, client_id: Option<&str>) -> Result<u64>;
}

#[async_trait]
pub trait FavoriteRepository: Send + Sync {
    /// Fails with `DomainError::Conflict` when the pair already exists and
    /// with `DomainError::NotFound` when either side is unknown.
    async fn insert_favorite(&self, favorite: Favorite) -> Result<()>;
    async fn find_favorite(&self, client_id: &str, recipe_id: &str) -> Result<Option<Favorite>>;
    async fn list_favorites_with_recipes(&self, client_id: &str)
    -> Result<Vec<FavoriteWithRecipe>>;
    async fn list_favorite_recipe_ids(&self, client_id: &str) -> Result<Vec<String>>;
}

/// Everything the HTTP layer needs from a backing store.
pub trait Store: ClientRepository + RecipeRepository + FavoriteRepository + 'static {}

impl<T> Store for T where T: ClientRepository + RecipeRepository + FavoriteRepository + 'static {}
