use crate::domain::client::Client;
use crate::domain::error::{
    CLIENT_NOT_FOUND, DomainError, EMAIL_TAKEN, FAVORITE_EXISTS, RECIPE_NOT_FOUND,
};
use crate::domain::favorite::{Favorite, FavoriteWithRecipe};
use crate::domain::recipe::{PageParams, Recipe};
use crate::domain::repository::{ClientRepository, FavoriteRepository, RecipeRepository};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, instrument, trace};

#[derive(Default)]
struct MemoryState {
    clients: HashMap<String, Client>,
    client_ids_by_email: HashMap<String, String>,
    // Vectors keep insertion order, which is the feed order.
    recipes: Vec<Recipe>,
    favorites: Vec<Favorite>,
    favorite_pairs: HashSet<(String, String)>,
}

impl MemoryState {
    fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    fn not_favorited_by<'a>(&'a self, client_id: Option<&str>) -> impl Iterator<Item = &'a Recipe> {
        let excluded: HashSet<&'a str> = match client_id {
            Some(client_id) => self
                .favorites
                .iter()
                .filter(|f| f.client_id == client_id)
                .map(|f| f.recipe_id.as_str())
                .collect(),
            None => HashSet::new(),
        };
        self.recipes
            .iter()
            .filter(move |recipe| !excluded.contains(recipe.id.as_str()))
    }
}

/// Store that keeps every record in process memory. Constraint checks run
/// under the same write lock as the insert they guard.
#[derive(Clone, Default)]
pub struct InMemoryStore {
    state: Arc<RwLock<MemoryState>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ClientRepository for InMemoryStore {
    #[instrument(skip(self, client), fields(client_id = %client.id, email = %client.email))]
    async fn insert_client(&self, client: Client) -> Result<()> {
        trace!("Acquiring write lock for client storage");
        let mut state = self.state.write().await;
        if state.client_ids_by_email.contains_key(&client.email) {
            return Err(DomainError::Conflict(EMAIL_TAKEN.to_string()).into());
        }
        state
            .client_ids_by_email
            .insert(client.email.clone(), client.id.clone());
        state.clients.insert(client.id.clone(), client);
        debug!("Client saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>> {
        let state = self.state.read().await;
        let client = state
            .client_ids_by_email
            .get(email)
            .and_then(|id| state.clients.get(id))
            .cloned();
        trace!(found = client.is_some(), "Looked up client by email");
        Ok(client)
    }

    #[instrument(skip(self))]
    async fn find_client_by_id(&self, id: &str) -> Result<Option<Client>> {
        let state = self.state.read().await;
        let client = state.clients.get(id).cloned();
        trace!(found = client.is_some(), "Looked up client by id");
        Ok(client)
    }
}

#[async_trait]
impl RecipeRepository for InMemoryStore {
    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id, client_id = %recipe.client_id))]
    async fn insert_recipe(&self, recipe: Recipe) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.clients.contains_key(&recipe.client_id) {
            return Err(DomainError::NotFound(CLIENT_NOT_FOUND.to_string()).into());
        }
        state.recipes.push(recipe);
        debug!("Recipe saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_recipe_by_id(&self, id: &str) -> Result<Option<Recipe>> {
        let state = self.state.read().await;
        Ok(state.recipe(id).cloned())
    }

    #[instrument(skip(self))]
    async fn list_recipes_not_favorited_by(
        &self,
        client_id: Option<&str>,
        page: PageParams,
    ) -> Result<Vec<Recipe>> {
        let state = self.state.read().await;
        let recipes: Vec<Recipe> = state
            .not_favorited_by(client_id)
            .skip(page.skip() as usize)
            .take(page.take() as usize)
            .cloned()
            .collect();
        trace!(count = recipes.len(), "Collected recipe page");
        Ok(recipes)
    }

    #[instrument(skip(self))]
    async fn count_recipes_not_favorited_by(&self, client_id: Option<&str>) -> Result<u64> {
        let state = self.state.read().await;
        Ok(state.not_favorited_by(client_id).count() as u64)
    }
}

#[async_trait]
impl FavoriteRepository for InMemoryStore {
    #[instrument(
        skip(self, favorite),
        fields(favorite_id = %favorite.id, client_id = %favorite.client_id, recipe_id = %favorite.recipe_id)
    )]
    async fn insert_favorite(&self, favorite: Favorite) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.clients.contains_key(&favorite.client_id) {
            return Err(DomainError::NotFound(CLIENT_NOT_FOUND.to_string()).into());
        }
        if state.recipe(&favorite.recipe_id).is_none() {
            return Err(DomainError::NotFound(RECIPE_NOT_FOUND.to_string()).into());
        }
        let pair = (favorite.client_id.clone(), favorite.recipe_id.clone());
        if !state.favorite_pairs.insert(pair) {
            return Err(DomainError::Conflict(FAVORITE_EXISTS.to_string()).into());
        }
        state.favorites.push(favorite);
        debug!("Favorite saved to memory storage");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_favorite(&self, client_id: &str, recipe_id: &str) -> Result<Option<Favorite>> {
        let state = self.state.read().await;
        Ok(state
            .favorites
            .iter()
            .find(|f| f.client_id == client_id && f.recipe_id == recipe_id)
            .cloned())
    }

    #[instrument(skip(self))]
    async fn list_favorites_with_recipes(
        &self,
        client_id: &str,
    ) -> Result<Vec<FavoriteWithRecipe>> {
        let state = self.state.read().await;
        let favorites = state
            .favorites
            .iter()
            .filter(|f| f.client_id == client_id)
            .filter_map(|f| {
                state.recipe(&f.recipe_id).map(|recipe| FavoriteWithRecipe {
                    id: f.id.clone(),
                    client_id: f.client_id.clone(),
                    recipe_id: f.recipe_id.clone(),
                    recipe: recipe.clone(),
                })
            })
            .collect();
        Ok(favorites)
    }

    #[instrument(skip(self))]
    async fn list_favorite_recipe_ids(&self, client_id: &str) -> Result<Vec<String>> {
        let state = self.state.read().await;
        Ok(state
            .favorites
            .iter()
            .filter(|f| f.client_id == client_id)
            .map(|f| f.recipe_id.clone())
            .collect())
    }
}
