use crate::domain::client::present;
use crate::domain::error::{CLIENT_NOT_FOUND, DomainError};
use crate::domain::recipe::{CreateRecipe, PageParams, Recipe, RecipePage};
use crate::domain::repository::{ClientRepository, RecipeRepository};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

pub struct RecipeService<R: RecipeRepository + ClientRepository> {
    repository: Arc<R>,
}

impl<R: RecipeRepository + ClientRepository> RecipeService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, req), fields(client_id = ?req.client_id))]
    pub async fn create(&self, req: CreateRecipe) -> Result<Recipe> {
        let (Some(content), Some(client_id)) = (
            present(req.content.as_deref()),
            present(req.client_id.as_deref()),
        ) else {
            warn!("Recipe creation with missing fields");
            return Err(
                DomainError::Validation("Conteúdo e clientId são obrigatórios".to_string()).into(),
            );
        };

        if self.repository.find_client_by_id(client_id).await?.is_none() {
            warn!(client_id = %client_id, "Recipe owner not found");
            return Err(DomainError::NotFound(CLIENT_NOT_FOUND.to_string()).into());
        }

        let recipe = Recipe {
            id: Uuid::new_v4().to_string(),
            content: content.to_string(),
            client_id: client_id.to_string(),
        };
        self.repository.insert_recipe(recipe.clone()).await?;

        info!(recipe_id = %recipe.id, client_id = %recipe.client_id, "Recipe created");
        Ok(recipe)
    }

    /// Page of recipes the user has not favorited yet. A missing or blank
    /// user id excludes nothing.
    #[instrument(skip(self))]
    pub async fn get_page(&self, user_id: Option<&str>, page: PageParams) -> Result<RecipePage> {
        let user_id = present(user_id);

        let recipes = self
            .repository
            .list_recipes_not_favorited_by(user_id, page)
            .await?;
        let total_recipes = self
            .repository
            .count_recipes_not_favorited_by(user_id)
            .await?;

        debug!(
            returned = recipes.len(),
            total_recipes = total_recipes,
            "Recipe page computed"
        );

        Ok(RecipePage {
            recipes,
            skip: page.skip(),
            take: page.take(),
            total_pages: page.total_pages(total_recipes),
            total_recipes,
        })
    }
}
