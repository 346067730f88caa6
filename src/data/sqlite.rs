//! SQLite-backed store.
//!
//! Uniqueness of client emails and favorite pairs is enforced by the schema,
//! so the pre-checks done by the services cannot race into duplicates.

use crate::domain::client::Client;
use crate::domain::error::{
    CLIENT_NOT_FOUND, DomainError, EMAIL_TAKEN, FAVORITE_EXISTS, RECIPE_NOT_FOUND,
};
use crate::domain::favorite::{Favorite, FavoriteWithRecipe};
use crate::domain::recipe::{PageParams, Recipe};
use crate::domain::repository::{ClientRepository, FavoriteRepository, RecipeRepository};
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, SqlitePool};
use std::str::FromStr;
use tracing::{debug, info, instrument};

const MAX_CONNECTIONS: u32 = 5;

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Opens (creating if needed) the database and applies the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        let options = SqliteConnectOptions::from_str(database_url)
            .with_context(|| format!("invalid SQLite URL: {database_url}"))?
            .create_if_missing(true)
            .foreign_keys(true);

        // Every connection to `:memory:` opens its own database, so the pool
        // is pinned to one connection that never expires.
        let pool = if database_url.contains(":memory:") {
            SqlitePoolOptions::new()
                .max_connections(1)
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None)
                .connect_with(options)
                .await?
        } else {
            SqlitePoolOptions::new()
                .max_connections(MAX_CONNECTIONS)
                .connect_with(options)
                .await?
        };

        let store = Self { pool };
        store.migrate().await?;
        info!(database_url = %database_url, "SQLite store ready");
        Ok(store)
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS clients (
                id TEXT PRIMARY KEY,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                password_hash TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS recipes (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                client_id TEXT NOT NULL REFERENCES clients(id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS favorites (
                id TEXT PRIMARY KEY,
                client_id TEXT NOT NULL REFERENCES clients(id),
                recipe_id TEXT NOT NULL REFERENCES recipes(id),
                UNIQUE (client_id, recipe_id)
            )
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query("CREATE INDEX IF NOT EXISTS idx_recipes_client_id ON recipes(client_id)")
            .execute(&self.pool)
            .await?;
        sqlx::query("CREATE INDEX IF NOT EXISTS idx_favorites_recipe_id ON favorites(recipe_id)")
            .execute(&self.pool)
            .await?;

        debug!("SQLite schema applied");
        Ok(())
    }
}

fn recipe_from_row(row: &SqliteRow) -> Result<Recipe> {
    Ok(Recipe {
        id: row.try_get("id")?,
        content: row.try_get("content")?,
        client_id: row.try_get("client_id")?,
    })
}

fn client_from_row(row: &SqliteRow) -> Result<Client> {
    Ok(Client {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        email: row.try_get("email")?,
        password_hash: row.try_get("password_hash")?,
    })
}

/// Translates constraint violations into domain errors; anything else is
/// passed through untouched.
fn map_constraint_error(
    err: sqlx::Error,
    on_unique: &str,
    on_foreign_key: &str,
) -> anyhow::Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return DomainError::Conflict(on_unique.to_string()).into();
        }
        if db_err.is_foreign_key_violation() {
            return DomainError::NotFound(on_foreign_key.to_string()).into();
        }
    }
    err.into()
}

#[async_trait]
impl ClientRepository for SqliteStore {
    #[instrument(skip(self, client), fields(client_id = %client.id, email = %client.email))]
    async fn insert_client(&self, client: Client) -> Result<()> {
        sqlx::query("INSERT INTO clients (id, name, email, password_hash) VALUES (?1, ?2, ?3, ?4)")
            .bind(&client.id)
            .bind(&client.name)
            .bind(&client.email)
            .bind(&client.password_hash)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, EMAIL_TAKEN, CLIENT_NOT_FOUND))?;
        debug!("Client inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_client_by_email(&self, email: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT id, name, email, password_hash FROM clients WHERE email = ?1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(client_from_row).transpose()
    }

    #[instrument(skip(self))]
    async fn find_client_by_id(&self, id: &str) -> Result<Option<Client>> {
        let row = sqlx::query("SELECT id, name, email, password_hash FROM clients WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(client_from_row).transpose()
    }
}

#[async_trait]
impl RecipeRepository for SqliteStore {
    #[instrument(skip(self, recipe), fields(recipe_id = %recipe.id, client_id = %recipe.client_id))]
    async fn insert_recipe(&self, recipe: Recipe) -> Result<()> {
        sqlx::query("INSERT INTO recipes (id, content, client_id) VALUES (?1, ?2, ?3)")
            .bind(&recipe.id)
            .bind(&recipe.content)
            .bind(&recipe.client_id)
            .execute(&self.pool)
            .await
            .map_err(|e| map_constraint_error(e, "Receita já existe", CLIENT_NOT_FOUND))?;
        debug!("Recipe inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_recipe_by_id(&self, id: &str) -> Result<Option<Recipe>> {
        let row = sqlx::query("SELECT id, content, client_id FROM recipes WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        row.as_ref().map(recipe_from_row).transpose()
    }

    // A NULL client id never equals a favorite's client_id, so `None`
    // leaves every recipe in the feed.
    #[instrument(skip(self))]
    async fn list_recipes_not_favorited_by(
        &self,
        client_id: Option<&str>,
        page: PageParams,
    ) -> Result<Vec<Recipe>> {
        let rows = sqlx::query(
            r#"
            SELECT r.id, r.content, r.client_id
            FROM recipes r
            WHERE NOT EXISTS (
                SELECT 1 FROM favorites f
                WHERE f.recipe_id = r.id AND f.client_id = ?1
            )
            ORDER BY r.rowid
            LIMIT ?2 OFFSET ?3
            "#,
        )
        .bind(client_id)
        .bind(i64::from(page.take()))
        .bind(i64::from(page.skip()))
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(recipe_from_row).collect()
    }

    #[instrument(skip(self))]
    async fn count_recipes_not_favorited_by(&self, client_id: Option<&str>) -> Result<u64> {
        let count: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*)
            FROM recipes r
            WHERE NOT EXISTS (
                SELECT 1 FROM favorites f
                WHERE f.recipe_id = r.id AND f.client_id = ?1
            )
            "#,
        )
        .bind(client_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(u64::try_from(count)?)
    }
}

#[async_trait]
impl FavoriteRepository for SqliteStore {
    #[instrument(
        skip(self, favorite),
        fields(favorite_id = %favorite.id, client_id = %favorite.client_id, recipe_id = %favorite.recipe_id)
    )]
    async fn insert_favorite(&self, favorite: Favorite) -> Result<()> {
        let result = sqlx::query("INSERT INTO favorites (id, client_id, recipe_id) VALUES (?1, ?2, ?3)")
            .bind(&favorite.id)
            .bind(&favorite.client_id)
            .bind(&favorite.recipe_id)
            .execute(&self.pool)
            .await;

        if let Err(err) = result {
            let err = map_constraint_error(err, FAVORITE_EXISTS, RECIPE_NOT_FOUND);
            // SQLite does not say which foreign key failed.
            if matches!(err.downcast_ref::<DomainError>(), Some(DomainError::NotFound(_)))
                && self.find_client_by_id(&favorite.client_id).await?.is_none()
            {
                return Err(DomainError::NotFound(CLIENT_NOT_FOUND.to_string()).into());
            }
            return Err(err);
        }
        debug!("Favorite inserted");
        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_favorite(&self, client_id: &str, recipe_id: &str) -> Result<Option<Favorite>> {
        let row = sqlx::query(
            "SELECT id, client_id, recipe_id FROM favorites WHERE client_id = ?1 AND recipe_id = ?2",
        )
        .bind(client_id)
        .bind(recipe_id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(|row| -> Result<Favorite> {
            Ok(Favorite {
                id: row.try_get("id")?,
                client_id: row.try_get("client_id")?,
                recipe_id: row.try_get("recipe_id")?,
            })
        })
        .transpose()
    }

    #[instrument(skip(self))]
    async fn list_favorites_with_recipes(
        &self,
        client_id: &str,
    ) -> Result<Vec<FavoriteWithRecipe>> {
        let rows = sqlx::query(
            r#"
            SELECT f.id, f.client_id, f.recipe_id,
                   r.content AS recipe_content, r.client_id AS recipe_client_id
            FROM favorites f
            JOIN recipes r ON r.id = f.recipe_id
            WHERE f.client_id = ?1
            ORDER BY f.rowid
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;

        rows.iter()
            .map(|row| -> Result<FavoriteWithRecipe> {
                let recipe_id: String = row.try_get("recipe_id")?;
                Ok(FavoriteWithRecipe {
                    id: row.try_get("id")?,
                    client_id: row.try_get("client_id")?,
                    recipe: Recipe {
                        id: recipe_id.clone(),
                        content: row.try_get("recipe_content")?,
                        client_id: row.try_get("recipe_client_id")?,
                    },
                    recipe_id,
                })
            })
            .collect()
    }

    #[instrument(skip(self))]
    async fn list_favorite_recipe_ids(&self, client_id: &str) -> Result<Vec<String>> {
        let ids: Vec<String> = sqlx::query_scalar(
            "SELECT recipe_id FROM favorites WHERE client_id = ?1 ORDER BY rowid",
        )
        .bind(client_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(ids)
    }
}
