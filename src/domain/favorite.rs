use crate::domain::recipe::Recipe;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Favorite {
    pub id: String,
    pub client_id: String,
    pub recipe_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FavoriteWithRecipe {
    pub id: String,
    pub client_id: String,
    pub recipe_id: String,
    pub recipe: Recipe,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddFavorite {
    #[serde(default)]
    pub client_id: Option<String>,
    #[serde(default)]
    pub recipe_id: Option<String>,
}
