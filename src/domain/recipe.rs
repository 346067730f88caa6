use crate::domain::error::DomainError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recipe {
    pub id: String,
    pub content: String,
    pub client_id: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecipe {
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub client_id: Option<String>,
}

/// Offset/limit window over the recipe feed.
///
/// `take` is always at least 1, which keeps [`PageParams::total_pages`]
/// defined for every value that can be constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    skip: u32,
    take: u32,
}

impl PageParams {
    pub const DEFAULT_SKIP: u32 = 0;
    pub const DEFAULT_TAKE: u32 = 5;

    pub fn new(skip: u32, take: u32) -> Result<Self, DomainError> {
        if take == 0 {
            return Err(DomainError::Validation(
                "take deve ser um inteiro maior que zero".to_string(),
            ));
        }
        Ok(Self { skip, take })
    }

    /// Parses the raw query-string values. Missing or blank values fall back
    /// to the defaults.
    pub fn parse(skip: Option<&str>, take: Option<&str>) -> Result<Self, DomainError> {
        let skip = match skip.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::DEFAULT_SKIP,
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                DomainError::Validation(
                    "skip deve ser um inteiro maior ou igual a zero".to_string(),
                )
            })?,
        };
        let take = match take.map(str::trim).filter(|s| !s.is_empty()) {
            None => Self::DEFAULT_TAKE,
            Some(raw) => raw.parse::<u32>().map_err(|_| {
                DomainError::Validation("take deve ser um inteiro maior que zero".to_string())
            })?,
        };
        Self::new(skip, take)
    }

    pub fn skip(&self) -> u32 {
        self.skip
    }

    pub fn take(&self) -> u32 {
        self.take
    }

    pub fn total_pages(&self, total: u64) -> u64 {
        total.div_ceil(u64::from(self.take))
    }
}

impl Default for PageParams {
    fn default() -> Self {
        Self {
            skip: Self::DEFAULT_SKIP,
            take: Self::DEFAULT_TAKE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecipePage {
    pub recipes: Vec<Recipe>,
    pub skip: u32,
    pub take: u32,
    pub total_pages: u64,
    pub total_recipes: u64,
}
