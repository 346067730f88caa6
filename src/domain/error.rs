use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Conflict: {0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

pub const EMAIL_TAKEN: &str = "E-mail já cadastrado";
pub const CLIENT_NOT_FOUND: &str = "Usuário não encontrado";
pub const RECIPE_NOT_FOUND: &str = "Receita não encontrada";
pub const FAVORITE_EXISTS: &str = "Esta receita já está nos favoritos";
