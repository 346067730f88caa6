use crate::domain::client::{Client, LoginRequest, RegisterClient, present};
use crate::domain::error::{CLIENT_NOT_FOUND, DomainError, EMAIL_TAKEN};
use crate::domain::repository::ClientRepository;
use crate::infrastructure::security::{hash_password_blocking, verify_password_blocking};
use anyhow::Result;
use std::sync::Arc;
use tracing::{debug, info, instrument, trace, warn};
use uuid::Uuid;

pub struct AuthService<R: ClientRepository> {
    repository: Arc<R>,
}

impl<R: ClientRepository> AuthService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    #[instrument(skip(self, req), fields(email = ?req.email))]
    pub async fn register(&self, req: RegisterClient) -> Result<Client> {
        trace!("Starting client registration");

        let (Some(name), Some(email), Some(password)) = (
            present(req.name.as_deref()),
            present(req.email.as_deref()),
            present(req.password.as_deref()),
        ) else {
            warn!("Registration with missing fields");
            return Err(
                DomainError::Validation("Nome, email e senha são obrigatórios".to_string()).into(),
            );
        };

        if self.repository.find_client_by_email(email).await?.is_some() {
            warn!(email = %email, "Email already registered");
            return Err(DomainError::Conflict(EMAIL_TAKEN.to_string()).into());
        }

        let password_hash = hash_password_blocking(password.to_string()).await?;

        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: name.to_string(),
            email: email.to_string(),
            password_hash,
        };

        debug!(client_id = %client.id, "Saving client to repository");
        self.repository.insert_client(client.clone()).await?;

        info!(client_id = %client.id, email = %client.email, "Client registered");
        Ok(client)
    }

    #[instrument(skip(self, req), fields(email = ?req.email))]
    pub async fn login(&self, req: LoginRequest) -> Result<Client> {
        trace!("Starting login");

        let (Some(email), Some(password)) = (
            present(req.email.as_deref()),
            present(req.password.as_deref()),
        ) else {
            return Err(DomainError::Validation("Email e senha são obrigatórios".to_string()).into());
        };

        let client = self
            .repository
            .find_client_by_email(email)
            .await?
            .ok_or_else(|| {
                warn!(email = %email, "Client not found during login");
                DomainError::NotFound(CLIENT_NOT_FOUND.to_string())
            })?;

        let is_valid =
            verify_password_blocking(password.to_string(), client.password_hash.clone()).await?;
        if !is_valid {
            warn!(client_id = %client.id, "Invalid password during login");
            return Err(DomainError::Unauthorized("Senha incorreta".to_string()).into());
        }

        info!(client_id = %client.id, "Login successful");
        Ok(client)
    }
}
