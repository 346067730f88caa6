use crate::domain::client::{ClientView, LoginRequest, RegisterClient};
use crate::domain::repository::Store;
use crate::presentation::error::ApiError;
use crate::presentation::handlers::AppState;
use actix_web::{HttpResponse, web};
use serde::Serialize;
use tracing::{info, instrument};

#[derive(Serialize)]
pub struct ClientResponse {
    pub message: &'static str,
    pub client: ClientView,
}

// The password never reaches the span: only the email is recorded.
#[instrument(skip(state, req), fields(email = ?req.email))]
pub async fn register<R: Store>(
    state: web::Data<AppState<R>>,
    req: web::Json<RegisterClient>,
) -> Result<HttpResponse, ApiError> {
    info!("Registration request received");

    let client = state
        .auth_service
        .register(req.into_inner())
        .await
        .map_err(|e| ApiError::from_service(e, "Erro ao cadastrar cliente"))?;

    info!(client_id = %client.id, "Client registered successfully");
    Ok(HttpResponse::Created().json(ClientResponse {
        message: "Cliente cadastrado com sucesso!",
        client: client.into(),
    }))
}

#[instrument(skip(state, req), fields(email = ?req.email))]
pub async fn login<R: Store>(
    state: web::Data<AppState<R>>,
    req: web::Json<LoginRequest>,
) -> Result<HttpResponse, ApiError> {
    info!("Login request received");

    let client = state
        .auth_service
        .login(req.into_inner())
        .await
        .map_err(|e| ApiError::from_service(e, "Erro no login"))?;

    info!(client_id = %client.id, "Login successful");
    Ok(HttpResponse::Ok().json(ClientResponse {
        message: "Login bem-sucedido!",
        client: client.into(),
    }))
}
