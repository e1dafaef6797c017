//! # Handlers HTTP — Os Endpoints da Aplicação
//!
//! Cada função pública neste módulo é um handler Axum, mapeado a uma
//! rota em [`super::create_router()`].
//!
//! ## Padrão de Resposta
//!
//! | Handler | Método | Retorno | Uso |
//! |---------|--------|---------|-----|
//! | `chat` | POST | JSON `{reply}` | a rota principal do Oráculo |
//! | `status` | GET | JSON `{ready}` | liveness probe |
//!
//! ## Nenhum Erro Atravessa
//!
//! A rota `/oraculo` responde **sempre** com status 200 e um payload
//! `{reply}` válido: campos ausentes ou em branco, e até JSON malformado,
//! viram o pedido de esclarecimento do Oráculo — nunca um 4xx/5xx. A
//! causa interna fica nos logs, não na resposta.

use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::Json;
use chrono::Local;

use super::state::AppState;
use crate::error::OracleError;
use crate::reply;

/// Corpo da requisição de chat.
///
/// Os campos são opcionais de propósito: a ausência é tratada como
/// conversa a esclarecer, não como erro de validação.
#[derive(serde::Deserialize)]
pub struct ChatRequest {
    /// Mensagem do usuário.
    pub message: Option<String>,
    /// Identificador do usuário.
    pub user_id: Option<String>,
}

/// Resposta de toda requisição de chat.
#[derive(serde::Serialize)]
pub struct ChatReply {
    /// Texto do Oráculo, pronto para exibição.
    pub reply: String,
}

/// Resposta do endpoint `/status`.
#[derive(serde::Serialize)]
pub struct StatusResponse {
    /// O pipeline é síncrono e montado no bootstrap; se o servidor
    /// responde, está pronto.
    pub ready: bool,
}

/// POST `/oraculo` — a rota principal do diálogo.
///
/// Valida a presença de `message` e `user_id` (em branco conta como
/// ausente) e delega ao orquestrador, que nunca retorna erro. A data
/// "hoje" é capturada aqui, na borda, e injetada no pipeline.
pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Json<ChatReply> {
    let request = match payload {
        Ok(Json(request)) => request,
        Err(rejection) => {
            tracing::debug!(error = %rejection, "payload de chat malformado");
            return Json(ChatReply {
                reply: reply::for_error(&OracleError::MissingInput).to_string(),
            });
        }
    };

    let (message, user_id) = match (
        request.message.as_deref().map(str::trim),
        request.user_id.as_deref().map(str::trim),
    ) {
        (Some(message), Some(user_id)) if !message.is_empty() && !user_id.is_empty() => {
            (message, user_id)
        }
        _ => {
            tracing::debug!("requisição sem message ou user_id");
            return Json(ChatReply {
                reply: reply::for_error(&OracleError::MissingInput).to_string(),
            });
        }
    };

    let today = Local::now().date_naive();
    let reply = state.orchestrator.process_message(user_id, message, today).await;
    Json(ChatReply { reply })
}

/// GET `/status` — liveness probe.
pub async fn status() -> Json<StatusResponse> {
    Json(StatusResponse { ready: true })
}
