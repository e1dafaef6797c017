//! # Módulo Web — O Transporte HTTP do Oráculo
//!
//! Camada fina sobre o orquestrador, construída com **Axum** +
//! **tower-http**. O transporte não contém regra de negócio: valida a
//! forma da requisição, captura a data "hoje" e delega.
//!
//! ## Arquitetura Web
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │ Cliente (app/chat)                                      │
//! ├─────────────────────────────────────────────────────────┤
//! │ Axum Router (este módulo)                               │
//! │  ├── POST /oraculo  → {message, user_id} → {reply}      │
//! │  └── GET  /status   → JSON: serviço pronto?             │
//! ├─────────────────────────────────────────────────────────┤
//! │ CorsLayer (origem aberta) + TraceLayer                  │
//! └─────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Submódulos
//!
//! | Módulo | Responsabilidade |
//! |--------|------------------|
//! | [`state`] | Estado compartilhado (`AppState`) |
//! | [`handlers`] | Handlers Axum para cada rota |

pub mod handlers;
pub mod state;

use axum::http::{header, Method};
use axum::routing::{get, post};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use state::AppState;

/// Cria o router Axum com todas as rotas da aplicação.
///
/// O CORS é deliberadamente aberto (`*`): o serviço é consumido por
/// frontends de origens variadas e não carrega credenciais de navegador.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS]);

    Router::new()
        .route("/oraculo", post(handlers::chat))
        .route("/status", get(handlers::status))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
