//! # Estado da Aplicação Web
//!
//! O [`AppState`] é o estado compartilhado entre todos os handlers Axum,
//! injetado via extrator `State<AppState>`. Ele carrega apenas o
//! orquestrador — todo o resto (sessões, pipeline, colaboradores) vive
//! dentro dele, montado uma única vez no bootstrap.

use std::sync::Arc;

use crate::orchestrator::Orchestrator;

/// Estado compartilhado da aplicação Axum.
#[derive(Clone)]
pub struct AppState {
    /// Orquestrador do diálogo, compartilhado e imutável.
    pub orchestrator: Arc<Orchestrator>,
}
