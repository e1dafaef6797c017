//! # Oráculo Financeiro
//!
//! **Ponto de entrada principal** do Oráculo Financeiro — o serviço que
//! transforma mensagens de chat sobre gastos pessoais em lançamentos
//! estruturados, mediado por um diálogo curto de confirmação.
//!
//! ## Fluxo de Inicialização
//!
//! ```text
//! main()
//!   ├── Configura tracing/logging (RUST_LOG)
//!   ├── Lê a configuração do ambiente
//!   ├── Monta o pipeline NLU (determinístico, sem modelo externo)
//!   ├── Monta os colaboradores:
//!   │   ├── Ledger (REST se configurado, memória caso contrário)
//!   │   ├── Extrator NL (endpoint chat-completions)
//!   │   └── Contexto persistido (data/contexts.json)
//!   ├── Monta o orquestrador e o AppState
//!   └── Inicia o servidor axum (porta PORT)
//! ```
//!
//! ## Exemplo de Uso
//!
//! ```bash
//! # Executar com logs padrão (info)
//! cargo run
//!
//! # Executar com logs detalhados
//! RUST_LOG=debug cargo run
//!
//! # Conversar com o Oráculo
//! curl -s localhost:8080/oraculo \
//!   -H 'content-type: application/json' \
//!   -d '{"message":"gastei 45 no mercado e 30 de uber ontem","user_id":"u1"}'
//! ```

// Declaração dos módulos da aplicação.
// Cada módulo corresponde a uma camada da arquitetura:

/// Módulo `config` — configuração por variáveis de ambiente.
mod config;

/// Módulo `core` — tipos fundamentais: rascunhos, sessão, relatório, padrões.
mod core;

/// Módulo `error` — taxonomia de erros recuperáveis.
mod error;

/// Módulo `ledger` — colaborador de persistência das despesas confirmadas.
mod ledger;

/// Módulo `llm` — colaborador de linguagem natural (conversa livre + fallback).
mod llm;

/// Módulo `nlu` — pipeline determinístico de compreensão de linguagem natural.
mod nlu;

/// Módulo `orchestrator` — rege o diálogo e a máquina de estados.
mod orchestrator;

/// Módulo `persistence` — contexto do usuário em disco.
mod persistence;

/// Módulo `reply` — compositor das respostas do Oráculo.
mod reply;

/// Módulo `web` — servidor axum e handlers HTTP.
mod web;

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core::SessionStore;
use crate::ledger::{LedgerStore, MemoryLedger, RestLedger};
use crate::llm::OpenAiExtractor;
use crate::nlu::NluPipeline;
use crate::orchestrator::Orchestrator;
use crate::persistence::FileContextStore;
use crate::web::state::AppState;

/// Função principal assíncrona do Oráculo Financeiro.
///
/// Monta todos os componentes e inicia o servidor. Diferente de sistemas
/// com modelo de ML embarcado, o pipeline aqui é determinístico e barato:
/// tudo fica pronto antes do bind, sem fase de carregamento em background.
///
/// # Erros
///
/// Retorna erro se não conseguir fazer bind na porta configurada ou se o
/// servidor axum falhar durante execução.
#[tokio::main]
async fn main() -> Result<()> {
    // Configura o sistema de logging/tracing.
    // Aceita a variável de ambiente RUST_LOG para configurar o nível.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    tracing::info!("🔮 Oráculo Financeiro — Starting...");

    let config = AppConfig::from_env();

    // Cliente HTTP compartilhado pelos colaboradores, com o timeout
    // imposto a toda chamada externa (nunca um hang)
    let client = reqwest::Client::builder()
        .timeout(config.collaborator_timeout)
        .build()
        .context("Falha ao construir o cliente HTTP")?;

    // Ledger: REST quando configurado, memória caso contrário
    let ledger: Arc<dyn LedgerStore> = match (&config.ledger_url, &config.ledger_key) {
        (Some(url), Some(key)) => {
            tracing::info!(url = %url, "Ledger REST configurado");
            Arc::new(RestLedger::new(client.clone(), url.clone(), key.clone()))
        }
        _ => {
            tracing::warn!("Sem credenciais de ledger — usando ledger em memória (volátil)");
            Arc::new(MemoryLedger::new())
        }
    };

    if config.llm_api_key.is_none() {
        tracing::warn!("Sem credencial do extrator NL — conversa livre usará a linha de fallback");
    }
    let extractor = Arc::new(OpenAiExtractor::new(
        client,
        config.llm_base_url.clone(),
        config.llm_api_key.clone(),
        config.llm_model.clone(),
    ));

    let contexts = Arc::new(FileContextStore::open(&config.data_dir));

    let orchestrator = Arc::new(Orchestrator::new(
        Arc::new(NluPipeline::new()),
        Arc::new(SessionStore::new()),
        ledger,
        extractor,
        contexts,
    ));

    let app = web::create_router(AppState { orchestrator });

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Falha no bind em {addr}"))?;
    tracing::info!("🚀 Oráculo ativo em http://localhost:{}", config.port);

    // Inicia o servidor axum — bloqueia até que o processo seja encerrado.
    axum::serve(listener, app).await?;

    Ok(())
}
