//! # Configuração por Variáveis de Ambiente
//!
//! Toda a configuração do processo é lida **uma única vez** no startup,
//! via [`AppConfig::from_env()`]. Nenhum módulo além do `main` lê variáveis
//! de ambiente diretamente.
//!
//! | Variável | Default | Uso |
//! |----------|---------|-----|
//! | `PORT` | `8080` | porta do servidor HTTP |
//! | `OPENAI_API_KEY` | — | chave do extrator NL (sem ela, o fallback é a linha fixa) |
//! | `OPENAI_BASE_URL` | `https://api.openai.com` | endpoint compatível com chat-completions |
//! | `OPENAI_MODEL` | `gpt-4o-mini` | modelo usado na conversa livre |
//! | `SUPABASE_URL` | — | endpoint REST do ledger (sem ela, ledger em memória) |
//! | `SUPABASE_SERVICE_ROLE_KEY` | — | credencial do ledger REST |
//! | `COLLABORATOR_TIMEOUT_SECS` | `15` | timeout de ambas as chamadas externas |
//! | `DATA_DIR` | `data` | diretório do contexto persistido (`contexts.json`) |

use std::time::Duration;

/// Configuração imutável do processo, montada a partir do ambiente.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Porta TCP do servidor axum.
    pub port: u16,
    /// Chave do extrator NL. `None` desabilita a chamada (fallback fixo).
    pub llm_api_key: Option<String>,
    /// Base URL do endpoint compatível com chat-completions.
    pub llm_base_url: String,
    /// Modelo enviado ao extrator NL.
    pub llm_model: String,
    /// Endpoint REST do ledger. `None` seleciona o ledger em memória.
    pub ledger_url: Option<String>,
    /// Credencial do ledger REST.
    pub ledger_key: Option<String>,
    /// Timeout imposto a cada chamada de colaborador externo.
    pub collaborator_timeout: Duration,
    /// Diretório onde `contexts.json` é persistido.
    pub data_dir: String,
}

impl AppConfig {
    /// Lê a configuração do ambiente, aplicando os defaults da tabela acima.
    ///
    /// Valores inválidos (ex.: `PORT` não numérica) caem no default em vez
    /// de derrubar o processo — o serviço prefere subir degradado a não subir.
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);

        let timeout_secs = std::env::var("COLLABORATOR_TIMEOUT_SECS")
            .ok()
            .and_then(|t| t.parse().ok())
            .unwrap_or(15u64);

        Self {
            port,
            llm_api_key: non_empty(std::env::var("OPENAI_API_KEY").ok()),
            llm_base_url: std::env::var("OPENAI_BASE_URL")
                .unwrap_or_else(|_| "https://api.openai.com".to_string()),
            llm_model: std::env::var("OPENAI_MODEL")
                .unwrap_or_else(|_| "gpt-4o-mini".to_string()),
            ledger_url: non_empty(std::env::var("SUPABASE_URL").ok()),
            ledger_key: non_empty(std::env::var("SUPABASE_SERVICE_ROLE_KEY").ok()),
            collaborator_timeout: Duration::from_secs(timeout_secs),
            data_dir: std::env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()),
        }
    }
}

/// Normaliza `Some("")` para `None` — variável definida mas vazia conta
/// como ausente.
fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_var_counts_as_absent() {
        assert_eq!(non_empty(Some(String::new())), None);
        assert_eq!(non_empty(Some("  ".to_string())), None);
        assert_eq!(non_empty(Some("x".to_string())), Some("x".to_string()));
        assert_eq!(non_empty(None), None);
    }
}
