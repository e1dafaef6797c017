//! # Taxonomia de Erros do Oráculo
//!
//! Todos os erros recuperáveis do pipeline de diálogo são variantes de
//! [`OracleError`]. A regra central do sistema: **nenhum erro atravessa a
//! camada de transporte** — o orquestrador (e, em última instância, o
//! handler HTTP) converte cada variante em uma resposta textual válida
//! para o usuário, registrando a causa interna via `tracing`.
//!
//! | Variante | Origem | Resposta ao usuário |
//! |----------|--------|---------------------|
//! | `MissingInput` | mensagem ou user_id ausente | pedido de esclarecimento |
//! | `ExtractionEmpty` | nenhum valor/descrição em nenhum segmento | "nada encontrado" |
//! | `Collaborator` | erro/timeout do LLM ou do ledger | desculpa genérica |
//! | `MalformedResponse` | JSON inválido do extrator NL | tratado como `ExtractionEmpty` |

use thiserror::Error;

/// Erro recuperável do pipeline de compreensão e diálogo.
///
/// As variantes espelham a taxonomia da camada de tratamento de erros:
/// cada uma tem uma resposta textual correspondente no [`reply`](crate::reply),
/// e nenhuma delas altera o estado da sessão, com a exceção documentada
/// de falha de escrita no ledger durante a confirmação (os rascunhos
/// pendentes são preservados para nova tentativa).
#[derive(Debug, Error)]
pub enum OracleError {
    /// Requisição sem `message` ou sem `user_id` (ou em branco).
    #[error("mensagem ou user_id ausente")]
    MissingInput,

    /// Nenhuma despesa extraível foi encontrada na mensagem.
    #[error("nenhuma despesa encontrada na mensagem")]
    ExtractionEmpty,

    /// Falha de um colaborador externo (extrator NL ou ledger): erro de
    /// rede, timeout, ou status HTTP não-2xx.
    #[error("falha de colaborador externo: {0}")]
    Collaborator(String),

    /// O extrator NL devolveu algo fora do esquema esperado.
    /// Tratado pelo orquestrador como [`ExtractionEmpty`](Self::ExtractionEmpty).
    #[error("resposta malformada do extrator NL: {0}")]
    MalformedResponse(String),
}

impl From<reqwest::Error> for OracleError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            OracleError::Collaborator(format!("timeout: {err}"))
        } else {
            OracleError::Collaborator(err.to_string())
        }
    }
}
