//! # Extrator NL — O Colaborador de Linguagem Natural
//!
//! Colaborador externo invocado em dois pontos, e somente neles:
//!
//! 1. **Conversa livre** — mensagens sem valor, sem verbo de gasto e sem
//!    gatilho de relatório
//! 2. **Fallback de extração** — a extração estruturada não achou nada em
//!    uma mensagem com cara de despesa
//!
//! A resposta do modelo é **entrada não confiável**: pode ser texto livre
//! ou uma sugestão estruturada `{acao, dados, mensagem_usuario}`. A
//! sugestão nunca é persistida sem passar pelo classificador de categorias,
//! pelo resolvedor de datas e pela checagem de campos faltantes — isso
//! acontece no orquestrador; aqui só validamos a **forma** (o esquema
//! tagged-union), nunca o conteúdo.
//!
//! ## Modos de Resposta
//!
//! | Forma | Interpretação |
//! |-------|---------------|
//! | texto livre | resposta de conversa, usada como veio |
//! | `{"acao":"registrar_despesa","dados":{...}}` | sugestão de despesa a validar |
//! | `{"acao":"conversar","mensagem_usuario":"..."}` | resposta de conversa embrulhada |
//! | JSON fora do esquema | [`MalformedResponse`](OracleError::MalformedResponse) |

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::OracleError;

/// Personalidade do Oráculo Financeiro — o prompt de sistema da conversa
/// livre, com o contrato de extração estruturada ao final.
pub const ORACLE_PERSONA: &str = "\
Você é o ORÁCULO FINANCEIRO 🔮

Você conversa sobre dinheiro de forma leve, humana e próxima,
como um bom amigo que escuta, acolhe e incentiva.

PERSONALIDADE: criativo, alegre, otimista, empático, próximo.
Fala como um amigo, nunca como professor.

REGRAS:
- Respostas curtas (máx. 2 a 3 linhas)
- Use no máximo 1 emoji
- Faça no máximo UMA pergunta por resposta
- Linguagem natural e cotidiana do português do Brasil
- Proibido: relatórios, números, análises financeiras, julgamentos, aulas

EXTRAÇÃO:
Se a mensagem do usuário descrever claramente um gasto, responda SOMENTE
com JSON neste formato, sem texto ao redor:
{\"acao\":\"registrar_despesa\",\"dados\":{\"descricao\":\"...\",\"valor\":0,\"categoria\":\"...\",\"data\":\"...\"}}
Campos desconhecidos ficam ausentes. Em qualquer outro caso, responda
com texto normal de conversa.";

/// Sugestão de despesa vinda do modelo — todos os campos opcionais,
/// nenhum confiável antes da validação no orquestrador.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExpenseSuggestion {
    /// Texto descritivo sugerido.
    pub descricao: Option<String>,
    /// Valor sugerido.
    pub valor: Option<f64>,
    /// Categoria sugerida (revalidada contra a tabela canônica).
    pub categoria: Option<String>,
    /// Data sugerida, como texto (ISO ou expressão em PT-BR).
    pub data: Option<String>,
}

/// Resposta estruturada do extrator — tagged union sobre o campo `acao`.
///
/// Variantes fora desta enumeração não existem: qualquer `acao`
/// desconhecida falha a desserialização e vira
/// [`MalformedResponse`](OracleError::MalformedResponse).
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "acao", rename_all = "snake_case")]
pub enum OracleAction {
    /// O modelo entendeu a mensagem como uma despesa a registrar.
    RegistrarDespesa {
        /// Campos sugeridos da despesa.
        dados: ExpenseSuggestion,
        /// Comentário opcional para exibir junto do preview.
        #[serde(default)]
        mensagem_usuario: Option<String>,
    },
    /// O modelo respondeu como conversa, em envelope estruturado.
    Conversar {
        /// O texto da resposta.
        mensagem_usuario: String,
    },
}

/// Resposta interpretada do extrator NL.
#[derive(Debug, Clone)]
pub enum NlReply {
    /// Texto livre de conversa.
    Text(String),
    /// Ação estruturada validada quanto à forma.
    Action(OracleAction),
}

/// Interpreta a resposta bruta do modelo.
///
/// Texto que **parece** JSON (começa com `{`) é obrigado a validar contra
/// o esquema [`OracleAction`]; falhar aí é [`MalformedResponse`] — o
/// orquestrador trata como extração vazia. Qualquer outro texto é
/// conversa livre.
pub fn parse_reply(raw: &str) -> Result<NlReply, OracleError> {
    let trimmed = raw.trim();
    if trimmed.starts_with('{') {
        let action: OracleAction = serde_json::from_str(trimmed)
            .map_err(|e| OracleError::MalformedResponse(e.to_string()))?;
        return Ok(NlReply::Action(action));
    }
    Ok(NlReply::Text(trimmed.to_string()))
}

/// Colaborador de linguagem natural.
///
/// O trait existe para que os testes do orquestrador injetem um roteiro
/// determinístico no lugar do modelo hospedado.
#[async_trait]
pub trait NlExtractor: Send + Sync {
    /// Conversa com o modelo sobre a mensagem do usuário.
    ///
    /// `context` é um resumo opcional do contexto financeiro do usuário,
    /// anexado ao prompt de sistema quando presente.
    async fn converse(&self, message: &str, context: Option<&str>) -> Result<NlReply, OracleError>;
}

// ─── Cliente OpenAI-compatível ───────────────────────────────────────

/// Cliente de um endpoint chat-completions compatível com OpenAI.
pub struct OpenAiExtractor {
    /// Cliente HTTP com timeout configurado no bootstrap.
    client: reqwest::Client,
    /// Base do endpoint (ex.: `https://api.openai.com`).
    base_url: String,
    /// Credencial; ausente = colaborador indisponível (erro imediato,
    /// que o orquestrador converte na linha fixa de fallback).
    api_key: Option<String>,
    /// Modelo solicitado.
    model: String,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: Option<String>,
}

impl OpenAiExtractor {
    /// Cria o cliente.
    pub fn new(
        client: reqwest::Client,
        base_url: String,
        api_key: Option<String>,
        model: String,
    ) -> Self {
        Self {
            client,
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl NlExtractor for OpenAiExtractor {
    async fn converse(&self, message: &str, context: Option<&str>) -> Result<NlReply, OracleError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| OracleError::Collaborator("extrator NL sem credencial".to_string()))?;

        let system = match context {
            Some(ctx) => format!("{ORACLE_PERSONA}\n\nCONTEXTO FINANCEIRO DO USUÁRIO:\n{ctx}"),
            None => ORACLE_PERSONA.to_string(),
        };

        let body = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: &system,
                },
                ChatMessage {
                    role: "user",
                    content: message,
                },
            ],
            temperature: 0.7,
            max_tokens: 180,
        };

        let url = format!(
            "{}/v1/chat/completions",
            self.base_url.trim_end_matches('/')
        );
        let response = self
            .client
            .post(url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::Collaborator(format!(
                "extrator NL retornou {}",
                response.status()
            )));
        }

        let parsed = response.json::<ChatResponse>().await?;
        let content = parsed
            .choices
            .first()
            .and_then(|c| c.message.content.as_deref())
            .unwrap_or_default();

        if content.is_empty() {
            return Err(OracleError::MalformedResponse(
                "resposta sem conteúdo".to_string(),
            ));
        }

        parse_reply(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_text_is_chat() {
        match parse_reply("Oi! Como posso ajudar?").unwrap() {
            NlReply::Text(t) => assert_eq!(t, "Oi! Como posso ajudar?"),
            other => panic!("esperava texto, veio {other:?}"),
        }
    }

    #[test]
    fn registrar_despesa_parses_with_partial_fields() {
        let raw = r#"{"acao":"registrar_despesa","dados":{"descricao":"mercado","valor":45.0}}"#;
        match parse_reply(raw).unwrap() {
            NlReply::Action(OracleAction::RegistrarDespesa { dados, .. }) => {
                assert_eq!(dados.descricao.as_deref(), Some("mercado"));
                assert_eq!(dados.valor, Some(45.0));
                assert_eq!(dados.categoria, None);
                assert_eq!(dados.data, None);
            }
            other => panic!("esperava registrar_despesa, veio {other:?}"),
        }
    }

    #[test]
    fn conversar_envelope_parses() {
        let raw = r#"{"acao":"conversar","mensagem_usuario":"tudo bem?"}"#;
        match parse_reply(raw).unwrap() {
            NlReply::Action(OracleAction::Conversar { mensagem_usuario }) => {
                assert_eq!(mensagem_usuario, "tudo bem?");
            }
            other => panic!("esperava conversar, veio {other:?}"),
        }
    }

    #[test]
    fn unknown_acao_is_malformed() {
        let raw = r#"{"acao":"explodir_tudo","dados":{}}"#;
        assert!(matches!(
            parse_reply(raw),
            Err(OracleError::MalformedResponse(_))
        ));
    }

    #[test]
    fn json_looking_garbage_is_malformed() {
        assert!(matches!(
            parse_reply("{não é json"),
            Err(OracleError::MalformedResponse(_))
        ));
    }
}
