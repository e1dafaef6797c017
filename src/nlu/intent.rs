//! # Classificador de Intenção (Intent) do Usuário
//!
//! O [`IntentClassifier`] determina a **intenção** da mensagem, levando em
//! conta o estado corrente da sessão. A intenção decide qual caminho o
//! orquestrador toma:
//!
//! | Intent | Significado | Exemplo |
//! |--------|-------------|---------|
//! | [`Confirm`](Intent::Confirm) | Confirma o preview pendente | "sim" |
//! | [`Reject`](Intent::Reject) | Rejeita o preview pendente | "cancelar" |
//! | [`ReportRequest`](Intent::ReportRequest) | Pede relatório do período | "relatório de março" |
//! | [`ReportFollowup`](Intent::ReportFollowup) | Reflete sobre o último relatório | "isso é bom?" |
//! | [`ExpenseDeclaration`](Intent::ExpenseDeclaration) | Declara gasto(s) | "gastei 45 no mercado" |
//! | [`FreeChat`](Intent::FreeChat) | Conversa livre | "tô preocupado com dinheiro" |
//!
//! ## Cascata de Prioridade
//!
//! A ordem de avaliação é uma **cascata deliberada**, não regras
//! independentes: confirmação e rejeição vêm antes da declaração de
//! despesa porque um "sim" solto durante o preview não contém número nem
//! verbo de gasto — sem a cascata ele cairia incorretamente em conversa
//! livre.
//!
//! ```text
//! 1. preview + vocabulário de confirmação  → Confirm
//! 2. preview + vocabulário de rejeição     → Reject
//! 3. frase-gatilho de relatório            → ReportRequest
//! 4. há relatório + frase de continuação   → ReportFollowup
//! 5. valor numérico OU verbo de gasto      → ExpenseDeclaration
//! 6. nada acima                            → FreeChat
//! ```

use regex::Regex;

use crate::core::DialogState;

/// Intenção mutuamente exclusiva de uma mensagem.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Intent {
    /// Usuário confirma o preview pendente.
    Confirm,
    /// Usuário rejeita/corrige o preview pendente.
    Reject,
    /// Usuário pede um relatório do período.
    ReportRequest,
    /// Usuário continua a conversa sobre o último relatório.
    ReportFollowup,
    /// Usuário declara uma ou mais despesas.
    ExpenseDeclaration,
    /// Conversa livre — delegada ao extrator NL.
    FreeChat,
}

/// Vocabulário de confirmação — casamento exato da mensagem aparada.
const CONFIRM_WORDS: &[&str] = &["sim", "ok", "confirmar", "pode", "isso"];

/// Vocabulário de rejeição — casamento exato da mensagem aparada.
const REJECT_WORDS: &[&str] = &["não", "nao", "cancelar", "corrigir"];

/// Frases-gatilho de relatório — casamento por substring.
const REPORT_TRIGGERS: &[&str] = &[
    "relatório",
    "relatorio",
    "diagnóstico",
    "diagnostico",
    "análise",
    "analise",
    "gastei com",
];

/// Frases de continuação pós-relatório — casamento por substring.
const FOLLOWUP_PHRASES: &[&str] = &[
    "o que você acha",
    "oq vc acha",
    "isso é bom",
    "isso é ruim",
    "preocupante",
    "ok",
    "entendi",
];

/// Verbos (e substantivos fortes) de gasto — casamento por substring.
const EXPENSE_CUES: &[&str] = &[
    "gastei", "paguei", "comprei", "abasteci", "fatura", "cartão", "cartao",
];

/// Classificador de intenção por cascata de prioridade.
pub struct IntentClassifier {
    /// Valor numérico em qualquer posição da mensagem.
    value_re: Regex,
}

impl IntentClassifier {
    /// Cria o classificador com a regex de valor compilada.
    pub fn new() -> Self {
        Self {
            value_re: Regex::new(r"\d+([.,]\d+)?").unwrap(),
        }
    }

    /// Classifica a intenção de uma mensagem dada a situação da sessão.
    ///
    /// # Parâmetros
    ///
    /// - `message` — mensagem bruta (minúsculas aplicadas internamente)
    /// - `state` — estado corrente do diálogo
    /// - `has_report` — há um `last_report` na sessão?
    pub fn classify(&self, message: &str, state: DialogState, has_report: bool) -> Intent {
        let lower = message.trim().to_lowercase();

        // 1-2. Confirmação/rejeição só valem durante o preview
        if state == DialogState::Preview {
            if CONFIRM_WORDS.contains(&lower.as_str()) {
                return Intent::Confirm;
            }
            if REJECT_WORDS.contains(&lower.as_str()) {
                return Intent::Reject;
            }
        }

        // 3. Pedido de relatório
        if REPORT_TRIGGERS.iter().any(|t| lower.contains(t)) {
            return Intent::ReportRequest;
        }

        // 4. Continuação da conversa sobre o último relatório
        if has_report && FOLLOWUP_PHRASES.iter().any(|p| lower.contains(p)) {
            return Intent::ReportFollowup;
        }

        // 5. Valor numérico ou verbo de gasto → declaração de despesa
        if self.value_re.is_match(&lower) || EXPENSE_CUES.iter().any(|v| lower.contains(v)) {
            return Intent::ExpenseDeclaration;
        }

        // 6. Nada reconhecido → conversa livre
        Intent::FreeChat
    }
}

impl Default for IntentClassifier {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn classify(message: &str, state: DialogState, has_report: bool) -> Intent {
        IntentClassifier::new().classify(message, state, has_report)
    }

    #[test]
    fn sim_in_preview_is_confirm() {
        assert_eq!(classify("sim", DialogState::Preview, false), Intent::Confirm);
        assert_eq!(classify("  OK ", DialogState::Preview, false), Intent::Confirm);
    }

    #[test]
    fn sim_outside_preview_is_not_confirm() {
        // Sem preview pendente, "sim" não tem número nem verbo → conversa livre
        assert_eq!(classify("sim", DialogState::Idle, false), Intent::FreeChat);
    }

    #[test]
    fn rejection_vocabulary_in_preview() {
        assert_eq!(classify("não", DialogState::Preview, false), Intent::Reject);
        assert_eq!(classify("nao", DialogState::Preview, false), Intent::Reject);
        assert_eq!(classify("corrigir", DialogState::Preview, false), Intent::Reject);
    }

    #[test]
    fn report_trigger_beats_expense_cues() {
        // "gastei com" é gatilho de relatório, mesmo contendo o verbo "gastei"
        assert_eq!(
            classify("quanto gastei com comida?", DialogState::Idle, false),
            Intent::ReportRequest
        );
        assert_eq!(
            classify("me manda o relatório de março", DialogState::Idle, false),
            Intent::ReportRequest
        );
    }

    #[test]
    fn followup_requires_a_previous_report() {
        assert_eq!(
            classify("o que você acha?", DialogState::PostReport, true),
            Intent::ReportFollowup
        );
        // Sem relatório guardado, a mesma frase é conversa livre
        assert_eq!(
            classify("o que você acha?", DialogState::Idle, false),
            Intent::FreeChat
        );
    }

    #[test]
    fn numeric_value_is_expense_declaration() {
        assert_eq!(
            classify("lanche 20", DialogState::Idle, false),
            Intent::ExpenseDeclaration
        );
        assert_eq!(
            classify("8,50 de café", DialogState::Idle, false),
            Intent::ExpenseDeclaration
        );
    }

    #[test]
    fn expense_verb_without_value_is_expense_declaration() {
        assert_eq!(
            classify("paguei o aluguel", DialogState::Idle, false),
            Intent::ExpenseDeclaration
        );
        assert_eq!(
            classify("chegou a fatura", DialogState::Idle, false),
            Intent::ExpenseDeclaration
        );
    }

    #[test]
    fn anything_else_is_free_chat() {
        assert_eq!(
            classify("como vai a vida?", DialogState::Idle, false),
            Intent::FreeChat
        );
    }

    #[test]
    fn confirm_word_with_pending_report_is_followup_outside_preview() {
        // "ok" fora do preview, com relatório guardado → continuação
        assert_eq!(classify("ok", DialogState::PostReport, true), Intent::ReportFollowup);
    }
}
