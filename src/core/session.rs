//! # Sessão de Usuário e a Máquina de Estados do Diálogo
//!
//! Cada usuário tem uma [`UserSession`] criada **preguiçosamente** no
//! primeiro contato e viva até o fim do processo. A sessão carrega o
//! estado do diálogo, os rascunhos pendentes, o último relatório e os
//! padrões de uso.
//!
//! ## Estados e Transições
//!
//! ```text
//!            declaração produz ≥1 rascunho
//!   idle ──────────────────────────────────▶ preview
//!    ▲                                         │
//!    │  confirm (commit) / reject / abandono   │
//!    └─────────────────────────────────────────┘
//!
//!   idle ──(report_request)──▶ post_report ──(report_followup)──▶ post_report
//! ```
//!
//! Uma nova declaração de despesa leva a `preview` a partir de **qualquer**
//! estado — relatórios e previews não bloqueiam declarações novas.
//!
//! ## Invariante Central
//!
//! `pending` é não-vazio **somente** enquanto `state == Preview`, e é
//! limpo atomicamente no commit ou na rejeição. Os métodos de transição
//! desta struct são o único caminho de mutação do estado, o que mantém o
//! invariante verificável num único arquivo.
//!
//! ## Concorrência
//!
//! O [`SessionStore`] serializa o acesso **por usuário**: o mapa global é
//! guardado por um `parking_lot::Mutex` (seções críticas curtas, só para
//! obter o `Arc`), e cada sessão por um `tokio::sync::Mutex` que o
//! orquestrador segura durante o turno inteiro — classificação, acumulação
//! e transição acontecem atomicamente antes da próxima mensagem do mesmo
//! usuário. Usuários distintos correm em paralelo.

use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::draft::{DraftExpense, PendingDrafts};
use super::patterns::UsagePatterns;
use super::report::Report;

/// Estado do diálogo de um usuário.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DialogState {
    /// Nada pendente; estado inicial e terminal.
    Idle,
    /// Um ou mais rascunhos aguardam confirmação explícita.
    Preview,
    /// Um relatório acabou de ser entregue; acompanhamento possível.
    PostReport,
}

/// Estado conversacional de um usuário, vivo pela duração do processo.
#[derive(Debug)]
pub struct UserSession {
    /// Identificador do usuário (chave do mapa de sessões).
    pub user_id: String,
    /// Estado corrente do diálogo.
    pub state: DialogState,
    /// Rascunhos aguardando confirmação.
    pub pending: PendingDrafts,
    /// Último relatório entregue, para uma rodada de reflexão.
    pub last_report: Option<Report>,
    /// Memória contextual acumulada.
    pub patterns: UsagePatterns,
}

impl UserSession {
    /// Sessão zerada para um usuário recém-chegado.
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            state: DialogState::Idle,
            pending: PendingDrafts::new(),
            last_report: None,
            patterns: UsagePatterns::default(),
        }
    }

    /// Entra em `Preview` com um lote novo de rascunhos.
    ///
    /// Lotes vazios são ignorados — o invariante proíbe um preview sem
    /// rascunhos.
    pub fn begin_preview(&mut self, drafts: Vec<DraftExpense>) {
        if drafts.is_empty() {
            return;
        }
        self.pending.replace_batch(drafts);
        self.state = DialogState::Preview;
    }

    /// Rejeição explícita: descarta os rascunhos, volta a `Idle`.
    pub fn reject_preview(&mut self) {
        self.pending.clear();
        self.state = DialogState::Idle;
    }

    /// Abandono silencioso do preview (resposta não reconhecida).
    ///
    /// Mesmo efeito da rejeição; separado para que o chamador possa
    /// registrar o abandono em log e o leitor distinga as intenções.
    pub fn abandon_preview(&mut self) {
        self.pending.clear();
        self.state = DialogState::Idle;
    }

    /// Fim de um commit bem-sucedido: lista já consumida, volta a `Idle`.
    pub fn finish_commit(&mut self) {
        self.pending.clear();
        self.state = DialogState::Idle;
        self.last_report = None;
    }

    /// Entrega de relatório: guarda-o e vai a `PostReport`.
    pub fn deliver_report(&mut self, report: Report) {
        self.last_report = Some(report);
        self.state = DialogState::PostReport;
    }
}

/// Mapa de sessões com serialização de acesso por usuário.
#[derive(Default)]
pub struct SessionStore {
    sessions: parking_lot::Mutex<HashMap<String, Arc<tokio::sync::Mutex<UserSession>>>>,
}

impl SessionStore {
    /// Cria um armazém vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Obtém (ou cria) a sessão de um usuário.
    ///
    /// O lock do mapa é segurado apenas durante a busca; o chamador então
    /// adquire o mutex da sessão e o mantém pelo turno inteiro.
    pub fn session(&self, user_id: &str) -> Arc<tokio::sync::Mutex<UserSession>> {
        let mut sessions = self.sessions.lock();
        sessions
            .entry(user_id.to_string())
            .or_insert_with(|| Arc::new(tokio::sync::Mutex::new(UserSession::new(user_id))))
            .clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn draft() -> DraftExpense {
        DraftExpense {
            description: "lanche".to_string(),
            amount: Some(20.0),
            category: Some("Alimentação".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(),
        }
    }

    #[test]
    fn preview_requires_at_least_one_draft() {
        let mut session = UserSession::new("u1");
        session.begin_preview(Vec::new());
        assert_eq!(session.state, DialogState::Idle);
        assert!(session.pending.is_empty());

        session.begin_preview(vec![draft()]);
        assert_eq!(session.state, DialogState::Preview);
        assert_eq!(session.pending.len(), 1);
    }

    #[test]
    fn reject_clears_pending_atomically() {
        let mut session = UserSession::new("u1");
        session.begin_preview(vec![draft()]);
        session.reject_preview();
        assert_eq!(session.state, DialogState::Idle);
        assert!(session.pending.is_empty());
    }

    #[test]
    fn pending_nonempty_only_in_preview() {
        let mut session = UserSession::new("u1");
        assert!(session.pending.is_empty());

        session.begin_preview(vec![draft()]);
        assert!(!session.pending.is_empty());

        session.finish_commit();
        assert_eq!(session.state, DialogState::Idle);
        assert!(session.pending.is_empty());
    }

    #[test]
    fn report_moves_to_post_report_and_is_kept() {
        let mut session = UserSession::new("u1");
        let report = Report::aggregate(vec![("Alimentação", 100.0)]).unwrap();
        session.deliver_report(report);
        assert_eq!(session.state, DialogState::PostReport);
        assert!(session.last_report.is_some());
    }

    #[test]
    fn store_returns_same_session_for_same_user() {
        let store = SessionStore::new();
        let a = store.session("u1");
        let b = store.session("u1");
        let c = store.session("u2");
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
    }
}
