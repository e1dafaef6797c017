//! # Módulo Core — Tipos Fundamentais do Domínio
//!
//! Este módulo agrupa os **tipos fundamentais** do diálogo financeiro.
//! Tudo no Oráculo gira em torno destes tipos:
//!
//! - [`DraftExpense`] — despesa em rascunho, aguardando confirmação
//! - [`PendingDrafts`] — o acumulador de rascunhos com as duas semânticas
//!   de chegada (lote vs. clarificação)
//! - [`DialogState`] / [`UserSession`] — a máquina de estados do diálogo
//!   e o estado por usuário
//! - [`SessionStore`] — mapa de sessões com acesso serializado por usuário
//! - [`Report`] — agregado derivado das despesas confirmadas de um período
//! - [`UsagePatterns`] / [`UserProfile`] — memória contextual e perfil
//!   comportamental
//!
//! Nenhum tipo daqui conhece HTTP, o extrator NL ou o ledger — o core é
//! puro e testável sem colaboradores.

/// Sub-módulo de rascunhos e do acumulador pendente.
pub mod draft;

/// Sub-módulo de padrões de uso e perfil comportamental.
pub mod patterns;

/// Sub-módulo do agregador de relatórios.
pub mod report;

/// Sub-módulo da sessão e da máquina de estados do diálogo.
pub mod session;

// Re-exports para conveniência — permite usar `crate::core::DraftExpense` diretamente.
pub use draft::{DraftExpense, DraftPatch, PendingDrafts};
pub use patterns::{infer_profile, UsagePatterns, UserProfile};
pub use report::Report;
pub use session::{DialogState, SessionStore, UserSession};
