//! # Rascunhos de Despesa e o Acumulador Pendente
//!
//! Um [`DraftExpense`] é uma despesa **em andamento** — extraída de uma
//! mensagem mas ainda não confirmada pelo usuário. Os rascunhos vivem na
//! sessão ([`UserSession`](super::session::UserSession)) enquanto o diálogo
//! está em `Preview`, e são confirmados ou descartados em bloco.
//!
//! ## As Duas Semânticas de Chegada
//!
//! Campos novos chegam ao conjunto pendente por dois caminhos distintos,
//! **deliberadamente separados** em dois métodos:
//!
//! | Caminho | Método | Semântica |
//! |---------|--------|-----------|
//! | Extração multi-despesa em um turno | [`replace_batch`](PendingDrafts::replace_batch) | substitui a lista inteira |
//! | Clarificação de um campo em turno posterior | [`merge_clarification`](PendingDrafts::merge_clarification) | mescla no único rascunho existente |
//!
//! Na mesclagem vale **last-non-null-wins**: um campo já preenchido nunca
//! é sobrescrito por um valor ausente; um valor presente sempre sobrescreve
//! o anterior.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Uma despesa em rascunho, aguardando confirmação.
///
/// Invariante: `description` é não-vazia e `date` é sempre concreta —
/// quando a mensagem não tem expressão temporal, a data default ("hoje")
/// é atribuída **no momento da criação do rascunho**, nunca deixada em
/// aberto até o commit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DraftExpense {
    /// Texto descritivo da despesa.
    pub description: String,
    /// Valor em reais; `None` enquanto o usuário não informou.
    pub amount: Option<f64>,
    /// Categoria classificada; `None` enquanto não classificada.
    pub category: Option<String>,
    /// Data do gasto, sempre concreta.
    pub date: NaiveDate,
}

impl DraftExpense {
    /// Verdadeiro quando falta valor ou categoria — candidato a clarificação.
    pub fn is_incomplete(&self) -> bool {
        self.amount.is_none() || self.category.is_none()
    }

    /// Aplica um patch de clarificação, last-non-null-wins: campos
    /// presentes sobrescrevem, campos ausentes preservam o que já existe.
    pub fn apply_patch(&mut self, patch: DraftPatch) {
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(amount) = patch.amount {
            self.amount = Some(amount);
        }
        if let Some(category) = patch.category {
            self.category = Some(category);
        }
        if let Some(date) = patch.date {
            self.date = date;
        }
    }
}

/// Campos parciais vindos de um turno de clarificação.
///
/// Origem típica: um valor solto digitado pelo usuário ("45") ou uma
/// sugestão estruturada validada do extrator NL. Todos os campos são
/// opcionais — só os presentes participam da mesclagem.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DraftPatch {
    /// Nova descrição, se informada.
    pub description: Option<String>,
    /// Novo valor, se informado.
    pub amount: Option<f64>,
    /// Nova categoria, se informada.
    pub category: Option<String>,
    /// Nova data, se informada.
    pub date: Option<NaiveDate>,
}

/// O conjunto de rascunhos pendentes de uma sessão.
///
/// Encapsula a lista para que as duas semânticas de chegada (lote vs.
/// clarificação) sejam os **únicos** pontos de mutação, cada um testável
/// em isolamento.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PendingDrafts {
    drafts: Vec<DraftExpense>,
}

impl PendingDrafts {
    /// Lista vazia.
    pub fn new() -> Self {
        Self::default()
    }

    /// Acesso de leitura aos rascunhos, em ordem de chegada.
    pub fn drafts(&self) -> &[DraftExpense] {
        &self.drafts
    }

    /// Quantidade de rascunhos pendentes.
    pub fn len(&self) -> usize {
        self.drafts.len()
    }

    /// Verdadeiro quando não há nada pendente.
    pub fn is_empty(&self) -> bool {
        self.drafts.is_empty()
    }

    /// Semântica de **lote**: uma extração completa em um turno substitui
    /// a lista pendente inteira.
    pub fn replace_batch(&mut self, drafts: Vec<DraftExpense>) {
        self.drafts = drafts;
    }

    /// Semântica de **clarificação**: mescla campos parciais no único
    /// rascunho pendente, last-non-null-wins.
    ///
    /// Retorna `false` (sem efeito) quando a lista não tem exatamente um
    /// rascunho — clarificação só faz sentido sobre um alvo inequívoco.
    pub fn merge_clarification(&mut self, patch: DraftPatch) -> bool {
        if self.drafts.len() != 1 {
            return false;
        }
        self.drafts[0].apply_patch(patch);
        true
    }

    /// Descarta tudo (rejeição ou abandono do preview).
    pub fn clear(&mut self) {
        self.drafts.clear();
    }

    /// Remove e retorna o primeiro rascunho — usado pelo commit, que
    /// consome a lista em ordem e para na primeira falha de escrita.
    pub fn pop_front(&mut self) -> Option<DraftExpense> {
        if self.drafts.is_empty() {
            None
        } else {
            Some(self.drafts.remove(0))
        }
    }

    /// Reinsere um rascunho na frente da lista após falha de escrita,
    /// preservando a ordem original para a nova tentativa.
    pub fn push_front(&mut self, draft: DraftExpense) {
        self.drafts.insert(0, draft);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(description: &str, amount: Option<f64>) -> DraftExpense {
        DraftExpense {
            description: description.to_string(),
            amount,
            category: Some("Outros".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 3, 18).unwrap(),
        }
    }

    #[test]
    fn batch_replaces_the_whole_list() {
        let mut pending = PendingDrafts::new();
        pending.replace_batch(vec![draft("lanche", Some(20.0))]);
        pending.replace_batch(vec![draft("uber", Some(30.0)), draft("café", Some(8.0))]);
        assert_eq!(pending.len(), 2);
        assert_eq!(pending.drafts()[0].description, "uber");
    }

    #[test]
    fn clarification_merges_into_single_draft() {
        let mut pending = PendingDrafts::new();
        pending.replace_batch(vec![draft("lanche", None)]);

        let merged = pending.merge_clarification(DraftPatch {
            amount: Some(25.0),
            ..Default::default()
        });

        assert!(merged);
        assert_eq!(pending.drafts()[0].amount, Some(25.0));
        assert_eq!(pending.drafts()[0].description, "lanche");
    }

    #[test]
    fn absent_incoming_field_never_overwrites() {
        let mut pending = PendingDrafts::new();
        pending.replace_batch(vec![draft("lanche", Some(20.0))]);

        pending.merge_clarification(DraftPatch::default());

        assert_eq!(pending.drafts()[0].amount, Some(20.0));
        assert_eq!(pending.drafts()[0].category.as_deref(), Some("Outros"));
    }

    #[test]
    fn present_incoming_field_overwrites() {
        let mut pending = PendingDrafts::new();
        pending.replace_batch(vec![draft("lanche", Some(20.0))]);

        pending.merge_clarification(DraftPatch {
            amount: Some(22.0),
            category: Some("Alimentação".to_string()),
            ..Default::default()
        });

        assert_eq!(pending.drafts()[0].amount, Some(22.0));
        assert_eq!(pending.drafts()[0].category.as_deref(), Some("Alimentação"));
    }

    #[test]
    fn clarification_refuses_ambiguous_target() {
        let mut pending = PendingDrafts::new();
        pending.replace_batch(vec![draft("lanche", None), draft("uber", None)]);

        let merged = pending.merge_clarification(DraftPatch {
            amount: Some(10.0),
            ..Default::default()
        });

        assert!(!merged);
        assert_eq!(pending.drafts()[0].amount, None);
    }

    #[test]
    fn pop_and_push_front_preserve_order() {
        let mut pending = PendingDrafts::new();
        pending.replace_batch(vec![draft("a", None), draft("b", None)]);

        let first = pending.pop_front().unwrap();
        assert_eq!(first.description, "a");
        pending.push_front(first);
        assert_eq!(pending.drafts()[0].description, "a");
        assert_eq!(pending.drafts()[1].description, "b");
    }
}
