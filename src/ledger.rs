//! # Ledger Store — O Livro Financeiro
//!
//! Colaborador externo **append-only** que guarda as despesas confirmadas.
//! O trait [`LedgerStore`] é a costura entre o orquestrador e a
//! persistência; as duas implementações cobrem os dois ambientes:
//!
//! | Implementação | Uso |
//! |---------------|-----|
//! | [`MemoryLedger`] | testes e desenvolvimento local sem credenciais |
//! | [`RestLedger`] | tabela `despesas` via REST (dialeto PostgREST/Supabase) |
//!
//! O ledger só é tocado em dois pontos do diálogo: o **commit** (um insert
//! por rascunho confirmado, em ordem) e a **consulta de relatório**
//! (filtrada por usuário e intervalo de datas, inclusivo).

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::DraftExpense;
use crate::error::OracleError;

/// Uma linha do livro financeiro.
///
/// O esquema espelha a tabela `despesas`: além dos campos vindos do
/// rascunho, toda despesa nasce com `status = "pendente"`,
/// `expense_type = "Variável"` e `is_recurring = false`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    /// Identificador da linha, gerado no momento do commit.
    #[serde(default = "Uuid::new_v4")]
    pub id: Uuid,
    /// Dono da despesa.
    pub user_id: String,
    /// Texto descritivo.
    pub description: String,
    /// Valor em reais; despesas confirmadas sem valor entram como `null`.
    pub amount: Option<f64>,
    /// Categoria classificada.
    pub category: String,
    /// Data do gasto.
    pub expense_date: NaiveDate,
    /// Data de vencimento — igual à data do gasto para despesas à vista.
    pub data_vencimento: NaiveDate,
    /// Situação do lançamento.
    pub status: String,
    /// Tipo do lançamento.
    pub expense_type: String,
    /// Lançamento recorrente?
    pub is_recurring: bool,
}

impl LedgerRecord {
    /// Monta a linha a partir de um rascunho confirmado.
    pub fn from_draft(user_id: &str, draft: &DraftExpense) -> Self {
        Self {
            id: Uuid::new_v4(),
            user_id: user_id.to_string(),
            description: draft.description.clone(),
            amount: draft.amount,
            category: draft
                .category
                .clone()
                .unwrap_or_else(|| crate::nlu::categories::UNCATEGORIZED.to_string()),
            expense_date: draft.date,
            data_vencimento: draft.date,
            status: "pendente".to_string(),
            expense_type: "Variável".to_string(),
            is_recurring: false,
        }
    }
}

/// Colaborador de persistência das despesas confirmadas.
#[async_trait]
pub trait LedgerStore: Send + Sync {
    /// Insere uma despesa confirmada.
    async fn insert(&self, record: LedgerRecord) -> Result<(), OracleError>;

    /// Consulta as despesas de um usuário no intervalo `[start, end]`
    /// (inclusivo nas duas pontas).
    async fn query_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerRecord>, OracleError>;
}

// ─── Implementação em memória ────────────────────────────────────────

/// Ledger em memória para testes e desenvolvimento sem credenciais.
#[derive(Default)]
pub struct MemoryLedger {
    rows: parking_lot::RwLock<Vec<LedgerRecord>>,
}

impl MemoryLedger {
    /// Ledger vazio.
    pub fn new() -> Self {
        Self::default()
    }

    /// Total de linhas registradas (para asserções em teste).
    pub fn len(&self) -> usize {
        self.rows.read().len()
    }

    /// Verdadeiro quando não há nenhuma linha.
    pub fn is_empty(&self) -> bool {
        self.rows.read().is_empty()
    }
}

#[async_trait]
impl LedgerStore for MemoryLedger {
    async fn insert(&self, record: LedgerRecord) -> Result<(), OracleError> {
        self.rows.write().push(record);
        Ok(())
    }

    async fn query_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerRecord>, OracleError> {
        Ok(self
            .rows
            .read()
            .iter()
            .filter(|r| r.user_id == user_id && r.expense_date >= start && r.expense_date <= end)
            .cloned()
            .collect())
    }
}

// ─── Implementação REST (PostgREST/Supabase) ─────────────────────────

/// Ledger REST falando o dialeto PostgREST com a tabela `despesas`.
///
/// O timeout das chamadas vem do `reqwest::Client` injetado — construído
/// uma única vez no bootstrap com o timeout de colaborador da configuração.
pub struct RestLedger {
    /// Cliente HTTP com timeout configurado.
    client: reqwest::Client,
    /// Base do endpoint REST (ex.: `https://xyz.supabase.co`).
    base_url: String,
    /// Credencial de serviço enviada em `apikey` e `Authorization`.
    api_key: String,
}

impl RestLedger {
    /// Cria o ledger REST.
    pub fn new(client: reqwest::Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }

    /// URL da tabela `despesas`.
    fn table_url(&self) -> String {
        format!("{}/rest/v1/despesas", self.base_url.trim_end_matches('/'))
    }
}

#[async_trait]
impl LedgerStore for RestLedger {
    async fn insert(&self, record: LedgerRecord) -> Result<(), OracleError> {
        let response = self
            .client
            .post(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .json(&record)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::Collaborator(format!(
                "insert no ledger retornou {}",
                response.status()
            )));
        }
        Ok(())
    }

    async fn query_range(
        &self,
        user_id: &str,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<LedgerRecord>, OracleError> {
        let response = self
            .client
            .get(self.table_url())
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .query(&[
                ("select", "*".to_string()),
                ("user_id", format!("eq.{user_id}")),
                ("expense_date", format!("gte.{start}")),
                ("expense_date", format!("lte.{end}")),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(OracleError::Collaborator(format!(
                "consulta ao ledger retornou {}",
                response.status()
            )));
        }

        let rows = response.json::<Vec<LedgerRecord>>().await?;
        Ok(rows)
    }
}
