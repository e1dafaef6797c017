//! # Padrões de Uso e Perfil Comportamental
//!
//! [`UsagePatterns`] é a memória contextual de longo prazo de um usuário:
//! quantas mensagens trocou, quanto já registrou de gasto confirmado, e em
//! quais categorias. A partir dela, [`infer_profile`] deriva um
//! [`UserProfile`] usado para colorir as respostas de conversa livre.
//!
//! ## Regras de Mutação
//!
//! - `interactions` incrementa **uma vez por mensagem recebida**, na
//!   entrada do turno
//! - `total_expenses` e `top_categories` mudam **somente no commit** —
//!   nunca durante o preview
//!
//! Violar a segunda regra inflaria o perfil com gastos que o usuário
//! rejeitou.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use super::draft::DraftExpense;

/// Memória contextual acumulada de um usuário.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UsagePatterns {
    /// Mensagens recebidas deste usuário (qualquer intenção).
    pub interactions: u32,
    /// Soma dos valores de despesas **confirmadas**.
    pub total_expenses: f64,
    /// Categoria → quantidade de despesas confirmadas nela.
    pub top_categories: HashMap<String, u32>,
}

impl UsagePatterns {
    /// Registra uma mensagem recebida. Chamar na entrada do turno.
    pub fn register_interaction(&mut self) {
        self.interactions += 1;
    }

    /// Registra uma despesa confirmada. Chamar somente no commit.
    pub fn register_committed(&mut self, draft: &DraftExpense) {
        self.total_expenses += draft.amount.unwrap_or(0.0);
        let category = draft.category.as_deref().unwrap_or("Outros");
        *self.top_categories.entry(category.to_string()).or_insert(0) += 1;
    }

    /// A categoria mais frequente, se alguma despesa já foi confirmada.
    ///
    /// Empates são resolvidos pelo nome, para que a resposta não oscile
    /// entre execuções.
    pub fn top_category(&self) -> Option<(&str, u32)> {
        self.top_categories
            .iter()
            .max_by(|a, b| a.1.cmp(b.1).then_with(|| b.0.cmp(a.0)))
            .map(|(category, count)| (category.as_str(), *count))
    }
}

/// Perfil comportamental inferido dos padrões de uso.
///
/// Os limiares vêm da observação de uso real: pouco gasto com muita
/// conversa sugere contenção; muitas categorias logo nas primeiras
/// interações sugere decisões rápidas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserProfile {
    /// Gasta pouco e conversa bastante.
    Economico,
    /// Espalha gastos por muitas categorias logo de início.
    Impulsivo,
    /// Usuário frequente com gasto contido.
    Cauteloso,
    /// Nenhum padrão forte ainda.
    Neutro,
}

/// Infere o perfil comportamental a partir dos padrões acumulados.
///
/// As regras são avaliadas em ordem; a primeira que casa define o perfil.
pub fn infer_profile(patterns: &UsagePatterns) -> UserProfile {
    let category_count = patterns.top_categories.len();

    if patterns.total_expenses < 500.0 && patterns.interactions > 5 {
        return UserProfile::Economico;
    }
    if category_count >= 4 && patterns.interactions < 5 {
        return UserProfile::Impulsivo;
    }
    if patterns.interactions >= 6 && patterns.total_expenses < 1000.0 {
        return UserProfile::Cauteloso;
    }
    UserProfile::Neutro
}
