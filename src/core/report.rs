//! # Agregador de Relatórios
//!
//! Constrói um [`Report`] a partir das despesas confirmadas de um período:
//! total geral e soma por categoria. O relatório é **derivado e somente
//! leitura** — uma vez montado, fica guardado em
//! [`UserSession::last_report`](super::session::UserSession) para sustentar
//! uma rodada de reflexão de acompanhamento.
//!
//! ## "Sem dados" ≠ "total zero"
//!
//! Quando a consulta ao ledger não retorna nenhuma linha, o agregador
//! devolve `None` em vez de um relatório zerado. A distinção importa na
//! resposta ao usuário: "ainda não há registros suficientes" é diferente
//! de "você gastou R$ 0,00".

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Relatório agregado de um período.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Soma de todos os valores do período.
    pub total: f64,
    /// Categoria → soma dos valores (ordem de inserção irrelevante).
    pub by_category: HashMap<String, f64>,
}

impl Report {
    /// Agrega pares `(categoria, valor)` em um relatório.
    ///
    /// Retorna `None` quando não há nenhuma linha — o chamador responde
    /// "dados insuficientes" em vez de renderizar um relatório vazio.
    pub fn aggregate<'a, I>(rows: I) -> Option<Report>
    where
        I: IntoIterator<Item = (&'a str, f64)>,
    {
        let mut total = 0.0;
        let mut by_category: HashMap<String, f64> = HashMap::new();
        let mut any = false;

        for (category, amount) in rows {
            any = true;
            total += amount;
            *by_category.entry(category.to_string()).or_insert(0.0) += amount;
        }

        any.then_some(Report { total, by_category })
    }

    /// Categorias ordenadas por valor decrescente.
    ///
    /// Empates de valor são desempatados pelo nome, para que a renderização
    /// seja estável entre execuções.
    pub fn sorted_categories(&self) -> Vec<(&str, f64)> {
        let mut entries: Vec<(&str, f64)> = self
            .by_category
            .iter()
            .map(|(c, v)| (c.as_str(), *v))
            .collect();
        entries.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.0.cmp(b.0))
        });
        entries
    }

    /// A categoria de maior peso e sua participação percentual no total.
    pub fn top_category(&self) -> Option<(&str, f64, f64)> {
        self.sorted_categories()
            .first()
            .map(|&(category, value)| (category, value, self.percentage(value)))
    }

    /// Participação percentual de um valor no total (`100 × valor / total`).
    ///
    /// Total zero rende 0% — evita divisão por zero quando todas as
    /// despesas do período foram registradas sem valor.
    pub fn percentage(&self, value: f64) -> f64 {
        if self.total == 0.0 {
            0.0
        } else {
            100.0 * value / self.total
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_totals_and_categories() {
        let report = Report::aggregate(vec![("Alimentação", 100.0), ("Transporte", 50.0)]).unwrap();
        assert_eq!(report.total, 150.0);
        assert_eq!(report.by_category["Alimentação"], 100.0);
        assert_eq!(report.by_category["Transporte"], 50.0);
    }

    #[test]
    fn repeated_categories_are_summed() {
        let report =
            Report::aggregate(vec![("Alimentação", 40.0), ("Alimentação", 60.0)]).unwrap();
        assert_eq!(report.by_category["Alimentação"], 100.0);
    }

    #[test]
    fn no_rows_is_insufficient_data() {
        assert!(Report::aggregate(std::iter::empty()).is_none());
    }

    #[test]
    fn zero_total_is_still_a_report() {
        // Linhas existem, mas todas sem valor — relatório zerado, não "sem dados"
        let report = Report::aggregate(vec![("Outros", 0.0)]).unwrap();
        assert_eq!(report.total, 0.0);
        assert_eq!(report.percentage(0.0), 0.0);
    }

    #[test]
    fn categories_sort_by_descending_value() {
        let report = Report::aggregate(vec![
            ("Transporte", 50.0),
            ("Alimentação", 100.0),
            ("Lazer", 75.0),
        ])
        .unwrap();
        let sorted = report.sorted_categories();
        assert_eq!(sorted[0].0, "Alimentação");
        assert_eq!(sorted[1].0, "Lazer");
        assert_eq!(sorted[2].0, "Transporte");
    }

    #[test]
    fn percentages_match_expected_split() {
        let report = Report::aggregate(vec![("Alimentação", 100.0), ("Transporte", 50.0)]).unwrap();
        let (top, value, pct) = report.top_category().unwrap();
        assert_eq!(top, "Alimentação");
        assert_eq!(value, 100.0);
        assert!((pct - 66.666).abs() < 0.01);
        assert!((report.percentage(50.0) - 33.333).abs() < 0.01);
    }
}
