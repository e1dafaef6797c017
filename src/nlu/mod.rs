//! # Pipeline NLU — Da Mensagem ao Rascunho de Despesa
//!
//! Este módulo orquestra o processamento de linguagem natural do sistema.
//! O [`NluPipeline`] é o componente central que:
//!
//! 1. **Classifica** a intenção da mensagem (confirmar, rejeitar, pedir
//!    relatório, continuar a reflexão, declarar despesa, conversar)
//! 2. **Segmenta** a mensagem em despesas candidatas com escopo de data
//! 3. **Extrai** valor e descrição de cada segmento
//! 4. **Resolve** expressões temporais para datas concretas
//! 5. **Categoriza** cada descrição pelo vocabulário canônico
//!
//! Todo o pipeline é **determinístico e síncrono** — nenhuma chamada
//! externa, nenhum estado mutável. A conversa livre e o fallback de
//! extração ficam no colaborador NL ([`llm`](crate::llm)), fora daqui.
//!
//! ## Fluxo de Processamento
//!
//! ```text
//! Mensagem do usuário
//!   ├── 1. NFC normalize (Unicode)
//!   ├── 2. Segmentador temporal (vírgulas e "e" são fronteiras)
//!   │      └── Resolvedor de datas (por segmento, com escopo)
//!   ├── 3. Extrator de itens (valor + descrição por segmento)
//!   └── 4. Classificador de categorias (por descrição)
//!        → Vec<DraftExpense>, todas com data concreta
//! ```
//!
//! ## Sub-módulos
//!
//! | Módulo | Responsabilidade |
//! |--------|-----------------|
//! | [`dates`] | Resolve expressões temporais PT-BR para datas |
//! | [`categories`] | Classifica descrições no vocabulário de despesas |
//! | [`segmenter`] | Divide a mensagem em segmentos datados |
//! | [`extractor`] | Separa valor numérico de texto descritivo |
//! | [`intent`] | Classifica a intenção via cascata de prioridade |

/// Sub-módulo do resolvedor de expressões temporais.
pub mod dates;

/// Sub-módulo do classificador de categorias de despesa.
pub mod categories;

/// Sub-módulo do segmentador temporal.
pub mod segmenter;

/// Sub-módulo do extrator de itens (valor + descrição).
pub mod extractor;

/// Sub-módulo do classificador de intenção.
pub mod intent;

use chrono::NaiveDate;
use unicode_normalization::UnicodeNormalization;

use crate::core::{DialogState, DraftExpense};

use categories::CategoryClassifier;
use dates::DateResolver;
use extractor::ItemExtractor;
use intent::{Intent, IntentClassifier};
use segmenter::TemporalSegmenter;

/// Pipeline NLU completo — combina todos os componentes determinísticos.
///
/// ## Concorrência
///
/// O pipeline é imutável (`&self`) após criação — seguro para uso
/// concorrente por todas as requisições, sem locks.
pub struct NluPipeline {
    /// Resolvedor de expressões temporais.
    resolver: DateResolver,
    /// Segmentador de mensagens multi-despesa.
    segmenter: TemporalSegmenter,
    /// Extrator de valor e descrição.
    extractor: ItemExtractor,
    /// Classificador de categorias.
    categories: CategoryClassifier,
    /// Classificador de intenção.
    intent: IntentClassifier,
}

impl NluPipeline {
    /// Cria o pipeline com todos os componentes (regexes compiladas,
    /// tabela de categorias pré-normalizada).
    pub fn new() -> Self {
        Self {
            resolver: DateResolver::new(),
            segmenter: TemporalSegmenter::new(),
            extractor: ItemExtractor::new(),
            categories: CategoryClassifier::new(),
            intent: IntentClassifier::new(),
        }
    }

    /// Classifica a intenção da mensagem dada a situação da sessão.
    pub fn classify_intent(&self, message: &str, state: DialogState, has_report: bool) -> Intent {
        self.intent.classify(message, state, has_report)
    }

    /// Extrai despesas estruturadas de uma mensagem.
    ///
    /// Roda segmentação → extração → categorização. Segmentos sem
    /// descrição são descartados; segmentos sem data herdam o escopo da
    /// mensagem ou "hoje". O resultado pode ser vazio — o chamador decide
    /// entre o fallback NL e a resposta "nada encontrado".
    pub fn extract_expenses(&self, message: &str, today: NaiveDate) -> Vec<DraftExpense> {
        // Normalização Unicode NFC — garante que caracteres acentuados
        // sejam representados de forma consistente
        let message: String = message.nfc().collect();

        let segments = self.segmenter.segment(&message, today, &self.resolver);
        tracing::debug!(count = segments.len(), "Mensagem segmentada");

        segments
            .into_iter()
            .filter_map(|segment| {
                let item = self.extractor.extract(&segment.text)?;
                let category = self.categories.classify(&item.description);
                Some(DraftExpense {
                    description: item.description,
                    amount: item.amount,
                    category: Some(category),
                    date: segment.date,
                })
            })
            .collect()
    }

    /// Classifica uma descrição isolada (usado para revalidar sugestões
    /// do extrator NL).
    pub fn classify_category(&self, description: &str) -> String {
        self.categories.classify(description)
    }

    /// Mapeia um rótulo de categoria vindo de fora para o canônico.
    pub fn canonical_category(&self, label: &str) -> Option<&'static str> {
        self.categories.canonical(label)
    }

    /// Resolve uma expressão temporal isolada (usado para revalidar
    /// sugestões do extrator NL).
    pub fn resolve_date(&self, text: &str, reference: NaiveDate) -> Option<NaiveDate> {
        self.resolver.resolve(text, reference).map(|r| r.date)
    }

    /// Verdadeiro quando a mensagem é apenas um valor numérico —
    /// o formato de uma resposta de clarificação.
    pub fn is_bare_amount(&self, message: &str) -> bool {
        self.extractor.is_bare_amount(message)
    }

    /// Converte uma mensagem-valor ("45" ou "8,50") em número.
    pub fn parse_bare_amount(&self, message: &str) -> Option<f64> {
        if self.is_bare_amount(message) {
            message.trim().replace(',', ".").parse().ok()
        } else {
            None
        }
    }
}

impl Default for NluPipeline {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 3, 18).unwrap()
    }

    #[test]
    fn n_pairs_produce_n_drafts() {
        let nlu = NluPipeline::new();
        let drafts = nlu.extract_expenses("lanche 20, café 8 e estacionamento 12", today());
        assert_eq!(drafts.len(), 3);
        assert!(drafts.iter().all(|d| d.amount.is_some()));
    }

    #[test]
    fn date_scoping_flows_through_the_pipeline() {
        let nlu = NluPipeline::new();
        let drafts = nlu.extract_expenses("paguei aluguel ontem, lanche 20, água 30", today());
        let yesterday = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();
        assert_eq!(drafts.len(), 3);
        assert!(drafts.iter().all(|d| d.date == yesterday));
    }

    #[test]
    fn two_expense_scenario_with_trailing_date() {
        let nlu = NluPipeline::new();
        let drafts = nlu.extract_expenses("gastei 45 no mercado e 30 de uber ontem", today());
        let yesterday = NaiveDate::from_ymd_opt(2026, 3, 17).unwrap();

        assert_eq!(drafts.len(), 2);
        assert_eq!(drafts[0].description, "mercado");
        assert_eq!(drafts[0].amount, Some(45.0));
        assert_eq!(drafts[0].category.as_deref(), Some("Alimentação"));
        assert_eq!(drafts[0].date, yesterday);

        assert_eq!(drafts[1].description, "uber");
        assert_eq!(drafts[1].amount, Some(30.0));
        assert_eq!(drafts[1].category.as_deref(), Some("Transporte"));
        assert_eq!(drafts[1].date, yesterday);
    }

    #[test]
    fn undated_draft_gets_today() {
        let nlu = NluPipeline::new();
        let drafts = nlu.extract_expenses("pizza 60", today());
        assert_eq!(drafts[0].date, today());
    }

    #[test]
    fn nothing_extractable_yields_empty() {
        // Verbos de gasto sem valor nem substantivo não viram rascunho
        let nlu = NluPipeline::new();
        assert!(nlu.extract_expenses("gastei e paguei", today()).is_empty());
    }

    #[test]
    fn bare_amount_parsing() {
        let nlu = NluPipeline::new();
        assert_eq!(nlu.parse_bare_amount(" 45 "), Some(45.0));
        assert_eq!(nlu.parse_bare_amount("8,50"), Some(8.5));
        assert_eq!(nlu.parse_bare_amount("lanche 45"), None);
    }
}
