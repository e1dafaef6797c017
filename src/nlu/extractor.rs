//! # Extrator de Itens — Valor e Descrição de um Segmento
//!
//! O [`ItemExtractor`] separa, dentro de um segmento, o **token numérico**
//! (o valor da despesa) do **texto descritivo** restante.
//!
//! ## Algoritmo
//!
//! 1. Tokeniza por espaços; o primeiro token que casa o padrão numérico
//!    `dígitos[.,dígitos]` é o valor (vírgula normalizada para ponto)
//! 2. A descrição é montada em cascata, do candidato mais informativo
//!    para o menos:
//!
//! | Tentativa | Fonte | Exemplo |
//! |-----------|-------|---------|
//! | 1 | tokens **antes** do valor, sem verbos de gasto e conectivos iniciais | "lanche 20" → "lanche" |
//! | 2 | tokens **depois** do valor, sem conectivos iniciais | "gastei 45 no mercado" → "mercado" |
//! | 3 | tokens antes do valor, crus | "abasteci 100" → "abasteci" |
//!
//! 3. Segmento sem descrição após a cascata é descartado pelo chamador
//!    (`extract` retorna `None`)
//!
//! A cascata existe porque mensagens reais colocam o substantivo tanto
//! antes ("lanche 20") quanto depois do valor ("45 no mercado"), e o verbo
//! de gasto sozinho ("gastei") não é uma descrição útil — mas é melhor que
//! nada quando é tudo que resta ("abasteci 100").

use regex::Regex;

/// Verbos de gasto que não contribuem para a descrição quando há um
/// substantivo disponível. "abasteci" fica de fora: é simultaneamente
/// verbo e o único indício de categoria em "abasteci 100".
const EXPENSE_VERBS: &[&str] = &["gastei", "paguei", "comprei"];

/// Conectivos que não devem abrir uma descrição ("no mercado" → "mercado").
const LEADING_CONNECTIVES: &[&str] = &[
    "no", "na", "nos", "nas", "de", "do", "da", "dos", "das", "em", "num", "numa", "com", "o",
    "a", "os", "as", "um", "uma", "pro", "pra", "para",
];

/// Resultado da extração de um segmento: descrição não-vazia e valor opcional.
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedItem {
    /// Texto descritivo da despesa.
    pub description: String,
    /// Valor numérico, se algum token numérico foi encontrado.
    pub amount: Option<f64>,
}

/// Extrator com o padrão numérico compilado uma única vez.
pub struct ItemExtractor {
    /// `dígitos[.,dígitos]` — token inteiro, sem prefixo de moeda.
    amount_re: Regex,
}

impl ItemExtractor {
    /// Cria o extrator.
    pub fn new() -> Self {
        Self {
            amount_re: Regex::new(r"^\d+([.,]\d+)?$").unwrap(),
        }
    }

    /// Extrai `{descrição, valor}` do texto de um segmento.
    ///
    /// Retorna `None` quando nenhuma descrição sobra após a cascata —
    /// o segmento deve ser descartado. Um valor sozinho ("45") cai nesse
    /// caso, e é justamente o que o fluxo de clarificação detecta antes
    /// de descartar (ver o acumulador de rascunhos).
    pub fn extract(&self, text: &str) -> Option<ExtractedItem> {
        let tokens: Vec<&str> = text.split_whitespace().collect();

        // Primeiro token numérico é o valor; os demais são candidatos à descrição
        let amount_pos = tokens.iter().position(|t| self.amount_re.is_match(t));
        let amount =
            amount_pos.and_then(|i| tokens[i].replace(',', ".").parse::<f64>().ok());

        let (before, after): (&[&str], &[&str]) = match amount_pos {
            Some(i) => (&tokens[..i], &tokens[i + 1..]),
            None => (&tokens[..], &[]),
        };

        // Tentativa 1: tokens antes do valor, limpos
        let mut description = clean(before);
        if description.is_empty() {
            // Tentativa 2: tokens depois do valor, limpos
            description = clean(after);
        }
        if description.is_empty() && amount.is_some() {
            // Tentativa 3: o que havia antes do valor, cru (ex.: só o verbo).
            // Sem valor não há despesa para ancorar — o verbo sozinho é ruído.
            description = before.join(" ");
        }

        if description.is_empty() {
            return None;
        }

        Some(ExtractedItem {
            description,
            amount,
        })
    }

    /// Verdadeiro quando o texto é **apenas** um valor numérico.
    ///
    /// Usado pelo orquestrador para reconhecer uma resposta de
    /// clarificação ("45" depois de "quanto foi o lanche?").
    pub fn is_bare_amount(&self, text: &str) -> bool {
        self.amount_re.is_match(text.trim())
    }
}

impl Default for ItemExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// Remove verbos de gasto e conectivos iniciais de uma lista de tokens.
fn clean(tokens: &[&str]) -> String {
    let without_verbs: Vec<&str> = tokens
        .iter()
        .copied()
        .filter(|t| !EXPENSE_VERBS.contains(&t.to_lowercase().as_str()))
        .collect();

    let mut rest = without_verbs.as_slice();
    while let Some((first, tail)) = rest.split_first() {
        if LEADING_CONNECTIVES.contains(&first.to_lowercase().as_str()) {
            rest = tail;
        } else {
            break;
        }
    }

    rest.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extract(text: &str) -> Option<ExtractedItem> {
        ItemExtractor::new().extract(text)
    }

    #[test]
    fn noun_before_amount() {
        let item = extract("lanche 20").unwrap();
        assert_eq!(item.description, "lanche");
        assert_eq!(item.amount, Some(20.0));
    }

    #[test]
    fn noun_after_amount() {
        let item = extract("gastei 45 no mercado").unwrap();
        assert_eq!(item.description, "mercado");
        assert_eq!(item.amount, Some(45.0));
    }

    #[test]
    fn leading_connective_is_stripped() {
        let item = extract("30 de uber").unwrap();
        assert_eq!(item.description, "uber");
        assert_eq!(item.amount, Some(30.0));
    }

    #[test]
    fn verb_survives_when_it_is_all_there_is() {
        let item = extract("abasteci 100").unwrap();
        assert_eq!(item.description, "abasteci");
        assert_eq!(item.amount, Some(100.0));
    }

    #[test]
    fn comma_decimal_is_normalized() {
        let item = extract("café 8,50").unwrap();
        assert_eq!(item.amount, Some(8.5));
    }

    #[test]
    fn no_amount_keeps_whole_description() {
        let item = extract("presente de aniversário").unwrap();
        assert_eq!(item.description, "presente de aniversário");
        assert_eq!(item.amount, None);
    }

    #[test]
    fn expense_verb_alone_without_amount() {
        // Sem valor, a limpeza remove o verbo mas mantém o substantivo
        let item = extract("paguei aluguel").unwrap();
        assert_eq!(item.description, "aluguel");
        assert_eq!(item.amount, None);
    }

    #[test]
    fn verb_alone_without_amount_is_discarded() {
        assert_eq!(extract("gastei"), None);
    }

    #[test]
    fn bare_amount_is_discarded() {
        assert_eq!(extract("45"), None);
        assert!(ItemExtractor::new().is_bare_amount(" 45 "));
        assert!(ItemExtractor::new().is_bare_amount("8,50"));
        assert!(!ItemExtractor::new().is_bare_amount("lanche 45"));
    }

    #[test]
    fn empty_text_is_discarded() {
        assert_eq!(extract(""), None);
        assert_eq!(extract("   "), None);
    }
}
