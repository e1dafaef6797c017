//! # Resolvedor de Datas — Expressões Temporais em PT-BR
//!
//! O [`DateResolver`] mapeia uma expressão temporal em texto livre para uma
//! data concreta do calendário, sempre **relativa a uma data de referência**
//! ("hoje") passada pelo chamador — nunca ao relógio do sistema. Isso mantém
//! o resolvedor puro e testável com datas fixas.
//!
//! ## Regras, em ordem de prioridade
//!
//! | Prioridade | Expressão | Resultado |
//! |-----------|-----------|-----------|
//! | 1 | "hoje" / "ontem" / "amanhã" (ou "amanha") | referência / −1 dia / +1 dia |
//! | 2 | `dd/mm/yyyy` | data explícita |
//! | 3 | "dia N de <mês>" | dia N do mês nomeado, no ano de referência |
//! | 4 | "<dia-da-semana> passada" / "semana passada" | aritmética de dias para trás |
//! | 5 | nada reconhecido | `None` (o chamador assume "hoje") |
//!
//! Datas explícitas inválidas (ex.: `31/02/2026`) contam como não
//! reconhecidas. O resultado carrega também a **frase casada**, para que o
//! [`segmenter`](super::segmenter) possa removê-la do texto do segmento.

use chrono::{Datelike, Days, NaiveDate};
use regex::Regex;

/// Nomes de meses em português, já normalizados (sem diacríticos),
/// mapeados para o número do mês (1-12).
///
/// Usado tanto pela regra "dia N de <mês>" quanto pela detecção de mês
/// em pedidos de relatório ("relatório de março").
const MONTH_NAMES: &[(&str, u32)] = &[
    ("janeiro", 1),
    ("fevereiro", 2),
    ("marco", 3),
    ("abril", 4),
    ("maio", 5),
    ("junho", 6),
    ("julho", 7),
    ("agosto", 8),
    ("setembro", 9),
    ("outubro", 10),
    ("novembro", 11),
    ("dezembro", 12),
];

/// Dias da semana em português, normalizados, mapeados para o número
/// de dias desde segunda-feira (formato do `chrono::Weekday`).
const WEEKDAY_NAMES: &[(&str, u32)] = &[
    ("segunda", 0),
    ("terca", 1),
    ("quarta", 2),
    ("quinta", 3),
    ("sexta", 4),
    ("sabado", 5),
    ("domingo", 6),
];

/// Resultado de uma resolução temporal bem-sucedida.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDate {
    /// A data concreta resolvida.
    pub date: NaiveDate,
    /// A frase exata que casou no texto original (para remoção pelo segmentador).
    pub matched: String,
}

/// Resolvedor de expressões temporais com regexes compiladas uma única vez.
pub struct DateResolver {
    /// "hoje", "ontem", "amanhã"/"amanha".
    keyword_re: Regex,
    /// Data explícita `dd/mm/yyyy`.
    explicit_re: Regex,
    /// "dia N de <mês>".
    dia_de_re: Regex,
    /// "<dia-da-semana>(-feira)? passada/passado".
    weekday_re: Regex,
    /// "semana passada".
    semana_re: Regex,
}

impl DateResolver {
    /// Cria o resolvedor, compilando as regexes.
    ///
    /// Todas as regexes são case-insensitive e aceitam as grafias com e
    /// sem diacríticos que aparecem em chat real ("amanha", "terca",
    /// "sabado", "marco").
    pub fn new() -> Self {
        Self {
            keyword_re: Regex::new(r"(?i)\b(hoje|ontem|amanhã|amanha)\b").unwrap(),
            explicit_re: Regex::new(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b").unwrap(),
            dia_de_re: Regex::new(
                r"(?i)\bdia\s+(\d{1,2})\s+de\s+(janeiro|fevereiro|março|marco|abril|maio|junho|julho|agosto|setembro|outubro|novembro|dezembro)\b",
            )
            .unwrap(),
            weekday_re: Regex::new(
                r"(?i)\b(segunda|terça|terca|quarta|quinta|sexta|sábado|sabado|domingo)(?:-feira)?\s+passad[oa]\b",
            )
            .unwrap(),
            semana_re: Regex::new(r"(?i)\bsemana\s+passada\b").unwrap(),
        }
    }

    /// Resolve a primeira expressão temporal reconhecível no texto.
    ///
    /// # Parâmetros
    ///
    /// - `text` — fragmento de texto livre (qualquer capitalização)
    /// - `reference` — a data "agora" contra a qual expressões relativas
    ///   são calculadas
    ///
    /// # Retorno
    ///
    /// `Some(ResolvedDate)` com a data e a frase casada, ou `None` se
    /// nenhuma pista temporal foi reconhecida — o chamador deve então
    /// assumir a data de referência.
    pub fn resolve(&self, text: &str, reference: NaiveDate) -> Option<ResolvedDate> {
        // ─── 1. Palavras-chave relativas ─────────────────────────
        if let Some(m) = self.keyword_re.find(text) {
            let date = match normalize(m.as_str()).as_str() {
                "hoje" => Some(reference),
                "ontem" => reference.checked_sub_days(Days::new(1)),
                _ => reference.checked_add_days(Days::new(1)),
            };
            if let Some(date) = date {
                return Some(ResolvedDate {
                    date,
                    matched: m.as_str().to_string(),
                });
            }
        }

        // ─── 2. Data explícita dd/mm/yyyy ────────────────────────
        if let Some(caps) = self.explicit_re.captures(text) {
            let day: u32 = caps[1].parse().ok()?;
            let month: u32 = caps[2].parse().ok()?;
            let year: i32 = caps[3].parse().ok()?;
            if let Some(date) = NaiveDate::from_ymd_opt(year, month, day) {
                return Some(ResolvedDate {
                    date,
                    matched: caps[0].to_string(),
                });
            }
        }

        // ─── 3. "dia N de <mês>" no ano de referência ────────────
        if let Some(caps) = self.dia_de_re.captures(text) {
            let day: u32 = caps[1].parse().ok()?;
            if let Some(&(_, month)) = MONTH_NAMES
                .iter()
                .find(|(name, _)| *name == normalize(&caps[2]))
            {
                if let Some(date) = NaiveDate::from_ymd_opt(reference.year(), month, day) {
                    return Some(ResolvedDate {
                        date,
                        matched: caps[0].to_string(),
                    });
                }
            }
        }

        // ─── 4. Dia da semana / semana passada ───────────────────
        if let Some(caps) = self.weekday_re.captures(text) {
            if let Some(&(_, target)) = WEEKDAY_NAMES
                .iter()
                .find(|(name, _)| *name == normalize(&caps[1]))
            {
                let current = reference.weekday().num_days_from_monday();
                // Sempre estritamente no passado: mesmo dia da semana → 7 dias atrás
                let mut back = (current + 7 - target) % 7;
                if back == 0 {
                    back = 7;
                }
                if let Some(date) = reference.checked_sub_days(Days::new(back as u64)) {
                    return Some(ResolvedDate {
                        date,
                        matched: caps[0].to_string(),
                    });
                }
            }
        }

        if let Some(m) = self.semana_re.find(text) {
            if let Some(date) = reference.checked_sub_days(Days::new(7)) {
                return Some(ResolvedDate {
                    date,
                    matched: m.as_str().to_string(),
                });
            }
        }

        None
    }
}

impl Default for DateResolver {
    fn default() -> Self {
        Self::new()
    }
}

/// Detecta um nome de mês em texto livre.
///
/// Usado pelo fluxo de relatório para aceitar "relatório de março".
/// A comparação é feita sobre o texto normalizado, então "março" e
/// "marco" são equivalentes.
///
/// # Retorno
///
/// `Some((mês 1-12, nome para exibição))` ou `None`.
pub fn month_in_text(text: &str) -> Option<(u32, &'static str)> {
    let normalized = normalize(text);
    MONTH_NAMES
        .iter()
        .find(|(name, _)| normalized.contains(name))
        .map(|&(_, month)| (month, month_display(month)))
}

/// Nome do mês com a grafia correta, para exibição em respostas.
pub fn month_display(month: u32) -> &'static str {
    match month {
        1 => "janeiro",
        2 => "fevereiro",
        3 => "março",
        4 => "abril",
        5 => "maio",
        6 => "junho",
        7 => "julho",
        8 => "agosto",
        9 => "setembro",
        10 => "outubro",
        11 => "novembro",
        _ => "dezembro",
    }
}

/// Remove diacríticos e converte para minúsculas, via decomposição NFD.
///
/// "Março" → "marco", "Sábado" → "sabado". Compartilhada com o
/// classificador de categorias, que usa a mesma normalização.
pub fn normalize(text: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    text.nfd()
        .filter(|c| !is_combining_mark(*c))
        .collect::<String>()
        .to_lowercase()
}

/// Marca combinante Unicode (acentos decompostos pelo NFD).
fn is_combining_mark(c: char) -> bool {
    ('\u{0300}'..='\u{036f}').contains(&c)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reference() -> NaiveDate {
        // Uma quarta-feira
        NaiveDate::from_ymd_opt(2026, 3, 18).unwrap()
    }

    #[test]
    fn hoje_returns_reference() {
        let r = DateResolver::new();
        let resolved = r.resolve("gastei 50 hoje", reference()).unwrap();
        assert_eq!(resolved.date, reference());
        assert_eq!(resolved.matched, "hoje");
    }

    #[test]
    fn ontem_is_one_day_back() {
        let r = DateResolver::new();
        let resolved = r.resolve("paguei aluguel ontem", reference()).unwrap();
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2026, 3, 17).unwrap());
    }

    #[test]
    fn amanha_with_and_without_accent() {
        let r = DateResolver::new();
        let expected = NaiveDate::from_ymd_opt(2026, 3, 19).unwrap();
        assert_eq!(r.resolve("viajo amanhã", reference()).unwrap().date, expected);
        assert_eq!(r.resolve("viajo amanha", reference()).unwrap().date, expected);
    }

    #[test]
    fn explicit_date_round_trip() {
        let r = DateResolver::new();
        let resolved = r.resolve("15/03/2026", reference()).unwrap();
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2026, 3, 15).unwrap());
        assert_eq!(resolved.matched, "15/03/2026");
    }

    #[test]
    fn invalid_explicit_date_is_unresolved() {
        let r = DateResolver::new();
        assert!(r.resolve("31/02/2026", reference()).is_none());
    }

    #[test]
    fn dia_n_de_mes_uses_reference_year() {
        let r = DateResolver::new();
        let resolved = r.resolve("dia 5 de março paguei a luz", reference()).unwrap();
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2026, 3, 5).unwrap());
        assert_eq!(resolved.matched, "dia 5 de março");
    }

    #[test]
    fn weekday_passada_is_strictly_in_the_past() {
        let r = DateResolver::new();
        // referência é quarta 18/03; sexta passada = 13/03
        let resolved = r.resolve("sexta passada", reference()).unwrap();
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2026, 3, 13).unwrap());
        // mesmo dia da semana → uma semana inteira atrás
        let resolved = r.resolve("quarta passada", reference()).unwrap();
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
    }

    #[test]
    fn semana_passada_is_seven_days_back() {
        let r = DateResolver::new();
        let resolved = r.resolve("semana passada", reference()).unwrap();
        assert_eq!(resolved.date, NaiveDate::from_ymd_opt(2026, 3, 11).unwrap());
    }

    #[test]
    fn no_temporal_cue_is_none() {
        let r = DateResolver::new();
        assert!(r.resolve("almoço no centro 35", reference()).is_none());
    }

    #[test]
    fn month_detection_ignores_accents() {
        assert_eq!(month_in_text("relatório de março"), Some((3, "março")));
        assert_eq!(month_in_text("relatorio de marco"), Some((3, "março")));
        assert_eq!(month_in_text("como foi meu mês?"), None);
    }
}
