//! # Segmentador Temporal — Uma Mensagem, Várias Despesas
//!
//! O [`TemporalSegmenter`] divide uma mensagem em sub-segmentos ordenados,
//! um por despesa declarada, e atribui a cada segmento a data que estava
//! **em vigor** naquele ponto da mensagem.
//!
//! ## Semântica de Escopo de Data
//!
//! Uma data declarada vale para tudo que vem **depois** dela na mesma
//! mensagem, e a sequência inicial sem data adota a **primeira** data
//! declarada — em linguagem falada, "gastei 45 no mercado e 30 de uber
//! ontem" quer dizer que as duas coisas aconteceram ontem:
//!
//! ```text
//! "paguei aluguel ontem, lanche 20, água 30"
//!        ontem          ontem      ontem      ← herança para frente
//!
//! "gastei 45 no mercado e 30 de uber ontem"
//!        ontem                ontem           ← preenchimento para trás
//!                                               da sequência inicial
//! ```
//!
//! ## Algoritmo
//!
//! 1. Vírgulas e a conjunção "e" viram fronteiras de segmento
//! 2. Cada parte é aparada; partes vazias são descartadas
//! 3. O [`DateResolver`](super::dates::DateResolver) roda sobre cada parte;
//!    quando reconhece uma data, a **frase temporal é removida** do texto
//! 4. Datas são propagadas: para frente a partir de cada declaração, e a
//!    sequência inicial sem data recebe a primeira data declarada
//! 5. Mensagem sem nenhuma data → todos os segmentos datados de "hoje"

use chrono::NaiveDate;
use regex::Regex;

use super::dates::DateResolver;

/// Um sub-segmento da mensagem: o texto restante e a data em vigor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    /// Texto do segmento, já sem a frase temporal que casou (se houve).
    pub text: String,
    /// Data em vigor para este segmento.
    pub date: NaiveDate,
}

/// Segmentador com a regex de fronteira compilada uma única vez.
pub struct TemporalSegmenter {
    /// A conjunção " e " como fronteira (case-insensitive).
    conjunction_re: Regex,
}

impl TemporalSegmenter {
    /// Cria o segmentador.
    pub fn new() -> Self {
        Self {
            conjunction_re: Regex::new(r"(?i)\s+e\s+").unwrap(),
        }
    }

    /// Divide a mensagem em segmentos datados.
    ///
    /// # Parâmetros
    ///
    /// - `text` — mensagem bruta do usuário
    /// - `reference` — a data "hoje" usada pelo resolvedor e como default
    /// - `resolver` — resolvedor de expressões temporais
    pub fn segment(
        &self,
        text: &str,
        reference: NaiveDate,
        resolver: &DateResolver,
    ) -> Vec<Segment> {
        // Normaliza separadores: vírgula e " e " viram "|"
        let normalized = text.replace(',', "|");
        let normalized = self.conjunction_re.replace_all(&normalized, "|");

        // Primeira passada: resolve a data própria de cada parte e
        // remove a frase temporal do texto
        let mut parts: Vec<(String, Option<NaiveDate>)> = Vec::new();
        for part in normalized.split('|') {
            let part = part.trim();
            if part.is_empty() {
                continue;
            }
            match resolver.resolve(part, reference) {
                Some(resolved) => {
                    let stripped = part.replacen(&resolved.matched, "", 1);
                    let cleaned = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
                    parts.push((cleaned, Some(resolved.date)));
                }
                None => parts.push((part.to_string(), None)),
            }
        }

        // Segunda passada: propaga as datas. A sequência inicial sem data
        // adota a primeira data declarada; daí em diante, herança para frente.
        let first_declared = parts.iter().find_map(|(_, d)| *d);
        let mut current = first_declared.unwrap_or(reference);

        parts
            .into_iter()
            .map(|(text, own)| {
                if let Some(date) = own {
                    current = date;
                }
                Segment {
                    text,
                    date: current,
                }
            })
            .collect()
    }
}

impl Default for TemporalSegmenter {
    fn default() -> Self {
        Self::new()
    }
}
