//! # Compositor de Respostas — A Voz do Oráculo
//!
//! Camada de formatação **pura**: recebe rascunhos, relatórios e estado, e
//! devolve texto pronto para o usuário. Nenhuma regra de negócio vive
//! aqui e nada é mutado — o compositor não conhece sessões nem
//! colaboradores.
//!
//! As linhas fixas do Oráculo (pedido de esclarecimento, confirmação,
//! despesas salvas, nada encontrado, desculpas) moram neste módulo como
//! constantes, para que toda resposta do sistema saia de um único lugar.

use chrono::NaiveDate;

use crate::core::{infer_profile, DraftExpense, Report, UsagePatterns, UserProfile};
use crate::error::OracleError;

/// Pedido de esclarecimento (mensagem ou user_id ausente).
pub const ASK_CLARIFY: &str = "🔮 Minha visão ficou turva… pode me dar mais detalhes?";

/// Prompt de confirmação ao final de um preview.
pub const ASK_CONFIRM: &str = "Se minha leitura estiver correta, diga **\"sim\"**.";

/// Despesas confirmadas e gravadas.
pub const SAVED: &str = "📜 As despesas foram seladas no livro financeiro.";

/// Nenhuma despesa reconhecida na mensagem.
pub const NOTHING_FOUND: &str = "🌫️ Não consegui enxergar nenhuma despesa nessa mensagem.";

/// Rejeição do preview reconhecida.
pub const REJECT_ACK: &str = "Tudo bem 🙂 Me diga novamente como foi que eu ajusto.";

/// Falha de colaborador externo (genérica, sem detalhes internos).
pub const COLLABORATOR_FAILURE: &str = "🌪️ As visões se romperam por um instante…";

/// Fallback quando o extrator NL está indisponível.
pub const LLM_FALLBACK: &str =
    "🔮 Algo ficou nebuloso por um instante… quer tentar explicar de outro jeito?";

/// Sem registros no período pedido.
pub const INSUFFICIENT_DATA: &str = "📭 Ainda não há registros suficientes para esse período.";

/// Mapeia a taxonomia de erros para a linha fixa correspondente.
///
/// É o único ponto onde um [`OracleError`] vira texto de usuário — a
/// causa interna nunca vaza; fica nos logs de quem chamou.
pub fn for_error(error: &OracleError) -> &'static str {
    match error {
        OracleError::MissingInput => ASK_CLARIFY,
        OracleError::ExtractionEmpty | OracleError::MalformedResponse(_) => NOTHING_FOUND,
        OracleError::Collaborator(_) => COLLABORATOR_FAILURE,
    }
}

/// Renderiza o preview numerado dos rascunhos com o prompt de confirmação.
///
/// Cada linha traz descrição, valor (ou "Valor não informado") e
/// categoria. A data aparece uma única vez quando é comum a todos os
/// rascunhos, e por linha quando as datas divergem.
pub fn preview(drafts: &[DraftExpense]) -> String {
    let common_date = common_date(drafts);

    let mut out = String::from("🧾 Posso registrar assim?\n\n");
    for (i, draft) in drafts.iter().enumerate() {
        let amount = match draft.amount {
            Some(v) => format!("R$ {v:.2}"),
            None => "Valor não informado".to_string(),
        };
        let category = draft.category.as_deref().unwrap_or("Outros");
        out.push_str(&format!("{}) {} — {} — {}", i + 1, draft.description, amount, category));
        if common_date.is_none() {
            out.push_str(&format!(" — {}", format_date(draft.date)));
        }
        out.push('\n');
    }

    if let Some(date) = common_date {
        out.push_str(&format!("\n🗓️ Data: {}\n", format_date(date)));
    }

    out.push_str(&format!("\n{ASK_CONFIRM}"));
    out
}

/// Renderiza um relatório: total e quebra por categoria em ordem
/// decrescente de valor, com participação percentual em uma casa decimal.
pub fn report(report: &Report, period_label: &str) -> String {
    let mut out = format!("📊 **Relatório {period_label}**\n\n");
    out.push_str(&format!("💰 Total gasto: **R$ {:.2}**\n\n", report.total));

    for (category, value) in report.sorted_categories() {
        let pct = report.percentage(value);
        out.push_str(&format!("• {category}: R$ {value:.2} ({pct:.1}%)\n"));
    }

    out.push_str("\n🔮 Quer que eu analise isso com mais profundidade?");
    out
}

/// Renderiza a reflexão de acompanhamento: a categoria de maior peso em
/// destaque, com sua participação no total.
pub fn report_followup(report: &Report) -> String {
    match report.top_category() {
        Some((category, _, pct)) => format!(
            "🔍 Olhando para esse período, **{category}** teve o maior peso ({pct:.1}%).\n\n\
             Quer conversar sobre isso ou prefere pensar em um pequeno ajuste?"
        ),
        None => INSUFFICIENT_DATA.to_string(),
    }
}

/// Decora uma resposta de conversa livre com o comentário comportamental.
///
/// Os prefixos empilham na ordem inversa de aplicação (o último aplicado
/// aparece primeiro), reproduzindo o tom de "reconhecimento progressivo"
/// do Oráculo: perfil, depois familiaridade, depois a observação de
/// categoria favorita ao final.
pub fn decorate_free_chat(base: &str, patterns: &UsagePatterns) -> String {
    let mut reply = base.to_string();

    match infer_profile(patterns) {
        UserProfile::Economico => {
            reply = format!("💡 Dá pra perceber que você costuma cuidar bem do dinheiro.\n\n{reply}");
        }
        UserProfile::Impulsivo => {
            reply = format!("⚡ Parece que suas decisões são bem rápidas, e isso tem seu lado bom.\n\n{reply}");
        }
        UserProfile::Cauteloso => {
            reply = format!("🧘 Você costuma pensar antes de agir, isso ajuda muito.\n\n{reply}");
        }
        UserProfile::Neutro => {}
    }

    if patterns.interactions == 1 {
        reply = format!("🔮 Primeira vez por aqui? Fica à vontade.\n\n{reply}");
    }
    if patterns.interactions > 3 {
        reply = format!("🙂 Bom te ver de novo por aqui.\n\n{reply}");
    }
    if patterns.interactions > 10 {
        reply = format!("😄 Já virou hábito passar por aqui, né?\n\n{reply}");
    }

    if patterns.interactions > 5 {
        if let Some((category, _)) = patterns.top_category() {
            reply.push_str(&format!(
                "\n\n🔎 Notei que você costuma falar bastante sobre **{category}**."
            ));
        }
    }

    reply
}

/// Data no formato brasileiro `dd/mm/aaaa`.
fn format_date(date: NaiveDate) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// A data comum a todos os rascunhos, se houver.
fn common_date(drafts: &[DraftExpense]) -> Option<NaiveDate> {
    let first = drafts.first()?.date;
    drafts.iter().all(|d| d.date == first).then_some(first)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(description: &str, amount: Option<f64>, day: u32) -> DraftExpense {
        DraftExpense {
            description: description.to_string(),
            amount,
            category: Some("Alimentação".to_string()),
            date: NaiveDate::from_ymd_opt(2026, 3, day).unwrap(),
        }
    }

    #[test]
    fn preview_numbers_drafts_and_shows_common_date() {
        let text = preview(&[draft("mercado", Some(45.0), 17), draft("uber", Some(30.0), 17)]);
        assert!(text.contains("1) mercado — R$ 45.00 — Alimentação"));
        assert!(text.contains("2) uber — R$ 30.00 — Alimentação"));
        assert!(text.contains("🗓️ Data: 17/03/2026"));
        assert!(text.contains(ASK_CONFIRM));
    }

    #[test]
    fn preview_shows_per_line_dates_when_they_differ() {
        let text = preview(&[draft("mercado", Some(45.0), 17), draft("uber", Some(30.0), 18)]);
        assert!(text.contains("— 17/03/2026"));
        assert!(text.contains("— 18/03/2026"));
        assert!(!text.contains("🗓️ Data:"));
    }

    #[test]
    fn preview_marks_missing_amount() {
        let text = preview(&[draft("lanche", None, 18)]);
        assert!(text.contains("Valor não informado"));
    }

    #[test]
    fn report_shows_percentages_to_one_decimal() {
        let r = Report::aggregate(vec![("Alimentação", 100.0), ("Transporte", 50.0)]).unwrap();
        let text = report(&r, "de março");
        assert!(text.contains("Total gasto: **R$ 150.00**"));
        assert!(text.contains("• Alimentação: R$ 100.00 (66.7%)"));
        assert!(text.contains("• Transporte: R$ 50.00 (33.3%)"));
        // Ordem decrescente: Alimentação antes de Transporte
        let a = text.find("Alimentação").unwrap();
        let t = text.find("Transporte").unwrap();
        assert!(a < t);
    }

    #[test]
    fn followup_highlights_top_category() {
        let r = Report::aggregate(vec![("Alimentação", 100.0), ("Transporte", 50.0)]).unwrap();
        let text = report_followup(&r);
        assert!(text.contains("**Alimentação**"));
        assert!(text.contains("66.7%"));
    }

    #[test]
    fn free_chat_greets_first_contact() {
        let mut patterns = UsagePatterns::default();
        patterns.interactions = 1;
        let text = decorate_free_chat("oi!", &patterns);
        assert!(text.starts_with("🔮 Primeira vez por aqui?"));
        assert!(text.ends_with("oi!"));
    }

    #[test]
    fn free_chat_mentions_top_category_for_frequent_users() {
        let mut patterns = UsagePatterns::default();
        patterns.interactions = 6;
        patterns.total_expenses = 2000.0;
        patterns.top_categories.insert("Transporte".to_string(), 3);
        let text = decorate_free_chat("oi!", &patterns);
        assert!(text.contains("**Transporte**"));
    }

    #[test]
    fn error_taxonomy_maps_to_fixed_lines() {
        assert_eq!(for_error(&OracleError::MissingInput), ASK_CLARIFY);
        assert_eq!(for_error(&OracleError::ExtractionEmpty), NOTHING_FOUND);
        assert_eq!(
            for_error(&OracleError::MalformedResponse("x".into())),
            NOTHING_FOUND
        );
        assert_eq!(
            for_error(&OracleError::Collaborator("timeout".into())),
            COLLABORATOR_FAILURE
        );
    }

    #[test]
    fn free_chat_neutral_profile_is_undecorated() {
        let patterns = UsagePatterns {
            interactions: 2,
            total_expenses: 2000.0,
            ..Default::default()
        };
        assert_eq!(decorate_free_chat("oi!", &patterns), "oi!");
    }
}
