//! # Orquestrador — O Coração do Diálogo Financeiro
//!
//! O [`Orchestrator`] rege o ciclo completo de cada mensagem: classifica a
//! intenção, dirige a máquina de estados do diálogo, aciona o pipeline NLU
//! e os colaboradores externos, e devolve **sempre** uma resposta textual
//! válida — nenhum erro atravessa esta camada.
//!
//! ## Fluxo por Mensagem
//!
//! ```text
//! Mensagem {user_id, texto}
//!   │
//!   ├── 1. Trava a sessão do usuário (turno inteiro é atômico)
//!   ├── 2. Primeiro contato? carrega contexto persistido
//!   ├── 3. Registra a interação (padrões de uso)
//!   ├── 4. Classifica a intenção (cascata de prioridade)
//!   └── 5. Despacha:
//!       ├── Confirm   → commit no ledger, em ordem, at-most-once
//!       ├── Reject    → descarta rascunhos
//!       ├── ReportRequest  → consulta ledger → agrega → entrega
//!       ├── ReportFollowup → reflexão sobre o último relatório
//!       ├── ExpenseDeclaration → NLU → preview (ou fallback NL)
//!       └── FreeChat  → extrator NL + comentário comportamental
//! ```
//!
//! ## Preview Interrompido: Clarificação vs. Abandono
//!
//! Uma resposta durante o preview que não é "sim" nem "não" segue dois
//! ramos explícitos e distintos:
//!
//! - **Clarificação** — há exatamente **um** rascunho pendente com campo
//!   faltando, e o turno traz um complemento (um valor solto como "45",
//!   ou uma sugestão validada do extrator NL): o complemento é mesclado
//!   no rascunho existente e o preview é reapresentado.
//! - **Abandono** — qualquer outro caso: o lote pendente é descartado em
//!   silêncio e a mensagem é reavaliada como um turno novo.
//!
//! ## Commit At-Most-Once
//!
//! No commit, cada rascunho sai da lista pendente **assim que** sua
//! escrita no ledger é confirmada. Uma falha no meio preserva somente os
//! rascunhos ainda não gravados, o estado continua `Preview`, e um novo
//! "sim" retoma de onde parou sem duplicar nada.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::core::{DialogState, DraftExpense, DraftPatch, Report, SessionStore, UserSession};
use crate::error::OracleError;
use crate::ledger::{LedgerRecord, LedgerStore};
use crate::llm::{ExpenseSuggestion, NlExtractor, NlReply, OracleAction};
use crate::nlu::dates::month_in_text;
use crate::nlu::intent::Intent;
use crate::nlu::NluPipeline;
use crate::persistence::ContextStore;
use crate::reply;

/// Orquestrador do diálogo financeiro.
///
/// ## Concorrência
///
/// O orquestrador é imutável e compartilhado (`Arc`) entre todos os
/// handlers. A exclusão mútua é **por usuário**: o mutex da sessão é
/// adquirido na entrada de [`process_message`](Self::process_message) e
/// segurado até a resposta, inclusive durante as chamadas aos
/// colaboradores — duas mensagens do mesmo usuário nunca intercalam.
pub struct Orchestrator {
    /// Pipeline NLU determinístico.
    nlu: Arc<NluPipeline>,
    /// Sessões por usuário.
    sessions: Arc<SessionStore>,
    /// Ledger de despesas confirmadas.
    ledger: Arc<dyn LedgerStore>,
    /// Colaborador de linguagem natural.
    extractor: Arc<dyn NlExtractor>,
    /// Persistência opcional do contexto do usuário.
    contexts: Arc<dyn ContextStore>,
}

impl Orchestrator {
    /// Monta o orquestrador com seus colaboradores.
    pub fn new(
        nlu: Arc<NluPipeline>,
        sessions: Arc<SessionStore>,
        ledger: Arc<dyn LedgerStore>,
        extractor: Arc<dyn NlExtractor>,
        contexts: Arc<dyn ContextStore>,
    ) -> Self {
        Self {
            nlu,
            sessions,
            ledger,
            extractor,
            contexts,
        }
    }

    /// Processa uma mensagem e devolve a resposta do Oráculo.
    ///
    /// Este é o **método principal** — nunca retorna erro; toda falha
    /// interna vira uma resposta textual com a causa registrada em log.
    ///
    /// # Parâmetros
    ///
    /// - `user_id` — identificador do usuário
    /// - `message` — texto bruto da mensagem
    /// - `today` — a data "hoje" (injetada para testabilidade)
    pub async fn process_message(&self, user_id: &str, message: &str, today: NaiveDate) -> String {
        let session_arc = self.sessions.session(user_id);
        let mut session = session_arc.lock().await;

        // Primeiro contato neste processo: carrega o contexto persistido
        if session.patterns.interactions == 0 {
            if let Some(patterns) = self.contexts.load(user_id) {
                tracing::debug!(user_id, "contexto persistido carregado");
                session.patterns = patterns;
            }
        }
        session.patterns.register_interaction();

        let intent =
            self.nlu
                .classify_intent(message, session.state, session.last_report.is_some());
        tracing::debug!(user_id, intent = ?intent, "Intenção classificada");

        // Preview interrompido por algo que não é confirmação nem rejeição:
        // ramo de clarificação ou abandono (ver doc do módulo)
        let mut clarification_target: Option<DraftExpense> = None;
        if session.state == DialogState::Preview
            && !matches!(intent, Intent::Confirm | Intent::Reject)
        {
            let single_incomplete =
                session.pending.len() == 1 && session.pending.drafts()[0].is_incomplete();

            if single_incomplete {
                if let Some(amount) = self.nlu.parse_bare_amount(message) {
                    // Valor solto completa o rascunho pendente
                    session.pending.merge_clarification(DraftPatch {
                        amount: Some(amount),
                        ..Default::default()
                    });
                    return reply::preview(session.pending.drafts());
                }
                // Guarda o alvo: o fallback NL ainda pode clarificá-lo
                clarification_target = Some(session.pending.drafts()[0].clone());
            }

            tracing::debug!(user_id, "preview abandonado por resposta não reconhecida");
            session.abandon_preview();
        }

        match intent {
            Intent::Confirm => self.handle_confirm(&mut session).await,
            Intent::Reject => {
                session.reject_preview();
                reply::REJECT_ACK.to_string()
            }
            Intent::ReportRequest => self.handle_report(&mut session, message, today).await,
            Intent::ReportFollowup => self.handle_followup(&session),
            Intent::ExpenseDeclaration => {
                self.handle_expense(&mut session, message, today, clarification_target)
                    .await
            }
            Intent::FreeChat => {
                self.handle_free_chat(&mut session, message, today, clarification_target)
                    .await
            }
        }
    }

    /// Confirmação do preview: grava cada rascunho no ledger, em ordem.
    ///
    /// Gravou todos → atualiza padrões, persiste contexto, volta a `Idle`.
    /// Falhou no meio → os já gravados saem da lista (at-most-once), os
    /// demais continuam pendentes em `Preview` para nova tentativa.
    async fn handle_confirm(&self, session: &mut UserSession) -> String {
        if session.pending.is_empty() {
            // Nada pendente (não deveria acontecer: o classificador só
            // emite Confirm durante o preview)
            session.state = DialogState::Idle;
            return reply::NOTHING_FOUND.to_string();
        }

        let mut committed: Vec<DraftExpense> = Vec::new();
        while let Some(draft) = session.pending.pop_front() {
            let record = LedgerRecord::from_draft(&session.user_id, &draft);
            match self.ledger.insert(record).await {
                Ok(()) => committed.push(draft),
                Err(e) => {
                    tracing::error!(user_id = %session.user_id, error = %e,
                        "Falha de escrita no ledger durante o commit");
                    // O rascunho que falhou volta para a frente da fila;
                    // o usuário pode repetir o "sim"
                    session.pending.push_front(draft);
                    self.absorb_committed(session, committed);
                    return reply::for_error(&e).to_string();
                }
            }
        }

        self.absorb_committed(session, committed);
        session.finish_commit();
        reply::SAVED.to_string()
    }

    /// Registra despesas efetivamente gravadas nos padrões de uso e
    /// persiste o contexto.
    fn absorb_committed(&self, session: &mut UserSession, committed: Vec<DraftExpense>) {
        if committed.is_empty() {
            return;
        }
        for draft in &committed {
            session.patterns.register_committed(draft);
        }
        if let Err(e) = self.contexts.save(&session.user_id, &session.patterns) {
            tracing::warn!(user_id = %session.user_id, error = %e,
                "Falha ao persistir contexto do usuário");
        }
    }

    /// Pedido de relatório: consulta o ledger pelo período e agrega.
    async fn handle_report(
        &self,
        session: &mut UserSession,
        message: &str,
        today: NaiveDate,
    ) -> String {
        let (start, end, label) = report_period(message, today);

        let rows = match self.ledger.query_range(&session.user_id, start, end).await {
            Ok(rows) => rows,
            Err(e) => {
                tracing::error!(user_id = %session.user_id, error = %e,
                    "Falha na consulta ao ledger");
                return reply::for_error(&e).to_string();
            }
        };

        let aggregated = Report::aggregate(
            rows.iter()
                .map(|r| (r.category.as_str(), r.amount.unwrap_or(0.0))),
        );

        match aggregated {
            // Zero linhas é "sem dados", não um relatório zerado
            None => reply::INSUFFICIENT_DATA.to_string(),
            Some(report) => {
                let text = reply::report(&report, &label);
                session.deliver_report(report);
                text
            }
        }
    }

    /// Reflexão de acompanhamento sobre o último relatório.
    fn handle_followup(&self, session: &UserSession) -> String {
        match &session.last_report {
            Some(report) => reply::report_followup(report),
            None => reply::ASK_CLARIFY.to_string(),
        }
    }

    /// Declaração de despesa: extração estruturada → preview; extração
    /// vazia → fallback no extrator NL.
    async fn handle_expense(
        &self,
        session: &mut UserSession,
        message: &str,
        today: NaiveDate,
        clarification_target: Option<DraftExpense>,
    ) -> String {
        let drafts = self.nlu.extract_expenses(message, today);

        if !drafts.is_empty() {
            tracing::info!(user_id = %session.user_id, count = drafts.len(),
                "Despesas extraídas para preview");
            session.begin_preview(drafts);
            return reply::preview(session.pending.drafts());
        }

        // ExtractionEmpty → o extrator NL tenta entender a mensagem
        let context = financial_context(session);
        match self.extractor.converse(message, context.as_deref()).await {
            Ok(NlReply::Action(OracleAction::RegistrarDespesa { dados, .. })) => {
                match self.validate_suggestion(dados, today, clarification_target) {
                    Some(draft) => {
                        session.begin_preview(vec![draft]);
                        reply::preview(session.pending.drafts())
                    }
                    // Checagem de campo faltante reprovou (sem descrição)
                    None => reply::NOTHING_FOUND.to_string(),
                }
            }
            Ok(NlReply::Action(OracleAction::Conversar { mensagem_usuario })) => mensagem_usuario,
            Ok(NlReply::Text(text)) => text,
            Err(OracleError::MalformedResponse(e)) => {
                // Resposta fora do esquema é tratada como extração vazia
                tracing::warn!(user_id = %session.user_id, error = %e,
                    "Resposta malformada do extrator NL");
                reply::for_error(&OracleError::ExtractionEmpty).to_string()
            }
            Err(e) => {
                tracing::error!(user_id = %session.user_id, error = %e,
                    "Falha do extrator NL");
                reply::LLM_FALLBACK.to_string()
            }
        }
    }

    /// Conversa livre: extrator NL + comentário comportamental.
    async fn handle_free_chat(
        &self,
        session: &mut UserSession,
        message: &str,
        today: NaiveDate,
        clarification_target: Option<DraftExpense>,
    ) -> String {
        let context = financial_context(session);
        let base = match self.extractor.converse(message, context.as_deref()).await {
            Ok(NlReply::Text(text)) => text,
            Ok(NlReply::Action(OracleAction::Conversar { mensagem_usuario })) => mensagem_usuario,
            Ok(NlReply::Action(OracleAction::RegistrarDespesa { dados, .. })) => {
                // O modelo enxergou uma despesa onde a heurística não viu
                match self.validate_suggestion(dados, today, clarification_target) {
                    Some(draft) => {
                        session.begin_preview(vec![draft]);
                        return reply::preview(session.pending.drafts());
                    }
                    None => reply::LLM_FALLBACK.to_string(),
                }
            }
            Err(e) => {
                tracing::warn!(user_id = %session.user_id, error = %e,
                    "Extrator NL indisponível na conversa livre");
                reply::LLM_FALLBACK.to_string()
            }
        };

        reply::decorate_free_chat(&base, &session.patterns)
    }

    /// Valida uma sugestão **não confiável** do extrator NL.
    ///
    /// Categoria passa pela tabela canônica (rótulo desconhecido →
    /// reclassifica pela descrição); data passa pelo resolvedor (ISO ou
    /// expressão em PT-BR, inválida → hoje); valor negativo é descartado.
    /// Sem alvo de clarificação, a descrição é obrigatória — é a
    /// checagem de campo faltante.
    fn validate_suggestion(
        &self,
        dados: ExpenseSuggestion,
        today: NaiveDate,
        clarification_target: Option<DraftExpense>,
    ) -> Option<DraftExpense> {
        let description = dados
            .descricao
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty());

        let patch = DraftPatch {
            category: dados
                .categoria
                .as_deref()
                .and_then(|c| self.nlu.canonical_category(c))
                .map(String::from),
            amount: dados.valor.filter(|v| *v >= 0.0),
            date: dados.data.as_deref().and_then(|d| {
                NaiveDate::parse_from_str(d, "%Y-%m-%d")
                    .ok()
                    .or_else(|| self.nlu.resolve_date(d, today))
            }),
            description,
        };

        match clarification_target {
            // Clarificação: mescla no rascunho que estava pendente
            Some(mut draft) => {
                draft.apply_patch(patch);
                Some(draft)
            }
            // Despesa nova: descrição é obrigatória
            None => {
                let description = patch.description?;
                let category = patch
                    .category
                    .unwrap_or_else(|| self.nlu.classify_category(&description));
                Some(DraftExpense {
                    description,
                    amount: patch.amount,
                    category: Some(category),
                    date: patch.date.unwrap_or(today),
                })
            }
        }
    }
}

/// Resumo do contexto financeiro para o prompt do extrator NL.
///
/// Só vale a pena anexar quando já existe histórico.
fn financial_context(session: &UserSession) -> Option<String> {
    let patterns = &session.patterns;
    if patterns.total_expenses <= 0.0 {
        return None;
    }
    let top = patterns
        .top_category()
        .map(|(c, _)| c.to_string())
        .unwrap_or_else(|| "nenhuma".to_string());
    Some(format!(
        "interações: {}; total registrado: R$ {:.2}; categoria mais frequente: {}",
        patterns.interactions, patterns.total_expenses, top
    ))
}

/// Calcula o período `[início, fim]` (inclusivo) do relatório pedido.
///
/// Um nome de mês na mensagem seleciona aquele mês do ano corrente;
/// sem mês nomeado, o mês atual.
fn report_period(message: &str, today: NaiveDate) -> (NaiveDate, NaiveDate, String) {
    use chrono::Datelike;

    let (month, label) = match month_in_text(message) {
        Some((month, name)) => (month, format!("de {name}")),
        None => (today.month(), "do mês atual".to_string()),
    };

    let year = today.year();
    let start = NaiveDate::from_ymd_opt(year, month, 1)
        .unwrap_or_else(|| NaiveDate::from_ymd_opt(year, 1, 1).expect("data válida"));
    let end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .and_then(|d| d.pred_opt())
    .unwrap_or(start);

    (start, end, label)
}
