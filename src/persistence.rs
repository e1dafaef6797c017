//! # Persistência — Contexto do Usuário em Disco
//!
//! Módulo responsável por serializar/desserializar os
//! [`UsagePatterns`](crate::core::UsagePatterns) de cada usuário como JSON
//! em `data/contexts.json`, para que a memória contextual sobreviva a
//! reinícios do processo.
//!
//! ## O que É (e o que Não É) Persistido
//!
//! Somente os padrões de uso. O estado do diálogo (`state`, rascunhos
//! pendentes, último relatório) é deliberadamente volátil: um preview
//! pela metade não deve ressuscitar dias depois num processo novo.
//!
//! ## Quando o Contexto é Salvo?
//!
//! - Após cada commit de despesas confirmadas
//!
//! E carregado uma única vez, no primeiro contato de cada usuário.
//!
//! ## ⚠️ Atomicidade
//!
//! A escrita **não é atômica** — crash durante escrita pode corromper
//! o arquivo. Aceitável para este serviço; produção usaria write-rename.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::core::UsagePatterns;

/// Nome do arquivo de contexto dentro do diretório de dados.
const CONTEXTS_FILE: &str = "contexts.json";

/// Colaborador opcional de persistência do contexto do usuário.
///
/// O trait permite que os testes do orquestrador troquem o arquivo por
/// um mapa em memória.
pub trait ContextStore: Send + Sync {
    /// Carrega os padrões persistidos de um usuário, se existirem.
    fn load(&self, user_id: &str) -> Option<UsagePatterns>;

    /// Salva os padrões de um usuário.
    fn save(&self, user_id: &str, patterns: &UsagePatterns) -> Result<()>;
}

/// Implementação em arquivo único: `user_id → UsagePatterns`,
/// pretty-printed para inspeção manual.
pub struct FileContextStore {
    /// Caminho completo de `contexts.json`.
    path: PathBuf,
    /// Cache em memória do conteúdo do arquivo.
    cache: parking_lot::Mutex<HashMap<String, UsagePatterns>>,
}

impl FileContextStore {
    /// Abre (ou inicia vazio) o armazém de contexto em `dir`.
    ///
    /// Arquivo ausente inicia um mapa vazio; arquivo corrompido é
    /// descartado com um aviso — perder a memória contextual é melhor
    /// que impedir o serviço de subir.
    pub fn open(dir: impl AsRef<Path>) -> Self {
        let path = dir.as_ref().join(CONTEXTS_FILE);
        let cache = match std::fs::read_to_string(&path) {
            Ok(json) => match serde_json::from_str(&json) {
                Ok(map) => map,
                Err(e) => {
                    tracing::warn!(error = %e, "contexts.json corrompido, iniciando vazio");
                    HashMap::new()
                }
            },
            Err(_) => {
                tracing::info!(path = %path.display(), "Nenhum contexto persistido, iniciando vazio");
                HashMap::new()
            }
        };
        Self {
            path,
            cache: parking_lot::Mutex::new(cache),
        }
    }

    /// Escreve o mapa inteiro em disco.
    fn flush(&self, cache: &HashMap<String, UsagePatterns>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent).context("Falha ao criar o diretório de dados")?;
        }
        let json =
            serde_json::to_string_pretty(cache).context("Falha ao serializar contexts.json")?;
        std::fs::write(&self.path, json).context("Falha ao escrever contexts.json")?;
        Ok(())
    }
}

impl ContextStore for FileContextStore {
    fn load(&self, user_id: &str) -> Option<UsagePatterns> {
        self.cache.lock().get(user_id).cloned()
    }

    fn save(&self, user_id: &str, patterns: &UsagePatterns) -> Result<()> {
        let mut cache = self.cache.lock();
        cache.insert(user_id.to_string(), patterns.clone());
        self.flush(&cache)
    }
}
