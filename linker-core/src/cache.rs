//! # Cache de Resolução
//!
//! Memoriza, durante uma execução, o resultado da resolução de cada menção
//! (página escolhida ou "sem correspondência"). Evita repetir consultas à
//! base de conhecimento para menções já vistas.
//!
//! ## Escrita única
//!
//! Uma chave, depois de registrada, nunca é sobrescrita. Isso impede que uma
//! consulta que falhou mais tarde (por timeout, por exemplo) apague uma
//! resolução válida obtida antes. O resultado negativo também é definitivo:
//! ocorrências futuras da mesma chave não consultam a base de novo.
//!
//! ## Escopo
//!
//! - [`ResolutionCache`]: pertence a um único worker (padrão).
//! - [`SharedResolutionCache`]: um cache atrás de um `RwLock`, compartilhado
//!   por todos os workers via `Arc`.

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::error::Result;
use crate::mention::MentionKey;

/// Estado de uma chave no cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheState {
    /// Nunca consultada nesta execução.
    Unseen,
    /// Resolvida para uma página.
    Resolved(String),
    /// Consultada sem sucesso; não será consultada de novo.
    Unresolved,
}

/// Operações comuns aos dois escopos de cache.
pub trait ResolutionStore {
    fn lookup(&mut self, key: &MentionKey) -> CacheState;

    /// Registra a resolução de `key`. Retorna `false` (e mantém o valor
    /// antigo) se a chave já havia sido registrada.
    fn record(&mut self, key: &MentionKey, page: Option<String>) -> bool;
}

/// Contadores de uso do cache.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    /// Chamadas a `record` ignoradas porque a chave já existia.
    pub rejected_writes: u64,
}

/// Cache de resolução de um worker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResolutionCache {
    /// `None` marca "sem correspondência".
    entries: HashMap<MentionKey, Option<String>>,
    #[serde(skip)]
    stats: CacheStats,
}

impl ResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Quantas chaves terminaram sem correspondência.
    pub fn unresolved_count(&self) -> usize {
        self.entries.values().filter(|v| v.is_none()).count()
    }

    /// Serializa o conteúdo para JSON (as estatísticas não são incluídas).
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Restaura um cache salvo com [`ResolutionCache::to_json`].
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    fn peek(&self, key: &MentionKey) -> CacheState {
        match self.entries.get(key) {
            None => CacheState::Unseen,
            Some(Some(page)) => CacheState::Resolved(page.clone()),
            Some(None) => CacheState::Unresolved,
        }
    }
}

impl ResolutionStore for ResolutionCache {
    fn lookup(&mut self, key: &MentionKey) -> CacheState {
        let state = self.peek(key);
        if state == CacheState::Unseen {
            self.stats.misses += 1;
        } else {
            self.stats.hits += 1;
        }
        state
    }

    fn record(&mut self, key: &MentionKey, page: Option<String>) -> bool {
        if self.entries.contains_key(key) {
            self.stats.rejected_writes += 1;
            trace!(mention = %key, "Ignoring second write to resolution cache");
            return false;
        }
        self.entries.insert(key.clone(), page);
        true
    }
}

/// Cache compartilhado entre workers. Clones apontam para o mesmo conteúdo.
#[derive(Debug, Clone, Default)]
pub struct SharedResolutionCache {
    inner: Arc<RwLock<ResolutionCache>>,
}

impl SharedResolutionCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compartilha um cache já preenchido (ex: restaurado de um snapshot).
    pub fn from_cache(cache: ResolutionCache) -> Self {
        Self {
            inner: Arc::new(RwLock::new(cache)),
        }
    }

    /// Cópia do conteúdo atual.
    pub fn snapshot(&self) -> ResolutionCache {
        self.inner.read().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}

impl ResolutionStore for SharedResolutionCache {
    fn lookup(&mut self, key: &MentionKey) -> CacheState {
        self.inner.write().lookup(key)
    }

    fn record(&mut self, key: &MentionKey, page: Option<String>) -> bool {
        self.inner.write().record(key, page)
    }
}
