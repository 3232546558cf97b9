//! # Geração de Candidatos
//!
//! Dada uma menção normalizada e seu tipo, consulta a base de conhecimento e
//! devolve a lista (não ordenada, possivelmente vazia) de itens que podem ser
//! o referente da menção.
//!
//! A consulta cobre várias formas de superfície de uma vez (literal e title
//! case) e todas as estratégias de busca do backend: rótulo exato,
//! redirecionamentos e páginas de desambiguação. O resultado é a união de
//! tudo, sem repetições de página.

use std::collections::HashSet;
use std::thread;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::annotation::EntityType;
use crate::config::RetryConfig;
use crate::error::Result;
use crate::mention::{surface_variants, MentionKey};

/// Um item da base de conhecimento candidato a referente de uma menção.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    /// Nome canônico (rótulo) do item. Pode vir vazio.
    pub name: String,
    /// Referência da página alvo (ex: URL da Wikipedia).
    pub page: String,
    /// Identificador do item na base (ex: URI do DBpedia).
    pub item: String,
    /// Número de páginas que apontam para este item, se conhecido.
    pub referrals: Option<u64>,
}

impl Candidate {
    pub fn new(name: impl Into<String>, page: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            page: page.into(),
            item: item.into(),
            referrals: None,
        }
    }

    pub fn with_referrals(mut self, referrals: u64) -> Self {
        self.referrals = Some(referrals);
        self
    }

    /// Contagem usada no ranking; ausente conta como zero.
    pub fn referral_count(&self) -> u64 {
        self.referrals.unwrap_or(0)
    }
}

/// Consulta enviada ao backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuery {
    /// Formas de superfície, literal primeiro.
    pub variants: Vec<String>,
    /// Classe da ontologia que os itens devem ter (ex: `dbo:Person`).
    pub class: &'static str,
}

/// Base de conhecimento externa.
///
/// "Nada encontrado" é um `Ok(vec![])`, nunca um erro.
pub trait KnowledgeBase: Send + Sync {
    fn lookup(&self, query: &CandidateQuery) -> Result<Vec<Candidate>>;
}

/// Número fixo de tentativas com espera constante entre elas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl RetryPolicy {
    pub fn new(max_attempts: u32, backoff: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            backoff,
        }
    }

    /// Executa `op` até dar certo, até um erro não transitório ou até esgotar
    /// as tentativas; neste caso devolve o último erro.
    pub fn run<T>(&self, what: &str, mut op: impl FnMut() -> Result<T>) -> Result<T> {
        let mut attempt = 1;
        loop {
            match op() {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() && attempt < self.max_attempts => {
                    warn!(what, attempt, error = %e, "Transient failure, will retry");
                    thread::sleep(self.backoff);
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for RetryPolicy {
    fn from(config: &RetryConfig) -> Self {
        RetryPolicy::new(config.max_attempts, config.backoff())
    }
}

/// Gera candidatos para menções usando um [`KnowledgeBase`].
pub struct CandidateGenerator {
    kb: Box<dyn KnowledgeBase>,
    retry: RetryPolicy,
}

impl CandidateGenerator {
    pub fn new(kb: Box<dyn KnowledgeBase>, retry: RetryPolicy) -> Self {
        Self { kb, retry }
    }

    /// Monta a consulta para uma menção; `None` se o tipo não é ligável.
    pub fn build_query(key: &MentionKey, label: EntityType) -> Option<CandidateQuery> {
        Some(CandidateQuery {
            variants: surface_variants(key),
            class: label.kb_class()?,
        })
    }

    /// Consulta a base com repetição em falhas transitórias.
    ///
    /// Tipos não ligáveis retornam `Ok(vec![])` sem tocar na rede.
    pub fn generate(&self, key: &MentionKey, label: EntityType) -> Result<Vec<Candidate>> {
        let Some(query) = Self::build_query(key, label) else {
            return Ok(Vec::new());
        };

        let raw = self.retry.run("knowledge base", || self.kb.lookup(&query))?;

        let mut seen = HashSet::new();
        let candidates: Vec<Candidate> = raw
            .into_iter()
            .filter(|c| !c.page.is_empty() && seen.insert(c.page.clone()))
            .collect();

        debug!(mention = %key, %label, count = candidates.len(), "Candidates generated");
        Ok(candidates)
    }
}
