//! # Extração de Relações
//!
//! Interface comum às estratégias de extração. Cada estratégia recebe uma
//! sentença anotada e devolve triplas entre **textos de menção**; a ligação
//! com páginas (e o descarte de triplas com pontas não resolvidas) fica a
//! cargo do [`crate::pipeline::Linker`].
//!
//! | Estratégia                  | Implementação                                   |
//! |-----------------------------|-------------------------------------------------|
//! | `pattern`                   | [`PatternExtractor`]                            |
//! | `dependency_path`           | [`DependencyPathExtractor`]                     |
//! | `dependency_path_strict`    | [`DependencyPathExtractor`] com `strict = true` |

use serde::{Deserialize, Serialize};

use crate::annotation::Sentence;
use crate::config::ExtractionStrategy;
use crate::dependency::DependencyPathExtractor;
use crate::patterns::PatternExtractor;

/// Tripla entre menções, antes da resolução.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MentionRelation {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

impl MentionRelation {
    pub fn new(subject: impl Into<String>, relation: impl Into<String>, object: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            relation: relation.into(),
            object: object.into(),
        }
    }
}

/// Tripla final: sujeito e objeto são páginas da base de conhecimento.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationTriple {
    pub subject: String,
    pub relation: String,
    pub object: String,
}

/// Estratégia de extração de relações numa sentença.
pub trait RelationExtractor: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, sentence: &Sentence) -> Vec<MentionRelation>;
}

/// Instancia a estratégia configurada.
pub fn from_strategy(strategy: ExtractionStrategy) -> Box<dyn RelationExtractor> {
    match strategy {
        ExtractionStrategy::Pattern => Box::new(PatternExtractor::new()),
        ExtractionStrategy::DependencyPath => Box::new(DependencyPathExtractor::new(false)),
        ExtractionStrategy::DependencyPathStrict => Box::new(DependencyPathExtractor::new(true)),
    }
}
