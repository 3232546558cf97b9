//! # linker-core: Ligação de Entidades e Extração de Relações
//!
//! Este crate transforma documentos já anotados por um serviço de NLP
//! (tokens, POS, dependências e spans de entidades) em fatos estruturados:
//!
//! - **Entidades ligadas**: cada menção ("Michael Jordan", "Paris") associada
//!   a uma página da base de conhecimento.
//! - **Relações**: triplas (sujeito, frase, objeto) entre duas entidades
//!   ligadas, por exemplo `(Paris, "is in", France)`.
//!
//! ## Arquitetura do Sistema
//!
//! 1.  **Entrada**: [`AnnotatedDocument`] (JSON Lines, ver [`annotation`]).
//! 2.  **Normalização** ([`mention`]): a menção vira uma [`MentionKey`].
//! 3.  **Cache** ([`cache`]): menções já vistas não são consultadas de novo.
//! 4.  **Candidatos** ([`candidates`], [`kb`]): consulta à base (DBpedia via
//!     SPARQL, ou em memória) com repetição em falhas transitórias.
//! 5.  **Popularidade** ([`popularity`]): contagem de backlinks quando a base
//!     não a devolve.
//! 6.  **Desambiguação** ([`disambiguation`]): escolhe um candidato.
//! 7.  **Relações** ([`relation`]): por padrões de POS ([`patterns`]) ou por
//!     caminho de dependência ([`dependency`]).
//! 8.  **Saída** ([`records`]): linhas `ENTITY:` e `RELATION:`.
//!
//! ## Exemplo de Uso
//!
//! ```rust
//! use linker_core::{corpus, Linker, LinkerConfig, ResolutionCache};
//!
//! // 1. Instancia o orquestrador com a base em memória do corpus de exemplo
//! let linker = Linker::new(
//!     Box::new(corpus::demo_knowledge_base()),
//!     Some(Box::new(corpus::demo_popularity())),
//!     &LinkerConfig::default(),
//! );
//!
//! // 2. Processa os documentos com um cache de resolução
//! let mut cache = ResolutionCache::new();
//! for doc in corpus::demo_documents() {
//!     let result = linker.process_document(&doc, &mut cache);
//!     for line in result.lines() {
//!         println!("{line}");
//!     }
//! }
//! ```
//!
//! ## Módulos Principais
//!
//! - [`pipeline`]: Orquestrador que conecta todos os estágios.
//! - [`config`]: Configuração em TOML.
//! - [`scoring`]: Precisão, revocação e F1 contra um arquivo gold.
//! - [`corpus`]: Documentos anotados e base de conhecimento de exemplo.

pub mod annotation;
pub mod cache;
pub mod candidates;
pub mod config;
pub mod corpus;
pub mod dependency;
pub mod disambiguation;
pub mod error;
pub mod kb;
pub mod mention;
pub mod patterns;
pub mod pipeline;
pub mod popularity;
pub mod records;
pub mod relation;
pub mod scoring;

pub use annotation::{AnnotatedDocument, EntityMention, EntityType, Pos, Sentence, Token};
pub use cache::{CacheState, ResolutionCache, ResolutionStore, SharedResolutionCache};
pub use candidates::{Candidate, KnowledgeBase};
pub use config::LinkerConfig;
pub use error::{LinkerError, Result};
pub use mention::MentionKey;
pub use pipeline::{DocumentResult, LinkEvent, Linker};
pub use relation::{MentionRelation, RelationExtractor, RelationTriple};
