//! # Pipeline de Ligação: Orquestrador com Eventos Observáveis
//!
//! Para cada documento anotado:
//!
//! 1. Resolve cada menção ligável (normalização → cache → candidatos →
//!    popularidade → desambiguação), gravando o resultado no cache.
//! 2. Extrai relações sentença a sentença com a estratégia configurada.
//! 3. Mantém só as triplas cujas duas pontas foram resolvidas no documento.
//!
//! Cada passo emite um [`LinkEvent`] num canal `mpsc`, permitindo que o
//! servidor WebSocket transmita o progresso em tempo real.
//!
//! Em lote ([`Linker::run_corpus`]) os documentos são divididos em um lote
//! contíguo por worker de um pool rayon; cada worker recebe seu próprio cache
//! vazio (ou um clone do cache compartilhado, conforme
//! [`CacheScope`]) e devolve seus resultados, ordenados ao final pela chave
//! do documento.

use std::collections::{HashMap, HashSet};
use std::sync::mpsc;
use std::time::Instant;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use crate::annotation::{AnnotatedDocument, EntityMention, EntityType};
use crate::cache::{CacheState, ResolutionCache, ResolutionStore, SharedResolutionCache};
use crate::candidates::{CandidateGenerator, KnowledgeBase, RetryPolicy};
use crate::config::{CacheScope, LinkerConfig, RuntimeConfig};
use crate::disambiguation::Disambiguator;
use crate::error::Result;
use crate::kb::SparqlKnowledgeBase;
use crate::mention::MentionKey;
use crate::popularity::{fill_referrals, Popularity, WikipediaBacklinks};
use crate::records::{EntityRecord, RelationRecord};
use crate::relation::{from_strategy, RelationExtractor, RelationTriple};

/// Uma menção ligada a uma página.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkedEntity {
    /// Primeira forma de superfície vista no documento.
    pub mention: String,
    pub key: MentionKey,
    pub label: EntityType,
    pub page: String,
}

/// Resultado de um documento.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentResult {
    pub key: String,
    pub entities: Vec<LinkedEntity>,
    pub relations: Vec<RelationTriple>,
}

impl DocumentResult {
    pub fn empty(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            ..Default::default()
        }
    }

    pub fn entity_records(&self) -> impl Iterator<Item = EntityRecord> + '_ {
        self.entities.iter().map(|e| EntityRecord {
            document: self.key.clone(),
            mention: e.mention.clone(),
            page: e.page.clone(),
        })
    }

    pub fn relation_records(&self) -> impl Iterator<Item = RelationRecord> + '_ {
        self.relations.iter().map(|r| RelationRecord {
            document: self.key.clone(),
            subject: r.subject.clone(),
            object: r.object.clone(),
            relation: r.relation.clone(),
            relation_id: None,
        })
    }

    /// Linhas de saída: entidades primeiro, depois relações.
    pub fn lines(&self) -> Vec<String> {
        self.entity_records()
            .map(|r| r.to_string())
            .chain(self.relation_records().map(|r| r.to_string()))
            .collect()
    }
}

/// Eventos emitidos durante o processamento de um documento.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum LinkEvent {
    /// Menção resolvida por consulta à base.
    MentionResolved {
        mention: String,
        key: MentionKey,
        page: String,
        candidates: usize,
    },
    /// Menção já vista nesta execução; `page` é `None` se ficou sem
    /// correspondência da primeira vez.
    CacheHit {
        mention: String,
        key: MentionKey,
        page: Option<String>,
    },
    /// Consulta sem candidatos (ou falha na consulta).
    MentionUnresolved {
        mention: String,
        key: MentionKey,
    },
    /// Tripla com as duas pontas resolvidas.
    RelationFound {
        subject: String,
        relation: String,
        object: String,
    },
    Done {
        result: DocumentResult,
        processing_ms: u64,
    },
}

/// O orquestrador.
///
/// # Modos de Uso
/// - **Sync**: [`Linker::process_document`] para um documento.
/// - **Streaming**: [`Linker::process_streaming`] para UIs reativas.
/// - **Lote**: [`Linker::run_corpus`] para um corpus inteiro em paralelo.
pub struct Linker {
    generator: CandidateGenerator,
    popularity: Option<Box<dyn Popularity>>,
    retry: RetryPolicy,
    disambiguator: Disambiguator,
    extractor: Box<dyn RelationExtractor>,
    runtime: RuntimeConfig,
}

impl Linker {
    /// Monta o orquestrador com os serviços remotos descritos na config.
    pub fn from_config(config: &LinkerConfig) -> Result<Self> {
        config.validate()?;
        let kb = SparqlKnowledgeBase::new(&config.knowledge_base)?;
        let popularity: Option<Box<dyn Popularity>> = if config.popularity.enabled {
            Some(Box::new(WikipediaBacklinks::new(&config.popularity)?))
        } else {
            None
        };
        Ok(Self::new(Box::new(kb), popularity, config))
    }

    /// Monta o orquestrador com backends arbitrários (ex: em memória).
    pub fn new(kb: Box<dyn KnowledgeBase>, popularity: Option<Box<dyn Popularity>>, config: &LinkerConfig) -> Self {
        let retry = RetryPolicy::from(&config.retry);
        Self {
            generator: CandidateGenerator::new(kb, retry),
            popularity,
            retry,
            disambiguator: Disambiguator::new(),
            extractor: from_strategy(config.extraction.strategy),
            runtime: config.runtime.clone(),
        }
    }

    /// Nome da estratégia de extração em uso.
    pub fn extractor_name(&self) -> &'static str {
        self.extractor.name()
    }

    /// Processa um documento de forma síncrona.
    pub fn process_document<S: ResolutionStore + ?Sized>(&self, doc: &AnnotatedDocument, store: &mut S) -> DocumentResult {
        let (tx, rx) = mpsc::channel();
        self.process_streaming(doc, store, tx);

        // Consome todos os eventos até o fim
        let mut result = None;
        while let Ok(event) = rx.recv() {
            if let LinkEvent::Done { result: r, .. } = event {
                result = Some(r);
            }
        }
        result.unwrap_or_else(|| DocumentResult::empty(&doc.key))
    }

    /// Processa um documento enviando eventos de progresso por `tx`.
    ///
    /// # Fluxo de Eventos
    /// 1. `MentionResolved` / `CacheHit` / `MentionUnresolved` (por menção).
    /// 2. `RelationFound` (por tripla mantida).
    /// 3. `Done`: resultado consolidado.
    pub fn process_streaming<S: ResolutionStore + ?Sized>(
        &self,
        doc: &AnnotatedDocument,
        store: &mut S,
        tx: mpsc::Sender<LinkEvent>,
    ) {
        let start = Instant::now();
        let mut result = DocumentResult::empty(&doc.key);

        if doc.is_empty() {
            let _ = tx.send(LinkEvent::Done {
                result,
                processing_ms: start.elapsed().as_millis() as u64,
            });
            return;
        }

        // === Passo 1: Resolução das menções ===
        let mut resolved: HashMap<MentionKey, String> = HashMap::new();
        let mut seen: HashSet<MentionKey> = HashSet::new();
        for mention in doc.mentions() {
            if !mention.label.is_linkable() {
                continue;
            }
            let Some(key) = MentionKey::new(&mention.text) else {
                continue;
            };
            if !seen.insert(key.clone()) {
                continue;
            }
            if let Some(page) = self.resolve_mention(mention, &key, store, &tx) {
                result.entities.push(LinkedEntity {
                    mention: mention.text.clone(),
                    key: key.clone(),
                    label: mention.label,
                    page: page.clone(),
                });
                resolved.insert(key, page);
            }
        }

        // === Passo 2: Relações entre entidades resolvidas ===
        let mut emitted: HashSet<RelationTriple> = HashSet::new();
        for sentence in &doc.sentences {
            for relation in self.extractor.extract(sentence) {
                let pages = MentionKey::new(&relation.subject)
                    .and_then(|k| resolved.get(&k))
                    .zip(MentionKey::new(&relation.object).and_then(|k| resolved.get(&k)));
                let Some((subject, object)) = pages else {
                    debug!(doc = %doc.key, subject = %relation.subject, object = %relation.object,
                        "Relation dropped, endpoint not resolved");
                    continue;
                };
                let triple = RelationTriple {
                    subject: subject.clone(),
                    relation: relation.relation,
                    object: object.clone(),
                };
                if emitted.insert(triple.clone()) {
                    let _ = tx.send(LinkEvent::RelationFound {
                        subject: triple.subject.clone(),
                        relation: triple.relation.clone(),
                        object: triple.object.clone(),
                    });
                    result.relations.push(triple);
                }
            }
        }

        debug!(
            doc = %doc.key,
            entities = result.entities.len(),
            relations = result.relations.len(),
            "Document processed"
        );
        let _ = tx.send(LinkEvent::Done {
            result,
            processing_ms: start.elapsed().as_millis() as u64,
        });
    }

    /// Resolve uma menção consultando primeiro o cache.
    ///
    /// Falhas da base já repetidas pela [`RetryPolicy`] contam como "sem
    /// candidatos" e também são gravadas no cache.
    fn resolve_mention<S: ResolutionStore + ?Sized>(
        &self,
        mention: &EntityMention,
        key: &MentionKey,
        store: &mut S,
        tx: &mpsc::Sender<LinkEvent>,
    ) -> Option<String> {
        match store.lookup(key) {
            CacheState::Resolved(page) => {
                let _ = tx.send(LinkEvent::CacheHit {
                    mention: mention.text.clone(),
                    key: key.clone(),
                    page: Some(page.clone()),
                });
                return Some(page);
            }
            CacheState::Unresolved => {
                let _ = tx.send(LinkEvent::CacheHit {
                    mention: mention.text.clone(),
                    key: key.clone(),
                    page: None,
                });
                return None;
            }
            CacheState::Unseen => {}
        }

        let mut candidates = match self.generator.generate(key, mention.label) {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(mention = %key, error = %e, "Candidate lookup failed, treating as no match");
                Vec::new()
            }
        };
        if let Some(popularity) = &self.popularity {
            if self.disambiguator.needs_referrals(key.as_str(), &candidates) {
                fill_referrals(&mut candidates, popularity.as_ref(), &self.retry);
            }
        }

        let page = self
            .disambiguator
            .resolve(key.as_str(), &candidates)
            .map(|c| c.page.clone());
        store.record(key, page.clone());

        match &page {
            Some(page) => {
                debug!(mention = %key, %page, candidates = candidates.len(), "Mention resolved");
                let _ = tx.send(LinkEvent::MentionResolved {
                    mention: mention.text.clone(),
                    key: key.clone(),
                    page: page.clone(),
                    candidates: candidates.len(),
                });
            }
            None => {
                debug!(mention = %key, "Mention unresolved");
                let _ = tx.send(LinkEvent::MentionUnresolved {
                    mention: mention.text.clone(),
                    key: key.clone(),
                });
            }
        }
        page
    }

    /// Processa um lote com um único cache.
    fn process_batch<S: ResolutionStore + ?Sized>(&self, batch: &[AnnotatedDocument], store: &mut S) -> Vec<DocumentResult> {
        batch.iter().map(|doc| self.process_document(doc, store)).collect()
    }

    /// Processa um corpus inteiro em paralelo.
    ///
    /// Só a construção do pool pode falhar; problemas dentro de um documento
    /// viram "sem correspondência" ou "sem relação".
    pub fn run_corpus(&self, documents: Vec<AnnotatedDocument>) -> Result<Vec<DocumentResult>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }
        let workers = self.runtime.worker_count().clamp(1, documents.len());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("linker-worker-{i}"))
            .build()?;

        let total = documents.len();
        let batches = split_batches(documents, workers);
        let scope = self.runtime.cache_scope;
        info!(documents = total, workers, batches = batches.len(), ?scope, "Processing corpus");

        let shared = SharedResolutionCache::new();
        let start = Instant::now();
        let mut results: Vec<DocumentResult> = pool.install(|| {
            batches
                .par_iter()
                .enumerate()
                .flat_map_iter(|(worker, batch)| match scope {
                    CacheScope::PerWorker => {
                        let mut cache = ResolutionCache::new();
                        let results = self.process_batch(batch, &mut cache);
                        let stats = cache.stats();
                        debug!(worker, hits = stats.hits, misses = stats.misses, "Worker finished");
                        results
                    }
                    CacheScope::Shared => {
                        let mut cache = shared.clone();
                        self.process_batch(batch, &mut cache)
                    }
                })
                .collect()
        });

        results.sort_by(|a, b| a.key.cmp(&b.key));
        info!(
            documents = results.len(),
            elapsed_ms = start.elapsed().as_millis() as u64,
            "Corpus processed"
        );
        Ok(results)
    }
}

/// Divide `items` em até `n` lotes contíguos de tamanho parecido.
fn split_batches<T>(items: Vec<T>, n: usize) -> Vec<Vec<T>> {
    let size = items.len().div_ceil(n.max(1)).max(1);
    let mut batches = Vec::new();
    let mut items = items.into_iter();
    loop {
        let batch: Vec<T> = items.by_ref().take(size).collect();
        if batch.is_empty() {
            break;
        }
        batches.push(batch);
    }
    batches
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use crate::annotation::{Pos, Sentence, Token};
    use crate::candidates::{Candidate, CandidateQuery};
    use crate::config::ExtractionStrategy;
    use crate::error::LinkerError;
    use crate::kb::{KbRecord, StaticKnowledgeBase};

    /// Base que sempre estoura o tempo limite.
    #[derive(Default)]
    struct UnreachableKb {
        calls: AtomicUsize,
    }

    impl KnowledgeBase for UnreachableKb {
        fn lookup(&self, _query: &CandidateQuery) -> Result<Vec<Candidate>> {
            self.calls.fetch_add(1, Ordering::Relaxed);
            Err(LinkerError::Timeout { service: "kb" })
        }
    }

    impl KnowledgeBase for Arc<UnreachableKb> {
        fn lookup(&self, query: &CandidateQuery) -> Result<Vec<Candidate>> {
            self.as_ref().lookup(query)
        }
    }

    /// Conta as consultas de popularidade.
    struct CountingPopularity(Arc<AtomicUsize>);

    impl Popularity for CountingPopularity {
        fn referrals(&self, _page: &str) -> Result<u64> {
            self.0.fetch_add(1, Ordering::Relaxed);
            Ok(10)
        }
    }

    fn record(name: &str, class: &str, referrals: u64) -> KbRecord {
        let slug = name.replace(' ', "_");
        KbRecord {
            item: format!("http://dbpedia.org/resource/{slug}"),
            name: name.to_string(),
            page: format!("http://en.wikipedia.org/wiki/{slug}"),
            class: class.to_string(),
            aliases: vec![],
            referrals: Some(referrals),
        }
    }

    fn kb() -> Arc<StaticKnowledgeBase> {
        Arc::new(StaticKnowledgeBase::new(vec![
            record("Paris", "geo:SpatialThing", 900),
            record("France", "geo:SpatialThing", 1200),
        ]))
    }

    fn linker(kb: Arc<StaticKnowledgeBase>, config: &LinkerConfig) -> Linker {
        Linker::new(Box::new(kb), None, config)
    }

    /// "Paris is in France" (+ "Atlantis" sem página quando `with_unknown`).
    fn paris_doc(key: &str, with_unknown: bool) -> AnnotatedDocument {
        let mut tokens = vec![
            Token::new("Paris", Pos::Propn, "nsubj", 1),
            Token::new("is", Pos::Verb, "ROOT", 1),
            Token::new("in", Pos::Adp, "prep", 1),
            Token::new("France", Pos::Propn, "pobj", 2),
        ];
        let mut entities = vec![
            EntityMention::new("Paris", EntityType::Gpe, 0, 1),
            EntityMention::new("France", EntityType::Gpe, 3, 4),
        ];
        if with_unknown {
            tokens[3] = Token::new("Atlantis", Pos::Propn, "pobj", 2);
            entities[1] = EntityMention::new("Atlantis", EntityType::Gpe, 3, 4);
        }
        AnnotatedDocument {
            key: key.to_string(),
            sentences: vec![Sentence { tokens, entities }],
        }
    }

    #[test]
    fn test_process_document_links_and_relates() {
        let linker = linker(kb(), &LinkerConfig::default());
        let mut cache = ResolutionCache::new();
        let result = linker.process_document(&paris_doc("doc-1", false), &mut cache);

        assert_eq!(result.entities.len(), 2);
        assert_eq!(result.entities[0].page, "http://en.wikipedia.org/wiki/Paris");
        assert_eq!(
            result.relations,
            vec![RelationTriple {
                subject: "http://en.wikipedia.org/wiki/Paris".into(),
                relation: "is in".into(),
                object: "http://en.wikipedia.org/wiki/France".into(),
            }]
        );
        assert_eq!(
            result.lines(),
            vec![
                "ENTITY: doc-1\tParis\thttp://en.wikipedia.org/wiki/Paris",
                "ENTITY: doc-1\tFrance\thttp://en.wikipedia.org/wiki/France",
                "RELATION: doc-1\thttp://en.wikipedia.org/wiki/Paris\thttp://en.wikipedia.org/wiki/France\tis in",
            ]
        );
    }

    #[test]
    fn test_unresolved_object_drops_relation() {
        let linker = linker(kb(), &LinkerConfig::default());
        let result = linker.process_document(&paris_doc("doc-1", true), &mut ResolutionCache::new());
        assert_eq!(result.entities.len(), 1);
        assert!(result.relations.is_empty());
    }

    #[test]
    fn test_cache_avoids_repeated_lookups() {
        let kb = kb();
        let linker = linker(Arc::clone(&kb), &LinkerConfig::default());
        let mut cache = ResolutionCache::new();
        linker.process_document(&paris_doc("doc-1", true), &mut cache);
        linker.process_document(&paris_doc("doc-2", true), &mut cache);
        // Paris e Atlantis: uma consulta cada, inclusive a negativa.
        assert_eq!(kb.lookup_count(), 2);
        assert_eq!(cache.unresolved_count(), 1);
    }

    #[test]
    fn test_streaming_events() {
        let linker = linker(kb(), &LinkerConfig::default());
        let mut cache = ResolutionCache::new();
        linker.process_document(&paris_doc("warm", false), &mut cache);

        let (tx, rx) = mpsc::channel();
        linker.process_streaming(&paris_doc("doc-2", false), &mut cache, tx);
        let events: Vec<LinkEvent> = rx.try_iter().collect();

        assert!(matches!(&events[0], LinkEvent::CacheHit { page: Some(_), .. }));
        assert!(events.iter().any(|e| matches!(e, LinkEvent::RelationFound { .. })));
        assert!(matches!(events.last(), Some(LinkEvent::Done { .. })), "Último evento deve ser Done");
    }

    #[test]
    fn test_skips_unlinkable_and_duplicate_mentions() {
        let linker = linker(kb(), &LinkerConfig::default());
        let doc = AnnotatedDocument {
            key: "doc".into(),
            sentences: vec![Sentence {
                tokens: vec![
                    Token::new("Paris", Pos::Propn, "ROOT", 0),
                    Token::new("PARIS", Pos::Propn, "appos", 0),
                    Token::new("2002", Pos::Num, "npadvmod", 0),
                ],
                entities: vec![
                    EntityMention::new("Paris", EntityType::Gpe, 0, 1),
                    EntityMention::new("PARIS", EntityType::Gpe, 1, 2),
                    EntityMention::new("2002", EntityType::Date, 2, 3),
                ],
            }],
        };
        let result = linker.process_document(&doc, &mut ResolutionCache::new());
        assert_eq!(result.entities.len(), 1);
        assert_eq!(result.entities[0].mention, "Paris");
    }

    #[test]
    fn test_empty_document() {
        let linker = linker(kb(), &LinkerConfig::default());
        let doc = AnnotatedDocument {
            key: "empty".into(),
            sentences: vec![],
        };
        let result = linker.process_document(&doc, &mut ResolutionCache::new());
        assert_eq!(result, DocumentResult::empty("empty"));
    }

    #[test]
    fn test_run_corpus_sorted_by_key() {
        let mut config = LinkerConfig::default();
        config.runtime.workers = Some(3);
        let linker = linker(kb(), &config);
        let docs = vec![
            paris_doc("doc-c", false),
            paris_doc("doc-a", true),
            paris_doc("doc-b", false),
            paris_doc("doc-d", false),
        ];
        let results = linker.run_corpus(docs).unwrap();
        let keys: Vec<_> = results.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(keys, vec!["doc-a", "doc-b", "doc-c", "doc-d"]);
        assert!(results[0].relations.is_empty());
        assert_eq!(results[1].relations.len(), 1);
    }

    #[test]
    fn test_failed_lookup_is_unresolved_and_not_retried_later() {
        let mut config = LinkerConfig::default();
        config.retry.backoff_ms = 0;
        let kb = Arc::new(UnreachableKb::default());
        let linker = Linker::new(Box::new(Arc::clone(&kb)), None, &config);
        let mut cache = ResolutionCache::new();

        let first = linker.process_document(&paris_doc("doc-1", false), &mut cache);
        assert!(first.entities.is_empty());
        assert!(first.relations.is_empty());
        assert_eq!(cache.unresolved_count(), 2);
        // Duas tentativas por menção.
        assert_eq!(kb.calls.load(Ordering::Relaxed), 4);

        let second = linker.process_document(&paris_doc("doc-2", false), &mut cache);
        assert_eq!(second, DocumentResult::empty("doc-2"));
        assert_eq!(kb.calls.load(Ordering::Relaxed), 4);
    }

    #[test]
    fn test_run_corpus_per_worker_caches_query_again() {
        let mut config = LinkerConfig::default();
        config.runtime.workers = Some(2);
        let kb = kb();
        let linker = linker(Arc::clone(&kb), &config);
        let docs = (0..4).map(|i| paris_doc(&format!("doc-{i}"), false)).collect();
        let results = linker.run_corpus(docs).unwrap();
        assert_eq!(results.len(), 4);
        // Paris e France, uma vez em cada um dos dois lotes.
        assert_eq!(kb.lookup_count(), 2 * 2);
    }

    #[test]
    fn test_popularity_only_queried_when_ranking() {
        let unranked = |name: &str, class: &str, aliases: &[&str]| KbRecord {
            referrals: None,
            aliases: aliases.iter().map(|a| a.to_string()).collect(),
            ..record(name, class, 0)
        };
        let kb = StaticKnowledgeBase::new(vec![
            unranked("Paris", "geo:SpatialThing", &[]),
            unranked("Paris, Texas", "geo:SpatialThing", &["Paris"]),
            unranked("France", "geo:SpatialThing", &[]),
            unranked("Michael Jordan", "dbo:Person", &["Jordan"]),
            unranked("Michael B. Jordan", "dbo:Person", &["Jordan"]),
        ]);
        let calls = Arc::new(AtomicUsize::new(0));
        let popularity = CountingPopularity(Arc::clone(&calls));
        let linker = Linker::new(Box::new(kb), Some(Box::new(popularity)), &LinkerConfig::default());
        let mut cache = ResolutionCache::new();

        // Nome exato ("Paris") e candidato único ("France"): sem consulta.
        let result = linker.process_document(&paris_doc("doc-1", false), &mut cache);
        assert_eq!(result.entities.len(), 2);
        assert_eq!(calls.load(Ordering::Relaxed), 0);

        let jordan = AnnotatedDocument {
            key: "doc-2".into(),
            sentences: vec![Sentence {
                tokens: vec![Token::new("Jordan", Pos::Propn, "ROOT", 0)],
                entities: vec![EntityMention::new("Jordan", EntityType::Person, 0, 1)],
            }],
        };
        let result = linker.process_document(&jordan, &mut cache);
        assert_eq!(result.entities.len(), 1);
        assert_eq!(calls.load(Ordering::Relaxed), 2);
    }

    #[test]
    fn test_run_corpus_shared_cache_queries_once() {
        let mut config = LinkerConfig::default();
        config.runtime.workers = Some(1);
        config.runtime.cache_scope = CacheScope::Shared;
        let kb = kb();
        let linker = linker(Arc::clone(&kb), &config);
        let docs = (0..5).map(|i| paris_doc(&format!("doc-{i}"), false)).collect();
        let results = linker.run_corpus(docs).unwrap();
        assert_eq!(results.len(), 5);
        assert_eq!(kb.lookup_count(), 2);
    }

    #[test]
    fn test_dependency_strategy() {
        let mut config = LinkerConfig::default();
        config.extraction.strategy = ExtractionStrategy::DependencyPath;
        let linker = linker(kb(), &config);
        assert_eq!(linker.extractor_name(), "dependency_path");
        let result = linker.process_document(&paris_doc("doc", false), &mut ResolutionCache::new());
        assert_eq!(result.relations.len(), 1);
        assert_eq!(result.relations[0].relation, "is in");
    }

    #[test]
    fn test_split_batches() {
        let batches = split_batches((0..7).collect(), 3);
        assert_eq!(batches, vec![vec![0, 1, 2], vec![3, 4, 5], vec![6]]);
        assert_eq!(split_batches(vec![1], 4), vec![vec![1]]);
    }
}
