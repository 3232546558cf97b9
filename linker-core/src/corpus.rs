//! # Corpus de Demonstração
//!
//! Documentos em inglês já anotados (tokens, POS, dependências e entidades),
//! no formato que o serviço de NLP entregaria, e uma base de conhecimento em
//! memória que cobre as menções deles. Usado pelos testes e pela rota
//! `GET /demo-documents` do servidor.
//!
//! ## Casos Cobertos
//! - Nome exato contra homônimos mais populares ("Paris" x "Paris, Texas")
//! - Menção ambígua resolvida por popularidade ("Jordan")
//! - Candidato sem contagem de backlinks ("Barack Obama")
//! - Tipo não ligável (DATE)
//! - Menções sem página, cuja relação é descartada ("Atlantis")

use crate::annotation::{AnnotatedDocument, EntityMention, EntityType, Pos, Sentence, Token};
use crate::kb::{KbRecord, StaticKnowledgeBase};
use crate::popularity::StaticPopularity;

/// Uma sentença anotada.
pub struct DemoSentence {
    pub text: &'static str,
    /// `(texto, POS, dependência, índice do regente)`
    pub tokens: &'static [(&'static str, &'static str, &'static str, usize)],
    /// `(texto, tipo, início, fim)`, fim exclusivo
    pub entities: &'static [(&'static str, &'static str, usize, usize)],
}

pub struct DemoDocument {
    pub key: &'static str,
    pub sentences: &'static [DemoSentence],
}

impl DemoDocument {
    pub fn to_annotated(&self) -> AnnotatedDocument {
        AnnotatedDocument {
            key: self.key.to_string(),
            sentences: self
                .sentences
                .iter()
                .map(|s| Sentence {
                    tokens: s
                        .tokens
                        .iter()
                        .map(|&(text, pos, dep, head)| Token::new(text, Pos::from_tag(pos), dep, head))
                        .collect(),
                    entities: s
                        .entities
                        .iter()
                        .map(|&(text, label, start, end)| {
                            EntityMention::new(text, EntityType::from_label(label), start, end)
                        })
                        .collect(),
                })
                .collect(),
        }
    }
}

/// Retorna o corpus completo
pub fn get_corpus() -> Vec<DemoDocument> {
    vec![
        // ===== GEOGRAFIA =====
        DemoDocument {
            key: "demo-geo",
            sentences: &[
                DemoSentence {
                    text: "Paris is in France.",
                    tokens: &[
                        ("Paris", "PROPN", "nsubj", 1), ("is", "VERB", "ROOT", 1), ("in", "ADP", "prep", 1),
                        ("France", "PROPN", "pobj", 2), (".", "PUNCT", "punct", 1),
                    ],
                    entities: &[("Paris", "GPE", 0, 1), ("France", "GPE", 3, 4)],
                },
                DemoSentence {
                    text: "Berlin is the capital of Germany.",
                    tokens: &[
                        ("Berlin", "PROPN", "nsubj", 1), ("is", "VERB", "ROOT", 1), ("the", "DET", "det", 3),
                        ("capital", "NOUN", "attr", 1), ("of", "ADP", "prep", 3), ("Germany", "PROPN", "pobj", 4),
                        (".", "PUNCT", "punct", 1),
                    ],
                    entities: &[("Berlin", "GPE", 0, 1), ("Germany", "GPE", 5, 6)],
                },
            ],
        },
        // ===== POLÍTICA =====
        DemoDocument {
            key: "demo-politics",
            sentences: &[DemoSentence {
                text: "In 2007 Barack Obama visited Berlin.",
                tokens: &[
                    ("In", "ADP", "prep", 4), ("2007", "NUM", "pobj", 0), ("Barack", "PROPN", "compound", 3),
                    ("Obama", "PROPN", "nsubj", 4), ("visited", "VERB", "ROOT", 4), ("Berlin", "PROPN", "dobj", 4),
                    (".", "PUNCT", "punct", 4),
                ],
                entities: &[("2007", "DATE", 1, 2), ("Barack Obama", "PERSON", 2, 4), ("Berlin", "GPE", 5, 6)],
            }],
        },
        // ===== ESPORTES =====
        DemoDocument {
            key: "demo-sports",
            sentences: &[
                DemoSentence {
                    text: "Michael Jordan played basketball for the Chicago Bulls.",
                    tokens: &[
                        ("Michael", "PROPN", "compound", 1), ("Jordan", "PROPN", "nsubj", 2), ("played", "VERB", "ROOT", 2),
                        ("basketball", "NOUN", "dobj", 2), ("for", "ADP", "prep", 2), ("the", "DET", "det", 7),
                        ("Chicago", "PROPN", "compound", 7), ("Bulls", "PROPN", "pobj", 4), (".", "PUNCT", "punct", 2),
                    ],
                    entities: &[("Michael Jordan", "PERSON", 0, 2), ("Chicago Bulls", "ORG", 6, 8)],
                },
                DemoSentence {
                    text: "Jordan was born in Brooklyn.",
                    tokens: &[
                        ("Jordan", "PROPN", "nsubjpass", 2), ("was", "AUX", "auxpass", 2), ("born", "VERB", "ROOT", 2),
                        ("in", "ADP", "prep", 2), ("Brooklyn", "PROPN", "pobj", 3), (".", "PUNCT", "punct", 2),
                    ],
                    entities: &[("Jordan", "PERSON", 0, 1), ("Brooklyn", "GPE", 4, 5)],
                },
            ],
        },
        // ===== TECNOLOGIA =====
        DemoDocument {
            key: "demo-tech",
            sentences: &[DemoSentence {
                text: "Apple was founded by Steve Jobs in Cupertino.",
                tokens: &[
                    ("Apple", "PROPN", "nsubjpass", 2), ("was", "AUX", "auxpass", 2), ("founded", "VERB", "ROOT", 2),
                    ("by", "ADP", "agent", 2), ("Steve", "PROPN", "compound", 5), ("Jobs", "PROPN", "pobj", 3),
                    ("in", "ADP", "prep", 2), ("Cupertino", "PROPN", "pobj", 6), (".", "PUNCT", "punct", 2),
                ],
                entities: &[("Apple", "ORG", 0, 1), ("Steve Jobs", "PERSON", 4, 6), ("Cupertino", "GPE", 7, 8)],
            }],
        },
        // ===== FICÇÃO =====
        DemoDocument {
            key: "demo-unknown",
            sentences: &[DemoSentence {
                text: "Atlantis borders Lemuria.",
                tokens: &[
                    ("Atlantis", "PROPN", "nsubj", 1), ("borders", "VERB", "ROOT", 1), ("Lemuria", "PROPN", "dobj", 1),
                    (".", "PUNCT", "punct", 1),
                ],
                entities: &[("Atlantis", "GPE", 0, 1), ("Lemuria", "GPE", 2, 3)],
            }],
        },
    ]
}

/// O corpus já convertido para documentos anotados.
pub fn demo_documents() -> Vec<AnnotatedDocument> {
    get_corpus().iter().map(DemoDocument::to_annotated).collect()
}

const WIKI: &str = "http://en.wikipedia.org/wiki/";
const DBR: &str = "http://dbpedia.org/resource/";

fn kb_record(title: &str, class: &str, aliases: &[&str], referrals: Option<u64>) -> KbRecord {
    KbRecord {
        item: format!("{DBR}{title}"),
        name: title.replace('_', " "),
        page: format!("{WIKI}{title}"),
        class: class.to_string(),
        aliases: aliases.iter().map(|a| a.to_string()).collect(),
        referrals,
    }
}

/// Base de conhecimento em memória com as entidades do corpus e alguns
/// homônimos.
pub fn demo_knowledge_base() -> StaticKnowledgeBase {
    const PLACE: &str = "geo:SpatialThing";
    const PERSON: &str = "dbo:Person";
    const ORG: &str = "dbo:Organisation";
    StaticKnowledgeBase::new(vec![
        kb_record("Paris", PLACE, &[], Some(9_000)),
        kb_record("Paris,_Texas", PLACE, &["Paris"], Some(12_000)),
        kb_record("France", PLACE, &[], Some(12_000)),
        kb_record("Berlin", PLACE, &[], Some(8_000)),
        kb_record("Germany", PLACE, &[], Some(11_000)),
        kb_record("Brooklyn", PLACE, &[], Some(4_000)),
        kb_record("Cupertino,_California", PLACE, &["Cupertino"], Some(900)),
        kb_record("Jordan", PLACE, &[], Some(6_000)),
        kb_record("Michael_Jordan", PERSON, &["Jordan"], Some(5_000)),
        kb_record("Michael_B._Jordan", PERSON, &["Jordan"], Some(800)),
        kb_record("Steve_Jobs", PERSON, &[], Some(3_500)),
        kb_record("Barack_Obama", PERSON, &[], None),
        kb_record("Chicago_Bulls", ORG, &[], Some(2_500)),
        kb_record("Apple_Inc.", ORG, &["Apple"], Some(3_000)),
        kb_record("Apple_Records", ORG, &["Apple"], Some(400)),
    ])
}

/// Contagens para os registros sem `referrals`.
pub fn demo_popularity() -> StaticPopularity {
    StaticPopularity::new([(format!("{WIKI}Barack_Obama"), 7_000)])
}
