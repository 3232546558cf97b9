//! # Documentos Anotados
//!
//! Modelo de dados entregue pelo serviço externo de NLP: sentenças com tokens,
//! classes gramaticais (POS), relações de dependência e spans de entidades
//! com um tipo grosseiro (PERSON, GPE, ORG, ...).
//!
//! Este crate **não** anota texto. Ele consome documentos já anotados no
//! formato JSON abaixo, um por linha (JSON Lines):
//!
//! ```json
//! {"key": "clueweb12-0000tw-00-00013",
//!  "sentences": [{
//!     "tokens": [
//!       {"text": "Paris", "pos": "PROPN", "dep": "nsubj", "head": 1},
//!       {"text": "is", "pos": "VERB", "dep": "ROOT", "head": 1},
//!       {"text": "in", "pos": "ADP", "dep": "prep", "head": 1},
//!       {"text": "France", "pos": "PROPN", "dep": "pobj", "head": 2}
//!     ],
//!     "entities": [
//!       {"text": "Paris", "label": "GPE", "start": 0, "end": 1},
//!       {"text": "France", "label": "GPE", "start": 3, "end": 4}
//!     ]
//!  }]}
//! ```
//!
//! `head` é o índice (local à sentença) do token regente; a raiz aponta para
//! si mesma. Spans de entidade são `[start, end)` em índices de token.

use std::io::BufRead;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;

/// Classe gramatical universal (Universal Dependencies UPOS).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Pos {
    Adj,
    Adp,
    Adv,
    Aux,
    Cconj,
    Det,
    Intj,
    Noun,
    Num,
    Part,
    Pron,
    Propn,
    Punct,
    Sconj,
    Sym,
    Verb,
    Space,
    /// Qualquer tag desconhecida.
    X,
}

impl Pos {
    pub fn tag(&self) -> &'static str {
        match self {
            Pos::Adj => "ADJ",
            Pos::Adp => "ADP",
            Pos::Adv => "ADV",
            Pos::Aux => "AUX",
            Pos::Cconj => "CCONJ",
            Pos::Det => "DET",
            Pos::Intj => "INTJ",
            Pos::Noun => "NOUN",
            Pos::Num => "NUM",
            Pos::Part => "PART",
            Pos::Pron => "PRON",
            Pos::Propn => "PROPN",
            Pos::Punct => "PUNCT",
            Pos::Sconj => "SCONJ",
            Pos::Sym => "SYM",
            Pos::Verb => "VERB",
            Pos::Space => "SPACE",
            Pos::X => "X",
        }
    }

    /// Parse tolerante: tags desconhecidas viram `X`.
    pub fn from_tag(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "ADJ" => Pos::Adj,
            "ADP" => Pos::Adp,
            "ADV" => Pos::Adv,
            "AUX" => Pos::Aux,
            "CCONJ" | "CONJ" => Pos::Cconj,
            "DET" => Pos::Det,
            "INTJ" => Pos::Intj,
            "NOUN" => Pos::Noun,
            "NUM" => Pos::Num,
            "PART" => Pos::Part,
            "PRON" => Pos::Pron,
            "PROPN" => Pos::Propn,
            "PUNCT" => Pos::Punct,
            "SCONJ" => Pos::Sconj,
            "SYM" => Pos::Sym,
            "VERB" => Pos::Verb,
            "SPACE" => Pos::Space,
            _ => Pos::X,
        }
    }

    /// Substantivo comum ou próprio.
    pub fn is_noun_like(&self) -> bool {
        matches!(self, Pos::Noun | Pos::Propn)
    }
}

impl From<String> for Pos {
    fn from(s: String) -> Self {
        Pos::from_tag(&s)
    }
}

impl From<Pos> for String {
    fn from(pos: Pos) -> Self {
        pos.tag().to_string()
    }
}

/// Tipos de entidade produzidos pelo anotador (conjunto do OntoNotes/spaCy).
///
/// Só parte deles pode ser ligada à base de conhecimento; veja
/// [`EntityType::kb_class`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EntityType {
    /// **Pessoa**, real ou fictícia.
    Person,
    /// Nacionalidades, grupos religiosos ou políticos.
    Norp,
    /// Prédios, aeroportos, rodovias, pontes.
    Fac,
    /// **Organização**: empresas, agências, instituições.
    Org,
    /// **Entidade geopolítica**: países, cidades, estados.
    Gpe,
    /// Locais que não são GPE: montanhas, rios.
    Loc,
    Product,
    Event,
    WorkOfArt,
    Law,
    Language,
    Date,
    Time,
    Percent,
    Money,
    Quantity,
    Ordinal,
    Cardinal,
    /// Rótulo fora do conjunto conhecido.
    Other,
}

impl EntityType {
    pub fn name(&self) -> &'static str {
        match self {
            EntityType::Person => "PERSON",
            EntityType::Norp => "NORP",
            EntityType::Fac => "FAC",
            EntityType::Org => "ORG",
            EntityType::Gpe => "GPE",
            EntityType::Loc => "LOC",
            EntityType::Product => "PRODUCT",
            EntityType::Event => "EVENT",
            EntityType::WorkOfArt => "WORK_OF_ART",
            EntityType::Law => "LAW",
            EntityType::Language => "LANGUAGE",
            EntityType::Date => "DATE",
            EntityType::Time => "TIME",
            EntityType::Percent => "PERCENT",
            EntityType::Money => "MONEY",
            EntityType::Quantity => "QUANTITY",
            EntityType::Ordinal => "ORDINAL",
            EntityType::Cardinal => "CARDINAL",
            EntityType::Other => "OTHER",
        }
    }

    /// Tenta parsear a partir de string (ex: "GPE" → Gpe). Aceita também os
    /// rótulos do chunker do NLTK (ORGANIZATION, GSP, LOCATION).
    pub fn from_label(s: &str) -> Self {
        match s.trim().to_ascii_uppercase().as_str() {
            "PERSON" | "PER" => EntityType::Person,
            "NORP" => EntityType::Norp,
            "FAC" | "FACILITY" => EntityType::Fac,
            "ORG" | "ORGANIZATION" | "ORGANISATION" => EntityType::Org,
            "GPE" | "GSP" => EntityType::Gpe,
            "LOC" | "LOCATION" => EntityType::Loc,
            "PRODUCT" => EntityType::Product,
            "EVENT" => EntityType::Event,
            "WORK_OF_ART" => EntityType::WorkOfArt,
            "LAW" => EntityType::Law,
            "LANGUAGE" => EntityType::Language,
            "DATE" => EntityType::Date,
            "TIME" => EntityType::Time,
            "PERCENT" => EntityType::Percent,
            "MONEY" => EntityType::Money,
            "QUANTITY" => EntityType::Quantity,
            "ORDINAL" => EntityType::Ordinal,
            "CARDINAL" => EntityType::Cardinal,
            _ => EntityType::Other,
        }
    }

    /// Classe da ontologia usada para filtrar candidatos na base.
    ///
    /// Tipos numéricos, temporais e afins não têm página própria e retornam
    /// `None`; menções desses tipos nunca são consultadas.
    pub fn kb_class(&self) -> Option<&'static str> {
        match self {
            EntityType::Person => Some("dbo:Person"),
            EntityType::Gpe | EntityType::Loc => Some("geo:SpatialThing"),
            EntityType::Org | EntityType::Product => Some("dbo:Organisation"),
            EntityType::WorkOfArt => Some("dbo:Work"),
            EntityType::Event => Some("dbo:Event"),
            EntityType::Language => Some("dbo:Language"),
            _ => None,
        }
    }

    pub fn is_linkable(&self) -> bool {
        self.kb_class().is_some()
    }
}

impl From<String> for EntityType {
    fn from(s: String) -> Self {
        EntityType::from_label(&s)
    }
}

impl From<EntityType> for String {
    fn from(t: EntityType) -> Self {
        t.name().to_string()
    }
}

impl std::fmt::Display for EntityType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Um token anotado.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Token {
    pub text: String,
    pub pos: Pos,
    /// Relação de dependência com o regente (ex: "nsubj", "prep", "ROOT").
    #[serde(default)]
    pub dep: String,
    /// Índice do regente dentro da sentença. A raiz aponta para si mesma.
    #[serde(default)]
    pub head: usize,
}

impl Token {
    pub fn new(text: impl Into<String>, pos: Pos, dep: impl Into<String>, head: usize) -> Self {
        Self {
            text: text.into(),
            pos,
            dep: dep.into(),
            head,
        }
    }
}

/// Uma menção de entidade dentro de uma sentença.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntityMention {
    /// Texto de superfície (ex: "Michael Jordan").
    pub text: String,
    pub label: EntityType,
    /// Primeiro token (inclusivo)
    pub start: usize,
    /// Último token (exclusivo)
    pub end: usize,
}

impl EntityMention {
    pub fn new(text: impl Into<String>, label: EntityType, start: usize, end: usize) -> Self {
        Self {
            text: text.into(),
            label,
            start,
            end,
        }
    }

    pub fn contains(&self, token_index: usize) -> bool {
        (self.start..self.end).contains(&token_index)
    }

    /// Tokens cobertos pelo span (vazio se o span estiver fora da sentença).
    pub fn tokens<'a>(&self, sentence: &'a Sentence) -> &'a [Token] {
        sentence.tokens.get(self.start..self.end).unwrap_or(&[])
    }
}

/// Uma sentença: tokens + entidades.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub tokens: Vec<Token>,
    #[serde(default)]
    pub entities: Vec<EntityMention>,
}

impl Sentence {
    /// Remove entidades com spans vazios ou fora dos limites da sentença.
    fn retain_valid_entities(&mut self) -> usize {
        let n = self.tokens.len();
        let before = self.entities.len();
        self.entities.retain(|e| e.start < e.end && e.end <= n);
        before - self.entities.len()
    }

    /// Regente do token `i`; índices inválidos são tratados como raiz.
    pub fn head_of(&self, i: usize) -> usize {
        match self.tokens.get(i) {
            Some(t) if t.head < self.tokens.len() => t.head,
            _ => i,
        }
    }

    /// Índice do token de qual a entidade depende sintaticamente: o token do
    /// span cujo regente está fora do span (ou é ele mesmo).
    pub fn anchor_of(&self, entity: &EntityMention) -> Option<usize> {
        (entity.start..entity.end.min(self.tokens.len())).find(|&i| {
            let head = self.head_of(i);
            head == i || !entity.contains(head)
        })
    }
}

/// Documento anotado identificado por uma chave opaca (ex: WARC-TREC-ID).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedDocument {
    pub key: String,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
}

impl AnnotatedDocument {
    pub fn is_empty(&self) -> bool {
        self.sentences.iter().all(|s| s.tokens.is_empty())
    }

    /// Todas as menções, na ordem em que o anotador as produziu.
    pub fn mentions(&self) -> impl Iterator<Item = &EntityMention> {
        self.sentences.iter().flat_map(|s| s.entities.iter())
    }
}

/// Lê documentos em JSON Lines.
///
/// Linhas em branco são ignoradas. Linhas malformadas são registradas com
/// `warn!` e descartadas; apenas erros de I/O interrompem a leitura.
pub fn read_documents<R: BufRead>(reader: R) -> Result<Vec<AnnotatedDocument>> {
    let mut documents = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        match serde_json::from_str::<AnnotatedDocument>(&line) {
            Ok(mut doc) => {
                let dropped: usize = doc
                    .sentences
                    .iter_mut()
                    .map(Sentence::retain_valid_entities)
                    .sum();
                if dropped > 0 {
                    warn!(key = %doc.key, dropped, "Entity spans out of bounds were dropped");
                }
                documents.push(doc);
            }
            Err(e) => warn!(line = line_no + 1, error = %e, "Skipping malformed document"),
        }
    }
    Ok(documents)
}
