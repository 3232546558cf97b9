//! # Backends da Base de Conhecimento
//!
//! - [`SparqlKnowledgeBase`]: consulta o endpoint SPARQL do DBpedia.
//! - [`StaticKnowledgeBase`]: base em memória, usada em testes e demonstrações.
//!
//! Os dois devolvem sempre [`Candidate`]s uniformes. Respostas SPARQL trazem
//! cada valor ora embrulhado (`{"type": "uri", "value": "..."}`), ora como
//! string crua, dependendo do servidor; isso é resolvido aqui e nunca vaza
//! para o resto do crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::candidates::{Candidate, CandidateQuery, KnowledgeBase};
use crate::config::KnowledgeBaseConfig;
use crate::error::{LinkerError, Result};

const SERVICE: &str = "knowledge base";

/// Caracteres que não podem aparecer dentro de um IRI SPARQL.
static IRI_UNSAFE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"[<>"{}|^`\\\s]"#).expect("IRI_UNSAFE regex is invalid"));

const PREFIXES: &str = "\
PREFIX rdfs: <http://www.w3.org/2000/01/rdf-schema#>
PREFIX rdf:  <http://www.w3.org/1999/02/22-rdf-syntax-ns#>
PREFIX foaf: <http://xmlns.com/foaf/0.1/>
PREFIX dbo:  <http://dbpedia.org/ontology/>
PREFIX geo:  <http://www.w3.org/2003/01/geo/wgs84_pos#>
";

/// Cliente do endpoint SPARQL do DBpedia.
pub struct SparqlKnowledgeBase {
    client: Client,
    endpoint: String,
    inline_referrals: bool,
}

impl SparqlKnowledgeBase {
    pub fn new(config: &KnowledgeBaseConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("linker-core/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
            inline_referrals: config.inline_referrals,
        })
    }

    /// Monta a consulta SPARQL para todas as variantes da menção.
    ///
    /// Cada variante contribui com quatro padrões unidos por `UNION`:
    /// 1. rótulo exato (ex: "Twitter");
    /// 2. rótulo que redireciona (ex: "Google, Inc." → Google);
    /// 3. página dedicada `X_(disambiguation)` (ex: Michael Jordan);
    /// 4. lista de desambiguação dentro da própria página (ex: New York).
    pub fn build_query(&self, query: &CandidateQuery) -> String {
        let mut blocks = Vec::new();
        for variant in &query.variants {
            let literal = escape_literal(variant);
            let resource = resource_name(variant);
            blocks.push(format!("{{ ?item rdfs:label \"{literal}\"@en . }}"));
            blocks.push(format!(
                "{{ ?temp rdfs:label \"{literal}\"@en . ?temp dbo:wikiPageRedirects ?item . }}"
            ));
            if !resource.is_empty() {
                blocks.push(format!(
                    "{{ <http://dbpedia.org/resource/{resource}_(disambiguation)> dbo:wikiPageDisambiguates ?item . }}"
                ));
                blocks.push(format!(
                    "{{ <http://dbpedia.org/resource/{resource}> dbo:wikiPageDisambiguates ?item . }}"
                ));
            }
        }
        let union = blocks.join("\n  UNION\n  ");
        let class = query.class;

        if self.inline_referrals {
            format!(
                "{PREFIXES}\
SELECT ?item ?name ?page (COUNT(DISTINCT ?backlink) AS ?refs) WHERE {{
  {union}
  ?item rdf:type {class} .
  ?item foaf:isPrimaryTopicOf ?page .
  ?item rdfs:label ?name .
  FILTER (langMatches(lang(?name), \"en\"))
  OPTIONAL {{ ?backlink dbo:wikiPageWikiLink ?item . }}
}}
GROUP BY ?item ?name ?page"
            )
        } else {
            format!(
                "{PREFIXES}\
SELECT DISTINCT ?item ?name ?page WHERE {{
  {union}
  ?item rdf:type {class} .
  ?item foaf:isPrimaryTopicOf ?page .
  ?item rdfs:label ?name .
  FILTER (langMatches(lang(?name), \"en\"))
}}"
            )
        }
    }
}

impl KnowledgeBase for SparqlKnowledgeBase {
    fn lookup(&self, query: &CandidateQuery) -> Result<Vec<Candidate>> {
        let sparql = self.build_query(query);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[("query", sparql.as_str()), ("format", "application/sparql-results+json")])
            .header("Accept", "application/sparql-results+json")
            .send()
            .map_err(|e| LinkerError::from_request(SERVICE, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(LinkerError::Status {
                service: SERVICE,
                status: status.as_u16(),
            });
        }

        let body = response.text().map_err(|e| LinkerError::from_request(SERVICE, e))?;
        let candidates = parse_sparql_results(&body)?;
        debug!(variants = ?query.variants, class = query.class, count = candidates.len(), "SPARQL lookup");
        Ok(candidates)
    }
}

/// Valor de um binding SPARQL, em qualquer um dos formatos aceitos.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum BindingValue {
    Wrapped { value: String },
    Raw(String),
}

impl BindingValue {
    fn into_string(self) -> String {
        match self {
            BindingValue::Wrapped { value } | BindingValue::Raw(value) => value,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SparqlResponse {
    results: SparqlResults,
}

#[derive(Debug, Deserialize)]
struct SparqlResults {
    #[serde(default)]
    bindings: Vec<HashMap<String, BindingValue>>,
}

/// Converte o JSON de resultados SPARQL em candidatos.
///
/// Bindings sem `item` ou sem `page` são descartados; `name` ausente vira
/// string vazia e `refs` não numérico é tratado como ausente.
pub fn parse_sparql_results(body: &str) -> Result<Vec<Candidate>> {
    let response: SparqlResponse = serde_json::from_str(body)?;
    Ok(response
        .results
        .bindings
        .into_iter()
        .filter_map(|mut binding| {
            let item = binding.remove("item")?.into_string();
            let page = binding.remove("page")?.into_string();
            let name = binding
                .remove("name")
                .map(BindingValue::into_string)
                .unwrap_or_default();
            let referrals = binding
                .remove("refs")
                .and_then(|v| v.into_string().trim().parse::<u64>().ok());
            Some(Candidate {
                name,
                page,
                item,
                referrals,
            })
        })
        .collect())
}

fn escape_literal(s: &str) -> String {
    s.replace('\\', "\\\\").replace('"', "\\\"")
}

/// Nome de recurso do DBpedia: espaços viram `_`, caracteres ilegais somem.
fn resource_name(variant: &str) -> String {
    let underscored = variant.split_whitespace().collect::<Vec<_>>().join("_");
    IRI_UNSAFE.replace_all(&underscored, "").into_owned()
}

/// Um registro da base em memória.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KbRecord {
    pub item: String,
    pub name: String,
    pub page: String,
    /// Classe da ontologia (ex: `dbo:Person`).
    pub class: String,
    /// Rótulos alternativos: redirecionamentos e entradas de desambiguação.
    #[serde(default)]
    pub aliases: Vec<String>,
    #[serde(default)]
    pub referrals: Option<u64>,
}

impl KbRecord {
    fn matches(&self, variant: &str) -> bool {
        let variant = variant.to_lowercase();
        self.name.to_lowercase() == variant
            || self.aliases.iter().any(|a| a.to_lowercase() == variant)
    }
}

/// Base de conhecimento em memória.
///
/// Casa variantes contra nome e aliases sem diferenciar maiúsculas, filtra
/// pela classe e conta quantas consultas recebeu (útil para verificar o
/// cache de resolução).
#[derive(Debug, Default)]
pub struct StaticKnowledgeBase {
    records: Vec<KbRecord>,
    lookups: AtomicUsize,
}

impl StaticKnowledgeBase {
    pub fn new(records: Vec<KbRecord>) -> Self {
        Self {
            records,
            lookups: AtomicUsize::new(0),
        }
    }

    /// Número de consultas recebidas até agora.
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::Relaxed)
    }
}

impl KnowledgeBase for StaticKnowledgeBase {
    fn lookup(&self, query: &CandidateQuery) -> Result<Vec<Candidate>> {
        self.lookups.fetch_add(1, Ordering::Relaxed);
        Ok(self
            .records
            .iter()
            .filter(|r| r.class == query.class)
            .filter(|r| query.variants.iter().any(|v| r.matches(v)))
            .map(|r| Candidate {
                name: r.name.clone(),
                page: r.page.clone(),
                item: r.item.clone(),
                referrals: r.referrals,
            })
            .collect())
    }
}

impl KnowledgeBase for std::sync::Arc<StaticKnowledgeBase> {
    fn lookup(&self, query: &CandidateQuery) -> Result<Vec<Candidate>> {
        self.as_ref().lookup(query)
    }
}
