//! # Popularidade de Páginas
//!
//! Quando a base de conhecimento não devolve a contagem de backlinks junto
//! com os candidatos, ela é buscada aqui, página por página. A contagem é o
//! critério principal do [`crate::disambiguation::Disambiguator`].

use std::collections::HashMap;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, warn};

use crate::candidates::{Candidate, RetryPolicy};
use crate::config::PopularityConfig;
use crate::error::{LinkerError, Result};

const SERVICE: &str = "popularity";

/// Serviço que conta quantas páginas apontam para uma página.
pub trait Popularity: Send + Sync {
    fn referrals(&self, page: &str) -> Result<u64>;
}

/// Backlinks via API do MediaWiki (`list=backlinks`).
pub struct WikipediaBacklinks {
    client: Client,
    endpoint: String,
}

impl WikipediaBacklinks {
    pub fn new(config: &PopularityConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("linker-core/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[derive(Debug, Deserialize)]
struct BacklinksResponse {
    query: Option<BacklinksQuery>,
}

#[derive(Debug, Deserialize)]
struct BacklinksQuery {
    #[serde(default)]
    backlinks: Vec<serde_json::Value>,
}

/// Título da página: último segmento do caminho da URL.
pub fn page_title(page: &str) -> &str {
    page.trim_end_matches('/').rsplit('/').next().unwrap_or(page)
}

/// Conta os backlinks numa resposta da API. Sem `query` conta zero.
pub fn count_backlinks(body: &str) -> Result<u64> {
    let response: BacklinksResponse = serde_json::from_str(body)?;
    Ok(response.query.map_or(0, |q| q.backlinks.len() as u64))
}

impl Popularity for WikipediaBacklinks {
    fn referrals(&self, page: &str) -> Result<u64> {
        let title = page_title(page);
        let response = self
            .client
            .get(&self.endpoint)
            .query(&[
                ("action", "query"),
                ("format", "json"),
                ("list", "backlinks"),
                ("bltitle", title),
                ("bllimit", "max"),
            ])
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
        let count = count_backlinks(&body)?;
        debug!(title, count, "Backlinks counted");
        Ok(count)
    }
}

/// Contagens fixas em memória; páginas desconhecidas contam zero.
#[derive(Debug, Clone, Default)]
pub struct StaticPopularity {
    counts: HashMap<String, u64>,
}

impl StaticPopularity {
    pub fn new(counts: impl IntoIterator<Item = (String, u64)>) -> Self {
        Self {
            counts: counts.into_iter().collect(),
        }
    }
}

impl Popularity for StaticPopularity {
    fn referrals(&self, page: &str) -> Result<u64> {
        Ok(self.counts.get(page).copied().unwrap_or(0))
    }
}

/// Preenche `referrals` dos candidatos que vieram sem contagem.
///
/// Falhas (depois das repetições) viram contagem zero: popularidade é só um
/// critério de ranking e nunca impede a resolução da menção.
pub fn fill_referrals(candidates: &mut [Candidate], popularity: &dyn Popularity, retry: &RetryPolicy) {
    for candidate in candidates.iter_mut().filter(|c| c.referrals.is_none()) {
        let count = match retry.run("popularity", || popularity.referrals(&candidate.page)) {
            Ok(count) => count,
            Err(e) => {
                warn!(page = %candidate.page, error = %e, "Popularity lookup failed, using 0");
                0
            }
        };
        candidate.referrals = Some(count);
    }
}
