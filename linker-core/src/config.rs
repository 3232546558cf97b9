//! # Configuração do Linker
//!
//! Toda a configuração vive em um único arquivo TOML. Cada seção tem valores
//! padrão, então um arquivo vazio (ou nenhum arquivo) já produz um linker
//! funcional apontando para o DBpedia e para a API da Wikipedia.
//!
//! ```toml
//! [knowledge_base]
//! endpoint = "https://dbpedia.org/sparql"
//! timeout_ms = 10000
//!
//! [retry]
//! max_attempts = 2
//! backoff_ms = 15000
//!
//! [extraction]
//! strategy = "pattern"
//!
//! [runtime]
//! cache_scope = "per_worker"
//! ```

use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{LinkerError, Result};

/// Configuração completa do linker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LinkerConfig {
    pub knowledge_base: KnowledgeBaseConfig,
    pub popularity: PopularityConfig,
    pub retry: RetryConfig,
    pub extraction: ExtractionConfig,
    pub runtime: RuntimeConfig,
}

impl LinkerConfig {
    /// Lê e valida um arquivo TOML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&content)
    }

    /// Faz o parse de uma string TOML e valida o resultado.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: LinkerConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Carrega a partir de um caminho opcional; sem caminho, usa os padrões.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => {
                tracing::info!("Loading config from: {}", p.display());
                Self::from_file(p)
            }
            None => {
                tracing::info!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.knowledge_base.endpoint.trim().is_empty() {
            return Err(LinkerError::invalid_config("knowledge_base.endpoint is empty"));
        }
        if self.popularity.enabled && self.popularity.endpoint.trim().is_empty() {
            return Err(LinkerError::invalid_config(
                "popularity.endpoint is empty but popularity is enabled",
            ));
        }
        if self.retry.max_attempts == 0 {
            return Err(LinkerError::invalid_config("retry.max_attempts must be >= 1"));
        }
        if self.runtime.workers == Some(0) {
            return Err(LinkerError::invalid_config("runtime.workers must be >= 1"));
        }
        Ok(())
    }
}

/// Endpoint SPARQL usado para gerar candidatos.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeBaseConfig {
    pub endpoint: String,
    pub timeout_ms: u64,
    /// Pede a contagem de backlinks junto com os candidatos (evita uma
    /// segunda ida à rede por candidato).
    pub inline_referrals: bool,
}

impl Default for KnowledgeBaseConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://dbpedia.org/sparql".to_string(),
            timeout_ms: 10_000,
            inline_referrals: true,
        }
    }
}

impl KnowledgeBaseConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Serviço de popularidade (backlinks da Wikipedia).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PopularityConfig {
    pub enabled: bool,
    pub endpoint: String,
    pub timeout_ms: u64,
}

impl Default for PopularityConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            endpoint: "https://en.wikipedia.org/w/api.php".to_string(),
            timeout_ms: 10_000,
        }
    }
}

impl PopularityConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Política de repetição para consultas externas.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Número total de tentativas (inclui a primeira).
    pub max_attempts: u32,
    /// Espera entre tentativas.
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 2,
            backoff_ms: 15_000,
        }
    }
}

impl RetryConfig {
    pub fn backoff(&self) -> Duration {
        Duration::from_millis(self.backoff_ms)
    }
}

/// Estratégia de extração de relações.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    /// **Padrões de POS**: verbo + partícula/advérbio + ... + preposição.
    #[default]
    Pattern,
    /// **Caminho de dependência** entre cada par de entidades.
    DependencyPath,
    /// Caminho de dependência revalidado pela gramática de padrões.
    /// Menor recall, maior precisão.
    DependencyPathStrict,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractionConfig {
    pub strategy: ExtractionStrategy,
}

/// Escopo do cache de resolução entre workers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheScope {
    /// Cada worker começa com um cache vazio. A mesma menção pode ser
    /// consultada uma vez por worker.
    #[default]
    PerWorker,
    /// Um único cache protegido por lock, visível a todos os workers.
    Shared,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Tamanho do pool; `None` usa o número de CPUs disponíveis.
    pub workers: Option<usize>,
    pub cache_scope: CacheScope,
}

impl RuntimeConfig {
    pub fn worker_count(&self) -> usize {
        self.workers.unwrap_or_else(|| {
            std::thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(1)
        })
    }
}
