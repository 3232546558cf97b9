//! # Erros do linker
//!
//! Taxonomia única de erros para o crate. Quase nenhum destes erros chega ao
//! chamador: o orquestrador converte falhas de consulta em "sem candidatos" e
//! segue para a próxima menção. Só erros de configuração e de criação do pool
//! de workers escapam de [`crate::pipeline::Linker`].

use thiserror::Error;

/// Result padrão do crate.
pub type Result<T> = std::result::Result<T, LinkerError>;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum LinkerError {
    /// Falha de transporte HTTP (conexão, TLS, corpo inválido).
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// O serviço externo não respondeu dentro do timeout.
    #[error("Timed out querying {service}")]
    Timeout { service: &'static str },

    /// Resposta HTTP com status de erro.
    #[error("{service} returned HTTP {status}")]
    Status { service: &'static str, status: u16 },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config parse error: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Entrada malformada (menção vazia, documento sem chave, ...).
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Falha ao construir o pool de workers.
    #[error("Worker pool error: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

impl LinkerError {
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        LinkerError::InvalidConfig(msg.into())
    }

    pub fn invalid_input(msg: impl Into<String>) -> Self {
        LinkerError::InvalidInput(msg.into())
    }

    /// Converte um erro do reqwest, separando timeouts dos demais.
    pub fn from_request(service: &'static str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LinkerError::Timeout { service }
        } else {
            LinkerError::Http(err)
        }
    }

    /// Indica se vale a pena repetir a consulta.
    ///
    /// Timeouts, falhas de conexão, `429` e `5xx` são transitórios; erros de
    /// parsing e de configuração não mudam numa segunda tentativa.
    pub fn is_transient(&self) -> bool {
        match self {
            LinkerError::Timeout { .. } => true,
            LinkerError::Http(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            LinkerError::Status { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transient_classification() {
        assert!(LinkerError::Timeout { service: "kb" }.is_transient());
        assert!(LinkerError::Status { service: "kb", status: 503 }.is_transient());
        assert!(LinkerError::Status { service: "kb", status: 429 }.is_transient());
        assert!(!LinkerError::Status { service: "kb", status: 404 }.is_transient());
        assert!(!LinkerError::invalid_input("vazio").is_transient());
    }
}
