//! # Normalização de Menções
//!
//! Converte o texto de superfície de uma menção numa chave estável para
//! cache e dicionários: `"  Michael\tJORDAN "` → `"michael jordan"`.

use serde::{Deserialize, Serialize};
use unicode_segmentation::UnicodeSegmentation;

/// Chave normalizada de uma menção (trim + espaços colapsados + minúsculas).
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MentionKey(String);

impl MentionKey {
    /// Retorna `None` para menções vazias ou só com espaços.
    pub fn new(raw: &str) -> Option<Self> {
        let collapsed = collapse_whitespace(raw);
        if collapsed.is_empty() {
            None
        } else {
            Some(MentionKey(collapsed.to_lowercase()))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for MentionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Colapsa qualquer sequência de espaços em branco num único espaço.
pub fn collapse_whitespace(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Coloca em maiúscula a primeira letra de cada palavra e o resto em
/// minúsculas (`"new YORK city"` → `"New York City"`).
pub fn title_case(text: &str) -> String {
    text.split_word_bounds()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) if first.is_alphabetic() => {
                    first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
                }
                _ => word.to_string(),
            }
        })
        .collect()
}

/// Formas de superfície enviadas à base de conhecimento: a chave literal e a
/// versão em title case, sem repetições, literal primeiro.
///
/// Rótulos da base são sensíveis a maiúsculas, então "michael jordan" sozinho
/// não encontraria "Michael Jordan".
pub fn surface_variants(key: &MentionKey) -> Vec<String> {
    let verbatim = key.as_str().to_string();
    let titled = title_case(&verbatim);
    if titled == verbatim {
        vec![verbatim]
    } else {
        vec![verbatim, titled]
    }
}
