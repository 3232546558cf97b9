//! # Registros de Saída
//!
//! Formato de linha consumido pela avaliação:
//!
//! ```text
//! ENTITY: <documento>\t<menção>\t<página>
//! RELATION: <documento>\t<página sujeito>\t<página objeto>\t<frase>
//! ```
//!
//! Nenhum campo pode conter tab ou quebra de linha; sequências desses
//! caracteres viram um espaço.

use std::borrow::Cow;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

pub const ENTITY_PREFIX: &str = "ENTITY: ";
pub const RELATION_PREFIX: &str = "RELATION: ";

static FIELD_BREAKS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\t\r\n]+").expect("field sanitizer regex is invalid"));

/// Remove tabs e quebras de linha de um campo.
pub fn sanitize_field(field: &str) -> Cow<'_, str> {
    FIELD_BREAKS.replace_all(field, " ")
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityRecord {
    pub document: String,
    pub mention: String,
    pub page: String,
}

impl EntityRecord {
    /// Lê uma linha `ENTITY: ...`; `None` se o prefixo ou o número de campos
    /// não confere.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix(ENTITY_PREFIX.trim_end())?.trim_start();
        let mut fields = rest.split('\t');
        let record = Self {
            document: fields.next()?.to_string(),
            mention: fields.next()?.to_string(),
            page: fields.next()?.to_string(),
        };
        fields.next().is_none().then_some(record)
    }
}

impl fmt::Display for EntityRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}\t{}\t{}",
            ENTITY_PREFIX,
            sanitize_field(&self.document),
            sanitize_field(&self.mention),
            sanitize_field(&self.page)
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RelationRecord {
    pub document: String,
    pub subject: String,
    pub object: String,
    pub relation: String,
    /// Identificador opcional da relação no Wikidata (quinto campo).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relation_id: Option<String>,
}

impl RelationRecord {
    /// Lê uma linha `RELATION: ...` com quatro ou cinco campos.
    pub fn parse(line: &str) -> Option<Self> {
        let rest = line.trim().strip_prefix(RELATION_PREFIX.trim_end())?.trim_start();
        let fields: Vec<&str> = rest.split('\t').collect();
        let (relation_id, fields) = match fields.len() {
            4 => (None, &fields[..]),
            5 => (Some(fields[4].to_string()), &fields[..4]),
            _ => return None,
        };
        Some(Self {
            document: fields[0].to_string(),
            subject: fields[1].to_string(),
            object: fields[2].to_string(),
            relation: fields[3].to_string(),
            relation_id,
        })
    }
}

impl fmt::Display for RelationRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}{}\t{}\t{}\t{}",
            RELATION_PREFIX,
            sanitize_field(&self.document),
            sanitize_field(&self.subject),
            sanitize_field(&self.object),
            sanitize_field(&self.relation)
        )?;
        if let Some(id) = &self.relation_id {
            write!(f, "\t{}", sanitize_field(id))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entity_line_format() {
        let record = EntityRecord {
            document: "clueweb12-0000tw-00-00013".into(),
            mention: "Michael\tJordan".into(),
            page: "http://en.wikipedia.org/wiki/Michael_Jordan".into(),
        };
        assert_eq!(
            record.to_string(),
            "ENTITY: clueweb12-0000tw-00-00013\tMichael Jordan\thttp://en.wikipedia.org/wiki/Michael_Jordan"
        );
        assert_eq!(EntityRecord::parse(&record.to_string()).unwrap().mention, "Michael Jordan");
    }

    #[test]
    fn test_relation_line_format() {
        let record = RelationRecord {
            document: "doc-1".into(),
            subject: "wiki/Paris".into(),
            object: "wiki/France".into(),
            relation: "is\r\n in".into(),
            relation_id: None,
        };
        let line = record.to_string();
        assert_eq!(line, "RELATION: doc-1\twiki/Paris\twiki/France\tis  in");
        assert_eq!(line.matches('\t').count(), 3);
    }

    #[test]
    fn test_parse_rejects_wrong_shapes() {
        assert!(EntityRecord::parse("ENTITY: doc\tonly-two").is_none());
        assert!(EntityRecord::parse("RELATION: a\tb\tc\td").is_none());
        assert!(RelationRecord::parse("RELATION: a\tb\tc").is_none());

        let with_id = RelationRecord::parse("RELATION: d\ts\to\tborn in\tP19\n").unwrap();
        assert_eq!(with_id.relation, "born in");
        assert_eq!(with_id.relation_id.as_deref(), Some("P19"));
    }
}
