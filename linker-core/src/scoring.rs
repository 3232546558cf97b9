//! # Avaliação
//!
//! Precisão, revocação e F1 das linhas produzidas contra um arquivo gold.
//!
//! Gold (um registro por linha, separado por tabs):
//!
//! ```text
//! <documento>  ENTITY    <menção>  <página>
//! <documento>  RELATION  <frase>   <sujeito>  <objeto>  <id da relação>
//! ```
//!
//! Registros são identificados por `(documento, texto)`: a menção para
//! entidades, a frase para relações. Uma predição está correta quando a
//! página (ou o par sujeito/objeto) coincide com o gold. O id da relação é
//! lido mas não entra na comparação. Chaves repetidas: vale a última linha.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::records::{EntityRecord, RelationRecord};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RecordKind {
    #[default]
    Entity,
    Relation,
}

impl RecordKind {
    pub fn tag(&self) -> &'static str {
        match self {
            RecordKind::Entity => "ENTITY",
            RecordKind::Relation => "RELATION",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub kind: RecordKind,
    pub gold: usize,
    pub predicted: usize,
    pub correct: usize,
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
}

impl Score {
    fn new(kind: RecordKind, gold: usize, predicted: usize, correct: usize) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };
        let precision = ratio(correct, predicted);
        let recall = ratio(correct, gold);
        let f1 = if precision + recall == 0.0 {
            0.0
        } else {
            2.0 * precision * recall / (precision + recall)
        };
        Self {
            kind,
            gold,
            predicted,
            correct,
            precision,
            recall,
            f1,
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let title = match self.kind {
            RecordKind::Entity => "ENTITY LINKING",
            RecordKind::Relation => "RELATION EXTRACTION",
        };
        writeln!(f, "Evaluation {title}")?;
        writeln!(f, "gold: {}", self.gold)?;
        writeln!(f, "predicted: {}", self.predicted)?;
        writeln!(f, "correct: {}", self.correct)?;
        writeln!(f, "precision: {}", self.precision)?;
        writeln!(f, "recall: {}", self.recall)?;
        write!(f, "f1: {}", self.f1)
    }
}

type Key = (String, String);

/// Registros gold do tipo pedido; linhas de outro tipo ou malformadas são
/// ignoradas. O valor é a página, ou `sujeito\tobjeto` para relações.
fn load_gold(gold: &str, kind: RecordKind) -> HashMap<Key, String> {
    let mut records = HashMap::new();
    for line in gold.lines() {
        let fields: Vec<&str> = line.trim().split('\t').collect();
        if fields.get(1) != Some(&kind.tag()) {
            continue;
        }
        let value = match (kind, fields.len()) {
            (RecordKind::Entity, 4) => fields[3].to_string(),
            (RecordKind::Relation, 6) => format!("{}\t{}", fields[3], fields[4]),
            _ => continue,
        };
        records.insert((fields[0].to_string(), fields[2].to_string()), value);
    }
    records
}

fn load_predictions(predictions: &str, kind: RecordKind) -> HashMap<Key, String> {
    let mut records = HashMap::new();
    for line in predictions.lines() {
        match kind {
            RecordKind::Entity => {
                if let Some(r) = EntityRecord::parse(line) {
                    records.insert((r.document, r.mention), r.page);
                }
            }
            RecordKind::Relation => {
                if let Some(r) = RelationRecord::parse(line) {
                    records.insert((r.document, r.relation), format!("{}\t{}", r.subject, r.object));
                }
            }
        }
    }
    records
}

/// Compara as predições com o gold para um tipo de registro.
pub fn score(gold: &str, predictions: &str, kind: RecordKind) -> Score {
    let gold = load_gold(gold, kind);
    let predicted = load_predictions(predictions, kind);
    let correct = predicted
        .iter()
        .filter(|(key, value)| gold.get(*key) == Some(*value))
        .count();
    Score::new(kind, gold.len(), predicted.len(), correct)
}
