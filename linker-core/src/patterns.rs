//! # Padrões de Relação (estilo ReVerb)
//!
//! Uma relação é uma sequência de tokens que casa com a gramática de classes
//! gramaticais:
//!
//! ```text
//! VERB PART? ADV? (ADJ | ADV | NOUN | PRON | DET)* (PART | ADP)?
//! ```
//!
//! Exemplos: "is in", "was born in", "founded", "is the capital of".
//!
//! O casamento é feito em três passos:
//!
//! 1. Para cada posição com VERB, o casamento mais longo a partir dali.
//! 2. Spans sobrepostos são resolvidos do mais longo para o mais curto (em
//!    empate, vence o que começa antes); os que colidem são descartados.
//! 3. Cada span é pareado com a entidade mais próxima à esquerda (sujeito) e
//!    a mais próxima à direita (objeto).

use serde::{Deserialize, Serialize};

use crate::annotation::{Pos, Sentence, Token};
use crate::relation::{MentionRelation, RelationExtractor};

/// Span de tokens `[start, end)` que casa com a gramática.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationSpan {
    pub start: usize,
    pub end: usize,
}

impl RelationSpan {
    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    fn overlaps(&self, other: &RelationSpan) -> bool {
        self.start < other.end && other.start < self.end
    }

    /// Texto do span em minúsculas, tokens separados por espaço.
    pub fn phrase(&self, tokens: &[Token]) -> String {
        tokens[self.start..self.end]
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase()
    }
}

fn is_filler(pos: Pos) -> bool {
    matches!(pos, Pos::Adj | Pos::Adv | Pos::Noun | Pos::Pron | Pos::Det)
}

/// Fim (exclusivo) do casamento mais longo que começa em `start`.
///
/// O guloso é ótimo aqui: o `ADV?` inicial é absorvido pela repetição e o
/// `PART?` consumido cedo nunca impede o `(PART|ADP)?` final.
fn longest_match_at(tags: &[Pos], start: usize) -> Option<usize> {
    if tags.get(start) != Some(&Pos::Verb) {
        return None;
    }
    let mut i = start + 1;
    if tags.get(i) == Some(&Pos::Part) {
        i += 1;
    }
    while tags.get(i).copied().is_some_and(is_filler) {
        i += 1;
    }
    if matches!(tags.get(i), Some(Pos::Part | Pos::Adp)) {
        i += 1;
    }
    Some(i)
}

/// Spans de relação numa sequência de classes gramaticais, sem sobreposição,
/// ordenados pela posição inicial.
pub fn find_spans_in_tags(tags: &[Pos]) -> Vec<RelationSpan> {
    let mut matches: Vec<RelationSpan> = (0..tags.len())
        .filter_map(|start| longest_match_at(tags, start).map(|end| RelationSpan { start, end }))
        .collect();

    // Mais longo primeiro; `sort_by` é estável, então empates mantêm o início.
    matches.sort_by(|a, b| b.len().cmp(&a.len()).then(a.start.cmp(&b.start)));

    let mut kept: Vec<RelationSpan> = Vec::with_capacity(matches.len());
    for span in matches {
        if !kept.iter().any(|k| k.overlaps(&span)) {
            kept.push(span);
        }
    }
    kept.sort_by_key(|s| s.start);
    kept
}

/// Spans de relação nos tokens de uma sentença.
pub fn find_relation_spans(tokens: &[Token]) -> Vec<RelationSpan> {
    let tags: Vec<Pos> = tokens.iter().map(|t| t.pos).collect();
    find_spans_in_tags(&tags)
}

/// Maior span que casa com a gramática (em empate, o primeiro).
pub fn longest_relation_span(tags: &[Pos]) -> Option<RelationSpan> {
    find_spans_in_tags(tags)
        .into_iter()
        .fold(None, |best: Option<RelationSpan>, span| match best {
            Some(b) if b.len() >= span.len() => Some(b),
            _ => Some(span),
        })
}

/// Extrator por padrões: pareia cada span com as entidades vizinhas.
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl RelationExtractor for PatternExtractor {
    fn name(&self) -> &'static str {
        "pattern"
    }

    fn extract(&self, sentence: &Sentence) -> Vec<MentionRelation> {
        // Só entidades com ao menos um substantivo ou número participam.
        let entities: Vec<_> = sentence
            .entities
            .iter()
            .filter(|e| {
                e.tokens(sentence)
                    .iter()
                    .any(|t| t.pos.is_noun_like() || t.pos == Pos::Num)
            })
            .collect();
        if entities.len() < 2 {
            return Vec::new();
        }

        let mut relations = Vec::new();
        for span in find_relation_spans(&sentence.tokens) {
            let mut left = None;
            let mut right = None;
            for entity in &entities {
                if entity.start < span.start {
                    let distance = span.start - entity.start;
                    if left.map_or(true, |(d, _)| distance < d) {
                        left = Some((distance, *entity));
                    }
                } else {
                    let distance = entity.start - span.start;
                    if right.map_or(true, |(d, _)| distance < d) {
                        right = Some((distance, *entity));
                    }
                }
            }

            if let (Some((_, subject)), Some((_, object))) = (left, right) {
                relations.push(MentionRelation::new(
                    subject.text.clone(),
                    span.phrase(&sentence.tokens),
                    object.text.clone(),
                ));
            }
        }
        relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::{EntityMention, EntityType};

    fn tok(text: &str, pos: Pos) -> Token {
        Token::new(text, pos, "", 0)
    }

    fn spans(tags: &[Pos]) -> Vec<(usize, usize)> {
        find_spans_in_tags(tags).iter().map(|s| (s.start, s.end)).collect()
    }

    #[test]
    fn test_grammar_shapes() {
        use Pos::*;
        assert_eq!(spans(&[Verb]), vec![(0, 1)]);
        assert_eq!(spans(&[Verb, Adp]), vec![(0, 2)]);
        assert_eq!(spans(&[Verb, Part, Adv, Det, Noun, Adp]), vec![(0, 6)]);
        assert_eq!(spans(&[Verb, Part, Part]), vec![(0, 3)]);
        assert_eq!(spans(&[Noun, Adp, Noun]), vec![]);
    }

    #[test]
    fn test_adjacent_verbs_give_separate_spans() {
        use Pos::*;
        // VERB(0) casa só [0,1); VERB(1) casa [1,4) e é mantido também.
        assert_eq!(spans(&[Verb, Verb, Det, Noun, Punct]), vec![(0, 1), (1, 4)]);
        // "is" [1,2) e "located in" [2,4) não se sobrepõem.
        assert_eq!(spans(&[Noun, Verb, Verb, Adp, Noun]), vec![(1, 2), (2, 4)]);
    }

    #[test]
    fn test_longest_relation_span() {
        use Pos::*;
        let best = longest_relation_span(&[Verb, Punct, Verb, Adv, Adp]).unwrap();
        assert_eq!((best.start, best.end), (2, 5));
        assert!(longest_relation_span(&[Adp, Noun]).is_none());
    }

    #[test]
    fn test_paris_is_in_france() {
        let sentence = Sentence {
            tokens: vec![
                tok("Paris", Pos::Noun),
                tok("is", Pos::Verb),
                tok("in", Pos::Adp),
                tok("France", Pos::Noun),
            ],
            entities: vec![
                EntityMention::new("Paris", EntityType::Gpe, 0, 1),
                EntityMention::new("France", EntityType::Gpe, 3, 4),
            ],
        };
        let relations = PatternExtractor::new().extract(&sentence);
        assert_eq!(relations, vec![MentionRelation::new("Paris", "is in", "France")]);
    }

    #[test]
    fn test_nearest_entities_are_paired() {
        // "Obama and Biden Visited the White House with Merkel": PROPN não
        // entra na repetição, então o span é só "Visited the".
        let sentence = Sentence {
            tokens: vec![
                tok("Obama", Pos::Propn),
                tok("and", Pos::Cconj),
                tok("Biden", Pos::Propn),
                tok("Visited", Pos::Verb),
                tok("the", Pos::Det),
                tok("White", Pos::Propn),
                tok("House", Pos::Propn),
                tok("with", Pos::Adp),
                tok("Merkel", Pos::Propn),
            ],
            entities: vec![
                EntityMention::new("Obama", EntityType::Person, 0, 1),
                EntityMention::new("Biden", EntityType::Person, 2, 3),
                EntityMention::new("Merkel", EntityType::Person, 8, 9),
                EntityMention::new("White House", EntityType::Fac, 5, 7),
            ],
        };
        let relations = PatternExtractor::new().extract(&sentence);
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].subject, "Biden");
        assert_eq!(relations[0].relation, "visited the");
        assert_eq!(relations[0].object, "White House");
    }

    #[test]
    fn test_requires_two_nominal_entities() {
        let sentence = Sentence {
            tokens: vec![tok("He", Pos::Pron), tok("visited", Pos::Verb), tok("Paris", Pos::Propn)],
            entities: vec![
                EntityMention::new("He", EntityType::Person, 0, 1),
                EntityMention::new("Paris", EntityType::Gpe, 2, 3),
            ],
        };
        assert!(PatternExtractor::new().extract(&sentence).is_empty());
    }

    #[test]
    fn test_span_without_left_entity_is_skipped() {
        let sentence = Sentence {
            tokens: vec![tok("Visit", Pos::Verb), tok("Paris", Pos::Propn), tok("and", Pos::Cconj), tok("Rome", Pos::Propn)],
            entities: vec![
                EntityMention::new("Paris", EntityType::Gpe, 1, 2),
                EntityMention::new("Rome", EntityType::Gpe, 3, 4),
            ],
        };
        assert!(PatternExtractor::new().extract(&sentence).is_empty());
    }
}
