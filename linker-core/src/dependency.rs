//! # Relações por Caminho de Dependência
//!
//! Estratégia alternativa ao casamento de padrões: para cada par de
//! entidades da sentença, segue o caminho entre elas na árvore de
//! dependências e transforma os tokens do meio numa frase de relação.
//!
//! ```text
//! Obama  was   born  in   Hawaii
//!   │     │     ▲    ▲ │     ▲
//!   └nsubjpass──┘    │ └pobj─┘
//!         └auxpass┘  └prep (born)
//! ```
//!
//! Caminho Obama → born → in → Hawaii; sem as pontas sobra "born in".
//!
//! ## Regras
//!
//! 1. A âncora de cada entidade é o token do span cujo regente está fora
//!    dele ([`Sentence::anchor_of`]).
//! 2. Caminhos com mais de um VERB ou mais de um substantivo fora das
//!    entidades são descartados (ligam orações diferentes).
//! 3. Removem-se auxiliares, tokens das entidades e substantivos que são
//!    sujeito, objeto ou conjunção. Sobrando nada, o par é descartado.
//! 4. Se o primeiro token restante é `prep`, a ordem é invertida e sujeito e
//!    objeto trocam de lugar ("X in Y" vira "Y ... in X").
//! 5. No modo estrito, os tokens restantes precisam casar com a gramática de
//!    [`crate::patterns`]; fica só o maior trecho que casa.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::annotation::{EntityMention, Pos, Sentence, Token};
use crate::patterns::longest_relation_span;
use crate::relation::{MentionRelation, RelationExtractor};

/// Índices dos tokens no caminho da árvore entre duas âncoras, inclusive.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DependencyPath {
    pub tokens: Vec<usize>,
}

impl DependencyPath {
    /// Caminho único `from → ancestral comum → to`.
    ///
    /// `None` se os tokens não têm ancestral comum (análise quebrada, com
    /// mais de uma raiz ou com ciclo).
    pub fn between(sentence: &Sentence, from: usize, to: usize) -> Option<Self> {
        let up_from = ancestors(sentence, from);
        let up_to = ancestors(sentence, to);

        let (j, i) = up_to
            .iter()
            .enumerate()
            .find_map(|(j, node)| up_from.iter().position(|n| n == node).map(|i| (j, i)))?;

        let mut tokens = up_from[..=i].to_vec();
        tokens.extend(up_to[..j].iter().rev());
        Some(Self { tokens })
    }

    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

/// `i`, seu regente, o regente do regente... até a raiz.
fn ancestors(sentence: &Sentence, i: usize) -> Vec<usize> {
    let mut chain = vec![i];
    let mut current = i;
    while chain.len() <= sentence.tokens.len() {
        let head = sentence.head_of(current);
        if head == current || chain.contains(&head) {
            break;
        }
        chain.push(head);
        current = head;
    }
    chain
}

/// Papéis de sujeito, objeto ou conjunção.
fn is_argument_role(dep: &str) -> bool {
    let dep = dep.to_ascii_lowercase();
    dep.starts_with("nsubj")
        || dep.starts_with("csubj")
        || matches!(dep.as_str(), "dobj" | "obj" | "iobj" | "pobj" | "conj")
}

/// Extrator por caminho de dependência. `strict` ativa a revalidação pela
/// gramática de padrões.
#[derive(Debug, Clone, Copy, Default)]
pub struct DependencyPathExtractor {
    strict: bool,
}

impl DependencyPathExtractor {
    pub fn new(strict: bool) -> Self {
        Self { strict }
    }

    fn relate(&self, sentence: &Sentence, first: &EntityMention, second: &EntityMention) -> Option<MentionRelation> {
        let from = sentence.anchor_of(first)?;
        let to = sentence.anchor_of(second)?;
        if from == to {
            return None;
        }
        let path = DependencyPath::between(sentence, from, to)?;

        let inner: Vec<&Token> = path
            .tokens
            .iter()
            .filter(|&&i| !first.contains(i) && !second.contains(i))
            .map(|&i| &sentence.tokens[i])
            .collect();

        let verbs = inner.iter().filter(|t| t.pos == Pos::Verb).count();
        let nouns = inner.iter().filter(|t| t.pos.is_noun_like()).count();
        if verbs > 1 || nouns > 1 {
            trace!(subject = %first.text, object = %second.text, verbs, nouns, "Ambiguous dependency path");
            return None;
        }

        let mut remaining: Vec<&Token> = inner
            .into_iter()
            .filter(|t| t.pos != Pos::Aux && !(t.pos.is_noun_like() && is_argument_role(&t.dep)))
            .collect();
        if remaining.is_empty() {
            return None;
        }

        let (mut subject, mut object) = (first, second);
        if remaining[0].dep.eq_ignore_ascii_case("prep") {
            remaining.reverse();
            std::mem::swap(&mut subject, &mut object);
        }

        if self.strict {
            let tags: Vec<Pos> = remaining.iter().map(|t| t.pos).collect();
            let span = longest_relation_span(&tags)?;
            remaining = remaining[span.start..span.end].to_vec();
        }

        let phrase = remaining
            .iter()
            .map(|t| t.text.as_str())
            .collect::<Vec<_>>()
            .join(" ")
            .to_lowercase();
        Some(MentionRelation::new(subject.text.clone(), phrase, object.text.clone()))
    }
}

impl RelationExtractor for DependencyPathExtractor {
    fn name(&self) -> &'static str {
        if self.strict {
            "dependency_path_strict"
        } else {
            "dependency_path"
        }
    }

    fn extract(&self, sentence: &Sentence) -> Vec<MentionRelation> {
        let entities = &sentence.entities;
        let mut relations = Vec::new();
        for (i, first) in entities.iter().enumerate() {
            for second in &entities[i + 1..] {
                if let Some(relation) = self.relate(sentence, first, second) {
                    relations.push(relation);
                }
            }
        }
        relations
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::annotation::EntityType;

    /// "Obama was born in Hawaii"
    fn born_in() -> Sentence {
        Sentence {
            tokens: vec![
                Token::new("Obama", Pos::Propn, "nsubjpass", 2),
                Token::new("was", Pos::Aux, "auxpass", 2),
                Token::new("born", Pos::Verb, "ROOT", 2),
                Token::new("in", Pos::Adp, "prep", 2),
                Token::new("Hawaii", Pos::Propn, "pobj", 3),
            ],
            entities: vec![
                EntityMention::new("Obama", EntityType::Person, 0, 1),
                EntityMention::new("Hawaii", EntityType::Gpe, 4, 5),
            ],
        }
    }

    /// "Paris is in France", com "is" como auxiliar.
    fn paris_in_france() -> Sentence {
        Sentence {
            tokens: vec![
                Token::new("Paris", Pos::Propn, "nsubj", 1),
                Token::new("is", Pos::Aux, "ROOT", 1),
                Token::new("in", Pos::Adp, "prep", 1),
                Token::new("France", Pos::Propn, "pobj", 2),
            ],
            entities: vec![
                EntityMention::new("Paris", EntityType::Gpe, 0, 1),
                EntityMention::new("France", EntityType::Gpe, 3, 4),
            ],
        }
    }

    #[test]
    fn test_path_between() {
        let sentence = born_in();
        let path = DependencyPath::between(&sentence, 0, 4).unwrap();
        assert_eq!(path.tokens, vec![0, 2, 3, 4]);
        let back = DependencyPath::between(&sentence, 4, 0).unwrap();
        assert_eq!(back.tokens, vec![4, 3, 2, 0]);
    }

    #[test]
    fn test_path_without_common_root() {
        // Duas raízes: não existe caminho.
        let sentence = Sentence {
            tokens: vec![Token::new("A", Pos::Propn, "ROOT", 0), Token::new("B", Pos::Propn, "ROOT", 1)],
            entities: vec![],
        };
        assert!(DependencyPath::between(&sentence, 0, 1).is_none());
    }

    #[test]
    fn test_born_in() {
        let relations = DependencyPathExtractor::new(false).extract(&born_in());
        assert_eq!(relations, vec![MentionRelation::new("Obama", "born in", "Hawaii")]);
    }

    #[test]
    fn test_two_verbs_on_path_yield_nothing() {
        // "Obama said Merkel visited Paris"
        let sentence = Sentence {
            tokens: vec![
                Token::new("Obama", Pos::Propn, "nsubj", 1),
                Token::new("said", Pos::Verb, "ROOT", 1),
                Token::new("Merkel", Pos::Propn, "nsubj", 3),
                Token::new("visited", Pos::Verb, "ccomp", 1),
                Token::new("Paris", Pos::Propn, "dobj", 3),
            ],
            entities: vec![
                EntityMention::new("Obama", EntityType::Person, 0, 1),
                EntityMention::new("Merkel", EntityType::Person, 2, 3),
                EntityMention::new("Paris", EntityType::Gpe, 4, 5),
            ],
        };
        let relations = DependencyPathExtractor::new(false).extract(&sentence);
        // Obama–Merkel e Obama–Paris passam por "said" e "visited".
        assert_eq!(relations, vec![MentionRelation::new("Merkel", "visited", "Paris")]);
    }

    #[test]
    fn test_prep_first_reverses_direction() {
        let relations = DependencyPathExtractor::new(false).extract(&paris_in_france());
        assert_eq!(relations, vec![MentionRelation::new("France", "in", "Paris")]);
    }

    #[test]
    fn test_strict_requires_grammar_match() {
        let strict = DependencyPathExtractor::new(true);
        assert_eq!(
            strict.extract(&born_in()),
            vec![MentionRelation::new("Obama", "born in", "Hawaii")]
        );
        // Só "in" sobra: sem VERB, a gramática não casa.
        assert!(strict.extract(&paris_in_france()).is_empty());
    }

    #[test]
    fn test_argument_nouns_are_removed() {
        // "Apple hired the CEO of Microsoft": CEO é dobj e sai do caminho.
        let sentence = Sentence {
            tokens: vec![
                Token::new("Apple", Pos::Propn, "nsubj", 1),
                Token::new("hired", Pos::Verb, "ROOT", 1),
                Token::new("the", Pos::Det, "det", 3),
                Token::new("CEO", Pos::Noun, "dobj", 1),
                Token::new("of", Pos::Adp, "prep", 3),
                Token::new("Microsoft", Pos::Propn, "pobj", 4),
            ],
            entities: vec![
                EntityMention::new("Apple", EntityType::Org, 0, 1),
                EntityMention::new("Microsoft", EntityType::Org, 5, 6),
            ],
        };
        let relations = DependencyPathExtractor::new(false).extract(&sentence);
        assert_eq!(relations, vec![MentionRelation::new("Apple", "hired of", "Microsoft")]);
    }
}
