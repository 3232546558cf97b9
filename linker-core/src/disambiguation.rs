//! # Named Entity Disambiguation (NED)
//!
//! Escolhe, entre os candidatos devolvidos pela base de conhecimento, o
//! referente mais provável de uma menção. Por exemplo, "Jordan" pode ser o
//! país, o rio ou o jogador de basquete.
//!
//! ## Política de ranking (determinística)
//!
//! 1. Sem candidatos → nenhuma resolução.
//! 2. Um único candidato → ele mesmo, sem ranking.
//! 3. Algum candidato com nome idêntico à menção → ele, independente da
//!    popularidade dos outros.
//! 4. Maior número de backlinks (ausente conta como zero). Se só um
//!    candidato tem a contagem máxima, ele vence.
//! 5. Entre os empatados, menor distância de Levenshtein entre menção e nome.
//! 6. Empate persistente → o primeiro na ordem de geração.
//!
//! O passo 6 é arbitrário: é uma heurística conhecida, não uma garantia de
//! acerto.

use tracing::trace;

use crate::candidates::Candidate;
use crate::mention::collapse_whitespace;

/// Desambiguador sem estado; `resolve` é puro e idempotente.
#[derive(Debug, Clone, Copy, Default)]
pub struct Disambiguator;

impl Disambiguator {
    pub fn new() -> Self {
        Self
    }

    /// Seleciona um candidato para `mention` ou `None` se a lista é vazia.
    pub fn resolve<'a>(&self, mention: &str, candidates: &'a [Candidate]) -> Option<&'a Candidate> {
        match candidates {
            [] => None,
            [only] => Some(only),
            _ => Some(rank(mention, candidates)),
        }
    }

    /// Se `resolve` vai precisar das contagens de backlinks: falso para um
    /// único candidato ou quando algum nome coincide com a menção.
    pub fn needs_referrals(&self, mention: &str, candidates: &[Candidate]) -> bool {
        if candidates.len() < 2 {
            return false;
        }
        let folded = fold(mention);
        !candidates.iter().any(|c| fold(&c.name) == folded)
    }
}

/// Forma usada nas comparações de nome: espaços colapsados, minúsculas.
fn fold(s: &str) -> String {
    collapse_whitespace(s).to_lowercase()
}

/// Ranking completo; `candidates` tem pelo menos dois elementos.
fn rank<'a>(mention: &str, candidates: &'a [Candidate]) -> &'a Candidate {
    let folded = fold(mention);

    if let Some(exact) = candidates.iter().find(|c| fold(&c.name) == folded) {
        trace!(mention, page = %exact.page, "Exact name match");
        return exact;
    }

    let max = candidates
        .iter()
        .map(Candidate::referral_count)
        .max()
        .unwrap_or(0);
    let tied: Vec<&Candidate> = candidates
        .iter()
        .filter(|c| c.referral_count() == max)
        .collect();

    if let [winner] = tied.as_slice() {
        trace!(mention, page = %winner.page, referrals = max, "Most referred candidate");
        return *winner;
    }

    let mut best = tied[0];
    let mut best_distance = usize::MAX;
    for candidate in tied {
        let distance = strsim::levenshtein(&folded, &fold(&candidate.name));
        if distance == 0 {
            return candidate;
        }
        // Estritamente menor: em empate fica o primeiro encontrado.
        if distance < best_distance {
            best_distance = distance;
            best = candidate;
        }
    }
    trace!(mention, page = %best.page, distance = best_distance, "Tie broken by edit distance");
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(name: &str, referrals: Option<u64>) -> Candidate {
        let page = format!("http://en.wikipedia.org/wiki/{}", name.replace(' ', "_"));
        Candidate {
            name: name.to_string(),
            page,
            item: format!("dbr:{}", name.replace(' ', "_")),
            referrals,
        }
    }

    #[test]
    fn test_empty_candidates() {
        assert!(Disambiguator::new().resolve("Paris", &[]).is_none());
    }

    #[test]
    fn test_single_candidate_returned_directly() {
        let candidates = vec![candidate("Twitter", Some(50))];
        let resolved = Disambiguator::new().resolve("twitter inc", &candidates).unwrap();
        assert_eq!(resolved.name, "Twitter");
    }

    #[test]
    fn test_tie_broken_by_edit_distance() {
        let candidates = vec![candidate("Jordan", Some(10)), candidate("Michael Jordan", Some(10))];
        let resolved = Disambiguator::new().resolve("Michael Jordan", &candidates).unwrap();
        assert_eq!(resolved.name, "Michael Jordan");
    }

    #[test]
    fn test_closest_name_wins_tie() {
        let candidates = vec![
            candidate("Michael Jordan (footballer)", Some(10)),
            candidate("Michael B. Jordan", Some(10)),
        ];
        let resolved = Disambiguator::new().resolve("Michael Jordan", &candidates).unwrap();
        assert_eq!(resolved.name, "Michael B. Jordan");
    }

    #[test]
    fn test_exact_name_beats_popularity() {
        let candidates = vec![
            candidate("Paris Hilton", Some(5_000)),
            candidate("Paris", Some(3)),
            candidate("Paris, Texas", Some(900)),
        ];
        let resolved = Disambiguator::new().resolve("Paris", &candidates).unwrap();
        assert_eq!(resolved.name, "Paris");
    }

    #[test]
    fn test_most_referred_wins() {
        let candidates = vec![
            candidate("Jordan River", Some(12)),
            candidate("Jordan (country)", Some(800)),
            candidate("Jordan Brand", None),
        ];
        let resolved = Disambiguator::new().resolve("Jordan", &candidates).unwrap();
        assert_eq!(resolved.name, "Jordan (country)");
    }

    #[test]
    fn test_missing_counts_treated_as_zero() {
        let candidates = vec![candidate("Springfield, Ohio", None), candidate("Springfield, Illinois", Some(0))];
        // Todos com zero: desempate pela distância de edição.
        let resolved = Disambiguator::new().resolve("Springfield", &candidates).unwrap();
        assert_eq!(resolved.name, "Springfield, Ohio");
    }

    #[test]
    fn test_blank_names_and_empty_mention() {
        let candidates = vec![candidate("", Some(1)), candidate("X", Some(1))];
        let resolved = Disambiguator::new().resolve("", &candidates).unwrap();
        // Menção vazia casa exatamente com o nome vazio.
        assert_eq!(resolved.name, "");

        let resolved = Disambiguator::new().resolve("Y", &candidates).unwrap();
        assert_eq!(resolved.name, "");
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let candidates = vec![
            candidate("New York City", Some(40)),
            candidate("New York (state)", Some(40)),
            candidate("New York, Lincolnshire", Some(2)),
        ];
        let d = Disambiguator::new();
        let first = d.resolve("New York", &candidates).cloned();
        let second = d.resolve("New York", &candidates).cloned();
        assert_eq!(first, second);
        assert_eq!(first.unwrap().name, "New York City");
    }

    #[test]
    fn test_needs_referrals_only_when_ranking() {
        let d = Disambiguator::new();
        assert!(!d.needs_referrals("Paris", &[]));
        assert!(!d.needs_referrals("Paris", &[candidate("Paris, Texas", None)]));

        let homonyms = vec![candidate("Paris, Texas", None), candidate("Paris", None)];
        assert!(!d.needs_referrals("  PARIS ", &homonyms));

        let jordans = vec![candidate("Michael Jordan", None), candidate("Michael B. Jordan", None)];
        assert!(d.needs_referrals("Jordan", &jordans));
    }
}
