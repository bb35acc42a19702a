//! A small in-process BM25 index. No off-the-shelf full-text engine in the
//! dependency stack exposes the dynamic-threshold scoring this needs, so the
//! ranking math is implemented directly against the standard formula.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

const K1: f64 = 1.2;
const B: f64 = 0.75;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Document {
    id: String,
    term_counts: HashMap<String, usize>,
    length: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Bm25Index {
    docs: Vec<Document>,
    doc_frequency: HashMap<String, usize>,
    avg_doc_length: f64,
}

impl Bm25Index {
    pub fn build(documents: Vec<(String, Vec<String>)>) -> Self {
        let mut docs = Vec::with_capacity(documents.len());
        let mut doc_frequency: HashMap<String, usize> = HashMap::new();
        let mut total_length = 0usize;

        for (id, tokens) in documents {
            let mut term_counts: HashMap<String, usize> = HashMap::new();
            for token in &tokens {
                *term_counts.entry(token.clone()).or_insert(0) += 1;
            }
            for term in term_counts.keys() {
                *doc_frequency.entry(term.clone()).or_insert(0) += 1;
            }
            total_length += tokens.len();
            docs.push(Document { id, term_counts, length: tokens.len() });
        }

        let avg_doc_length = if docs.is_empty() { 0.0 } else { total_length as f64 / docs.len() as f64 };

        Bm25Index { docs, doc_frequency, avg_doc_length }
    }

    /// Classic Robertson/Sparck-Jones idf, deliberately without the `+1`
    /// smoothing some BM25 variants add: terms appearing in half or more of
    /// the corpus legitimately score zero or negative here, which is what
    /// the dynamic threshold below is built to handle.
    fn idf(&self, term: &str) -> f64 {
        let n = self.docs.len() as f64;
        let df = *self.doc_frequency.get(term).unwrap_or(&0) as f64;
        ((n - df + 0.5) / (df + 0.5)).ln()
    }

    fn score_doc(&self, doc: &Document, query_terms: &[String]) -> f64 {
        let mut score = 0.0;
        for term in query_terms {
            let tf = *doc.term_counts.get(term).unwrap_or(&0) as f64;
            if tf == 0.0 {
                continue;
            }
            let idf = self.idf(term);
            let denom = tf + K1 * (1.0 - B + B * doc.length as f64 / self.avg_doc_length.max(1.0));
            score += idf * (tf * (K1 + 1.0)) / denom;
        }
        score
    }

    /// Scores every document against `query_terms`, applies the spec's
    /// dynamic threshold, and returns surviving `(doc_id, score)` pairs
    /// sorted by descending score.
    pub fn search(&self, query_terms: &[String], positive_pct: f64, negative_pct: f64) -> Vec<(String, f64)> {
        if query_terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let scored: Vec<(&Document, f64)> =
            self.docs.iter().map(|d| (d, self.score_doc(d, query_terms))).collect();

        let max_score = scored.iter().map(|(_, s)| *s).fold(f64::MIN, f64::max);
        let min_score = scored.iter().map(|(_, s)| *s).fold(f64::MAX, f64::min);

        if max_score == 0.0 && min_score == 0.0 {
            return scored
                .into_iter()
                .filter(|(d, _)| query_terms.iter().all(|t| d.term_counts.contains_key(t)))
                .map(|(d, _)| (d.id.clone(), 0.001))
                .collect();
        }

        let threshold = if max_score > 0.0 {
            max_score * positive_pct
        } else {
            max_score - negative_pct * (max_score - min_score)
        };

        let mut results: Vec<(String, f64)> = scored
            .into_iter()
            .filter(|(_, s)| *s >= threshold)
            .map(|(d, s)| (d.id.clone(), s))
            .collect();
        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc(id: &str, text: &str) -> (String, Vec<String>) {
        (id.to_string(), text.split_whitespace().map(|s| s.to_string()).collect())
    }

    #[test]
    fn exact_term_match_scores_higher_than_unrelated_document() {
        let index = Bm25Index::build(vec![
            doc("a", "customer table load pipeline"),
            doc("b", "unrelated report summary"),
        ]);
        let results = index.search(&["customer".to_string()], 0.1, 0.7);
        assert_eq!(results[0].0, "a");
    }

    #[test]
    fn empty_query_yields_no_results() {
        let index = Bm25Index::build(vec![doc("a", "customer table")]);
        assert!(index.search(&[], 0.1, 0.7).is_empty());
    }

    #[test]
    fn sentinel_score_applied_when_all_scores_zero_but_term_present_in_half_the_corpus() {
        // n=4, df=2 makes idf exactly zero, so every document scores 0.0.
        let index = Bm25Index::build(vec![
            doc("has_x_1", "x"),
            doc("has_x_2", "x"),
            doc("no_x_1", "y"),
            doc("no_x_2", "y"),
        ]);
        let results = index.search(&["x".to_string()], 0.1, 0.7);
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|(id, s)| *s == 0.001 && id.starts_with("has_x")));
    }
}
