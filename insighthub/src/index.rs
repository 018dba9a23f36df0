//! Local TF-IDF index over document chunks. Backs the structured search
//! results that sit alongside the backend's synthesized answer.

use crate::models::{ResearchDocument, SearchResult};
use std::collections::{HashMap, HashSet};

const VOCABULARY_SIZE: usize = 1000;
const MIN_DIMENSIONS: usize = 100;
const EXCERPT_CHARS: usize = 200;

#[derive(Debug, Default)]
pub struct SearchIndex {
    vocabulary: HashMap<String, usize>,
    idf_scores: HashMap<String, f32>,
}

impl SearchIndex {
    /// Builds the vocabulary and IDF table over every chunk and writes a
    /// normalized embedding into each one. Call again whenever the
    /// collection changes.
    pub fn fit(documents: &mut [ResearchDocument]) -> Self {
        let mut word_counts: HashMap<String, usize> = HashMap::new();
        let mut chunk_frequencies: HashMap<String, usize> = HashMap::new();
        let total_chunks = documents.iter().map(|d| d.chunks.len()).sum::<usize>();

        for document in documents.iter() {
            for chunk in &document.chunks {
                let words = tokenize(&chunk.text);
                let unique: HashSet<&String> = words.iter().collect();
                for word in &words {
                    *word_counts.entry(word.clone()).or_insert(0) += 1;
                }
                for word in unique {
                    *chunk_frequencies.entry(word.clone()).or_insert(0) += 1;
                }
            }
        }

        let idf_scores: HashMap<String, f32> = chunk_frequencies
            .iter()
            .map(|(word, df)| {
                let idf = (total_chunks as f32 / *df as f32).ln();
                (word.clone(), idf)
            })
            .collect();

        let mut word_freq_pairs: Vec<_> = word_counts.into_iter().collect();
        word_freq_pairs.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
        let vocabulary: HashMap<String, usize> = word_freq_pairs
            .into_iter()
            .take(VOCABULARY_SIZE)
            .enumerate()
            .map(|(idx, (word, _))| (word, idx))
            .collect();

        let index = Self {
            vocabulary,
            idf_scores,
        };

        for document in documents.iter_mut() {
            for chunk in document.chunks.iter_mut() {
                chunk.embedding = Some(index.embed(&chunk.text));
            }
        }

        log::info!(
            "indexed {} chunks across {} documents",
            total_chunks,
            documents.len()
        );
        index
    }

    /// Ranks every embedded chunk against the query by cosine similarity.
    pub fn query(
        &self,
        query: &str,
        documents: &[ResearchDocument],
        max_results: usize,
    ) -> Vec<SearchResult> {
        let query_embedding = self.embed(query);

        let mut results: Vec<SearchResult> = Vec::new();
        for document in documents {
            for chunk in &document.chunks {
                if let Some(embedding) = &chunk.embedding {
                    results.push(SearchResult {
                        doc_id: document.id.clone(),
                        doc_name: document.name.clone(),
                        text: excerpt(&chunk.text),
                        page: chunk.page,
                        score: cosine_similarity(&query_embedding, embedding),
                    });
                }
            }
        }

        results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(max_results);
        results
    }

    fn embed(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0; self.vocabulary.len().max(MIN_DIMENSIONS)];
        let words = tokenize(text);
        let total_words = words.len() as f32;
        let word_counts = count_words(&words);

        for (word, count) in word_counts {
            if let Some(&idx) = self.vocabulary.get(&word) {
                if idx < embedding.len() {
                    let tf = count as f32 / total_words;
                    let idf = self.idf_scores.get(&word).unwrap_or(&1.0);
                    embedding[idx] = tf * idf;
                }
            }
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for value in embedding.iter_mut() {
                *value /= norm;
            }
        }
        embedding
    }
}

fn tokenize(text: &str) -> Vec<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| {
            word.chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
        })
        .filter(|word| word.len() > 2)
        .collect()
}

fn count_words(words: &[String]) -> HashMap<String, usize> {
    let mut counts = HashMap::new();
    for word in words {
        *counts.entry(word.clone()).or_insert(0) += 1;
    }
    counts
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let min_len = a.len().min(b.len());

    let dot_product: f32 = a[..min_len].iter().zip(b[..min_len].iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b[..min_len].iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot_product / (norm_a * norm_b)
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > EXCERPT_CHARS {
        let head: String = text.chars().take(EXCERPT_CHARS).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}
