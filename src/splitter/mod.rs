#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};
use tracing::debug;

/// A chunk of the source document ready for embedding
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentChunk {
    /// The chunk text
    pub content: String,
    /// Identity of the source file this chunk came from
    pub source: String,
    /// The index of this chunk within the document
    pub chunk_index: usize,
}

/// Configuration for document chunking
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ChunkingConfig {
    /// Target chunk size in characters
    pub chunk_size: usize,
    /// Overlap in characters between adjacent chunks
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    #[inline]
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
        }
    }
}

/// Split boundaries in order of preference. Paragraphs first, then lines,
/// then sentences, then words. Text with none of these gets a hard cut.
const SEPARATORS: [&str; 4] = ["\n\n", "\n", ". ", " "];

/// Split a document into overlapping chunks and attach source metadata
#[inline]
pub fn split_document(text: &str, source: &str, config: &ChunkingConfig) -> Vec<DocumentChunk> {
    split_text(text, config)
        .into_iter()
        .enumerate()
        .map(|(chunk_index, content)| DocumentChunk {
            content,
            source: source.to_string(),
            chunk_index,
        })
        .collect()
}

/// Split text into chunks of at most `chunk_size` characters, preferring
/// semantic boundaries and carrying `chunk_overlap` characters of trailing
/// context into each following chunk
#[inline]
pub fn split_text(text: &str, config: &ChunkingConfig) -> Vec<String> {
    if text.trim().is_empty() {
        return Vec::new();
    }

    let fragments = split_fragments(text, &SEPARATORS, config.chunk_size);
    let chunks = merge_fragments(&fragments, config);

    debug!(
        "Split {} characters into {} chunks (size {}, overlap {})",
        text.chars().count(),
        chunks.len(),
        config.chunk_size,
        config.chunk_overlap
    );

    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Break text into fragments no longer than `max_len` characters, trying
/// each separator in order and recursing into oversized pieces with the
/// remaining separators
fn split_fragments(text: &str, separators: &[&str], max_len: usize) -> Vec<String> {
    if char_len(text) <= max_len {
        return vec![text.to_string()];
    }

    match separators.split_first() {
        Some((separator, rest)) => {
            let mut fragments = Vec::new();
            for part in text.split_inclusive(*separator) {
                if char_len(part) <= max_len {
                    fragments.push(part.to_string());
                } else {
                    fragments.extend(split_fragments(part, rest, max_len));
                }
            }
            fragments
        }
        None => hard_cut(text, max_len),
    }
}

/// Last-resort split at fixed character offsets, never inside a code point
fn hard_cut(text: &str, max_len: usize) -> Vec<String> {
    // chunks() panics on a zero window; a chunk_size of 0 degrades to
    // single-character cuts instead
    let max_len = max_len.max(1);
    let chars: Vec<char> = text.chars().collect();
    chars
        .chunks(max_len)
        .map(|window| window.iter().collect())
        .collect()
}

/// Greedily pack fragments into chunks up to `chunk_size`, seeding each new
/// chunk with the trailing fragments of the previous one so adjacent chunks
/// share up to `chunk_overlap` characters
fn merge_fragments(fragments: &[String], config: &ChunkingConfig) -> Vec<String> {
    let mut chunks: Vec<String> = Vec::new();
    let mut window: Vec<&String> = Vec::new();
    let mut window_len = 0usize;

    for fragment in fragments {
        let fragment_len = char_len(fragment);

        if window_len + fragment_len > config.chunk_size && !window.is_empty() {
            push_chunk(&mut chunks, &window);

            // Keep the tail of the window as overlap for the next chunk,
            // dropping leading fragments until it fits both the overlap
            // budget and the chunk size together with the new fragment.
            while !window.is_empty()
                && (window_len > config.chunk_overlap
                    || window_len + fragment_len > config.chunk_size)
            {
                let removed = window.remove(0);
                window_len -= char_len(removed);
            }
        }

        window.push(fragment);
        window_len += fragment_len;
    }

    push_chunk(&mut chunks, &window);

    chunks
}

fn push_chunk(chunks: &mut Vec<String>, window: &[&String]) {
    let mut chunk = String::new();
    for fragment in window {
        chunk.push_str(fragment);
    }

    let trimmed = chunk.trim();
    if !trimmed.is_empty() {
        chunks.push(trimmed.to_string());
    }
}
