use super::*;

fn config(chunk_size: usize, chunk_overlap: usize) -> ChunkingConfig {
    ChunkingConfig {
        chunk_size,
        chunk_overlap,
    }
}

#[test]
fn empty_input_yields_no_chunks() {
    let cfg = ChunkingConfig::default();
    assert!(split_text("", &cfg).is_empty());
    assert!(split_text("   \n\n  \n ", &cfg).is_empty());
}

#[test]
fn short_input_yields_single_chunk() {
    let cfg = ChunkingConfig::default();
    let chunks = split_text("A single short paragraph about nodes.", &cfg);
    assert_eq!(chunks, vec!["A single short paragraph about nodes."]);
}

#[test]
fn chunks_never_exceed_chunk_size() {
    let text = (0..400)
        .map(|i| format!("Sentence number {} talks about the scene tree. ", i))
        .collect::<String>();
    let cfg = config(1000, 200);

    let chunks = split_text(&text, &cfg);
    assert!(chunks.len() > 1);
    for chunk in &chunks {
        assert!(chunk.chars().count() <= 1000, "oversized chunk: {}", chunk);
    }
}

#[test]
fn chunk_count_is_deterministic() {
    let text = (0..300)
        .map(|i| format!("Paragraph {} describes signals and groups.\n\n", i))
        .collect::<String>();
    let cfg = ChunkingConfig::default();

    let first = split_text(&text, &cfg);
    let second = split_text(&text, &cfg);
    assert_eq!(first, second);
}

#[test]
fn adjacent_chunks_share_overlap() {
    let text = (0..800)
        .map(|i| format!("word{} ", i))
        .collect::<String>();
    let cfg = config(500, 100);

    let chunks = split_text(&text, &cfg);
    assert!(chunks.len() > 2);

    for pair in chunks.windows(2) {
        let first_word = pair[1]
            .split_whitespace()
            .next()
            .expect("chunk should not be empty");
        assert!(
            pair[0].contains(first_word),
            "expected '{}' from the next chunk to appear in the previous one",
            first_word
        );
    }
}

#[test]
fn paragraph_boundaries_preferred() {
    let para_one = "First paragraph. ".repeat(35);
    let para_two = "Second paragraph. ".repeat(33);
    let text = format!("{}\n\n{}", para_one.trim(), para_two.trim());
    let cfg = config(1000, 200);

    let chunks = split_text(&text, &cfg);
    assert_eq!(chunks.len(), 2);
    assert!(!chunks[0].contains("Second paragraph"));
    assert!(!chunks[1].contains("First paragraph"));
}

#[test]
fn hard_cut_handles_unbroken_text() {
    let text = "x".repeat(2500);
    let cfg = config(1000, 200);

    let chunks = split_text(&text, &cfg);
    assert_eq!(chunks.len(), 3);
    assert_eq!(chunks[0].chars().count(), 1000);
    assert_eq!(chunks[2].chars().count(), 500);
}

#[test]
fn hard_cut_respects_char_boundaries() {
    let text = "é".repeat(2100);
    let cfg = config(1000, 0);

    let chunks = split_text(&text, &cfg);
    assert_eq!(chunks.len(), 3);
    for chunk in &chunks {
        assert!(chunk.chars().all(|c| c == 'é'));
    }
}

#[test]
fn zero_chunk_size_does_not_panic() {
    let cfg = config(0, 0);

    let chunks = split_text("abc def", &cfg);
    assert!(!chunks.is_empty());
    for chunk in &chunks {
        assert_eq!(chunk.chars().count(), 1);
    }
}

#[test]
fn split_document_attaches_metadata() {
    let text = (0..300)
        .map(|i| format!("Line {} of the manual.\n", i))
        .collect::<String>();
    let cfg = ChunkingConfig::default();

    let chunks = split_document(&text, "manual.txt", &cfg);
    assert!(!chunks.is_empty());
    for (i, chunk) in chunks.iter().enumerate() {
        assert_eq!(chunk.source, "manual.txt");
        assert_eq!(chunk.chunk_index, i);
        assert!(!chunk.content.is_empty());
    }
}
