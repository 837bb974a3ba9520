//! Token-bounded, lossless text segmentation.
//!
//! Text is cut into units of `whitespace* non-whitespace+`, which is also how the
//! encoder pre-splits words, so per-unit token counts sum to (almost exactly) the
//! count of the joined text. Chunks are built greedily from units and pulled back
//! to the strongest nearby boundary (paragraph, line, sentence, word).

use crate::{
    error::{Result, TldwError},
    tokenizer::count_tokens,
    types::Chunk,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
enum Boundary {
    Word,
    Sentence,
    Line,
    Paragraph,
}

#[derive(Debug)]
struct Unit {
    start: usize,
    end: usize,
    tokens: usize,
    /// Strength of the gap between the previous unit and this one.
    boundary_before: Boundary,
}

/// Split `text` into chunks of at most `chunk_size` tokens, each starting up to
/// `overlap_size` tokens before the end of the previous one.
///
/// A single unit larger than `chunk_size` becomes its own oversized chunk.
pub fn split(text: &str, chunk_size: usize, overlap_size: usize) -> Result<Vec<Chunk>> {
    if chunk_size == 0 {
        return Err(TldwError::config("chunk size must be greater than zero"));
    }
    if overlap_size >= chunk_size {
        return Err(TldwError::config(format!(
            "overlap size ({}) must be smaller than chunk size ({})",
            overlap_size, chunk_size
        )));
    }
    if text.is_empty() {
        return Ok(Vec::new());
    }

    let units = segment(text);
    let mut prefix = Vec::with_capacity(units.len() + 1);
    prefix.push(0usize);
    for unit in &units {
        prefix.push(prefix[prefix.len() - 1] + unit.tokens);
    }
    let span = |from: usize, to: usize| prefix[to] - prefix[from];

    let mut chunks = Vec::new();
    let mut start = 0;
    let mut fresh = 0;

    loop {
        // Always take at least the first unit nobody has covered yet.
        let mut end = fresh + 1;
        while end < units.len() && span(start, end + 1) <= chunk_size {
            end += 1;
        }

        let stop = if end < units.len() {
            preferred_break(&units, &span, start, fresh + 1, end, chunk_size / 2)
        } else {
            end
        };

        let start_offset = units[start].start;
        let end_offset = units[stop - 1].end;
        let chunk_text = &text[start_offset..end_offset];
        chunks.push(Chunk {
            index: chunks.len(),
            text: chunk_text.to_string(),
            start_offset,
            fresh_offset: units[fresh].start,
            end_offset,
            token_count: count_tokens(chunk_text),
        });

        if stop == units.len() {
            break;
        }

        let next_tokens = units[stop].tokens;
        let mut next_start = stop;
        while next_start > start + 1
            && span(next_start - 1, stop) <= overlap_size
            && span(next_start - 1, stop) + next_tokens <= chunk_size
        {
            next_start -= 1;
        }

        start = next_start;
        fresh = stop;
    }

    tracing::debug!(
        units = units.len(),
        chunks = chunks.len(),
        chunk_size,
        overlap_size,
        "split text into chunks"
    );

    Ok(chunks)
}

/// Pick the chunk end in `lo..=hi` at the strongest boundary that keeps at least
/// `min_fill` tokens in the chunk. Later positions win ties.
fn preferred_break(
    units: &[Unit],
    span: &impl Fn(usize, usize) -> usize,
    start: usize,
    lo: usize,
    hi: usize,
    min_fill: usize,
) -> usize {
    let mut best = hi;
    for candidate in (lo..=hi).rev() {
        if span(start, candidate) < min_fill {
            break;
        }
        if units[candidate].boundary_before > units[best].boundary_before {
            best = candidate;
        }
    }
    best
}

fn segment(text: &str) -> Vec<Unit> {
    let mut starts = vec![0];
    let mut prev_is_space = true;
    for (i, c) in text.char_indices() {
        let is_space = c.is_whitespace();
        if is_space && !prev_is_space {
            starts.push(i);
        }
        prev_is_space = is_space;
    }

    // Trailing whitespace belongs to the last word.
    if starts.len() > 1 && text[starts[starts.len() - 1]..].trim().is_empty() {
        starts.pop();
    }

    let mut units: Vec<Unit> = Vec::with_capacity(starts.len());
    for (i, &start) in starts.iter().enumerate() {
        let end = starts.get(i + 1).copied().unwrap_or(text.len());
        let piece = &text[start..end];
        let boundary_before = match units.last() {
            None => Boundary::Paragraph,
            Some(prev) => classify_gap(&text[prev.start..prev.end], piece),
        };
        units.push(Unit {
            start,
            end,
            tokens: count_tokens(piece),
            boundary_before,
        });
    }
    units
}

fn classify_gap(prev: &str, next: &str) -> Boundary {
    let gap = &next[..next.len() - next.trim_start().len()];
    let newlines = gap.matches('\n').count();
    if newlines >= 2 {
        Boundary::Paragraph
    } else if newlines == 1 {
        Boundary::Line
    } else if ends_sentence(prev) {
        Boundary::Sentence
    } else {
        Boundary::Word
    }
}

fn ends_sentence(word: &str) -> bool {
    let trimmed = word.trim_end_matches(['"', '\'', ')', ']', '»', '”', '’']);
    trimmed.ends_with(['.', '!', '?', '…'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn rebuild(chunks: &[Chunk]) -> String {
        chunks.iter().map(Chunk::fresh_text).collect()
    }

    fn words(n: usize) -> String {
        (0..n).map(|_| "apple").collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(split("", 200, 20).unwrap().is_empty());
    }

    #[test]
    fn overlap_not_smaller_than_chunk_is_config_error() {
        let err = split("some text", 200, 200).unwrap_err();
        assert!(matches!(err, TldwError::Config { .. }));
        let err = split("some text", 200, 500).unwrap_err();
        assert!(matches!(err, TldwError::Config { .. }));
    }

    #[test]
    fn zero_chunk_size_is_config_error() {
        assert!(matches!(
            split("text", 0, 0),
            Err(TldwError::Config { .. })
        ));
    }

    #[test]
    fn small_text_is_single_chunk() {
        let chunks = split("Short text.", 200, 10).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Short text.");
        assert_eq!(chunks[0].start_offset, 0);
        assert_eq!(chunks[0].fresh_offset, 0);
        assert_eq!(chunks[0].end_offset, 11);
        assert_eq!(chunks[0].overlap_text(), "");
    }

    #[test]
    fn whitespace_only_text_is_kept() {
        let chunks = split("  \n ", 200, 0).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(rebuild(&chunks), "  \n ");
    }

    #[test]
    fn breaks_at_paragraph_boundary() {
        let first = format!("alpha {}.", words(120));
        let second = format!("bravo {}.", words(120));
        let text = format!("{first}\n\n{second}");

        let chunks = split(&text, 200, 0).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].text, first);
        assert!(chunks[1].text.trim_start().starts_with("bravo"));
        assert_eq!(rebuild(&chunks), text);
    }

    #[test]
    fn prefers_sentence_end_over_word() {
        let text = format!("{}. {}", words(150), words(150));
        let chunks = split(&text, 200, 0).unwrap();
        assert!(chunks.len() >= 2);
        assert!(chunks[0].text.ends_with('.'));
    }

    #[test]
    fn oversized_unit_is_emitted_whole() {
        let long_word = "x".repeat(3000);
        let text = format!("intro {long_word} outro");
        let chunks = split(&text, 20, 5).unwrap();

        let holder = chunks
            .iter()
            .find(|c| c.text.contains(&long_word))
            .expect("long word must survive intact");
        assert!(holder.token_count > 20);
        assert_eq!(rebuild(&chunks), text);
    }

    #[test]
    fn overlap_repeats_previous_tail() {
        let text = words(600);
        let chunks = split(&text, 200, 30).unwrap();
        assert!(chunks.len() >= 3);
        for pair in chunks.windows(2) {
            let (prev, next) = (&pair[0], &pair[1]);
            assert_eq!(next.fresh_offset, prev.end_offset);
            assert!(next.start_offset < next.fresh_offset);
            assert!(prev.text.ends_with(next.overlap_text()));
            assert!(count_tokens(next.overlap_text()) <= 30);
        }
    }

    #[test]
    fn chunk_indices_are_sequential() {
        let chunks = split(&words(1000), 200, 50).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn fresh_parts_rebuild_original(
            text in "\\PC{0,800}",
            chunk_size in 2usize..80,
            overlap_pct in 0usize..100,
        ) {
            let overlap = chunk_size * overlap_pct / 100;
            let chunks = split(&text, chunk_size, overlap).unwrap();
            prop_assert_eq!(rebuild(&chunks), text);
        }

        #[test]
        fn structured_text_rebuilds(
            text in "[a-z .!?\n]{0,1500}",
            chunk_size in 2usize..60,
            overlap in 0usize..2,
        ) {
            let chunks = split(&text, chunk_size, overlap).unwrap();
            prop_assert_eq!(rebuild(&chunks), text);
        }

        #[test]
        fn chunks_respect_budget_and_overlap(
            text in "[a-z]{1,8}( [a-z]{1,8}){0,400}",
            chunk_size in 10usize..120,
            overlap_pct in 0usize..90,
        ) {
            let overlap = chunk_size * overlap_pct / 100;
            let chunks = split(&text, chunk_size, overlap).unwrap();
            for chunk in &chunks {
                prop_assert!(chunk.end_offset > chunk.start_offset);
                let single_unit = !chunk.text.trim().contains(' ');
                prop_assert!(chunk.token_count <= chunk_size || single_unit);
                prop_assert!(count_tokens(chunk.overlap_text()) <= overlap);
            }
            for pair in chunks.windows(2) {
                prop_assert_eq!(pair[1].fresh_offset, pair[0].end_offset);
                prop_assert!(pair[1].start_offset > pair[0].start_offset);
            }
        }
    }
}
