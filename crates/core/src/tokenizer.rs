//! Token estimation shared by the chunker and the user-facing counts.
//!
//! Both sides must use the same encoder or chunk budgets stop meaning anything.

use std::sync::LazyLock;

use tiktoken_rs::CoreBPE;

/// Name of the byte-pair encoding used for every count.
pub const ENCODING: &str = "cl100k_base";

static BPE: LazyLock<CoreBPE> =
    LazyLock::new(|| tiktoken_rs::cl100k_base().expect("cl100k_base ranks are embedded"));

/// Count tokens in `text` with the fixed [`ENCODING`].
///
/// Byte-pair counts only grow when the appended text starts at a word
/// boundary: `"summar"` costs more tokens than `"summary"`. Chunk budgets are
/// sums over whole words, which always grow.
pub fn count_tokens(text: &str) -> usize {
    if text.is_empty() {
        return 0;
    }
    BPE.encode_ordinary(text).len()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn empty_is_zero() {
        assert_eq!(count_tokens(""), 0);
    }

    #[test]
    fn counts_common_words() {
        assert_eq!(count_tokens("hello world"), 2);
    }

    #[test]
    fn deterministic() {
        let text = "The quick brown fox jumps over the lazy dog. Ünïcödé too — 日本語.";
        assert_eq!(count_tokens(text), count_tokens(text));
        assert!(count_tokens(text) > 0);
    }

    #[test]
    fn mid_word_appends_can_merge_tokens() {
        assert!(count_tokens("summar") >= count_tokens("summary"));
    }

    proptest! {
        #[test]
        fn never_panics_on_arbitrary_text(text in "\\PC{0,500}") {
            let _ = count_tokens(&text);
        }

        #[test]
        fn appending_whitespace_delimited_words_never_lowers_count(
            a in "[a-z]{1,10}( [a-z]{1,10}){0,20}",
            b in "( [a-z]{1,10}){1,10}",
        ) {
            let joined = format!("{a}{b}");
            prop_assert!(count_tokens(&joined) >= count_tokens(&a));
        }

        #[test]
        fn nonempty_text_has_tokens(text in "\\PC{1,200}") {
            prop_assert!(count_tokens(&text) > 0);
        }
    }
}
