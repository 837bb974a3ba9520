#![allow(dead_code)]

pub mod source;
pub mod summarizer;
pub mod translator;

/// Build a transcript of one paragraph per word. Each paragraph is the word
/// followed by 150 one-token fillers, so with a 200-token chunk size every
/// paragraph becomes exactly one chunk.
pub fn transcript(words: &[&str]) -> String {
    words
        .iter()
        .map(|word| format!("{}{}", word, " the".repeat(150)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

pub const NATO: [&str; 10] = [
    "alpha", "bravo", "charlie", "delta", "echo", "foxtrot", "golf", "hotel", "india", "juliet",
];
