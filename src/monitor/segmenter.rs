// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Sentence segmentation used as the unit of comparison

/// Characters that end a sentence
const SENTENCE_DELIMITERS: [char; 3] = ['.', '!', '?'];

/// Fragments this long or shorter are treated as noise (labels, dates, ...)
pub const MIN_SENTENCE_CHARS: usize = 15;

/// Split normalized text into lowercase, trimmed fragments longer than
/// [`MIN_SENTENCE_CHARS`], in source order.
pub fn segment(text: &str) -> Vec<String> {
    text.split(&SENTENCE_DELIMITERS[..])
        .map(str::trim)
        .filter(|fragment| fragment.chars().count() > MIN_SENTENCE_CHARS)
        .map(str::to_lowercase)
        .collect()
}
