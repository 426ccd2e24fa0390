// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Set-membership diff between sentence sequences

use std::collections::HashSet;

/// Sentences in `current` with no case-insensitive match in `previous`.
///
/// Output keeps `current`'s order and reports each new sentence once.
pub fn diff(current: &[String], previous: &[String]) -> Vec<String> {
    let known: HashSet<String> = previous.iter().map(|s| s.to_lowercase()).collect();
    let mut reported: HashSet<String> = HashSet::new();

    current
        .iter()
        .filter(|sentence| {
            let key = sentence.to_lowercase();
            !known.contains(&key) && reported.insert(key)
        })
        .cloned()
        .collect()
}
