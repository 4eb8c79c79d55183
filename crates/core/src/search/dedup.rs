//! Deduplication of normalized search results by info_hash.

use std::collections::HashSet;

use super::UnifiedResult;

/// Deduplicate results by info_hash, keeping the first occurrence.
///
/// `batches` must already be in source priority order; the first source to
/// report a hash wins and later copies are dropped. Results without an
/// info_hash are never merged since the hash is the only trustworthy identity.
pub fn deduplicate_results(batches: Vec<Vec<UnifiedResult>>) -> Vec<UnifiedResult> {
    let mut seen_hashes: HashSet<String> = HashSet::new();
    let mut results = Vec::new();

    for result in batches.into_iter().flatten() {
        if result.info_hash.is_empty() {
            results.push(result);
            continue;
        }
        if seen_hashes.insert(result.info_hash.to_ascii_lowercase()) {
            results.push(result);
        }
    }

    results
}

/// Make result IDs unique within a response.
///
/// Backend-supplied IDs can collide across sources; a colliding result gets
/// a fresh sequential ID.
pub fn ensure_unique_ids(results: &mut [UnifiedResult]) {
    let existing: HashSet<String> = results.iter().map(|r| r.id.clone()).collect();
    if existing.len() == results.len() {
        return;
    }

    let mut claimed: HashSet<String> = HashSet::new();
    let mut counter = 0u64;
    for result in results.iter_mut() {
        if claimed.insert(result.id.clone()) {
            continue;
        }
        loop {
            counter += 1;
            let candidate = format!("dup-{}", counter);
            if !existing.contains(&candidate) && claimed.insert(candidate.clone()) {
                result.id = candidate;
                break;
            }
        }
    }
}
