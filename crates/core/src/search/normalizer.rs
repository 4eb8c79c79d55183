//! Conversion of raw adapter output into [`UnifiedResult`]s.

use super::category;
use super::magnet;
use super::{RawResult, UnifiedResult};

/// Indexer name used when a source names neither field.
pub const UNKNOWN_INDEXER: &str = "Unknown";

/// Normalizes raw results for one aggregation.
///
/// Holds the sequential ID counter, so a fresh normalizer is used per request.
#[derive(Debug)]
pub struct ResultNormalizer<'a> {
    trackers: &'a [String],
    next_id: u64,
}

impl<'a> ResultNormalizer<'a> {
    pub fn new(trackers: &'a [String]) -> Self {
        Self {
            trackers,
            next_id: 1,
        }
    }

    /// Normalize one raw result from `source`.
    pub fn normalize(&mut self, raw: RawResult, source: &str) -> UnifiedResult {
        let id = match raw.id.as_deref().map(str::trim).filter(|id| !id.is_empty()) {
            Some(id) => id.to_string(),
            None => self.sequential_id(source),
        };

        let indexer_name = pick_indexer(&raw);

        let resolved = magnet::resolve(
            raw.magnet_uri.as_deref(),
            raw.link.as_deref(),
            raw.info_hash.as_deref(),
            &raw.title,
            self.trackers,
        );

        let category_ids = category::to_canonical(&raw.category);
        let category_label = category::display_label(&category_ids, raw.category_desc.as_deref());

        UnifiedResult {
            id,
            title: raw.title,
            size_bytes: raw.size_bytes,
            seeders: raw.seeders,
            leechers: raw.leechers,
            published_at: raw.published_at,
            magnet_uri: resolved.magnet_uri,
            info_hash: resolved.info_hash,
            indexer_name,
            category_ids,
            category_label,
        }
    }

    /// Normalize a whole adapter batch.
    pub fn normalize_batch(&mut self, batch: Vec<RawResult>, source: &str) -> Vec<UnifiedResult> {
        batch
            .into_iter()
            .map(|raw| self.normalize(raw, source))
            .collect()
    }

    pub(crate) fn sequential_id(&mut self, source: &str) -> String {
        let id = format!("{}-{}", source, self.next_id);
        self.next_id += 1;
        id
    }
}

fn pick_indexer(raw: &RawResult) -> String {
    [raw.indexer.as_deref(), raw.indexer_alt.as_deref()]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|name| !name.is_empty())
        .unwrap_or(UNKNOWN_INDEXER)
        .to_string()
}
