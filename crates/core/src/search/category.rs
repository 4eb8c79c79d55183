//! Canonical category taxonomy.
//!
//! Canonical IDs are 4-digit Newznab-style integers grouped by their leading
//! two digits: every `20xx` is a movie bucket, every `50xx` a TV bucket. An ID
//! ending in `00` is the parent of its group.

use std::collections::BTreeSet;

use super::RawCategory;

/// Catch-all canonical ID for anything unmapped.
pub const OTHER: u32 = 8000;

/// Known canonical IDs with display labels.
const LABELS: &[(u32, &str)] = &[
    (1000, "Console"),
    (2000, "Movies"),
    (2010, "Movies/Foreign"),
    (2020, "Movies/Other"),
    (2030, "Movies/SD"),
    (2040, "Movies/HD"),
    (2045, "Movies/UHD"),
    (2050, "Movies/BluRay"),
    (2060, "Movies/3D"),
    (2070, "Movies/DVD"),
    (2080, "Movies/WEB-DL"),
    (3000, "Audio"),
    (3010, "Audio/MP3"),
    (3020, "Audio/Video"),
    (3030, "Audio/Audiobook"),
    (3040, "Audio/Lossless"),
    (4000, "PC"),
    (4050, "PC/Games"),
    (5000, "TV"),
    (5030, "TV/SD"),
    (5040, "TV/HD"),
    (5045, "TV/UHD"),
    (5070, "TV/Anime"),
    (5080, "TV/Documentary"),
    (6000, "XXX"),
    (7000, "Books"),
    (7020, "Books/EBook"),
    (7030, "Books/Comics"),
    (8000, "Other"),
];

/// Content-type enum values (GraphQL content database) to canonical IDs.
const CONTENT_TYPES: &[(&str, u32)] = &[
    ("movie", 2000),
    ("tv_show", 5000),
    ("music", 3000),
    ("audiobook", 3030),
    ("ebook", 7020),
    ("comic", 7030),
    ("game", 4050),
    ("software", 4000),
    ("xxx", 6000),
];

fn is_canonical(id: u32) -> bool {
    (1000..=9999).contains(&id)
}

fn prefix(id: u32) -> u32 {
    id / 100
}

/// Whether `id` is a parent (group-level) category.
pub fn is_parent(id: u32) -> bool {
    id % 100 == 0
}

/// Map a backend's category representation to canonical IDs.
///
/// Never returns an empty set; unmappable input yields `{OTHER}`.
pub fn to_canonical(raw: &RawCategory) -> BTreeSet<u32> {
    let ids: BTreeSet<u32> = match raw {
        // Tracker-specific custom IDs (100000+) carry no shared meaning.
        RawCategory::Numeric(ids) => ids.iter().copied().filter(|id| is_canonical(*id)).collect(),
        RawCategory::ContentType(kind) => {
            let kind = kind.trim().to_ascii_lowercase();
            let id = CONTENT_TYPES
                .iter()
                .find(|(name, _)| *name == kind)
                .map(|(_, id)| *id)
                .unwrap_or(OTHER);
            [id].into_iter().collect()
        }
        RawCategory::Unknown => BTreeSet::new(),
    };

    if ids.is_empty() {
        [OTHER].into_iter().collect()
    } else {
        ids
    }
}

/// Whether an item with `ids` belongs to the requested category.
///
/// Exact ID match always counts. A parent request (`R` ending in `00`) also
/// accepts any item in its two-digit group, so 2000 includes 2045 while 2045
/// excludes its sibling 2040.
pub fn matches(ids: &BTreeSet<u32>, requested: u32) -> bool {
    if ids.contains(&requested) {
        return true;
    }
    is_parent(requested) && ids.iter().any(|id| prefix(*id) == prefix(requested))
}

/// Display label for a canonical ID, falling back to its parent group.
pub fn label_for(id: u32) -> &'static str {
    let lookup = |id: u32| LABELS.iter().find(|(known, _)| *known == id).map(|(_, l)| *l);
    lookup(id)
        .or_else(|| lookup(prefix(id) * 100))
        .unwrap_or("Other")
}

/// Pick the display label for a result.
pub fn display_label(ids: &BTreeSet<u32>, source_desc: Option<&str>) -> String {
    match source_desc.map(str::trim).filter(|d| !d.is_empty()) {
        Some(desc) => desc.to_string(),
        None => ids
            .iter()
            .next()
            .map(|id| label_for(*id))
            .unwrap_or("Other")
            .to_string(),
    }
}
