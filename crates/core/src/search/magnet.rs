//! Magnet URI resolution, repair and tracker augmentation.

use once_cell::sync::Lazy;
use regex_lite::Regex;

/// Public announce trackers appended to magnets that carry none.
pub const DEFAULT_TRACKERS: &[&str] = &[
    "udp://tracker.opentrackr.org:1337/announce",
    "udp://open.stealth.si:80/announce",
    "udp://tracker.torrent.eu.org:451/announce",
    "udp://exodus.desync.com:6969/announce",
    "udp://tracker.openbittorrent.com:6969/announce",
    "udp://open.demonii.com:1337/announce",
];

static BTIH: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)xt=urn:btih:([a-z0-9]+)").expect("valid btih regex"));

/// Whether `uri` is a well-formed magnet with a BitTorrent info hash.
pub fn is_magnet(uri: &str) -> bool {
    let uri = uri.trim();
    uri.get(..8)
        .is_some_and(|scheme| scheme.eq_ignore_ascii_case("magnet:?"))
        && BTIH.is_match(uri)
}

/// Extract the info hash from a magnet URI, lowercased.
pub fn extract_btih(magnet: &str) -> Option<String> {
    BTIH.captures(magnet)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_ascii_lowercase())
}

/// Build a minimal magnet URI from an info hash and display name.
pub fn synthesize(info_hash: &str, title: &str) -> String {
    format!(
        "magnet:?xt=urn:btih:{}&dn={}",
        info_hash.to_ascii_lowercase(),
        urlencoding::encode(title)
    )
}

fn lowercase_btih(magnet: &str) -> String {
    BTIH.replace(magnet, |caps: &regex_lite::Captures<'_>| {
        format!("xt=urn:btih:{}", caps[1].to_ascii_lowercase())
    })
    .into_owned()
}

fn params(magnet: &str) -> impl Iterator<Item = &str> {
    magnet
        .split_once('?')
        .map(|(_, q)| q)
        .unwrap_or("")
        .split('&')
}

/// Whether the magnet already embeds an announce tracker (`tr=` or `tr.N=`).
///
/// HTML-escaped separators (`&amp;tr=`) count as well.
pub fn has_trackers(magnet: &str) -> bool {
    params(magnet).any(|p| {
        let key = p.split_once('=').map(|(k, _)| k).unwrap_or(p);
        let key = key.to_ascii_lowercase();
        let key = key.strip_prefix("amp;").unwrap_or(&key);
        key == "tr" || key.starts_with("tr.")
    })
}

/// Append `trackers` to a magnet that has none, skipping any already present.
pub fn add_trackers(magnet: &str, trackers: &[String]) -> String {
    if has_trackers(magnet) {
        return magnet.to_string();
    }

    let mut out = magnet.to_string();
    for tracker in trackers {
        let encoded = urlencoding::encode(tracker);
        let param = format!("tr={}", encoded);
        if params(&out).any(|p| p == param || p == format!("tr={}", tracker)) {
            continue;
        }
        out.push('&');
        out.push_str(&param);
    }
    out
}

/// Resolved retrieval link and content identity for one raw result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedMagnet {
    pub magnet_uri: Option<String>,
    /// Lowercase hex hash, empty if unknown.
    pub info_hash: String,
}

/// Pick or build a magnet URI for a result.
///
/// Priority: the explicit magnet, then a magnet-valued link, then a magnet
/// synthesized from the info hash. A magnet whose hash disagrees with the
/// supplied info hash is replaced by the synthesized one.
pub fn resolve(
    magnet_uri: Option<&str>,
    link: Option<&str>,
    info_hash: Option<&str>,
    title: &str,
    trackers: &[String],
) -> ResolvedMagnet {
    let mut hash = info_hash
        .map(|h| h.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let existing = magnet_uri
        .filter(|m| is_magnet(m))
        .or_else(|| link.filter(|l| is_magnet(l)))
        .map(|m| m.trim());

    let magnet = match existing {
        Some(m) => {
            let embedded = extract_btih(m).unwrap_or_default();
            if hash.is_empty() {
                hash = embedded;
                Some(lowercase_btih(m))
            } else if embedded == hash {
                Some(lowercase_btih(m))
            } else {
                Some(synthesize(&hash, title))
            }
        }
        None if !hash.is_empty() => Some(synthesize(&hash, title)),
        None => None,
    };

    ResolvedMagnet {
        magnet_uri: magnet.map(|m| add_trackers(&m, trackers)),
        info_hash: hash,
    }
}

/// Default tracker list as owned strings (config default).
pub fn default_trackers() -> Vec<String> {
    DEFAULT_TRACKERS.iter().map(|t| t.to_string()).collect()
}
