// SPDX-FileCopyrightText: 2026 Arscan Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Extraction of marker identifiers from scanned QR code text.
//!
//! Accepted shapes:
//! - `https://<host>/ar/<markerId>` (any trailing query or fragment is ignored)
//! - `https://<host>/<any path>?markerId=<markerId>`
//! - a bare UUID

use std::sync::LazyLock;

use percent_encoding::percent_decode_str;
use regex::Regex;
use url::Url;

use crate::types::MarkerId;

static UUID_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^[0-9a-f]{8}-[0-9a-f]{4}-[1-5][0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .expect("static UUID pattern is valid")
});

/// Returns the marker identifier encoded in `raw`, or `None` if the text is
/// not a recognized marker QR payload.
pub fn parse_marker_id_from_scan(raw: &str) -> Option<MarkerId> {
    let text = raw.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(url) = Url::parse(text) {
        if !matches!(url.scheme(), "http" | "https") {
            return None;
        }
        return from_ar_path(&url).or_else(|| from_query(&url));
    }

    if UUID_RE.is_match(text) {
        return MarkerId::new(text).ok();
    }

    None
}

fn from_ar_path(url: &Url) -> Option<MarkerId> {
    let mut segments = url.path_segments()?;
    segments.by_ref().find(|s| *s == "ar")?;
    let id = segments.next().filter(|s| !s.is_empty())?;
    let id = percent_decode_str(id).decode_utf8().ok()?;
    MarkerId::new(id.into_owned()).ok()
}

fn from_query(url: &Url) -> Option<MarkerId> {
    url.query_pairs()
        .find(|(k, _)| k == "markerId")
        .and_then(|(_, v)| MarkerId::new(v.into_owned()).ok())
}
