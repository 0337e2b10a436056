//! Export of the derived payload as a downloadable JSON file.

use crate::draft::Draft;
use crate::payload::{derive_payload, Payload};
use promo_core::PromoResult;
use std::path::{Path, PathBuf};
use tracing::info;

/// File name for an exported config: whitespace runs become `-`, the name is
/// lowercased and `-config.json` is appended. Path separators are replaced
/// so the result always names a single file.
pub fn export_file_name(name: &str) -> String {
    let mut slug = String::with_capacity(name.len() + 12);
    let mut in_space = false;
    for c in name.chars() {
        if c.is_whitespace() {
            if !in_space {
                slug.push('-');
            }
            in_space = true;
            continue;
        }
        in_space = false;
        match c {
            '/' | '\\' => slug.push('-'),
            _ => slug.extend(c.to_lowercase()),
        }
    }
    slug.push_str("-config.json");
    slug
}

/// Serialize the payload with two-space indentation.
pub fn export_json(payload: &Payload) -> PromoResult<String> {
    Ok(serde_json::to_string_pretty(payload)?)
}

/// Write the draft's payload into `dir` and return the file path.
pub fn export_to_dir(draft: &Draft, dir: &Path) -> PromoResult<PathBuf> {
    let payload = derive_payload(draft);
    let body = export_json(&payload)?;
    let path = dir.join(export_file_name(draft.name()));

    std::fs::create_dir_all(dir)?;
    std::fs::write(&path, body.as_bytes())?;

    metrics::counter!("promo.exports").increment(1);
    info!(path = %path.display(), bytes = body.len(), "Campaign config exported");
    Ok(path)
}
