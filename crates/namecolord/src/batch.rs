use tracing::warn;

use crate::catalog::RoleCatalog;
use crate::palette::Palette;

/// Prerender the color listing into whisper-sized chunks.
///
/// Tokens render as `<color="rrggbb">Name</>` and are comma-joined; the
/// final catalog entry carries no separator. Sizes are measured in encoded
/// bytes, not characters: the host's message ceiling is a byte ceiling and
/// role names are not ASCII-only. A chunk that still exceeds the limit on
/// its own (one oversized token) is dropped instead of transmitted.
///
/// Runs once at startup; catalog and palette are immutable afterward.
pub fn batch_listing(catalog: &RoleCatalog, palette: &Palette, limit_bytes: usize) -> Vec<String> {
    let names = catalog.names();
    let mut batches: Vec<String> = Vec::new();
    let mut current = String::new();

    for (i, name) in names.iter().enumerate() {
        let Some(hex) = palette.color_of(name) else {
            continue;
        };
        let sep = if i + 1 < names.len() { ", " } else { "" };
        let token = format!("<color=\"{hex}\">{name}</>{sep}");

        if !current.is_empty() && current.len() + token.len() > limit_bytes {
            batches.push(close_batch(current));
            current = String::new();
        }
        current.push_str(&token);
    }
    if !current.is_empty() {
        batches.push(close_batch(current));
    }

    batches.retain(|b| {
        if b.len() > limit_bytes {
            warn!(
                bytes = b.len(),
                limit = limit_bytes,
                "dropping color listing chunk over the message ceiling"
            );
            false
        } else {
            true
        }
    });
    batches
}

fn close_batch(mut s: String) -> String {
    if let Some(trimmed) = s.strip_suffix(", ") {
        let n = trimmed.len();
        s.truncate(n);
    }
    s
}
