//! `srcset` candidate list rewriting.

use crate::rewrite::url::RewriteContext;

/// Rewrite every candidate URL in a `srcset` value.
///
/// Candidates are `url [descriptor]` pairs separated by commas. The descriptor
/// (`2x`, `480w`) is kept verbatim; entries without a URL are dropped. A
/// candidate whose URL cannot be routed keeps its original URL.
pub fn rewrite_srcset(value: &str, ctx: &RewriteContext) -> String {
    candidates(value)
        .into_iter()
        .map(|(url, descriptor)| {
            let url = ctx.rewrite_reference(url).unwrap_or_else(|| url.to_string());
            if descriptor.is_empty() {
                url
            } else {
                format!("{} {}", url, descriptor)
            }
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Split a `srcset` value into `(url, descriptor)` pairs.
///
/// A URL runs up to the next whitespace, so commas inside it (`data:` URLs)
/// do not split candidates. A comma only separates candidates when it trails
/// the URL or follows the descriptor outside parentheses.
fn candidates(value: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = value;

    loop {
        rest = rest.trim_start_matches(|c: char| c.is_ascii_whitespace() || c == ',');
        if rest.is_empty() {
            break;
        }

        let url_end = rest
            .find(|c: char| c.is_ascii_whitespace())
            .unwrap_or(rest.len());
        let (url, after) = rest.split_at(url_end);

        let bare = url.trim_end_matches(',');
        if bare.len() != url.len() {
            out.push((bare, ""));
            rest = after;
            continue;
        }

        let descriptor_end = descriptor_end(after);
        out.push((url, after[..descriptor_end].trim()));
        rest = &after[descriptor_end..];
    }

    out
}

fn descriptor_end(s: &str) -> usize {
    let mut depth = 0u32;
    for (i, c) in s.char_indices() {
        match c {
            '(' => depth += 1,
            ')' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => return i,
            _ => {}
        }
    }
    s.len()
}
