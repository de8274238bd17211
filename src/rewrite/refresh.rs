//! `<meta http-equiv="refresh">` directive rewriting.

use crate::rewrite::url::RewriteContext;

/// Rewrite the URL part of a refresh directive of the form
/// `<seconds>; url=<target>`.
///
/// The delay value is kept with surrounding whitespace dropped. Returns `None`
/// when the directive has no `url=` clause or its target cannot be routed,
/// meaning the content attribute is left as it is.
pub fn rewrite_refresh(content: &str, ctx: &RewriteContext) -> Option<String> {
    let (delay, rest) = content.split_once(';')?;
    let delay = delay.trim();
    if delay.is_empty() {
        return None;
    }

    let rest = rest.trim_start();
    let keyword = rest.get(..3)?;
    let target = rest.get(3..)?;
    if !keyword.eq_ignore_ascii_case("url") {
        return None;
    }
    let target = target.trim_start().strip_prefix('=')?;
    let target = strip_quotes(target.trim());

    let proxied = ctx.rewrite_reference(target)?;
    Some(format!("{}; url={}", delay, proxied))
}

fn strip_quotes(value: &str) -> &str {
    let value = value.strip_prefix(['"', '\'']).unwrap_or(value);
    value.strip_suffix(['"', '\'']).unwrap_or(value)
}
