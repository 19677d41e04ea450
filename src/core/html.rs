// src/core/html.rs
//
// Plain, case-sensitive substring slicing over listing markup.

/// Text between the first `open` and the next `close` after it.
pub fn between<'a>(s: &'a str, open: &str, close: &str) -> Option<&'a str> {
    let start = s.find(open)? + open.len();
    let rest = &s[start..];
    let end = rest.find(close)?;
    Some(&rest[..end])
}

/// Text after the last `pat`, up to `close` (or end of input).
pub fn after_last_until<'a>(s: &'a str, pat: &str, close: &str) -> Option<&'a str> {
    let start = s.rfind(pat)? + pat.len();
    let rest = &s[start..];
    Some(rest.find(close).map_or(rest, |e| &rest[..e]))
}

/// Everything from the first `start` marker up to the first `end` marker after it.
/// Missing `end` means "to end of input"; missing `start` yields `""`.
pub fn region<'a>(s: &'a str, start: &str, end: &str) -> &'a str {
    let Some(o) = s.find(start) else { return "" };
    let rest = &s[o + start.len()..];
    rest.find(end).map_or(rest, |e| &rest[..e])
}

/// Pieces following each occurrence of `marker` (text before the first is dropped).
pub fn pieces_after<'a>(s: &'a str, marker: &'a str) -> impl Iterator<Item = &'a str> + 'a {
    s.split(marker).skip(1)
}

pub fn strip_tags<S: AsRef<str>>(s: S) -> String {
    let s = s.as_ref();

    let mut out = String::with_capacity(s.len());
    let mut in_tag = false;

    for ch in s.chars() {
        match ch {
            '<' => in_tag = true,
            '>' => in_tag = false,
            _ if !in_tag => out.push(ch),
            _ => {}
        }
    }
    super::sanitize::normalize_ws(&super::sanitize::normalize_entities(&out))
}
