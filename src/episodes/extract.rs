// src/episodes/extract.rs
//
// The episode id lives in the reason markup, e.g.
// `for <a href="/election/7">2015 Moderator Election</a>`. The delimiters are
// the site's, so extraction is swappable.

use crate::config::consts::{EPISODE_ID_MARKER, EPISODE_ID_TERMINATOR};

pub trait EpisodeIdExtractor {
    fn extract(&self, reason: &str) -> Option<u64>;
}

impl<F> EpisodeIdExtractor for F
where
    F: Fn(&str) -> Option<u64>,
{
    fn extract(&self, reason: &str) -> Option<u64> {
        self(reason)
    }
}

/// Integer token between the first `marker` and the next `terminator`.
#[derive(Clone, Debug)]
pub struct DelimitedId {
    marker: String,
    terminator: char,
}

impl DelimitedId {
    pub fn new(marker: &str, terminator: char) -> Self {
        Self { marker: s!(marker), terminator }
    }
}

impl Default for DelimitedId {
    fn default() -> Self {
        Self::new(EPISODE_ID_MARKER, EPISODE_ID_TERMINATOR)
    }
}

impl EpisodeIdExtractor for DelimitedId {
    fn extract(&self, reason: &str) -> Option<u64> {
        let start = reason.find(&self.marker)? + self.marker.len();
        let token = reason[start..].split(self.terminator).next()?;
        token.trim().parse().ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_election_link() {
        let x = DelimitedId::default();
        assert_eq!(x.extract(r#"for <a href="/election/7">2015 Moderator Election</a>"#), Some(7));
        assert_eq!(x.extract(r#"<a href="/election/12">x</a> <a href="/election/13">y</a>"#), Some(12));
    }

    #[test]
    fn missing_or_garbled_token() {
        let x = DelimitedId::default();
        assert_eq!(x.extract("for being awesome"), None);
        assert_eq!(x.extract(r#"<a href="/election/seven">"#), None);
        assert_eq!(x.extract(r#"<a href="/election/">"#), None);
    }

    #[test]
    fn closures_extract_too() {
        let x = |r: &str| -> Option<u64> { r.strip_prefix('#').and_then(|n| n.parse().ok()) };
        assert_eq!(EpisodeIdExtractor::extract(&x, "#5"), Some(5));
    }
}
