// src/health/ordering.rs
//! Dashboard ordering for a finished batch. The checker itself never
//! reorders results.

use crate::probe::ProbeResult;
use std::cmp::Ordering;
use url::Url;

/// Sort `results` for display: the primary URL first, then reachable before
/// unreachable, then by URL.
pub fn sort_for_display(results: &mut [ProbeResult], primary: Option<&str>) {
    let primary = primary.map(PrimaryUrl::new);
    results.sort_by(|a, b| display_cmp(a, b, primary.as_ref()));
}

fn display_cmp(a: &ProbeResult, b: &ProbeResult, primary: Option<&PrimaryUrl>) -> Ordering {
    let is_primary = |r: &ProbeResult| primary.map_or(false, |p| p.matches(&r.url));

    is_primary(b)
        .cmp(&is_primary(a))
        .then_with(|| b.reachable.cmp(&a.reachable))
        .then_with(|| a.url.cmp(&b.url))
}

/// Compares by parsed URL when possible, so `https://site` matches
/// `https://site/`.
struct PrimaryUrl<'a> {
    raw: &'a str,
    parsed: Option<Url>,
}

impl<'a> PrimaryUrl<'a> {
    fn new(raw: &'a str) -> Self {
        Self {
            raw,
            parsed: Url::parse(raw).ok(),
        }
    }

    fn matches(&self, url: &str) -> bool {
        if url == self.raw {
            return true;
        }
        match (&self.parsed, Url::parse(url)) {
            (Some(primary), Ok(other)) => *primary == other,
            _ => false,
        }
    }
}
