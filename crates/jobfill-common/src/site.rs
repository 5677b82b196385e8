//! Recruiting-platform detection.
//!
//! A page qualifies when its host name, or the `src` of any embedded iframe,
//! matches one of the allow-list patterns. Patterns are unanchored regular
//! expressions so `greenhouse\.io` accepts `boards.greenhouse.io` as well as an
//! iframe pointing at `https://boards.greenhouse.io/embed/job_app?...`.

use regex::Regex;

pub const DEFAULT_SITE_PATTERNS: &[&str] = &[
    r"greenhouse\.io",
    r"lever\.co",
    r"myworkdayjobs\.com",
    r"workday\.com",
    r"smartrecruiters\.com",
    r"icims\.com",
    r"breezy\.hr",
];

#[derive(Debug, Clone)]
pub struct SiteClassifier {
    patterns: Vec<Regex>,
}

impl SiteClassifier {
    pub fn new<I, S>(patterns: I) -> Result<Self, regex::Error>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let patterns = patterns
            .into_iter()
            .map(|p| Regex::new(p.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn patterns(&self) -> impl Iterator<Item = &str> {
        self.patterns.iter().map(Regex::as_str)
    }

    pub fn is_recruiting_site(&self, hostname: &str, iframe_sources: &[String]) -> bool {
        self.matching_pattern(hostname, iframe_sources).is_some()
    }

    /// The first pattern that accepted the page, checking the host before iframes.
    pub fn matching_pattern(&self, hostname: &str, iframe_sources: &[String]) -> Option<&str> {
        if let Some(re) = self.patterns.iter().find(|re| re.is_match(hostname)) {
            return Some(re.as_str());
        }
        iframe_sources.iter().find_map(|src| {
            self.patterns
                .iter()
                .find(|re| re.is_match(src))
                .map(Regex::as_str)
        })
    }
}

impl Default for SiteClassifier {
    fn default() -> Self {
        Self::new(DEFAULT_SITE_PATTERNS).expect("default site patterns are valid regexes")
    }
}
