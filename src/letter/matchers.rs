//! Heuristic field extraction: job title, applicant name, email, phone
//!
//! Each heuristic is a [`Matcher`]; a [`MatcherChain`] tries them in order
//! and keeps the first hit.

use log::debug;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

pub const DEFAULT_JOB_TITLE: &str = "the advertised position";

const MAX_TITLE_WORDS: usize = 5;
const NAME_SEARCH_LINES: usize = 8;
const MIN_PHONE_DIGITS: usize = 10;

static ROLE_VOCABULARY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(engineer|analyst|scientist|developer|manager|intern|specialist|data|ai|ml|software|business|product)\b")
        .expect("Invalid role vocabulary regex")
});
static TITLE_LABEL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:title|position|role)\s*[:\-]\s*([A-Za-z0-9 \t/&]+)").expect("Invalid title label regex")
});
static FOR_AS_A: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:for|as)[ \t]+an?[ \t]+([a-z][a-z \t/&]*)").expect("Invalid article regex")
});
static BEFORE_POSITION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)([a-z][a-z \t/&]*?)[ \t]+(?:position|role|opportunity)\b").expect("Invalid position suffix regex")
});
static NON_LETTER: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z\s]").expect("Invalid letter regex"));
static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}").expect("Invalid email regex")
});
static PHONE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\+?\d[\d \t().-]{7,}\d").expect("Invalid phone regex"));
static CAPITALIZED_NAME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][a-z]+\s+[A-Z][a-z]+$").expect("Invalid name regex"));
static UPPERCASE_NAME: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[A-Z]+\s+[A-Z]+$").expect("Invalid name regex"));

pub trait Matcher: Send + Sync {
    type Output;

    fn name(&self) -> &'static str;

    fn find(&self, text: &str) -> Option<Self::Output>;
}

pub struct MatcherChain<T> {
    matchers: Vec<Box<dyn Matcher<Output = T>>>,
}

impl<T> Default for MatcherChain<T> {
    fn default() -> Self {
        Self { matchers: Vec::new() }
    }
}

impl<T> MatcherChain<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, matcher: impl Matcher<Output = T> + 'static) -> Self {
        self.matchers.push(Box::new(matcher));
        self
    }

    pub fn first_match(&self, text: &str) -> Option<T> {
        self.matchers.iter().find_map(|matcher| {
            let found = matcher.find(text);
            if found.is_some() {
                debug!("{} matcher hit", matcher.name());
            }
            found
        })
    }
}

/// Title-case every whitespace-separated word: first letter up, rest down
pub fn title_case(text: &str) -> String {
    text.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

/// Strip non-letters, keep the first five words, title-case
fn clean_title(raw: &str) -> Option<String> {
    let letters = NON_LETTER.replace_all(raw, " ");
    let words: Vec<&str> = letters.split_whitespace().take(MAX_TITLE_WORDS).collect();
    if words.is_empty() {
        None
    } else {
        Some(title_case(&words.join(" ")))
    }
}

/// First line naming a role. Text after a `title:` style label is preferred,
/// and within a sentence the capitalized run holding the role word is taken.
pub struct RoleLineMatcher;

impl RoleLineMatcher {
    fn capitalized_role_run<'a>(words: &[&'a str]) -> Option<Vec<&'a str>> {
        let mut runs: Vec<Vec<&'a str>> = Vec::new();
        let mut current: Vec<&'a str> = Vec::new();

        for &word in words {
            if word.chars().next().is_some_and(char::is_uppercase) {
                current.push(word);
            } else if !current.is_empty() {
                runs.push(std::mem::take(&mut current));
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }

        runs.into_iter()
            .find(|run| run.iter().any(|word| ROLE_VOCABULARY.is_match(word)))
    }
}

impl Matcher for RoleLineMatcher {
    type Output = String;

    fn name(&self) -> &'static str {
        "role line"
    }

    fn find(&self, text: &str) -> Option<String> {
        text.lines().find_map(|line| {
            let candidate = TITLE_LABEL
                .captures(line)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str())
                .unwrap_or(line);

            if !ROLE_VOCABULARY.is_match(candidate) {
                return None;
            }

            let letters = NON_LETTER.replace_all(candidate, " ");
            let words: Vec<&str> = letters.split_whitespace().collect();
            if words.is_empty() {
                return None;
            }

            let picked = Self::capitalized_role_run(&words).unwrap_or(words);
            clean_title(&picked.join(" "))
        })
    }
}

/// `Title: X`, `Position - X`, `Role: X`
pub struct LabeledTitleMatcher;

impl Matcher for LabeledTitleMatcher {
    type Output = String;

    fn name(&self) -> &'static str {
        "labeled title"
    }

    fn find(&self, text: &str) -> Option<String> {
        TITLE_LABEL
            .captures(text)
            .and_then(|caps| clean_title(&caps[1]))
    }
}

/// `... for a X` / `... as an X`
pub struct ArticleTitleMatcher;

impl Matcher for ArticleTitleMatcher {
    type Output = String;

    fn name(&self) -> &'static str {
        "for/as a"
    }

    fn find(&self, text: &str) -> Option<String> {
        FOR_AS_A.captures(text).and_then(|caps| clean_title(&caps[1]))
    }
}

/// `X position`, `X role`, `X opportunity`
pub struct PositionSuffixMatcher;

impl Matcher for PositionSuffixMatcher {
    type Output = String;

    fn name(&self) -> &'static str {
        "position suffix"
    }

    fn find(&self, text: &str) -> Option<String> {
        BEFORE_POSITION
            .captures(text)
            .and_then(|caps| clean_title(&caps[1]))
    }
}

pub fn job_title_chain() -> MatcherChain<String> {
    MatcherChain::new()
        .with(RoleLineMatcher)
        .with(LabeledTitleMatcher)
        .with(ArticleTitleMatcher)
        .with(PositionSuffixMatcher)
}

pub struct EmailMatcher;

impl Matcher for EmailMatcher {
    type Output = String;

    fn name(&self) -> &'static str {
        "email"
    }

    fn find(&self, text: &str) -> Option<String> {
        EMAIL.find(text).map(|m| m.as_str().to_string())
    }
}

/// First phone-shaped run with enough digits to be a number, not a date range
pub struct PhoneMatcher;

impl Matcher for PhoneMatcher {
    type Output = String;

    fn name(&self) -> &'static str {
        "phone"
    }

    fn find(&self, text: &str) -> Option<String> {
        PHONE
            .find_iter(text)
            .map(|m| m.as_str().trim())
            .find(|candidate| candidate.chars().filter(char::is_ascii_digit).count() >= MIN_PHONE_DIGITS)
            .map(str::to_string)
    }
}

/// A leading line that is exactly two capitalized or two uppercase words
pub struct NameMatcher;

impl Matcher for NameMatcher {
    type Output = String;

    fn name(&self) -> &'static str {
        "name"
    }

    fn find(&self, text: &str) -> Option<String> {
        text.lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .take(NAME_SEARCH_LINES)
            .find(|line| CAPITALIZED_NAME.is_match(line) || UPPERCASE_NAME.is_match(line))
            .map(title_case)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ContactInfo {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl ContactInfo {
    pub fn extract(resume: &str) -> Self {
        Self {
            name: NameMatcher.find(resume),
            email: EmailMatcher.find(resume),
            phone: PhoneMatcher.find(resume),
        }
    }

    /// `email | phone`, whichever are known
    pub fn contact_line(&self) -> Option<String> {
        let parts: Vec<&str> = [self.email.as_deref(), self.phone.as_deref()]
            .into_iter()
            .flatten()
            .collect();

        if parts.is_empty() {
            None
        } else {
            Some(parts.join(" | "))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn title(jd: &str) -> String {
        job_title_chain()
            .first_match(jd)
            .unwrap_or_else(|| DEFAULT_JOB_TITLE.to_string())
    }

    #[test]
    fn test_title_from_sentence() {
        assert_eq!(title("We need a Data Analyst with Python and SQL skills."), "Data Analyst");
    }

    #[test]
    fn test_title_prefers_label() {
        let jd = "ACME Corp\nPosition: Senior Software Engineer (Remote)\nAbout us...";
        assert_eq!(title(jd), "Senior Software Engineer");
    }

    #[test]
    fn test_title_from_heading_line() {
        assert_eq!(title("Machine Learning Engineer\nResponsibilities: ..."), "Machine Learning Engineer");
    }

    #[test]
    fn test_title_capped_at_five_words() {
        let jd = "Title: principal staff senior lead cloud platform engineer";
        let found = title(jd);
        assert_eq!(found.split_whitespace().count(), 5);
        assert_eq!(found, "Principal Staff Senior Lead Cloud");
    }

    #[test]
    fn test_title_fallback_patterns() {
        assert_eq!(ArticleTitleMatcher.find("We are hiring for a Nurse Practitioner"), Some("Nurse Practitioner".to_string()));
        assert_eq!(PositionSuffixMatcher.find("Head Chef position available"), Some("Head Chef".to_string()));
        assert_eq!(LabeledTitleMatcher.find("Role: barista"), Some("Barista".to_string()));
        assert_eq!(ArticleTitleMatcher.find("Hiring for a barista."), Some("Barista".to_string()));
        assert_eq!(PositionSuffixMatcher.find("head chef position open"), Some("Head Chef".to_string()));
    }

    #[test]
    fn test_lowercase_title_beats_default() {
        let found = title("We are hiring for a barista to join us.");
        assert!(found.starts_with("Barista"), "got {}", found);
    }

    #[test]
    fn test_title_default() {
        assert_eq!(title("Great pay. Friendly people. Apply today."), DEFAULT_JOB_TITLE);
        assert_eq!(title(""), DEFAULT_JOB_TITLE);
    }

    #[test]
    fn test_name_uppercase_is_title_cased() {
        let contact = ContactInfo::extract("JOHN SMITH\njohn.smith@mail.com");

        assert_eq!(contact.name.as_deref(), Some("John Smith"));
        assert_eq!(contact.email.as_deref(), Some("john.smith@mail.com"));
        assert_eq!(contact.phone, None);
        assert_eq!(contact.contact_line().as_deref(), Some("john.smith@mail.com"));
    }

    #[test]
    fn test_name_only_in_first_lines() {
        let mut resume: String = (0..8).map(|i| format!("line number {}\n", i)).collect();
        resume.push_str("Jane Doe\n");
        assert_eq!(NameMatcher.find(&resume), None);
        assert_eq!(NameMatcher.find("\n\n  Jane Doe  \n"), Some("Jane Doe".to_string()));
    }

    #[test]
    fn test_phone_skips_date_ranges() {
        let resume = "Acme 2019 - 2021\nPhone: +1 (555) 123-4567";
        assert_eq!(PhoneMatcher.find(resume).as_deref(), Some("+1 (555) 123-4567"));
    }

    #[test]
    fn test_phone_stops_at_line_end() {
        let contact = ContactInfo::extract("JOHN SMITH\njohn@x.com\n+1 555 123 4567\n2019 - 2023 Data Engineer");

        assert_eq!(contact.phone.as_deref(), Some("+1 555 123 4567"));
        assert_eq!(contact.contact_line().as_deref(), Some("john@x.com | +1 555 123 4567"));
    }

    #[test]
    fn test_contact_line_variants() {
        let both = ContactInfo {
            name: None,
            email: Some("a@b.io".to_string()),
            phone: Some("555 123 4567".to_string()),
        };
        assert_eq!(both.contact_line().as_deref(), Some("a@b.io | 555 123 4567"));

        let phone_only = ContactInfo {
            phone: Some("555 123 4567".to_string()),
            ..ContactInfo::default()
        };
        assert_eq!(phone_only.contact_line().as_deref(), Some("555 123 4567"));
        assert_eq!(ContactInfo::default().contact_line(), None);
    }

    #[test]
    fn test_title_case() {
        assert_eq!(title_case("dATA   analyst"), "Data Analyst");
        assert_eq!(title_case("SQL"), "Sql");
    }
}
