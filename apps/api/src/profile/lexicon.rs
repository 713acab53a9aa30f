// Fixed vocabularies used by the profile classifier and name extractor.
// Every entry is lowercase; callers lowercase the text before matching.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Canonical substring of a public profile URL.
pub const PROFILE_URL: &str = "linkedin.com/in/";
/// Any line mentioning the host is contact detail, not a name.
pub const PROFILE_HOST: &str = "linkedin.com";

/// Section labels that appear in a profile export.
pub const SECTION_HEADERS: &[&str] = &[
    "contact",
    "top skills",
    "languages",
    "summary",
    "experience",
    "education",
    "certifications",
    "honors-awards",
    "honors & awards",
    "publications",
    "projects",
    "courses",
    "recommendations",
    "interests",
    "volunteer experience",
];

/// Phrases that almost only occur in profile exports. Each match is worth 3 points.
pub const UNIQUE_PATTERNS: &[&str] = &[
    "linkedin.com/in/",
    "www.linkedin.com/in/",
    "page 1 of",
    "connections",
    "professional experience",
    "work experience",
];

/// Document-type phrases that indicate an unrelated upload.
pub const NEGATIVE_INDICATORS: &[&str] = &[
    "invoice",
    "receipt",
    "order confirmation",
    "bank statement",
    "financial statement",
    "contract",
    "agreement",
    "terms and conditions",
    "privacy policy",
    "user manual",
    "instruction guide",
    "research paper",
    "abstract",
    "methodology",
    "bibliography",
    "references cited",
];

/// Lowercase connectors allowed inside an otherwise title-cased name.
pub static NAME_PARTICLES: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    ["de", "del", "da", "dos", "van", "von", "bin", "al", "la", "le"]
        .into_iter()
        .collect()
});

/// Location tokens that mark a line as a place rather than a person.
pub static LOCATION_TOKENS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "india",
        "usa",
        "uk",
        "karnataka",
        "bengaluru",
        "delhi",
        "mumbai",
    ]
    .into_iter()
    .collect()
});

/// Headline words that disqualify a line sitting just above "Summary".
pub static ROLE_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "developer",
        "relations",
        "manager",
        "engineer",
        "community",
        "professional",
        "program",
        "senior",
        "lead",
        "founder",
    ]
    .into_iter()
    .collect()
});

/// Lines equal to one of these are section labels, never names.
pub static SECTION_LABELS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "contact",
        "top skills",
        "summary",
        "experience",
        "about",
        "languages",
        "education",
        "certifications",
        "skills",
        "recommendations",
        "interests",
        "honors-awards",
        "honors & awards",
        "projects",
        "publications",
    ]
    .into_iter()
    .collect()
});

/// Words that push a structured-scan candidate well below the acceptance bar.
pub static HARD_REJECT_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "hackathon",
        "university",
        "school",
        "engineering",
        "engineer",
        "manager",
        "developer",
        "relations",
        "leadership",
        "founder",
        "technologies",
        "aws",
        "india",
        "bengaluru",
        "karnataka",
        "linkedin",
        "github",
        "copilot",
        "javascript",
        "actions",
        "web",
        "development",
        "problem",
        "solving",
        "scalability",
    ]
    .into_iter()
    .collect()
});

/// Title, role and technology words that end a header-slice name.
pub static TITLE_STOP_WORDS: Lazy<HashSet<&'static str>> = Lazy::new(|| {
    [
        "software",
        "engineer",
        "developer",
        "architect",
        "manager",
        "consultant",
        "specialist",
        "principal",
        "senior",
        "staff",
        "director",
        "founder",
        "cofounder",
        "ceo",
        "cto",
        "vp",
        "president",
        "product",
        "design",
        "analyst",
        "scientist",
        "lead",
        "intern",
        "student",
        "github",
        "copilot",
        "javascript",
        "actions",
        "web",
        "development",
    ]
    .into_iter()
    .collect()
});
