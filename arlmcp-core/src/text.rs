//! Domain/IP text normalization and reply-language detection

use once_cell::sync::Lazy;
use regex::Regex;

static HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)Host:\s*([^\s:]+)").expect("host header pattern is valid")
});

static DOTTED_QUAD_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d+\.\d+\.\d+\.\d+").expect("dotted quad pattern is valid"));

/// Suffixes with a registrable third label ("example.com.cn" style).
/// Not a full public-suffix list; covers what shows up in recon targets.
const MULTI_PART_SUFFIXES: [&str; 14] = [
    "com.cn", "net.cn", "org.cn", "gov.cn", "edu.cn", "ac.cn", "co.uk", "org.uk", "ac.uk",
    "com.hk", "com.tw", "co.jp", "com.au", "co.kr",
];

/// Reduce a hostname to its registrable domain
/// (`www.example.com` -> `example.com`).
///
/// IP literals and bare hosts come back unchanged.
pub fn registrable_domain(host: &str) -> String {
    let host = host.trim().trim_end_matches('.').to_ascii_lowercase();
    if host.parse::<std::net::IpAddr>().is_ok() {
        return host;
    }

    let labels: Vec<&str> = host.split('.').collect();
    if labels.len() <= 2 {
        return host;
    }

    let last_two = labels[labels.len() - 2..].join(".");
    let keep = if MULTI_PART_SUFFIXES.contains(&last_two.as_str()) {
        3
    } else {
        2
    };
    if labels.len() <= keep {
        return host;
    }
    labels[labels.len() - keep..].join(".")
}

/// Pull the `Host:` header out of a raw HTTP request and reduce it to
/// the registrable domain. `None` when no host header is present.
pub fn extract_main_domain(raw_request: &str) -> Option<String> {
    let captures = HOST_RE.captures(raw_request)?;
    let host = captures.get(1)?.as_str();
    Some(registrable_domain(host))
}

/// Normalize free-form input into a scan target: IP addresses and CIDR
/// ranges pass through, anything else is reduced to a registrable
/// domain. Full URLs are not parsed here.
pub fn extract_domain_or_ip(text: &str) -> String {
    let text = text.trim();
    if text.parse::<std::net::IpAddr>().is_ok() || text.parse::<ipnet::IpNet>().is_ok() {
        return text.to_string();
    }
    // Slash-bearing input (ranges, paths) and dotted-quad-ish input stay
    // untouched rather than being mangled by domain reduction.
    if text.contains('/') || DOTTED_QUAD_RE.is_match(text) {
        return text.to_string();
    }
    registrable_domain(text)
}

/// Which language user-facing hint strings are rendered in.
///
/// Process-scoped and explicitly threaded: the holder lives on the tool
/// context, initialized to Chinese to match the backend's own UI, and is
/// only changed by the language-detection tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReplyLanguage {
    #[default]
    Chinese,
    English,
}

/// Detect the reply language from a user prompt: any CJK ideograph
/// selects Chinese.
pub fn detect_reply_language(prompt: &str) -> ReplyLanguage {
    if prompt.chars().any(|c| ('\u{4e00}'..='\u{9fff}').contains(&c)) {
        ReplyLanguage::Chinese
    } else {
        ReplyLanguage::English
    }
}

impl ReplyLanguage {
    /// Pick a string per language.
    pub fn pick<'a>(&self, chinese: &'a str, english: &'a str) -> &'a str {
        match self {
            ReplyLanguage::Chinese => chinese,
            ReplyLanguage::English => english,
        }
    }
}
