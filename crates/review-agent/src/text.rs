//! Small text and URL helpers shared across collectors.

use url::Url;

/// Truncate to at most `max_chars` characters, appending `...` when cut.
pub(crate) fn truncate(value: &str, max_chars: usize) -> String {
    if value.chars().count() <= max_chars {
        return value.to_string();
    }
    let mut out: String = value.chars().take(max_chars).collect();
    out.push_str("...");
    out
}

/// Lowercased host with any leading `www.` removed.
pub fn registrable_host(url: &Url) -> Option<String> {
    let host = url.host_str()?.to_ascii_lowercase();
    Some(host.strip_prefix("www.").map(str::to_string).unwrap_or(host))
}

/// Same registrable host and same explicit port. Scheme changes on default
/// ports (`http` to `https`) stay on the same site.
pub fn same_site(a: &Url, b: &Url) -> bool {
    let host = registrable_host(a);
    host.is_some() && host == registrable_host(b) && a.port() == b.port()
}

/// Parse a user-entered website, adding `https://` when no scheme is given.
pub fn parse_website(raw: &str) -> Option<Url> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{}", raw)
    };
    let url = Url::parse(&candidate).ok()?;
    match url.scheme() {
        "http" | "https" if url.host_str().is_some() => Some(url),
        _ => None,
    }
}

/// Domain of a URL string, `None` when it does not parse.
pub fn domain_of(raw: &str) -> Option<String> {
    parse_website(raw).as_ref().and_then(registrable_host)
}
