//! Main-content and link extraction from fetched HTML.

use std::collections::HashSet;

use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::text::registrable_host;

/// Elements whose text is never part of the main content.
const EXCLUDED: &[&str] = &[
    "script", "style", "noscript", "template", "nav", "header", "footer", "aside", "svg", "form",
    "iframe", "button",
];

const BLOCKS: &str = "h1, h2, h3, h4, h5, h6, p, li, td, th, blockquote, pre, dt, dd";

const MAIN_ROOTS: &[&str] = &["main", "article", "[role=main]", "body"];

#[derive(Debug, Clone, PartialEq)]
pub struct ExtractedPage {
    pub title: Option<String>,
    pub content: String,
    pub truncated: bool,
    /// Same-domain links in document order, fragments removed.
    pub links: Vec<Url>,
}

fn selector(css: &str) -> Option<Selector> {
    Selector::parse(css).ok()
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn is_excluded(name: &str) -> bool {
    EXCLUDED.contains(&name)
}

/// True when an ancestor between `element` and `root` is excluded or is
/// itself a block that will already be emitted.
fn shadowed(element: ElementRef<'_>, root: ElementRef<'_>, blocks: &Selector) -> bool {
    for ancestor in element.ancestors() {
        if ancestor.id() == root.id() {
            return false;
        }
        if let Some(parent) = ElementRef::wrap(ancestor) {
            if is_excluded(parent.value().name()) || blocks.matches(&parent) {
                return true;
            }
        }
    }
    false
}

fn prefix(name: &str) -> String {
    match name {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = name[1..].parse::<usize>().unwrap_or(1);
            format!("{} ", "#".repeat(level))
        }
        "li" => "- ".to_string(),
        _ => String::new(),
    }
}

fn main_root(document: &Html) -> ElementRef<'_> {
    MAIN_ROOTS
        .iter()
        .filter_map(|css| selector(css))
        .find_map(|sel| document.select(&sel).next())
        .unwrap_or_else(|| document.root_element())
}

fn main_text(root: ElementRef<'_>) -> String {
    let mut lines = Vec::new();

    if let Some(blocks) = selector(BLOCKS) {
        for element in root.select(&blocks) {
            if is_excluded(element.value().name()) || shadowed(element, root, &blocks) {
                continue;
            }
            let text = element_text(element);
            if !text.is_empty() {
                lines.push(format!("{}{}", prefix(element.value().name()), text));
            }
        }
    }

    if lines.is_empty() {
        // No block markup: fall back to every visible text node.
        for node in root.descendants() {
            let Some(text) = node.value().as_text() else {
                continue;
            };
            let hidden = node.ancestors().any(|ancestor| {
                ElementRef::wrap(ancestor)
                    .map(|element| is_excluded(element.value().name()))
                    .unwrap_or(false)
            });
            let text = collapse_whitespace(text);
            if !hidden && !text.is_empty() {
                lines.push(text);
            }
        }
    }

    lines.join("\n")
}

fn title(document: &Html) -> Option<String> {
    ["title", "h1"]
        .iter()
        .filter_map(|css| selector(css))
        .filter_map(|sel| document.select(&sel).next().map(element_text))
        .find(|text| !text.is_empty())
}

fn same_domain_links(document: &Html, page_url: &Url, max_links: usize) -> Vec<Url> {
    let Some(anchors) = selector("a[href]") else {
        return Vec::new();
    };
    let host = registrable_host(page_url);
    let mut current = page_url.clone();
    current.set_fragment(None);

    let mut seen = HashSet::new();
    let mut links = Vec::new();
    for anchor in document.select(&anchors) {
        if links.len() >= max_links {
            break;
        }
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let Ok(mut link) = page_url.join(href.trim()) else {
            continue;
        };
        if !matches!(link.scheme(), "http" | "https") {
            continue;
        }
        link.set_fragment(None);
        if registrable_host(&link) != host || link == current {
            continue;
        }
        if seen.insert(link.as_str().to_string()) {
            links.push(link);
        }
    }
    links
}

/// Extract up to `max_chars` characters of main content plus up to
/// `max_links` same-domain links.
pub fn extract_page(html: &str, page_url: &Url, max_chars: usize, max_links: usize) -> ExtractedPage {
    let document = Html::parse_document(html);
    let text = main_text(main_root(&document));

    let truncated = text.chars().count() > max_chars;
    let content = if truncated {
        text.chars().take(max_chars).collect()
    } else {
        text
    };

    ExtractedPage {
        title: title(&document),
        content,
        truncated,
        links: same_domain_links(&document, page_url, max_links),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
        <html>
          <head><title> Acme Tools </title><script>var tracking = 1;</script></head>
          <body>
            <header><nav><a href="/pricing">Pricing</a><a href="https://twitter.com/acme">Twitter</a></nav></header>
            <main>
              <h1>Build faster</h1>
              <p>Acme sells   developer <b>licenses</b>.</p>
              <ul><li>Pro plan</li><li>Team plan <p>nested</p></li></ul>
              <h3>FAQ</h3>
              <form><p>Newsletter signup</p></form>
              <a href="#top">Top</a>
              <a href="/docs#install">Docs</a>
              <a href="https://www.acme.dev/docs">Docs again</a>
              <a href="mailto:hi@acme.dev">Mail</a>
            </main>
            <footer><p>Copyright Acme</p></footer>
          </body>
        </html>
    "##;

    fn page_url() -> Url {
        Url::parse("https://acme.dev/").unwrap()
    }

    #[test]
    fn test_main_content_is_flattened() {
        let page = extract_page(PAGE, &page_url(), 3_000, 20);
        assert_eq!(page.title.as_deref(), Some("Acme Tools"));
        assert_eq!(
            page.content,
            "# Build faster\nAcme sells developer licenses.\n- Pro plan\n- Team plan nested\n### FAQ"
        );
        assert!(!page.truncated);
        assert!(!page.content.contains("tracking"));
        assert!(!page.content.contains("Copyright"));
        assert!(!page.content.contains("Newsletter"));
    }

    #[test]
    fn test_links_are_same_domain_and_deduplicated() {
        let page = extract_page(PAGE, &page_url(), 3_000, 20);
        let links: Vec<&str> = page.links.iter().map(Url::as_str).collect();
        assert_eq!(
            links,
            vec![
                "https://acme.dev/pricing",
                "https://acme.dev/docs",
                "https://www.acme.dev/docs",
            ]
        );
    }

    #[test]
    fn test_link_limit() {
        let page = extract_page(PAGE, &page_url(), 3_000, 1);
        assert_eq!(page.links.len(), 1);
    }

    #[test]
    fn test_truncation() {
        let long = format!("<html><body><p>{}</p></body></html>", "a".repeat(5_000));
        let page = extract_page(&long, &page_url(), 3_000, 20);
        assert!(page.truncated);
        assert_eq!(page.content.chars().count(), 3_000);
    }

    #[test]
    fn test_plain_text_fallback() {
        let html = "<html><body><div>Only <span>divs</span> here</div><script>x()</script></body></html>";
        let page = extract_page(html, &page_url(), 3_000, 20);
        assert_eq!(page.content, "Only\ndivs\nhere");
        assert!(page.links.is_empty());
    }
}
