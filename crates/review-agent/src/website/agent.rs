//! Tool-calling exploration loop over one merchant website.

use review_model::{
    ChatMessage, ChatRequest, LanguageModel, ModelError, TokenUsage, ToolCall, ToolChoice,
    ToolSpec,
};
use review_types::WebsitePage;
use serde_json::json;
use url::Url;

use crate::config::WebsiteConfig;
use crate::error::BrowserError;
use crate::text::{registrable_host, same_site};
use crate::website::browser::BrowserPage;
use crate::website::extract::extract_page;

pub const VISIT_PAGE_TOOL: &str = "visit_page";

/// Progress of one run. Kept outside the loop future so pages survive a
/// timeout.
#[derive(Debug, Default)]
pub(crate) struct Exploration {
    pub pages: Vec<WebsitePage>,
    pub visits: usize,
    pub usage: TokenUsage,
    pub summary: Option<String>,
}

fn visit_page_tool() -> ToolSpec {
    ToolSpec {
        name: VISIT_PAGE_TOOL.to_string(),
        description: "Load a page on the merchant's website and return its main text content \
                      and the same-site links found on it."
            .to_string(),
        input_schema: json!({
            "type": "object",
            "properties": {
                "url": {
                    "type": "string",
                    "description": "Absolute URL, or a path relative to the website root"
                }
            },
            "required": ["url"],
            "additionalProperties": false
        }),
    }
}

fn system_prompt(domain: &str, config: &WebsiteConfig) -> String {
    format!(
        "You are reviewing the website of a merchant applying to sell through a payments \
         platform. Use the {tool} tool to read pages on {domain}. You may visit at most \
         {pages} pages and only pages on {domain}. Start with the home page, then pick the \
         pages that best explain what is sold: pricing, products, about, terms, refund policy.\n\n\
         When you are done, answer with a plain-prose summary of at most {words} words covering:\n\
         1. Business description: what the company does and who runs it.\n\
         2. Products and pricing: what is sold, how it is delivered, what it costs.\n\
         3. Target audience.\n\
         4. Red flags: placeholder or template content, claims that contradict each other, \
         signs of a prohibited business presented as something else, empty or broken pages.\n\
         Report only what the pages show. If pages failed to load, say so.",
        tool = VISIT_PAGE_TOOL,
        domain = domain,
        pages = config.max_pages,
        words = config.max_summary_words,
    )
}

fn render_page(page: &WebsitePage, links: &[Url]) -> String {
    let mut out = format!(
        "URL: {}\nTitle: {}\n\n{}",
        page.url,
        page.title.as_deref().unwrap_or("(none)"),
        if page.content.is_empty() {
            "(no text content)"
        } else {
            page.content.as_str()
        }
    );
    if page.truncated {
        out.push_str("\n[content truncated]");
    }
    out.push_str("\n\nLinks on this site:\n");
    if links.is_empty() {
        out.push_str("(none)\n");
    }
    for link in links {
        out.push_str("- ");
        out.push_str(link.as_str());
        out.push('\n');
    }
    out
}

fn resolve_target(call: &ToolCall, seed: &Url) -> Result<Url, String> {
    if call.name != VISIT_PAGE_TOOL {
        return Err(format!("Unknown tool '{}'. Only {} is available.", call.name, VISIT_PAGE_TOOL));
    }
    let raw = call
        .arguments
        .get("url")
        .and_then(|value| value.as_str())
        .ok_or_else(|| "Missing 'url' argument.".to_string())?;
    let mut target = seed
        .join(raw.trim())
        .map_err(|e| format!("Invalid URL '{}': {}", raw, e))?;
    target.set_fragment(None);

    if !matches!(target.scheme(), "http" | "https")
        || !same_site(&target, seed)
    {
        return Err(format!(
            "{} is outside {}. Only pages on the merchant's own domain can be visited.",
            target,
            registrable_host(seed).unwrap_or_default()
        ));
    }
    Ok(target)
}

/// Execute one tool call, returning the tool result and whether it is an error.
async fn visit(
    state: &mut Exploration,
    page: &mut dyn BrowserPage,
    call: &ToolCall,
    seed: &Url,
    config: &WebsiteConfig,
) -> (String, bool) {
    let target = match resolve_target(call, seed) {
        Ok(target) => target,
        Err(message) => return (message, true),
    };

    if state.visits >= config.max_pages {
        return (
            format!(
                "Page budget exhausted ({} pages). Write your summary now.",
                config.max_pages
            ),
            true,
        );
    }
    state.visits += 1;

    let timeout = config.navigation_timeout();
    let loaded = match tokio::time::timeout(timeout, page.goto(&target)).await {
        Ok(result) => result,
        Err(_) => Err(BrowserError::NavigationTimeout {
            url: target.to_string(),
            seconds: timeout.as_secs(),
        }),
    };

    let loaded = match loaded {
        Ok(loaded) if same_site(&loaded.final_url, seed) => loaded,
        Ok(loaded) => {
            return (
                format!("{} redirected off-site to {}.", target, loaded.final_url),
                true,
            )
        }
        Err(e) => {
            tracing::debug!(url = %target, error = %e, "Website navigation failed");
            return (format!("Error loading {}: {}", target, e), true);
        }
    };

    let extracted = extract_page(
        &loaded.html,
        &loaded.final_url,
        config.max_content_chars,
        config.max_links,
    );
    let visited = WebsitePage {
        url: loaded.final_url.to_string(),
        title: extracted.title,
        content: extracted.content,
        truncated: extracted.truncated,
    };
    let rendered = render_page(&visited, &extracted.links);
    state.pages.push(visited);
    (rendered, false)
}

/// Drive the model until it answers without tool calls or the turn limit is
/// hit. Progress is recorded in `state` as it happens.
pub(crate) async fn explore(
    state: &mut Exploration,
    page: &mut dyn BrowserPage,
    model: &dyn LanguageModel,
    seed: &Url,
    config: &WebsiteConfig,
) -> Result<(), ModelError> {
    let domain = registrable_host(seed).unwrap_or_default();
    let system = system_prompt(&domain, config);
    let mut messages = vec![ChatMessage::user(format!(
        "Review the merchant website at {}. Begin by visiting it.",
        seed
    ))];

    for turn in 0..config.max_turns {
        let last_turn = turn + 1 == config.max_turns;
        let choice = if state.visits >= config.max_pages || last_turn {
            ToolChoice::None
        } else {
            ToolChoice::Auto
        };
        let request = ChatRequest::new(messages.clone())
            .with_system(system.clone())
            .with_tools(vec![visit_page_tool()], choice);

        let response = model.chat(&request).await?;
        state.usage.add(response.usage);

        if response.tool_calls.is_empty() {
            state.summary = response
                .text
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty());
            return Ok(());
        }

        messages.push(response.to_message());
        for call in &response.tool_calls {
            let (content, is_error) = visit(state, page, call, seed, config).await;
            messages.push(ChatMessage::tool_result(call.id.clone(), content, is_error));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn call(url: &str) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: VISIT_PAGE_TOOL.to_string(),
            arguments: json!({ "url": url }),
        }
    }

    #[test]
    fn test_relative_targets_resolve_against_seed() {
        let seed = Url::parse("https://acme.dev/").unwrap();
        let target = resolve_target(&call("/pricing#plans"), &seed).unwrap();
        assert_eq!(target.as_str(), "https://acme.dev/pricing");
        assert!(resolve_target(&call("https://www.acme.dev/about"), &seed).is_ok());
    }

    #[test]
    fn test_off_domain_targets_are_refused() {
        let seed = Url::parse("https://acme.dev/").unwrap();
        let err = resolve_target(&call("https://evil.example/"), &seed).unwrap_err();
        assert!(err.contains("outside acme.dev"));
        assert!(resolve_target(&call("ftp://acme.dev/file"), &seed).is_err());
    }

    #[test]
    fn test_unknown_tool_is_refused() {
        let seed = Url::parse("https://acme.dev/").unwrap();
        let mut bad = call("/");
        bad.name = "run_script".to_string();
        assert!(resolve_target(&bad, &seed).unwrap_err().contains("Unknown tool"));
    }

    #[test]
    fn test_system_prompt_states_budget() {
        let prompt = system_prompt("acme.dev", &WebsiteConfig::default());
        assert!(prompt.contains("at most 5 pages"));
        assert!(prompt.contains("at most 500 words"));
        assert!(prompt.contains("Red flags"));
    }
}
