use crate::core::chat::{AnalysisMode, ChatRequest};
use std::fmt::Write;

fn or_unspecified(value: &str, fallback: &'static str) -> String {
    if value.trim().is_empty() {
        fallback.to_string()
    } else {
        value.to_string()
    }
}

/// Canned Markdown analysis returned when no webhook is configured.
pub fn mock_reply(request: &ChatRequest) -> String {
    let ctx = &request.context;
    let mode = match request.mode {
        AnalysisMode::Full => "Full",
        AnalysisMode::Quick => "Quick",
    };
    let market = or_unspecified(&ctx.market, "your market");
    let goals = if ctx.goals.is_empty() {
        "None specified".to_string()
    } else {
        ctx.goals.join(", ")
    };

    let mut out = String::new();
    let _ = writeln!(out, "**Mock Response** (workflow webhook not configured)\n");
    let _ = writeln!(out, "## SEO Analysis - {mode} Mode\n");
    let _ = writeln!(out, "### Context");
    let _ = writeln!(
        out,
        "- **Domain:** {}",
        or_unspecified(&ctx.domain, "Not specified")
    );
    let _ = writeln!(
        out,
        "- **Market:** {}",
        or_unspecified(&ctx.market, "Not specified")
    );
    let _ = writeln!(out, "- **Goals:** {goals}\n");
    let _ = writeln!(out, "### Your Question\n> {}\n", request.message);
    let _ = writeln!(out, "### Key Findings\n");
    let _ = writeln!(
        out,
        "1. **Technical SEO:** Consider implementing schema markup for richer snippets.\n"
    );
    let _ = writeln!(
        out,
        "2. **Content Strategy:** Focus on long-tail keywords related to \"{market}\".\n"
    );
    let _ = writeln!(
        out,
        "3. **Performance:** Optimize Core Web Vitals, particularly LCP and CLS.\n"
    );
    let _ = writeln!(out, "---\n");
    let _ = write!(
        out,
        "*This is a mock response. Configure a webhook URL to get a real analysis.*"
    );
    out
}
