//! Turns raw model output into a single plain-text line for display.

use once_cell::sync::Lazy;
use regex::Regex;

const REASONING_OPEN: &str = "<think>";
const REASONING_CLOSE: &str = "</think>";

static MARKDOWN_LINK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[([^\]]+)\]\(([^)]+)\)").expect("valid link pattern"));

static TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid tag pattern"));

/// Strip reasoning markers, markdown links and tags, then normalize whitespace.
///
/// Total over all input and idempotent: link and tag removal are repeated
/// until neither matches, since removing one can splice together another
/// (`[a]<br>(b)` or `[[a](x)](y)`).
pub fn sanitize(raw: &str) -> String {
    let mut text = raw.replace(REASONING_OPEN, "").replace(REASONING_CLOSE, "");

    loop {
        let stripped = {
            let unlinked = MARKDOWN_LINK.replace_all(&text, "$1");
            TAG.replace_all(&unlinked, "").into_owned()
        };
        if stripped == text {
            break;
        }
        text = stripped;
    }

    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
