use std::sync::LazyLock;

use regex::Regex;

const BLOCK_TAGS: &str = "table|thead|tfoot|caption|col|colgroup|tbody|tr|td|th|div|dl|dd|dt|ul|ol|li|pre|select|option|form|map|area|blockquote|address|math|style|p|h[1-6]|hr|fieldset|legend|section|article|aside|hgroup|header|footer|nav|figure|figcaption|details|menu|summary|script|iframe";

static BLOCK_TAG_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(&format!(r"(?i)^</?(?:{}|!--)", BLOCK_TAGS)).unwrap());

/// Text followed by a closing block tag on its own, e.g. the tail of a
/// blockquote that had a blank line inside it.
static TRAILING_CLOSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"(?is)^(.*?)\s*(</(?:{})\s*>)$", BLOCK_TAGS)).unwrap()
});

static PRE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?is)<pre[\s>].*?</pre>").unwrap());

static BLANK_LINES_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\n\s*\n").unwrap());

/// Wrap plain-text paragraphs in `<p>`; blocks that already open with a
/// block-level tag are left alone. `<pre>` spans pass through byte for byte,
/// blank lines included.
pub fn autop(text: &str) -> String {
    let text = text.replace("\r\n", "\n").replace('\r', "\n");

    let mut preserved = Vec::new();
    let text = PRE_RE.replace_all(&text, |caps: &regex::Captures| {
        preserved.push(caps[0].to_string());
        format!("<pre wp-pre-tag-{}></pre>", preserved.len() - 1)
    });

    let mut out = String::with_capacity(text.len() + 16);
    for block in BLANK_LINES_RE.split(&text) {
        let block = block.trim();
        if block.is_empty() {
            continue;
        }
        if BLOCK_TAG_RE.is_match(block) {
            out.push_str(block);
        } else if let Some(caps) = TRAILING_CLOSE_RE.captures(block) {
            push_paragraph(&mut out, &caps[1]);
            out.push('\n');
            out.push_str(&caps[2]);
        } else {
            push_paragraph(&mut out, block);
        }
        out.push('\n');
    }

    for (i, pre) in preserved.iter().enumerate() {
        out = out.replacen(&format!("<pre wp-pre-tag-{}></pre>", i), pre, 1);
    }
    out
}

fn push_paragraph(out: &mut String, block: &str) {
    out.push_str("<p>");
    out.push_str(&block.replace('\n', "<br />\n"));
    out.push_str("</p>");
}
