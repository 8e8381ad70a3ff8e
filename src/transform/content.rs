use std::sync::LazyLock;

use regex::Regex;

use crate::db::ContentRecord;
use crate::transform::entities::TextNormalizer;
use crate::transform::slug::slugify;

static MORE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<!-- *more *-->").unwrap());

#[derive(Debug, Clone, Copy)]
pub struct ContentOptions {
    /// Use the text before the marker as excerpt when the post has none.
    pub more_excerpt: bool,
    /// Replace the marker with `more` / `more-<id>` anchors.
    pub more_anchor: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Content {
    pub title: String,
    pub slug: String,
    pub body: String,
    pub excerpt: String,
    /// True when a marker was replaced by anchors.
    pub anchored: bool,
}

pub fn transform(
    record: &ContentRecord,
    opts: ContentOptions,
    normalizer: &dyn TextNormalizer,
) -> Content {
    let title = normalizer.normalize(&record.title);
    let slug = match record.slug.as_deref() {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => slugify(&title),
    };

    let mut body = normalizer.normalize(&record.content);
    let mut excerpt = normalizer.normalize(&record.excerpt);
    let mut anchored = false;

    if let Some(m) = MORE_RE.find(&body) {
        let range = m.range();
        if opts.more_excerpt && record.excerpt.is_empty() {
            excerpt = body[..range.start].to_string();
        }
        if opts.more_anchor {
            let anchors = format!(r#"<a id="more"></a><a id="more-{}"></a>"#, record.id);
            body.replace_range(range, &anchors);
            anchored = true;
        }
    }

    Content {
        title,
        slug,
        body,
        excerpt,
        anchored,
    }
}
