pub mod comments;
pub mod content;
pub mod entities;
pub mod frontmatter;
pub mod slug;
pub mod taxonomy;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde_yaml::Mapping;

use crate::db::{self, CommentRecord, ContentRecord, TermRecord};
use content::ContentOptions;
use entities::TextNormalizer;
use frontmatter::{FrontmatterOptions, Related};
use taxonomy::TaxonomyOptions;

#[derive(Debug, Clone, Copy)]
pub struct TransformOptions {
    pub content: ContentOptions,
    pub taxonomy: TaxonomyOptions,
    pub frontmatter: FrontmatterOptions,
}

/// A post ready for path assignment.
#[derive(Debug, Clone)]
pub struct Transformed {
    pub slug: String,
    pub date: NaiveDateTime,
    pub frontmatter: Mapping,
    pub body: String,
}

/// record + related rows → content → frontmatter.
pub fn process_post(
    record: &ContentRecord,
    term_rows: &[TermRecord],
    comment_rows: &[CommentRecord],
    opts: &TransformOptions,
    normalizer: &dyn TextNormalizer,
) -> Result<Transformed, serde_yaml::Error> {
    let content = content::transform(record, opts.content, normalizer);
    let (categories, tags) = taxonomy::resolve(term_rows, opts.taxonomy, normalizer);
    let related = Related {
        categories,
        tags,
        comments: comments::collect(comment_rows, normalizer),
    };

    let date = record_date(record);
    let frontmatter = frontmatter::build(record, &content, &date, &related, opts.frontmatter)?;

    Ok(Transformed {
        slug: content.slug,
        date,
        frontmatter,
        body: content.body,
    })
}

/// Local date, else the GMT date, else the Unix epoch. Never the wall clock,
/// so repeated runs name files the same way.
pub fn record_date(record: &ContentRecord) -> NaiveDateTime {
    record
        .date
        .or_else(|| db::parse_date(&record.date_gmt))
        .unwrap_or(DateTime::<Utc>::UNIX_EPOCH.naive_utc())
}
