use serde::Serialize;

use crate::db::CommentRecord;
use crate::transform::entities::TextNormalizer;

/// One comment as it appears in the frontmatter. Field order is the key order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub author_email: String,
    pub author_url: String,
    pub date: String,
    pub date_gmt: String,
    pub content: String,
}

/// Drop spam, normalize author and body, order by id ascending.
pub fn collect(records: &[CommentRecord], normalizer: &dyn TextNormalizer) -> Vec<Comment> {
    let mut comments: Vec<Comment> = records
        .iter()
        .filter(|r| !r.is_spam())
        .map(|r| Comment {
            id: r.id,
            author: normalizer.normalize(&r.author),
            author_email: r.author_email.clone(),
            author_url: r.author_url.clone(),
            date: r.date.clone(),
            date_gmt: r.date_gmt.clone(),
            content: normalizer.normalize(&r.content),
        })
        .collect();
    comments.sort_by_key(|c| c.id);
    comments
}
