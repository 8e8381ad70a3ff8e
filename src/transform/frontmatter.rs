use chrono::NaiveDateTime;
use serde_yaml::{Mapping, Value};

use crate::db::{format_date, ContentRecord};
use crate::transform::comments::Comment;
use crate::transform::content::Content;

#[derive(Debug, Clone, Copy)]
pub struct FrontmatterOptions {
    pub categories: bool,
    pub tags: bool,
    pub comments: bool,
}

/// Terms and comments attached to one post.
#[derive(Debug, Clone, Default)]
pub struct Related {
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub comments: Vec<Comment>,
}

/// Ordered frontmatter for one post. Null and empty-string values are left
/// out; empty lists are kept.
pub fn build(
    record: &ContentRecord,
    content: &Content,
    date: &NaiveDateTime,
    related: &Related,
    opts: FrontmatterOptions,
) -> Result<Mapping, serde_yaml::Error> {
    let published = if record.is_draft() {
        Value::Null
    } else {
        Value::Bool(record.status == "publish")
    };

    let mut author = Mapping::new();
    author.insert("display_name".into(), record.author.as_str().into());
    author.insert("login".into(), record.author_login.as_str().into());
    author.insert("email".into(), record.author_email.as_str().into());
    author.insert("url".into(), record.author_url.as_str().into());

    let more_anchor = if content.anchored {
        Value::from("more")
    } else {
        Value::Null
    };

    let mut fm = Mapping::new();
    insert(&mut fm, "layout", record.kind.as_str().into());
    insert(&mut fm, "status", record.status.as_str().into());
    insert(&mut fm, "published", published);
    insert(&mut fm, "title", content.title.as_str().into());
    insert(&mut fm, "author", Value::Mapping(author));
    insert(&mut fm, "author_login", record.author_login.as_str().into());
    insert(&mut fm, "author_email", record.author_email.as_str().into());
    insert(&mut fm, "author_url", record.author_url.as_str().into());
    insert(&mut fm, "excerpt", content.excerpt.as_str().into());
    insert(&mut fm, "more_anchor", more_anchor);
    insert(&mut fm, "wordpress_id", record.id.into());
    insert(&mut fm, "wordpress_url", record.guid.as_str().into());
    insert(&mut fm, "date", format_date(date).into());
    insert(&mut fm, "date_gmt", record.date_gmt.as_str().into());

    if opts.categories {
        insert(&mut fm, "categories", strings(&related.categories));
    }
    if opts.tags {
        insert(&mut fm, "tags", strings(&related.tags));
    }
    if opts.comments {
        let comments = related
            .comments
            .iter()
            .map(serde_yaml::to_value)
            .collect::<Result<Vec<_>, _>>()?;
        insert(&mut fm, "comments", Value::Sequence(comments));
    }

    Ok(fm)
}

fn insert(fm: &mut Mapping, key: &str, value: Value) {
    let omitted = match &value {
        Value::Null => true,
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if !omitted {
        fm.insert(key.into(), value);
    }
}

fn strings(items: &[String]) -> Value {
    Value::Sequence(items.iter().map(|s| s.as_str().into()).collect())
}
