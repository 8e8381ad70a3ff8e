use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDateTime;
use rusqlite::{Connection, OpenFlags, Row};

const DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Where and how to read the WordPress tables.
#[derive(Debug, Clone)]
pub struct SourceOptions {
    pub database: PathBuf,
    pub table_prefix: String,
    pub site_prefix: String,
}

impl SourceOptions {
    /// Per-site table, e.g. `wp_2_posts`.
    fn site_table(&self, name: &str) -> String {
        format!("{}{}{}", self.table_prefix, self.site_prefix, name)
    }

    /// Network-wide table; `users` is shared across a multisite install.
    fn global_table(&self, name: &str) -> String {
        format!("{}{}", self.table_prefix, name)
    }
}

// ── Records ──

#[derive(Debug, Clone, Default)]
pub struct ContentRecord {
    pub id: i64,
    pub guid: String,
    pub kind: String,
    pub status: String,
    pub title: String,
    pub slug: Option<String>,
    pub date: Option<NaiveDateTime>,
    pub date_gmt: String,
    pub content: String,
    pub excerpt: String,
    pub comment_count: i64,
    pub author: String,
    pub author_login: String,
    pub author_email: String,
    pub author_url: String,
}

impl ContentRecord {
    pub fn is_page(&self) -> bool {
        self.kind == "page"
    }

    pub fn is_draft(&self) -> bool {
        self.status == "draft"
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TermKind {
    Category,
    Tag,
    Other(String),
}

impl TermKind {
    pub fn from_taxonomy(taxonomy: &str) -> Self {
        match taxonomy {
            "category" => TermKind::Category,
            "post_tag" => TermKind::Tag,
            other => TermKind::Other(other.to_string()),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TermRecord {
    pub name: String,
    pub kind: TermKind,
}

#[derive(Debug, Clone, Default)]
pub struct CommentRecord {
    pub id: i64,
    pub author: String,
    pub author_email: String,
    pub author_url: String,
    pub date: String,
    pub date_gmt: String,
    pub content: String,
    pub approved: String,
}

impl CommentRecord {
    pub fn is_spam(&self) -> bool {
        self.approved == "spam"
    }
}

#[derive(Debug, Clone, Default)]
pub struct PageRecord {
    pub id: i64,
    pub title: String,
    pub slug: String,
    pub parent: Option<i64>,
}

/// Source of typed rows. Every failure here aborts the run.
pub trait RowSupplier {
    /// Posts of every type, restricted to `statuses` unless it is empty.
    fn posts(&self, statuses: &[String]) -> Result<Vec<ContentRecord>>;
    fn terms(&self, post_id: i64) -> Result<Vec<TermRecord>>;
    /// All comments for a post, spam included.
    fn comments(&self, post_id: i64) -> Result<Vec<CommentRecord>>;
    /// Every page-type row, regardless of status.
    fn pages(&self) -> Result<Vec<PageRecord>>;
}

// ── SQLite ──

pub struct SqliteSource {
    conn: Connection,
    opts: SourceOptions,
}

pub fn connect(opts: &SourceOptions) -> Result<SqliteSource> {
    let conn = Connection::open_with_flags(
        &opts.database,
        OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
    )
    .with_context(|| format!("Failed to open {:?}", opts.database))?;
    Ok(SqliteSource::new(conn, opts.clone()))
}

impl SqliteSource {
    pub fn new(conn: Connection, opts: SourceOptions) -> Self {
        SqliteSource { conn, opts }
    }

    /// Post counts grouped by (type, status), for the `stats` command.
    pub fn counts_by_type_and_status(&self) -> Result<Vec<(String, String, i64)>> {
        let sql = format!(
            "SELECT post_type, post_status, COUNT(*) FROM {} GROUP BY post_type, post_status
             ORDER BY post_type, post_status",
            self.opts.site_table("posts")
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok((text(row, 0)?, text(row, 1)?, row.get(2)?))
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

impl RowSupplier for SqliteSource {
    fn posts(&self, statuses: &[String]) -> Result<Vec<ContentRecord>> {
        let mut sql = format!(
            "SELECT
               posts.ID, posts.guid, posts.post_type, posts.post_status,
               posts.post_title, posts.post_name, posts.post_date, posts.post_date_gmt,
               posts.post_content, posts.post_excerpt, posts.comment_count,
               users.display_name, users.user_login, users.user_email, users.user_url
             FROM {} AS posts
             LEFT JOIN {} AS users ON posts.post_author = users.ID",
            self.opts.site_table("posts"),
            self.opts.global_table("users"),
        );
        if !statuses.is_empty() {
            let placeholders = vec!["?"; statuses.len()].join(", ");
            sql.push_str(&format!(" WHERE posts.post_status IN ({})", placeholders));
        }
        sql.push_str(" ORDER BY posts.ID");

        let mut stmt = self
            .conn
            .prepare(&sql)
            .context("Failed to prepare posts query")?;
        let rows = stmt
            .query_map(rusqlite::params_from_iter(statuses), |row| {
                Ok(ContentRecord {
                    id: row.get(0)?,
                    guid: text(row, 1)?,
                    kind: text(row, 2)?,
                    status: text(row, 3)?,
                    title: text(row, 4)?,
                    slug: row.get::<_, Option<String>>(5)?.filter(|s| !s.is_empty()),
                    date: row
                        .get::<_, Option<String>>(6)?
                        .as_deref()
                        .and_then(parse_date),
                    date_gmt: date_text(row, 7)?,
                    content: text(row, 8)?,
                    excerpt: text(row, 9)?,
                    comment_count: row.get::<_, Option<i64>>(10)?.unwrap_or(0),
                    author: text(row, 11)?,
                    author_login: text(row, 12)?,
                    author_email: text(row, 13)?,
                    author_url: text(row, 14)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn terms(&self, post_id: i64) -> Result<Vec<TermRecord>> {
        let sql = format!(
            "SELECT terms.name, ttax.taxonomy
             FROM {} AS terms, {} AS trels, {} AS ttax
             WHERE trels.object_id = ?1
               AND trels.term_taxonomy_id = ttax.term_taxonomy_id
               AND terms.term_id = ttax.term_id",
            self.opts.site_table("terms"),
            self.opts.site_table("term_relationships"),
            self.opts.site_table("term_taxonomy"),
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map([post_id], |row| {
                Ok(TermRecord {
                    name: text(row, 0)?,
                    kind: TermKind::from_taxonomy(&text(row, 1)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read terms for post {}", post_id))?;
        Ok(rows)
    }

    fn comments(&self, post_id: i64) -> Result<Vec<CommentRecord>> {
        let sql = format!(
            "SELECT comment_ID, comment_author, comment_author_email, comment_author_url,
                    comment_date, comment_date_gmt, comment_content, comment_approved
             FROM {}
             WHERE comment_post_ID = ?1",
            self.opts.site_table("comments"),
        );
        let mut stmt = self.conn.prepare_cached(&sql)?;
        let rows = stmt
            .query_map([post_id], |row| {
                Ok(CommentRecord {
                    id: row.get(0)?,
                    author: text(row, 1)?,
                    author_email: text(row, 2)?,
                    author_url: text(row, 3)?,
                    date: text(row, 4)?,
                    date_gmt: text(row, 5)?,
                    content: text(row, 6)?,
                    approved: text(row, 7)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()
            .with_context(|| format!("Failed to read comments for post {}", post_id))?;
        Ok(rows)
    }

    fn pages(&self) -> Result<Vec<PageRecord>> {
        let sql = format!(
            "SELECT ID, post_title, post_name, post_parent
             FROM {}
             WHERE post_type = 'page'",
            self.opts.site_table("posts"),
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], |row| {
                Ok(PageRecord {
                    id: row.get(0)?,
                    title: text(row, 1)?,
                    slug: text(row, 2)?,
                    parent: row.get(3)?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }
}

/// Nullable text column, coerced to "".
fn text(row: &Row, idx: usize) -> rusqlite::Result<String> {
    Ok(row.get::<_, Option<String>>(idx)?.unwrap_or_default())
}

/// Date column kept as text; zero or unparsable values become "".
fn date_text(row: &Row, idx: usize) -> rusqlite::Result<String> {
    let raw = text(row, idx)?;
    Ok(if parse_date(&raw).is_some() { raw } else { String::new() })
}

/// WordPress stores `0000-00-00 00:00:00` for unset dates; those become `None`.
pub fn parse_date(raw: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw.trim(), DATE_FORMAT).ok()
}

pub fn format_date(date: &NaiveDateTime) -> String {
    date.format(DATE_FORMAT).to_string()
}
