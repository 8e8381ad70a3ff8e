//! In-memory WordPress database for tests.

use std::path::PathBuf;

use rusqlite::{params, Connection};

use crate::db::{SourceOptions, SqliteSource};

const SCHEMA: &str = "
    CREATE TABLE wp_users (
        ID            INTEGER PRIMARY KEY,
        user_login    TEXT,
        user_email    TEXT,
        user_url      TEXT,
        display_name  TEXT
    );
    CREATE TABLE wp_posts (
        ID             INTEGER PRIMARY KEY,
        post_author    INTEGER NOT NULL DEFAULT 0,
        post_date      TEXT,
        post_date_gmt  TEXT,
        post_content   TEXT,
        post_title     TEXT,
        post_excerpt   TEXT,
        post_status    TEXT,
        post_name      TEXT,
        post_parent    INTEGER NOT NULL DEFAULT 0,
        guid           TEXT,
        post_type      TEXT,
        comment_count  INTEGER NOT NULL DEFAULT 0
    );
    CREATE TABLE wp_terms (
        term_id  INTEGER PRIMARY KEY,
        name     TEXT,
        slug     TEXT
    );
    CREATE TABLE wp_term_taxonomy (
        term_taxonomy_id  INTEGER PRIMARY KEY,
        term_id           INTEGER NOT NULL,
        taxonomy          TEXT
    );
    CREATE TABLE wp_term_relationships (
        object_id         INTEGER NOT NULL,
        term_taxonomy_id  INTEGER NOT NULL
    );
    CREATE TABLE wp_comments (
        comment_ID            INTEGER PRIMARY KEY,
        comment_post_ID       INTEGER NOT NULL,
        comment_author        TEXT,
        comment_author_email  TEXT,
        comment_author_url    TEXT,
        comment_date          TEXT,
        comment_date_gmt      TEXT,
        comment_content       TEXT,
        comment_approved      TEXT
    );
";

pub struct Fixture {
    pub conn: Connection,
}

impl Fixture {
    pub fn new() -> Self {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch(SCHEMA).unwrap();
        Fixture { conn }
    }

    pub fn post(&self, id: i64, kind: &str, status: &str, title: &str, slug: &str) {
        self.conn
            .execute(
                "INSERT INTO wp_posts
                 (ID, post_date, post_date_gmt, post_content, post_title, post_excerpt,
                  post_status, post_name, guid, post_type)
                 VALUES (?1, '2024-03-05 10:20:30', '2024-03-05 09:20:30', '', ?2, '',
                         ?3, ?4, ?5, ?6)",
                params![id, title, status, slug, format!("https://example.com/?p={}", id), kind],
            )
            .unwrap();
    }

    pub fn set_content(&self, id: i64, content: &str, excerpt: &str) {
        self.conn
            .execute(
                "UPDATE wp_posts SET post_content = ?2, post_excerpt = ?3 WHERE ID = ?1",
                params![id, content, excerpt],
            )
            .unwrap();
    }

    pub fn set_dates(&self, id: i64, date: &str, date_gmt: &str) {
        self.conn
            .execute(
                "UPDATE wp_posts SET post_date = ?2, post_date_gmt = ?3 WHERE ID = ?1",
                params![id, date, date_gmt],
            )
            .unwrap();
    }

    pub fn set_parent(&self, id: i64, parent: i64) {
        self.conn
            .execute(
                "UPDATE wp_posts SET post_parent = ?2 WHERE ID = ?1",
                params![id, parent],
            )
            .unwrap();
    }

    pub fn user(&self, id: i64, display_name: &str, login: &str, email: &str, url: &str) {
        self.conn
            .execute(
                "INSERT INTO wp_users (ID, user_login, user_email, user_url, display_name)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![id, login, email, url, display_name],
            )
            .unwrap();
    }

    pub fn set_post_author(&self, id: i64, author: i64) {
        self.conn
            .execute(
                "UPDATE wp_posts SET post_author = ?2 WHERE ID = ?1",
                params![id, author],
            )
            .unwrap();
    }

    pub fn term(&self, post_id: i64, name: &str, taxonomy: &str) {
        self.conn
            .execute("INSERT INTO wp_terms (name, slug) VALUES (?1, ?1)", params![name])
            .unwrap();
        let term_id = self.conn.last_insert_rowid();
        self.conn
            .execute(
                "INSERT INTO wp_term_taxonomy (term_id, taxonomy) VALUES (?1, ?2)",
                params![term_id, taxonomy],
            )
            .unwrap();
        let ttax_id = self.conn.last_insert_rowid();
        self.conn
            .execute(
                "INSERT INTO wp_term_relationships (object_id, term_taxonomy_id) VALUES (?1, ?2)",
                params![post_id, ttax_id],
            )
            .unwrap();
    }

    /// Inserts a comment and bumps the post's `comment_count` like WordPress does.
    pub fn comment(&self, post_id: i64, id: i64, author: &str, content: &str, approved: &str) {
        self.conn
            .execute(
                "INSERT INTO wp_comments
                 (comment_ID, comment_post_ID, comment_author, comment_author_email,
                  comment_author_url, comment_date, comment_date_gmt, comment_content,
                  comment_approved)
                 VALUES (?1, ?2, ?3, NULL, '', '2024-03-06 08:00:00', '2024-03-06 07:00:00', ?4, ?5)",
                params![id, post_id, author, content, approved],
            )
            .unwrap();
        self.conn
            .execute(
                "UPDATE wp_posts SET comment_count = comment_count + 1 WHERE ID = ?1",
                params![post_id],
            )
            .unwrap();
    }
}

pub fn fixture_source(fx: Fixture) -> SqliteSource {
    SqliteSource::new(
        fx.conn,
        SourceOptions {
            database: PathBuf::from(":memory:"),
            table_prefix: "wp_".into(),
            site_prefix: String::new(),
        },
    )
}
