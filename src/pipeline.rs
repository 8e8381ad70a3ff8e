use std::collections::HashSet;

use anyhow::{Context, Result};
use indicatif::ProgressBar;
use tracing::{debug, info, warn};

use crate::config::{Settings, StatusFilter};
use crate::db::RowSupplier;
use crate::output::{self, DocumentSink};
use crate::paths::{self, PageHierarchyIndex, PathOptions};
use crate::transform::entities::TextNormalizer;
use crate::transform::{self, TransformOptions};

#[derive(Debug, Clone)]
pub struct RunOptions {
    pub transform: TransformOptions,
    pub paths: PathOptions,
    pub status: StatusFilter,
    pub paragraphs: bool,
}

impl RunOptions {
    pub fn from_settings(settings: &Settings) -> Self {
        RunOptions {
            transform: TransformOptions {
                content: settings.content_options(),
                taxonomy: settings.taxonomy_options(),
                frontmatter: settings.frontmatter_options(),
            },
            paths: settings.path_options(),
            status: settings.status_filter(),
            paragraphs: settings.paragraphs,
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Summary {
    pub posts: usize,
    pub pages: usize,
    pub drafts: usize,
    /// Rows returned by the source but outside the status allow-list.
    pub skipped: usize,
}

impl Summary {
    pub fn written(&self) -> usize {
        self.posts + self.pages + self.drafts
    }
}

/// Full batch: read every row, build the page index, then transform and emit
/// one document per retained record. Any error aborts the run.
pub fn run(
    source: &dyn RowSupplier,
    sink: &mut dyn DocumentSink,
    opts: &RunOptions,
    normalizer: &dyn TextNormalizer,
    progress: &ProgressBar,
) -> Result<Summary> {
    let mut summary = Summary::default();

    let (records, rejected): (Vec<_>, Vec<_>) = source
        .posts(opts.status.statuses())
        .context("Failed to read posts")?
        .into_iter()
        .partition(|r| opts.status.allows(&r.status));
    summary.skipped = rejected.len();
    info!(records = records.len(), skipped = summary.skipped, "Loaded posts");

    let index = PageHierarchyIndex::build(&source.pages().context("Failed to read pages")?);
    info!(pages = index.len(), "Built page hierarchy");

    progress.set_length(records.len() as u64);
    let mut seen = HashSet::new();

    for record in &records {
        let terms = if opts.transform.taxonomy.any() {
            source.terms(record.id)?
        } else {
            Vec::new()
        };
        let comments = if opts.transform.frontmatter.comments && record.comment_count > 0 {
            source.comments(record.id)?
        } else {
            Vec::new()
        };

        let post = transform::process_post(
            record,
            &terms,
            &comments,
            &opts.transform,
            normalizer,
        )
        .with_context(|| format!("Failed to build frontmatter for post {}", record.id))?;

        let path = paths::resolve(record, &post.slug, &post.date, &index, &opts.paths)?;
        let document = output::render(&post.frontmatter, &post.body, opts.paragraphs)?;

        if !seen.insert(path.clone()) {
            warn!(id = record.id, path = %path, "Path already written in this run; overwriting");
        }
        sink.write(&path, &document)?;
        debug!(id = record.id, path = %path, "Wrote document");

        if record.is_page() {
            summary.pages += 1;
        } else if record.is_draft() {
            summary.drafts += 1;
        } else {
            summary.posts += 1;
        }
        progress.inc(1);
    }

    info!(written = summary.written(), "Import finished");
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Overrides;
    use crate::error::ImportError;
    use crate::output::MemorySink;
    use crate::test_helpers::{fixture_source, Fixture};
    use crate::transform::entities::Passthrough;
    fn options(overrides: Overrides) -> RunOptions {
        RunOptions::from_settings(&Settings::load(None, &overrides).unwrap())
    }

    fn import(fx: Fixture, opts: &RunOptions) -> Result<(Summary, MemorySink)> {
        let source = fixture_source(fx);
        let mut sink = MemorySink::default();
        let summary = run(
            &source,
            &mut sink,
            opts,
            &Passthrough,
            &ProgressBar::hidden(),
        )?;
        Ok((summary, sink))
    }

    fn blog() -> Fixture {
        let fx = Fixture::new();
        fx.user(1, "Jane Doe", "jane", "jane@example.com", "");
        fx.post(10, "post", "publish", "Hello, World!", "");
        fx.set_post_author(10, 1);
        fx.set_content(10, "Intro text<!-- more -->Rest", "");
        fx.term(10, "News", "category");
        fx.term(10, "rust", "post_tag");
        fx.comment(10, 5, "Eve", "Third", "1");
        fx.comment(10, 1, "Ann", "First", "1");
        fx.comment(10, 3, "Bob", "Second", "0");
        fx.comment(10, 4, "Bot", "Spam", "spam");
        fx.post(11, "post", "draft", "Work in progress", "wip");
        fx.post(20, "page", "publish", "Docs", "docs");
        fx.post(21, "page", "publish", "Guide", "guide");
        fx.set_parent(21, 20);
        fx
    }

    #[test]
    fn default_status_filter_skips_drafts() {
        let (summary, sink) = import(blog(), &options(Overrides::default())).unwrap();
        assert_eq!(summary.drafts, 0);
        assert_eq!(summary.posts, 1);
        assert_eq!(summary.pages, 2);
        assert!(!sink.documents.contains_key("_drafts/wip.md"));
    }

    #[test]
    fn empty_allow_list_includes_everything() {
        let opts = options(Overrides {
            status: Some(Vec::new()),
            extension: Some("markdown".into()),
            ..Default::default()
        });
        let (summary, sink) = import(blog(), &opts).unwrap();
        assert_eq!(summary.written(), 4);
        let paths: Vec<&str> = sink.documents.keys().map(String::as_str).collect();
        assert_eq!(
            paths,
            vec![
                "_drafts/wip.md",
                "_posts/2024-03-05-hello-world.markdown",
                "docs/guide/index.markdown",
                "docs/index.markdown",
            ]
        );
    }

    #[test]
    fn post_document_contents() {
        let opts = options(Overrides {
            paragraphs: Some(false),
            ..Default::default()
        });
        let (_, sink) = import(blog(), &opts).unwrap();
        let doc = &sink.documents["_posts/2024-03-05-hello-world.html"];

        assert!(doc.starts_with("---\nlayout: post\nstatus: publish\npublished: true\ntitle: "));
        assert!(doc.contains("author_login: jane\nauthor_email: jane@example.com\n"));
        assert!(doc.contains("excerpt: Intro text\nmore_anchor: more\nwordpress_id: 10\n"));
        assert!(doc.contains("categories:\n- News\ntags:\n- rust\n"));
        assert!(doc.ends_with(
            "---\nIntro text<a id=\"more\"></a><a id=\"more-10\"></a>Rest\n"
        ));

        let first = doc.find("content: First").unwrap();
        let second = doc.find("content: Second").unwrap();
        let third = doc.find("content: Third").unwrap();
        assert!(first < second && second < third);
        assert!(!doc.contains("Spam"));
    }

    #[test]
    fn zero_comments_still_emit_empty_list() {
        let fx = Fixture::new();
        fx.post(1, "post", "publish", "Quiet", "quiet");
        let (_, sink) = import(fx, &options(Overrides::default())).unwrap();
        let doc = &sink.documents["_posts/2024-03-05-quiet.html"];
        assert!(doc.contains("comments: []\n"));
        assert!(!doc.contains("excerpt:"));
    }

    #[test]
    fn missing_date_uses_gmt_date() {
        let fx = Fixture::new();
        fx.post(1, "post", "publish", "Undated", "undated");
        fx.set_dates(1, "", "2023-12-31 23:30:00");
        let (_, sink) = import(fx, &options(Overrides::default())).unwrap();
        let doc = &sink.documents["_posts/2023-12-31-undated.html"];
        assert!(doc.contains("date: 2023-12-31 23:30:00\n"));
    }

    #[test]
    fn zero_dated_post_is_stable_across_runs() {
        let zero_dated = || {
            let fx = Fixture::new();
            fx.post(1, "post", "publish", "Undated", "undated");
            fx.set_dates(1, "0000-00-00 00:00:00", "0000-00-00 00:00:00");
            fx
        };
        let opts = options(Overrides::default());
        let (_, first) = import(zero_dated(), &opts).unwrap();
        std::thread::sleep(std::time::Duration::from_millis(1100));
        let (_, second) = import(zero_dated(), &opts).unwrap();
        assert_eq!(first.documents, second.documents);

        let doc = &first.documents["_posts/1970-01-01-undated.html"];
        assert!(doc.contains("date: 1970-01-01 00:00:00\n"));
        assert!(!doc.contains("date_gmt:"));
    }

    #[test]
    fn unlisted_parent_page_still_nests_under_draft_parent() {
        // The hierarchy index ignores the status filter.
        let fx = Fixture::new();
        fx.post(1, "page", "draft", "Hidden Parent", "");
        fx.post(2, "page", "publish", "Child", "child");
        fx.set_parent(2, 1);
        let (summary, sink) = import(fx, &options(Overrides::default())).unwrap();
        assert_eq!(summary.pages, 1);
        assert!(sink.documents.contains_key("hidden-parent/child/index.html"));
    }

    #[test]
    fn page_cycle_aborts() {
        let fx = Fixture::new();
        fx.post(1, "page", "publish", "A", "a");
        fx.post(2, "page", "publish", "B", "b");
        fx.set_parent(1, 2);
        fx.set_parent(2, 1);
        let err = import(fx, &options(Overrides::default())).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ImportError>(),
            Some(ImportError::PageCycle { .. })
        ));
    }

    #[test]
    fn runs_are_byte_identical() {
        let opts = options(Overrides {
            status: Some(Vec::new()),
            ..Default::default()
        });
        let (_, first) = import(blog(), &opts).unwrap();
        let (_, second) = import(blog(), &opts).unwrap();
        assert_eq!(first.documents, second.documents);
    }

    #[test]
    fn disabled_features_skip_queries_and_keys() {
        let opts = options(Overrides {
            categories: Some(false),
            tags: Some(false),
            comments: Some(false),
            ..Default::default()
        });
        let (_, sink) = import(blog(), &opts).unwrap();
        let doc = &sink.documents["_posts/2024-03-05-hello-world.html"];
        assert!(!doc.contains("categories:"));
        assert!(!doc.contains("tags:"));
        assert!(!doc.contains("comments:"));
    }
}
