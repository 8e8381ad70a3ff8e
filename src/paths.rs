use std::collections::{HashMap, HashSet};

use chrono::{Datelike, NaiveDateTime};

use crate::db::{ContentRecord, PageRecord};
use crate::error::ImportError;
use crate::transform::slug::slugify;

#[derive(Debug, Clone)]
pub struct PathOptions {
    /// Without the leading dot.
    pub extension: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageEntry {
    pub slug: String,
    pub parent: Option<i64>,
}

/// Page id → (slug, parent). Built once from every page row, then read-only.
#[derive(Debug, Default)]
pub struct PageHierarchyIndex {
    pages: HashMap<i64, PageEntry>,
}

impl PageHierarchyIndex {
    pub fn build(pages: &[PageRecord]) -> Self {
        let pages = pages
            .iter()
            .map(|p| {
                let slug = if p.slug.is_empty() {
                    slugify(&p.title)
                } else {
                    path_segment(&p.slug, p.id)
                };
                (p.id, PageEntry { slug, parent: p.parent })
            })
            .collect();
        PageHierarchyIndex { pages }
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    /// Slugs from the root down to `id`, joined with `/`. Unknown ids end the
    /// walk; an id seen twice is a cycle.
    pub fn page_path(&self, id: i64) -> Result<String, ImportError> {
        let mut slugs = Vec::new();
        let mut visited = HashSet::new();
        let mut current = Some(id);

        while let Some(cur) = current {
            let Some(entry) = self.pages.get(&cur) else {
                break;
            };
            if !visited.insert(cur) {
                return Err(ImportError::PageCycle { id: cur });
            }
            if !entry.slug.is_empty() {
                slugs.push(entry.slug.as_str());
            }
            current = entry.parent;
        }

        slugs.reverse();
        Ok(slugs.join("/").trim_matches('/').to_string())
    }
}

/// A slug usable as one path component. Separators and dot segments would
/// escape the output root, so such slugs are re-slugified, falling back to
/// the record id.
pub fn path_segment(slug: &str, id: i64) -> String {
    let unsafe_segment = slug.is_empty()
        || slug == "."
        || slug == ".."
        || slug.contains(['/', '\\', '\0']);
    if !unsafe_segment {
        return slug.to_string();
    }
    let cleaned = slugify(slug);
    if cleaned.is_empty() {
        id.to_string()
    } else {
        cleaned
    }
}

/// Output path relative to the site root, `/`-separated.
pub fn resolve(
    record: &ContentRecord,
    slug: &str,
    date: &NaiveDateTime,
    index: &PageHierarchyIndex,
    opts: &PathOptions,
) -> Result<String, ImportError> {
    if record.is_page() {
        let mut dir = index.page_path(record.id)?;
        if dir.is_empty() {
            dir = format!("page_{}", record.id);
        }
        return Ok(format!("{}/index.{}", dir, opts.extension));
    }

    let slug = path_segment(slug, record.id);
    if record.is_draft() {
        // Drafts are always Markdown, whatever the configured extension.
        return Ok(format!("_drafts/{}.md", slug));
    }

    Ok(format!(
        "_posts/{:02}-{:02}-{:02}-{}.{}",
        date.year(),
        date.month(),
        date.day(),
        slug,
        opts.extension
    ))
}
