use tracing::trace;

use crate::db::{TermKind, TermRecord};
use crate::transform::entities::TextNormalizer;

#[derive(Debug, Clone, Copy)]
pub struct TaxonomyOptions {
    pub categories: bool,
    pub tags: bool,
}

impl TaxonomyOptions {
    /// Terms are only worth fetching when one of the two is wanted.
    pub fn any(&self) -> bool {
        self.categories || self.tags
    }
}

/// Split a post's terms into (categories, tags), keeping source order.
pub fn resolve(
    terms: &[TermRecord],
    opts: TaxonomyOptions,
    normalizer: &dyn TextNormalizer,
) -> (Vec<String>, Vec<String>) {
    let mut categories = Vec::new();
    let mut tags = Vec::new();

    for term in terms {
        match &term.kind {
            TermKind::Category if opts.categories => {
                categories.push(normalizer.normalize(&term.name))
            }
            TermKind::Tag if opts.tags => tags.push(normalizer.normalize(&term.name)),
            TermKind::Other(taxonomy) => {
                trace!(taxonomy = %taxonomy, name = %term.name, "Skipping term");
            }
            _ => {}
        }
    }

    (categories, tags)
}
