use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use config::{Config, Environment, File, FileFormat};
use regex::Regex;
use serde::Deserialize;

use crate::db::SourceOptions;
use crate::error::ImportError;
use crate::paths::PathOptions;
use crate::transform::content::ContentOptions;
use crate::transform::frontmatter::FrontmatterOptions;
use crate::transform::taxonomy::TaxonomyOptions;

const ENV_PREFIX: &str = "WP_IMPORT";

static PREFIX_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[A-Za-z0-9_]*$").unwrap());

/// Fully resolved run settings. Built once in `main`, read-only afterwards.
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub database: PathBuf,
    pub output: PathBuf,
    pub table_prefix: String,
    pub site_prefix: String,
    pub clean_entities: bool,
    pub comments: bool,
    pub categories: bool,
    pub tags: bool,
    pub more_excerpt: bool,
    pub more_anchor: bool,
    pub paragraphs: bool,
    pub extension: String,
    pub status: Vec<String>,
}

/// Command-line values. `None` leaves the lower layers untouched.
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub database: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub table_prefix: Option<String>,
    pub site_prefix: Option<String>,
    pub extension: Option<String>,
    pub status: Option<Vec<String>>,
    pub clean_entities: Option<bool>,
    pub comments: Option<bool>,
    pub categories: Option<bool>,
    pub tags: Option<bool>,
    pub more_excerpt: Option<bool>,
    pub more_anchor: Option<bool>,
    pub paragraphs: Option<bool>,
}

impl Settings {
    /// Layering, lowest first: defaults, TOML file, `WP_IMPORT_*` env, CLI.
    pub fn load(file: Option<&Path>, overrides: &Overrides) -> Result<Self, ImportError> {
        let mut builder = Config::builder()
            .set_default("database", "wordpress.sqlite")?
            .set_default("output", ".")?
            .set_default("table_prefix", "wp_")?
            .set_default("site_prefix", "")?
            .set_default("clean_entities", true)?
            .set_default("comments", true)?
            .set_default("categories", true)?
            .set_default("tags", true)?
            .set_default("more_excerpt", true)?
            .set_default("more_anchor", true)?
            .set_default("paragraphs", true)?
            .set_default("extension", "html")?
            .set_default("status", vec!["publish"])?;

        if let Some(path) = file {
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let settings: Settings = builder
            .add_source(
                Environment::with_prefix(ENV_PREFIX)
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("status"),
            )
            .set_override_option("database", path_value(&overrides.database))?
            .set_override_option("output", path_value(&overrides.output))?
            .set_override_option("table_prefix", overrides.table_prefix.clone())?
            .set_override_option("site_prefix", overrides.site_prefix.clone())?
            .set_override_option("extension", overrides.extension.clone())?
            .set_override_option("status", overrides.status.clone())?
            .set_override_option("clean_entities", overrides.clean_entities)?
            .set_override_option("comments", overrides.comments)?
            .set_override_option("categories", overrides.categories)?
            .set_override_option("tags", overrides.tags)?
            .set_override_option("more_excerpt", overrides.more_excerpt)?
            .set_override_option("more_anchor", overrides.more_anchor)?
            .set_override_option("paragraphs", overrides.paragraphs)?
            .build()?
            .try_deserialize()?;

        settings.validate()
    }

    fn validate(mut self) -> Result<Self, ImportError> {
        for (which, value) in [
            ("table_prefix", &self.table_prefix),
            ("site_prefix", &self.site_prefix),
        ] {
            if !PREFIX_RE.is_match(value) {
                return Err(ImportError::InvalidPrefix {
                    which,
                    value: value.clone(),
                });
            }
        }

        let extension = self.extension.trim().trim_start_matches('.').to_string();
        if extension.is_empty() || extension.contains(['/', '\\']) {
            return Err(ImportError::InvalidExtension(self.extension));
        }
        self.extension = extension;

        self.status = self
            .status
            .into_iter()
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        Ok(self)
    }

    pub fn source_options(&self) -> SourceOptions {
        SourceOptions {
            database: self.database.clone(),
            table_prefix: self.table_prefix.clone(),
            site_prefix: self.site_prefix.clone(),
        }
    }

    pub fn content_options(&self) -> ContentOptions {
        ContentOptions {
            more_excerpt: self.more_excerpt,
            more_anchor: self.more_anchor,
        }
    }

    pub fn taxonomy_options(&self) -> TaxonomyOptions {
        TaxonomyOptions {
            categories: self.categories,
            tags: self.tags,
        }
    }

    pub fn frontmatter_options(&self) -> FrontmatterOptions {
        FrontmatterOptions {
            categories: self.categories,
            tags: self.tags,
            comments: self.comments,
        }
    }

    pub fn path_options(&self) -> PathOptions {
        PathOptions {
            extension: self.extension.clone(),
        }
    }

    pub fn status_filter(&self) -> StatusFilter {
        StatusFilter::new(self.status.clone())
    }
}

fn path_value(path: &Option<PathBuf>) -> Option<String> {
    path.as_ref().map(|p| p.to_string_lossy().into_owned())
}

/// Status allow-list. An empty list lets every status through.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusFilter {
    allowed: Vec<String>,
}

impl StatusFilter {
    pub fn new(allowed: Vec<String>) -> Self {
        StatusFilter { allowed }
    }

    pub fn allows(&self, status: &str) -> bool {
        self.allowed.is_empty() || self.allowed.iter().any(|s| s == status)
    }

    pub fn statuses(&self) -> &[String] {
        &self.allowed
    }
}
