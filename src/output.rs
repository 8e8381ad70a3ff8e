use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde_yaml::Mapping;

use crate::error::ImportError;
use crate::markup::autop;

/// `---`, YAML frontmatter, `---`, body. Always ends with a newline.
pub fn render(frontmatter: &Mapping, body: &str, paragraphs: bool) -> Result<String, serde_yaml::Error> {
    let yaml = serde_yaml::to_string(frontmatter)?;
    let body = if paragraphs {
        autop(body)
    } else {
        body.to_string()
    };

    let mut out = String::with_capacity(yaml.len() + body.len() + 8);
    out.push_str("---\n");
    out.push_str(&yaml);
    out.push_str("---\n");
    out.push_str(&body);
    if !out.ends_with('\n') {
        out.push('\n');
    }
    Ok(out)
}

/// Receives finished documents. `path` is relative and `/`-separated.
pub trait DocumentSink {
    fn write(&mut self, path: &str, contents: &str) -> Result<(), ImportError>;
}

/// Writes under `root`, creating directories and replacing existing files.
pub struct FsSink {
    root: PathBuf,
}

impl FsSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        FsSink { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }
}

impl DocumentSink for FsSink {
    fn write(&mut self, path: &str, contents: &str) -> Result<(), ImportError> {
        let target = self.root.join(path);
        let wrap = |source: std::io::Error| ImportError::Write {
            path: target.clone(),
            source,
        };
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(wrap)?;
        }
        fs::write(&target, contents).map_err(wrap)
    }
}

/// Keeps documents in memory, keyed by path. Used for dry runs.
#[derive(Debug, Default)]
pub struct MemorySink {
    pub documents: BTreeMap<String, String>,
}

impl DocumentSink for MemorySink {
    fn write(&mut self, path: &str, contents: &str) -> Result<(), ImportError> {
        self.documents.insert(path.to_string(), contents.to_string());
        Ok(())
    }
}
