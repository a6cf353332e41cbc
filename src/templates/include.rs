//! File inclusion: expands `{@path}` placeholders

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{include_path, placeholders, TemplateError, PLACEHOLDER};

/// Expands inclusion placeholders. Every path, including ones found inside
/// included files, is relative to `root`.
pub struct TemplateResolver {
    root: PathBuf,
}

impl TemplateResolver {
    /// Create a resolver rooted at a templates directory
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Expand every inclusion placeholder in `text`.
    ///
    /// A placeholder naming a file that does not exist is left in place and
    /// logged. Includes that lead back to a file already being expanded fail
    /// with [`TemplateError::CircularInclude`].
    pub fn resolve(&self, text: &str) -> Result<String, TemplateError> {
        self.resolve_chain(text, &mut Vec::new())
    }

    /// Read a template file and expand it. The file itself counts as part of
    /// the include chain.
    pub fn resolve_file<P: AsRef<Path>>(&self, path: P) -> Result<String, TemplateError> {
        let path = path.as_ref();
        let (canonical, contents) = read_template(path)?;
        let mut chain = vec![canonical];
        self.resolve_chain(&contents, &mut chain)
    }

    fn resolve_chain(&self, text: &str, chain: &mut Vec<PathBuf>) -> Result<String, TemplateError> {
        let mut expanded: HashMap<&str, String> = HashMap::new();

        for span in placeholders(text) {
            let Some(relative) = include_path(span) else {
                continue;
            };

            let path = self.root.join(relative.trim());
            if !path.is_file() {
                tracing::warn!("Could not resolve include {}: {:?} does not exist", span, path);
                continue;
            }

            let (canonical, contents) = read_template(&path)?;
            if chain.contains(&canonical) {
                let mut cycle = chain.clone();
                cycle.push(canonical);
                return Err(TemplateError::CircularInclude { chain: cycle });
            }

            tracing::debug!("Including {:?}", path);
            chain.push(canonical);
            let resolved = self.resolve_chain(&contents, chain)?;
            chain.pop();

            expanded.insert(span, resolved);
        }

        if expanded.is_empty() {
            return Ok(text.to_string());
        }

        Ok(PLACEHOLDER
            .replace_all(text, |caps: &regex::Captures| match expanded.get(&caps[0]) {
                Some(contents) => contents.clone(),
                None => caps[0].to_string(),
            })
            .into_owned())
    }
}

fn read_template(path: &Path) -> Result<(PathBuf, String), TemplateError> {
    let read_error = |source| TemplateError::Read {
        path: path.to_path_buf(),
        source,
    };
    let canonical = path.canonicalize().map_err(read_error)?;
    let contents = fs::read_to_string(path).map_err(read_error)?;
    Ok((canonical, contents))
}
