//! Post model

use std::path::{Path, PathBuf};

use crate::Metadata;

/// A post being built. Created fresh from the markdown file on every build.
#[derive(Debug, Clone)]
pub struct Post {
    /// Full source file path
    pub source: PathBuf,

    /// Post metadata merged with global metadata, including the rendered
    /// body under the post container id
    pub metadata: Metadata,
}

impl Post {
    /// Post title, if the metadata provides one
    pub fn title(&self) -> Option<&str> {
        self.metadata.get("title").map(String::as_str)
    }

    /// File name of the built page: the source name with only its final
    /// `.md` suffix swapped for `.html`
    pub fn output_name(&self) -> String {
        output_name(&self.source)
    }
}

pub(crate) fn output_name(source: &Path) -> String {
    let name = source.file_name().unwrap_or(source.as_os_str());
    Path::new(name)
        .with_extension("html")
        .to_string_lossy()
        .into_owned()
}
