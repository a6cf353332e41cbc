//! Create a new site tree

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::helpers::name_to_path;
use crate::CONFIG_FILE;

const HELP_TEXT: &str = r#"This is your site directory. Flux commands must be executed at the root of this directory.
First, inspect the `site.cfg` file. This config file has two sections: config and metadata.
Config parameters change how flux works, a list of them can be found below.

port - The port the development server uses to host the site.
index_div_id - The ID of the HTML div element containing the generated index.
post_div_id - The ID of the HTML div element containing a generated post.
highlight_theme - The syntax highlighting theme used for fenced code blocks.

A metadata parameter is used by the templating engine to insert values into your HTML. You
can define any key-value pair here. Metadata values defined in the `site.cfg` file are global.
This means they're accessible by all templates and take precedence over local metadata. Have a
look at how `site_name` is used in the default `index.html` template:

<title>{site_name}</title>

Local metadata values are defined in a comment header at the top of a markdown file:

<!--
[metadata]
title: <title>
-->

HTML templates can also insert file contents by providing a path, relative to the templates
directory, instead of a metadata key:

<body>
    {@navbar.html}
</body>

All of your HTML templates should live in the templates directory; `index.html` and `post.html`
must exist. Put all public resources (images, CSS, etc.) in the public directory.

To create a new post, run:

flux create post "<post name>"
"#;

const INDEX_TEMPLATE: &str = r#"<html lang="en">
    <head>
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <title>{site_name}</title>
    </head>
    <body>
        <h1>{site_name}</h1>
        {index}
    </body>
</html>
"#;

const POST_TEMPLATE: &str = r#"<html lang="en">
    <head>
        <meta name="viewport" content="width=device-width, initial-scale=1.0">
        <title>{title}</title>
    </head>
    <body>
        {post}
    </body>
</html>
"#;

fn default_config(site_name: &str) -> String {
    format!(
        r#"; Site configuration.
[config]
port = 5555
index_div_id = index
post_div_id = post

; Globally scoped metadata.
[metadata]
site_name = {}
"#,
        site_name
    )
}

/// Create a site tree named `site_name` inside `parent`.
///
/// The directory name is derived from the site name. Fails if that directory
/// already exists.
pub fn create_site(parent: &Path, site_name: &str) -> Result<PathBuf> {
    let dir_name = name_to_path(site_name);
    if dir_name.is_empty() {
        anyhow::bail!("Site name {:?} has no letters or digits", site_name);
    }

    let target_dir = parent.join(dir_name);
    if target_dir.exists() {
        anyhow::bail!(
            "Site tree could not be created because {:?} already exists",
            target_dir
        );
    }

    // Create directory structure
    fs::create_dir_all(target_dir.join("posts"))?;
    fs::create_dir_all(target_dir.join("public"))?;
    fs::create_dir_all(target_dir.join("templates"))?;

    fs::write(target_dir.join("help.txt"), HELP_TEXT)?;
    fs::write(target_dir.join(CONFIG_FILE), default_config(site_name))?;
    fs::write(target_dir.join("templates/index.html"), INDEX_TEMPLATE)?;
    fs::write(target_dir.join("templates/post.html"), POST_TEMPLATE)?;

    tracing::debug!("Created site tree at {:?}", target_dir);
    Ok(target_dir)
}
