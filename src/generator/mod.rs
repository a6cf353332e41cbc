//! Generator module - runs the build pipeline
//!
//! A build is assembled in a staging directory next to `.build` and swapped
//! into place only when every stage succeeded. A failed build leaves the
//! previous output untouched.

use std::fs;
use std::path::Path;
use std::time::Instant;

use tempfile::TempDir;
use walkdir::WalkDir;

use crate::cache::{self, BUILD_DIR, STAGING_PREFIX};
use crate::content::loader::ContentLoader;
use crate::error::BuildError;
use crate::helpers::html_escape;
use crate::templates::{self, TemplateResolver};
use crate::Flux;

/// Result of a successful build command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BuildOutcome {
    /// Nothing changed since the last build
    UpToDate,
    /// The site was rebuilt with this many posts
    Built { posts: usize },
}

/// One line of the generated index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    /// Link target relative to the site root
    pub path: String,
    /// Post title shown as link text
    pub title: String,
}

/// What a generate pass wrote
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Generated {
    /// Number of post pages
    pub posts: usize,
    /// Pages written with unresolved placeholders, with the keys that had
    /// no value
    pub incomplete: Vec<(String, Vec<String>)>,
}

/// Static site generator for a site tree
pub struct Generator<'a> {
    flux: &'a Flux,
}

impl<'a> Generator<'a> {
    /// Create a new generator
    pub fn new(flux: &'a Flux) -> Self {
        Self { flux }
    }

    /// Build the site if it is stale, or unconditionally with `force`
    pub fn run(&self, force: bool) -> Result<BuildOutcome, BuildError> {
        if !force && !cache::needs_rebuild(&self.flux.base_dir) {
            tracing::info!("Build output is up to date");
            return Ok(BuildOutcome::UpToDate);
        }

        let start = Instant::now();

        let staging = tempfile::Builder::new()
            .prefix(STAGING_PREFIX)
            .tempdir_in(&self.flux.base_dir)
            .map_err(BuildError::io(&self.flux.base_dir))?;
        tracing::debug!("Staging build in {:?}", staging.path());

        let generated = self.generate(staging.path())?;
        self.swap(staging)?;

        if !generated.incomplete.is_empty() {
            tracing::warn!(
                "{} pages built with unresolved placeholders",
                generated.incomplete.len()
            );
            for (page, keys) in &generated.incomplete {
                tracing::warn!("  {}: {}", page, keys.join(", "));
            }
        }

        let posts = generated.posts;

        tracing::info!(
            "Built {} posts in {:.2}s",
            posts,
            start.elapsed().as_secs_f64()
        );
        Ok(BuildOutcome::Built { posts })
    }

    /// Generate the entire site into `out_dir`
    pub fn generate(&self, out_dir: &Path) -> Result<Generated, BuildError> {
        let flux = self.flux;

        // Copy public assets
        let copied = copy_dir(&flux.public_dir, &out_dir.join("public"))?;
        tracing::debug!("Copied {} public files", copied);

        // Resolve file includes once per template
        let resolver = TemplateResolver::new(&flux.templates_dir);
        let post_template = resolver.resolve_file(flux.templates_dir.join("post.html"))?;
        let index_template = resolver.resolve_file(flux.templates_dir.join("index.html"))?;

        // Generate post pages
        let posts_out = out_dir.join("posts");
        fs::create_dir_all(&posts_out).map_err(BuildError::io(&posts_out))?;

        let posts = ContentLoader::new(flux).load_posts()?;
        let mut entries = Vec::with_capacity(posts.len());
        let mut incomplete = Vec::new();

        for post in &posts {
            let title = post.title().ok_or_else(|| BuildError::MissingTitle {
                post: post.source.clone(),
            })?;

            let path = format!("posts/{}", post.output_name());
            let rendered = templates::build(&post_template, &post.metadata);
            write_file(&out_dir.join(&path), &rendered.html)?;
            tracing::debug!("Generated {}", path);

            if !rendered.missing.is_empty() {
                incomplete.push((path.clone(), rendered.missing));
            }
            entries.push(IndexEntry {
                path,
                title: title.to_string(),
            });
        }

        // Generate index
        let index_id = flux.config.index_div_id();
        let mut index_metadata = flux.config.metadata().clone();
        index_metadata.insert(index_id.to_string(), render_index(&entries, index_id));
        let rendered = templates::build(&index_template, &index_metadata);
        write_file(&out_dir.join("index.html"), &rendered.html)?;
        if !rendered.missing.is_empty() {
            incomplete.push(("index.html".to_string(), rendered.missing));
        }

        Ok(Generated {
            posts: posts.len(),
            incomplete,
        })
    }

    /// Move the staged output into place as `.build`
    fn swap(&self, staging: TempDir) -> Result<(), BuildError> {
        let build_dir = &self.flux.build_dir;
        let previous = self
            .flux
            .base_dir
            .join(format!("{}previous", STAGING_PREFIX));

        if previous.exists() {
            fs::remove_dir_all(&previous).map_err(BuildError::io(&previous))?;
        }

        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(staging.path(), fs::Permissions::from_mode(0o755))
                .map_err(BuildError::io(staging.path()))?;
        }

        let had_previous = build_dir.exists();
        if had_previous {
            fs::rename(build_dir, &previous).map_err(BuildError::io(build_dir))?;
        }

        // From here the staging directory is cleaned up by hand
        let staging = staging.into_path();
        if let Err(e) = fs::rename(&staging, build_dir) {
            if let Err(cleanup) = fs::remove_dir_all(&staging) {
                tracing::warn!("Failed to remove {:?}: {}", staging, cleanup);
            }
            if had_previous {
                if let Err(restore) = fs::rename(&previous, build_dir) {
                    tracing::error!("Failed to restore previous {}: {}", BUILD_DIR, restore);
                }
            }
            return Err(BuildError::io(build_dir)(e));
        }

        if had_previous {
            if let Err(e) = fs::remove_dir_all(&previous) {
                tracing::warn!("Failed to remove {:?}: {}", previous, e);
            }
        }

        Ok(())
    }
}

/// Render the index list wrapped in `<div id="{container_id}">`
pub fn render_index(entries: &[IndexEntry], container_id: &str) -> String {
    let mut html = format!("<div id=\"{}\">\n<ul>\n", html_escape(container_id));
    for entry in entries {
        html.push_str(&format!(
            "<li><a href=\"{}\">{}</a></li>\n",
            html_escape(&entry.path),
            html_escape(&entry.title)
        ));
    }
    html.push_str("</ul>\n</div>");
    html
}

/// Recursively copy `src` to `dest`. Returns the number of files copied.
fn copy_dir(src: &Path, dest: &Path) -> Result<usize, BuildError> {
    fs::create_dir_all(dest).map_err(BuildError::io(dest))?;

    let mut copied = 0;
    for entry in WalkDir::new(src).follow_links(true) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(src).to_path_buf();
            BuildError::Io {
                path,
                source: e.into(),
            }
        })?;

        let Ok(relative) = entry.path().strip_prefix(src) else {
            continue;
        };
        let target = dest.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(BuildError::io(&target))?;
        } else {
            fs::copy(entry.path(), &target).map_err(BuildError::io(entry.path()))?;
            copied += 1;
        }
    }

    Ok(copied)
}

fn write_file(path: &Path, contents: &str) -> Result<(), BuildError> {
    fs::write(path, contents).map_err(BuildError::io(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::site_tree;

    fn write(root: &Path, relative: &str, contents: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_render_index() {
        let entries = vec![
            IndexEntry {
                path: "posts/a.html".into(),
                title: "First & Best".into(),
            },
            IndexEntry {
                path: "posts/b.html".into(),
                title: "Second".into(),
            },
        ];
        let html = render_index(&entries, "index");
        assert!(html.starts_with(r#"<div id="index">"#));
        assert!(html.contains(r#"<li><a href="posts/a.html">First &amp; Best</a></li>"#));
        assert!(html.contains(r#"<li><a href="posts/b.html">Second</a></li>"#));
        assert!(html.find("a.html").unwrap() < html.find("b.html").unwrap());
    }

    #[test]
    fn test_full_build() {
        let site = site_tree();
        let root = site.path();
        write(
            root,
            "site.cfg",
            "[config]\nport = 5555\n\n[metadata]\nsite_name = My Blog\n",
        );
        write(
            root,
            "templates/index.html",
            "<title>{site_name}</title>{@nav.html}{index}",
        );
        write(
            root,
            "templates/post.html",
            "<title>{title} - {site_name}</title>{@nav.html}{post}",
        );
        write(root, "templates/nav.html", "<nav>{site_name}</nav>");
        write(root, "public/css/style.css", "body {}");
        write(
            root,
            "posts/hello-world.md",
            "<!--\n[metadata]\ntitle: Hello World\n-->\n# Hi\n",
        );
        write(
            root,
            "posts/second.md",
            "<!--\n[metadata]\ntitle: Second <Post>\n-->\ntext",
        );

        let flux = Flux::open(root).unwrap();
        let outcome = Generator::new(&flux).run(false).unwrap();
        assert_eq!(outcome, BuildOutcome::Built { posts: 2 });

        let build = root.join(BUILD_DIR);
        assert_eq!(
            fs::read_to_string(build.join("public/css/style.css")).unwrap(),
            "body {}"
        );

        let post = fs::read_to_string(build.join("posts/hello-world.html")).unwrap();
        assert!(post.starts_with("<title>Hello World - My Blog</title><nav>My Blog</nav>"));
        assert!(post.contains(r#"<div id="post">"#));
        assert!(post.contains("<h1>Hi</h1>"));

        let index = fs::read_to_string(build.join("index.html")).unwrap();
        assert!(index.starts_with("<title>My Blog</title><nav>My Blog</nav>"));
        assert!(index.contains(r#"<a href="posts/hello-world.html">Hello World</a>"#));
        assert!(index.contains(r#"<a href="posts/second.html">Second &lt;Post&gt;</a>"#));

        // No staging directories are left behind
        let leftovers: Vec<_> = fs::read_dir(root)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
            .collect();
        assert!(leftovers.is_empty());
    }

    #[test]
    fn test_second_build_is_up_to_date() {
        let site = site_tree();
        write(site.path(), "posts/a.md", "<!--\ntitle: A\n-->\n");
        let flux = Flux::open(site.path()).unwrap();
        let generator = Generator::new(&flux);

        assert_eq!(generator.run(false).unwrap(), BuildOutcome::Built { posts: 1 });
        assert!(!flux.needs_rebuild());
        assert_eq!(generator.run(false).unwrap(), BuildOutcome::UpToDate);
        assert_eq!(generator.run(true).unwrap(), BuildOutcome::Built { posts: 1 });
    }

    #[test]
    fn test_missing_title_aborts_and_keeps_previous_build() {
        let site = site_tree();
        let root = site.path();
        write(root, "posts/good.md", "<!--\ntitle: Good\n-->\n");
        let flux = Flux::open(root).unwrap();
        Generator::new(&flux).run(false).unwrap();

        write(root, "posts/bad.md", "<!--\n[metadata]\nauthor: nobody\n-->\nbody");
        let err = Generator::new(&flux).run(true).unwrap_err();
        match err {
            BuildError::MissingTitle { post } => assert!(post.ends_with("bad.md")),
            other => panic!("unexpected error: {}", other),
        }

        let build = root.join(BUILD_DIR);
        assert!(build.join("posts/good.html").exists());
        assert!(!build.join("posts/bad.html").exists());
        let leftovers = fs::read_dir(root)
            .unwrap()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_name().to_string_lossy().starts_with(STAGING_PREFIX))
            .count();
        assert_eq!(leftovers, 0);
    }

    #[test]
    fn test_rebuild_replaces_previous_output() {
        let site = site_tree();
        let root = site.path();
        write(root, "templates/post.html", "{title}");
        write(root, "posts/a.md", "<!--\ntitle: Old\n-->\n");
        let flux = Flux::open(root).unwrap();
        Generator::new(&flux).run(false).unwrap();

        write(root, "posts/a.md", "<!--\ntitle: New\n-->\n");
        Generator::new(&flux).run(true).unwrap();

        let build = root.join(BUILD_DIR);
        assert_eq!(fs::read_to_string(build.join("posts/a.html")).unwrap(), "New");
        let names: Vec<_> = fs::read_dir(root)
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .filter(|name| name.starts_with(".build"))
            .collect();
        assert_eq!(names, vec![BUILD_DIR.to_string()]);
    }

    #[test]
    fn test_global_title_overrides_post_title() {
        let site = site_tree();
        let root = site.path();
        write(root, "site.cfg", "[config]\n[metadata]\ntitle = Site\n");
        write(root, "posts/a.md", "<!--\ntitle: Hi\n-->\n");
        let flux = Flux::open(root).unwrap();
        Generator::new(&flux).run(false).unwrap();

        let index = fs::read_to_string(root.join(BUILD_DIR).join("index.html")).unwrap();
        assert!(index.contains(">Site</a>"));
    }

    #[test]
    fn test_circular_include_fails_build() {
        let site = site_tree();
        let root = site.path();
        write(root, "templates/post.html", "{@loop.html}{post}");
        write(root, "templates/loop.html", "{@loop.html}");
        let flux = Flux::open(root).unwrap();
        let err = Generator::new(&flux).run(false).unwrap_err();
        assert!(matches!(
            err,
            BuildError::Template(templates::TemplateError::CircularInclude { .. })
        ));
        assert!(!root.join(BUILD_DIR).exists());
    }

    #[test]
    fn test_suffix_only_rename() {
        let site = site_tree();
        let root = site.path();
        write(root, "posts/notes.md.draft.md", "<!--\ntitle: Notes\n-->\n");
        let flux = Flux::open(root).unwrap();
        Generator::new(&flux).run(false).unwrap();
        assert!(root.join(BUILD_DIR).join("posts/notes.md.draft.html").exists());
    }

    #[test]
    fn test_missing_include_and_key_do_not_fail() {
        let site = site_tree();
        let root = site.path();
        write(root, "templates/index.html", "{@nope.html}[{unknown}]{index}");
        let flux = Flux::open(root).unwrap();
        assert!(Generator::new(&flux).run(false).is_ok());
        let index = fs::read_to_string(root.join(BUILD_DIR).join("index.html")).unwrap();
        assert!(index.starts_with("[]<div id=\"index\">"));
    }

    #[test]
    fn test_generate_reports_unresolved_placeholders() {
        let site = site_tree();
        let root = site.path();
        write(root, "templates/index.html", "{@nope.html}[{unknown}]{index}");
        write(root, "templates/post.html", "{title}{author}{post}");
        write(root, "posts/a.md", "<!--\ntitle: A\n-->\n");
        write(root, "posts/b.md", "<!--\ntitle: B\nauthor: me\n-->\n");
        let flux = Flux::open(root).unwrap();

        let out = tempfile::tempdir().unwrap();
        let generated = Generator::new(&flux).generate(out.path()).unwrap();
        assert_eq!(generated.posts, 2);
        assert_eq!(
            generated.incomplete,
            vec![
                ("posts/a.html".to_string(), vec!["author".to_string()]),
                (
                    "index.html".to_string(),
                    vec!["@nope.html".to_string(), "unknown".to_string()]
                ),
            ]
        );
    }
}
