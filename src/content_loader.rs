use std::{
    collections::{hash_map::Entry, HashMap},
    path::{Path, PathBuf},
};

use futures::future::try_join_all;
use gray_matter::{engine::YAML, Matter};
use tokio::fs;
use tracing::{debug, error, info, warn};

use crate::config::SiteConfig;
use crate::error::{BlogError, Result};
use crate::images::derive_featured_image;
use crate::markdown::render_markdown_to_html;
use crate::models::{FrontMatter, Post, SiteUrl, SiteUrls};
use crate::slugs::{create_slug, is_valid_slug};
use crate::state::AppState;

const DEFAULT_LAYOUT: &str = include_str!("views/layout.html");

/// Posts ordered newest first, indexed by slug.
#[derive(Debug, Clone, Default)]
pub struct PostStore {
    posts: Vec<Post>,
    index: HashMap<String, usize>,
}

impl PostStore {
    /// Sorts the posts. Slugs are expected to be unique; on a clash the
    /// newer post owns the slug.
    pub fn new(mut posts: Vec<Post>) -> Self {
        posts.sort_by(|a, b| {
            b.published_on()
                .cmp(&a.published_on())
                .then_with(|| a.slug.cmp(&b.slug))
        });
        let mut index = HashMap::with_capacity(posts.len());
        for (i, post) in posts.iter().enumerate() {
            index.entry(post.slug.clone()).or_insert(i);
        }
        Self { posts, index }
    }

    pub fn all(&self) -> &[Post] {
        &self.posts
    }

    pub fn len(&self) -> usize {
        self.posts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn get(&self, slug: &str) -> Option<&Post> {
        self.index.get(slug).map(|&i| &self.posts[i])
    }

    pub fn latest(&self, count: usize) -> &[Post] {
        &self.posts[..count.min(self.posts.len())]
    }

    /// Up to `count` other posts, closest in publication order first.
    pub fn related(&self, slug: &str, count: usize) -> Vec<&Post> {
        let anchor = self.index.get(slug).copied().unwrap_or(0);
        let mut others: Vec<(usize, &Post)> = self
            .posts
            .iter()
            .enumerate()
            .filter(|(_, post)| post.slug != slug)
            .collect();
        others.sort_by_key(|(i, _)| (i.abs_diff(anchor), *i));
        others.into_iter().take(count).map(|(_, post)| post).collect()
    }

    pub fn urls(&self, config: &SiteConfig) -> SiteUrls {
        let mut base_urls: Vec<SiteUrl> = Vec::new();
        let nav = config
            .navigation
            .main
            .iter()
            .chain(config.navigation.footer.iter())
            .map(|item| (item.name.as_str(), item.path.as_str()))
            .chain([
                ("Blog", config.blog.routes.blog.as_str()),
                ("Sitemap", config.blog.routes.sitemap.as_str()),
            ]);
        for (name, path) in nav {
            if base_urls.iter().all(|u| u.path != path) {
                base_urls.push(SiteUrl {
                    path: path.to_string(),
                    name: name.to_string(),
                    date: None,
                });
            }
        }

        let blog_urls = self
            .posts
            .iter()
            .map(|post| SiteUrl {
                path: config.post_path(&post.slug),
                name: post.title.clone(),
                date: Some(post.date.clone()),
            })
            .collect();

        SiteUrls {
            base_urls,
            blog_urls,
        }
    }
}

/// Everything read from the content directory.
pub struct Content {
    pub layout_html: String,
    pub home_html: Option<String>,
    pub not_found_html: Option<String>,
    pub posts: PostStore,
}

async fn read_optional(path: PathBuf) -> Result<Option<String>> {
    match fs::read_to_string(&path).await {
        Ok(content) => Ok(Some(content)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("Optional content file {} not present", path.display());
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

pub async fn load_content(content_dir: &Path) -> Result<Content> {
    let layout_html = read_optional(content_dir.join("layout.html"))
        .await?
        .unwrap_or_else(|| DEFAULT_LAYOUT.to_string());
    let not_found_html = read_optional(content_dir.join("not_found.html")).await?;

    let home_html = read_optional(content_dir.join("home.md"))
        .await?
        .map(|raw| {
            let matter = Matter::<YAML>::new();
            let body = match matter.parse::<FrontMatter>(&raw) {
                Ok(parsed) => parsed.content,
                Err(e) => {
                    warn!("Ignoring front matter in home.md: {}", e);
                    raw
                }
            };
            render_markdown_to_html(&body)
        });

    let posts = load_posts(&content_dir.join("posts")).await?;
    Ok(Content {
        layout_html,
        home_html,
        not_found_html,
        posts,
    })
}

/// Read every `*.md` file in `posts_dir`. Files with broken front matter are
/// logged and skipped; a repeated slug fails the whole load.
pub async fn load_posts(posts_dir: &Path) -> Result<PostStore> {
    let mut paths = Vec::new();
    let mut entries = match fs::read_dir(posts_dir).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            warn!("No posts directory at {}", posts_dir.display());
            return Ok(PostStore::default());
        }
        Err(e) => return Err(e.into()),
    };
    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().is_some_and(|ext| ext == "md") {
            paths.push(path);
        }
    }
    paths.sort();

    let sources = try_join_all(paths.into_iter().map(|path| async move {
        let raw = fs::read_to_string(&path).await?;
        Ok::<_, BlogError>((path, raw))
    }))
    .await?;

    let mut owners: HashMap<String, PathBuf> = HashMap::new();
    let mut posts = Vec::with_capacity(sources.len());
    for (path, raw) in sources {
        let post = match parse_post(&path, &raw) {
            Ok(post) => post,
            Err(e) => {
                error!("Skipping post: {}", e);
                continue;
            }
        };
        match owners.entry(post.slug.clone()) {
            Entry::Occupied(existing) => {
                return Err(BlogError::DuplicateSlug {
                    slug: post.slug,
                    first: existing.get().clone(),
                    second: path,
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(path);
            }
        }
        posts.push(post);
    }

    info!("Loaded {} posts from {}", posts.len(), posts_dir.display());
    Ok(PostStore::new(posts))
}

pub fn parse_post(path: &Path, raw: &str) -> Result<Post> {
    let matter = Matter::<YAML>::new();
    let parsed = matter
        .parse::<FrontMatter>(raw)
        .map_err(|e| BlogError::front_matter(path, e.to_string()))?;
    let front_matter = parsed
        .data
        .ok_or_else(|| BlogError::front_matter(path, "missing front matter"))?;

    let title = front_matter
        .title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| BlogError::front_matter(path, "missing title"))?;
    let date = front_matter
        .date
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| BlogError::front_matter(path, "missing date"))?;

    let slug = match front_matter.slug.as_deref().map(str::trim) {
        Some(slug) if is_valid_slug(slug) => slug.to_string(),
        Some(slug) if !slug.is_empty() => {
            let fixed = create_slug(slug);
            warn!(path = %path.display(), "Slug `{}` is not URL-safe, using `{}`", slug, fixed);
            fixed
        }
        _ => create_slug(&title),
    };
    if slug.is_empty() {
        return Err(BlogError::front_matter(path, "title does not produce a slug"));
    }

    let content = parsed.content;
    let featured_image = front_matter
        .featured_image
        .filter(|url| !url.trim().is_empty())
        .or_else(|| derive_featured_image(&content));

    Ok(Post {
        slug,
        title: title.trim().to_string(),
        content,
        excerpt: front_matter.excerpt.filter(|e| !e.trim().is_empty()),
        author: front_matter.author.filter(|a| !a.trim().is_empty()),
        date: date.trim().to_string(),
        featured_image,
    })
}

pub async fn reload_content(app_state: &AppState) {
    info!("Reloading application content...");
    match load_content(&app_state.content_dir).await {
        Ok(content) => {
            *app_state.layout_html.write().await = content.layout_html;
            *app_state.home_html.write().await = content.home_html;
            *app_state.not_found_html.write().await = content.not_found_html;
            *app_state.posts.write().await = content.posts;
            info!("Content successfully reloaded.");
        }
        Err(e) => {
            error!("Failed to reload content: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post;

    fn write(dir: &Path, name: &str, body: &str) {
        std::fs::write(dir.join(name), body).unwrap();
    }

    #[test]
    fn derives_slug_and_image_from_content() {
        let raw = "---\ntitle: Hello, World!\ndate: 2024-01-05\n---\n![cover](/static/cover.png)\n\nBody";
        let post = parse_post(Path::new("hello.md"), raw).unwrap();
        assert_eq!(post.slug, "hello-world");
        assert_eq!(post.date, "2024-01-05");
        assert_eq!(post.featured_image.as_deref(), Some("/static/cover.png"));
        assert!(post.content.contains("Body"));
        assert_eq!(post.author, None);
    }

    #[test]
    fn explicit_fields_win() {
        let raw = "---\ntitle: Hello\ndate: 2024-01-05\nslug: custom-slug\nauthor: Ada\nexcerpt: Short\nfeaturedImage: /img.png\n---\nyoutube:dQw4w9WgXcQ";
        let post = parse_post(Path::new("hello.md"), raw).unwrap();
        assert_eq!(post.slug, "custom-slug");
        assert_eq!(post.author.as_deref(), Some("Ada"));
        assert_eq!(post.excerpt.as_deref(), Some("Short"));
        assert_eq!(post.featured_image.as_deref(), Some("/img.png"));
    }

    #[test]
    fn unsafe_slug_is_normalised() {
        let raw = "---\ntitle: Hello\ndate: 2024-01-05\nslug: My Slug\n---\nBody";
        let post = parse_post(Path::new("hello.md"), raw).unwrap();
        assert_eq!(post.slug, "my-slug");
    }

    #[test]
    fn missing_title_is_rejected() {
        let raw = "---\ndate: 2024-01-05\n---\nBody";
        let err = parse_post(Path::new("untitled.md"), raw).unwrap_err();
        assert!(err.to_string().contains("missing title"));
        assert!(err.to_string().contains("untitled.md"));
    }

    #[test]
    fn store_orders_newest_first_and_indexes_slugs() {
        let store = PostStore::new(vec![
            post("old", "Old", "2023-01-01"),
            post("new", "New", "2024-06-01"),
            post("undated", "Undated", "someday"),
            post("mid", "Mid", "2023-09-15T10:00:00Z"),
        ]);
        let order: Vec<_> = store.all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["new", "mid", "old", "undated"]);
        assert_eq!(store.get("mid").map(|p| p.title.as_str()), Some("Mid"));
        assert!(store.get("missing").is_none());
        assert_eq!(store.latest(2).len(), 2);
        assert_eq!(store.latest(10).len(), 4);
    }

    #[test]
    fn related_excludes_current_post() {
        let store = PostStore::new(vec![
            post("a", "A", "2024-05-01"),
            post("b", "B", "2024-04-01"),
            post("c", "C", "2024-03-01"),
            post("d", "D", "2024-02-01"),
            post("e", "E", "2024-01-01"),
        ]);
        let related: Vec<_> = store.related("c", 3).iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(related, vec!["b", "d", "a"]);
        assert_eq!(store.related("a", 10).len(), 4);
        assert!(PostStore::default().related("a", 3).is_empty());
    }

    #[test]
    fn urls_cover_navigation_and_posts() {
        let store = PostStore::new(vec![post("a", "A", "2024-05-01")]);
        let urls = store.urls(&SiteConfig::default());
        let paths: Vec<_> = urls.base_urls.iter().map(|u| u.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["/", "/blog/", "/about/", "/contact/", "/privacy/", "/terms/", "/sitemap/"]
        );
        assert_eq!(urls.blog_urls.len(), 1);
        assert_eq!(urls.blog_urls[0].path, "/a/");
        assert_eq!(urls.blog_urls[0].date.as_deref(), Some("2024-05-01"));
    }

    #[tokio::test]
    async fn loads_posts_and_skips_broken_files() {
        let dir = tempfile::TempDir::new().unwrap();
        write(dir.path(), "one.md", "---\ntitle: One\ndate: 2024-01-01\n---\nFirst");
        write(dir.path(), "two.md", "---\ntitle: Two\ndate: 2024-02-01\n---\nSecond");
        write(dir.path(), "broken.md", "---\ndate: 2024-03-01\n---\nNo title");
        write(dir.path(), "notes.txt", "ignored");

        let store = load_posts(dir.path()).await.unwrap();
        let order: Vec<_> = store.all().iter().map(|p| p.slug.as_str()).collect();
        assert_eq!(order, vec!["two", "one"]);
    }

    #[tokio::test]
    async fn duplicate_slugs_fail_the_load() {
        let dir = tempfile::TempDir::new().unwrap();
        write(dir.path(), "a.md", "---\ntitle: Same Title\ndate: 2024-01-01\n---\nA");
        write(dir.path(), "b.md", "---\ntitle: Same title\ndate: 2024-02-01\n---\nB");

        let err = load_posts(dir.path()).await.unwrap_err();
        assert!(matches!(err, BlogError::DuplicateSlug { ref slug, .. } if slug == "same-title"));
    }

    #[tokio::test]
    async fn missing_directories_fall_back_to_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let content = load_content(dir.path()).await.unwrap();
        assert!(content.posts.is_empty());
        assert!(content.layout_html.contains("{{ content }}"));
        assert!(content.home_html.is_none());
        assert!(content.not_found_html.is_none());
    }

    #[tokio::test]
    async fn renders_home_markdown() {
        let dir = tempfile::TempDir::new().unwrap();
        write(dir.path(), "home.md", "---\ntitle: Home\n---\n# Welcome\n\nHello there.");
        let content = load_content(dir.path()).await.unwrap();
        let home = content.home_html.unwrap();
        assert!(home.contains("<h1>Welcome</h1>"));
        assert!(!home.contains("title: Home"));
    }
}
