//! Site configuration loaded from `site.toml`.
//!
//! Every section has defaults, so a missing file (or a partial one) still
//! yields a usable blog. `SITE_DOMAIN` overrides the configured domain.

use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::info;

use crate::error::{BlogError, Result};

pub const DEFAULT_CONFIG_PATH: &str = "site.toml";
pub const DEFAULT_CONTENT_DIR: &str = "content";

/// Paths the router always mounts; configured routes may not shadow them.
const RESERVED_ROUTES: &[&str] = &["/sitemap.xml", "/ws", "/favicon.ico", "/favicon.png"];

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct SiteConfig {
    pub title: String,
    pub description: String,
    pub domain: String,
    pub navigation: Navigation,
    pub legal: Legal,
    pub blog: BlogConfig,
}

#[derive(Deserialize, Debug, Clone, PartialEq)]
pub struct NavItem {
    pub name: String,
    pub path: String,
}

impl NavItem {
    fn new(name: &str, path: &str) -> Self {
        Self {
            name: name.to_string(),
            path: path.to_string(),
        }
    }
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Navigation {
    pub main: Vec<NavItem>,
    pub footer: Vec<NavItem>,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Legal {
    pub copyright: String,
    pub company: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct BlogConfig {
    pub routes: Routes,
    pub posts_per_page: usize,
    pub preview_count: usize,
    pub excerpt_length: usize,
    pub related_count: usize,
    pub meta_description_length: usize,
    pub default_images: Vec<String>,
    pub share_platforms: Vec<SharePlatform>,
    pub cta: CtaSettings,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct Routes {
    pub blog: String,
    pub sitemap: String,
}

/// A share target. `url_template` may contain `{url}`, `{title}` and
/// `{description}` placeholders.
#[derive(Deserialize, Debug, Clone)]
pub struct SharePlatform {
    pub name: String,
    pub url_template: String,
    #[serde(default)]
    pub color: String,
}

#[derive(Deserialize, Debug, Clone)]
#[serde(default)]
pub struct CtaSettings {
    pub main_page: CtaConfig,
    pub sidebar: CtaConfig,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CtaConfig {
    pub title: String,
    pub description: String,
    pub primary_button: CtaButton,
    #[serde(default)]
    pub secondary_button: Option<CtaButton>,
}

#[derive(Deserialize, Debug, Clone)]
pub struct CtaButton {
    pub text: String,
    pub url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            title: "Markdown Blog".to_string(),
            description: "A small blog rendered from Markdown files".to_string(),
            domain: "example.com".to_string(),
            navigation: Navigation::default(),
            legal: Legal::default(),
            blog: BlogConfig::default(),
        }
    }
}

impl Default for Navigation {
    fn default() -> Self {
        Self {
            main: vec![
                NavItem::new("Home", "/"),
                NavItem::new("Blog", "/blog/"),
                NavItem::new("About", "/about/"),
                NavItem::new("Contact", "/contact/"),
            ],
            footer: vec![
                NavItem::new("Privacy Policy", "/privacy/"),
                NavItem::new("Terms of Service", "/terms/"),
                NavItem::new("Sitemap", "/sitemap/"),
            ],
        }
    }
}

impl Default for Legal {
    fn default() -> Self {
        Self {
            copyright: "© Markdown Blog. All rights reserved.".to_string(),
            company: "Your Company Name".to_string(),
        }
    }
}

impl Default for BlogConfig {
    fn default() -> Self {
        Self {
            routes: Routes::default(),
            posts_per_page: 9,
            preview_count: 3,
            excerpt_length: 150,
            related_count: 3,
            meta_description_length: 160,
            default_images: vec![
                "/static/images/default-1.svg".to_string(),
                "/static/images/default-2.svg".to_string(),
                "/static/images/default-3.svg".to_string(),
            ],
            share_platforms: vec![
                SharePlatform {
                    name: "Facebook".to_string(),
                    url_template: "https://www.facebook.com/sharer/sharer.php?u={url}".to_string(),
                    color: "bg-blue-600".to_string(),
                },
                SharePlatform {
                    name: "Twitter".to_string(),
                    url_template: "https://twitter.com/intent/tweet?url={url}&text={title}"
                        .to_string(),
                    color: "bg-sky-500".to_string(),
                },
                SharePlatform {
                    name: "LinkedIn".to_string(),
                    url_template:
                        "https://www.linkedin.com/shareArticle?mini=true&url={url}&title={title}&summary={description}"
                            .to_string(),
                    color: "bg-blue-700".to_string(),
                },
                SharePlatform {
                    name: "Email".to_string(),
                    url_template: "mailto:?subject={title}&body={description}%0A%0A{url}"
                        .to_string(),
                    color: "bg-gray-600".to_string(),
                },
            ],
            cta: CtaSettings::default(),
        }
    }
}

impl Default for Routes {
    fn default() -> Self {
        Self {
            blog: "/blog/".to_string(),
            sitemap: "/sitemap/".to_string(),
        }
    }
}

impl Default for CtaSettings {
    fn default() -> Self {
        Self {
            main_page: CtaConfig {
                title: "Enjoyed this article?".to_string(),
                description: "Get in touch or keep reading for more posts like this one."
                    .to_string(),
                primary_button: CtaButton {
                    text: "Contact us".to_string(),
                    url: "/contact/".to_string(),
                },
                secondary_button: Some(CtaButton {
                    text: "Browse all posts".to_string(),
                    url: "/blog/".to_string(),
                }),
            },
            sidebar: CtaConfig {
                title: "Need help?".to_string(),
                description: "We are happy to answer your questions.".to_string(),
                primary_button: CtaButton {
                    text: "Contact us".to_string(),
                    url: "/contact/".to_string(),
                },
                secondary_button: None,
            },
        }
    }
}

impl Routes {
    fn validate(&self) -> std::result::Result<(), String> {
        check_route("blog", &self.blog)?;
        check_route("sitemap", &self.sitemap)?;
        if self.blog == self.sitemap {
            return Err(format!("blog and sitemap routes are both `{}`", self.blog));
        }
        Ok(())
    }
}

fn check_route(name: &str, route: &str) -> std::result::Result<(), String> {
    if !route.starts_with('/') {
        return Err(format!("{name} route `{route}` must start with `/`"));
    }
    if route == "/" {
        return Err(format!("{name} route cannot be `/`, the home page lives there"));
    }
    if route.contains(['{', '}', '*', '?', '#']) || route.chars().any(char::is_whitespace) {
        return Err(format!("{name} route `{route}` contains characters not allowed in a path"));
    }
    let reserved = RESERVED_ROUTES.contains(&route)
        || route == "/static"
        || route.starts_with("/static/")
        || route.starts_with("/api/");
    if reserved {
        return Err(format!("{name} route `{route}` is reserved"));
    }
    Ok(())
}

impl SiteConfig {
    /// Absolute base URL, without a trailing slash.
    pub fn site_url(&self) -> String {
        format!("https://{}", self.domain.trim_end_matches('/'))
    }

    /// Make a site-relative path absolute. Absolute `http(s)` URLs pass through.
    pub fn absolute_url(&self, path: &str) -> String {
        if path.starts_with("http") {
            path.to_string()
        } else if path.starts_with('/') {
            format!("{}{}", self.site_url(), path)
        } else {
            format!("{}/{}", self.site_url(), path)
        }
    }

    pub fn post_path(&self, slug: &str) -> String {
        format!("/{}/", slug)
    }

    pub fn parse(content: &str, path: &Path) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|source| BlogError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        config
            .blog
            .routes
            .validate()
            .map_err(|message| BlogError::InvalidConfig {
                path: path.to_path_buf(),
                message,
            })?;
        Ok(config)
    }

    /// Load `path` if it exists, otherwise fall back to the defaults.
    pub async fn load(path: &Path) -> Result<Self> {
        let mut config = match tokio::fs::read_to_string(path).await {
            Ok(content) => {
                info!("Loading site config from {}", path.display());
                Self::parse(&content, path)?
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("No site config at {}, using defaults", path.display());
                Self::default()
            }
            Err(e) => return Err(e.into()),
        };

        if let Ok(domain) = std::env::var("SITE_DOMAIN") {
            if !domain.trim().is_empty() {
                config.domain = domain.trim().to_string();
            }
        }
        Ok(config)
    }
}

/// Process-level settings taken from the environment.
#[derive(Debug, Clone)]
pub struct Settings {
    pub config_path: PathBuf,
    pub content_dir: PathBuf,
    pub port: u16,
    pub is_development: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        let config_path = std::env::var("SITE_CONFIG")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONFIG_PATH));
        let content_dir = std::env::var("CONTENT_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from(DEFAULT_CONTENT_DIR));
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let is_development = std::env::var("RUST_ENV")
            .map(|v| v == "development")
            .unwrap_or(false);

        Self {
            config_path,
            content_dir,
            port,
            is_development,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_config_keeps_defaults() {
        let toml = r#"
title = "My Blog"

[blog]
posts_per_page = 4
"#;
        let config = SiteConfig::parse(toml, Path::new("site.toml")).unwrap();
        assert_eq!(config.title, "My Blog");
        assert_eq!(config.blog.posts_per_page, 4);
        assert_eq!(config.blog.preview_count, 3);
        assert_eq!(config.blog.routes.blog, "/blog/");
        assert_eq!(config.navigation.main.len(), 4);
    }

    #[test]
    fn share_platforms_and_cta_are_configurable() {
        let toml = r#"
[[blog.share_platforms]]
name = "Mastodon"
url_template = "https://mastodon.social/share?text={title}%20{url}"

[blog.cta.sidebar]
title = "Subscribe"
description = "Monthly digest"
primary_button = { text = "Sign up", url = "/newsletter/" }
"#;
        let config = SiteConfig::parse(toml, Path::new("site.toml")).unwrap();
        assert_eq!(config.blog.share_platforms.len(), 1);
        assert_eq!(config.blog.share_platforms[0].color, "");
        assert_eq!(config.blog.cta.sidebar.title, "Subscribe");
        assert!(config.blog.cta.sidebar.secondary_button.is_none());
        assert_eq!(config.blog.cta.main_page.title, "Enjoyed this article?");
    }

    #[test]
    fn invalid_toml_reports_path() {
        let err = SiteConfig::parse("title = ", Path::new("broken.toml")).unwrap_err();
        assert!(err.to_string().contains("broken.toml"));
    }

    fn routes_error(toml: &str) -> String {
        SiteConfig::parse(toml, Path::new("site.toml"))
            .unwrap_err()
            .to_string()
    }

    #[test]
    fn custom_routes_are_accepted() {
        let toml = "[blog.routes]\nblog = \"/articles/\"\nsitemap = \"/map\"\n";
        let config = SiteConfig::parse(toml, Path::new("site.toml")).unwrap();
        assert_eq!(config.blog.routes.blog, "/articles/");
        assert_eq!(config.blog.routes.sitemap, "/map");
    }

    #[test]
    fn route_without_leading_slash_is_rejected() {
        let err = routes_error("[blog.routes]\nblog = \"blog/\"\n");
        assert!(err.contains("site.toml"));
        assert!(err.contains("blog route `blog/` must start with `/`"));
    }

    #[test]
    fn root_route_is_rejected() {
        let err = routes_error("[blog.routes]\nsitemap = \"/\"\n");
        assert!(err.contains("sitemap route cannot be `/`"));
    }

    #[test]
    fn identical_routes_are_rejected() {
        let err = routes_error("[blog.routes]\nblog = \"/posts/\"\nsitemap = \"/posts/\"\n");
        assert!(err.contains("both `/posts/`"));
    }

    #[test]
    fn reserved_and_pattern_routes_are_rejected() {
        for route in ["/sitemap.xml", "/ws", "/static/", "/api/posts", "/{slug}/", "/a b/"] {
            let err = routes_error(&format!("[blog.routes]\nblog = \"{route}\"\n"));
            assert!(err.contains("blog route"), "{route}: {err}");
        }
    }

    #[test]
    fn default_card_images_are_shipped() {
        for image in &SiteConfig::default().blog.default_images {
            let path = Path::new(DEFAULT_CONTENT_DIR).join(image.trim_start_matches('/'));
            assert!(path.is_file(), "missing {}", path.display());
        }
    }

    #[test]
    fn absolute_urls() {
        let config = SiteConfig {
            domain: "blog.test".to_string(),
            ..SiteConfig::default()
        };
        assert_eq!(config.site_url(), "https://blog.test");
        assert_eq!(config.absolute_url("/hello/"), "https://blog.test/hello/");
        assert_eq!(config.absolute_url("hello/"), "https://blog.test/hello/");
        assert_eq!(config.absolute_url("http://other.test/x"), "http://other.test/x");
    }

    #[tokio::test]
    async fn missing_file_uses_defaults() {
        let dir = tempfile::TempDir::new().unwrap();
        let config = SiteConfig::load(&dir.path().join("nope.toml")).await.unwrap();
        assert_eq!(config.blog.posts_per_page, 9);
    }
}
