use crate::config::SiteConfig;
use crate::models::Post;

use super::widgets::{post_card, search_bar, DateStyle};
use super::{escape, PageMeta, View};

/// "Latest from our Blog" block with the newest posts.
pub fn blog_preview(config: &SiteConfig, latest: &[Post]) -> String {
    let blog_route = escape(&config.blog.routes.blog);
    let header = |extra: &str| {
        format!(
            "<div class=\"preview-header\"><h2>Latest from our Blog</h2>{extra}\
             <a href=\"{blog_route}\" class=\"view-all\">View all posts →</a></div>"
        )
    };

    if latest.is_empty() {
        return format!(
            "<div class=\"blog-preview\">{}<div class=\"empty-state\">\
             <p>No blog posts available yet.</p><p class=\"hint\">Check back soon for new content!</p>\
             </div></div>",
            header("")
        );
    }

    let cards: String = latest
        .iter()
        .map(|post| post_card(config, post, "h3", 0, DateStyle::Long))
        .collect();
    format!(
        "<div class=\"blog-preview\">{}<div class=\"card-grid\">{cards}</div></div>",
        header(&search_bar(config, true))
    )
}

/// Home page: the optional `home.md` intro (or a welcome banner) above the
/// latest posts.
pub fn home(config: &SiteConfig, intro_html: Option<&str>, latest: &[Post]) -> View {
    let meta = PageMeta {
        title: format!("{} - {}", config.title, config.description),
        description: Some(config.description.clone()),
        robots: None,
        properties: vec![
            ("og:title", config.title.clone()),
            ("og:description", config.description.clone()),
            ("og:type", "website".to_string()),
            ("og:url", config.site_url()),
        ],
    };

    let intro = match intro_html {
        Some(html) => format!("<div class=\"home-intro prose\">{html}</div>"),
        None => format!(
            "<div class=\"home-intro\"><h1>Welcome to {}</h1><p>{}</p></div>",
            escape(&config.title),
            escape(&config.description)
        ),
    };

    let body = format!(
        "<div class=\"container regular\">{intro}<section class=\"latest\">{}</section></div>",
        blog_preview(config, latest)
    );
    View { meta, body }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post;

    #[test]
    fn empty_preview() {
        let html = blog_preview(&SiteConfig::default(), &[]);
        assert!(html.contains("No blog posts available yet."));
        assert!(html.contains("View all posts →"));
        assert!(!html.contains("search-bar"));
    }

    #[test]
    fn preview_lists_cards_with_compact_search() {
        let posts = vec![post("a", "A", "2024-01-02"), post("b", "B", "2024-01-01")];
        let html = blog_preview(&SiteConfig::default(), &posts);
        assert!(html.contains("href=\"/a/\""));
        assert!(html.contains("href=\"/b/\""));
        assert!(html.contains("search-bar compact"));
    }

    #[test]
    fn home_uses_intro_or_welcome() {
        let config = SiteConfig::default();
        let custom = home(&config, Some("<h1>Hi</h1>"), &[]);
        assert!(custom.body.contains("<h1>Hi</h1>"));
        assert!(!custom.body.contains("Welcome to"));

        let stock = home(&config, None, &[]);
        assert!(stock.body.contains(&format!("Welcome to {}", config.title)));
        assert!(stock
            .meta
            .properties
            .contains(&("og:type", "website".to_string())));
    }
}
