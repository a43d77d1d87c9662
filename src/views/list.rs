use crate::config::SiteConfig;
use crate::models::Post;
use crate::pagination::paginate;

use super::widgets::{
    cta_block, pagination_nav, post_card, search_bar, CtaOverrides, CtaVariant, DateStyle,
};
use super::{escape, PageMeta, View};

/// Pagination base URL, carrying the search query when there is one.
fn base_url(config: &SiteConfig, query: &str) -> String {
    if query.is_empty() {
        config.blog.routes.blog.clone()
    } else {
        format!(
            "{}?search={}",
            config.blog.routes.blog,
            urlencoding::encode(query)
        )
    }
}

fn page_title(config: &SiteConfig, query: &str, page: usize) -> String {
    if !query.is_empty() {
        format!("Search results for \"{}\" - {}", query, config.title)
    } else if page > 1 {
        format!("Blog - Page {} - {}", page, config.title)
    } else {
        format!("Blog - {}", config.title)
    }
}

/// The blog index: `matches` is the already-filtered post list.
pub fn blog_list(config: &SiteConfig, matches: &[&Post], query: &str, page: usize) -> View {
    let query = query.trim();
    let meta = PageMeta {
        title: page_title(config, query, page),
        robots: Some(if query.is_empty() { "index, follow" } else { "noindex, follow" }),
        ..PageMeta::default()
    };

    let heading = if query.is_empty() {
        "Blog Posts".to_string()
    } else {
        format!("Search: {}", escape(query))
    };
    let mut body = format!(
        "<div class=\"container wide\"><div class=\"list-header\"><h1>{heading}</h1>{}</div>",
        search_bar(config, false)
    );

    if matches.is_empty() {
        if query.is_empty() {
            body.push_str(
                "<div class=\"empty-state\"><p>No blog posts available yet.</p>\
                 <p class=\"hint\">Check back soon for new content!</p></div>",
            );
        } else {
            body.push_str(&format!(
                "<div class=\"empty-state search\"><p>No posts found for \"{}\"</p>\
                 <p class=\"hint\">Try a different search term or browse all posts</p>\
                 <a href=\"{}\" class=\"button primary\">View All Posts</a></div>",
                escape(query),
                escape(&config.blog.routes.blog)
            ));
        }
        body.push_str("</div>");
        return View { meta, body };
    }

    if !query.is_empty() {
        body.push_str(&format!(
            "<div class=\"search-summary\"><p>Found <span class=\"count\">{}</span> posts matching your search</p>\
             <a href=\"{}\">Clear filters</a></div>",
            matches.len(),
            escape(&config.blog.routes.blog)
        ));
    }

    let current = paginate(matches, page, config.blog.posts_per_page);
    body.push_str("<div class=\"card-grid\">");
    for post in &current.items {
        body.push_str(&post_card(config, post, "h2", 0, DateStyle::Long));
    }
    body.push_str("</div>");

    body.push_str(&pagination_nav(&current, &base_url(config, query)));
    body.push_str(&format!(
        "<div class=\"showing\">Showing {} - {} of {} posts</div>",
        current.first_index(),
        current.last_index(),
        current.total_items
    ));
    body.push_str(&format!(
        "<aside class=\"list-cta\">{}</aside></div>",
        cta_block(config, CtaVariant::Sidebar, &CtaOverrides::default())
    ));

    View { meta, body }
}
