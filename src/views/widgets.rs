use crate::config::{CtaConfig, SiteConfig};
use crate::images::is_youtube_thumbnail;
use crate::markdown::{render_markdown_to_html, truncate_excerpt};
use crate::models::Post;
use crate::pagination::{page_url, page_window, Page, PageItem};

use super::{css_url, escape};

pub fn search_bar(config: &SiteConfig, compact: bool) -> String {
    let form_class = if compact { "search-bar compact" } else { "search-bar" };
    let label = if compact { "" } else { "<span>Search</span>" };
    format!(
        "<form class=\"{form_class}\" method=\"get\" action=\"{}\" role=\"search\">\
         <input type=\"text\" name=\"search\" placeholder=\"Search blog posts...\" aria-label=\"Search\">\
         <button type=\"submit\" aria-label=\"Search\">{label}</button></form>",
        escape(&config.blog.routes.blog)
    )
}

/// Previous/next links around the numbered page window. Empty for a
/// single page.
pub fn pagination_nav<T>(page: &Page<T>, base_url: &str) -> String {
    if page.total_pages <= 1 {
        return String::new();
    }
    let current = page.current_page;

    let mut html = String::from("<nav class=\"pagination\" aria-label=\"Pagination\"><ul>");
    if page.has_prev() {
        html.push_str(&format!(
            "<li><a href=\"{}\" rel=\"prev\" aria-label=\"Previous page\">Previous</a></li>",
            escape(&page_url(base_url, current - 1))
        ));
    } else {
        html.push_str("<li><span class=\"disabled\">Previous</span></li>");
    }

    for item in page_window(current, page.total_pages) {
        match item {
            PageItem::Ellipsis => html.push_str("<li><span class=\"ellipsis\">...</span></li>"),
            PageItem::Number(n) if n == current => html.push_str(&format!(
                "<li><span class=\"current\" aria-current=\"page\">{n}</span></li>"
            )),
            PageItem::Number(n) => html.push_str(&format!(
                "<li><a href=\"{}\" aria-label=\"Page {n}\">{n}</a></li>",
                escape(&page_url(base_url, n))
            )),
        }
    }

    if page.has_next() {
        html.push_str(&format!(
            "<li><a href=\"{}\" rel=\"next\" aria-label=\"Next page\">Next</a></li>",
            escape(&page_url(base_url, current + 1))
        ));
    } else {
        html.push_str("<li><span class=\"disabled\">Next</span></li>");
    }
    html.push_str("</ul></nav>");
    html
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShareLink {
    pub name: String,
    pub url: String,
    pub color: String,
}

/// Resolve each configured platform template against an absolute page URL.
pub fn share_links(config: &SiteConfig, url: &str, title: &str, description: &str) -> Vec<ShareLink> {
    let full_url = config.absolute_url(url);
    let encoded_url = urlencoding::encode(&full_url);
    let encoded_title = urlencoding::encode(title);
    let encoded_description = urlencoding::encode(description);

    config
        .blog
        .share_platforms
        .iter()
        .map(|platform| ShareLink {
            name: platform.name.clone(),
            url: platform
                .url_template
                .replace("{url}", &encoded_url)
                .replace("{title}", &encoded_title)
                .replace("{description}", &encoded_description),
            color: platform.color.clone(),
        })
        .collect()
}

pub fn share_buttons(config: &SiteConfig, url: &str, title: &str, description: &str) -> String {
    let buttons: String = share_links(config, url, title, description)
        .into_iter()
        .map(|link| {
            format!(
                "<a href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\" class=\"share-button {}\" \
                 aria-label=\"Share on {name}\" title=\"Share on {name}\">{name}</a>",
                escape(&link.url),
                escape(&link.color),
                name = escape(&link.name)
            )
        })
        .collect();
    format!("<div class=\"share-buttons\">{buttons}</div>")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CtaVariant {
    #[default]
    Footer,
    Sidebar,
}

/// Per-call replacements for the configured CTA text.
#[derive(Debug, Clone, Default)]
pub struct CtaOverrides {
    pub title: Option<String>,
    pub description: Option<String>,
    pub button_text: Option<String>,
    pub secondary_button_text: Option<String>,
}

pub fn cta_block(config: &SiteConfig, variant: CtaVariant, overrides: &CtaOverrides) -> String {
    let cta: &CtaConfig = match variant {
        CtaVariant::Sidebar => &config.blog.cta.sidebar,
        CtaVariant::Footer => &config.blog.cta.main_page,
    };
    let variant_class = match variant {
        CtaVariant::Sidebar => "cta sidebar",
        CtaVariant::Footer => "cta footer",
    };

    let title = overrides.title.as_deref().unwrap_or(&cta.title);
    let description = overrides.description.as_deref().unwrap_or(&cta.description);
    let button_text = overrides
        .button_text
        .as_deref()
        .unwrap_or(&cta.primary_button.text);

    let secondary_text = overrides
        .secondary_button_text
        .as_deref()
        .or(cta.secondary_button.as_ref().map(|b| b.text.as_str()));
    let secondary_url = cta
        .secondary_button
        .as_ref()
        .map(|b| b.url.as_str())
        .unwrap_or(&config.blog.routes.blog);

    let secondary = secondary_text
        .map(|text| {
            format!(
                "<a href=\"{}\" class=\"button secondary\">{}</a>",
                escape(secondary_url),
                escape(text)
            )
        })
        .unwrap_or_default();

    format!(
        "<div class=\"{variant_class}\"><h3>{}</h3><p>{}</p><div class=\"cta-buttons\">\
         <a href=\"{}\" class=\"button primary\">{}</a>{}</div></div>",
        escape(title),
        escape(description),
        escape(&cta.primary_button.url),
        escape(button_text),
        secondary
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateStyle {
    Long,
    Short,
}

/// A linked post card. Posts without a featured image get one of the
/// default images with the title laid over it.
pub fn post_card(
    config: &SiteConfig,
    post: &Post,
    heading: &str,
    default_image: usize,
    date_style: DateStyle,
) -> String {
    let image = match &post.featured_image {
        Some(url) => {
            let class = if is_youtube_thumbnail(url) {
                "card-image youtube-thumbnail"
            } else {
                "card-image"
            };
            format!(
                "<div class=\"{class}\" style=\"background-image: url('{}')\"></div>",
                css_url(url)
            )
        }
        None => {
            let fallback = config
                .blog
                .default_images
                .get(default_image)
                .or(config.blog.default_images.first())
                .map(String::as_str)
                .unwrap_or_default();
            format!(
                "<div class=\"card-image placeholder\" style=\"background-image: url('{}')\">\
                 <div class=\"overlay\"></div><{heading} class=\"overlay-title\">{}</{heading}></div>",
                css_url(fallback),
                escape(&post.title)
            )
        }
    };

    let title = if post.featured_image.is_some() {
        format!("<{heading} class=\"card-title\">{}</{heading}>", escape(&post.title))
    } else {
        String::new()
    };

    let date = match date_style {
        DateStyle::Long => post.long_date(),
        DateStyle::Short => post.short_date(),
    };
    let author = post
        .author
        .as_deref()
        .map(|a| format!("<span class=\"author\">{}</span>", escape(a)))
        .unwrap_or_default();
    let excerpt = post
        .excerpt
        .as_deref()
        .map(|e| {
            format!(
                "<div class=\"excerpt\">{}</div>",
                render_markdown_to_html(&truncate_excerpt(e, config.blog.excerpt_length))
            )
        })
        .unwrap_or_default();

    format!(
        "<article class=\"card\"><a href=\"{}\" class=\"card-link\">{image}<div class=\"card-body\">{title}\
         <div class=\"meta\"><time datetime=\"{}\">{}</time>{author}</div>{excerpt}</div></a></article>",
        escape(&config.post_path(&post.slug)),
        escape(&post.date),
        escape(&date)
    )
}

pub fn related_posts(config: &SiteConfig, posts: &[&Post]) -> String {
    if posts.is_empty() {
        return String::new();
    }
    let cards: String = posts
        .iter()
        .map(|post| post_card(config, post, "h3", 2, DateStyle::Short))
        .collect();
    format!(
        "<section class=\"related-posts\"><h2>Related Articles</h2><div class=\"card-grid\">{cards}</div></section>"
    )
}
