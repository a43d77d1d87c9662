use crate::config::SiteConfig;
use crate::images::youtube_video_id;
use crate::markdown::{meta_description, render_post_body, TocItem};
use crate::models::Post;

use super::widgets::{cta_block, related_posts, share_buttons, CtaOverrides, CtaVariant};
use super::{css_url, escape, PageMeta, View};

fn table_of_contents(toc: &[TocItem]) -> String {
    if toc.is_empty() {
        return String::new();
    }
    let items: String = toc
        .iter()
        .map(|item| {
            format!(
                "<li class=\"toc-level-{}\"><a href=\"#{}\">{}</a></li>",
                item.level,
                escape(&item.id),
                escape(&item.text)
            )
        })
        .collect();
    format!("<div class=\"toc\"><h2>Table of Contents</h2><nav><ul>{items}</ul></nav></div>")
}

/// Featured image banner, or a play link over the video thumbnail when the
/// featured image belongs to the embedded video.
fn featured_media(post: &Post) -> String {
    let Some(image) = post.featured_image.as_deref() else {
        return String::new();
    };
    match youtube_video_id(&post.content) {
        Some(video_id) if image.contains(&video_id) => format!(
            "<div class=\"youtube-featured\" style=\"background-image: url('{}')\">\
             <a href=\"https://www.youtube.com/watch?v={}\" target=\"_blank\" rel=\"noopener noreferrer\" \
             aria-label=\"Play YouTube video\"><span class=\"play-button\"></span></a></div>",
            css_url(image),
            escape(&video_id)
        ),
        _ => format!(
            "<div class=\"featured-image\" role=\"img\" aria-label=\"Featured image\" \
             style=\"background-image: url('{}')\"></div>",
            css_url(image)
        ),
    }
}

pub fn post_meta(config: &SiteConfig, post: &Post) -> PageMeta {
    let description = post
        .excerpt
        .clone()
        .unwrap_or_else(|| meta_description(&post.content, config.blog.meta_description_length));

    let mut properties = vec![
        ("og:title", post.title.clone()),
        ("og:description", description.clone()),
        ("og:type", "article".to_string()),
        ("og:url", config.absolute_url(&config.post_path(&post.slug))),
    ];
    if let Some(image) = &post.featured_image {
        properties.push(("og:image", image.clone()));
    }
    properties.push(("article:published_time", post.date.clone()));
    if let Some(author) = &post.author {
        properties.push(("article:author", author.clone()));
    }

    PageMeta {
        title: format!("{} - {}", post.title, config.title),
        description: Some(description),
        robots: None,
        properties,
    }
}

pub fn blog_post(config: &SiteConfig, post: &Post, related: &[&Post]) -> View {
    let meta = post_meta(config, post);
    let rendered = render_post_body(&post.content);
    let blog_route = escape(&config.blog.routes.blog);

    let author = post
        .author
        .as_deref()
        .map(|a| format!("<span class=\"author\">{}</span>", escape(a)))
        .unwrap_or_default();
    let share = share_buttons(
        config,
        &config.post_path(&post.slug),
        &post.title,
        meta.description.as_deref().unwrap_or_default(),
    );

    let body = format!(
        "<div class=\"container regular\">\
         <div class=\"back-link\"><a href=\"{blog_route}\">Back to Blog</a></div>\
         <article class=\"post\">{media}<div class=\"post-body\">\
         <header><h1>{title}</h1><div class=\"meta\"><time datetime=\"{date_attr}\">{date}</time>{author}</div></header>\
         {toc}<div class=\"prose\">{content}</div>\
         <footer class=\"post-footer\"><div><h3>Share this article</h3>{share}</div>\
         <a href=\"{blog_route}\" class=\"button secondary\">More Articles</a></footer>\
         </div></article>\
         <div class=\"post-cta\">{cta}</div>{related}</div>",
        media = featured_media(post),
        title = escape(&post.title),
        date_attr = escape(&post.date),
        date = escape(&post.long_date()),
        toc = table_of_contents(&rendered.toc),
        content = rendered.html,
        cta = cta_block(config, CtaVariant::Footer, &CtaOverrides::default()),
        related = related_posts(config, related),
    );

    View { meta, body }
}

/// 404 page for an unknown slug. A `not_found.html` template from the
/// content directory wins over the built-in markup.
pub fn post_not_found(config: &SiteConfig, slug: &str, template: Option<&str>) -> View {
    let meta = PageMeta {
        robots: Some("noindex, follow"),
        ..PageMeta::titled(format!("Post not found - {}", config.title))
    };
    let body = match template {
        Some(template) => template.replace("{{slug}}", &escape(slug)),
        None => format!(
            "<div class=\"container regular\"><div class=\"error-box\">\
             <h1>Post not found</h1>\
             <p>Sorry, the blog post you're looking for could not be found.</p>\
             <a href=\"{}\" class=\"button primary\">Back to Blog</a></div></div>",
            escape(&config.blog.routes.blog)
        ),
    };
    View { meta, body }
}
