use crate::config::SiteConfig;
use crate::models::{parse_date, SiteUrl, SiteUrls};

use super::{escape, PageMeta, View};

fn link_list(urls: &[SiteUrl], with_dates: bool) -> String {
    let items: String = urls
        .iter()
        .map(|url| {
            let date = match (&url.date, with_dates) {
                (Some(date), true) => format!(
                    "<span class=\"date\">{}</span>",
                    escape(
                        &parse_date(date)
                            .map(|d| d.format("%b %-d, %Y").to_string())
                            .unwrap_or_else(|| date.clone())
                    )
                ),
                _ => String::new(),
            };
            format!(
                "<li><a href=\"{}\">{}</a>{date}</li>",
                escape(&url.path),
                escape(&url.name)
            )
        })
        .collect();
    format!("<ul>{items}</ul>")
}

/// Main pages only, for footers and sidebars.
pub fn compact_sitemap(urls: &SiteUrls) -> String {
    format!(
        "<div class=\"sitemap compact\"><h3>Main Pages</h3>{}</div>",
        link_list(&urls.base_urls, false)
    )
}

pub fn sitemap_page(config: &SiteConfig, urls: &SiteUrls) -> View {
    let meta = PageMeta {
        title: format!("Sitemap - {}", config.title),
        description: Some(format!(
            "Sitemap for {} website. Browse all pages and blog posts on our site.",
            config.title
        )),
        ..PageMeta::default()
    };
    let xml_url = format!("{}/sitemap.xml", config.site_url());
    let body = format!(
        "<div class=\"container regular sitemap\"><h1>Site Map</h1>\
         <section><h2>Main Pages</h2>{}</section>\
         <section><h2>Blog Posts</h2>{}</section>\
         <div class=\"sitemap-note\"><p>The full XML sitemap is available at \
         <a href=\"{xml}\" target=\"_blank\" rel=\"noopener noreferrer\">{xml}</a></p></div>\
         <div class=\"sitemap-footer\">{}</div></div>",
        link_list(&urls.base_urls, false),
        link_list(&urls.blog_urls, true),
        compact_sitemap(urls),
        xml = escape(&xml_url),
    );
    View { meta, body }
}

/// `sitemap.xml` in the sitemaps.org 0.9 schema.
pub fn sitemap_xml(config: &SiteConfig, urls: &SiteUrls) -> String {
    let mut xml = String::from(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
         <urlset xmlns=\"http://www.sitemaps.org/schemas/sitemap/0.9\">\n",
    );
    for url in urls.base_urls.iter().chain(urls.blog_urls.iter()) {
        xml.push_str("  <url>\n");
        xml.push_str(&format!(
            "    <loc>{}</loc>\n",
            escape(&config.absolute_url(&url.path))
        ));
        if let Some(date) = url.date.as_deref().and_then(parse_date) {
            xml.push_str(&format!("    <lastmod>{}</lastmod>\n", date.format("%Y-%m-%d")));
        }
        xml.push_str("  </url>\n");
    }
    xml.push_str("</urlset>\n");
    xml
}
