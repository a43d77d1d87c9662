use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::config::SiteConfig;
use crate::hot_reload::HOT_RELOAD_SCRIPT;

use super::widgets::search_bar;
use super::{escape, View};

static SLOT: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\{\{ (\w+) \}\}").unwrap());

fn nav_links(config: &SiteConfig) -> String {
    let mut nav = search_bar(config, true);
    for item in &config.navigation.main {
        nav.push_str(&format!(
            "<a href=\"{}\" class=\"nav-link\">{}</a>",
            escape(&item.path),
            escape(&item.name)
        ));
    }
    nav
}

fn footer_html(config: &SiteConfig) -> String {
    let links: String = config
        .navigation
        .footer
        .iter()
        .map(|item| {
            format!(
                "<a href=\"{}\" class=\"footer-link\">{}</a>",
                escape(&item.path),
                escape(&item.name)
            )
        })
        .collect();
    format!(
        "<div class=\"footer-links\">{}</div><p class=\"copyright\">{}</p><p class=\"company\">{}</p>",
        links,
        escape(&config.legal.copyright),
        escape(&config.legal.company)
    )
}

/// Fill the layout's `{{ ... }}` slots with the view and site chrome.
pub fn render_with_layout(
    layout: &str,
    config: &SiteConfig,
    view: &View,
    is_development: bool,
) -> String {
    let title = if view.meta.title.is_empty() {
        format!("{} - {}", config.title, config.description)
    } else {
        view.meta.title.clone()
    };

    // Single pass: substituted text is never scanned for slots again.
    let mut page = SLOT
        .replace_all(layout, |caps: &Captures| match &caps[1] {
            "title" => escape(&title),
            "site_title" => escape(&config.title),
            "head" => view.meta.head_html(),
            "nav" => nav_links(config),
            "footer" => footer_html(config),
            "content" => view.body.clone(),
            _ => caps[0].to_string(),
        })
        .into_owned();

    if is_development {
        if let Some(at) = page.rfind("</body>") {
            page.insert_str(at, HOT_RELOAD_SCRIPT);
        }
    }

    page
}
