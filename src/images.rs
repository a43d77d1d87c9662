//! Featured-image discovery for posts that do not declare one.

use std::sync::LazyLock;

use pulldown_cmark::{Event, Parser, Tag};
use regex::Regex;
use scraper::{Html, Selector};

static DIRECT_IMAGE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)https?://[^\s()<>\x22']+?\.(?:jpg|jpeg|png|gif|webp)\b").unwrap()
});

static YOUTUBE_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"youtube:([A-Za-z0-9_-]{11})").unwrap());

static YOUTUBE_URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:youtube\.com/(?:[^/\s]+/.+/|(?:v|e(?:mbed)?)/|.*[?&]v=)|youtu\.be/)([^\x22&?/\s]{11})")
        .unwrap()
});

static IMG_SRC: LazyLock<Selector> = LazyLock::new(|| Selector::parse("img[src]").unwrap());

/// First image referenced by the markdown: a markdown image, then a bare
/// image URL, then an HTML `<img>` tag.
pub fn extract_first_image(markdown: &str) -> Option<String> {
    markdown_image(markdown)
        .or_else(|| {
            DIRECT_IMAGE_URL
                .find(markdown)
                .map(|m| m.as_str().to_string())
        })
        .or_else(|| html_image(markdown))
}

fn markdown_image(markdown: &str) -> Option<String> {
    Parser::new(markdown).find_map(|event| match event {
        Event::Start(Tag::Image { dest_url, .. }) if !dest_url.is_empty() => {
            Some(dest_url.to_string())
        }
        _ => None,
    })
}

fn html_image(markdown: &str) -> Option<String> {
    if !markdown.contains("<img") {
        return None;
    }
    let fragment = Html::parse_fragment(markdown);
    fragment
        .select(&IMG_SRC)
        .find_map(|img| img.value().attr("src"))
        .filter(|src| !src.is_empty())
        .map(str::to_string)
}

/// Video id from a `youtube:<id>` marker or a YouTube link.
pub fn youtube_video_id(markdown: &str) -> Option<String> {
    YOUTUBE_MARKER
        .captures(markdown)
        .or_else(|| YOUTUBE_URL.captures(markdown))
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}

pub fn youtube_thumbnail(video_id: &str) -> String {
    format!("https://img.youtube.com/vi/{video_id}/maxresdefault.jpg")
}

pub fn is_youtube_thumbnail(url: &str) -> bool {
    url.contains("img.youtube.com")
}

/// Featured image to use when the front matter has none.
pub fn derive_featured_image(markdown: &str) -> Option<String> {
    youtube_video_id(markdown)
        .map(|id| youtube_thumbnail(&id))
        .or_else(|| extract_first_image(markdown))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefers_markdown_images() {
        let md = "Intro https://cdn.test/raw.png\n\n![cover](/static/cover.jpg)";
        assert_eq!(extract_first_image(md).as_deref(), Some("/static/cover.jpg"));
    }

    #[test]
    fn finds_direct_image_urls() {
        let md = "See https://cdn.test/photos/cat.JPEG for details.";
        assert_eq!(
            extract_first_image(md).as_deref(),
            Some("https://cdn.test/photos/cat.JPEG")
        );
    }

    #[test]
    fn finds_html_img_tags() {
        let md = "<p>Hi</p>\n<img alt=\"x\" src=\"/static/inline.svg\">";
        assert_eq!(extract_first_image(md).as_deref(), Some("/static/inline.svg"));
    }

    #[test]
    fn no_image() {
        assert_eq!(extract_first_image("just words"), None);
    }

    #[test]
    fn youtube_marker_and_links() {
        assert_eq!(
            youtube_video_id("youtube:dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_video_id("watch https://www.youtube.com/watch?v=dQw4w9WgXcQ now").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(
            youtube_video_id("https://youtu.be/dQw4w9WgXcQ").as_deref(),
            Some("dQw4w9WgXcQ")
        );
        assert_eq!(youtube_video_id("no video"), None);
    }

    #[test]
    fn video_thumbnail_wins_over_images() {
        let md = "![a](/a.png)\n\nyoutube:dQw4w9WgXcQ";
        let image = derive_featured_image(md).unwrap();
        assert!(is_youtube_thumbnail(&image));
        assert!(image.contains("dQw4w9WgXcQ"));
    }
}
