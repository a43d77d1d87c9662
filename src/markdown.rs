use std::collections::HashSet;

use pulldown_cmark::{
    html, CowStr, Event, HeadingLevel, Options, Parser, Tag, TagEnd, TextMergeStream,
};
use serde::Serialize;

use crate::slugs::create_slug;

fn markdown_options() -> Options {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_TASKLISTS);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_HEADING_ATTRIBUTES);
    options.insert(Options::ENABLE_MATH);
    options
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct TocItem {
    pub id: String,
    pub text: String,
    pub level: u8,
}

#[derive(Debug, Clone)]
pub struct RenderedBody {
    pub html: String,
    pub toc: Vec<TocItem>,
}

pub fn render_markdown_to_html(markdown: &str) -> String {
    render_post_body(markdown).html
}

/// Render a post body, assigning ids to h2-h4 headings and collecting them
/// into a table of contents.
pub fn render_post_body(markdown: &str) -> RenderedBody {
    let normalized_markdown = normalize_latex_delimiters(markdown);
    let parser = TextMergeStream::new(Parser::new_ext(&normalized_markdown, markdown_options()));
    let mut events: Vec<Event> = parser.map(render_math_event).collect();

    let toc = assign_heading_ids(&mut events);
    let events = rewrite_blocks(events);

    let mut html_out = String::new();
    html::push_html(&mut html_out, events.into_iter());
    RenderedBody { html: html_out, toc }
}

fn render_math_event(event: Event<'_>) -> Event<'_> {
    match event {
        Event::InlineMath(math) => {
            Event::Html(CowStr::Boxed(render_math_html(&math, false).into_boxed_str()))
        }
        Event::DisplayMath(math) => {
            Event::Html(CowStr::Boxed(render_math_html(&math, true).into_boxed_str()))
        }
        other => other,
    }
}

fn toc_level(level: HeadingLevel) -> Option<u8> {
    match level {
        HeadingLevel::H2 => Some(2),
        HeadingLevel::H3 => Some(3),
        HeadingLevel::H4 => Some(4),
        _ => None,
    }
}

fn assign_heading_ids(events: &mut [Event<'_>]) -> Vec<TocItem> {
    let mut toc = Vec::new();
    let mut used: HashSet<String> = HashSet::new();

    let mut i = 0;
    while i < events.len() {
        let level = match &events[i] {
            Event::Start(Tag::Heading { level, .. }) => toc_level(*level),
            _ => None,
        };
        let Some(level) = level else {
            i += 1;
            continue;
        };

        let mut text = String::new();
        let mut j = i + 1;
        while j < events.len() {
            match &events[j] {
                Event::End(TagEnd::Heading(_)) => break,
                Event::Text(t) | Event::Code(t) => text.push_str(t),
                _ => {}
            }
            j += 1;
        }
        let text = text.trim().to_string();

        if let Event::Start(Tag::Heading { id, .. }) = &mut events[i] {
            let base = match id.as_deref() {
                Some(explicit) if !explicit.is_empty() => explicit.to_string(),
                _ => {
                    let slug = create_slug(&text);
                    if slug.is_empty() {
                        format!("heading-{}", toc.len())
                    } else {
                        slug
                    }
                }
            };
            let unique = unique_id(base, &mut used);
            *id = Some(CowStr::from(unique.clone()));
            toc.push(TocItem {
                id: unique,
                text,
                level,
            });
        }
        i = j + 1;
    }
    toc
}

fn unique_id(base: String, used: &mut HashSet<String>) -> String {
    if used.insert(base.clone()) {
        return base;
    }
    let mut n = 1;
    loop {
        let candidate = format!("{base}-{n}");
        if used.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// YouTube embeds, external links and lazy images.
fn rewrite_blocks(events: Vec<Event<'_>>) -> Vec<Event<'_>> {
    let mut out = Vec::with_capacity(events.len());
    let mut external_links = Vec::new();
    let mut iter = events.into_iter().peekable();

    while let Some(event) = iter.next() {
        match event {
            Event::Start(Tag::Paragraph) => {
                out.push(Event::Start(Tag::Paragraph));
                if !matches!(iter.peek(), Some(Event::Text(_))) {
                    continue;
                }
                let Some(text) = iter.next() else { continue };
                let closes = matches!(iter.peek(), Some(Event::End(TagEnd::Paragraph)));
                match text {
                    Event::Text(t) if closes && t.trim().starts_with("youtube:") => {
                        let video_id = t.trim().trim_start_matches("youtube:").trim();
                        out.pop();
                        out.push(Event::Html(youtube_embed(video_id).into()));
                        iter.next();
                    }
                    other => out.push(other),
                }
            }
            Event::Start(Tag::Link {
                dest_url, title, ..
            }) if dest_url.starts_with("http") => {
                external_links.push(true);
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(" title=\"{}\"", htmlescape::encode_minimal(&title))
                };
                out.push(Event::Html(
                    format!(
                        "<a href=\"{}\"{} target=\"_blank\" rel=\"noopener noreferrer\">",
                        htmlescape::encode_minimal(&dest_url),
                        title_attr
                    )
                    .into(),
                ));
            }
            Event::Start(link @ Tag::Link { .. }) => {
                external_links.push(false);
                out.push(Event::Start(link));
            }
            Event::End(TagEnd::Link) => {
                if external_links.pop().unwrap_or(false) {
                    out.push(Event::Html("</a>".into()));
                } else {
                    out.push(Event::End(TagEnd::Link));
                }
            }
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                let mut alt = String::new();
                for inner in iter.by_ref() {
                    match inner {
                        Event::End(TagEnd::Image) => break,
                        Event::Text(t) | Event::Code(t) => alt.push_str(&t),
                        _ => {}
                    }
                }
                let title_attr = if title.is_empty() {
                    String::new()
                } else {
                    format!(" title=\"{}\"", htmlescape::encode_minimal(&title))
                };
                out.push(Event::Html(
                    format!(
                        "<img src=\"{}\" alt=\"{}\"{} loading=\"lazy\" />",
                        htmlescape::encode_minimal(&dest_url),
                        htmlescape::encode_minimal(&alt),
                        title_attr
                    )
                    .into(),
                ));
            }
            other => out.push(other),
        }
    }
    out
}

fn youtube_embed(video_id: &str) -> String {
    format!(
        "<div class=\"video-embed\"><iframe src=\"https://www.youtube.com/embed/{}\" \
         title=\"YouTube video player\" \
         allow=\"accelerometer; autoplay; clipboard-write; encrypted-media; gyroscope; picture-in-picture\" \
         allowfullscreen></iframe></div>\n",
        htmlescape::encode_minimal(video_id)
    )
}

/// Plain-text description of a markdown body, cut at a word boundary.
pub fn meta_description(markdown: &str, max_len: usize) -> String {
    let mut text = String::new();
    for event in Parser::new_ext(markdown, markdown_options()) {
        match event {
            Event::Text(t) | Event::Code(t) | Event::InlineMath(t) => {
                text.push_str(&t);
            }
            Event::End(
                TagEnd::Emphasis | TagEnd::Strong | TagEnd::Strikethrough | TagEnd::Link,
            ) => {}
            Event::SoftBreak | Event::HardBreak | Event::End(_) => text.push(' '),
            _ => {}
        }
    }
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.chars().count() <= max_len {
        return collapsed;
    }

    let cut: String = collapsed.chars().take(max_len).collect();
    let cut = match cut.rfind(' ') {
        Some(pos) if pos > 0 => &cut[..pos],
        _ => cut.as_str(),
    };
    format!("{}...", cut.trim_end_matches(|c: char| c.is_whitespace() || c == ','))
}

/// Cut `text` to at most `max_chars` characters, marking the cut with `...`.
pub fn truncate_excerpt(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{}...", cut.trim_end())
}

fn normalize_latex_delimiters(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut i = 0;

    while i < input.len() {
        if let Some((open, close, display_mode)) = delimiter_at(input, i) {
            let content_start = i + open.len();
            if let Some(close_at) = input[content_start..].find(close) {
                let content_end = content_start + close_at;
                let content = &input[content_start..content_end];
                if display_mode || content.contains('\n') {
                    out.push_str("$$");
                    out.push_str(content);
                    out.push_str("$$");
                } else {
                    out.push('$');
                    out.push_str(content);
                    out.push('$');
                }
                i = content_end + close.len();
                continue;
            }
        }

        if let Some(ch) = input[i..].chars().next() {
            out.push(ch);
            i += ch.len_utf8();
        } else {
            break;
        }
    }

    out
}

fn delimiter_at(input: &str, index: usize) -> Option<(&'static str, &'static str, bool)> {
    let tail = &input[index..];
    if tail.starts_with("\\(") {
        Some(("\\(", "\\)", false))
    } else if tail.starts_with("\\[") {
        Some(("\\[", "\\]", true))
    } else {
        None
    }
}

fn render_math_html(source: &str, display_mode: bool) -> String {
    let mut opts = katex::Opts::builder();
    opts.display_mode(display_mode);

    let rendered = match opts.build() {
        Ok(opts) => katex::render_with_opts(source, opts),
        Err(_) => return fallback_math_html(source, display_mode),
    };

    match rendered {
        Ok(html) => html,
        Err(_) => fallback_math_html(source, display_mode),
    }
}

fn fallback_math_html(source: &str, display_mode: bool) -> String {
    let class_name = if display_mode { "math math-display" } else { "math math-inline" };
    format!(
        "<span class=\"{class_name}\">{}</span>",
        htmlescape::encode_minimal(source)
    )
}
