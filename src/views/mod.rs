//! Server-rendered pages and the widgets they are built from.
//!
//! Every page view returns a [`View`]: an HTML fragment plus the metadata
//! that ends up in the layout's `<head>`.

pub mod layout;
pub mod list;
pub mod post;
pub mod preview;
pub mod sitemap;
pub mod widgets;

pub use layout::render_with_layout;

#[derive(Debug, Clone, Default)]
pub struct PageMeta {
    pub title: String,
    pub description: Option<String>,
    pub robots: Option<&'static str>,
    /// `<meta property=... content=...>` pairs (Open Graph, article tags).
    pub properties: Vec<(&'static str, String)>,
}

impl PageMeta {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn head_html(&self) -> String {
        let mut head = String::new();
        if let Some(description) = &self.description {
            head.push_str(&format!(
                "<meta name=\"description\" content=\"{}\">\n",
                escape(description)
            ));
        }
        if let Some(robots) = self.robots {
            head.push_str(&format!("<meta name=\"robots\" content=\"{}\">\n", robots));
        }
        for (property, content) in &self.properties {
            head.push_str(&format!(
                "<meta property=\"{}\" content=\"{}\">\n",
                property,
                escape(content)
            ));
        }
        head
    }
}

#[derive(Debug, Clone)]
pub struct View {
    pub meta: PageMeta,
    pub body: String,
}

pub(crate) fn escape(text: &str) -> String {
    htmlescape::encode_minimal(text)
}

/// A URL made safe for `style="background-image: url('...')"`: characters
/// that could close the quoted CSS string or the `url()` are percent-encoded
/// before HTML escaping.
pub(crate) fn css_url(url: &str) -> String {
    let mut encoded = String::with_capacity(url.len());
    for c in url.chars() {
        match c {
            '\'' => encoded.push_str("%27"),
            '"' => encoded.push_str("%22"),
            '(' => encoded.push_str("%28"),
            ')' => encoded.push_str("%29"),
            '\\' => encoded.push_str("%5C"),
            c if c.is_whitespace() || c.is_control() => {
                encoded.push_str(&urlencoding::encode(c.encode_utf8(&mut [0; 4])))
            }
            c => encoded.push(c),
        }
    }
    escape(&encoded)
}
