use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};

#[derive(Deserialize, Debug, Clone, Default)]
pub struct FrontMatter {
    pub title: Option<String>,
    pub date: Option<String>,
    pub slug: Option<String>,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    #[serde(alias = "featuredImage", alias = "image")]
    pub featured_image: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub slug: String,
    pub title: String,
    pub content: String,
    pub excerpt: Option<String>,
    pub author: Option<String>,
    pub date: String,
    pub featured_image: Option<String>,
}

impl Post {
    /// Calendar date of the post, if `date` is `YYYY-MM-DD` or RFC 3339.
    pub fn published_on(&self) -> Option<NaiveDate> {
        parse_date(&self.date)
    }

    /// "January 5, 2024"; unparseable dates are returned verbatim.
    pub fn long_date(&self) -> String {
        self.published_on()
            .map(|d| d.format("%B %-d, %Y").to_string())
            .unwrap_or_else(|| self.date.clone())
    }

    /// "Jan 5, 2024"; unparseable dates are returned verbatim.
    pub fn short_date(&self) -> String {
        self.published_on()
            .map(|d| d.format("%b %-d, %Y").to_string())
            .unwrap_or_else(|| self.date.clone())
    }
}

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .or_else(|| DateTime::parse_from_rfc3339(raw).ok().map(|dt| dt.date_naive()))
}

#[derive(Serialize, Debug, Clone, PartialEq)]
pub struct SiteUrl {
    pub path: String,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
}

#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SiteUrls {
    pub base_urls: Vec<SiteUrl>,
    pub blog_urls: Vec<SiteUrl>,
}

#[cfg(test)]
pub(crate) fn post(slug: &str, title: &str, date: &str) -> Post {
    Post {
        slug: slug.to_string(),
        title: title.to_string(),
        content: format!("Body of {}", title),
        excerpt: None,
        author: None,
        date: date.to_string(),
        featured_image: None,
    }
}
