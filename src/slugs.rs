use ::slug::slugify;

const MAX_SLUG_LEN: usize = 200;

/// Lower-cased, hyphen-joined slug for a post title.
pub fn create_slug(title: &str) -> String {
    slugify(title)
}

pub fn is_valid_slug(slug: &str) -> bool {
    if slug.is_empty() || slug.len() > MAX_SLUG_LEN {
        return false;
    }
    slug.chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
