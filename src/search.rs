use crate::models::Post;

/// Case-insensitive substring search over title, content, excerpt and
/// author. A blank query matches every post.
pub fn filter_posts<'a>(posts: &'a [Post], query: &str) -> Vec<&'a Post> {
    let query = query.trim();
    if query.is_empty() {
        return posts.iter().collect();
    }

    let needle = query.to_lowercase();
    posts.iter().filter(|post| matches(post, &needle)).collect()
}

fn matches(post: &Post, needle: &str) -> bool {
    let contains = |field: &str| field.to_lowercase().contains(needle);

    contains(&post.title)
        || contains(&post.content)
        || post.excerpt.as_deref().is_some_and(contains)
        || post.author.as_deref().is_some_and(contains)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::post;

    fn fixtures() -> Vec<Post> {
        let mut rust = post("rust", "Learning Rust", "2024-03-01");
        rust.author = Some("Ferris Crab".into());

        let mut tokio = post("tokio", "Async runtimes", "2024-02-01");
        tokio.excerpt = Some("A tour of Tokio internals".into());

        let mut cooking = post("cooking", "Weekend Cooking", "2024-01-01");
        cooking.content = "Slow-roasted TOMATOES with basil".into();

        vec![rust, tokio, cooking]
    }

    fn slugs(found: Vec<&Post>) -> Vec<&str> {
        found.into_iter().map(|p| p.slug.as_str()).collect()
    }

    #[test]
    fn empty_query_returns_everything_in_order() {
        let posts = fixtures();
        assert_eq!(slugs(filter_posts(&posts, "")), vec!["rust", "tokio", "cooking"]);
        assert_eq!(slugs(filter_posts(&posts, "   ")), vec!["rust", "tokio", "cooking"]);
    }

    #[test]
    fn matches_each_field_case_insensitively() {
        let posts = fixtures();
        assert_eq!(slugs(filter_posts(&posts, "RUST")), vec!["rust"]);
        assert_eq!(slugs(filter_posts(&posts, "ferris")), vec!["rust"]);
        assert_eq!(slugs(filter_posts(&posts, "tokio INTERNALS")), vec!["tokio"]);
        assert_eq!(slugs(filter_posts(&posts, "tomatoes")), vec!["cooking"]);
    }

    #[test]
    fn substring_matches_span_words() {
        let posts = fixtures();
        assert_eq!(slugs(filter_posts(&posts, "sync run")), vec!["tokio"]);
    }

    #[test]
    fn no_match_is_empty() {
        let posts = fixtures();
        assert!(filter_posts(&posts, "haskell").is_empty());
    }
}
