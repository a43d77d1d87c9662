use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, get_service},
    Json, Router,
};
use serde::Deserialize;
use tower_http::services::{ServeDir, ServeFile};
use tracing::debug;

use crate::error::BlogError;
use crate::hot_reload::ws_handler;
use crate::models::Post;
use crate::pagination::{paginate, parse_page, Page};
use crate::search::filter_posts;
use crate::state::{AppState, RefreshBroadcaster, RouterState};
use crate::views::{self, render_with_layout, View};

#[derive(Deserialize, Debug, Default)]
pub struct ListQuery {
    pub search: Option<String>,
    pub page: Option<String>,
}

impl ListQuery {
    fn search(&self) -> &str {
        self.search.as_deref().map(str::trim).unwrap_or_default()
    }

    fn page(&self) -> usize {
        parse_page(self.page.as_deref())
    }
}

async fn render(state: &AppState, view: View) -> Html<String> {
    let layout = state.layout_html.read().await;
    Html(render_with_layout(
        &layout,
        &state.config,
        &view,
        state.is_development,
    ))
}

async fn homepage(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Response {
    // Paginated links that land on the root belong to the blog list.
    if query.page.is_some() {
        let mut target = format!("{}?page={}", state.config.blog.routes.blog, query.page());
        if !query.search().is_empty() {
            target.push_str(&format!("&search={}", urlencoding::encode(query.search())));
        }
        return Redirect::permanent(&target).into_response();
    }

    let home_html = state.home_html.read().await;
    let posts = state.posts.read().await;
    let view = views::preview::home(
        &state.config,
        home_html.as_deref(),
        posts.latest(state.config.blog.preview_count),
    );
    render(&state, view).await.into_response()
}

async fn blog_list(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Html<String> {
    let posts = state.posts.read().await;
    let matches = filter_posts(posts.all(), query.search());
    debug!(search = query.search(), found = matches.len(), "Listing posts");
    let view = views::list::blog_list(&state.config, &matches, query.search(), query.page());
    render(&state, view).await
}

async fn render_post(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Response {
    let posts = state.posts.read().await;
    match posts.get(&slug) {
        Some(post) => {
            let related = posts.related(&post.slug, state.config.blog.related_count);
            let view = views::post::blog_post(&state.config, post, &related);
            render(&state, view).await.into_response()
        }
        None => not_found_page(&state, &slug).await,
    }
}

async fn add_trailing_slash(Path(slug): Path<String>) -> Redirect {
    Redirect::permanent(&format!("/{}/", urlencoding::encode(&slug)))
}

async fn not_found_page(state: &AppState, slug: &str) -> Response {
    let template = state.not_found_html.read().await;
    let view = views::post::post_not_found(&state.config, slug, template.as_deref());
    (StatusCode::NOT_FOUND, render(state, view).await).into_response()
}

async fn fallback(State(state): State<Arc<AppState>>, uri: axum::http::Uri) -> Response {
    not_found_page(&state, uri.path().trim_matches('/')).await
}

async fn sitemap_page(State(state): State<Arc<AppState>>) -> Html<String> {
    let urls = state.posts.read().await.urls(&state.config);
    let view = views::sitemap::sitemap_page(&state.config, &urls);
    render(&state, view).await
}

async fn sitemap_xml(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let urls = state.posts.read().await.urls(&state.config);
    (
        [(header::CONTENT_TYPE, "application/xml; charset=utf-8")],
        views::sitemap::sitemap_xml(&state.config, &urls),
    )
}

async fn api_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListQuery>,
) -> Json<Page<Post>> {
    let posts = state.posts.read().await;
    let matches: Vec<Post> = filter_posts(posts.all(), query.search())
        .into_iter()
        .cloned()
        .collect();
    Json(paginate(&matches, query.page(), state.config.blog.posts_per_page))
}

async fn api_post(
    Path(slug): Path<String>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<Post>, BlogError> {
    state
        .posts
        .read()
        .await
        .get(&slug)
        .cloned()
        .map(Json)
        .ok_or(BlogError::NotFound(slug))
}

pub fn router(state: Arc<AppState>, broadcaster: RefreshBroadcaster) -> Router {
    let static_root = state.content_dir.join("static");
    let static_dir = get_service(ServeDir::new(&static_root));
    let favicon_ico = get_service(ServeFile::new(static_root.join("favicon.ico")));
    let favicon_png = get_service(ServeFile::new(static_root.join("favicon.png")));

    let blog_route = state.config.blog.routes.blog.clone();
    let sitemap_route = state.config.blog.routes.sitemap.clone();

    let mut app = Router::new()
        .route("/", get(homepage))
        .route(&blog_route, get(blog_list))
        .route(&sitemap_route, get(sitemap_page))
        .route("/sitemap.xml", get(sitemap_xml))
        .route("/api/posts", get(api_posts))
        .route("/api/posts/{slug}", get(api_post))
        .route("/{slug}/", get(render_post))
        .route("/{slug}", get(add_trailing_slash))
        .nest_service("/static", static_dir)
        .route_service("/favicon.ico", favicon_ico)
        .route_service("/favicon.png", favicon_png);

    if state.is_development {
        app = app.route("/ws", get(ws_handler));
    }

    app.fallback(fallback).with_state(RouterState {
        app_state: state,
        broadcaster,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SiteConfig;
    use crate::content_loader::{Content, PostStore};
    use crate::models::post;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use tokio::sync::broadcast;
    use tower::ServiceExt;

    fn app(posts: Vec<Post>) -> Router {
        let mut config = SiteConfig::default();
        config.domain = "blog.test".into();
        config.blog.posts_per_page = 2;
        let content = Content {
            layout_html: "<title>{{ title }}</title>{{ head }}<main>{{ content }}</main>".into(),
            home_html: None,
            not_found_html: None,
            posts: PostStore::new(posts),
        };
        let state = Arc::new(AppState::new(config, "content".into(), content, false));
        let (tx, _rx) = broadcast::channel(1);
        router(state, tx)
    }

    fn fixtures() -> Vec<Post> {
        let mut rust = post("learning-rust", "Learning Rust", "2024-03-01");
        rust.content = "## Ownership\n\nBorrow checker notes.".into();
        vec![
            rust,
            post("async-io", "Async IO", "2024-02-01"),
            post("cooking", "Weekend Cooking", "2024-01-01"),
        ]
    }

    async fn get(app: Router, uri: &str) -> (StatusCode, axum::http::HeaderMap, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, headers, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn home_shows_latest_posts() {
        let (status, _, body) = get(app(fixtures()), "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Latest from our Blog"));
        assert!(body.contains("href=\"/learning-rust/\""));
    }

    #[tokio::test]
    async fn root_page_param_redirects_to_blog() {
        let (status, headers, _) = get(app(fixtures()), "/?page=2&search=rust").await;
        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/blog/?page=2&search=rust");
    }

    #[tokio::test]
    async fn blog_list_paginates() {
        let (status, _, body) = get(app(fixtures()), "/blog/?page=2").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("href=\"/cooking/\""));
        assert!(!body.contains("href=\"/async-io/\""));
        assert!(body.contains("Showing 3 - 3 of 3 posts"));
    }

    #[tokio::test]
    async fn blog_list_searches() {
        let (_, _, body) = get(app(fixtures()), "/blog/?search=COOKING").await;
        assert!(body.contains("Found <span class=\"count\">1</span>"));
        assert!(body.contains("noindex, follow"));
    }

    #[tokio::test]
    async fn search_text_is_not_expanded_as_layout_slot() {
        let (status, _, body) = get(app(fixtures()), "/blog/?search=%7B%7B%20content%20%7D%7D").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Search results for &quot;{{ content }}&quot; - "));
        assert_eq!(body.matches("No posts found for").count(), 1);
    }

    #[tokio::test]
    async fn invalid_page_falls_back_to_first() {
        let (status, _, body) = get(app(fixtures()), "/blog/?page=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Showing 1 - 2 of 3 posts"));
    }

    #[tokio::test]
    async fn huge_page_number_renders_empty_page() {
        let (status, _, body) = get(app(fixtures()), "/blog/?page=18446744073709551615").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Showing 0 - 0 of 3 posts"));
        assert!(body.contains("rel=\"prev\""));

        let (status, _, _) = get(app(fixtures()), "/api/posts?page=18446744073709551615").await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn empty_blog_first_page_is_ok() {
        let (status, _, body) = get(app(Vec::new()), "/blog/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("No blog posts available yet."));
    }

    #[tokio::test]
    async fn renders_single_post() {
        let (status, _, body) = get(app(fixtures()), "/learning-rust/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("<title>Learning Rust - "));
        assert!(body.contains("<h2 id=\"ownership\">"));
        assert!(body.contains("Related Articles"));
    }

    #[tokio::test]
    async fn unknown_post_is_404() {
        let (status, _, body) = get(app(fixtures()), "/missing/").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("Post not found"));
    }

    #[tokio::test]
    async fn adds_trailing_slash() {
        let (status, headers, _) = get(app(fixtures()), "/cooking").await;
        assert_eq!(status, StatusCode::PERMANENT_REDIRECT);
        assert_eq!(headers[header::LOCATION], "/cooking/");
    }

    #[tokio::test]
    async fn deep_unknown_paths_use_fallback() {
        let (status, _, _) = get(app(fixtures()), "/a/b/c").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn sitemap_page_and_xml() {
        let (status, _, body) = get(app(fixtures()), "/sitemap/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Site Map"));
        assert!(body.contains("Mar 1, 2024"));

        let (status, headers, xml) = get(app(fixtures()), "/sitemap.xml").await;
        assert_eq!(status, StatusCode::OK);
        assert!(headers[header::CONTENT_TYPE]
            .to_str()
            .unwrap()
            .starts_with("application/xml"));
        assert!(xml.contains("<loc>https://blog.test/learning-rust/</loc>"));
    }

    #[tokio::test]
    async fn api_lists_and_fetches_posts() {
        let (status, _, body) = get(app(fixtures()), "/api/posts?search=async").await;
        assert_eq!(status, StatusCode::OK);
        let page: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(page["totalItems"], 1);
        assert_eq!(page["items"][0]["slug"], "async-io");

        let (status, _, body) = get(app(fixtures()), "/api/posts/cooking").await;
        assert_eq!(status, StatusCode::OK);
        let post: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(post["title"], "Weekend Cooking");

        let (status, _, body) = get(app(fixtures()), "/api/posts/nope").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(body.contains("post not found: nope"));
    }
}
