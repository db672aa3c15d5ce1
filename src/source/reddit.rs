//! Hot posts from a subreddit via Reddit's OAuth API (application-only grant).

use crate::config::RedditConfig;
use crate::model::{Post, SourceError};
use crate::source::traits::PostSource;
use crate::utils::from_epoch_seconds;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, info, warn};

const AUTH_URL: &str = "https://www.reddit.com/api/v1/access_token";
const API_URL: &str = "https://oauth.reddit.com";
/// Reddit never returns more than this many things per listing page.
const PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: Option<String>,
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<Thing>,
    #[serde(default)]
    after: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Thing {
    kind: String,
    data: ThingData,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ThingData {
    id: String,
    title: String,
    selftext: String,
    body: String,
    created_utc: f64,
    ups: i64,
}

pub struct RedditSource {
    client: Client,
    config: RedditConfig,
    include_comments: bool,
}

impl RedditSource {
    pub fn new(config: RedditConfig, include_comments: bool) -> Self {
        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            client,
            config,
            include_comments,
        }
    }

    async fn access_token(&self) -> Result<String, SourceError> {
        let response = self
            .client
            .post(AUTH_URL)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            .form(&[("grant_type", "client_credentials")])
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Auth(format!("token request rejected ({})", status)));
        }
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))?;
        match token {
            TokenResponse { access_token: Some(token), .. } => Ok(token),
            TokenResponse { error, .. } => Err(SourceError::Auth(
                error.unwrap_or_else(|| "no access token in response".into()),
            )),
        }
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        token: &str,
        url: &str,
    ) -> Result<T, SourceError> {
        debug!("GET {}", url);
        let response = self
            .client
            .get(url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SourceError::Network(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(SourceError::Auth(format!("request rejected ({})", status)));
        }
        if !status.is_success() {
            return Err(SourceError::Http(status.as_u16()));
        }
        response
            .json()
            .await
            .map_err(|e| SourceError::Decode(e.to_string()))
    }

    async fn comments(&self, token: &str, post_id: &str) -> Result<Vec<String>, SourceError> {
        let url = format!("{}/r/{}/comments/{}", API_URL, self.config.subreddit, post_id);
        let listings: Vec<Listing> = self.get_json(token, &url).await?;
        Ok(comment_bodies(listings))
    }
}

/// Converts a listing of `t3` things into posts, keeping listing order.
fn posts_from_listing(listing: Listing, limit: usize) -> Vec<Post> {
    listing
        .data
        .children
        .into_iter()
        .filter(|thing| thing.kind == "t3")
        .filter_map(|thing| {
            let data = thing.data;
            let Some(created_at) = from_epoch_seconds(data.created_utc) else {
                warn!("Skipping post {} with invalid timestamp", data.id);
                return None;
            };
            Some(Post {
                id: data.id,
                title: data.title,
                body: data.selftext,
                created_at,
                upvote_count: data.ups,
                comments: Vec::new(),
            })
        })
        .take(limit)
        .collect()
}

/// The second listing of a comments response holds the comment tree; "more" stubs are dropped.
fn comment_bodies(listings: Vec<Listing>) -> Vec<String> {
    listings
        .into_iter()
        .nth(1)
        .map(|listing| {
            listing
                .data
                .children
                .into_iter()
                .filter(|thing| thing.kind == "t1")
                .map(|thing| thing.data.body)
                .collect()
        })
        .unwrap_or_default()
}

fn hot_url(subreddit: &str, remaining: usize, after: Option<&str>) -> String {
    let mut url = format!(
        "{}/r/{}/hot?limit={}",
        API_URL,
        subreddit,
        remaining.min(PAGE_SIZE)
    );
    if let Some(after) = after {
        url.push_str("&after=");
        url.push_str(after);
    }
    url
}

/// Follows `after` cursors until `limit` posts are collected or the listing runs out.
async fn collect_pages<F, Fut>(limit: usize, mut fetch_page: F) -> Result<Vec<Post>, SourceError>
where
    F: FnMut(usize, Option<String>) -> Fut,
    Fut: Future<Output = Result<Listing, SourceError>>,
{
    let mut posts = Vec::new();
    let mut after = None;
    while posts.len() < limit {
        let remaining = limit - posts.len();
        let listing = fetch_page(remaining, after.take()).await?;
        let next = listing.data.after.clone();
        let page = posts_from_listing(listing, remaining);
        if page.is_empty() {
            break;
        }
        posts.extend(page);
        match next {
            Some(cursor) => after = Some(cursor),
            None => break,
        }
    }
    Ok(posts)
}

/// Comments are extra input: a failed request leaves the post without them.
fn comments_or_empty(post_id: &str, result: Result<Vec<String>, SourceError>) -> Vec<String> {
    result.unwrap_or_else(|e| {
        warn!("Skipping comments for post {}: {}", post_id, e);
        Vec::new()
    })
}

#[async_trait::async_trait]
impl PostSource for RedditSource {
    async fn fetch_posts(&self, limit: usize) -> Result<Vec<Post>, SourceError> {
        let token = self.access_token().await?;
        let token = token.as_str();
        let mut posts = collect_pages(limit, |remaining, after| async move {
            let url = hot_url(&self.config.subreddit, remaining, after.as_deref());
            self.get_json::<Listing>(token, &url).await
        })
        .await?;

        if self.include_comments {
            for post in posts.iter_mut() {
                let result = self.comments(token, &post.id).await;
                post.comments = comments_or_empty(&post.id, result);
            }
        }

        info!("Retrieved {} posts from r/{}", posts.len(), self.config.subreddit);
        Ok(posts)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOT: &str = r#"{
        "kind": "Listing",
        "data": {
            "after": "t3_x",
            "children": [
                {"kind": "t3", "data": {"id": "a1", "title": "GME to the moon", "selftext": "",
                    "created_utc": 1714570200.0, "ups": 420, "stickied": true}},
                {"kind": "t3", "data": {"id": "b2", "title": "AMC and GME again", "selftext": "DD inside",
                    "created_utc": 1714570260.5, "ups": 69}},
                {"kind": "t3", "data": {"id": "c3", "title": "third", "created_utc": 1714570300.0}}
            ]
        }
    }"#;

    #[test]
    fn listing_keeps_order_and_limit() {
        let listing: Listing = serde_json::from_str(HOT).unwrap();
        let posts = posts_from_listing(listing, 2);
        assert_eq!(posts.len(), 2);
        assert_eq!(posts[0].id, "a1");
        assert_eq!(posts[0].upvote_count, 420);
        assert_eq!(posts[1].title, "AMC and GME again");
        assert_eq!(posts[1].body, "DD inside");
        assert_eq!(posts[1].created_at.timestamp(), 1_714_570_260);
    }

    #[test]
    fn missing_fields_default() {
        let listing: Listing = serde_json::from_str(HOT).unwrap();
        let posts = posts_from_listing(listing, 10);
        assert_eq!(posts[2].body, "");
        assert_eq!(posts[2].upvote_count, 0);
    }

    #[test]
    fn comment_bodies_skip_more_stubs() {
        let raw = r#"[
            {"kind": "Listing", "data": {"children": [{"kind": "t3", "data": {"id": "a1"}}]}},
            {"kind": "Listing", "data": {"children": [
                {"kind": "t1", "data": {"body": "TSLA puts"}},
                {"kind": "more", "data": {"count": 12, "children": ["x", "y"]}},
                {"kind": "t1", "data": {"body": "NVDA calls"}}
            ]}}
        ]"#;
        let listings: Vec<Listing> = serde_json::from_str(raw).unwrap();
        assert_eq!(comment_bodies(listings), vec!["TSLA puts", "NVDA calls"]);
    }

    fn page(ids: &[&str], after: Option<&str>) -> Listing {
        Listing {
            data: ListingData {
                children: ids
                    .iter()
                    .map(|id| Thing {
                        kind: "t3".into(),
                        data: ThingData {
                            id: id.to_string(),
                            title: format!("post {id}"),
                            created_utc: 1_714_570_200.0,
                            ..ThingData::default()
                        },
                    })
                    .collect(),
                after: after.map(str::to_string),
            },
        }
    }

    #[test]
    fn listing_exposes_after_cursor() {
        let listing: Listing = serde_json::from_str(HOT).unwrap();
        assert_eq!(listing.data.after.as_deref(), Some("t3_x"));
    }

    #[test]
    fn hot_url_caps_page_size_and_passes_cursor() {
        assert_eq!(
            hot_url("wallstreetbets", 150, None),
            "https://oauth.reddit.com/r/wallstreetbets/hot?limit=100"
        );
        assert_eq!(
            hot_url("wallstreetbets", 50, Some("t3_abc")),
            "https://oauth.reddit.com/r/wallstreetbets/hot?limit=50&after=t3_abc"
        );
    }

    #[tokio::test]
    async fn pages_are_followed_until_limit() {
        let requests = std::sync::Mutex::new(Vec::new());
        let posts = collect_pages(150, |remaining, after| {
            requests.lock().unwrap().push((remaining, after.clone()));
            let ids: Vec<String> = match after.as_deref() {
                None => (0..100).map(|i| format!("a{i}")).collect(),
                Some(_) => (0..100).map(|i| format!("b{i}")).collect(),
            };
            let next = if after.is_none() { Some("t3_a99") } else { Some("t3_b99") };
            let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
            let listing = page(&refs, next);
            async move { Ok(listing) }
        })
        .await
        .unwrap();

        assert_eq!(posts.len(), 150);
        assert_eq!(posts[0].id, "a0");
        assert_eq!(posts[100].id, "b0");
        assert_eq!(posts[149].id, "b49");
        assert_eq!(
            *requests.lock().unwrap(),
            vec![(150, None), (50, Some("t3_a99".to_string()))]
        );
    }

    #[tokio::test]
    async fn pagination_stops_when_listing_runs_out() {
        let calls = std::sync::atomic::AtomicUsize::new(0);
        let posts = collect_pages(500, |_, _| {
            calls.fetch_add(1, std::sync::atomic::Ordering::SeqCst);
            let listing = page(&["only", "two"], None);
            async move { Ok(listing) }
        })
        .await
        .unwrap();

        assert_eq!(posts.len(), 2);
        assert_eq!(calls.load(std::sync::atomic::Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn page_errors_propagate() {
        let result = collect_pages(10, |_, _| async { Err(SourceError::Http(503)) }).await;
        assert!(matches!(result, Err(SourceError::Http(503))));
    }

    #[test]
    fn failed_comment_request_leaves_post_without_comments() {
        let comments = comments_or_empty("a1", Err(SourceError::Http(429)));
        assert!(comments.is_empty());
        let comments = comments_or_empty("a1", Ok(vec!["GME".into()]));
        assert_eq!(comments, vec!["GME"]);
    }
}
