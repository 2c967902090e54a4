// tests/api_tests.rs

use blog_backend::{config::Config, routes, state::AppState};
use sqlx::postgres::PgPoolOptions;

/// Helper function to spawn the app on a random port for testing.
/// Returns the base URL (e.g., "http://127.0.0.1:12345").
///
/// These tests need a running Postgres instance; when DATABASE_URL is not
/// set they are skipped rather than failed.
async fn spawn_app() -> Option<String> {
    let Ok(database_url) = std::env::var("DATABASE_URL") else {
        eprintln!("DATABASE_URL not set; skipping integration test");
        return None;
    };

    // 1. Create a pool
    let pool = PgPoolOptions::new()
        .max_connections(1)
        .connect(&database_url)
        .await
        .expect("Failed to connect to Postgres for testing. Make sure DATABASE_URL is set.");

    // 2. Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("Failed to migrate database");

    // 3. Create test configuration and state
    let config = Config {
        database_url: database_url.clone(),
        jwt_secret: "test_secret_for_integration_tests".to_string(),
        jwt_expiration: 600, // 10 minutes for tests
        port: 0,
        rust_log: "error".to_string(),
    };

    let state = AppState { pool, config };

    // 4. Create the router with the app state
    let app = routes::create_router(state);

    // 5. Bind to port 0 to get a random available port
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind random port");

    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    // 6. Spawn the server in the background
    tokio::spawn(async move {
        axum::serve(
            listener,
            app.into_make_service_with_connect_info::<std::net::SocketAddr>(),
        )
        .await
        .unwrap();
    });

    Some(address)
}

fn unique_name() -> String {
    format!("u_{}", &uuid::Uuid::new_v4().to_string()[..8])
}

/// Register a user and return a bearer token for them.
async fn register_and_login(client: &reqwest::Client, address: &str, username: &str) -> String {
    client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Register failed");

    let login_resp = client
        .post(format!("{}/api/auth/login", address))
        .json(&serde_json::json!({
            "username": username,
            "password": "password123"
        }))
        .send()
        .await
        .expect("Login failed")
        .json::<serde_json::Value>()
        .await
        .expect("Failed to parse login json");

    login_resp["token"]
        .as_str()
        .expect("Token not found")
        .to_string()
}

#[tokio::test]
async fn health_check_404() {
    // Arrange
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    // Act
    let response = client
        .get(format!("{}/random_path_that_does_not_exist", address))
        .send()
        .await
        .expect("Failed to execute request");

    // Assert
    assert_eq!(response.status().as_u16(), 404);
}

#[tokio::test]
async fn register_works() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": unique_name(),
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 201);
}

#[tokio::test]
async fn register_fails_validation() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    // Act: Send a username that is too short
    let response = client
        .post(format!("{}/api/auth/register", address))
        .json(&serde_json::json!({
            "username": "yo",
            "password": "password123"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 400);
}

#[tokio::test]
async fn duplicate_username_is_a_conflict() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let username = unique_name();

    let payload = serde_json::json!({
        "username": username,
        "password": "password123"
    });

    let first = client
        .post(format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(first.status().as_u16(), 201);

    let second = client
        .post(format!("{}/api/auth/register", address))
        .json(&payload)
        .send()
        .await
        .expect("Failed to execute request");
    assert_eq!(second.status().as_u16(), 409);
}

#[tokio::test]
async fn create_post_requires_auth() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let response = client
        .post(format!("{}/api/posts", address))
        .json(&serde_json::json!({
            "title": "untitled",
            "content": "body"
        }))
        .send()
        .await
        .expect("Failed to execute request");

    assert_eq!(response.status().as_u16(), 401);
}

#[tokio::test]
async fn post_and_comment_flow_renders_safe_html() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();
    let token = register_and_login(&client, &address, &unique_name()).await;

    // Create a post with Markdown and a script injection attempt.
    let create_resp = client
        .post(format!("{}/api/posts", address))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({
            "title": "**bold** title",
            "content": "Visit example.com now\n\n<script>alert(1)</script>"
        }))
        .send()
        .await
        .expect("Create post failed");
    assert_eq!(create_resp.status().as_u16(), 201);
    let post_id = create_resp.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .expect("Post id not returned");

    // Fetch it back and check the rendered fields.
    let post: serde_json::Value = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .send()
        .await
        .expect("Get post failed")
        .json()
        .await
        .expect("Failed to parse post json");

    let title_html = post["title_html"].as_str().unwrap();
    assert_eq!(title_html, "<strong>bold</strong> title");

    let content_html = post["content_html"].as_str().unwrap();
    assert!(content_html.contains("<a href=\"http://example.com\""));
    assert!(!content_html.contains("script"));

    // Comment on it.
    let comment_resp = client
        .post(format!("{}/api/posts/{}/comments", address, post_id))
        .header("Authorization", format!("Bearer {}", token))
        .json(&serde_json::json!({ "content": "nice, wrote to me@example.com" }))
        .send()
        .await
        .expect("Create comment failed");
    assert_eq!(comment_resp.status().as_u16(), 201);

    let comments: Vec<serde_json::Value> = client
        .get(format!("{}/api/posts/{}/comments", address, post_id))
        .send()
        .await
        .expect("List comments failed")
        .json()
        .await
        .expect("Failed to parse comments json");
    assert_eq!(comments.len(), 1);
    assert!(
        comments[0]["content_html"]
            .as_str()
            .unwrap()
            .contains("mailto:me@example.com")
    );
}

#[tokio::test]
async fn private_posts_are_invisible_to_others() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let author = unique_name();
    let stranger = unique_name();
    let author_token = register_and_login(&client, &address, &author).await;
    let stranger_token = register_and_login(&client, &address, &stranger).await;

    let title = format!("secret-{}", unique_name());
    let create_resp = client
        .post(format!("{}/api/posts", address))
        .header("Authorization", format!("Bearer {}", author_token))
        .json(&serde_json::json!({
            "title": title,
            "content": "for my eyes only",
            "is_private": true
        }))
        .send()
        .await
        .expect("Create post failed");
    assert_eq!(create_resp.status().as_u16(), 201);
    let post_id = create_resp.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    // Anonymous fetch: reported as missing.
    let anon = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .send()
        .await
        .expect("Get post failed");
    assert_eq!(anon.status().as_u16(), 404);

    // Another user: also missing.
    let other = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", format!("Bearer {}", stranger_token))
        .send()
        .await
        .expect("Get post failed");
    assert_eq!(other.status().as_u16(), 404);

    // The author sees it.
    let own = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .expect("Get post failed");
    assert_eq!(own.status().as_u16(), 200);

    // Anonymous listing does not leak the title.
    let listing = client
        .get(format!("{}/api/posts", address))
        .send()
        .await
        .expect("List posts failed")
        .text()
        .await
        .unwrap();
    assert!(!listing.contains(&title));

    // The author's own listing includes it.
    let mine = client
        .get(format!("{}/api/posts/mine", address))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .expect("List my posts failed")
        .text()
        .await
        .unwrap();
    assert!(mine.contains(&title));

    // Commenting on someone else's private post is rejected as missing.
    let comment = client
        .post(format!("{}/api/posts/{}/comments", address, post_id))
        .header("Authorization", format!("Bearer {}", stranger_token))
        .json(&serde_json::json!({ "content": "let me in" }))
        .send()
        .await
        .expect("Create comment failed");
    assert_eq!(comment.status().as_u16(), 404);
}

#[tokio::test]
async fn delete_post_is_author_only() {
    let Some(address) = spawn_app().await else {
        return;
    };
    let client = reqwest::Client::new();

    let author_token = register_and_login(&client, &address, &unique_name()).await;
    let stranger_token = register_and_login(&client, &address, &unique_name()).await;

    let create_resp = client
        .post(format!("{}/api/posts", address))
        .header("Authorization", format!("Bearer {}", author_token))
        .json(&serde_json::json!({
            "title": "short lived",
            "content": "soon gone"
        }))
        .send()
        .await
        .expect("Create post failed");
    let post_id = create_resp.json::<serde_json::Value>().await.unwrap()["id"]
        .as_i64()
        .unwrap();

    let forbidden = client
        .delete(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", format!("Bearer {}", stranger_token))
        .send()
        .await
        .expect("Delete failed");
    assert_eq!(forbidden.status().as_u16(), 401);

    let deleted = client
        .delete(format!("{}/api/posts/{}", address, post_id))
        .header("Authorization", format!("Bearer {}", author_token))
        .send()
        .await
        .expect("Delete failed");
    assert_eq!(deleted.status().as_u16(), 204);

    let gone = client
        .get(format!("{}/api/posts/{}", address, post_id))
        .send()
        .await
        .expect("Get post failed");
    assert_eq!(gone.status().as_u16(), 404);
}
