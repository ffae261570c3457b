//! End-to-end test of the web surface
//!
//! Boots the full application on an ephemeral port and drives it over HTTP
//! with redirects disabled, asserting on redirect targets and cookies.
//! Requires live PostgreSQL and Redis, like the infrastructure tests.

use reqwest::header::{COOKIE, LOCATION, SET_COOKIE};
use serial_test::serial;
use uuid::Uuid;

use common::database::{self, DatabaseConfig};
use common::kv::{RedisConfig, RedisPool};
use web::session::SessionConfig;
use web::{AppState, routes};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!();

async fn spawn_app() -> anyhow::Result<String> {
    let db_config = DatabaseConfig::from_env()?;
    let pool = database::init_pool(&db_config).await?;
    database::run_migrations(&pool, &MIGRATOR).await?;

    let redis_pool = RedisPool::new(&RedisConfig::from_env()?).await?;
    let state = AppState::new(pool, redis_pool, SessionConfig::default());

    let app = routes::create_router(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("server crashed");
    });

    Ok(format!("http://{}", addr))
}

fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .expect("failed to build client")
}

/// The `name=value` part of the session cookie set by a response, if any
fn session_cookie(response: &reqwest::Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .filter(|v| v.starts_with("sid=") && !v.starts_with("sid=;"))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .next()
}

fn location(response: &reqwest::Response) -> &str {
    response
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// Pull the first task id out of a rendered task list via its edit link
fn first_task_id(page: &str) -> Option<Uuid> {
    let end = page.find("/edit\"")?;
    let start = end.checked_sub(36)?;
    page.get(start..end)?.parse().ok()
}

#[tokio::test]
#[serial]
async fn register_login_and_manage_tasks_end_to_end() -> anyhow::Result<()> {
    let base = spawn_app().await?;
    let client = client();

    let email = format!("e2e-{}@example.com", Uuid::new_v4().simple());
    let password = "secret1";

    // health check
    let health = client.get(format!("{base}/health")).send().await?;
    assert!(health.status().is_success());

    // unauthenticated task access bounces to login
    let denied = client.get(format!("{base}/tasks")).send().await?;
    assert!(denied.status().is_redirection());
    assert_eq!(location(&denied), "/auth/login");

    // registration redirects to the login form
    let registered = client
        .post(format!("{base}/auth/register"))
        .form(&[
            ("name", "E2E User"),
            ("email", email.as_str()),
            ("password", password),
        ])
        .send()
        .await?;
    assert!(registered.status().is_redirection());
    assert_eq!(location(&registered), "/auth/login");
    assert!(session_cookie(&registered).is_none());

    // the flash notice appears on the next rendered page
    let flash_cookie = registered
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("flash="))
        .map(|v| v.split(';').next().unwrap_or_default().to_string())
        .expect("registration must set a flash notice");
    let login_page = client
        .get(format!("{base}/auth/login"))
        .header(COOKIE, &flash_cookie)
        .send()
        .await?;
    let login_body = login_page.text().await?;
    assert!(login_body.contains("You are now registered and can log in"));

    // a wrong password redirects back to login and sets no session cookie
    let rejected = client
        .post(format!("{base}/auth/login"))
        .form(&[("email", email.as_str()), ("password", "wrong-password")])
        .send()
        .await?;
    assert!(rejected.status().is_redirection());
    assert_eq!(location(&rejected), "/auth/login");
    assert!(session_cookie(&rejected).is_none());

    // the right password lands on the task list with a session cookie
    let accepted = client
        .post(format!("{base}/auth/login"))
        .form(&[("email", email.as_str()), ("password", password)])
        .send()
        .await?;
    assert!(accepted.status().is_redirection());
    assert_eq!(location(&accepted), "/tasks");
    let sid = session_cookie(&accepted).expect("login must set a session cookie");

    // guest-only pages bounce an authenticated user to the task list
    let bounced = client
        .get(format!("{base}/auth/login"))
        .header(COOKIE, &sid)
        .send()
        .await?;
    assert!(bounced.status().is_redirection());
    assert_eq!(location(&bounced), "/tasks");

    // create a task and see it in the list
    let created = client
        .post(format!("{base}/tasks"))
        .header(COOKIE, &sid)
        .form(&[("title", "Write the report"), ("description", ""), ("due_date", "")])
        .send()
        .await?;
    assert!(created.status().is_redirection());
    assert_eq!(location(&created), "/tasks");

    let list_body = client
        .get(format!("{base}/tasks"))
        .header(COOKIE, &sid)
        .send()
        .await?
        .text()
        .await?;
    assert!(list_body.contains("Write the report"));
    let task_id = first_task_id(&list_body).expect("task id missing from the list");

    // a blank title is rejected back to the creation form
    let invalid = client
        .post(format!("{base}/tasks"))
        .header(COOKIE, &sid)
        .form(&[("title", ""), ("description", ""), ("due_date", "")])
        .send()
        .await?;
    assert!(invalid.status().is_redirection());
    assert_eq!(location(&invalid), "/tasks/new");

    // complete the task through the overridden PUT route
    let completed = client
        .post(format!("{base}/tasks/{task_id}/status?_method=PUT"))
        .header(COOKIE, &sid)
        .form(&[("status", "completed")])
        .send()
        .await?;
    assert!(completed.status().is_redirection());
    assert_eq!(location(&completed), "/tasks");

    let completed_list = client
        .get(format!("{base}/tasks?status=completed"))
        .header(COOKIE, &sid)
        .send()
        .await?
        .text()
        .await?;
    assert!(completed_list.contains("Write the report"));

    let pending_list = client
        .get(format!("{base}/tasks?status=pending"))
        .header(COOKIE, &sid)
        .send()
        .await?
        .text()
        .await?;
    assert!(!pending_list.contains("Write the report"));

    // edit the task through the overridden PUT route
    let edited = client
        .post(format!("{base}/tasks/{task_id}?_method=PUT"))
        .header(COOKIE, &sid)
        .form(&[
            ("title", "Write the quarterly report"),
            ("description", "With charts"),
            ("due_date", "2026-12-01"),
            ("status", "completed"),
        ])
        .send()
        .await?;
    assert!(edited.status().is_redirection());
    assert_eq!(location(&edited), "/tasks");

    // soft-delete removes it from every listing
    let deleted = client
        .post(format!("{base}/tasks/{task_id}?_method=DELETE"))
        .header(COOKIE, &sid)
        .send()
        .await?;
    assert!(deleted.status().is_redirection());
    assert_eq!(location(&deleted), "/tasks");

    let after_delete = client
        .get(format!("{base}/tasks"))
        .header(COOKIE, &sid)
        .send()
        .await?
        .text()
        .await?;
    assert!(!after_delete.contains("Write the quarterly report"));

    // deleting again reports not-found, not an error page
    let missing = client
        .post(format!("{base}/tasks/{task_id}?_method=DELETE"))
        .header(COOKIE, &sid)
        .send()
        .await?;
    assert!(missing.status().is_redirection());
    assert_eq!(location(&missing), "/tasks");

    // logout destroys the session server-side
    let logged_out = client
        .get(format!("{base}/auth/logout"))
        .header(COOKIE, &sid)
        .send()
        .await?;
    assert!(logged_out.status().is_redirection());
    assert_eq!(location(&logged_out), "/");

    let stale = client
        .get(format!("{base}/tasks"))
        .header(COOKIE, &sid)
        .send()
        .await?;
    assert!(stale.status().is_redirection());
    assert_eq!(location(&stale), "/auth/login");

    Ok(())
}

#[tokio::test]
#[serial]
async fn unknown_paths_render_the_not_found_page() -> anyhow::Result<()> {
    let base = spawn_app().await?;
    let client = client();

    let response = client.get(format!("{base}/no/such/page")).send().await?;
    assert_eq!(response.status(), reqwest::StatusCode::NOT_FOUND);
    assert!(response.text().await?.contains("Page not found"));

    Ok(())
}
