use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Body;
use axum::extract::State;
use axum::http::{HeaderMap, Method, StatusCode, Uri};
use axum::response::Response;
use axum::Router;
use mise_data::{
    sample_recipes, BackendConfig, DataError, DataGateway, NewUser, RecipeQuery, RemoteGateway,
    RetryPolicy, ReviewInput,
};
use serde_json::{json, Value};

const ANON_KEY: &str = "anon-key";

#[derive(Clone)]
struct Reply {
    status: StatusCode,
    body: Value,
    content_range: Option<&'static str>,
}

impl Reply {
    fn ok(body: Value) -> Self {
        Self::status(StatusCode::OK, body)
    }

    fn status(status: StatusCode, body: Value) -> Self {
        Self {
            status,
            body,
            content_range: None,
        }
    }

    fn with_range(mut self, range: &'static str) -> Self {
        self.content_range = Some(range);
        self
    }
}

#[derive(Debug, Clone)]
struct Seen {
    method: Method,
    path: String,
    query: String,
    bearer: Option<String>,
    apikey: Option<String>,
    prefer: Option<String>,
    body: String,
}

/// Scripted PostgREST / GoTrue stand-in. Replies are queued per path; the
/// last queued reply repeats, and unscripted paths answer `[]`.
#[derive(Clone, Default)]
struct Backend {
    replies: Arc<Mutex<HashMap<String, VecDeque<Reply>>>>,
    seen: Arc<Mutex<Vec<Seen>>>,
}

impl Backend {
    fn reply(&self, path: &str, replies: impl IntoIterator<Item = Reply>) {
        self.replies
            .lock()
            .unwrap()
            .entry(path.to_string())
            .or_default()
            .extend(replies);
    }

    fn seen(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    fn hits(&self, path: &str) -> Vec<Seen> {
        self.seen().into_iter().filter(|s| s.path == path).collect()
    }
}

async fn handle(
    State(backend): State<Backend>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    body: String,
) -> Response {
    let header = |name: &str| {
        headers
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string)
    };
    backend.seen.lock().unwrap().push(Seen {
        method,
        path: uri.path().to_string(),
        query: uri.query().unwrap_or_default().to_string(),
        bearer: header("authorization").and_then(|v| v.strip_prefix("Bearer ").map(str::to_string)),
        apikey: header("apikey"),
        prefer: header("prefer"),
        body,
    });

    let scripted = {
        let mut replies = backend.replies.lock().unwrap();
        match replies.get_mut(uri.path()) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        }
    };
    let reply = scripted.unwrap_or_else(|| Reply::ok(json!([])));

    let mut response = Response::builder()
        .status(reply.status)
        .header("content-type", "application/json");
    if let Some(range) = reply.content_range {
        response = response.header("content-range", range);
    }
    response.body(Body::from(reply.body.to_string())).unwrap()
}

async fn start() -> (Backend, RemoteGateway) {
    let backend = Backend::default();
    let app = Router::new().fallback(handle).with_state(backend.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let config = BackendConfig::new(format!("http://{addr}"), ANON_KEY);
    let retry = RetryPolicy::new(3, Duration::from_millis(1));
    (backend, RemoteGateway::new(&config, retry).unwrap())
}

fn recipe_rows(count: usize) -> Value {
    serde_json::to_value(&sample_recipes()[..count]).unwrap()
}

fn signed_in_body() -> Value {
    json!({
        "access_token": "user-token",
        "token_type": "bearer",
        "user": {"id": "u1", "email": "cook@example.com"}
    })
}

async fn signed_in() -> (Backend, RemoteGateway) {
    let (backend, gateway) = start().await;
    backend.reply("/auth/v1/token", [Reply::ok(signed_in_body())]);
    gateway.sign_in("cook@example.com", "secret").await.unwrap();
    (backend, gateway)
}

#[tokio::test]
async fn listing_reads_total_from_content_range() {
    let (backend, gateway) = start().await;
    backend.reply(
        "/rest/v1/recipes",
        [Reply::ok(recipe_rows(2)).with_range("12-13/57")],
    );

    let page = gateway.list_recipes(RecipeQuery::new(2, 12)).await.unwrap();
    assert_eq!(page.total, 57);
    assert_eq!(page.items.len(), 2);
    assert_eq!(page.items[0].id, "1");
    assert!(!page.has_more);

    let hits = backend.hits("/rest/v1/recipes");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].method, Method::GET);
    assert_eq!(hits[0].prefer.as_deref(), Some("count=exact"));
    assert!(hits[0].query.contains("is_published=eq.true"));
    assert!(hits[0].query.contains("limit=12"));
    assert!(hits[0].query.contains("offset=12"));
    assert_eq!(hits[0].apikey.as_deref(), Some(ANON_KEY));
    assert_eq!(hits[0].bearer.as_deref(), Some(ANON_KEY));
}

#[tokio::test]
async fn listing_without_count_estimates_total() {
    let (backend, gateway) = start().await;
    backend.reply("/rest/v1/recipes", [Reply::ok(recipe_rows(3))]);

    let page = gateway.list_recipes(RecipeQuery::new(1, 12)).await.unwrap();
    assert_eq!(page.total, 3);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let (backend, gateway) = start().await;
    backend.reply(
        "/rest/v1/recipes",
        [
            Reply::status(StatusCode::SERVICE_UNAVAILABLE, json!({"message": "upstream"})),
            Reply::status(StatusCode::BAD_GATEWAY, json!({"message": "upstream"})),
            Reply::ok(recipe_rows(1)),
        ],
    );

    let featured = gateway.featured_recipes(6).await.unwrap();
    assert_eq!(featured.len(), 1);
    assert_eq!(backend.hits("/rest/v1/recipes").len(), 3);
}

#[tokio::test]
async fn server_errors_surface_after_last_attempt() {
    let (backend, gateway) = start().await;
    backend.reply(
        "/rest/v1/recipes",
        [Reply::status(StatusCode::SERVICE_UNAVAILABLE, json!({"message": "upstream"}))],
    );

    let err = gateway.featured_recipes(6).await.unwrap_err();
    assert_eq!(
        err,
        DataError::Backend {
            status: 503,
            message: "upstream".into()
        }
    );
    assert_eq!(backend.hits("/rest/v1/recipes").len(), 3);
}

#[tokio::test]
async fn client_errors_are_not_retried() {
    let (backend, gateway) = start().await;
    backend.reply(
        "/rest/v1/recipes",
        [Reply::status(StatusCode::BAD_REQUEST, json!({"message": "bad filter"}))],
    );

    let err = gateway.get_recipe("1").await.unwrap_err();
    assert_eq!(
        err,
        DataError::Backend {
            status: 400,
            message: "bad filter".into()
        }
    );
    assert_eq!(backend.hits("/rest/v1/recipes").len(), 1);
}

#[tokio::test]
async fn missing_recipe_is_not_found() {
    let (backend, gateway) = start().await;

    let err = gateway.get_recipe("404").await.unwrap_err();
    assert!(matches!(err, DataError::NotFound(_)));

    let hits = backend.hits("/rest/v1/recipes");
    assert!(hits[0].query.contains("id=eq.404"));
    assert!(hits[0].query.contains("limit=1"));
}

#[tokio::test]
async fn conflict_status_maps_to_conflict() {
    let (backend, gateway) = start().await;
    backend.reply(
        "/rest/v1/users",
        [Reply::status(
            StatusCode::CONFLICT,
            json!({"code": "23505", "message": "duplicate key value"}),
        )],
    );

    let profile = NewUser::new("u1", "cook@example.com", "chef", None);
    let err = gateway.create_user(&profile).await.unwrap_err();
    assert_eq!(err, DataError::Conflict("duplicate key value".into()));

    let hits = backend.hits("/rest/v1/users");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].method, Method::POST);
    assert_eq!(hits[0].prefer.as_deref(), Some("return=representation"));
    let sent: Value = serde_json::from_str(&hits[0].body).unwrap();
    assert_eq!(sent["role"], "user");
    assert_eq!(sent["is_admin"], false);
}

#[tokio::test]
async fn writes_send_rows_and_prefer_headers() {
    let (backend, gateway) = start().await;

    gateway.save_recipe("1", "u1").await.unwrap();
    let review = ReviewInput {
        recipe_id: "1".into(),
        user_id: "u1".into(),
        rating: 5,
        comment: None,
    };
    gateway.rate_recipe(&review).await.unwrap();

    let saved = &backend.hits("/rest/v1/saved_recipes")[0];
    assert_eq!(saved.method, Method::POST);
    assert_eq!(saved.prefer.as_deref(), Some("return=minimal"));
    let row: Value = serde_json::from_str(&saved.body).unwrap();
    assert_eq!(row, json!({"recipe_id": "1", "user_id": "u1"}));

    let rated = &backend.hits("/rest/v1/reviews")[0];
    assert_eq!(
        rated.prefer.as_deref(),
        Some("resolution=merge-duplicates,return=minimal")
    );
    assert!(rated.query.starts_with("on_conflict="));
    let row: Value = serde_json::from_str(&rated.body).unwrap();
    assert_eq!(row, json!({"recipe_id": "1", "user_id": "u1", "rating": 5}));
}

#[tokio::test]
async fn sign_in_switches_bearer_to_access_token() {
    let (backend, gateway) = start().await;
    backend.reply("/auth/v1/token", [Reply::ok(signed_in_body())]);

    gateway.featured_recipes(6).await.unwrap();
    let session = gateway.sign_in("cook@example.com", "secret").await.unwrap();
    assert_eq!(session.user_id, "u1");
    assert_eq!(session.email.as_deref(), Some("cook@example.com"));
    assert_eq!(session.access_token.as_deref(), Some("user-token"));
    gateway.featured_recipes(6).await.unwrap();

    let token_call = &backend.hits("/auth/v1/token")[0];
    assert_eq!(token_call.method, Method::POST);
    assert_eq!(token_call.query, "grant_type=password");
    assert_eq!(token_call.apikey.as_deref(), Some(ANON_KEY));
    let credentials: Value = serde_json::from_str(&token_call.body).unwrap();
    assert_eq!(
        credentials,
        json!({"email": "cook@example.com", "password": "secret"})
    );

    let reads = backend.hits("/rest/v1/recipes");
    assert_eq!(reads[0].bearer.as_deref(), Some(ANON_KEY));
    assert_eq!(reads[1].bearer.as_deref(), Some("user-token"));
    assert_eq!(reads[1].apikey.as_deref(), Some(ANON_KEY));
}

#[tokio::test]
async fn rejected_sign_in_keeps_anonymous_bearer() {
    let (backend, gateway) = start().await;
    backend.reply(
        "/auth/v1/token",
        [Reply::status(
            StatusCode::BAD_REQUEST,
            json!({"error": "invalid_grant", "error_description": "Invalid login credentials"}),
        )],
    );

    let err = gateway.sign_in("cook@example.com", "wrong").await.unwrap_err();
    assert_eq!(
        err,
        DataError::Backend {
            status: 400,
            message: "Invalid login credentials".into()
        }
    );
    assert_eq!(backend.hits("/auth/v1/token").len(), 1);
    assert_eq!(gateway.get_session().await.unwrap(), None);
    assert!(backend.hits("/auth/v1/user").is_empty());
}

#[tokio::test]
async fn sign_up_awaiting_confirmation_stores_no_token() {
    let (backend, gateway) = start().await;
    backend.reply(
        "/auth/v1/signup",
        [Reply::ok(json!({
            "id": "u2",
            "email": "new@example.com",
            "confirmation_sent_at": "2024-01-01T00:00:00Z"
        }))],
    );

    let session = gateway.sign_up("new@example.com", "secret").await.unwrap();
    assert_eq!(session.user_id, "u2");
    assert_eq!(session.access_token, None);

    gateway.featured_recipes(6).await.unwrap();
    let reads = backend.hits("/rest/v1/recipes");
    assert_eq!(reads[0].bearer.as_deref(), Some(ANON_KEY));
}

#[tokio::test]
async fn session_is_confirmed_with_the_backend() {
    let (backend, gateway) = signed_in().await;
    backend.reply(
        "/auth/v1/user",
        [Reply::ok(json!({"id": "u1", "email": "cook@example.com"}))],
    );

    let session = gateway.get_session().await.unwrap().unwrap();
    assert_eq!(session.user_id, "u1");
    assert_eq!(session.access_token.as_deref(), Some("user-token"));

    let check = &backend.hits("/auth/v1/user")[0];
    assert_eq!(check.method, Method::GET);
    assert_eq!(check.bearer.as_deref(), Some("user-token"));
}

#[tokio::test]
async fn rejected_session_clears_stored_token() {
    let (backend, gateway) = signed_in().await;
    backend.reply(
        "/auth/v1/user",
        [Reply::status(StatusCode::UNAUTHORIZED, json!({"msg": "invalid JWT"}))],
    );

    assert_eq!(gateway.get_session().await.unwrap(), None);
    assert_eq!(backend.hits("/auth/v1/user").len(), 1);

    gateway.featured_recipes(6).await.unwrap();
    let reads = backend.hits("/rest/v1/recipes");
    assert_eq!(reads[0].bearer.as_deref(), Some(ANON_KEY));

    assert_eq!(gateway.get_session().await.unwrap(), None);
    assert_eq!(backend.hits("/auth/v1/user").len(), 1);
}

#[tokio::test]
async fn sign_out_without_session_skips_backend() {
    let (backend, gateway) = start().await;

    gateway.sign_out().await.unwrap();
    assert!(backend.seen().is_empty());
}

#[tokio::test]
async fn sign_out_revokes_token_and_drops_it() {
    let (backend, gateway) = signed_in().await;
    backend.reply("/auth/v1/logout", [Reply::ok(json!({}))]);

    gateway.sign_out().await.unwrap();

    let logout = &backend.hits("/auth/v1/logout")[0];
    assert_eq!(logout.method, Method::POST);
    assert_eq!(logout.bearer.as_deref(), Some("user-token"));

    assert_eq!(gateway.get_session().await.unwrap(), None);
    gateway.featured_recipes(6).await.unwrap();
    let reads = backend.hits("/rest/v1/recipes");
    assert_eq!(reads[0].bearer.as_deref(), Some(ANON_KEY));
}
