use std::sync::Arc;

use reqwest::header::{HeaderValue, CONTENT_RANGE};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::config::BackendConfig;
use crate::error::DataError;
use crate::gateway::{DataGateway, GatewayMode};
use crate::model::{
    NewRecipe, NewUser, Recipe, RecipePatch, Review, ReviewInput, SearchParams, Session, User,
    UserPatch,
};
use crate::page::{RecipeQuery, RecipePage};
use crate::query::PostgrestQuery;
use crate::retry::{with_retry, RetryPolicy};

/// Recipe columns plus the embedded author summary.
const RECIPE_COLUMNS: &str = "*,author:users(username,avatar_url)";

/// Gateway to a hosted PostgREST + GoTrue backend.
///
/// Table access goes to `{url}/rest/v1/{table}`, auth to `{url}/auth/v1/...`.
/// Every request carries the `apikey` header and a bearer token: the
/// signed-in user's access token when there is one, the API key otherwise.
/// Every call runs under the retry policy.
pub struct RemoteGateway {
    client: reqwest::Client,
    base_url: String,
    api_key: String,
    retry: RetryPolicy,
    session: Arc<RwLock<Option<Session>>>,
}

#[derive(Deserialize)]
struct AuthUser {
    id: String,
    #[serde(default)]
    email: Option<String>,
}

/// Sign-in returns `{access_token, user}`; sign-up returns the same or, when
/// email confirmation is pending, the bare user object.
#[derive(Deserialize)]
struct AuthResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    user: Option<AuthUser>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    email: Option<String>,
}

impl AuthResponse {
    fn into_session(self) -> Result<Session, DataError> {
        let (user_id, email) = match (self.user, self.id) {
            (Some(user), _) => (user.id, user.email.or(self.email)),
            (None, Some(id)) => (id, self.email),
            (None, None) => {
                return Err(DataError::Decode("auth response carries no user".into()))
            }
        };
        Ok(Session {
            user_id,
            email,
            access_token: self.access_token,
        })
    }
}

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct SavedRecipeRow<'a> {
    recipe_id: &'a str,
    user_id: &'a str,
}

#[derive(Deserialize)]
struct EmbeddedRecipe {
    #[serde(default)]
    recipe: Option<Recipe>,
}

impl RemoteGateway {
    pub fn new(config: &BackendConfig, retry: RetryPolicy) -> Result<Self, DataError> {
        let (Some(url), Some(key)) = (config.url.as_deref(), config.key.as_deref()) else {
            return Err(DataError::NotConfigured);
        };
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| DataError::Transport(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: url.trim().trim_end_matches('/').to_string(),
            api_key: key.trim().to_string(),
            retry,
            session: Arc::new(RwLock::new(None)),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn rest_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    pub fn auth_url(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url)
    }

    async fn bearer(&self) -> String {
        self.session
            .read()
            .await
            .as_ref()
            .and_then(|s| s.access_token.clone())
            .unwrap_or_else(|| self.api_key.clone())
    }

    async fn request(&self, method: Method, url: &str) -> RequestBuilder {
        let bearer = self.bearer().await;
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(bearer)
    }

    async fn fetch_rows<T>(&self, operation: &str, query: &PostgrestQuery) -> Result<Vec<T>, DataError>
    where
        T: DeserializeOwned + Send,
    {
        let url = self.rest_url(query.table());
        let params = query.build();
        let (url, params) = (&url, &params);
        with_retry(&self.retry, operation, move || async move {
            let response = self.request(Method::GET, url).await.query(params).send().await?;
            Ok::<_, DataError>(check(response).await?.json::<Vec<T>>().await?)
        })
        .await
    }

    async fn fetch_one<T>(&self, operation: &str, query: PostgrestQuery, what: &str) -> Result<T, DataError>
    where
        T: DeserializeOwned + Send,
    {
        self.fetch_rows(operation, &query.limit(1))
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| DataError::NotFound(what.to_string()))
    }

    /// Send a write and discard the response body.
    async fn write<B>(
        &self,
        operation: &str,
        method: Method,
        query: &PostgrestQuery,
        body: Option<&B>,
        prefer: &'static str,
    ) -> Result<(), DataError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.rest_url(query.table());
        let params = query.build();
        let (url, params) = (&url, &params);
        with_retry(&self.retry, operation, move || {
            let method = method.clone();
            async move {
                let mut request = self
                    .request(method, url)
                    .await
                    .query(params)
                    .header("Prefer", prefer);
                if let Some(body) = body {
                    request = request.json(body);
                }
                check(request.send().await?).await?;
                Ok::<_, DataError>(())
            }
        })
        .await
    }

    /// Insert one row and return its stored representation.
    async fn insert_returning<B, T>(&self, operation: &str, table: &str, body: &B) -> Result<T, DataError>
    where
        B: Serialize + Sync + ?Sized,
        T: DeserializeOwned + Send,
    {
        let url = self.rest_url(table);
        let url = &url;
        let rows: Vec<T> = with_retry(&self.retry, operation, move || async move {
            let response = self
                .request(Method::POST, url)
                .await
                .header("Prefer", "return=representation")
                .json(body)
                .send()
                .await?;
            Ok::<_, DataError>(check(response).await?.json::<Vec<T>>().await?)
        })
        .await?;
        rows.into_iter()
            .next()
            .ok_or_else(|| DataError::Decode(format!("{operation}: empty insert response")))
    }

    async fn auth_call<B>(&self, operation: &str, path: &str, body: &B) -> Result<Session, DataError>
    where
        B: Serialize + Sync + ?Sized,
    {
        let url = self.auth_url(path);
        let url = &url;
        let response: AuthResponse = with_retry(&self.retry, operation, move || async move {
            let response = self
                .client
                .post(url)
                .header("apikey", &self.api_key)
                .json(body)
                .send()
                .await?;
            Ok::<_, DataError>(check(response).await?.json::<AuthResponse>().await?)
        })
        .await?;
        let session = response.into_session()?;
        if session.access_token.is_some() {
            *self.session.write().await = Some(session.clone());
        }
        Ok(session)
    }
}

/// Turn a non-success response into [`DataError`].
async fn check(response: Response) -> Result<Response, DataError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    let message = backend_message(&body, status);
    if status == StatusCode::CONFLICT {
        return Err(DataError::Conflict(message));
    }
    Err(DataError::Backend {
        status: status.as_u16(),
        message,
    })
}

/// Pull the human-readable message out of a PostgREST or GoTrue error body.
fn backend_message(body: &str, status: StatusCode) -> String {
    let from_json = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| value.get(k).and_then(|m| m.as_str()).map(str::to_string))
        });
    from_json.unwrap_or_else(|| {
        let trimmed = body.trim();
        if trimmed.is_empty() {
            status.canonical_reason().unwrap_or("request failed").to_string()
        } else {
            trimmed.to_string()
        }
    })
}

/// Total row count from a `Content-Range: 0-11/57` header.
fn total_from_content_range(header: Option<&HeaderValue>) -> Option<u64> {
    let value = header?.to_str().ok()?;
    let (_, total) = value.split_once('/')?;
    total.trim().parse().ok()
}

fn recipes() -> PostgrestQuery {
    PostgrestQuery::new("recipes").select(RECIPE_COLUMNS)
}

fn search_query(params: &SearchParams) -> PostgrestQuery {
    let mut query = recipes().where_eq("is_published", "true");
    if !params.query.is_empty() {
        query = query.where_text(&params.query);
    }
    let filters = &params.filters;
    if !filters.difficulty.is_empty() {
        let levels: Vec<&str> = filters.difficulty.iter().map(|d| d.as_str()).collect();
        query = query.where_in("difficulty", &levels);
    }
    if let Some(max) = filters.max_cook_time {
        query = query.where_lte("cook_time", &max.to_string());
    }
    if !filters.cuisine.is_empty() {
        query = query.where_overlaps("tags", &filters.cuisine);
    }
    if !filters.dietary.is_empty() {
        query = query.where_overlaps("tags", &filters.dietary);
    }
    query.order_by("rating", false)
}

impl DataGateway for RemoteGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Remote
    }

    async fn list_recipes(&self, query: RecipeQuery) -> Result<RecipePage, DataError> {
        let q = recipes()
            .where_eq("is_published", "true")
            .order_by("created_at", false)
            .limit(u64::from(query.limit))
            .offset(query.offset());
        let url = self.rest_url(q.table());
        let params = q.build();
        let (url, params) = (&url, &params);
        let (items, total) = with_retry(&self.retry, "list_recipes", move || async move {
            let response = self
                .request(Method::GET, url)
                .await
                .query(params)
                .header("Prefer", "count=exact")
                .send()
                .await?;
            let response = check(response).await?;
            let total = total_from_content_range(response.headers().get(CONTENT_RANGE));
            let items = response.json::<Vec<Recipe>>().await?;
            Ok::<_, DataError>((items, total))
        })
        .await?;
        let total = total.unwrap_or_else(|| query.offset() + items.len() as u64);
        Ok(RecipePage::new(items, &query, total))
    }

    async fn featured_recipes(&self, limit: u32) -> Result<Vec<Recipe>, DataError> {
        let q = recipes()
            .where_eq("is_published", "true")
            .where_eq("is_featured", "true")
            .order_by("rating", false)
            .limit(u64::from(limit));
        self.fetch_rows("featured_recipes", &q).await
    }

    async fn user_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DataError> {
        let q = recipes()
            .where_eq("author_id", user_id)
            .order_by("created_at", false);
        self.fetch_rows("user_recipes", &q).await
    }

    async fn saved_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DataError> {
        let q = PostgrestQuery::new("saved_recipes")
            .select(&format!("recipe:recipes({RECIPE_COLUMNS})"))
            .where_eq("user_id", user_id);
        let rows: Vec<EmbeddedRecipe> = self.fetch_rows("saved_recipes", &q).await?;
        Ok(rows.into_iter().filter_map(|row| row.recipe).collect())
    }

    async fn search_recipes(&self, params: &SearchParams) -> Result<Vec<Recipe>, DataError> {
        self.fetch_rows("search_recipes", &search_query(params)).await
    }

    async fn get_recipe(&self, id: &str) -> Result<Recipe, DataError> {
        self.fetch_one("get_recipe", recipes().where_eq("id", id), &format!("recipe {id}"))
            .await
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, DataError> {
        self.insert_returning("create_recipe", "recipes", recipe).await
    }

    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<(), DataError> {
        let q = PostgrestQuery::new("recipes").where_eq("id", id);
        self.write("update_recipe", Method::PATCH, &q, Some(patch), "return=minimal")
            .await
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), DataError> {
        let q = PostgrestQuery::new("recipes").where_eq("id", id);
        self.write::<()>("delete_recipe", Method::DELETE, &q, None, "return=minimal")
            .await
    }

    async fn save_recipe(&self, recipe_id: &str, user_id: &str) -> Result<(), DataError> {
        let q = PostgrestQuery::new("saved_recipes");
        let row = SavedRecipeRow { recipe_id, user_id };
        self.write("save_recipe", Method::POST, &q, Some(&row), "return=minimal")
            .await
    }

    async fn unsave_recipe(&self, recipe_id: &str, user_id: &str) -> Result<(), DataError> {
        let q = PostgrestQuery::new("saved_recipes")
            .where_eq("recipe_id", recipe_id)
            .where_eq("user_id", user_id);
        self.write::<()>("unsave_recipe", Method::DELETE, &q, None, "return=minimal")
            .await
    }

    async fn rate_recipe(&self, review: &ReviewInput) -> Result<(), DataError> {
        let q = PostgrestQuery::new("reviews").on_conflict("recipe_id,user_id");
        self.write(
            "rate_recipe",
            Method::POST,
            &q,
            Some(review),
            "resolution=merge-duplicates,return=minimal",
        )
        .await
    }

    async fn recipe_reviews(&self, recipe_id: &str) -> Result<Vec<Review>, DataError> {
        let q = PostgrestQuery::new("reviews")
            .where_eq("recipe_id", recipe_id)
            .order_by("created_at", false);
        self.fetch_rows("recipe_reviews", &q).await
    }

    async fn get_user(&self, id: &str) -> Result<User, DataError> {
        let q = PostgrestQuery::new("users").select("*").where_eq("id", id);
        self.fetch_one("get_user", q, &format!("user {id}")).await
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DataError> {
        let q = PostgrestQuery::new("users")
            .select("*")
            .where_eq("username", username)
            .limit(1);
        let rows: Vec<User> = self.fetch_rows("find_user_by_username", &q).await?;
        Ok(rows.into_iter().next())
    }

    async fn create_user(&self, user: &NewUser) -> Result<User, DataError> {
        self.insert_returning("create_user", "users", user).await
    }

    async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<(), DataError> {
        let q = PostgrestQuery::new("users").where_eq("id", id);
        self.write("update_user", Method::PATCH, &q, Some(patch), "return=minimal")
            .await
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DataError> {
        let credentials = Credentials { email, password };
        self.auth_call("sign_in", "token?grant_type=password", &credentials)
            .await
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<Session, DataError> {
        let credentials = Credentials { email, password };
        self.auth_call("sign_up", "signup", &credentials).await
    }

    async fn sign_out(&self) -> Result<(), DataError> {
        let token = self
            .session
            .write()
            .await
            .take()
            .and_then(|s| s.access_token);
        let Some(token) = token else {
            return Ok(());
        };
        let url = self.auth_url("logout");
        let (url, token) = (&url, &token);
        with_retry(&self.retry, "sign_out", move || async move {
            let response = self
                .client
                .post(url)
                .header("apikey", &self.api_key)
                .bearer_auth(token)
                .send()
                .await?;
            check(response).await?;
            Ok::<_, DataError>(())
        })
        .await
    }

    async fn get_session(&self) -> Result<Option<Session>, DataError> {
        let Some(current) = self.session.read().await.clone() else {
            return Ok(None);
        };
        let Some(token) = current.access_token.clone() else {
            return Ok(None);
        };
        let url = self.auth_url("user");
        let (url, token) = (&url, &token);
        let result = with_retry(&self.retry, "get_session", move || async move {
            let response = self
                .client
                .get(url)
                .header("apikey", &self.api_key)
                .bearer_auth(token)
                .send()
                .await?;
            Ok::<_, DataError>(check(response).await?.json::<AuthUser>().await?)
        })
        .await;
        match result {
            Ok(user) => Ok(Some(Session {
                user_id: user.id,
                email: user.email.or(current.email),
                access_token: current.access_token,
            })),
            Err(DataError::Backend { status: 401 | 403, .. }) => {
                tracing::debug!("stored session rejected, signing out locally");
                *self.session.write().await = None;
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }
}
