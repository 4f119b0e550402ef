#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use mise_data::{
    sample_recipes, DataError, DataGateway, GatewayMode, NewRecipe, NewUser, Recipe, RecipePage,
    RecipePatch, RecipeQuery, Review, ReviewInput, SearchParams, Session, User, UserPatch,
};
use mise_security::Role;

/// Scriptable in-memory backend.
#[derive(Default)]
pub struct FakeGateway {
    pub recipes: Mutex<Vec<Recipe>>,
    pub users: Mutex<Vec<User>>,
    pub session: Mutex<Option<Session>>,
    pub created_users: Mutex<Vec<NewUser>>,
    pub fail_reads: AtomicBool,
    pub fail_writes: AtomicBool,
    pub fail_session: AtomicBool,
    pub latency: Duration,
    calls: Mutex<Vec<&'static str>>,
}

impl FakeGateway {
    /// Backend holding the sample recipes, ids prefixed with `remote-` so
    /// results can be told apart from the offline fallback.
    pub fn remote_samples() -> Self {
        let recipes = sample_recipes()
            .iter()
            .cloned()
            .map(|mut r| {
                r.id = format!("remote-{}", r.id);
                r
            })
            .collect();
        Self {
            recipes: Mutex::new(recipes),
            ..Self::default()
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn with_user(self, user: User) -> Self {
        self.users.lock().unwrap().push(user);
        self
    }

    pub fn fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self, name: &str) -> usize {
        self.calls.lock().unwrap().iter().filter(|c| **c == name).count()
    }

    async fn enter(&self, name: &'static str) {
        self.calls.lock().unwrap().push(name);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    fn check_read(&self) -> Result<(), DataError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(DataError::Transport("connection refused".into()));
        }
        Ok(())
    }

    fn check_write(&self) -> Result<(), DataError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(DataError::Backend {
                status: 500,
                message: "internal error".into(),
            });
        }
        Ok(())
    }

    fn snapshot(&self) -> Vec<Recipe> {
        self.recipes.lock().unwrap().clone()
    }
}

pub fn user(id: &str, username: &str, role: Role) -> User {
    User {
        id: id.into(),
        username: username.into(),
        email: format!("{username}@example.com"),
        full_name: None,
        avatar_url: None,
        bio: None,
        dietary_preferences: Vec::new(),
        is_admin: false,
        role,
        permissions: Vec::new(),
        created_at: chrono::Utc::now(),
        updated_at: None,
    }
}

pub fn session(user_id: &str) -> Session {
    Session {
        user_id: user_id.into(),
        email: None,
        access_token: Some(format!("token-{user_id}")),
    }
}

impl DataGateway for FakeGateway {
    fn mode(&self) -> GatewayMode {
        GatewayMode::Remote
    }

    async fn list_recipes(&self, query: RecipeQuery) -> Result<RecipePage, DataError> {
        self.enter("list_recipes").await;
        self.check_read()?;
        let all = self.snapshot();
        let items = all
            .iter()
            .skip(query.offset() as usize)
            .take(query.limit as usize)
            .cloned()
            .collect();
        Ok(RecipePage::new(items, &query, all.len() as u64))
    }

    async fn featured_recipes(&self, limit: u32) -> Result<Vec<Recipe>, DataError> {
        self.enter("featured_recipes").await;
        self.check_read()?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|r| r.is_featured)
            .take(limit as usize)
            .collect())
    }

    async fn user_recipes(&self, user_id: &str) -> Result<Vec<Recipe>, DataError> {
        self.enter("user_recipes").await;
        self.check_read()?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|r| r.author_id == user_id)
            .collect())
    }

    async fn saved_recipes(&self, _user_id: &str) -> Result<Vec<Recipe>, DataError> {
        self.enter("saved_recipes").await;
        self.check_read()?;
        Ok(self.snapshot().into_iter().take(2).collect())
    }

    async fn search_recipes(&self, params: &SearchParams) -> Result<Vec<Recipe>, DataError> {
        self.enter("search_recipes").await;
        self.check_read()?;
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|r| params.matches(r))
            .collect())
    }

    async fn get_recipe(&self, id: &str) -> Result<Recipe, DataError> {
        self.enter("get_recipe").await;
        self.check_read()?;
        self.snapshot()
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| DataError::NotFound(format!("recipe {id}")))
    }

    async fn create_recipe(&self, recipe: &NewRecipe) -> Result<Recipe, DataError> {
        self.enter("create_recipe").await;
        self.check_write()?;
        let mut created = self.snapshot()[0].clone();
        created.id = format!("remote-new-{}", self.calls("create_recipe"));
        created.title = recipe.title.clone();
        created.author_id = recipe.author_id.clone();
        self.recipes.lock().unwrap().insert(0, created.clone());
        Ok(created)
    }

    async fn update_recipe(&self, id: &str, patch: &RecipePatch) -> Result<(), DataError> {
        self.enter("update_recipe").await;
        self.check_write()?;
        let mut recipes = self.recipes.lock().unwrap();
        let recipe = recipes
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or_else(|| DataError::NotFound(format!("recipe {id}")))?;
        if let Some(title) = &patch.title {
            recipe.title = title.clone();
        }
        Ok(())
    }

    async fn delete_recipe(&self, id: &str) -> Result<(), DataError> {
        self.enter("delete_recipe").await;
        self.check_write()?;
        self.recipes.lock().unwrap().retain(|r| r.id != id);
        Ok(())
    }

    async fn save_recipe(&self, _recipe_id: &str, _user_id: &str) -> Result<(), DataError> {
        self.enter("save_recipe").await;
        self.check_write()
    }

    async fn unsave_recipe(&self, _recipe_id: &str, _user_id: &str) -> Result<(), DataError> {
        self.enter("unsave_recipe").await;
        self.check_write()
    }

    async fn rate_recipe(&self, _review: &ReviewInput) -> Result<(), DataError> {
        self.enter("rate_recipe").await;
        self.check_write()
    }

    async fn recipe_reviews(&self, _recipe_id: &str) -> Result<Vec<Review>, DataError> {
        self.enter("recipe_reviews").await;
        self.check_read()?;
        Ok(Vec::new())
    }

    async fn get_user(&self, id: &str) -> Result<User, DataError> {
        self.enter("get_user").await;
        self.check_read()?;
        self.users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned()
            .ok_or_else(|| DataError::NotFound(format!("user {id}")))
    }

    async fn find_user_by_username(&self, username: &str) -> Result<Option<User>, DataError> {
        self.enter("find_user_by_username").await;
        self.check_read()?;
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.username == username)
            .cloned())
    }

    async fn create_user(&self, new_user: &NewUser) -> Result<User, DataError> {
        self.enter("create_user").await;
        self.check_write()?;
        self.created_users.lock().unwrap().push(new_user.clone());
        let mut created = user(&new_user.id, &new_user.username, new_user.role);
        created.email = new_user.email.clone();
        created.full_name = new_user.full_name.clone();
        created.is_admin = new_user.is_admin;
        self.users.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update_user(&self, id: &str, patch: &UserPatch) -> Result<(), DataError> {
        self.enter("update_user").await;
        self.check_write()?;
        let mut users = self.users.lock().unwrap();
        let user = users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or_else(|| DataError::NotFound(format!("user {id}")))?;
        patch.apply(user);
        Ok(())
    }

    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, DataError> {
        self.enter("sign_in").await;
        let user = self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.email == email)
            .cloned();
        match user {
            Some(user) if password == "correct horse" => {
                let session = session(&user.id);
                *self.session.lock().unwrap() = Some(session.clone());
                Ok(session)
            }
            _ => Err(DataError::Backend {
                status: 400,
                message: "Invalid login credentials".into(),
            }),
        }
    }

    async fn sign_up(&self, email: &str, _password: &str) -> Result<Session, DataError> {
        self.enter("sign_up").await;
        self.check_write()?;
        let session = Session {
            user_id: format!("new-{}", email.split('@').next().unwrap_or(email)),
            email: Some(email.to_string()),
            access_token: Some("fresh-token".into()),
        };
        *self.session.lock().unwrap() = Some(session.clone());
        Ok(session)
    }

    async fn sign_out(&self) -> Result<(), DataError> {
        self.enter("sign_out").await;
        *self.session.lock().unwrap() = None;
        self.check_write()
    }

    async fn get_session(&self) -> Result<Option<Session>, DataError> {
        self.enter("get_session").await;
        if self.fail_session.load(Ordering::SeqCst) {
            return Err(DataError::Transport("timeout".into()));
        }
        Ok(self.session.lock().unwrap().clone())
    }
}
