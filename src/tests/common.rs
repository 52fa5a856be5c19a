use crate::database::sqlite::SqliteUserRepository;
use crate::database::{UserRepository, connect_pool};
use crate::domain::{UserDraft, UserRecord};
use crate::{AppState, build_router};
use anyhow::{Result, bail};
use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Method, Request, StatusCode};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tower::ServiceExt;

// a fresh in-memory database per test
// a single connection, every connection to sqlite::memory: would be its own database
pub async fn setup_test_pool() -> SqlitePool {
    connect_pool("sqlite::memory:", 1)
        .await
        .expect("Failed to create in-memory database")
}

// the real router on top of sqlite, collection mounted at /users
pub async fn setup_sqlite_app() -> (Router, SqlitePool) {
    let pool = setup_test_pool().await;
    let state = AppState {
        users: Arc::new(SqliteUserRepository::new(pool.clone())),
    };
    (build_router(state, ""), pool)
}

pub fn setup_mock_app(repo: MockUserRepository) -> Router {
    build_router(
        AppState {
            users: Arc::new(repo),
        },
        "",
    )
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }
}

// fire a single request at the router and collect the whole response
pub async fn send(app: &Router, method: Method, uri: &str, body: Option<&str>) -> TestResponse {
    let body = match body {
        Some(json) => Body::from(json.to_string()),
        None => Body::empty(),
    };

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(method)
                .uri(uri)
                .header("content-type", "application/json")
                .body(body)
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let headers = response.headers().clone();
    let body = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap();

    TestResponse {
        status,
        headers,
        body,
    }
}

// --- Manual Mock: UserRepository ---
// keeps users in a BTreeMap and can be told to fail reads or writes,
// counting every call so tests can prove storage was never touched
#[derive(Clone, Default)]
pub struct MockUserRepository {
    pub users: Arc<Mutex<BTreeMap<i64, UserRecord>>>,
    pub next_id: Arc<Mutex<i64>>,
    pub fail_reads: Arc<AtomicBool>,
    pub fail_writes: Arc<AtomicBool>,
    pub calls: Arc<AtomicUsize>,
}

impl MockUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_user(self, name: &str, statement: i64) -> Self {
        {
            let mut next_id = self.next_id.lock().unwrap();
            *next_id += 1;
            let record = UserRecord {
                id: *next_id,
                name: name.to_string(),
                statement,
            };
            self.users.lock().unwrap().insert(record.id, record);
        }
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn read(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_reads.load(Ordering::SeqCst) {
            bail!("mock read failure: connection reset by peer");
        }
        Ok(())
    }

    fn write(&self) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_writes.load(Ordering::SeqCst) {
            bail!("mock write failure: disk I/O error");
        }
        Ok(())
    }
}

#[async_trait]
impl UserRepository for MockUserRepository {
    async fn list_users(&self) -> Result<Vec<UserRecord>> {
        self.read()?;
        Ok(self.users.lock().unwrap().values().cloned().collect())
    }

    async fn get_user(&self, id: i64) -> Result<Option<UserRecord>> {
        self.read()?;
        Ok(self.users.lock().unwrap().get(&id).cloned())
    }

    async fn create_user(&self, draft: &UserDraft) -> Result<UserRecord> {
        self.write()?;
        let mut next_id = self.next_id.lock().unwrap();
        *next_id += 1;
        let record = draft.clone().into_record(*next_id);
        self.users.lock().unwrap().insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_user(&self, id: i64, draft: &UserDraft) -> Result<Option<UserRecord>> {
        self.write()?;
        let mut users = self.users.lock().unwrap();
        if !users.contains_key(&id) {
            return Ok(None);
        }
        let record = draft.clone().into_record(id);
        users.insert(id, record.clone());
        Ok(Some(record))
    }

    async fn delete_user(&self, id: i64) -> Result<()> {
        self.write()?;
        self.users.lock().unwrap().remove(&id);
        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        self.read()
    }
}
