//! Multi-user todo web application
//!
//! Session-authenticated task management over PostgreSQL, with
//! Redis-backed sessions, server-rendered views, and scheduled cleanup of
//! soft-deleted tasks.

pub mod auth;
pub mod error;
pub mod flash;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod session;
pub mod sweeper;
pub mod validation;
pub mod views;

use common::kv::RedisPool;
use sqlx::PgPool;

use crate::auth::Authenticator;
use crate::repositories::{TaskRepository, UserRepository};
use crate::session::{SessionConfig, SessionManager};

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub db_pool: PgPool,
    pub users: UserRepository,
    pub tasks: TaskRepository,
    pub authenticator: Authenticator,
    pub sessions: SessionManager<RedisPool>,
}

impl AppState {
    /// Wire repositories and services over the given pools
    pub fn new(db_pool: PgPool, redis_pool: RedisPool, session_config: SessionConfig) -> Self {
        let users = UserRepository::new(db_pool.clone());
        let tasks = TaskRepository::new(db_pool.clone());
        let authenticator = Authenticator::new(users.clone());
        let sessions = SessionManager::new(redis_pool, session_config);

        Self {
            db_pool,
            users,
            tasks,
            authenticator,
            sessions,
        }
    }
}
