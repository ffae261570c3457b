//! Shared infrastructure for the todo application
//!
//! This crate provides the pieces the web service builds on: PostgreSQL
//! connection pooling, the key-value storage abstraction backing sessions,
//! and typed database errors.

pub mod database;
pub mod error;
pub mod kv;
