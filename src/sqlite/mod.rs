// SQLite backend - embedded provider used for local development and tests
//
// - config: bb8 connection manager and pool setup
// - params: conversion from DbValue to rusqlite values
// - query: result extraction and building
// - executor: batch / select / dml / multi-result execution

pub mod config;
pub mod executor;
pub mod params;
pub mod query;

pub use config::{SqliteManager, SqlitePool, SqlitePooledConnection};
pub use executor::{execute_batch, execute_dml, execute_multiple, execute_select};
pub use query::build_result_set;
