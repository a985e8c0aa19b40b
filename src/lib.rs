//! linkforge - short link core
//!
//! Allocates collision-free short codes, resolves them through a
//! read-through cache with an atomic click counter, records clicks off the
//! request path and serves click statistics behind a circuit breaker.
//!
//! # Architecture
//! - `generator`: counter and node-partitioned (Snowflake-style) code strategies
//! - `storage`: link registry, click events and local aggregation on SeaORM
//! - `cache`: read-through link cache
//! - `analytics`: click tracker, circuit breaker and stats aggregation
//! - `services`: code allocation, owner lookup and the link lifecycle
//! - `interfaces`: command-line front end
//! - `config`: TOML + environment configuration
//! - `runtime`: wiring at startup and draining at shutdown
//! - `system`: logging

pub mod analytics;
pub mod cache;
pub mod cli;
pub mod config;
pub mod errors;
pub mod generator;
pub mod interfaces;
pub mod runtime;
pub mod services;
pub mod storage;
pub mod system;
pub mod utils;
