//! Tree catalog: a SQLite-backed REST service and a typed client that share
//! one wire contract.

pub mod app;
pub mod cli;
pub mod client;
pub mod commands;
pub mod context;
pub mod contract;
pub mod rest;
pub mod storage;
pub mod tracing;
pub mod types;
pub mod ui;
