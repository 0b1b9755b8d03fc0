//! Core library: collection store, upload submission, status polling, batch
//! orchestration, and local-device reconciliation.

pub mod batch;
pub mod collection;
pub mod config;
pub mod models;
pub mod poller;
pub mod reconcile;
pub mod uploader;
