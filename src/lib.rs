pub mod cli;
pub mod config;
pub mod entity;
pub mod error;
pub mod query;
pub mod report;
pub mod stats;
pub mod store;
pub mod temporal;
pub mod validation;

pub use config::ClefConfig;
pub use entity::{derive_record_kind, Post, RecordKind, Season, Student, UserProfile};
pub use error::{ClefError, Result};
pub use store::{RecordStore, SqliteStore};
