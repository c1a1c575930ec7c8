#![doc = include_str!("../README.md")]
#![warn(missing_docs)]

pub mod base_path;
pub mod config;
pub mod models;
pub mod project;
pub mod rewrite;
pub mod walker;

pub use base_path::BasePath;
pub use config::SiteConfig;
pub use models::RewriteSummary;
pub use project::{ResolvedProject, SiteProject};
pub use rewrite::{DocumentRewrite, rewrite_document};
pub use walker::rewrite_tree;
