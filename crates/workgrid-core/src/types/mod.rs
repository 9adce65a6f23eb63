//! Core type definitions used across the WorkGrid workspace.

pub mod pagination;

pub use pagination::{PageMeta, PageRequest, PageResponse};
