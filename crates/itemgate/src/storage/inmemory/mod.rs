//! In-memory storage backend.
//!
//! This module provides an in-memory implementation of [`ItemStore`] that
//! keeps every item in an ordered map wrapped in `Arc<RwLock<_>>`. It backs
//! the test suite and `itemgate serve --store memory`.
//!
//! # Example
//!
//! ```rust,ignore
//! use itemgate::storage::inmemory::InMemoryRepository;
//!
//! let repo = InMemoryRepository::new("pid").with_page_size(25);
//! ```
//!
//! [`ItemStore`]: itemgate_core::storage::ItemStore

mod repository;

pub use repository::InMemoryRepository;
