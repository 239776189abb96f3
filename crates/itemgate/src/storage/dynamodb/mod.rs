//! DynamoDB storage backend implementation.
//!
//! This module provides a DynamoDB-based implementation of [`ItemStore`]
//! using `aws-sdk-dynamodb`.
//!
//! [`ItemStore`]: itemgate_core::storage::ItemStore

mod conversions;
mod error;
mod repository;

pub use repository::DynamoDbRepository;
