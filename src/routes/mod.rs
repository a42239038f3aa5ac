/**
 * Routes Module
 * API, page and feed handlers
 */

pub mod auth;
pub mod blog;
pub mod dashboard;
pub mod health;
pub mod pages;
pub mod rss;
pub mod upload;

pub use crate::error::ErrorResponse;
