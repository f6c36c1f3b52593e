//! Condominium backend API client and types.

pub mod auth;
mod client;
pub mod error;
mod types;

pub use client::CondoClient;
pub use error::ApiError;
pub use types::{occupied_dates, Page, Resource};
