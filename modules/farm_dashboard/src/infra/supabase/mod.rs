//! Adapters for a managed backend exposing GoTrue (`/auth/v1`), PostgREST
//! (`/rest/v1`) and object storage (`/storage/v1`) under one base URL.

pub mod auth;
pub mod client;
pub mod dto;
pub mod rest;
pub mod storage;

pub use auth::SupabaseAuth;
pub use client::SupabaseClient;
pub use rest::{SupabaseFarms, SupabaseProfiles};
pub use storage::SupabaseStorage;
