// RAG Admin Client - Library root for testing

pub mod auth;
pub mod config;
pub mod endpoints;
pub mod error;
pub mod gateway;
pub mod models;
pub mod session;
