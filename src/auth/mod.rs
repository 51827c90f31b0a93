// Authentication module
// Owns the in-memory access token and coordinates token refresh

mod token_store;

pub use token_store::TokenStore;
