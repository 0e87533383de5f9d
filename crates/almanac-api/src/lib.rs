pub mod accounts;
pub mod auth;
pub mod downloads;
pub mod error;
pub mod events;
pub mod import;
pub mod middleware;
pub mod pages;
pub mod routes;
pub mod state;

#[cfg(test)]
pub(crate) mod test_support;
