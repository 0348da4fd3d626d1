pub mod app;
pub mod auth;
pub mod config;
pub mod crud;
pub mod db;
pub mod items;
pub mod notify;
pub mod rejection;
pub mod state;
pub mod store;
pub mod users;

#[cfg(test)]
mod test_support;
