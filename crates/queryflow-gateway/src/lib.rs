//! Queryflow Gateway — HTTP front door for plan execution

pub mod server;

pub use server::{build_state, router, start_server, AppState};
