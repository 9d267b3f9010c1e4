//! Session-based authentication backend: registration, credential
//! verification, cookie-referenced server-side sessions and profile lookup.

pub mod app;
pub mod config;
pub mod cookies;
pub mod db;
pub mod error;
pub mod state;

pub mod crypto {
    pub mod password;
    pub mod session_id;
}

pub mod models {
    pub mod session;
    pub mod user;
}

pub mod repositories {
    pub mod memory;
    pub mod session;
    pub mod user;
}

pub mod services {
    pub mod auth;
    pub mod session;
}

pub mod handlers {
    pub mod auth;
}

pub mod validation {
    pub mod auth;
}
