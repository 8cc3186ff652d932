mod database {
    pub mod actions;
    pub mod error;
    pub mod form;
    pub mod schema;
    pub mod video;
}
mod authentication {
    pub mod cookies;
    pub mod google;
    pub mod jwt;
    pub mod middleware;
}
pub mod recommendation {
    pub mod matcher;
    pub mod ranker;
}
pub mod routes {
    pub mod auth;
    pub mod context;
    pub mod recipes;
    pub mod rejection;
}
pub mod config;
mod constants;
pub mod server;

pub use authentication::*;
pub use constants::*;
pub use database::*;
