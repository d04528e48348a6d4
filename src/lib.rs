//! Admin console for a streaming catalog: shows, seasons, episodes and
//! movies behind a REST backend, with TMDB imports and bulk URL assignment.

pub mod bulk;
pub mod catalog;
pub mod config;
pub mod console;
pub mod error;
pub mod http;
pub mod import;
pub mod loader;
pub mod models;
pub mod poster;
pub mod sections;
pub mod session;
pub mod store;
pub mod tmdb;

pub use console::{Console, Summary};
pub use error::{ConsoleError, Result};
