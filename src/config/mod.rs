//! # Configuration Module
//!
//! This module handles application configuration loading and management.
//! Configuration can be loaded from:
//! - An INI key/value file (first CLI argument, or `rpserver.ini`)
//! - Environment variables (prefixed with RP_)
//! - .env files (via dotenvy)
//!
//! ## Usage
//!
//! ```rust,ignore
//! use rp_server::config::Settings;
//!
//! let settings = Settings::load(None)?;
//! println!("Client listener on port {}, store in {}", settings.port, settings.data_dir.display());
//! ```

mod settings;

pub use settings::*;
