//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - `KeyValueStore` using a SQLite-backed table
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::SqliteKeyValueStore;
//! use bridge_traits::KeyValueStore;
//!
//! #[tokio::main]
//! async fn main() {
//!     let path = bridge_desktop::default_database_path();
//!     let store = SqliteKeyValueStore::new(path).await.unwrap();
//!     store.set("theme", "dark").await.unwrap();
//! }
//! ```

mod kv_store;

pub use kv_store::SqliteKeyValueStore;

use std::path::PathBuf;

/// File name of the desktop key-value database.
pub const DATABASE_FILE_NAME: &str = "tierboard.db";

/// Default location of the key-value database: the platform data directory,
/// falling back to the working directory when the platform reports none.
pub fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .map(|dir| dir.join("tierboard"))
        .unwrap_or_else(|| PathBuf::from("."))
        .join(DATABASE_FILE_NAME)
}
