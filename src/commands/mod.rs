//! Session Command Handlers
//!
//! The operations a presentation layer calls, organized by concern. Every
//! handler takes the session explicitly and returns a serializable result
//! or an error string.
//!
//! ## Module Organization
//! - `state` - Session state (store, settings, geocoder cache)
//! - `import` - Upload ingestion, removal and listing
//! - `reports` - Metric tables and the dashboard bundle
//! - `geo` - GeoNames postal index loading
//! - `settings` - Session settings

mod state;
pub mod geo;
pub mod import;
pub mod reports;
pub mod settings;

pub use state::Session;
