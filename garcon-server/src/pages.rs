//! Static pages embedded at compile time.
//!
//! The landing page, the app-shell chat page, and the embeddable widget
//! script live under `assets/` and ship inside the binary.

/// Landing page served at `/`.
pub const LANDING_HTML: &str = include_str!("../assets/landing.html");

/// Chat app shell served at `/app`.
pub const APP_HTML: &str = include_str!("../assets/app.html");

/// Embeddable chat widget served at `/widget.js`.
pub const WIDGET_JS: &str = include_str!("../assets/widget.js");
