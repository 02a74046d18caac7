//! HTML templates for the web dashboard.
//!
//! Templates are embedded at compile time using `include_str!`. Slots are
//! written as `{{name}}` and filled by [`super::render::render_page`].

/// The two-pane dashboard page.
pub const INDEX_TEMPLATE: &str = include_str!("templates/index.html");
