//! Web dashboard HTTP server module.
//!
//! Serves the two-pane projects/tasks view. The selection lives in the
//! request query string, so each browser session keeps its own state.

mod query;
mod render;
mod server;
pub mod templates;

pub use query::{FilterParams, to_query};
pub use render::{
    html_escape, render_filters, render_kpis, render_page, render_projects, render_selection,
    render_tasks,
};
pub use server::{
    DashboardHandle, DashboardServer, build_router, start_server,
    start_server_with_retry,
};
