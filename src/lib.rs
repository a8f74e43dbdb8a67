//! Client for the survey service: loads the CSV exports the backend
//! produces, renders them as HTML tables, triggers export regeneration and
//! validates/submits survey responses. Browser-only concerns of the
//! original panel (DOM, session storage, `fetch`) are modelled as injected
//! capabilities so the data logic runs and tests anywhere.

pub mod api;
pub mod config;
pub mod csv;
pub mod fetch;
pub mod form;
pub mod gate;
pub mod panel;
pub mod render;
pub mod session;
