//! Configuration-driven table engine
//!
//! Renders, filters, sorts, paginates, selects, mutates and exports any
//! collection of rows described by a declarative [`config::TableConfig`].
//! The derived view is always a pure function of the raw rows, the config,
//! the UI state and the caller's roles.

pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod export;
pub mod model;
pub mod notice;
pub mod selection;
pub mod source;
pub mod state;
pub mod view;

pub use controller::TableController;
pub use controller::TableControllerBuilder;
pub use error::Error;
