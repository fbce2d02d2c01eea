//! Error types

mod accessor;
mod config;
mod dispatch;
mod export;
mod source;
mod state;

pub use accessor::*;
pub use config::*;
pub use dispatch::*;
pub use export::*;
pub use source::*;
pub use state::*;

/// Any error the engine can return to its host.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Malformed table configuration.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Rejected UI state mutation.
    #[error(transparent)]
    State(#[from] StateError),

    /// Failed or rejected action dispatch.
    #[error(transparent)]
    Dispatch(#[from] DispatchError),

    /// Failed export.
    #[error(transparent)]
    Export(#[from] ExportError),

    /// Failed dataset fetch.
    #[error(transparent)]
    Source(#[from] SourceError),
}
