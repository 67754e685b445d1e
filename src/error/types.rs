use thiserror::Error;

use crate::gesture::GestureType;
use crate::host::WidgetId;
use crate::logging::LoggingError;

/// Unified result type for the slotgrid crate.
pub type Result<T> = std::result::Result<T, PanelError>;

/// Errors surfaced by panels, icon builders and the runtime.
///
/// Action failures meant for the viewer are not errors; they travel as
/// `Option<String>` out of an action and end up as an error overlay.
#[derive(Debug, Error)]
pub enum PanelError {
    #[error("an icon can only bind one action per gesture type, conflicting: {gesture:?}")]
    GestureConflict { gesture: GestureType },
    #[error("a catch-all action must be the only action bound to an icon")]
    CatchAllConflict,
    #[error("slot {slot} is outside a panel of {size} slots")]
    SlotOutOfRange { slot: usize, size: usize },
    #[error("widget {0} is not known to the host")]
    UnknownWidget(WidgetId),
    #[error("panel {0} is not registered with the runtime")]
    UnknownPanel(u64),
    #[error("host error: {0}")]
    Host(String),
    #[error("panel handler failed: {0}")]
    Handler(String),
    #[error("panel has been torn down")]
    Closed,
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PanelError {
    /// Wrap any displayable consumer failure as a handler error.
    pub fn handler(err: impl std::fmt::Display) -> Self {
        Self::Handler(err.to_string())
    }
}
