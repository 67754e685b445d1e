//! Slot-grid panels: interactive menus laid out on a fixed grid of item
//! slots inside a host that owns the real containers.
//!
//! A panel keeps a shadow copy of its slots, binds gesture-specific actions
//! to icons, shows timed error overlays when an action fails, and refreshes
//! itself on a tick schedule. The host is reached only through the
//! [`Host`] trait; [`SimHost`] is an in-memory implementation for tests and
//! demos.

pub mod buffer;
pub mod error;
pub mod gesture;
pub mod host;
pub mod icon;
pub mod item;
pub mod layout;
pub mod logging;
pub mod metrics;
pub mod overlay;
pub mod registry;
pub mod render;
pub mod runtime;
pub mod width;

pub use buffer::{CommitReport, PanelBuffer};
pub use error::{PanelError, Result};
pub use gesture::{GestureSet, GestureType, RawAction, gesture_set};
pub use host::{
    ClickEvent, ClickTarget, CloseEvent, DragEvent, Host, HostEvent, SimHost, SlotContents,
    SlotIndex, SoundCue, Subscription, ViewerId, WidgetId,
};
pub use icon::{ActionFn, Binding, Icon, IconBuilder, action};
pub use item::{Material, SlotItem, StyledText, TextColor, spacer};
pub use layout::grid::{SlotGrid, inv_size_for_count};
pub use logging::{
    FileSink, LogEvent, LogFields, LogLevel, LogSink, Logger, LoggingError, LoggingResult,
    MemorySink,
};
pub use metrics::{MetricSnapshot, PanelMetrics};
pub use overlay::ErrorOverlay;
pub use registry::SlotRegistry;
pub use render::wrap_words;
pub use runtime::audit::{
    NullPanelAudit, PanelAudit, PanelAuditEvent, PanelAuditEventBuilder, PanelAuditStage,
    RecordingAudit,
};
pub use runtime::{
    Dispatch, Lifecycle, Panel, PanelCommand, PanelConfig, PanelContext, PanelDriver, PanelHandle,
    PanelHandler, PanelId, PanelRuntime, PanelSettings, RefreshMode, RefreshTask, RouteOutcome,
    RuntimeConfig,
};
pub use width::display_width;
