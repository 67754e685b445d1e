//! Timed error overlays shown in place of an icon after a failed action.

use serde::Serialize;

use crate::item::{Material, SlotItem, StyledText, TextColor};

/// How long an overlay stays visible.
pub const DEFAULT_ERROR_DURATION_MS: i64 = 3000;

/// Title used for overlays raised by failing actions.
pub const DEFAULT_ERROR_TITLE: &str = "Uh oh!";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorOverlay {
    pub title: String,
    pub subtitle_lines: Vec<String>,
    pub expires_at_epoch_ms: i64,
}

impl ErrorOverlay {
    pub fn new(title: impl Into<String>, subtitle_lines: Vec<String>, expires_at_epoch_ms: i64) -> Self {
        Self {
            title: title.into(),
            subtitle_lines,
            expires_at_epoch_ms,
        }
    }

    /// Overlay expiring `duration_ms` after `now_ms`.
    pub fn starting_at(
        title: impl Into<String>,
        subtitle_lines: Vec<String>,
        now_ms: i64,
        duration_ms: i64,
    ) -> Self {
        Self::new(title, subtitle_lines, now_ms.saturating_add(duration_ms))
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_epoch_ms
    }

    /// Barrier item with a bold red title and one white lore line per subtitle line.
    pub fn to_item(&self) -> SlotItem {
        let mut item = SlotItem::new(Material::barrier())
            .with_name(StyledText::colored(self.title.clone(), TextColor::Red).bold());
        for line in &self.subtitle_lines {
            item = item.with_lore_line(StyledText::colored(line.clone(), TextColor::White));
        }
        item
    }
}
