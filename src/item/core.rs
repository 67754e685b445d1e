use std::fmt;

use serde::{Deserialize, Serialize};

/// Visual category of an item, e.g. `minecraft:barrier`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Material(String);

impl Material {
    pub const BARRIER: &'static str = "barrier";
    pub const MAGENTA_STAINED_GLASS_PANE: &'static str = "magenta_stained_glass_pane";

    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    pub fn barrier() -> Self {
        Self::new(Self::BARRIER)
    }

    pub fn key(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Material {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TextColor {
    Reset,
    White,
    Gray,
    Red,
    Gold,
    Green,
    Aqua,
}

/// A single line of item text with its formatting.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StyledText {
    pub text: String,
    pub color: TextColor,
    pub bold: bool,
}

impl StyledText {
    pub fn plain(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            color: TextColor::Reset,
            bold: false,
        }
    }

    pub fn colored(text: impl Into<String>, color: TextColor) -> Self {
        Self {
            text: text.into(),
            color,
            bold: false,
        }
    }

    pub fn bold(mut self) -> Self {
        self.bold = true;
        self
    }
}

/// Renderable unit placed into a slot.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SlotItem {
    pub material: Material,
    pub name: Option<StyledText>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub lore: Vec<StyledText>,
    pub amount: u8,
}

impl SlotItem {
    pub fn new(material: Material) -> Self {
        Self {
            material,
            name: None,
            lore: Vec::new(),
            amount: 1,
        }
    }

    pub fn of(key: impl Into<String>) -> Self {
        Self::new(Material::new(key))
    }

    pub fn with_name(mut self, name: StyledText) -> Self {
        self.name = Some(name);
        self
    }

    pub fn with_lore_line(mut self, line: StyledText) -> Self {
        self.lore.push(line);
        self
    }

    pub fn with_amount(mut self, amount: u8) -> Self {
        self.amount = amount;
        self
    }

    pub fn is_material(&self, key: &str) -> bool {
        self.material.key() == key
    }
}

/// Filler pane with a blank name, used to pad or frame a panel.
pub fn spacer() -> SlotItem {
    SlotItem::of(Material::MAGENTA_STAINED_GLASS_PANE).with_name(StyledText::plain(""))
}
