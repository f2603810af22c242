pub mod consolidator;
pub mod host;
pub mod memory;
pub mod naming;
pub mod references;
pub mod report;
pub mod run;
pub mod scanner;
pub mod signature;
pub mod sweeper;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable identity of a project item, assigned by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Fill color, each channel in [0, 1]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [f64; 3]);

/// Visual properties of a synthetic color-fill source
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SyntheticSource {
    pub color: Rgb,
    pub width: u32,
    pub height: u32,
    #[serde(default = "square_pixels")]
    pub pixel_aspect: f64,
}

fn square_pixels() -> f64 {
    1.0
}

/// Synthetic asset as read from the project at scan time
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AssetItem {
    pub id: ItemId,
    pub name: String,
    pub source: SyntheticSource,
    pub parent: ItemId,
}

/// Kind of synthetic asset, derived from the display name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "SOLID")]
    Solid,
    #[serde(rename = "NULL")]
    Null,
    #[serde(rename = "ADJ")]
    Adjustment,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Solid => "SOLID",
            Category::Null => "NULL",
            Category::Adjustment => "ADJ",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A layer in a composition that uses an item as its source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Consumer {
    pub composition: ItemId,
    pub layer_index: usize,
}
