//! Sizes and colors used by tables.

use drawlist::Vec2;
use serde::{Deserialize, Serialize};

/// Table styling. Every field has a default, so partial configuration files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Padding inside each cell.
    pub cell_padding: Vec2,
    pub item_spacing: Vec2,
    /// Padding of framed widgets; its x also sets the minimum column width.
    pub frame_padding: Vec2,
    pub border_size: f32,
    /// Half width of the grab area around a column border.
    pub resize_hit_half_width: f32,
    /// Horizontal mouse travel before a held header starts reordering.
    pub drag_threshold: f32,
    /// Delay between the first settings change and the ini becoming due for saving.
    pub settings_save_delay_secs: f32,
    pub colors: TableColors,
}

/// Colors packed as `0xAABBGGRR`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableColors {
    pub text: u32,
    pub header_bg: u32,
    pub header_hovered: u32,
    pub header_active: u32,
    pub border_strong: u32,
    pub border_light: u32,
    pub border_held: u32,
    pub border_hovered: u32,
    pub row_bg: u32,
    pub row_bg_alt: u32,
    pub column_hovered: u32,
}

impl Default for TableColors {
    fn default() -> Self {
        Self {
            text: 0xFFFF_FFFF,
            header_bg: 0xFF33_3030,
            header_hovered: 0xCC87_5A42,
            header_active: 0xFFFA_9642,
            border_strong: 0xFF59_4F4F,
            border_light: 0xFF40_3B3B,
            border_held: 0xFFFA_9642,
            border_hovered: 0xC7FA_9642,
            row_bg: 0x0000_0000,
            row_bg_alt: 0x0FFF_FFFF,
            column_hovered: 0x1FFA_9642,
        }
    }
}

impl Default for Style {
    fn default() -> Self {
        Self {
            cell_padding: Vec2::new(4.0, 2.0),
            item_spacing: Vec2::new(8.0, 4.0),
            frame_padding: Vec2::new(4.0, 3.0),
            border_size: 1.0,
            resize_hit_half_width: 4.0,
            drag_threshold: 6.0,
            settings_save_delay_secs: 5.0,
            colors: TableColors::default(),
        }
    }
}

impl Style {
    pub fn min_column_width(&self) -> f32 {
        self.frame_padding.x.max(1.0)
    }

    pub fn with_cell_padding(mut self, x: f32, y: f32) -> Self {
        self.cell_padding = Vec2::new(x, y);
        self
    }

    pub fn with_frame_padding(mut self, x: f32, y: f32) -> Self {
        self.frame_padding = Vec2::new(x, y);
        self
    }
}
