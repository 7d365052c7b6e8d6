//! Immediate-mode table core
//!
//! Column width resolution, per-column draw channels, header sorting and
//! persisted column settings for tables submitted every frame.

pub mod error;
pub mod settings;
pub mod table;

mod context;
mod id;
mod input;
mod style;

pub use context::Context;
pub use error::SettingsError;
pub use id::TableId;
pub use input::InputState;
pub use style::{Style, TableColors};
pub use table::{
    BgTarget, Column, ColumnFlags, ColumnSizing, ColumnStatus, ContextMenu, ContextMenuAction,
    ContextMenuItem, RowFlags, SizingPolicy, SortDirection, Table, TableColumnSortSpec, TableFlags,
    TableSortSpecs, TABLE_MAX_COLUMNS,
};

pub use drawlist;
