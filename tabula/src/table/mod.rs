//! Table state: columns, per-frame geometry and the interaction state that
//! survives between frames.

mod api;
mod borders;
mod channels;
mod context_menu;
mod flags;
mod header;
mod layout;
mod persist;
mod row;
mod sort;

use drawlist::{DrawListSplitter, Rect, Vec2};
use smallvec::SmallVec;

use crate::id::TableId;

pub use context_menu::{ContextMenu, ContextMenuAction, ContextMenuItem};
pub use flags::{
    BgTarget, ColumnFlags, ColumnSizing, RowFlags, SizingPolicy, SortDirection, TableFlags,
};
pub use sort::{TableColumnSortSpec, TableSortSpecs};

/// Column masks are `u64`, one bit per column.
pub const TABLE_MAX_COLUMNS: usize = 64;

pub(crate) const DRAW_CHANNEL_BG0: usize = 0;
pub(crate) const DRAW_CHANNEL_BG2_FROZEN: usize = 1;
/// First channel handed to columns.
pub(crate) const DRAW_CHANNEL_NOCLIP: usize = 2;

/// Auto-fit runs for three frames so content submitted after the first layout is measured.
pub(crate) const AUTO_FIT_QUEUE_FULL: u8 = (1 << 3) - 1;

#[derive(Debug, Clone)]
pub struct Column {
    pub flags: ColumnFlags,
    /// Resolved sizing: the declared one or the table default.
    pub sizing: ColumnSizing,
    pub name: String,
    pub user_id: u32,
    /// Width or weight passed at setup, `<= 0.0` when unspecified.
    pub init_stretch_weight_or_width: f32,

    /// Requested width for fixed columns, `< 0.0` until known.
    pub width_request: f32,
    /// Weight for stretch columns, `< 0.0` until known.
    pub stretch_weight: f32,
    /// Ideal width measured from last frame's content.
    pub width_auto: f32,
    /// Final width, excluding padding and spacing.
    pub width_given: f32,

    pub min_x: f32,
    pub max_x: f32,
    pub work_min_x: f32,
    pub work_max_x: f32,
    pub item_width: f32,
    pub clip_rect: Rect,

    pub content_max_x_frozen: f32,
    pub content_max_x_unfrozen: f32,
    pub content_max_x_headers_used: f32,
    pub content_max_x_headers_ideal: f32,

    pub display_order: usize,
    pub index_within_enabled_set: Option<usize>,
    pub prev_enabled_column: Option<usize>,
    pub next_enabled_column: Option<usize>,

    pub sort_order: Option<usize>,
    pub sort_direction: SortDirection,
    /// Directions a header click cycles through, in order.
    pub sort_directions_avail: SmallVec<[SortDirection; 3]>,

    pub draw_channel_current: usize,
    pub draw_channel_frozen: usize,
    pub draw_channel_unfrozen: usize,

    pub is_enabled: bool,
    pub is_user_enabled: bool,
    /// Pending visibility, applied at the next layout pass.
    pub is_user_enabled_next_frame: bool,
    pub is_visible_x: bool,
    pub is_visible_y: bool,
    pub is_request_output: bool,
    pub is_skip_items: bool,
    pub is_preserve_width_auto: bool,
    /// Right-most column while stretch columns exist: its border cannot be dragged.
    pub no_direct_resize: bool,

    pub auto_fit_queue: u8,
    pub cannot_skip_items_queue: u8,
}

impl Default for Column {
    fn default() -> Self {
        Self {
            flags: ColumnFlags::default(),
            sizing: ColumnSizing::Fixed,
            name: String::new(),
            user_id: 0,
            init_stretch_weight_or_width: -1.0,
            width_request: -1.0,
            stretch_weight: -1.0,
            width_auto: 0.0,
            width_given: 0.0,
            min_x: 0.0,
            max_x: 0.0,
            work_min_x: 0.0,
            work_max_x: 0.0,
            item_width: 0.0,
            clip_rect: Rect::default(),
            content_max_x_frozen: 0.0,
            content_max_x_unfrozen: 0.0,
            content_max_x_headers_used: 0.0,
            content_max_x_headers_ideal: 0.0,
            display_order: 0,
            index_within_enabled_set: None,
            prev_enabled_column: None,
            next_enabled_column: None,
            sort_order: None,
            sort_direction: SortDirection::None,
            sort_directions_avail: SmallVec::new(),
            draw_channel_current: DRAW_CHANNEL_NOCLIP,
            draw_channel_frozen: DRAW_CHANNEL_NOCLIP,
            draw_channel_unfrozen: DRAW_CHANNEL_NOCLIP,
            is_enabled: true,
            is_user_enabled: true,
            is_user_enabled_next_frame: true,
            is_visible_x: true,
            is_visible_y: true,
            is_request_output: true,
            is_skip_items: false,
            is_preserve_width_auto: false,
            no_direct_resize: false,
            auto_fit_queue: AUTO_FIT_QUEUE_FULL,
            cannot_skip_items_queue: AUTO_FIT_QUEUE_FULL,
        }
    }
}

impl Column {
    pub fn is_stretch(&self) -> bool {
        self.sizing == ColumnSizing::Stretch
    }

    pub fn is_fixed(&self) -> bool {
        self.sizing == ColumnSizing::Fixed
    }

    pub fn is_sortable(&self) -> bool {
        !self.flags.no_sort
    }
}

/// Runtime status of a column, as reported by [`crate::Context::table_get_column_flags`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnStatus {
    pub flags: ColumnFlags,
    pub is_enabled: bool,
    pub is_visible: bool,
    pub is_sorted: bool,
    pub is_hovered: bool,
}

/// Height memory carried from one frame to the next.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TableInstanceData {
    pub last_outer_height: f32,
    pub last_top_headers_row_height: f32,
    pub last_frozen_height: f32,
}

/// Border drag in progress. The snapshot restores every column on cancel.
#[derive(Debug, Clone)]
pub(crate) struct ResizeDrag {
    pub column: usize,
    pub click_offset_x: f32,
    /// `(width_request, stretch_weight)` per column, taken when the drag started.
    pub snapshot: Vec<(f32, f32)>,
}

/// Header held with the mouse button.
#[derive(Debug, Clone, Copy)]
pub(crate) struct HeaderHold {
    pub column: usize,
    pub press_x: f32,
    /// Mouse x at the previous frame, for the drag direction.
    pub last_x: f32,
    pub dragged: bool,
}

#[derive(Debug, Clone, Copy)]
pub(crate) struct CellBg {
    pub color: u32,
    pub column: usize,
}

#[derive(Debug)]
pub struct Table {
    pub id: TableId,
    pub name: String,
    pub flags: TableFlags,
    pub columns: Vec<Column>,
    pub display_order_to_index: Vec<usize>,
    pub(crate) splitter: DrawListSplitter,
    pub(crate) sort_specs: TableSortSpecs,

    pub enabled_mask_by_index: u64,
    pub enabled_mask_by_display_order: u64,
    pub visible_mask_by_index: u64,
    pub request_output_mask_by_index: u64,
    pub columns_enabled_count: usize,
    pub columns_enabled_fixed_count: usize,
    pub(crate) decl_columns_count: usize,

    /// Index into the settings store, if bound.
    pub settings_offset: Option<usize>,
    pub(crate) settings_loaded: crate::settings::SaveFlags,
    pub last_frame_active: u64,

    pub outer_rect: Rect,
    pub inner_rect: Rect,
    pub work_rect: Rect,
    pub inner_clip_rect: Rect,
    pub bg_clip_rect: Rect,
    pub bg0_clip_rect_for_draw_cmd: Rect,
    pub bg2_clip_rect_for_draw_cmd: Rect,
    pub host_clip_rect: Rect,
    pub(crate) outer_size_request: Vec2,
    pub inner_width: f32,
    /// Scroll offset of the table contents. Set through [`crate::Context::table_set_scroll`].
    pub scroll: Vec2,
    pub(crate) scroll_next: Option<Vec2>,

    pub min_column_width: f32,
    pub outer_padding_x: f32,
    pub cell_padding_x: f32,
    pub cell_padding_y: f32,
    pub cell_spacing_x1: f32,
    pub cell_spacing_x2: f32,
    pub columns_given_width: f32,
    pub columns_auto_fit_width: f32,
    pub columns_stretch_sum_weights: f32,
    pub ref_scale: f32,

    pub current_row: Option<usize>,
    pub current_column: Option<usize>,
    pub row_flags: RowFlags,
    pub(crate) last_row_flags: RowFlags,
    pub row_pos_y1: f32,
    pub row_pos_y2: f32,
    pub row_min_height: f32,
    /// Explicit row background colors for the current row, layers 0 and 1.
    pub(crate) row_bg_color: [Option<u32>; 2],
    pub(crate) row_bg_color_counter: usize,
    pub(crate) row_cell_bgs: Vec<CellBg>,
    pub(crate) cell_cursor: Vec2,
    pub(crate) cell_max_pos: Vec2,
    pub(crate) bg2_draw_channel_current: usize,
    pub(crate) bg2_draw_channel_unfrozen: usize,
    pub(crate) dummy_draw_channel: Option<usize>,

    pub freeze_rows_request: usize,
    pub freeze_rows_count: usize,
    pub freeze_columns_request: usize,
    pub freeze_columns_count: usize,

    pub left_most_enabled_column: Option<usize>,
    pub right_most_enabled_column: Option<usize>,
    pub left_most_stretched_column: Option<usize>,
    pub right_most_stretched_column: Option<usize>,
    pub hovered_column_body: Option<usize>,
    pub hovered_column_border: Option<usize>,
    /// Column being resized this frame and its requested width, applied next frame.
    pub resized_column: Option<usize>,
    pub resized_column_next_width: Option<f32>,
    pub last_resized_column: Option<usize>,
    pub auto_fit_single_column: Option<usize>,
    pub reorder_column: Option<usize>,
    pub reorder_column_dir: i8,
    pub held_header_column: Option<usize>,
    pub context_popup_column: Option<usize>,
    pub(crate) resize_drag: Option<ResizeDrag>,
    pub(crate) header_hold: Option<HeaderHold>,

    pub is_layout_locked: bool,
    pub is_inside_row: bool,
    pub is_initializing: bool,
    pub is_sort_specs_dirty: bool,
    pub is_using_headers: bool,
    pub is_context_popup_open: bool,
    pub is_settings_request_load: bool,
    pub is_settings_dirty: bool,
    pub is_default_display_order: bool,
    pub is_reset_all_request: bool,
    pub is_reset_display_order_request: bool,
    pub is_unfrozen_rows: bool,
    pub is_default_sizing_policy: bool,

    pub instance: TableInstanceData,
}

impl Table {
    pub(crate) fn new(id: TableId, name: &str, columns_count: usize) -> Self {
        let mut table = Self {
            id,
            name: name.to_string(),
            flags: TableFlags::default(),
            columns: Vec::new(),
            display_order_to_index: Vec::new(),
            splitter: DrawListSplitter::new(),
            sort_specs: TableSortSpecs::default(),
            enabled_mask_by_index: 0,
            enabled_mask_by_display_order: 0,
            visible_mask_by_index: 0,
            request_output_mask_by_index: 0,
            columns_enabled_count: 0,
            columns_enabled_fixed_count: 0,
            decl_columns_count: 0,
            settings_offset: None,
            settings_loaded: Default::default(),
            last_frame_active: 0,
            outer_rect: Rect::default(),
            inner_rect: Rect::default(),
            work_rect: Rect::default(),
            inner_clip_rect: Rect::default(),
            bg_clip_rect: Rect::default(),
            bg0_clip_rect_for_draw_cmd: Rect::default(),
            bg2_clip_rect_for_draw_cmd: Rect::default(),
            host_clip_rect: Rect::default(),
            outer_size_request: Vec2::ZERO,
            inner_width: 0.0,
            scroll: Vec2::ZERO,
            scroll_next: None,
            min_column_width: 1.0,
            outer_padding_x: 0.0,
            cell_padding_x: 0.0,
            cell_padding_y: 0.0,
            cell_spacing_x1: 0.0,
            cell_spacing_x2: 0.0,
            columns_given_width: 0.0,
            columns_auto_fit_width: 0.0,
            columns_stretch_sum_weights: 0.0,
            ref_scale: 0.0,
            current_row: None,
            current_column: None,
            row_flags: RowFlags::default(),
            last_row_flags: RowFlags::default(),
            row_pos_y1: 0.0,
            row_pos_y2: 0.0,
            row_min_height: 0.0,
            row_bg_color: [None; 2],
            row_bg_color_counter: 0,
            row_cell_bgs: Vec::new(),
            cell_cursor: Vec2::ZERO,
            cell_max_pos: Vec2::ZERO,
            bg2_draw_channel_current: DRAW_CHANNEL_BG2_FROZEN,
            bg2_draw_channel_unfrozen: DRAW_CHANNEL_BG2_FROZEN,
            dummy_draw_channel: None,
            freeze_rows_request: 0,
            freeze_rows_count: 0,
            freeze_columns_request: 0,
            freeze_columns_count: 0,
            left_most_enabled_column: None,
            right_most_enabled_column: None,
            left_most_stretched_column: None,
            right_most_stretched_column: None,
            hovered_column_body: None,
            hovered_column_border: None,
            resized_column: None,
            resized_column_next_width: None,
            last_resized_column: None,
            auto_fit_single_column: None,
            reorder_column: None,
            reorder_column_dir: 0,
            held_header_column: None,
            context_popup_column: None,
            resize_drag: None,
            header_hold: None,
            is_layout_locked: false,
            is_inside_row: false,
            is_initializing: true,
            is_sort_specs_dirty: true,
            is_using_headers: false,
            is_context_popup_open: false,
            is_settings_request_load: true,
            is_settings_dirty: false,
            is_default_display_order: true,
            is_reset_all_request: false,
            is_reset_display_order_request: false,
            is_unfrozen_rows: true,
            is_default_sizing_policy: true,
            instance: TableInstanceData::default(),
        };
        table.init_columns(columns_count);
        table
    }

    /// Resize the column array, keeping existing columns and re-validating display order.
    pub(crate) fn init_columns(&mut self, columns_count: usize) {
        assert!(
            columns_count > 0 && columns_count <= TABLE_MAX_COLUMNS,
            "table needs 1..={TABLE_MAX_COLUMNS} columns, got {columns_count}"
        );
        let old_count = self.columns.len();
        self.columns.truncate(columns_count);
        for n in old_count..columns_count {
            self.columns.push(Column {
                display_order: n,
                ..Column::default()
            });
        }

        let mut mask = 0u64;
        let valid = self.columns.iter().all(|c| {
            let ok = c.display_order < columns_count && mask & (1 << c.display_order) == 0;
            if ok {
                mask |= 1 << c.display_order;
            }
            ok
        });
        if !valid {
            if old_count != 0 {
                log::warn!(
                    "table {}: display order invalid after column count change, resetting",
                    self.id
                );
            }
            for (n, column) in self.columns.iter_mut().enumerate() {
                column.display_order = n;
            }
        }
        self.rebuild_display_order_index();
        self.is_default_display_order = self
            .display_order_to_index
            .iter()
            .enumerate()
            .all(|(order, &n)| order == n);

        if old_count != 0 && old_count != columns_count {
            log::debug!(
                "table {}: column count {} -> {}",
                self.id,
                old_count,
                columns_count
            );
            self.is_initializing = true;
            self.is_settings_request_load = true;
            self.is_sort_specs_dirty = true;
        }
    }

    pub(crate) fn rebuild_display_order_index(&mut self) {
        self.display_order_to_index = vec![0; self.columns.len()];
        for (n, column) in self.columns.iter().enumerate() {
            self.display_order_to_index[column.display_order] = n;
        }
    }

    pub fn columns_count(&self) -> usize {
        self.columns.len()
    }

    pub fn column(&self, n: usize) -> &Column {
        &self.columns[n]
    }

    /// Column at visual position `order`.
    pub fn column_by_display_order(&self, order: usize) -> &Column {
        &self.columns[self.display_order_to_index[order]]
    }

    /// Columns that will be enabled at the next layout, counting hides
    /// queued this frame.
    pub(crate) fn columns_enabled_next_frame(&self) -> usize {
        self.columns
            .iter()
            .filter(|c| c.is_user_enabled_next_frame && !c.flags.disabled)
            .count()
    }

    /// Whether hiding `column_n` would leave no enabled column.
    pub(crate) fn is_last_enabled_column(&self, column_n: usize) -> bool {
        let column = &self.columns[column_n];
        column.is_user_enabled_next_frame
            && !column.flags.disabled
            && self.columns_enabled_next_frame() <= 1
    }

    /// Queue a visibility change for the next layout. Refused when the column
    /// cannot be hidden or is the last one enabled.
    pub(crate) fn set_column_enabled(&mut self, column_n: usize, enabled: bool) -> bool {
        let column = &self.columns[column_n];
        if !enabled && (!self.flags.hideable || column.flags.no_hide) {
            log::warn!("table {}: column {} cannot be hidden, ignoring", self.id, column_n);
            return false;
        }
        if !enabled && self.is_last_enabled_column(column_n) {
            log::warn!("table {}: column {} is the last one enabled, ignoring", self.id, column_n);
            return false;
        }
        self.columns[column_n].is_user_enabled_next_frame = enabled;
        true
    }

    pub(crate) fn check_column_index(&self, n: usize) {
        assert!(
            n < self.columns.len(),
            "column index {n} out of range for table {} with {} columns",
            self.id,
            self.columns.len()
        );
    }

    /// Background rect of a cell in the current row.
    pub fn cell_bg_rect(&self, column_n: usize) -> Rect {
        let column = &self.columns[column_n];
        let mut x1 = column.min_x;
        let mut x2 = column.max_x;
        if column.prev_enabled_column.is_none() {
            x1 -= self.outer_padding_x;
        }
        if column.next_enabled_column.is_none() {
            x2 += self.outer_padding_x;
        }
        x1 = x1.max(self.work_rect.min.x);
        x2 = x2.min(self.work_rect.max.x);
        Rect::new(x1, self.row_pos_y1, x2, self.row_pos_y2)
    }

    /// Area reacting to the mouse. Auto-height tables only know their height
    /// at the end, so last frame's height stands in.
    pub(crate) fn mouse_hit_rect(&self) -> Rect {
        let outer = self.outer_rect;
        Rect::new(
            outer.min.x,
            outer.min.y,
            outer.max.x,
            outer.max.y.max(outer.min.y + self.instance.last_outer_height),
        )
    }

    pub fn sort_specs_dirty(&self) -> bool {
        self.is_sort_specs_dirty
    }
}

pub(crate) fn mask_has(mask: u64, bit: usize) -> bool {
    bit < TABLE_MAX_COLUMNS && mask & (1u64 << bit) != 0
}
