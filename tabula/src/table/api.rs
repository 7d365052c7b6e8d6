//! Table calls on [`Context`]. Everything except `begin_table*` acts on the
//! table between the innermost `begin_table` and its `end_table`.

use drawlist::{Rect, Vec2};

use super::flags::{BgTarget, ColumnFlags, ColumnSizing, RowFlags, SizingPolicy, SortDirection, TableFlags};
use super::{ColumnStatus, ContextMenu, ContextMenuAction, Table, TableSortSpecs, TABLE_MAX_COLUMNS};
use crate::context::Context;
use crate::id::TableId;

/// `0` takes the available size, a negative value leaves that much free.
fn resolve_size(request: f32, avail: f32) -> f32 {
    if request == 0.0 {
        avail.max(1.0)
    } else if request < 0.0 {
        (avail + request).max(4.0)
    } else {
        request
    }
}

impl Context {
    pub fn begin_table(&mut self, name: &str, columns_count: usize, flags: TableFlags) -> bool {
        self.begin_table_ex(name, columns_count, flags, Vec2::ZERO, 0.0)
    }

    /// Begin submitting a table at the layout cursor.
    ///
    /// `outer_size` components of `0` take the available space (height grows
    /// with the rows unless `scroll_y`), negative ones leave that much free.
    /// `inner_width` sets the scrollable width with `scroll_x`.
    ///
    /// Returns false when the table is entirely clipped; `end_table` must then
    /// not be called.
    pub fn begin_table_ex(
        &mut self,
        name: &str,
        columns_count: usize,
        flags: TableFlags,
        outer_size: Vec2,
        inner_width: f32,
    ) -> bool {
        assert!(
            columns_count > 0 && columns_count <= TABLE_MAX_COLUMNS,
            "begin_table() needs 1..={TABLE_MAX_COLUMNS} columns, got {columns_count}"
        );
        let seed = self.table_stack.last().map_or(TableId::NONE, |t| t.id);
        let id = TableId::from_name(name, seed);
        assert!(
            self.table_stack.iter().all(|t| t.id != id),
            "table {id} ({name:?}) begun twice in the same frame"
        );

        let is_default_sizing_policy = flags.sizing.is_none();
        let flags = flags.resolved();
        let avail = self.display_rect.max - self.cursor;
        let auto_height = outer_size.y == 0.0 && !flags.scroll_y;
        let size = Vec2::new(
            resolve_size(outer_size.x, avail.x),
            if auto_height {
                0.0
            } else {
                resolve_size(outer_size.y, avail.y)
            },
        );
        let outer_rect = Rect::from_pos_size(self.cursor, size);
        let host_clip_rect = self.draw_list.clip_rect();

        let visible = outer_rect.min.x < host_clip_rect.max.x
            && outer_rect.max.x > host_clip_rect.min.x
            && outer_rect.min.y < host_clip_rect.max.y
            && (auto_height || outer_rect.max.y > host_clip_rect.min.y);
        if !visible {
            log::trace!("table {id}: clipped, skipped");
            self.cursor.y = outer_rect.max.y + self.style.item_spacing.y;
            return false;
        }

        let mut table = match self.tables.remove(&id) {
            Some(table) => table,
            None => {
                log::debug!("table {id}: created {name:?} with {columns_count} columns");
                Table::new(id, name, columns_count)
            }
        };
        if table.columns.len() != columns_count {
            table.init_columns(columns_count);
        }
        if table.flags.reorderable && !flags.reorderable {
            table.is_reset_display_order_request = true;
        }
        if table.name != name {
            table.name = name.to_string();
        }
        table.flags = flags;
        table.is_default_sizing_policy = is_default_sizing_policy;
        table.outer_size_request = outer_size;
        table.inner_width = inner_width;
        table.last_frame_active = self.frame_count;

        // Rects.
        table.host_clip_rect = host_clip_rect;
        table.outer_rect = outer_rect;
        table.inner_rect = outer_rect;
        let mut work_rect = outer_rect;
        if flags.scroll_x {
            let width = if inner_width > 0.0 {
                inner_width
            } else {
                outer_rect.width().max(table.columns_auto_fit_width)
            };
            work_rect.min.x -= table.scroll.x;
            work_rect.max.x = work_rect.min.x + width;
        }
        if flags.scroll_y {
            work_rect.min.y -= table.scroll.y;
        }
        table.work_rect = work_rect;
        let mut inner_clip_rect = if flags.scroll_x || flags.scroll_y {
            outer_rect
        } else {
            work_rect
        }
        .clip_with(&work_rect)
        .clip_with(&host_clip_rect);
        inner_clip_rect.max.y = if flags.scroll_y {
            outer_rect.max.y.min(host_clip_rect.max.y)
        } else {
            host_clip_rect.max.y
        };
        table.inner_clip_rect = inner_clip_rect;

        // Spacing and padding.
        let style = &self.style;
        let pad_outer_x = if flags.no_pad_outer_x {
            false
        } else if flags.pad_outer_x {
            true
        } else {
            flags.borders_outer_v
        };
        let pad_inner_x = !flags.no_pad_inner_x;
        let inner_spacing_for_border = if flags.borders_inner_v {
            style.border_size
        } else {
            0.0
        };
        let inner_spacing_explicit = if pad_inner_x && !flags.borders_inner_v {
            style.cell_padding.x
        } else {
            0.0
        };
        let inner_padding_explicit = if pad_inner_x && flags.borders_inner_v {
            style.cell_padding.x
        } else {
            0.0
        };
        table.cell_spacing_x1 = inner_spacing_explicit + inner_spacing_for_border;
        table.cell_spacing_x2 = inner_spacing_explicit;
        table.cell_padding_x = inner_padding_explicit;
        table.cell_padding_y = style.cell_padding.y;
        let outer_padding_for_border = if flags.borders_outer_v {
            style.border_size
        } else {
            0.0
        };
        let outer_padding_explicit = if pad_outer_x { style.cell_padding.x } else { 0.0 };
        table.outer_padding_x = outer_padding_for_border + outer_padding_explicit - table.cell_padding_x;

        table.freeze_rows_request = 0;
        table.freeze_rows_count = 0;
        table.freeze_columns_request = 0;
        table.freeze_columns_count = 0;
        table.is_unfrozen_rows = true;

        if table.is_reset_all_request {
            table.reset_settings();
        }
        if table.is_initializing {
            table.settings_offset = None;
            table.is_sort_specs_dirty = true;
            table.context_popup_column = None;
            table.reorder_column = None;
            table.resized_column = None;
            table.last_resized_column = None;
            table.auto_fit_single_column = None;
            table.hovered_column_body = None;
            table.hovered_column_border = None;
        }
        if table.is_settings_request_load {
            table.load_settings(&mut self.settings);
        }

        // Widths follow the font size.
        let line_height = self.measure.line_height();
        if table.ref_scale != 0.0 && table.ref_scale != line_height {
            let scale = line_height / table.ref_scale;
            log::debug!("table {id}: rescaling widths by {scale}");
            for column in &mut table.columns {
                column.width_request *= scale;
            }
        }
        table.ref_scale = line_height;

        table.begin_apply_requests();
        if let Some(scroll) = table.scroll_next.take() {
            table.scroll = Vec2::new(scroll.x.max(0.0), scroll.y.max(0.0));
        }

        table.decl_columns_count = 0;
        table.current_row = None;
        table.current_column = None;
        table.is_layout_locked = false;
        table.is_inside_row = false;
        table.is_using_headers = false;
        table.row_pos_y1 = table.work_rect.min.y;
        table.row_pos_y2 = table.work_rect.min.y;
        table.row_bg_color_counter = 0;
        table.row_flags = RowFlags::default();
        table.last_row_flags = RowFlags::default();

        self.draw_list
            .push_clip_rect(inner_clip_rect.min, inner_clip_rect.max, false);
        self.table_stack.push(table);
        true
    }

    /// Declare the next column. Call once per column before the first row.
    pub fn table_setup_column(
        &mut self,
        label: &str,
        flags: ColumnFlags,
        init_width_or_weight: f32,
        user_id: u32,
    ) {
        let (table, _, _) = self.current();
        assert!(
            !table.is_layout_locked,
            "table_setup_column() after the first row of table {}",
            table.id
        );
        let column_n = table.decl_columns_count;
        assert!(
            column_n < table.columns.len(),
            "table_setup_column() called more than {} times",
            table.columns.len()
        );
        table.decl_columns_count += 1;

        let mut flags = flags;
        let policy = table.flags.policy();
        if flags.sizing.is_none() && init_width_or_weight > 0.0 {
            if table.is_default_sizing_policy && !table.flags.scroll_x {
                log::warn!(
                    "table {}: column {} given width/weight {} without an explicit sizing policy",
                    table.id,
                    column_n,
                    init_width_or_weight
                );
            }
            if matches!(policy, SizingPolicy::FixedFit | SizingPolicy::FixedSame) {
                flags.sizing = Some(ColumnSizing::Fixed);
            }
        }
        table.setup_column_flags(column_n, flags);

        let is_initializing = table.is_initializing;
        let settings_loaded = table.settings_loaded;
        let hideable = table.flags.hideable;
        let column = &mut table.columns[column_n];
        column.user_id = user_id;
        column.init_stretch_weight_or_width = init_width_or_weight;
        if is_initializing {
            if column.width_request < 0.0 && column.stretch_weight < 0.0 {
                if column.is_fixed() && init_width_or_weight > 0.0 {
                    column.width_request = init_width_or_weight;
                }
                if column.is_stretch() {
                    column.stretch_weight = if init_width_or_weight > 0.0 {
                        init_width_or_weight
                    } else {
                        -1.0
                    };
                }
                if init_width_or_weight > 0.0 {
                    column.auto_fit_queue = 0;
                }
            }
            if column.flags.default_hide && !(hideable && settings_loaded.visible) {
                column.is_user_enabled = false;
                column.is_user_enabled_next_frame = false;
            }
            if column.flags.default_sort && !settings_loaded.sort {
                column.sort_order = Some(0);
                column.sort_direction = if column.flags.prefer_sort_descending {
                    SortDirection::Descending
                } else {
                    SortDirection::Ascending
                };
                table.is_sort_specs_dirty = true;
            }
        }

        let column = &mut table.columns[column_n];
        if column.name != label {
            column.name = label.to_string();
        }
    }

    /// Keep the first `columns` columns and `rows` rows in place while
    /// scrolling. Only effective on the matching scroll axis, and only once
    /// that axis is scrolled away from 0.
    pub fn table_setup_scroll_freeze(&mut self, columns: usize, rows: usize) {
        let (table, _, _) = self.current();
        assert!(
            !table.is_layout_locked,
            "table_setup_scroll_freeze() after the first row of table {}",
            table.id
        );
        let count = table.columns.len();
        table.freeze_columns_request = if table.flags.scroll_x {
            columns.min(count)
        } else {
            0
        };
        table.freeze_columns_count = if table.scroll.x != 0.0 {
            table.freeze_columns_request
        } else {
            0
        };
        table.freeze_rows_request = if table.flags.scroll_y { rows } else { 0 };
        table.freeze_rows_count = if table.scroll.y != 0.0 {
            table.freeze_rows_request
        } else {
            0
        };
        table.is_unfrozen_rows = table.freeze_rows_count == 0;

        // Frozen columns stay in the frozen section of the display order.
        let request = table.freeze_columns_request;
        for column_n in 0..request {
            if table.columns[column_n].display_order < request {
                continue;
            }
            let other = (request..count).find(|&n| table.columns[n].display_order < request);
            if let Some(other_n) = other {
                let order = table.columns[column_n].display_order;
                table.columns[column_n].display_order = table.columns[other_n].display_order;
                table.columns[other_n].display_order = order;
            }
        }
        table.rebuild_display_order_index();
    }

    /// Finish the table: draw borders, merge channels, handle resizing and
    /// save settings if they changed.
    pub fn end_table(&mut self) {
        let mut saved = false;
        {
            let (table, mut f, settings) = self.current();
            if !table.is_layout_locked {
                table.update_layout(&mut f);
            }
            if table.is_inside_row {
                table.end_row(&mut f);
            }

            if table.flags.context_menu_in_body && f.io.mouse_right_clicked {
                if let Some(column_n) = table.hovered_column_body {
                    let header_height = table.instance.last_top_headers_row_height;
                    if f.io.mouse_pos.y >= table.work_rect.min.y + header_height {
                        table.open_context_menu(Some(column_n));
                    }
                }
            }

            if !table.flags.scroll_y {
                let max_y = table.outer_rect.max.y.max(table.row_pos_y2);
                table.outer_rect.max.y = max_y;
                table.inner_rect.max.y = max_y;
                table.work_rect.max.y = table.work_rect.max.y.max(max_y);
            }
            table.instance.last_outer_height = table.outer_rect.height();

            let flags = table.flags;
            if flags.borders_inner_v || flags.borders_outer_v || flags.borders_inner_h || flags.borders_outer_h {
                table.draw_borders(&mut f);
            }

            table.splitter.set_current_channel(f.draw_list, 0);
            if !flags.no_clip {
                table.merge_draw_channels();
            }
            table.splitter.merge(f.draw_list);

            // Width a horizontally scrolling table needs to show every column at its ideal size.
            let enabled = table.columns_enabled_count;
            let mut auto_fit_width = table.outer_padding_x * 2.0
                + (table.cell_spacing_x1 + table.cell_spacing_x2) * enabled.saturating_sub(1) as f32
                + table.cell_padding_x * 2.0 * enabled as f32;
            for column_n in 0..table.columns.len() {
                if table.enabled_mask_by_index & (1u64 << column_n) == 0 {
                    continue;
                }
                let column = &table.columns[column_n];
                auto_fit_width += if column.is_fixed() && !column.flags.no_resize {
                    column.width_request
                } else {
                    table.column_width_auto(column_n)
                };
            }
            table.columns_auto_fit_width = auto_fit_width;

            table.update_resize_drag(&f);
            if !f.io.mouse_down {
                table.header_hold = None;
            }

            f.draw_list.pop_clip_rect();

            if table.is_settings_dirty && !flags.no_saved_settings {
                table.save_settings(settings);
                saved = true;
            }
            table.is_initializing = false;
        }

        let Some(table) = self.table_stack.pop() else {
            return;
        };
        self.cursor.y = table.outer_rect.max.y + self.style.item_spacing.y;
        self.tables.insert(table.id, table);
        if saved {
            self.mark_settings_dirty();
        }
    }

    /// Start a new row with default height.
    pub fn table_next_row(&mut self) {
        self.table_next_row_ex(RowFlags::default(), 0.0);
    }

    pub fn table_next_row_ex(&mut self, row_flags: RowFlags, min_row_height: f32) {
        let (table, mut f, _) = self.current();
        table.next_row(&mut f, row_flags, min_row_height);
    }

    /// Move to the next cell, wrapping to a new row after the last column.
    /// Returns false when the cell is not visible and its content can be skipped.
    pub fn table_next_column(&mut self) -> bool {
        let (table, mut f, _) = self.current();
        table.next_column(&mut f)
    }

    pub fn table_set_column_index(&mut self, column_n: usize) -> bool {
        let (table, mut f, _) = self.current();
        table.set_column_index(&mut f, column_n)
    }

    /// A row of headers using the names given to `table_setup_column`.
    pub fn table_headers_row(&mut self) {
        let (table, mut f, _) = self.current();
        table.headers_row(&mut f);
    }

    /// A header cell in the current column, for custom header rows.
    pub fn table_header(&mut self, label: &str) {
        let (table, mut f, _) = self.current();
        table.header(&mut f, label);
    }

    /// A line of text in the current cell.
    pub fn table_text(&mut self, text: &str) {
        let (table, mut f, _) = self.current();
        table.text(&mut f, text);
    }

    /// Reserve space in the current cell for a custom item.
    pub fn table_item_size(&mut self, size: Vec2) {
        let (table, f, _) = self.current();
        assert!(
            table.current_column.is_some(),
            "table_item_size() outside a cell, call table_next_column() first"
        );
        table.item_size(&f, size);
    }

    /// Current sort, rebuilt if anything changed. `None` unless the table is sortable.
    ///
    /// Check `specs_dirty`, sort your data, then clear it.
    pub fn table_get_sort_specs(&mut self) -> Option<&mut TableSortSpecs> {
        let (table, mut f, _) = self.current();
        if !table.flags.sortable {
            return None;
        }
        if !table.is_layout_locked {
            table.update_layout(&mut f);
        }
        table.sort_specs_build();
        Some(&mut table.sort_specs)
    }

    pub fn table_set_column_sort_direction(&mut self, column_n: usize, direction: SortDirection, append: bool) {
        let (table, _, _) = self.current();
        table.set_column_sort_direction(column_n, direction, append);
    }

    /// Resize a column. Applied at the next frame, like a border drag.
    pub fn table_set_column_width(&mut self, column_n: usize, width: f32) {
        let (table, _, _) = self.current();
        table.check_column_index(column_n);
        table.resized_column = Some(column_n);
        table.resized_column_next_width = Some(width);
    }

    pub fn table_set_column_width_auto_single(&mut self, column_n: usize) {
        let (table, _, _) = self.current();
        table.set_column_width_auto_single(column_n);
    }

    pub fn table_set_column_width_auto_all(&mut self) {
        let (table, _, _) = self.current();
        table.set_column_width_auto_all();
    }

    /// Show or hide a column from the next frame. Needs a hideable table, and
    /// the last enabled column stays enabled. Returns whether the change was
    /// queued.
    pub fn table_set_column_enabled(&mut self, column_n: usize, enabled: bool) -> bool {
        let (table, _, _) = self.current();
        table.check_column_index(column_n);
        table.set_column_enabled(column_n, enabled)
    }

    /// Move a column one slot left (`dir < 0`) or right at the next frame.
    pub fn table_queue_reorder(&mut self, column_n: usize, dir: i8) -> bool {
        let (table, _, _) = self.current();
        table.queue_reorder(column_n, dir)
    }

    pub fn table_open_context_menu(&mut self, column_n: Option<usize>) {
        let (table, _, _) = self.current();
        if let Some(n) = column_n {
            table.check_column_index(n);
        }
        table.open_context_menu(column_n);
    }

    /// Items of the open context menu, for the host to render.
    pub fn table_context_menu(&mut self) -> Option<ContextMenu> {
        let (table, _, _) = self.current();
        table.context_menu()
    }

    /// Run a menu item and close the menu. Returns false for disabled items.
    pub fn table_context_menu_activate(&mut self, action: ContextMenuAction) -> bool {
        let (table, _, _) = self.current();
        table.context_menu_activate(action)
    }

    pub fn table_close_context_menu(&mut self) {
        let (table, _, _) = self.current();
        table.close_context_menu();
    }

    pub fn table_get_column_count(&self) -> usize {
        self.current_table().map_or(0, |t| t.columns.len())
    }

    pub fn table_get_column_index(&self) -> Option<usize> {
        self.current_table().and_then(|t| t.current_column)
    }

    pub fn table_get_row_index(&self) -> Option<usize> {
        self.current_table().and_then(|t| t.current_row)
    }

    /// Name of `column_n`, or of the current column when `None`.
    pub fn table_get_column_name(&self, column_n: Option<usize>) -> &str {
        let Some(table) = self.current_table() else {
            return "";
        };
        column_n
            .or(table.current_column)
            .and_then(|n| table.columns.get(n))
            .map_or("", |c| c.name.as_str())
    }

    /// Declared flags and runtime state of `column_n`, or of the current column.
    pub fn table_get_column_flags(&self, column_n: Option<usize>) -> ColumnStatus {
        let Some(table) = self.current_table() else {
            return ColumnStatus::default();
        };
        let Some(n) = column_n.or(table.current_column) else {
            return ColumnStatus::default();
        };
        let Some(column) = table.columns.get(n) else {
            return ColumnStatus::default();
        };
        ColumnStatus {
            flags: column.flags,
            is_enabled: column.is_enabled,
            is_visible: column.is_visible_x && column.is_visible_y,
            is_sorted: column.sort_order.is_some(),
            is_hovered: table.hovered_column_body == Some(n),
        }
    }

    /// Background for the current row, or for a cell of it with `BgTarget::CellBg`.
    pub fn table_set_bg_color(&mut self, target: BgTarget, color: u32, column_n: Option<usize>) {
        let (table, _, _) = self.current();
        assert!(
            table.is_inside_row,
            "table_set_bg_color() outside a row, call table_next_row() first"
        );
        table.set_bg_color(target, color, column_n);
    }

    /// Scroll position applied at the next begin.
    pub fn table_set_scroll(&mut self, scroll: Vec2) {
        let (table, _, _) = self.current();
        table.scroll_next = Some(scroll);
    }

    /// Return widths, order, visibility and sort to their declared defaults at the next frame.
    pub fn table_reset_settings(&mut self) {
        let (table, _, _) = self.current();
        table.is_reset_all_request = true;
    }

    /// The table being submitted.
    pub fn table_current(&self) -> Option<&Table> {
        self.current_table()
    }
}
