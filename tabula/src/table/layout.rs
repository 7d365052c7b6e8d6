//! Column width resolution.
//!
//! Runs once per frame, at the first row or header submission. Widths are
//! resolved in passes: enabled set and links, ideal widths, requests and
//! weights, distribution of the remaining width to stretch columns, then
//! positions as a prefix sum in display order.

use drawlist::Rect;

use super::flags::{ColumnFlags, SizingPolicy};
use super::sort::available_sort_directions;
use super::{mask_has, Table, AUTO_FIT_QUEUE_FULL};
use crate::context::FrameCtx;

impl Table {
    /// Resolve the sizing and sort options of a declared column.
    pub(crate) fn setup_column_flags(&mut self, column_n: usize, mut flags: ColumnFlags) {
        if flags.sizing.is_none() {
            flags.sizing = Some(self.flags.policy().column_sizing());
        }
        if !self.flags.resizable {
            flags.no_resize = true;
        }
        if flags.no_sort_ascending && flags.no_sort_descending {
            flags.no_sort = true;
        }
        let avail = available_sort_directions(&self.flags, &flags);
        let column = &mut self.columns[column_n];
        column.sizing = flags.sizing.unwrap_or_default();
        column.flags = flags;
        column.sort_directions_avail = avail;
    }

    fn column_is_resizable(&self, column_n: usize) -> bool {
        !self.columns[column_n].flags.no_resize
    }

    /// Ideal width from last frame's content and header label.
    pub(crate) fn column_width_auto(&self, column_n: usize) -> f32 {
        let column = &self.columns[column_n];
        let content_width_body =
            column.content_max_x_frozen.max(column.content_max_x_unfrozen) - column.work_min_x;
        let content_width_headers = column.content_max_x_headers_ideal - column.work_min_x;
        let mut width_auto = content_width_body;
        if !column.flags.no_header_width {
            width_auto = width_auto.max(content_width_headers);
        }
        if column.is_fixed() && column.init_stretch_weight_or_width > 0.0 && !self.column_is_resizable(column_n) {
            width_auto = column.init_stretch_weight_or_width;
        }
        width_auto.max(self.min_column_width)
    }

    pub(crate) fn update_layout(&mut self, f: &mut FrameCtx<'_>) {
        debug_assert!(!self.is_layout_locked, "layout already resolved this frame");
        let count = self.columns.len();
        let policy = self.flags.policy();
        let io = f.io;

        self.is_default_display_order = true;
        self.columns_enabled_count = 0;
        self.enabled_mask_by_index = 0;
        self.enabled_mask_by_display_order = 0;
        self.left_most_enabled_column = None;
        self.min_column_width = f.style.min_column_width();

        // At least one column stays enabled, whatever was loaded or queued.
        if self.columns_enabled_next_frame() == 0 {
            let first = self
                .display_order_to_index
                .iter()
                .copied()
                .find(|&n| !self.columns[n].flags.disabled);
            if let Some(column_n) = first {
                log::warn!("table {}: no column enabled, showing column {}", self.id, column_n);
                self.columns[column_n].is_user_enabled_next_frame = true;
            }
        }

        // Apply pending visibility, link enabled columns in display order.
        let mut prev_enabled: Option<usize> = None;
        for order_n in 0..count {
            let column_n = self.display_order_to_index[order_n];
            if column_n != order_n {
                self.is_default_display_order = false;
            }
            if self.decl_columns_count <= column_n {
                self.setup_column_flags(column_n, ColumnFlags::default());
                let column = &mut self.columns[column_n];
                column.name.clear();
                column.user_id = 0;
                column.init_stretch_weight_or_width = -1.0;
            }

            let hideable = self.flags.hideable;
            let sort_multi = self.flags.sort_multi;
            let column = &mut self.columns[column_n];
            if !hideable || column.flags.no_hide {
                column.is_user_enabled_next_frame = true;
            }
            if column.is_user_enabled != column.is_user_enabled_next_frame {
                column.is_user_enabled = column.is_user_enabled_next_frame;
                self.is_settings_dirty = true;
            }
            column.is_enabled = column.is_user_enabled && !column.flags.disabled;

            if column.sort_order.is_some() && !column.is_enabled {
                self.is_sort_specs_dirty = true;
            }
            if column.sort_order.is_some_and(|o| o > 0) && !sort_multi {
                self.is_sort_specs_dirty = true;
            }

            let start_auto_fit = if column.is_fixed() {
                column.width_request < 0.0
            } else {
                column.stretch_weight < 0.0
            };
            if start_auto_fit {
                column.auto_fit_queue = AUTO_FIT_QUEUE_FULL;
                column.cannot_skip_items_queue = AUTO_FIT_QUEUE_FULL;
            }

            if !column.is_enabled {
                column.index_within_enabled_set = None;
                continue;
            }

            column.prev_enabled_column = prev_enabled;
            column.next_enabled_column = None;
            column.index_within_enabled_set = Some(self.columns_enabled_count);
            let display_order = column.display_order;
            match prev_enabled {
                Some(prev) => self.columns[prev].next_enabled_column = Some(column_n),
                None => self.left_most_enabled_column = Some(column_n),
            }
            self.columns_enabled_count += 1;
            self.enabled_mask_by_index |= 1u64 << column_n;
            self.enabled_mask_by_display_order |= 1u64 << display_order;
            prev_enabled = Some(column_n);
        }
        self.right_most_enabled_column = prev_enabled;

        // Ideal widths.
        let mut count_fixed = 0usize;
        let mut count_stretch = 0usize;
        let mut fixed_max_width_auto = 0.0f32;
        let mut stretch_sum_width_auto = 0.0f32;
        for column_n in 0..count {
            if !mask_has(self.enabled_mask_by_index, column_n) {
                continue;
            }
            self.columns[column_n].no_direct_resize = false;
            if !self.columns[column_n].is_preserve_width_auto {
                self.columns[column_n].width_auto = self.column_width_auto(column_n);
            }
            let column = &self.columns[column_n];
            if column.is_fixed() {
                count_fixed += 1;
                fixed_max_width_auto = fixed_max_width_auto.max(column.width_auto);
            } else {
                count_stretch += 1;
                stretch_sum_width_auto += column.width_auto;
            }
        }
        self.columns_enabled_fixed_count = count_fixed;

        // Requests and weights.
        let min_width = self.min_column_width;
        let cell_padding_x = self.cell_padding_x;
        let mut sum_width_requests = 0.0f32;
        let mut stretch_sum_weights = 0.0f32;
        self.left_most_stretched_column = None;
        self.right_most_stretched_column = None;
        for column_n in 0..count {
            if !mask_has(self.enabled_mask_by_index, column_n) {
                continue;
            }
            let resizable = self.column_is_resizable(column_n);
            let is_initializing = self.is_initializing;
            let column = &mut self.columns[column_n];

            if column.is_fixed() {
                let width_auto = if policy == SizingPolicy::FixedSame
                    && (column.auto_fit_queue != 0 || !resizable)
                {
                    fixed_max_width_auto
                } else {
                    column.width_auto
                };
                if column.auto_fit_queue != 0 || (!resizable && column.is_request_output) {
                    column.width_request = width_auto;
                }
                if column.auto_fit_queue > 0x01 && is_initializing && !column.is_preserve_width_auto {
                    column.width_request = column.width_request.max(min_width * 4.0);
                }
                sum_width_requests += column.width_request;
            } else {
                if column.auto_fit_queue != 0 || column.stretch_weight < 0.0 || !resizable {
                    column.stretch_weight = if column.init_stretch_weight_or_width > 0.0 {
                        column.init_stretch_weight_or_width
                    } else if policy == SizingPolicy::StretchProp && stretch_sum_width_auto > 0.0 {
                        (column.width_auto / stretch_sum_width_auto) * count_stretch as f32
                    } else {
                        1.0
                    };
                }
                stretch_sum_weights += column.stretch_weight;
                let order = column.display_order;
                let left = self.left_most_stretched_column;
                if left.is_none_or(|l| self.columns[l].display_order > order) {
                    self.left_most_stretched_column = Some(column_n);
                }
                let right = self.right_most_stretched_column;
                if right.is_none_or(|r| self.columns[r].display_order < order) {
                    self.right_most_stretched_column = Some(column_n);
                }
            }
            sum_width_requests += cell_padding_x * 2.0;
        }
        self.columns_stretch_sum_weights = stretch_sum_weights;

        // Give widths: fixed columns first, stretch columns share what is left.
        let enabled = self.columns_enabled_count;
        let width_spacings = self.outer_padding_x * 2.0
            + (self.cell_spacing_x1 + self.cell_spacing_x2) * enabled.saturating_sub(1) as f32;
        let width_avail = if self.flags.scroll_x && self.inner_width <= 0.0 {
            self.inner_clip_rect.width()
        } else {
            self.work_rect.width()
        }
        .max(1.0);
        let width_avail_for_stretched = width_avail - width_spacings - sum_width_requests;
        let mut width_remaining_for_stretched = width_avail_for_stretched;
        self.columns_given_width = width_spacings + cell_padding_x * 2.0 * enabled as f32;
        let has_stretch = self.left_most_stretched_column.is_some();
        for column_n in 0..count {
            if !mask_has(self.enabled_mask_by_index, column_n) {
                continue;
            }
            let column = &mut self.columns[column_n];
            if column.is_stretch() && stretch_sum_weights > 0.0 {
                let weight_ratio = column.stretch_weight / stretch_sum_weights;
                column.width_request =
                    ((width_avail_for_stretched * weight_ratio).max(min_width) + 0.01).trunc();
                width_remaining_for_stretched -= column.width_request;
            }
            if column.next_enabled_column.is_none() && has_stretch {
                column.no_direct_resize = true;
            }
            column.width_given = column.width_request.max(min_width).trunc();
            self.columns_given_width += column.width_given;
        }

        // Hand out the rounding remainder, right to left.
        if width_remaining_for_stretched >= 1.0 && !self.flags.precise_widths {
            for order_n in (0..count).rev() {
                if stretch_sum_weights <= 0.0 || width_remaining_for_stretched < 1.0 {
                    break;
                }
                if !mask_has(self.enabled_mask_by_display_order, order_n) {
                    continue;
                }
                let column = &mut self.columns[self.display_order_to_index[order_n]];
                if !column.is_stretch() {
                    continue;
                }
                column.width_request += 1.0;
                column.width_given += 1.0;
                width_remaining_for_stretched -= 1.0;
            }
        }

        // Positions, in display order.
        let is_hovering_table = io.hovering(&self.mouse_hit_rect());
        self.hovered_column_body = None;
        self.visible_mask_by_index = 0;
        self.request_output_mask_by_index = 0;
        let work_rect = self.work_rect;
        let mut host_clip_rect = self.inner_clip_rect;
        let mut offset_x = if self.freeze_columns_count > 0 {
            self.outer_rect.min.x
        } else {
            work_rect.min.x
        } + self.outer_padding_x
            - self.cell_spacing_x1;
        let spacing = self.cell_spacing_x1 + self.cell_spacing_x2 + self.cell_padding_x * 2.0;
        let mut visible_n = 0usize;
        for order_n in 0..count {
            let column_n = self.display_order_to_index[order_n];

            if self.freeze_columns_count > 0 && self.freeze_columns_count == visible_n {
                offset_x += work_rect.min.x - self.outer_rect.min.x;
            }

            if !mask_has(self.enabled_mask_by_display_order, order_n) {
                let column = &mut self.columns[column_n];
                column.min_x = offset_x;
                column.max_x = offset_x;
                column.work_min_x = offset_x;
                column.width_given = 0.0;
                column.clip_rect = Rect::new(offset_x, work_rect.min.y, offset_x, host_clip_rect.max.y)
                    .clip_with(&host_clip_rect);
                column.is_visible_x = false;
                column.is_visible_y = false;
                column.is_request_output = false;
                column.is_skip_items = true;
                column.item_width = 1.0;
                continue;
            }

            self.columns[column_n].min_x = offset_x;
            let max_width = self.get_max_column_width(column_n);
            let cell_padding_x = self.cell_padding_x;
            let spacing_x1 = self.cell_spacing_x1;
            let spacing_x2 = self.cell_spacing_x2;
            let column = &mut self.columns[column_n];

            column.width_given = column.width_given.min(max_width);
            column.width_given = column.width_given.max(column.width_request.min(min_width));
            column.max_x = offset_x + column.width_given + spacing;
            column.work_min_x = column.min_x + cell_padding_x + spacing_x1;
            column.work_max_x = column.max_x - cell_padding_x - spacing_x2;
            column.item_width = (column.width_given * 0.65).trunc();
            column.clip_rect = Rect::new(column.min_x, work_rect.min.y, column.max_x, f32::MAX)
                .clip_with(&host_clip_rect);

            column.is_visible_x = column.clip_rect.max.x > column.clip_rect.min.x;
            column.is_visible_y = true;
            let is_visible = column.is_visible_x;
            if is_visible {
                self.visible_mask_by_index |= 1u64 << column_n;
            }
            column.is_request_output =
                is_visible || column.auto_fit_queue != 0 || column.cannot_skip_items_queue != 0;
            if column.is_request_output {
                self.request_output_mask_by_index |= 1u64 << column_n;
            }
            column.is_skip_items = !column.is_enabled;
            column.is_preserve_width_auto = !column.is_request_output;

            if is_hovering_table
                && io.mouse_pos.x >= column.clip_rect.min.x
                && io.mouse_pos.x < column.clip_rect.max.x
            {
                self.hovered_column_body = Some(column_n);
            }

            column.content_max_x_frozen = column.work_min_x;
            column.content_max_x_unfrozen = column.work_min_x;
            column.content_max_x_headers_used = column.work_min_x;
            column.content_max_x_headers_ideal = column.work_min_x;

            column.auto_fit_queue >>= 1;
            column.cannot_skip_items_queue >>= 1;

            if visible_n < self.freeze_columns_count {
                host_clip_rect.min.x = (column.max_x + f.style.border_size)
                    .clamp(host_clip_rect.min.x, host_clip_rect.max.x.max(host_clip_rect.min.x));
            }

            offset_x += column.width_given + spacing;
            visible_n += 1;
        }

        log::trace!(
            "table {}: layout {} enabled ({} fixed), given width {}, stretch weights {}",
            self.id,
            enabled,
            count_fixed,
            self.columns_given_width,
            stretch_sum_weights
        );

        self.setup_draw_channels(f);
        if self.flags.resizable {
            self.update_borders(f);
        }
        self.instance.last_top_headers_row_height = 0.0;
        self.is_layout_locked = true;
        self.is_using_headers = false;

        if self.is_sort_specs_dirty && self.flags.sortable {
            self.sort_specs_build();
        }
    }

    /// Largest width `column_n` may take while keeping the columns after it visible.
    pub fn get_max_column_width(&self, column_n: usize) -> f32 {
        let column = &self.columns[column_n];
        let min_column_distance = self.min_column_width
            + self.cell_padding_x * 2.0
            + self.cell_spacing_x1
            + self.cell_spacing_x2;
        if self.flags.scroll_x {
            if column.display_order < self.freeze_columns_request {
                let frozen_after = (self.freeze_columns_request - column.display_order) as f32;
                let max_width = self.inner_clip_rect.max.x - frozen_after * min_column_distance - column.min_x;
                return max_width - self.outer_padding_x - self.cell_padding_x - self.cell_spacing_x2;
            }
            f32::MAX
        } else if !self.flags.no_keep_columns_visible {
            let index_within = column.index_within_enabled_set.unwrap_or(0);
            let after = self.columns_enabled_count.saturating_sub(index_within + 1) as f32;
            self.work_rect.max.x
                - after * min_column_distance
                - column.min_x
                - self.cell_spacing_x2
                - self.cell_padding_x * 2.0
                - self.outer_padding_x
        } else {
            f32::MAX
        }
    }

    /// Resize `column_n` to `width`. Width taken from or given to a neighbour
    /// keeps the total unchanged when stretch columns are involved.
    pub fn set_column_width(&mut self, column_n: usize, width: f32) {
        self.check_column_index(column_n);

        let min_width = self.min_column_width;
        let max_width = min_width.max(self.get_max_column_width(column_n));
        let column_0_width = width.clamp(min_width, max_width);
        let column_0 = &self.columns[column_n];
        if column_0.width_given == column_0_width || column_0.width_request == column_0_width {
            return;
        }
        let column_0_request = column_0.width_request;
        let column_0_fixed = column_0.is_fixed();
        let column_0_order = column_0.display_order;
        let next_n = column_0.next_enabled_column;
        let prev_n = column_0.prev_enabled_column;

        if column_0_fixed {
            let set_directly = match (next_n, self.left_most_stretched_column) {
                (Some(_), Some(left)) => self.columns[left].display_order >= column_0_order,
                _ => true,
            };
            if set_directly {
                self.columns[column_n].width_request = column_0_width;
                self.is_settings_dirty = true;
                return;
            }
        }

        // The previous column is used when there is no next one (auto-fit of the right-most stretch column).
        let Some(column_1_n) = next_n.or(prev_n) else {
            return;
        };

        // old_a + old_b == new_a + new_b
        let column_1 = &self.columns[column_1_n];
        let column_1_request = column_1.width_request;
        let any_stretch = !column_0_fixed || column_1.is_stretch();
        let column_1_width = (column_1_request - (column_0_width - column_0_request)).max(min_width);
        let column_0_width = column_0_request + column_1_request - column_1_width;

        self.columns[column_1_n].width_request = column_1_width;
        self.columns[column_n].width_request = column_0_width;
        if any_stretch {
            self.update_columns_weight_from_width();
        }
        self.is_settings_dirty = true;
    }

    /// Re-derive stretch weights from the current stretch widths.
    pub(crate) fn update_columns_weight_from_width(&mut self) {
        let (visible_weight, visible_width) = self
            .columns
            .iter()
            .filter(|c| c.is_enabled && c.is_stretch())
            .fold((0.0f32, 0.0f32), |(weight, width), c| {
                (weight + c.stretch_weight, width + c.width_request)
            });
        if visible_weight <= 0.0 || visible_width <= 0.0 {
            return;
        }
        for column in self.columns.iter_mut().filter(|c| c.is_enabled && c.is_stretch()) {
            column.stretch_weight = (column.width_request / visible_width) * visible_weight;
        }
    }

    /// Fit one column to its content at the next frame.
    pub fn set_column_width_auto_single(&mut self, column_n: usize) {
        self.check_column_index(column_n);
        let column = &mut self.columns[column_n];
        if !column.is_enabled {
            return;
        }
        column.cannot_skip_items_queue = 1 << 0;
        self.auto_fit_single_column = Some(column_n);
        self.cancel_resize_snapshot();
    }

    /// Fit every column to its content; stretch weights return to their defaults.
    pub fn set_column_width_auto_all(&mut self) {
        for column in &mut self.columns {
            // Weights of hidden stretch columns still reset.
            if !column.is_enabled && !column.is_stretch() {
                continue;
            }
            column.cannot_skip_items_queue = 1 << 0;
            column.auto_fit_queue = 1 << 1;
        }
        self.cancel_resize_snapshot();
    }

    /// Auto-fit wins over a drag in progress: the drag ends and its snapshot is dropped.
    fn cancel_resize_snapshot(&mut self) {
        if let Some(drag) = self.resize_drag.take() {
            log::debug!(
                "table {}: auto-fit ended resize of column {}",
                self.id,
                drag.column
            );
        }
        self.resized_column = None;
        self.resized_column_next_width = None;
    }

    /// Whether `column_n` may swap with its enabled neighbour in direction `dir`.
    /// Refused across the frozen boundary or next to a non-reorderable column.
    pub(crate) fn can_reorder(&self, column_n: usize, dir: i8) -> bool {
        if !self.flags.reorderable || dir == 0 {
            return false;
        }
        let column = &self.columns[column_n];
        let neighbour = if dir < 0 {
            column.prev_enabled_column
        } else {
            column.next_enabled_column
        };
        let Some(neighbour_n) = neighbour else {
            return false;
        };
        let other = &self.columns[neighbour_n];
        if column.flags.no_reorder || other.flags.no_reorder {
            return false;
        }
        let frozen = |index: Option<usize>| index.is_some_and(|i| i < self.freeze_columns_request);
        frozen(column.index_within_enabled_set) == frozen(other.index_within_enabled_set)
    }

    /// Queue moving `column_n` one enabled slot left (`dir < 0`) or right,
    /// applied at the next frame.
    pub fn queue_reorder(&mut self, column_n: usize, dir: i8) -> bool {
        self.check_column_index(column_n);
        if !self.can_reorder(column_n, dir) {
            return false;
        }
        self.reorder_column = Some(column_n);
        self.reorder_column_dir = dir.signum();
        self.held_header_column = Some(column_n);
        true
    }

    /// Apply requests queued during the previous frame: resize, single auto-fit,
    /// reorder and display order reset.
    pub(crate) fn begin_apply_requests(&mut self) {
        if let (Some(column_n), Some(width)) = (self.resized_column, self.resized_column_next_width) {
            self.set_column_width(column_n, width);
        }
        self.last_resized_column = self.resized_column;
        self.resized_column_next_width = None;
        self.resized_column = None;

        if let Some(column_n) = self.auto_fit_single_column.take() {
            let width_auto = self.columns[column_n].width_auto;
            self.set_column_width(column_n, width_auto);
        }

        if self.held_header_column.is_none() && self.reorder_column.is_some() {
            self.reorder_column = None;
        }
        self.held_header_column = None;
        if let Some(src_n) = self.reorder_column {
            if self.reorder_column_dir != 0 {
                self.apply_reorder(src_n, self.reorder_column_dir);
                self.reorder_column_dir = 0;
                self.is_settings_dirty = true;
            }
        }

        if self.is_reset_display_order_request {
            for (n, column) in self.columns.iter_mut().enumerate() {
                column.display_order = n;
            }
            self.rebuild_display_order_index();
            self.is_reset_display_order_request = false;
            self.is_settings_dirty = true;
        }
    }

    /// Move `src_n` to its enabled neighbour's slot, shifting the columns in
    /// between (hidden ones included) by one.
    fn apply_reorder(&mut self, src_n: usize, dir: i8) {
        let src = &self.columns[src_n];
        let dst_n = if dir < 0 {
            src.prev_enabled_column
        } else {
            src.next_enabled_column
        };
        let Some(dst_n) = dst_n else {
            return;
        };
        let src_order = src.display_order as isize;
        let dst_order = self.columns[dst_n].display_order as isize;
        let step = dir.signum() as isize;

        let mut order_n = src_order + step;
        while order_n != dst_order + step {
            let n = self.display_order_to_index[order_n as usize];
            let order = self.columns[n].display_order as isize;
            self.columns[n].display_order = (order - step) as usize;
            order_n += step;
        }
        self.columns[src_n].display_order = dst_order as usize;
        self.rebuild_display_order_index();
        log::debug!(
            "table {}: column {} moved to display order {}",
            self.id,
            src_n,
            dst_order
        );
    }
}
