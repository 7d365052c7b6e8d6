//! Column borders: hit testing, drag-to-resize and drawing.

use drawlist::{Rect, Vec2};

use super::flags::SizingPolicy;
use super::{mask_has, ResizeDrag, Table, DRAW_CHANNEL_BG0};
use crate::context::FrameCtx;

impl Table {
    /// Find the hovered and held column borders. Runs during layout, so
    /// row heights come from the previous frame.
    pub(crate) fn update_borders(&mut self, f: &mut FrameCtx<'_>) {
        let io = f.io;
        let half_width = f.style.resize_hit_half_width;
        self.hovered_column_border = None;

        let hit_y1 = if self.freeze_rows_count > 0 {
            self.outer_rect.min.y
        } else {
            self.work_rect.min.y
        };
        let hit_y2_body = self
            .outer_rect
            .max
            .y
            .max(hit_y1 + self.instance.last_outer_height);
        let hit_y2_head = hit_y1 + self.instance.last_top_headers_row_height;

        for order_n in 0..self.columns.len() {
            if !mask_has(self.enabled_mask_by_display_order, order_n) {
                continue;
            }
            let column_n = self.display_order_to_index[order_n];
            let column = &self.columns[column_n];
            if column.flags.no_resize || column.no_direct_resize {
                continue;
            }
            // Hidden columns keep their border while being resized.
            if !column.is_visible_x && self.last_resized_column != Some(column_n) {
                continue;
            }

            let hit_y2 = if self.flags.no_borders_in_body {
                if !self.is_using_headers {
                    continue;
                }
                hit_y2_head
            } else {
                hit_y2_body
            };
            let max_x = column.max_x;
            let hit_rect = Rect::new(max_x - half_width, hit_y1, max_x + half_width, hit_y2);
            let hovered = io.hovering(&hit_rect);

            if hovered && io.mouse_double_clicked {
                self.set_column_width_auto_single(column_n);
                continue;
            }
            if hovered && io.mouse_clicked && self.resize_drag.is_none() {
                log::debug!("table {}: resizing column {}", self.id, column_n);
                self.resize_drag = Some(ResizeDrag {
                    column: column_n,
                    click_offset_x: io.mouse_pos.x - max_x,
                    snapshot: self
                        .columns
                        .iter()
                        .map(|c| (c.width_request, c.stretch_weight))
                        .collect(),
                });
            }

            let held = io.mouse_down
                && self
                    .resize_drag
                    .as_ref()
                    .is_some_and(|drag| drag.column == column_n);
            if held {
                self.resized_column = Some(column_n);
            }
            if hovered || held {
                self.hovered_column_border = Some(column_n);
            }
        }
    }

    /// Turn the mouse position into next frame's width for the column being
    /// dragged. Escape restores every column to its state before the drag.
    pub(crate) fn update_resize_drag(&mut self, f: &FrameCtx<'_>) {
        let io = f.io;
        let Some(drag) = self.resize_drag.as_ref() else {
            return;
        };

        if io.key_escape {
            let snapshot = drag.snapshot.clone();
            for (column, (width_request, stretch_weight)) in self.columns.iter_mut().zip(snapshot) {
                column.width_request = width_request;
                column.stretch_weight = stretch_weight;
            }
            log::debug!("table {}: resize of column {} cancelled", self.id, drag.column);
            self.resize_drag = None;
            self.resized_column = None;
            self.resized_column_next_width = None;
            self.is_settings_dirty = true;
            return;
        }

        if !io.mouse_down {
            self.resize_drag = None;
            return;
        }
        if let Some(column_n) = self.resized_column {
            let new_x2 = io.mouse_pos.x - drag.click_offset_x;
            let column = &self.columns[column_n];
            let new_width = (new_x2
                - column.min_x
                - self.cell_spacing_x1
                - self.cell_spacing_x2
                - self.cell_padding_x * 2.0)
                .trunc();
            self.resized_column_next_width = Some(new_width);
        }
    }

    fn column_border_color(&self, f: &FrameCtx<'_>, order_n: usize, column_n: usize) -> u32 {
        let colors = &f.style.colors;
        if self.resized_column == Some(column_n) {
            colors.border_held
        } else if self.hovered_column_border == Some(column_n) {
            colors.border_hovered
        } else if self.freeze_columns_count > 0 && self.freeze_columns_count == order_n + 1 {
            colors.border_strong
        } else {
            colors.border_light
        }
    }

    pub(crate) fn draw_borders(&mut self, f: &mut FrameCtx<'_>) {
        self.splitter.set_current_channel(f.draw_list, DRAW_CHANNEL_BG0);
        let clip = self.bg0_clip_rect_for_draw_cmd;
        f.draw_list.push_clip_rect(clip.min, clip.max, false);

        let border_size = f.style.border_size;
        let strong = f.style.colors.border_strong;
        let top_y = if self.freeze_rows_count > 0 {
            self.inner_rect.min.y
        } else {
            self.work_rect.min.y
        };
        let draw_y1 = self.inner_rect.min.y.max(top_y) + if self.flags.borders_outer_h { 1.0 } else { 0.0 };
        let draw_y2_body = self.inner_rect.max.y;
        let draw_y2_head = if self.is_using_headers {
            self.inner_rect
                .max
                .y
                .min(top_y + self.instance.last_top_headers_row_height)
        } else {
            draw_y1
        };

        if self.flags.borders_inner_v {
            for order_n in 0..self.columns.len() {
                if !mask_has(self.enabled_mask_by_display_order, order_n) {
                    continue;
                }
                let column_n = self.display_order_to_index[order_n];
                let column = &self.columns[column_n];
                let is_hovered = self.hovered_column_border == Some(column_n);
                let is_resized = self.resized_column == Some(column_n);
                let is_resizable = !column.flags.no_resize && !column.no_direct_resize;
                let is_frozen_separator = self.freeze_columns_count == order_n + 1;
                if column.max_x > self.inner_clip_rect.max.x && !is_resized {
                    continue;
                }
                // The right-most border doubles as the outer border.
                if column.next_enabled_column.is_none()
                    && !is_resizable
                    && (self.flags.policy() != SizingPolicy::FixedSame || self.flags.no_host_extend_x)
                {
                    continue;
                }
                if column.max_x <= column.clip_rect.min.x {
                    continue;
                }

                let draw_y2 = if is_hovered
                    || is_resized
                    || is_frozen_separator
                    || !self.flags.no_borders_in_body
                {
                    draw_y2_body
                } else {
                    draw_y2_head
                };
                if draw_y2 > draw_y1 {
                    let x = column.max_x;
                    let color = self.column_border_color(f, order_n, column_n);
                    f.draw_list
                        .add_line(Vec2::new(x, draw_y1), Vec2::new(x, draw_y2), color, border_size);
                }
            }
        }

        let outer = self.outer_rect;
        if self.flags.borders_outer_v {
            f.draw_list.add_line(
                outer.min,
                Vec2::new(outer.min.x, outer.max.y),
                strong,
                border_size,
            );
            f.draw_list.add_line(
                Vec2::new(outer.max.x, outer.min.y),
                outer.max,
                strong,
                border_size,
            );
        }
        if self.flags.borders_outer_h {
            f.draw_list.add_line(
                outer.min,
                Vec2::new(outer.max.x, outer.min.y),
                strong,
                border_size,
            );
            f.draw_list.add_line(
                Vec2::new(outer.min.x, outer.max.y),
                outer.max,
                strong,
                border_size,
            );
        }

        if self.flags.borders_inner_h && self.row_pos_y2 < outer.max.y {
            let border_y = self.row_pos_y2;
            if border_y >= self.bg_clip_rect.min.y && border_y < self.bg_clip_rect.max.y {
                f.draw_list.add_line(
                    Vec2::new(self.inner_clip_rect.min.x, border_y),
                    Vec2::new(self.inner_clip_rect.max.x, border_y),
                    f.style.colors.border_light,
                    border_size,
                );
            }
        }

        f.draw_list.pop_clip_rect();
    }
}
