//! Rows, cells and the content cursor inside a cell.

use drawlist::{Rect, Vec2};

use super::flags::{BgTarget, RowFlags};
use super::{mask_has, CellBg, Table, DRAW_CHANNEL_BG0, DRAW_CHANNEL_NOCLIP};
use crate::context::FrameCtx;

impl Table {
    pub(crate) fn next_row(&mut self, f: &mut FrameCtx<'_>, row_flags: RowFlags, min_row_height: f32) {
        if !self.is_layout_locked {
            self.update_layout(f);
        }
        if self.is_inside_row {
            self.end_row(f);
        }
        self.last_row_flags = self.row_flags;
        self.row_flags = row_flags;
        self.row_min_height = min_row_height;
        self.begin_row();

        // A minimum height is honored; a maximum cannot be.
        self.row_pos_y2 = self.row_pos_y2.max(self.row_pos_y1 + self.row_min_height);
        if row_flags.headers {
            self.set_bg_color(BgTarget::RowBg0, f.style.colors.header_bg, None);
        }
    }

    fn begin_row(&mut self) {
        let next_row = self.current_row.map_or(0, |r| r + 1);
        self.current_row = Some(next_row);
        self.current_column = None;
        self.row_bg_color = [None; 2];
        self.row_cell_bgs.clear();
        self.is_inside_row = true;

        let mut next_y1 = self.row_pos_y2;
        if next_row == 0 && self.freeze_rows_count > 0 {
            next_y1 = self.outer_rect.min.y;
        }
        self.row_pos_y1 = next_y1;
        self.row_pos_y2 = next_y1;
        self.cell_max_pos = Vec2::new(self.work_rect.min.x, next_y1);
        if self.row_flags.headers && next_row == 0 {
            self.is_using_headers = true;
        }
    }

    pub(crate) fn end_row(&mut self, f: &mut FrameCtx<'_>) {
        assert!(self.is_inside_row, "end of row without a row");
        if self.current_column.is_some() {
            self.end_cell();
        }

        let Some(current_row) = self.current_row else {
            return;
        };
        let bg_y1 = self.row_pos_y1;
        let bg_y2 = self.row_pos_y2;
        let unfreeze_rows = current_row + 1 == self.freeze_rows_count;
        let colors = f.style.colors;
        let border_size = f.style.border_size;
        let border_x1 = self.inner_clip_rect.min.x;
        let border_x2 = self.inner_clip_rect.max.x;

        let is_visible = bg_y2 >= self.inner_clip_rect.min.y && bg_y1 <= self.inner_clip_rect.max.y;
        if is_visible {
            let bg_col0 = self.row_bg_color[0].unwrap_or(
                if self.flags.row_bg {
                    if self.row_bg_color_counter & 1 == 1 {
                        colors.row_bg_alt
                    } else {
                        colors.row_bg
                    }
                } else {
                    0
                },
            );
            let bg_col1 = self.row_bg_color[1].unwrap_or(0);
            let top_border_col = if current_row > 0 && self.flags.borders_inner_h {
                if self.last_row_flags.headers {
                    colors.border_strong
                } else {
                    colors.border_light
                }
            } else {
                0
            };
            let draw_cell_bg = !self.row_cell_bgs.is_empty();

            if bg_col0 != 0 || bg_col1 != 0 || top_border_col != 0 || unfreeze_rows || draw_cell_bg {
                if !self.flags.no_clip {
                    f.draw_list
                        .set_clip_rect_before_channel_switch(self.bg0_clip_rect_for_draw_cmd);
                }
                self.splitter.set_current_channel(f.draw_list, DRAW_CHANNEL_BG0);
            }

            // Soft-clipped so every background shares the channel's clip rect.
            let row_rect = Rect::new(self.work_rect.min.x, bg_y1, self.work_rect.max.x, bg_y2)
                .clip_with(&self.bg_clip_rect);
            if row_rect.min.y < row_rect.max.y {
                f.draw_list.add_rect_filled(row_rect.min, row_rect.max, bg_col0);
                f.draw_list.add_rect_filled(row_rect.min, row_rect.max, bg_col1);
            }

            for cell in &self.row_cell_bgs {
                let column = &self.columns[cell.column];
                let mut rect = self.cell_bg_rect(cell.column).clip_with(&self.bg_clip_rect);
                rect.min.x = rect.min.x.max(column.clip_rect.min.x);
                rect.max.x = rect.max.x.min(column.max_x);
                if rect.min.y < rect.max.y {
                    f.draw_list.add_rect_filled(rect.min, rect.max, cell.color);
                }
            }

            if top_border_col != 0 && bg_y1 >= self.bg_clip_rect.min.y && bg_y1 < self.bg_clip_rect.max.y {
                f.draw_list.add_line(
                    Vec2::new(border_x1, bg_y1),
                    Vec2::new(border_x2, bg_y1),
                    top_border_col,
                    border_size,
                );
            }
            // The row that ends the frozen block always gets a strong bottom line.
            if unfreeze_rows && bg_y2 >= self.bg_clip_rect.min.y && bg_y2 < self.bg_clip_rect.max.y {
                f.draw_list.add_line(
                    Vec2::new(border_x1, bg_y2),
                    Vec2::new(border_x2, bg_y2),
                    colors.border_strong,
                    border_size,
                );
            }

            if self.flags.highlight_hovered_column && !self.row_flags.headers {
                self.draw_hovered_column_highlight(f, bg_y1, bg_y2);
            }
        }

        if unfreeze_rows {
            debug_assert!(!self.is_unfrozen_rows);
            let y0 = (self.row_pos_y2 + 1.0).max(self.inner_clip_rect.min.y);
            self.is_unfrozen_rows = true;
            self.instance.last_frozen_height = y0 - self.outer_rect.min.y;

            self.bg_clip_rect.min.y = y0.min(self.inner_clip_rect.max.y);
            self.bg_clip_rect.max.y = self.inner_clip_rect.max.y;
            self.bg2_clip_rect_for_draw_cmd.min.y = self.bg_clip_rect.min.y;
            self.bg2_clip_rect_for_draw_cmd.max.y = self.bg_clip_rect.max.y;
            self.bg2_draw_channel_current = self.bg2_draw_channel_unfrozen;

            // Rows below the frozen block continue at the scrolled position.
            let row_height = self.row_pos_y2 - self.row_pos_y1;
            self.row_pos_y2 = self.work_rect.min.y + self.row_pos_y2 - self.outer_rect.min.y;
            self.row_pos_y1 = self.row_pos_y2 - row_height;
            let clip_min_y = self.bg2_clip_rect_for_draw_cmd.min.y;
            for column in &mut self.columns {
                column.draw_channel_current = column.draw_channel_unfrozen;
                column.clip_rect.min.y = clip_min_y;
                column.clip_rect.max.y = column.clip_rect.max.y.max(clip_min_y);
            }
        }

        if !self.row_flags.headers {
            self.row_bg_color_counter += 1;
        }
        self.is_inside_row = false;
    }

    fn draw_hovered_column_highlight(&mut self, f: &mut FrameCtx<'_>, y1: f32, y2: f32) {
        let Some(column_n) = self.hovered_column_body else {
            return;
        };
        let column = &self.columns[column_n];
        if !column.is_visible_x {
            return;
        }
        let rect = Rect::new(column.min_x, y1, column.max_x, y2).clip_with(&self.bg_clip_rect);
        if rect.min.y >= rect.max.y {
            return;
        }
        if !self.flags.no_clip {
            f.draw_list
                .set_clip_rect_before_channel_switch(self.bg2_clip_rect_for_draw_cmd);
        }
        self.splitter
            .set_current_channel(f.draw_list, self.bg2_draw_channel_current);
        f.draw_list
            .add_rect_filled(rect.min, rect.max, f.style.colors.column_hovered);
    }

    pub(crate) fn begin_cell(&mut self, f: &mut FrameCtx<'_>, column_n: usize) {
        self.current_column = Some(column_n);
        let column = &self.columns[column_n];
        self.cell_cursor = Vec2::new(column.work_min_x, self.row_pos_y1 + self.cell_padding_y);
        self.cell_max_pos.x = self.cell_cursor.x;

        if self.flags.no_clip {
            self.splitter.set_current_channel(f.draw_list, DRAW_CHANNEL_NOCLIP);
        } else {
            f.draw_list.set_clip_rect_before_channel_switch(column.clip_rect);
            self.splitter
                .set_current_channel(f.draw_list, column.draw_channel_current);
        }
    }

    pub(crate) fn end_cell(&mut self) {
        let Some(column_n) = self.current_column else {
            return;
        };
        let max_x = self.cell_max_pos.x;
        let max_y = self.cell_max_pos.y;
        let headers = self.row_flags.headers;
        let unfrozen = self.is_unfrozen_rows;
        let column = &mut self.columns[column_n];
        let target = if headers {
            &mut column.content_max_x_headers_used
        } else if unfrozen {
            &mut column.content_max_x_unfrozen
        } else {
            &mut column.content_max_x_frozen
        };
        *target = target.max(max_x);
        if column.is_enabled {
            self.row_pos_y2 = self.row_pos_y2.max(max_y + self.cell_padding_y);
        }
    }

    /// Move to the next cell, starting a new row after the last column.
    /// Returns whether the cell's content is worth submitting.
    pub(crate) fn next_column(&mut self, f: &mut FrameCtx<'_>) -> bool {
        let next = self.current_column.map_or(0, |c| c + 1);
        if self.is_inside_row && next < self.columns.len() {
            if self.current_column.is_some() {
                self.end_cell();
            }
            self.begin_cell(f, next);
        } else {
            self.next_row(f, RowFlags::default(), 0.0);
            self.begin_cell(f, 0);
        }
        let column_n = self.current_column.unwrap_or(0);
        self.columns[column_n].is_request_output
    }

    pub(crate) fn set_column_index(&mut self, f: &mut FrameCtx<'_>, column_n: usize) -> bool {
        self.check_column_index(column_n);
        assert!(self.is_inside_row, "set_column_index() needs a row, call table_next_row() first");
        if self.current_column != Some(column_n) {
            if self.current_column.is_some() {
                self.end_cell();
            }
            self.begin_cell(f, column_n);
        }
        self.columns[column_n].is_request_output
    }

    /// Queue a background for the current row. Drawn when the row ends, once
    /// its height is known.
    pub(crate) fn set_bg_color(&mut self, target: BgTarget, color: u32, column_n: Option<usize>) {
        if self.row_pos_y1 > self.inner_clip_rect.max.y {
            return;
        }
        match target {
            BgTarget::CellBg => {
                let Some(column_n) = column_n.or(self.current_column) else {
                    return;
                };
                self.check_column_index(column_n);
                if !mask_has(self.visible_mask_by_index, column_n) {
                    return;
                }
                match self.row_cell_bgs.last_mut() {
                    Some(cell) if cell.column == column_n => cell.color = color,
                    _ => self.row_cell_bgs.push(CellBg {
                        color,
                        column: column_n,
                    }),
                }
            }
            BgTarget::RowBg0 | BgTarget::RowBg1 => {
                debug_assert!(column_n.is_none(), "row backgrounds take no column");
                let layer = usize::from(target == BgTarget::RowBg1);
                self.row_bg_color[layer] = Some(color);
            }
        }
    }

    /// Reserve `size` at the cell cursor and move the cursor to the next line.
    pub(crate) fn item_size(&mut self, f: &FrameCtx<'_>, size: Vec2) {
        let pos = self.cell_cursor;
        self.cell_max_pos.x = self.cell_max_pos.x.max(pos.x + size.x);
        self.cell_max_pos.y = self.cell_max_pos.y.max(pos.y + size.y);
        self.cell_cursor.y += size.y + f.style.item_spacing.y;
    }

    /// Draw a line of text at the cell cursor.
    pub(crate) fn text(&mut self, f: &mut FrameCtx<'_>, text: &str) {
        let Some(column_n) = self.current_column else {
            panic!("table_text() outside a cell, call table_next_column() first");
        };
        let label = drawlist::visible_label(text);
        let size = Vec2::new(f.measure.text_width(label), f.measure.line_height());
        if !self.columns[column_n].is_skip_items {
            f.draw_list
                .add_text(f.measure, self.cell_cursor, f.style.colors.text, label);
        }
        self.item_size(f, size);
    }
}
