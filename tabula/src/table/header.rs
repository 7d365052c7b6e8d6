//! Header row: labels, sort arrows, click-to-sort and drag-to-reorder.

use drawlist::{visible_label, Rect, Vec2};

use super::flags::{BgTarget, RowFlags, SortDirection};
use super::{HeaderHold, Table};
use crate::context::FrameCtx;

/// Arrow size relative to the line height.
const ARROW_SCALE: f32 = 0.65;

impl Table {
    pub(crate) fn header_row_height(&self, f: &FrameCtx<'_>) -> f32 {
        f.measure.line_height() + self.cell_padding_y * 2.0
    }

    /// One header cell per column, using the declared column names.
    pub(crate) fn headers_row(&mut self, f: &mut FrameCtx<'_>) {
        let row_height = self.header_row_height(f);
        self.next_row(f, RowFlags { headers: true }, row_height);
        let row_y1 = self.row_pos_y1;

        for column_n in 0..self.columns.len() {
            if !self.set_column_index(f, column_n) {
                continue;
            }
            let column = &self.columns[column_n];
            let name = if column.flags.no_header_label {
                String::new()
            } else {
                column.name.clone()
            };
            self.header(f, &name);
        }

        // Right click past the last column opens the table-wide menu.
        let mouse = f.io.mouse_pos;
        if f.io.mouse_right_clicked
            && self.hovered_column_body.is_none()
            && f.io.hovering(&self.mouse_hit_rect())
            && mouse.y >= row_y1
            && mouse.y < row_y1 + row_height
        {
            self.open_context_menu(None);
        }
        self.instance.last_top_headers_row_height = self.row_pos_y2.max(row_y1 + row_height) - row_y1;
    }

    /// Header cell for the current column.
    pub(crate) fn header(&mut self, f: &mut FrameCtx<'_>, label: &str) {
        let Some(column_n) = self.current_column else {
            panic!("table_header() outside a cell, call table_next_column() first");
        };
        let io = f.io;
        let label = visible_label(label);
        let label_size = Vec2::new(f.measure.text_width(label), f.measure.line_height());
        let label_pos = self.cell_cursor;
        let cell_r = self.cell_bg_rect(column_n);
        let label_height = label_size.y.max(self.row_min_height - self.cell_padding_y * 2.0);

        let sortable = self.flags.sortable && !self.columns[column_n].flags.no_sort;
        let sort_order = self.columns[column_n].sort_order;
        let mut w_arrow = 0.0;
        let mut w_sort_text = 0.0;
        let mut sort_order_suffix = String::new();
        if sortable {
            w_arrow = (f.measure.line_height() * ARROW_SCALE + f.style.frame_padding.x).trunc();
            if let Some(order) = sort_order.filter(|&o| o > 0) {
                sort_order_suffix = (order + 1).to_string();
                w_sort_text = f.style.item_spacing.x * 0.5 + f.measure.text_width(&sort_order_suffix);
            }
        }

        // Header width feeds auto-fit without touching the cell's content extent.
        let max_pos_x = label_pos.x + label_size.x + w_sort_text + w_arrow;
        {
            let column = &mut self.columns[column_n];
            column.content_max_x_headers_used = column.content_max_x_headers_used.max(
                if sort_order.is_some() {
                    cell_r.max.x
                } else {
                    max_pos_x.min(cell_r.max.x)
                },
            );
            column.content_max_x_headers_ideal = column.content_max_x_headers_ideal.max(max_pos_x);
        }

        let bb = Rect::new(
            cell_r.min.x,
            cell_r.min.y,
            cell_r.max.x,
            cell_r.max.y.max(cell_r.min.y + label_height + self.cell_padding_y * 2.0),
        );
        self.item_size(f, Vec2::new(0.0, label_height));

        // Resize borders take the mouse before headers do.
        let hovered = io.hovering(&bb)
            && self.hovered_column_border.is_none()
            && self.resize_drag.is_none();
        if io.mouse_clicked && hovered {
            self.header_hold = Some(HeaderHold {
                column: column_n,
                press_x: io.mouse_pos.x,
                last_x: io.mouse_pos.x,
                dragged: false,
            });
        }
        let mut hold = self.header_hold.filter(|h| h.column == column_n);
        let held = hold.is_some() && io.mouse_down;
        let dragged = hold.is_some_and(|h| h.dragged);
        let pressed = hold.is_some() && io.mouse_released && hovered && !dragged;

        let colors = f.style.colors;
        if held || hovered {
            let color = if held {
                colors.header_active
            } else {
                colors.header_hovered
            };
            self.set_bg_color(BgTarget::CellBg, color, Some(column_n));
        } else if !self.row_flags.headers {
            self.set_bg_color(BgTarget::CellBg, colors.header_bg, Some(column_n));
        }
        if held {
            self.held_header_column = Some(column_n);
        }

        if let Some(h) = hold.as_mut().filter(|_| held) {
            if (io.mouse_pos.x - h.press_x).abs() >= f.style.drag_threshold {
                h.dragged = true;
            }
            if h.dragged && self.flags.reorderable {
                let delta_x = io.mouse_pos.x - h.last_x;
                self.reorder_column = Some(column_n);
                // Reorder once the mouse passes the middle of the neighbour.
                let mid_x = |n: Option<usize>| {
                    n.map(|n| (self.columns[n].min_x + self.columns[n].max_x) * 0.5)
                };
                let column = &self.columns[column_n];
                let prev_mid = mid_x(column.prev_enabled_column);
                let next_mid = mid_x(column.next_enabled_column);
                if delta_x < 0.0
                    && prev_mid.is_some_and(|mid| io.mouse_pos.x < mid)
                    && self.can_reorder(column_n, -1)
                {
                    self.reorder_column_dir = -1;
                }
                if delta_x > 0.0
                    && next_mid.is_some_and(|mid| io.mouse_pos.x > mid)
                    && self.can_reorder(column_n, 1)
                {
                    self.reorder_column_dir = 1;
                }
            }
            h.last_x = io.mouse_pos.x;
            self.header_hold = Some(*h);
        }

        let ellipsis_max = (cell_r.max.x - w_arrow - w_sort_text).max(label_pos.x);
        if sortable {
            if let Some(order) = sort_order {
                let mut x = cell_r.min.x.max(cell_r.max.x - w_arrow - w_sort_text);
                let y = label_pos.y;
                if order > 0 {
                    f.draw_list.add_text(
                        f.measure,
                        Vec2::new(x + f.style.item_spacing.x * 0.5, y),
                        colors.text & 0xB3FF_FFFF,
                        &sort_order_suffix,
                    );
                    x += w_sort_text;
                }
                let arrow = match self.columns[column_n].sort_direction {
                    SortDirection::Descending => "v",
                    _ => "^",
                };
                f.draw_list
                    .add_text(f.measure, Vec2::new(x, y), colors.text, arrow);
            }

            if pressed && self.reorder_column != Some(column_n) {
                let direction = self.column_next_sort_direction(column_n);
                self.set_column_sort_direction(column_n, direction, io.key_shift);
            }
        }

        // Glyphs past the arrow area are dropped.
        let visible: String = {
            let mut width = 0.0;
            label
                .chars()
                .take_while(|&c| {
                    width += f.measure.char_width(c);
                    label_pos.x + width <= ellipsis_max
                })
                .collect()
        };
        f.draw_list
            .add_text(f.measure, label_pos, colors.text, &visible);

        if io.mouse_right_clicked && hovered {
            self.open_context_menu(Some(column_n));
        }
    }
}
