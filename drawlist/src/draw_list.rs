//! Append-only command/index/vertex buffers with clip and texture state.

use crate::cmd::{DrawCallback, DrawCmd, DrawCmdHeader, DrawVert, TextureId};
use crate::geometry::{Rect, Vec2};
use crate::splitter::DrawListSplitter;
use crate::text::TextMeasure;

/// Colors are packed as `0xAABBGGRR`.
pub const COL32_A_MASK: u32 = 0xFF00_0000;

#[derive(Debug)]
pub struct DrawList {
    pub cmd_buffer: Vec<DrawCmd>,
    pub idx_buffer: Vec<u32>,
    pub vtx_buffer: Vec<DrawVert>,
    cmd_header: DrawCmdHeader,
    clip_rect_stack: Vec<Rect>,
    texture_stack: Vec<TextureId>,
    full_clip_rect: Rect,
    splitter: DrawListSplitter,
}

impl DrawList {
    pub fn new(full_clip_rect: Rect) -> Self {
        let mut list = Self {
            cmd_buffer: Vec::new(),
            idx_buffer: Vec::new(),
            vtx_buffer: Vec::new(),
            cmd_header: DrawCmdHeader {
                clip_rect: full_clip_rect,
                ..Default::default()
            },
            clip_rect_stack: Vec::new(),
            texture_stack: Vec::new(),
            full_clip_rect,
            splitter: DrawListSplitter::default(),
        };
        list.add_draw_cmd();
        list
    }

    pub fn reset_for_new_frame(&mut self) {
        self.cmd_buffer.clear();
        self.idx_buffer.clear();
        self.vtx_buffer.clear();
        self.clip_rect_stack.clear();
        self.texture_stack.clear();
        self.cmd_header = DrawCmdHeader {
            clip_rect: self.full_clip_rect,
            ..Default::default()
        };
        self.splitter.clear();
        self.add_draw_cmd();
    }

    pub fn set_full_clip_rect(&mut self, rect: Rect) {
        self.full_clip_rect = rect;
    }

    pub fn cmd_header(&self) -> DrawCmdHeader {
        self.cmd_header
    }

    pub fn clip_rect(&self) -> Rect {
        self.cmd_header.clip_rect
    }

    /// Sum of `elem_count` over all commands. Equals `idx_buffer.len()` between calls.
    pub fn total_elem_count(&self) -> usize {
        self.cmd_buffer.iter().map(|c| c.elem_count as usize).sum()
    }

    /// Number of commands that would reach the renderer.
    pub fn visible_cmd_count(&self) -> usize {
        self.cmd_buffer
            .iter()
            .filter(|c| c.elem_count > 0 || c.is_callback())
            .count()
    }

    pub fn add_draw_cmd(&mut self) {
        let cmd = DrawCmd::with_header(self.cmd_header, self.idx_buffer.len() as u32);
        self.cmd_buffer.push(cmd);
    }

    /// Drop trailing commands that carry neither indices nor a callback.
    pub fn pop_unused_draw_cmd(&mut self) {
        while let Some(last) = self.cmd_buffer.last() {
            if last.elem_count != 0 || last.is_callback() {
                return;
            }
            self.cmd_buffer.pop();
        }
    }

    /// Register a callback command. A fresh command follows it so later
    /// primitives never land in the callback.
    pub fn add_callback(&mut self, callback: DrawCallback, data: usize) {
        let needs_new = match self.cmd_buffer.last() {
            Some(cmd) => cmd.elem_count != 0 || cmd.is_callback(),
            None => true,
        };
        if needs_new {
            self.add_draw_cmd();
        }
        if let Some(cmd) = self.cmd_buffer.last_mut() {
            cmd.callback = Some(callback);
            cmd.callback_data = data;
        }
        self.add_draw_cmd();
    }

    pub fn push_clip_rect(&mut self, min: Vec2, max: Vec2, intersect_with_current: bool) {
        let mut rect = Rect::from_min_max(min, max);
        if intersect_with_current {
            let current = self.cmd_header.clip_rect;
            rect.min.x = rect.min.x.max(current.min.x);
            rect.min.y = rect.min.y.max(current.min.y);
            rect.max.x = rect.max.x.min(current.max.x);
            rect.max.y = rect.max.y.min(current.max.y);
        }
        rect.max.x = rect.max.x.max(rect.min.x);
        rect.max.y = rect.max.y.max(rect.min.y);

        self.clip_rect_stack.push(rect);
        self.cmd_header.clip_rect = rect;
        self.on_changed_header();
    }

    pub fn push_clip_rect_full_screen(&mut self) {
        let full = self.full_clip_rect;
        self.push_clip_rect(full.min, full.max, false);
    }

    pub fn pop_clip_rect(&mut self) {
        assert!(
            self.clip_rect_stack.pop().is_some(),
            "pop_clip_rect() without matching push_clip_rect()"
        );
        self.cmd_header.clip_rect = self
            .clip_rect_stack
            .last()
            .copied()
            .unwrap_or(self.full_clip_rect);
        self.on_changed_header();
    }

    pub fn push_texture_id(&mut self, texture_id: TextureId) {
        self.texture_stack.push(texture_id);
        self.cmd_header.texture_id = texture_id;
        self.on_changed_header();
    }

    pub fn pop_texture_id(&mut self) {
        assert!(
            self.texture_stack.pop().is_some(),
            "pop_texture_id() without matching push_texture_id()"
        );
        self.cmd_header.texture_id = self.texture_stack.last().copied().unwrap_or_default();
        self.on_changed_header();
    }

    /// Replace the top of the clip stack without emitting a command.
    ///
    /// The current command keeps its old clip; the next channel switch picks up
    /// the new one. Call right before [`DrawListSplitter::set_current_channel`].
    pub fn set_clip_rect_before_channel_switch(&mut self, rect: Rect) {
        self.cmd_header.clip_rect = rect;
        if let Some(last) = self.clip_rect_stack.last_mut() {
            *last = rect;
        }
    }

    fn on_changed_header(&mut self) {
        let header = self.cmd_header;
        let Some(curr) = self.cmd_buffer.last() else {
            self.add_draw_cmd();
            return;
        };
        if (curr.elem_count != 0 || curr.is_callback()) && curr.header() != header {
            self.add_draw_cmd();
            return;
        }
        if curr.elem_count != 0 || curr.is_callback() {
            return;
        }

        // Fold an empty trailing command back into an identical predecessor.
        let len = self.cmd_buffer.len();
        if len > 1 {
            let prev = &self.cmd_buffer[len - 2];
            if prev.header() == header && !prev.is_callback() {
                self.cmd_buffer.pop();
                return;
            }
        }
        if let Some(curr) = self.cmd_buffer.last_mut() {
            curr.set_header(header);
        }
    }

    /// Reserve room for `idx_count` indices and `vtx_count` vertices on the current command.
    pub fn prim_reserve(&mut self, idx_count: usize, vtx_count: usize) {
        let needs_cmd = match self.cmd_buffer.last() {
            Some(cmd) => cmd.is_callback(),
            None => true,
        };
        if needs_cmd {
            self.add_draw_cmd();
        }
        if let Some(cmd) = self.cmd_buffer.last_mut() {
            cmd.elem_count += idx_count as u32;
        }
        self.idx_buffer.reserve(idx_count);
        self.vtx_buffer.reserve(vtx_count);
    }

    fn prim_quad(&mut self, a: Vec2, b: Vec2, c: Vec2, d: Vec2, col: u32) {
        let base = self.vtx_buffer.len() as u32 - self.cmd_header.vtx_offset;
        self.prim_reserve(6, 4);
        self.idx_buffer
            .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        for pos in [a, b, c, d] {
            self.vtx_buffer.push(DrawVert {
                pos,
                uv: Vec2::ZERO,
                col,
            });
        }
    }

    pub fn add_rect_filled(&mut self, min: Vec2, max: Vec2, col: u32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        self.prim_quad(
            min,
            Vec2::new(max.x, min.y),
            max,
            Vec2::new(min.x, max.y),
            col,
        );
    }

    pub fn add_line(&mut self, p1: Vec2, p2: Vec2, col: u32, thickness: f32) {
        if col & COL32_A_MASK == 0 {
            return;
        }
        let d = p2 - p1;
        let len = (d.x * d.x + d.y * d.y).sqrt();
        if len <= 0.0 {
            return;
        }
        let n = Vec2::new(-d.y / len, d.x / len) * (thickness * 0.5);
        self.prim_quad(p1 + n, p2 + n, p2 - n, p1 - n, col);
    }

    /// One quad per visible glyph cell, laid out left to right.
    pub fn add_text(&mut self, measure: &dyn TextMeasure, pos: Vec2, col: u32, text: &str) {
        if col & COL32_A_MASK == 0 || text.is_empty() {
            return;
        }
        let clip = self.cmd_header.clip_rect;
        let line_height = measure.line_height();
        let mut x = pos.x;
        for c in text.chars() {
            let w = measure.char_width(c);
            if w > 0.0 && !c.is_whitespace() {
                let glyph = Rect::new(x, pos.y, x + w, pos.y + line_height);
                if glyph.overlaps(&clip) {
                    self.prim_quad(
                        glyph.min,
                        Vec2::new(glyph.max.x, glyph.min.y),
                        glyph.max,
                        Vec2::new(glyph.min.x, glyph.max.y),
                        col,
                    );
                }
            }
            x += w;
        }
    }

    pub fn channels_split(&mut self, count: usize) {
        let mut splitter = std::mem::take(&mut self.splitter);
        splitter.split(self, count);
        self.splitter = splitter;
    }

    pub fn channels_set_current(&mut self, index: usize) {
        let mut splitter = std::mem::take(&mut self.splitter);
        splitter.set_current_channel(self, index);
        self.splitter = splitter;
    }

    pub fn channels_merge(&mut self) {
        let mut splitter = std::mem::take(&mut self.splitter);
        splitter.merge(self);
        self.splitter = splitter;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list() -> DrawList {
        DrawList::new(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    #[test]
    fn test_same_clip_push_pop_keeps_single_cmd() {
        let mut dl = list();
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFFFF_FFFF);
        dl.push_clip_rect(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0), true);
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFFFF_FFFF);
        dl.pop_clip_rect();
        assert_eq!(dl.cmd_buffer.len(), 1);
        assert_eq!(dl.cmd_buffer[0].elem_count, 12);
    }

    #[test]
    fn test_empty_clip_change_is_folded_back() {
        let mut dl = list();
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFFFF_FFFF);
        dl.push_clip_rect(Vec2::new(10.0, 10.0), Vec2::new(20.0, 20.0), true);
        assert_eq!(dl.cmd_buffer.len(), 2);
        dl.pop_clip_rect();
        assert_eq!(dl.cmd_buffer.len(), 1);
    }

    #[test]
    fn test_transparent_color_draws_nothing() {
        let mut dl = list();
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), 0x00FF_FFFF);
        assert!(dl.idx_buffer.is_empty());
    }

    #[test]
    fn test_callback_is_isolated() {
        fn cb(_: &DrawCmd, _: usize) {}
        let mut dl = list();
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFFFF_FFFF);
        dl.add_callback(cb, 42);
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFFFF_FFFF);
        assert_eq!(dl.cmd_buffer.len(), 3);
        assert_eq!(dl.cmd_buffer[1].callback_data, 42);
        assert_eq!(dl.cmd_buffer[1].elem_count, 0);
        assert_eq!(dl.total_elem_count(), dl.idx_buffer.len());
    }

    #[test]
    fn test_clip_before_switch_applies_on_next_channel() {
        let mut dl = list();
        dl.push_clip_rect(Vec2::new(0.0, 0.0), Vec2::new(100.0, 100.0), false);
        dl.channels_split(2);
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFFFF_FFFF);
        let clip = Rect::new(10.0, 0.0, 20.0, 100.0);
        dl.set_clip_rect_before_channel_switch(clip);
        assert_eq!(dl.cmd_buffer.len(), 1);
        dl.channels_set_current(1);
        dl.add_rect_filled(Vec2::new(10.0, 0.0), Vec2::new(11.0, 1.0), 0xFFFF_FFFF);
        assert_eq!(dl.cmd_buffer.last().map(|c| c.clip_rect), Some(clip));
        dl.channels_set_current(0);
        dl.channels_merge();
        assert_eq!(dl.visible_cmd_count(), 2);
    }
}
