//! Channel splitting: draw out of order into separate buffers, then stitch them
//! back into the host list in channel order.
//!
//! Channel 0 always lives in the host [`DrawList`]. Switching channels swaps the
//! host's command and index vectors with the stored ones, so no content is copied
//! until [`DrawListSplitter::merge`]. A splitter cannot be nested; use a separate
//! instance for an inner split.

use std::mem;

use crate::cmd::DrawCmd;
use crate::draw_list::DrawList;

#[derive(Debug, Default, Clone)]
pub struct DrawChannel {
    pub cmd_buffer: Vec<DrawCmd>,
    pub idx_buffer: Vec<u32>,
}

#[derive(Debug, Default)]
pub struct DrawListSplitter {
    current: usize,
    count: usize,
    /// Pooled across frames, only the first `count` are in use.
    channels: Vec<DrawChannel>,
}

impl DrawListSplitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn current(&self) -> usize {
        self.current
    }

    pub fn is_split(&self) -> bool {
        self.count > 1
    }

    /// Forget the active split without touching buffers. Pooled memory is kept.
    pub fn clear(&mut self) {
        self.current = 0;
        self.count = 1;
    }

    pub fn clear_free_memory(&mut self) {
        self.channels = Vec::new();
        self.clear();
    }

    /// Open `count` channels on `draw_list`. Channel 0 keeps the live buffers.
    ///
    /// # Panics
    /// If this splitter is already split.
    pub fn split(&mut self, draw_list: &DrawList, count: usize) {
        assert!(
            self.current == 0 && self.count <= 1,
            "nested channel splitting is not supported, use a separate splitter"
        );
        assert!(count >= 1, "split() needs at least one channel");

        if self.channels.len() < count {
            self.channels.resize_with(count, DrawChannel::default);
        }
        self.count = count;

        // Slot 0 only ever receives the host buffers during a swap.
        self.channels[0].cmd_buffer.clear();
        self.channels[0].idx_buffer.clear();

        let header = draw_list.cmd_header();
        for channel in &mut self.channels[1..count] {
            channel.cmd_buffer.clear();
            channel.idx_buffer.clear();
            channel.cmd_buffer.push(DrawCmd::with_header(header, 0));
        }
    }

    /// Make `index` the channel that receives new primitives.
    pub fn set_current_channel(&mut self, draw_list: &mut DrawList, index: usize) {
        assert!(
            index < self.count,
            "channel {index} out of range, split into {} channels",
            self.count
        );
        if self.current == index {
            return;
        }

        let prev = &mut self.channels[self.current];
        mem::swap(&mut prev.cmd_buffer, &mut draw_list.cmd_buffer);
        mem::swap(&mut prev.idx_buffer, &mut draw_list.idx_buffer);
        self.current = index;
        let next = &mut self.channels[index];
        mem::swap(&mut next.cmd_buffer, &mut draw_list.cmd_buffer);
        mem::swap(&mut next.idx_buffer, &mut draw_list.idx_buffer);

        // State may have changed while another channel was current.
        Self::sync_trailing_cmd(draw_list);
    }

    fn sync_trailing_cmd(draw_list: &mut DrawList) {
        let header = draw_list.cmd_header();
        if let Some(cmd) = draw_list.cmd_buffer.last_mut() {
            if cmd.elem_count == 0 && !cmd.is_callback() {
                cmd.set_header(header);
                return;
            }
            if !cmd.is_callback() && cmd.header() == header {
                return;
            }
        }
        draw_list.add_draw_cmd();
    }

    /// Commands of channel `index`, wherever they currently live.
    pub fn channel_cmds<'a>(&'a self, draw_list: &'a DrawList, index: usize) -> &'a [DrawCmd] {
        if index == self.current {
            &draw_list.cmd_buffer
        } else {
            &self.channels[index].cmd_buffer
        }
    }

    /// Mutable access to a stored channel. Requires channel 0 to be current.
    pub fn stored_channel_mut(&mut self, index: usize) -> &mut DrawChannel {
        assert!(
            self.current == 0 && index > 0 && index < self.count,
            "only non-current channels can be edited in place"
        );
        &mut self.channels[index]
    }

    /// Permute stored channels: destination `i` receives old channel `order[i]`.
    /// Requires channel 0 to be current and to stay first.
    pub fn reorder_channels(&mut self, order: &[usize]) {
        assert!(self.current == 0, "reorder_channels() while a channel is active");
        assert_eq!(order.len(), self.count, "reorder needs one entry per channel");
        assert_eq!(order[0], 0, "channel 0 must stay first");

        let mut taken: Vec<DrawChannel> = self.channels[..self.count]
            .iter_mut()
            .map(mem::take)
            .collect();
        for (dst, &src) in order.iter().enumerate() {
            self.channels[dst] = mem::take(&mut taken[src]);
        }
    }

    /// Concatenate every channel into the host list, in channel order.
    pub fn merge(&mut self, draw_list: &mut DrawList) {
        if self.count <= 1 {
            return;
        }

        self.set_current_channel(draw_list, 0);
        draw_list.pop_unused_draw_cmd();

        let mut cmds_in = draw_list.cmd_buffer.len();
        let mut folded = 0usize;

        for channel in &mut self.channels[1..self.count] {
            while let Some(last) = channel.cmd_buffer.last() {
                if last.elem_count != 0 || last.is_callback() {
                    break;
                }
                channel.cmd_buffer.pop();
            }
            if channel.cmd_buffer.is_empty() {
                channel.idx_buffer.clear();
                continue;
            }
            cmds_in += channel.cmd_buffer.len();

            let fold_first = match (draw_list.cmd_buffer.last(), channel.cmd_buffer.first()) {
                (Some(prev), Some(first)) => prev.can_merge_with(first),
                _ => false,
            };

            let mut idx_offset = draw_list.idx_buffer.len() as u32;
            let mut cmds = channel.cmd_buffer.drain(..);
            if fold_first {
                if let (Some(prev), Some(first)) = (draw_list.cmd_buffer.last_mut(), cmds.next()) {
                    prev.elem_count += first.elem_count;
                    idx_offset += first.elem_count;
                    folded += 1;
                }
            }
            for mut cmd in cmds {
                cmd.idx_offset = idx_offset;
                idx_offset += cmd.elem_count;
                draw_list.cmd_buffer.push(cmd);
            }
            draw_list.idx_buffer.append(&mut channel.idx_buffer);
            debug_assert_eq!(idx_offset as usize, draw_list.idx_buffer.len());
        }

        Self::sync_trailing_cmd(draw_list);

        log::trace!(
            "merged {} channels: {} cmds in, {} folded, {} out",
            self.count,
            cmds_in,
            folded,
            draw_list.cmd_buffer.len()
        );
        self.count = 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Rect, Vec2};

    fn list() -> DrawList {
        DrawList::new(Rect::new(0.0, 0.0, 100.0, 100.0))
    }

    fn quad(dl: &mut DrawList) {
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFFFF_FFFF);
    }

    #[test]
    #[should_panic(expected = "nested channel splitting")]
    fn test_nested_split_panics() {
        let dl = list();
        let mut s = DrawListSplitter::new();
        s.split(&dl, 2);
        s.split(&dl, 2);
    }

    #[test]
    fn test_merge_same_header_folds_into_one_cmd() {
        let mut dl = list();
        let mut s = DrawListSplitter::new();
        s.split(&dl, 3);
        for ch in [2, 1, 0] {
            s.set_current_channel(&mut dl, ch);
            quad(&mut dl);
        }
        s.merge(&mut dl);
        assert_eq!(dl.visible_cmd_count(), 1);
        assert_eq!(dl.idx_buffer.len(), 18);
        assert_eq!(dl.total_elem_count(), 18);
    }

    #[test]
    fn test_merge_respects_channel_order() {
        let mut dl = list();
        let mut s = DrawListSplitter::new();
        s.split(&dl, 2);
        s.set_current_channel(&mut dl, 1);
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFF00_0001);
        s.set_current_channel(&mut dl, 0);
        dl.add_rect_filled(Vec2::new(0.0, 0.0), Vec2::new(1.0, 1.0), 0xFF00_0000);
        s.merge(&mut dl);

        // Channel 0 content was indexed first.
        let first_vtx = dl.idx_buffer[0] as usize;
        assert_eq!(dl.vtx_buffer[first_vtx].col, 0xFF00_0000);
        let second_vtx = dl.idx_buffer[6] as usize;
        assert_eq!(dl.vtx_buffer[second_vtx].col, 0xFF00_0001);
    }

    #[test]
    fn test_reorder_moves_channel_content() {
        let mut dl = list();
        let mut s = DrawListSplitter::new();
        s.split(&dl, 3);
        s.set_current_channel(&mut dl, 1);
        quad(&mut dl);
        s.set_current_channel(&mut dl, 0);
        assert_eq!(s.channel_cmds(&dl, 1)[0].elem_count, 6);
        s.reorder_channels(&[0, 2, 1]);
        assert_eq!(s.channel_cmds(&dl, 1)[0].elem_count, 0);
        assert_eq!(s.channel_cmds(&dl, 2)[0].elem_count, 6);
    }
}
