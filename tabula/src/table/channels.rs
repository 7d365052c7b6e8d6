//! Draw channel allocation and the end-of-table merge.
//!
//! Channel layout for a table with `N` enabled columns:
//!
//! ```text
//! 0                 background (row bg, borders)
//! 1                 background 2, frozen rows
//! 2 .. 2+N          column content, frozen rows
//! 2+N               background 2, unfrozen rows      (only with frozen rows)
//! 3+N .. 3+2N       column content, unfrozen rows    (only with frozen rows)
//! last              dummy channel for hidden columns (when any)
//! ```
//!
//! With `no_clip` every column shares a single content channel.

use drawlist::Rect;

use super::{mask_has, Table, DRAW_CHANNEL_BG0, DRAW_CHANNEL_BG2_FROZEN, DRAW_CHANNEL_NOCLIP};
use crate::context::FrameCtx;

/// Channels 0 and 1 never move during the merge.
const LEADING_DRAW_CHANNELS: usize = 2;

/// Column channels sharing one clip quadrant (frozen or not, on each axis).
#[derive(Debug, Default)]
struct MergeGroup {
    clip_rect: Option<Rect>,
    channels: Vec<usize>,
}

impl Table {
    pub(crate) fn setup_draw_channels(&mut self, f: &mut FrameCtx<'_>) {
        let count = self.columns.len();
        let has_freeze_v = self.freeze_rows_count > 0;
        let freeze_row_multiplier = if has_freeze_v { 2 } else { 1 };
        let channels_for_row = if self.flags.no_clip {
            1
        } else {
            self.columns_enabled_count
        };
        let channels_for_bg = 1 + freeze_row_multiplier;
        let enabled_mask = self.enabled_mask_by_index;
        let channels_for_dummy = usize::from(
            self.columns_enabled_count < count
                || (self.visible_mask_by_index & enabled_mask) != enabled_mask,
        );
        let channels_total =
            channels_for_bg + channels_for_row * freeze_row_multiplier + channels_for_dummy;

        self.splitter.split(f.draw_list, channels_total);
        self.dummy_draw_channel = (channels_for_dummy > 0).then(|| channels_total - 1);
        self.bg2_draw_channel_current = DRAW_CHANNEL_BG2_FROZEN;
        self.bg2_draw_channel_unfrozen = if has_freeze_v {
            DRAW_CHANNEL_NOCLIP + channels_for_row
        } else {
            DRAW_CHANNEL_BG2_FROZEN
        };

        let dummy = self.dummy_draw_channel.unwrap_or(DRAW_CHANNEL_BG0);
        let mut draw_channel_current = DRAW_CHANNEL_NOCLIP;
        for column in &mut self.columns {
            if column.is_visible_x && column.is_visible_y {
                column.draw_channel_frozen = draw_channel_current;
                column.draw_channel_unfrozen = draw_channel_current
                    + if has_freeze_v { channels_for_row + 1 } else { 0 };
                if !self.flags.no_clip {
                    draw_channel_current += 1;
                }
            } else {
                column.draw_channel_frozen = dummy;
                column.draw_channel_unfrozen = dummy;
            }
            column.draw_channel_current = column.draw_channel_frozen;
        }

        self.bg_clip_rect = self.inner_clip_rect;
        self.bg0_clip_rect_for_draw_cmd = self.host_clip_rect;
        self.bg2_clip_rect_for_draw_cmd = self.host_clip_rect;
        log::trace!(
            "table {}: {} draw channels ({} per row, dummy {:?})",
            self.id,
            channels_total,
            channels_for_row,
            self.dummy_draw_channel
        );
    }

    /// Reorder column channels so that columns sharing a clip quadrant sit
    /// next to each other with one common clip rect, letting the splitter
    /// fold each group into a single draw command. Channels holding more than
    /// one command, or content overflowing their column, keep their own clip
    /// and go after the groups.
    pub(crate) fn merge_draw_channels(&mut self) {
        let has_freeze_v = self.freeze_rows_count > 0;
        let has_freeze_h = self.freeze_columns_count > 0;
        let channels_count = self.splitter.count();
        debug_assert_eq!(self.splitter.current(), 0, "merge with a column channel active");

        let mut merge_groups: [MergeGroup; 4] = Default::default();

        // 1. Find the channels that can be merged.
        let merge_group_sub_count = if has_freeze_v { 2 } else { 1 };
        for column_n in 0..self.columns.len() {
            if !mask_has(self.visible_mask_by_index, column_n) {
                continue;
            }
            for merge_group_sub_n in 0..merge_group_sub_count {
                let column = &self.columns[column_n];
                let channel_no = if merge_group_sub_n == 0 {
                    column.draw_channel_frozen
                } else {
                    column.draw_channel_unfrozen
                };
                if channel_no < LEADING_DRAW_CHANNELS || channel_no >= channels_count {
                    continue;
                }

                let content_max_x = if !has_freeze_v {
                    column.content_max_x_unfrozen.max(column.content_max_x_headers_used)
                } else if merge_group_sub_n == 0 {
                    column.content_max_x_frozen.max(column.content_max_x_headers_used)
                } else {
                    column.content_max_x_unfrozen
                };
                let overflows = !column.flags.no_clip && content_max_x > column.clip_rect.max.x;

                let channel = self.splitter.stored_channel_mut(channel_no);
                if let Some(last) = channel.cmd_buffer.last() {
                    if last.elem_count == 0 && !last.is_callback() {
                        channel.cmd_buffer.pop();
                    }
                }
                if channel.cmd_buffer.len() != 1 || overflows {
                    continue;
                }
                let channel_clip = channel.cmd_buffer[0].clip_rect;

                let merge_group_n = usize::from(!(has_freeze_h && column_n < self.freeze_columns_count))
                    + if has_freeze_v && merge_group_sub_n == 0 { 0 } else { 2 };
                let group = &mut merge_groups[merge_group_n];
                if group.channels.contains(&channel_no) {
                    continue;
                }
                group.channels.push(channel_no);
                match &mut group.clip_rect {
                    Some(rect) => rect.add(&channel_clip),
                    None => group.clip_rect = Some(channel_clip),
                }
            }
        }
        if merge_groups.iter().all(|g| g.channels.is_empty()) {
            return;
        }

        // 2. New channel order: leading channels, each group, then the rest.
        let mut remaining = vec![true; channels_count];
        remaining[..LEADING_DRAW_CHANNELS].fill(false);
        if has_freeze_v {
            remaining[self.bg2_draw_channel_unfrozen] = false;
        }
        let host_rect = self.host_clip_rect;
        let mut order: Vec<usize> = (0..LEADING_DRAW_CHANNELS).collect();
        let mut merged = 0usize;
        for (merge_group_n, group) in merge_groups.iter_mut().enumerate() {
            if let Some(mut clip) = group.clip_rect {
                // Reach out to the host clip on the open sides, so the group
                // shares its clip with the background channels.
                if merge_group_n & 1 == 0 || !has_freeze_h {
                    clip.min.x = clip.min.x.min(host_rect.min.x);
                }
                if merge_group_n & 2 == 0 || !has_freeze_v {
                    clip.min.y = clip.min.y.min(host_rect.min.y);
                }
                if merge_group_n & 1 != 0 {
                    clip.max.x = clip.max.x.max(host_rect.max.x);
                }
                if merge_group_n & 2 != 0 {
                    clip.max.y = clip.max.y.max(host_rect.max.y);
                }

                group.channels.sort_unstable();
                for &channel_no in &group.channels {
                    remaining[channel_no] = false;
                    let channel = self.splitter.stored_channel_mut(channel_no);
                    debug_assert!(clip.contains_rect(&channel.cmd_buffer[0].clip_rect));
                    channel.cmd_buffer[0].clip_rect = clip;
                    order.push(channel_no);
                }
                merged += group.channels.len();
            }
            if merge_group_n == 1 && has_freeze_v {
                order.push(self.bg2_draw_channel_unfrozen);
            }
        }
        order.extend((0..channels_count).filter(|&n| remaining[n]));
        debug_assert_eq!(order.len(), channels_count);

        self.splitter.reorder_channels(&order);
        log::trace!(
            "table {}: {} of {} channels in merge groups",
            self.id,
            merged,
            channels_count
        );
    }
}
