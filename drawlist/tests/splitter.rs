use drawlist::{DrawCmd, DrawList, DrawListSplitter, Rect, TextureId, Vec2};
use proptest::prelude::*;

const WHITE: u32 = 0xFFFF_FFFF;

fn host() -> DrawList {
    DrawList::new(Rect::new(0.0, 0.0, 400.0, 300.0))
}

fn quad(dl: &mut DrawList) {
    dl.add_rect_filled(Vec2::new(1.0, 1.0), Vec2::new(9.0, 9.0), WHITE);
}

fn assert_consistent(dl: &DrawList) {
    let mut offset = 0;
    for cmd in &dl.cmd_buffer {
        assert_eq!(cmd.idx_offset, offset, "idx_offset must be contiguous");
        offset += cmd.elem_count;
    }
    assert_eq!(offset as usize, dl.idx_buffer.len());
}

// ============================================================================
// Merge Tests
// ============================================================================

#[test]
fn test_merge_keeps_distinct_clip_rects_apart() {
    let mut dl = host();
    let mut s = DrawListSplitter::new();
    s.split(&dl, 3);

    for (ch, x) in [(1, 0.0), (2, 100.0)] {
        s.set_current_channel(&mut dl, ch);
        dl.push_clip_rect(Vec2::new(x, 0.0), Vec2::new(x + 100.0, 300.0), true);
        quad(&mut dl);
        dl.pop_clip_rect();
    }
    s.merge(&mut dl);

    assert_eq!(dl.visible_cmd_count(), 2);
    assert_eq!(dl.cmd_buffer[0].clip_rect.min.x, 0.0);
    assert_eq!(dl.cmd_buffer[1].clip_rect.min.x, 100.0);
    assert_consistent(&dl);
}

#[test]
fn test_merge_drops_trailing_empty_commands() {
    let mut dl = host();
    let mut s = DrawListSplitter::new();
    s.split(&dl, 4);
    s.set_current_channel(&mut dl, 2);
    quad(&mut dl);
    dl.push_clip_rect(Vec2::new(0.0, 0.0), Vec2::new(5.0, 5.0), true);
    s.merge(&mut dl);

    // One filled command plus the trailing command carrying the live clip rect.
    assert_eq!(dl.visible_cmd_count(), 1);
    let last = dl.cmd_buffer.last().unwrap();
    assert_eq!(last.elem_count, 0);
    assert_eq!(last.clip_rect, Rect::new(0.0, 0.0, 5.0, 5.0));
    assert_consistent(&dl);
}

#[test]
fn test_callback_is_never_folded() {
    fn cb(_: &DrawCmd, _: usize) {}

    let mut dl = host();
    let mut s = DrawListSplitter::new();
    s.split(&dl, 2);
    quad(&mut dl);
    dl.add_callback(cb, 1);
    s.set_current_channel(&mut dl, 1);
    quad(&mut dl);
    s.merge(&mut dl);

    let callbacks = dl.cmd_buffer.iter().filter(|c| c.is_callback()).count();
    assert_eq!(callbacks, 1);
    assert_eq!(dl.visible_cmd_count(), 3);
    assert_consistent(&dl);
}

#[test]
fn test_state_change_while_away_opens_new_cmd() {
    let mut dl = host();
    let mut s = DrawListSplitter::new();
    s.split(&dl, 2);
    s.set_current_channel(&mut dl, 1);
    quad(&mut dl);
    s.set_current_channel(&mut dl, 0);
    dl.push_texture_id(TextureId(3));
    s.set_current_channel(&mut dl, 1);
    quad(&mut dl);
    dl.pop_texture_id();
    s.merge(&mut dl);

    assert_eq!(dl.visible_cmd_count(), 2);
    assert_eq!(dl.cmd_buffer[1].texture_id, TextureId(3));
    assert_consistent(&dl);
}

#[test]
fn test_splitter_reusable_after_merge() {
    let mut dl = host();
    let mut s = DrawListSplitter::new();
    for _ in 0..3 {
        s.split(&dl, 3);
        s.set_current_channel(&mut dl, 2);
        quad(&mut dl);
        s.merge(&mut dl);
        assert!(!s.is_split());
    }
    assert_eq!(dl.idx_buffer.len(), 18);
    assert_consistent(&dl);
}

#[test]
fn test_draw_list_owned_channels() {
    let mut dl = host();
    dl.channels_split(2);
    dl.channels_set_current(1);
    quad(&mut dl);
    dl.channels_set_current(0);
    quad(&mut dl);
    dl.channels_merge();
    assert_eq!(dl.visible_cmd_count(), 1);
    assert_consistent(&dl);
}

// ============================================================================
// Conservation Property
// ============================================================================

proptest! {
    #[test]
    fn prop_merge_conserves_indices(
        plan in prop::collection::vec((0usize..4, 0usize..3, any::<bool>()), 0..40)
    ) {
        let mut dl = host();
        let mut s = DrawListSplitter::new();
        s.split(&dl, 4);

        let mut idx_written = 0usize;
        for (ch, quads, clipped) in plan {
            s.set_current_channel(&mut dl, ch);
            if clipped {
                dl.push_clip_rect(Vec2::new(0.0, 0.0), Vec2::new(50.0 + ch as f32, 50.0), true);
            }
            for _ in 0..quads {
                quad(&mut dl);
                idx_written += 6;
            }
            if clipped {
                dl.pop_clip_rect();
            }
        }
        s.set_current_channel(&mut dl, 0);
        let before: usize = (0..4)
            .map(|i| s.channel_cmds(&dl, i).iter().filter(|c| c.elem_count > 0).count())
            .sum();
        s.merge(&mut dl);

        prop_assert_eq!(dl.idx_buffer.len(), idx_written);
        prop_assert_eq!(dl.total_elem_count(), idx_written);
        prop_assert!(dl.visible_cmd_count() <= before);
    }
}
