use drawlist::{MonoMeasure, Rect, Vec2};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tabula::{ColumnFlags, Context, InputState, SizingPolicy, Style, TableFlags, TableId};

fn context(width: f32) -> Context {
    Context::new(
        Style::default().with_cell_padding(0.0, 0.0),
        Box::new(MonoMeasure::default()),
        Rect::new(0.0, 0.0, width, 480.0),
    )
}

/// Mouse away from every table.
fn idle() -> InputState {
    InputState::at(-100.0, -100.0)
}

/// One frame: a table `width` wide, one row of text, then `after_rows` while
/// the table is still current.
fn run_frame(
    ctx: &mut Context,
    name: &str,
    flags: TableFlags,
    width: f32,
    columns: &[(ColumnFlags, f32)],
    after_rows: impl FnOnce(&mut Context),
) {
    ctx.new_frame(idle());
    assert!(ctx.begin_table_ex(name, columns.len(), flags, Vec2::new(width, 0.0), 0.0));
    for (n, &(column_flags, init)) in columns.iter().enumerate() {
        ctx.table_setup_column(&format!("C{n}"), column_flags, init, 0);
    }
    ctx.table_next_row();
    for _ in 0..columns.len() {
        ctx.table_next_column();
        ctx.table_text("x");
    }
    after_rows(ctx);
    ctx.end_table();
    ctx.end_frame();
}

fn widths(ctx: &Context, name: &str) -> Vec<f32> {
    ctx.table(name)
        .unwrap()
        .columns
        .iter()
        .map(|c| c.width_given)
        .collect()
}

// ============================================================================
// Fixed Columns
// ============================================================================

#[test]
fn test_fixed_columns_keep_their_width() {
    let mut ctx = context(640.0);
    let columns = [(ColumnFlags::fixed(), 100.0); 3];
    run_frame(&mut ctx, "a", TableFlags::new(), 300.0, &columns, |_| {});

    let table = ctx.table("a").unwrap();
    assert_eq!(widths(&ctx, "a"), vec![100.0, 100.0, 100.0]);
    let max_x: Vec<f32> = table.columns.iter().map(|c| c.max_x).collect();
    assert_eq!(max_x, vec![100.0, 200.0, 300.0]);
    assert_eq!(table.columns_enabled_count, 3);
    assert_eq!(table.columns_enabled_fixed_count, 3);
}

#[test]
fn test_column_width_clamped_to_minimum() {
    let mut ctx = context(640.0);
    let flags = TableFlags::new().sizing(SizingPolicy::FixedFit).resizable();
    let columns = [(ColumnFlags::new(), 100.0); 2];
    run_frame(&mut ctx, "min", flags, 300.0, &columns, |ctx| {
        ctx.table_set_column_width(0, 1.0);
    });
    // The request lands at the next begin.
    assert_eq!(widths(&ctx, "min")[0], 100.0);

    run_frame(&mut ctx, "min", flags, 300.0, &columns, |_| {});
    let min_width = ctx.style().min_column_width();
    assert_eq!(widths(&ctx, "min"), vec![min_width, 100.0]);
}

// ============================================================================
// Stretch Columns
// ============================================================================

#[test]
fn test_stretch_columns_share_remaining_width() {
    let mut ctx = context(640.0);
    let columns = [
        (ColumnFlags::fixed(), 80.0),
        (ColumnFlags::stretch(), 0.0),
        (ColumnFlags::stretch(), 0.0),
    ];
    run_frame(&mut ctx, "mixed", TableFlags::new(), 300.0, &columns, |_| {});

    assert_eq!(widths(&ctx, "mixed"), vec![80.0, 110.0, 110.0]);
    let table = ctx.table("mixed").unwrap();
    assert_eq!(table.left_most_stretched_column, Some(1));
    assert_eq!(table.right_most_stretched_column, Some(2));
}

#[test]
fn test_rounding_remainder_goes_to_rightmost_stretch() {
    let mut ctx = context(640.0);
    let columns = [(ColumnFlags::new(), 0.0); 3];
    run_frame(&mut ctx, "odd", TableFlags::new(), 301.0, &columns, |_| {});

    assert_eq!(widths(&ctx, "odd"), vec![100.0, 100.0, 101.0]);
}

#[test]
fn test_weights_split_width_proportionally() {
    let mut ctx = context(640.0);
    let flags = TableFlags::new().sizing(SizingPolicy::StretchProp);
    let columns = [(ColumnFlags::new(), 1.0), (ColumnFlags::new(), 3.0)];
    run_frame(&mut ctx, "prop", flags, 400.0, &columns, |_| {});

    assert_eq!(widths(&ctx, "prop"), vec![100.0, 300.0]);
}

#[test]
fn test_hidden_column_gives_width_to_others() {
    let mut ctx = context(640.0);
    let flags = TableFlags::new().hideable();
    let columns = [(ColumnFlags::new(), 0.0); 3];
    run_frame(&mut ctx, "b", flags, 300.0, &columns, |ctx| {
        ctx.table_set_column_enabled(1, false);
    });
    assert_eq!(widths(&ctx, "b"), vec![100.0, 100.0, 100.0]);

    run_frame(&mut ctx, "b", flags, 300.0, &columns, |ctx| {
        ctx.table_set_column_width_auto_all();
    });
    let table = ctx.table("b").unwrap();
    assert_eq!(table.enabled_mask_by_index, 0b101);
    assert!(!table.columns[1].is_enabled);
    assert_eq!(widths(&ctx, "b"), vec![150.0, 0.0, 150.0]);

    run_frame(&mut ctx, "b", flags, 300.0, &columns, |_| {});
    assert_eq!(widths(&ctx, "b"), vec![150.0, 0.0, 150.0]);
}

#[test]
fn test_hide_ignored_without_hideable() {
    let mut ctx = context(640.0);
    let columns = [(ColumnFlags::new(), 0.0); 2];
    run_frame(&mut ctx, "fixed-set", TableFlags::new(), 200.0, &columns, |ctx| {
        ctx.table_set_column_enabled(0, false);
    });
    run_frame(&mut ctx, "fixed-set", TableFlags::new(), 200.0, &columns, |_| {});

    assert_eq!(ctx.table("fixed-set").unwrap().columns_enabled_count, 2);
}

// ============================================================================
// Freezing
// ============================================================================

/// One frame of a frozen table. `scroll` takes effect at the next frame.
fn freeze_frame(ctx: &mut Context, flags: TableFlags, scroll: Vec2, columns: usize, rows: usize) {
    ctx.new_frame(idle());
    assert!(ctx.begin_table_ex("frozen", 3, flags, Vec2::new(300.0, 200.0), 0.0));
    ctx.table_setup_scroll_freeze(columns, rows);
    ctx.table_set_scroll(scroll);
    ctx.table_next_row();
    ctx.table_next_column();
    ctx.table_text("x");
    ctx.end_table();
    ctx.end_frame();
}

#[test]
fn test_freeze_needs_scroll_offset() {
    let mut ctx = context(640.0);
    let flags = TableFlags::new().scroll_x().scroll_y();
    freeze_frame(&mut ctx, flags, Vec2::ZERO, 1, 1);
    let table = ctx.table("frozen").unwrap();
    assert_eq!(table.scroll, Vec2::ZERO);
    assert_eq!(table.freeze_columns_request, 1);
    assert_eq!(table.freeze_rows_request, 1);
    assert_eq!(table.freeze_columns_count, 0);
    assert_eq!(table.freeze_rows_count, 0);
    assert!(table.is_unfrozen_rows);
}

#[test]
fn test_freeze_follows_scrolled_axis() {
    let mut ctx = context(640.0);
    let flags = TableFlags::new().scroll_x().scroll_y();
    let scroll = Vec2::new(0.0, 20.0);
    freeze_frame(&mut ctx, flags, scroll, 1, 1);
    freeze_frame(&mut ctx, flags, scroll, 1, 1);
    let table = ctx.table("frozen").unwrap();
    assert_eq!(table.freeze_columns_count, 0);
    assert_eq!(table.freeze_rows_count, 1);

    let scroll = Vec2::new(30.0, 20.0);
    freeze_frame(&mut ctx, flags, scroll, 1, 1);
    freeze_frame(&mut ctx, flags, scroll, 1, 1);
    let table = ctx.table("frozen").unwrap();
    assert_eq!(table.freeze_columns_count, 1);
    assert_eq!(table.freeze_rows_count, 1);
}

#[test]
fn test_freeze_ignored_without_scroll_flags() {
    let mut ctx = context(640.0);
    let scroll = Vec2::new(30.0, 20.0);
    freeze_frame(&mut ctx, TableFlags::new(), scroll, 1, 1);
    freeze_frame(&mut ctx, TableFlags::new(), scroll, 1, 1);
    let table = ctx.table("frozen").unwrap();
    assert_eq!(table.freeze_columns_request, 0);
    assert_eq!(table.freeze_columns_count, 0);
    assert_eq!(table.freeze_rows_count, 0);
}

#[test]
fn test_freeze_columns_clamped_to_count() {
    let mut ctx = context(640.0);
    let scroll = Vec2::new(30.0, 0.0);
    freeze_frame(&mut ctx, TableFlags::new().scroll_x(), scroll, 10, 0);
    freeze_frame(&mut ctx, TableFlags::new().scroll_x(), scroll, 10, 0);
    let table = ctx.table("frozen").unwrap();
    assert_eq!(table.freeze_columns_request, 3);
    assert_eq!(table.freeze_columns_count, 3);
}

// ============================================================================
// Placement
// ============================================================================

#[test]
fn test_auto_height_table_advances_cursor() {
    let mut ctx = context(640.0);
    let columns = [(ColumnFlags::new(), 0.0); 2];
    ctx.new_frame(idle());
    assert!(ctx.begin_table_ex("rows", 2, TableFlags::new(), Vec2::new(200.0, 0.0), 0.0));
    for (n, &(flags, init)) in columns.iter().enumerate() {
        ctx.table_setup_column(&format!("C{n}"), flags, init, 0);
    }
    for _ in 0..2 {
        ctx.table_next_row();
        ctx.table_next_column();
        ctx.table_text("x");
    }
    ctx.end_table();

    let line_height = 13.0;
    let spacing = ctx.style().item_spacing.y;
    assert_eq!(ctx.table("rows").unwrap().outer_rect.height(), line_height * 2.0);
    assert_eq!(ctx.cursor_pos().y, line_height * 2.0 + spacing);
    ctx.end_frame();
}

#[test]
fn test_clipped_table_is_skipped() {
    let mut ctx = context(640.0);
    ctx.new_frame(idle());
    ctx.set_cursor_pos(Vec2::new(0.0, 500.0));
    assert!(!ctx.begin_table("below", 2, TableFlags::new()));
    assert!(ctx.table("below").is_none());
    assert_eq!(ctx.cursor_pos().y, 500.0 + ctx.style().item_spacing.y);
    ctx.end_frame();
}

#[test]
fn test_nested_table_id_is_scoped_to_parent() {
    let mut ctx = context(640.0);
    ctx.new_frame(idle());
    assert!(ctx.begin_table_ex("outer", 2, TableFlags::new(), Vec2::new(300.0, 0.0), 0.0));
    ctx.table_next_row();
    ctx.table_next_column();
    assert!(ctx.begin_table("inner", 2, TableFlags::new()));
    ctx.table_next_row();
    ctx.table_next_column();
    ctx.table_text("a");
    ctx.end_table();
    assert_eq!(ctx.table_current().unwrap().name, "outer");
    ctx.end_table();
    ctx.end_frame();

    let outer_id = ctx.table("outer").unwrap().id;
    assert!(ctx.table("inner").is_none());
    assert!(ctx.table_by_id(TableId::from_name("inner", outer_id)).is_some());
    assert_eq!(ctx.tables_count(), 2);
}

#[test]
fn test_unused_tables_collected() {
    let mut ctx = context(640.0);
    let columns = [(ColumnFlags::new(), 0.0); 2];
    run_frame(&mut ctx, "old", TableFlags::new(), 200.0, &columns, |_| {});
    for _ in 0..3 {
        ctx.new_frame(idle());
        ctx.end_frame();
    }
    assert_eq!(ctx.gc_unused_tables(5), 0);
    assert_eq!(ctx.gc_unused_tables(2), 1);
    assert!(ctx.table("old").is_none());
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_stretch_widths_fill_table(count in 1usize..8, width in 100u32..1000) {
        let width = width as f32;
        let mut ctx = context(2000.0);
        let columns = vec![(ColumnFlags::new(), 0.0); count];
        run_frame(&mut ctx, "fill", TableFlags::new(), width, &columns, |_| {});

        let given = widths(&ctx, "fill");
        prop_assert_eq!(given.iter().sum::<f32>(), width);
        let min_width = ctx.style().min_column_width();
        prop_assert!(given.iter().all(|&w| w >= min_width && w == w.trunc()));
        let table = ctx.table("fill").unwrap();
        for pair in table.columns.windows(2) {
            prop_assert_eq!(pair[0].max_x, pair[1].min_x);
        }
    }
}
