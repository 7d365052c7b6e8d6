use drawlist::{MonoMeasure, Rect, Vec2};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use tabula::{ColumnFlags, Context, InputState, SizingPolicy, SortDirection, Style, TableFlags};

const COLUMNS: usize = 3;
const COLUMN_WIDTH: f32 = 100.0;

fn context() -> Context {
    Context::new(
        Style::default().with_cell_padding(0.0, 0.0),
        Box::new(MonoMeasure::default()),
        Rect::new(0.0, 0.0, 640.0, 480.0),
    )
}

fn sortable() -> TableFlags {
    TableFlags::new().sizing(SizingPolicy::FixedFit).sortable()
}

/// Input clicking the header of `column_n`.
fn click_header(column_n: usize) -> InputState {
    InputState::at(column_n as f32 * COLUMN_WIDTH + COLUMN_WIDTH / 2.0, 5.0).click()
}

/// One frame with a header row and one body row.
fn run_frame(
    ctx: &mut Context,
    io: InputState,
    flags: TableFlags,
    columns: [ColumnFlags; COLUMNS],
    after_rows: impl FnOnce(&mut Context),
) {
    ctx.new_frame(io);
    assert!(ctx.begin_table_ex("sorted", COLUMNS, flags, Vec2::new(300.0, 0.0), 0.0));
    for (n, column_flags) in columns.into_iter().enumerate() {
        ctx.table_setup_column(&format!("C{n}"), column_flags, COLUMN_WIDTH, n as u32 + 1);
    }
    ctx.table_headers_row();
    ctx.table_next_row();
    for _ in 0..COLUMNS {
        ctx.table_next_column();
        ctx.table_text("x");
    }
    after_rows(ctx);
    ctx.end_table();
    ctx.end_frame();
}

fn idle() -> InputState {
    InputState::at(-100.0, -100.0)
}

fn plain() -> [ColumnFlags; COLUMNS] {
    [ColumnFlags::new(); COLUMNS]
}

fn sort_state(ctx: &Context, column_n: usize) -> (Option<usize>, SortDirection) {
    let column = &ctx.table("sorted").unwrap().columns[column_n];
    (column.sort_order, column.sort_direction)
}

/// `(column_index, sort_order, direction)` of the current specs.
fn specs(ctx: &mut Context) -> Vec<(usize, usize, SortDirection)> {
    let specs = ctx.table_get_sort_specs().unwrap();
    specs
        .specs()
        .iter()
        .map(|s| (s.column_index, s.sort_order, s.sort_direction))
        .collect()
}

// ============================================================================
// Header Clicks
// ============================================================================

#[test]
fn test_tristate_click_cycles_through_unsorted() {
    let mut ctx = context();
    let flags = sortable().sort_tristate();
    run_frame(&mut ctx, idle(), flags, plain(), |_| {});
    assert_eq!(sort_state(&ctx, 2), (None, SortDirection::None));

    let expected = [
        (Some(0), SortDirection::Ascending),
        (Some(0), SortDirection::Descending),
        (None, SortDirection::None),
        (Some(0), SortDirection::Ascending),
    ];
    for state in expected {
        run_frame(&mut ctx, click_header(2), flags, plain(), |_| {});
        assert_eq!(sort_state(&ctx, 2), state);
    }
}

#[test]
fn test_two_state_click_never_clears() {
    let mut ctx = context();
    run_frame(&mut ctx, idle(), sortable(), plain(), |_| {});
    // Something is always sorted: the first column takes over.
    assert_eq!(sort_state(&ctx, 0), (Some(0), SortDirection::Ascending));

    let expected = [
        SortDirection::Ascending,
        SortDirection::Descending,
        SortDirection::Ascending,
    ];
    for direction in expected {
        run_frame(&mut ctx, click_header(1), sortable(), plain(), |_| {});
        assert_eq!(sort_state(&ctx, 1), (Some(0), direction));
        assert_eq!(sort_state(&ctx, 0).0, None);
    }
}

#[test]
fn test_shift_click_appends_with_sort_multi() {
    let mut ctx = context();
    let flags = sortable().sort_multi();
    run_frame(&mut ctx, idle(), flags, plain(), |_| {});
    run_frame(&mut ctx, click_header(2).shift(), flags, plain(), |_| {});

    run_frame(&mut ctx, idle(), flags, plain(), |ctx| {
        assert_eq!(
            specs(ctx),
            vec![
                (0, 0, SortDirection::Ascending),
                (2, 1, SortDirection::Ascending),
            ]
        );
    });
}

#[test]
fn test_shift_click_replaces_without_sort_multi() {
    let mut ctx = context();
    run_frame(&mut ctx, idle(), sortable(), plain(), |_| {});
    run_frame(&mut ctx, click_header(2).shift(), sortable(), plain(), |_| {});

    run_frame(&mut ctx, idle(), sortable(), plain(), |ctx| {
        assert_eq!(specs(ctx), vec![(2, 0, SortDirection::Ascending)]);
    });
}

#[test]
fn test_no_sort_column_ignores_clicks() {
    let mut ctx = context();
    let columns = [ColumnFlags::new(), ColumnFlags::new().no_sort(), ColumnFlags::new()];
    run_frame(&mut ctx, idle(), sortable(), columns, |_| {});
    run_frame(&mut ctx, click_header(1), sortable(), columns, |_| {});

    assert_eq!(sort_state(&ctx, 1).0, None);
    assert_eq!(sort_state(&ctx, 0), (Some(0), SortDirection::Ascending));
}

// ============================================================================
// Sort Specs
// ============================================================================

#[test]
fn test_default_sort_prefers_declared_direction() {
    let mut ctx = context();
    let columns = [
        ColumnFlags::new(),
        ColumnFlags::new().default_sort().prefer_sort_descending(),
        ColumnFlags::new(),
    ];
    run_frame(&mut ctx, idle(), sortable(), columns, |ctx| {
        assert_eq!(specs(ctx), vec![(1, 0, SortDirection::Descending)]);
        let user_id = ctx.table_get_sort_specs().unwrap().specs()[0].column_user_id;
        assert_eq!(user_id, 2);
    });
}

#[test]
fn test_specs_dirty_only_after_change() {
    let mut ctx = context();
    run_frame(&mut ctx, idle(), sortable(), plain(), |ctx| {
        let specs = ctx.table_get_sort_specs().unwrap();
        assert!(specs.specs_dirty);
        specs.specs_dirty = false;
    });
    run_frame(&mut ctx, idle(), sortable(), plain(), |ctx| {
        assert!(!ctx.table_get_sort_specs().unwrap().specs_dirty);
        ctx.table_set_column_sort_direction(1, SortDirection::Descending, false);
        let specs = ctx.table_get_sort_specs().unwrap();
        assert!(specs.specs_dirty);
        assert_eq!(specs.len(), 1);
    });
}

#[test]
fn test_unsortable_table_has_no_specs() {
    let mut ctx = context();
    let flags = TableFlags::new().sizing(SizingPolicy::FixedFit);
    run_frame(&mut ctx, idle(), flags, plain(), |ctx| {
        assert!(ctx.table_get_sort_specs().is_none());
    });
}

#[test]
fn test_hidden_sorted_column_hands_sort_back() {
    let mut ctx = context();
    let flags = sortable().hideable();
    run_frame(&mut ctx, idle(), flags, plain(), |ctx| {
        ctx.table_set_column_sort_direction(1, SortDirection::Descending, false);
        ctx.table_set_column_enabled(1, false);
    });
    run_frame(&mut ctx, idle(), flags, plain(), |ctx| {
        assert_eq!(specs(ctx), vec![(0, 0, SortDirection::Ascending)]);
    });
}

// ============================================================================
// Properties
// ============================================================================

fn direction() -> impl Strategy<Value = SortDirection> {
    prop_oneof![Just(SortDirection::Ascending), Just(SortDirection::Descending)]
}

proptest! {
    #[test]
    fn prop_sort_orders_stay_dense(
        multi in any::<bool>(),
        ops in prop::collection::vec((0..COLUMNS, direction(), any::<bool>()), 1..12)
    ) {
        let mut ctx = context();
        let flags = if multi { sortable().sort_multi() } else { sortable() };
        let mut orders = Vec::new();
        let mut columns_sorted = Vec::new();
        run_frame(&mut ctx, idle(), flags, plain(), |ctx| {
            for (column_n, direction, append) in ops {
                ctx.table_set_column_sort_direction(column_n, direction, append);
            }
            for (column_n, order, _) in specs(ctx) {
                columns_sorted.push(column_n);
                orders.push(order);
            }
        });

        prop_assert!(!orders.is_empty());
        prop_assert_eq!(orders.clone(), (0..orders.len()).collect::<Vec<_>>());
        columns_sorted.sort_unstable();
        columns_sorted.dedup();
        prop_assert_eq!(columns_sorted.len(), orders.len());
        if !multi {
            prop_assert_eq!(orders.len(), 1);
        }
    }
}
