use drawlist::{MonoMeasure, Rect, Vec2};
use pretty_assertions::assert_eq;
use tabula::{
    ColumnFlags, Context, InputState, SizingPolicy, SortDirection, Style, TableFlags, TableId,
};

const NAME: &str = "persisted";

fn context() -> Context {
    Context::new(
        Style::default().with_cell_padding(0.0, 0.0),
        Box::new(MonoMeasure::default()),
        Rect::new(0.0, 0.0, 640.0, 480.0),
    )
}

fn flags() -> TableFlags {
    TableFlags::new()
        .sizing(SizingPolicy::FixedFit)
        .resizable()
        .reorderable()
        .hideable()
        .sortable()
}

fn id() -> TableId {
    TableId::from_name(NAME, TableId::NONE)
}

/// One frame of a `count`-column table with 100 wide columns.
fn run_frame(ctx: &mut Context, count: usize, after_rows: impl FnOnce(&mut Context)) {
    ctx.new_frame(InputState::at(-100.0, -100.0));
    assert!(ctx.begin_table_ex(NAME, count, flags(), Vec2::new(400.0, 0.0), 0.0));
    for n in 0..count {
        ctx.table_setup_column(&format!("C{n}"), ColumnFlags::new(), 100.0, 0);
    }
    ctx.table_next_row();
    for _ in 0..count {
        ctx.table_next_column();
        ctx.table_text("x");
    }
    after_rows(ctx);
    ctx.end_table();
    ctx.end_frame();
}

// ============================================================================
// Round Trip
// ============================================================================

#[test]
fn test_user_changes_survive_save_and_load() {
    let mut ctx = context();
    run_frame(&mut ctx, 3, |_| {});
    run_frame(&mut ctx, 3, |ctx| {
        ctx.table_set_column_width(0, 150.0);
        assert!(ctx.table_queue_reorder(2, -1));
        ctx.table_set_column_enabled(1, false);
        ctx.table_set_column_sort_direction(2, SortDirection::Descending, false);
    });
    run_frame(&mut ctx, 3, |_| {});
    let ini = ctx.save_ini_to_string();
    assert!(ini.starts_with(&format!("[Table][{},3]\n", id())));

    let mut restored = context();
    restored.load_ini_from_str(&ini);
    run_frame(&mut restored, 3, |_| {});

    let table = restored.table(NAME).unwrap();
    assert_eq!(table.columns[0].width_given, 150.0);
    assert_eq!(table.display_order_to_index, vec![0, 2, 1]);
    assert!(!table.columns[1].is_enabled);
    assert_eq!(table.columns[2].sort_order, Some(0));
    assert_eq!(table.columns[2].sort_direction, SortDirection::Descending);
    assert_eq!(table.columns[0].sort_order, None);
}

#[test]
fn test_untouched_table_writes_nothing() {
    let mut ctx = context();
    run_frame(&mut ctx, 3, |_| {});
    run_frame(&mut ctx, 3, |_| {});
    assert_eq!(ctx.save_ini_to_string(), "");
}

#[test]
fn test_loading_reapplies_to_live_tables() {
    let mut ctx = context();
    run_frame(&mut ctx, 2, |_| {});
    ctx.load_ini_from_str(&format!("[Table][{},2]\nColumn 0 Width=100\nColumn 1 Width=42\n", id()));
    run_frame(&mut ctx, 2, |_| {});

    let table = ctx.table(NAME).unwrap();
    assert_eq!(table.columns[1].width_given, 42.0);
    assert_eq!(table.columns[0].width_given, 100.0);
}

#[test]
fn test_other_sections_are_skipped() {
    let mut ctx = context();
    let ini = format!(
        "[Window][Main]\nPos=10,10\n\n[Table][{}, 2]\nColumn 0 Width=70\n; comment\n",
        id()
    );
    ctx.load_ini_from_str(&ini);
    run_frame(&mut ctx, 2, |_| {});

    assert_eq!(ctx.table(NAME).unwrap().columns[0].width_given, 70.0);
    assert_eq!(ctx.settings().len(), 1);
}

// ============================================================================
// Bad Input
// ============================================================================

#[test]
fn test_duplicate_display_order_falls_back_to_identity() {
    let mut ctx = context();
    let ini = format!(
        "[Table][{}, 3]\nColumn 0 Order=0\nColumn 1 Order=0\nColumn 2 Order=1\n",
        id()
    );
    ctx.load_ini_from_str(&ini);
    run_frame(&mut ctx, 3, |_| {});

    assert_eq!(ctx.table(NAME).unwrap().display_order_to_index, vec![0, 1, 2]);
}

#[test]
fn test_out_of_range_display_order_falls_back_to_identity() {
    let mut ctx = context();
    let ini = format!(
        "[Table][{}, 3]\nColumn 0 Order=2\nColumn 1 Order=7\nColumn 2 Order=0\n",
        id()
    );
    ctx.load_ini_from_str(&ini);
    run_frame(&mut ctx, 3, |_| {});

    assert_eq!(ctx.table(NAME).unwrap().display_order_to_index, vec![0, 1, 2]);
}

#[test]
fn test_malformed_tokens_are_skipped() {
    let mut ctx = context();
    let ini = format!(
        "[Table][{},3]\nRefScale=oops\nColumn 0 Width=wide Visible=1 Order=0\nColumn 1 Bogus Visible=0 Order=1\nColumn 2 Order=2 Sort=0\nColumn x Width=1\nWidth=5\n",
        id()
    );
    ctx.load_ini_from_str(&ini);
    run_frame(&mut ctx, 3, |_| {});

    let table = ctx.table(NAME).unwrap();
    assert_eq!(table.columns[0].width_given, 100.0);
    assert!(table.columns[0].is_enabled);
    assert!(!table.columns[1].is_enabled);
    assert_eq!(table.display_order_to_index, vec![0, 1, 2]);
}

#[test]
fn test_all_hidden_settings_show_first_in_display_order() {
    let mut ctx = context();
    let ini = format!(
        "[Table][{},3]\nColumn 0 Visible=0 Order=2\nColumn 1 Visible=0 Order=0\nColumn 2 Visible=0 Order=1\n",
        id()
    );
    ctx.load_ini_from_str(&ini);
    run_frame(&mut ctx, 3, |_| {});

    let table = ctx.table(NAME).unwrap();
    assert_eq!(table.display_order_to_index, vec![1, 2, 0]);
    assert_eq!(table.columns_enabled_count, 1);
    assert!(table.columns[1].is_enabled);
    assert!(!table.columns[0].is_enabled);
}

#[test]
fn test_bad_record_names_are_ignored() {
    let mut ctx = context();
    ctx.load_ini_from_str("[Table][0x00000000,3]\nColumn 0 Width=10\n[Table][zz,3]\n[Table][0x1234]\n");
    assert!(ctx.settings().is_empty());
}

// ============================================================================
// Column Count Changes
// ============================================================================

#[test]
fn test_record_for_fewer_columns_is_replaced() {
    let mut ctx = context();
    let ini = format!("[Table][{},2]\nColumn 0 Width=150 Order=1\nColumn 1 Width=60 Order=0\n", id());
    ctx.load_ini_from_str(&ini);
    run_frame(&mut ctx, 3, |_| {});

    let table = ctx.table(NAME).unwrap();
    assert_eq!(table.columns[0].width_given, 150.0);
    assert_eq!(table.columns[1].width_given, 60.0);
    assert_eq!(table.columns[2].width_given, 100.0);
    assert_eq!(table.display_order_to_index, vec![1, 0, 2]);

    // The two-column record is too small and has been discarded.
    assert_eq!(ctx.settings().len(), 2);
    let live: Vec<usize> = ctx
        .settings()
        .iter()
        .filter(|(_, s)| !s.id.is_none())
        .map(|(_, s)| s.columns_count)
        .collect();
    assert_eq!(live, vec![3]);

    let ini = ctx.save_ini_to_string();
    assert!(ini.contains(&format!("[Table][{},3]", id())));
    assert!(!ini.contains(",2]"));
}

#[test]
fn test_compaction_keeps_tables_bound() {
    let mut ctx = context();
    ctx.load_ini_from_str(&format!("[Table][{},2]\nColumn 0 Width=150\n", id()));
    run_frame(&mut ctx, 3, |_| {});
    assert_eq!(ctx.settings().len(), 2);

    ctx.compact_table_settings();
    assert_eq!(ctx.settings().len(), 1);
    assert_eq!(ctx.table(NAME).unwrap().settings_offset, Some(0));

    run_frame(&mut ctx, 3, |ctx| ctx.table_set_column_width(1, 80.0));
    run_frame(&mut ctx, 3, |_| {});
    let ini = ctx.save_ini_to_string();
    assert!(ini.contains("Column 1  Width=80"));
    assert_eq!(ctx.settings().len(), 1);
}

#[test]
fn test_reset_returns_to_declared_defaults() {
    let mut ctx = context();
    run_frame(&mut ctx, 2, |_| {});
    run_frame(&mut ctx, 2, |ctx| {
        ctx.table_set_column_width(0, 150.0);
        ctx.table_queue_reorder(0, 1);
    });
    run_frame(&mut ctx, 2, |_| {});
    assert_eq!(ctx.table(NAME).unwrap().display_order_to_index, vec![1, 0]);

    run_frame(&mut ctx, 2, |ctx| ctx.table_reset_settings());
    run_frame(&mut ctx, 2, |_| {});
    let table = ctx.table(NAME).unwrap();
    assert_eq!(table.display_order_to_index, vec![0, 1]);
    assert_eq!(table.columns[0].width_given, 100.0);
}

// ============================================================================
// Save Timer
// ============================================================================

#[test]
fn test_change_arms_save_timer() {
    let mut ctx = context();
    ctx.style_mut().settings_save_delay_secs = 0.03;
    run_frame(&mut ctx, 2, |_| {});
    assert!(!ctx.want_save_ini());

    run_frame(&mut ctx, 2, |ctx| ctx.table_set_column_width(0, 120.0));
    run_frame(&mut ctx, 2, |_| {});
    run_frame(&mut ctx, 2, |_| {});
    run_frame(&mut ctx, 2, |_| {});
    assert!(ctx.want_save_ini());

    let ini = ctx.save_ini_to_string();
    assert!(ini.contains("Width=120"));
    assert!(!ctx.want_save_ini());
}

#[test]
fn test_disk_round_trip() {
    let dir = std::env::temp_dir().join(format!("tabula-settings-{}", std::process::id()));
    let path = dir.join("nested").join("tables.ini");

    let mut ctx = context();
    run_frame(&mut ctx, 2, |_| {});
    run_frame(&mut ctx, 2, |ctx| ctx.table_set_column_width(1, 90.0));
    run_frame(&mut ctx, 2, |_| {});
    ctx.save_ini_to_disk(&path).unwrap();

    let mut restored = context();
    restored.load_ini_from_disk(&path).unwrap();
    run_frame(&mut restored, 2, |_| {});
    assert_eq!(restored.table(NAME).unwrap().columns[1].width_given, 90.0);

    let missing = restored.load_ini_from_disk(&dir.join("missing.ini")).unwrap_err();
    assert!(missing.is_not_found());
    std::fs::remove_dir_all(&dir).unwrap();
}
