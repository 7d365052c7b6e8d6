mod files;
mod paths;
mod script;

use std::fs::{self, File};
use std::io;
use std::path::{Path, PathBuf};

use clap::Parser;
use drawlist::{MonoMeasure, Rect, Vec2};
use log::{debug, info, warn};
use simplelog::{Config, LevelFilter, WriteLogger};
use tabula::{ColumnFlags, Context, InputState, SizingPolicy, Style, TableFlags};

use files::{FileRow, COLUMN_KIND, COLUMN_NAME, COLUMN_SIZE};
use script::Script;

const TABLE_NAME: &str = "files";

/// Drive a sortable, resizable table through scripted input without a window
#[derive(Parser, Debug)]
#[command(name = "tabula-demo")]
#[command(version)]
struct Args {
    /// Table settings ini to load and save
    #[arg(long, value_name = "PATH")]
    settings: Option<PathBuf>,

    /// Style overrides as JSON
    #[arg(long, value_name = "PATH")]
    style: Option<PathBuf>,

    /// Log file (default: latest.log in the cache dir)
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Do not write the settings back on exit
    #[arg(long)]
    no_save: bool,

    /// Print the effective style as JSON and exit
    #[arg(long)]
    dump_style: bool,

    /// Print the directories used and exit
    #[arg(long)]
    show_paths: bool,
}

fn init_logging(path: Option<PathBuf>) {
    let Some(path) = path.or_else(paths::log_file) else {
        eprintln!("No log directory available, logging disabled");
        return;
    };
    if let Some(dir) = path.parent() {
        let _ = fs::create_dir_all(dir);
    }
    paths::rotate_logs(&path);
    let result = File::create(&path)
        .map_err(|e| e.to_string())
        .and_then(|file| {
            WriteLogger::init(LevelFilter::Debug, Config::default(), file).map_err(|e| e.to_string())
        });
    if let Err(e) = result {
        eprintln!("Failed to initialize logging at {}: {}", path.display(), e);
    }
}

/// Style from `path`, falling back to defaults when missing or invalid.
fn load_style(path: Option<&Path>) -> Style {
    let Some(path) = path else {
        return Style::default();
    };
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!("No style file at {}", path.display());
            return Style::default();
        }
        Err(e) => {
            warn!("Failed to read style {}: {}", path.display(), e);
            return Style::default();
        }
    };
    match serde_json::from_str(&text) {
        Ok(style) => {
            info!("Loaded style from {}", path.display());
            style
        }
        Err(e) => {
            warn!("Invalid style {}: {}, using defaults", path.display(), e);
            Style::default()
        }
    }
}

fn load_settings(ctx: &mut Context, path: &Path) {
    match ctx.load_ini_from_disk(path) {
        Ok(()) => info!("Loaded {} table settings from {}", ctx.settings().len(), path.display()),
        Err(e) if e.is_not_found() => debug!("No settings at {}", path.display()),
        Err(e) => warn!("{e}"),
    }
}

fn save_settings(ctx: &mut Context, path: &Path) {
    ctx.compact_table_settings();
    match ctx.save_ini_to_disk(path) {
        Ok(()) => info!("Saved table settings to {}", path.display()),
        Err(e) => warn!("{e}"),
    }
}

fn submit_table(ctx: &mut Context, rows: &mut [FileRow]) {
    let flags = TableFlags::new()
        .sizing(SizingPolicy::FixedFit)
        .resizable()
        .reorderable()
        .hideable()
        .sortable()
        .sort_multi()
        .row_bg()
        .borders()
        .scroll_y();
    if !ctx.begin_table_ex(TABLE_NAME, 3, flags, Vec2::new(0.0, 160.0), 0.0) {
        return;
    }
    ctx.table_setup_column("Name", ColumnFlags::stretch().no_hide(), 0.0, COLUMN_NAME);
    ctx.table_setup_column(
        "Size",
        ColumnFlags::new().prefer_sort_descending(),
        0.0,
        COLUMN_SIZE,
    );
    ctx.table_setup_column("Kind", ColumnFlags::new().default_hide(), 0.0, COLUMN_KIND);
    ctx.table_setup_scroll_freeze(0, 1);

    if let Some(specs) = ctx.table_get_sort_specs() {
        if specs.specs_dirty {
            debug!("Sorting rows by {:?}", specs.specs());
            files::sort_rows(rows, specs.specs());
            specs.specs_dirty = false;
        }
    }

    ctx.table_headers_row();
    for row in rows.iter() {
        ctx.table_next_row();
        ctx.table_next_column();
        ctx.table_text(&row.name);
        ctx.table_next_column();
        ctx.table_text(&row.size_label());
        ctx.table_next_column();
        ctx.table_text(row.kind);
    }

    if let Some(menu) = ctx.table_context_menu() {
        let labels: Vec<&str> = menu.items.iter().map(|item| item.label.as_str()).collect();
        info!("Context menu on {:?}: {:?}", menu.column, labels);
        // Show the hidden Kind column the way a user would.
        let action = tabula::ContextMenuAction::ToggleColumn(2);
        if menu.item(action).is_some_and(|item| item.checked == Some(false)) {
            ctx.table_context_menu_activate(action);
        } else {
            ctx.table_close_context_menu();
        }
    }
    ctx.end_table();
}

fn main() {
    let args = Args::parse();

    let settings_path = args.settings.clone().or_else(paths::settings_ini);
    let style_path = args.style.clone().or_else(paths::style_json);

    if args.show_paths {
        let show = |p: Option<PathBuf>| p.map_or("(unavailable)".to_string(), |p| p.display().to_string());
        println!("settings: {}", show(settings_path));
        println!("style:    {}", show(style_path));
        println!("log:      {}", show(args.log_file.or_else(paths::log_file)));
        return;
    }

    init_logging(args.log_file.clone());
    let style = load_style(style_path.as_deref());
    if args.dump_style {
        match serde_json::to_string_pretty(&style) {
            Ok(json) => println!("{json}"),
            Err(e) => eprintln!("Failed to serialize style: {e}"),
        }
        return;
    }

    let mut ctx = Context::new(
        style,
        Box::new(MonoMeasure::default()),
        Rect::new(0.0, 0.0, 480.0, 320.0),
    );
    if let Some(path) = &settings_path {
        load_settings(&mut ctx, path);
    }

    let mut rows = files::sample_rows();
    let mut script = Script::demo();
    while !script.is_done() {
        let io: InputState = script.next_input(ctx.table(TABLE_NAME));
        ctx.new_frame(io);
        submit_table(&mut ctx, &mut rows);
        ctx.end_frame();

        if ctx.want_save_ini() && !args.no_save {
            if let Some(path) = &settings_path {
                save_settings(&mut ctx, path);
            }
        }
    }

    if let Some(table) = ctx.table(TABLE_NAME) {
        for n in &table.display_order_to_index {
            let column = &table.columns[*n];
            println!(
                "{:<6} width {:>6.1} {}{}",
                column.name,
                column.width_given,
                if column.is_enabled { "shown" } else { "hidden" },
                match column.sort_order {
                    Some(order) => format!(", sort #{order} {:?}", column.sort_direction),
                    None => String::new(),
                }
            );
        }
    }
    println!(
        "{} rows, {} draw commands, first: {}",
        rows.len(),
        ctx.draw_list().visible_cmd_count(),
        rows.first().map_or("-", |r| r.name.as_str())
    );

    if !args.no_save {
        if let Some(path) = &settings_path {
            save_settings(&mut ctx, path);
        }
    }
    info!("Ran {} frames", ctx.frame_count());
}
