//! The context owning every table, the settings store and the draw list.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use drawlist::{DrawList, Rect, TextMeasure, Vec2};

use crate::error::SettingsError;
use crate::id::TableId;
use crate::input::InputState;
use crate::settings::{parse_ini, SettingsStore};
use crate::style::Style;
use crate::table::Table;

/// Borrowed view of the per-frame state a table needs while it is current.
pub(crate) struct FrameCtx<'a> {
    pub style: &'a Style,
    pub io: &'a InputState,
    pub draw_list: &'a mut DrawList,
    pub measure: &'a dyn TextMeasure,
    pub frame_count: u64,
}

/// State shared by all tables of a UI.
///
/// Tables live in a map keyed by [`TableId`]. Between `begin_table` and
/// `end_table` a table is moved onto a stack, so nested tables each own their
/// splitter and never alias.
///
/// # Example
///
/// ```ignore
/// use tabula::{Context, InputState, Style, TableFlags};
///
/// let mut ctx = Context::new(Style::default(), Box::new(MonoMeasure::default()), display);
/// ctx.new_frame(InputState::at(10.0, 10.0));
/// if ctx.begin_table("files", 3, TableFlags::new().resizable()) {
///     ctx.table_setup_column("Name", ColumnFlags::new(), 0.0, 0);
///     ctx.table_headers_row();
///     ctx.table_next_column();
///     ctx.table_text("readme.md");
///     ctx.end_table();
/// }
/// ctx.end_frame();
/// ```
pub struct Context {
    pub(crate) style: Style,
    pub(crate) io: InputState,
    pub(crate) draw_list: DrawList,
    pub(crate) measure: Box<dyn TextMeasure>,
    pub(crate) frame_count: u64,
    pub(crate) display_rect: Rect,
    /// Layout cursor of the host window: where the next table starts.
    pub(crate) cursor: Vec2,

    pub(crate) tables: HashMap<TableId, Table>,
    pub(crate) table_stack: Vec<Table>,
    pub(crate) settings: SettingsStore,
    /// Seconds left before dirty settings are due for writing.
    pub(crate) settings_dirty_timer: Option<f32>,
    pub(crate) want_save_ini: bool,
}

impl Context {
    pub fn new(style: Style, measure: Box<dyn TextMeasure>, display_rect: Rect) -> Self {
        Self {
            style,
            io: InputState::default(),
            draw_list: DrawList::new(display_rect),
            measure,
            frame_count: 0,
            display_rect,
            cursor: display_rect.min,
            tables: HashMap::new(),
            table_stack: Vec::new(),
            settings: SettingsStore::new(),
            settings_dirty_timer: None,
            want_save_ini: false,
        }
    }

    /// Start a frame with this frame's input. Clears the draw list and moves
    /// the layout cursor back to the top-left of the display.
    pub fn new_frame(&mut self, io: InputState) {
        assert!(
            self.table_stack.is_empty(),
            "new_frame() with {} table(s) still open, missing end_table()",
            self.table_stack.len()
        );
        self.io = io;
        self.frame_count += 1;
        self.draw_list.set_full_clip_rect(self.display_rect);
        self.draw_list.reset_for_new_frame();
        self.cursor = self.display_rect.min;
    }

    /// Finish the frame: run the settings save timer.
    pub fn end_frame(&mut self) {
        assert!(
            self.table_stack.is_empty(),
            "end_frame() with {} table(s) still open, missing end_table()",
            self.table_stack.len()
        );
        if let Some(timer) = self.settings_dirty_timer.as_mut() {
            *timer -= self.io.delta_time;
            if *timer <= 0.0 {
                log::debug!("settings: save delay elapsed");
                self.settings_dirty_timer = None;
                self.want_save_ini = true;
            }
        }
    }

    pub fn style(&self) -> &Style {
        &self.style
    }

    pub fn style_mut(&mut self) -> &mut Style {
        &mut self.style
    }

    pub fn io(&self) -> &InputState {
        &self.io
    }

    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn draw_list(&self) -> &DrawList {
        &self.draw_list
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn cursor_pos(&self) -> Vec2 {
        self.cursor
    }

    /// Place the next table at `pos`.
    pub fn set_cursor_pos(&mut self, pos: Vec2) {
        self.cursor = pos;
    }

    /// Table named `name` at the top level, if it exists and is not being submitted.
    pub fn table(&self, name: &str) -> Option<&Table> {
        self.tables.get(&TableId::from_name(name, TableId::NONE))
    }

    pub fn table_by_id(&self, id: TableId) -> Option<&Table> {
        self.tables.get(&id)
    }

    pub fn tables_count(&self) -> usize {
        self.tables.len()
    }

    /// Split borrows for the table being submitted.
    pub(crate) fn current(&mut self) -> (&mut Table, FrameCtx<'_>, &mut SettingsStore) {
        let Context {
            style,
            io,
            draw_list,
            measure,
            frame_count,
            table_stack,
            settings,
            ..
        } = self;
        let Some(table) = table_stack.last_mut() else {
            panic!("table call outside begin_table()/end_table()");
        };
        let frame = FrameCtx {
            style,
            io,
            draw_list,
            measure: &**measure,
            frame_count: *frame_count,
        };
        (table, frame, settings)
    }

    pub(crate) fn current_table(&self) -> Option<&Table> {
        self.table_stack.last()
    }

    pub(crate) fn mark_settings_dirty(&mut self) {
        if self.settings_dirty_timer.is_none() {
            self.settings_dirty_timer = Some(self.style.settings_save_delay_secs);
        }
    }

    /// Forget a table. Its settings record stays in the store.
    pub fn table_gc(&mut self, name: &str) -> bool {
        let id = TableId::from_name(name, TableId::NONE);
        let removed = self.tables.remove(&id).is_some();
        if removed {
            log::debug!("table {id}: removed");
        }
        removed
    }

    /// Remove tables not begun during the last `max_age` frames.
    pub fn gc_unused_tables(&mut self, max_age: u64) -> usize {
        let frame_count = self.frame_count;
        let before = self.tables.len();
        self.tables.retain(|id, table| {
            let keep = frame_count.saturating_sub(table.last_frame_active) <= max_age;
            if !keep {
                log::debug!("table {id}: unused for {max_age} frames, removed");
            }
            keep
        });
        before - self.tables.len()
    }

    /// Drop discarded settings records. Bound tables follow their record to
    /// its new offset.
    pub fn compact_table_settings(&mut self) {
        let remap = self.settings.compact();
        for table in self.tables.values_mut() {
            if let Some(offset) = table.settings_offset {
                table.settings_offset = remap.get(offset).copied().flatten();
            }
        }
    }

    /// Replace all table settings with the content of an ini text. Tables
    /// re-apply their settings at their next begin.
    pub fn load_ini_from_str(&mut self, text: &str) {
        self.settings.clear_all();
        let records = parse_ini(&mut self.settings, text);
        self.settings.apply_all();
        for table in self.tables.values_mut() {
            table.settings_offset = None;
            table.is_settings_request_load = true;
        }
        log::debug!("settings: loaded {records} table record(s)");
    }

    /// Load the ini file at `path`. A missing file is reported as an error;
    /// check [`SettingsError::is_not_found`] to treat it as empty.
    pub fn load_ini_from_disk(&mut self, path: &Path) -> Result<(), SettingsError> {
        let text = fs::read_to_string(path).map_err(|e| SettingsError::read(path, e))?;
        self.load_ini_from_str(&text);
        Ok(())
    }

    /// Serialize settings, saving dirty tables first.
    pub fn save_ini_to_string(&mut self) -> String {
        for table in self.tables.values_mut() {
            if table.is_settings_dirty {
                table.save_settings(&mut self.settings);
            }
        }
        self.want_save_ini = false;
        self.settings_dirty_timer = None;
        let mut out = String::new();
        if let Err(e) = self.settings.write_all(&mut out) {
            log::error!("settings: failed to format records: {e}");
        }
        out
    }

    pub fn save_ini_to_disk(&mut self, path: &Path) -> Result<(), SettingsError> {
        let text = self.save_ini_to_string();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| SettingsError::write(path, e))?;
        }
        fs::write(path, text).map_err(|e| SettingsError::write(path, e))?;
        log::debug!("settings: saved to {}", path.display());
        Ok(())
    }

    /// True once settings changed and the save delay elapsed.
    pub fn want_save_ini(&self) -> bool {
        self.want_save_ini
    }
}
