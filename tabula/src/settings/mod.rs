//! Persisted column state, keyed by table id.
//!
//! Records live in a [`ChunkStream`]; tables hold the offset of their record.
//! A record is discarded by zeroing its id, and discarded records are only
//! reclaimed by the explicit [`SettingsStore::compact`] pass.

mod chunk;
mod ini;

pub use chunk::ChunkStream;
pub(crate) use ini::parse_ini;

use std::fmt;

use crate::id::TableId;
use crate::table::SortDirection;

/// Which parts of a table's state are worth persisting.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SaveFlags {
    pub width: bool,
    pub order: bool,
    pub sort: bool,
    pub visible: bool,
}

impl SaveFlags {
    pub fn any(self) -> bool {
        self.width || self.order || self.sort || self.visible
    }
}

/// One column of a [`TableSettings`] record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TableColumnSettings {
    pub width_or_weight: f32,
    pub user_id: u32,
    /// Column index this entry applies to.
    pub index: usize,
    pub display_order: Option<usize>,
    pub sort_order: Option<usize>,
    pub sort_direction: SortDirection,
    /// `None` when visibility was never recorded.
    pub is_enabled: Option<bool>,
    pub is_stretch: bool,
}

impl TableColumnSettings {
    fn new(index: usize) -> Self {
        Self {
            width_or_weight: 0.0,
            user_id: 0,
            index,
            display_order: None,
            sort_order: None,
            sort_direction: SortDirection::None,
            is_enabled: None,
            is_stretch: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableSettings {
    pub id: TableId,
    pub save_flags: SaveFlags,
    /// Font size the fixed widths were saved at, `0.0` when no fixed width was saved.
    pub ref_scale: f32,
    pub columns_count: usize,
    /// Capacity of `columns`. A record is reused for any count up to this.
    pub columns_count_max: usize,
    /// Set on load, cleared when a table picks the record up.
    pub want_apply: bool,
    pub columns: Vec<TableColumnSettings>,
}

impl TableSettings {
    fn new(id: TableId, columns_count: usize, columns_count_max: usize) -> Self {
        let mut settings = Self {
            id,
            save_flags: SaveFlags::default(),
            ref_scale: 0.0,
            columns_count,
            columns_count_max,
            want_apply: true,
            columns: Vec::new(),
        };
        settings.init(id, columns_count);
        settings
    }

    /// Reset in place, keeping capacity.
    fn init(&mut self, id: TableId, columns_count: usize) {
        debug_assert!(columns_count <= self.columns_count_max);
        self.id = id;
        self.save_flags = SaveFlags::default();
        self.ref_scale = 0.0;
        self.columns_count = columns_count;
        self.want_apply = true;
        self.columns = (0..self.columns_count_max)
            .map(TableColumnSettings::new)
            .collect();
    }

    /// Entries for the columns in use.
    pub fn active_columns(&self) -> &[TableColumnSettings] {
        &self.columns[..self.columns_count]
    }
}

#[derive(Debug, Default)]
pub struct SettingsStore {
    tables: ChunkStream<TableSettings>,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a fresh record and return its offset.
    pub fn create(&mut self, id: TableId, columns_count: usize) -> usize {
        let offset = self
            .tables
            .alloc(TableSettings::new(id, columns_count, columns_count));
        log::debug!(
            "settings: created record {} for table {} ({} columns)",
            offset,
            id,
            columns_count
        );
        offset
    }

    /// First live record with `id`.
    pub fn find_by_id(&self, id: TableId) -> Option<usize> {
        if id.is_none() {
            return None;
        }
        self.tables
            .iter()
            .find(|(_, s)| s.id == id)
            .map(|(offset, _)| offset)
    }

    pub fn get(&self, offset: usize) -> Option<&TableSettings> {
        self.tables.get(offset)
    }

    pub fn get_mut(&mut self, offset: usize) -> Option<&mut TableSettings> {
        self.tables.get_mut(offset)
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &TableSettings)> {
        self.tables.iter()
    }

    /// Number of records, discarded ones included.
    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }

    pub fn clear_all(&mut self) {
        self.tables.clear();
    }

    /// Flag every live record for re-application at its table's next begin.
    pub fn apply_all(&mut self) {
        for (_, settings) in self.tables.iter_mut() {
            if !settings.id.is_none() {
                settings.want_apply = true;
            }
        }
    }

    /// Drop discarded records. Returns the old-to-new offset map so bound
    /// tables can follow their record.
    pub fn compact(&mut self) -> Vec<Option<usize>> {
        let before = self.tables.len();
        let remap = self.tables.retain(|s| !s.id.is_none());
        log::debug!(
            "settings: compacted {} -> {} records",
            before,
            self.tables.len()
        );
        remap
    }

    /// Open the record named `0xID,COUNT` for loading. A known id is reused
    /// when its capacity fits, otherwise it is discarded and a new record
    /// takes its place.
    pub fn read_open(&mut self, name: &str) -> Option<usize> {
        let (id, columns_count) = ini::parse_record_name(name)?;
        if let Some(offset) = self.find_by_id(id) {
            if let Some(settings) = self.tables.get_mut(offset) {
                if settings.columns_count_max >= columns_count {
                    settings.init(id, columns_count);
                    return Some(offset);
                }
                settings.id = TableId::NONE;
            }
        }
        Some(self.create(id, columns_count))
    }

    /// Apply one line of a record opened with [`SettingsStore::read_open`].
    pub fn read_line(&mut self, offset: usize, line: &str) {
        if let Some(settings) = self.tables.get_mut(offset) {
            ini::read_line(settings, line);
        }
    }

    /// Serialize every live record with something to save.
    pub fn write_all<W: fmt::Write>(&self, out: &mut W) -> fmt::Result {
        for (_, settings) in self.tables.iter() {
            ini::write_record(settings, out)?;
        }
        Ok(())
    }
}
