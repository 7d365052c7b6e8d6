//! Moving column state between a table and its settings record.

use super::{Column, Table, TABLE_MAX_COLUMNS};
use crate::settings::{SaveFlags, SettingsStore};

impl Table {
    /// Offset of this table's record if it is still bound and large enough.
    /// A record too small for the current column count is discarded.
    fn bound_settings(&mut self, store: &mut SettingsStore) -> Option<usize> {
        let offset = self.settings_offset?;
        let settings = store.get_mut(offset)?;
        if settings.id != self.id {
            self.settings_offset = None;
            return None;
        }
        if settings.columns_count_max >= self.columns.len() {
            return Some(offset);
        }
        log::debug!(
            "table {}: settings record {} too small for {} columns, discarding",
            self.id,
            offset,
            self.columns.len()
        );
        settings.id = crate::id::TableId::NONE;
        self.settings_offset = None;
        None
    }

    pub(crate) fn load_settings(&mut self, store: &mut SettingsStore) {
        self.is_settings_request_load = false;
        if self.flags.no_saved_settings {
            return;
        }

        let offset = match self.settings_offset {
            Some(_) => self.bound_settings(store),
            None => {
                let found = store.find_by_id(self.id);
                if let Some(offset) = found {
                    self.settings_offset = Some(offset);
                }
                found
            }
        };
        let Some(settings) = offset.and_then(|o| store.get_mut(o)) else {
            return;
        };
        settings.want_apply = false;
        if settings.columns_count != self.columns.len() {
            log::warn!(
                "table {}: saved settings have {} columns, table has {}",
                self.id,
                settings.columns_count,
                self.columns.len()
            );
            self.is_settings_dirty = true;
        }
        log::debug!("table {}: loading settings {:?}", self.id, settings.save_flags);

        let flags = settings.save_flags;
        self.settings_loaded = flags;
        self.ref_scale = settings.ref_scale;

        let count = self.columns.len();
        for column_settings in settings.active_columns() {
            let column_n = column_settings.index;
            if column_n >= count {
                log::warn!(
                    "table {}: saved column {} out of range, skipped",
                    self.id,
                    column_n
                );
                continue;
            }
            let column = &mut self.columns[column_n];
            if flags.width {
                if column_settings.is_stretch {
                    column.stretch_weight = column_settings.width_or_weight;
                } else {
                    column.width_request = column_settings.width_or_weight;
                }
                column.auto_fit_queue = 0;
            }
            column.display_order = if flags.order {
                column_settings.display_order.unwrap_or(usize::MAX)
            } else {
                column_n
            };
            if flags.visible {
                if let Some(enabled) = column_settings.is_enabled {
                    column.is_user_enabled = enabled;
                    column.is_user_enabled_next_frame = enabled;
                }
            }
            column.sort_order = column_settings.sort_order;
            column.sort_direction = column_settings.sort_direction;
        }

        // Columns past the saved count keep their own slots; the result must
        // still be a permutation.
        let expected_mask = if count >= TABLE_MAX_COLUMNS {
            u64::MAX
        } else {
            (1u64 << count) - 1
        };
        let mut display_order_mask = 0u64;
        let mut display_order_valid = true;
        for column in &self.columns {
            let bit = 1u64.checked_shl(column.display_order as u32).unwrap_or(0);
            if column.display_order >= count || display_order_mask & bit != 0 {
                display_order_valid = false;
            }
            display_order_mask |= bit;
        }
        if !display_order_valid || display_order_mask != expected_mask {
            log::warn!(
                "table {}: saved display order is not a permutation, using identity",
                self.id
            );
            for (n, column) in self.columns.iter_mut().enumerate() {
                column.display_order = n;
            }
        }
        self.rebuild_display_order_index();
        self.is_sort_specs_dirty = true;
    }

    pub(crate) fn save_settings(&mut self, store: &mut SettingsStore) {
        if self.flags.no_saved_settings {
            return;
        }
        let count = self.columns.len();
        let offset = match self.bound_settings(store) {
            Some(offset) => offset,
            None => {
                // Rebind to an unbound record of ours when it is large enough.
                let reusable = store.find_by_id(self.id).and_then(|offset| {
                    let settings = store.get_mut(offset)?;
                    if settings.columns_count_max >= count {
                        return Some(offset);
                    }
                    settings.id = crate::id::TableId::NONE;
                    None
                });
                let offset = reusable.unwrap_or_else(|| store.create(self.id, count));
                self.settings_offset = Some(offset);
                offset
            }
        };
        let Some(settings) = store.get_mut(offset) else {
            return;
        };
        settings.columns_count = self.columns.len();

        let mut save_ref_scale = false;
        let mut flags = SaveFlags::default();
        for (n, (column, column_settings)) in self
            .columns
            .iter()
            .zip(settings.columns.iter_mut())
            .enumerate()
        {
            let width_or_weight = if column.is_stretch() {
                column.stretch_weight
            } else {
                column.width_request
            };
            column_settings.width_or_weight = width_or_weight;
            column_settings.user_id = column.user_id;
            column_settings.index = n;
            column_settings.display_order = Some(column.display_order);
            column_settings.sort_order = column.sort_order;
            column_settings.sort_direction = column.sort_direction;
            column_settings.is_enabled = Some(column.is_user_enabled);
            column_settings.is_stretch = column.is_stretch();
            if !column.is_stretch() {
                save_ref_scale = true;
            }

            // Defaults are not worth a line in the file.
            flags.width |= width_or_weight != column.init_stretch_weight_or_width;
            flags.order |= column.display_order != n;
            flags.sort |= column.sort_order.is_some();
            flags.visible |= column.is_user_enabled == column.flags.default_hide;
        }
        flags.width &= self.flags.resizable;
        flags.order &= self.flags.reorderable;
        flags.sort &= self.flags.sortable;
        flags.visible &= self.flags.hideable;
        settings.save_flags = flags;
        settings.ref_scale = if save_ref_scale { self.ref_scale } else { 0.0 };
        self.is_settings_dirty = false;
        log::debug!("table {}: saved settings {:?}", self.id, flags);
    }

    /// Forget user changes: widths, order, visibility and sort return to their
    /// declared defaults at the next frame.
    pub(crate) fn reset_settings(&mut self) {
        for (n, column) in self.columns.iter_mut().enumerate() {
            let width_auto = column.width_auto;
            *column = Column {
                display_order: n,
                width_auto,
                is_preserve_width_auto: true,
                ..Column::default()
            };
        }
        self.rebuild_display_order_index();
        self.is_initializing = true;
        self.is_settings_dirty = true;
        self.is_reset_all_request = false;
        self.is_settings_request_load = false;
        self.is_sort_specs_dirty = true;
        self.settings_loaded = SaveFlags::default();
        self.resize_drag = None;
        self.reorder_column = None;
        self.auto_fit_single_column = None;
        log::debug!("table {}: settings reset", self.id);
    }
}
