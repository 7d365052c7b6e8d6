//! Column context menu as data: the host renders the items and reports
//! the chosen action back.

use super::Table;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextMenuAction {
    SizeColumnToFit(usize),
    SizeAllToFit,
    ResetOrder,
    /// Show or hide a column, effective next frame.
    ToggleColumn(usize),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContextMenuItem {
    pub label: String,
    pub action: ContextMenuAction,
    pub enabled: bool,
    /// Checkbox state for toggle items.
    pub checked: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ContextMenu {
    /// Column the menu was opened on, `None` for the table-wide menu.
    pub column: Option<usize>,
    pub items: Vec<ContextMenuItem>,
}

impl ContextMenu {
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn item(&self, action: ContextMenuAction) -> Option<&ContextMenuItem> {
        self.items.iter().find(|item| item.action == action)
    }
}

impl Table {
    pub(crate) fn open_context_menu(&mut self, column_n: Option<usize>) {
        if !(self.flags.resizable || self.flags.reorderable || self.flags.hideable) {
            return;
        }
        log::debug!("table {}: context menu opened on {:?}", self.id, column_n);
        self.is_context_popup_open = true;
        self.context_popup_column = column_n;
    }

    pub(crate) fn close_context_menu(&mut self) {
        self.is_context_popup_open = false;
        self.context_popup_column = None;
    }

    /// Items for the open menu, `None` when no menu is open.
    pub(crate) fn context_menu(&self) -> Option<ContextMenu> {
        if !self.is_context_popup_open {
            return None;
        }
        let column_n = self.context_popup_column.filter(|&n| n < self.columns.len());
        let mut items = Vec::new();

        if self.flags.resizable {
            if let Some(n) = column_n {
                let column = &self.columns[n];
                items.push(ContextMenuItem {
                    label: "Size column to fit".to_string(),
                    action: ContextMenuAction::SizeColumnToFit(n),
                    enabled: column.is_enabled && !column.flags.no_resize,
                    checked: None,
                });
            }
            items.push(ContextMenuItem {
                label: "Size all columns to fit".to_string(),
                action: ContextMenuAction::SizeAllToFit,
                enabled: true,
                checked: None,
            });
        }

        if self.flags.reorderable {
            items.push(ContextMenuItem {
                label: "Reset order".to_string(),
                action: ContextMenuAction::ResetOrder,
                enabled: !self.is_default_display_order,
                checked: None,
            });
        }

        if self.flags.hideable {
            for (n, column) in self.columns.iter().enumerate() {
                if column.flags.disabled {
                    continue;
                }
                let last_enabled = self.is_last_enabled_column(n);
                let label = if column.name.is_empty() {
                    format!("Column {n}")
                } else {
                    column.name.clone()
                };
                items.push(ContextMenuItem {
                    label,
                    action: ContextMenuAction::ToggleColumn(n),
                    enabled: !column.flags.no_hide && !last_enabled,
                    checked: Some(column.is_user_enabled_next_frame),
                });
            }
        }

        Some(ContextMenu {
            column: self.context_popup_column,
            items,
        })
    }

    /// Perform `action` and close the menu. Disabled items do nothing.
    pub(crate) fn context_menu_activate(&mut self, action: ContextMenuAction) -> bool {
        let enabled = self
            .context_menu()
            .and_then(|menu| menu.item(action).map(|item| item.enabled))
            .unwrap_or(false);
        self.close_context_menu();
        if !enabled {
            log::debug!("table {}: ignoring disabled menu action {:?}", self.id, action);
            return false;
        }
        match action {
            ContextMenuAction::SizeColumnToFit(n) => self.set_column_width_auto_single(n),
            ContextMenuAction::SizeAllToFit => self.set_column_width_auto_all(),
            ContextMenuAction::ResetOrder => self.is_reset_display_order_request = true,
            ContextMenuAction::ToggleColumn(n) => {
                let enabled = !self.columns[n].is_user_enabled_next_frame;
                return self.set_column_enabled(n, enabled);
            }
        }
        true
    }
}
