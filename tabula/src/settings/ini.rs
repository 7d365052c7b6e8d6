//! Text form of the settings store.
//!
//! ```text
//! [Table][0x4D1E2F2B,3]
//! RefScale=13
//! Column 0  UserID=0x42AD2D21 Width=100 Visible=1 Order=0 Sort=0v
//! Column 1  Weight=1.25 Visible=1 Order=2
//! ```
//!
//! Anything that does not parse is skipped with a warning; loading never fails.

use std::fmt::{self, Write as _};

use super::{SettingsStore, TableSettings};
use crate::id::TableId;
use crate::table::SortDirection;

const TABLE_SECTION: &str = "Table";

/// Parse `0xID,COUNT`.
pub(super) fn parse_record_name(name: &str) -> Option<(TableId, usize)> {
    let (id, count) = name.split_once(',')?;
    let id = parse_hex(id.trim())?;
    let count = count.trim().parse::<usize>().ok()?;
    if id == 0 || count == 0 {
        log::warn!("settings: ignoring record [{TABLE_SECTION}][{name}]");
        return None;
    }
    Some((TableId::from_raw(id), count))
}

fn parse_hex(s: &str) -> Option<u32> {
    let digits = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s);
    u32::from_str_radix(digits, 16).ok()
}

/// `Sort=<order><dir>`: `^` is descending, any other char ascending.
fn parse_sort(value: &str) -> Option<(usize, SortDirection)> {
    let dir = value.chars().last()?;
    if dir.is_ascii_digit() {
        return None;
    }
    let order = value[..value.len() - dir.len_utf8()].parse::<usize>().ok()?;
    let direction = if dir == '^' {
        SortDirection::Descending
    } else {
        SortDirection::Ascending
    };
    Some((order, direction))
}

pub(super) fn read_line(settings: &mut TableSettings, line: &str) {
    let line = line.trim();
    if let Some(value) = line.strip_prefix("RefScale=") {
        match value.trim().parse::<f32>() {
            Ok(scale) => settings.ref_scale = scale,
            Err(_) => log::warn!("settings: table {}: bad RefScale {:?}", settings.id, value),
        }
        return;
    }

    let Some(rest) = line.strip_prefix("Column") else {
        log::warn!("settings: table {}: unknown line {:?}", settings.id, line);
        return;
    };
    let mut tokens = rest.split_whitespace();
    let Some(column_n) = tokens.next().and_then(|t| t.parse::<usize>().ok()) else {
        log::warn!("settings: table {}: bad column line {:?}", settings.id, line);
        return;
    };
    if column_n >= settings.columns_count {
        log::warn!(
            "settings: table {}: column {} out of range ({} columns)",
            settings.id,
            column_n,
            settings.columns_count
        );
        return;
    }

    let id = settings.id;
    let flags = &mut settings.save_flags;
    let column = &mut settings.columns[column_n];
    column.index = column_n;
    for token in tokens {
        let Some((key, value)) = token.split_once('=') else {
            log::warn!("settings: table {id}: column {column_n}: skipping {token:?}");
            continue;
        };
        let parsed = match key {
            "UserID" => parse_hex(value).map(|v| column.user_id = v),
            "Width" => value.parse::<i32>().ok().map(|v| {
                column.width_or_weight = v as f32;
                column.is_stretch = false;
                flags.width = true;
            }),
            "Weight" => value.parse::<f32>().ok().map(|v| {
                column.width_or_weight = v;
                column.is_stretch = true;
                flags.width = true;
            }),
            "Visible" => match value {
                "0" | "1" => {
                    column.is_enabled = Some(value == "1");
                    flags.visible = true;
                    Some(())
                }
                _ => None,
            },
            "Order" => value.parse::<usize>().ok().map(|v| {
                column.display_order = Some(v);
                flags.order = true;
            }),
            "Sort" => parse_sort(value).map(|(order, direction)| {
                column.sort_order = Some(order);
                column.sort_direction = direction;
                flags.sort = true;
            }),
            _ => None,
        };
        if parsed.is_none() {
            log::warn!("settings: table {id}: column {column_n}: skipping {token:?}");
        }
    }
}

pub(super) fn write_record<W: fmt::Write>(settings: &TableSettings, out: &mut W) -> fmt::Result {
    let flags = settings.save_flags;
    if settings.id.is_none() || !flags.any() {
        return Ok(());
    }

    writeln!(out, "[{TABLE_SECTION}][{},{}]", settings.id, settings.columns_count)?;
    if settings.ref_scale != 0.0 {
        writeln!(out, "RefScale={}", settings.ref_scale)?;
    }
    for (column_n, column) in settings.active_columns().iter().enumerate() {
        let save_sort = flags.sort && column.sort_order.is_some();
        if column.user_id == 0 && !flags.width && !flags.visible && !flags.order && !save_sort {
            continue;
        }
        write!(out, "Column {column_n:<2}")?;
        if column.user_id != 0 {
            write!(out, " UserID=0x{:08X}", column.user_id)?;
        }
        if flags.width {
            if column.is_stretch {
                write!(out, " Weight={}", column.width_or_weight)?;
            } else {
                write!(out, " Width={}", column.width_or_weight as i32)?;
            }
        }
        if flags.visible {
            write!(out, " Visible={}", u8::from(column.is_enabled.unwrap_or(true)))?;
        }
        if flags.order {
            write!(out, " Order={}", column.display_order.unwrap_or(column_n))?;
        }
        if let (true, Some(order)) = (flags.sort, column.sort_order) {
            let dir = if column.sort_direction == SortDirection::Descending {
                '^'
            } else {
                'v'
            };
            write!(out, " Sort={order}{dir}")?;
        }
        out.write_char('\n')?;
    }
    out.write_char('\n')
}

/// Load `[Type][Name]` sections into `store`. Sections of other types are
/// skipped. Returns the number of table records read.
pub(crate) fn parse_ini(store: &mut SettingsStore, text: &str) -> usize {
    let mut current: Option<usize> = None;
    let mut records = 0usize;
    for line in text.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with(';') {
            continue;
        }
        if line.starts_with('[') && line.ends_with(']') {
            current = None;
            let Some((kind, name)) = parse_section(line) else {
                log::warn!("settings: bad section header {line:?}");
                continue;
            };
            if kind != TABLE_SECTION {
                continue;
            }
            current = store.read_open(name);
            if current.is_some() {
                records += 1;
            }
            continue;
        }
        if let Some(offset) = current {
            store.read_line(offset, line);
        }
    }
    records
}

/// Split `[Type][Name]`.
fn parse_section(line: &str) -> Option<(&str, &str)> {
    let inner = line.strip_prefix('[')?.strip_suffix(']')?;
    let (kind, name) = inner.split_once("][")?;
    Some((kind, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_record_name() {
        assert_eq!(
            parse_record_name("0x0000002A,3"),
            Some((TableId::from_raw(42), 3))
        );
        assert_eq!(parse_record_name("0x0000002A"), None);
        assert_eq!(parse_record_name("nonsense,3"), None);
    }

    #[test]
    fn test_parse_sort_token() {
        assert_eq!(parse_sort("0v"), Some((0, SortDirection::Ascending)));
        assert_eq!(parse_sort("2^"), Some((2, SortDirection::Descending)));
        assert_eq!(parse_sort("1x"), Some((1, SortDirection::Ascending)));
        assert_eq!(parse_sort("3"), None);
        assert_eq!(parse_sort("v"), None);
    }

    #[test]
    fn test_parse_section() {
        assert_eq!(parse_section("[Table][0x1,2]"), Some(("Table", "0x1,2")));
        assert_eq!(parse_section("[Window][Debug##Default]"), Some(("Window", "Debug##Default")));
        assert_eq!(parse_section("[Table]"), None);
    }

    #[test]
    fn test_column_tokens_in_any_order() {
        let mut store = SettingsStore::new();
        let offset = store.read_open("0x00000010,2").unwrap();
        store.read_line(offset, "Column 1 Order=0 Sort=0^ Width=80");
        let settings = store.get(offset).unwrap();
        let column = settings.columns[1];
        assert_eq!(column.display_order, Some(0));
        assert_eq!(column.sort_direction, SortDirection::Descending);
        assert_eq!(column.width_or_weight, 80.0);
        assert!(settings.save_flags.width && settings.save_flags.order && settings.save_flags.sort);
    }

    #[test]
    fn test_weight_survives_text_exactly() {
        let mut store = SettingsStore::new();
        let offset = store.create(TableId::from_raw(0x20), 1);
        let settings = store.get_mut(offset).unwrap();
        settings.save_flags.width = true;
        settings.columns[0].is_stretch = true;
        settings.columns[0].width_or_weight = 1.0 / 3.0;

        let mut out = String::new();
        store.write_all(&mut out).unwrap();
        assert!(out.contains(" Weight=0.33333334"), "{out}");

        let mut restored = SettingsStore::new();
        assert_eq!(parse_ini(&mut restored, &out), 1);
        let offset = restored.find_by_id(TableId::from_raw(0x20)).unwrap();
        let column = restored.get(offset).unwrap().columns[0];
        assert!(column.is_stretch);
        assert_eq!(column.width_or_weight, 1.0 / 3.0);
    }
}
