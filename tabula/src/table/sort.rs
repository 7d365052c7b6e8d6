//! Sort state: direction cycling, order sanitizing and the cached public view.

use smallvec::SmallVec;

use super::flags::{ColumnFlags, SortDirection, TableFlags};
use super::{Table, TABLE_MAX_COLUMNS};

/// One participant in the active sort.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TableColumnSortSpec {
    pub column_user_id: u32,
    pub column_index: usize,
    /// 0 for the primary key, 1 for the secondary, ...
    pub sort_order: usize,
    pub sort_direction: SortDirection,
}

/// Read-only projection of the columns' sort fields, rebuilt only when dirty.
///
/// `specs_dirty` is raised on every rebuild; clear it once the data has been sorted.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TableSortSpecs {
    specs: SmallVec<[TableColumnSortSpec; 1]>,
    pub specs_dirty: bool,
}

impl TableSortSpecs {
    /// Specs ordered by `sort_order`.
    pub fn specs(&self) -> &[TableColumnSortSpec] {
        &self.specs
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }
}

/// Directions offered by a column, preferred one first.
pub(crate) fn available_sort_directions(
    table_flags: &TableFlags,
    flags: &ColumnFlags,
) -> SmallVec<[SortDirection; 3]> {
    let mut list = SmallVec::new();
    if !table_flags.sortable {
        return list;
    }
    if flags.prefer_sort_ascending && !flags.no_sort_ascending {
        list.push(SortDirection::Ascending);
    }
    if flags.prefer_sort_descending && !flags.no_sort_descending {
        list.push(SortDirection::Descending);
    }
    if !flags.prefer_sort_ascending && !flags.no_sort_ascending {
        list.push(SortDirection::Ascending);
    }
    if !flags.prefer_sort_descending && !flags.no_sort_descending {
        list.push(SortDirection::Descending);
    }
    if table_flags.sort_tristate || list.is_empty() {
        list.push(SortDirection::None);
    }
    list
}

impl Table {
    fn avail_sort_direction(&self, column_n: usize, n: usize) -> SortDirection {
        self.columns[column_n]
            .sort_directions_avail
            .get(n)
            .copied()
            .unwrap_or(SortDirection::None)
    }

    /// Direction a header click moves `column_n` to.
    pub fn column_next_sort_direction(&self, column_n: usize) -> SortDirection {
        self.check_column_index(column_n);
        let column = &self.columns[column_n];
        if column.sort_order.is_none() {
            return self.avail_sort_direction(column_n, 0);
        }
        let avail = &column.sort_directions_avail;
        match avail.iter().position(|&d| d == column.sort_direction) {
            Some(n) => avail[(n + 1) % avail.len()],
            None => SortDirection::None,
        }
    }

    /// Reset a sorted column's direction when it is no longer offered.
    pub(crate) fn fix_column_sort_direction(&mut self, column_n: usize) {
        let column = &self.columns[column_n];
        if column.sort_order.is_none()
            || column.sort_directions_avail.contains(&column.sort_direction)
        {
            return;
        }
        let first = self.avail_sort_direction(column_n, 0);
        self.columns[column_n].sort_direction = first;
        self.is_sort_specs_dirty = true;
    }

    /// Sort `column_n` in `direction`. Without `append` (or without multi-sort)
    /// every other column stops sorting.
    pub fn set_column_sort_direction(
        &mut self,
        column_n: usize,
        direction: SortDirection,
        append: bool,
    ) {
        self.check_column_index(column_n);
        let append = append && self.flags.sort_multi;
        debug_assert!(
            self.flags.sort_tristate || direction != SortDirection::None,
            "SortDirection::None requires a tristate table"
        );

        let sort_order_max = if append {
            self.columns
                .iter()
                .filter_map(|c| c.sort_order)
                .max()
                .unwrap_or(0)
        } else {
            0
        };

        let column = &mut self.columns[column_n];
        column.sort_direction = direction;
        if direction == SortDirection::None {
            column.sort_order = None;
        } else if column.sort_order.is_none() || !append {
            column.sort_order = Some(if append { sort_order_max + 1 } else { 0 });
        }

        for other_n in 0..self.columns.len() {
            if other_n != column_n && !append {
                self.columns[other_n].sort_order = None;
            }
            self.fix_column_sort_direction(other_n);
        }
        self.is_settings_dirty = true;
        self.is_sort_specs_dirty = true;
    }

    /// Restore sort-order invariants: disabled columns unsorted, orders dense
    /// from 0 without duplicates, at most one in single-sort mode, and a fallback
    /// column when sorting cannot be empty. Returns the number of sorted columns.
    pub fn sort_specs_sanitize(&mut self) -> usize {
        let mut sort_order_count = 0usize;
        let mut sort_order_mask = 0u64;
        let mut out_of_range = false;
        for column in &mut self.columns {
            if column.sort_order.is_some() && !column.is_enabled {
                column.sort_order = None;
            }
            let Some(order) = column.sort_order else {
                continue;
            };
            sort_order_count += 1;
            if order < TABLE_MAX_COLUMNS {
                sort_order_mask |= 1u64 << order;
            } else {
                out_of_range = true;
            }
        }

        let dense_mask = if sort_order_count >= TABLE_MAX_COLUMNS {
            u64::MAX
        } else {
            (1u64 << sort_order_count) - 1
        };
        let need_fix_linearize = out_of_range || sort_order_mask != dense_mask;
        let need_fix_single = sort_order_count > 1 && !self.flags.sort_multi;

        if need_fix_linearize || need_fix_single {
            log::trace!(
                "table {}: rewriting {} sort orders (mask {:#x})",
                self.id,
                sort_order_count,
                sort_order_mask
            );
            let mut fixed_mask = 0u64;
            for sort_n in 0..sort_order_count {
                let smallest = self
                    .columns
                    .iter()
                    .enumerate()
                    .filter(|(n, c)| fixed_mask & (1u64 << n) == 0 && c.sort_order.is_some())
                    .min_by_key(|(n, c)| (c.sort_order, *n))
                    .map(|(n, _)| n);
                let Some(smallest) = smallest else {
                    break;
                };
                fixed_mask |= 1u64 << smallest;
                self.columns[smallest].sort_order = Some(sort_n);

                if need_fix_single {
                    sort_order_count = 1;
                    for (n, column) in self.columns.iter_mut().enumerate() {
                        if fixed_mask & (1u64 << n) == 0 {
                            column.sort_order = None;
                        }
                    }
                    break;
                }
            }
        }

        if sort_order_count == 0 && !self.flags.sort_tristate {
            let fallback = self
                .display_order_to_index
                .iter()
                .copied()
                .find(|&n| self.columns[n].is_enabled && self.columns[n].is_sortable());
            if let Some(n) = fallback {
                sort_order_count = 1;
                let direction = self.avail_sort_direction(n, 0);
                let column = &mut self.columns[n];
                column.sort_order = Some(0);
                column.sort_direction = direction;
            }
        }

        sort_order_count
    }

    /// Rebuild the public view if anything changed since the last build.
    pub fn sort_specs_build(&mut self) {
        if !self.is_sort_specs_dirty {
            return;
        }
        let count = self.sort_specs_sanitize();

        let mut specs: SmallVec<[TableColumnSortSpec; 1]> = SmallVec::with_capacity(count);
        for (n, column) in self.columns.iter().enumerate() {
            let Some(order) = column.sort_order else {
                continue;
            };
            specs.push(TableColumnSortSpec {
                column_user_id: column.user_id,
                column_index: n,
                sort_order: order,
                sort_direction: column.sort_direction,
            });
        }
        specs.sort_by_key(|s| s.sort_order);
        debug_assert_eq!(specs.len(), count);

        self.sort_specs.specs = specs;
        self.sort_specs.specs_dirty = true;
        self.is_sort_specs_dirty = false;
    }

    pub fn sort_specs(&self) -> &TableSortSpecs {
        &self.sort_specs
    }
}
