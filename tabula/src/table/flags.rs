//! Table and column options.
//!
//! Mutually exclusive choices are enums; independent toggles are plain bools
//! with chainable setters.

/// How columns without an explicit sizing choice are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SizingPolicy {
    /// Fixed columns that default to their content width.
    FixedFit,
    /// Fixed columns that all default to the widest content width.
    FixedSame,
    /// Stretch columns weighted by their content width.
    StretchProp,
    /// Stretch columns with equal weights.
    StretchSame,
}

impl SizingPolicy {
    pub fn column_sizing(self) -> ColumnSizing {
        match self {
            Self::FixedFit | Self::FixedSame => ColumnSizing::Fixed,
            Self::StretchProp | Self::StretchSame => ColumnSizing::Stretch,
        }
    }
}

/// Sizing of a single column. Decides whether `width_request` or `stretch_weight` is authoritative.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ColumnSizing {
    #[default]
    Fixed,
    Stretch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    None,
    Ascending,
    Descending,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TableFlags {
    pub sizing: Option<SizingPolicy>,
    pub resizable: bool,
    pub reorderable: bool,
    pub hideable: bool,
    pub sortable: bool,
    pub sort_multi: bool,
    pub sort_tristate: bool,
    pub no_saved_settings: bool,
    pub context_menu_in_body: bool,
    pub row_bg: bool,
    pub borders_inner_h: bool,
    pub borders_outer_h: bool,
    pub borders_inner_v: bool,
    pub borders_outer_v: bool,
    pub no_borders_in_body: bool,
    pub no_host_extend_x: bool,
    pub no_keep_columns_visible: bool,
    pub precise_widths: bool,
    pub no_clip: bool,
    pub pad_outer_x: bool,
    pub no_pad_outer_x: bool,
    pub no_pad_inner_x: bool,
    pub scroll_x: bool,
    pub scroll_y: bool,
    pub highlight_hovered_column: bool,
}

impl TableFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sizing(mut self, policy: SizingPolicy) -> Self {
        self.sizing = Some(policy);
        self
    }

    pub fn resizable(mut self) -> Self {
        self.resizable = true;
        self
    }

    pub fn reorderable(mut self) -> Self {
        self.reorderable = true;
        self
    }

    pub fn hideable(mut self) -> Self {
        self.hideable = true;
        self
    }

    pub fn sortable(mut self) -> Self {
        self.sortable = true;
        self
    }

    pub fn sort_multi(mut self) -> Self {
        self.sort_multi = true;
        self
    }

    pub fn sort_tristate(mut self) -> Self {
        self.sort_tristate = true;
        self
    }

    pub fn no_saved_settings(mut self) -> Self {
        self.no_saved_settings = true;
        self
    }

    pub fn context_menu_in_body(mut self) -> Self {
        self.context_menu_in_body = true;
        self
    }

    pub fn row_bg(mut self) -> Self {
        self.row_bg = true;
        self
    }

    pub fn borders(mut self) -> Self {
        self.borders_inner_h = true;
        self.borders_outer_h = true;
        self.borders_inner_v = true;
        self.borders_outer_v = true;
        self
    }

    pub fn borders_inner_v(mut self) -> Self {
        self.borders_inner_v = true;
        self
    }

    pub fn borders_outer_v(mut self) -> Self {
        self.borders_outer_v = true;
        self
    }

    pub fn borders_inner_h(mut self) -> Self {
        self.borders_inner_h = true;
        self
    }

    pub fn no_borders_in_body(mut self) -> Self {
        self.no_borders_in_body = true;
        self
    }

    pub fn no_host_extend_x(mut self) -> Self {
        self.no_host_extend_x = true;
        self
    }

    pub fn no_keep_columns_visible(mut self) -> Self {
        self.no_keep_columns_visible = true;
        self
    }

    pub fn precise_widths(mut self) -> Self {
        self.precise_widths = true;
        self
    }

    pub fn no_clip(mut self) -> Self {
        self.no_clip = true;
        self
    }

    pub fn pad_outer_x(mut self) -> Self {
        self.pad_outer_x = true;
        self
    }

    pub fn no_pad_inner_x(mut self) -> Self {
        self.no_pad_inner_x = true;
        self
    }

    pub fn scroll_x(mut self) -> Self {
        self.scroll_x = true;
        self
    }

    pub fn scroll_y(mut self) -> Self {
        self.scroll_y = true;
        self
    }

    pub fn highlight_hovered_column(mut self) -> Self {
        self.highlight_hovered_column = true;
        self
    }

    /// Fill in implied options: a sizing policy, inner borders for resizing.
    pub(crate) fn resolved(mut self) -> Self {
        if self.sizing.is_none() {
            self.sizing = Some(if self.scroll_x {
                SizingPolicy::FixedFit
            } else {
                SizingPolicy::StretchSame
            });
        }
        if self.sizing == Some(SizingPolicy::FixedSame) {
            self.no_keep_columns_visible = true;
        }
        if self.resizable {
            self.borders_inner_v = true;
        }
        self
    }

    pub(crate) fn policy(&self) -> SizingPolicy {
        self.sizing.unwrap_or(SizingPolicy::StretchSame)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ColumnFlags {
    /// `None` inherits from the table's sizing policy.
    pub sizing: Option<ColumnSizing>,
    pub disabled: bool,
    pub default_hide: bool,
    pub default_sort: bool,
    pub no_resize: bool,
    pub no_reorder: bool,
    pub no_hide: bool,
    pub no_clip: bool,
    pub no_sort: bool,
    pub no_sort_ascending: bool,
    pub no_sort_descending: bool,
    pub no_header_label: bool,
    pub no_header_width: bool,
    pub prefer_sort_ascending: bool,
    pub prefer_sort_descending: bool,
}

impl ColumnFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fixed() -> Self {
        Self {
            sizing: Some(ColumnSizing::Fixed),
            ..Self::default()
        }
    }

    pub fn stretch() -> Self {
        Self {
            sizing: Some(ColumnSizing::Stretch),
            ..Self::default()
        }
    }

    pub fn disabled(mut self) -> Self {
        self.disabled = true;
        self
    }

    pub fn default_hide(mut self) -> Self {
        self.default_hide = true;
        self
    }

    pub fn default_sort(mut self) -> Self {
        self.default_sort = true;
        self
    }

    pub fn no_resize(mut self) -> Self {
        self.no_resize = true;
        self
    }

    pub fn no_reorder(mut self) -> Self {
        self.no_reorder = true;
        self
    }

    pub fn no_hide(mut self) -> Self {
        self.no_hide = true;
        self
    }

    pub fn no_clip(mut self) -> Self {
        self.no_clip = true;
        self
    }

    pub fn no_sort(mut self) -> Self {
        self.no_sort = true;
        self
    }

    pub fn no_sort_ascending(mut self) -> Self {
        self.no_sort_ascending = true;
        self
    }

    pub fn no_sort_descending(mut self) -> Self {
        self.no_sort_descending = true;
        self
    }

    pub fn no_header_label(mut self) -> Self {
        self.no_header_label = true;
        self
    }

    pub fn no_header_width(mut self) -> Self {
        self.no_header_width = true;
        self
    }

    pub fn prefer_sort_ascending(mut self) -> Self {
        self.prefer_sort_ascending = true;
        self
    }

    pub fn prefer_sort_descending(mut self) -> Self {
        self.prefer_sort_descending = true;
        self
    }
}

/// Per-row options for [`crate::Context::table_next_row`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RowFlags {
    /// Header row: uses the header background and does not alternate row colors.
    pub headers: bool,
}

/// Where [`crate::Context::table_set_bg_color`] paints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BgTarget {
    RowBg0,
    RowBg1,
    CellBg,
}
