//! Responsive layout selection.
//!
//! The owner observes terminal width and hands the chosen mode to the grid.

/// Default width (in columns) at or below which the compact card layout is used.
pub const DEFAULT_COMPACT_BREAKPOINT: u16 = 100;

/// Which renderer the grid uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    /// Table with one row per record.
    #[default]
    Wide,
    /// Stacked cards, one per record.
    Compact,
}

impl LayoutMode {
    /// Select the mode for a terminal width.
    pub fn for_width(width: u16, breakpoint: u16) -> Self {
        if width <= breakpoint {
            LayoutMode::Compact
        } else {
            LayoutMode::Wide
        }
    }

    /// Whether this is the compact card layout.
    pub fn is_compact(&self) -> bool {
        matches!(self, LayoutMode::Compact)
    }
}

/// Tracks terminal width and the layout mode it implies.
#[derive(Debug, Clone)]
pub struct ResponsiveSwitch {
    breakpoint: u16,
    width: u16,
    mode: LayoutMode,
}

impl ResponsiveSwitch {
    /// Create a switch for an initial width.
    pub fn new(breakpoint: u16, width: u16) -> Self {
        Self {
            breakpoint,
            width,
            mode: LayoutMode::for_width(width, breakpoint),
        }
    }

    /// Record a new width. Returns true if the layout mode changed.
    pub fn observe(&mut self, width: u16) -> bool {
        self.width = width;
        let mode = LayoutMode::for_width(width, self.breakpoint);
        let changed = mode != self.mode;
        self.mode = mode;
        changed
    }

    /// The current layout mode.
    pub fn mode(&self) -> LayoutMode {
        self.mode
    }

    /// The last observed width.
    pub fn width(&self) -> u16 {
        self.width
    }

    /// The configured breakpoint.
    pub fn breakpoint(&self) -> u16 {
        self.breakpoint
    }
}

impl Default for ResponsiveSwitch {
    fn default() -> Self {
        Self::new(DEFAULT_COMPACT_BREAKPOINT, u16::MAX)
    }
}
