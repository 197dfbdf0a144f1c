//! # Configuration Module - Runtime Behavior Settings
//!
//! Settings that change how text is measured and drawn. A [`Configuration`] is
//! passed explicitly to every component that needs it; nothing in the library
//! reads process-wide state.
//!
//! ```rust
//! use typeline::Configuration;
//!
//! let config = Configuration::default().with_tab_width(8);
//! assert_eq!(config.tab_width, 8);
//! ```

/// Default number of columns a tab occupies
pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Runtime configuration for the typing engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Configuration {
    /// Number of terminal columns a tab character is displayed as
    ///
    /// Used by the width function, the word-wrapper and the renderer, so that
    /// all three agree on where the cursor ends up.
    ///
    /// **Default**: 4
    pub tab_width: usize,
}

impl Configuration {
    /// Set the tab width (builder pattern)
    pub const fn with_tab_width(mut self, tab_width: usize) -> Self {
        self.tab_width = tab_width;
        self
    }
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
        }
    }
}
