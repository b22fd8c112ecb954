//! Rendering options and configuration.

/// Default number of entries in the HTML table of contents.
pub const DEFAULT_TOC_LIMIT: usize = 200;

/// Default number of identifier characters shown for images.
pub const DEFAULT_IMAGE_ID_LEN: usize = 12;

/// Color theme of the HTML report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    /// Light background
    #[default]
    Light,
    /// Dark background
    Dark,
}

impl Theme {
    /// Label of the theme toggle button.
    pub fn toggle_label(&self) -> &'static str {
        match self {
            Theme::Light => "Mode: light",
            Theme::Dark => "Mode: dark",
        }
    }
}

/// Options for the interactive HTML report.
#[derive(Debug, Clone)]
pub struct HtmlOptions {
    /// Document title and heading
    pub title: String,

    /// Initial color theme (the reader can toggle it)
    pub theme: Theme,

    /// Whether unchanged blocks are initially visible
    pub show_unchanged: bool,

    /// Maximum entries in the table of contents
    pub toc_limit: usize,

    /// Characters of an image identifier to display
    pub image_id_len: usize,
}

impl HtmlOptions {
    /// Create new HTML options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the title.
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    /// Set the initial theme.
    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    /// Show or hide unchanged blocks initially.
    pub fn with_unchanged(mut self, show: bool) -> Self {
        self.show_unchanged = show;
        self
    }

    /// Set the table of contents limit.
    pub fn with_toc_limit(mut self, limit: usize) -> Self {
        self.toc_limit = limit;
        self
    }

    /// Set the displayed image identifier length (at least 1).
    pub fn with_image_id_len(mut self, len: usize) -> Self {
        self.image_id_len = len.max(1);
        self
    }
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            title: "Document Comparison Report".to_string(),
            theme: Theme::Light,
            show_unchanged: true,
            toc_limit: DEFAULT_TOC_LIMIT,
            image_id_len: DEFAULT_IMAGE_ID_LEN,
        }
    }
}
