use std::path::PathBuf;

/// Export read at startup when no path is given.
pub const DEFAULT_DATA_PATH: &str = "Amazon Sale Report.csv";

/// Startup settings for the dashboard window.
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    pub data_path: PathBuf,
    pub window_size: [f32; 2],
    pub min_window_size: [f32; 2],
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from(DEFAULT_DATA_PATH),
            window_size: [1400.0, 900.0],
            min_window_size: [800.0, 500.0],
        }
    }
}

impl DashboardConfig {
    /// Build from process arguments (program name already skipped). The only
    /// recognised argument is an optional path to the sales export.
    pub fn from_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let mut config = Self::default();
        if let Some(path) = args.into_iter().next() {
            config.data_path = PathBuf::from(path);
        }
        config
    }
}
