//! Directory service configuration.

/// Configuration for the directory service.
#[derive(Debug, Clone)]
pub struct DirectoryConfig {
    /// Page size used when a caller asks for a zero-length page (default: 50).
    pub default_page_size: u64,
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            default_page_size: 50,
        }
    }
}
