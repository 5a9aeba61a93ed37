use thiserror::Error;

/// 單一頁面組裝失敗的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ComposeError {
    #[error("include '{name}' not found")]
    MissingInclude { name: String },

    #[error("unknown layout '{name}'")]
    UnknownLayout { name: String },

    #[error("include cycle detected: {}", .chain.join(" -> "))]
    IncludeCycle { chain: Vec<String> },

    #[error("include nesting exceeds {limit} levels: {}", .chain.join(" -> "))]
    IncludeDepthExceeded { limit: usize, chain: Vec<String> },

    #[error("output path '{path}' is already produced by '{first}'")]
    DuplicateOutput { path: String, first: String },
}

impl ComposeError {
    /// The include or layout name the page author has to fix.
    pub fn reference(&self) -> &str {
        match self {
            ComposeError::MissingInclude { name } | ComposeError::UnknownLayout { name } => name,
            ComposeError::IncludeCycle { chain } | ComposeError::IncludeDepthExceeded { chain, .. } => {
                chain.last().map(String::as_str).unwrap_or_default()
            }
            ComposeError::DuplicateOutput { path, .. } => path,
        }
    }
}

#[derive(Error, Debug)]
pub enum SiteError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Price source '{source_name}' unreachable: {reason}")]
    SourceUnreachable { source_name: String, reason: String },

    #[error("Price source '{source_name}' returned malformed data: {reason}")]
    SourceMalformed { source_name: String, reason: String },

    #[error("No price available: all {attempted} sources failed")]
    AllSourcesExhausted { attempted: usize },

    #[error("Page '{page}': {source}")]
    PageError {
        page: String,
        #[source]
        source: ComposeError,
    },

    #[error("{failed} of {total} pages failed to build")]
    BuildFailed { failed: usize, total: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Build,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl SiteError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            SiteError::HttpError(_)
            | SiteError::SourceUnreachable { .. }
            | SiteError::AllSourcesExhausted { .. } => ErrorCategory::Network,
            SiteError::SerializationError(_) | SiteError::SourceMalformed { .. } => {
                ErrorCategory::Data
            }
            SiteError::ConfigValidationError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => ErrorCategory::Configuration,
            SiteError::PageError { .. } | SiteError::BuildFailed { .. } => ErrorCategory::Build,
            SiteError::IoError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 單一來源失敗只會觸發下一個來源
            SiteError::SourceUnreachable { .. } | SiteError::SourceMalformed { .. } => {
                ErrorSeverity::Low
            }
            SiteError::HttpError(_) | SiteError::AllSourcesExhausted { .. } => {
                ErrorSeverity::Medium
            }
            SiteError::SerializationError(_)
            | SiteError::PageError { .. }
            | SiteError::BuildFailed { .. }
            | SiteError::ConfigValidationError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => ErrorSeverity::High,
            SiteError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            SiteError::HttpError(_) | SiteError::SourceUnreachable { .. } => {
                "Check network connectivity and the source endpoint URL"
            }
            SiteError::SourceMalformed { .. } => {
                "Check the source's JSON pointer against its current response shape"
            }
            SiteError::AllSourcesExhausted { .. } => {
                "Retry later or add another entry under [[price.sources]]"
            }
            SiteError::SerializationError(_) => "Check the JSON document for syntax errors",
            SiteError::ConfigValidationError { .. }
            | SiteError::InvalidConfigValueError { .. }
            | SiteError::MissingConfigError { .. } => "Fix the value in site.toml and rerun",
            SiteError::PageError { source, .. } => match source {
                ComposeError::MissingInclude { .. } => {
                    "Create the include under _includes/ or remove the reference"
                }
                ComposeError::UnknownLayout { .. } => {
                    "Use one of the layouts: tool, blog, blog-article"
                }
                ComposeError::IncludeCycle { .. } | ComposeError::IncludeDepthExceeded { .. } => {
                    "Break the include chain so no include references itself"
                }
                ComposeError::DuplicateOutput { .. } => {
                    "Rename one of the pages so each maps to its own URL"
                }
            },
            SiteError::BuildFailed { .. } => "Fix the pages listed above and rebuild",
            SiteError::IoError(_) => "Check that the source and output directories are accessible",
        }
    }

    /// Process exit code for the CLI: 1 for failed pages and bad input, 2 when no
    /// price source answered, 3 for file system errors.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low | ErrorSeverity::High => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            SiteError::PageError { page, source } => {
                format!("Could not build '{}': {}", page, source)
            }
            SiteError::AllSourcesExhausted { .. } => "No price available right now".to_string(),
            SiteError::IoError(e) => format!("File system error: {}", e),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, SiteError>;
