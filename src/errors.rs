use std::fmt;

#[derive(Debug, Clone)]
pub enum LinkforgeError {
    NotFound(String),
    Expired(String),
    Deactivated(String),
    AllocationExhausted(String),
    ClockMovedBackwards(String),
    CodeConflict(String),
    InvalidUrl(String),
    Validation(String),
    OwnerNotFound(String),
    DatabaseConfig(String),
    DatabaseConnection(String),
    DatabaseOperation(String),
    DatabaseBusy(String),
    Serialization(String),
    FileOperation(String),
    Upstream(String),
}

impl LinkforgeError {
    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            LinkforgeError::NotFound(_) => "E001",
            LinkforgeError::Expired(_) => "E002",
            LinkforgeError::Deactivated(_) => "E003",
            LinkforgeError::AllocationExhausted(_) => "E004",
            LinkforgeError::ClockMovedBackwards(_) => "E005",
            LinkforgeError::CodeConflict(_) => "E006",
            LinkforgeError::InvalidUrl(_) => "E007",
            LinkforgeError::Validation(_) => "E008",
            LinkforgeError::OwnerNotFound(_) => "E009",
            LinkforgeError::DatabaseConfig(_) => "E010",
            LinkforgeError::DatabaseConnection(_) => "E011",
            LinkforgeError::DatabaseOperation(_) => "E012",
            LinkforgeError::Serialization(_) => "E013",
            LinkforgeError::FileOperation(_) => "E014",
            LinkforgeError::Upstream(_) => "E015",
            LinkforgeError::DatabaseBusy(_) => "E016",
        }
    }

    /// Human readable error type
    pub fn error_type(&self) -> &'static str {
        match self {
            LinkforgeError::NotFound(_) => "Link Not Found",
            LinkforgeError::Expired(_) => "Link Expired",
            LinkforgeError::Deactivated(_) => "Link Deactivated",
            LinkforgeError::AllocationExhausted(_) => "Code Allocation Exhausted",
            LinkforgeError::ClockMovedBackwards(_) => "Clock Moved Backwards",
            LinkforgeError::CodeConflict(_) => "Code Conflict",
            LinkforgeError::InvalidUrl(_) => "Invalid URL",
            LinkforgeError::Validation(_) => "Validation Error",
            LinkforgeError::OwnerNotFound(_) => "Owner Not Found",
            LinkforgeError::DatabaseConfig(_) => "Database Configuration Error",
            LinkforgeError::DatabaseConnection(_) => "Database Connection Error",
            LinkforgeError::DatabaseOperation(_) => "Database Operation Error",
            LinkforgeError::DatabaseBusy(_) => "Database Busy",
            LinkforgeError::Serialization(_) => "Serialization Error",
            LinkforgeError::FileOperation(_) => "File Operation Error",
            LinkforgeError::Upstream(_) => "Upstream Service Error",
        }
    }

    pub fn message(&self) -> &str {
        match self {
            LinkforgeError::NotFound(msg)
            | LinkforgeError::Expired(msg)
            | LinkforgeError::Deactivated(msg)
            | LinkforgeError::AllocationExhausted(msg)
            | LinkforgeError::ClockMovedBackwards(msg)
            | LinkforgeError::CodeConflict(msg)
            | LinkforgeError::InvalidUrl(msg)
            | LinkforgeError::Validation(msg)
            | LinkforgeError::OwnerNotFound(msg)
            | LinkforgeError::DatabaseConfig(msg)
            | LinkforgeError::DatabaseConnection(msg)
            | LinkforgeError::DatabaseOperation(msg)
            | LinkforgeError::DatabaseBusy(msg)
            | LinkforgeError::Serialization(msg)
            | LinkforgeError::FileOperation(msg)
            | LinkforgeError::Upstream(msg) => msg,
        }
    }

    /// True for the three user-visible resolution outcomes.
    pub fn is_resolution_failure(&self) -> bool {
        matches!(
            self,
            LinkforgeError::NotFound(_) | LinkforgeError::Expired(_) | LinkforgeError::Deactivated(_)
        )
    }

    /// Lost connections and lock contention; the statement may succeed if replayed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            LinkforgeError::DatabaseConnection(_) | LinkforgeError::DatabaseBusy(_)
        )
    }

    /// Colored output for terminals
    pub fn format_colored(&self) -> String {
        use colored::Colorize;
        format!(
            "{} {} {}\n  {}",
            "[ERROR]".red().bold(),
            self.code().yellow(),
            self.error_type().red(),
            self.message().white()
        )
    }

    pub fn format_simple(&self) -> String {
        format!("{}: {}", self.error_type(), self.message())
    }
}

impl fmt::Display for LinkforgeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_simple())
    }
}

impl std::error::Error for LinkforgeError {}

impl LinkforgeError {
    pub fn not_found<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::NotFound(msg.into())
    }

    pub fn expired<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::Expired(msg.into())
    }

    pub fn deactivated<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::Deactivated(msg.into())
    }

    pub fn allocation_exhausted<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::AllocationExhausted(msg.into())
    }

    pub fn clock_moved_backwards<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::ClockMovedBackwards(msg.into())
    }

    pub fn code_conflict<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::CodeConflict(msg.into())
    }

    pub fn invalid_url<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::InvalidUrl(msg.into())
    }

    pub fn validation<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::Validation(msg.into())
    }

    pub fn owner_not_found<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::OwnerNotFound(msg.into())
    }

    pub fn database_config<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::DatabaseConfig(msg.into())
    }

    pub fn database_connection<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::DatabaseConnection(msg.into())
    }

    pub fn database_operation<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::DatabaseOperation(msg.into())
    }

    pub fn database_busy<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::DatabaseBusy(msg.into())
    }

    pub fn serialization<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::Serialization(msg.into())
    }

    pub fn file_operation<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::FileOperation(msg.into())
    }

    pub fn upstream<T: Into<String>>(msg: T) -> Self {
        LinkforgeError::Upstream(msg.into())
    }
}

impl From<sea_orm::DbErr> for LinkforgeError {
    fn from(err: sea_orm::DbErr) -> Self {
        LinkforgeError::DatabaseOperation(err.to_string())
    }
}

impl From<std::io::Error> for LinkforgeError {
    fn from(err: std::io::Error) -> Self {
        LinkforgeError::FileOperation(err.to_string())
    }
}

impl From<serde_json::Error> for LinkforgeError {
    fn from(err: serde_json::Error) -> Self {
        LinkforgeError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, LinkforgeError>;
