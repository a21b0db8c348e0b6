/// Directory (relative to the working directory) holding config and session files
pub const SCICURE_DIR: &str = ".scicure";

/// Default number of records shown per page
pub const DEFAULT_PAGE_SIZE: usize = 10;

/// Default base URL of the publishing API
pub const DEFAULT_API_URL: &str = "http://localhost:5000/api";

/// Default path (relative to the API base) of the login endpoint
pub const DEFAULT_LOGIN_PATH: &str = "auth/login";

/// Shown when a mutation fails and the server gave no message of its own
pub const GENERIC_FAILURE_MESSAGE: &str = "Something went wrong. Please try again.";

/// Role string carried by journal-scoped sessions
pub const JOURNAL_ROLE: &str = "journal";
