/// Vigil system version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Pattern matching a CVE identifier embedded in a finding title.
pub const CVE_ID_PATTERN: &str = r"CVE-\d{4}-\d{4,7}";

/// Pattern matching a CVE identifier plus its trailing title separator,
/// used to clean the display name after extraction.
pub const CVE_STRIP_PATTERN: &str = r"CVE-\d{4}-\d{4,7}\s*-*\s*";

/// Storage-safe replacement for embedded line breaks in free-text fields.
pub const LINE_BREAK_MARKER: &str = " <br/> ";

/// Host assigned to findings on cloud assets that cannot be resolved to a
/// concrete machine.
pub const CLOUD_ASSETS_HOST: &str = "Cloud_Assets";
