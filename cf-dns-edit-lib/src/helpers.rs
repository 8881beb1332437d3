// Shared constants and small formatting helpers.
#![forbid(unsafe_code)]

/// Environment variable that can supply the API token.
pub const TOKEN_ENV_VAR: &str = "CLOUDFLARE_API_TOKEN";

/// File name of the per-user config file.
pub const CONFIG_FILE_NAME: &str = "cf-dns-edit.json";

/// Base URL of the Cloudflare v4 REST API.
pub const CF_API_BASE: &str = "https://api.cloudflare.com/client/v4";

/// Page size used when listing zones. Cloudflare caps zones at 50 per page.
pub const ZONES_PER_PAGE: u32 = 50;

/// Page size used when listing DNS records.
pub const RECORDS_PER_PAGE: u32 = 100;

/// Where API tokens are created.
pub const TOKEN_URL: &str = "https://dash.cloudflare.com/profile/api-tokens";

/// Formats `count` followed by `word`, adding an `s` unless the count is one.
#[must_use]
pub fn pluralize(count: usize, word: &str) -> String {
    if count == 1 {
        format!("{count} {word}")
    } else {
        format!("{count} {word}s")
    }
}

/// Whether a confirmation answer means "yes". Only `y` counts.
#[must_use]
pub fn is_affirmative(answer: &str) -> bool {
    answer.trim().eq_ignore_ascii_case("y")
}
