//! Centralized constants for endpoints, headers, and limits.

/// Default GitHub REST API base URL.
pub const DEFAULT_GITHUB_API_URL: &str = "https://api.github.com";

/// Environment variable overriding the GitHub API base URL.
pub const GITHUB_API_URL_ENV: &str = "GITHUB_API_URL";

/// Environment variable holding the GitHub token.
pub const GITHUB_TOKEN_ENV: &str = "GITHUB_TOKEN";

/// GitHub REST API version header value.
pub const GITHUB_API_VERSION: &str = "2022-11-28";

/// Request timeout for GitHub API calls, in seconds.
pub const GITHUB_TIMEOUT_SECS: u64 = 30;

/// User agent sent to GitHub (required by the API).
pub const USER_AGENT: &str = concat!("access-key-rotate/", env!("CARGO_PKG_VERSION"));

/// Region used for IAM when none is configured. IAM is a global service.
pub const DEFAULT_AWS_REGION: &str = "us-east-1";

/// Minimum allowed max age for a profile, in hours.
pub const MIN_MAX_AGE_HOURS: f64 = 1.0;

/// Longest accepted max age (100 years).
pub const MAX_MAX_AGE_HOURS: f64 = 100.0 * 365.0 * 24.0;

/// Milliseconds in one hour.
pub const ONE_HOUR_MS: i64 = 60 * 60 * 1000;

/// Size in bytes of an X25519 public key.
pub const PUBLIC_KEY_LEN: usize = 32;
