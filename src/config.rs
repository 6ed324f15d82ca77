/// Application-level constants
pub const APP_NAME: &str = "CohortGen";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Environment variable overriding the processing-service base URL.
pub const API_URL_ENV: &str = "COHORTGEN_API_URL";

/// Default base URL of the processing service (local development server).
pub const DEFAULT_API_URL: &str = "http://localhost:8000";

/// Default log filter when RUST_LOG is unset.
pub fn default_log_filter() -> String {
    "info,cohortgen_lib=debug".to_string()
}

/// Base URL of the processing service, env override first.
/// Trailing slashes are trimmed so endpoint builders can join with '/'.
pub fn api_base_url() -> String {
    std::env::var(API_URL_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_API_URL.to_string())
        .trim_end_matches('/')
        .to_string()
}

/// URL that serves a generated result for download.
pub fn download_url(base_url: &str, file_id: &str) -> String {
    format!("{}/download/{}", base_url.trim_end_matches('/'), file_id)
}

/// URL that serves the empty template CSV.
pub fn template_url(base_url: &str) -> String {
    format!("{}/template", base_url.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn app_name_is_cohortgen() {
        assert_eq!(APP_NAME, "CohortGen");
    }

    #[test]
    fn app_version_matches_cargo() {
        assert_eq!(APP_VERSION, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn download_url_embeds_file_id() {
        assert_eq!(
            download_url("http://localhost:8000", "abc123"),
            "http://localhost:8000/download/abc123"
        );
    }

    #[test]
    fn url_builders_tolerate_trailing_slash() {
        assert_eq!(
            download_url("http://localhost:8000/", "abc123"),
            "http://localhost:8000/download/abc123"
        );
        assert_eq!(
            template_url("http://localhost:8000/"),
            "http://localhost:8000/template"
        );
    }

    #[test]
    fn default_api_url_is_local() {
        assert_eq!(DEFAULT_API_URL, "http://localhost:8000");
    }
}
