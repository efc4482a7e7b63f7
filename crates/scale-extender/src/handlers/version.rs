//! Version endpoint.

/// Version reported by `GET /version`.
///
/// Taken from `SCALE_EXTENDER_VERSION` at build time, falling back to the
/// crate version.
pub const VERSION: &str = match option_env!("SCALE_EXTENDER_VERSION") {
    Some(version) => version,
    None => env!("CARGO_PKG_VERSION"),
};

/// Return the version as plain text.
///
/// ```text
/// GET /version
///
/// Response: 200 OK
/// 0.1.0
/// ```
pub async fn version() -> &'static str {
    VERSION
}
