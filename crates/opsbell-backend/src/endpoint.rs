use url::Url;

/// Appends a relative `route` to `base`, treating the base path as a
/// directory even when it lacks a trailing slash.
pub(crate) fn endpoint(base: &Url, route: &str) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(route.trim_start_matches('/'))
}
