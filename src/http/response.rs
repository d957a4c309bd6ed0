//! Response handling.
//!
//! # Responsibilities
//! - Map a resolved target path onto the asset directory
//! - Stream files (content type, HEAD, byte ranges) through `ServeFile`
//!
//! # Design Decisions
//! - `..` segments and symlinks leading outside the asset directory are rejected
//! - A directory target serves its index file

use std::convert::Infallible;
use std::path::{Path, PathBuf};

use axum::{
    body::Body,
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
};
use tower::ServiceExt;
use tower_http::services::ServeFile;

/// Map `target` (a rooted URL path) to a file under `root`.
pub fn resolve_file(root: &Path, target: &str, index_file: &str) -> Option<PathBuf> {
    let relative = target.trim_matches('/');

    if relative.split('/').any(|segment| segment == "..") {
        return None;
    }

    let local = root.join(relative);

    // Canonicalize to resolve symlinks and verify the path stays under root
    let canonical = local.canonicalize().ok()?;
    let root_canonical = root.canonicalize().ok()?;

    if !canonical.starts_with(&root_canonical) {
        return None;
    }

    if canonical.is_file() {
        return Some(canonical);
    }

    if canonical.is_dir() {
        let index = canonical.join(index_file);
        if index.is_file() {
            return Some(index);
        }
    }

    None
}

/// Stream `path` as the response to `request`.
pub async fn serve_file(path: &Path, request: Request<Body>) -> Response {
    let result: Result<_, Infallible> = ServeFile::new(path).oneshot(request).await;
    match result {
        Ok(response) => response.into_response(),
        Err(never) => match never {},
    }
}

pub fn not_found(message: &'static str) -> Response {
    (StatusCode::NOT_FOUND, message).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn asset_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("index.html"), "<html></html>").unwrap();
        fs::write(dir.path().join("app.css"), "body {}").unwrap();
        fs::create_dir(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg").join("app_bg.wasm"), b"\0asm").unwrap();
        dir
    }

    #[test]
    fn test_resolve_file() {
        let dir = asset_dir();
        let root = dir.path();
        let canonical = root.canonicalize().unwrap();

        assert_eq!(resolve_file(root, "/app.css", "index.html"), Some(canonical.join("app.css")));
        assert_eq!(
            resolve_file(root, "/pkg/app_bg.wasm", "index.html"),
            Some(canonical.join("pkg").join("app_bg.wasm"))
        );
        assert_eq!(resolve_file(root, "/", "index.html"), Some(canonical.join("index.html")));
        assert_eq!(resolve_file(root, "/missing.js", "index.html"), None);
        // A directory without an index file has nothing to serve.
        assert_eq!(resolve_file(root, "/pkg", "index.html"), None);
    }

    #[test]
    fn test_resolve_file_rejects_traversal() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("assets");
        fs::create_dir(&root).unwrap();

        assert_eq!(resolve_file(&root, "/../secret.txt", "index.html"), None);
        assert_eq!(resolve_file(&root, "/a/../../secret.txt", "index.html"), None);
    }

    #[cfg(unix)]
    #[test]
    fn test_resolve_file_rejects_symlink_escape() {
        let outer = tempfile::tempdir().unwrap();
        fs::write(outer.path().join("secret.txt"), "secret").unwrap();
        let root = outer.path().join("assets");
        fs::create_dir(&root).unwrap();
        std::os::unix::fs::symlink(outer.path().join("secret.txt"), root.join("link.txt")).unwrap();

        assert_eq!(resolve_file(&root, "/link.txt", "index.html"), None);
    }
}
