use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::shared::constants::{CASCADE_FILE_NAME, OPENCV_DATA_DIRS};

#[derive(Error, Debug)]
pub enum CascadeResolveError {
    #[error("failed to create cache directory: {0}")]
    CacheDir(#[source] std::io::Error),
    #[error("download failed for {url}: {source}")]
    Download {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("failed to write cascade to {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("could not determine cache directory")]
    NoCacheDir,
}

/// Progress callback: `(bytes_downloaded, total_bytes)`.
/// `total_bytes` is 0 if the server didn't provide Content-Length.
pub type ProgressFn = Box<dyn Fn(u64, u64) + Send>;

/// Locate a cascade definition, downloading it if necessary.
///
/// Resolution order:
/// 1. The configured path, if the file exists
/// 2. The same file name in an OpenCV install's `haarcascades/` directory
/// 3. `<cache_dir>/<file name>` from an earlier download
/// 4. Download from `url` into the cache
pub fn resolve(
    configured: &Path,
    url: &str,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, CascadeResolveError> {
    if configured.exists() {
        return Ok(configured.to_path_buf());
    }
    let name = file_name(configured);
    if let Some(installed) = installed_cascade(&name, OPENCV_DATA_DIRS) {
        log::debug!("Using installed cascade {}", installed.display());
        return Ok(installed);
    }
    resolve_in(&cascade_cache_dir()?, configured, url, progress)
}

/// First `<dir>/haarcascades/<name>` that exists.
pub fn installed_cascade<S: AsRef<Path>>(name: &Path, data_dirs: &[S]) -> Option<PathBuf> {
    data_dirs
        .iter()
        .map(|dir| dir.as_ref().join("haarcascades").join(name))
        .find(|path| path.is_file())
}

fn file_name(configured: &Path) -> PathBuf {
    configured
        .file_name()
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(CASCADE_FILE_NAME))
}

fn resolve_in(
    cache_dir: &Path,
    configured: &Path,
    url: &str,
    progress: Option<ProgressFn>,
) -> Result<PathBuf, CascadeResolveError> {
    let cached_path = cache_dir.join(file_name(configured));
    if cached_path.exists() {
        log::debug!("Using cached cascade {}", cached_path.display());
        return Ok(cached_path);
    }

    log::info!(
        "Cascade {} not found, downloading from {url}",
        configured.display()
    );
    fs::create_dir_all(cache_dir).map_err(CascadeResolveError::CacheDir)?;
    download(url, &cached_path, progress)?;
    Ok(cached_path)
}

/// Platform-specific cascade cache directory.
///
/// - macOS: `~/Library/Application Support/facetrain/cascades/`
/// - Linux: `$XDG_CACHE_HOME/facetrain/cascades/` or `~/.cache/facetrain/cascades/`
/// - Windows: `%LOCALAPPDATA%/facetrain/cascades/`
pub fn cascade_cache_dir() -> Result<PathBuf, CascadeResolveError> {
    #[cfg(target_os = "macos")]
    {
        dirs::data_dir()
            .map(|d| d.join("facetrain").join("cascades"))
            .ok_or(CascadeResolveError::NoCacheDir)
    }
    #[cfg(not(target_os = "macos"))]
    {
        dirs::cache_dir()
            .map(|d| d.join("facetrain").join("cascades"))
            .ok_or(CascadeResolveError::NoCacheDir)
    }
}

fn download(
    url: &str,
    dest: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), CascadeResolveError> {
    let temp_path = dest.with_extension("part");

    let result = download_inner(url, dest, &temp_path, progress);

    if result.is_err() {
        let _ = fs::remove_file(&temp_path);
    }

    result
}

fn download_inner(
    url: &str,
    dest: &Path,
    temp_path: &Path,
    progress: Option<ProgressFn>,
) -> Result<(), CascadeResolveError> {
    let mut response = reqwest::blocking::get(url)
        .and_then(|r| r.error_for_status())
        .map_err(|e| CascadeResolveError::Download {
            url: url.to_string(),
            source: e,
        })?;

    let total = response.content_length().unwrap_or(0);
    let write_err = |e: std::io::Error| CascadeResolveError::Write {
        path: temp_path.to_path_buf(),
        source: e,
    };

    let mut file = fs::File::create(temp_path).map_err(write_err)?;
    let mut downloaded: u64 = 0;
    let mut buf = vec![0u8; 64 * 1024];
    loop {
        let n = response.read(&mut buf).map_err(write_err)?;
        if n == 0 {
            break;
        }
        file.write_all(&buf[..n]).map_err(write_err)?;
        downloaded += n as u64;
        if let Some(ref cb) = progress {
            cb(downloaded, total);
        }
    }
    file.flush().map_err(write_err)?;
    drop(file);

    fs::rename(temp_path, dest).map_err(|e| CascadeResolveError::Write {
        path: dest.to_path_buf(),
        source: e,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_existing_configured_path_wins() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("my_cascade.xml");
        fs::write(&path, b"<opencv_storage/>").unwrap();

        let resolved = resolve(&path, "http://127.0.0.1:9/x", None).unwrap();
        assert_eq!(resolved, path);
    }

    #[test]
    fn test_cached_copy_is_reused() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        fs::create_dir_all(&cache).unwrap();
        fs::write(cache.join("haarcascade_frontalface_alt2.xml"), b"cached").unwrap();

        let resolved = resolve_in(
            &cache,
            Path::new("missing/haarcascade_frontalface_alt2.xml"),
            "http://127.0.0.1:9/x",
            None,
        )
        .unwrap();
        assert_eq!(resolved, cache.join("haarcascade_frontalface_alt2.xml"));
    }

    #[test]
    fn test_installed_cascade_searches_data_dirs_in_order() {
        let tmp = TempDir::new().unwrap();
        let first = tmp.path().join("a");
        let second = tmp.path().join("b");
        fs::create_dir_all(second.join("haarcascades")).unwrap();
        fs::write(second.join("haarcascades").join("face.xml"), b"x").unwrap();

        let found = installed_cascade(Path::new("face.xml"), &[&first, &second]);
        assert_eq!(found, Some(second.join("haarcascades").join("face.xml")));
        assert_eq!(installed_cascade(Path::new("other.xml"), &[&first, &second]), None);
    }

    #[test]
    fn test_bare_directory_falls_back_to_default_name() {
        assert_eq!(file_name(Path::new("/")), PathBuf::from(CASCADE_FILE_NAME));
        assert_eq!(file_name(Path::new("c/x.xml")), PathBuf::from("x.xml"));
    }

    #[test]
    fn test_cache_dir_is_namespaced() {
        if let Ok(dir) = cascade_cache_dir() {
            assert!(dir.ends_with("facetrain/cascades"));
        }
    }

    #[test]
    fn test_failed_download_leaves_nothing_behind() {
        let tmp = TempDir::new().unwrap();
        let cache = tmp.path().join("cache");
        let result = resolve_in(
            &cache,
            Path::new("missing/cascade.xml"),
            "http://127.0.0.1:9/cascade.xml",
            None,
        );
        assert!(matches!(result, Err(CascadeResolveError::Download { .. })));
        assert!(!cache.join("cascade.xml").exists());
        assert!(!cache.join("cascade.part").exists());
    }
}
