//! # hiremeter-pdfium
//!
//! Find a [PDFium](https://pdfium.googlesource.com/pdfium/) shared library
//! and bind `pdfium-render` to it.
//!
//! The engine is treated as an injected capability rather than a fixed
//! install location. [`locate`] walks these sources in order and stops at
//! the first hit:
//!
//! 1. [`LocateOptions::explicit_path`]: a file, or a directory holding the
//!    platform library. Authoritative: a missing explicit path is an error.
//! 2. `PDFIUM_LIB_PATH` environment variable.
//! 3. The per-version cache, `<cache>/hiremeter/pdfium-{VERSION}/`
//!    (override the base with `PDFIUM_CACHE_DIR`).
//! 4. The platform system library (`libpdfium.so` on the loader path, etc).
//! 5. A download of the matching archive from
//!    [bblanchon/pdfium-binaries](https://github.com/bblanchon/pdfium-binaries)
//!    into the cache, unless [`LocateOptions::allow_download`] is off.
//!
//! ```rust,no_run
//! use hiremeter_pdfium::{locate, LocateOptions};
//!
//! let library = locate(&LocateOptions::default()).expect("no PDFium engine");
//! let pdfium = library.bind().expect("bind failed");
//! # drop(pdfium);
//! ```

use std::ffi::OsString;
use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use pdfium_render::prelude::Pdfium;
use thiserror::Error;
use tracing::{debug, info, warn};

// ── Constants ────────────────────────────────────────────────────────────────

/// pdfium-binaries release tag used for downloads.
pub const PDFIUM_VERSION: &str = "7690";

/// Environment variable naming an existing library file.
pub const LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Environment variable overriding the cache base directory.
pub const CACHE_DIR_ENV: &str = "PDFIUM_CACHE_DIR";

const RELEASE_BASE_URL: &str = "https://github.com/bblanchon/pdfium-binaries/releases/download";

// ── Errors ───────────────────────────────────────────────────────────────────

#[derive(Error, Debug)]
pub enum PdfiumError {
    #[error("No PDFium build is published for {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("PDFium library not found at '{path}'")]
    NotFound { path: PathBuf },

    #[error(
        "No PDFium library available and downloading is disabled.\n\
         Set PDFIUM_LIB_PATH=/path/to/libpdfium or allow the download."
    )]
    Unavailable,

    #[error("Cache directory error: {0}")]
    CacheDir(#[source] std::io::Error),

    #[error("Download failed: {0}")]
    Download(String),

    #[error("Archive extraction failed: {0}")]
    Extract(String),

    #[error("Failed to bind PDFium from {origin}: {reason}")]
    Bind { origin: String, reason: String },
}

// ── Platform table ───────────────────────────────────────────────────────────

/// One downloadable PDFium build.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PlatformBuild {
    os: &'static str,
    arch: &'static str,
    /// Release asset, e.g. `pdfium-linux-x64.tgz`.
    archive: &'static str,
    /// Library path inside the archive.
    member: &'static str,
    /// File name on disk.
    file_name: &'static str,
}

const BUILDS: &[PlatformBuild] = &[
    PlatformBuild { os: "linux", arch: "x86_64", archive: "pdfium-linux-x64.tgz", member: "lib/libpdfium.so", file_name: "libpdfium.so" },
    PlatformBuild { os: "linux", arch: "aarch64", archive: "pdfium-linux-arm64.tgz", member: "lib/libpdfium.so", file_name: "libpdfium.so" },
    PlatformBuild { os: "macos", arch: "aarch64", archive: "pdfium-mac-arm64.tgz", member: "lib/libpdfium.dylib", file_name: "libpdfium.dylib" },
    PlatformBuild { os: "macos", arch: "x86_64", archive: "pdfium-mac-x64.tgz", member: "lib/libpdfium.dylib", file_name: "libpdfium.dylib" },
    PlatformBuild { os: "windows", arch: "x86_64", archive: "pdfium-win-x64.tgz", member: "bin/pdfium.dll", file_name: "pdfium.dll" },
    PlatformBuild { os: "windows", arch: "aarch64", archive: "pdfium-win-arm64.tgz", member: "bin/pdfium.dll", file_name: "pdfium.dll" },
    PlatformBuild { os: "windows", arch: "x86", archive: "pdfium-win-x86.tgz", member: "bin/pdfium.dll", file_name: "pdfium.dll" },
];

fn build_for(os: &str, arch: &str) -> Result<&'static PlatformBuild, PdfiumError> {
    BUILDS
        .iter()
        .find(|b| b.os == os && b.arch == arch)
        .ok_or_else(|| PdfiumError::UnsupportedPlatform {
            os: os.to_string(),
            arch: arch.to_string(),
        })
}

fn current_build() -> Result<&'static PlatformBuild, PdfiumError> {
    build_for(std::env::consts::OS, std::env::consts::ARCH)
}

// ── Located library ──────────────────────────────────────────────────────────

/// A PDFium engine that [`locate`] found. Cheap to clone and bind repeatedly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PdfiumLibrary {
    /// A library file at a known path.
    File(PathBuf),
    /// Whatever the platform loader resolves for the default library name.
    System,
}

impl PdfiumLibrary {
    /// Load the library and initialise a [`Pdfium`] instance.
    pub fn bind(&self) -> Result<Pdfium, PdfiumError> {
        let bindings = match self {
            PdfiumLibrary::File(path) => Pdfium::bind_to_library(path),
            PdfiumLibrary::System => Pdfium::bind_to_system_library(),
        }
        .map_err(|e| PdfiumError::Bind {
            origin: self.to_string(),
            reason: e.to_string(),
        })?;

        Ok(Pdfium::new(bindings))
    }
}

impl std::fmt::Display for PdfiumLibrary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PdfiumLibrary::File(path) => write!(f, "'{}'", path.display()),
            PdfiumLibrary::System => f.write_str("the system library path"),
        }
    }
}

/// Inputs for [`locate`].
#[derive(Debug, Clone)]
pub struct LocateOptions {
    /// Library file, or directory containing the platform library.
    pub explicit_path: Option<PathBuf>,
    /// Download into the cache when no other source has a library. Default: true.
    pub allow_download: bool,
}

impl Default for LocateOptions {
    fn default() -> Self {
        Self {
            explicit_path: None,
            allow_download: true,
        }
    }
}

/// Progress sink for downloads: `(bytes_so_far, total_if_known)`.
pub type DownloadProgress<'a> = &'a dyn Fn(u64, Option<u64>);

// ── Public API ───────────────────────────────────────────────────────────────

/// Per-version cache directory for downloaded libraries.
///
/// - Linux: `~/.cache/hiremeter/pdfium-{VERSION}/`
/// - macOS: `~/Library/Caches/hiremeter/pdfium-{VERSION}/`
/// - Windows: `%LOCALAPPDATA%\hiremeter\pdfium-{VERSION}\`
pub fn cache_dir() -> PathBuf {
    cache_dir_from(std::env::var_os(CACHE_DIR_ENV))
}

fn cache_dir_from(base_override: Option<OsString>) -> PathBuf {
    let versioned = format!("pdfium-{PDFIUM_VERSION}");
    match base_override.filter(|v| !v.is_empty()) {
        Some(base) => PathBuf::from(base).join(versioned),
        None => dirs::cache_dir()
            .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
            .unwrap_or_else(std::env::temp_dir)
            .join("hiremeter")
            .join(versioned),
    }
}

/// Find a PDFium library without progress reporting.
pub fn locate(options: &LocateOptions) -> Result<PdfiumLibrary, PdfiumError> {
    locate_with_progress(options, None)
}

/// Find a PDFium library, reporting download progress to `on_progress`.
///
/// Blocking: may perform network I/O on the download step.
pub fn locate_with_progress(
    options: &LocateOptions,
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<PdfiumLibrary, PdfiumError> {
    if let Some(found) = locate_offline(options, std::env::var_os(LIB_PATH_ENV), &cache_dir())? {
        return Ok(found);
    }

    if Pdfium::bind_to_system_library().is_ok() {
        debug!("Using system PDFium library");
        return Ok(PdfiumLibrary::System);
    }

    if !options.allow_download {
        return Err(PdfiumError::Unavailable);
    }

    let build = current_build()?;
    let dest = cache_dir().join(build.file_name);
    download_into(build, &dest, on_progress)?;
    Ok(PdfiumLibrary::File(dest))
}

/// Steps 1–3 of the discovery order; no loader probing, no network.
fn locate_offline(
    options: &LocateOptions,
    env_path: Option<OsString>,
    cache: &Path,
) -> Result<Option<PdfiumLibrary>, PdfiumError> {
    if let Some(ref explicit) = options.explicit_path {
        let path = if explicit.is_dir() {
            explicit.join(current_build()?.file_name)
        } else {
            explicit.clone()
        };
        if !path.is_file() {
            return Err(PdfiumError::NotFound { path });
        }
        debug!("Using configured PDFium at {}", path.display());
        return Ok(Some(PdfiumLibrary::File(path)));
    }

    if let Some(env_path) = env_path.filter(|v| !v.is_empty()) {
        let path = PathBuf::from(env_path);
        if path.is_file() {
            debug!("Using PDFIUM_LIB_PATH={}", path.display());
            return Ok(Some(PdfiumLibrary::File(path)));
        }
        warn!(
            "PDFIUM_LIB_PATH '{}' does not exist; continuing discovery",
            path.display()
        );
    }

    if let Ok(build) = current_build() {
        let cached = cache.join(build.file_name);
        if cached.is_file() {
            debug!("Using cached PDFium at {}", cached.display());
            return Ok(Some(PdfiumLibrary::File(cached)));
        }
    }

    Ok(None)
}

// ── Download ─────────────────────────────────────────────────────────────────

fn download_into(
    build: &PlatformBuild,
    dest: &Path,
    on_progress: Option<DownloadProgress<'_>>,
) -> Result<(), PdfiumError> {
    let url = format!(
        "{RELEASE_BASE_URL}/chromium%2F{PDFIUM_VERSION}/{}",
        build.archive
    );
    info!("Downloading PDFium {} from {}", PDFIUM_VERSION, url);

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent).map_err(PdfiumError::CacheDir)?;
    }

    let archive = fetch(&url, on_progress)?;

    // Unpack next to the destination, then rename, so a crash never leaves
    // a truncated library where the cache lookup would find it.
    let partial = dest.with_extension("part");
    unpack_member(&archive, build.member, &partial)?;
    fs::rename(&partial, dest).map_err(PdfiumError::CacheDir)?;

    info!("PDFium cached at {}", dest.display());
    Ok(())
}

fn fetch(url: &str, on_progress: Option<DownloadProgress<'_>>) -> Result<Vec<u8>, PdfiumError> {
    let client = reqwest::blocking::Client::builder()
        .user_agent(concat!("hiremeter-pdfium/", env!("CARGO_PKG_VERSION")))
        .redirect(reqwest::redirect::Policy::limited(5))
        .build()
        .map_err(|e| PdfiumError::Download(e.to_string()))?;

    let mut response = client
        .get(url)
        .send()
        .map_err(|e| PdfiumError::Download(format!("GET {url}: {e}")))?;

    if !response.status().is_success() {
        return Err(PdfiumError::Download(format!(
            "HTTP {} for {url}",
            response.status()
        )));
    }

    let total = response.content_length();
    let mut body = Vec::with_capacity(total.unwrap_or(32 * 1024 * 1024) as usize);
    let mut chunk = [0u8; 64 * 1024];

    loop {
        let n = match response.read(&mut chunk) {
            Ok(0) => break,
            Ok(n) => n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(PdfiumError::Download(format!("read error: {e}"))),
        };
        body.extend_from_slice(&chunk[..n]);
        if let Some(cb) = on_progress {
            cb(body.len() as u64, total);
        }
    }

    Ok(body)
}

/// Write the single archive entry named `member` to `dest`.
fn unpack_member(archive: &[u8], member: &str, dest: &Path) -> Result<(), PdfiumError> {
    let mut tar = tar::Archive::new(flate2::read::GzDecoder::new(archive));
    let entries = tar
        .entries()
        .map_err(|e| PdfiumError::Extract(e.to_string()))?;

    for entry in entries {
        let mut entry = entry.map_err(|e| PdfiumError::Extract(e.to_string()))?;
        let is_member = entry
            .path()
            .map(|p| p.to_string_lossy() == member)
            .map_err(|e| PdfiumError::Extract(e.to_string()))?;
        if is_member {
            entry
                .unpack(dest)
                .map_err(|e| PdfiumError::Extract(format!("unpack {member}: {e}")))?;
            return Ok(());
        }
    }

    Err(PdfiumError::Extract(format!("'{member}' not in archive")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_platforms_resolve() {
        let linux = build_for("linux", "x86_64").unwrap();
        assert_eq!(linux.file_name, "libpdfium.so");
        assert!(linux.member.ends_with(linux.file_name));

        let win = build_for("windows", "x86").unwrap();
        assert_eq!(win.file_name, "pdfium.dll");
    }

    #[test]
    fn unknown_platform_is_an_error() {
        let err = build_for("plan9", "mips").unwrap_err();
        assert!(err.to_string().contains("plan9/mips"));
    }

    #[test]
    fn cache_dir_is_versioned() {
        let dir = cache_dir_from(None);
        assert!(dir.ends_with(format!("hiremeter/pdfium-{PDFIUM_VERSION}")));
    }

    #[test]
    fn cache_dir_honours_override() {
        let dir = cache_dir_from(Some(OsString::from("/tmp/hm-cache")));
        assert_eq!(dir, PathBuf::from(format!("/tmp/hm-cache/pdfium-{PDFIUM_VERSION}")));

        // An empty override is ignored.
        let dir = cache_dir_from(Some(OsString::new()));
        assert!(dir.ends_with(format!("hiremeter/pdfium-{PDFIUM_VERSION}")));
    }

    #[test]
    fn explicit_file_wins_over_env() {
        let tmp = tempfile::tempdir().unwrap();
        let lib = tmp.path().join("custom-pdfium.so");
        fs::write(&lib, b"not really a library").unwrap();
        let env_lib = tmp.path().join("env-pdfium.so");
        fs::write(&env_lib, b"also not a library").unwrap();

        let options = LocateOptions {
            explicit_path: Some(lib.clone()),
            allow_download: false,
        };
        let found = locate_offline(&options, Some(env_lib.into_os_string()), tmp.path()).unwrap();
        assert_eq!(found, Some(PdfiumLibrary::File(lib)));
    }

    #[test]
    fn missing_explicit_path_does_not_fall_through() {
        let tmp = tempfile::tempdir().unwrap();
        let options = LocateOptions {
            explicit_path: Some(tmp.path().join("nope.so")),
            allow_download: false,
        };
        let err = locate_offline(&options, None, tmp.path()).unwrap_err();
        assert!(matches!(err, PdfiumError::NotFound { .. }));
    }

    #[test]
    fn env_path_used_when_no_explicit_path() {
        let tmp = tempfile::tempdir().unwrap();
        let env_lib = tmp.path().join("env-pdfium.so");
        fs::write(&env_lib, b"x").unwrap();

        let found = locate_offline(
            &LocateOptions::default(),
            Some(env_lib.clone().into_os_string()),
            tmp.path(),
        )
        .unwrap();
        assert_eq!(found, Some(PdfiumLibrary::File(env_lib)));
    }

    #[test]
    fn stale_env_path_falls_back_to_cache() {
        let tmp = tempfile::tempdir().unwrap();
        let build = current_build().unwrap();
        let cached = tmp.path().join(build.file_name);
        fs::write(&cached, b"x").unwrap();

        let found = locate_offline(
            &LocateOptions::default(),
            Some(OsString::from("/definitely/missing/libpdfium.so")),
            tmp.path(),
        )
        .unwrap();
        assert_eq!(found, Some(PdfiumLibrary::File(cached)));
    }

    #[test]
    fn nothing_found_offline() {
        let tmp = tempfile::tempdir().unwrap();
        let found = locate_offline(&LocateOptions::default(), None, tmp.path()).unwrap();
        assert_eq!(found, None);
    }

    #[test]
    fn display_names_origin() {
        assert_eq!(PdfiumLibrary::System.to_string(), "the system library path");
        let f = PdfiumLibrary::File(PathBuf::from("/opt/libpdfium.so"));
        assert_eq!(f.to_string(), "'/opt/libpdfium.so'");
    }
}
