//! # chrome-locate
//!
//! Find a Chrome or Chromium executable suitable for headless rendering,
//! without asking the user to configure anything on a typical machine.
//!
//! ## Resolution order
//!
//! 1. `CHROME_PATH`: explicit override. If set but missing, that is an
//!    error rather than a silent fallback.
//! 2. The Playwright browser cache (`PLAYWRIGHT_BROWSERS_PATH`, else
//!    `~/.cache/ms-playwright` or the platform cache dir). Newest revision
//!    first.
//! 3. Well-known install locations for the current OS.
//! 4. A `PATH` search for the usual binary names.
//!
//! ## Usage
//!
//! ```rust,no_run
//! let chrome = chrome_locate::find_chrome().expect("no browser installed");
//! println!("using {}", chrome.display());
//! ```
//!
//! ## Platform support
//!
//! | OS      | Install paths checked                                        |
//! |---------|--------------------------------------------------------------|
//! | Linux   | `/usr/bin/{google-chrome,chromium,chromium-browser}`, snap   |
//! | macOS   | `/Applications/{Google Chrome,Chromium}.app`                 |
//! | Windows | `%ProgramFiles%`, `%ProgramFiles(x86)%`, `%LOCALAPPDATA%`    |

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use thiserror::Error;

// ── Public constants ─────────────────────────────────────────────────────────

/// Environment variable holding an explicit browser path.
pub const CHROME_PATH_ENV: &str = "CHROME_PATH";

/// Environment variable Playwright uses to relocate its browser cache.
pub const PLAYWRIGHT_BROWSERS_ENV: &str = "PLAYWRIGHT_BROWSERS_PATH";

/// Binary names tried on `PATH`, most specific first.
pub const BINARY_NAMES: &[&str] = &[
    "google-chrome",
    "google-chrome-stable",
    "chromium",
    "chromium-browser",
    "chrome",
    "headless_shell",
];

// ── Error type ───────────────────────────────────────────────────────────────

/// Errors returned by chrome-locate operations.
#[derive(Error, Debug)]
pub enum LocateError {
    /// `CHROME_PATH` is set but does not point at a file.
    #[error("CHROME_PATH is set to '{path}' but no such file exists")]
    OverrideMissing { path: PathBuf },

    /// Nothing usable was found anywhere.
    #[error(
        "No Chrome/Chromium executable found ({} locations checked).\n\
Install Chrome or Chromium, run `npx playwright install chromium`, or set CHROME_PATH.",
        searched.len()
    )]
    NotFound { searched: Vec<PathBuf> },
}

// ── Thread-safe singleton path cache ─────────────────────────────────────────

static RESOLVED_PATH: OnceLock<PathBuf> = OnceLock::new();

// ── Public API ───────────────────────────────────────────────────────────────

/// Locate a browser executable, caching the answer for the process lifetime.
///
/// Safe to call from multiple threads; the search runs at most a handful of
/// times under contention and every caller gets the same path.
pub fn find_chrome() -> Result<PathBuf, LocateError> {
    if let Some(path) = RESOLVED_PATH.get() {
        return Ok(path.clone());
    }

    let path = locate()?;
    let _ = RESOLVED_PATH.set(path.clone());
    Ok(path)
}

/// Run the full search without touching the process-wide cache.
pub fn locate() -> Result<PathBuf, LocateError> {
    if let Some(p) = std::env::var_os(CHROME_PATH_ENV) {
        let path = PathBuf::from(p);
        if path.is_file() {
            return Ok(path);
        }
        return Err(LocateError::OverrideMissing { path });
    }

    let mut searched = Vec::new();

    let mut candidates = playwright_candidates(&playwright_cache_dir());
    candidates.extend(install_candidates());

    for candidate in candidates {
        if candidate.is_file() {
            return Ok(candidate);
        }
        searched.push(candidate);
    }

    let path_dirs: Vec<PathBuf> = std::env::var_os("PATH")
        .map(|v| std::env::split_paths(&v).collect())
        .unwrap_or_default();
    if let Some(found) = search_dirs(&path_dirs, BINARY_NAMES) {
        return Ok(found);
    }
    searched.extend(path_dirs);

    Err(LocateError::NotFound { searched })
}

/// Returns the Playwright browser cache directory.
///
/// Default locations:
/// - **Linux**: `~/.cache/ms-playwright/`
/// - **macOS**: `~/Library/Caches/ms-playwright/`
/// - **Windows**: `%LOCALAPPDATA%\ms-playwright\`
///
/// Override by setting `PLAYWRIGHT_BROWSERS_PATH`.
pub fn playwright_cache_dir() -> PathBuf {
    if let Some(dir) = std::env::var_os(PLAYWRIGHT_BROWSERS_ENV) {
        return PathBuf::from(dir);
    }

    let base = dirs::cache_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".cache")))
        .unwrap_or_else(std::env::temp_dir);

    base.join("ms-playwright")
}

/// Executables inside a Playwright cache, newest revision first.
///
/// Playwright lays out one directory per revision, e.g.
/// `chromium-1140/chrome-linux/chrome` or
/// `chromium_headless_shell-1140/chrome-linux/headless_shell`.
pub fn playwright_candidates(cache_dir: &Path) -> Vec<PathBuf> {
    let Ok(entries) = std::fs::read_dir(cache_dir) else {
        return Vec::new();
    };

    let mut revisions: Vec<(u32, PathBuf)> = entries
        .filter_map(Result::ok)
        .filter_map(|entry| {
            let name = entry.file_name().to_string_lossy().into_owned();
            let rev = name
                .strip_prefix("chromium-")
                .or_else(|| name.strip_prefix("chromium_headless_shell-"))?;
            Some((rev.parse().ok()?, entry.path()))
        })
        .collect();
    revisions.sort_by(|a, b| b.0.cmp(&a.0));

    revisions
        .into_iter()
        .flat_map(|(_, dir)| playwright_layouts().iter().map(move |rel| dir.join(rel)))
        .collect()
}

/// Look for any of `names` directly inside each of `dirs`, in order.
pub fn search_dirs(dirs: &[PathBuf], names: &[&str]) -> Option<PathBuf> {
    for dir in dirs {
        for name in names {
            let candidate = dir.join(executable_name(name));
            if candidate.is_file() {
                return Some(candidate);
            }
        }
    }
    None
}

// ── Internal: platform metadata ──────────────────────────────────────────────

fn executable_name(name: &str) -> String {
    if cfg!(windows) {
        format!("{name}.exe")
    } else {
        name.to_string()
    }
}

fn playwright_layouts() -> &'static [&'static str] {
    match std::env::consts::OS {
        "macos" => &[
            "chrome-mac/Chromium.app/Contents/MacOS/Chromium",
            "chrome-mac-arm64/Chromium.app/Contents/MacOS/Chromium",
            "chrome-mac/headless_shell",
        ],
        "windows" => &["chrome-win/chrome.exe", "chrome-win/headless_shell.exe"],
        _ => &[
            "chrome-linux/chrome",
            "chrome-linux64/chrome",
            "chrome-linux/headless_shell",
        ],
    }
}

fn install_candidates() -> Vec<PathBuf> {
    match std::env::consts::OS {
        "macos" => vec![
            PathBuf::from("/Applications/Google Chrome.app/Contents/MacOS/Google Chrome"),
            PathBuf::from("/Applications/Chromium.app/Contents/MacOS/Chromium"),
        ],
        "windows" => ["ProgramFiles", "ProgramFiles(x86)", "LOCALAPPDATA"]
            .iter()
            .filter_map(|var| std::env::var_os(var))
            .map(|base| {
                PathBuf::from(base)
                    .join("Google")
                    .join("Chrome")
                    .join("Application")
                    .join("chrome.exe")
            })
            .collect(),
        _ => vec![
            PathBuf::from("/usr/bin/google-chrome"),
            PathBuf::from("/usr/bin/google-chrome-stable"),
            PathBuf::from("/usr/bin/chromium"),
            PathBuf::from("/usr/bin/chromium-browser"),
            PathBuf::from("/snap/bin/chromium"),
            PathBuf::from("/opt/google/chrome/chrome"),
        ],
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn playwright_newest_revision_first() {
        let tmp = tempfile::tempdir().unwrap();
        let layout = playwright_layouts()[0];
        touch(&tmp.path().join("chromium-1090").join(layout));
        touch(&tmp.path().join("chromium-1140").join(layout));
        std::fs::create_dir_all(tmp.path().join("firefox-1400")).unwrap();

        let found = playwright_candidates(tmp.path());
        assert!(found[0].starts_with(tmp.path().join("chromium-1140")));
        assert!(found.iter().all(|p| !p.starts_with(tmp.path().join("firefox-1400"))));
    }

    #[test]
    fn playwright_missing_cache_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(playwright_candidates(&tmp.path().join("nope")).is_empty());
    }

    #[test]
    fn search_dirs_respects_order() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch(&second.path().join(executable_name("chromium")));
        touch(&first.path().join(executable_name("chrome")));

        let dirs = vec![first.path().to_path_buf(), second.path().to_path_buf()];
        let found = search_dirs(&dirs, BINARY_NAMES).unwrap();
        assert_eq!(found, first.path().join(executable_name("chrome")));
    }

    #[test]
    fn search_dirs_none_when_absent() {
        let empty = tempfile::tempdir().unwrap();
        assert!(search_dirs(&[empty.path().to_path_buf()], BINARY_NAMES).is_none());
    }

    #[test]
    fn not_found_message_mentions_override() {
        let e = LocateError::NotFound {
            searched: vec![PathBuf::from("/a"), PathBuf::from("/b")],
        };
        let msg = e.to_string();
        assert!(msg.contains("2 locations"), "got: {msg}");
        assert!(msg.contains("CHROME_PATH"));
    }
}
