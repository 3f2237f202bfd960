// ABOUTME: Host-platform services the page relies on
// ABOUTME: Export platform detection, alerts, clipboard and file delivery

use crate::storage::write_atomic;
use crate::{Error, Result};
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;
use std::time::Duration;

static LIMITED_AGENT: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"iPad|iPhone|iPod").expect("valid user-agent regex"));

/// Which export branch a platform gets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// No native word-processor support; exports Markdown.
    Limited,
    Standard,
}

impl Platform {
    pub fn from_user_agent(user_agent: &str) -> Self {
        if LIMITED_AGENT.is_match(user_agent) {
            Platform::Limited
        } else {
            Platform::Standard
        }
    }

    pub fn current() -> Self {
        if cfg!(target_os = "ios") {
            Platform::Limited
        } else {
            Platform::Standard
        }
    }
}

/// User-facing alerts. These are the only failure reports a user sees.
pub trait Notifier {
    fn alert(&self, message: &str);
}

pub struct StdoutNotifier;

impl Notifier for StdoutNotifier {
    fn alert(&self, message: &str) {
        println!("{}", message);
    }
}

pub trait Clipboard {
    fn copy(&mut self, text: &str) -> Result<()>;
}

/// The desktop clipboard. On X11/Wayland the copying process owns the
/// selection, so the text is only pasteable while it is held; `hold` decides
/// how long `copy` waits for a clipboard manager or another copy to take over.
pub struct SystemClipboard {
    #[cfg_attr(not(target_os = "linux"), allow(dead_code))]
    hold: Option<Duration>,
}

impl SystemClipboard {
    /// Blocks in `copy` until something else replaces the clipboard.
    pub fn until_replaced() -> Self {
        SystemClipboard { hold: None }
    }

    /// Holds the selection for at most `hold` before returning.
    pub fn holding(hold: Duration) -> Self {
        SystemClipboard { hold: Some(hold) }
    }
}

impl Clipboard for SystemClipboard {
    fn copy(&mut self, text: &str) -> Result<()> {
        let mut clipboard =
            arboard::Clipboard::new().map_err(|e| Error::Clipboard(e.to_string()))?;

        #[cfg(target_os = "linux")]
        let set = {
            use arboard::SetExtLinux;
            match self.hold {
                Some(hold) => clipboard.set().wait_until(std::time::Instant::now() + hold),
                None => clipboard.set().wait(),
            }
        };
        #[cfg(not(target_os = "linux"))]
        let set = clipboard.set();

        set.text(text.to_string())
            .map_err(|e| Error::Clipboard(e.to_string()))
    }
}

/// Receives a generated file; returns where it ended up.
pub trait DownloadSink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf>;
}

pub struct DirectorySink {
    download_dir: PathBuf,
}

impl DirectorySink {
    pub fn new(download_dir: PathBuf) -> Self {
        DirectorySink { download_dir }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }
}

impl DownloadSink for DirectorySink {
    fn deliver(&self, filename: &str, bytes: &[u8]) -> Result<PathBuf> {
        let path = self.download_dir.join(filename);
        write_atomic(&path, bytes)?;
        tracing::info!(path = %path.display(), bytes = bytes.len(), "download written");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_platform_from_user_agent() {
        let ios = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_0 like Mac OS X)";
        let ipad = "Mozilla/5.0 (iPad; CPU OS 16_0 like Mac OS X)";
        let mac = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7)";
        assert_eq!(Platform::from_user_agent(ios), Platform::Limited);
        assert_eq!(Platform::from_user_agent(ipad), Platform::Limited);
        assert_eq!(Platform::from_user_agent(mac), Platform::Standard);
        assert_eq!(Platform::from_user_agent(""), Platform::Standard);
    }

    #[test]
    fn test_system_clipboard_hold_returns() {
        // Headless hosts have no clipboard; either way the call must come back
        // once the hold window ends and map failures to the clipboard error.
        let mut clipboard = SystemClipboard::holding(Duration::ZERO);
        match clipboard.copy("Plan A") {
            Ok(()) => {}
            Err(e) => assert_eq!(e.exit_code(), 8),
        }
    }

    #[test]
    fn test_directory_sink_writes_file() {
        let temp = TempDir::new().unwrap();
        let sink = DirectorySink::new(temp.path().join("dl"));
        let path = sink.deliver("My Plan.md", b"# My Plan").unwrap();

        assert_eq!(path, temp.path().join("dl").join("My Plan.md"));
        assert_eq!(fs::read_to_string(path).unwrap(), "# My Plan");
        assert_eq!(sink.download_dir(), temp.path().join("dl"));
    }

    #[test]
    fn test_directory_sink_leaves_only_the_download() {
        // shm is a separate tmpfs mount on most Linux hosts.
        let shm = Path::new("/dev/shm");
        let downloads = if shm.is_dir() {
            TempDir::new_in(shm).unwrap()
        } else {
            TempDir::new().unwrap()
        };
        let sink = DirectorySink::new(downloads.path().to_path_buf());

        let path = sink.deliver("Plan.docx", b"PK").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"PK");
        let names: Vec<_> = fs::read_dir(downloads.path())
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["Plan.docx"]);
    }
}
