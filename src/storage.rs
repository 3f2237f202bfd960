// ABOUTME: Local paths and atomic writes for sessions, downloads and scratch files
// ABOUTME: Downloads land via a sibling temp file + rename so partial files never appear

use crate::{Error, Result};
use directories::{ProjectDirs, UserDirs};
use std::fs;
use std::path::{Path, PathBuf};

pub struct Paths {
    pub config_dir: PathBuf,
    pub session_file: PathBuf,
    pub download_dir: PathBuf,
    pub tmp_dir: PathBuf,
}

impl Paths {
    pub fn new(download_dir_override: Option<PathBuf>) -> Result<Self> {
        let project = ProjectDirs::from("", "", "little-plans").ok_or_else(|| {
            Error::Filesystem(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "Could not determine config directory",
            ))
        })?;

        let download_dir = match download_dir_override {
            Some(dir) => dir,
            None => UserDirs::new()
                .and_then(|dirs| dirs.download_dir().map(Path::to_path_buf))
                .unwrap_or_else(|| project.data_dir().join("downloads")),
        };

        Ok(Paths::from_dirs(
            project.config_dir().to_path_buf(),
            download_dir,
            project.cache_dir().join("tmp"),
        ))
    }

    pub fn from_dirs(config_dir: PathBuf, download_dir: PathBuf, tmp_dir: PathBuf) -> Self {
        Paths {
            session_file: config_dir.join("session.json"),
            config_dir,
            download_dir,
            tmp_dir,
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        fs::create_dir_all(&self.download_dir)?;
        fs::create_dir_all(&self.tmp_dir)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&self.tmp_dir, fs::Permissions::from_mode(0o700))?;
        }
        Ok(())
    }
}

/// Writes `content` to `path` through a sibling temp file and a rename. The
/// temp file lives in the target's own directory so the rename never crosses
/// filesystems.
pub fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    use rand::Rng;

    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let random: u32 = rand::thread_rng().gen();
    let tmp_path = parent.join(format!(".{}.{:x}.part", name, random));

    if let Err(e) = fs::write(&tmp_path, content) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }
    if let Err(e) = fs::rename(&tmp_path, path) {
        // The temp file must not outlive a failed download.
        let _ = fs::remove_file(&tmp_path);
        return Err(e.into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_paths_from_dirs() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_dirs(
            temp.path().join("config"),
            temp.path().join("downloads"),
            temp.path().join("tmp"),
        );
        assert_eq!(paths.session_file, temp.path().join("config/session.json"));
    }

    #[test]
    fn test_paths_new_with_override() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::new(Some(temp.path().to_path_buf())).unwrap();
        assert_eq!(paths.download_dir, temp.path());
        assert!(paths.session_file.ends_with("session.json"));
    }

    #[test]
    fn test_ensure_dirs_creates_structure() {
        let temp = TempDir::new().unwrap();
        let paths = Paths::from_dirs(
            temp.path().join("config"),
            temp.path().join("downloads"),
            temp.path().join("tmp"),
        );
        paths.ensure_dirs().unwrap();
        assert!(paths.download_dir.exists());
        assert!(paths.tmp_dir.exists());
    }

    #[test]
    fn test_write_atomic_creates_file_and_cleans_tmp() {
        let temp = TempDir::new().unwrap();
        let target = temp.path().join("out").join("doc.md");

        write_atomic(&target, b"hello").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "hello");
        let names: Vec<_> = fs::read_dir(temp.path().join("out"))
            .unwrap()
            .map(|e| e.unwrap().file_name())
            .collect();
        assert_eq!(names, ["doc.md"]);
    }

    #[test]
    fn test_write_atomic_stays_inside_target_directory() {
        // Downloads and scratch space usually sit on different mounts.
        let downloads = TempDir::new().unwrap();
        let scratch = TempDir::new().unwrap();
        let paths = Paths::from_dirs(
            scratch.path().join("config"),
            downloads.path().to_path_buf(),
            scratch.path().join("tmp"),
        );
        paths.ensure_dirs().unwrap();

        let target = paths.download_dir.join("My Plan.md");
        write_atomic(&target, b"# My Plan").unwrap();
        write_atomic(&target, b"# My Plan v2").unwrap();

        assert_eq!(fs::read_to_string(&target).unwrap(), "# My Plan v2");
        assert_eq!(fs::read_dir(downloads.path()).unwrap().count(), 1);
        assert_eq!(fs::read_dir(&paths.tmp_dir).unwrap().count(), 0);
    }
}
