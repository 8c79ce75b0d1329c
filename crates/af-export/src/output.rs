use std::io::Write;
use std::path::Path;

use anyhow::{Context, Result};
use tempfile::{Builder, NamedTempFile};

/// Écrit `bytes` dans `path` via un fichier temporaire renommé.
///
/// The temporary file lives in the destination directory, so the final
/// rename never crosses filesystems. On any failure `path` is left as it
/// was.
///
/// Permissions match a plain `fs::write`: an existing target keeps its
/// mode, a new one gets `0o666` minus the process umask.
///
/// # Errors
/// Returns an error if the temporary file cannot be created, written, or
/// moved into place.
///
/// # Example
/// ```
/// use af_export::output::write_atomic;
/// let dir = tempfile::tempdir().unwrap();
/// let path = dir.path().join("out.txt");
/// write_atomic(&path, b"@@\n").unwrap();
/// assert_eq!(std::fs::read(&path).unwrap(), b"@@\n");
/// ```
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = path
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));

    let mut tmp = create_temp(dir)
        .with_context(|| format!("Impossible de créer un fichier dans {}", dir.display()))?;
    tmp.write_all(bytes)
        .and_then(|()| tmp.flush())
        .with_context(|| format!("Écriture échouée vers {}", path.display()))?;

    if let Ok(meta) = std::fs::metadata(path) {
        tmp.as_file()
            .set_permissions(meta.permissions())
            .with_context(|| format!("Permissions de {} non conservées", path.display()))?;
    }

    tmp.persist(path)
        .map_err(|e| e.error)
        .with_context(|| format!("Impossible d'écrire {}", path.display()))?;

    log::debug!("{} octets écrits dans {}", bytes.len(), path.display());
    Ok(())
}

#[cfg(unix)]
fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    use std::os::unix::fs::PermissionsExt;

    // open(2) applies the umask to this mode.
    Builder::new()
        .permissions(std::fs::Permissions::from_mode(0o666))
        .tempfile_in(dir)
}

#[cfg(not(unix))]
fn create_temp(dir: &Path) -> std::io::Result<NamedTempFile> {
    Builder::new().tempfile_in(dir)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.gif");
        std::fs::write(&path, b"old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"new");
    }

    #[test]
    fn missing_directory_fails_without_output() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("out.gif");
        assert!(write_atomic(&path, b"data").is_err());
        assert!(!path.exists());
    }

    #[cfg(unix)]
    #[test]
    fn new_file_gets_same_mode_as_fs_write() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let ours = dir.path().join("out.gif");
        let plain = dir.path().join("plain.gif");
        write_atomic(&ours, b"gif").unwrap();
        std::fs::write(&plain, b"gif").unwrap();

        let mode = |p: &Path| std::fs::metadata(p).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode(&ours), mode(&plain));
    }

    #[cfg(unix)]
    #[test]
    fn overwrite_keeps_existing_mode() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.txt");
        std::fs::write(&path, b"old").unwrap();
        std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o640)).unwrap();

        write_atomic(&path, b"new").unwrap();
        let mode = std::fs::metadata(&path).unwrap().permissions().mode() & 0o777;
        assert_eq!(mode, 0o640);
    }
}
