//! Library path normalization
//!
//! After the C library is installed into a sysroot, binutils and gcc pass 1
//! have left `lib`, `lib64` and `include` directories under
//! `<prefix>/<triple>`. gcc pass 2 expects those to be the top-level
//! `<prefix>` directories, so each per-triple directory is replaced by a
//! relative symlink to its top-level counterpart. Linker scripts are the only
//! content kept; they move up to the top-level directory first.

use std::io;
use std::path::{Path, PathBuf};

use crate::error::LibraryPathError;

/// Directories relinked under `<prefix>/<triple>`
pub const NORMALIZED_DIRS: &[&str] = &["lib", "lib64", "include"];

/// Subdirectory preserved when a per-triple directory is replaced
pub const LDSCRIPTS_DIR: &str = "ldscripts";

/// Relink the per-triple directories of `prefix` to the top-level ones
pub fn normalize(prefix: &Path, triple: &str) -> Result<(), LibraryPathError> {
    let triple_dir = prefix.join(triple);
    if !triple_dir.is_dir() {
        return Err(failed(&triple_dir, "per-triple directory does not exist"));
    }

    for name in NORMALIZED_DIRS {
        let nested = triple_dir.join(name);
        let top = prefix.join(name);

        match std::fs::symlink_metadata(&nested) {
            Ok(meta) if meta.file_type().is_symlink() => {
                std::fs::remove_file(&nested).map_err(|e| failed(&nested, e))?;
            }
            Ok(meta) if meta.is_dir() => relocate(&nested, &top)?,
            Ok(_) => return Err(failed(&nested, "exists and is not a directory")),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => return Err(failed(&nested, e)),
        }

        let relative = Path::new("..").join(name);
        symlink(&relative, &nested).map_err(|e| failed(&nested, e))?;
        tracing::debug!("Linked {} -> {}", nested.display(), relative.display());
    }

    tracing::info!("Normalized library paths under {}", triple_dir.display());
    Ok(())
}

fn relocate(nested: &Path, top: &Path) -> Result<(), LibraryPathError> {
    let scripts = nested.join(LDSCRIPTS_DIR);
    if scripts.exists() {
        let dest = top.join(LDSCRIPTS_DIR);
        std::fs::create_dir_all(top).map_err(|e| failed(top, e))?;
        if dest.exists() {
            std::fs::remove_dir_all(&dest).map_err(|e| failed(&dest, e))?;
        }
        std::fs::rename(&scripts, &dest).map_err(|e| failed(&scripts, e))?;
        tracing::debug!("Moved {} to {}", scripts.display(), dest.display());
    }
    std::fs::remove_dir_all(nested).map_err(|e| failed(nested, e))
}

#[cfg(unix)]
fn symlink(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(not(unix))]
fn symlink(_target: &Path, _link: &Path) -> io::Result<()> {
    Err(io::Error::new(
        io::ErrorKind::Unsupported,
        "symbolic links require a Unix host",
    ))
}

fn failed(path: &Path, error: impl ToString) -> LibraryPathError {
    LibraryPathError::NormalizationFailed {
        path: PathBuf::from(path),
        error: error.to_string(),
    }
}
