//! Source acquisition
//!
//! Finds each component's archive in the downloads directory, unpacks it
//! into the build root with `tar`, and for glibc releases that ship their
//! architecture ports separately, merges the ports archive into the glibc
//! tree. Every step is skipped when its result is already on disk, so a
//! rerun after a failed build reuses the extracted trees.

use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::settings::BuildConfig;
use crate::core::stage::Component;
use crate::core::version::{in_range, Version};
use crate::error::{SourceError, ToolchainError};
use crate::infra::download::ArchiveFetcher;
use crate::infra::filesystem;
use crate::infra::process::{run_checked, CommandRunner, Invocation};

/// Locates, unpacks and merges component sources
pub struct SourceResolver<'a> {
    runner: &'a dyn CommandRunner,
    fetcher: &'a dyn ArchiveFetcher,
}

impl<'a> SourceResolver<'a> {
    /// Create a resolver using `runner` for `tar` and `fetcher` for missing archives
    pub fn new(runner: &'a dyn CommandRunner, fetcher: &'a dyn ArchiveFetcher) -> Self {
        Self { runner, fetcher }
    }

    /// Find the archive for `name-version`
    ///
    /// Suffixes are probed in [`defaults::ARCHIVE_SUFFIXES`] order before
    /// falling back to the fetcher.
    pub fn locate(
        &self,
        name: &str,
        version: &str,
        download_dir: &Path,
    ) -> Result<PathBuf, SourceError> {
        let full_name = format!("{name}-{version}");
        for suffix in defaults::ARCHIVE_SUFFIXES {
            let candidate = download_dir.join(format!("{full_name}{suffix}"));
            if candidate.is_file() {
                tracing::debug!("Found {}", candidate.display());
                return Ok(candidate);
            }
        }

        self.fetcher
            .fetch(name, version, download_dir)
            .filter(|path| path.is_file())
            .ok_or_else(|| SourceError::SourceNotFound {
                name: name.to_string(),
                version: version.to_string(),
                dir: download_dir.to_path_buf(),
            })
    }

    /// Unpack `archive` into `build_root`, returning the source tree
    ///
    /// Nothing is run when the tree already exists.
    pub fn extract(&self, archive: &Path, build_root: &Path) -> Result<PathBuf, SourceError> {
        let tree = build_root.join(archive_stem(archive));
        if tree.exists() {
            tracing::info!("Skip {}", display_name(archive));
            return Ok(tree);
        }

        tracing::info!("Uncompress {}", display_name(archive));
        let tar = Invocation::new("tar", build_root)
            .arg("xf")
            .arg(archive.display().to_string())
            .arg("-C")
            .arg(build_root.display().to_string());
        run_checked(self.runner, &tar).map_err(|error| SourceError::ExtractionFailed {
            archive: archive.to_path_buf(),
            error,
        })?;

        if !tree.is_dir() {
            return Err(SourceError::ExtractionFailed {
                archive: archive.to_path_buf(),
                error: format!("expected directory {} was not created", tree.display()),
            });
        }
        Ok(tree)
    }

    /// Merge the glibc ports overlay when `version` needs it
    ///
    /// Returns whether a merge happened. Versions outside
    /// [`defaults::GLIBC_PORTS_FIRST`]..=[`defaults::GLIBC_PORTS_LAST`] and
    /// trees that already contain the overlay are left alone.
    pub fn merge_companion(
        &self,
        glibc_tree: &Path,
        version: &str,
        download_dir: &Path,
        build_root: &Path,
    ) -> Result<bool, SourceError> {
        let parsed = Version::parse(version)?;
        if !in_range(
            &parsed,
            &defaults::GLIBC_PORTS_FIRST,
            &defaults::GLIBC_PORTS_LAST,
        ) {
            return Ok(false);
        }

        let target = glibc_tree.join(defaults::GLIBC_PORTS_DIR);
        if target.exists() {
            tracing::info!("Ports already merged into {}", glibc_tree.display());
            return Ok(false);
        }

        let name = format!("{}-ports", Component::Glibc.name());
        let archive = self.locate(&name, version, download_dir)?;
        let ports_tree = self.extract(&archive, build_root)?;

        tracing::info!(
            "Merging {} into {}",
            ports_tree.display(),
            target.display()
        );
        std::fs::rename(&ports_tree, &target).map_err(|e| SourceError::MergeFailed {
            from: ports_tree.clone(),
            to: target.clone(),
            error: e.to_string(),
        })?;
        Ok(true)
    }

    /// Fetch and unpack every component, recording the trees in `config`
    pub fn acquire_all(&self, config: &mut BuildConfig) -> Result<(), ToolchainError> {
        let download_dir = config.downloads_dir();
        let build_dir = config.build_dir();
        filesystem::create_dir_all(&download_dir)?;
        filesystem::create_dir_all(&build_dir)?;
        let build_root = filesystem::absolute(&build_dir)?;

        for component in Component::ALL {
            let version = config.versions.get(component).to_string();
            let archive = self.locate(component.name(), &version, &download_dir)?;
            let tree = self.extract(&archive, &build_root)?;
            if component == Component::Glibc {
                self.merge_companion(&tree, &version, &download_dir, &build_root)?;
            }
            config.sources.set(component, filesystem::absolute(&tree)?);
        }

        config.build_root = build_root;
        Ok(())
    }
}

/// Archive file name with its compression suffix removed
pub fn archive_stem(archive: &Path) -> String {
    let name = display_name(archive);
    defaults::ARCHIVE_SUFFIXES
        .iter()
        .find_map(|suffix| name.strip_suffix(suffix))
        .map_or_else(
            || {
                archive
                    .file_stem()
                    .map(|s| s.to_string_lossy().into_owned())
                    .unwrap_or_default()
            },
            str::to_string,
        )
}

fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::download::OfflineFetcher;
    use crate::test_utils::RecordingRunner;
    use tempfile::TempDir;

    fn touch(path: &Path) {
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();
        std::fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_archive_stem() {
        assert_eq!(archive_stem(Path::new("/dl/gcc-4.8.1.tar.bz2")), "gcc-4.8.1");
        assert_eq!(archive_stem(Path::new("linux-3.9.4.tar.xz")), "linux-3.9.4");
        assert_eq!(archive_stem(Path::new("glibc-2.17.tar.gz")), "glibc-2.17");
    }

    #[test]
    fn test_locate_probes_in_order() {
        let temp = TempDir::new().unwrap();
        touch(&temp.path().join("gcc-4.8.1.tar.gz"));
        touch(&temp.path().join("gcc-4.8.1.tar.xz"));

        let runner = RecordingRunner::new();
        let resolver = SourceResolver::new(&runner, &OfflineFetcher);
        let found = resolver.locate("gcc", "4.8.1", temp.path()).unwrap();
        assert_eq!(found, temp.path().join("gcc-4.8.1.tar.xz"));
    }

    #[test]
    fn test_locate_missing_archive() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let resolver = SourceResolver::new(&runner, &OfflineFetcher);
        let err = resolver.locate("glibc", "2.17", temp.path()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::SourceNotFound { ref name, ref version, .. }
                if name == "glibc" && version == "2.17"
        ));
    }

    #[test]
    fn test_extract_runs_tar_once() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("downloads/binutils-2.23.2.tar.bz2");
        touch(&archive);
        let build = temp.path().join("build");
        std::fs::create_dir_all(&build).unwrap();

        let runner = RecordingRunner::new();
        let resolver = SourceResolver::new(&runner, &OfflineFetcher);

        let first = resolver.extract(&archive, &build).unwrap();
        let second = resolver.extract(&archive, &build).unwrap();

        assert_eq!(first, build.join("binutils-2.23.2"));
        assert_eq!(first, second);
        assert_eq!(runner.count_program("tar"), 1);
    }

    #[test]
    fn test_extract_failure_is_fatal() {
        let temp = TempDir::new().unwrap();
        let archive = temp.path().join("gcc-4.8.1.tar.bz2");
        touch(&archive);

        let runner = RecordingRunner::new().failing_program("tar");
        let resolver = SourceResolver::new(&runner, &OfflineFetcher);
        let err = resolver.extract(&archive, temp.path()).unwrap_err();
        assert!(matches!(
            err,
            SourceError::ExtractionFailed { ref error, .. } if error.ends_with("exit status 2")
        ));
    }

    #[test]
    fn test_merge_companion_in_range() {
        let temp = TempDir::new().unwrap();
        let downloads = temp.path().join("downloads");
        let build = temp.path().join("build");
        touch(&downloads.join("glibc-ports-2.16.0.tar.xz"));
        let glibc_tree = build.join("glibc-2.16.0");
        std::fs::create_dir_all(&glibc_tree).unwrap();

        let runner = RecordingRunner::new();
        let resolver = SourceResolver::new(&runner, &OfflineFetcher);
        let merged = resolver
            .merge_companion(&glibc_tree, "2.16.0", &downloads, &build)
            .unwrap();

        assert!(merged);
        assert!(glibc_tree.join("ports").is_dir());
        assert!(!build.join("glibc-ports-2.16.0").exists());

        // second run finds the overlay in place
        let again = resolver
            .merge_companion(&glibc_tree, "2.16.0", &downloads, &build)
            .unwrap();
        assert!(!again);
        assert_eq!(runner.count_program("tar"), 1);
    }

    #[test]
    fn test_merge_companion_out_of_range_is_noop() {
        let temp = TempDir::new().unwrap();
        let runner = RecordingRunner::new();
        let resolver = SourceResolver::new(&runner, &OfflineFetcher);
        let merged = resolver
            .merge_companion(temp.path(), "2.18", temp.path(), temp.path())
            .unwrap();
        assert!(!merged);
        assert!(runner.invocations().is_empty());
    }
}
