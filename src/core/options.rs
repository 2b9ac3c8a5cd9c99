//! Build option composition
//!
//! Derives the configure/make flags shared by every stage from the resolved
//! triple, the install prefix, the parallelism request and the sysroot
//! toggle. The result is computed once and never changed.

use std::path::{Path, PathBuf};

use crate::config::defaults;

/// Flags and paths handed to the build stages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    /// `make` parallelism, e.g. `-j10`
    pub jobs: String,
    /// `--target=<triple>`
    pub target: String,
    /// `--host=<triple>`, used by the C library
    pub host: String,
    /// `--prefix=<prefix>`
    pub prefix: String,
    /// Prefix flag for the C library stage
    pub lib_prefix: String,
    /// `--with-sysroot=<prefix>/fakeroot`, or empty when disabled
    pub sysroot: String,
    /// Where the C library and headers are installed
    pub lib_root: PathBuf,
    /// Whether a sysroot is in use
    pub sysroot_enabled: bool,
    /// Extra `--with-*` flags for both compiler passes
    pub tuning: Vec<String>,
}

impl BuildOptions {
    /// Attach compiler tuning flags
    #[must_use]
    pub fn with_tuning(mut self, tuning: Vec<String>) -> Self {
        self.tuning = tuning;
        self
    }

    /// `INSTALL_HDR_PATH` for the kernel headers
    pub fn header_root(&self) -> PathBuf {
        if self.sysroot_enabled {
            self.lib_root.join("usr")
        } else {
            self.lib_root.clone()
        }
    }

    /// Directory passed to the C library as `--with-headers`
    pub fn header_dir(&self) -> PathBuf {
        self.header_root().join("include")
    }

    /// Extra `make install` argument redirecting the C library install
    pub fn lib_install_root(&self) -> Option<String> {
        self.sysroot_enabled
            .then(|| format!("install_root={}", self.lib_root.display()))
    }
}

/// Whether a requested job count is accepted
pub fn usable_jobs(jobs: i64) -> bool {
    jobs > 1
}

/// Compose the flag set
///
/// A job count of one or less is ignored in favor of the default.
pub fn compose(triple: &str, prefix: &Path, jobs: Option<i64>, sysroot: bool) -> BuildOptions {
    let jobs = match jobs {
        Some(n) if usable_jobs(n) => n,
        Some(n) => {
            tracing::debug!(
                "Ignoring jobs value {n}, using {}",
                defaults::DEFAULT_BUILD_JOBS
            );
            i64::from(defaults::DEFAULT_BUILD_JOBS)
        }
        None => i64::from(defaults::DEFAULT_BUILD_JOBS),
    };

    let prefix_flag = format!("--prefix={}", prefix.display());
    let (lib_root, lib_prefix, sysroot_flag) = if sysroot {
        let root = prefix.join(defaults::SYSROOT_SUBDIR);
        let flag = format!("--with-sysroot={}", root.display());
        (root, "--prefix=/usr".to_string(), flag)
    } else {
        (prefix.to_path_buf(), prefix_flag.clone(), String::new())
    };

    BuildOptions {
        jobs: format!("-j{jobs}"),
        target: format!("--target={triple}"),
        host: format!("--host={triple}"),
        prefix: prefix_flag,
        lib_prefix,
        sysroot: sysroot_flag,
        lib_root,
        sysroot_enabled: sysroot,
        tuning: Vec::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compose_with_sysroot() {
        let opts = compose("aarch64-linux-gnu", Path::new("/opt/cross"), Some(8), true);
        assert_eq!(opts.jobs, "-j8");
        assert_eq!(opts.target, "--target=aarch64-linux-gnu");
        assert_eq!(opts.host, "--host=aarch64-linux-gnu");
        assert_eq!(opts.prefix, "--prefix=/opt/cross");
        assert_eq!(opts.lib_prefix, "--prefix=/usr");
        assert_eq!(opts.sysroot, "--with-sysroot=/opt/cross/fakeroot");
        assert_eq!(opts.lib_root, PathBuf::from("/opt/cross/fakeroot"));
        assert_eq!(opts.header_dir(), PathBuf::from("/opt/cross/fakeroot/usr/include"));
        assert_eq!(
            opts.lib_install_root().as_deref(),
            Some("install_root=/opt/cross/fakeroot")
        );
    }

    #[test]
    fn test_compose_without_sysroot() {
        let opts = compose("aarch64-linux-gnu", Path::new("/opt/cross"), None, false);
        assert_eq!(opts.jobs, "-j10");
        assert_eq!(opts.lib_prefix, opts.prefix);
        assert!(opts.sysroot.is_empty());
        assert_eq!(opts.lib_root, PathBuf::from("/opt/cross"));
        assert_eq!(opts.header_dir(), PathBuf::from("/opt/cross/include"));
        assert!(opts.lib_install_root().is_none());
    }

    #[test]
    fn test_small_job_counts_fall_back() {
        for n in [1, 0, -4] {
            let opts = compose("t", Path::new("/p"), Some(n), false);
            assert_eq!(opts.jobs, "-j10");
        }
        assert_eq!(compose("t", Path::new("/p"), Some(2), false).jobs, "-j2");
    }
}
