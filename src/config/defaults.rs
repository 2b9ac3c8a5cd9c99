//! Default configuration values

use crate::core::version::Version;

/// Default number of parallel build jobs
pub const DEFAULT_BUILD_JOBS: u32 = 10;

/// Work directory used when the config leaves `path` empty
pub const DEFAULT_WORK_DIR: &str = ".";

/// Install prefix under the work directory when `prefix` is empty
pub const DEFAULT_INSTALL_SUBDIR: &str = "install";

/// Pre-fetched source archives, under the work directory
pub const DOWNLOADS_SUBDIR: &str = "downloads";

/// Extracted sources and stage build directories, under the work directory
pub const BUILD_SUBDIR: &str = "build";

/// Sysroot under the install prefix
pub const SYSROOT_SUBDIR: &str = "fakeroot";

/// Archive suffixes, probed in this order
pub const ARCHIVE_SUFFIXES: &[&str] = &[".tar.bz2", ".tar.xz", ".tar.gz"];

/// glibc releases in this range ship architecture ports as a separate archive
pub const GLIBC_PORTS_FIRST: Version = Version::new(2, 3, 5);
pub const GLIBC_PORTS_LAST: Version = Version::new(2, 16, 0);

/// Directory name of the ports overlay inside the glibc tree
pub const GLIBC_PORTS_DIR: &str = "ports";

/// Host tools the pipeline shells out to
pub const REQUIRED_TOOLS: &[&str] = &["tar", "make"];

/// Environment variables cleared for every build invocation
pub const SCRUBBED_ENV: &[&str] = &["C_INCLUDE_PATH", "CPLUS_INCLUDE_PATH"];
