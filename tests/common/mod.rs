//! Common test utilities and helpers
//!
//! This module provides shared utilities for integration tests.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

use toolchainbot::core::settings::{BuildConfig, ConfigSection};
use toolchainbot::core::source::archive_stem;
use toolchainbot::infra::process::{CommandRunner, Invocation, ProcessExit};

/// Default component versions of the aarch64 targets
pub const ARCHIVES: &[&str] = &[
    "binutils-2.23.2.tar.bz2",
    "gcc-4.8.1.tar.bz2",
    "glibc-2.17.tar.xz",
    "linux-3.9.4.tar.xz",
];

/// Test project context
///
/// A temporary work directory with `downloads/` and an install prefix.
pub struct TestProject {
    /// Temporary directory for the test project
    pub dir: TempDir,
}

impl TestProject {
    /// Create a new test project in a temporary directory
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().expect("Failed to create temp directory"),
        }
    }

    /// Get the path to the test project directory
    pub fn path(&self) -> PathBuf {
        self.dir.path().to_path_buf()
    }

    /// Create a file in the test project
    pub fn create_file(&self, name: &str, content: &str) {
        let path = self.dir.path().join(name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directories");
        }
        std::fs::write(path, content).expect("Failed to write file");
    }

    /// Create a directory in the test project
    pub fn create_dir(&self, name: &str) {
        let path = self.dir.path().join(name);
        std::fs::create_dir_all(path).expect("Failed to create directory");
    }

    /// Check if a file exists in the test project
    pub fn file_exists(&self, name: &str) -> bool {
        self.dir.path().join(name).exists()
    }

    /// Place empty archives for the default aarch64 versions in `downloads/`
    pub fn with_default_archives(self) -> Self {
        for archive in ARCHIVES {
            self.create_file(&format!("downloads/{archive}"), "");
        }
        self
    }

    /// Install prefix inside the project
    pub fn prefix(&self) -> PathBuf {
        self.path().join("install")
    }

    /// Build configuration for the aarch64 target with profile resolution done
    pub fn aarch64_config(&self) -> BuildConfig {
        let section = ConfigSection {
            path: self.path().display().to_string(),
            prefix: self.prefix().display().to_string(),
            target: "aarch64".to_string(),
            ..Default::default()
        };
        let mut config = BuildConfig::from_section(section).expect("valid config");
        config.resolve_target().expect("aarch64 resolves");
        config
    }
}

impl Default for TestProject {
    fn default() -> Self {
        Self::new()
    }
}

type Predicate = Box<dyn Fn(&Invocation) -> bool>;

/// Exit status reported for invocations made to fail
pub const FAILURE_STATUS: i32 = 2;

/// [`CommandRunner`] that records invocations instead of spawning them
///
/// `tar xf <archive> -C <dir>` creates `<dir>/<archive stem>` so source
/// acquisition can run against empty archive files. Invocations selected
/// with [`RecordingRunner::failing_when`] exit with [`FAILURE_STATUS`].
#[derive(Default)]
pub struct RecordingRunner {
    calls: RefCell<Vec<Invocation>>,
    fail: Option<Predicate>,
}

impl RecordingRunner {
    /// Runner where every invocation succeeds
    pub fn new() -> Self {
        Self::default()
    }

    /// Fail every invocation of `program`
    #[must_use]
    pub fn failing_program(self, program: &'static str) -> Self {
        self.failing_when(move |inv| program_is(inv, program))
    }

    /// Fail invocations matching `predicate`
    #[must_use]
    pub fn failing_when(mut self, predicate: impl Fn(&Invocation) -> bool + 'static) -> Self {
        self.fail = Some(Box::new(predicate));
        self
    }

    /// Everything run so far
    pub fn invocations(&self) -> Vec<Invocation> {
        self.calls.borrow().clone()
    }

    /// Working directories of every `configure` run, in order
    pub fn configure_dirs(&self) -> Vec<PathBuf> {
        self.calls
            .borrow()
            .iter()
            .filter(|inv| program_is(inv, "configure"))
            .map(|inv| inv.cwd().to_path_buf())
            .collect()
    }

    /// Number of runs of `program`
    pub fn count_program(&self, program: &str) -> usize {
        self.calls
            .borrow()
            .iter()
            .filter(|inv| program_is(inv, program))
            .count()
    }
}

fn program_is(inv: &Invocation, program: &str) -> bool {
    inv.program() == program || inv.program().ends_with(&format!("/{program}"))
}

impl CommandRunner for RecordingRunner {
    fn run(&self, invocation: &Invocation) -> std::io::Result<ProcessExit> {
        self.calls.borrow_mut().push(invocation.clone());

        if self.fail.as_ref().is_some_and(|fail| fail(invocation)) {
            return Ok(ProcessExit::code(FAILURE_STATUS));
        }

        if program_is(invocation, "tar") {
            let args = invocation.get_args();
            if let (Some(archive), Some(dest)) = (args.get(1), args.get(3)) {
                std::fs::create_dir_all(Path::new(dest).join(archive_stem(Path::new(archive))))?;
            }
        }
        Ok(ProcessExit::success())
    }
}
