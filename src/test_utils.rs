//! Test utilities
//!
//! The integration tests carry the same runner in `tests/common`.

use std::cell::RefCell;
use std::path::{Path, PathBuf};

use crate::core::source::archive_stem;
use crate::infra::process::{CommandRunner, Invocation, ProcessExit};

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
