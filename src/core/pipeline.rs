//! Stage pipeline
//!
//! Runs the five toolchain stages in their fixed order. Each stage that is
//! not skipped gets a fresh `build-<stage>` directory (kernel headers build
//! in the kernel tree instead), then configure, make and install run as
//! external processes. The first non-zero exit aborts the whole run.
//!
//! When a sysroot is used, library paths are normalized between the glibc
//! stage and gcc pass 2. This step is not skippable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::lib_path;
use crate::core::options::BuildOptions;
use crate::core::settings::BuildConfig;
use crate::core::stage::{Component, SkipSet, Stage};
use crate::error::{ConfigError, StageError, ToolchainError};
use crate::infra::filesystem;
use crate::infra::process::{run_checked, CommandRunner, Invocation};

const GCC_PASS1_FLAGS: &[&str] = &[
    "--enable-languages=c",
    "--disable-shared",
    "--disable-nls",
    "--disable-threads",
    "--disable-libssp",
    "--without-headers",
    "--disable-decimal-float",
    "--disable-libgomp",
    "--disable-libmudflap",
    "--disable-multilib",
    "--with-gnu-ld",
    "--with-gnu-as",
    "--with-newlib",
];

const GCC_PASS2_FLAGS: &[&str] = &[
    "--enable-languages=c,c++",
    "--enable-shared",
    "--disable-nls",
    "--enable-c99",
    "--enable-long-long",
    "--disable-multilib",
];

/// One named step of a stage
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Step {
    /// Reported in `StageFailed` when the step fails
    pub name: &'static str,
    pub invocation: Invocation,
}

/// What a stage will do
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagePlan {
    pub stage: Stage,
    /// Directory every step runs in
    pub work_dir: PathBuf,
    /// Whether `work_dir` is wiped and recreated first
    pub fresh_dir: bool,
    pub steps: Vec<Step>,
}

/// Outcome of a successful run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub executed: Vec<Stage>,
    pub skipped: Vec<Stage>,
    pub normalized: bool,
}

/// The five-stage toolchain build
pub struct Pipeline<'a> {
    config: &'a BuildConfig,
    options: &'a BuildOptions,
    runner: &'a dyn CommandRunner,
    search_path: OsString,
}

impl<'a> Pipeline<'a> {
    /// Create a pipeline over acquired sources
    ///
    /// Fails when `<prefix>/bin` cannot be joined into a PATH value.
    pub fn new(
        config: &'a BuildConfig,
        options: &'a BuildOptions,
        runner: &'a dyn CommandRunner,
    ) -> Result<Self, ConfigError> {
        let bin = config.prefix.join("bin");
        let mut paths = vec![bin.clone()];
        if let Some(existing) = std::env::var_os("PATH") {
            paths.extend(std::env::split_paths(&existing));
        }
        let search_path =
            std::env::join_paths(paths).map_err(|e| ConfigError::InvalidSearchPath {
                path: bin,
                error: e.to_string(),
            })?;
        Ok(Self {
            config,
            options,
            runner,
            search_path,
        })
    }

    /// Run every stage not in `skip`
    pub fn run(&self, skip: &SkipSet) -> Result<PipelineSummary, ToolchainError> {
        self.config.prepare_prefix(self.options)?;

        if skip.is_all() {
            tracing::info!("All stages skipped");
        }

        let mut summary = PipelineSummary::default();
        for stage in Stage::ALL {
            if stage == Stage::Gcc2 && self.options.sysroot_enabled {
                lib_path::normalize(&self.config.prefix, &self.config.triple)?;
                summary.normalized = true;
            }

            if skip.contains(stage) {
                tracing::info!("Skipping {}", stage.description());
                summary.skipped.push(stage);
                continue;
            }

            self.run_stage(stage)?;
            summary.executed.push(stage);
        }
        Ok(summary)
    }

    /// Execute one stage
    pub fn run_stage(&self, stage: Stage) -> Result<(), StageError> {
        let plan = self.plan(stage);
        let stage = plan.stage;
        tracing::info!("Building {}", stage.description());

        if plan.fresh_dir {
            filesystem::recreate_dir(&plan.work_dir)
                .map_err(|source| StageError::Workspace { stage, source })?;
        }

        for step in &plan.steps {
            run_checked(self.runner, &step.invocation).map_err(|error| {
                StageError::StageFailed {
                    stage,
                    step: step.name.to_string(),
                    error,
                }
            })?;
        }

        tracing::info!("Finished {}", stage.description());
        Ok(())
    }

    /// Describe a stage without running anything
    pub fn plan(&self, stage: Stage) -> StagePlan {
        match stage {
            Stage::Binutils => self.binutils(),
            Stage::Gcc1 => self.gcc_pass1(),
            Stage::Header => self.kernel_headers(),
            Stage::Glibc => self.glibc(),
            Stage::Gcc2 => self.gcc_pass2(),
        }
    }

    fn binutils(&self) -> StagePlan {
        let opts = self.options;
        let dir = self.stage_dir(Stage::Binutils);
        let configure = self
            .configure(Stage::Binutils, Component::Binutils, &dir)
            .args([opts.target.as_str(), opts.prefix.as_str(), opts.sysroot.as_str()]);
        fresh_plan(
            Stage::Binutils,
            dir.clone(),
            vec![
                step("configure", configure),
                step("make", self.make(Stage::Binutils, &dir).arg(&opts.jobs)),
                step("install", self.make(Stage::Binutils, &dir).arg("install")),
            ],
        )
    }

    fn gcc_pass1(&self) -> StagePlan {
        let opts = self.options;
        let dir = self.stage_dir(Stage::Gcc1);
        let configure = self
            .configure(Stage::Gcc1, Component::Gcc, &dir)
            .args([opts.target.as_str(), opts.prefix.as_str(), opts.sysroot.as_str()])
            .args(GCC_PASS1_FLAGS.iter().copied())
            .args(opts.tuning.iter().cloned());
        let make = self
            .make(Stage::Gcc1, &dir)
            .args(["all-gcc", "all-target-libgcc", opts.jobs.as_str()]);
        let install = self
            .make(Stage::Gcc1, &dir)
            .args(["install-gcc", "install-target-libgcc"]);
        fresh_plan(
            Stage::Gcc1,
            dir,
            vec![
                step("configure", configure),
                step("make", make),
                step("install", install),
            ],
        )
    }

    fn kernel_headers(&self) -> StagePlan {
        let src = self.config.sources.get(Component::Linux).to_path_buf();
        let arch = format!("ARCH={}", self.config.kernel_arch);
        let hdr_path = format!(
            "INSTALL_HDR_PATH={}",
            self.options.header_root().display()
        );
        StagePlan {
            stage: Stage::Header,
            work_dir: src.clone(),
            fresh_dir: false,
            steps: vec![
                step("mrproper", self.make(Stage::Header, &src).arg("mrproper")),
                step(
                    "headers_check",
                    self.make(Stage::Header, &src)
                        .args([arch.as_str(), "headers_check"]),
                ),
                step(
                    "headers_install",
                    self.make(Stage::Header, &src)
                        .args([arch.as_str(), hdr_path.as_str(), "headers_install"]),
                ),
            ],
        }
    }

    fn glibc(&self) -> StagePlan {
        let opts = self.options;
        let dir = self.stage_dir(Stage::Glibc);
        let headers = format!("--with-headers={}", opts.header_dir().display());
        let binutils = format!(
            "--with-binutils={}",
            self.config.prefix.join("bin").display()
        );
        let configure = self
            .configure(Stage::Glibc, Component::Glibc, &dir)
            .args([
                opts.host.as_str(),
                opts.lib_prefix.as_str(),
                "--enable-add-ons",
                headers.as_str(),
                binutils.as_str(),
            ]);
        let install = self
            .make(Stage::Glibc, &dir)
            .arg("install")
            .args(opts.lib_install_root());
        fresh_plan(
            Stage::Glibc,
            dir.clone(),
            vec![
                step("configure", configure),
                step("make", self.make(Stage::Glibc, &dir).arg(&opts.jobs)),
                step("install", install),
            ],
        )
    }

    fn gcc_pass2(&self) -> StagePlan {
        let opts = self.options;
        let dir = self.stage_dir(Stage::Gcc2);
        let configure = self
            .configure(Stage::Gcc2, Component::Gcc, &dir)
            .args([opts.target.as_str(), opts.prefix.as_str(), opts.sysroot.as_str()])
            .args(GCC_PASS2_FLAGS.iter().copied())
            .args(opts.tuning.iter().cloned());
        fresh_plan(
            Stage::Gcc2,
            dir.clone(),
            vec![
                step("configure", configure),
                step("make", self.make(Stage::Gcc2, &dir).arg(&opts.jobs)),
                step("install", self.make(Stage::Gcc2, &dir).arg("install")),
            ],
        )
    }

    fn stage_dir(&self, stage: Stage) -> PathBuf {
        self.config.build_root.join(stage.build_dir_name())
    }

    fn configure(&self, stage: Stage, component: Component, dir: &Path) -> Invocation {
        let script = self.config.sources.get(component).join("configure");
        self.invocation(stage, script.display().to_string(), dir)
    }

    fn make(&self, stage: Stage, dir: &Path) -> Invocation {
        self.invocation(stage, "make".to_string(), dir)
    }

    /// Base invocation with the build environment applied
    ///
    /// Stages after binutils find the freshly installed tools first on PATH.
    fn invocation(&self, stage: Stage, program: String, dir: &Path) -> Invocation {
        let mut inv = Invocation::new(program, dir);
        for key in defaults::SCRUBBED_ENV {
            inv = inv.env_remove(*key);
        }
        if stage != Stage::Binutils {
            inv = inv.env("PATH", &self.search_path);
        }
        inv
    }
}

fn step(name: &'static str, invocation: Invocation) -> Step {
    Step { name, invocation }
}

fn fresh_plan(stage: Stage, work_dir: PathBuf, steps: Vec<Step>) -> StagePlan {
    StagePlan {
        stage,
        work_dir,
        fresh_dir: true,
        steps,
    }
}
