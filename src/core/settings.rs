//! Build settings
//!
//! Reads the `[default]` table of a TOML config file into a
//! [`ConfigSection`], then turns it into the [`BuildConfig`] the rest of the
//! pipeline fills in: profile resolution adds the triple and versions,
//! source acquisition adds the extracted source trees.
//!
//! ```toml
//! [default]
//! path = "/work/aarch64"
//! prefix = "/opt/cross/aarch64"
//! target = "aarch64"
//! glibc = "2.17"
//! jobs = 8
//! ```

use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::defaults;
use crate::core::options::{self, BuildOptions};
use crate::core::profile::{self, ComponentVersions};
use crate::core::stage::Component;
use crate::error::{ConfigError, FilesystemError, ProfileError};
use crate::infra::filesystem;

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    default: RawSection,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawSection {
    binutils: Option<String>,
    gcc: Option<String>,
    glibc: Option<String>,
    linux: Option<String>,
    path: Option<String>,
    prefix: Option<String>,
    target: Option<String>,
    triple: Option<String>,
    fpu: Option<String>,
    floatabi: Option<String>,
    abi: Option<String>,
    cpu: Option<String>,
    arch: Option<String>,
    jobs: Option<JobsValue>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JobsValue {
    Count(i64),
    Text(String),
}

/// Optional compiler tuning passed to both gcc passes
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TargetTuning {
    pub abi: String,
    pub cpu: String,
    pub arch: String,
    pub fpu: String,
    pub float_abi: String,
}

impl TargetTuning {
    /// `--with-*` configure flags for the non-empty settings
    pub fn configure_flags(&self) -> Vec<String> {
        [
            ("abi", &self.abi),
            ("cpu", &self.cpu),
            ("arch", &self.arch),
            ("fpu", &self.fpu),
            ("float", &self.float_abi),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty())
        .map(|(key, value)| format!("--with-{key}={value}"))
        .collect()
    }
}

/// Values read from the config file; missing keys are empty
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigSection {
    pub versions: ComponentVersions,
    pub path: String,
    pub prefix: String,
    pub target: String,
    pub triple: String,
    pub tuning: TargetTuning,
    pub jobs: Option<i64>,
}

impl ConfigSection {
    /// Load the `[default]` table of a config file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
        Self::parse(&content, path)
    }

    /// Parse config file content; `origin` is used in error messages
    pub fn parse(content: &str, origin: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            path: origin.to_path_buf(),
            error: e.to_string(),
        })?;
        let raw = file.default;

        let jobs = match raw.jobs {
            None => None,
            Some(JobsValue::Count(n)) => Some(n),
            Some(JobsValue::Text(text)) => parse_jobs(&text)?,
        };

        Ok(Self {
            versions: ComponentVersions {
                binutils: raw.binutils.unwrap_or_default(),
                gcc: raw.gcc.unwrap_or_default(),
                glibc: raw.glibc.unwrap_or_default(),
                linux: raw.linux.unwrap_or_default(),
            },
            path: raw.path.unwrap_or_default(),
            prefix: raw.prefix.unwrap_or_default(),
            target: raw.target.unwrap_or_default(),
            triple: raw.triple.unwrap_or_default(),
            tuning: TargetTuning {
                abi: raw.abi.unwrap_or_default(),
                cpu: raw.cpu.unwrap_or_default(),
                arch: raw.arch.unwrap_or_default(),
                fpu: raw.fpu.unwrap_or_default(),
                float_abi: raw.floatabi.unwrap_or_default(),
            },
            jobs,
        })
    }
}

/// Parse a parallelism value written as `N` or `-jN`
pub fn parse_jobs(value: &str) -> Result<Option<i64>, ConfigError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    let digits = trimmed.strip_prefix("-j").unwrap_or(trimmed);
    digits
        .parse::<i64>()
        .map(Some)
        .map_err(|_| ConfigError::InvalidJobs {
            value: value.to_string(),
        })
}

/// Absolute paths of the extracted component sources
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SourceTrees {
    pub binutils: PathBuf,
    pub gcc: PathBuf,
    pub glibc: PathBuf,
    pub linux: PathBuf,
}

impl SourceTrees {
    /// Source tree of a component
    pub fn get(&self, component: Component) -> &Path {
        match component {
            Component::Binutils => &self.binutils,
            Component::Gcc => &self.gcc,
            Component::Glibc => &self.glibc,
            Component::Linux => &self.linux,
        }
    }

    /// Record the source tree of a component
    pub fn set(&mut self, component: Component, path: PathBuf) {
        match component {
            Component::Binutils => self.binutils = path,
            Component::Gcc => self.gcc = path,
            Component::Glibc => self.glibc = path,
            Component::Linux => self.linux = path,
        }
    }
}

/// Everything the pipeline needs to know about one toolchain build
///
/// Path fields are empty until the step that resolves them has run, and
/// absolute afterwards.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildConfig {
    /// Work directory holding `downloads/` and `build/`
    pub work_dir: PathBuf,
    /// Install prefix of the finished toolchain
    pub prefix: PathBuf,
    /// Built-in target name
    pub target: String,
    /// Triple from the config file that replaces the profile's
    pub triple_override: String,
    /// Target triple, set by profile resolution
    pub triple: String,
    /// Kernel `ARCH=` value, set by profile resolution
    pub kernel_arch: String,
    /// Requested, then resolved, component versions
    pub versions: ComponentVersions,
    /// Compiler tuning flags
    pub tuning: TargetTuning,
    /// Requested parallelism, before validation
    pub jobs: Option<i64>,
    /// Root holding extracted sources and stage build directories
    pub build_root: PathBuf,
    /// Extracted source trees
    pub sources: SourceTrees,
}

impl BuildConfig {
    /// Build the configuration from config-file values
    ///
    /// An empty `path` means the current directory, which must exist; an
    /// empty `prefix` means `<path>/install`.
    pub fn from_section(section: ConfigSection) -> Result<Self, ConfigError> {
        let path = if section.path.is_empty() {
            defaults::DEFAULT_WORK_DIR.to_string()
        } else {
            section.path
        };
        let path = PathBuf::from(path);
        if !path.is_dir() {
            return Err(ConfigError::MissingWorkDir { path });
        }
        let work_dir = filesystem::absolute(&path).map_err(|e| ConfigError::ReadError {
            path: path.clone(),
            error: e.to_string(),
        })?;

        let prefix = if section.prefix.is_empty() {
            work_dir.join(defaults::DEFAULT_INSTALL_SUBDIR)
        } else {
            filesystem::lexically_absolute(Path::new(&section.prefix)).map_err(|e| {
                ConfigError::ReadError {
                    path: PathBuf::from(&section.prefix),
                    error: e.to_string(),
                }
            })?
        };

        Ok(Self {
            work_dir,
            prefix,
            target: section.target,
            triple_override: section.triple,
            versions: section.versions,
            tuning: section.tuning,
            jobs: section.jobs,
            ..Self::default()
        })
    }

    /// Directory holding pre-fetched archives
    pub fn downloads_dir(&self) -> PathBuf {
        self.work_dir.join(defaults::DOWNLOADS_SUBDIR)
    }

    /// Directory that becomes the build root
    pub fn build_dir(&self) -> PathBuf {
        self.work_dir.join(defaults::BUILD_SUBDIR)
    }

    /// Resolve the built-in target, filling in triple, kernel arch and versions
    pub fn resolve_target(&mut self) -> Result<(), ProfileError> {
        let resolution = profile::resolve(&self.target, &self.versions)?;
        self.triple = if self.triple_override.is_empty() {
            resolution.profile.triple.to_string()
        } else {
            tracing::info!(
                "Using triple {} instead of {}",
                self.triple_override,
                resolution.profile.triple
            );
            self.triple_override.clone()
        };
        self.kernel_arch = resolution.profile.kernel_arch.to_string();
        self.versions = resolution.versions;
        Ok(())
    }

    /// Derive the downstream flag set
    ///
    /// `jobs` from the command line takes precedence over the config file
    /// unless it is not usable, in which case the config value is tried.
    pub fn compose_options(&self, jobs: Option<i64>, sysroot: bool) -> BuildOptions {
        let jobs = jobs.filter(|n| options::usable_jobs(*n)).or(self.jobs);
        options::compose(&self.triple, &self.prefix, jobs, sysroot)
            .with_tuning(self.tuning.configure_flags())
    }

    /// Make sure the prefix and, under sysroot, the fakeroot exist
    pub fn prepare_prefix(&self, options: &BuildOptions) -> Result<(), FilesystemError> {
        filesystem::create_dir_all(&self.prefix)?;
        filesystem::create_dir_all(&options.lib_root)
    }
}
