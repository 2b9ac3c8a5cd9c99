//! Toolchain components, build stages and the skip list
//!
//! The pipeline is fixed: binutils, gcc pass 1, kernel headers, glibc,
//! gcc pass 2. Stage identifiers double as the `--skip` vocabulary.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

/// A source component of the toolchain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Component {
    /// Assembler, linker and archiver
    Binutils,
    /// The compiler (built in two passes)
    Gcc,
    /// The C library
    Glibc,
    /// Kernel source, used for headers only
    Linux,
}

impl Component {
    /// All components in acquisition order
    pub const ALL: [Component; 4] = [
        Component::Binutils,
        Component::Gcc,
        Component::Glibc,
        Component::Linux,
    ];

    /// Archive base name and configuration key
    pub fn name(self) -> &'static str {
        match self {
            Component::Binutils => "binutils",
            Component::Gcc => "gcc",
            Component::Glibc => "glibc",
            Component::Linux => "linux",
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A build stage of the pipeline
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stage {
    /// Build and install binutils
    Binutils,
    /// Minimal C-only compiler, enough to build the C library
    Gcc1,
    /// Install kernel headers
    Header,
    /// Build and install the C library
    Glibc,
    /// Full C/C++ compiler against the installed C library
    Gcc2,
}

impl Stage {
    /// All stages in execution order
    pub const ALL: [Stage; 5] = [
        Stage::Binutils,
        Stage::Gcc1,
        Stage::Header,
        Stage::Glibc,
        Stage::Gcc2,
    ];

    /// Identifier used by `--skip` and in build directory names
    pub fn id(self) -> &'static str {
        match self {
            Stage::Binutils => "binutils",
            Stage::Gcc1 => "gcc1",
            Stage::Header => "header",
            Stage::Glibc => "glibc",
            Stage::Gcc2 => "gcc2",
        }
    }

    /// Human-readable stage description
    pub fn description(self) -> &'static str {
        match self {
            Stage::Binutils => "binutils",
            Stage::Gcc1 => "gcc pass 1",
            Stage::Header => "kernel headers",
            Stage::Glibc => "glibc",
            Stage::Gcc2 => "gcc pass 2",
        }
    }

    /// Transient build directory name under the build root
    pub fn build_dir_name(self) -> String {
        format!("build-{}", self.id())
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for Stage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Stage::ALL
            .into_iter()
            .find(|stage| stage.id() == s)
            .ok_or_else(|| format!("unknown stage '{s}'"))
    }
}

/// Stages the user asked to skip
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipSet {
    all: bool,
    stages: BTreeSet<Stage>,
}

impl SkipSet {
    /// Sentinel that skips every stage
    pub const ALL: &'static str = "all";

    /// Build a skip set from `--skip` values
    ///
    /// Unknown names are reported and ignored.
    pub fn from_names<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut set = Self::default();
        for name in names {
            let name = name.as_ref();
            if name == Self::ALL {
                set.all = true;
                continue;
            }
            match name.parse::<Stage>() {
                Ok(stage) => {
                    set.stages.insert(stage);
                }
                Err(e) => tracing::warn!("Ignoring --skip value: {e}"),
            }
        }
        set
    }

    /// Whether `stage` should be skipped
    pub fn contains(&self, stage: Stage) -> bool {
        self.all || self.stages.contains(&stage)
    }

    /// Whether every stage is skipped
    pub fn is_all(&self) -> bool {
        self.all
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stage_ids_parse_back() {
        for stage in Stage::ALL {
            assert_eq!(stage.id().parse::<Stage>().unwrap(), stage);
        }
        assert!("gcc3".parse::<Stage>().is_err());
    }

    #[test]
    fn test_build_dir_name() {
        assert_eq!(Stage::Gcc1.build_dir_name(), "build-gcc1");
    }

    #[test]
    fn test_skip_set_single_stage() {
        let skip = SkipSet::from_names(["gcc1"]);
        assert!(skip.contains(Stage::Gcc1));
        assert!(!skip.contains(Stage::Gcc2));
        assert!(!skip.is_all());
    }

    #[test]
    fn test_skip_set_all() {
        let skip = SkipSet::from_names(["all"]);
        assert!(Stage::ALL.into_iter().all(|s| skip.contains(s)));
    }

    #[test]
    fn test_skip_set_ignores_unknown() {
        let skip = SkipSet::from_names(["kernel", "header"]);
        assert!(skip.contains(Stage::Header));
        assert_eq!(
            Stage::ALL.into_iter().filter(|s| skip.contains(*s)).count(),
            1
        );
    }

    #[test]
    fn test_component_order() {
        let names: Vec<&str> = Component::ALL.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["binutils", "gcc", "glibc", "linux"]);
    }
}
