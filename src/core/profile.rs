//! Built-in target profiles
//!
//! A profile fixes the target triple, the kernel `ARCH` name, and for each
//! component a minimum acceptable version plus the default used when the
//! user does not ask for one. The catalog is compiled in and never mutated.

use crate::core::stage::Component;
use crate::core::version::meets_minimum;
use crate::error::ProfileError;

/// One version string per component
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionTable {
    pub binutils: &'static str,
    pub gcc: &'static str,
    pub glibc: &'static str,
    pub linux: &'static str,
}

impl VersionTable {
    /// Version for a component
    pub fn get(&self, component: Component) -> &'static str {
        match component {
            Component::Binutils => self.binutils,
            Component::Gcc => self.gcc,
            Component::Glibc => self.glibc,
            Component::Linux => self.linux,
        }
    }
}

/// Construction parameters for one built-in target
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildProfile {
    /// Name used with `--builtin` and the `target` config key
    pub name: &'static str,
    /// GNU target triple
    pub triple: &'static str,
    /// Kernel `ARCH=` value for header installation
    pub kernel_arch: &'static str,
    /// Oldest usable version of each component
    pub minimum: VersionTable,
    /// Version used when none is requested
    pub defaults: VersionTable,
}

const AARCH64_MINIMUM: VersionTable = VersionTable {
    binutils: "2.23",
    gcc: "4.8.0",
    glibc: "2.17",
    linux: "3.7.0",
};

const AARCH64_DEFAULTS: VersionTable = VersionTable {
    binutils: "2.23.2",
    gcc: "4.8.1",
    glibc: "2.17",
    linux: "3.9.4",
};

/// The built-in catalog
pub static BUILTIN_TARGETS: &[BuildProfile] = &[
    BuildProfile {
        name: "aarch64",
        triple: "aarch64-linux-gnu",
        kernel_arch: "arm64",
        minimum: AARCH64_MINIMUM,
        defaults: AARCH64_DEFAULTS,
    },
    BuildProfile {
        name: "aarch64eb",
        triple: "aarch64_be-linux-gnu",
        kernel_arch: "arm64",
        minimum: AARCH64_MINIMUM,
        defaults: AARCH64_DEFAULTS,
    },
];

/// Look up a built-in target by name
pub fn find(name: &str) -> Option<&'static BuildProfile> {
    BUILTIN_TARGETS.iter().find(|p| p.name == name)
}

/// Names of every built-in target
pub fn names() -> Vec<String> {
    BUILTIN_TARGETS.iter().map(|p| p.name.to_string()).collect()
}

/// Requested or resolved version per component
///
/// An empty string means "not specified".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ComponentVersions {
    pub binutils: String,
    pub gcc: String,
    pub glibc: String,
    pub linux: String,
}

impl ComponentVersions {
    /// Version for a component
    pub fn get(&self, component: Component) -> &str {
        match component {
            Component::Binutils => &self.binutils,
            Component::Gcc => &self.gcc,
            Component::Glibc => &self.glibc,
            Component::Linux => &self.linux,
        }
    }

    fn slot(&mut self, component: Component) -> &mut String {
        match component {
            Component::Binutils => &mut self.binutils,
            Component::Gcc => &mut self.gcc,
            Component::Glibc => &mut self.glibc,
            Component::Linux => &mut self.linux,
        }
    }

    /// Set the version for a component
    pub fn set(&mut self, component: Component, version: impl Into<String>) {
        *self.slot(component) = version.into();
    }
}

/// A profile together with the versions chosen for it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resolution {
    pub profile: &'static BuildProfile,
    pub versions: ComponentVersions,
}

/// Resolve a built-in target and fill in or check component versions
///
/// Empty requested versions take the profile default; explicit ones must
/// meet the profile minimum.
pub fn resolve(target: &str, requested: &ComponentVersions) -> Result<Resolution, ProfileError> {
    let profile = find(target).ok_or_else(|| ProfileError::UnknownTarget {
        name: target.to_string(),
        supported: names(),
    })?;

    let mut versions = requested.clone();
    for component in Component::ALL {
        let wanted = requested.get(component);
        if wanted.is_empty() {
            versions.set(component, profile.defaults.get(component));
            continue;
        }

        let minimum = profile.minimum.get(component);
        let ok = meets_minimum(minimum, wanted)
            .map_err(|source| ProfileError::Version { component, source })?;
        if !ok {
            return Err(ProfileError::UnsupportedComponentVersion {
                component,
                requested: wanted.to_string(),
                minimum: minimum.to_string(),
            });
        }
    }

    tracing::debug!(
        "Resolved target {} ({}): {:?}",
        profile.name,
        profile.triple,
        versions
    );
    Ok(Resolution { profile, versions })
}
