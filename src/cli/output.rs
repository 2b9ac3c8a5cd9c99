//! Output formatting
//!
//! Status prefixes and the text printed for built-in listings, build
//! summaries and fatal errors.

use crate::core::pipeline::PipelineSummary;
use crate::core::profile::BUILTIN_TARGETS;
use crate::core::stage::Component;
use crate::error::ToolchainError;

/// Status message prefixes
pub mod status {
    /// Success prefix (green checkmark)
    pub const SUCCESS: &str = "✓";

    /// Error prefix (red X)
    pub const ERROR: &str = "✗";

    /// Skipped prefix
    pub const SKIPPED: &str = "-";

    /// Info prefix (blue circle)
    pub const INFO: &str = "ℹ";
}

/// Print a fatal error to stderr
pub fn display_error(err: &ToolchainError) {
    eprintln!("{} {err}", status::ERROR);
}

/// One block per built-in target: name, triple, kernel arch and versions
pub fn format_builtins() -> String {
    let mut out = String::from("Built-in targets:");
    for profile in BUILTIN_TARGETS {
        out.push_str(&format!(
            "\n  {} ({}, ARCH={})",
            profile.name, profile.triple, profile.kernel_arch
        ));
        for component in Component::ALL {
            out.push_str(&format!(
                "\n    {:<10} {} (minimum {})",
                component.name(),
                profile.defaults.get(component),
                profile.minimum.get(component)
            ));
        }
    }
    out
}

/// Stage-by-stage result of a finished build
pub fn format_summary(summary: &PipelineSummary) -> String {
    let mut lines = Vec::new();
    for stage in &summary.executed {
        lines.push(format!("{} {}", status::SUCCESS, stage.description()));
    }
    for stage in &summary.skipped {
        lines.push(format!("{} {} (skipped)", status::SKIPPED, stage.description()));
    }
    if summary.normalized {
        lines.push(format!("{} library paths normalized", status::INFO));
    }
    lines.join("\n")
}
