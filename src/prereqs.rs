//! Preflight lookup of the external tool chain.

/// External programs every run invokes.
pub const REQUIRED_TOOLS: [&str; 4] = [
    "fastspar",
    "fastspar_bootstrap",
    "fastspar_pvalues",
    "parallel",
];

/// Tools not resolvable on `PATH`.
///
/// Absence is reported, not fatal: the affected stage fails on its own and
/// is handled like any other stage failure.
pub fn missing_tools() -> Vec<&'static str> {
    REQUIRED_TOOLS
        .into_iter()
        .filter(|tool| which::which(tool).is_err())
        .collect()
}
