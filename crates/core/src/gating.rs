//! Scan gating policy
//!
//! Decides *whether* a refresh may walk the filesystem at all, independent of
//! how the walk is configured.

/// Host conditions and policy toggles that gate a scan
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GateInput {
    /// The host has a primary folder context (e.g. an opened folder)
    pub has_primary_context: bool,
    /// A marker file is currently the active host context
    pub has_marker_context: bool,
    /// Policy: scan even without a primary context
    pub allow_without_primary_context: bool,
    /// Policy: scan while a marker file is the active context
    pub allow_with_marker_context: bool,
}

/// Decide whether scanning is allowed
pub fn should_scan(input: GateInput) -> bool {
    let allow_empty = input.allow_without_primary_context || input.has_primary_context;
    let allow_with_marker = !input.has_marker_context || input.allow_with_marker_context;
    allow_empty && allow_with_marker
}
