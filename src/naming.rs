//! Identifier and file-name derivations shared by the transcriber and renderers.
use std::path::Path;

use once_cell::sync::Lazy;
use regex::Regex;

/// Suffix marking a generated wrapper type.
pub const SHIM_SUFFIX: &str = "Shim";

/// Methods every shim class may carry besides its requests.
pub const HELPER_METHODS: [&str; 3] = ["set_user_data", "get_user_data", "add_listener"];

/// Receiver parameter of every event sender.
pub const EVENT_RECEIVER: &str = "resource";

/// `configure` → `send_configure`.
pub fn event_sender(event: &str) -> String {
    format!("send_{event}")
}

static IDENT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("static identifier regex"));

/// `xdg_wm_base` → `XdgWmBaseShim`.
///
/// Segments split on `_` and `-`; each is capitalized with the rest
/// lower-cased, so `wl_EGL` and `wl_egl` land on the same name.
pub fn decl_name(wire_name: &str) -> String {
    let mut out = String::with_capacity(wire_name.len() + SHIM_SUFFIX.len());
    for segment in wire_name.split(['_', '-']).filter(|s| !s.is_empty()) {
        let mut chars = segment.chars();
        if let Some(first) = chars.next() {
            out.extend(first.to_uppercase());
            out.extend(chars.flat_map(char::to_lowercase));
        }
    }
    out.push_str(SHIM_SUFFIX);
    out
}

pub fn is_identifier(s: &str) -> bool {
    IDENT_RE.is_match(s)
}

/// Basename up to the first `.`: `protocols/xdg-shell.xml` → `xdg-shell`.
pub fn file_stem(path: &Path) -> Option<String> {
    let base = path.file_name()?.to_str()?;
    let stem = base.split('.').next().unwrap_or(base);
    if stem.is_empty() { None } else { Some(stem.to_string()) }
}

pub fn stem_underscore(stem: &str) -> String {
    stem.replace('-', "_")
}

/// `xdg-shell` → `XDG_SHELL_SHIM_H_`
pub fn header_guard(stem: &str, mock: bool) -> String {
    let body: String = stem
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
        .collect();
    if mock {
        format!("MOCK_{body}_SHIM_H_")
    } else {
        format!("{body}_SHIM_H_")
    }
}

pub fn shim_getter(wire_name: &str) -> String {
    format!("{wire_name}_shim")
}

pub fn shim_setter(wire_name: &str) -> String {
    format!("set_{wire_name}_shim")
}

pub fn mock_name(decl_name: &str) -> String {
    format!("Mock{decl_name}")
}

/// Output file names for one protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactNames {
    pub declaration: String,
    pub implementation: String,
    pub test_double: String,
    pub ir_dump: String,
}

impl ArtifactNames {
    pub fn for_stem(stem: &str) -> Self {
        Self {
            declaration: format!("{stem}-shim.h"),
            implementation: format!("{stem}-shim.cc"),
            test_double: format!("mock-{stem}-shim.h"),
            ir_dump: format!("{stem}-shim.json"),
        }
    }

    pub fn client_protocol_header(stem: &str) -> String {
        format!("{stem}-client-protocol.h")
    }

    pub fn server_protocol_header(stem: &str) -> String {
        format!("{stem}-server-protocol.h")
    }
}

// ------------------------------- Tests ------------------------------------ //
