//! Text rendering of a [`Protocol`] into the three C++ artifacts.
//!
//! Each renderer is a pure `&Protocol -> String`. All three walk the same
//! per-interface [`MethodSig`] list built by [`method_sigs`], so the
//! declaration, its implementation and the mock cannot disagree on a
//! signature.
pub mod declaration;
pub mod implementation;
pub mod test_double;

pub use declaration::render_declaration;
pub use implementation::render_implementation;
pub use test_double::render_test_double;

use crate::ir::{Interface, Param, Protocol, ReturnType, TypeDesc};
use crate::naming::{self, HELPER_METHODS};

pub const GENERATED_BANNER: &str = "// Generated by gen-shim. Do not edit.";

/// All rendered artifacts of one protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub declaration: String,
    pub implementation: String,
    pub test_double: String,
}

pub fn render_all(protocol: &Protocol) -> Rendered {
    Rendered {
        declaration: render_declaration(protocol),
        implementation: render_implementation(protocol),
        test_double: render_test_double(protocol),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// TYPE SPELLING
// ————————————————————————————————————————————————————————————————————————————

pub fn cpp_type(ty: &TypeDesc) -> String {
    match ty {
        TypeDesc::Int | TypeDesc::Fd => "int32_t".into(),
        TypeDesc::Uint => "uint32_t".into(),
        TypeDesc::Fixed => "wl_fixed_t".into(),
        TypeDesc::Str => "const char*".into(),
        TypeDesc::Array => "struct wl_array*".into(),
        TypeDesc::Object { interface: Some(iface) } => format!("struct {iface}*"),
        TypeDesc::Object { interface: None } => "void*".into(),
        TypeDesc::Resource => "struct wl_resource*".into(),
        TypeDesc::InterfaceDescriptor => "const struct wl_interface*".into(),
    }
}

pub fn cpp_return(ret: &ReturnType) -> String {
    match ret {
        ReturnType::Nothing => "void".into(),
        ReturnType::NewObject { interface } => format!("struct {interface}*"),
        ReturnType::NewDynamicObject => "void*".into(),
    }
}

// ————————————————————————————————————————————————————————————————————————————
// SIGNATURES
// ————————————————————————————————————————————————————————————————————————————

/// One virtual method on a shim class.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MethodSig {
    pub name: String,
    pub ret: String,
    /// `(type, name)`, receiver included
    pub params: Vec<(String, String)>,
    /// libwayland function the implementation forwards to
    pub forward_to: String,
    /// comment lines emitted above the declaration
    pub comment: Vec<String>,
}

impl MethodSig {
    pub fn returns_value(&self) -> bool {
        self.ret != "void"
    }

    pub fn param_list(&self) -> String {
        self.params
            .iter()
            .map(|(ty, name)| format!("{ty} {name}"))
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn arg_list(&self) -> String {
        self.params
            .iter()
            .map(|(_, name)| name.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// Methods of one shim class, in emission order: user-data helpers,
/// listener registration, `destroy`, requests, then event senders.
pub fn method_sigs(iface: &Interface) -> Vec<MethodSig> {
    let wire = iface.wire_name.as_str();
    let receiver = (format!("struct {wire}*"), wire.to_string());
    let helper = |name: &str, ret: &str, extra: Vec<(String, String)>| MethodSig {
        name: name.to_string(),
        ret: ret.to_string(),
        params: std::iter::once(receiver.clone()).chain(extra).collect(),
        forward_to: format!("{wire}_{name}"),
        comment: Vec::new(),
    };

    let [set_user_data, get_user_data, add_listener] = HELPER_METHODS;
    let mut sigs = vec![
        helper(set_user_data, "void", vec![("void*".into(), "user_data".into())]),
        helper(get_user_data, "void*", vec![]),
    ];
    if !iface.events.is_empty() {
        sigs.push(helper(
            add_listener,
            "int",
            vec![
                (format!("const struct {wire}_listener*"), "listener".into()),
                ("void*".into(), "data".into()),
            ],
        ));
    }
    if !iface.has_request("destroy") {
        sigs.push(helper("destroy", "void", vec![]));
    }

    for req in &iface.requests {
        sigs.push(MethodSig {
            name: req.name.clone(),
            ret: cpp_return(&req.ret),
            params: std::iter::once(receiver.clone())
                .chain(req.params.iter().map(typed))
                .collect(),
            forward_to: format!("{wire}_{}", req.name),
            comment: describe(req.summary.as_deref(), req.since, req.destructor, &req.params),
        });
    }
    for event in &iface.events {
        let name = naming::event_sender(&event.name);
        sigs.push(MethodSig {
            forward_to: format!("{wire}_{name}"),
            name,
            ret: "void".into(),
            params: std::iter::once((
                "struct wl_resource*".to_string(),
                naming::EVENT_RECEIVER.to_string(),
            ))
            .chain(event.params.iter().map(typed))
            .collect(),
            comment: describe(event.summary.as_deref(), event.since, false, &event.params),
        });
    }
    sigs
}

fn typed(param: &Param) -> (String, String) {
    (cpp_type(&param.ty), param.name.clone())
}

/// Message summary line, then one line per documented or nullable parameter.
fn describe(
    summary: Option<&str>,
    since: Option<u32>,
    destructor: bool,
    params: &[Param],
) -> Vec<String> {
    let mut parts = Vec::new();
    if let Some(s) = summary.filter(|s| !s.is_empty()) {
        parts.push(s.to_string());
    }
    if let Some(v) = since {
        parts.push(format!("since version {v}"));
    }
    if destructor {
        parts.push("destroys the receiver".to_string());
    }

    let mut lines = Vec::new();
    if !parts.is_empty() {
        lines.push(parts.join("; "));
    }
    for param in params {
        let summary = param.summary.as_deref().filter(|s| !s.is_empty());
        match (summary, param.nullable) {
            (Some(s), true) => lines.push(format!("{}: {s} (nullable)", param.name)),
            (Some(s), false) => lines.push(format!("{}: {s}", param.name)),
            (None, true) => lines.push(format!("{}: nullable", param.name)),
            (None, false) => {}
        }
    }
    lines
}

// ————————————————————————————————————————————————————————————————————————————
// WRITER
// ————————————————————————————————————————————————————————————————————————————

/// Line-oriented source buffer.
#[derive(Debug, Default)]
pub struct Codegen {
    out: String,
    indent: usize,
}

impl Codegen {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, text: impl AsRef<str>) {
        let text = text.as_ref();
        if !text.is_empty() {
            for _ in 0..self.indent {
                self.out.push_str("  ");
            }
            self.out.push_str(text);
        }
        self.out.push('\n');
    }

    pub fn blank(&mut self) {
        self.out.push('\n');
    }

    pub fn indent(&mut self) {
        self.indent += 1;
    }

    pub fn dedent(&mut self) {
        self.indent = self.indent.saturating_sub(1);
    }

    pub fn into_string(self) -> String {
        self.out
    }
}

// ------------------------------- Tests ------------------------------------ //
