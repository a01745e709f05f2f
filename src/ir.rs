// Strongly-typed IR handed to the renderers. No schema strings left to classify here.
use std::str::FromStr;

use serde::Serialize;

/// The closed set of argument types a Wayland wire description may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WireType {
    Int,
    Uint,
    Fixed,
    Fd,
    String,
    Object,
    NewId,
    Array,
}

impl WireType {
    pub const ALL: [WireType; 8] = [
        WireType::Int,
        WireType::Uint,
        WireType::Fixed,
        WireType::Fd,
        WireType::String,
        WireType::Object,
        WireType::NewId,
        WireType::Array,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            WireType::Int => "int",
            WireType::Uint => "uint",
            WireType::Fixed => "fixed",
            WireType::Fd => "fd",
            WireType::String => "string",
            WireType::Object => "object",
            WireType::NewId => "new_id",
            WireType::Array => "array",
        }
    }
}

/// Raised for any type name outside [`WireType::ALL`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownWireType(pub String);

impl FromStr for WireType {
    type Err = UnknownWireType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WireType::ALL
            .into_iter()
            .find(|w| w.as_str() == s)
            .ok_or_else(|| UnknownWireType(s.to_string()))
    }
}

/// Which side of the wire an argument sits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Context {
    /// request argument, issued by the local caller
    Call,
    /// event argument, delivered to a local listener
    Notify,
}

/// Semantic type of one emitted parameter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TypeDesc {
    Int,
    Uint,
    Fixed,
    Fd,
    /// read-only, null-terminated
    Str,
    /// opaque byte array view
    Array,
    /// handle to a remote object; typed when the schema names its interface
    Object { interface: Option<String> },
    /// generic remote-object handle, interface erased
    Resource,
    /// descriptor of an interface chosen by the caller (synthetic)
    InterfaceDescriptor,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Param {
    pub name: String,
    pub ty: TypeDesc,
    /// `allow-null="true"` in the schema
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub nullable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

impl Param {
    /// Non-nullable parameter without a summary.
    pub fn new(name: impl Into<String>, ty: TypeDesc) -> Self {
        Param {
            name: name.into(),
            ty,
            nullable: false,
            summary: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReturnType {
    Nothing,
    /// owning handle to a new object of a statically known interface
    NewObject { interface: String },
    /// owning handle to a new object whose interface the caller passes in
    NewDynamicObject,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Request {
    pub name: String,
    pub params: Vec<Param>,
    pub ret: ReturnType,
    pub destructor: bool,
    pub since: Option<u32>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Event {
    pub name: String,
    pub params: Vec<Param>,
    pub since: Option<u32>,
    pub summary: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Interface {
    pub wire_name: String,
    pub decl_name: String,
    pub version: u32,
    pub requests: Vec<Request>,
    pub events: Vec<Event>,
}

impl Interface {
    pub fn has_request(&self, name: &str) -> bool {
        self.requests.iter().any(|r| r.name == name)
    }
}

/// One unit of generation; yields exactly one set of artifacts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Protocol {
    /// file stem as found on disk, e.g. `xdg-shell`
    pub name_hyphen: String,
    /// same stem, usable inside identifiers, e.g. `xdg_shell`
    pub name_underscore: String,
    pub interfaces: Vec<Interface>,
}
