//! Error types for schema ingestion and shim generation.
use std::fmt;
use std::path::PathBuf;

/// Where in the schema a defect sits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Location {
    pub interface: String,
    pub kind: MessageKind,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Request,
    Event,
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self.kind {
            MessageKind::Request => "request",
            MessageKind::Event => "event",
        };
        write!(f, "{kind} `{}.{}`", self.interface, self.message)
    }
}

/// Generation failures. Every variant aborts the whole protocol.
#[derive(thiserror::Error, Debug)]
pub enum GenError {
    #[error("{location}: argument `{arg}` has unsupported wire type `{wire_type}`")]
    UnsupportedWireType {
        location: Location,
        arg: String,
        wire_type: String,
    },

    #[error("{location}: {} new_id arguments ({}), at most one is allowed", .args.len(), .args.join(", "))]
    MultipleNewIds { location: Location, args: Vec<String> },

    #[error("interfaces `{first}` and `{second}` both map to type name `{decl_name}`")]
    DeclNameCollision {
        decl_name: String,
        first: String,
        second: String,
    },

    #[error("{location}: name `{name}` clashes with {with}")]
    NameClash {
        location: Location,
        name: String,
        with: &'static str,
    },

    #[error("interface `{wire_name}` maps to `{decl_name}`, which is not a valid identifier")]
    InvalidIdentifier { wire_name: String, decl_name: String },

    #[error("cannot derive a file stem from `{}`", .0.display())]
    NoFileStem(PathBuf),

    #[error("schema {}: {source}", .path.display())]
    Schema {
        path: PathBuf,
        #[source]
        source: SchemaError,
    },

    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Schema ingestion errors.
#[derive(thiserror::Error, Debug)]
pub enum SchemaError {
    #[error("malformed XML: {0}")]
    Xml(#[from] roxmltree::Error),

    #[error("{0}")]
    Json(String),

    #[error("root element is <{0}>, expected <protocol>")]
    UnexpectedRoot(String),

    #[error("<{element}> is missing required attribute `{attribute}`")]
    MissingAttribute {
        element: String,
        attribute: &'static str,
    },

    #[error("<{element}> attribute `{attribute}` has invalid value `{value}`")]
    BadAttribute {
        element: String,
        attribute: &'static str,
        value: String,
    },
}

pub type Result<T, E = GenError> = std::result::Result<T, E>;
