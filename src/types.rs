//! Wire type → semantic parameter type.
//!
//! The table is exhaustive over [`WireType`]; a new wire type cannot be added
//! without deciding its mapping here. Unknown type *names* never get this far:
//! they fail in [`classify`].
use crate::ir::{Context, TypeDesc, UnknownWireType, WireType};

/// Parse a schema type name into the closed enumeration.
pub fn classify(type_name: &str) -> Result<WireType, UnknownWireType> {
    type_name.parse()
}

/// Map one argument type. `interface` is the schema's optional concrete
/// interface for `object`/`new_id` arguments.
///
/// In [`Context::Call`], `new_id` maps to its raw wire form (`uint`); request
/// return-type inference handles the object-creating case before this is
/// reached.
pub fn map_type(wire: WireType, interface: Option<&str>, context: Context) -> TypeDesc {
    match (wire, context) {
        (WireType::Int, _) => TypeDesc::Int,
        (WireType::Uint, _) => TypeDesc::Uint,
        (WireType::Fixed, _) => TypeDesc::Fixed,
        (WireType::Fd, _) => TypeDesc::Fd,
        (WireType::String, _) => TypeDesc::Str,
        (WireType::Array, _) => TypeDesc::Array,
        (WireType::NewId, Context::Call) => TypeDesc::Uint,
        (WireType::Object, Context::Call) => TypeDesc::Object {
            interface: interface.filter(|i| !i.is_empty()).map(str::to_string),
        },
        (WireType::Object | WireType::NewId, Context::Notify) => TypeDesc::Resource,
    }
}

// ------------------------------- Tests ------------------------------------ //
