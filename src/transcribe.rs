//! Schema tree → fully resolved [`Protocol`].
//!
//! One top-down pass. Request return types come from the single `new_id`
//! argument convention:
//! - `new_id` with an interface: the argument becomes the return value;
//! - `new_id` without one: replaced by `(interface, version)` params and the
//!   call returns an object of the caller's chosen type;
//! - no `new_id`: nothing is returned.
//!
//! Any defect aborts the whole protocol; there is no partial result. That
//! includes schema names that would collide with a generated helper method
//! or parameter in the rendered class.
use indexmap::map::Entry;
use indexmap::{IndexMap, IndexSet};
use tracing::debug;

use crate::error::{GenError, Location, MessageKind, Result};
use crate::ir::{Context, Event, Interface, Param, Protocol, Request, ReturnType, TypeDesc, WireType};
use crate::naming;
use crate::schema::{ArgNode, InterfaceNode, MessageNode, ProtocolTree};
use crate::types;

/// Transcribe a parsed schema. `stem` is the schema's file stem, which need
/// not match the `<protocol name>`.
pub fn transcribe(tree: &ProtocolTree, stem: &str) -> Result<Protocol> {
    let interfaces = tree
        .interfaces
        .iter()
        .map(transcribe_interface)
        .collect::<Result<Vec<_>>>()?;
    check_decl_names(&interfaces)?;
    Ok(Protocol {
        name_hyphen: stem.to_string(),
        name_underscore: naming::stem_underscore(stem),
        interfaces,
    })
}

pub fn transcribe_interface(node: &InterfaceNode) -> Result<Interface> {
    let decl_name = naming::decl_name(&node.name);
    if !naming::is_identifier(&decl_name) {
        return Err(GenError::InvalidIdentifier {
            wire_name: node.name.clone(),
            decl_name,
        });
    }
    let requests = node
        .requests
        .iter()
        .map(|r| transcribe_request(&node.name, r))
        .collect::<Result<Vec<_>>>()?;
    let events = node
        .events
        .iter()
        .map(|e| transcribe_event(&node.name, e))
        .collect::<Result<Vec<_>>>()?;
    check_request_names(node)?;
    debug!(
        interface = %node.name,
        %decl_name,
        requests = requests.len(),
        events = events.len(),
        "transcribed interface"
    );
    Ok(Interface {
        wire_name: node.name.clone(),
        decl_name,
        version: node.version,
        requests,
        events,
    })
}

pub fn transcribe_request(interface: &str, node: &MessageNode) -> Result<Request> {
    let location = location(interface, MessageKind::Request, node);
    let args = classify_args(&location, node)?;

    // cardinality first, so inference never depends on scan order
    let new_ids: Vec<&ArgNode> = args
        .iter()
        .filter(|(_, w)| *w == WireType::NewId)
        .map(|(a, _)| *a)
        .collect();
    if new_ids.len() > 1 {
        return Err(GenError::MultipleNewIds {
            location,
            args: new_ids.iter().map(|a| a.name.clone()).collect(),
        });
    }
    let ret = match new_ids.first().and_then(|a| concrete_interface(a)) {
        Some(iface) => ReturnType::NewObject { interface: iface.to_string() },
        None if new_ids.is_empty() => ReturnType::Nothing,
        None => ReturnType::NewDynamicObject,
    };

    let mut params = Vec::with_capacity(args.len() + 1);
    for (arg, wire) in args {
        if wire != WireType::NewId {
            params.push(param(arg, wire, Context::Call));
        } else if ret == ReturnType::NewDynamicObject {
            params.push(Param::new(DESCRIPTOR_PARAMS[0], TypeDesc::InterfaceDescriptor));
            params.push(Param::new(DESCRIPTOR_PARAMS[1], TypeDesc::Uint));
        }
    }
    let generated: &[&str] = match ret {
        ReturnType::NewDynamicObject => &DESCRIPTOR_PARAMS,
        _ => &[],
    };
    check_param_names(&location, interface, &params, generated)?;

    Ok(Request {
        name: node.name.clone(),
        params,
        ret,
        destructor: node.is_destructor(),
        since: node.since,
        summary: node.summary.clone(),
    })
}

pub fn transcribe_event(interface: &str, node: &MessageNode) -> Result<Event> {
    let location = location(interface, MessageKind::Event, node);
    let params: Vec<Param> = classify_args(&location, node)?
        .into_iter()
        .map(|(arg, wire)| param(arg, wire, Context::Notify))
        .collect();
    check_param_names(&location, naming::EVENT_RECEIVER, &params, &[])?;
    Ok(Event {
        name: node.name.clone(),
        params,
        since: node.since,
        summary: node.summary.clone(),
    })
}

/// Reject two interfaces sharing a declaration name.
pub fn check_decl_names(interfaces: &[Interface]) -> Result<()> {
    let mut seen: IndexMap<&str, &str> = IndexMap::with_capacity(interfaces.len());
    for iface in interfaces {
        match seen.entry(iface.decl_name.as_str()) {
            Entry::Occupied(first) => {
                return Err(GenError::DeclNameCollision {
                    decl_name: iface.decl_name.clone(),
                    first: first.get().to_string(),
                    second: iface.wire_name.clone(),
                });
            }
            Entry::Vacant(slot) => {
                slot.insert(iface.wire_name.as_str());
            }
        }
    }
    Ok(())
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

/// Stand-ins for an untyped `new_id`, in emission order.
const DESCRIPTOR_PARAMS: [&str; 2] = ["interface", "version"];

/// A request may not take the name of a method the renderer adds to the class.
fn check_request_names(node: &InterfaceNode) -> Result<()> {
    for request in &node.requests {
        let with = if naming::HELPER_METHODS.contains(&request.name.as_str()) {
            "a generated helper method"
        } else if node
            .events
            .iter()
            .any(|e| naming::event_sender(&e.name) == request.name)
        {
            "an event sender"
        } else {
            continue;
        };
        return Err(GenError::NameClash {
            location: location(&node.name, MessageKind::Request, request),
            name: request.name.clone(),
            with,
        });
    }
    Ok(())
}

/// Parameter names must be distinct from each other and from the receiver.
fn check_param_names(
    location: &Location,
    receiver: &str,
    params: &[Param],
    generated: &[&str],
) -> Result<()> {
    let mut seen = IndexSet::with_capacity(params.len());
    for p in params {
        let with = if p.name == receiver {
            "the receiver parameter"
        } else if seen.insert(p.name.as_str()) {
            continue;
        } else if generated.contains(&p.name.as_str()) {
            "a generated parameter"
        } else {
            "another parameter"
        };
        return Err(GenError::NameClash {
            location: location.clone(),
            name: p.name.clone(),
            with,
        });
    }
    Ok(())
}

fn param(arg: &ArgNode, wire: WireType, context: Context) -> Param {
    Param {
        name: arg.name.clone(),
        ty: types::map_type(wire, arg.interface.as_deref(), context),
        nullable: arg.allow_null,
        summary: arg.summary.clone(),
    }
}

fn location(interface: &str, kind: MessageKind, node: &MessageNode) -> Location {
    Location {
        interface: interface.to_string(),
        kind,
        message: node.name.clone(),
    }
}

fn classify_args<'a>(location: &Location, node: &'a MessageNode) -> Result<Vec<(&'a ArgNode, WireType)>> {
    node.args
        .iter()
        .map(|arg| match types::classify(&arg.ty) {
            Ok(wire) => Ok((arg, wire)),
            Err(unknown) => Err(GenError::UnsupportedWireType {
                location: location.clone(),
                arg: arg.name.clone(),
                wire_type: unknown.0,
            }),
        })
        .collect()
}

fn concrete_interface(arg: &ArgNode) -> Option<&str> {
    arg.interface.as_deref().filter(|i| !i.is_empty())
}

// ------------------------------- Tests ------------------------------------ //

#[cfg(test)]
mod tests {
    use super::*;

    fn arg(name: &str, ty: &str, interface: Option<&str>) -> ArgNode {
        ArgNode {
            name: name.into(),
            ty: ty.into(),
            interface: interface.map(Into::into),
            ..ArgNode::default()
        }
    }

    fn message(name: &str, args: Vec<ArgNode>) -> MessageNode {
        MessageNode {
            name: name.into(),
            args,
            ..MessageNode::default()
        }
    }

    fn interface(name: &str, requests: Vec<MessageNode>, events: Vec<MessageNode>) -> InterfaceNode {
        InterfaceNode {
            name: name.into(),
            version: 1,
            requests,
            events,
        }
    }

    #[test]
    fn request_without_new_id_returns_nothing() {
        let node = message(
            "set_destination",
            vec![arg("width", "int", None), arg("height", "int", None)],
        );
        let req = transcribe_request("wp_viewport", &node).unwrap();
        assert_eq!(req.ret, ReturnType::Nothing);
        assert_eq!(req.params.len(), node.args.len());
        assert_eq!(req.params[0], Param::new("width", TypeDesc::Int));
    }

    #[test]
    fn typed_new_id_becomes_the_return_value() {
        let node = message(
            "get_popup",
            vec![
                arg("id", "new_id", Some("xdg_popup")),
                arg("parent", "object", Some("xdg_surface")),
                arg("positioner", "object", Some("xdg_positioner")),
            ],
        );
        let req = transcribe_request("xdg_surface", &node).unwrap();
        assert_eq!(req.ret, ReturnType::NewObject { interface: "xdg_popup".into() });
        let names: Vec<_> = req.params.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["parent", "positioner"]);
        assert_eq!(
            req.params[1].ty,
            TypeDesc::Object { interface: Some("xdg_positioner".into()) }
        );
    }

    #[test]
    fn untyped_new_id_expands_in_place() {
        let node = message(
            "bind",
            vec![arg("name", "uint", None), arg("id", "new_id", None), arg("tail", "fd", None)],
        );
        let req = transcribe_request("wl_registry", &node).unwrap();
        assert_eq!(req.ret, ReturnType::NewDynamicObject);
        assert_eq!(
            req.params,
            vec![
                Param::new("name", TypeDesc::Uint),
                Param::new("interface", TypeDesc::InterfaceDescriptor),
                Param::new("version", TypeDesc::Uint),
                Param::new("tail", TypeDesc::Fd),
            ]
        );
        // one more than the non-new_id argument count
        assert_eq!(req.params.len(), (node.args.len() - 1) + 1 + 1);
    }

    #[test]
    fn empty_interface_attribute_counts_as_untyped() {
        let node = message("bind", vec![arg("id", "new_id", Some(""))]);
        let req = transcribe_request("wl_registry", &node).unwrap();
        assert_eq!(req.ret, ReturnType::NewDynamicObject);
        assert_eq!(req.params.len(), 2);
    }

    #[test]
    fn two_new_ids_are_rejected() {
        for (first, second) in [(Some("wl_a"), Some("wl_b")), (None, Some("wl_b")), (None, None)] {
            let node = message(
                "make_two",
                vec![arg("a", "new_id", first), arg("x", "int", None), arg("b", "new_id", second)],
            );
            let err = transcribe_request("wl_factory", &node).unwrap_err();
            match err {
                GenError::MultipleNewIds { location, args } => {
                    assert_eq!(location.interface, "wl_factory");
                    assert_eq!(location.message, "make_two");
                    assert_eq!(args, ["a", "b"]);
                }
                other => panic!("unexpected error: {other}"),
            }
        }
    }

    #[test]
    fn events_keep_every_argument_in_order() {
        let node = message(
            "enter",
            vec![
                arg("serial", "uint", None),
                arg("surface", "object", Some("wl_surface")),
                arg("id", "new_id", Some("wl_data_offer")),
                arg("keys", "array", None),
            ],
        );
        let event = transcribe_event("wl_keyboard", &node).unwrap();
        assert_eq!(
            event.params,
            vec![
                Param::new("serial", TypeDesc::Uint),
                Param::new("surface", TypeDesc::Resource),
                Param::new("id", TypeDesc::Resource),
                Param::new("keys", TypeDesc::Array),
            ]
        );
    }

    #[test]
    fn unknown_wire_type_names_its_location() {
        let node = message("frob", vec![arg("mode", "enum", None)]);
        let err = transcribe_request("wl_thing", &node).unwrap_err();
        assert_eq!(
            err.to_string(),
            "request `wl_thing.frob`: argument `mode` has unsupported wire type `enum`"
        );

        let err = transcribe_event("wl_thing", &node).unwrap_err();
        assert!(err.to_string().starts_with("event `wl_thing.frob`"));
    }

    #[test]
    fn protocol_carries_both_stem_forms() {
        let tree = ProtocolTree {
            name: "gtk".into(),
            interfaces: vec![interface("gtk_shell1", vec![], vec![])],
        };
        let protocol = transcribe(&tree, "gtk-shell").unwrap();
        assert_eq!(protocol.name_hyphen, "gtk-shell");
        assert_eq!(protocol.name_underscore, "gtk_shell");
        assert_eq!(protocol.interfaces[0].decl_name, "GtkShell1Shim");
    }

    #[test]
    fn colliding_decl_names_abort() {
        let tree = ProtocolTree {
            name: "p".into(),
            interfaces: vec![
                interface("foo_bar", vec![], vec![]),
                interface("wl_other", vec![], vec![]),
                interface("foo-bar", vec![], vec![]),
            ],
        };
        let err = transcribe(&tree, "p").unwrap_err();
        match err {
            GenError::DeclNameCollision { decl_name, first, second } => {
                assert_eq!(decl_name, "FooBarShim");
                assert_eq!(first, "foo_bar");
                assert_eq!(second, "foo-bar");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn bad_argument_anywhere_fails_the_protocol() {
        let tree = ProtocolTree {
            name: "p".into(),
            interfaces: vec![
                interface("wl_fine", vec![message("ok", vec![])], vec![]),
                interface("wl_broken", vec![], vec![message("ev", vec![arg("x", "double", None)])]),
            ],
        };
        assert!(matches!(
            transcribe(&tree, "p"),
            Err(GenError::UnsupportedWireType { .. })
        ));
    }

    #[test]
    fn argument_notes_carry_through() {
        let mut buffer = arg("buffer", "object", Some("wl_buffer"));
        buffer.allow_null = true;
        buffer.summary = Some("surface contents".into());
        let req = transcribe_request("wl_surface", &message("attach", vec![buffer])).unwrap();
        assert!(req.params[0].nullable);
        assert_eq!(req.params[0].summary.as_deref(), Some("surface contents"));
    }

    #[test]
    fn request_named_like_a_helper_is_rejected() {
        let node = interface("wl_thing", vec![message("set_user_data", vec![])], vec![]);
        let err = transcribe_interface(&node).unwrap_err();
        assert_eq!(
            err.to_string(),
            "request `wl_thing.set_user_data`: name `set_user_data` clashes with a generated helper method"
        );

        let node = interface(
            "wl_thing",
            vec![message("send_done", vec![])],
            vec![message("done", vec![])],
        );
        assert!(matches!(
            transcribe_interface(&node),
            Err(GenError::NameClash { with: "an event sender", .. })
        ));
    }

    #[test]
    fn real_argument_cannot_shadow_descriptor_params() {
        let node = message("bind", vec![arg("id", "new_id", None), arg("version", "uint", None)]);
        match transcribe_request("wl_registry", &node).unwrap_err() {
            GenError::NameClash { location, name, with } => {
                assert_eq!(location.message, "bind");
                assert_eq!(name, "version");
                assert_eq!(with, "a generated parameter");
            }
            other => panic!("unexpected error: {other}"),
        }

        // without an untyped new_id the name is free
        let node = message("set", vec![arg("version", "uint", None)]);
        assert!(transcribe_request("wl_registry", &node).is_ok());
    }

    #[test]
    fn receiver_names_are_reserved() {
        let node = message("ping", vec![arg("resource", "uint", None)]);
        assert!(matches!(
            transcribe_event("wl_thing", &node),
            Err(GenError::NameClash { with: "the receiver parameter", .. })
        ));
        // requests take the interface itself as receiver
        assert!(transcribe_request("wl_thing", &node).is_ok());
        let node = message("attach", vec![arg("wl_thing", "object", None)]);
        assert!(matches!(
            transcribe_request("wl_thing", &node),
            Err(GenError::NameClash { with: "the receiver parameter", .. })
        ));
    }

    #[test]
    fn invalid_decl_name_is_rejected() {
        let node = interface("wl.output", vec![], vec![]);
        assert!(matches!(
            transcribe_interface(&node),
            Err(GenError::InvalidIdentifier { .. })
        ));
    }
}
