use crate::ir::{Interface, Protocol};
use crate::naming::{self, ArtifactNames};

use super::{Codegen, GENERATED_BANNER, method_sigs};

/// `<stem>-shim.cc`: forwarding bodies and the per-interface instance slot.
pub fn render_implementation(protocol: &Protocol) -> String {
    let names = ArtifactNames::for_stem(&protocol.name_hyphen);
    let mut cg = Codegen::new();

    cg.line(GENERATED_BANNER);
    cg.blank();
    cg.line(format!(
        "#include \"{}\"  // NOLINT(build/include_directory)",
        names.declaration
    ));

    for iface in &protocol.interfaces {
        emit_bodies(&mut cg, iface);
        emit_instance(&mut cg, iface);
    }
    cg.into_string()
}

fn emit_bodies(cg: &mut Codegen, iface: &Interface) {
    for sig in method_sigs(iface) {
        cg.blank();
        cg.line(format!(
            "{} {}::{}({}) {{",
            sig.ret,
            iface.decl_name,
            sig.name,
            sig.param_list()
        ));
        cg.indent();
        let call = format!("{}({});", sig.forward_to, sig.arg_list());
        if sig.returns_value() {
            cg.line(format!("return {call}"));
        } else {
            cg.line(call);
        }
        cg.dedent();
        cg.line("}");
    }
}

fn emit_instance(cg: &mut Codegen, iface: &Interface) {
    let class = iface.decl_name.as_str();
    let slot = format!("{}_singleton", iface.wire_name);

    cg.blank();
    cg.line(format!("static {class}* {slot} = nullptr;"));
    cg.blank();
    cg.line(format!("{class}* {}() {{", naming::shim_getter(&iface.wire_name)));
    cg.indent();
    cg.line(format!("if ({slot} == nullptr) {{"));
    cg.indent();
    cg.line(format!("{slot} = new {class}();"));
    cg.dedent();
    cg.line("}");
    cg.line(format!("return {slot};"));
    cg.dedent();
    cg.line("}");
    cg.blank();
    cg.line(format!(
        "void {}({class}* shim) {{",
        naming::shim_setter(&iface.wire_name)
    ));
    cg.indent();
    cg.line(format!("{slot} = shim;"));
    cg.dedent();
    cg.line("}");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::{Param, Request, ReturnType, TypeDesc};

    fn registry() -> Protocol {
        Protocol {
            name_hyphen: "wayland".into(),
            name_underscore: "wayland".into(),
            interfaces: vec![Interface {
                wire_name: "wl_registry".into(),
                decl_name: "WlRegistryShim".into(),
                version: 1,
                requests: vec![Request {
                    name: "bind".into(),
                    params: vec![
                        Param::new("name", TypeDesc::Uint),
                        Param::new("interface", TypeDesc::InterfaceDescriptor),
                        Param::new("version", TypeDesc::Uint),
                    ],
                    ret: ReturnType::NewDynamicObject,
                    destructor: false,
                    since: None,
                    summary: None,
                }],
                events: vec![],
            }],
        }
    }

    #[test]
    fn value_returning_requests_forward_with_return() {
        let src = render_implementation(&registry());
        assert!(src.contains("#include \"wayland-shim.h\""));
        assert!(src.contains(
            "void* WlRegistryShim::bind(struct wl_registry* wl_registry, uint32_t name, const struct wl_interface* interface, uint32_t version) {\n  return wl_registry_bind(wl_registry, name, interface, version);\n}\n"
        ));
        assert!(src.contains(
            "void WlRegistryShim::destroy(struct wl_registry* wl_registry) {\n  wl_registry_destroy(wl_registry);\n}\n"
        ));
    }

    #[test]
    fn instance_slot_is_lazy_and_overridable() {
        let src = render_implementation(&registry());
        assert!(src.contains("static WlRegistryShim* wl_registry_singleton = nullptr;"));
        assert!(src.contains("    wl_registry_singleton = new WlRegistryShim();\n"));
        assert!(src.contains("void set_wl_registry_shim(WlRegistryShim* shim) {\n  wl_registry_singleton = shim;\n}\n"));
    }
}
