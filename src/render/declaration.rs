use crate::ir::{Interface, Protocol};
use crate::naming::{self, ArtifactNames};

use super::{Codegen, GENERATED_BANNER, method_sigs};

/// `<stem>-shim.h`: one class per interface plus its getter/setter.
pub fn render_declaration(protocol: &Protocol) -> String {
    let stem = protocol.name_hyphen.as_str();
    let guard = naming::header_guard(stem, false);
    let mut cg = Codegen::new();

    cg.line(GENERATED_BANNER);
    cg.blank();
    cg.line(format!("#ifndef {guard}"));
    cg.line(format!("#define {guard}"));
    cg.blank();
    cg.line("#include <cstdint>");
    cg.blank();
    for header in [
        ArtifactNames::client_protocol_header(stem),
        ArtifactNames::server_protocol_header(stem),
    ] {
        cg.line(format!("#include \"{header}\"  // NOLINT(build/include_directory)"));
    }

    for iface in &protocol.interfaces {
        cg.blank();
        emit_class(&mut cg, iface);
    }

    cg.blank();
    cg.line(format!("#endif  // {guard}"));
    cg.into_string()
}

fn emit_class(cg: &mut Codegen, iface: &Interface) {
    let class = iface.decl_name.as_str();
    cg.line(format!("class {class} {{"));
    cg.line(" public:");
    cg.indent();
    cg.line(format!("{class}() = default;"));
    cg.line(format!("{class}({class}&&) = delete;"));
    cg.line(format!("{class}& operator=({class}&&) = delete;"));
    cg.blank();
    cg.line(format!("virtual ~{class}() = default;"));
    cg.blank();
    for sig in method_sigs(iface) {
        for comment in &sig.comment {
            cg.line(format!("// {comment}"));
        }
        cg.line(format!("virtual {} {}({});", sig.ret, sig.name, sig.param_list()));
    }
    cg.dedent();
    cg.line("};");
    cg.blank();
    cg.line(format!("{class}* {}();", naming::shim_getter(&iface.wire_name)));
    cg.line(format!(
        "void {}({class}* shim);",
        naming::shim_setter(&iface.wire_name)
    ));
}
