use crate::ir::{Interface, Protocol};
use crate::naming::{self, ArtifactNames};

use super::{Codegen, GENERATED_BANNER, method_sigs};

/// `mock-<stem>-shim.h`: a gMock subclass per shim class.
pub fn render_test_double(protocol: &Protocol) -> String {
    let names = ArtifactNames::for_stem(&protocol.name_hyphen);
    let guard = naming::header_guard(&protocol.name_hyphen, true);
    let mut cg = Codegen::new();

    cg.line(GENERATED_BANNER);
    cg.blank();
    cg.line(format!("#ifndef {guard}"));
    cg.line(format!("#define {guard}"));
    cg.blank();
    cg.line("#include <gmock/gmock.h>");
    cg.blank();
    cg.line(format!(
        "#include \"{}\"  // NOLINT(build/include_directory)",
        names.declaration
    ));

    for iface in &protocol.interfaces {
        cg.blank();
        emit_mock(&mut cg, iface);
    }

    cg.blank();
    cg.line(format!("#endif  // {guard}"));
    cg.into_string()
}

fn emit_mock(cg: &mut Codegen, iface: &Interface) {
    let mock = naming::mock_name(&iface.decl_name);
    cg.line(format!("class {mock} : public {} {{", iface.decl_name));
    cg.line(" public:");
    cg.indent();
    for (i, sig) in method_sigs(iface).into_iter().enumerate() {
        if i > 0 {
            cg.blank();
        }
        cg.line(format!(
            "MOCK_METHOD({}, {}, ({}), (override));",
            sig.ret,
            sig.name,
            sig.param_list()
        ));
    }
    cg.dedent();
    cg.line("};");
}
