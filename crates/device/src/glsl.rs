//! Declaration scanner used by the headless device to stand in for a driver
//! compiler. It understands top-level `uniform`, `in`, `out` (and the legacy
//! `attribute` / `varying`) declarations, optional `layout(location = N)`,
//! and `#error`. Everything else is accepted unchecked.

use meshrig_common::ShaderStage;
use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Variable {
    pub ty: String,
    pub name: String,
    pub location: Option<u32>,
}

/// The interface one compiled stage exposes to the linker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct StageInterface {
    pub uniforms: Vec<Variable>,
    pub inputs: Vec<Variable>,
    pub outputs: Vec<Variable>,
}

/// Result of linking a vertex and fragment interface.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct LinkedInterface {
    /// (name, type) in location order.
    pub uniforms: Vec<(String, String)>,
    pub attributes: BTreeMap<String, u32>,
}

const SKIPPED_QUALIFIERS: &[&str] = &[
    "flat", "smooth", "noperspective", "highp", "mediump", "lowp", "centroid",
];

pub(crate) fn compile(stage: ShaderStage, source: &str) -> Result<StageInterface, String> {
    let mut interface = StageInterface::default();
    let mut has_main = false;

    for (index, raw) in source.lines().enumerate() {
        let line_no = index + 1;
        let line = raw.split("//").next().unwrap_or("").trim();
        if let Some(message) = line.strip_prefix("#error") {
            return Err(format!(
                "ERROR: 0:{line_no}: '#error' : {}",
                message.trim()
            ));
        }
        if line.starts_with('#') || line.is_empty() {
            continue;
        }
        if declares_main(line) {
            has_main = true;
            continue;
        }
        scan_declaration(stage, line, line_no, &mut interface)?;
    }

    if !has_main {
        return Err("ERROR: 0:0: 'main' : function not defined".into());
    }
    Ok(interface)
}

/// `void main(...)` with any spacing between the two tokens.
fn declares_main(line: &str) -> bool {
    let mut words = line.split_whitespace();
    words.next() == Some("void")
        && words
            .next()
            .is_some_and(|w| w == "main" || w.starts_with("main("))
}

fn scan_declaration(
    stage: ShaderStage,
    line: &str,
    line_no: usize,
    interface: &mut StageInterface,
) -> Result<(), String> {
    let Some(body) = line.strip_suffix(';') else {
        return Ok(());
    };

    let (location, rest) = match body.strip_prefix("layout") {
        Some(after) => {
            let malformed = || format!("ERROR: 0:{line_no}: malformed layout qualifier");
            let open = after.find('(').ok_or_else(malformed)?;
            let close = after[open..].find(')').ok_or_else(malformed)? + open;
            (parse_location(&after[open + 1..close]), &after[close + 1..])
        }
        None => (None, body),
    };

    let mut tokens = rest
        .split_whitespace()
        .filter(|t| !SKIPPED_QUALIFIERS.contains(t));
    let Some(qualifier) = tokens.next() else {
        return Ok(());
    };
    let target = match (qualifier, stage) {
        ("uniform", _) => &mut interface.uniforms,
        ("in", _) | ("attribute", ShaderStage::Vertex) | ("varying", ShaderStage::Fragment) => {
            &mut interface.inputs
        }
        ("out", _) | ("varying", ShaderStage::Vertex) => &mut interface.outputs,
        _ => return Ok(()),
    };
    let Some(ty) = tokens.next() else {
        return Err(format!("ERROR: 0:{line_no}: '{qualifier}' : missing type"));
    };
    let names: String = tokens.collect::<Vec<_>>().join(" ");
    if names.is_empty() {
        return Err(format!("ERROR: 0:{line_no}: '{ty}' : missing identifier"));
    }
    for name in names.split(',') {
        let name = name.split('[').next().unwrap_or("").trim();
        if name.is_empty() {
            return Err(format!("ERROR: 0:{line_no}: '{ty}' : missing identifier"));
        }
        target.push(Variable {
            ty: ty.to_string(),
            name: name.to_string(),
            location,
        });
    }
    Ok(())
}

fn parse_location(inner: &str) -> Option<u32> {
    inner.split(',').find_map(|part| {
        let (key, value) = part.split_once('=')?;
        if key.trim() == "location" {
            value.trim().parse().ok()
        } else {
            None
        }
    })
}

pub(crate) fn link(
    vertex: &StageInterface,
    fragment: &StageInterface,
) -> Result<LinkedInterface, String> {
    for input in &fragment.inputs {
        let written = vertex
            .outputs
            .iter()
            .any(|out| out.name == input.name && out.ty == input.ty);
        if !written {
            return Err(format!(
                "error: fragment shader input `{} {}` is not written by the vertex shader",
                input.ty, input.name
            ));
        }
    }

    let mut linked = LinkedInterface::default();
    for uniform in vertex.uniforms.iter().chain(&fragment.uniforms) {
        match linked.uniforms.iter().find(|(name, _)| *name == uniform.name) {
            Some((_, ty)) if *ty != uniform.ty => {
                return Err(format!(
                    "error: uniform `{}` declared as both {} and {}",
                    uniform.name, ty, uniform.ty
                ));
            }
            Some(_) => {}
            None => linked
                .uniforms
                .push((uniform.name.clone(), uniform.ty.clone())),
        }
    }

    let mut taken: Vec<u32> = vertex.inputs.iter().filter_map(|v| v.location).collect();
    let mut next = 0;
    for input in &vertex.inputs {
        let location = match input.location {
            Some(location) => location,
            None => {
                while taken.contains(&next) {
                    next += 1;
                }
                taken.push(next);
                next
            }
        };
        linked.attributes.insert(input.name.clone(), location);
    }
    Ok(linked)
}

#[cfg(test)]
mod tests {
    use super::*;

    const VERTEX: &str = "#version 330 core
layout (location = 0) in vec3 aPosition;
in vec2 aTexCoord;
out vec2 texCoord;
uniform mat4 model;
uniform mat4 view, projection;
void main()
{
    texCoord = aTexCoord;
}
";

    const FRAGMENT: &str = "#version 330 core
out vec4 outputColor;
in vec2 texCoord;
uniform sampler2D texture0;
void main()
{
    outputColor = texture(texture0, texCoord);
}
";

    #[test]
    fn scans_declarations() {
        let iface = compile(ShaderStage::Vertex, VERTEX).unwrap();
        let uniforms: Vec<&str> = iface.uniforms.iter().map(|u| u.name.as_str()).collect();
        assert_eq!(uniforms, vec!["model", "view", "projection"]);
        assert_eq!(iface.inputs[0].location, Some(0));
        assert_eq!(iface.inputs[1].location, None);
        assert_eq!(iface.outputs[0].name, "texCoord");
    }

    #[test]
    fn missing_main_fails() {
        let err = compile(ShaderStage::Fragment, "uniform float x;").unwrap_err();
        assert!(err.contains("main"));
    }

    #[test]
    fn error_directive_fails_with_line() {
        let err = compile(ShaderStage::Vertex, "void main() {}\n#error broken").unwrap_err();
        assert!(err.contains("0:2"));
        assert!(err.contains("broken"));
    }

    #[test]
    fn malformed_layout_fails() {
        let source = "layout) in vec3 aPosition(;\nvoid main() {}";
        let err = compile(ShaderStage::Vertex, source).unwrap_err();
        assert!(err.contains("0:1: malformed layout qualifier"), "{err}");

        let err = compile(ShaderStage::Vertex, "layout (location = 0 in vec3 a;\nvoid main() {}")
            .unwrap_err();
        assert!(err.contains("malformed layout"));
    }

    #[test]
    fn main_found_with_any_spacing() {
        assert!(compile(ShaderStage::Vertex, "void  main()\n{\n}").is_ok());
        assert!(compile(ShaderStage::Vertex, "void\tmain(void){ }").is_ok());
        assert!(compile(ShaderStage::Vertex, "void main (void) {}").is_ok());
        assert!(compile(ShaderStage::Vertex, "void mainly();").is_err());
        assert!(compile(ShaderStage::Vertex, "int main;").is_err());
    }

    #[test]
    fn link_assigns_locations() {
        let v = compile(ShaderStage::Vertex, VERTEX).unwrap();
        let f = compile(ShaderStage::Fragment, FRAGMENT).unwrap();
        let linked = link(&v, &f).unwrap();
        let names: Vec<&str> = linked.uniforms.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["model", "view", "projection", "texture0"]);
        assert_eq!(linked.attributes["aPosition"], 0);
        assert_eq!(linked.attributes["aTexCoord"], 1);
    }

    #[test]
    fn link_rejects_unwritten_varying() {
        let v = compile(ShaderStage::Vertex, "void main() {}").unwrap();
        let f = compile(ShaderStage::Fragment, FRAGMENT).unwrap();
        let err = link(&v, &f).unwrap_err();
        assert!(err.contains("texCoord"));
    }
}
