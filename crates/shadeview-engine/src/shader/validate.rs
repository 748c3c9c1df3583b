//! CPU-side WGSL validation against the host contract.
//!
//! Runs before any GPU object is created so a broken shader is an ordinary
//! error instead of a device validation failure.

use anyhow::{anyhow, bail, ensure, Context, Result};
use naga::{
    AddressSpace, Binding, EntryPoint, Handle, ImageClass, ImageDimension, Interpolation, Module,
    Sampling, ScalarKind, Type, TypeInner, VectorSize,
};

use super::ShaderRole;

pub const VERTEX_ENTRY: &str = "vs_main";
pub const FRAGMENT_ENTRY: &str = "fs_main";

pub const TEXTURE_BINDING: u32 = 0;
pub const SAMPLER_BINDING: u32 = 1;
pub const RESOLUTION_BINDING: u32 = 2;

const IN_VERT_LOCATION: u32 = 0;
const IN_TEXCOORD_LOCATION: u32 = 1;

/// Parses and validates one stage, then checks it against the host contract.
pub fn validate_stage(role: ShaderRole, source: &str) -> Result<Module> {
    let module = naga::front::wgsl::parse_str(source)
        .map_err(|e| anyhow!("{}", e.emit_to_string(source)))
        .with_context(|| format!("{role} shader failed to parse"))?;

    naga::valid::Validator::new(
        naga::valid::ValidationFlags::all(),
        naga::valid::Capabilities::empty(),
    )
    .validate(&module)
    .map_err(|e| anyhow!("{}", e.emit_to_string(source)))
    .with_context(|| format!("{role} shader failed validation"))?;

    check_resources(&module, role)?;

    let entry = find_entry(&module, role)?;
    match role {
        ShaderRole::Vertex => check_vertex_inputs(&module, entry)?,
        ShaderRole::Fragment => check_fragment_output(&module, entry)?,
    }

    Ok(module)
}

/// Validates both stages and the interface between them.
///
/// This is the CPU half of "compile and link": every fragment input location
/// must be written by the vertex stage with the same type and interpolation.
pub fn validate_pair(vertex: &str, fragment: &str) -> Result<()> {
    let vs = validate_stage(ShaderRole::Vertex, vertex)?;
    let fs = validate_stage(ShaderRole::Fragment, fragment)?;

    let vs_entry = find_entry(&vs, ShaderRole::Vertex)?;
    let fs_entry = find_entry(&fs, ShaderRole::Fragment)?;

    let produced = stage_outputs(&vs, vs_entry);
    for input in stage_inputs(&fs, fs_entry) {
        let location = input.location;
        let Some(output) = produced.iter().find(|o| o.location == location) else {
            bail!("link error: fragment input @location({location}) is not written by the vertex stage");
        };
        ensure!(
            vs.types[output.ty].inner == fs.types[input.ty].inner,
            "link error: @location({location}) type differs between vertex output and fragment input"
        );
        ensure!(
            output.interpolation == input.interpolation && output.sampling == input.sampling,
            "link error: @location({location}) interpolation differs between vertex output ({:?}, {:?}) and fragment input ({:?}, {:?})",
            output.interpolation,
            output.sampling,
            input.interpolation,
            input.sampling
        );
    }

    Ok(())
}

fn find_entry(module: &Module, role: ShaderRole) -> Result<&EntryPoint> {
    module
        .entry_points
        .iter()
        .find(|ep| ep.name == role.entry_point() && ep.stage == role.naga_stage())
        .with_context(|| {
            format!(
                "{role} shader has no @{role} entry point named `{}`",
                role.entry_point()
            )
        })
}

fn check_resources(module: &Module, role: ShaderRole) -> Result<()> {
    for (_, var) in module.global_variables.iter() {
        let Some(rb) = &var.binding else { continue };
        let name = var.name.as_deref().unwrap_or("<unnamed>");

        ensure!(
            rb.group == 0,
            "{role} shader: `{name}` uses @group({}); only @group(0) is supplied",
            rb.group
        );

        let inner = &module.types[var.ty].inner;
        let (matches, expected) = match rb.binding {
            TEXTURE_BINDING => (
                matches!(
                    inner,
                    TypeInner::Image {
                        dim: ImageDimension::D2,
                        arrayed: false,
                        class: ImageClass::Sampled {
                            kind: ScalarKind::Float,
                            multi: false,
                        },
                    }
                ),
                "texture_2d<f32>",
            ),
            SAMPLER_BINDING => (
                matches!(inner, TypeInner::Sampler { comparison: false }),
                "sampler",
            ),
            RESOLUTION_BINDING => (
                var.space == AddressSpace::Uniform && is_f32_vector(module, var.ty, VectorSize::Bi),
                "var<uniform> vec2<f32>",
            ),
            other => bail!("{role} shader: `{name}` uses unknown @binding({other})"),
        };

        ensure!(
            matches,
            "{role} shader: `{name}` at @binding({}) must be {expected}",
            rb.binding
        );
    }
    Ok(())
}

fn check_vertex_inputs(module: &Module, entry: &EntryPoint) -> Result<()> {
    for IoSlot { location, ty, .. } in stage_inputs(module, entry) {
        let name = match location {
            IN_VERT_LOCATION => "in_vert",
            IN_TEXCOORD_LOCATION => "in_texcoord",
            other => bail!("vertex shader reads @location({other}); only in_vert (0) and in_texcoord (1) exist"),
        };
        ensure!(
            is_f32_vector(module, ty, VectorSize::Bi),
            "vertex shader: {name} at @location({location}) must be vec2<f32>"
        );
    }
    Ok(())
}

fn check_fragment_output(module: &Module, entry: &EntryPoint) -> Result<()> {
    let outputs = stage_outputs(module, entry);
    ensure!(
        outputs
            .iter()
            .any(|o| o.location == 0 && is_f32_vector(module, o.ty, VectorSize::Quad)),
        "fragment shader must write vec4<f32> to @location(0)"
    );
    if let Some(extra) = outputs.iter().find(|o| o.location != 0) {
        bail!(
            "fragment shader writes @location({}); only one color target exists",
            extra.location
        );
    }
    Ok(())
}

/// One user-defined stage input or output.
struct IoSlot {
    location: u32,
    ty: Handle<Type>,
    interpolation: Option<Interpolation>,
    sampling: Option<Sampling>,
}

fn stage_inputs(module: &Module, entry: &EntryPoint) -> Vec<IoSlot> {
    let mut out = Vec::new();
    for arg in &entry.function.arguments {
        collect_locations(module, arg.ty, arg.binding.as_ref(), &mut out);
    }
    out
}

fn stage_outputs(module: &Module, entry: &EntryPoint) -> Vec<IoSlot> {
    let mut out = Vec::new();
    if let Some(result) = &entry.function.result {
        collect_locations(module, result.ty, result.binding.as_ref(), &mut out);
    }
    out
}

/// Flattens IO structs into location slots; builtins are skipped.
fn collect_locations(
    module: &Module,
    ty: Handle<Type>,
    binding: Option<&Binding>,
    out: &mut Vec<IoSlot>,
) {
    match binding {
        Some(Binding::Location {
            location,
            interpolation,
            sampling,
            ..
        }) => out.push(IoSlot {
            location: *location,
            ty,
            interpolation: *interpolation,
            sampling: *sampling,
        }),
        Some(Binding::BuiltIn(_)) => {}
        None => {
            if let TypeInner::Struct { members, .. } = &module.types[ty].inner {
                for member in members {
                    collect_locations(module, member.ty, member.binding.as_ref(), out);
                }
            }
        }
    }
}

fn is_f32_vector(module: &Module, ty: Handle<Type>, size: VectorSize) -> bool {
    matches!(
        module.types[ty].inner,
        TypeInner::Vector { size: s, scalar } if s == size && scalar == naga::Scalar::F32
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shader::fixtures;

    #[test]
    fn passthrough_pair_is_valid() {
        validate_pair(fixtures::PASSTHROUGH_VERT, fixtures::PASSTHROUGH_FRAG).unwrap();
    }

    #[test]
    fn solid_fragment_without_resources_is_valid() {
        validate_pair(fixtures::PASSTHROUGH_VERT, &fixtures::solid_frag([1.0, 0.0, 0.0, 1.0]))
            .unwrap();
    }

    #[test]
    fn syntax_error_is_reported_with_role() {
        let err = validate_stage(ShaderRole::Fragment, fixtures::BROKEN_FRAG).unwrap_err();
        assert!(format!("{err:#}").contains("fragment shader failed to parse"));
    }

    #[test]
    fn missing_entry_point_is_rejected() {
        let src = fixtures::PASSTHROUGH_VERT.replace("vs_main", "main");
        let err = validate_stage(ShaderRole::Vertex, &src).unwrap_err();
        assert!(err.to_string().contains("vs_main"));
    }

    #[test]
    fn fragment_source_in_vertex_slot_is_rejected() {
        assert!(validate_stage(ShaderRole::Vertex, fixtures::PASSTHROUGH_FRAG).is_err());
    }

    #[test]
    fn vertex_input_must_be_vec2() {
        let src = fixtures::PASSTHROUGH_VERT
            .replace("@location(0) in_vert: vec2<f32>", "@location(0) in_vert: vec3<f32>")
            .replace("vec4<f32>(in_vert, 0.0, 1.0)", "vec4<f32>(in_vert, 1.0)");
        let err = validate_stage(ShaderRole::Vertex, &src).unwrap_err();
        assert!(err.to_string().contains("in_vert"));
    }

    #[test]
    fn unknown_binding_is_rejected() {
        let src = format!(
            "@group(0) @binding(7) var<uniform> time: f32;\n{}",
            fixtures::solid_frag([0.0, 0.0, 0.0, 1.0])
        );
        let err = validate_stage(ShaderRole::Fragment, &src).unwrap_err();
        assert!(err.to_string().contains("@binding(7)"));
    }

    #[test]
    fn resolution_must_be_uniform_vec2() {
        let src = fixtures::PASSTHROUGH_FRAG.replace(
            "var<uniform> resolution: vec2<f32>",
            "var<uniform> resolution: vec4<f32>",
        );
        let err = validate_stage(ShaderRole::Fragment, &src).unwrap_err();
        assert!(err.to_string().contains("resolution"));
    }

    #[test]
    fn fragment_input_must_be_produced_by_vertex() {
        let fs = r#"
            @fragment
            fn fs_main(@location(3) tint: vec4<f32>) -> @location(0) vec4<f32> {
                return tint;
            }
        "#;
        let err = validate_pair(fixtures::PASSTHROUGH_VERT, fs).unwrap_err();
        assert!(err.to_string().contains("link error"));
    }

    #[test]
    fn interpolation_mismatch_is_a_link_error() {
        let err = validate_pair(fixtures::PASSTHROUGH_VERT, fixtures::FLAT_UV_FRAG).unwrap_err();
        assert!(err.to_string().contains("interpolation differs"));
    }

    #[test]
    fn fragment_must_write_color() {
        let fs = r#"
            @fragment
            fn fs_main() -> @location(1) vec4<f32> {
                return vec4<f32>(1.0);
            }
        "#;
        assert!(validate_stage(ShaderRole::Fragment, fs).is_err());
    }
}
