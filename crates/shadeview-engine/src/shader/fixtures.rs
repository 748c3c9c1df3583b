//! WGSL sources shared by tests.

pub(crate) const PASSTHROUGH_VERT: &str = r#"
struct VertexOutput {
    @builtin(position) position: vec4<f32>,
    @location(0) uv: vec2<f32>,
}

@vertex
fn vs_main(@location(0) in_vert: vec2<f32>, @location(1) in_texcoord: vec2<f32>) -> VertexOutput {
    var out: VertexOutput;
    out.position = vec4<f32>(in_vert, 0.0, 1.0);
    out.uv = in_texcoord;
    return out;
}
"#;

pub(crate) const PASSTHROUGH_FRAG: &str = r#"
@group(0) @binding(0) var inputTexture0: texture_2d<f32>;
@group(0) @binding(1) var inputTexture0_sampler: sampler;
@group(0) @binding(2) var<uniform> resolution: vec2<f32>;

@fragment
fn fs_main(@location(0) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return textureSample(inputTexture0, inputTexture0_sampler, uv);
}
"#;

/// Parses and validates on its own, but its input interpolation does not
/// match what `PASSTHROUGH_VERT` writes.
pub(crate) const FLAT_UV_FRAG: &str = r#"
@fragment
fn fs_main(@location(0) @interpolate(flat) uv: vec2<f32>) -> @location(0) vec4<f32> {
    return vec4<f32>(uv, 0.0, 1.0);
}
"#;

pub(crate) const BROKEN_FRAG: &str = r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {
    return vec4<f32>(1.0, 0.0, 0.0, 1.0)
}
"#;

/// Fragment shader that ignores its inputs and writes one constant color.
pub(crate) fn solid_frag(rgba: [f32; 4]) -> String {
    format!(
        r#"
@fragment
fn fs_main() -> @location(0) vec4<f32> {{
    return vec4<f32>({:?}, {:?}, {:?}, {:?});
}}
"#,
        rgba[0], rgba[1], rgba[2], rgba[3]
    )
}
