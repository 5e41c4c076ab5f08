/// WGSL shader for flat-colored scene geometry.
pub const SCENE_SHADER: &str = r#"
struct Uniforms {
    view_proj: mat4x4<f32>,
};

@group(0) @binding(0)
var<uniform> uniforms: Uniforms;

struct SceneVertex {
    @location(0) position: vec3<f32>,
    @location(1) color: vec4<f32>,
};

struct SceneOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec4<f32>,
};

@vertex
fn vs_scene(vertex: SceneVertex) -> SceneOutput {
    var out: SceneOutput;
    out.clip_position = uniforms.view_proj * vec4<f32>(vertex.position, 1.0);
    out.color = vertex.color;
    return out;
}

@fragment
fn fs_scene(in: SceneOutput) -> @location(0) vec4<f32> {
    return in.color;
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shader_declares_entry_points() {
        assert!(SCENE_SHADER.contains("fn vs_scene"));
        assert!(SCENE_SHADER.contains("fn fs_scene"));
    }
}
