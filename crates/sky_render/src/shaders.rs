/// WGSL for lit, instanced meshes: one ambient term plus one directional
/// light with a comparison-sampled shadow map.
pub const MESH_SHADER: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    // xyz: direction toward the light, w: unused
    light_dir: vec4<f32>,
    // rgb: light colour * intensity
    light_color: vec4<f32>,
    // rgb: ambient colour * intensity
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;

@group(1) @binding(0)
var shadow_map: texture_depth_2d;
@group(1) @binding(1)
var shadow_sampler: sampler_comparison;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_normal: vec3<f32>,
    @location(1) color: vec4<f32>,
    @location(2) light_space: vec4<f32>,
    @location(3) receive_shadow: f32,
};

@vertex
fn vs_main(vertex: VertexInput, instance: InstanceInput) -> VertexOutput {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    let world_pos = model * vec4<f32>(vertex.position, 1.0);
    let world_normal = (model * vec4<f32>(vertex.normal, 0.0)).xyz;

    var out: VertexOutput;
    out.clip_position = scene.view_proj * world_pos;
    out.world_normal = normalize(world_normal);
    out.color = instance.color;
    out.light_space = scene.light_view_proj * world_pos;
    out.receive_shadow = instance.params.x;
    return out;
}

@fragment
fn fs_main(in: VertexOutput) -> @location(0) vec4<f32> {
    let ndc = in.light_space.xyz / in.light_space.w;
    let uv = ndc.xy * vec2<f32>(0.5, -0.5) + vec2<f32>(0.5, 0.5);
    let lit_sample = textureSampleCompareLevel(shadow_map, shadow_sampler, uv, ndc.z);
    let in_bounds = all(uv >= vec2<f32>(0.0, 0.0)) && all(uv <= vec2<f32>(1.0, 1.0))
        && ndc.z <= 1.0;
    let shadowed = in_bounds && in.receive_shadow > 0.5;
    let visibility = select(1.0, lit_sample, shadowed);

    let n = normalize(in.world_normal);
    let diffuse = max(dot(n, normalize(scene.light_dir.xyz)), 0.0);
    let lighting = scene.ambient.rgb + scene.light_color.rgb * diffuse * visibility;
    return vec4<f32>(in.color.rgb * lighting, in.color.a);
}
"#;

/// Depth-only pass from the directional light.
pub const SHADOW_SHADER: &str = r#"
struct SceneUniforms {
    view_proj: mat4x4<f32>,
    light_view_proj: mat4x4<f32>,
    light_dir: vec4<f32>,
    light_color: vec4<f32>,
    ambient: vec4<f32>,
};

@group(0) @binding(0)
var<uniform> scene: SceneUniforms;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) normal: vec3<f32>,
};

struct InstanceInput {
    @location(2) model_0: vec4<f32>,
    @location(3) model_1: vec4<f32>,
    @location(4) model_2: vec4<f32>,
    @location(5) model_3: vec4<f32>,
    @location(6) color: vec4<f32>,
    @location(7) params: vec4<f32>,
};

@vertex
fn vs_shadow(vertex: VertexInput, instance: InstanceInput) -> @builtin(position) vec4<f32> {
    let model = mat4x4<f32>(
        instance.model_0,
        instance.model_1,
        instance.model_2,
        instance.model_3,
    );
    return scene.light_view_proj * model * vec4<f32>(vertex.position, 1.0);
}
"#;
