//! WGSL sources for the particle and marker programs.
//!
//! The CPU mirror lives in [`crate::shading`]; keep the two in step.

pub const PARTICLE_VERTEX_ENTRY: &str = "vs_main";
pub const MARKER_VERTEX_ENTRY: &str = "vs_marker";
pub const MARKER_FRAGMENT_ENTRY: &str = "fs_marker";

pub const PARTICLE_SHADER: &str = r#"
const AMBIENT_STRENGTH: f32 = 0.1;
const SHININESS: f32 = 32.0;

struct Camera {
    view_proj: mat4x4<f32>,
    view_pos: vec3<f32>,
}

struct PointLight {
    pos: vec3<f32>,
    color: vec3<f32>,
    _pad0: vec4<f32>,
    _pad1: vec4<f32>,
}

struct LightBuffer {
    count: u32,
    lights: array<PointLight>,
}

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<storage, read> light_data: LightBuffer;

@group(2) @binding(0)
var t_surface: texture_2d<f32>;
@group(2) @binding(1)
var s_surface: sampler;

struct VertexInput {
    @location(0) position: vec3<f32>,
    @location(1) uv: vec2<f32>,
    @location(2) normal: vec3<f32>,
}

struct InstanceInput {
    @location(5) model_0: vec4<f32>,
    @location(6) model_1: vec4<f32>,
    @location(7) model_2: vec4<f32>,
    @location(8) model_3: vec4<f32>,
    @location(9) normal_0: vec3<f32>,
    @location(10) normal_1: vec3<f32>,
    @location(11) normal_2: vec3<f32>,
    @location(12) color: vec4<f32>,
}

struct VertexOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) world_pos: vec3<f32>,
    @location(1) world_normal: vec3<f32>,
    @location(2) uv: vec2<f32>,
    @location(3) color: vec4<f32>,
}

@vertex
fn vs_main(mesh_in: VertexInput, instance_in: InstanceInput) -> VertexOutput {
    // Instance attributes carry matrix rows.
    let model = transpose(mat4x4<f32>(
        instance_in.model_0,
        instance_in.model_1,
        instance_in.model_2,
        instance_in.model_3,
    ));
    let normal_matrix = transpose(mat3x3<f32>(
        instance_in.normal_0,
        instance_in.normal_1,
        instance_in.normal_2,
    ));

    let world_pos = model * vec4<f32>(mesh_in.position, 1.0);
    var out: VertexOutput;
    out.clip_position = camera.view_proj * world_pos;
    out.world_pos = world_pos.xyz;
    out.world_normal = normal_matrix * mesh_in.normal;
    out.uv = mesh_in.uv;
    out.color = instance_in.color;
    return out;
}

// max() may discard NaN, this keeps it.
fn clamp_positive(value: f32) -> f32 {
    return select(value, 0.0, value < 0.0);
}

// 1 on the lit side, 0 behind; NaN passes through.
fn facing_step(n_dot_l: f32) -> f32 {
    return select(select(n_dot_l, 1.0, n_dot_l > 0.0), 0.0, n_dot_l <= 0.0);
}

fn accumulate_lights(world_pos: vec3<f32>, world_normal: vec3<f32>, surface_color: vec3<f32>) -> vec3<f32> {
    let view_dir = normalize(camera.view_pos - world_pos);
    var total = vec3<f32>(0.0);
    for (var i = 0u; i < light_data.count; i = i + 1u) {
        let light = light_data.lights[i];
        let light_dir = normalize(light.pos - world_pos);
        let reflect_dir = reflect(-light_dir, world_normal);

        let ambient = light.color * AMBIENT_STRENGTH;
        let n_dot_l = dot(world_normal, light_dir);
        let diffuse = light.color * clamp_positive(n_dot_l);
        let specular = light.color * facing_step(n_dot_l) * pow(clamp_positive(dot(view_dir, reflect_dir)), SHININESS);

        total += (ambient + diffuse + specular) * surface_color;
    }
    return total;
}

@fragment
fn fs_flat(frag: VertexOutput) -> @location(0) vec4<f32> {
    return frag.color;
}

@fragment
fn fs_lit(frag: VertexOutput) -> @location(0) vec4<f32> {
    let rgb = accumulate_lights(frag.world_pos, frag.world_normal, frag.color.rgb);
    return vec4<f32>(rgb, frag.color.a);
}

@fragment
fn fs_textured(frag: VertexOutput) -> @location(0) vec4<f32> {
    let texel = textureSample(t_surface, s_surface, frag.uv);
    let rgb = accumulate_lights(frag.world_pos, frag.world_normal, texel.rgb);
    return vec4<f32>(rgb, frag.color.a);
}
"#;

pub const MARKER_SHADER: &str = r#"
const MARKER_SCALE: f32 = 0.005;

struct Camera {
    view_proj: mat4x4<f32>,
    view_pos: vec3<f32>,
}

struct MarkerLight {
    pos: vec3<f32>,
    color: vec3<f32>,
}

@group(0) @binding(0)
var<uniform> camera: Camera;

@group(1) @binding(0)
var<uniform> marker_light: MarkerLight;

// Bound for layout compatibility only; never sampled.
@group(2) @binding(0)
var t_marker: texture_2d<f32>;
@group(2) @binding(1)
var s_marker: sampler;

struct MarkerInput {
    @location(0) position: vec3<f32>,
}

struct MarkerOutput {
    @builtin(position) clip_position: vec4<f32>,
    @location(0) color: vec3<f32>,
}

@vertex
fn vs_marker(mesh_in: MarkerInput) -> MarkerOutput {
    let world_pos = mesh_in.position * MARKER_SCALE + marker_light.pos;
    var out: MarkerOutput;
    out.clip_position = camera.view_proj * vec4<f32>(world_pos, 1.0);
    out.color = marker_light.color;
    return out;
}

@fragment
fn fs_marker(frag: MarkerOutput) -> @location(0) vec4<f32> {
    return vec4<f32>(frag.color, 1.0);
}
"#;
