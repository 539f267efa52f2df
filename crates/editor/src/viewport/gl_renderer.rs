use std::collections::HashMap;

use glam::{Mat4, Vec3};
use glow::HasContext;

use super::camera::OrbitCamera;
use super::mesh::{self, GeometryBuffer, LineMeshData};
use crate::state::scene::Light;
use crate::state::settings::ViewportSettings;

// ── Render inputs ────────────────────────────────────────────

/// Parameters for rendering the viewport
pub struct RenderParams {
    /// Viewport rectangle [x, y, width, height] in pixels
    pub viewport: [f32; 4],
    pub grid_visible: bool,
    /// Background color RGB
    pub bg_color: [u8; 3],
    pub ambient: f32,
    pub light_dir: Vec3,
    pub light_intensity: f32,
}

impl RenderParams {
    pub fn new(viewport: [f32; 4], settings: &ViewportSettings, lights: &[Light]) -> Self {
        let mut params = Self {
            viewport,
            grid_visible: settings.grid_visible,
            bg_color: settings.background_color,
            ambient: 0.0,
            light_dir: Vec3::Y,
            light_intensity: 0.0,
        };
        for light in lights {
            match light {
                Light::Ambient { intensity, .. } => params.ambient += intensity,
                Light::Directional {
                    intensity,
                    direction,
                    ..
                } => {
                    params.light_dir = Vec3::from(*direction).normalize_or_zero();
                    params.light_intensity = *intensity;
                }
            }
        }
        params
    }
}

/// One object to draw this frame
pub struct ObjectDraw {
    pub id: String,
    pub model: Mat4,
}

/// Geometry for an object the renderer has no GPU mesh for yet
pub struct ObjectUpload {
    pub id: String,
    pub geometry: GeometryBuffer,
    pub color: [f32; 3],
}

/// The highlight overlay to draw this frame
pub struct OverlayDraw {
    /// Triangle list, 7 floats per vertex. Empty unless the GPU copy is stale.
    pub vertices: Vec<f32>,
    pub model: Mat4,
}

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

/// Colored vertices drawn as lines or, for the overlay, as triangles
struct GpuLines {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    vertex_count: i32,
    mode: u32,
}

// ── Main GL renderer ─────────────────────────────────────────

pub struct GlRenderer {
    mesh_program: glow::Program,
    line_program: glow::Program,
    grid: Option<GpuLines>,
    /// Cached grid settings to detect changes
    cached_grid_settings: Option<(i32, f32)>,
    /// Object meshes keyed by object ID; geometry never changes after upload
    scene_meshes: HashMap<String, GpuMesh>,
    gizmo: Option<GpuLines>,
    overlay: Option<GpuLines>,
    /// Overlay generation currently on the GPU
    overlay_generation: u64,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let mesh_program = compile_program(gl, MESH_VERT, MESH_FRAG)?;
        let line_program = compile_program(gl, LINE_VERT, LINE_FRAG)?;

        Ok(Self {
            mesh_program,
            line_program,
            grid: None,
            cached_grid_settings: None,
            scene_meshes: HashMap::new(),
            gizmo: None,
            overlay: None,
            overlay_generation: 0,
        })
    }

    /// Update grid mesh based on settings
    pub fn update_grid(&mut self, gl: &glow::Context, settings: &ViewportSettings) {
        let new_settings = (settings.grid_range, settings.grid_size);
        if self.cached_grid_settings == Some(new_settings) {
            return;
        }

        if let Some(old) = self.grid.take() {
            delete_lines(gl, &old);
        }

        let grid_data = mesh::grid(settings.grid_range, settings.grid_size, 0.6);
        self.grid = log_upload(upload_lines(gl, &grid_data, glow::LINES));
        self.cached_grid_settings = Some(new_settings);
    }

    /// Whether a GPU mesh exists for `id`
    pub fn has_mesh(&self, id: &str) -> bool {
        self.scene_meshes.contains_key(id)
    }

    /// Generation of the overlay currently on the GPU
    pub fn overlay_generation(&self) -> u64 {
        self.overlay_generation
    }

    /// Upload new object meshes and drop ones no longer present
    pub fn sync_objects(&mut self, gl: &glow::Context, objects: &[ObjectDraw], uploads: &[ObjectUpload]) {
        self.scene_meshes.retain(|id, mesh| {
            let keep = objects.iter().any(|o| &o.id == id);
            if !keep {
                delete_mesh(gl, mesh);
            }
            keep
        });

        for upload in uploads {
            if self.scene_meshes.contains_key(&upload.id) {
                continue;
            }
            if let Some(gpu) = log_upload(upload_mesh(gl, &upload.geometry, upload.color)) {
                self.scene_meshes.insert(upload.id.clone(), gpu);
            }
        }
    }

    /// Re-upload the overlay when its generation changed
    pub fn sync_overlay(&mut self, gl: &glow::Context, generation: u64, overlay: Option<&OverlayDraw>) {
        if generation == self.overlay_generation {
            return;
        }
        self.overlay_generation = generation;

        if let Some(old) = self.overlay.take() {
            delete_lines(gl, &old);
        }
        if let Some(draw) = overlay {
            let data = LineMeshData {
                vertices: draw.vertices.clone(),
            };
            self.overlay = log_upload(upload_lines(gl, &data, glow::TRIANGLES));
        }
    }

    /// Upload or remove gizmo lines
    pub fn sync_gizmo(&mut self, gl: &glow::Context, data: Option<&LineMeshData>) {
        if let Some(old) = self.gizmo.take() {
            delete_lines(gl, &old);
        }
        if let Some(line_data) = data {
            self.gizmo = log_upload(upload_lines(gl, line_data, glow::LINES));
        }
    }

    /// Render the scene
    pub fn paint(
        &self,
        gl: &glow::Context,
        camera: &OrbitCamera,
        params: &RenderParams,
        objects: &[ObjectDraw],
        overlay: Option<&OverlayDraw>,
    ) {
        let aspect = params.viewport[2] / params.viewport[3].max(1.0);
        let vp = camera.view_projection(aspect);

        unsafe {
            gl.viewport(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.scissor(
                params.viewport[0] as i32,
                params.viewport[1] as i32,
                params.viewport[2] as i32,
                params.viewport[3] as i32,
            );
            gl.enable(glow::SCISSOR_TEST);

            gl.clear_color(
                params.bg_color[0] as f32 / 255.0,
                params.bg_color[1] as f32 / 255.0,
                params.bg_color[2] as f32 / 255.0,
                1.0,
            );
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LESS);

            // Grid
            gl.use_program(Some(self.line_program));
            set_uniform_mat4(gl, self.line_program, "u_mvp", &vp);
            set_uniform_mat4(gl, self.line_program, "u_model", &Mat4::IDENTITY);
            if params.grid_visible {
                if let Some(ref grid) = self.grid {
                    draw_lines(gl, grid);
                }
            }

            // Scene meshes
            gl.use_program(Some(self.mesh_program));
            set_uniform_mat4(gl, self.mesh_program, "u_mvp", &vp);
            set_uniform_vec3(gl, self.mesh_program, "u_light_dir", &params.light_dir);
            set_uniform_f32(gl, self.mesh_program, "u_ambient", params.ambient);
            set_uniform_f32(gl, self.mesh_program, "u_diffuse", params.light_intensity);

            for object in objects {
                if let Some(mesh) = self.scene_meshes.get(&object.id) {
                    set_uniform_mat4(gl, self.mesh_program, "u_model", &object.model);
                    draw_mesh(gl, mesh);
                }
            }

            // Overlay: translucent, both sides, on top of the surface
            if let (Some(gpu), Some(draw)) = (&self.overlay, overlay) {
                gl.disable(glow::DEPTH_TEST);
                gl.disable(glow::CULL_FACE);
                gl.enable(glow::BLEND);
                gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
                gl.use_program(Some(self.line_program));
                set_uniform_mat4(gl, self.line_program, "u_mvp", &vp);
                set_uniform_mat4(gl, self.line_program, "u_model", &draw.model);
                draw_lines(gl, gpu);
                gl.disable(glow::BLEND);
                gl.enable(glow::DEPTH_TEST);
            }

            // Gizmo on top (no depth test so it's always visible)
            if let Some(ref gizmo) = self.gizmo {
                gl.disable(glow::DEPTH_TEST);
                gl.use_program(Some(self.line_program));
                set_uniform_mat4(gl, self.line_program, "u_mvp", &vp);
                set_uniform_mat4(gl, self.line_program, "u_model", &Mat4::IDENTITY);
                gl.line_width(3.0);
                draw_lines(gl, gizmo);
                gl.line_width(1.0);
            }

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn log_upload<T>(result: Result<T, String>) -> Option<T> {
    result
        .map_err(|e| tracing::error!("GPU upload failed: {e}"))
        .ok()
}

fn upload_mesh(gl: &glow::Context, data: &GeometryBuffer, color: [f32; 3]) -> Result<GpuMesh, String> {
    let vertices = data.interleaved(color);
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, bytemuck_cast_slice(&vertices), glow::STATIC_DRAW);

        let stride = 9 * 4; // 9 floats * 4 bytes
        // position: location 0
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal: location 1
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // color: location 2
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(
            glow::ELEMENT_ARRAY_BUFFER,
            bytemuck_cast_slice(&data.indices),
            glow::STATIC_DRAW,
        );

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

/// Upload [pos(3), color(4)] vertices drawn with `mode` (lines or triangles)
fn upload_lines(gl: &glow::Context, data: &LineMeshData, mode: u32) -> Result<GpuLines, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(
            glow::ARRAY_BUFFER,
            bytemuck_cast_slice(&data.vertices),
            glow::STATIC_DRAW,
        );

        let stride = 7 * 4; // 7 floats * 4 bytes
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 4, glow::FLOAT, false, stride, 3 * 4);

        gl.bind_vertex_array(None);

        Ok(GpuLines {
            vao,
            vbo,
            vertex_count: (data.vertices.len() / 7) as i32,
            mode,
        })
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

fn delete_lines(gl: &glow::Context, lines: &GpuLines) {
    unsafe {
        gl.delete_vertex_array(lines.vao);
        gl.delete_buffer(lines.vbo);
    }
}

// ── Draw calls ───────────────────────────────────────────────

unsafe fn draw_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    gl.bind_vertex_array(Some(mesh.vao));
    gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
    gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
    gl.bind_vertex_array(None);
}

unsafe fn draw_lines(gl: &glow::Context, lines: &GpuLines) {
    gl.bind_vertex_array(Some(lines.vao));
    gl.draw_arrays(lines.mode, 0, lines.vertex_count);
    gl.bind_vertex_array(None);
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;

        let vert = gl.create_shader(glow::VERTEX_SHADER)?;
        gl.shader_source(vert, vert_src);
        gl.compile_shader(vert);
        if !gl.get_shader_compile_status(vert) {
            let log = gl.get_shader_info_log(vert);
            tracing::error!("Vertex shader error: {log}");
        }

        let frag = gl.create_shader(glow::FRAGMENT_SHADER)?;
        gl.shader_source(frag, frag_src);
        gl.compile_shader(frag);
        if !gl.get_shader_compile_status(frag) {
            let log = gl.get_shader_info_log(frag);
            tracing::error!("Fragment shader error: {log}");
        }

        gl.attach_shader(program, vert);
        gl.attach_shader(program, frag);
        gl.link_program(program);
        if !gl.get_program_link_status(program) {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
        }

        gl.delete_shader(vert);
        gl.delete_shader(frag);

        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: &Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

// ── Byte cast helper ─────────────────────────────────────────

fn bytemuck_cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

const MESH_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;
uniform mat4 u_model;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_normal;
out vec3 v_color;

void main() {
    gl_Position = u_mvp * u_model * vec4(a_position, 1.0);
    v_normal = transpose(inverse(mat3(u_model))) * a_normal;
    v_color = a_color;
}
"#;

const MESH_FRAG: &str = r#"#version 330 core
uniform vec3 u_light_dir;
uniform float u_ambient;
uniform float u_diffuse;

in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    float diffuse = max(dot(n, u_light_dir), 0.0);
    float light = u_ambient + diffuse * u_diffuse;
    frag_color = vec4(v_color * min(light, 1.0), 1.0);
}
"#;

const LINE_VERT: &str = r#"#version 330 core
uniform mat4 u_mvp;
uniform mat4 u_model;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec4 a_color;

out vec4 v_color;

void main() {
    gl_Position = u_mvp * u_model * vec4(a_position, 1.0);
    v_color = a_color;
}
"#;

const LINE_FRAG: &str = r#"#version 330 core
in vec4 v_color;
out vec4 frag_color;

void main() {
    frag_color = v_color;
}
"#;
