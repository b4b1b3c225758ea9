//! Lab configuration
//!
//! Plain structs with defaults. Logging verbosity comes from `RUST_LOG`.

use glam::Vec3;

/// Window setup for the binary
#[derive(Debug, Clone)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Alchemy Lab - Rust/wgpu".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

/// The inline 2D reaction preview
#[derive(Debug, Clone, Copy)]
pub struct PreviewConfig {
    /// Canvas size in canvas units (pixels at scale 1)
    pub width: f32,
    pub height: f32,
    /// New particles are emitted only before this point
    pub spawn_window_ms: f64,
    /// The run finishes and reports completion at this point
    pub run_duration_ms: f64,
    pub capacity: usize,
    /// Gap between the preview and the window corner, in pixels
    pub margin: f32,
}

impl Default for PreviewConfig {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 300.0,
            spawn_window_ms: 3000.0,
            run_duration_ms: 4000.0,
            capacity: 1024,
            margin: 16.0,
        }
    }
}

/// Camera, lights and idle motion of the 3D scene
#[derive(Debug, Clone, Copy)]
pub struct SceneConfig {
    pub fov_degrees: f32,
    pub camera_position: Vec3,
    pub camera_target: Vec3,
    /// Radians per frame around (x, y)
    pub idle_spin: (f32, f32),
    pub bob_amplitude: f32,
    /// Scale a freshly inserted molecule starts from
    pub entry_scale: f32,
    /// Per-frame multiplier applied until the molecule reaches full size
    pub entry_growth: f32,
}

impl Default for SceneConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            camera_position: Vec3::new(0.0, 2.0, 8.0),
            camera_target: Vec3::ZERO,
            idle_spin: (0.002, 0.004),
            bob_amplitude: 0.1,
            entry_scale: 0.1,
            entry_growth: 1.05,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct LabConfig {
    pub window: WindowConfig,
    pub preview: PreviewConfig,
    pub scene: SceneConfig,
}
