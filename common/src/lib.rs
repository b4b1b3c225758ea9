//! Common utilities for the lab's renderers
//!
//! This crate provides shared graphics setup, camera controls, color helpers and
//! buffer utilities used by the 3D molecule scene and the 2D reaction preview.

pub mod graphics;
pub mod camera;
pub mod color;

pub use graphics::*;
pub use camera::*;
pub use color::*;

/// Frame timing shared by every frame-driven animation
pub mod constants {
    /// Reference frame rate that per-frame rates are authored against
    pub const TARGET_FPS: f32 = 60.0;

    /// Duration of one reference frame in milliseconds
    pub const FRAME_MS: f32 = 1000.0 / TARGET_FPS;

    /// Number of reference frames that fit in `elapsed_ms`
    pub fn frames_in(elapsed_ms: f32) -> f32 {
        (elapsed_ms * TARGET_FPS / 1000.0).max(0.0)
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_frames_in_whole_seconds_are_exact() {
            assert_eq!(frames_in(0.0), 0.0);
            assert_eq!(frames_in(1000.0), 60.0);
            assert_eq!(frames_in(2000.0), 120.0);
            assert_eq!(frames_in(3000.0), 180.0);
            assert_eq!(frames_in(6000.0), 360.0);
            assert_eq!(frames_in(7000.0), 420.0);
        }

        #[test]
        fn test_frames_in_clamps_negative() {
            assert_eq!(frames_in(-500.0), 0.0);
            assert!((frames_in(FRAME_MS) - 1.0).abs() < 1e-5);
        }
    }
}
