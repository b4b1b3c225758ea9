//! 3D scene lifecycle
//!
//! Owns the camera, the lights and at most one molecule. Every trigger
//! disposes the previous molecule before anything new is inserted, and
//! `cleanup` tears everything down exactly once.

use common::Camera3D;
use glam::{EulerRot, Quat, Vec2, Vec3};
use thiserror::Error;

use crate::category::AnimationCategory;
use crate::config::SceneConfig;
use crate::molecule::{
    DisposeReport, Molecule, MoleculeGraph, MoleculeLibrary, PlacedLight, PointLight, ResourceReleaser,
};

/// Everything the scene needs from whatever draws it
pub trait SceneBackend: ResourceReleaser {
    /// Size of the drawing area, `None` when there is nothing to draw into
    fn container_size(&self) -> Option<(u32, u32)>;
    fn resize(&mut self, width: u32, height: u32);
    fn render(&mut self, frame: &SceneFrame<'_>);
    /// A freshly built molecule has entered the scene
    fn attach(&mut self, _graph: &MoleculeGraph) {}
    /// Drop renderer resources and the surface
    fn release(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum SceneError {
    #[error("scene has no container to render into")]
    MissingContainer,

    #[error("scene container has no area ({width}x{height})")]
    EmptyContainer { width: u32, height: u32 },
}

/// Ambient, one directional light and the cyan accent light
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Lights {
    pub ambient_color: [f32; 3],
    pub ambient_intensity: f32,
    pub directional_color: [f32; 3],
    /// Unit vector pointing toward the light
    pub directional_direction: Vec3,
    pub directional_intensity: f32,
    pub accent: PlacedLight,
}

impl Default for Lights {
    fn default() -> Self {
        Self {
            ambient_color: common::hex_rgb(0x404040),
            ambient_intensity: 0.6,
            directional_color: [1.0; 3],
            directional_direction: Vec3::new(10.0, 10.0, 5.0).normalize(),
            directional_intensity: 1.5,
            accent: PlacedLight {
                position: Vec3::new(0.0, 5.0, 5.0),
                light: PointLight {
                    color: common::hex_rgb(0x00ffff),
                    intensity: 0.5,
                    range: 50.0,
                },
            },
        }
    }
}

impl Lights {
    pub fn pulse(&mut self, now_ms: f64) {
        self.directional_intensity = 1.3 + (now_ms * 0.002).sin() as f32 * 0.2;
        self.ambient_intensity = 0.6 + (now_ms * 0.003).sin() as f32 * 0.1;
    }
}

/// One frame handed to the backend
pub struct SceneFrame<'a> {
    pub now_ms: f64,
    pub camera: &'a Camera3D,
    pub lights: &'a Lights,
    pub molecule: Option<&'a MoleculeGraph>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A new molecule was built and inserted
    Inserted,
    /// No category was given, the scene is empty
    Cleared,
    /// The category has no builder, the scene is empty
    NoBuilder,
    /// The scene was already cleaned up
    Rejected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TriggerReport {
    pub outcome: TriggerOutcome,
    /// What disposing the previous molecule released
    pub retired: Option<DisposeReport>,
}

impl TriggerReport {
    pub fn inserted(&self) -> bool {
        self.outcome == TriggerOutcome::Inserted
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoopState {
    Idle,
    Running,
    Stopped,
}

struct Active {
    molecule: Molecule,
    inserted_at_ms: Option<f64>,
    scale: f32,
    spin: Vec2,
}

pub struct SceneManager<B: SceneBackend> {
    backend: B,
    config: SceneConfig,
    library: MoleculeLibrary,
    camera: Camera3D,
    lights: Lights,
    active: Option<Active>,
    generation: u64,
    state: LoopState,
    resize_registered: bool,
    released: bool,
}

impl<B: SceneBackend> SceneManager<B> {
    pub fn new(backend: B, config: SceneConfig, library: MoleculeLibrary) -> Result<Self, SceneError> {
        let (width, height) = backend.container_size().ok_or(SceneError::MissingContainer)?;
        if width == 0 || height == 0 {
            return Err(SceneError::EmptyContainer { width, height });
        }

        let camera = Camera3D::looking_at(
            config.camera_position,
            config.camera_target,
            config.fov_degrees,
            width as f32 / height as f32,
        );
        log::info!("Scene ready at {}x{}", width, height);

        Ok(Self {
            backend,
            config,
            library,
            camera,
            lights: Lights::default(),
            active: None,
            generation: 0,
            state: LoopState::Idle,
            resize_registered: true,
            released: false,
        })
    }

    pub fn start(&mut self) {
        if self.state == LoopState::Idle {
            self.state = LoopState::Running;
        }
    }

    pub fn is_running(&self) -> bool {
        self.state == LoopState::Running
    }

    pub fn is_cleaned_up(&self) -> bool {
        self.state == LoopState::Stopped
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn backend_mut(&mut self) -> &mut B {
        &mut self.backend
    }

    pub fn camera(&self) -> &Camera3D {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera3D {
        &mut self.camera
    }

    pub fn lights(&self) -> &Lights {
        &self.lights
    }

    pub fn molecule(&self) -> Option<&Molecule> {
        self.active.as_ref().map(|a| &a.molecule)
    }

    /// Current scale of the inserted molecule's root
    pub fn molecule_scale(&self) -> Option<f32> {
        self.active.as_ref().map(|a| a.scale)
    }

    /// Time since the current molecule's first frame
    pub fn molecule_age_ms(&self, now_ms: f64) -> Option<f64> {
        let inserted_at = self.active.as_ref()?.inserted_at_ms?;
        Some((now_ms - inserted_at).max(0.0))
    }

    /// Advance one frame and hand it to the backend. Returns whether anything
    /// was rendered.
    pub fn frame(&mut self, now_ms: f64) -> bool {
        if self.state != LoopState::Running {
            return false;
        }

        if let Some(active) = self.active.as_mut() {
            let (spin_x, spin_y) = self.config.idle_spin;
            active.spin += Vec2::new(spin_x, spin_y);
            if active.scale < 1.0 {
                active.scale = (active.scale * self.config.entry_growth).min(1.0);
            }
            let inserted_at = *active.inserted_at_ms.get_or_insert(now_ms);

            let graph = active.molecule.graph_mut();
            let root = graph.root();
            let transform = graph.transform_mut(root);
            transform.rotation = Quat::from_euler(EulerRot::XYZ, active.spin.x, active.spin.y, 0.0);
            transform.translation.y = (now_ms * 0.001).sin() as f32 * self.config.bob_amplitude;
            transform.scale = Vec3::splat(active.scale);

            active.molecule.update((now_ms - inserted_at) as f32);
        }
        self.lights.pulse(now_ms);

        let frame = SceneFrame {
            now_ms,
            camera: &self.camera,
            lights: &self.lights,
            molecule: self.active.as_ref().map(|a| a.molecule.graph()),
        };
        self.backend.render(&frame);
        true
    }

    /// Replace the scene content with the molecule for `category`
    pub fn trigger_reaction(&mut self, category: Option<AnimationCategory>) -> TriggerReport {
        if self.state == LoopState::Stopped {
            log::warn!("Ignoring reaction {:?} after cleanup", category);
            return TriggerReport {
                outcome: TriggerOutcome::Rejected,
                retired: None,
            };
        }

        let retired = self.retire();
        let Some(category) = category else {
            return TriggerReport {
                outcome: TriggerOutcome::Cleared,
                retired,
            };
        };

        self.generation += 1;
        match self.library.build(category, self.generation) {
            Some(molecule) => {
                log::info!(
                    "Inserted {} molecule ({} nodes, {} geometries, {} materials)",
                    category,
                    molecule.graph().node_count(),
                    molecule.graph().geometry_count(),
                    molecule.graph().material_count()
                );
                self.backend.attach(molecule.graph());
                self.active = Some(Active {
                    molecule,
                    inserted_at_ms: None,
                    scale: self.config.entry_scale,
                    spin: Vec2::ZERO,
                });
                TriggerReport {
                    outcome: TriggerOutcome::Inserted,
                    retired,
                }
            }
            None => {
                log::warn!("No 3D animation for category {}", category);
                TriggerReport {
                    outcome: TriggerOutcome::NoBuilder,
                    retired,
                }
            }
        }
    }

    fn retire(&mut self) -> Option<DisposeReport> {
        let mut active = self.active.take()?;
        let report = active.molecule.dispose(&mut self.backend);
        log::debug!(
            "Disposed {} molecule: {} geometries, {} materials, {} nodes",
            active.molecule.category(),
            report.geometries,
            report.materials,
            report.nodes
        );
        Some(report)
    }

    /// Follow the container size. Ignored after cleanup and for empty sizes.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.resize_registered || width == 0 || height == 0 {
            return;
        }
        self.camera.update_aspect_ratio(width as f32 / height as f32);
        self.backend.resize(width, height);
    }

    /// Stop the loop, dispose the molecule and release the backend. Safe to
    /// call more than once.
    pub fn cleanup(&mut self) {
        self.state = LoopState::Stopped;
        self.resize_registered = false;
        self.retire();
        if !self.released {
            self.released = true;
            self.backend.release();
            log::info!("Scene cleaned up");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::molecule::{GeometryId, MaterialId};

    #[derive(Debug, Clone, PartialEq)]
    enum Event {
        Geometry(GeometryId),
        Material(MaterialId),
        Render { generation: Option<u64> },
        Attach(u64),
        Resize(u32, u32),
        Release,
    }

    struct Recording {
        size: Option<(u32, u32)>,
        events: Vec<Event>,
    }

    impl Recording {
        fn new(width: u32, height: u32) -> Self {
            Self {
                size: Some((width, height)),
                events: Vec::new(),
            }
        }

        fn released_geometries(&self) -> Vec<GeometryId> {
            self.events
                .iter()
                .filter_map(|e| match e {
                    Event::Geometry(id) => Some(*id),
                    _ => None,
                })
                .collect()
        }

        fn count(&self, f: impl Fn(&Event) -> bool) -> usize {
            self.events.iter().filter(|e| f(e)).count()
        }
    }

    impl ResourceReleaser for Recording {
        fn release_geometry(&mut self, id: GeometryId) {
            self.events.push(Event::Geometry(id));
        }

        fn release_material(&mut self, id: MaterialId) {
            self.events.push(Event::Material(id));
        }
    }

    impl SceneBackend for Recording {
        fn container_size(&self) -> Option<(u32, u32)> {
            self.size
        }

        fn resize(&mut self, width: u32, height: u32) {
            self.events.push(Event::Resize(width, height));
        }

        fn render(&mut self, frame: &SceneFrame<'_>) {
            self.events.push(Event::Render {
                generation: frame.molecule.map(|g| g.generation()),
            });
        }

        fn attach(&mut self, graph: &MoleculeGraph) {
            self.events.push(Event::Attach(graph.generation()));
        }

        fn release(&mut self) {
            self.events.push(Event::Release);
        }
    }

    fn scene() -> SceneManager<Recording> {
        SceneManager::new(Recording::new(800, 600), SceneConfig::default(), MoleculeLibrary::standard()).unwrap()
    }

    #[test]
    fn test_construction_needs_a_container() {
        let missing = Recording { size: None, events: Vec::new() };
        let result = SceneManager::new(missing, SceneConfig::default(), MoleculeLibrary::standard());
        assert_eq!(result.err(), Some(SceneError::MissingContainer));

        let flat = Recording::new(800, 0);
        let result = SceneManager::new(flat, SceneConfig::default(), MoleculeLibrary::standard());
        assert_eq!(result.err(), Some(SceneError::EmptyContainer { width: 800, height: 0 }));
        assert_eq!(
            SceneError::EmptyContainer { width: 800, height: 0 }.to_string(),
            "scene container has no area (800x0)"
        );
    }

    #[test]
    fn test_camera_starts_behind_and_above() {
        let scene = scene();
        let camera = scene.camera();
        assert!((camera.position - Vec3::new(0.0, 2.0, 8.0)).length() < 1e-4);
        assert!((camera.fov - 75f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn test_frames_are_inert_until_started() {
        let mut scene = scene();
        assert!(!scene.frame(0.0));
        scene.start();
        assert!(scene.frame(16.0));
        assert_eq!(scene.backend().count(|e| matches!(e, Event::Render { .. })), 1);
    }

    #[test]
    fn test_dispose_before_replace() {
        let mut scene = scene();
        scene.start();

        let first = scene.trigger_reaction(Some(AnimationCategory::Water));
        assert!(first.inserted());
        assert!(first.retired.is_none());
        let water_geometries = scene.molecule().unwrap().graph().geometry_count();
        scene.frame(0.0);

        let second = scene.trigger_reaction(Some(AnimationCategory::Salt));
        assert!(second.inserted());
        let retired = second.retired.unwrap();
        assert_eq!(retired.geometries, water_geometries);

        let released = scene.backend().released_geometries();
        assert_eq!(released.len(), water_geometries);
        assert!(released.iter().all(|id| id.generation == 1));
        assert_eq!(scene.molecule().unwrap().category(), AnimationCategory::Salt);
        assert_eq!(scene.molecule().unwrap().graph().generation(), 2);

        let events = &scene.backend().events;
        let attached = |generation| events.iter().position(|e| *e == Event::Attach(generation));
        let (Some(water), Some(salt)) = (attached(1), attached(2)) else {
            panic!("both molecules should have been attached");
        };
        let first_release = events.iter().position(|e| matches!(e, Event::Geometry(_)));
        let last_release = events.iter().rposition(|e| matches!(e, Event::Geometry(_) | Event::Material(_)));
        assert!(first_release.is_some_and(|i| i > water));
        assert!(last_release.is_some_and(|i| i < salt));

        scene.frame(16.0);
        let last = scene.backend().events.last().cloned();
        assert_eq!(last, Some(Event::Render { generation: Some(2) }));
    }

    #[test]
    fn test_none_clears_the_scene() {
        let mut scene = scene();
        scene.trigger_reaction(Some(AnimationCategory::Methane));
        let report = scene.trigger_reaction(None);
        assert_eq!(report.outcome, TriggerOutcome::Cleared);
        assert!(report.retired.is_some());
        assert!(scene.molecule().is_none());
    }

    #[test]
    fn test_missing_builder_inserts_nothing() {
        let library = MoleculeLibrary::standard().without(AnimationCategory::Crystal);
        let mut scene = SceneManager::new(Recording::new(640, 480), SceneConfig::default(), library).unwrap();
        scene.trigger_reaction(Some(AnimationCategory::Water));
        let report = scene.trigger_reaction(Some(AnimationCategory::Crystal));
        assert_eq!(report.outcome, TriggerOutcome::NoBuilder);
        assert!(report.retired.is_some());
        assert!(scene.molecule().is_none());
    }

    #[test]
    fn test_entry_transition_grows_to_full_size() {
        let mut scene = scene();
        scene.start();
        scene.trigger_reaction(Some(AnimationCategory::Water));
        assert_eq!(scene.molecule_scale(), Some(0.1));

        scene.frame(0.0);
        assert!((scene.molecule_scale().unwrap() - 0.105).abs() < 1e-6);
        for i in 1..100 {
            scene.frame(i as f64 * 16.0);
        }
        assert_eq!(scene.molecule_scale(), Some(1.0));
        let root = scene.molecule().unwrap().graph().root();
        let transform = scene.molecule().unwrap().graph().node(root).transform;
        assert_eq!(transform.scale, Vec3::ONE);
    }

    #[test]
    fn test_lights_pulse_within_bounds() {
        let mut scene = scene();
        scene.start();
        for i in 0..200 {
            scene.frame(i as f64 * 37.0);
            let lights = scene.lights();
            assert!((1.099..=1.501).contains(&lights.directional_intensity));
            assert!((0.499..=0.701).contains(&lights.ambient_intensity));
        }
    }

    #[test]
    fn test_molecule_age_starts_at_first_frame() {
        let mut scene = scene();
        scene.start();
        scene.trigger_reaction(Some(AnimationCategory::MagnesiumOxide));
        assert_eq!(scene.molecule_age_ms(500.0), None);
        scene.frame(1000.0);
        scene.frame(3500.0);
        assert_eq!(scene.molecule_age_ms(3500.0), Some(2500.0));
        let stage = scene.molecule().unwrap().stage(2500.0).unwrap();
        assert_eq!(stage.index, 1);
    }

    #[test]
    fn test_resize_updates_camera_and_backend() {
        let mut scene = scene();
        scene.resize(1000, 500);
        scene.resize(0, 500);
        assert_eq!(scene.camera().aspect_ratio, 2.0);
        assert_eq!(scene.backend().count(|e| matches!(e, Event::Resize(..))), 1);
    }

    #[test]
    fn test_cleanup_is_idempotent() {
        let mut scene = scene();
        scene.start();
        scene.trigger_reaction(Some(AnimationCategory::Radioactive));
        let geometries = scene.molecule().unwrap().graph().geometry_count();
        let materials = scene.molecule().unwrap().graph().material_count();

        scene.cleanup();
        scene.cleanup();

        let backend = scene.backend();
        assert_eq!(backend.count(|e| matches!(e, Event::Release)), 1);
        assert_eq!(backend.count(|e| matches!(e, Event::Geometry(_))), geometries);
        assert_eq!(backend.count(|e| matches!(e, Event::Material(_))), materials);
        assert!(scene.molecule().is_none());
        assert!(scene.is_cleaned_up());

        assert!(!scene.frame(100.0));
        scene.resize(10, 10);
        let report = scene.trigger_reaction(Some(AnimationCategory::Water));
        assert_eq!(report.outcome, TriggerOutcome::Rejected);
        assert!(scene.molecule().is_none());
        assert_eq!(scene.backend().count(|e| matches!(e, Event::Resize(..))), 0);
    }
}
