//! Interactive alchemy lab
//!
//! Element and reaction data, the resolver that turns a pair of elements into
//! an outcome, the 2D preview particle system, the 3D molecule library and the
//! scene manager that swaps molecules in and out, plus the wgpu and egui
//! front ends used by the binary.

pub mod category;
pub mod config;
pub mod elements;
pub mod lab_ui;
pub mod mesh;
pub mod molecule;
pub mod particles;
pub mod preview;
pub mod reactions;
pub mod renderer;
pub mod resolver;
pub mod scene;
pub mod session;

pub use category::AnimationCategory;
pub use elements::{Element, ElementCategory, ElementTable};
pub use reactions::{canonical_key, Reaction, ReactionCatalog};
pub use resolver::{ReactionResolver, ResolvedOutcome};
pub use scene::{SceneBackend, SceneError, SceneManager};
pub use session::LabSession;
