//! 2D reaction preview particles
//!
//! A small canvas-space particle system: each frame the active category emits a
//! handful of particles, every particle moves, fades and is drawn by one rule per
//! kind, and dead particles are dropped. Canvas coordinates have y pointing down.
//!
//! `ParticleRun` adds the timing of one preview: emit for a while, let the
//! remaining particles drain, then report completion once.

use glam::Vec2;
use rand::Rng;
use std::f32::consts::PI;

use common::{hsl, rgba, with_alpha, Rgba};

use crate::category::AnimationCategory;
use crate::config::PreviewConfig;

/// Downward acceleration for bubbles and smoke, per frame
pub const GRAVITY: f32 = 0.1;
/// Radius around the canvas center inside which repelling particles are pushed out
pub const REPULSION_RADIUS: f32 = 30.0;
pub const REPULSION_FORCE: f32 = 0.4;
pub const REPULSION_DAMPING: f32 = 0.98;
/// Restitution when a repelling particle hits a canvas edge
pub const EDGE_BOUNCE: f32 = 0.8;

/// Background wash painted under every preview frame
pub const PREVIEW_BACKGROUND: [u8; 3] = [17, 24, 39];
pub const PREVIEW_FADE: f32 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParticleKind {
    Spark,
    Smoke,
    Bubble,
    Flame,
    Crystal,
    Toxic,
}

impl ParticleKind {
    pub fn falls(&self) -> bool {
        matches!(self, ParticleKind::Bubble | ParticleKind::Smoke)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Particle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub size: f32,
    pub color: Rgba,
    pub life: u32,
    pub max_life: u32,
    pub kind: ParticleKind,
}

impl Particle {
    fn new(kind: ParticleKind, position: Vec2, velocity: Vec2, size: f32, color: Rgba, life: u32) -> Self {
        Self {
            position,
            velocity,
            size,
            color,
            life,
            max_life: life,
            kind,
        }
    }

    /// Remaining life as a fraction of the starting life
    pub fn alpha(&self) -> f32 {
        if self.max_life == 0 {
            0.0
        } else {
            self.life as f32 / self.max_life as f32
        }
    }

    /// How this particle looks right now
    pub fn sprite(&self) -> Sprite {
        let alpha = self.alpha();
        let faded = |factor: f32| with_alpha(self.color, self.color[3] * factor);

        match self.kind {
            ParticleKind::Spark => Sprite {
                center: self.position,
                radius: self.size * alpha,
                shape: SpriteShape::Disc,
                color: faded(alpha),
                glow: Some(Glow { blur: 20.0, color: faded(alpha) }),
            },
            ParticleKind::Smoke => Sprite {
                center: self.position,
                radius: self.size,
                shape: SpriteShape::Disc,
                color: faded(alpha * 0.7),
                glow: None,
            },
            ParticleKind::Bubble => Sprite {
                center: self.position,
                radius: self.size,
                shape: SpriteShape::Ring { stroke: 2.0, fill_alpha: 0.1 },
                color: faded(alpha),
                glow: None,
            },
            ParticleKind::Flame => Sprite {
                center: self.position,
                radius: self.size,
                shape: SpriteShape::Disc,
                color: faded(alpha),
                glow: Some(Glow {
                    blur: 15.0,
                    color: with_alpha(common::hex(0xff4500), alpha),
                }),
            },
            ParticleKind::Crystal => Sprite {
                center: self.position,
                radius: self.size * 0.5,
                shape: SpriteShape::Square,
                color: faded(alpha),
                glow: None,
            },
            ParticleKind::Toxic => Sprite {
                center: self.position,
                radius: self.size,
                shape: SpriteShape::Disc,
                color: faded(alpha * 0.8),
                glow: Some(Glow { blur: 10.0, color: faded(alpha * 0.8) }),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SpriteShape {
    Disc,
    /// Outline of `stroke` width over a fill at `fill_alpha` of the stroke's alpha
    Ring { stroke: f32, fill_alpha: f32 },
    /// Axis-aligned square, `radius` is half the side
    Square,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Glow {
    pub blur: f32,
    pub color: Rgba,
}

/// One draw call worth of particle, in canvas coordinates
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub center: Vec2,
    pub radius: f32,
    pub shape: SpriteShape,
    pub color: Rgba,
    pub glow: Option<Glow>,
}

/// Drawing surface for the preview
pub trait Canvas2D {
    /// Paint a translucent wash over the whole canvas
    fn wash(&mut self, color: Rgba);
    fn draw(&mut self, sprite: Sprite);
}

/// Records sprites for a renderer to upload later
#[derive(Debug, Default, Clone)]
pub struct SpriteList {
    pub background: Option<Rgba>,
    pub sprites: Vec<Sprite>,
}

impl SpriteList {
    pub fn clear(&mut self) {
        self.background = None;
        self.sprites.clear();
    }
}

impl Canvas2D for SpriteList {
    fn wash(&mut self, color: Rgba) {
        self.background = Some(color);
    }

    fn draw(&mut self, sprite: Sprite) {
        self.sprites.push(sprite);
    }
}

/// What the spawn rules need to know about the canvas and the reactants
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnContext {
    pub width: f32,
    pub height: f32,
    /// Display colors of the two reactants
    pub reactant_colors: [Rgba; 2],
}

impl SpawnContext {
    pub fn new(width: f32, height: f32, reactant_colors: [Rgba; 2]) -> Self {
        Self {
            width,
            height,
            reactant_colors,
        }
    }

    fn center(&self) -> Vec2 {
        Vec2::new(self.width * 0.5, self.height * 0.5)
    }
}

/// Emission pattern; several categories share one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpawnRule {
    Droplets,
    SaltGrains,
    Gems,
    Soot,
    WhiteSparks,
    Flames,
    RustFlakes,
    AmmoniaFumes,
    MethaneBubbles,
    SulfurFumes,
    Repulsion,
    Glitter,
    PoisonCloud,
    Radiation,
    Generic,
}

impl SpawnRule {
    pub fn for_category(category: AnimationCategory) -> Self {
        use AnimationCategory as A;
        match category {
            A::Water => SpawnRule::Droplets,
            A::Salt => SpawnRule::SaltGrains,
            A::Crystal => SpawnRule::Gems,
            A::CarbonMonoxide | A::CarbonDioxide => SpawnRule::Soot,
            A::MagnesiumOxide | A::AluminumOxide | A::CalciumOxide => SpawnRule::WhiteSparks,
            A::CopperOxide => SpawnRule::Flames,
            A::IronOxide => SpawnRule::RustFlakes,
            A::Ammonia => SpawnRule::AmmoniaFumes,
            A::Methane => SpawnRule::MethaneBubbles,
            A::HydrogenSulfide => SpawnRule::SulfurFumes,
            A::Impossible => SpawnRule::Repulsion,
            A::Alloy => SpawnRule::Glitter,
            A::Dangerous => SpawnRule::PoisonCloud,
            A::Radioactive => SpawnRule::Radiation,
            A::SiliconDioxide
            | A::SulfurDioxide
            | A::PhosphorusPentoxide
            | A::TitaniumOxide
            | A::ZincOxide
            | A::RareEarthOxide => SpawnRule::Generic,
        }
    }

    /// Particles emitted per spawn call
    pub fn count(&self) -> usize {
        match self {
            SpawnRule::Droplets => 3,
            SpawnRule::SaltGrains | SpawnRule::Gems => 2,
            SpawnRule::Soot => 4,
            SpawnRule::WhiteSparks => 8,
            SpawnRule::Flames => 6,
            SpawnRule::RustFlakes => 5,
            SpawnRule::AmmoniaFumes => 6,
            SpawnRule::MethaneBubbles => 4,
            SpawnRule::SulfurFumes => 5,
            SpawnRule::Repulsion => 4,
            SpawnRule::Glitter => 6,
            SpawnRule::PoisonCloud => 7,
            SpawnRule::Radiation => 8,
            SpawnRule::Generic => 4,
        }
    }

    pub fn spawn<R: Rng + ?Sized>(&self, ctx: &SpawnContext, rng: &mut R) -> Vec<Particle> {
        let center = ctx.center();
        (0..self.count()).map(|i| self.spawn_one(i, center, ctx, rng)).collect()
    }

    fn spawn_one<R: Rng + ?Sized>(&self, index: usize, center: Vec2, ctx: &SpawnContext, rng: &mut R) -> Particle {
        let c = center;

        match self {
            SpawnRule::Droplets => Particle::new(
                ParticleKind::Bubble,
                Vec2::new(c.x + jitter(rng, 100.0), c.y - 50.0),
                Vec2::new(jitter(rng, 2.0), rng.gen::<f32>() * 3.0 + 2.0),
                rng.gen::<f32>() * 8.0 + 4.0,
                hsl(200.0, 0.8, 0.5 + rng.gen::<f32>() * 0.3),
                60,
            ),
            SpawnRule::SaltGrains => Particle::new(
                ParticleKind::Crystal,
                Vec2::new(c.x + jitter(rng, 80.0), c.y + jitter(rng, 80.0)),
                Vec2::ZERO,
                rng.gen::<f32>() * 6.0 + 3.0,
                hsl(0.0, 0.0, 0.8 + rng.gen::<f32>() * 0.2),
                120,
            ),
            SpawnRule::Gems => Particle::new(
                ParticleKind::Crystal,
                Vec2::new(c.x + jitter(rng, 80.0), c.y + jitter(rng, 80.0)),
                Vec2::ZERO,
                rng.gen::<f32>() * 6.0 + 3.0,
                hsl(190.0 + rng.gen::<f32>() * 30.0, 0.7, 0.7 + rng.gen::<f32>() * 0.2),
                120,
            ),
            SpawnRule::Soot => Particle::new(
                ParticleKind::Smoke,
                Vec2::new(c.x + jitter(rng, 60.0), c.y),
                Vec2::new(jitter(rng, 1.0), -rng.gen::<f32>() * 2.0 - 1.0),
                rng.gen::<f32>() * 15.0 + 8.0,
                rgba(60, 60, 60, 0.6 + rng.gen::<f32>() * 0.4),
                80,
            ),
            SpawnRule::WhiteSparks => {
                let angle = rng.gen::<f32>() * PI * 2.0;
                let speed = rng.gen::<f32>() * 4.0 + 2.0;
                Particle::new(
                    ParticleKind::Spark,
                    c,
                    Vec2::new(angle.cos(), angle.sin()) * speed,
                    rng.gen::<f32>() * 4.0 + 2.0,
                    hsl(60.0, 1.0, 0.8 + rng.gen::<f32>() * 0.2),
                    40,
                )
            }
            SpawnRule::Flames => Particle::new(
                ParticleKind::Flame,
                Vec2::new(c.x + jitter(rng, 80.0), c.y + 40.0 + jitter(rng, 10.0)),
                Vec2::new(jitter(rng, 0.8), -rng.gen::<f32>() * 2.0 - 1.5),
                rng.gen::<f32>() * 6.0 + 4.0,
                hsl(15.0 + rng.gen::<f32>() * 25.0, 1.0, 0.5 + rng.gen::<f32>() * 0.2),
                50,
            ),
            SpawnRule::RustFlakes => Particle::new(
                ParticleKind::Smoke,
                Vec2::new(c.x + jitter(rng, 100.0), c.y + jitter(rng, 100.0)),
                Vec2::new(jitter(rng, 0.5), rng.gen::<f32>() + 0.5),
                rng.gen::<f32>() * 8.0 + 4.0,
                hsl(15.0 + rng.gen::<f32>() * 10.0, 0.7, 0.4 + rng.gen::<f32>() * 0.2),
                100,
            ),
            SpawnRule::AmmoniaFumes => Particle::new(
                ParticleKind::Toxic,
                Vec2::new(c.x + jitter(rng, 80.0), c.y),
                Vec2::new(jitter(rng, 2.0), -rng.gen::<f32>() * 1.5 - 0.5),
                rng.gen::<f32>() * 12.0 + 6.0,
                rgba(173, 255, 47, 0.5 + rng.gen::<f32>() * 0.3),
                70,
            ),
            SpawnRule::MethaneBubbles => Particle::new(
                ParticleKind::Bubble,
                Vec2::new(c.x + jitter(rng, 60.0), c.y + 20.0),
                Vec2::new(jitter(rng, 1.0), -rng.gen::<f32>() * 2.0 - 1.0),
                rng.gen::<f32>() * 10.0 + 5.0,
                rgba(200, 200, 255, 0.3 + rng.gen::<f32>() * 0.4),
                60,
            ),
            SpawnRule::SulfurFumes => Particle::new(
                ParticleKind::Toxic,
                Vec2::new(c.x + jitter(rng, 70.0), c.y),
                Vec2::new(jitter(rng, 1.5), -rng.gen::<f32>() - 0.5),
                rng.gen::<f32>() * 14.0 + 7.0,
                rgba(255, 255, 0, 0.4 + rng.gen::<f32>() * 0.3),
                80,
            ),
            SpawnRule::Repulsion => {
                // First half of each batch belongs to the left reactant
                let side = if index < self.count() / 2 { 0 } else { 1 };
                let direction = if side == 0 { -1.0 } else { 1.0 };
                let speed = rng.gen::<f32>() * 1.5 + 1.5;
                Particle::new(
                    ParticleKind::Spark,
                    Vec2::new(c.x + direction * 120.0 + jitter(rng, 20.0), c.y + jitter(rng, 40.0)),
                    Vec2::new(-direction * speed, jitter(rng, 0.5)),
                    rng.gen::<f32>() * 6.0 + 4.0,
                    with_alpha(ctx.reactant_colors[side], 1.0),
                    80,
                )
            }
            SpawnRule::Glitter => Particle::new(
                ParticleKind::Spark,
                Vec2::new(c.x + jitter(rng, 60.0), c.y + jitter(rng, 60.0)),
                Vec2::new(jitter(rng, 0.5), jitter(rng, 0.5)),
                rng.gen::<f32>() * 3.0 + 1.0,
                hsl(45.0 + rng.gen::<f32>() * 15.0, 0.6, 0.7 + rng.gen::<f32>() * 0.2),
                90,
            ),
            SpawnRule::PoisonCloud => Particle::new(
                ParticleKind::Toxic,
                Vec2::new(c.x + jitter(rng, 80.0), c.y),
                Vec2::new(jitter(rng, 2.0), -rng.gen::<f32>() * 2.0 - 1.0),
                rng.gen::<f32>() * 10.0 + 5.0,
                rgba(147, 51, 234, 0.6 + rng.gen::<f32>() * 0.4),
                60,
            ),
            SpawnRule::Radiation => {
                let angle = rng.gen::<f32>() * PI * 2.0;
                let speed = rng.gen::<f32>() * 3.0 + 1.0;
                Particle::new(
                    ParticleKind::Spark,
                    c,
                    Vec2::new(angle.cos(), angle.sin()) * speed,
                    rng.gen::<f32>() * 6.0 + 3.0,
                    hsl(120.0, 1.0, 0.5 + rng.gen::<f32>() * 0.3),
                    100,
                )
            }
            SpawnRule::Generic => Particle::new(
                ParticleKind::Smoke,
                Vec2::new(c.x + jitter(rng, 60.0), c.y),
                Vec2::new(jitter(rng, 2.0), -rng.gen::<f32>() * 2.0 - 1.0),
                rng.gen::<f32>() * 8.0 + 4.0,
                hsl(rng.gen::<f32>() * 360.0, 0.6, 0.6),
                60,
            ),
        }
    }
}

fn jitter<R: Rng + ?Sized>(rng: &mut R, spread: f32) -> f32 {
    (rng.gen::<f32>() - 0.5) * spread
}

/// Fresh particles for one frame of `category`
pub fn spawn<R: Rng + ?Sized>(category: AnimationCategory, ctx: &SpawnContext, rng: &mut R) -> Vec<Particle> {
    SpawnRule::for_category(category).spawn(ctx, rng)
}

/// Advance every particle one frame, draw the survivors and return them
pub fn tick<C: Canvas2D + ?Sized>(mut particles: Vec<Particle>, canvas: &mut C) -> Vec<Particle> {
    particles.retain_mut(|p| {
        p.position += p.velocity;
        if p.kind.falls() {
            p.velocity.y += GRAVITY;
        }
        p.life = p.life.saturating_sub(1);
        if p.life == 0 {
            return false;
        }
        canvas.draw(p.sprite());
        true
    });
    particles
}

/// Push particles out of the center and keep them on the canvas
pub fn repel(particles: &mut [Particle], width: f32, height: f32) {
    let center = Vec2::new(width * 0.5, height * 0.5);
    for p in particles.iter_mut() {
        let offset = p.position - center;
        if offset.length() < REPULSION_RADIUS {
            if let Some(direction) = offset.try_normalize() {
                p.velocity += direction * REPULSION_FORCE;
            }
        }
        p.velocity *= REPULSION_DAMPING;

        if p.position.x < 0.0 {
            p.position.x = 0.0;
            p.velocity.x = p.velocity.x.abs() * EDGE_BOUNCE;
        } else if p.position.x > width {
            p.position.x = width;
            p.velocity.x = -p.velocity.x.abs() * EDGE_BOUNCE;
        }
        if p.position.y < 0.0 {
            p.position.y = 0.0;
            p.velocity.y = p.velocity.y.abs() * EDGE_BOUNCE;
        } else if p.position.y > height {
            p.position.y = height;
            p.velocity.y = -p.velocity.y.abs() * EDGE_BOUNCE;
        }
    }
}

/// Particles of one preview run
#[derive(Debug, Clone)]
pub struct ParticleSystem {
    category: AnimationCategory,
    rule: SpawnRule,
    context: SpawnContext,
    particles: Vec<Particle>,
    capacity: usize,
}

impl ParticleSystem {
    pub fn new(category: AnimationCategory, context: SpawnContext, capacity: usize) -> Self {
        Self {
            category,
            rule: SpawnRule::for_category(category),
            context,
            particles: Vec::with_capacity(capacity),
            capacity,
        }
    }

    pub fn category(&self) -> AnimationCategory {
        self.category
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Emit one batch, dropping whatever does not fit. Returns how many were kept.
    pub fn emit<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let room = self.capacity.saturating_sub(self.particles.len());
        let batch = self.rule.spawn(&self.context, rng);
        let kept = batch.len().min(room);
        self.particles.extend(batch.into_iter().take(kept));
        kept
    }

    pub fn step<C: Canvas2D + ?Sized>(&mut self, canvas: &mut C) {
        if self.rule == SpawnRule::Repulsion {
            repel(&mut self.particles, self.context.width, self.context.height);
        }
        let particles = std::mem::take(&mut self.particles);
        self.particles = tick(particles, canvas);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Spawning,
    Draining,
    Finished,
}

/// Timing wrapper around one preview
pub struct ParticleRun {
    system: ParticleSystem,
    started_at_ms: f64,
    spawn_window_ms: f64,
    run_duration_ms: f64,
    finished: bool,
    on_complete: Option<Box<dyn FnOnce()>>,
}

impl ParticleRun {
    pub fn new(system: ParticleSystem, started_at_ms: f64, config: &PreviewConfig) -> Self {
        Self {
            system,
            started_at_ms,
            spawn_window_ms: config.spawn_window_ms,
            run_duration_ms: config.run_duration_ms,
            finished: false,
            on_complete: None,
        }
    }

    /// Called once, on the frame that finishes the run
    pub fn on_complete(mut self, callback: impl FnOnce() + 'static) -> Self {
        self.on_complete = Some(Box::new(callback));
        self
    }

    pub fn system(&self) -> &ParticleSystem {
        &self.system
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    pub fn frame<R, C>(&mut self, now_ms: f64, rng: &mut R, canvas: &mut C) -> RunState
    where
        R: Rng + ?Sized,
        C: Canvas2D + ?Sized,
    {
        if self.finished {
            return RunState::Finished;
        }

        let elapsed = now_ms - self.started_at_ms;
        let [r, g, b] = PREVIEW_BACKGROUND;
        canvas.wash(rgba(r, g, b, PREVIEW_FADE));

        let spawning = elapsed < self.spawn_window_ms;
        if spawning {
            self.system.emit(rng);
        }
        self.system.step(canvas);

        if elapsed >= self.run_duration_ms {
            self.finished = true;
            log::debug!(
                "Preview run for {} finished with {} live particles",
                self.system.category(),
                self.system.len()
            );
            if let Some(callback) = self.on_complete.take() {
                callback();
            }
            RunState::Finished
        } else if spawning {
            RunState::Spawning
        } else {
            RunState::Draining
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    fn context() -> SpawnContext {
        SpawnContext::new(400.0, 300.0, [common::hex(0xd9ffff), common::hex(0xb3e3f5)])
    }

    #[test]
    fn test_water_spawns_three_fresh_bubbles() {
        let particles = spawn(AnimationCategory::Water, &context(), &mut rand::thread_rng());
        assert_eq!(particles.len(), 3);
        for p in &particles {
            assert_eq!(p.kind, ParticleKind::Bubble);
            assert_eq!(p.life, p.max_life);
            assert!(p.life > 0);
            assert_eq!(p.position.y, 100.0);
            assert!((4.0..12.0).contains(&p.size));
            assert!((2.0..5.0).contains(&p.velocity.y));
        }
    }

    #[test]
    fn test_every_category_spawns_its_count() {
        let mut rng = rand::thread_rng();
        for category in AnimationCategory::ALL {
            let rule = SpawnRule::for_category(category);
            let particles = spawn(category, &context(), &mut rng);
            assert_eq!(particles.len(), rule.count(), "{}", category);
            assert!(particles.iter().all(|p| p.life == p.max_life && p.life > 0));
        }
    }

    #[test]
    fn test_uncovered_categories_use_generic_rule() {
        assert_eq!(SpawnRule::for_category(AnimationCategory::ZincOxide), SpawnRule::Generic);
        assert_eq!(SpawnRule::for_category(AnimationCategory::CarbonDioxide), SpawnRule::Soot);
    }

    #[test]
    fn test_tick_shortens_life_and_drops_dead() {
        let mut rng = rand::thread_rng();
        let mut particles = spawn(AnimationCategory::MagnesiumOxide, &context(), &mut rng);
        particles[0].life = 1;
        let before: Vec<u32> = particles.iter().map(|p| p.life).collect();

        let mut canvas = SpriteList::default();
        let survivors = tick(particles, &mut canvas);

        assert_eq!(survivors.len(), before.len() - 1);
        assert_eq!(canvas.sprites.len(), survivors.len());
        for (p, life) in survivors.iter().zip(before.iter().skip(1)) {
            assert!(p.life < *life);
            assert!(p.life > 0);
        }
    }

    #[test]
    fn test_gravity_only_pulls_bubbles_and_smoke() {
        let bubble = Particle::new(ParticleKind::Bubble, Vec2::ZERO, Vec2::ZERO, 4.0, hsl(0.0, 1.0, 0.5), 10);
        let spark = Particle { kind: ParticleKind::Spark, ..bubble };
        let survivors = tick(vec![bubble, spark], &mut SpriteList::default());
        assert!((survivors[0].velocity.y - GRAVITY).abs() < 1e-6);
        assert_eq!(survivors[1].velocity.y, 0.0);
    }

    #[test]
    fn test_sprite_rules() {
        let base = Particle::new(ParticleKind::Spark, Vec2::ZERO, Vec2::ZERO, 10.0, hsl(0.0, 1.0, 0.5), 10);
        let half = Particle { life: 5, ..base };

        let spark = half.sprite();
        assert!((spark.radius - 5.0).abs() < 1e-6);
        assert_eq!(spark.glow.map(|g| g.blur), Some(20.0));

        let smoke = Particle { kind: ParticleKind::Smoke, ..half }.sprite();
        assert!((smoke.color[3] - 0.35).abs() < 1e-6);
        assert!(smoke.glow.is_none());

        let bubble = Particle { kind: ParticleKind::Bubble, ..half }.sprite();
        assert_eq!(bubble.shape, SpriteShape::Ring { stroke: 2.0, fill_alpha: 0.1 });

        let crystal = Particle { kind: ParticleKind::Crystal, ..half }.sprite();
        assert_eq!(crystal.shape, SpriteShape::Square);

        let toxic = Particle { kind: ParticleKind::Toxic, ..half }.sprite();
        assert!((toxic.color[3] - 0.4).abs() < 1e-6);
        assert_eq!(toxic.glow.map(|g| g.blur), Some(10.0));

        let flame = Particle { kind: ParticleKind::Flame, ..half }.sprite();
        assert_eq!(flame.glow.map(|g| g.blur), Some(15.0));
    }

    #[test]
    fn test_impossible_uses_reactant_colors() {
        let ctx = context();
        let particles = spawn(AnimationCategory::Impossible, &ctx, &mut rand::thread_rng());
        let left: Vec<_> = particles.iter().filter(|p| p.position.x < 200.0).collect();
        let right: Vec<_> = particles.iter().filter(|p| p.position.x > 200.0).collect();
        assert_eq!(left.len(), 2);
        assert_eq!(right.len(), 2);
        assert!(left.iter().all(|p| p.color == ctx.reactant_colors[0] && p.velocity.x > 0.0));
        assert!(right.iter().all(|p| p.color == ctx.reactant_colors[1] && p.velocity.x < 0.0));
    }

    #[test]
    fn test_repel_pushes_out_of_center() {
        let mut particles = vec![Particle::new(
            ParticleKind::Spark,
            Vec2::new(210.0, 150.0),
            Vec2::ZERO,
            4.0,
            hsl(0.0, 1.0, 0.5),
            10,
        )];
        repel(&mut particles, 400.0, 300.0);
        let expected = REPULSION_FORCE * REPULSION_DAMPING;
        assert!((particles[0].velocity.x - expected).abs() < 1e-6);
        assert_eq!(particles[0].velocity.y, 0.0);
    }

    #[test]
    fn test_repel_bounces_off_edges() {
        let mut particles = vec![Particle::new(
            ParticleKind::Spark,
            Vec2::new(-5.0, 150.0),
            Vec2::new(-2.0, 0.0),
            4.0,
            hsl(0.0, 1.0, 0.5),
            10,
        )];
        repel(&mut particles, 400.0, 300.0);
        assert_eq!(particles[0].position.x, 0.0);
        assert!((particles[0].velocity.x - 2.0 * REPULSION_DAMPING * EDGE_BOUNCE).abs() < 1e-5);
    }

    #[test]
    fn test_capacity_bounds_emission() {
        let mut system = ParticleSystem::new(AnimationCategory::MagnesiumOxide, context(), 10);
        let mut rng = rand::thread_rng();
        assert_eq!(system.emit(&mut rng), 8);
        assert_eq!(system.emit(&mut rng), 2);
        assert_eq!(system.emit(&mut rng), 0);
        assert_eq!(system.len(), 10);
    }

    #[test]
    fn test_run_timing_and_single_completion() {
        let config = PreviewConfig::default();
        let fired = Rc::new(Cell::new(0));
        let counter = fired.clone();
        let system = ParticleSystem::new(AnimationCategory::Salt, context(), config.capacity);
        let mut run = ParticleRun::new(system, 1000.0, &config).on_complete(move || counter.set(counter.get() + 1));

        let mut rng = rand::thread_rng();
        let mut canvas = SpriteList::default();

        assert_eq!(run.frame(1000.0, &mut rng, &mut canvas), RunState::Spawning);
        assert_eq!(run.frame(3999.0, &mut rng, &mut canvas), RunState::Spawning);
        let before_window_closes = run.system().len();

        assert_eq!(run.frame(4000.0, &mut rng, &mut canvas), RunState::Draining);
        assert!(run.system().len() <= before_window_closes);
        assert_eq!(run.frame(4999.0, &mut rng, &mut canvas), RunState::Draining);
        assert_eq!(fired.get(), 0);

        assert_eq!(run.frame(5000.0, &mut rng, &mut canvas), RunState::Finished);
        assert_eq!(fired.get(), 1);
        assert_eq!(run.frame(5100.0, &mut rng, &mut canvas), RunState::Finished);
        assert_eq!(run.frame(9000.0, &mut rng, &mut canvas), RunState::Finished);
        assert_eq!(fired.get(), 1);
        assert!(run.is_finished());
    }

    #[test]
    fn test_no_spawning_after_window() {
        let config = PreviewConfig::default();
        let system = ParticleSystem::new(AnimationCategory::Water, context(), config.capacity);
        let mut run = ParticleRun::new(system, 0.0, &config);
        let mut rng = rand::thread_rng();
        let mut canvas = SpriteList::default();

        run.frame(3000.0, &mut rng, &mut canvas);
        assert!(run.system().is_empty());
    }
}
