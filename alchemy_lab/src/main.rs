//! Alchemy Lab
//!
//! Pick two elements, combine them and watch the product form:
//! - Left panel: element picker, combine/reset/random mix, result card
//! - Center: 3D molecule animation for the outcome's category
//! - Bottom right: 2D particle preview themed to the same category
//!
//! Controls:
//! - Left mouse drag: Orbit camera
//! - Scroll: Zoom in/out
//! - Space: Combine the selected pair
//! - R: Reset the selection and the scene
//! - M: Random mix
//! - Escape: Quit

use std::process::ExitCode;
use std::time::Instant;

use alchemy_lab::config::LabConfig;
use alchemy_lab::lab_ui::{draw_lab_panel, LabAction, SceneStatus};
use alchemy_lab::molecule::MoleculeLibrary;
use alchemy_lab::particles::{ParticleRun, ParticleSystem, RunState, SpawnContext, SpriteList};
use alchemy_lab::preview::PreviewRenderer;
use alchemy_lab::renderer::MoleculeRenderer;
use alchemy_lab::scene::SceneManager;
use alchemy_lab::session::LabSession;
use common::GraphicsContext;
use rand::rngs::ThreadRng;
use winit::{
    event::{ElementState, Event, KeyEvent, MouseButton, MouseScrollDelta, WindowEvent},
    event_loop::{ControlFlow, EventLoopWindowTarget},
    keyboard::{KeyCode, PhysicalKey},
};

struct EguiState {
    ctx: egui::Context,
    state: egui_winit::State,
    renderer: egui_wgpu::Renderer,
}

struct App {
    ctx: GraphicsContext,
    config: LabConfig,
    scene: SceneManager<MoleculeRenderer>,
    preview: PreviewRenderer,
    run: Option<ParticleRun>,
    sprites: SpriteList,
    session: LabSession,
    rng: ThreadRng,
    started: Instant,
    mouse_pressed: bool,
    last_mouse_pos: Option<(f64, f64)>,
    egui: EguiState,
}

impl App {
    fn new(ctx: GraphicsContext, config: LabConfig) -> Result<Self, alchemy_lab::scene::SceneError> {
        let renderer = MoleculeRenderer::new(&ctx);
        let mut scene = SceneManager::new(renderer, config.scene, MoleculeLibrary::standard())?;
        scene.start();
        let preview = PreviewRenderer::new(&ctx, &config.preview);

        let egui_ctx = egui::Context::default();
        let egui_state = egui_winit::State::new(
            egui_ctx.clone(),
            egui::ViewportId::ROOT,
            &ctx.window,
            Some(ctx.window.scale_factor() as f32),
            None,
        );
        let egui_renderer = egui_wgpu::Renderer::new(&ctx.device, ctx.config.format, None, 1);

        Ok(Self {
            ctx,
            config,
            scene,
            preview,
            run: None,
            sprites: SpriteList::default(),
            session: LabSession::default(),
            rng: rand::thread_rng(),
            started: Instant::now(),
            mouse_pressed: false,
            last_mouse_pos: None,
            egui: EguiState {
                ctx: egui_ctx,
                state: egui_state,
                renderer: egui_renderer,
            },
        })
    }

    fn now_ms(&self) -> f64 {
        self.started.elapsed().as_secs_f64() * 1000.0
    }

    fn resize(&mut self, new_size: winit::dpi::PhysicalSize<u32>) {
        self.ctx.resize(new_size);
        self.scene.resize(new_size.width, new_size.height);
    }

    fn combine(&mut self, now_ms: f64) {
        let Some(category) = self.session.combine().map(|o| o.category()) else {
            return;
        };
        let Some((a, b)) = self.session.selection().pair() else {
            return;
        };

        let report = self.scene.trigger_reaction(Some(category));
        if let Some(retired) = report.retired {
            log::debug!(
                "Replaced molecule, released {} geometries and {} materials",
                retired.geometries,
                retired.materials
            );
        }

        let preview = &self.config.preview;
        let context = SpawnContext::new(preview.width, preview.height, [a.rgba(), b.rgba()]);
        let system = ParticleSystem::new(category, context, preview.capacity);
        self.run = Some(
            ParticleRun::new(system, now_ms, preview)
                .on_complete(move || log::debug!("Preview for {} complete", category)),
        );
        self.preview.begin();
    }

    fn reset(&mut self) {
        self.session.reset();
        self.scene.trigger_reaction(None);
        self.run = None;
        self.preview.hide();
    }

    fn apply(&mut self, action: LabAction, now_ms: f64) {
        match action {
            LabAction::Select(element) => self.session.select(element),
            LabAction::Combine => self.combine(now_ms),
            LabAction::Reset => self.reset(),
            LabAction::Randomize => self.session.randomize(&mut self.rng),
        }
    }

    fn scene_status(&self, now_ms: f64) -> SceneStatus {
        let (meshes, materials) = self.scene.backend().resident();
        let molecule = self.scene.molecule();
        let age = self.scene.molecule_age_ms(now_ms);
        SceneStatus {
            category: molecule.map(|m| m.category()),
            stage: molecule.zip(age).and_then(|(m, age)| m.stage(age as f32)),
            meshes,
            materials,
            preview_running: self.run.as_ref().is_some_and(|r| !r.is_finished()),
        }
    }

    fn render(&mut self) -> Result<(), wgpu::SurfaceError> {
        let output = self.ctx.surface.get_current_texture()?;
        let view = output
            .texture
            .create_view(&wgpu::TextureViewDescriptor::default());

        let now_ms = self.now_ms();
        self.scene.frame(now_ms);

        if let Some(run) = self.run.as_mut() {
            self.sprites.clear();
            let state = run.frame(now_ms, &mut self.rng, &mut self.sprites);
            self.preview.prepare(&self.ctx.queue, &self.sprites);
            if state == RunState::Finished {
                self.run = None;
            }
        }

        // Build egui UI
        let status = self.scene_status(now_ms);
        let mut action = None;
        let raw_input = self.egui.state.take_egui_input(&self.ctx.window);
        let full_output = self.egui.ctx.run(raw_input, |ctx| {
            if let Some(picked) = draw_lab_panel(ctx, &self.session, &status) {
                action = Some(picked);
            }
        });

        self.egui.state.handle_platform_output(&self.ctx.window, full_output.platform_output);
        let tris = self.egui.ctx.tessellate(full_output.shapes, full_output.pixels_per_point);
        for (id, image_delta) in &full_output.textures_delta.set {
            self.egui.renderer.update_texture(&self.ctx.device, &self.ctx.queue, *id, image_delta);
        }

        let screen_descriptor = egui_wgpu::ScreenDescriptor {
            size_in_pixels: [self.ctx.size.width, self.ctx.size.height],
            pixels_per_point: full_output.pixels_per_point,
        };

        let mut encoder = self
            .ctx
            .device
            .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                label: Some("Render Encoder"),
            });

        self.scene.backend().encode(&mut encoder, &view);
        self.preview
            .encode(&mut encoder, &view, (self.ctx.size.width, self.ctx.size.height));

        self.egui.renderer.update_buffers(
            &self.ctx.device,
            &self.ctx.queue,
            &mut encoder,
            &tris,
            &screen_descriptor,
        );
        {
            let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("Egui Render Pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                })],
                depth_stencil_attachment: None,
                timestamp_writes: None,
                occlusion_query_set: None,
            });
            self.egui.renderer.render(&mut render_pass, &tris, &screen_descriptor);
        }

        for id in &full_output.textures_delta.free {
            self.egui.renderer.free_texture(id);
        }

        self.ctx.queue.submit(std::iter::once(encoder.finish()));
        output.present();

        if let Some(action) = action {
            self.apply(action, now_ms);
        }
        Ok(())
    }

    fn handle_key(&mut self, key: KeyCode, state: ElementState, elwt: &EventLoopWindowTarget<()>) {
        if state != ElementState::Pressed {
            return;
        }

        let now_ms = self.now_ms();
        match key {
            KeyCode::Space => self.combine(now_ms),
            KeyCode::KeyR => self.reset(),
            KeyCode::KeyM => self.session.randomize(&mut self.rng),
            KeyCode::Escape => self.shutdown(elwt),
            _ => {}
        }
    }

    fn handle_mouse_move(&mut self, x: f64, y: f64) {
        if self.mouse_pressed {
            if let Some((last_x, last_y)) = self.last_mouse_pos {
                let dx = (x - last_x) as f32 * 0.01;
                let dy = (y - last_y) as f32 * 0.01;
                self.scene.camera_mut().orbit(dx, dy);
            }
            self.last_mouse_pos = Some((x, y));
        }
    }

    fn handle_scroll(&mut self, delta: f32) {
        self.scene.camera_mut().zoom(delta * 0.5);
    }

    fn handle_window_event(&mut self, event: &WindowEvent) -> bool {
        self.egui.state.on_window_event(&self.ctx.window, event).consumed
    }

    fn shutdown(&mut self, elwt: &EventLoopWindowTarget<()>) {
        self.run = None;
        self.scene.cleanup();
        elwt.exit();
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = LabConfig::default();
    let (ctx, event_loop) = pollster::block_on(GraphicsContext::new(
        &config.window.title,
        config.window.width,
        config.window.height,
    ))?;

    let mut app = App::new(ctx, config)?;

    event_loop.run(move |event, elwt| {
        elwt.set_control_flow(ControlFlow::Poll);

        match event {
            Event::WindowEvent { ref event, .. } => {
                let consumed = app.handle_window_event(event);

                if !consumed {
                    match event {
                        WindowEvent::CloseRequested => app.shutdown(elwt),
                        WindowEvent::Resized(size) => app.resize(*size),
                        WindowEvent::MouseInput { state, button, .. } => {
                            if *button == MouseButton::Left {
                                app.mouse_pressed = *state == ElementState::Pressed;
                                if !app.mouse_pressed {
                                    app.last_mouse_pos = None;
                                }
                            }
                        }
                        WindowEvent::CursorMoved { position, .. } => {
                            app.handle_mouse_move(position.x, position.y);
                        }
                        WindowEvent::KeyboardInput {
                            event:
                                KeyEvent {
                                    physical_key: PhysicalKey::Code(key),
                                    state,
                                    ..
                                },
                            ..
                        } => app.handle_key(*key, *state, elwt),
                        WindowEvent::MouseWheel { delta, .. } => {
                            let scroll = match delta {
                                MouseScrollDelta::LineDelta(_, y) => *y,
                                MouseScrollDelta::PixelDelta(pos) => pos.y as f32 / 100.0,
                            };
                            app.handle_scroll(scroll);
                        }
                        WindowEvent::RedrawRequested => {
                            if app.scene.is_cleaned_up() {
                                return;
                            }
                            match app.render() {
                                Ok(_) => {}
                                Err(wgpu::SurfaceError::Lost) => app.resize(app.ctx.size),
                                Err(wgpu::SurfaceError::OutOfMemory) => app.shutdown(elwt),
                                Err(e) => log::error!("Render error: {:?}", e),
                            }
                        }
                        _ => {}
                    }
                }
            }
            Event::AboutToWait => {
                app.ctx.window.request_redraw();
            }
            Event::LoopExiting => {
                app.scene.cleanup();
            }
            _ => {}
        }
    })?;
    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            eprintln!("alchemy_lab: {}", e);
            ExitCode::FAILURE
        }
    }
}
