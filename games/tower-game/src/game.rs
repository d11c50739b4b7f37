//! Tower Stack - pull blocks out of a rapier3d tower and stack them on top.
//! The tower falls over if the player is careless; the game ends when any
//! standing block reaches the ground.

use glam::{Vec2, Vec3};
use stack_engine::{
    Camera3D, EngineContext, EntityId, Game, GameConfig, GameEvent, InputEvent, InputQueue,
    MeshColor, OrbitControls, KEY_ESCAPE,
};

use crate::config::{CameraSettings, TowerConfig};
use crate::drag::{DragController, DragOutcome};
use crate::events::{custom, game_events};
use crate::selection::{self, Pick};
use crate::stability::StabilityMonitor;
use crate::tower::{spawn_ground, Tower};

pub struct TowerGame {
    cfg: TowerConfig,
    tower: Tower,
    drag: DragController,
    stability: StabilityMonitor,
    orbit: OrbitControls,
    ground: Option<EntityId>,
    moves: u32,
    /// Bumped on every rebuild; pending stability checks carry it.
    generation: u64,
    /// False once the host reported the wood texture missing.
    textured: bool,
    /// Last cursor hint sent to the UI.
    cursor: Option<f32>,
    /// Step length the runner was configured with.
    step_dt: f32,
    initialized: bool,
}

impl TowerGame {
    pub fn new() -> Self {
        Self::with_config(TowerConfig::default())
    }

    pub fn with_config(cfg: TowerConfig) -> Self {
        let camera = camera_for(&cfg.camera, Vec2::new(800.0, 600.0));
        Self {
            orbit: orbit_for(&cfg.camera, &camera),
            step_dt: cfg.physics.time_step,
            cfg,
            tower: Tower::new(),
            drag: DragController::new(),
            stability: StabilityMonitor::new(),
            ground: None,
            moves: 0,
            generation: 0,
            textured: true,
            cursor: None,
            initialized: false,
        }
    }

    /// The game ends with the first reported collapse.
    fn game_over(&self) -> bool {
        self.stability.has_collapsed()
    }

    /// Camera, ground, preview and a fresh tower.
    fn setup(&mut self, ctx: &mut EngineContext) {
        ctx.camera = camera_for(&self.cfg.camera, ctx.camera.viewport);
        self.orbit = orbit_for(&self.cfg.camera, &ctx.camera);
        self.ground = Some(spawn_ground(ctx, &self.cfg));
        self.drag.init(ctx, &self.cfg);
        self.tower = Tower::build(ctx, &self.cfg, self.textured);

        // The host draws hover outlines; tell it which color to use
        let c = MeshColor::from_hex(self.cfg.colors.highlight);
        ctx.emit_event(GameEvent {
            kind: game_events::OUTLINE_COLOR,
            a: c.r,
            b: c.g,
            c: c.b,
        });
    }

    fn reset_state(&mut self, ctx: &mut EngineContext) {
        self.stability.reset();
        self.generation += 1;
        self.moves = 0;
        self.cursor = None;
        self.orbit.set_enabled(true);
        ctx.emit_event(GameEvent::new(game_events::RESTARTED, self.generation as f32));
        ctx.emit_event(GameEvent::new(game_events::MOVES, 0.0));
    }

    /// Tear the tower down and build a new one. Ground and camera stay.
    fn restart(&mut self, ctx: &mut EngineContext) {
        self.drag.reset(ctx);
        self.tower.teardown(ctx);
        self.tower = Tower::build(ctx, &self.cfg, self.textured);
        self.reset_state(ctx);
        log::info!("game restarted (generation {})", self.generation);
    }

    /// Rebuild the whole scene, e.g. after the settings changed.
    fn rebuild(&mut self, ctx: &mut EngineContext) {
        self.drag.dispose(ctx);
        self.tower.teardown(ctx);
        if let Some(ground) = self.ground.take() {
            ctx.despawn(ground);
        }
        self.setup(ctx);
        self.reset_state(ctx);
    }

    fn use_fallback_material(&mut self, ctx: &mut EngineContext) {
        if !self.textured {
            return;
        }
        log::warn!("wood texture unavailable, using flat block color");
        self.textured = false;
        self.tower.apply_fallback_material(ctx, &self.cfg);
    }

    fn set_cursor(&mut self, ctx: &mut EngineContext, cursor: f32) {
        if self.cursor != Some(cursor) {
            self.cursor = Some(cursor);
            ctx.emit_event(GameEvent::new(game_events::CURSOR, cursor));
        }
    }

    fn pointer_down(&mut self, ctx: &mut EngineContext, x: f32, y: f32) {
        if self.drag.is_dragging() {
            return;
        }
        let ray = ctx.camera.screen_ray(x, y);
        let picked = match selection::pick(ctx, &self.tower, &ray) {
            Pick::Actionable { block, point } => {
                self.drag.begin(ctx, &mut self.tower, &self.cfg, block, point)
            }
            Pick::Blocked(block) => {
                log::debug!("block {:?} holds up its layer", block);
                false
            }
            Pick::Miss => false,
        };
        if !picked {
            self.orbit.pointer_down(x, y);
        }
    }

    fn pointer_move(&mut self, ctx: &mut EngineContext, x: f32, y: f32) {
        let ray = ctx.camera.screen_ray(x, y);
        if self.drag.is_dragging() {
            self.drag.drag_to(ctx, &self.tower, &self.cfg, &ray);
            return;
        }
        match selection::update_hover(ctx, &self.tower, &ray) {
            Pick::Actionable { .. } => self.set_cursor(ctx, game_events::CURSOR_POINTER),
            Pick::Miss => self.set_cursor(ctx, game_events::CURSOR_DEFAULT),
            Pick::Blocked(_) => {}
        }
        self.orbit.pointer_move(x, y, ctx.camera.viewport.y);
    }

    fn pointer_up(&mut self, ctx: &mut EngineContext) {
        self.orbit.pointer_up();
        if let Some(outcome) = self.drag.release(ctx, &mut self.tower, &self.cfg) {
            self.drag_ended(ctx, outcome);
        }
    }

    fn cancel_drag(&mut self, ctx: &mut EngineContext) {
        if let Some(outcome) = self.drag.cancel(ctx, &mut self.tower) {
            self.drag_ended(ctx, outcome);
        }
    }

    fn drag_ended(&mut self, ctx: &mut EngineContext, outcome: DragOutcome) {
        if let DragOutcome::Committed { layer, height } = outcome {
            self.moves += 1;
            log::debug!("move {}: block placed on layer {} at y={:.3}", self.moves, layer, height);
            ctx.emit_event(GameEvent::new(game_events::MOVES, self.moves as f32));
        }
        self.stability
            .schedule(self.generation, self.cfg.stability.settle_delay);
    }

    fn check_stability(&mut self, ctx: &mut EngineContext) {
        let threshold = self.cfg.stability.collapse_height;
        if self.stability.check(&self.tower, &ctx.scene, threshold).is_none() {
            return;
        }
        if self.drag.cancel(ctx, &mut self.tower).is_some() {
            log::debug!("drag cancelled by collapse");
        }
        self.orbit.set_enabled(false);
        ctx.emit_event(GameEvent::new(game_events::COLLAPSED, self.moves as f32));
    }
}

impl Default for TowerGame {
    fn default() -> Self {
        Self::new()
    }
}

impl Game for TowerGame {
    fn config(&self) -> GameConfig {
        GameConfig {
            fixed_dt: self.cfg.physics.time_step,
            max_instances: 128,
            gravity: self.cfg.gravity(),
            solver_iterations: self.cfg.physics.iterations,
            ..GameConfig::default()
        }
    }

    fn init(&mut self, ctx: &mut EngineContext) {
        self.setup(ctx);
        self.initialized = true;
        ctx.emit_event(GameEvent::new(game_events::MOVES, 0.0));
    }

    fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
        let mut restarted = false;
        for event in input.iter() {
            match *event {
                InputEvent::Custom { kind, .. } if kind == custom::RESTART => {
                    self.restart(ctx);
                    restarted = true;
                }
                InputEvent::Custom { kind, .. } if kind == custom::TEXTURE_UNAVAILABLE => {
                    self.use_fallback_material(ctx);
                }
                InputEvent::KeyDown { key_code: KEY_ESCAPE } => self.cancel_drag(ctx),
                InputEvent::Resize { width, height } => ctx.camera.set_viewport(width, height),
                // The tower is down: only restart brings the pointer back
                _ if self.game_over() => {}
                InputEvent::PointerDown { x, y } => self.pointer_down(ctx, x, y),
                InputEvent::PointerMove { x, y } => self.pointer_move(ctx, x, y),
                InputEvent::PointerUp { .. } => self.pointer_up(ctx),
                InputEvent::Wheel { delta } => self.orbit.wheel(delta),
                _ => {}
            }
            self.orbit
                .set_enabled(!self.drag.is_dragging() && !self.game_over());
        }

        // The new tower starts its clock next frame
        if restarted {
            return;
        }
        let due = self.stability.due_checks(self.step_dt, self.generation);
        for _ in 0..due {
            self.check_stability(ctx);
        }
    }

    fn post_physics(&mut self, ctx: &mut EngineContext) {
        self.orbit.update(&mut ctx.camera);
    }

    fn load_config(&mut self, ctx: &mut EngineContext, json: &str) {
        let cfg = match TowerConfig::from_json(json) {
            Ok(cfg) => cfg,
            Err(e) => {
                log::warn!("ignoring tower config: {}", e);
                return;
            }
        };
        if (cfg.physics.time_step - self.step_dt).abs() > f32::EPSILON {
            log::debug!(
                "time step {} applies on next start, keeping {}",
                cfg.physics.time_step,
                self.step_dt
            );
        }
        ctx.physics.set_gravity(cfg.gravity());
        ctx.physics.set_solver_iterations(cfg.physics.iterations);
        self.cfg = cfg;

        if self.initialized {
            self.rebuild(ctx);
            log::info!("tower config applied");
        }
    }
}

fn camera_for(settings: &CameraSettings, viewport: Vec2) -> Camera3D {
    let mut camera = Camera3D::new(settings.fov, settings.near, settings.far, viewport)
        .with_position(Vec3::from_array(settings.position));
    camera.look_at(Vec3::from_array(settings.target));
    camera
}

fn orbit_for(settings: &CameraSettings, camera: &Camera3D) -> OrbitControls {
    OrbitControls::from_camera(camera)
        .with_distance_limits(settings.min_distance, settings.max_distance)
        .with_max_polar(settings.max_polar_angle)
        .with_damping(settings.damping)
}
