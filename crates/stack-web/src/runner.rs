use stack_engine::{
    Game, EngineContext, RenderContext,
    InputEvent, InputQueue, RenderBuffer, CameraUniform,
    FixedTimestep, ProtocolLayout,
};
use stack_engine::bridge::protocol::PROTOCOL_VERSION;
use stack_engine::systems::render::build_render_buffer;

/// Generic game runner that wires up the engine loop.
///
/// Each concrete game (e.g., `tower-game`) creates a `thread_local!` GameRunner
/// and exports free functions via `#[wasm_bindgen]`, because wasm-bindgen
/// cannot export generic structs directly.
pub struct GameRunner<G: Game> {
    game: G,
    ctx: EngineContext,
    input: InputQueue,
    render_buffer: RenderBuffer,
    timestep: FixedTimestep,
    layout: ProtocolLayout,
    initialized: bool,
    camera_uniform: CameraUniform,
}

impl<G: Game> GameRunner<G> {
    pub fn new(game: G) -> Self {
        let config = game.config();
        let timestep = FixedTimestep::new(config.fixed_dt);
        let layout = ProtocolLayout::from_config(&config);
        let ctx = EngineContext::with_config(&config);
        let camera_uniform = ctx.camera.uniform();

        Self {
            game,
            ctx,
            input: InputQueue::new(),
            render_buffer: RenderBuffer::new(),
            timestep,
            layout,
            initialized: false,
            camera_uniform,
        }
    }

    /// Initialize the game. Call once after construction.
    pub fn init(&mut self) {
        self.game.init(&mut self.ctx);
        self.initialized = true;
        self.rebuild_frame_data();
    }

    /// Push an input event into the queue.
    pub fn push_input(&mut self, event: InputEvent) {
        self.input.push(event);
    }

    /// Hand a JSON settings document to the game.
    pub fn load_config(&mut self, json: &str) {
        self.game.load_config(&mut self.ctx, json);
        if self.initialized {
            self.rebuild_frame_data();
        }
    }

    /// Run one frame tick: update game, step physics, build render buffer.
    pub fn tick(&mut self, dt: f32) {
        if !self.initialized {
            return;
        }

        // Clear per-frame transient data
        self.ctx.clear_frame_data();

        // Fixed timestep accumulation. Input is seen by the first step only;
        // with no step this frame it waits for the next one.
        let steps = self.timestep.accumulate(dt);
        for step in 0..steps {
            if step == 1 {
                self.input.clear();
            }
            self.game.update(&mut self.ctx, &self.input);
            self.ctx.step_physics();
            self.game.post_physics(&mut self.ctx);
        }
        if steps > 0 {
            self.input.clear();
        }

        self.rebuild_frame_data();

        // Allow game to add custom render commands
        {
            let mut render_ctx = RenderContext {
                render_buffer: &mut self.render_buffer,
            };
            self.game.render(&mut render_ctx);
        }

        if self.ctx.events.len() > self.layout.max_events {
            log::warn!(
                "dropping {} game events over capacity",
                self.ctx.events.len() - self.layout.max_events
            );
            self.ctx.events.truncate(self.layout.max_events);
        }
    }

    fn rebuild_frame_data(&mut self) {
        build_render_buffer(
            self.ctx.scene.iter(),
            &mut self.render_buffer,
            self.layout.max_instances,
        );
        self.camera_uniform = self.ctx.camera.uniform();
    }

    /// Read access for hosts and tests.
    pub fn game(&self) -> &G {
        &self.game
    }

    pub fn context(&self) -> &EngineContext {
        &self.ctx
    }

    // Raw frame data for the host.

    pub fn instances_ptr(&self) -> *const f32 {
        self.render_buffer.instances_ptr()
    }

    pub fn instance_count(&self) -> u32 {
        self.render_buffer.instance_count()
    }

    pub fn translucent_split(&self) -> u32 {
        self.render_buffer.translucent_split
    }

    pub fn game_events_ptr(&self) -> *const f32 {
        self.ctx.events.as_ptr() as *const f32
    }

    pub fn game_events_len(&self) -> u32 {
        self.ctx.events.len() as u32
    }

    pub fn camera_ptr(&self) -> *const f32 {
        &self.camera_uniform as *const CameraUniform as *const f32
    }

    pub fn viewport_width(&self) -> f32 {
        self.ctx.camera.viewport.x
    }

    pub fn viewport_height(&self) -> f32 {
        self.ctx.camera.viewport.y
    }

    // Buffer capacities, read once by the host at startup.

    pub fn max_instances(&self) -> u32 {
        self.layout.max_instances as u32
    }

    pub fn max_events(&self) -> u32 {
        self.layout.max_events as u32
    }

    pub fn buffer_total_floats(&self) -> u32 {
        self.layout.buffer_total_floats as u32
    }

    pub fn protocol_version(&self) -> f32 {
        PROTOCOL_VERSION
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stack_engine::{EntityId, Entity, GameEvent, MeshColor, MeshComponent};
    use glam::Vec3;

    /// Counts updates and pointer events it sees; spawns a single box.
    struct Recorder {
        updates: u32,
        pointer_events: u32,
        post_physics: u32,
        loaded: Option<String>,
    }

    impl Game for Recorder {
        fn init(&mut self, ctx: &mut EngineContext) {
            let id = ctx.next_id();
            ctx.scene.spawn(
                Entity::new(id)
                    .with_pos(Vec3::new(0.0, 1.0, 0.0))
                    .with_mesh(MeshComponent::cuboid(Vec3::ONE, MeshColor::WHITE)),
            );
        }

        fn update(&mut self, ctx: &mut EngineContext, input: &InputQueue) {
            self.updates += 1;
            self.pointer_events += input.iter().filter(|e| e.is_pointer()).count() as u32;
            ctx.emit_event(GameEvent::new(1.0, self.updates as f32));
        }

        fn post_physics(&mut self, _ctx: &mut EngineContext) {
            self.post_physics += 1;
        }

        fn load_config(&mut self, _ctx: &mut EngineContext, json: &str) {
            self.loaded = Some(json.to_string());
        }
    }

    fn runner() -> GameRunner<Recorder> {
        let mut runner = GameRunner::new(Recorder {
            updates: 0,
            pointer_events: 0,
            post_physics: 0,
            loaded: None,
        });
        runner.init();
        runner
    }

    #[test]
    fn init_builds_first_frame() {
        let r = runner();
        assert_eq!(r.instance_count(), 1);
        assert_eq!(r.context().scene.get(EntityId(1)).unwrap().pos.y, 1.0);
    }

    #[test]
    fn input_seen_once_across_fixed_steps() {
        let mut r = runner();
        r.push_input(InputEvent::PointerDown { x: 1.0, y: 2.0 });
        r.tick(3.5 / 60.0);
        assert_eq!(r.game().updates, 3);
        assert_eq!(r.game().post_physics, 3);
        assert_eq!(r.game().pointer_events, 1);
    }

    #[test]
    fn input_waits_for_a_fixed_step() {
        let mut r = runner();
        r.push_input(InputEvent::PointerMove { x: 1.0, y: 2.0 });
        r.tick(0.001);
        assert_eq!(r.game().updates, 0);
        r.tick(1.0 / 60.0);
        assert_eq!(r.game().pointer_events, 1);
    }

    #[test]
    fn events_reset_each_frame() {
        let mut r = runner();
        r.tick(2.0 / 60.0 + 0.001);
        assert_eq!(r.game_events_len(), 2);
        r.tick(1.0 / 60.0);
        assert_eq!(r.game_events_len(), 1);
    }

    #[test]
    fn load_config_reaches_game() {
        let mut r = runner();
        r.load_config("{\"layers\": 4}");
        assert_eq!(r.game().loaded.as_deref(), Some("{\"layers\": 4}"));
    }

    #[test]
    fn layout_matches_default_capacities() {
        let r = runner();
        assert_eq!(r.max_instances(), 256);
        assert_eq!(r.max_events(), 32);
        assert_eq!(
            r.buffer_total_floats() as usize,
            ProtocolLayout::new(256, 32).buffer_total_floats
        );
        assert_eq!(r.protocol_version(), 2.0);
    }
}
