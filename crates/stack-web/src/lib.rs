pub mod runner;

pub use runner::GameRunner;

/// Emit the browser-facing `#[wasm_bindgen]` surface for a game type.
///
/// wasm-bindgen cannot export a generic `GameRunner<G>`, so the macro
/// instantiates one per game in a `thread_local!` and wraps every call in a
/// free function. The game type needs a `new()` constructor.
///
/// ```ignore
/// use wasm_bindgen::prelude::*;
/// use stack_engine::*;
///
/// mod game;
/// stack_web::export_game!(game::TowerGame, "tower-game");
/// ```
///
/// Calls made before `game_init` are logged and answered with zeroes.
#[macro_export]
macro_rules! export_game {
    ($game_type:ty, $game_name:literal) => {
        use std::cell::RefCell;

        thread_local! {
            static RUNNER: RefCell<Option<$crate::GameRunner<$game_type>>> = RefCell::new(None);
        }

        fn with_runner<R>(
            fallback: R,
            f: impl FnOnce(&mut $crate::GameRunner<$game_type>) -> R,
        ) -> R {
            RUNNER.with(|cell| match cell.borrow_mut().as_mut() {
                Some(runner) => f(runner),
                None => {
                    log::warn!("{}: game_init() has not been called", $game_name);
                    fallback
                }
            })
        }

        fn push(event: InputEvent) {
            with_runner((), |r| r.push_input(event));
        }

        #[wasm_bindgen]
        pub fn game_init() {
            console_error_panic_hook::set_once();
            let _ = console_log::init_with_level(log::Level::Info);

            let mut runner = $crate::GameRunner::new(<$game_type>::new());
            runner.init();
            RUNNER.with(|cell| *cell.borrow_mut() = Some(runner));
            log::info!("{}: initialized", $game_name);
        }

        #[wasm_bindgen]
        pub fn game_tick(dt: f32) {
            with_runner((), |r| r.tick(dt));
        }

        #[wasm_bindgen]
        pub fn game_load_config(json: &str) {
            with_runner((), |r| r.load_config(json));
        }

        #[wasm_bindgen]
        pub fn game_pointer_down(x: f32, y: f32) {
            push(InputEvent::PointerDown { x, y });
        }

        #[wasm_bindgen]
        pub fn game_pointer_up(x: f32, y: f32) {
            push(InputEvent::PointerUp { x, y });
        }

        #[wasm_bindgen]
        pub fn game_pointer_move(x: f32, y: f32) {
            push(InputEvent::PointerMove { x, y });
        }

        #[wasm_bindgen]
        pub fn game_wheel(delta: f32) {
            push(InputEvent::Wheel { delta });
        }

        #[wasm_bindgen]
        pub fn game_resize(width: f32, height: f32) {
            push(InputEvent::Resize { width, height });
        }

        #[wasm_bindgen]
        pub fn game_key_down(key_code: u32) {
            push(InputEvent::KeyDown { key_code });
        }

        #[wasm_bindgen]
        pub fn game_key_up(key_code: u32) {
            push(InputEvent::KeyUp { key_code });
        }

        #[wasm_bindgen]
        pub fn game_custom_event(kind: u32, a: f32, b: f32, c: f32) {
            push(InputEvent::Custom { kind, a, b, c });
        }

        // Frame data, read by the host straight out of wasm memory.

        #[wasm_bindgen]
        pub fn get_instances_ptr() -> *const f32 {
            with_runner(std::ptr::null(), |r| r.instances_ptr())
        }

        #[wasm_bindgen]
        pub fn get_instance_count() -> u32 {
            with_runner(0, |r| r.instance_count())
        }

        #[wasm_bindgen]
        pub fn get_translucent_split() -> u32 {
            with_runner(0, |r| r.translucent_split())
        }

        #[wasm_bindgen]
        pub fn get_game_events_ptr() -> *const f32 {
            with_runner(std::ptr::null(), |r| r.game_events_ptr())
        }

        #[wasm_bindgen]
        pub fn get_game_events_len() -> u32 {
            with_runner(0, |r| r.game_events_len())
        }

        #[wasm_bindgen]
        pub fn get_camera_ptr() -> *const f32 {
            with_runner(std::ptr::null(), |r| r.camera_ptr())
        }

        #[wasm_bindgen]
        pub fn get_viewport_width() -> f32 {
            with_runner(0.0, |r| r.viewport_width())
        }

        #[wasm_bindgen]
        pub fn get_viewport_height() -> f32 {
            with_runner(0.0, |r| r.viewport_height())
        }

        #[wasm_bindgen]
        pub fn get_max_instances() -> u32 {
            with_runner(0, |r| r.max_instances())
        }

        #[wasm_bindgen]
        pub fn get_max_events() -> u32 {
            with_runner(0, |r| r.max_events())
        }

        #[wasm_bindgen]
        pub fn get_buffer_total_floats() -> u32 {
            with_runner(0, |r| r.buffer_total_floats())
        }

        #[wasm_bindgen]
        pub fn get_protocol_version() -> f32 {
            with_runner(0.0, |r| r.protocol_version())
        }
    };
}
