//! Ball Arena entry point
//!
//! Web: wires the canvas, control panel and ball menu to a `Simulation` and
//! drives it with `requestAnimationFrame`.
//! Native: runs the simulation headless for a fixed number of frames.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_app {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, HtmlElement, HtmlInputElement, MouseEvent};

    use ball_arena::renderer::CanvasSink;
    use ball_arena::{FrameTicket, LoopState, PointerState, Settings, Simulation};
    use glam::Vec2;

    /// App instance holding all state
    struct App {
        sim: Simulation,
        pointer: PointerState,
        sink: CanvasSink,
        /// Ball whose color menu is open
        selected: Option<i32>,
    }

    fn document() -> Document {
        web_sys::window()
            .and_then(|w| w.document())
            .expect("no document")
    }

    fn element<T: JsCast>(id: &str) -> Option<T> {
        document().get_element_by_id(id)?.dyn_into::<T>().ok()
    }

    fn set_text(id: &str, text: &str) {
        if let Some(el) = document().get_element_by_id(id) {
            el.set_text_content(Some(text));
        }
    }

    fn mouse_pos(event: &MouseEvent) -> Vec2 {
        Vec2::new(event.offset_x() as f32, event.offset_y() as f32)
    }

    fn mouse_movement(event: &MouseEvent) -> Vec2 {
        Vec2::new(event.movement_x() as f32, event.movement_y() as f32)
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Ball Arena starting...");

        let mut settings = Settings::load();
        if settings.seed.is_none() {
            settings.seed = Some(js_sys::Date::now() as u64);
        }

        let canvas: HtmlCanvasElement = element("canvas").expect("no canvas");
        canvas.set_width(settings.arena_width as u32);
        canvas.set_height(settings.arena_height as u32);

        let sink = CanvasSink::new(&canvas).expect("no 2d context");
        let sim = Simulation::new_or_default(settings);

        if let Some(slider) = element::<HtmlInputElement>("balls-count") {
            slider.set_max(&sim.settings().spawn_capacity().to_string());
            slider.set_value(&sim.settings().ball_count.to_string());
        }
        set_text("balls-count-value", &sim.settings().ball_count.to_string());

        let app = Rc::new(RefCell::new(App {
            sim,
            pointer: PointerState::default(),
            sink,
            selected: None,
        }));

        setup_canvas_handlers(&canvas, app.clone());
        setup_panel(app.clone());
        setup_ball_menu(app);

        log::info!("Ball Arena ready");
    }

    fn setup_canvas_handlers(canvas: &HtmlCanvasElement, app: Rc<RefCell<App>>) {
        // Mouse move - track position, movement and drag button
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut().pointer.update(
                    mouse_pos(&event),
                    mouse_movement(&event),
                    event.buttons(),
                    event.ctrl_key(),
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse down - ctrl+click opens the ball menu, plain click starts a drag
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let mut a = app.borrow_mut();
                let pos = mouse_pos(&event);

                if PointerState::is_pick_click(event.buttons(), event.ctrl_key()) {
                    if let Some(id) = a.sim.pick(pos) {
                        a.selected = Some(id);
                        let color = a.sim.color_of(id).map(|c| c.as_str().to_string());
                        drop(a);
                        open_ball_menu(event.client_x(), event.client_y(), color.as_deref());
                    }
                    return;
                }
                a.pointer
                    .update(pos, Vec2::ZERO, event.buttons(), event.ctrl_key());
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse up - end drag
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                app.borrow_mut().pointer.update(
                    mouse_pos(&event),
                    Vec2::ZERO,
                    event.buttons(),
                    event.ctrl_key(),
                );
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Enter / leave
        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().pointer.enter();
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseenter", closure.as_ref().unchecked_ref());
            closure.forget();
        }
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().pointer.leave();
            });
            let _ = canvas
                .add_event_listener_with_callback("mouseleave", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn slider_count() -> Option<usize> {
        element::<HtmlInputElement>("balls-count")?.value().parse().ok()
    }

    fn sync_panel(state: LoopState) {
        let running = state != LoopState::Idle;
        set_text("start-btn", if running { "Stop" } else { "Start" });
        set_text(
            "pause-btn",
            if state == LoopState::Paused { "Resume" } else { "Pause" },
        );
        if let Some(btn) = element::<web_sys::Element>("pause-btn") {
            if running {
                let _ = btn.remove_attribute("disabled");
            } else {
                let _ = btn.set_attribute("disabled", "");
            }
        }
        if let Some(slider) = element::<HtmlInputElement>("balls-count") {
            slider.set_disabled(running);
        }
    }

    fn setup_panel(app: Rc<RefCell<App>>) {
        // Ball count slider
        if let Some(slider) = element::<HtmlInputElement>("balls-count") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if let Some(count) = slider_count() {
                    set_text("balls-count-value", &count.to_string());
                }
            });
            let _ = slider.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Start / Stop
        if let Some(btn) = document().get_element_by_id("start-btn") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                let count = a
                    .sim
                    .settings()
                    .clamp_ball_count(slider_count().unwrap_or(a.sim.settings().ball_count));

                let toggled = a.sim.toggle_running(count);
                match toggled {
                    Ok(Some(ticket)) => {
                        let mut settings = a.sim.settings().clone();
                        settings.ball_count = count;
                        settings.save();
                        sync_panel(a.sim.state());
                        drop(a);
                        request_animation_frame(app.clone(), ticket);
                    }
                    Ok(None) => {
                        a.selected = None;
                        close_ball_menu();
                        sync_panel(a.sim.state());
                    }
                    Err(e) => log::warn!("Start/stop rejected: {}", e),
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Pause / Resume
        if let Some(btn) = document().get_element_by_id("pause-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                match a.sim.toggle_pause() {
                    Ok(state) => sync_panel(state),
                    Err(e) => log::warn!("Pause rejected: {}", e),
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        sync_panel(LoopState::Idle);
    }

    fn open_ball_menu(client_x: i32, client_y: i32, color: Option<&str>) {
        if let Some(input) = element::<HtmlInputElement>("ball-color") {
            input.set_value(color.unwrap_or("#000000"));
        }
        if let Some(menu) = element::<HtmlElement>("ball-menu") {
            let style = menu.style();
            let _ = style.set_property("top", &format!("{}px", client_y));
            let _ = style.set_property("left", &format!("{}px", client_x));
            menu.set_hidden(false);
        }
    }

    fn close_ball_menu() {
        if let Some(menu) = element::<HtmlElement>("ball-menu") {
            menu.set_hidden(true);
        }
    }

    fn setup_ball_menu(app: Rc<RefCell<App>>) {
        // Color picker
        if let Some(input) = element::<HtmlInputElement>("ball-color") {
            let app = app.clone();
            let input_clone = input.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                let mut a = app.borrow_mut();
                if let Some(id) = a.selected {
                    if let Err(e) = a.sim.set_color(id, &input_clone.value()) {
                        log::warn!("Color change rejected: {}", e);
                    }
                }
            });
            let _ = input.add_event_listener_with_callback("input", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Close button
        if let Some(btn) = document().get_element_by_id("ball-menu-close") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                app.borrow_mut().selected = None;
                close_ball_menu();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        close_ball_menu();
    }

    fn request_animation_frame(app: Rc<RefCell<App>>, ticket: FrameTicket) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |_time: f64| {
            frame_loop(app, ticket);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn frame_loop(app: Rc<RefCell<App>>, ticket: FrameTicket) {
        let next = {
            let mut a = app.borrow_mut();
            let App {
                sim, pointer, sink, ..
            } = &mut *a;
            sim.frame(ticket, pointer, sink).next()
        };

        if let Some(next) = next {
            request_animation_frame(app, next);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_app::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Frames simulated by the headless runner unless overridden
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_HEADLESS_FRAMES: u64 = 600;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Ball Arena (native) starting headless...");

    if let Err(e) = run_headless() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

/// Usage: `ball-arena [settings.json] [frames]`
#[cfg(not(target_arch = "wasm32"))]
fn run_headless() -> Result<(), ball_arena::LoopError> {
    use ball_arena::renderer::StatsSink;
    use ball_arena::{PointerState, Settings, Simulation};

    let mut args = std::env::args().skip(1);

    let mut settings = match args.next() {
        Some(path) => {
            log::info!("Loading settings from {}", path);
            Settings::load_from_file(&path)?
        }
        None => Settings::load(),
    };
    if settings.seed.is_none() {
        let seed = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        settings.seed = Some(seed);
    }
    log::info!("Seed: {:?}", settings.seed);

    let frames = match args.next() {
        Some(arg) => arg.parse().unwrap_or_else(|_| {
            log::warn!("Invalid frame count {:?}, using {}", arg, DEFAULT_HEADLESS_FRAMES);
            DEFAULT_HEADLESS_FRAMES
        }),
        None => DEFAULT_HEADLESS_FRAMES,
    };

    let count = settings.ball_count;
    let mut sim = Simulation::new(settings)?;
    let mut pointer = PointerState::default();
    let mut sink = StatsSink::default();

    let mut ticket = Some(sim.start(count)?);
    for _ in 0..frames {
        let Some(current) = ticket else { break };
        ticket = sim.frame(current, &mut pointer, &mut sink).next();
    }

    let energy = sim.world().map(|w| w.kinetic_energy()).unwrap_or_default();
    log::info!(
        "{} ticks, {} disks drawn, kinetic energy {:.3}",
        sim.ticks(),
        sink.disks_total,
        energy
    );

    match serde_json::to_string_pretty(sim.bodies()) {
        Ok(json) => println!("{}", json),
        Err(e) => log::warn!("Could not serialize bodies: {}", e),
    }

    sim.stop()
}
