//! Vault Lock entry point
//!
//! Handles platform-specific initialization and wires input to the vault.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Element, Event, HtmlElement, HtmlInputElement, MouseEvent};

    use vault_lock::Settings;
    use vault_lock::consts::*;
    use vault_lock::vault::{CombinationRules, Direction, GameController, Presentation, Vault};

    type DomVault = Vault<DomPresentation>;

    /// Resolve after `secs` via setTimeout
    async fn sleep(secs: f32) {
        let ms = (secs * 1000.0) as i32;
        let promise = js_sys::Promise::new(&mut |resolve, _reject| {
            if let Some(window) = web_sys::window() {
                let _ = window.set_timeout_with_callback_and_timeout_and_arguments_0(&resolve, ms);
            }
        });
        let _ = wasm_bindgen_futures::JsFuture::from(promise).await;
    }

    /// CSS-driven view of the vault
    struct DomPresentation {
        door: HtmlElement,
        handle: HtmlElement,
        reveal: Option<HtmlElement>,
        timer_text: Option<Element>,
        settings: RefCell<Settings>,
        /// Accumulated handle rotation (radians)
        handle_angle: Cell<f32>,
        /// Date.now() when the timer was started
        timer_started: Cell<Option<f64>>,
    }

    impl DomPresentation {
        fn rotate_handle(&self, delta: f32, secs: f32) {
            let angle = self.handle_angle.get() + delta;
            self.handle_angle.set(angle);
            let style = self.handle.style();
            let _ = style.set_property("transition", &format!("transform {}s ease-out", secs));
            let _ = style.set_property("transform", &format!("rotate({}rad)", angle));
        }

        fn set_timer_text(&self, secs: f64) {
            if let Some(el) = &self.timer_text {
                el.set_text_content(Some(&format!("{:.1} s", secs)));
            }
        }

        /// Refresh the elapsed time (called every frame)
        fn update_timer(&self) {
            if let Some(started) = self.timer_started.get() {
                self.set_timer_text((js_sys::Date::now() - started) / 1000.0);
            }
        }
    }

    impl Presentation for DomPresentation {
        async fn play_open_sequence(&self) {
            let _ = self.handle.class_list().add_1("hidden");
            let _ = self.door.class_list().add_1("open");
            sleep(DOOR_OPEN_SECS).await;
        }

        async fn play_reveal(&self) {
            let delay = self.settings.borrow().effective_reveal_delay();
            sleep(delay).await;
            if self.settings.borrow().reduced_motion {
                return;
            }
            if let Some(reveal) = &self.reveal {
                let _ = reveal.class_list().add_1("blink");
                sleep(BLINK_SECS).await;
                let _ = reveal.class_list().remove_1("blink");
            }
        }

        async fn play_fail_spin(&self) {
            let turns = if self.settings.borrow().reduced_motion {
                1
            } else {
                FAIL_SPIN_TURNS
            };
            self.rotate_handle(turns as f32 * std::f32::consts::TAU, FAIL_SPIN_SECS);
            sleep(FAIL_SPIN_SECS).await;
        }

        async fn reset_visuals(&self) {
            let _ = self.door.class_list().remove_1("open");
            let _ = self.handle.class_list().remove_1("hidden");
            self.handle_angle.set(0.0);
            let style = self.handle.style();
            let _ = style.set_property("transition", "none");
            let _ = style.set_property("transform", "rotate(0rad)");
        }

        fn start_timer(&self) {
            self.timer_started.set(Some(js_sys::Date::now()));
        }

        fn stop_timer(&self) {
            // Freeze the display at the last value
            self.update_timer();
            self.timer_started.set(None);
        }

        fn reset_timer(&self) {
            self.timer_started.set(None);
            self.set_timer_text(0.0);
        }
    }

    fn html_element(document: &web_sys::Document, id: &str) -> Option<HtmlElement> {
        document
            .get_element_by_id(id)
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Vault Lock starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        let settings = Settings::load();
        let rules = settings.rules().unwrap_or_else(|e| {
            log::warn!("Invalid combination settings ({}), using defaults", e);
            CombinationRules::default()
        });

        let door = html_element(&document, "door").expect("no door element");
        let handle = html_element(&document, "handle").expect("no handle element");

        let presentation = DomPresentation {
            door,
            handle: handle.clone(),
            reveal: html_element(&document, "reveal"),
            timer_text: document.get_element_by_id("timer"),
            settings: RefCell::new(settings),
            handle_angle: Cell::new(0.0),
            timer_started: Cell::new(None),
        };

        let seed = js_sys::Date::now() as u64;
        let vault = Rc::new(Vault::new(GameController::seeded(rules, seed), presentation));
        log::info!("Vault initialized with seed: {}", seed);

        setup_handle_input(&handle, vault.clone());
        setup_reduced_motion_toggle(&document, vault.clone());

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        if let Err(e) = vault.start() {
            log::error!("Could not start vault: {}", e);
            return;
        }

        request_animation_frame(vault);

        log::info!("Vault Lock running!");
    }

    fn setup_handle_input(handle: &HtmlElement, vault: Rc<DomVault>) {
        let handle_clone = handle.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
            // Right half turns clockwise
            let half = handle_clone.client_width() as f32 / 2.0;
            let direction = if event.offset_x() as f32 >= half {
                Direction::Clockwise
            } else {
                Direction::CounterClockwise
            };

            if vault.state().accepts_input() {
                vault
                    .presentation()
                    .rotate_handle(direction.sign() as f32 * STEP_ANGLE, HANDLE_STEP_SECS);
            }

            let vault = vault.clone();
            wasm_bindgen_futures::spawn_local(async move {
                if let Err(e) = vault.on_step(direction).await {
                    log::error!("Vault sequence failed: {}", e);
                }
            });
        });
        let _ = handle
            .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// Persist the reduced-motion checkbox, if the page has one
    fn setup_reduced_motion_toggle(document: &web_sys::Document, vault: Rc<DomVault>) {
        let Some(toggle) = document
            .get_element_by_id("reduced-motion")
            .and_then(|el| el.dyn_into::<HtmlInputElement>().ok())
        else {
            return;
        };
        toggle.set_checked(vault.presentation().settings.borrow().reduced_motion);

        let toggle_clone = toggle.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: Event| {
            let mut settings = vault.presentation().settings.borrow_mut();
            settings.set_reduced_motion(toggle_clone.checked());
            settings.save();
        });
        let _ = toggle.add_event_listener_with_callback("change", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(vault: Rc<DomVault>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |_time: f64| {
            vault.presentation().update_timer();
            request_animation_frame(vault);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native_game {
    use std::cell::Cell;
    use std::io::BufRead;
    use std::time::{Instant, SystemTime, UNIX_EPOCH};

    use futures::channel::mpsc;
    use futures::executor::block_on;

    use vault_lock::Settings;
    use vault_lock::vault::{CombinationRules, Direction, GameController, Presentation, Vault};

    /// Terminal view: animations are instant, feedback is printed
    #[derive(Default)]
    struct ConsolePresentation {
        started: Cell<Option<Instant>>,
    }

    impl Presentation for ConsolePresentation {
        async fn play_open_sequence(&self) {
            println!("*clunk* The door swings open.");
        }

        async fn play_reveal(&self) {
            println!("Treasure glitters inside the vault!");
        }

        async fn play_fail_spin(&self) {
            println!("Wrong way! The handle spins wildly.");
        }

        async fn reset_visuals(&self) {
            println!("The door closes. A new combination is set.");
        }

        fn start_timer(&self) {
            self.started.set(Some(Instant::now()));
        }

        fn stop_timer(&self) {
            if let Some(started) = self.started.take() {
                println!("Time: {:.1} s", started.elapsed().as_secs_f32());
            }
        }

        fn reset_timer(&self) {
            self.started.set(None);
        }
    }

    pub fn run() {
        let settings = Settings::load();
        let rules = settings.rules().unwrap_or_else(|e| {
            log::warn!("Invalid combination settings ({}), using defaults", e);
            CombinationRules::default()
        });

        let seed = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or_default();
        log::info!("Vault initialized with seed: {}", seed);

        let vault = Vault::new(
            GameController::seeded(rules, seed),
            ConsolePresentation::default(),
        );
        if let Err(e) = vault.start() {
            log::error!("Could not start vault: {}", e);
            return;
        }

        println!("Turn the handle: cw / ccw (q to quit)");

        let (tx, rx) = mpsc::unbounded();
        std::thread::spawn(move || {
            for line in std::io::stdin().lock().lines() {
                let Ok(line) = line else { break };
                let input = line.trim();
                if input == "q" || input == "quit" {
                    break;
                }
                match Direction::parse(input) {
                    Some(direction) => {
                        if tx.unbounded_send(direction).is_err() {
                            break;
                        }
                    }
                    None => println!("Unknown direction {:?} (try cw or ccw)", input),
                }
            }
        });

        if let Err(e) = block_on(vault.run(rx)) {
            log::error!("Vault stopped: {}", e);
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Vault Lock (native) starting...");
    native_game::run();
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
