//! Browser host: canvas setup, keyboard input, the `requestAnimationFrame`
//! loop and painting of draw commands onto a 2D context.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement, window};

use crate::config::{GameConfig, HudConfig};
use crate::hud::HudSnapshot;
use crate::projection::Viewport;
use crate::race::{Input, Race};
use crate::render::{DrawCommand, Sheet};
use crate::rng;

/// Longest step fed to the simulation after a stall (tab switch, breakpoint).
const MAX_FRAME_DT: f64 = 1.0;

struct Host {
    race: Race,
    ctx: CanvasRenderingContext2d,
    viewport: Viewport,
    sprites: HtmlImageElement,
    background: HtmlImageElement,
    input: Input,
    last_ts: Option<f64>,
    last_hud_ts: f64,
}

thread_local! {
    static HOST: RefCell<Option<Host>> = const { RefCell::new(None) };
    static LOOP_STARTED: Cell<bool> = const { Cell::new(false) };
}

type FrameCallback = Rc<RefCell<Option<Closure<dyn FnMut(f64)>>>>;

/// Boots the racer. `config_json` is the page's game config; `None` or an
/// empty string runs the defaults. Calling again restarts with the new config.
#[wasm_bindgen]
pub fn start_game(config_json: Option<String>) -> Result<(), JsValue> {
    let config = match config_json.as_deref().map(str::trim) {
        Some(json) if !json.is_empty() => {
            GameConfig::from_json(json).map_err(|e| JsValue::from_str(&e.to_string()))?
        }
        _ => GameConfig::default(),
    };

    let win = window().ok_or_else(|| JsValue::from_str("no window"))?;
    let doc = win
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let canvas = find_or_create_canvas(&doc, &config)?;
    let ctx: CanvasRenderingContext2d = canvas
        .get_context("2d")?
        .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
        .dyn_into()?;
    let viewport = Viewport::new(f64::from(canvas.width()), f64::from(canvas.height()));

    let sprites = load_image(&config.assets.base_path, &config.assets.sprites)?;
    let background = load_image(&config.assets.base_path, &config.assets.background)?;
    check_hud_elements(&doc, &config.hud);

    let race = Race::new(config, rng::from_entropy());
    HOST.with(|h| {
        h.replace(Some(Host {
            race,
            ctx,
            viewport,
            sprites,
            background,
            input: Input::default(),
            last_ts: None,
            last_hud_ts: f64::NEG_INFINITY,
        }))
    });

    if !LOOP_STARTED.with(|s| s.replace(true)) {
        install_key_listeners(&doc)?;
        start_race_loop();
    }
    info!("race started on {}x{} canvas", viewport.width, viewport.height);
    Ok(())
}

/// Rebuilds the track and traffic and returns the player to the start line.
#[wasm_bindgen]
pub fn reset_game() {
    HOST.with(|h| {
        if let Some(host) = h.borrow_mut().as_mut() {
            host.race.reset();
            host.input = Input::default();
        }
    });
}

fn find_or_create_canvas(doc: &Document, config: &GameConfig) -> Result<HtmlCanvasElement, JsValue> {
    let id = &config.canvas.element_id;
    if let Some(el) = doc.get_element_by_id(id) {
        return el.dyn_into::<HtmlCanvasElement>().map_err(JsValue::from);
    }
    let canvas: HtmlCanvasElement = doc.create_element("canvas")?.dyn_into()?;
    canvas.set_id(id);
    canvas.set_width(config.canvas.width);
    canvas.set_height(config.canvas.height);
    canvas
        .set_attribute("style", "display:block; margin:0 auto; background:#72D7EE;")
        .ok();
    doc.body()
        .ok_or_else(|| JsValue::from_str("no body"))?
        .append_child(&canvas)?;
    Ok(canvas)
}

fn load_image(base_path: &str, file: &str) -> Result<HtmlImageElement, JsValue> {
    let img = HtmlImageElement::new()?;
    img.set_src(&format!("{base_path}{file}"));
    Ok(img)
}

fn check_hud_elements(doc: &Document, hud: &HudConfig) {
    for selector in [&hud.speed_selector, &hud.lap_time_selector] {
        if !matches!(doc.query_selector(selector), Ok(Some(_))) {
            warn!("HUD element {selector} not found; it will not be updated");
        }
    }
}

/// Which control a key drives. Arrows and WASD, either case.
fn key_control<'a>(input: &'a mut Input, key: &str) -> Option<&'a mut bool> {
    match key {
        "ArrowLeft" | "a" | "A" => Some(&mut input.left),
        "ArrowRight" | "d" | "D" => Some(&mut input.right),
        "ArrowUp" | "w" | "W" => Some(&mut input.faster),
        "ArrowDown" | "s" | "S" => Some(&mut input.slower),
        _ => None,
    }
}

/// Applies a key transition; returns whether the key is bound.
fn apply_key(input: &mut Input, key: &str, pressed: bool) -> bool {
    match key_control(input, key) {
        Some(control) => {
            *control = pressed;
            true
        }
        None => false,
    }
}

fn install_key_listeners(doc: &Document) -> Result<(), JsValue> {
    for (event, pressed) in [("keydown", true), ("keyup", false)] {
        let closure = Closure::wrap(Box::new(move |evt: web_sys::KeyboardEvent| {
            let handled = HOST.with(|h| {
                h.borrow_mut()
                    .as_mut()
                    .is_some_and(|host| apply_key(&mut host.input, &evt.key(), pressed))
            });
            if handled {
                evt.prevent_default();
            }
        }) as Box<dyn FnMut(web_sys::KeyboardEvent)>);
        doc.add_event_listener_with_callback(event, closure.as_ref().unchecked_ref())?;
        closure.forget();
    }
    Ok(())
}

fn start_race_loop() {
    let f: FrameCallback = Rc::new(RefCell::new(None));
    let g = f.clone();
    *g.borrow_mut() = Some(Closure::wrap(Box::new(move |ts: f64| {
        HOST.with(|h| {
            if let Some(host) = h.borrow_mut().as_mut() {
                tick(host, ts);
            }
        });
        request_frame(&f);
    }) as Box<dyn FnMut(f64)>));
    request_frame(&g);
}

fn request_frame(callback: &FrameCallback) {
    if let (Some(w), Some(cb)) = (window(), callback.borrow().as_ref()) {
        if let Err(e) = w.request_animation_frame(cb.as_ref().unchecked_ref()) {
            warn!("requestAnimationFrame failed: {e:?}");
        }
    }
}

fn tick(host: &mut Host, ts: f64) {
    let dt = host
        .last_ts
        .map_or(0.0, |last| ((ts - last) / 1000.0).clamp(0.0, MAX_FRAME_DT));
    host.last_ts = Some(ts);

    host.race.update(dt, host.input);
    let frame = host.race.render(host.viewport);
    paint(&host.ctx, &frame.commands, &host.sprites, &host.background);

    let hud = &host.race.config().hud;
    if ts - host.last_hud_ts >= hud.update_frequency {
        update_hud(hud, &host.race.hud());
        host.last_hud_ts = ts;
    }
}

fn paint(
    ctx: &CanvasRenderingContext2d,
    commands: &[DrawCommand<'_>],
    sprites: &HtmlImageElement,
    background: &HtmlImageElement,
) {
    for cmd in commands {
        match cmd {
            DrawCommand::Rect { rect, color, alpha } => {
                ctx.set_global_alpha(*alpha);
                ctx.set_fill_style_str(color);
                ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
                ctx.set_global_alpha(1.0);
            }
            DrawCommand::Polygon { points, color } => {
                ctx.set_fill_style_str(color);
                ctx.begin_path();
                ctx.move_to(points[0].0, points[0].1);
                for &(x, y) in &points[1..] {
                    ctx.line_to(x, y);
                }
                ctx.close_path();
                ctx.fill();
            }
            DrawCommand::Image { sheet, source, dest } => {
                let img = match sheet {
                    Sheet::Sprites => sprites,
                    Sheet::Background => background,
                };
                // still loading
                if !img.complete() || img.natural_width() == 0 {
                    continue;
                }
                if let Err(e) = ctx.draw_image_with_html_image_element_and_sw_and_sh_and_dx_and_dy_and_dw_and_dh(
                    img, source.x, source.y, source.w, source.h, dest.x, dest.y, dest.w, dest.h,
                ) {
                    warn!("drawImage from {sheet:?} sheet failed: {e:?}");
                }
            }
        }
    }
}

fn speed_text(hud: &HudConfig, snapshot: &HudSnapshot) -> String {
    format!("{}: {} mph", hud.speed_label, snapshot.speed_mph)
}

fn lap_time_text(hud: &HudConfig, snapshot: &HudSnapshot) -> String {
    match snapshot.last_lap_text() {
        Some(last) => format!("{}: {} (last {})", hud.lap_time_label, snapshot.current_lap_text(), last),
        None => format!("{}: {}", hud.lap_time_label, snapshot.current_lap_text()),
    }
}

fn update_hud(hud: &HudConfig, snapshot: &HudSnapshot) {
    let Some(doc) = window().and_then(|w| w.document()) else {
        return;
    };
    if let Ok(Some(el)) = doc.query_selector(&hud.speed_selector) {
        el.set_text_content(Some(&speed_text(hud, snapshot)));
    }
    if let Ok(Some(el)) = doc.query_selector(&hud.lap_time_selector) {
        el.set_text_content(Some(&lap_time_text(hud, snapshot)));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn arrows_and_wasd_drive_input() {
        let mut input = Input::default();
        assert!(apply_key(&mut input, "ArrowLeft", true));
        assert!(apply_key(&mut input, "W", true));
        assert!(input.left && input.faster);
        assert!(apply_key(&mut input, "a", false));
        assert!(!input.left);
        assert!(apply_key(&mut input, "s", true));
        assert!(input.slower);
        assert!(!apply_key(&mut input, "Enter", true));
        assert_eq!(input, Input { left: false, right: false, faster: true, slower: true });
    }

    #[test]
    fn hud_text_uses_labels() {
        let hud = HudConfig::default();
        let snapshot = HudSnapshot::new(6000.0, 12000.0, 12.34, None);
        assert_eq!(speed_text(&hud, &snapshot), "Speed: 100 mph");
        assert_eq!(lap_time_text(&hud, &snapshot), "Time: 12.3");
        let snapshot = HudSnapshot::new(0.0, 12000.0, 1.0, Some(75.0));
        assert_eq!(lap_time_text(&hud, &snapshot), "Time: 1.0 (last 1.15.0)");
    }
}
