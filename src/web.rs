//! Browser binding
//!
//! JS owns the clock: it calls `step()` and schedules the next call with
//! `setTimeout` using the returned delay, so the simulation never blocks the
//! page. Slider and dropdown handlers call the setters directly.

use js_sys::Float32Array;
use wasm_bindgen::prelude::*;

use crate::settings::{Settings, rgba_from_slice};
use crate::sim::{Spirograph, StepOutcome};

/// Install the panic hook and console logger once per page
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        log::warn!("Logger already initialized");
    }
    log::info!("Spirograph wasm module loaded");
}

fn to_js(err: crate::SpiroError) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct WebSpirograph {
    inner: Spirograph,
}

#[wasm_bindgen]
impl WebSpirograph {
    /// Create with default settings, or from a settings JSON string
    #[wasm_bindgen(constructor)]
    pub fn new(settings_json: Option<String>) -> Result<WebSpirograph, JsValue> {
        let settings = match settings_json {
            Some(json) => Settings::from_json(&json).map_err(to_js)?,
            None => Settings::default(),
        };
        Ok(Self {
            inner: Spirograph::new(settings),
        })
    }

    pub fn set_circle_count(&mut self, count: usize) -> Result<(), JsValue> {
        self.inner.set_circle_count(count).map_err(to_js)
    }

    pub fn set_radius_ratio(&mut self, ratio: f32) -> Result<(), JsValue> {
        self.inner.set_radius_ratio(ratio).map_err(to_js)
    }

    pub fn set_pen_offset_ratio(&mut self, offset: f32) -> Result<(), JsValue> {
        self.inner.set_pen_offset_ratio(offset).map_err(to_js)
    }

    pub fn set_pen_width(&mut self, width: f32) {
        self.inner.set_pen_width(width);
    }

    /// Curve gradient; each color is `[r, g, b, a]` in [0, 1]
    pub fn set_pen_colors(&mut self, start: &[f32], end: &[f32]) -> Result<(), JsValue> {
        match (rgba_from_slice(start), rgba_from_slice(end)) {
            (Some(start), Some(end)) => {
                self.inner.set_pen_colors(start, end);
                Ok(())
            }
            _ => Err(JsValue::from_str("pen colors need 4 components")),
        }
    }

    /// Replace every setting from a JSON string; missing fields take defaults
    pub fn apply_settings(&mut self, settings_json: &str) -> Result<(), JsValue> {
        let settings = Settings::from_json(settings_json).map_err(to_js)?;
        self.inner.apply_settings(settings).map_err(to_js)
    }

    pub fn set_delay_seconds(&mut self, delay: f32) {
        self.inner.set_delay_seconds(delay);
    }

    /// The host parses the input field; only validated integers reach here
    pub fn set_target_iterations(&mut self, iterations: u32) {
        self.inner.set_target_iterations(iterations as usize);
    }

    pub fn start(&mut self) -> Result<(), JsValue> {
        self.inner.start().map_err(to_js)
    }

    /// Run one batch. Returns the delay in ms before the next call, or -1
    /// when the run is over.
    pub fn step(&mut self) -> f64 {
        match self.inner.step() {
            StepOutcome::Continue { delay } => delay.as_secs_f64() * 1000.0,
            StepOutcome::Finished | StepOutcome::Cancelled | StepOutcome::Idle => -1.0,
        }
    }

    pub fn cancel(&self) {
        self.inner.cancel();
    }

    pub fn reset(&mut self) {
        self.inner.reset();
    }

    pub fn controls_locked(&self) -> bool {
        self.inner.controls_locked()
    }

    /// Revealed curve as a flat `[x0, y0, x1, y1, ...]` array
    pub fn curve(&self) -> Float32Array {
        let flat: Vec<f32> = self
            .inner
            .pen()
            .curve()
            .iter()
            .flat_map(|p| [p.x, p.y])
            .collect();
        Float32Array::from(flat.as_slice())
    }

    /// Full frame (circles, pen, curve, flags) as JSON
    pub fn frame_json(&self) -> Result<String, JsValue> {
        serde_json::to_string(&self.inner.frame()).map_err(|e| JsValue::from_str(&e.to_string()))
    }

    pub fn settings_json(&self) -> Result<String, JsValue> {
        self.inner.settings().to_json().map_err(to_js)
    }
}
