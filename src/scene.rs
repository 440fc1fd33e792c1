use js_sys::{Float32Array, Function, Reflect};
use rig_core::{CableHandle, CablePath, Scene};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

use crate::encode::{color_hex, page_handle, LOCAL_HANDLE_BASE};

/// Scene backed by three JS callbacks supplied by the page:
///
/// - `drawCable(points: Float32Array, color: string) -> number` (a whole number below 2^31)
/// - `removeCable(handle: number)`
/// - `updateCablePath(handle: number, points: Float32Array)`
pub struct JsScene {
    draw: Function,
    remove: Function,
    update: Function,
    next_local: u32,
}

fn callback(callbacks: &JsValue, name: &str) -> Result<Function, JsValue> {
    Reflect::get(callbacks, &JsValue::from_str(name))?
        .dyn_into::<Function>()
        .map_err(|_| JsValue::from_str(&format!("scene callback '{}' is not a function", name)))
}

impl JsScene {
    pub fn from_callbacks(callbacks: &JsValue) -> Result<Self, JsValue> {
        Ok(Self {
            draw: callback(callbacks, "drawCable")?,
            remove: callback(callbacks, "removeCable")?,
            update: callback(callbacks, "updateCablePath")?,
            next_local: LOCAL_HANDLE_BASE,
        })
    }
}

impl Scene for JsScene {
    fn draw_cable(&mut self, path: &CablePath, color: [f32; 3]) -> CableHandle {
        let points = Float32Array::from(path.as_flat());
        let color = JsValue::from_str(&color_hex(color));
        let returned = match self.draw.call2(&JsValue::NULL, &points, &color) {
            Ok(v) => page_handle(v.as_f64()),
            Err(e) => {
                log::error!("[scene] drawCable threw: {:?}", e);
                None
            }
        };
        match returned {
            Some(h) => CableHandle(h),
            None => {
                let local = self.next_local;
                self.next_local = self.next_local.wrapping_add(1).max(LOCAL_HANDLE_BASE);
                log::warn!("[scene] drawCable gave no usable handle; using {}", local);
                CableHandle(local)
            }
        }
    }

    fn remove_cable(&mut self, handle: CableHandle) {
        if let Err(e) = self
            .remove
            .call1(&JsValue::NULL, &JsValue::from(handle.0))
        {
            log::error!("[scene] removeCable({}) threw: {:?}", handle.0, e);
        }
    }

    fn update_cable_path(&mut self, handle: CableHandle, path: &CablePath) {
        let points = Float32Array::from(path.as_flat());
        if let Err(e) = self
            .update
            .call2(&JsValue::NULL, &JsValue::from(handle.0), &points)
        {
            log::error!("[scene] updateCablePath({}) threw: {:?}", handle.0, e);
        }
    }
}
