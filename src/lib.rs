#![cfg(target_arch = "wasm32")]
use std::cell::RefCell;
use std::rc::Rc;

use glam::Vec3;
use rig_core::{Rig, RoutingParams, SetupKind};
use wasm_bindgen::prelude::*;
use web_sys as web;

mod encode;
mod load;
mod scene;

use encode::{parse_device, parse_params, parse_ports, report_json, setup_from_query};
use scene::JsScene;

#[wasm_bindgen(start)]
pub fn start() -> Result<(), JsValue> {
    console_error_panic_hook::set_once();
    console_log::init_with_level(log::Level::Info).ok();
    log::info!("rig-web starting");
    Ok(())
}

fn setup_from_location() -> Option<SetupKind> {
    let search = web::window()?.location().search().ok()?;
    setup_from_query(&search)
}

fn js_err(e: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&e.to_string())
}

/// Handle the page holds on to. Every mutating call reconciles and returns the
/// reconcile report as JSON.
#[wasm_bindgen]
pub struct RigHandle {
    inner: Rc<RefCell<Rig<JsScene>>>,
}

#[wasm_bindgen]
impl RigHandle {
    /// `callbacks` carries `drawCable`, `removeCable` and `updateCablePath`.
    /// `setup` falls back to the `?setup=` query parameter, then to a DJ setup.
    #[wasm_bindgen(constructor)]
    pub fn new(callbacks: JsValue, setup: Option<String>) -> Result<RigHandle, JsValue> {
        let scene = JsScene::from_callbacks(&callbacks)?;
        let kind = setup
            .as_deref()
            .and_then(SetupKind::from_name)
            .or_else(setup_from_location)
            .unwrap_or_default();
        log::info!("[rig] new {:?} setup", kind);
        Ok(RigHandle {
            inner: Rc::new(RefCell::new(Rig::new(scene, RoutingParams::for_setup(kind)))),
        })
    }

    #[wasm_bindgen(js_name = addDevice)]
    pub fn add_device(&self, json: &str) -> Result<String, JsValue> {
        let device = parse_device(json).map_err(js_err)?;
        let report = self.inner.borrow_mut().add_device(device).map_err(js_err)?;
        Ok(report_json(&report))
    }

    #[wasm_bindgen(js_name = removeDevice)]
    pub fn remove_device(&self, unique_id: &str) -> Result<String, JsValue> {
        let report = self
            .inner
            .borrow_mut()
            .remove_device(unique_id)
            .map_err(js_err)?;
        Ok(report_json(&report))
    }

    #[wasm_bindgen(js_name = moveDevice)]
    pub fn move_device(&self, unique_id: &str, x: f32, y: f32, z: f32) -> Result<String, JsValue> {
        let report = self
            .inner
            .borrow_mut()
            .move_device(unique_id, Vec3::new(x, y, z))
            .map_err(js_err)?;
        Ok(report_json(&report))
    }

    #[wasm_bindgen(js_name = rotateDevice)]
    pub fn rotate_device(&self, unique_id: &str, rotation_y: f32) -> Result<String, JsValue> {
        let report = self
            .inner
            .borrow_mut()
            .rotate_device(unique_id, rotation_y)
            .map_err(js_err)?;
        Ok(report_json(&report))
    }

    #[wasm_bindgen(js_name = setPorts)]
    pub fn set_ports(&self, unique_id: &str, inputs: &str, outputs: &str) -> Result<String, JsValue> {
        let inputs = parse_ports(inputs).map_err(js_err)?;
        let outputs = parse_ports(outputs).map_err(js_err)?;
        let report = self
            .inner
            .borrow_mut()
            .set_ports(unique_id, inputs, outputs)
            .map_err(js_err)?;
        Ok(report_json(&report))
    }

    /// Replace the whole setup from a JSON array of device documents.
    #[wasm_bindgen(js_name = loadSetup)]
    pub fn load_setup(&self, json: &str) -> Result<String, JsValue> {
        let devices = rig_core::import_devices(json).map_err(js_err)?;
        let report = self.inner.borrow_mut().load_setup(devices).map_err(js_err)?;
        Ok(report_json(&report))
    }

    /// Add devices as their asset promises resolve.
    #[wasm_bindgen(js_name = loadAssets)]
    pub fn load_assets(&self, assets: js_sys::Array) {
        load::spawn_asset_loads(&self.inner, &assets);
    }

    #[wasm_bindgen(js_name = setSetup)]
    pub fn set_setup(&self, setup: &str) -> Result<String, JsValue> {
        let kind = SetupKind::from_name(setup)
            .ok_or_else(|| JsValue::from_str(&format!("unknown setup '{}'", setup)))?;
        let mut rig = self.inner.borrow_mut();
        let params = RoutingParams {
            setup: kind,
            ..rig.params().clone()
        };
        Ok(report_json(&rig.set_params(params)))
    }

    #[wasm_bindgen(js_name = setParams)]
    pub fn set_params(&self, json: &str) -> Result<String, JsValue> {
        let params = parse_params(json).map_err(js_err)?;
        Ok(report_json(&self.inner.borrow_mut().set_params(params)))
    }

    pub fn reconcile(&self) -> String {
        report_json(&self.inner.borrow_mut().reconcile())
    }

    /// Current connections as JSON.
    pub fn connections(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.borrow().connections()).map_err(js_err)
    }

    /// Placed devices, with `isConnected` flags, as JSON.
    pub fn devices(&self) -> Result<String, JsValue> {
        serde_json::to_string(self.inner.borrow().devices()).map_err(js_err)
    }
}
