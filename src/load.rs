use std::cell::RefCell;
use std::rc::Rc;

use js_sys::{Array, Promise, JSON};
use rig_core::{Device, Rig};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use wasm_bindgen_futures::{spawn_local, JsFuture};

use crate::encode::parse_device;
use crate::scene::JsScene;

fn device_from_js(value: &JsValue) -> anyhow::Result<Device> {
    let text: String = JSON::stringify(value)
        .map_err(|e| anyhow::anyhow!("unserializable device document: {:?}", e))?
        .into();
    Ok(parse_device(&text)?)
}

/// Add each device as its asset promise settles, in whatever order they
/// settle. Every arrival reconciles; a rejected or malformed asset is logged
/// and skipped so the rest of the setup still wires up.
pub fn spawn_asset_loads(rig: &Rc<RefCell<Rig<JsScene>>>, assets: &Array) {
    log::info!("[load] waiting on {} device assets", assets.length());
    for (i, asset) in assets.iter().enumerate() {
        let rig = Rc::clone(rig);
        let promise = match asset.dyn_into::<Promise>() {
            Ok(p) => p,
            Err(v) => Promise::resolve(&v),
        };
        spawn_local(async move {
            let value = match JsFuture::from(promise).await {
                Ok(v) => v,
                Err(e) => {
                    log::warn!("[load] asset {} rejected: {:?}", i, e);
                    return;
                }
            };
            let device = match device_from_js(&value) {
                Ok(d) => d,
                Err(e) => {
                    log::warn!("[load] asset {} skipped: {:#}", i, e);
                    return;
                }
            };
            let name = device.name.clone();
            match rig.borrow_mut().add_device(device) {
                Ok(report) => log::info!(
                    "[load] {} placed ({} cables, +{} -{})",
                    name,
                    report.connections,
                    report.added,
                    report.removed
                ),
                Err(e) => log::warn!("[load] {} not placed: {}", name, e),
            }
        });
    }
}
