// Pure helpers shared by the JS bindings; no wasm types so host tests can include this file.

use rig_core::catalog::PortRecord;
use rig_core::{Device, DeviceRecord, Port, ReconcileReport, RoutingParams, SetupKind};

/// `[r, g, b]` in 0..1 as a CSS `#rrggbb` string.
pub fn color_hex(rgb: [f32; 3]) -> String {
    let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
    format!("#{:02x}{:02x}{:02x}", byte(rgb[0]), byte(rgb[1]), byte(rgb[2]))
}

/// Handles the page hands back from `drawCable` must sit below this; the
/// range above it is reserved for handles minted on this side.
pub const LOCAL_HANDLE_BASE: u32 = 0x8000_0000;

/// A page-issued cable handle, if `value` is a whole number in the page's range.
pub fn page_handle(value: Option<f64>) -> Option<u32> {
    let v = value?;
    let in_range = v.is_finite() && v.fract() == 0.0 && v >= 0.0 && v < f64::from(LOCAL_HANDLE_BASE);
    in_range.then_some(v as u32)
}

/// One device document (the shape the persistence layer stores).
pub fn parse_device(json: &str) -> Result<Device, rig_core::RigError> {
    let record: DeviceRecord = serde_json::from_str(json)?;
    record.into_device()
}

/// A port list edited in the catalog panel. Coordinates are read the same
/// lenient way as on import.
pub fn parse_ports(json: &str) -> Result<Vec<Port>, serde_json::Error> {
    let records: Vec<PortRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(PortRecord::into_port).collect())
}

/// Routing knobs; fields left out keep their defaults.
pub fn parse_params(json: &str) -> Result<RoutingParams, serde_json::Error> {
    serde_json::from_str(json)
}

pub fn report_json(report: &ReconcileReport) -> String {
    serde_json::to_string(report).unwrap_or_else(|e| {
        log::error!("[encode] report serialization failed: {}", e);
        String::from("{}")
    })
}

/// `setup` value from a query string such as `?setup=producer&x=1`.
pub fn setup_from_query(query: &str) -> Option<SetupKind> {
    query
        .trim_start_matches('?')
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == "setup")
        .and_then(|(_, v)| SetupKind::from_name(v))
}
