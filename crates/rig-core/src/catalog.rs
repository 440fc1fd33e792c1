//! Catalog import: turns persistence-layer device documents into [`Device`]s.
//!
//! This is the only module that looks at free-text names to decide what a
//! device *is*. Everything downstream works from [`RoleTags`].

use glam::Vec3;
use serde::Deserialize;
use serde_json::Value;

use crate::device::{placement_id, Device, Port, Role, RoleTags};
use crate::error::RigError;

const HUB_MARKERS: &[&str] = &["mixer", "djm"];
const PERIPHERAL_MARKERS: &[&str] = &["player", "cdj"];
const SATELLITE_MARKERS: &[&str] = &["fx", "rmx", "revolo"];
const SPEAKER_MARKERS: &[&str] = &["speaker", "monitor"];

const HUB_SPOTS: &[&str] = &["mixer"];
const PERIPHERAL_SPOTS: &[&str] = &["player", "deck"];
const SATELLITE_SPOTS: &[&str] = &["fx"];
const SPEAKER_SPOTS: &[&str] = &["speaker"];

/// Infer capability tags from a product name, its type tag and an optional slot tag.
pub fn infer_roles(name: &str, kind: &str, spot: Option<&str>) -> RoleTags {
    let text = format!("{} {}", name, kind).to_ascii_lowercase();
    let spot = spot.map(str::to_ascii_lowercase).unwrap_or_default();
    let hit = |markers: &[&str], hay: &str| markers.iter().any(|m| hay.contains(m));

    let mut roles = RoleTags::new();
    if hit(HUB_MARKERS, &text) || hit(HUB_SPOTS, &spot) {
        roles.insert(Role::Hub);
    }
    if hit(PERIPHERAL_MARKERS, &text) || hit(PERIPHERAL_SPOTS, &spot) {
        roles.insert(Role::Peripheral);
    }
    if hit(SATELLITE_MARKERS, &text) || hit(SATELLITE_SPOTS, &spot) {
        roles.insert(Role::Satellite);
    }
    if hit(SPEAKER_MARKERS, &text) || hit(SPEAKER_SPOTS, &spot) {
        roles.insert(Role::Speaker);
    }
    roles
}

#[derive(Clone, Debug, Deserialize)]
pub struct PortRecord {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub coordinate: Option<Value>,
}

/// Device document as stored by the persistence layer.
#[derive(Clone, Debug, Deserialize)]
pub struct DeviceRecord {
    pub id: String,
    #[serde(default, rename = "uniqueId")]
    pub unique_id: Option<String>,
    pub name: String,
    #[serde(default, rename = "type")]
    pub kind: String,
    pub position: Value,
    #[serde(default)]
    pub rotation: Option<f32>,
    #[serde(default)]
    pub inputs: Vec<PortRecord>,
    #[serde(default)]
    pub outputs: Vec<PortRecord>,
    #[serde(default, rename = "spotType")]
    pub spot: Option<String>,
    #[serde(default)]
    pub roles: Option<Vec<Role>>,
}

impl DeviceRecord {
    pub fn into_device(self) -> Result<Device, RigError> {
        let position = lenient_vec3(&self.position).ok_or_else(|| RigError::InvalidPosition {
            id: self.id.clone(),
        })?;
        let roles = match self.roles {
            Some(explicit) => explicit.into_iter().collect(),
            None => infer_roles(&self.name, &self.kind, self.spot.as_deref()),
        };
        let unique_id = self
            .unique_id
            .unwrap_or_else(|| placement_id(&self.id, position));
        Ok(Device {
            id: self.id,
            unique_id,
            name: self.name,
            kind: self.kind,
            position,
            rotation_y: self.rotation.filter(|r| r.is_finite()).unwrap_or(0.0),
            inputs: self.inputs.into_iter().map(PortRecord::into_port).collect(),
            outputs: self.outputs.into_iter().map(PortRecord::into_port).collect(),
            spot: self.spot,
            roles,
        })
    }
}

impl PortRecord {
    /// Malformed coordinates become `None` so routing falls back to defaults.
    pub fn into_port(self) -> Port {
        let coordinate = self.coordinate.as_ref().and_then(lenient_vec3);
        if self.coordinate.is_some() && coordinate.is_none() {
            log::debug!("[catalog] port '{}' has a malformed coordinate", self.kind);
        }
        Port {
            kind: self.kind,
            coordinate,
            is_connected: false,
        }
    }
}

/// Parse a JSON array of device documents.
pub fn import_devices(json: &str) -> Result<Vec<Device>, RigError> {
    let records: Vec<DeviceRecord> = serde_json::from_str(json)?;
    records.into_iter().map(DeviceRecord::into_device).collect()
}

/// Accepts `{x, y, z}` or `[x, y, z]`; anything missing or non-finite yields `None`.
pub fn lenient_vec3(value: &Value) -> Option<Vec3> {
    let (x, y, z) = match value {
        Value::Object(map) => (map.get("x")?, map.get("y")?, map.get("z")?),
        Value::Array(items) if items.len() == 3 => (&items[0], &items[1], &items[2]),
        _ => return None,
    };
    let v = Vec3::new(
        x.as_f64()? as f32,
        y.as_f64()? as f32,
        z.as_f64()? as f32,
    );
    v.is_finite().then_some(v)
}
