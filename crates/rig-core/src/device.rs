//! Placed equipment and its jacks.
//!
//! A [`Device`] is one placement of a catalog item. Ports carry offsets relative
//! to the device origin; world positions are derived on demand so a move or a
//! rotation never has to touch the port list.

use glam::{Quat, Vec3};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::catalog::infer_roles;

/// Capability tag assigned at import time.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Multi-channel device the others route through (a mixer).
    Hub,
    /// Feeds a numbered hub channel (a player).
    Peripheral,
    /// Patched through a send/return loop (an effects unit).
    Satellite,
    /// Fed from the hub's master bus.
    Speaker,
}

/// Small ordered set of [`Role`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleTags(SmallVec<[Role; 4]>);

impl RoleTags {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, role: Role) {
        if !self.0.contains(&role) {
            self.0.push(role);
        }
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }

    pub fn extend(&mut self, other: &RoleTags) {
        for r in other.iter() {
            self.insert(r);
        }
    }
}

impl FromIterator<Role> for RoleTags {
    fn from_iter<T: IntoIterator<Item = Role>>(iter: T) -> Self {
        let mut tags = RoleTags::new();
        for r in iter {
            tags.insert(r);
        }
        tags
    }
}

/// Which kind of setup the user is building.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetupKind {
    #[default]
    Dj,
    Producer,
    Musician,
}

impl SetupKind {
    /// Only studio setups get monitor cabling from the master bus.
    pub fn supports_speakers(self) -> bool {
        matches!(self, SetupKind::Producer)
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "dj" => Some(SetupKind::Dj),
            "producer" => Some(SetupKind::Producer),
            "musician" => Some(SetupKind::Musician),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Input,
    Output,
}

/// Stereo side of a speaker or master output.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Left => Side::Right,
            Side::Right => Side::Left,
        }
    }
}

/// A single physical jack.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Port {
    /// Free-text label ("Line Out", "Return In", ...). Doubles as kind and display name.
    #[serde(rename = "type")]
    pub kind: String,
    /// Offset from the owning device's origin.
    #[serde(default)]
    pub coordinate: Option<Vec3>,
    #[serde(default, rename = "isConnected")]
    pub is_connected: bool,
}

impl Port {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            coordinate: None,
            is_connected: false,
        }
    }

    pub fn at(kind: impl Into<String>, coordinate: Vec3) -> Self {
        Self {
            kind: kind.into(),
            coordinate: Some(coordinate),
            is_connected: false,
        }
    }

    /// The offset, if present and finite on every axis.
    #[inline]
    pub fn valid_coordinate(&self) -> Option<Vec3> {
        self.coordinate.filter(|c| c.is_finite())
    }
}

/// One placement of a catalog item.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Device {
    /// Catalog id, shared by every placement of the same product.
    pub id: String,
    /// Per-placement id, fixed when the device is first placed.
    #[serde(rename = "uniqueId")]
    pub unique_id: String,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: String,
    pub position: Vec3,
    /// Yaw in radians about +Y.
    #[serde(default, rename = "rotationY")]
    pub rotation_y: f32,
    #[serde(default)]
    pub inputs: Vec<Port>,
    #[serde(default)]
    pub outputs: Vec<Port>,
    #[serde(default, rename = "spotType")]
    pub spot: Option<String>,
    #[serde(default)]
    pub roles: RoleTags,
}

impl Device {
    /// Place a catalog item at `position`, inferring roles from its name and type.
    pub fn place(
        id: impl Into<String>,
        name: impl Into<String>,
        kind: impl Into<String>,
        position: Vec3,
    ) -> Self {
        let id = id.into();
        let name = name.into();
        let kind = kind.into();
        let roles = infer_roles(&name, &kind, None);
        Self {
            unique_id: placement_id(&id, position),
            id,
            name,
            kind,
            position,
            rotation_y: 0.0,
            inputs: Vec::new(),
            outputs: Vec::new(),
            spot: None,
            roles,
        }
    }

    pub fn with_inputs<I, P>(mut self, inputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Port>,
    {
        self.inputs = inputs.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_outputs<I, P>(mut self, outputs: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<Port>,
    {
        self.outputs = outputs.into_iter().map(Into::into).collect();
        self
    }

    /// Tag the placement slot; slot names also contribute roles.
    pub fn with_spot(mut self, spot: impl Into<String>) -> Self {
        let spot = spot.into();
        let spot_roles = infer_roles("", "", Some(&spot));
        self.roles.extend(&spot_roles);
        self.spot = Some(spot);
        self
    }

    /// Replace inferred roles with an explicit set.
    pub fn with_roles<I: IntoIterator<Item = Role>>(mut self, roles: I) -> Self {
        self.roles = roles.into_iter().collect();
        self
    }

    pub fn with_rotation(mut self, rotation_y: f32) -> Self {
        self.rotation_y = rotation_y;
        self
    }

    #[inline]
    pub fn has_role(&self, role: Role) -> bool {
        self.roles.contains(role)
    }

    pub fn ports(&self, direction: Direction) -> &[Port] {
        match direction {
            Direction::Input => &self.inputs,
            Direction::Output => &self.outputs,
        }
    }

    pub fn ports_mut(&mut self, direction: Direction) -> &mut [Port] {
        match direction {
            Direction::Input => &mut self.inputs,
            Direction::Output => &mut self.outputs,
        }
    }

    /// World position of a relative offset on this device.
    #[inline]
    pub fn world_point(&self, offset: Vec3) -> Vec3 {
        self.position + Quat::from_rotation_y(self.rotation_y) * offset
    }

    /// World position of `port`, or `None` when its coordinate is unusable.
    pub fn port_world_position(&self, port: &Port) -> Option<Vec3> {
        port.valid_coordinate().map(|c| self.world_point(c))
    }

    /// Label used in connection keys: the port type, suffixed with `#index` when the
    /// same type occurs more than once on this side of the device.
    pub fn port_label(&self, direction: Direction, index: usize) -> String {
        let ports = self.ports(direction);
        let Some(port) = ports.get(index) else {
            return String::new();
        };
        let repeats = ports.iter().filter(|p| p.kind == port.kind).count() > 1;
        if repeats {
            format!("{}#{}", port.kind, index)
        } else {
            port.kind.clone()
        }
    }
}

impl From<&str> for Port {
    fn from(kind: &str) -> Self {
        Port::new(kind)
    }
}

impl From<(&str, Vec3)> for Port {
    fn from((kind, coordinate): (&str, Vec3)) -> Self {
        Port::at(kind, coordinate)
    }
}

/// Stable per-placement id: catalog id plus the placement position.
pub fn placement_id(id: &str, position: Vec3) -> String {
    format!(
        "{}@{:.3},{:.3},{:.3}",
        id, position.x, position.y, position.z
    )
}
