//! The context object that owns a setup: its devices, the cables currently
//! drawn for them, the routing params and the scene collaborator.
//!
//! Every mutation re-runs [`Rig::reconcile`]. Reconciling is idempotent, so
//! callers may trigger it as often as they like (for example once per asset
//! load completion, in whatever order those arrive).

use glam::Vec3;
use serde::Serialize;

use crate::cable::{draw, line_ordinals};
use crate::connection::Connection;
use crate::device::{Device, Direction, Port};
use crate::error::RigError;
use crate::params::RoutingParams;
use crate::reconcile::{apply, diff, RenderedCable, Scene};
use crate::synth::{synthesize, Diagnostic};

/// What one reconciliation pass changed.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReconcileReport {
    pub added: usize,
    pub removed: usize,
    pub updated: usize,
    pub connections: usize,
    pub diagnostics: Vec<Diagnostic>,
}

impl ReconcileReport {
    /// True when the scene was left untouched.
    pub fn is_noop(&self) -> bool {
        self.added == 0 && self.removed == 0 && self.updated == 0
    }
}

pub struct Rig<S: Scene> {
    devices: Vec<Device>,
    connections: Vec<Connection>,
    cables: Vec<RenderedCable>,
    params: RoutingParams,
    scene: S,
}

impl<S: Scene> Rig<S> {
    pub fn new(scene: S, params: RoutingParams) -> Self {
        Self {
            devices: Vec::new(),
            connections: Vec::new(),
            cables: Vec::new(),
            params,
            scene,
        }
    }

    pub fn params(&self) -> &RoutingParams {
        &self.params
    }

    pub fn devices(&self) -> &[Device] {
        &self.devices
    }

    pub fn device(&self, unique_id: &str) -> Option<&Device> {
        self.devices.iter().find(|d| d.unique_id == unique_id)
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    pub fn cables(&self) -> &[RenderedCable] {
        &self.cables
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    /// Swap the routing params. Cable shape changes restyle every drawn
    /// cable in place; a setup change may add or drop speaker cables.
    pub fn set_params(&mut self, params: RoutingParams) -> ReconcileReport {
        let restyle = !self.params.same_geometry(&params);
        self.params = params;
        let restyled = if restyle { self.restyle_cables() } else { 0 };
        let mut report = self.reconcile();
        report.updated += restyled;
        report
    }

    pub fn add_device(&mut self, device: Device) -> Result<ReconcileReport, RigError> {
        check_position(&device.unique_id, device.position)?;
        if self.device(&device.unique_id).is_some() {
            return Err(RigError::DuplicatePlacement(device.unique_id));
        }
        log::debug!("[rig] add {} ({})", device.name, device.unique_id);
        self.devices.push(device);
        Ok(self.reconcile())
    }

    /// Remove a placement and every cable attached to it.
    pub fn remove_device(&mut self, unique_id: &str) -> Result<ReconcileReport, RigError> {
        let idx = self.index_of(unique_id)?;
        let device = self.devices.remove(idx);
        log::debug!("[rig] remove {} ({})", device.name, unique_id);

        let mut cascaded = 0;
        let scene = &mut self.scene;
        self.cables.retain(|c| {
            if c.key.touches(unique_id) {
                scene.remove_cable(c.handle);
                cascaded += 1;
                false
            } else {
                true
            }
        });
        self.connections.retain(|c| !c.touches(unique_id));

        let mut report = self.reconcile();
        report.removed += cascaded;
        Ok(report)
    }

    pub fn move_device(
        &mut self,
        unique_id: &str,
        position: Vec3,
    ) -> Result<ReconcileReport, RigError> {
        check_position(unique_id, position)?;
        let idx = self.index_of(unique_id)?;
        self.devices[idx].position = position;
        Ok(self.reconcile())
    }

    pub fn rotate_device(
        &mut self,
        unique_id: &str,
        rotation_y: f32,
    ) -> Result<ReconcileReport, RigError> {
        if !rotation_y.is_finite() {
            return Err(RigError::InvalidRotation {
                id: unique_id.to_string(),
            });
        }
        let idx = self.index_of(unique_id)?;
        self.devices[idx].rotation_y = rotation_y;
        Ok(self.reconcile())
    }

    /// Replace a device's jacks (catalog edits).
    pub fn set_ports(
        &mut self,
        unique_id: &str,
        inputs: Vec<Port>,
        outputs: Vec<Port>,
    ) -> Result<ReconcileReport, RigError> {
        let idx = self.index_of(unique_id)?;
        let device = &mut self.devices[idx];
        device.inputs = inputs;
        device.outputs = outputs;
        Ok(self.reconcile())
    }

    /// Replace the whole device set (saved layout, bulk import) in one pass.
    pub fn load_setup(&mut self, devices: Vec<Device>) -> Result<ReconcileReport, RigError> {
        for (i, d) in devices.iter().enumerate() {
            check_position(&d.unique_id, d.position)?;
            if devices[..i].iter().any(|o| o.unique_id == d.unique_id) {
                return Err(RigError::DuplicatePlacement(d.unique_id.clone()));
            }
        }
        log::info!("[rig] loading setup with {} devices", devices.len());
        self.devices = devices;
        Ok(self.reconcile())
    }

    /// Re-derive connections from the device list and update only the cables
    /// that changed.
    pub fn reconcile(&mut self) -> ReconcileReport {
        let synthesis = synthesize(&self.devices, &self.params);
        let plan = diff(
            &synthesis.connections,
            &self.cables,
            self.params.endpoint_epsilon,
        );
        let counts = apply(
            &mut self.scene,
            &mut self.cables,
            &synthesis.connections,
            &plan,
            &self.params,
        );
        self.connections = synthesis.connections;
        self.refresh_port_flags();

        if counts.added + counts.removed + counts.updated > 0 {
            log::info!(
                "[rig] reconcile: +{} -{} ~{} ({} cables)",
                counts.added,
                counts.removed,
                counts.updated,
                self.cables.len()
            );
        }
        ReconcileReport {
            added: counts.added,
            removed: counts.removed,
            updated: counts.updated,
            connections: self.connections.len(),
            diagnostics: synthesis.diagnostics,
        }
    }

    fn restyle_cables(&mut self) -> usize {
        let ordinals = line_ordinals(&self.connections);
        let mut restyled = 0;
        for (connection, ordinal) in self.connections.iter().zip(ordinals) {
            let key = connection.key();
            let Some(cable) = self.cables.iter().find(|c| c.key == key) else {
                continue;
            };
            let path = draw(connection, ordinal, &self.params);
            self.scene.update_cable_path(cable.handle, &path);
            restyled += 1;
        }
        log::debug!("[rig] restyled {} cables", restyled);
        restyled
    }

    fn index_of(&self, unique_id: &str) -> Result<usize, RigError> {
        self.devices
            .iter()
            .position(|d| d.unique_id == unique_id)
            .ok_or_else(|| RigError::UnknownDevice(unique_id.to_string()))
    }

    fn refresh_port_flags(&mut self) {
        for device in &mut self.devices {
            for port in device.inputs.iter_mut().chain(device.outputs.iter_mut()) {
                port.is_connected = false;
            }
        }
        for c in &self.connections {
            let ends = [
                (&c.source_device, Direction::Output, &c.source_port),
                (&c.target_device, Direction::Input, &c.target_port),
            ];
            for (uid, direction, port) in ends {
                if port.implicit {
                    continue;
                }
                let Some(device) = self.devices.iter_mut().find(|d| &d.unique_id == uid) else {
                    continue;
                };
                let ports = device.ports_mut(direction);
                debug_assert!(
                    port.index < ports.len(),
                    "connection references port {} of {} which has {} ports",
                    port.index,
                    uid,
                    ports.len()
                );
                if let Some(p) = ports.get_mut(port.index) {
                    p.is_connected = true;
                }
            }
        }
    }
}

fn check_position(unique_id: &str, position: Vec3) -> Result<(), RigError> {
    if position.is_finite() {
        Ok(())
    } else {
        Err(RigError::InvalidPosition {
            id: unique_id.to_string(),
        })
    }
}
