//! Left-to-right channel assignment for peripherals around a hub.

use fnv::{FnvHashMap, FnvHashSet};

use crate::constants::{CHANNEL_TABLE, FALLBACK_CHANNEL_ORDER, MAX_TABLE_CHANNELS};
use crate::device::Device;

/// How a peripheral ended up with (or without) a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelChoice {
    /// From the fixed count table.
    Assigned(u8),
    /// Missing from the table; picked from the fallback priority order.
    Fallback(u8),
    /// Beyond the fourth peripheral; stays unconnected.
    Overflow,
}

impl ChannelChoice {
    pub fn channel(self) -> Option<u8> {
        match self {
            ChannelChoice::Assigned(ch) | ChannelChoice::Fallback(ch) => Some(ch),
            ChannelChoice::Overflow => None,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct ChannelPlan {
    sorted: Vec<String>,
    left: Vec<String>,
    right: Vec<String>,
    assigned: FnvHashMap<String, u8>,
    overflow: FnvHashSet<String>,
}

impl ChannelPlan {
    /// Unique ids in ascending world X (ties keep input order).
    pub fn sorted(&self) -> &[String] {
        &self.sorted
    }

    pub fn left(&self) -> &[String] {
        &self.left
    }

    pub fn right(&self) -> &[String] {
        &self.right
    }

    /// Table channel for `unique_id`, if it got one.
    pub fn channel_of(&self, unique_id: &str) -> Option<u8> {
        self.assigned.get(unique_id).copied()
    }

    /// Channel to wire `unique_id` to, falling back to the priority order when
    /// the table has no entry for it.
    pub fn resolve(&self, unique_id: &str) -> ChannelChoice {
        if let Some(ch) = self.channel_of(unique_id) {
            return ChannelChoice::Assigned(ch);
        }
        if self.overflow.contains(unique_id) {
            return ChannelChoice::Overflow;
        }
        let idx = self
            .sorted
            .iter()
            .position(|u| u == unique_id)
            .unwrap_or(self.sorted.len());
        let ch = FALLBACK_CHANNEL_ORDER[idx % FALLBACK_CHANNEL_ORDER.len()];
        log::warn!(
            "[channels] {} has no table channel; falling back to channel {}",
            unique_id,
            ch
        );
        ChannelChoice::Fallback(ch)
    }
}

/// Assign hub channels to `peripherals` by their side of the hub.
///
/// Devices strictly left of the hub come first, then those strictly right,
/// each in ascending X. Devices exactly at the hub's X belong to neither group
/// and are left to [`ChannelPlan::resolve`]'s fallback.
pub fn assign_channels(peripherals: &[&Device], hub: &Device) -> ChannelPlan {
    let mut sorted: Vec<&Device> = peripherals.to_vec();
    sorted.sort_by(|a, b| a.position.x.total_cmp(&b.position.x));

    let hub_x = hub.position.x;
    let left: Vec<String> = sorted
        .iter()
        .filter(|d| d.position.x < hub_x)
        .map(|d| d.unique_id.clone())
        .collect();
    let right: Vec<String> = sorted
        .iter()
        .filter(|d| d.position.x > hub_x)
        .map(|d| d.unique_id.clone())
        .collect();

    let mut assigned = FnvHashMap::default();
    let mut overflow = FnvHashSet::default();
    let placed = left.len() + right.len();
    if placed > 0 {
        let table = CHANNEL_TABLE[placed.min(MAX_TABLE_CHANNELS) - 1];
        for (i, uid) in left.iter().chain(right.iter()).enumerate() {
            match table.get(i) {
                Some(ch) => {
                    assigned.insert(uid.clone(), *ch);
                }
                None => {
                    log::warn!("[channels] no channel left for {}", uid);
                    overflow.insert(uid.clone());
                }
            }
        }
    }
    log::debug!(
        "[channels] left={} right={} assigned={}",
        left.len(),
        right.len(),
        assigned.len()
    );

    ChannelPlan {
        sorted: sorted.iter().map(|d| d.unique_id.clone()).collect(),
        left,
        right,
        assigned,
        overflow,
    }
}
