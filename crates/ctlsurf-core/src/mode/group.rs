//! Mode managers of several physical units switched together.

use super::{ControlEvent, ModeManager};
use crate::error::{Error, Result};
use std::fmt::Debug;
use tracing::debug;

/// Mirrors mode transitions from the primary unit onto every connected unit.
///
/// Unit 0 is the primary. A main unit plus extenders shows the same mode across
/// all of them, each unit with its own mode instances for its slice of the bank.
pub struct ConnectedManagers<K, M> {
    units: Vec<ModeManager<K, M>>,
}

impl<K: Copy + Eq + Debug, M> ConnectedManagers<K, M> {
    pub fn new(primary: ModeManager<K, M>) -> Self {
        Self {
            units: vec![primary],
        }
    }

    /// Connect another unit. Returns its index.
    pub fn add_unit(&mut self, manager: ModeManager<K, M>) -> usize {
        self.units.push(manager);
        self.units.len() - 1
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    pub fn primary(&self) -> &ModeManager<K, M> {
        &self.units[0]
    }

    pub fn unit(&self, index: usize) -> Option<&ModeManager<K, M>> {
        self.units.get(index)
    }

    pub fn unit_mut(&mut self, index: usize) -> Option<&mut ModeManager<K, M>> {
        self.units.get_mut(index)
    }

    pub fn units(&self) -> impl Iterator<Item = &ModeManager<K, M>> {
        self.units.iter()
    }

    pub fn active_id(&self) -> Option<K> {
        self.primary().active_id()
    }

    pub fn set_active(&mut self, id: K, model: &mut M) -> Result<()> {
        self.units[0].set_active(id, model)?;
        for (index, unit) in self.units.iter_mut().enumerate().skip(1) {
            if unit.contains(id) {
                unit.set_active(id, model)?;
            } else {
                debug!("Unit {} has no mode {:?}, deactivating", index, id);
                unit.deactivate(model);
            }
        }
        Ok(())
    }

    pub fn set_temporary(&mut self, id: K, model: &mut M) -> Result<()> {
        self.units[0].set_temporary(id, model)?;
        for (index, unit) in self.units.iter_mut().enumerate().skip(1) {
            if unit.contains(id) {
                unit.set_temporary(id, model)?;
            } else {
                debug!("Unit {} has no mode {:?}, left unchanged", index, id);
            }
        }
        Ok(())
    }

    pub fn restore(&mut self, model: &mut M) {
        for unit in self.units.iter_mut() {
            unit.restore(model);
        }
    }

    /// Leave every unit without an active mode.
    pub fn deactivate_all(&mut self, model: &mut M) {
        for unit in self.units.iter_mut() {
            unit.deactivate(model);
        }
    }

    /// Route an event to the active mode of one unit.
    pub fn dispatch(&mut self, unit: usize, event: ControlEvent, model: &mut M) -> Result<()> {
        let count = self.units.len();
        let manager = self.units.get_mut(unit).ok_or(Error::SlotOutOfRange {
            slot: unit,
            size: count,
        })?;
        manager.dispatch(event, model);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mode::manager::tests::{manager, Journal, Modes, Recording};

    fn extender() -> ModeManager<Modes, Journal> {
        let mut manager = ModeManager::new();
        manager
            .register(Modes::Volume, Box::new(Recording { name: "ext-volume" }))
            .unwrap();
        manager
            .register(Modes::Pan, Box::new(Recording { name: "ext-pan" }))
            .unwrap();
        manager
    }

    #[test]
    fn test_set_active_mirrors_all_units() {
        let mut journal = Journal::default();
        let mut group = ConnectedManagers::new(manager());
        assert_eq!(group.add_unit(extender()), 1);

        group.set_active(Modes::Pan, &mut journal).unwrap();
        assert!(group.units().all(|unit| unit.is_active(Modes::Pan)));
        assert_eq!(journal.entries, vec!["+pan", "+ext-pan"]);
    }

    #[test]
    fn test_unit_without_mode_is_deactivated() {
        let mut journal = Journal::default();
        let mut group = ConnectedManagers::new(manager());
        group.add_unit(extender());
        group.set_active(Modes::Volume, &mut journal).unwrap();

        group.set_active(Modes::Browser, &mut journal).unwrap();
        assert_eq!(group.active_id(), Some(Modes::Browser));
        assert_eq!(group.unit(1).unwrap().active_id(), None);
    }

    #[test]
    fn test_unknown_mode_leaves_units_untouched() {
        let mut journal = Journal::default();
        let mut primary = ModeManager::new();
        primary
            .register(Modes::Volume, Box::new(Recording { name: "volume" }))
            .unwrap();
        let mut group = ConnectedManagers::new(primary);
        group.add_unit(extender());

        assert!(group.set_active(Modes::Pan, &mut journal).is_err());
        assert!(journal.entries.is_empty());
    }

    #[test]
    fn test_temporary_overlay_and_restore() {
        let mut journal = Journal::default();
        let mut group = ConnectedManagers::new(manager());
        group.add_unit(extender());
        group.set_active(Modes::Volume, &mut journal).unwrap();

        group.set_temporary(Modes::Pan, &mut journal).unwrap();
        assert!(group.unit(1).unwrap().is_temporary());

        group.restore(&mut journal);
        assert!(group.units().all(|unit| unit.is_active(Modes::Volume)));
        assert!(group.units().all(|unit| !unit.is_temporary()));
    }

    #[test]
    fn test_dispatch_per_unit() {
        let mut journal = Journal::default();
        let mut group = ConnectedManagers::new(manager());
        group.add_unit(extender());
        group.set_active(Modes::Volume, &mut journal).unwrap();
        journal.entries.clear();

        let knob = ControlEvent::Knob {
            slot: 2,
            wire: 1,
            speed: 1.0,
        };
        group.dispatch(1, knob, &mut journal).unwrap();
        assert_eq!(journal.entries, vec!["ext-volume knob 2 1"]);
        assert!(group.dispatch(5, knob, &mut journal).is_err());
    }
}
