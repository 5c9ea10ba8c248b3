// Fixed-capacity slot storage for entities that are driven by their own task.
//
// A slot stays occupied until the owning task vacates it on exit, so a slot is
// never reused while the previous occupant's task may still touch it. Handles
// of vacated occupants move to a finished list and wait there to be joined.

use tokio::task::JoinHandle;

/// Identifies one occupancy of a slot; stale keys never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SlotKey {
    pub index: usize,
    pub generation: u64,
}

struct Slot<T> {
    occupant: Option<T>,
    // Task driving the occupant; taken at shutdown or moved to `finished` on vacate.
    handle: Option<JoinHandle<()>>,
    generation: u64,
}

pub struct SlotTable<T> {
    slots: Vec<Slot<T>>,
    active: usize,
    finished: Vec<JoinHandle<()>>,
}

impl<T> SlotTable<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        let slots = (0..capacity)
            .map(|_| Slot {
                occupant: None,
                handle: None,
                generation: 0,
            })
            .collect();
        Self {
            slots,
            active: 0,
            finished: Vec::new(),
        }
    }

    /// Number of occupied slots, alive or not yet reaped.
    pub fn active(&self) -> usize {
        self.active
    }

    /// Places the value in the first free slot. Returns `None` when the table is full.
    pub fn occupy(&mut self, value: T) -> Option<SlotKey> {
        if self.active >= self.slots.len() {
            return None;
        }
        let index = self.slots.iter().position(|slot| slot.occupant.is_none())?;
        let slot = &mut self.slots[index];
        slot.generation = slot.generation.wrapping_add(1);
        slot.occupant = Some(value);
        slot.handle = None;
        self.active += 1;
        Some(SlotKey {
            index,
            generation: slot.generation,
        })
    }

    pub fn get(&self, key: SlotKey) -> Option<&T> {
        self.slots
            .get(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.occupant.as_ref())
    }

    pub fn get_mut(&mut self, key: SlotKey) -> Option<&mut T> {
        self.slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)
            .and_then(|slot| slot.occupant.as_mut())
    }

    /// Stores the task handle for the occupancy identified by `key`.
    ///
    /// Returns false when the occupant is already gone (its task finished first);
    /// the handle then joins the finished list.
    pub fn attach_handle(&mut self, key: SlotKey, handle: JoinHandle<()>) -> bool {
        match self.slots.get_mut(key.index) {
            Some(slot) if slot.generation == key.generation && slot.occupant.is_some() => {
                slot.handle = Some(handle);
                true
            }
            _ => {
                self.finished.push(handle);
                false
            }
        }
    }

    /// Empties the slot and releases it for reuse.
    pub fn vacate(&mut self, key: SlotKey) -> Option<T> {
        let slot = self
            .slots
            .get_mut(key.index)
            .filter(|slot| slot.generation == key.generation)?;
        let occupant = slot.occupant.take()?;
        if let Some(handle) = slot.handle.take() {
            self.finished.push(handle);
        }
        self.active -= 1;
        Some(occupant)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotKey, &T)> + '_ {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.occupant.as_ref().map(|occupant| {
                (
                    SlotKey {
                        index,
                        generation: slot.generation,
                    },
                    occupant,
                )
            })
        })
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (SlotKey, &mut T)> + '_ {
        self.slots.iter_mut().enumerate().filter_map(|(index, slot)| {
            let generation = slot.generation;
            slot.occupant
                .as_mut()
                .map(|occupant| (SlotKey { index, generation }, occupant))
        })
    }

    /// Takes every outstanding task handle: those of occupied slots (occupants stay
    /// in place) plus the finished list.
    pub fn take_handles(&mut self) -> Vec<JoinHandle<()>> {
        let mut handles = self.take_finished();
        handles.extend(
            self.slots
                .iter_mut()
                .filter(|slot| slot.occupant.is_some())
                .filter_map(|slot| slot.handle.take()),
        );
        handles
    }

    /// Takes the handles of occupants that already vacated their slot.
    pub fn take_finished(&mut self) -> Vec<JoinHandle<()>> {
        std::mem::take(&mut self.finished)
    }
}
