//! Entity allocator.
//!
//! Hands out VIDs with a per-slot generation. A destroyed slot goes on a free
//! list and is recycled with its generation bumped, so the old VID stops
//! being alive the moment the entity is destroyed.

use crate::core::vid::{GENERATION_MASK, MAX_INDEX};
use crate::core::Vid;
use crate::errors::{RegistryError, Result};

#[derive(Debug)]
pub struct EntityManager {
    generations: Vec<u32>,
    alive: Vec<bool>,
    free_list: Vec<u32>,
    capacity: u32,
}

impl EntityManager {
    /// Creates an allocator able to hold `capacity` live entities at once.
    #[must_use]
    pub fn new(capacity: u32) -> Self {
        let capacity = capacity.clamp(1, MAX_INDEX);
        Self {
            // Slot 0 is reserved for INVALID_VID and is never alive.
            generations: vec![0],
            alive: vec![false],
            free_list: Vec::new(),
            capacity,
        }
    }

    pub fn create(&mut self) -> Result<Vid> {
        let index = if let Some(index) = self.free_list.pop() {
            index
        } else {
            let next = self.generations.len() as u32;
            if next > self.capacity {
                return Err(RegistryError::EntityLimit {
                    capacity: self.capacity,
                });
            }
            self.generations.push(0);
            self.alive.push(false);
            next
        };

        let slot = index as usize;
        self.alive[slot] = true;
        Ok(Vid::from_parts(index, self.generations[slot]))
    }

    /// Destroys `vid`. Returns `false` for stale or unknown VIDs.
    pub fn destroy(&mut self, vid: Vid) -> bool {
        if !self.is_alive(vid) {
            return false;
        }
        let slot = vid.index() as usize;
        self.alive[slot] = false;
        self.generations[slot] = (self.generations[slot] + 1) & GENERATION_MASK;
        self.free_list.push(vid.index());
        true
    }

    #[must_use]
    pub fn is_alive(&self, vid: Vid) -> bool {
        let slot = vid.index() as usize;
        vid.is_valid()
            && self.alive.get(slot).copied().unwrap_or(false)
            && self.generations[slot] == vid.generation()
    }

    /// Accepts a raw integer from outside and returns it as a VID if it names
    /// a live entity.
    #[must_use]
    pub fn import(&self, raw: u32) -> Option<Vid> {
        let vid = Vid(raw);
        self.is_alive(vid).then_some(vid)
    }

    /// Number of live entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.alive.iter().filter(|&&a| a).count()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn capacity(&self) -> u32 {
        self.capacity
    }
}
