//! Open-addressing table of root commands.
//!
//! Slots hold boxed nodes, so growing the table moves handles only: every
//! descendant reference stays valid across a rehash.

use log::debug;

use crate::error::RegisterError;
use crate::node::CommandNode;

const HASH_SEED: u32 = 0x539C_A32B;

/// Order-sensitive 32-bit string hash (rotate/xor mix).
pub fn hash(name: &str) -> u32 {
    let mut h = HASH_SEED;
    for &b in name.as_bytes() {
        h = h.rotate_left(3 + h % 8);
        h ^= u32::from(b);
        h ^= h.rotate_left(4 + h % 6);
    }
    h
}

/// Root command table: linear probing with wraparound, doubling rehash when full.
pub struct CommandTable {
    slots: Vec<Option<Box<CommandNode>>>,
    count: usize,
}

impl CommandTable {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);
        Self { slots, count: 0 }
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    #[inline(always)]
    fn home(&self, name: &str) -> usize {
        hash(name) as usize % self.slots.len()
    }

    /// Probe until a name match, an empty slot, or a full wraparound.
    fn index_of(&self, name: &str) -> Option<usize> {
        let base = self.home(name);
        let mut index = base;
        loop {
            match &self.slots[index] {
                None => return None,
                Some(node) if node.name() == name => return Some(index),
                Some(_) => {}
            }
            index = (index + 1) % self.slots.len();
            if index == base {
                return None;
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&CommandNode> {
        let index = self.index_of(name)?;
        self.slots[index].as_deref()
    }

    pub fn get_mut(&mut self, name: &str) -> Option<&mut CommandNode> {
        let index = self.index_of(name)?;
        self.slots[index].as_deref_mut()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    /// Insert a root node whose name is not yet present.
    ///
    /// Growth happens first and is staged in a fresh slot vector, so a failed
    /// allocation returns an error with the table unchanged.
    pub fn insert(&mut self, node: Box<CommandNode>) -> Result<(), RegisterError> {
        if self.count == self.slots.len() {
            self.grow()?;
        }
        Self::place(&mut self.slots, node);
        self.count += 1;
        Ok(())
    }

    fn grow(&mut self) -> Result<(), RegisterError> {
        let old_capacity = self.slots.len();
        let mut slots = staged_slots(old_capacity)?;
        let new_capacity = slots.len();

        for node in core::mem::take(&mut self.slots).into_iter().flatten() {
            Self::place(&mut slots, node);
        }
        self.slots = slots;
        debug!("command table grown: {} -> {} slots", old_capacity, new_capacity);
        Ok(())
    }

    /// Put `node` in the first free slot from its home index. At least one slot is free.
    fn place(slots: &mut [Option<Box<CommandNode>>], node: Box<CommandNode>) {
        let capacity = slots.len();
        let mut index = hash(node.name()) as usize % capacity;
        while slots[index].is_some() {
            index = (index + 1) % capacity;
        }
        slots[index] = Some(node);
    }

    /// Root nodes in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &CommandNode> + '_ {
        self.slots.iter().filter_map(|s| s.as_deref())
    }
}

/// Empty slot vector twice the size of `old_capacity`, or `AllocationFailure`
/// when the size overflows or cannot be reserved.
fn staged_slots(old_capacity: usize) -> Result<Vec<Option<Box<CommandNode>>>, RegisterError> {
    let new_capacity = old_capacity
        .checked_mul(2)
        .ok_or(RegisterError::AllocationFailure)?;

    let mut slots: Vec<Option<Box<CommandNode>>> = Vec::new();
    slots
        .try_reserve_exact(new_capacity)
        .map_err(|_| RegisterError::AllocationFailure)?;
    slots.resize_with(new_capacity, || None);
    Ok(slots)
}

// ==================== TESTS =======================
