// SPDX-License-Identifier: MIT

//!
//! A tree of values addressed by generational [`NodeId`]s.  Freed slots are
//! reused, so a scene that is cleared and redrawn on every gesture stays the
//! size of its largest frame.
//!

use super::scene::{NodeId, SceneError};

#[derive(Debug, Clone)]
struct Entry<T> {
    value: T,
    parent: Option<NodeId>,
    children: Vec<NodeId>,
}

#[derive(Debug, Clone)]
struct Slot<T> {
    /// Bumped every time the slot is freed, so stale IDs stop resolving
    generation: u32,
    entry: Option<Entry<T>>,
}

#[derive(Debug, Clone)]
pub(crate) struct NodeArena<T> {
    slots: Vec<Slot<T>>,
    free: Vec<usize>,
    live: usize,
}

impl<T> NodeArena<T> {
    /// An arena holding just the root
    pub(crate) fn new(root: T) -> Self {
        Self {
            slots: vec![Slot {
                generation: 0,
                entry: Some(Entry {
                    value: root,
                    parent: None,
                    children: Vec::new(),
                }),
            }],
            free: Vec::new(),
            live: 1,
        }
    }

    pub(crate) fn root(&self) -> NodeId {
        NodeId {
            index: 0,
            generation: 0,
        }
    }

    /// The number of live nodes
    pub(crate) fn len(&self) -> usize {
        self.live
    }

    /// The number of slots ever allocated (live or free)
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    fn entry(&self, id: NodeId) -> Result<&Entry<T>, SceneError> {
        self.slots
            .get(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_ref())
            .ok_or(SceneError::UnknownNode(id))
    }

    fn entry_mut(&mut self, id: NodeId) -> Result<&mut Entry<T>, SceneError> {
        self.slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)
            .and_then(|slot| slot.entry.as_mut())
            .ok_or(SceneError::UnknownNode(id))
    }

    pub(crate) fn get(&self, id: NodeId) -> Result<&T, SceneError> {
        self.entry(id).map(|entry| &entry.value)
    }

    pub(crate) fn get_mut(&mut self, id: NodeId) -> Result<&mut T, SceneError> {
        self.entry_mut(id).map(|entry| &mut entry.value)
    }

    pub(crate) fn children(&self, id: NodeId) -> &[NodeId] {
        self.entry(id)
            .map(|entry| entry.children.as_slice())
            .unwrap_or(&[])
    }

    /// Append `value` as the last child of `parent`
    pub(crate) fn insert(&mut self, parent: NodeId, value: T) -> Result<NodeId, SceneError> {
        self.entry(parent)?;
        let entry = Entry {
            value,
            parent: Some(parent),
            children: Vec::new(),
        };
        let id = match self.free.pop() {
            Some(index) => {
                let slot = &mut self.slots[index];
                slot.entry = Some(entry);
                NodeId {
                    index,
                    generation: slot.generation,
                }
            }
            None => {
                self.slots.push(Slot {
                    generation: 0,
                    entry: Some(entry),
                });
                NodeId {
                    index: self.slots.len() - 1,
                    generation: 0,
                }
            }
        };
        self.live += 1;
        self.entry_mut(parent)?.children.push(id);
        Ok(id)
    }

    /// Detach the node from its parent and free it and its descendants.
    /// Returns the node's own value.
    pub(crate) fn remove(&mut self, id: NodeId) -> Result<T, SceneError> {
        let parent = self.entry(id)?.parent;
        if let Some(parent) = parent {
            self.entry_mut(parent)?.children.retain(|child| *child != id);
        }
        self.free_subtree(id).ok_or(SceneError::UnknownNode(id))
    }

    /// Free every descendant of the node.  Returns the values of its direct
    /// children.
    pub(crate) fn clear_children(&mut self, id: NodeId) -> Result<Vec<T>, SceneError> {
        let children = std::mem::take(&mut self.entry_mut(id)?.children);
        Ok(children
            .into_iter()
            .filter_map(|child| self.free_subtree(child))
            .collect())
    }

    fn free_subtree(&mut self, id: NodeId) -> Option<T> {
        let root = self.free_slot(id)?;
        let mut pending = root.children;
        while let Some(next) = pending.pop() {
            if let Some(entry) = self.free_slot(next) {
                pending.extend(entry.children);
            }
        }
        Some(root.value)
    }

    fn free_slot(&mut self, id: NodeId) -> Option<Entry<T>> {
        let slot = self
            .slots
            .get_mut(id.index)
            .filter(|slot| slot.generation == id.generation)?;
        let entry = slot.entry.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(id.index);
        self.live -= 1;
        Some(entry)
    }

    /// Every live node in document order (depth first, parents before their
    /// children, siblings in insertion order)
    pub(crate) fn walk(&self) -> Vec<(NodeId, &T)> {
        let mut nodes = Vec::with_capacity(self.live);
        let mut pending = vec![self.root()];
        while let Some(id) = pending.pop() {
            if let Ok(entry) = self.entry(id) {
                nodes.push((id, &entry.value));
                pending.extend(entry.children.iter().rev());
            }
        }
        nodes
    }
}
