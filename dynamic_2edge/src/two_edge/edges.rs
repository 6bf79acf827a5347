use crate::{
    error::{Error, Result},
    top_tree::Idx,
};

/// Stable reference to an inserted edge. Stale once the edge is removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EdgeHandle {
    index: usize,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum EdgeKind {
    /// Realised as a leaf of the top tree.
    Tree { leaf: Idx },
    /// Stored at `labels[level][index[s]]` of endpoint `s`.
    NonTree { level: usize, index: [usize; 2] },
}

#[derive(Debug, Clone)]
pub(crate) struct EdgeRecord {
    pub ends: [usize; 2],
    pub kind: EdgeKind,
}

impl EdgeRecord {
    pub fn level(&self) -> Option<usize> {
        match self.kind {
            EdgeKind::NonTree { level, .. } => Some(level),
            EdgeKind::Tree { .. } => None,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    record: Option<EdgeRecord>,
}

#[derive(Debug, Default)]
pub(crate) struct Edges {
    slots: Vec<Slot>,
    free: Vec<usize>,
    len: usize,
}

impl Edges {
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn insert(&mut self, record: EdgeRecord) -> EdgeHandle {
        self.len += 1;
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index];
            slot.record = Some(record);
            EdgeHandle {
                index,
                generation: slot.generation,
            }
        } else {
            self.slots.push(Slot {
                generation: 0,
                record: Some(record),
            });
            EdgeHandle {
                index: self.slots.len() - 1,
                generation: 0,
            }
        }
    }

    fn slot(&self, edge: EdgeHandle) -> Option<&Slot> {
        self.slots
            .get(edge.index)
            .filter(|slot| slot.generation == edge.generation)
    }

    pub fn get(&self, edge: EdgeHandle) -> Result<&EdgeRecord> {
        self.slot(edge)
            .and_then(|slot| slot.record.as_ref())
            .ok_or(Error::EdgeNotFound(edge))
    }

    pub fn get_mut(&mut self, edge: EdgeHandle) -> Result<&mut EdgeRecord> {
        self.slots
            .get_mut(edge.index)
            .filter(|slot| slot.generation == edge.generation)
            .and_then(|slot| slot.record.as_mut())
            .ok_or(Error::EdgeNotFound(edge))
    }

    pub fn remove(&mut self, edge: EdgeHandle) -> Result<EdgeRecord> {
        self.get(edge)?;
        let slot = &mut self.slots[edge.index];
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(edge.index);
        self.len -= 1;
        slot.record.take().ok_or(Error::EdgeNotFound(edge))
    }

    pub fn iter(&self) -> impl Iterator<Item = (EdgeHandle, &EdgeRecord)> {
        self.slots.iter().enumerate().filter_map(|(index, slot)| {
            slot.record.as_ref().map(|record| {
                (
                    EdgeHandle {
                        index,
                        generation: slot.generation,
                    },
                    record,
                )
            })
        })
    }
}
