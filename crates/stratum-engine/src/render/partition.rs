//! Paint-order partition of planned objects into contiguous batch runs.
//!
//! One run may be open per shape-kind lane. An object whose lane is open but was
//! not the most recently touched lane sits behind foreign geometry in paint order,
//! so every open run is sealed before it is placed.

use rustc_hash::FxHashMap;

use crate::scene::{ObjectId, ShapeKind};

use super::batch::MergeKey;

/// One object ready for batching, in paint order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Planned {
    pub id: ObjectId,
    pub key: MergeKey,
}

/// A contiguous run of mutually mergeable objects.
#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    pub key: MergeKey,
    pub members: Vec<ObjectId>,
    /// Paint position of the first member within the planned slice.
    pub first: usize,
}

impl Run {
    #[inline]
    pub fn kind(&self) -> ShapeKind {
        self.key.kind
    }
}

/// Splits `planned` into the fewest paint-order-preserving runs.
///
/// `max_members` caps the size of a run; `Some(0)` behaves like `Some(1)`.
pub fn partition(planned: &[Planned], max_members: Option<usize>) -> Vec<Run> {
    let cap = max_members.map(|m| m.max(1));
    let mut open: FxHashMap<ShapeKind, Run> = FxHashMap::default();
    let mut sealed: Vec<Run> = Vec::new();
    let mut last_lane: Option<ShapeKind> = None;

    for (pos, p) in planned.iter().enumerate() {
        let lane = p.key.kind;

        if open.contains_key(&lane) && last_lane.is_some_and(|l| l != lane) {
            sealed.extend(open.drain().map(|(_, run)| run));
        }

        let joinable = open.get(&lane).is_some_and(|run| {
            run.key.is_mergeable_with(&p.key) && cap.is_none_or(|c| run.members.len() < c)
        });
        if !joinable {
            if let Some(run) = open.remove(&lane) {
                sealed.push(run);
            }
        }

        open.entry(lane)
            .or_insert_with(|| Run { key: p.key, members: Vec::new(), first: pos })
            .members
            .push(p.id);
        last_lane = Some(lane);
    }

    sealed.extend(open.into_values());
    sealed.sort_by_key(|run| run.first);
    sealed
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::paint::PaintKey;
    use crate::render::program::ProgramId;
    use crate::scene::BlendMode;
    use slotmap::SlotMap;

    fn key(kind: ShapeKind, program: u16) -> MergeKey {
        MergeKey {
            kind,
            program: ProgramId(program),
            blend: BlendMode::Normal,
            stroke: PaintKey::Constant,
            fill: PaintKey::Constant,
        }
    }

    fn plan(keys: &[MergeKey]) -> (Vec<ObjectId>, Vec<Planned>) {
        let mut slots: SlotMap<ObjectId, ()> = SlotMap::with_key();
        let ids: Vec<ObjectId> = keys.iter().map(|_| slots.insert(())).collect();
        let planned = ids.iter().zip(keys).map(|(&id, &key)| Planned { id, key }).collect();
        (ids, planned)
    }

    fn flatten(runs: &[Run]) -> Vec<ObjectId> {
        runs.iter().flat_map(|r| r.members.iter().copied()).collect()
    }

    // ── merging ───────────────────────────────────────────────────────────

    #[test]
    fn compatible_objects_form_one_run() {
        let line = key(ShapeKind::Line, 0);
        let (ids, planned) = plan(&[line; 5]);
        let runs = partition(&planned, None);
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].members, ids);
    }

    #[test]
    fn incompatible_middle_splits_into_three() {
        let solid = key(ShapeKind::Line, 0);
        let textured = key(ShapeKind::Line, 1);
        let (ids, planned) = plan(&[solid, solid, textured, solid]);
        let runs = partition(&planned, None);
        assert_eq!(runs.len(), 3);
        assert_eq!(runs.iter().map(|r| r.first).collect::<Vec<_>>(), vec![0, 2, 3]);
        assert_eq!(flatten(&runs), ids);
    }

    #[test]
    fn incompatible_tail_splits_into_two() {
        let solid = key(ShapeKind::Line, 0);
        let textured = key(ShapeKind::Line, 1);
        let (_, planned) = plan(&[solid, solid, solid, textured]);
        assert_eq!(partition(&planned, None).len(), 2);
    }

    // ── lanes ─────────────────────────────────────────────────────────────

    #[test]
    fn interposed_lane_seals_everything() {
        let line = key(ShapeKind::Line, 0);
        let circle = key(ShapeKind::Circle, 2);
        let (ids, planned) = plan(&[line, circle, line]);
        let runs = partition(&planned, None);
        assert_eq!(runs.len(), 3);
        assert_eq!(flatten(&runs), ids);
    }

    #[test]
    fn adjacent_kinds_keep_their_own_runs() {
        let line = key(ShapeKind::Line, 0);
        let rect = key(ShapeKind::Rect, 4);
        let (ids, planned) = plan(&[line, line, rect, rect]);
        let runs = partition(&planned, None);
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].kind(), ShapeKind::Line);
        assert_eq!(runs[1].kind(), ShapeKind::Rect);
        assert_eq!(flatten(&runs), ids);
    }

    // ── cap ───────────────────────────────────────────────────────────────

    #[test]
    fn cap_splits_long_runs_in_order() {
        let line = key(ShapeKind::Line, 0);
        let (ids, planned) = plan(&[line; 5]);
        let runs = partition(&planned, Some(2));
        assert_eq!(runs.iter().map(|r| r.members.len()).collect::<Vec<_>>(), vec![2, 2, 1]);
        assert_eq!(flatten(&runs), ids);
    }

    #[test]
    fn empty_input_has_no_runs() {
        assert!(partition(&[], None).is_empty());
    }
}
