// src/document/document.rs

use crate::map::{Wall, WallError, WallId};
use glam::Vec3;
use log::debug;
use serde::Serialize;

/// Aggregate figures shown in the details panel.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PlanSummary {
    pub count: usize,
    pub selected_count: usize,
    pub total_length: f32,
}

/// The authoritative wall collection of the plan being edited.
///
/// Walls are kept in insertion order so listings and summaries are
/// deterministic. The hover highlight is transient interaction state and is
/// kept apart from the wall records.
#[derive(Debug, Default)]
pub struct Document {
    walls: Vec<Wall>,
    next_id: u64,
    highlighted: Option<WallId>,
}

impl Document {
    /// Create a new empty Document.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn walls(&self) -> &[Wall] {
        &self.walls
    }

    pub fn len(&self) -> usize {
        self.walls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.walls.is_empty()
    }

    pub fn wall(&self, id: WallId) -> Option<&Wall> {
        self.walls.iter().find(|w| w.id() == id)
    }

    // --- Wall mutation methods ---

    /// Creates a wall from `start` to `end` and appends it.
    ///
    /// A zero-length request is rejected without consuming an id.
    pub fn create_wall(&mut self, start: Vec3, end: Vec3) -> Result<Wall, WallError> {
        let wall = Wall::new(WallId(self.next_id), start, end)?;
        self.next_id += 1;
        debug!("Created {} ({:.2})", wall.id(), wall.length());
        self.walls.push(wall.clone());
        Ok(wall)
    }

    /// Removes every selected wall and returns the removed records in
    /// their former order.
    pub fn delete_selected(&mut self) -> Vec<Wall> {
        let (removed, kept): (Vec<Wall>, Vec<Wall>) =
            self.walls.drain(..).partition(|w| w.selected);
        self.walls = kept;
        if let Some(id) = self.highlighted {
            if removed.iter().any(|w| w.id() == id) {
                self.highlighted = None;
            }
        }
        removed
    }

    /// Exclusive: exactly `ids` end up selected. Non-exclusive: each listed
    /// id has its selection toggled. Unknown ids are ignored.
    pub fn set_selection(&mut self, ids: &[WallId], exclusive: bool) {
        for wall in self.walls.iter_mut() {
            let listed = ids.contains(&wall.id());
            if exclusive {
                wall.selected = listed;
            } else if listed {
                wall.selected = !wall.selected;
            }
        }
    }

    /// Moves the hover highlight. Returns true when it changed.
    pub fn set_highlight(&mut self, id: Option<WallId>) -> bool {
        let id = id.filter(|id| self.wall(*id).is_some());
        if self.highlighted == id {
            return false;
        }
        self.highlighted = id;
        true
    }

    pub fn highlighted(&self) -> Option<WallId> {
        self.highlighted
    }

    pub fn is_highlighted(&self, id: WallId) -> bool {
        self.highlighted == Some(id)
    }

    /// Clears the highlight and, unless multi-select is active, the selection.
    pub fn clear_transient_state(&mut self, multi_select: bool) {
        self.highlighted = None;
        if !multi_select {
            for wall in self.walls.iter_mut() {
                wall.selected = false;
            }
        }
    }

    pub fn selected_ids(&self) -> Vec<WallId> {
        self.walls.iter().filter(|w| w.selected).map(|w| w.id()).collect()
    }

    pub fn selected_count(&self) -> usize {
        self.walls.iter().filter(|w| w.selected).count()
    }

    pub fn summary(&self) -> PlanSummary {
        PlanSummary {
            count: self.walls.len(),
            selected_count: self.selected_count(),
            total_length: self.walls.iter().fold(0.0, |acc, w| acc + w.length()),
        }
    }

    /// Axis-aligned bounds over all wall endpoints.
    pub fn bounding_box(&self) -> Option<(Vec3, Vec3)> {
        let mut points = self.walls.iter().flat_map(|w| [w.start(), w.end()]);
        let first = points.next()?;
        Some(points.fold((first, first), |(min, max), p| (min.min(p), max.max(p))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_approx_eq::assert_approx_eq;

    fn v(x: f32, y: f32) -> Vec3 {
        Vec3::new(x, y, 0.0)
    }

    fn doc_with_two_walls() -> (Document, WallId, WallId) {
        let mut doc = Document::new();
        let a = doc.create_wall(v(0.0, 0.0), v(10.0, 0.0)).unwrap().id();
        let b = doc.create_wall(v(0.0, 0.0), v(0.0, 10.0)).unwrap().id();
        (doc, a, b)
    }

    #[test]
    fn test_empty_document() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.summary(), PlanSummary { count: 0, selected_count: 0, total_length: 0.0 });
        assert!(doc.bounding_box().is_none());
    }

    #[test]
    fn test_create_wall_scenario() {
        let mut doc = Document::new();
        let wall = doc.create_wall(v(0.0, 0.0), v(10.0, 0.0)).unwrap();
        assert_eq!(format!("{:.2}", wall.length()), "10.00");
        assert_approx_eq!(wall.angle(), 0.0);
        assert_eq!(doc.len(), 1);
    }

    #[test]
    fn test_zero_length_leaves_model_unchanged() {
        let mut doc = Document::new();
        assert_eq!(doc.create_wall(Vec3::ZERO, Vec3::ZERO), Err(WallError::Degenerate));
        assert!(doc.is_empty());
        // The rejected attempt must not burn an id.
        let wall = doc.create_wall(Vec3::ZERO, v(1.0, 0.0)).unwrap();
        assert_eq!(wall.id(), WallId(0));
    }

    #[test]
    fn test_ids_are_never_reused() {
        let (mut doc, a, b) = doc_with_two_walls();
        doc.set_selection(&[a, b], true);
        doc.delete_selected();
        let c = doc.create_wall(v(1.0, 1.0), v(2.0, 2.0)).unwrap().id();
        assert!(c > b);
    }

    #[test]
    fn test_exclusive_selection() {
        let (mut doc, a, b) = doc_with_two_walls();
        doc.set_selection(&[a], true);
        doc.set_selection(&[b], true);
        assert_eq!(doc.selected_ids(), vec![b]);
    }

    #[test]
    fn test_toggle_twice_restores_selection() {
        let (mut doc, a, b) = doc_with_two_walls();
        doc.set_selection(&[b], true);
        doc.set_selection(&[a], false);
        assert_eq!(doc.selected_count(), 2);
        doc.set_selection(&[a], false);
        assert!(!doc.wall(a).unwrap().selected);
        assert!(doc.wall(b).unwrap().selected);
    }

    #[test]
    fn test_delete_selected_removes_exactly_selected() {
        let (mut doc, a, b) = doc_with_two_walls();
        doc.set_selection(&[a], true);
        let before = doc.wall(b).unwrap().clone();
        let removed = doc.delete_selected();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].id(), a);
        assert!(doc.wall(a).is_none());
        assert_eq!(doc.wall(b).unwrap(), &before);
    }

    #[test]
    fn test_delete_with_nothing_selected_is_noop() {
        let (mut doc, _, _) = doc_with_two_walls();
        assert!(doc.delete_selected().is_empty());
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_delete_all_resets_total_length() {
        let (mut doc, a, b) = doc_with_two_walls();
        doc.set_selection(&[a], false);
        doc.set_selection(&[b], false);
        assert_eq!(doc.delete_selected().len(), 2);
        assert_eq!(doc.summary().count, 0);
        assert_eq!(doc.summary().total_length, 0.0);
        assert!(doc.summary().total_length.is_sign_positive());
    }

    #[test]
    fn test_empty_plan_length_is_positive_zero() {
        let doc = Document::new();
        assert!(doc.summary().total_length.is_sign_positive());
        assert_eq!(format!("{:.2}", doc.summary().total_length), "0.00");
    }

    #[test]
    fn test_summary_serializes_as_json() {
        let (mut doc, a, _) = doc_with_two_walls();
        doc.set_selection(&[a], true);
        let json = serde_json::to_string(&doc.summary()).unwrap();
        assert_eq!(json, r#"{"count":2,"selected_count":1,"total_length":20.0}"#);
    }

    #[test]
    fn test_summary_ignores_selection_for_length() {
        let (mut doc, a, _) = doc_with_two_walls();
        doc.set_selection(&[a], true);
        let summary = doc.summary();
        assert_eq!(summary.count, 2);
        assert_eq!(summary.selected_count, 1);
        assert_approx_eq!(summary.total_length, 20.0);
    }

    #[test]
    fn test_highlight_is_independent_of_selection() {
        let (mut doc, a, b) = doc_with_two_walls();
        doc.set_selection(&[a], true);
        assert!(doc.set_highlight(Some(b)));
        assert!(!doc.set_highlight(Some(b)));
        assert!(doc.is_highlighted(b));
        assert!(!doc.is_highlighted(a));
        assert_eq!(doc.selected_ids(), vec![a]);
    }

    #[test]
    fn test_highlight_of_unknown_wall_is_dropped() {
        let mut doc = Document::new();
        doc.set_highlight(Some(WallId(42)));
        assert_eq!(doc.highlighted(), None);
    }

    #[test]
    fn test_clear_transient_state_respects_multi_select() {
        let (mut doc, a, b) = doc_with_two_walls();
        doc.set_selection(&[a], true);
        doc.set_highlight(Some(b));
        doc.clear_transient_state(true);
        assert_eq!(doc.highlighted(), None);
        assert_eq!(doc.selected_ids(), vec![a]);
        doc.clear_transient_state(false);
        assert!(doc.selected_ids().is_empty());
    }

    #[test]
    fn test_deleting_highlighted_wall_drops_highlight() {
        let (mut doc, a, _) = doc_with_two_walls();
        doc.set_highlight(Some(a));
        doc.set_selection(&[a], true);
        doc.delete_selected();
        assert_eq!(doc.highlighted(), None);
    }

    #[test]
    fn test_bounding_box() {
        let (doc, _, _) = doc_with_two_walls();
        let (min, max) = doc.bounding_box().unwrap();
        assert_eq!(min, v(0.0, 0.0));
        assert_eq!(max, v(10.0, 10.0));
    }
}
