// src/editor/tools/draw.rs

use glam::Vec3;

use super::{Picking, PointerButton, PointerEvent, Tool, ToolAction};

/// Two-click wall drawing on the draw plane.
#[derive(Debug)]
pub struct DrawWallTool {
    pending_start: Option<Vec3>,
    /// Continue from the end of each finished segment.
    chain: bool,
}

impl DrawWallTool {
    pub fn new(chain: bool) -> Self {
        Self {
            pending_start: None,
            chain,
        }
    }

    pub fn pending_start(&self) -> Option<Vec3> {
        self.pending_start
    }

    fn finish_segment(&mut self, start: Vec3, end: Vec3) -> Vec<ToolAction> {
        let mut actions = vec![ToolAction::DiscardPreview, ToolAction::CreateWall { start, end }];
        if self.chain {
            self.pending_start = Some(end);
            actions.push(ToolAction::BeginPreview(end));
        } else {
            self.pending_start = None;
        }
        actions
    }
}

impl Tool for DrawWallTool {
    fn name(&self) -> &'static str {
        "Draw Wall"
    }

    fn handle_input(&mut self, event: &PointerEvent, picking: &dyn Picking) -> Vec<ToolAction> {
        match *event {
            PointerEvent::Down { pos, button: PointerButton::Primary } => {
                let Some(point) = picking.point_on_draw_plane(pos) else {
                    return Vec::new();
                };
                match self.pending_start {
                    None => {
                        self.pending_start = Some(point);
                        vec![ToolAction::BeginPreview(point)]
                    }
                    Some(start) => self.finish_segment(start, point),
                }
            }
            PointerEvent::Down { button: PointerButton::Secondary, .. } => self.cleanup(),
            PointerEvent::Move { pos } => match (self.pending_start, picking.point_on_draw_plane(pos)) {
                (Some(start), Some(end)) => vec![ToolAction::UpdatePreview { start, end }],
                _ => Vec::new(),
            },
            PointerEvent::Up { .. } => Vec::new(),
        }
    }

    fn cleanup(&mut self) -> Vec<ToolAction> {
        match self.pending_start.take() {
            Some(_) => vec![ToolAction::DiscardPreview],
            None => Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::testing::*;
    use super::*;

    fn at(x: f32, y: f32) -> FixedPicking {
        FixedPicking { point: Some(Vec3::new(x, y, 0.0)), wall: None }
    }

    #[test]
    fn test_two_clicks_make_one_wall() {
        let mut tool = DrawWallTool::new(false);
        assert_eq!(
            tool.handle_input(&down(PointerButton::Primary), &at(0.0, 0.0)),
            vec![ToolAction::BeginPreview(Vec3::ZERO)]
        );
        let actions = tool.handle_input(&down(PointerButton::Primary), &at(10.0, 0.0));
        assert_eq!(
            actions,
            vec![
                ToolAction::DiscardPreview,
                ToolAction::CreateWall { start: Vec3::ZERO, end: Vec3::new(10.0, 0.0, 0.0) },
            ]
        );
        assert_eq!(tool.pending_start(), None);
    }

    #[test]
    fn test_chained_drawing_continues_from_end() {
        let mut tool = DrawWallTool::new(true);
        tool.handle_input(&down(PointerButton::Primary), &at(0.0, 0.0));
        let actions = tool.handle_input(&down(PointerButton::Primary), &at(0.0, 5.0));
        assert_eq!(actions.last(), Some(&ToolAction::BeginPreview(Vec3::new(0.0, 5.0, 0.0))));
        assert_eq!(tool.pending_start(), Some(Vec3::new(0.0, 5.0, 0.0)));
    }

    #[test]
    fn test_secondary_cancels_pending() {
        let mut tool = DrawWallTool::new(false);
        tool.handle_input(&down(PointerButton::Primary), &at(1.0, 1.0));
        assert_eq!(
            tool.handle_input(&down(PointerButton::Secondary), &at(2.0, 2.0)),
            vec![ToolAction::DiscardPreview]
        );
        assert_eq!(tool.pending_start(), None);
        assert!(tool.handle_input(&down(PointerButton::Secondary), &at(2.0, 2.0)).is_empty());
    }

    #[test]
    fn test_move_updates_preview_only_when_pending() {
        let mut tool = DrawWallTool::new(false);
        assert!(tool.handle_input(&moved(), &at(3.0, 0.0)).is_empty());
        tool.handle_input(&down(PointerButton::Primary), &at(0.0, 0.0));
        assert_eq!(
            tool.handle_input(&moved(), &at(3.0, 4.0)),
            vec![ToolAction::UpdatePreview { start: Vec3::ZERO, end: Vec3::new(3.0, 4.0, 0.0) }]
        );
    }

    #[test]
    fn test_edge_on_ray_places_nothing() {
        let mut tool = DrawWallTool::new(false);
        assert!(tool.handle_input(&down(PointerButton::Primary), &FixedPicking::default()).is_empty());
        assert_eq!(tool.pending_start(), None);
    }
}
