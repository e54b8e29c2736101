// src/editor/tools/mod.rs
mod select;
mod draw;

pub use select::SelectTool;
pub use draw::DrawWallTool;

use egui::Pos2;
use glam::Vec3;

use super::ViewKind;
use crate::map::WallId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down { pos: Pos2, button: PointerButton },
    Move { pos: Pos2 },
    Up { pos: Pos2, button: PointerButton },
}

/// Picking queries a tool may resolve while handling an event.
pub trait Picking {
    fn point_on_draw_plane(&self, pointer: Pos2) -> Option<Vec3>;
    fn pick_wall(&self, pointer: Pos2) -> Option<WallId>;
}

/// Effects a tool asks the viewer to apply, in order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ToolAction {
    Select { id: WallId, exclusive: bool },
    /// Clears highlights, and selection unless multi-select is on.
    ClearTransient,
    Highlight(Option<WallId>),
    BeginPreview(Vec3),
    UpdatePreview { start: Vec3, end: Vec3 },
    DiscardPreview,
    CreateWall { start: Vec3, end: Vec3 },
}

pub trait Tool {
    fn name(&self) -> &'static str;
    fn handle_input(&mut self, event: &PointerEvent, picking: &dyn Picking) -> Vec<ToolAction>;
    /// Drops any in-flight work and reports what must be released.
    fn cleanup(&mut self) -> Vec<ToolAction>;
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Mode {
    Idle,
    MultiSelect,
    Drawing { pending_start: Option<Vec3> },
}

/// Sequences pointer events into model effects. Exactly one of the
/// selection and drawing tools receives each event.
#[derive(Debug)]
pub struct InteractionState {
    select: SelectTool,
    draw: DrawWallTool,
    drawing: bool,
}

impl InteractionState {
    pub fn new(chain_drawing: bool) -> Self {
        Self {
            select: SelectTool::default(),
            draw: DrawWallTool::new(chain_drawing),
            drawing: false,
        }
    }

    pub fn mode(&self) -> Mode {
        if self.drawing {
            Mode::Drawing {
                pending_start: self.draw.pending_start(),
            }
        } else if self.select.multi() {
            Mode::MultiSelect
        } else {
            Mode::Idle
        }
    }

    pub fn is_drawing(&self) -> bool {
        self.drawing
    }

    pub fn is_multi_select(&self) -> bool {
        self.select.multi()
    }

    /// Name of the tool that receives the next event.
    pub fn tool_name(&self) -> &'static str {
        if self.drawing {
            self.draw.name()
        } else {
            self.select.name()
        }
    }

    /// Enters drawing, leaving multi-select behind.
    pub fn enter_drawing(&mut self) {
        self.select.set_multi(false);
        self.drawing = true;
    }

    pub fn exit_drawing(&mut self) -> Vec<ToolAction> {
        self.drawing = false;
        self.draw.cleanup()
    }

    /// Cancels a pending draw but stays in draw mode.
    pub fn cancel_pending(&mut self) -> Vec<ToolAction> {
        self.draw.cleanup()
    }

    pub fn set_multi_select(&mut self, multi: bool) {
        self.select.set_multi(multi);
    }

    pub fn handle(&mut self, event: &PointerEvent, view: ViewKind, picking: &dyn Picking) -> Vec<ToolAction> {
        if self.drawing {
            // Drawing gestures only mean something in the plan projection.
            if view == ViewKind::Plan {
                self.draw.handle_input(event, picking)
            } else {
                Vec::new()
            }
        } else {
            self.select.handle_input(event, picking)
        }
    }
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;

    /// Picking double with fixed answers.
    #[derive(Debug, Default)]
    pub struct FixedPicking {
        pub point: Option<Vec3>,
        pub wall: Option<WallId>,
    }

    impl Picking for FixedPicking {
        fn point_on_draw_plane(&self, _pointer: Pos2) -> Option<Vec3> {
            self.point
        }

        fn pick_wall(&self, _pointer: Pos2) -> Option<WallId> {
            self.wall
        }
    }

    pub fn down(button: PointerButton) -> PointerEvent {
        PointerEvent::Down { pos: Pos2::ZERO, button }
    }

    pub fn moved() -> PointerEvent {
        PointerEvent::Move { pos: Pos2::ZERO }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;

    #[test]
    fn test_modes() {
        let mut state = InteractionState::new(false);
        assert_eq!(state.mode(), Mode::Idle);
        state.set_multi_select(true);
        assert_eq!(state.mode(), Mode::MultiSelect);
        state.enter_drawing();
        assert_eq!(state.mode(), Mode::Drawing { pending_start: None });
        assert!(!state.is_multi_select());
        state.exit_drawing();
        assert_eq!(state.mode(), Mode::Idle);
    }

    #[test]
    fn test_drawing_ignored_in_elevation() {
        let mut state = InteractionState::new(false);
        state.enter_drawing();
        let picking = FixedPicking { point: Some(Vec3::ZERO), wall: Some(WallId(0)) };
        let actions = state.handle(&down(PointerButton::Primary), ViewKind::Elevation, &picking);
        assert!(actions.is_empty());
        assert_eq!(state.mode(), Mode::Drawing { pending_start: None });
    }

    #[test]
    fn test_no_hover_while_drawing() {
        let mut state = InteractionState::new(false);
        state.enter_drawing();
        let picking = FixedPicking { point: None, wall: Some(WallId(3)) };
        assert!(state.handle(&moved(), ViewKind::Plan, &picking).is_empty());
    }

    #[test]
    fn test_exit_drawing_discards_preview() {
        let mut state = InteractionState::new(false);
        state.enter_drawing();
        let picking = FixedPicking { point: Some(Vec3::ONE), wall: None };
        state.handle(&down(PointerButton::Primary), ViewKind::Plan, &picking);
        assert_eq!(state.exit_drawing(), vec![ToolAction::DiscardPreview]);
        assert_eq!(state.mode(), Mode::Idle);
    }

    #[test]
    fn test_tool_name_follows_mode() {
        let mut state = InteractionState::new(false);
        assert_eq!(state.tool_name(), "Select");
        state.set_multi_select(true);
        assert_eq!(state.tool_name(), "Multi Select");
        state.enter_drawing();
        assert_eq!(state.tool_name(), "Draw Wall");
        state.exit_drawing();
        assert_eq!(state.tool_name(), "Select");
    }
}
