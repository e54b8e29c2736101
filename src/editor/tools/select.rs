// src/editor/tools/select.rs

use super::{Picking, PointerButton, PointerEvent, Tool, ToolAction};

/// Click selection and hover highlighting, in single or multi-select mode.
#[derive(Debug, Default)]
pub struct SelectTool {
    multi: bool,
}

impl SelectTool {
    pub fn multi(&self) -> bool {
        self.multi
    }

    pub fn set_multi(&mut self, multi: bool) {
        self.multi = multi;
    }
}

impl Tool for SelectTool {
    fn name(&self) -> &'static str {
        if self.multi {
            "Multi Select"
        } else {
            "Select"
        }
    }

    fn handle_input(&mut self, event: &PointerEvent, picking: &dyn Picking) -> Vec<ToolAction> {
        match *event {
            PointerEvent::Down { pos, button: PointerButton::Primary } => match picking.pick_wall(pos) {
                Some(id) => vec![ToolAction::Select { id, exclusive: !self.multi }],
                // A miss keeps the multi-selection intact.
                None if self.multi => Vec::new(),
                None => vec![ToolAction::ClearTransient],
            },
            PointerEvent::Move { pos } => vec![ToolAction::Highlight(picking.pick_wall(pos))],
            PointerEvent::Down { button: PointerButton::Secondary, .. } | PointerEvent::Up { .. } => Vec::new(),
        }
    }

    fn cleanup(&mut self) -> Vec<ToolAction> {
        Vec::new()
    }
}
