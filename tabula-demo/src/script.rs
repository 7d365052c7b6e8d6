//! Scripted mouse input, aimed at the table geometry of the previous frame.

use tabula::{InputState, Table};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Step {
    Idle,
    /// Click the header of a column.
    ClickHeader(usize),
    /// Shift-click the header of a column, adding it to the sort.
    ShiftClickHeader(usize),
    /// Drag the right border of a column by `dx` over a few frames.
    DragBorder(usize, f32),
    /// Drag a header by `dx`, reordering past neighbours.
    DragHeader(usize, f32),
    RightClickHeader(usize),
}

/// Frames spent on each step.
const STEP_FRAMES: u32 = 4;

pub struct Script {
    steps: Vec<Step>,
    step_n: usize,
    frame_in_step: u32,
    /// Where a drag started, fixed for the whole step.
    anchor: Option<(f32, f32)>,
}

impl Script {
    pub fn demo() -> Self {
        Self::new(vec![
            Step::Idle,
            Step::RightClickHeader(0),
            Step::Idle,
            Step::ClickHeader(1),
            Step::ClickHeader(1),
            Step::ShiftClickHeader(2),
            Step::DragBorder(1, 40.0),
            Step::DragHeader(2, -120.0),
            Step::Idle,
        ])
    }

    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            step_n: 0,
            frame_in_step: 0,
            anchor: None,
        }
    }

    pub fn is_done(&self) -> bool {
        self.step_n >= self.steps.len()
    }

    pub fn current(&self) -> Option<Step> {
        self.steps.get(self.step_n).copied()
    }

    /// Input for the next frame. `table` is the table as left by the previous
    /// frame, `None` before it first appeared.
    pub fn next_input(&mut self, table: Option<&Table>) -> InputState {
        let idle = InputState::at(-1.0, -1.0);
        let (Some(step), Some(table)) = (self.current(), table) else {
            self.advance();
            return idle;
        };
        let header_y = table.outer_rect.min.y + table.cell_padding_y + 1.0;
        let frame = self.frame_in_step;
        let column = |n: usize| table.columns.get(n);

        let io = match step {
            Step::Idle => idle,
            Step::ClickHeader(n) | Step::ShiftClickHeader(n) => match column(n) {
                Some(c) if frame == 0 => {
                    let io = InputState::at((c.min_x + c.max_x) / 2.0, header_y).click();
                    if matches!(step, Step::ShiftClickHeader(_)) {
                        io.shift()
                    } else {
                        io
                    }
                }
                _ => idle,
            },
            Step::RightClickHeader(n) => match column(n) {
                Some(c) if frame == 0 => {
                    InputState::at((c.min_x + c.max_x) / 2.0, header_y).right_click()
                }
                _ => idle,
            },
            Step::DragBorder(n, dx) => match column(n) {
                Some(c) => {
                    let (x, y) = *self.anchor.get_or_insert((c.max_x, header_y));
                    drag(frame, x, y, dx)
                }
                None => idle,
            },
            Step::DragHeader(n, dx) => match column(n) {
                Some(c) => {
                    let (x, y) = *self
                        .anchor
                        .get_or_insert(((c.min_x + c.max_x) / 2.0, header_y));
                    drag(frame, x, y, dx)
                }
                None => idle,
            },
        };

        self.frame_in_step += 1;
        if self.frame_in_step >= STEP_FRAMES {
            self.advance();
        }
        io
    }

    fn advance(&mut self) {
        self.step_n += 1;
        self.frame_in_step = 0;
        self.anchor = None;
    }
}

/// Press, move halfway, move to the end, release.
fn drag(frame: u32, x: f32, y: f32, dx: f32) -> InputState {
    match frame {
        0 => InputState::at(x, y).press(),
        1 => InputState::at(x + dx / 2.0, y).hold(),
        2 => InputState::at(x + dx, y).hold(),
        _ => InputState::at(x + dx, y).release(),
    }
}
