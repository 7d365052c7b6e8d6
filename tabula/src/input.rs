use drawlist::{Rect, Vec2};

/// Input snapshot the host provides at the start of each frame.
///
/// Edge flags (`mouse_clicked`, `mouse_released`, ...) describe transitions
/// that happened since the previous frame.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct InputState {
    pub mouse_pos: Vec2,
    pub mouse_down: bool,
    pub mouse_clicked: bool,
    pub mouse_released: bool,
    pub mouse_double_clicked: bool,
    pub mouse_right_clicked: bool,
    pub key_shift: bool,
    pub key_ctrl: bool,
    pub key_escape: bool,
    /// Seconds since the previous frame.
    pub delta_time: f32,
}

impl InputState {
    pub fn at(x: f32, y: f32) -> Self {
        Self {
            mouse_pos: Vec2::new(x, y),
            delta_time: 1.0 / 60.0,
            ..Default::default()
        }
    }

    /// Press and release in the same frame.
    pub fn click(mut self) -> Self {
        self.mouse_clicked = true;
        self.mouse_released = true;
        self
    }

    pub fn press(mut self) -> Self {
        self.mouse_clicked = true;
        self.mouse_down = true;
        self
    }

    pub fn hold(mut self) -> Self {
        self.mouse_down = true;
        self
    }

    pub fn release(mut self) -> Self {
        self.mouse_released = true;
        self
    }

    pub fn double_click(mut self) -> Self {
        self.mouse_double_clicked = true;
        self.mouse_clicked = true;
        self.mouse_down = true;
        self
    }

    pub fn right_click(mut self) -> Self {
        self.mouse_right_clicked = true;
        self
    }

    pub fn shift(mut self) -> Self {
        self.key_shift = true;
        self
    }

    pub fn escape(mut self) -> Self {
        self.key_escape = true;
        self
    }

    pub fn hovering(&self, rect: &Rect) -> bool {
        rect.contains(self.mouse_pos)
    }
}
