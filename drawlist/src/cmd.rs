use crate::geometry::{Rect, Vec2};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TextureId(pub u64);

/// Host-side hook executed in place of a draw call.
///
/// `data` is the value registered with [`crate::DrawList::add_callback`].
pub type DrawCallback = fn(cmd: &DrawCmd, data: usize);

/// The state a draw command shares with its neighbours.
///
/// Two adjacent commands with equal headers can be folded into one.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawCmdHeader {
    pub clip_rect: Rect,
    pub texture_id: TextureId,
    pub vtx_offset: u32,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct DrawCmd {
    pub clip_rect: Rect,
    pub texture_id: TextureId,
    pub vtx_offset: u32,
    /// Start of this command's indices in the index buffer.
    pub idx_offset: u32,
    /// Number of indices, a multiple of 3.
    pub elem_count: u32,
    pub callback: Option<DrawCallback>,
    pub callback_data: usize,
}

impl DrawCmd {
    pub fn with_header(header: DrawCmdHeader, idx_offset: u32) -> Self {
        Self {
            clip_rect: header.clip_rect,
            texture_id: header.texture_id,
            vtx_offset: header.vtx_offset,
            idx_offset,
            elem_count: 0,
            callback: None,
            callback_data: 0,
        }
    }

    pub fn header(&self) -> DrawCmdHeader {
        DrawCmdHeader {
            clip_rect: self.clip_rect,
            texture_id: self.texture_id,
            vtx_offset: self.vtx_offset,
        }
    }

    pub fn set_header(&mut self, header: DrawCmdHeader) {
        self.clip_rect = header.clip_rect;
        self.texture_id = header.texture_id;
        self.vtx_offset = header.vtx_offset;
    }

    pub fn is_callback(&self) -> bool {
        self.callback.is_some()
    }

    /// Whether `next` can be folded into this command.
    pub fn can_merge_with(&self, next: &DrawCmd) -> bool {
        !self.is_callback() && !next.is_callback() && self.header() == next.header()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct DrawVert {
    pub pos: Vec2,
    pub uv: Vec2,
    pub col: u32,
}
