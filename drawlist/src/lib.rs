pub mod cmd;
pub mod draw_list;
pub mod geometry;
pub mod splitter;
pub mod text;

pub use cmd::{DrawCallback, DrawCmd, DrawCmdHeader, DrawVert, TextureId};
pub use draw_list::DrawList;
pub use geometry::{Rect, Vec2};
pub use splitter::{DrawChannel, DrawListSplitter};
pub use text::{visible_label, MonoMeasure, TextMeasure};
