mod pointer;
mod text;

pub use pointer::{apply_drag, apply_wheel, DragTracker, PointerEvent, WheelTarget, ZOOM_STEP};
pub use text::{
    commit_rotation_text, commit_scale_text, format_scale, parse_angle_text, parse_scale_text,
};
