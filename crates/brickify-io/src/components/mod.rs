//! Dioxus UI components for brickify.
//!
//! Provides the file picker, the crop editor, the layout sidebar, the
//! result card with its dialogs, the piece table, the access notice and
//! the notification toast.

mod access;
mod controls;
mod crop_editor;
mod layout_controls;
mod notification;
mod piece_table;
mod result_view;
mod upload;

pub use access::AccessNotice;
pub use crop_editor::CropEditor;
pub use layout_controls::LayoutControls;
pub use notification::{Notice, NoticeKind, Notification};
pub use piece_table::PieceTableView;
pub use result_view::ResultView;
pub use upload::FileUpload;
