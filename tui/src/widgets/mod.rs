//! Reusable widgets shared by the screens

pub mod form;
pub mod select_list;
pub mod text_block;

pub use form::{Field, Form, FormEvent};
pub use select_list::SelectList;
pub use text_block::{TextBlock, TextBlockState};
