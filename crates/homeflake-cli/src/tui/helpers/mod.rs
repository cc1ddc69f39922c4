use super::*;

mod nav;
mod text;

pub(in crate::tui) use nav::*;
pub(in crate::tui) use text::*;
