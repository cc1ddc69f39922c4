pub(in crate::tui) fn clamp_index(index: usize, len: usize) -> usize {
    if len == 0 { 0 } else { index.min(len - 1) }
}

pub(in crate::tui) fn move_up(index: usize) -> usize {
    index.saturating_sub(1)
}

pub(in crate::tui) fn move_down(index: usize, len: usize) -> usize {
    if index + 1 < len { index + 1 } else { index }
}

pub(in crate::tui) fn is_name_char(ch: char) -> bool {
    ch.is_ascii_alphanumeric() || matches!(ch, '-' | '_' | '.')
}

/// A name that maps to exactly one directory under the managed root.
pub(in crate::tui) fn is_valid_name(name: &str) -> bool {
    !name.is_empty() && name.chars().all(is_name_char) && name.chars().any(|ch| ch != '.')
}
