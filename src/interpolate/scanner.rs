#[derive(Clone, Copy, PartialEq, Eq)]
pub(super) enum State {
    Normal,
    SingleQuoted,
    DoubleQuoted,
    Bracketed,
    LineComment,
    BlockComment(u32),
}

pub(super) fn is_line_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'-') && bytes.get(idx + 1) == Some(&b'-')
}

pub(super) fn is_block_comment_start(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'/') && bytes.get(idx + 1) == Some(&b'*')
}

pub(super) fn is_block_comment_end(bytes: &[u8], idx: usize) -> bool {
    bytes.get(idx) == Some(&b'*') && bytes.get(idx + 1) == Some(&b'/')
}

/// Parse `{digits}` starting at `start` (which must point at `{`).
///
/// Returns the index just past `}` and the parsed number.
pub(super) fn scan_index_token(bytes: &[u8], start: usize) -> Option<(usize, usize)> {
    let mut idx = start + 1;
    while idx < bytes.len() && bytes[idx].is_ascii_digit() {
        idx += 1;
    }
    if idx == start + 1 || bytes.get(idx) != Some(&b'}') {
        return None;
    }
    let digits = std::str::from_utf8(&bytes[start + 1..idx]).ok()?;
    digits.parse().ok().map(|n| (idx + 1, n))
}

/// Advance the quote/comment state for the byte at `idx`.
///
/// Returns the number of extra bytes consumed (escaped quotes, two-byte comment
/// markers) so callers copy them through untouched.
pub(super) fn step(state: &mut State, bytes: &[u8], idx: usize) -> usize {
    let b = bytes[idx];
    match *state {
        State::Normal => match b {
            b'\'' => *state = State::SingleQuoted,
            b'"' => *state = State::DoubleQuoted,
            b'[' => *state = State::Bracketed,
            _ if is_line_comment_start(bytes, idx) => {
                *state = State::LineComment;
                return 1;
            }
            _ if is_block_comment_start(bytes, idx) => {
                *state = State::BlockComment(1);
                return 1;
            }
            _ => {}
        },
        State::SingleQuoted => {
            if b == b'\'' {
                if bytes.get(idx + 1) == Some(&b'\'') {
                    return 1;
                }
                *state = State::Normal;
            }
        }
        State::DoubleQuoted => {
            if b == b'"' {
                if bytes.get(idx + 1) == Some(&b'"') {
                    return 1;
                }
                *state = State::Normal;
            }
        }
        State::Bracketed => {
            if b == b']' {
                if bytes.get(idx + 1) == Some(&b']') {
                    return 1;
                }
                *state = State::Normal;
            }
        }
        State::LineComment => {
            if b == b'\n' {
                *state = State::Normal;
            }
        }
        State::BlockComment(depth) => {
            if is_block_comment_start(bytes, idx) {
                *state = State::BlockComment(depth + 1);
                return 1;
            } else if is_block_comment_end(bytes, idx) {
                *state = if depth == 1 {
                    State::Normal
                } else {
                    State::BlockComment(depth - 1)
                };
                return 1;
            }
        }
    }
    0
}
