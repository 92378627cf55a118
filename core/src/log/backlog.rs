use memchr::{memchr, memchr_iter};

/// Cut the bounded trailing window of historical lines out of raw log bytes.
///
/// At most `max_bytes` from the end are considered; if that cut lands in the
/// middle of a line the partial line is dropped. Blank lines are skipped and
/// only the last `max_lines` remaining lines are returned, oldest first.
pub fn trailing_window(bytes: &[u8], max_bytes: usize, max_lines: usize) -> Vec<String> {
    let start = bytes.len().saturating_sub(max_bytes);
    let mut window = &bytes[start..];

    if start > 0 && bytes[start - 1] != b'\n' {
        window = match memchr(b'\n', window) {
            Some(pos) => &window[pos + 1..],
            None => &[],
        };
    }

    let mut lines: Vec<&[u8]> = Vec::new();
    let mut line_start = 0;
    for end in memchr_iter(b'\n', window) {
        lines.push(&window[line_start..end]);
        line_start = end + 1;
    }
    if line_start < window.len() {
        lines.push(&window[line_start..]);
    }

    let lines: Vec<String> = lines
        .into_iter()
        .map(|raw| String::from_utf8_lossy(raw).trim_end_matches('\r').to_string())
        .filter(|line| !line.trim().is_empty())
        .collect();

    let skip = lines.len().saturating_sub(max_lines);
    lines.into_iter().skip(skip).collect()
}
