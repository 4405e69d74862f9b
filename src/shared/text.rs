//! Plain-text helpers for transcript rendering.

/// Greedy word wrap on spaces.
///
/// Existing line breaks are kept and come out as `\n`, whether they were
/// written as `\n` or `\r\n`. A word longer than `width` is never split and
/// ends up on a line of its own.
pub fn wrap(text: &str, width: usize) -> String {
    let mut out = String::with_capacity(text.len() + text.len() / width.max(1));

    let lines = text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line));
    for (i, line) in lines.enumerate() {
        if i > 0 {
            out.push('\n');
        }

        let mut current = 0usize;
        for (j, word) in line.split(' ').enumerate() {
            let len = word.chars().count();
            if j > 0 {
                if current > 0 && current + 1 + len > width {
                    out.push('\n');
                    current = 0;
                } else {
                    out.push(' ');
                    current += 1;
                }
            }
            out.push_str(word);
            current += len;
        }
    }

    out
}

/// Wrap, then switch to CRLF line endings with `indent` after every break.
pub fn wrap_crlf(text: &str, width: usize, indent: &str) -> String {
    wrap(text, width).replace('\n', &format!("\r\n{}", indent))
}
