//! Path normalization.

/// Resolve `input` against `cwd`, expanding a leading `~` to `home`.
///
/// `.` segments are dropped, `..` pops one segment (never past the root), and
/// the result is always absolute with no trailing slash.
pub fn resolve_path(input: &str, cwd: &str, home: &str) -> String {
    let expanded;
    let input = if input == "~" || input.starts_with("~/") {
        expanded = format!("{home}{}", &input[1..]);
        expanded.as_str()
    } else {
        input
    };

    let mut stack: Vec<&str> = if input.starts_with('/') {
        Vec::new()
    } else {
        cwd.split('/').filter(|s| !s.is_empty()).collect()
    };

    for segment in input.split('/').filter(|s| !s.is_empty()) {
        match segment {
            "." => {},
            ".." => {
                stack.pop();
            },
            name => stack.push(name),
        }
    }

    format!("/{}", stack.join("/"))
}

/// Last segment of an absolute path (`/` for the root).
pub fn basename(path: &str) -> &str {
    path.rsplit('/').find(|s| !s.is_empty()).unwrap_or("/")
}

/// Split a normalized absolute path into its segments.
pub(crate) fn segments(path: &str) -> Vec<&str> {
    path.split('/').filter(|s| !s.is_empty()).collect()
}
