use validator::ValidationErrors;

pub mod ingredients;
pub mod recipes;
pub mod tags;

/// Name of the first field rejected by `validator`, in alphabetical order.
pub(crate) fn first_invalid_field(errors: &ValidationErrors) -> String {
    let mut fields: Vec<String> = errors.errors().keys().map(|key| key.to_string()).collect();
    fields.sort();
    fields
        .into_iter()
        .next()
        .unwrap_or_else(|| "non_field_errors".to_string())
}

/// Collapses whitespace runs and strips control characters from single-line input.
pub(crate) fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

/// Sanitizes every line, trims blank lines at both ends and keeps at most one blank line in a row.
pub(crate) fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        if line.is_empty() {
            if previous_empty {
                continue;
            }
            previous_empty = true;
        } else {
            previous_empty = false;
        }
        result.push(line);
    }

    result.join("\n")
}
