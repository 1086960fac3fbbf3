/// Render a byte count in the largest binary unit (b, kb, mb, gb) that keeps the value
/// below 1024, rounded to 2 decimal places.
///
/// Unscaled byte counts are rendered as integers, scaled values always carry at least
/// one decimal place.
///
/// # Example
/// ```
/// use ch10::format_size;
///
/// assert_eq!(format_size(512), "512 b");
/// assert_eq!(format_size(2_097_152), "2.0 mb");
/// ```
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["kb", "mb", "gb"];

    if bytes < 1024 {
        return format!("{bytes} b");
    }
    #[allow(clippy::cast_precision_loss)]
    let mut size = bytes as f64;
    let mut unit = "b";
    for next in UNITS {
        if size < 1024.0 {
            break;
        }
        size /= 1024.0;
        unit = next;
    }

    let rounded = format!("{:.2}", (size * 100.0).round() / 100.0);
    let trimmed = rounded.trim_end_matches('0');
    let trimmed = if trimmed.ends_with('.') {
        &rounded[..=trimmed.len()]
    } else {
        trimmed
    };
    format!("{trimmed} {unit}")
}

/// Render a count with comma thousands separators.
#[must_use]
pub fn format_count(count: u64) -> String {
    let digits = count.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}
