use std::time::Duration;

/// Format a duration as the `m:ss` label shown next to tracks.
pub fn duration_label(d: Duration) -> String {
    let secs = d.as_secs();
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Parse a `m:ss` or `h:mm:ss` label back into a duration.
///
/// Returns `None` for empty or malformed labels; catalogs are hand-written
/// and a bad label should not reject the whole archive.
pub fn parse_duration_label(label: &str) -> Option<Duration> {
    let label = label.trim();
    if label.is_empty() {
        return None;
    }

    let mut secs: u64 = 0;
    let mut fields = 0;
    for part in label.split(':') {
        let v: u64 = part.trim().parse().ok()?;
        if fields > 0 && v >= 60 {
            return None;
        }
        secs = secs.checked_mul(60)?.checked_add(v)?;
        fields += 1;
    }

    if fields < 2 || fields > 3 {
        return None;
    }
    Some(Duration::from_secs(secs))
}

/// Lowercase ASCII slug used to derive default track ids.
pub fn slug(name: &str) -> String {
    let mut out = String::new();
    let mut dash = false;
    for c in name.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
            dash = false;
        } else if !dash && !out.is_empty() {
            out.push('-');
            dash = true;
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    out
}
