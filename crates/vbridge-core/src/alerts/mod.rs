use vbridge_model::AlertMap;

/// Build the alert map sent to the worker.
///
/// At most `max_alerts` input positions are scanned; the rest is ignored.
/// Each scanned alert is trimmed and kept under the key of its scan position
/// (`r{position}`) unless it is empty after trimming. Skipped entries still
/// use up their position, so the bound applies to positions, not survivors.
pub fn normalize_alerts<S: AsRef<str>>(raw: &[S], max_alerts: usize) -> AlertMap {
    let mut map = AlertMap::new();
    for (position, alert) in raw.iter().take(max_alerts).enumerate() {
        let alert = alert.as_ref().trim();
        if !alert.is_empty() {
            map.insert(position, alert);
        }
    }
    map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn keys_follow_scan_position() {
        let map = normalize_alerts(&["  hello  ", "", "world"], 10);
        assert_eq!(map.len(), 2);
        assert_eq!(map.get("r0"), Some("hello"));
        assert_eq!(map.get("r1"), None);
        assert_eq!(map.get("r2"), Some("world"));
    }

    #[test]
    fn cap_counts_positions_not_survivors() {
        let map = normalize_alerts(&["a", " ", "\t\n", "d", "e"], 3);
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("r0"), Some("a"));
        assert_eq!(map.get("r3"), None);
    }

    #[test]
    fn excess_alerts_are_dropped_silently() {
        let raw: Vec<String> = (0..15).map(|i| format!("alert {i}")).collect();
        let map = normalize_alerts(raw.as_slice(), 10);
        assert_eq!(map.len(), 10);
        assert_eq!(map.get("r9"), Some("alert 9"));
        assert_eq!(map.get("r10"), None);
    }

    #[test]
    fn surviving_values_match_trimmed_source() {
        let raw = [" a ", "   ", "b", "", "  c\t", "d"];
        let map = normalize_alerts(&raw, 10);

        let empties = raw.iter().filter(|s| s.trim().is_empty()).count();
        assert_eq!(map.len(), raw.len() - empties);
        for (key, value) in map.iter() {
            let position: usize = key[1..].parse().unwrap();
            assert_eq!(value, raw[position].trim());
        }
    }

    #[test]
    fn empty_input_or_zero_cap() {
        assert!(normalize_alerts::<&str>(&[], 10).is_empty());
        assert!(normalize_alerts(&["x"], 0).is_empty());
    }

    #[test]
    fn unicode_whitespace_is_trimmed() {
        let map = normalize_alerts(&["\u{3000}person\u{a0}"], 10);
        assert_eq!(map.get("r0"), Some("person"));
    }
}
