//! Display formatting shared by every surface that shows workout data

/// Format seconds as "H:MM:SS", or "M:SS" when under an hour
///
/// Negative inputs are clamped to zero.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    let hours = seconds / 3600;
    let minutes = (seconds % 3600) / 60;
    let secs = seconds % 60;

    if hours > 0 {
        format!("{}:{:02}:{:02}", hours, minutes, secs)
    } else {
        format!("{}:{:02}", minutes, secs)
    }
}

/// Format a set weight; absent weight is bodyweight ("BW")
pub fn format_weight(weight: Option<f64>) -> String {
    match weight {
        None => "BW".to_string(),
        Some(w) if w.fract() == 0.0 => format!("{}", w as i64),
        Some(w) => format!("{:.1}", w),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_format_duration() {
        assert_eq!(format_duration(0), "0:00");
        assert_eq!(format_duration(59), "0:59");
        assert_eq!(format_duration(61), "1:01");
        assert_eq!(format_duration(3599), "59:59");
        assert_eq!(format_duration(3600), "1:00:00");
        assert_eq!(format_duration(5400), "1:30:00");
        assert_eq!(format_duration(36_061), "10:01:01");
        assert_eq!(format_duration(-5), "0:00");
    }

    #[test]
    fn test_format_weight() {
        assert_eq!(format_weight(None), "BW");
        assert_eq!(format_weight(Some(135.0)), "135");
        assert_eq!(format_weight(Some(137.5)), "137.5");
        assert_eq!(format_weight(Some(20.333)), "20.3");
    }

    proptest! {
        #[test]
        fn prop_format_duration_hours_only_when_needed(seconds in 0i64..400_000) {
            let rendered = format_duration(seconds);
            let colons = rendered.matches(':').count();
            if seconds >= 3600 {
                prop_assert_eq!(colons, 2);
            } else {
                prop_assert_eq!(colons, 1);
            }
            let secs: i64 = rendered.rsplit(':').next().unwrap().parse().unwrap();
            prop_assert_eq!(secs, seconds % 60);
        }
    }
}
