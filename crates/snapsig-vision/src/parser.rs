use std::sync::LazyLock;

use regex::Regex;
use snapsig_models::{HoldMinutes, Signal, SignalReading};

/// Keyword groups in priority order. The first group with any keyword present
/// in the reply decides the signal.
const SIGNAL_KEYWORDS: [(Signal, &[&str]); 3] = [
    (Signal::Up, &["up", "long"]),
    (Signal::Down, &["down", "short"]),
    (Signal::Wait, &["wait", "hold"]),
];

/// A lone digit 1-5 followed by `min` or `m`, e.g. `2 min`, `3m`. The digit
/// may not follow a word character or a decimal point (`15 min`, `1.5 min`).
static HOLD_MINUTES: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:^|[^\w.])([1-5])\s*(?:min|m)").expect("valid hold-minutes regex")
});

/// Classify a free-form model reply into a signal and optional hold duration.
///
/// Never fails: unrecognized text yields `Signal::Unknown` with no duration.
/// The duration search runs regardless of which signal matched.
pub fn parse_signal(text: &str) -> SignalReading {
    SignalReading {
        signal: classify_signal(text),
        minutes: extract_minutes(text),
    }
}

/// Case-insensitive substring match against the keyword groups.
pub fn classify_signal(text: &str) -> Signal {
    let lowered = text.to_lowercase();
    SIGNAL_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lowered.contains(k)))
        .map(|(signal, _)| *signal)
        .unwrap_or_default()
}

pub fn extract_minutes(text: &str) -> Option<HoldMinutes> {
    let caps = HOLD_MINUTES.captures(text)?;
    caps.get(1)?.as_str().parse::<u8>().ok().and_then(HoldMinutes::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(n: u8) -> Option<HoldMinutes> {
        HoldMinutes::new(n)
    }

    #[test]
    fn up_and_long_classify_up() {
        assert_eq!(classify_signal("up"), Signal::Up);
        assert_eq!(classify_signal("Go LONG here"), Signal::Up);
        assert_eq!(parse_signal("up 2 min").minutes, minutes(2));
    }

    #[test]
    fn down_and_short() {
        assert_eq!(classify_signal("DOWN"), Signal::Down);
        assert_eq!(classify_signal("short it"), Signal::Down);
    }

    #[test]
    fn wait_and_hold() {
        assert_eq!(classify_signal("Wait."), Signal::Wait);
        assert_eq!(classify_signal("hold for now"), Signal::Wait);
    }

    #[test]
    fn first_matching_group_wins() {
        let reading = parse_signal("Long position, but watch for a short-term down move");
        assert_eq!(reading.signal, Signal::Up);

        // down outranks wait
        assert_eq!(classify_signal("wait, then short"), Signal::Down);
    }

    #[test]
    fn duration_independent_of_signal() {
        let reading = parse_signal("wait 3 min");
        assert_eq!(reading.signal, Signal::Wait);
        assert_eq!(reading.minutes, minutes(3));

        let reading = parse_signal("no idea, maybe 4m");
        assert_eq!(reading.signal, Signal::Unknown);
        assert_eq!(reading.minutes, minutes(4));
    }

    #[test]
    fn out_of_range_duration_absent() {
        assert_eq!(parse_signal("xyz 7 min").minutes, None);
        assert_eq!(parse_signal("down 0 min").minutes, None);
        assert_eq!(parse_signal("down 6m").minutes, None);
    }

    #[test]
    fn duration_digit_must_stand_alone() {
        assert_eq!(extract_minutes("up 15 min"), None);
        assert_eq!(extract_minutes("up 25m"), None);
        assert_eq!(extract_minutes("down 1.5 min"), None);
        assert_eq!(extract_minutes("3 min"), minutes(3));
    }

    #[test]
    fn duration_forms() {
        assert_eq!(extract_minutes("down 1 min"), minutes(1));
        assert_eq!(extract_minutes("down 5MIN"), minutes(5));
        assert_eq!(extract_minutes("up 2   minutes"), minutes(2));
        assert_eq!(extract_minutes("up\t3m"), minutes(3));
        assert_eq!(extract_minutes("up for 2 hours"), None);
    }

    #[test]
    fn first_duration_wins() {
        assert_eq!(extract_minutes("up 2 min, maybe 4 min"), minutes(2));
    }

    #[test]
    fn neutral_text_is_unknown() {
        let reading = parse_signal("the chart looks neutral");
        assert_eq!(reading.signal, Signal::Unknown);
        assert_eq!(reading.minutes, None);
    }

    #[test]
    fn empty_text_is_unknown() {
        assert_eq!(parse_signal(""), SignalReading::default());
    }
}
