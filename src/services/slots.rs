use chrono::{Duration, NaiveTime};

pub const LABEL_FORMAT: &str = "%H:%M";

pub fn parse_label(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, LABEL_FORMAT).ok()
}

pub fn format_label(t: NaiveTime) -> String {
    t.format(LABEL_FORMAT).to_string()
}

/// Generate the ordered slot-start labels from `opening` (inclusive) up to
/// `closing` (exclusive), stepping by `interval_minutes`. Empty when the
/// window is empty or either label is malformed.
pub fn generate(opening: &str, closing: &str, interval_minutes: i64) -> Vec<String> {
    let (Some(open), Some(close)) = (parse_label(opening), parse_label(closing)) else {
        return vec![];
    };
    if interval_minutes <= 0 {
        return vec![];
    }

    let step = Duration::minutes(interval_minutes);
    let mut slots = vec![];
    let mut current = open;
    while current < close {
        slots.push(format_label(current));
        let (next, wrapped) = current.overflowing_add_signed(step);
        if wrapped != 0 {
            break;
        }
        current = next;
    }
    slots
}
