use crate::state::Message;
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};

#[derive(Debug, Clone, PartialEq)]
pub struct DayGroup<'a> {
    pub day: NaiveDate,
    pub label: String,
    pub messages: Vec<&'a Message>,
}

/// "Today", "Yesterday", or e.g. "February 14, 2026".
pub fn day_label(day: NaiveDate, today: NaiveDate) -> String {
    if day == today {
        "Today".to_owned()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_owned()
    } else {
        day.format("%B %-d, %Y").to_string()
    }
}

/// Splits an ordered history into runs of messages that share a calendar day
/// in `tz`. A message opens a new group whenever its day differs from the day
/// of the group currently open, so only calendar boundaries matter, never the
/// gap between timestamps.
pub fn group_by_day<'a, Tz: TimeZone>(
    messages: &'a [Message],
    tz: &Tz,
    today: NaiveDate,
) -> Vec<DayGroup<'a>> {
    let mut groups: Vec<DayGroup<'a>> = vec![];
    for message in messages {
        let day = message.timestamp.with_timezone(tz).date_naive();
        match groups.last_mut() {
            Some(group) if group.day == day => group.messages.push(message),
            _ => groups.push(DayGroup {
                day,
                label: day_label(day, today),
                messages: vec![message],
            }),
        }
    }
    groups
}

pub fn group_by_day_local(messages: &[Message]) -> Vec<DayGroup<'_>> {
    group_by_day(messages, &Local, Local::now().date_naive())
}

/// Bubble time, e.g. "9:05 AM".
pub fn clock_label(timestamp: DateTime<Utc>) -> String {
    timestamp.with_timezone(&Local).format("%-I:%M %p").to_string()
}

/// Recording length as "m:ss".
pub fn duration_label(secs: u32) -> String {
    format!("{}:{:02}", secs / 60, secs % 60)
}

/// Sidebar time: clock time today, "Yesterday", otherwise "MM/dd/yy".
pub fn sidebar_label<Tz: TimeZone>(timestamp: DateTime<Utc>, tz: &Tz, today: NaiveDate) -> String
where
    Tz::Offset: std::fmt::Display,
{
    let local = timestamp.with_timezone(tz);
    let day = local.date_naive();
    if day == today {
        local.format("%-I:%M %p").to_string()
    } else if today.pred_opt() == Some(day) {
        "Yesterday".to_owned()
    } else {
        local.format("%m/%d/%y").to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{MessageId, MessageStatus, Payload};
    use chrono::FixedOffset;

    fn message(id: u64, timestamp: &str) -> Message {
        Message {
            id: MessageId(id),
            conversation_id: "c1".into(),
            sender_id: "me".into(),
            text: Some(format!("#{id}")),
            payload: Payload::Text,
            timestamp: DateTime::parse_from_rfc3339(timestamp)
                .unwrap()
                .with_timezone(&Utc),
            status: MessageStatus::Read,
        }
    }

    fn ids(group: &DayGroup) -> Vec<u64> {
        group.messages.iter().map(|m| m.id.0).collect()
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn one_day_one_group() {
        let messages = [
            message(1, "2026-02-16T00:05:00Z"),
            message(2, "2026-02-16T12:00:00Z"),
            message(3, "2026-02-16T23:59:00Z"),
        ];
        let groups = group_by_day(&messages, &Utc, date(2026, 2, 16));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Today");
        assert_eq!(ids(&groups[0]), [1, 2, 3]);
    }

    #[test]
    fn two_days_two_groups_in_order() {
        let messages = [
            message(1, "2026-02-15T22:30:00Z"),
            message(2, "2026-02-15T22:35:00Z"),
            message(3, "2026-02-16T00:01:00Z"),
            message(4, "2026-02-16T10:00:00Z"),
        ];
        let groups = group_by_day(&messages, &Utc, date(2026, 2, 16));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "Yesterday");
        assert_eq!(ids(&groups[0]), [1, 2]);
        assert_eq!(groups[1].label, "Today");
        assert_eq!(ids(&groups[1]), [3, 4]);
    }

    #[test]
    fn boundary_is_calendar_day_not_elapsed_time() {
        // four minutes apart, different days
        let messages = [
            message(1, "2026-02-14T23:58:00Z"),
            message(2, "2026-02-15T00:02:00Z"),
        ];
        let groups = group_by_day(&messages, &Utc, date(2026, 3, 1));
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].label, "February 14, 2026");
        assert_eq!(groups[1].label, "February 15, 2026");

        // twenty hours apart, same day
        let messages = [
            message(1, "2026-02-14T01:00:00Z"),
            message(2, "2026-02-14T21:00:00Z"),
        ];
        assert_eq!(group_by_day(&messages, &Utc, date(2026, 3, 1)).len(), 1);
    }

    #[test]
    fn days_follow_the_timezone() {
        let messages = [
            message(1, "2026-02-15T20:00:00Z"),
            message(2, "2026-02-16T02:00:00Z"),
        ];
        // both land on Feb 15 at UTC-8
        let pacific = FixedOffset::west_opt(8 * 3600).unwrap();
        let groups = group_by_day(&messages, &pacific, date(2026, 2, 16));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].label, "Yesterday");
        assert_eq!(group_by_day(&messages, &Utc, date(2026, 2, 16)).len(), 2);
    }

    #[test]
    fn returning_day_opens_new_group() {
        let messages = [
            message(1, "2026-02-15T10:00:00Z"),
            message(2, "2026-02-16T10:00:00Z"),
            message(3, "2026-02-15T11:00:00Z"),
        ];
        let groups = group_by_day(&messages, &Utc, date(2026, 2, 20));
        assert_eq!(groups.len(), 3);
    }

    #[test]
    fn empty_history() {
        assert!(group_by_day(&[], &Utc, date(2026, 2, 16)).is_empty());
    }

    #[test]
    fn durations() {
        assert_eq!(duration_label(0), "0:00");
        assert_eq!(duration_label(7), "0:07");
        assert_eq!(duration_label(75), "1:15");
    }

    #[test]
    fn sidebar_labels() {
        let today = date(2026, 2, 16);
        let at = |s: &str| {
            DateTime::parse_from_rfc3339(s)
                .unwrap()
                .with_timezone(&Utc)
        };
        assert_eq!(sidebar_label(at("2026-02-16T10:30:00Z"), &Utc, today), "10:30 AM");
        assert_eq!(sidebar_label(at("2026-02-16T21:05:00Z"), &Utc, today), "9:05 PM");
        assert_eq!(sidebar_label(at("2026-02-15T22:45:00Z"), &Utc, today), "Yesterday");
        assert_eq!(sidebar_label(at("2026-02-14T20:30:00Z"), &Utc, today), "02/14/26");
    }
}
