//! Day/night wake scheduling policy.

use crate::clock::ServerDateTime;

/// Fixed day/night policy table.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct DayNightPolicy {
    /// First quiet hour (inclusive), evening side.
    pub quiet_start_hour: u8,
    /// Last quiet hour (inclusive), morning side.
    pub quiet_end_hour: u8,
    /// Absolute wake time used inside the quiet window.
    pub morning_hour: u8,
    pub morning_minute: u8,
    /// Daytime wake alignment interval.
    pub interval_minutes: u8,
    /// Fallback retry delay when no server time was obtained.
    pub retry_minutes: u8,
}

impl DayNightPolicy {
    /// Reference policy: quiet 23:00-05:59, wake 06:00, 10 minute grid.
    pub const DEFAULT: Self = Self {
        quiet_start_hour: 23,
        quiet_end_hour: 5,
        morning_hour: 6,
        morning_minute: 0,
        interval_minutes: 10,
        retry_minutes: 10,
    };

    fn in_quiet_window(&self, hour: u8) -> bool {
        hour >= self.quiet_start_hour || hour <= self.quiet_end_hour
    }
}

/// Next wake time, consumed by the sleep/power-down collaborator.
///
/// `AtMinute` deliberately carries no hour: the RTC hardware handles
/// rollover past the top of the hour, and the policy does not second-
/// guess it.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum WakeSchedule {
    /// Absolute morning wake after the quiet window.
    Morning { hour: u8, minute: u8 },
    /// Relative wake at the next aligned minute, hour left to the RTC.
    AtMinute { minute: u8 },
    /// Plain retry delay when no valid time is available.
    AfterMinutes { minutes: u8 },
}

/// Computes the next wake from server time and the day/night policy.
pub fn compute_next_wake(now: &ServerDateTime, policy: &DayNightPolicy) -> WakeSchedule {
    if now.is_none() {
        return WakeSchedule::AfterMinutes {
            minutes: policy.retry_minutes,
        };
    }

    if policy.in_quiet_window(now.hour) {
        return WakeSchedule::Morning {
            hour: policy.morning_hour,
            minute: policy.morning_minute,
        };
    }

    let interval = policy.interval_minutes.max(1);
    let aligned = (now.minute / interval + 1) * interval;
    WakeSchedule::AtMinute {
        minute: aligned % 60,
    }
}

/// Converts a schedule into a wake delay for the deep-sleep timer.
///
/// This is backend conversion for an RTC that only takes durations, not
/// additional policy; the minute-wrap arithmetic mirrors what alarm
/// hardware would do on its own.
pub fn wake_delay_minutes(schedule: WakeSchedule, now: &ServerDateTime) -> u16 {
    match schedule {
        WakeSchedule::AfterMinutes { minutes } => minutes as u16,
        WakeSchedule::AtMinute { minute } => {
            let delta = (minute as u16 + 60 - now.minute as u16) % 60;
            if delta == 0 { 60 } else { delta }
        }
        WakeSchedule::Morning { hour, minute } => {
            let target = hour as u16 * 60 + minute as u16;
            let current = now.hour as u16 * 60 + now.minute as u16;
            let delta = (target + 24 * 60 - current) % (24 * 60);
            if delta == 0 { 24 * 60 } else { delta }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(hour: u8, minute: u8) -> ServerDateTime {
        ServerDateTime {
            year: 2025,
            month: 3,
            day: 14,
            hour,
            minute,
            second: 0,
        }
    }

    #[test]
    fn quiet_window_hours_wake_at_fixed_morning_time() {
        for hour in [23, 0, 1, 2, 3, 4, 5] {
            for minute in [0, 17, 59] {
                assert_eq!(
                    compute_next_wake(&at(hour, minute), &DayNightPolicy::DEFAULT),
                    WakeSchedule::Morning { hour: 6, minute: 0 },
                    "hour={hour} minute={minute}"
                );
            }
        }
    }

    #[test]
    fn daytime_wakes_align_to_next_ten_minute_mark() {
        let policy = DayNightPolicy::DEFAULT;
        assert_eq!(
            compute_next_wake(&at(12, 0), &policy),
            WakeSchedule::AtMinute { minute: 10 }
        );
        assert_eq!(
            compute_next_wake(&at(12, 9), &policy),
            WakeSchedule::AtMinute { minute: 10 }
        );
        assert_eq!(
            compute_next_wake(&at(12, 10), &policy),
            WakeSchedule::AtMinute { minute: 20 }
        );
        assert_eq!(
            compute_next_wake(&at(12, 57), &policy),
            WakeSchedule::AtMinute { minute: 0 }
        );
        assert_eq!(
            compute_next_wake(&at(6, 0), &policy),
            WakeSchedule::AtMinute { minute: 10 }
        );
        assert_eq!(
            compute_next_wake(&at(22, 59), &policy),
            WakeSchedule::AtMinute { minute: 0 }
        );
    }

    #[test]
    fn missing_server_time_falls_back_to_retry_interval() {
        assert_eq!(
            compute_next_wake(&ServerDateTime::NONE, &DayNightPolicy::DEFAULT),
            WakeSchedule::AfterMinutes { minutes: 10 }
        );
    }

    #[test]
    fn delay_conversion_handles_minute_wrap() {
        assert_eq!(
            wake_delay_minutes(WakeSchedule::AtMinute { minute: 0 }, &at(12, 57)),
            3
        );
        assert_eq!(
            wake_delay_minutes(WakeSchedule::AtMinute { minute: 10 }, &at(12, 3)),
            7
        );
        assert_eq!(
            wake_delay_minutes(WakeSchedule::AfterMinutes { minutes: 10 }, &at(12, 3)),
            10
        );
    }

    #[test]
    fn delay_conversion_reaches_morning_across_midnight() {
        let schedule = WakeSchedule::Morning { hour: 6, minute: 0 };
        assert_eq!(wake_delay_minutes(schedule, &at(23, 30)), 390);
        assert_eq!(wake_delay_minutes(schedule, &at(5, 59)), 1);
        assert_eq!(wake_delay_minutes(schedule, &at(0, 0)), 360);
    }
}
