//! Rotation decision: skip or rotate, from credential age alone.

use crate::models::credential::CredentialInfo;
use chrono::{DateTime, Duration, Utc};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotateReason {
    /// No active credential exists yet.
    Bootstrap,
    /// The credential reached its max age.
    Expired,
    /// The credential is younger than its max age but rotation was forced.
    Forced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Skip { remaining: Duration },
    Rotate(RotateReason),
}

impl Decision {
    pub fn is_rotate(&self) -> bool {
        matches!(self, Decision::Rotate(_))
    }
}

pub fn decide(
    current: Option<&CredentialInfo>,
    max_age: Duration,
    force: bool,
    now: DateTime<Utc>,
) -> Decision {
    let Some(current) = current else {
        return Decision::Rotate(RotateReason::Bootstrap);
    };
    // A key stamped slightly ahead of the local clock counts as brand new.
    let age = (now - current.created_at).max(Duration::zero());
    if age < max_age {
        if force {
            return Decision::Rotate(RotateReason::Forced);
        }
        return Decision::Skip {
            remaining: max_age.checked_sub(&age).unwrap_or(max_age),
        };
    }
    Decision::Rotate(RotateReason::Expired)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn key_aged(age: Duration) -> CredentialInfo {
        CredentialInfo {
            owner: "ci".into(),
            id: "AKIAOLD".into(),
            created_at: now() - age,
        }
    }

    #[test]
    fn test_no_current_rotates() {
        assert_eq!(
            decide(None, Duration::hours(5), false, now()),
            Decision::Rotate(RotateReason::Bootstrap)
        );
        assert_eq!(
            decide(None, Duration::hours(5), true, now()),
            Decision::Rotate(RotateReason::Bootstrap)
        );
    }

    #[test]
    fn test_young_key_skips() {
        for minutes in [0, 1, 60, 299] {
            let key = key_aged(Duration::minutes(minutes));
            let decision = decide(Some(&key), Duration::hours(5), false, now());
            assert_eq!(
                decision,
                Decision::Skip {
                    remaining: Duration::hours(5) - Duration::minutes(minutes)
                }
            );
        }
    }

    #[test]
    fn test_old_key_rotates() {
        for minutes in [300, 301, 600, 100_000] {
            let key = key_aged(Duration::minutes(minutes));
            assert_eq!(
                decide(Some(&key), Duration::hours(5), false, now()),
                Decision::Rotate(RotateReason::Expired)
            );
        }
    }

    #[test]
    fn test_force_rotates_young_key() {
        let key = key_aged(Duration::hours(1));
        assert_eq!(
            decide(Some(&key), Duration::hours(5), true, now()),
            Decision::Rotate(RotateReason::Forced)
        );
    }

    #[test]
    fn test_key_from_the_future_skips_with_full_max_age() {
        let key = key_aged(Duration::seconds(-5));
        let max_age = Duration::hours(crate::constants::MAX_MAX_AGE_HOURS as i64);
        assert_eq!(
            decide(Some(&key), max_age, false, now()),
            Decision::Skip { remaining: max_age }
        );
    }

    #[test]
    fn test_force_on_expired_key_is_expired() {
        let key = key_aged(Duration::hours(10));
        assert_eq!(
            decide(Some(&key), Duration::hours(5), true, now()),
            Decision::Rotate(RotateReason::Expired)
        );
    }
}
