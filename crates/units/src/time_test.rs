use approx::assert_relative_eq;

use crate::time::{SECONDS_PER_DAY, Time};

#[test]
fn test_time_conversions() {
    assert_relative_eq!(Time::from_hours(1.0).to_seconds(), 3_600.0);
    assert_relative_eq!(Time::from_days(1.0).to_seconds(), SECONDS_PER_DAY);
    assert_relative_eq!(Time::from_seconds(43_200.0).to_days(), 0.5);
    assert_relative_eq!(Time::from_years(1.0).to_days(), 365.25);
}

#[test]
fn test_time_ratio_is_dimensionless() {
    let lifetime = Time::from_seconds(3_600.0);
    let advance = Time::from_seconds(1_800.0);

    assert_relative_eq!(advance / lifetime, 0.5);
    assert_relative_eq!((advance * 2.0).to_seconds(), lifetime.to_seconds());
    assert_relative_eq!((lifetime - advance).to_seconds(), 1_800.0);
}
