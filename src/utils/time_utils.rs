use chrono::{Datelike, NaiveDate};

/// First day of the month containing `date`.
pub fn first_day_of_month(date: NaiveDate) -> NaiveDate {
    NaiveDate::from_ymd_opt(date.year(), date.month(), 1).unwrap()
}

/// Last day of the month containing `date`.
pub fn last_day_of_month(date: NaiveDate) -> NaiveDate {
    let (next_year, next_month) = if date.month() == 12 {
        (date.year() + 1, 1)
    } else {
        (date.year(), date.month() + 1)
    };
    NaiveDate::from_ymd_opt(next_year, next_month, 1)
        .unwrap()
        .pred_opt()
        .unwrap()
}

/// Calendar month window around `date`, end clipped to `date` itself when
/// it falls mid-month.
pub fn month_window(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    (first_day_of_month(date), last_day_of_month(date).min(date))
}

/// Calendar year window around `date`, end clipped to `date` itself when
/// it falls mid-year.
pub fn year_window(date: NaiveDate) -> (NaiveDate, NaiveDate) {
    let start = NaiveDate::from_ymd_opt(date.year(), 1, 1).unwrap();
    let end = NaiveDate::from_ymd_opt(date.year(), 12, 31).unwrap();
    (start, end.min(date))
}

/// Jan 1 through Dec 31 of the given calendar year.
pub fn year_bounds(year: i32) -> (NaiveDate, NaiveDate) {
    (
        NaiveDate::from_ymd_opt(year, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(year, 12, 31).unwrap(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn month_window_clips_to_mid_month() {
        let (start, end) = month_window(date("2024-03-17"));
        assert_eq!(start, date("2024-03-01"));
        assert_eq!(end, date("2024-03-17"));
    }

    #[test]
    fn month_window_full_month_on_last_day() {
        let (start, end) = month_window(date("2024-02-29"));
        assert_eq!(start, date("2024-02-01"));
        assert_eq!(end, date("2024-02-29"));
    }

    #[test]
    fn december_rolls_into_next_year() {
        assert_eq!(last_day_of_month(date("2023-12-05")), date("2023-12-31"));
    }

    #[test]
    fn year_window_clips_to_snapshot_date() {
        let (start, end) = year_window(date("2024-05-02"));
        assert_eq!(start, date("2024-01-01"));
        assert_eq!(end, date("2024-05-02"));

        let (_, full_end) = year_window(date("2024-12-31"));
        assert_eq!(full_end, date("2024-12-31"));
    }
}
