//! History periods, bar intervals and analysis horizons.

use chrono::{Duration, Months, NaiveDate};
use std::fmt;
use std::str::FromStr;

/// Look-back window requested from the quote history endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Period {
    Days(u32),
    Years(u32),
}

impl Period {
    /// First calendar day covered by the period when looking back from `today`.
    pub fn start_date(&self, today: NaiveDate) -> NaiveDate {
        match self {
            Period::Days(n) => today - Duration::days(i64::from(*n)),
            Period::Years(n) => today
                .checked_sub_months(Months::new(n * 12))
                .unwrap_or(NaiveDate::MIN),
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Period::Days(n) => write!(f, "{}d", n),
            Period::Years(n) => write!(f, "{}y", n),
        }
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim().to_lowercase();
        let unit = s
            .chars()
            .last()
            .ok_or_else(|| "empty period".to_string())?;
        let digits = &s[..s.len() - unit.len_utf8()];
        let n: u32 = digits
            .parse()
            .map_err(|_| format!("invalid period '{}' (expected e.g. 5d, 120d, 1y)", s))?;
        if n == 0 {
            return Err(format!("period must be positive: '{}'", s));
        }
        match unit {
            'd' => Ok(Period::Days(n)),
            'y' => Ok(Period::Years(n)),
            _ => Err(format!("invalid period unit in '{}' (expected d or y)", s)),
        }
    }
}

/// Bar granularity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Interval {
    Daily,
    FiveMinutes,
}

impl Interval {
    pub fn as_str(&self) -> &'static str {
        match self {
            Interval::Daily => "1d",
            Interval::FiveMinutes => "5m",
        }
    }
}

/// Chart horizon for single-symbol analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Horizon {
    Day,
    Week,
    Month,
    Year,
    FiveYears,
}

impl Horizon {
    /// Requested window and interval. The one-day view is intraday; see
    /// [`Horizon::fallback`] for what to ask for when it comes back empty.
    pub fn request(&self) -> (Period, Interval) {
        match self {
            Horizon::Day => (Period::Days(1), Interval::FiveMinutes),
            Horizon::Week => (Period::Days(7), Interval::Daily),
            Horizon::Month => (Period::Days(30), Interval::Daily),
            Horizon::Year => (Period::Years(1), Interval::Daily),
            Horizon::FiveYears => (Period::Years(5), Interval::Daily),
        }
    }

    pub fn fallback(&self) -> Option<(Period, Interval)> {
        match self {
            Horizon::Day => Some((Period::Days(5), Interval::Daily)),
            _ => None,
        }
    }
}

impl FromStr for Horizon {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1d" | "day" => Ok(Horizon::Day),
            "7d" | "week" => Ok(Horizon::Week),
            "30d" | "month" => Ok(Horizon::Month),
            "1y" | "year" => Ok(Horizon::Year),
            "5y" => Ok(Horizon::FiveYears),
            other => Err(format!(
                "unknown horizon '{}' (expected 1d, 7d, 30d, 1y or 5y)",
                other
            )),
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Horizon::Day => "1d",
            Horizon::Week => "7d",
            Horizon::Month => "30d",
            Horizon::Year => "1y",
            Horizon::FiveYears => "5y",
        };
        f.write_str(label)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn parse_days_and_years() {
        assert_eq!("120d".parse::<Period>().unwrap(), Period::Days(120));
        assert_eq!(" 5Y ".parse::<Period>().unwrap(), Period::Years(5));
    }

    #[test]
    fn parse_rejects_garbage() {
        assert!("".parse::<Period>().is_err());
        assert!("0d".parse::<Period>().is_err());
        assert!("12w".parse::<Period>().is_err());
        assert!("xd".parse::<Period>().is_err());
    }

    #[test]
    fn display_round_trips_through_parse() {
        for p in [Period::Days(5), Period::Years(1)] {
            assert_eq!(p.to_string().parse::<Period>().unwrap(), p);
        }
    }

    #[test]
    fn start_date_days_and_years() {
        let today = date(2024, 3, 31);
        assert_eq!(Period::Days(5).start_date(today), date(2024, 3, 26));
        assert_eq!(Period::Years(1).start_date(today), date(2023, 3, 31));
    }

    #[test]
    fn day_horizon_is_intraday_with_daily_fallback() {
        assert_eq!(
            Horizon::Day.request(),
            (Period::Days(1), Interval::FiveMinutes)
        );
        assert_eq!(
            Horizon::Day.fallback(),
            Some((Period::Days(5), Interval::Daily))
        );
        assert_eq!(Horizon::Month.fallback(), None);
    }

    #[test]
    fn horizon_parse() {
        assert_eq!("30d".parse::<Horizon>().unwrap(), Horizon::Month);
        assert_eq!("5y".parse::<Horizon>().unwrap(), Horizon::FiveYears);
        assert!("2w".parse::<Horizon>().is_err());
    }
}
