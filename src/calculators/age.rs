// 🎂 Age Calculator
// Calendar age with month borrowing, totals, next birthday and life milestones

use crate::errors::{CalcError, CalcResult};
use crate::result::Calculator;
use crate::validation::{parse_date, reference_date, ValidationError};
use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

const MILESTONES: [(&str, i32); 13] = [
    ("Sweet 16", 16),
    ("Legal Adult (18)", 18),
    ("Legal Drinking (21)", 21),
    ("Quarter Century", 25),
    ("Dirty Thirty", 30),
    ("Midlife (40)", 40),
    ("Half Century", 50),
    ("Retirement (65)", 65),
    ("Platinum (70)", 70),
    ("Diamond (75)", 75),
    ("Octogenarian (80)", 80),
    ("Nonagenarian (90)", 90),
    ("Centenarian (100)", 100),
];

#[derive(Debug, Clone, Deserialize)]
pub struct AgeRequest {
    pub dob: String,
    #[serde(default)]
    pub reference_date: Option<String>,
}

impl AgeRequest {
    pub fn new(dob: &str) -> Self {
        AgeRequest {
            dob: dob.to_string(),
            reference_date: None,
        }
    }

    pub fn on(mut self, reference: &str) -> Self {
        self.reference_date = Some(reference.to_string());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgeSimple {
    pub years: i32,
    pub months: u32,
    pub days: u32,
    pub total_days: i64,
    pub total_weeks: i64,
    pub total_months: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct TotalUnits {
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct NextBirthday {
    pub date: String,
    pub day_of_week: String,
    pub days_remaining: i64,
    pub weeks_remaining: i64,
    pub months_remaining: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct BirthDetails {
    pub date: String,
    pub day_of_week: String,
    pub zodiac_sign: &'static str,
    pub generation: &'static str,
}

#[derive(Debug, Clone, Serialize)]
pub struct Milestone {
    pub name: &'static str,
    pub age: i32,
    pub date: String,
    pub status: &'static str,
    pub time_info: String,
    pub days_difference: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct AgeDetailed {
    #[serde(flatten)]
    pub simple: AgeSimple,
    pub precise_age: String,
    pub total_units: TotalUnits,
    pub next_birthday: NextBirthday,
    pub birth_details: BirthDetails,
    pub milestones: Vec<Milestone>,
    pub age_category: &'static str,
    pub is_leap_year_born: bool,
    pub current_age_in_words: String,
}

// ============================================================================
// DATE HELPERS
// ============================================================================

pub fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        _ if is_leap_year(year) => 29,
        _ => 28,
    }
}

/// Same month/day in `year`; Feb 29 falls back to Feb 28 in common years
fn anniversary(birth: NaiveDate, year: i32) -> CalcResult<NaiveDate> {
    let day = birth.day().min(days_in_month(year, birth.month()));
    NaiveDate::from_ymd_opt(year, birth.month(), day).ok_or_else(|| {
        CalcError::Validation(ValidationError::new(
            "dob",
            "date out of supported range",
            AgeCalculator::NAME,
        ))
    })
}

/// (years, months, days) with day/month borrowing against the reference date
pub fn calendar_diff(birth: NaiveDate, today: NaiveDate) -> (i32, u32, u32) {
    let mut years = today.year() - birth.year();
    let mut months = today.month() as i32 - birth.month() as i32;
    let mut days = today.day() as i32 - birth.day() as i32;

    if days < 0 {
        months -= 1;
        let (prev_year, prev_month) = if today.month() > 1 {
            (today.year(), today.month() - 1)
        } else {
            (today.year() - 1, 12)
        };
        days += days_in_month(prev_year, prev_month) as i32;
    }
    if months < 0 {
        years -= 1;
        months += 12;
    }
    (years, months as u32, days as u32)
}

pub fn zodiac_sign(month: u32, day: u32) -> &'static str {
    const CUTOFFS: [(u32, u32, &str); 12] = [
        (1, 20, "Capricorn"),
        (2, 19, "Aquarius"),
        (3, 21, "Pisces"),
        (4, 20, "Aries"),
        (5, 21, "Taurus"),
        (6, 21, "Gemini"),
        (7, 23, "Cancer"),
        (8, 23, "Leo"),
        (9, 23, "Virgo"),
        (10, 23, "Libra"),
        (11, 22, "Scorpio"),
        (12, 22, "Sagittarius"),
    ];
    CUTOFFS
        .iter()
        .find(|&&(m, d, _)| month < m || (month == m && day <= d))
        .map(|&(_, _, sign)| sign)
        .unwrap_or("Capricorn")
}

pub fn generation(year: i32) -> &'static str {
    match year {
        y if y >= 2013 => "Generation Alpha",
        y if y >= 1997 => "Generation Z",
        y if y >= 1981 => "Millennial",
        y if y >= 1965 => "Generation X",
        y if y >= 1946 => "Baby Boomer",
        y if y >= 1928 => "Silent Generation",
        _ => "Greatest Generation",
    }
}

pub fn life_stage(years: i32) -> &'static str {
    match years {
        y if y < 1 => "Infant",
        y if y < 3 => "Toddler",
        y if y < 13 => "Child",
        y if y < 20 => "Teenager",
        y if y < 40 => "Young Adult",
        y if y < 60 => "Middle-Aged Adult",
        y if y < 80 => "Senior",
        _ => "Elderly",
    }
}

pub fn age_in_words(years: i32) -> String {
    const ONES: [&str; 10] = [
        "", "One", "Two", "Three", "Four", "Five", "Six", "Seven", "Eight", "Nine",
    ];
    const TEENS: [&str; 10] = [
        "Ten", "Eleven", "Twelve", "Thirteen", "Fourteen", "Fifteen", "Sixteen", "Seventeen",
        "Eighteen", "Nineteen",
    ];
    const TENS: [&str; 10] = [
        "", "", "Twenty", "Thirty", "Forty", "Fifty", "Sixty", "Seventy", "Eighty", "Ninety",
    ];

    match years {
        0 => "Less than one year".to_string(),
        1..=9 => ONES[years as usize].to_string(),
        10..=19 => TEENS[(years - 10) as usize].to_string(),
        20..=99 => {
            let tens = TENS[(years / 10) as usize];
            match years % 10 {
                0 => tens.to_string(),
                r => format!("{} {}", tens, ONES[r as usize]),
            }
        }
        100 => "One Hundred".to_string(),
        101..=119 => format!("One Hundred and {}", age_in_words(years - 100)),
        _ => years.to_string(),
    }
}

fn milestones(birth: NaiveDate, today: NaiveDate) -> CalcResult<Vec<Milestone>> {
    MILESTONES
        .iter()
        .map(|&(name, age)| {
            let date = anniversary(birth, birth.year() + age)?;
            let (status, days, info) = if date < today {
                let d = (today - date).num_days();
                ("Completed", d, format!("{} days ago", d))
            } else {
                let d = (date - today).num_days();
                ("Upcoming", d, format!("in {} days", d))
            };
            Ok(Milestone {
                name,
                age,
                date: date.format("%Y-%m-%d").to_string(),
                status,
                time_info: info,
                days_difference: days,
            })
        })
        .collect()
}

fn dates(request: &AgeRequest) -> CalcResult<(NaiveDate, NaiveDate)> {
    let birth = parse_date("dob", &request.dob, AgeCalculator::NAME)?;
    let today = reference_date(request.reference_date.as_deref(), AgeCalculator::NAME)?;
    if birth > today {
        return Err(CalcError::Validation(ValidationError::new(
            "dob",
            "date of birth cannot be in the future",
            AgeCalculator::NAME,
        )));
    }
    Ok((birth, today))
}

pub struct AgeCalculator;

impl Calculator for AgeCalculator {
    type Request = AgeRequest;
    type Simple = AgeSimple;
    type Detailed = AgeDetailed;
    const NAME: &'static str = "age";

    fn simple(request: &AgeRequest) -> CalcResult<AgeSimple> {
        let (birth, today) = dates(request)?;
        let (years, months, days) = calendar_diff(birth, today);
        let total_days = (today - birth).num_days();
        Ok(AgeSimple {
            years,
            months,
            days,
            total_days,
            total_weeks: total_days / 7,
            total_months: i64::from(years) * 12 + i64::from(months),
        })
    }

    fn detailed(request: &AgeRequest) -> CalcResult<AgeDetailed> {
        let simple = Self::simple(request)?;
        let (birth, today) = dates(request)?;

        let mut next = anniversary(birth, today.year())?;
        if next < today {
            next = anniversary(birth, today.year() + 1)?;
        }
        let until = (next - today).num_days();
        let hours = simple.total_days * 24;

        Ok(AgeDetailed {
            precise_age: format!(
                "{} years, {} months, {} days",
                simple.years, simple.months, simple.days
            ),
            total_units: TotalUnits {
                hours,
                minutes: hours * 60,
                seconds: hours * 3600,
            },
            next_birthday: NextBirthday {
                date: next.format("%Y-%m-%d").to_string(),
                day_of_week: next.format("%A").to_string(),
                days_remaining: until,
                weeks_remaining: until / 7,
                months_remaining: until / 30,
            },
            birth_details: BirthDetails {
                date: birth.format("%Y-%m-%d").to_string(),
                day_of_week: birth.format("%A").to_string(),
                zodiac_sign: zodiac_sign(birth.month(), birth.day()),
                generation: generation(birth.year()),
            },
            milestones: milestones(birth, today)?,
            age_category: life_stage(simple.years),
            is_leap_year_born: is_leap_year(birth.year()),
            current_age_in_words: age_in_words(simple.years),
            simple,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_age_with_reference_date() {
        let r = AgeCalculator::simple(&AgeRequest::new("1990-05-15").on("2024-03-10")).unwrap();
        assert_eq!(r.years, 33);
        assert_eq!(r.months, 9);
        // Borrow from February 2024 (29 days): 10 - 15 + 29
        assert_eq!(r.days, 24);
        assert_eq!(r.total_months, 405);
        println!("✅ Age reference date test PASSED");
    }

    #[test]
    fn test_future_dob_rejected() {
        assert!(AgeCalculator::simple(&AgeRequest::new("2030-01-01").on("2024-01-01")).is_err());
        assert!(AgeCalculator::simple(&AgeRequest::new("15/05/1990")).is_err());
    }

    #[test]
    fn test_same_day_and_idempotence() {
        let req = AgeRequest::new("2000-01-01").on("2000-01-01");
        let a = AgeCalculator::simple(&req).unwrap();
        assert_eq!(a.total_days, 0);
        assert_eq!(a, AgeCalculator::simple(&req).unwrap());
    }

    #[test]
    fn test_leap_day_birthday() {
        let d = AgeCalculator::detailed(&AgeRequest::new("2000-02-29").on("2023-03-01")).unwrap();
        assert!(d.is_leap_year_born);
        assert_eq!(d.next_birthday.date, "2024-02-29");
        assert_eq!(d.birth_details.zodiac_sign, "Pisces");
        assert_eq!(d.birth_details.generation, "Generation Z");
        assert_eq!(d.milestones.len(), 13);
        // 2016 is a leap year so Sweet 16 lands on the real day
        assert_eq!(d.milestones[0].date, "2016-02-29");
        assert_eq!(d.milestones[0].status, "Completed");
    }

    #[test]
    fn test_words_and_stage() {
        assert_eq!(age_in_words(0), "Less than one year");
        assert_eq!(age_in_words(42), "Forty Two");
        assert_eq!(age_in_words(30), "Thirty");
        assert_eq!(age_in_words(105), "One Hundred and Five");
        assert_eq!(life_stage(45), "Middle-Aged Adult");
        assert_eq!(zodiac_sign(12, 25), "Capricorn");
    }
}
