use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

/// Day of the week as numbered by the registry: Sunday is 1, Saturday is 7.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Weekday {
    Sunday = 1,
    Monday = 2,
    Tuesday = 3,
    Wednesday = 4,
    Thursday = 5,
    Friday = 6,
    Saturday = 7,
}

impl Weekday {
    /// Maps the registry's 1-based day digit to a weekday.
    pub fn from_number(n: u8) -> Option<Self> {
        match n {
            1 => Some(Weekday::Sunday),
            2 => Some(Weekday::Monday),
            3 => Some(Weekday::Tuesday),
            4 => Some(Weekday::Wednesday),
            5 => Some(Weekday::Thursday),
            6 => Some(Weekday::Friday),
            7 => Some(Weekday::Saturday),
            _ => None,
        }
    }

    pub fn as_num(&self) -> u8 {
        *self as u8
    }
}

impl From<Weekday> for chrono::Weekday {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Sunday => chrono::Weekday::Sun,
            Weekday::Monday => chrono::Weekday::Mon,
            Weekday::Tuesday => chrono::Weekday::Tue,
            Weekday::Wednesday => chrono::Weekday::Wed,
            Weekday::Thursday => chrono::Weekday::Thu,
            Weekday::Friday => chrono::Weekday::Fri,
            Weekday::Saturday => chrono::Weekday::Sat,
        }
    }
}

/// One weekly meeting of a class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleTime {
    pub weekday: Weekday,
    /// Start time of the meeting.
    pub time: NaiveTime,
    /// Length of the meeting in class hours.
    pub duration: u32,
    /// Building and room code, e.g. "CTC-CTC108".
    pub room: String,
}

/// One offering (section) of a subject in a given semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Class {
    /// Section code, e.g. "04208A".
    pub class_id: String,
    /// Total number of seats offered.
    pub offered_vacancies: u32,
    /// Seats still open. The registry reports full classes as 0 and does not
    /// guarantee this is at most `offered_vacancies`.
    pub available_vacancies: u32,
    /// Enrollment requests that could not be granted a seat.
    pub orders_without_vacancy: u32,
    pub special_students: u32,
    /// Teacher names in the order the registry lists them.
    pub teachers: Vec<String>,
    pub schedule: Vec<ScheduleTime>,
}

/// A subject together with every class offered for it in one semester.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subject {
    /// Upper-case subject code, e.g. "INE5417".
    pub subject_id: String,
    pub name: String,
    /// Free-text syllabus, fetched separately from the class table.
    pub syllabus: String,
    /// Weekly instruction hours.
    pub instruction_hours: u32,
    pub classes: Vec<Class>,
}

/// The contents of a subject's syllabus page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Syllabus {
    pub subject_id: String,
    pub name: String,
    pub text: String,
}

/// A class a student is enrolled in, as listed on their forum profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentClass {
    pub name: String,
    pub subject_id: String,
    pub class_id: String,
    pub semester: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Student {
    /// The registration number (matrícula).
    pub student_id: String,
    pub name: String,
    /// Program name, title-cased.
    pub program: String,
    pub classes: Vec<StudentClass>,
}

/// A row of a forum room's member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ForumMember {
    pub user_id: String,
    /// Member type as shown by the forum, e.g. "Aluno" or "Professor".
    pub kind: String,
    pub name: String,
}

impl ForumMember {
    pub fn is_student(&self) -> bool {
        self.kind == "Aluno"
    }
}

/// Students of a program grouped by the semester they entered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramCensus {
    pub program: String,
    /// `(entry semester, student count)`, most populous first.
    pub students_per_semester: Vec<(String, usize)>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramHeadcount {
    pub program: String,
    pub students: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuspensionReport {
    pub program: String,
    pub students: usize,
    pub suspended: usize,
    /// Share of suspended students, 0.0 - 100.0.
    pub percentage: f64,
}

/// An academic semester in the registry's `YYYYS` notation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Semester {
    /// Calendar year, e.g. 2017.
    pub year: u16,
    /// Term within the year: 1 and 2 are the regular terms, 3 the summer term.
    pub term: u8,
}

impl Semester {
    /// Creates a new `Semester` instance.
    pub fn new(year: u16, term: u8) -> Self {
        Self { year, term }
    }

    /// Formats the semester into the "YYYYS" form used by the search form.
    ///
    /// Example: `Semester { year: 2017, term: 2 }.format()` returns `"20172"`.
    pub fn format(&self) -> String {
        format!("{:04}{}", self.year, self.term)
    }

    /// Parses a `"YYYYS"` code such as `"20172"`.
    pub fn parse(code: &str) -> crate::error::Result<Self> {
        use crate::error::ScraperError;

        let code = code.trim();
        if code.len() != 5 || !code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(ScraperError::InvalidSemester(code.to_string()));
        }

        let year = code[..4]
            .parse::<u16>()
            .map_err(|_| ScraperError::InvalidSemester(code.to_string()))?;
        let term = code[4..]
            .parse::<u8>()
            .map_err(|_| ScraperError::InvalidSemester(code.to_string()))?;

        if !(1..=3).contains(&term) {
            return Err(ScraperError::InvalidSemester(code.to_string()));
        }

        Ok(Semester::new(year, term))
    }
}

impl std::str::FromStr for Semester {
    type Err = crate::error::ScraperError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Semester::parse(s)
    }
}

impl std::fmt::Display for Semester {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.format())
    }
}
