use chrono::NaiveDate;
use serde::Serialize;
use serde_json::Value;

/// A posting exactly as the scraper wrote it. The shape is not trusted:
/// every read goes through the accessors in `normalize`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawPosting(pub Value);

impl RawPosting {
    pub fn value(&self) -> &Value {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostingRecord {
    pub id: String,
    pub title: String, // never absent, possibly empty
    pub company: Option<String>,
    pub location: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
}

/// Upstream labels detail categories only by their position in an ordered
/// list, so each variant is pinned to a fixed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DetailCategory {
    Basic = 0,
    JobType = 1,
    WorkConditions = 2,
    Application = 3,
    Qualification = 4,
    Contact = 5,
    Registration = 6,
}

impl DetailCategory {
    pub const COUNT: usize = 7;

    pub fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ContactInfo {
    pub manager: String,
    pub phone: String,
    pub mobile: String,
    pub fax: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct QualificationInfo {
    pub major: String,
    pub license: String,
}

/// Flattened detail record. Every missing value is an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DetailView {
    pub id: String,
    pub title: String,
    pub company: String,
    pub job_type: String,
    pub work_hours: String,
    pub experience: String,
    pub education: String,
    pub employment_type: String,
    pub wage: String,
    pub work_location: String,
    pub work_form: String,
    pub insurance: String,
    pub severance: String,
    pub job_description: Vec<String>,
    pub screening: String,
    pub application_method: String,
    pub documents: String,
    pub application_url: String,
    pub deadline: String,
    pub qualification: QualificationInfo,
    pub contact: ContactInfo,
    pub registered_at: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Deadline {
    UntilFilled,
    On(NaiveDate),
    Unspecified,
}

impl Deadline {
    /// Days remaining until a dated deadline; negative once it has passed.
    pub fn days_left(&self, today: NaiveDate) -> Option<i64> {
        match self {
            Deadline::On(date) => Some((*date - today).num_days()),
            _ => None,
        }
    }
}

impl DetailView {
    pub fn deadline_kind(&self) -> Deadline {
        crate::normalize::classify_deadline(&self.deadline)
    }

    pub fn education_irrelevant(&self) -> bool {
        self.education.contains("무관")
    }

    pub fn experience_irrelevant(&self) -> bool {
        self.experience.contains("무관")
    }

    pub fn license_required(&self) -> bool {
        let license = self.qualification.license.trim();
        !license.is_empty() && license != "관계없음"
    }
}
