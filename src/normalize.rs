use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;
use serde_json::{Map, Value};

use crate::models::{
    ContactInfo, Deadline, DetailCategory, DetailView, PostingRecord, QualificationInfo,
    RawPosting,
};

// Flat browse shape first, rich detail shape second.
const ID_KEYS: &[&str] = &["id", "채용공고ID"];
const TITLE_KEYS: &[&str] = &["title", "채용제목"];
const COMPANY_KEYS: &[&str] = &["company", "회사명"];
const LOCATION_KEYS: &[&str] = &["location"];
const LINK_KEYS: &[&str] = &["link", "채용공고URL"];
const SUMMARY_KEYS: &[&str] = &["summary"];

const DETAIL_ROOT: &str = "상세정보";
const DETAIL_CATEGORIES: &str = "세부요건";
const DETAIL_DESCRIPTION: &str = "직무내용";

static DATE: LazyLock<Option<Regex>> = LazyLock::new(|| {
    Regex::new(r"(\d{4})\s*[-./]\s*(\d{1,2})\s*[-./]\s*(\d{1,2})").ok()
});

/// The detail categories of one posting, pinned to their positional slots.
/// A slot that is missing or not a mapping reads as absent for every field.
pub struct Categories<'a> {
    slots: [Option<&'a Map<String, Value>>; DetailCategory::COUNT],
}

impl<'a> Categories<'a> {
    pub fn of(raw: &'a Value) -> Self {
        let mut slots = [None; DetailCategory::COUNT];
        if let Some(list) = category_list(raw) {
            for (slot, entry) in slots.iter_mut().zip(list.iter()) {
                *slot = entry.as_object();
            }
        }
        Self { slots }
    }

    /// The single get-or-default read every detail field goes through.
    pub fn get(&self, category: DetailCategory, key: &str) -> Option<String> {
        let map = self.slots.get(category.index()).copied().flatten()?;
        text(map.get(key))
    }

    pub fn get_or_default(&self, category: DetailCategory, key: &str) -> String {
        self.get(category, key).unwrap_or_default()
    }

    /// First line only; upstream appends annotations on later lines.
    pub fn first_line(&self, category: DetailCategory, key: &str) -> String {
        self.get(category, key)
            .map(|s| first_line(&s))
            .unwrap_or_default()
    }

    /// Line-separated list rejoined for display, skipping empty entries.
    pub fn joined(&self, category: DetailCategory, key: &str) -> String {
        self.get(category, key)
            .map(|s| non_empty_lines(&s).join(", "))
            .unwrap_or_default()
    }
}

fn category_list(raw: &Value) -> Option<&Vec<Value>> {
    raw.get(DETAIL_ROOT)
        .and_then(|d| d.get(DETAIL_CATEGORIES))
        .and_then(Value::as_array)
        .or_else(|| raw.get("details").and_then(Value::as_array))
}

/// Unwraps the scraper's single-element sequences and renders scalars as
/// text. Empty sequences, nulls, and nested mappings are absent.
fn text(value: Option<&Value>) -> Option<String> {
    let value = match value? {
        Value::Array(items) => items.first()?,
        other => other,
    };
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// Optional top-level field: whitespace-only reads as absent, so a blank
/// flat key falls through to its alias.
fn optional(raw: &Value, keys: &[&str]) -> Option<String> {
    keys.iter().find_map(|key| {
        text(raw.get(*key))
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
    })
}

fn first_line(s: &str) -> String {
    s.lines().next().unwrap_or_default().trim().to_string()
}

fn non_empty_lines(s: &str) -> Vec<String> {
    s.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

pub fn surrogate_id(ordinal: usize) -> String {
    format!("posting-{}", ordinal)
}

/// The identifier the scraper attached, if any.
pub fn source_id(raw: &RawPosting) -> Option<String> {
    optional(raw.value(), ID_KEYS)
}

/// Never fails. `ordinal` is the posting's position in the source document
/// and only matters when the source carries no identifier.
pub fn normalize(raw: &RawPosting, ordinal: usize) -> PostingRecord {
    let value = raw.value();
    let categories = Categories::of(value);

    let location = optional(value, LOCATION_KEYS).or_else(|| {
        Some(categories.first_line(DetailCategory::Basic, "근무예정지")).filter(|s| !s.is_empty())
    });

    PostingRecord {
        id: source_id(raw).unwrap_or_else(|| surrogate_id(ordinal)),
        title: optional(value, TITLE_KEYS).unwrap_or_default(),
        company: optional(value, COMPANY_KEYS),
        location,
        link: optional(value, LINK_KEYS),
        summary: optional(value, SUMMARY_KEYS),
    }
}

pub fn to_detail_view(raw: &RawPosting) -> DetailView {
    use DetailCategory::*;

    let value = raw.value();
    let c = Categories::of(value);

    let description = value
        .get(DETAIL_ROOT)
        .and_then(|d| text(d.get(DETAIL_DESCRIPTION)))
        .or_else(|| text(value.get("detail")))
        .unwrap_or_default();

    DetailView {
        id: optional(value, ID_KEYS).unwrap_or_default(),
        title: optional(value, TITLE_KEYS).unwrap_or_default(),
        company: optional(value, COMPANY_KEYS).unwrap_or_default(),

        experience: c.first_line(Basic, "경력조건"),
        education: c.get_or_default(Basic, "학력"),
        employment_type: c.get_or_default(Basic, "고용형태"),
        work_location: c.get_or_default(Basic, "근무예정지"),

        job_type: c.get_or_default(JobType, "모집직종"),

        work_hours: c.first_line(WorkConditions, "근무시간"),
        wage: c.first_line(WorkConditions, "임금조건"),
        work_form: c.get_or_default(WorkConditions, "근무형태"),
        insurance: c.joined(WorkConditions, "사회보험"),
        severance: c.get_or_default(WorkConditions, "퇴직급여"),

        job_description: non_empty_lines(&description),

        screening: c.get_or_default(Application, "전형방법"),
        application_method: c.get_or_default(Application, "접수방법"),
        documents: c.get_or_default(Application, "제출서류 준비물"),
        deadline: c.first_line(Application, "접수마감일"),
        application_url: optional(value, LINK_KEYS).unwrap_or_default(),

        qualification: QualificationInfo {
            major: c.get_or_default(Qualification, "전공"),
            license: c.get_or_default(Qualification, "자격면허"),
        },

        contact: ContactInfo {
            manager: c.get_or_default(Contact, "담당자"),
            phone: c.get_or_default(Contact, "전화번호"),
            mobile: c.get_or_default(Contact, "휴대폰번호"),
            fax: c.get_or_default(Contact, "팩스번호"),
            email: c.get_or_default(Contact, "이메일"),
        },

        registered_at: c.get_or_default(Registration, "채용공고 등록일시"),
    }
}

pub fn classify_deadline(deadline: &str) -> Deadline {
    if deadline.contains("채용시까지") {
        return Deadline::UntilFilled;
    }
    match parse_date(deadline) {
        Some(date) => Deadline::On(date),
        None => Deadline::Unspecified,
    }
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let caps = DATE.as_ref()?.captures(text)?;
    let year = caps[1].parse().ok()?;
    let month = caps[2].parse().ok()?;
    let day = caps[3].parse().ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}
