//! Roster ingestion - maps registration-form spreadsheet rows to canonical fields.
//!
//! Spreadsheet headers are the free-text questions of the club's sign-up form. Each
//! known header is renamed to a stable field name; unknown headers pass through
//! unchanged so new form questions are never dropped.

use serde::Serialize;
use std::collections::BTreeMap;

/// One spreadsheet row as `(header, cell)` pairs in column order.
pub type RawRow = Vec<(String, String)>;

/// Header prefix of the student-id question. The rest of the header embeds example
/// values that change between form revisions.
pub const STUDENT_ID_HEADER_PREFIX: &str = "학번 8자리";

/// Exact header of the phone-number question.
pub const PHONE_HEADER: &str = "연락처(ex.010-1234-5678)";

/// Canonical field for the student-id column.
pub const STUDENT_ID_FIELD: &str = "studentId";

/// Canonical field for the phone column.
pub const PHONE_FIELD: &str = "phone";

/// How a form header is recognized.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderPattern {
    /// The header must equal this text
    Exact(&'static str),
    /// The header must start with this text
    Prefix(&'static str),
}

impl HeaderPattern {
    /// Whether `header` is recognized by this pattern.
    #[must_use]
    pub fn matches(self, header: &str) -> bool {
        match self {
            Self::Exact(text) => header == text,
            Self::Prefix(text) => header.starts_with(text),
        }
    }
}

/// Form headers in question order and the canonical field each one maps to.
pub const HEADER_MAP: &[(HeaderPattern, &str)] = &[
    (HeaderPattern::Exact("타임스탬프"), "timestamp"),
    (
        HeaderPattern::Exact(
            "IGRUS의 활동에 참여하기 위해선 회비 2만원을 납부해주셔야 합니다. 회비 납부를 완료했습니까? ",
        ),
        "agreement",
    ),
    (HeaderPattern::Exact("이름(ex.김아그)"), "name"),
    (HeaderPattern::Exact("성별"), "gender"),
    (HeaderPattern::Prefix(STUDENT_ID_HEADER_PREFIX), STUDENT_ID_FIELD),
    (HeaderPattern::Exact("학년"), "grade"),
    (HeaderPattern::Exact("학과"), "department"),
    (HeaderPattern::Exact("재학/휴학 여부"), "enrollmentStatus"),
    (HeaderPattern::Exact(PHONE_HEADER), PHONE_FIELD),
    (HeaderPattern::Exact("관심 분야를 모두 체크해주세요."), "interests"),
    (HeaderPattern::Exact("IGRUS에 가입하게 된 경로가 어떻게 되나요?"), "joinPath"),
    (HeaderPattern::Exact("IGRUS에 들어오신 목적/이유가 무엇인가요?"), "joinPurpose"),
    (HeaderPattern::Exact("IGRUS에서 원하는 활동이 있다면 알려주세요!"), "desiredActivities"),
    (HeaderPattern::Exact("회비 납부"), "paymentStatus"),
    (HeaderPattern::Exact("카톡초대"), "kakaoInvite"),
];

/// A roster row keyed by canonical field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct RosterRecord(BTreeMap<String, String>);

impl RosterRecord {
    /// Value of a canonical field, if the row had that column.
    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    /// Number of fields present.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the row had no columns at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates fields in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Consumes the record, returning the underlying map.
    #[must_use]
    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.0
    }
}

/// Canonical field names in form order.
#[must_use]
pub fn canonical_fields() -> Vec<&'static str> {
    HEADER_MAP.iter().map(|&(_, field)| field).collect()
}

/// Canonical field for a recognized form header, `None` for anything else.
#[must_use]
pub fn known_field(header: &str) -> Option<&'static str> {
    HEADER_MAP
        .iter()
        .find(|(pattern, _)| pattern.matches(header))
        .map(|&(_, field)| field)
}

/// Resolves the canonical field name for a header; unknown headers map to themselves.
#[must_use]
pub fn canonical_header(header: &str) -> &str {
    known_field(header).unwrap_or(header)
}

/// Normalizes a phone number cell.
///
/// Hyphens and spaces are removed. Spreadsheets that treat the column as a number
/// drop the leading zero of mobile numbers, so a 10-digit value starting with
/// `10` gets it back.
#[must_use]
pub fn normalize_phone(raw: &str) -> String {
    let cleaned: String = raw.chars().filter(|c| *c != '-' && *c != ' ').collect();
    let lost_leading_zero = cleaned.len() == 10
        && cleaned.starts_with("10")
        && cleaned.bytes().all(|b| b.is_ascii_digit());

    if lost_leading_zero {
        format!("0{cleaned}")
    } else {
        cleaned
    }
}

/// Maps one raw row to a [`RosterRecord`].
///
/// Columns are applied left to right, so when two headers resolve to the same field
/// the rightmost column wins.
#[must_use]
pub fn map_row(raw_row: &[(String, String)]) -> RosterRecord {
    let fields = raw_row
        .iter()
        .map(|(header, value)| match known_field(header) {
            Some(PHONE_FIELD) => (PHONE_FIELD.to_string(), normalize_phone(value)),
            Some(field) => (field.to_string(), value.clone()),
            None => (header.clone(), value.clone()),
        })
        .collect();
    RosterRecord(fields)
}

/// Maps every row, preserving input order. Rows may carry different header sets.
#[must_use]
pub fn map_rows(raw_rows: &[RawRow]) -> Vec<RosterRecord> {
    raw_rows.iter().map(|row| map_row(row)).collect()
}
