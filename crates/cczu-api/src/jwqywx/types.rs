//! Wire models for the academic-affairs service.
//!
//! The upstream API names its fields with pinyin abbreviations (`xh` =
//! student number, `kcmc` = course name, …); everything here maps them to
//! readable names with serde renames. Responses share one envelope shape,
//! decoded permissively: an ill-shaped or missing `message` payload becomes
//! an empty list rather than an error, because several endpoints answer with
//! whatever the underlying stored procedure produced.

use crate::schedule::RawScheduleCell;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use std::collections::HashMap;

/// Generic response envelope: `{"status": …, "message": […], "token": …}`.
#[derive(Debug, Clone, Deserialize)]
#[serde(bound(deserialize = "T: DeserializeOwned"))]
pub struct Message<T> {
    pub status: i32,
    #[serde(default, deserialize_with = "permissive_list")]
    pub message: Vec<T>,
    #[serde(default)]
    pub token: Option<String>,
}

/// Decodes `message` as a list of `T`, degrading to empty on any mismatch.
fn permissive_list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// User record returned by the login endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct LoginUser {
    /// Account identifier (the student number logged in with).
    #[serde(rename = "yhdm")]
    pub user_code: String,
    #[serde(rename = "yhmc")]
    pub display_name: String,
    /// Role of the account (student, staff, …).
    #[serde(rename = "yhsf")]
    pub identity: String,
    /// Current term code, e.g. `2025-2026-1`.
    #[serde(rename = "xq")]
    pub term: String,
    #[serde(rename = "dqz")]
    pub current_value: i64,
    #[serde(rename = "zc")]
    pub position: i64,
    #[serde(rename = "gh")]
    pub employee_number: String,
    pub smscode: String,
    #[serde(rename = "xb")]
    pub gender: String,
    #[serde(rename = "yhqx")]
    pub permission: String,
    /// Internal subject id; attached to most follow-up requests. Empty when
    /// the credentials were wrong, even though the login call answers 200.
    #[serde(rename = "yhid")]
    pub user_id: String,
}

/// One graded course.
#[derive(Debug, Clone, Deserialize)]
pub struct CourseGrade {
    #[serde(rename = "bh")]
    pub class_id: String,
    #[serde(rename = "bj")]
    pub class_name: String,
    #[serde(rename = "xh")]
    pub student_id: String,
    #[serde(rename = "xm")]
    pub student_name: String,
    #[serde(rename = "kcdm")]
    pub course_id: String,
    #[serde(rename = "kcmc")]
    pub course_name: String,
    #[serde(rename = "xq")]
    pub term: i64,
    #[serde(rename = "kclb")]
    pub course_type: String,
    #[serde(rename = "lbmc")]
    pub course_type_name: String,
    #[serde(rename = "xs")]
    pub course_hours: i64,
    #[serde(rename = "xf")]
    pub credits: f64,
    #[serde(rename = "jsmc")]
    pub teacher_name: String,
    #[serde(rename = "ksxzm")]
    pub exam_kind_code: i64,
    #[serde(rename = "ksxz")]
    pub exam_kind: String,
    #[serde(rename = "kscj")]
    pub exam_grade: String,
    #[serde(rename = "idn")]
    pub ident: i64,
    #[serde(rename = "cj")]
    pub grade: f64,
    #[serde(rename = "xfjd")]
    pub grade_points: f64,
}

/// Grade-point summary for the student.
#[derive(Debug, Clone, Deserialize)]
pub struct StudentPoint {
    #[serde(rename = "bh")]
    pub class_id: String,
    #[serde(rename = "bj")]
    pub class_name: String,
    #[serde(rename = "xh")]
    pub student_id: String,
    #[serde(rename = "xm")]
    pub student_name: String,
    #[serde(rename = "xb")]
    pub gender: String,
    #[serde(rename = "xjqk")]
    pub enrollment_status: String,
    #[serde(rename = "csny")]
    pub birthday: String,
    #[serde(rename = "xsid")]
    pub student_uid: String,
    #[serde(rename = "pjxfjd")]
    pub average_grade_points: f64,
}

/// A term code as listed by the term endpoint, newest first.
#[derive(Debug, Clone, Deserialize)]
pub struct Term {
    #[serde(rename = "xq")]
    pub term: String,
}

/// One exam listing. `exam_time`/`location` stay `None` until the exam is
/// actually scheduled.
#[derive(Debug, Clone, Deserialize)]
pub struct ExamArrangement {
    #[serde(rename = "kcdm")]
    pub course_id: String,
    #[serde(rename = "kcmc")]
    pub course_name: String,
    #[serde(rename = "xsbh")]
    pub class_id: String,
    #[serde(rename = "xsbj")]
    pub class_name: String,
    #[serde(rename = "xh")]
    pub student_id: String,
    #[serde(rename = "xm")]
    pub student_name: String,
    #[serde(default, rename = "jse")]
    pub location: Option<String>,
    #[serde(default, rename = "kssj")]
    pub exam_time: Option<String>,
    #[serde(rename = "lb")]
    pub exam_kind: String,
    #[serde(rename = "xklb")]
    pub study_kind: String,
    #[serde(rename = "bmmc")]
    pub campus: String,
    #[serde(default, rename = "bz")]
    pub remark: Option<String>,
    #[serde(default, rename = "zc")]
    pub week: Option<i64>,
    #[serde(default, rename = "jc1")]
    pub start_slot: Option<i64>,
    #[serde(default, rename = "jc2")]
    pub end_slot: Option<i64>,
    #[serde(rename = "xq")]
    pub term: String,
    #[serde(default, rename = "sjxx")]
    pub day_info: Option<String>,
}

impl ExamArrangement {
    /// Whether the registrar has assigned this exam a time yet.
    pub fn is_scheduled(&self) -> bool {
        self.exam_time.is_some()
    }
}

/// A single dynamically-typed field of a schedule row.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Int(i64),
    Double(f64),
    Bool(bool),
    String(String),
    Null,
}

impl FieldValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FieldValue::String(s) => Some(s),
            _ => None,
        }
    }
}

/// One time-slot row of the raw timetable.
///
/// The row is dynamically keyed rather than a fixed schema: day columns
/// `kc1..kc7` hold the packed section strings, and the parallel families
/// `kcmc1..kcmc20` / `skjs1..skjs20` correlate course names to instructors.
/// Unknown or absent keys are not errors.
#[derive(Debug, Clone, Deserialize)]
#[serde(transparent)]
pub struct ScheduleRow {
    pub fields: HashMap<String, FieldValue>,
}

impl ScheduleRow {
    /// Converts this row into its seven day cells, packing each cell's
    /// instructor string from the name-correlation families.
    ///
    /// Instructor entries are joined with `,/` and stay positionally aligned
    /// with the course segments: an empty entry is kept, not dropped, so a
    /// section without a known instructor does not shift its neighbours.
    pub fn to_cells(&self) -> Vec<RawScheduleCell> {
        let teachers = self.teacher_map();

        (1..=7)
            .map(|day| {
                let course = self
                    .fields
                    .get(&format!("kc{day}"))
                    .and_then(FieldValue::as_str)
                    .unwrap_or("")
                    .to_string();
                let teacher = pack_teachers(&course, &teachers);
                RawScheduleCell { course, teacher }
            })
            .collect()
    }

    /// Course name → instructor, from the numbered field families.
    fn teacher_map(&self) -> HashMap<&str, &str> {
        let mut map = HashMap::new();
        for index in 1..=20 {
            let name = self
                .fields
                .get(&format!("kcmc{index}"))
                .and_then(FieldValue::as_str);
            let teacher = self
                .fields
                .get(&format!("skjs{index}"))
                .and_then(FieldValue::as_str);
            if let (Some(name), Some(teacher)) = (name, teacher) {
                map.insert(name.trim(), teacher);
            }
        }
        map
    }
}

/// Builds the `,/`-joined instructor string for a packed course string,
/// looking each segment's course name up by its first token.
fn pack_teachers(course: &str, teachers: &HashMap<&str, &str>) -> String {
    if course.is_empty() {
        return String::new();
    }
    course
        .split('/')
        .map(|segment| {
            let name = segment.trim().split_whitespace().next().unwrap_or("");
            teachers.get(name).copied().unwrap_or("")
        })
        .collect::<Vec<_>>()
        .join(",/")
}
