//! Training-plan aggregation.
//!
//! The plan endpoint returns one flat row per planned course; this module
//! groups them by semester and totals credits per course kind for display.

use serde::Deserialize;
use std::collections::BTreeMap;

/// One raw row of the training plan as the service returns it.
#[derive(Debug, Clone, Deserialize)]
pub struct RawPlanItem {
    #[serde(default, rename = "nj")]
    pub grade_year: Option<i64>,
    #[serde(default, rename = "zydm")]
    pub major_code: Option<String>,
    /// Program length in years, served as a string.
    #[serde(default, rename = "xz")]
    pub duration_years: Option<String>,
    #[serde(rename = "xq")]
    pub semester: i64,
    #[serde(rename = "kcdm")]
    pub course_code: String,
    /// Course name; upstream pads it with trailing spaces.
    #[serde(rename = "kcmc")]
    pub course_name: String,
    /// Kind code: `A1`/`B1`/`C1` required, `C3` elective, `S…` practice.
    #[serde(rename = "lbdh")]
    pub kind_code: String,
    #[serde(rename = "xf")]
    pub credits: f64,
    #[serde(rename = "lbmc")]
    pub kind_name: String,
    #[serde(default, rename = "xh")]
    pub student_id: Option<String>,
    #[serde(default, rename = "kscj")]
    pub grade: Option<f64>,
    #[serde(default, rename = "lb")]
    pub category: Option<String>,
    #[serde(default, rename = "zymc")]
    pub major_name: Option<String>,
}

/// Coarse course kind used for credit accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlanCourseKind {
    Required,
    Elective,
    Practice,
}

impl PlanCourseKind {
    /// Maps an upstream kind code to its coarse kind.
    fn from_code(code: &str) -> Self {
        let code = code.trim();
        match code {
            "A1" | "B1" | "C1" => PlanCourseKind::Required,
            _ if code.to_uppercase().starts_with('S') => PlanCourseKind::Practice,
            _ => PlanCourseKind::Elective,
        }
    }
}

/// A planned course, cleaned up for display.
#[derive(Debug, Clone)]
pub struct PlanCourse {
    pub code: String,
    pub name: String,
    pub credits: f64,
    pub kind: PlanCourseKind,
}

/// The aggregated training plan for one major.
#[derive(Debug, Clone)]
pub struct TrainingPlan {
    pub major_name: String,
    pub duration_years: u32,
    pub total_credits: f64,
    pub required_credits: f64,
    pub elective_credits: f64,
    pub practice_credits: f64,
    pub courses_by_semester: BTreeMap<i64, Vec<PlanCourse>>,
}

/// Aggregates raw plan rows into a [`TrainingPlan`].
pub fn aggregate(items: &[RawPlanItem]) -> TrainingPlan {
    let major_name = items
        .first()
        .and_then(|item| item.major_name.as_deref())
        .map(|name| name.trim().to_string())
        .unwrap_or_default();
    let duration_years = items
        .first()
        .and_then(|item| item.duration_years.as_deref())
        .and_then(|years| years.trim().parse().ok())
        .unwrap_or(0);

    let mut required_credits = 0.0;
    let mut elective_credits = 0.0;
    let mut practice_credits = 0.0;
    let mut courses_by_semester: BTreeMap<i64, Vec<PlanCourse>> = BTreeMap::new();

    for item in items {
        let kind = PlanCourseKind::from_code(&item.kind_code);
        match kind {
            PlanCourseKind::Required => required_credits += item.credits,
            PlanCourseKind::Elective => elective_credits += item.credits,
            PlanCourseKind::Practice => practice_credits += item.credits,
        }

        courses_by_semester
            .entry(item.semester)
            .or_default()
            .push(PlanCourse {
                code: item.course_code.clone(),
                name: item.course_name.trim().to_string(),
                credits: item.credits,
                kind,
            });
    }

    TrainingPlan {
        major_name,
        duration_years,
        total_credits: required_credits + elective_credits + practice_credits,
        required_credits,
        elective_credits,
        practice_credits,
        courses_by_semester,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(semester: i64, code: &str, name: &str, kind_code: &str, credits: f64) -> RawPlanItem {
        RawPlanItem {
            grade_year: Some(2023),
            major_code: Some("0856".to_string()),
            duration_years: Some("4".to_string()),
            semester,
            course_code: code.to_string(),
            course_name: name.to_string(),
            kind_code: kind_code.to_string(),
            credits,
            kind_name: String::new(),
            student_id: None,
            grade: None,
            category: None,
            major_name: Some("软件工程 ".to_string()),
        }
    }

    #[test]
    fn credits_total_per_kind() {
        let items = vec![
            item(1, "K1", "高等数学", "A1", 5.0),
            item(1, "K2", "程序设计", "B1", 3.5),
            item(2, "K3", "专业选修", "C3", 2.0),
            item(2, "K4", "生产实习", "S2", 1.0),
        ];
        let plan = aggregate(&items);

        assert_eq!(plan.required_credits, 8.5);
        assert_eq!(plan.elective_credits, 2.0);
        assert_eq!(plan.practice_credits, 1.0);
        assert_eq!(plan.total_credits, 11.5);
    }

    #[test]
    fn kind_code_mapping() {
        assert_eq!(PlanCourseKind::from_code("A1"), PlanCourseKind::Required);
        assert_eq!(PlanCourseKind::from_code("B1"), PlanCourseKind::Required);
        assert_eq!(PlanCourseKind::from_code("C1"), PlanCourseKind::Required);
        assert_eq!(PlanCourseKind::from_code(" C3 "), PlanCourseKind::Elective);
        assert_eq!(PlanCourseKind::from_code("S"), PlanCourseKind::Practice);
        assert_eq!(PlanCourseKind::from_code("s1"), PlanCourseKind::Practice);
        assert_eq!(PlanCourseKind::from_code("D9"), PlanCourseKind::Elective);
    }

    #[test]
    fn courses_group_by_semester_in_order() {
        let items = vec![
            item(3, "K5", "操作系统", "C1", 4.0),
            item(1, "K1", "高等数学", "A1", 5.0),
            item(3, "K6", "编译原理", "C1", 3.0),
        ];
        let plan = aggregate(&items);

        let semesters: Vec<i64> = plan.courses_by_semester.keys().copied().collect();
        assert_eq!(semesters, vec![1, 3]);
        assert_eq!(plan.courses_by_semester[&3].len(), 2);
    }

    #[test]
    fn header_fields_come_from_the_first_row() {
        let items = vec![item(1, "K1", "高等数学 ", "A1", 5.0)];
        let plan = aggregate(&items);

        assert_eq!(plan.major_name, "软件工程");
        assert_eq!(plan.duration_years, 4);
        assert_eq!(plan.courses_by_semester[&1][0].name, "高等数学");
    }

    #[test]
    fn empty_plan_aggregates_to_zeroes() {
        let plan = aggregate(&[]);
        assert_eq!(plan.total_credits, 0.0);
        assert!(plan.courses_by_semester.is_empty());
        assert!(plan.major_name.is_empty());
    }
}
