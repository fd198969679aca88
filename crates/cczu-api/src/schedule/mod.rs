//! Timetable decoding.
//!
//! The schedule endpoint returns a matrix of packed cells rather than
//! structured records. The outer dimension is the time slot and the inner
//! dimension the day of week (the wire format is one JSON object per
//! time-slot row with day columns `kc1..kc7`); both indices are emitted
//! 1-based. Each cell packs up to seven co-scheduled sections into one
//! string:
//!
//! ```text
//! 课程甲 W2305 2-8,11-14,/课程乙 W10阶 15-18,/
//! ```
//!
//! with a parallel `,/`-joined instructor string aligned segment by segment.
//! Decoding is a pure function of the matrix: malformed cells degrade to
//! empty weeks or locations, they never error.

mod weeks;

pub use weeks::parse_week_descriptor;

use weeks::is_week_descriptor;

/// One matrix cell as received from the schedule endpoint: the `/`-packed
/// section string and the `,/`-joined instructor string correlated to it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawScheduleCell {
    pub course: String,
    pub teacher: String,
}

impl RawScheduleCell {
    pub fn new(course: impl Into<String>, teacher: impl Into<String>) -> Self {
        Self {
            course: course.into(),
            teacher: teacher.into(),
        }
    }
}

/// A decoded course occurrence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedCourse {
    pub name: String,
    pub teacher: String,
    pub location: String,
    /// Term weeks this section meets, sorted ascending without duplicates.
    pub weeks: Vec<u32>,
    /// 1 = Monday … 7 = Sunday.
    pub day_of_week: u32,
    /// 1-based period index within the day.
    pub time_slot: u32,
}

/// Decodes a whole timetable matrix into discrete course entries.
///
/// One cell may yield zero, one, or several entries: empty cells produce
/// nothing, and a slot hosting multiple sections (separated by `/`) produces
/// one entry per section, each with its own week set and location.
pub fn parse_week_matrix(matrix: &[Vec<RawScheduleCell>]) -> Vec<ParsedCourse> {
    let mut courses = Vec::new();

    for (slot_index, row) in matrix.iter().enumerate() {
        for (day_index, cell) in row.iter().enumerate() {
            decode_cell(
                cell,
                day_index as u32 + 1,
                slot_index as u32 + 1,
                &mut courses,
            );
        }
    }

    courses
}

fn decode_cell(cell: &RawScheduleCell, day_of_week: u32, time_slot: u32, out: &mut Vec<ParsedCourse>) {
    if cell.course.is_empty() {
        return;
    }

    let teacher_parts: Vec<&str> = cell.teacher.split(",/").collect();

    for (segment_index, segment) in cell.course.split('/').enumerate() {
        let segment = segment.trim();
        if segment.is_empty() {
            continue;
        }

        let mut tokens = segment.split_whitespace();
        let Some(name) = tokens.next() else {
            continue;
        };

        // Padding and ordering vary across responses, so each remaining
        // token is classified on its own rather than by position.
        let mut week_descriptor = String::new();
        let mut location_tokens = Vec::new();
        for token in tokens {
            if is_week_descriptor(token) {
                week_descriptor.push_str(token);
            } else {
                location_tokens.push(token);
            }
        }

        let teacher = teacher_parts
            .get(segment_index)
            .copied()
            .unwrap_or("")
            .split(',')
            .next()
            .unwrap_or("")
            .trim()
            .to_string();

        out.push(ParsedCourse {
            name: name.to_string(),
            teacher,
            location: location_tokens.join(" "),
            weeks: parse_week_descriptor(&week_descriptor),
            day_of_week,
            time_slot,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cell(course: &str, teacher: &str) -> RawScheduleCell {
        RawScheduleCell::new(course, teacher)
    }

    #[test]
    fn single_course_cell() {
        let matrix = vec![vec![cell("高等数学 1-16周 教学楼A101", "张三")]];
        let parsed = parse_week_matrix(&matrix);

        assert_eq!(parsed.len(), 1);
        let course = &parsed[0];
        assert_eq!(course.name, "高等数学");
        assert_eq!(course.teacher, "张三");
        assert_eq!(course.location, "教学楼A101");
        assert_eq!(course.weeks, (1..=16).collect::<Vec<u32>>());
        assert_eq!(course.day_of_week, 1);
        assert_eq!(course.time_slot, 1);
    }

    #[test]
    fn slash_packed_sections_split_with_own_weeks_and_locations() {
        let matrix = vec![vec![cell(
            "课程甲 W2305 2-8,11-14,/课程乙 W10阶 15-18,/",
            "李老师,/王老师",
        )]];
        let parsed = parse_week_matrix(&matrix);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].name, "课程甲");
        assert_eq!(parsed[0].location, "W2305");
        assert_eq!(parsed[0].weeks, vec![2, 3, 4, 5, 6, 7, 8, 11, 12, 13, 14]);
        assert_eq!(parsed[0].teacher, "李老师");

        assert_eq!(parsed[1].name, "课程乙");
        assert_eq!(parsed[1].location, "W10阶");
        assert_eq!(parsed[1].weeks, vec![15, 16, 17, 18]);
        assert_eq!(parsed[1].teacher, "王老师");
    }

    #[test]
    fn odd_week_cell_keeps_odd_members_only() {
        let matrix = vec![vec![cell("课程丙 W1106 单 7-8,11-14,", "赵老师")]];
        let parsed = parse_week_matrix(&matrix);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].weeks, vec![7, 11, 13]);
        assert_eq!(parsed[0].location, "W1106");
    }

    #[test]
    fn empty_cells_produce_nothing() {
        let matrix = vec![
            vec![cell("", ""), cell("", "")],
            vec![cell("", ""), cell("", "")],
        ];
        assert!(parse_week_matrix(&matrix).is_empty());
    }

    #[test]
    fn coordinates_are_one_based_slot_by_day() {
        // outer index = time slot, inner index = day of week
        let matrix = vec![
            vec![cell("", ""), cell("", "")],
            vec![cell("", ""), cell("英语 1-8周 B201", "刘老师")],
        ];
        let parsed = parse_week_matrix(&matrix);

        assert_eq!(parsed.len(), 1);
        assert_eq!(parsed[0].time_slot, 2);
        assert_eq!(parsed[0].day_of_week, 2);
    }

    #[test]
    fn missing_teacher_slot_defaults_to_empty() {
        let matrix = vec![vec![cell("体育 1-16周 操场/围棋 1-8周 E404", "")]];
        let parsed = parse_week_matrix(&matrix);

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed[0].teacher, "");
        assert_eq!(parsed[1].teacher, "");
    }

    #[test]
    fn multiple_instructors_take_the_first() {
        let matrix = vec![vec![cell("实验课 1-4周 实验楼301", "钱老师,孙老师")]];
        let parsed = parse_week_matrix(&matrix);
        assert_eq!(parsed[0].teacher, "钱老师");
    }

    #[test]
    fn empty_teacher_slot_keeps_later_alignment() {
        let matrix = vec![vec![cell("甲 1-8周 A1/乙 9-16周 B2", ",/周老师")]];
        let parsed = parse_week_matrix(&matrix);

        assert_eq!(parsed[0].teacher, "");
        assert_eq!(parsed[1].teacher, "周老师");
    }

    #[test]
    fn cell_without_week_descriptor_degrades_to_empty_weeks() {
        let matrix = vec![vec![cell("讲座 大礼堂", "吴老师")]];
        let parsed = parse_week_matrix(&matrix);

        assert_eq!(parsed.len(), 1);
        assert!(parsed[0].weeks.is_empty());
        assert_eq!(parsed[0].location, "大礼堂");
    }

    #[test]
    fn multiple_location_tokens_join_with_single_space() {
        let matrix = vec![vec![cell("课程丁 1-8周 教学楼 A101", "郑老师")]];
        let parsed = parse_week_matrix(&matrix);
        assert_eq!(parsed[0].location, "教学楼 A101");
    }
}
