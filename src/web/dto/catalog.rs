use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::model::entity::{Course, LessonOutlineRow, Section};

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SectionOutline {
    pub id: Uuid,
    pub title: String,
    pub order_index: i32,
    pub lessons: Vec<LessonOutlineRow>,
}

#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct CourseOutline {
    #[serde(flatten)]
    pub course: Course,
    pub sections: Vec<SectionOutline>,
}

impl CourseOutline {
    /// Groups lesson rows under their sections, keeping both orders as given.
    pub fn from_rows(course: Course, sections: Vec<Section>, lessons: Vec<LessonOutlineRow>) -> Self {
        let mut sections: Vec<SectionOutline> = sections
            .into_iter()
            .map(|s| SectionOutline {
                id: s.id(),
                title: s.title().to_string(),
                order_index: s.order_index(),
                lessons: Vec::new(),
            })
            .collect();

        for lesson in lessons {
            if let Some(section) = sections.iter_mut().find(|s| s.id == lesson.section_id) {
                section.lessons.push(lesson);
            }
        }

        Self { course, sections }
    }
}
