//! Request bodies of the admin content editor. Parent ids come from the path.

use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

use crate::model::{
    entity::{
        AttachmentCreate, DigitalProduct, LessonCreate, Question, QuestionCreate, Quiz, QuizCreate,
        SectionCreate,
    },
    validators::validate_options,
};

/// Product as the admin sees it, file location included.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct AdminProduct {
    #[serde(flatten)]
    pub product: DigitalProduct,
    pub file_url: String,
}

impl From<DigitalProduct> for AdminProduct {
    fn from(product: DigitalProduct) -> Self {
        Self {
            file_url: product.file_url().to_string(),
            product,
        }
    }
}

/// Quiz with its questions, correct indices included.
#[derive(Debug, Serialize, Deserialize, utoipa::ToSchema)]
pub struct QuizWithQuestions {
    #[serde(flatten)]
    pub quiz: Quiz,
    pub questions: Vec<Question>,
}

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct SectionBody {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    pub order_index: Option<i32>,
}

impl SectionBody {
    pub fn into_create(self, course_id: Uuid) -> SectionCreate {
        SectionCreate {
            course_id,
            title: self.title,
            order_index: self.order_index,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct LessonBody {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[validate(url)]
    pub video_url: Option<String>,
    pub order_index: Option<i32>,
    pub is_free_preview: Option<bool>,
}

impl LessonBody {
    pub fn into_create(self, section_id: Uuid) -> LessonCreate {
        LessonCreate {
            section_id,
            title: self.title,
            content: self.content,
            video_url: self.video_url,
            order_index: self.order_index,
            is_free_preview: self.is_free_preview,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct QuizBody {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(range(min = 0, max = 100))]
    pub passing_score: i32,
}

impl QuizBody {
    pub fn into_create(self, lesson_id: Uuid) -> QuizCreate {
        QuizCreate {
            lesson_id,
            title: self.title,
            passing_score: self.passing_score,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct QuestionBody {
    #[validate(length(min = 1))]
    pub prompt: String,
    #[validate(custom(function = "validate_options"))]
    pub options: Vec<String>,
    #[validate(range(min = 0))]
    pub correct_index: i32,
    pub order_index: Option<i32>,
}

impl QuestionBody {
    pub fn into_create(self, quiz_id: Uuid) -> QuestionCreate {
        QuestionCreate {
            quiz_id,
            prompt: self.prompt,
            options: self.options,
            correct_index: self.correct_index,
            order_index: self.order_index,
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Validate, utoipa::ToSchema)]
pub struct AttachmentBody {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1))]
    pub url: String,
}

impl AttachmentBody {
    pub fn into_create(self, lesson_id: Uuid) -> AttachmentCreate {
        AttachmentCreate {
            lesson_id,
            name: self.name,
            url: self.url,
        }
    }
}
