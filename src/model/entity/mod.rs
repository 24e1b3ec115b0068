mod user;
pub use user::{UserEntity, UserEntityCreateUpdate, normalize_email};

mod course;
pub use course::{Course, CourseCreate};

mod section;
pub use section::{Section, SectionCreate};

mod lesson;
pub use lesson::{Lesson, LessonCreate, LessonOutlineRow};

mod attachment;
pub use attachment::{Attachment, AttachmentCreate};

mod quiz;
pub use quiz::{Quiz, QuizCreate};

mod question;
pub use question::{Question, QuestionCreate};

mod quiz_attempt;
pub use quiz_attempt::{QuizAttempt, QuizAttemptCreate};

mod lesson_progress;
pub use lesson_progress::LessonProgress;

mod digital_product;
pub use digital_product::{DigitalProduct, DigitalProductCreate};

mod purchase;
pub use purchase::{CoursePurchase, ProductPurchase, PurchaseCreate, claim_guest_purchases};

mod dashboard;
pub use dashboard::{OwnedCourseRow, OwnedProductRow};
