use clap::{Parser, Subcommand};
use coursehub::model::entity::{
    Course, CourseCreate, DigitalProduct, DigitalProductCreate, Lesson, LessonCreate, Question,
    QuestionCreate, Quiz, QuizCreate, Section, SectionCreate, UserEntity, UserEntityCreateUpdate,
    normalize_email,
};
use coursehub::model::{CrudRepository, DatabaseError, DbConnection, ModelManager};
use coursehub::web::{AuthenticatedUser, UserRole};
use uuid::Uuid;

#[derive(Parser, Debug)]
#[command(about = "CLI tool for filling the course catalog", long_about = None)]
pub struct Cli {
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage users
    User {
        #[command(subcommand)]
        action: UserCommands,
    },

    /// Manage courses
    Course {
        #[command(subcommand)]
        action: CourseCommands,
    },

    /// Manage course sections
    Section {
        #[command(subcommand)]
        action: SectionCommands,
    },

    /// Manage lessons
    Lesson {
        #[command(subcommand)]
        action: LessonCommands,
    },

    /// Manage quizzes and their questions
    Quiz {
        #[command(subcommand)]
        action: QuizCommands,
    },

    /// Manage digital products
    Product {
        #[command(subcommand)]
        action: ProductCommands,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserCommands {
    Add {
        #[arg(long)]
        email: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        password: String,
        #[arg(long, default_value = "user")]
        role: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum CourseCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price_cents: i64,
        #[arg(long, default_value_t = false)]
        published: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum SectionCommands {
    Add {
        /// Slug of the course to attach the section to
        #[arg(long)]
        course_slug: String,
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum LessonCommands {
    Add {
        #[arg(long)]
        course_slug: String,
        /// Section title within the course
        #[arg(long)]
        section_title: String,
        #[arg(long)]
        title: String,
        /// Path to a Markdown file with lesson content
        #[arg(long)]
        file: String,
        #[arg(long)]
        video_url: Option<String>,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
        #[arg(long, default_value_t = false)]
        free_preview: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum QuizCommands {
    Add {
        /// Lesson to attach the quiz to
        #[arg(long)]
        lesson_id: Uuid,
        #[arg(long)]
        title: String,
        #[arg(long, default_value_t = 70)]
        passing_score: i32,
    },
    AddQuestion {
        #[arg(long)]
        quiz_id: Uuid,
        #[arg(long)]
        prompt: String,
        /// Repeat for every option, in display order
        #[arg(long = "option", required = true)]
        options: Vec<String>,
        #[arg(long)]
        correct_index: i32,
        #[arg(long, default_value_t = 0)]
        order_index: i32,
    },
}

#[derive(Subcommand, Debug)]
pub enum ProductCommands {
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        slug: String,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        price_cents: i64,
        #[arg(long)]
        file_url: String,
        #[arg(long, default_value_t = false)]
        published: bool,
    },
}

async fn course_id_by_slug(mm: &ModelManager, slug: &str) -> Result<Uuid, DatabaseError> {
    let id = sqlx::query_scalar("SELECT id FROM courses WHERE slug = $1")
        .bind(slug)
        .fetch_one(mm.executor())
        .await?;
    Ok(id)
}

#[tokio::main]
async fn main() -> coursehub::error::AppResult<()> {
    let _ = dotenvy::dotenv();
    let args = Cli::parse();

    let db_con = DbConnection::connect(&args.database_url)?;
    let mm = ModelManager::new(db_con);
    let actor = AuthenticatedUser::admin();

    match args.command {
        Commands::User { action } => match action {
            UserCommands::Add { email, name, password, role } => {
                let user = UserEntity::create(
                    &mm,
                    &actor,
                    UserEntityCreateUpdate {
                        email: normalize_email(&email),
                        name,
                        password_hash: coursehub::auth::hash_password(&password)?,
                        role: Some(UserRole::from(role.as_str())),
                    },
                )
                .await?;
                println!("User created: {:?}", user);
            }
        },

        Commands::Course { action } => match action {
            CourseCommands::Add { title, slug, description, price_cents, published } => {
                let course = Course::create(
                    &mm,
                    &actor,
                    CourseCreate {
                        title,
                        slug,
                        description,
                        price_cents,
                        image_url: None,
                        published: Some(published),
                    },
                )
                .await?;
                println!("Course created: {:?}", course);
            }
        },

        Commands::Section { action } => match action {
            SectionCommands::Add { course_slug, title, order_index } => {
                let course_id = course_id_by_slug(&mm, &course_slug).await?;
                let section = Section::create(
                    &mm,
                    &actor,
                    SectionCreate {
                        course_id,
                        title,
                        order_index: Some(order_index),
                    },
                )
                .await?;
                println!("Section created: {:?}", section);
            }
        },

        Commands::Lesson { action } => match action {
            LessonCommands::Add {
                course_slug,
                section_title,
                title,
                file,
                video_url,
                order_index,
                free_preview,
            } => {
                let course_id = course_id_by_slug(&mm, &course_slug).await?;
                let section_id: Uuid = sqlx::query_scalar(
                    "SELECT id FROM sections WHERE course_id = $1 AND title = $2",
                )
                .bind(course_id)
                .bind(&section_title)
                .fetch_one(mm.executor())
                .await
                .map_err(DatabaseError::SqlxError)?;

                let content = std::fs::read_to_string(file)?;
                let lesson = Lesson::create(
                    &mm,
                    &actor,
                    LessonCreate {
                        section_id,
                        title,
                        content,
                        video_url,
                        order_index: Some(order_index),
                        is_free_preview: Some(free_preview),
                    },
                )
                .await?;
                println!("Lesson created: {:?}", lesson);
            }
        },

        Commands::Quiz { action } => match action {
            QuizCommands::Add { lesson_id, title, passing_score } => {
                let quiz = Quiz::create(
                    &mm,
                    &actor,
                    QuizCreate {
                        lesson_id,
                        title,
                        passing_score,
                    },
                )
                .await?;
                println!("Quiz created: {:?}", quiz);
            }

            QuizCommands::AddQuestion { quiz_id, prompt, options, correct_index, order_index } => {
                let data = QuestionCreate {
                    quiz_id,
                    prompt,
                    options,
                    correct_index,
                    order_index: Some(order_index),
                };
                if !data.is_consistent() {
                    eprintln!("correct index {} is out of the option range", data.correct_index);
                    std::process::exit(2);
                }

                let question = Question::create(&mm, &actor, data).await?;
                println!("Question created: {:?}", question);
            }
        },

        Commands::Product { action } => match action {
            ProductCommands::Add { title, slug, description, price_cents, file_url, published } => {
                let product = DigitalProduct::create(
                    &mm,
                    &actor,
                    DigitalProductCreate {
                        title,
                        slug,
                        description,
                        price_cents,
                        file_url,
                        image_url: None,
                        published: Some(published),
                    },
                )
                .await?;
                println!("Product created: {:?}", product);
            }
        },
    }

    Ok(())
}
