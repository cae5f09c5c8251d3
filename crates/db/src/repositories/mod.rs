//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async methods
//! that accept `&PgPool` as the first argument.

pub mod attendance_repo;
pub mod class_session_repo;
pub mod enrollment_repo;
pub mod registration_repo;
pub mod statistics_repo;
pub mod student_repo;
pub mod training_class_repo;

pub use attendance_repo::AttendanceRepo;
pub use class_session_repo::ClassSessionRepo;
pub use enrollment_repo::EnrollmentRepo;
pub use registration_repo::RegistrationRepo;
pub use statistics_repo::StatisticsRepo;
pub use student_repo::StudentRepo;
pub use training_class_repo::TrainingClassRepo;
