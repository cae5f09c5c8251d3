pub mod attendance;
pub mod class_session;
pub mod enrollment;
pub mod registration;
pub mod statistics;
pub mod student;
pub mod training_class;
