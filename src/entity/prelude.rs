//! 预导入模块，方便使用

pub use super::assignments::{
    ActiveModel as AssignmentActiveModel, Entity as Assignments, Model as AssignmentModel,
};
pub use super::course_instructors::Entity as CourseInstructors;
pub use super::course_students::Entity as CourseStudents;
pub use super::courses::{ActiveModel as CourseActiveModel, Entity as Courses, Model as CourseModel};
pub use super::instructors::{
    ActiveModel as InstructorActiveModel, Entity as Instructors, Model as InstructorModel,
};
pub use super::students::{
    ActiveModel as StudentActiveModel, Entity as Students, Model as StudentModel,
};
pub use super::submission_record_students::Entity as SubmissionRecordStudents;
pub use super::submission_records::{
    ActiveModel as SubmissionRecordActiveModel, Entity as SubmissionRecords,
    Model as SubmissionRecordModel,
};
pub use super::users::{ActiveModel as UserActiveModel, Entity as Users, Model as UserModel};
