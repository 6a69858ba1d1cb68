use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: i64,
    pub uid: String,
    pub code: String,
    pub name: String,
    pub year: i32,
    pub semester: String,
    pub homepage: Option<String>,
}

/// 调用者在课程中的身份
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourseRole {
    Student,
    Instructor,
}

/// 调用者与课程的关系，学生与教师身份可以同时存在
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CourseMembership {
    pub is_student: bool,
    pub is_instructor: bool,
}

impl CourseMembership {
    pub fn can_read(&self) -> bool {
        self.is_student || self.is_instructor
    }

    pub fn has_role(&self, role: CourseRole) -> bool {
        match role {
            CourseRole::Student => self.is_student,
            CourseRole::Instructor => self.is_instructor,
        }
    }
}
