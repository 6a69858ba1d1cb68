pub mod courses;

pub mod internal;

pub use courses::configure_course_routes;
pub use internal::configure_internal_routes;

#[cfg(test)]
pub(crate) mod test_support;
