//! Course catalog service backed by a repository and the cache facade.

mod ports;
mod service;

#[cfg(test)]
mod tests;

pub use ports::CourseRepository;
pub use service::{COURSE_CACHE_PATTERNS, COURSE_LIST_CACHE_KEY, CourseService};
