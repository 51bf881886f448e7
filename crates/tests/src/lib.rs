pub mod fixtures;

#[cfg(test)]
mod role_tests;
#[cfg(test)]
mod task_tests;
#[cfg(test)]
mod gamification_tests;
