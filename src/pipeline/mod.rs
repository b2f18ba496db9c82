pub mod extraction;
pub mod generator;
pub mod appeal;
pub mod processor; // Extract → match → generate driver
