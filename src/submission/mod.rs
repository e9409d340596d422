pub mod answer;
pub mod payload;
