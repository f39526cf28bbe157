pub mod board;
pub mod bomb;
pub mod cascade;
pub mod colors;
pub mod coords;
pub mod matching;
pub mod rotation;
pub mod scoring;
pub mod topology;
pub mod types;
