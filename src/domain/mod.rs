pub mod ai;
pub mod board;
pub mod entity;
pub mod rules;
pub mod tile;
pub mod trajectory;
