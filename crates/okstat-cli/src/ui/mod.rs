pub mod print;
pub mod widgets;
