pub mod cells;
pub mod cube;
pub mod energy;
pub mod monitor;
pub mod ordering;
pub mod panel;
pub mod part;
pub mod trooper;
