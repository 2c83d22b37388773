pub mod manager;
pub mod model;
pub mod options;
