pub mod document;
pub mod element;
pub mod events;
pub mod selector;
