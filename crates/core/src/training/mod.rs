pub mod image_walker;
pub mod label_registry;
pub mod training_set;
