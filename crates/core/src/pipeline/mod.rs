pub mod enroll_faces_use_case;
pub mod pipeline_logger;
pub mod recognize_faces_use_case;
pub mod training_pipeline;
