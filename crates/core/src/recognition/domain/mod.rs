pub mod face_recognizer;
