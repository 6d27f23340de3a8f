pub mod demographics;
pub mod diagnosis;
pub mod features;
pub mod request;
pub mod symptom;
