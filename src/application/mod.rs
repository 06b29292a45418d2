// Page-text parsing
pub mod extractor;

// Statistical feature derivation
pub mod features;

// Cycle orchestration
pub mod scheduler;

// Prediction sub-models and fusion
pub mod strategies;
