pub mod classifier; // Model adapter: artifact load + label/probability queries
pub mod encoder; // Category encoder
pub mod features; // Feature vector builder, fixed model column order
pub mod processor; // Submission state machine: encode → predict → outcome
pub mod reference; // Comparison dataset aggregates
