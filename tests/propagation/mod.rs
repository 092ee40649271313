//! Integration tests for the propagation engine

// Engine behaviour on full, partial and empty bindings
mod propagation_tests;

// Bindings construction and parameter files
mod bindings_tests;
