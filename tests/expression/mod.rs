//! Integration tests for the expression system
//!
//! These tests exercise parsing, evaluation, display and differentiation
//! through the public API only.

// Parsing, evaluation and display
mod expression_tests;
