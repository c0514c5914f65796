//! Property-based tests for the loop-nest invariants.
