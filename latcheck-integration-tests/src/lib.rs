//! End-to-end tests for the LatCheck server and client live under `tests/`.
