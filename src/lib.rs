//! vidflow workspace root.
//!
//! Cross-service pipeline tests live under `tests/`; the services and shared
//! libraries are under `backend/`.
