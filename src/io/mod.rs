//! External I/O shells around the core solver: the VRPLIB instance reader
//! and the plain-text solution writer/reader. Per spec.md §1 these are
//! "external collaborators", kept deliberately thin -- the core only ever
//! talks to `ProblemData` and `Solution`.

pub mod solution;
pub mod vrplib;
