//! Reference computations the graded programs are compared against.
//! Pure functions of their input; no I/O.

pub mod reverse;
pub mod wistar;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OracleError {
    #[error("Line {0} is not newline-terminated")]
    UnterminatedLine(usize),

    #[error("File name '{name}' is {len} bytes long (max {max})")]
    NameTooLong {
        name: String,
        len: usize,
        max: usize,
    },
}
