/// An error from indexing into a vector.
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    #[error("index {index} must be within [0, {len})")]
    OutOfRange { index: usize, len: usize },
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn out_of_range_message() {
        let err = Error::OutOfRange { index: 3, len: 3 };
        assert_eq!(err.to_string(), "index 3 must be within [0, 3)");
    }
}
