//! Error type for register-parameter validation.

use thiserror::Error;

/// A register parameter lies outside its documented hardware range.
///
/// Every setter validates before mutating, so a failed call leaves the
/// generator exactly as it was. Steady-state sample generation never fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("parameter {name} out of range: {value} (valid 0..={max})")]
pub struct InvalidParameter {
    /// Register field name as used by the hardware documentation.
    pub name: &'static str,
    /// The rejected value.
    pub value: u32,
    /// Largest accepted value.
    pub max: u32,
}

/// Range check shared by all setters.
pub(crate) fn check_range(name: &'static str, value: u32, max: u32) -> Result<(), InvalidParameter> {
    if value > max {
        Err(InvalidParameter { name, value, max })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_range_bounds() {
        assert!(check_range("block", 7, 7).is_ok());
        let err = check_range("block", 8, 7).unwrap_err();
        assert_eq!(err, InvalidParameter { name: "block", value: 8, max: 7 });
        assert_eq!(err.to_string(), "parameter block out of range: 8 (valid 0..=7)");
    }
}
