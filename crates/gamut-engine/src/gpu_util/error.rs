use crate::driver::{Driver, DriverError};

/// Drains the driver error queue.
///
/// Every pending error is logged under `label`; the first one is returned so
/// the queue is empty afterwards either way.
pub fn check_error<D: Driver>(driver: &mut D, label: &str) -> Result<(), DriverError> {
    let mut first = None;
    while let Some(err) = driver.take_error() {
        log::error!("{label}: {err}");
        first.get_or_insert(err);
    }
    first.map_or(Ok(()), Err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::driver::mock::MockDriver;
    use crate::driver::ErrorCode;

    #[test]
    fn empty_queue_is_ok() {
        let mut d = MockDriver::new();
        assert_eq!(check_error(&mut d, "idle"), Ok(()));
    }

    #[test]
    fn returns_first_and_drains_rest() {
        let mut d = MockDriver::new();
        d.errors.push_back(DriverError::new(ErrorCode::InvalidOperation, "a"));
        d.errors.push_back(DriverError::new(ErrorCode::OutOfMemory, "b"));

        let err = check_error(&mut d, "use_program").unwrap_err();
        assert_eq!(err.code, ErrorCode::InvalidOperation);
        assert!(d.errors.is_empty());
        assert_eq!(check_error(&mut d, "again"), Ok(()));
    }
}
