//! Integration tests for error types

#[cfg(test)]
mod tests {
    use banker_errors::*;

    #[test]
    fn test_error_conversion() {
        let alloc_err = AllocationError::UnknownConsumer {
            consumer: 7,
            consumers: 5,
        };
        let err: Error = alloc_err.into();
        assert!(matches!(err, Error::Allocation(_)));

        let config_err = ConfigError::UnsafeInitialState;
        let err: Error = config_err.into();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn test_error_display() {
        let err = AllocationError::ExceedsAllocation {
            consumer: 2,
            resource: 0,
            released: 4,
            held: 3,
        };
        assert_eq!(
            err.to_string(),
            "consumer 2 released 4 units of resource 0 but holds 3"
        );

        let err = ConfigError::MaximumExceedsCapacity {
            consumer: 1,
            resource: 2,
            maximum: 9,
            capacity: 7,
        };
        assert_eq!(
            err.to_string(),
            "maximum demand of consumer 1 for resource 2 is 9, above capacity 7"
        );
    }

    #[test]
    fn test_user_facing_codes() {
        let err: Error = ConfigError::DimensionMismatch {
            what: "maximum row 0".into(),
            expected: 3,
            actual: 2,
        }
        .into();
        assert_eq!(err.user_code(), Some("config.dimension_mismatch"));
        assert!(err.user_hint().is_some());
        assert!(!err.is_retryable());

        let err: Error = AllocationError::LockPoisoned.into();
        assert_eq!(err.user_code(), Some("allocation.lock_poisoned"));
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "test");
        let err: Error = io_err.into();
        assert!(matches!(
            err,
            Error::Io {
                kind: std::io::ErrorKind::PermissionDenied,
                ..
            }
        ));
        assert!(err.is_retryable());
    }

    #[test]
    fn test_internal_error_is_the_only_catch_all() {
        let err = Error::internal("ledger lost a unit");
        assert_eq!(err.to_string(), "internal error: ledger lost a unit");
        assert_eq!(err.user_code(), Some("error.internal"));
        assert!(!err.is_retryable());
        assert!(err.user_hint().is_none());
    }
}
