//! Guarded invocation of user-supplied invokers.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::error::{BoxError, DiError, DiResult, InvokerPanic};

/// Calls an invoker on behalf of `type_name`, mapping its errors and panics
/// onto `DiError`.
pub(crate) fn invoke_guarded<R, F>(type_name: &'static str, f: F) -> DiResult<R>
where
    F: FnOnce() -> Result<R, BoxError>,
{
    match panic::catch_unwind(AssertUnwindSafe(f)) {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(DiError::from_invoker(type_name, err)),
        Err(payload) => {
            tracing::debug!(type_name, "invoker panicked");
            Err(DiError::ConstructionFailure {
                type_name,
                source: Arc::new(InvokerPanic {
                    message: panic_message(payload.as_ref()),
                }),
            })
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&'static str>() {
        (*msg).to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn passes_through_di_errors() {
        let result: DiResult<()> =
            invoke_guarded("Owner", || Err(DiError::TypeMismatch("Dep").into()));
        assert!(matches!(result, Err(DiError::TypeMismatch("Dep"))));
    }

    #[test]
    fn wraps_foreign_errors() {
        let result: DiResult<()> = invoke_guarded("Owner", || Err("disk full".into()));
        match result {
            Err(DiError::ConstructionFailure { type_name, source }) => {
                assert_eq!(type_name, "Owner");
                assert_eq!(source.to_string(), "disk full");
            }
            other => panic!("expected ConstructionFailure, got {:?}", other),
        }
    }

    #[test]
    fn converts_panics() {
        let result: DiResult<u8> = invoke_guarded("Owner", || panic!("boom"));
        match result {
            Err(DiError::ConstructionFailure { source, .. }) => {
                assert_eq!(source.to_string(), "invoker panicked: boom");
            }
            other => panic!("expected ConstructionFailure, got {:?}", other),
        }
    }
}
