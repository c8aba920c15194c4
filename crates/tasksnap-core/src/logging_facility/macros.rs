//! Operation boundary macros
//!
//! Every operation logs one `start` event and exactly one of `end` or
//! `end_error`, all carrying `component`, `op` and `event`. Extra fields are
//! passed through to `tracing` unchanged, so `request_id = %id` and
//! `task_count = n` both work.

#[doc(hidden)]
#[macro_export]
macro_rules! __log_op_event {
    ($level:ident, $op:expr, $event:ident $(, $($field:tt)*)?) => {
        $crate::tracing::$level!(
            component = module_path!(),
            op = $op,
            event = $crate::core_types::schema::$event,
            $($($field)*)?
        )
    };
}

/// Log the start of an operation
///
/// ```
/// # use tasksnap_core::log_op_start;
/// log_op_start!("insert_revision");
/// log_op_start!("insert_revision", task_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(info, $op, EVENT_START $(, $($field)*)?)
    };
}

/// Log the successful end of an operation
///
/// ```
/// # use tasksnap_core::log_op_end;
/// log_op_end!("insert_revision", duration_ms = 42);
/// log_op_end!("insert_revision", duration_ms = 42, revision_id = 7);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        $crate::__log_op_event!(
            info,
            $op,
            EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        )
    };
}

/// Log the failed end of an operation
///
/// Anything convertible into `ExError` is accepted; the event records its
/// kind and stable code.
///
/// ```
/// # use tasksnap_core::{log_op_error, errors::SnapError};
/// log_op_error!("latest_revision", SnapError::EmptyStore, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = ::core::convert::Into::into($err);
        $crate::__log_op_event!(
            error,
            $op,
            EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            $($($field)*)?
        )
    }};
}
