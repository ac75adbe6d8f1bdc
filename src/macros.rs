//! Logging and flow macros.
//!
//! Each macro takes an optional `diag =>` prefix naming the
//! [`Diagnostics`](crate::Diagnostics) to use; without it the process-wide
//! [`global`](crate::global) instance is used.

/// Path of the enclosing function, e.g. `app::net::connect`.
///
/// Inside a closure the path ends in `::{{closure}}`.
#[macro_export]
macro_rules! function_name {
    () => {{
        fn __callflow_marker() {}
        fn __callflow_type_name_of<T>(_: T) -> &'static str {
            ::std::any::type_name::<T>()
        }
        let name = __callflow_type_name_of(__callflow_marker);
        name.strip_suffix("::__callflow_marker").unwrap_or(name)
    }};
}

#[macro_export]
macro_rules! log_info {
    ($diag:expr => $($arg:tt)+) => {
        $diag.info(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().info(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_error {
    ($diag:expr => $($arg:tt)+) => {
        $diag.error(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().error(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_warn {
    ($diag:expr => $($arg:tt)+) => {
        $diag.warn(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().warn(::std::format_args!($($arg)+))
    };
}

#[macro_export]
macro_rules! log_res {
    ($diag:expr => $($arg:tt)+) => {
        $diag.res(::std::format_args!($($arg)+))
    };
    ($($arg:tt)+) => {
        $crate::global().res(::std::format_args!($($arg)+))
    };
}

/// Log entry into the enclosing function with the given parameters and
/// return a [`FlowGuard`](crate::FlowGuard) that logs the exit.
///
/// ```ignore
/// fn load(path: &str, retries: u32) {
///     let _flow = callflow::flow_check!(path, retries);
///     // ...
/// }
/// ```
#[macro_export]
macro_rules! flow_check {
    () => {
        $crate::global().trace($crate::function_name!(), &[])
    };
    ($diag:expr => $($param:expr),* $(,)?) => {
        $diag.trace(
            $crate::function_name!(),
            &[$(&$param as &dyn ::std::fmt::Debug),*],
        )
    };
    ($($param:expr),+ $(,)?) => {
        $crate::global().trace(
            $crate::function_name!(),
            &[$(&$param as &dyn ::std::fmt::Debug),+],
        )
    };
}

#[cfg(test)]
mod tests {
    use crate::infrastructure::{ColorMode, FixedClock, MemorySink};
    use crate::Diagnostics;
    use std::sync::Arc;

    fn diagnostics(sink: &Arc<MemorySink>) -> Diagnostics {
        Diagnostics::builder()
            .sink(sink.clone())
            .clock(Arc::new(FixedClock::new("08:00:00")))
            .color(ColorMode::Never)
            .build()
    }

    #[test]
    fn test_function_name() {
        assert_eq!(
            crate::function_name!(),
            "callflow::macros::tests::test_function_name"
        );
    }

    #[test]
    fn test_log_macros_target_given_diagnostics() {
        let sink = Arc::new(MemorySink::new());
        let diag = diagnostics(&sink);
        log_info!(diag => "loaded {} items", 3);
        log_error!(diag => "failed");
        log_warn!(&diag => "slow: {:.1}s", 2.5);
        log_res!(diag => "result={}", true);

        let lines = sink.lines();
        assert_eq!(lines.len(), 4);
        assert!(lines[0].ends_with("INFO: loaded 3 items"));
        assert!(lines[1].ends_with("ERROR: failed"));
        assert!(lines[2].ends_with("WARN: slow: 2.5s"));
        assert!(lines[3].ends_with("RES: result=true"));
        assert!(lines.iter().all(|l| l.contains("File: macros.rs")));
    }

    fn traced_step(diag: &Diagnostics, id: u32, name: &str) {
        let _flow = flow_check!(diag => id, name);
    }

    #[test]
    fn test_flow_check_names_enclosing_function() {
        let sink = Arc::new(MemorySink::new());
        let diag = diagnostics(&sink);
        traced_step(&diag, 7, "seven");
        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with(
            "FLOW_CHECKER: Function callflow::macros::tests::traced_step entered with parameters: [7, \"seven\"]"
        ));
        assert!(lines[1].ends_with("Function callflow::macros::tests::traced_step exited"));
    }
}
