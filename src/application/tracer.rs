// Function entry/exit flow logging as a scoped guard.

use crate::application::emitter::{Emitter, SourceSite};
use crate::domain::level::LogCategory;
use std::fmt;

/// Logs "exited" for its function when dropped.
///
/// Obtained from [`crate::Diagnostics::trace`]. The exit line is written on
/// every way out of the scope: normal return, `?`, or a panic unwinding
/// through it. When FLOW_CHECKER was disabled at entry the guard is inert.
#[must_use = "the exit line is written as soon as the guard is dropped"]
pub struct FlowGuard<'a> {
    active: Option<ActiveFlow<'a>>,
}

struct ActiveFlow<'a> {
    emitter: &'a Emitter,
    function: String,
    site: SourceSite,
}

impl<'a> FlowGuard<'a> {
    pub(crate) fn enter(
        emitter: &'a Emitter,
        function: &str,
        site: SourceSite,
        params: &[&dyn fmt::Debug],
    ) -> Self {
        emitter.emit(
            LogCategory::FlowChecker,
            &site,
            format_args!(
                "Function {} entered with parameters: {}",
                function,
                render_params(params)
            ),
        );
        Self {
            active: Some(ActiveFlow {
                emitter,
                function: function.to_string(),
                site,
            }),
        }
    }

    pub fn inert() -> Self {
        Self { active: None }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    /// End the scope here, reporting this call's line as the exit site.
    #[track_caller]
    pub fn exit(mut self) {
        if let Some(flow) = self.active.take() {
            flow.finish(&SourceSite::caller());
        }
    }
}

impl ActiveFlow<'_> {
    fn finish(&self, site: &SourceSite) {
        self.emitter.emit(
            LogCategory::FlowChecker,
            site,
            format_args!("Function {} exited", self.function),
        );
    }
}

impl Drop for FlowGuard<'_> {
    fn drop(&mut self) {
        if let Some(flow) = self.active.take() {
            flow.finish(&flow.site);
        }
    }
}

impl fmt::Debug for FlowGuard<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.active {
            Some(flow) => f
                .debug_struct("FlowGuard")
                .field("function", &flow.function)
                .field("site", &flow.site)
                .finish(),
            None => f.write_str("FlowGuard(inert)"),
        }
    }
}

/// `[a, b, c]` using each value's `Debug` form.
pub fn render_params(params: &[&dyn fmt::Debug]) -> String {
    let inner: Vec<String> = params.iter().map(|p| format!("{p:?}")).collect();
    format!("[{}]", inner.join(", "))
}
