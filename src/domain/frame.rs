// Stack frame records and snapshot filtering.

/// One activation in a captured call chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub function: String, // fully-qualified function path, hash stripped
    pub file: Option<String>,
    pub line: Option<u32>,
}

impl Frame {
    pub fn new(function: impl Into<String>) -> Self {
        Self {
            function: function.into(),
            file: None,
            line: None,
        }
    }

    pub fn at(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

/// Decides which frames of a raw snapshot are worth recording.
#[derive(Debug, Clone)]
pub struct FrameFilter {
    pub ignored_prefixes: Vec<String>,
    pub ignored_names: Vec<String>,
}

const IGNORED_PREFIXES: &[&str] = &[
    "std::",
    "core::",
    "alloc::",
    "backtrace::",
    "test::",
    "callflow::application::",
    "callflow::infrastructure::",
    "__rust",
    "rust_begin_unwind",
    "rust_panic",
    "_Unwind_",
    "__GI_",
    "__clone",
];

const IGNORED_NAMES: &[&str] = &[
    "main",
    "_start",
    "__libc_start_main",
    "__libc_start_call_main",
    "start_thread",
    "clone",
    "clone3",
    "BaseThreadInitThunk",
    "RtlUserThreadStart",
];

impl Default for FrameFilter {
    fn default() -> Self {
        Self {
            ignored_prefixes: IGNORED_PREFIXES.iter().map(|s| s.to_string()).collect(),
            ignored_names: IGNORED_NAMES.iter().map(|s| s.to_string()).collect(),
        }
    }
}

impl FrameFilter {
    /// A filter that keeps every frame.
    pub fn none() -> Self {
        Self {
            ignored_prefixes: vec![],
            ignored_names: vec![],
        }
    }

    pub fn keeps(&self, function: &str) -> bool {
        if function.is_empty() || self.ignored_names.iter().any(|n| n == function) {
            return false;
        }
        // `<T as Trait>::method` belongs to whoever owns `T` or `Trait`.
        if let Some((self_ty, trait_path)) = split_qualified(function) {
            return !(self.is_ignored_path(self_ty) || is_call_shim(self_ty))
                || !self.is_ignored_path(trait_path);
        }
        !self.is_ignored_path(function.trim_start_matches('<'))
    }

    fn is_ignored_path(&self, path: &str) -> bool {
        self.ignored_prefixes
            .iter()
            .any(|p| path.starts_with(p.as_str()))
    }

    /// Drop ignored frames, then cut everything outward of `root`.
    ///
    /// Frames are innermost first. Returns `None` when `root` is given but
    /// absent from the snapshot: such a chain never passed through the
    /// session root and has nothing to contribute.
    pub fn apply(&self, frames: Vec<Frame>, root: Option<&str>) -> Option<Vec<Frame>> {
        let mut kept: Vec<Frame> = frames
            .into_iter()
            .filter(|f| self.keeps(&f.function))
            .collect();
        if let Some(root) = root {
            let pos = kept.iter().rposition(|f| f.function == root)?;
            kept.truncate(pos + 1);
        }
        Some(kept)
    }
}

/// Split `<Self as Trait>::method` into `(Self, Trait)`.
fn split_qualified(function: &str) -> Option<(&str, &str)> {
    let inner = function.strip_prefix('<')?;
    let mut depth = 0usize;
    let mut self_end = None;
    for (i, c) in inner.char_indices() {
        match c {
            '<' => depth += 1,
            '>' if depth == 0 => {
                let start = self_end?;
                return Some((&inner[..start], &inner[start + " as ".len()..i]));
            }
            '>' => depth -= 1,
            ' ' if depth == 0 && self_end.is_none() && inner[i..].starts_with(" as ") => {
                self_end = Some(i);
            }
            _ => {}
        }
    }
    None
}

/// Closure, fn-pointer, reference and trait-object call shims, and bare
/// generic parameters such as `F` in `<F as FnOnce>::call_once`.
fn is_call_shim(self_ty: &str) -> bool {
    self_ty.starts_with('&')
        || self_ty.starts_with("dyn ")
        || self_ty.starts_with("fn(")
        || self_ty.starts_with("unsafe fn(")
        || self_ty.contains("{{closure}}")
        || !self_ty.contains("::")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(frames: &[Frame]) -> Vec<&str> {
        frames.iter().map(|f| f.function.as_str()).collect()
    }

    #[test]
    fn test_runtime_frames_are_dropped() {
        let filter = FrameFilter::default();
        assert!(!filter.keeps("std::rt::lang_start"));
        assert!(!filter.keeps("<alloc::boxed::Box<F,A> as core::ops::function::FnOnce<Args>>::call_once"));
        assert!(!filter.keeps("<F as core::ops::function::FnOnce<()>>::call_once"));
        assert!(!filter.keeps("callflow::application::recorder::Recorder::run_traced"));
        assert!(!filter.keeps("main"));
        assert!(filter.keeps("app::main"));
        assert!(filter.keeps("app::worker::{{closure}}"));
    }

    #[test]
    fn test_apply_trims_outside_root() {
        let frames = vec![
            Frame::new("app::leaf"),
            Frame::new("core::ops::function::FnOnce::call_once"),
            Frame::new("app::handler"),
            Frame::new("app::run"),
            Frame::new("app::main"),
            Frame::new("std::rt::lang_start"),
        ];
        let kept = FrameFilter::default().apply(frames, Some("app::run")).unwrap();
        assert_eq!(names(&kept), vec!["app::leaf", "app::handler", "app::run"]);
    }

    #[test]
    fn test_std_trait_impls_on_user_types_are_kept() {
        let filter = FrameFilter::default();
        assert!(filter.keeps("<app::Report as core::fmt::Display>::fmt"));
        assert!(filter.keeps("<app::Lines as core::iter::traits::iterator::Iterator>::next"));
        assert!(filter.keeps("<app::Guard as core::ops::drop::Drop>::drop"));
        assert!(filter.keeps("<alloc::vec::Vec<T> as app::Ext>::ext"));
        assert!(filter.keeps("<app::Wrapper<core::option::Option<u8>> as core::str::traits::FromStr>::from_str"));
    }

    #[test]
    fn test_call_shims_are_dropped() {
        let filter = FrameFilter::default();
        assert!(!filter.keeps("<app::main::{{closure}} as core::ops::function::FnOnce<()>>::call_once"));
        assert!(!filter.keeps("<fn() as core::ops::function::FnOnce<()>>::call_once"));
        assert!(!filter.keeps("<&T as core::fmt::Display>::fmt"));
        assert!(!filter.keeps("<u8 as core::fmt::Display>::fmt"));
        assert!(!filter.keeps("<callflow::application::tracer::FlowGuard as core::ops::drop::Drop>::drop"));
    }

    #[test]
    fn test_split_qualified_handles_generics() {
        assert_eq!(
            split_qualified("<a::B<C, D> as e::F<G>>::h"),
            Some(("a::B<C, D>", "e::F<G>"))
        );
        assert_eq!(split_qualified("<[T]>::sort"), None);
        assert_eq!(split_qualified("app::run"), None);
    }

    #[test]
    fn test_apply_rejects_snapshot_without_root() {
        let frames = vec![Frame::new("a::b"), Frame::new("a::c")];
        assert_eq!(FrameFilter::default().apply(frames.clone(), Some("x::y")), None);
        let kept = FrameFilter::default().apply(frames, None).unwrap_or_default();
        assert_eq!(names(&kept), vec!["a::b", "a::c"]);
    }

    #[test]
    fn test_recursive_root_trims_at_outermost_activation() {
        let frames = vec![
            Frame::new("app::fib"),
            Frame::new("app::fib"),
            Frame::new("app::main"),
        ];
        let kept = FrameFilter::default().apply(frames, Some("app::fib")).unwrap();
        assert_eq!(names(&kept), vec!["app::fib", "app::fib"]);
    }
}
