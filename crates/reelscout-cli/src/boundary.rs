//! Rendering error boundary.
//!
//! A panic while drawing a view is caught here and replaced with a static
//! fallback message, so a bad record cannot take down an interactive
//! session. Fetch failures never reach this path; they arrive as
//! `CatalogError` values in the view.

use crate::output::Output;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};

const FALLBACK: &str = "Something went wrong while rendering this view.";

/// Run `render`, showing the fallback if it panics. Returns whether it
/// rendered cleanly.
pub fn guarded<F>(what: &str, output: &Output, render: F) -> bool
where
    F: FnOnce(),
{
    match panic::catch_unwind(AssertUnwindSafe(render)) {
        Ok(()) => true,
        Err(payload) => {
            let detail = panic_message(payload.as_ref());
            tracing::error!(view = what, detail = %detail, "Render failed");
            output.error(format!("{} ({}: {})", FALLBACK, what, detail));
            false
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::output::OutputFormat;

    #[test]
    fn test_clean_render_passes_through() {
        let output = Output::new(OutputFormat::Human, true);
        let mut rendered = false;
        assert!(guarded("feed", &output, || rendered = true));
        assert!(rendered);
    }

    #[test]
    fn test_panic_is_contained() {
        let output = Output::new(OutputFormat::Json, true);
        assert!(!guarded("details", &output, || panic!("bad poster path")));
    }

    #[test]
    fn test_panic_message() {
        let payload: Box<dyn Any + Send> = Box::new("static");
        assert_eq!(panic_message(payload.as_ref()), "static");
        let payload: Box<dyn Any + Send> = Box::new(String::from("owned"));
        assert_eq!(panic_message(payload.as_ref()), "owned");
        let payload: Box<dyn Any + Send> = Box::new(7u8);
        assert_eq!(panic_message(payload.as_ref()), "unknown panic");
    }
}
