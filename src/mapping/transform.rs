//! User-supplied numeric transforms
//!
//! Mappings can carry a small expression that reshapes the normalized value
//! on its way to the target (control) or back to the source (feedback).
//! The expression language isn't part of this crate: a [`TransformCompiler`]
//! turns the stored text into a [`Transform`].

use std::sync::Arc;

use crate::error::{CtlmapError, Result};

/// A compiled transform, `x` in, `y` out
pub type Transform = Arc<dyn Fn(f64) -> f64 + Send + Sync>;

/// Turns transform source text into a callable
pub trait TransformCompiler {
    fn compile(&self, text: &str) -> Result<Transform>;
}

impl<F> TransformCompiler for F
where
    F: Fn(&str) -> Result<Transform>,
{
    fn compile(&self, text: &str) -> Result<Transform> {
        self(text)
    }
}

/// Compiler that accepts only the empty text
///
/// Used when no expression evaluator is available. Any stored transform
/// fails to compile and so falls back to identity.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoTransforms;

impl TransformCompiler for NoTransforms {
    fn compile(&self, text: &str) -> Result<Transform> {
        Err(CtlmapError::Transform(format!(
            "no transform compiler available for `{}`",
            text
        )))
    }
}

/// Compiler for a handful of fixed expressions
///
/// Understands `y = x` and `y = 1 - x` (whitespace ignored, optional
/// trailing `;`). Enough for reversing feedback without an embedded
/// language.
#[derive(Debug, Default, Clone, Copy)]
pub struct BuiltinTransforms;

impl TransformCompiler for BuiltinTransforms {
    fn compile(&self, text: &str) -> Result<Transform> {
        let compact: String = text
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        match compact.trim_end_matches(';') {
            "y=x" => Ok(Arc::new(|x: f64| x)),
            "y=1-x" => Ok(Arc::new(|x: f64| 1.0 - x)),
            other => Err(CtlmapError::Transform(format!(
                "unsupported expression `{}`",
                other
            ))),
        }
    }
}

/// Compile `text` or disable the hook.
///
/// Blank text means no hook. A compile failure is logged and also yields no
/// hook, so the mapping degrades to identity instead of failing.
pub fn compile_or_disable(compiler: &dyn TransformCompiler, text: &str) -> Option<Transform> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }
    match compiler.compile(text) {
        Ok(transform) => Some(transform),
        Err(e) => {
            tracing::warn!(expression = text, error = %e, "transform disabled");
            None
        }
    }
}

/// Apply an optional hook, identity if absent
pub fn apply(transform: Option<&Transform>, value: f64) -> f64 {
    match transform {
        Some(f) => f(value),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_text_is_no_hook() {
        assert!(compile_or_disable(&BuiltinTransforms, "  ").is_none());
    }

    #[test]
    fn test_builtin_expressions() {
        let reverse = compile_or_disable(&BuiltinTransforms, " y = 1 - x; ").unwrap();
        assert_eq!(reverse(0.25), 0.75);
        let identity = compile_or_disable(&BuiltinTransforms, "y=x").unwrap();
        assert_eq!(identity(0.25), 0.25);
    }

    #[test]
    fn test_compile_failure_disables_hook() {
        assert!(compile_or_disable(&BuiltinTransforms, "y = sin(x)").is_none());
        assert!(compile_or_disable(&NoTransforms, "y = x").is_none());
        assert_eq!(apply(None, 0.3), 0.3);
    }

    #[test]
    fn test_closure_compiler() {
        let compiler = |text: &str| -> Result<Transform> {
            let factor: f64 = text
                .parse()
                .map_err(|_| CtlmapError::Transform(text.to_string()))?;
            Ok(Arc::new(move |x: f64| x * factor))
        };
        let hook = compile_or_disable(&compiler, "2").unwrap();
        assert_eq!(apply(Some(&hook), 0.25), 0.5);
    }
}
