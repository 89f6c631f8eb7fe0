//! Capability-sandboxed execution of render scripts
//!
//! Synthesized renderer source is parsed, statically checked against a fixed
//! capability allowlist, and only then interpreted on a worker thread under a
//! wall-clock budget. The only reachable names are the injected `data` object
//! and the `plot` backend handle; everything else fails before execution.

use std::sync::mpsc;
use std::thread;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::backend::{ArtifactBuilder, Mark};
use crate::script::{self, Arg, Call, Script, ScriptExpr};
use crate::VizData;

/// Plot methods the script language may call
const PLOT_METHODS: &[&str] = &[
    "pie", "bar", "hist", "line", "title", "xlabel", "ylabel", "show",
];

/// Fields reachable on the injected data object
const DATA_FIELDS: &[&str] = &["categories", "values"];

#[derive(Debug, Error)]
pub enum RenderError {
    #[error("Render script parse error: {0}")]
    Parse(#[from] script::ParseError),

    #[error("Sandbox violation: '{name}' is outside the capability allowlist")]
    SandboxViolation { name: String },

    #[error("Render exceeded the {budget_ms}ms wall-clock budget")]
    Timeout { budget_ms: u64 },

    #[error("Render script completed without producing an artifact")]
    NoArtifact,

    #[error("Render script error: {0}")]
    Script(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactFormat {
    VegaLiteJson,
}

/// Output artifact of a successful render
#[derive(Debug, Clone)]
pub struct RenderResult {
    pub artifact: Vec<u8>,
    pub format: ArtifactFormat,
}

/// One-shot execution context for renderer source. State never outlives a
/// single [`Sandbox::render`] call.
#[derive(Debug, Clone, Copy)]
pub struct Sandbox {
    budget: Duration,
}

impl Sandbox {
    pub fn new(budget: Duration) -> Self {
        Self { budget }
    }

    /// Parse, statically check, and execute renderer source over chart data
    pub fn render(&self, source: &str, data: &VizData) -> Result<RenderResult, RenderError> {
        let script = script::parse(source)?;
        check_capabilities(&script)?;

        let budget_ms = self.budget.as_millis() as u64;
        let deadline = Instant::now() + self.budget;
        let data = data.clone();

        // The interpreter checks the deadline between statements; the channel
        // wait bounds the host side even if the worker stalls.
        let (tx, rx) = mpsc::channel();
        let worker = thread::spawn(move || {
            let outcome = interpret(&script, &data, deadline, budget_ms);
            let _ = tx.send(outcome);
        });

        match rx.recv_timeout(self.budget) {
            Ok(outcome) => {
                let _ = worker.join();
                outcome
            }
            Err(_) => {
                // Worker is left to observe its own deadline and exit; the
                // channel is already closed so its result is discarded.
                tracing::warn!(budget_ms, "render worker exceeded budget");
                Err(RenderError::Timeout { budget_ms })
            }
        }
    }
}

/// Static pre-check: every referenced name must be on the allowlist.
/// Runs before any statement executes, so a violating script has no effects.
fn check_capabilities(script: &Script) -> Result<(), RenderError> {
    for call in &script.calls {
        if call.target != "plot" {
            return Err(RenderError::SandboxViolation {
                name: call.target.clone(),
            });
        }
        if !PLOT_METHODS.contains(&call.method.as_str()) {
            return Err(RenderError::SandboxViolation {
                name: format!("plot.{}", call.method),
            });
        }
        for arg in &call.args {
            check_expr(arg.expr())?;
        }
    }
    Ok(())
}

fn check_expr(expr: &ScriptExpr) -> Result<(), RenderError> {
    match expr {
        ScriptExpr::FieldAccess { target, field } => {
            if target != "data" {
                return Err(RenderError::SandboxViolation {
                    name: target.clone(),
                });
            }
            if !DATA_FIELDS.contains(&field.as_str()) {
                return Err(RenderError::SandboxViolation {
                    name: format!("data.{}", field),
                });
            }
            Ok(())
        }
        // Bare identifiers are unbound names; nothing outside `plot`/`data`
        // exists in the sandbox.
        ScriptExpr::Ident(name) => Err(RenderError::SandboxViolation {
            name: name.clone(),
        }),
        ScriptExpr::Str(_) | ScriptExpr::Number(_) => Ok(()),
    }
}

/// Walk the checked AST against the injected data and backend handle
fn interpret(
    script: &Script,
    data: &VizData,
    deadline: Instant,
    budget_ms: u64,
) -> Result<RenderResult, RenderError> {
    let mut builder = ArtifactBuilder::new();
    let mut mark: Option<Mark> = None;
    let mut artifact: Option<Vec<u8>> = None;

    for call in &script.calls {
        if Instant::now() >= deadline {
            return Err(RenderError::Timeout { budget_ms });
        }

        match call.method.as_str() {
            "pie" => set_mark(&mut mark, Mark::Pie)?,
            "bar" => set_mark(&mut mark, Mark::Bar)?,
            "hist" => set_mark(&mut mark, Mark::Hist)?,
            "line" => set_mark(&mut mark, Mark::Line)?,
            "title" => builder.title = Some(text_arg(call)?),
            "xlabel" => builder.xlabel = Some(text_arg(call)?),
            "ylabel" => builder.ylabel = Some(text_arg(call)?),
            "show" => {
                let mark = mark.ok_or(RenderError::NoArtifact)?;
                artifact = Some(builder.emit(mark, data));
            }
            // Unreachable past check_capabilities; kept total for safety.
            other => {
                return Err(RenderError::Script(format!("unknown call: {}", other)));
            }
        }
    }

    match artifact {
        Some(artifact) => Ok(RenderResult {
            artifact,
            format: ArtifactFormat::VegaLiteJson,
        }),
        None => Err(RenderError::NoArtifact),
    }
}

fn set_mark(slot: &mut Option<Mark>, mark: Mark) -> Result<(), RenderError> {
    if slot.is_some() {
        return Err(RenderError::Script(
            "render script may issue only one mark call".to_string(),
        ));
    }
    *slot = Some(mark);
    Ok(())
}

fn text_arg(call: &Call) -> Result<String, RenderError> {
    match call.args.first().map(Arg::expr) {
        Some(ScriptExpr::Str(s)) => Ok(s.clone()),
        _ => Err(RenderError::Script(format!(
            "plot.{} expects a string argument",
            call.method
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_data() -> VizData {
        VizData {
            categories: vec!["Male".to_string(), "Female".to_string()],
            values: vec![2.0, 1.0],
        }
    }

    fn sandbox() -> Sandbox {
        Sandbox::new(Duration::from_secs(2))
    }

    #[test]
    fn test_render_pie_artifact() {
        let source = r#"
            plot.pie(data.values, labels = data.categories)
            plot.title("Sex Distribution")
            plot.show()
        "#;

        let result = sandbox().render(source, &sample_data()).unwrap();
        assert_eq!(result.format, ArtifactFormat::VegaLiteJson);

        let doc: serde_json::Value = serde_json::from_slice(&result.artifact).unwrap();
        assert_eq!(doc["mark"]["type"], "arc");
        assert_eq!(doc["title"], "Sex Distribution");
        assert_eq!(doc["data"]["values"][1]["category"], "Female");
    }

    #[test]
    fn test_unknown_root_is_violation() {
        let source = r#"
            fs.read("/etc/passwd")
            plot.show()
        "#;

        let err = sandbox().render(source, &sample_data()).unwrap_err();
        assert!(matches!(err, RenderError::SandboxViolation { name } if name == "fs"));
    }

    #[test]
    fn test_unknown_plot_method_is_violation() {
        let source = r#"
            plot.pie(data.values)
            plot.savefig("out.png")
            plot.show()
        "#;

        let err = sandbox().render(source, &sample_data()).unwrap_err();
        assert!(
            matches!(err, RenderError::SandboxViolation { name } if name == "plot.savefig")
        );
    }

    #[test]
    fn test_unknown_data_field_is_violation() {
        let source = r#"
            plot.bar(data.rows)
            plot.show()
        "#;

        let err = sandbox().render(source, &sample_data()).unwrap_err();
        assert!(matches!(err, RenderError::SandboxViolation { name } if name == "data.rows"));
    }

    #[test]
    fn test_bare_identifier_is_violation() {
        let source = r#"
            plot.bar(rows)
            plot.show()
        "#;

        let err = sandbox().render(source, &sample_data()).unwrap_err();
        assert!(matches!(err, RenderError::SandboxViolation { name } if name == "rows"));
    }

    #[test]
    fn test_timeout_leaves_no_artifact() {
        let source = r#"
            plot.bar(data.categories, data.values)
            plot.show()
        "#;

        let err = Sandbox::new(Duration::ZERO)
            .render(source, &sample_data())
            .unwrap_err();
        assert!(matches!(err, RenderError::Timeout { .. }));
    }

    #[test]
    fn test_missing_show_yields_no_artifact() {
        let source = "plot.bar(data.categories, data.values)";

        let err = sandbox().render(source, &sample_data()).unwrap_err();
        assert!(matches!(err, RenderError::NoArtifact));
    }

    #[test]
    fn test_second_mark_call_rejected() {
        let source = r#"
            plot.bar(data.categories, data.values)
            plot.line(data.categories, data.values)
            plot.show()
        "#;

        let err = sandbox().render(source, &sample_data()).unwrap_err();
        assert!(matches!(err, RenderError::Script(_)));
    }

    #[test]
    fn test_line_render() {
        let source = r#"
            plot.line(data.categories, data.values)
            plot.xlabel("Month")
            plot.ylabel("Total")
            plot.show()
        "#;

        let result = sandbox().render(source, &sample_data()).unwrap();
        let doc: serde_json::Value = serde_json::from_slice(&result.artifact).unwrap();
        assert_eq!(doc["mark"], "line");
        assert_eq!(doc["encoding"]["x"]["title"], "Month");
    }
}
