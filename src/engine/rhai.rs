//! Rhai-backed engine and persistent session.

use std::str::FromStr;
use std::sync::Arc;

use ::rhai::{Dynamic, Engine, EvalAltResult, Scope, AST};

use super::{EngineError, EvalError, InterruptHandle, ScriptEngine, Session};
use crate::config::Config;

/// Resource limits applied to the embedded engine. Zero disables a limit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineLimits {
    pub max_operations: u64,
    pub max_call_levels: usize,
    pub max_expr_depth: usize,
}

impl Default for EngineLimits {
    fn default() -> Self {
        Self {
            max_operations: 1_000_000_000,
            max_call_levels: 64,
            max_expr_depth: 64,
        }
    }
}

impl EngineLimits {
    pub fn from_config(cfg: &Config) -> Result<Self, EngineError> {
        Ok(Self {
            max_operations: setting(cfg, "MAX_OPERATIONS")?,
            max_call_levels: setting(cfg, "MAX_CALL_LEVELS")?,
            max_expr_depth: setting(cfg, "MAX_EXPR_DEPTH")?,
        })
    }
}

fn setting<T>(cfg: &Config, key: &str) -> Result<T, EngineError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    let value = cfg.get(key).ok_or_else(|| EngineError::InvalidSetting {
        key: key.to_string(),
        value: String::new(),
        reason: "missing".to_string(),
    })?;
    value.trim().parse::<T>().map_err(|e| EngineError::InvalidSetting {
        key: key.to_string(),
        value: value.clone(),
        reason: e.to_string(),
    })
}

pub struct RhaiEngine {
    engine: Arc<Engine>,
    interrupt: InterruptHandle,
}

impl RhaiEngine {
    pub fn new(limits: EngineLimits) -> Self {
        let interrupt = InterruptHandle::new();
        let mut engine = Engine::new();

        engine.set_max_operations(limits.max_operations);
        engine.set_max_call_levels(limits.max_call_levels);
        engine.set_max_expr_depths(limits.max_expr_depth, limits.max_expr_depth);

        // stdout belongs to the terminal UI
        engine.on_print(|msg| {
            tracing::info!(target: "script", "{}", msg);
        });
        engine.on_debug(|msg, source, pos| {
            tracing::debug!(target: "script", source = source.unwrap_or(""), %pos, "{}", msg);
        });

        let flag = interrupt.clone();
        engine.on_progress(move |_ops| {
            if flag.is_interrupted() {
                Some(Dynamic::UNIT)
            } else {
                None
            }
        });

        Self {
            engine: Arc::new(engine),
            interrupt,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self, EngineError> {
        Ok(Self::new(EngineLimits::from_config(cfg)?))
    }
}

impl Default for RhaiEngine {
    fn default() -> Self {
        Self::new(EngineLimits::default())
    }
}

impl ScriptEngine for RhaiEngine {
    type Session = RhaiSession;

    fn create_session(&self) -> Result<RhaiSession, EngineError> {
        Ok(RhaiSession {
            engine: Arc::clone(&self.engine),
            scope: Scope::new(),
            functions: AST::empty(),
            interrupt: self.interrupt.clone(),
        })
    }
}

/// Variables live in `scope`; script-defined functions are carried in `functions`.
pub struct RhaiSession {
    engine: Arc<Engine>,
    scope: Scope<'static>,
    functions: AST,
    interrupt: InterruptHandle,
}

impl RhaiSession {
    /// Number of variables currently bound in the session.
    pub fn variable_count(&self) -> usize {
        self.scope.len()
    }
}

impl Session for RhaiSession {
    type Value = Dynamic;

    fn evaluate(&mut self, code: &str) -> Result<Option<Dynamic>, EvalError> {
        let ast = self
            .engine
            .compile_with_scope(&self.scope, code)
            .map_err(|e| EvalError::Parse(e.to_string()))?;
        let combined = self.functions.merge(&ast);

        let value = self
            .engine
            .eval_ast_with_scope::<Dynamic>(&mut self.scope, &combined)
            .map_err(map_eval_error)?;

        self.functions = combined.clone_functions_only();
        Ok(if value.is_unit() { None } else { Some(value) })
    }

    fn interrupt_handle(&self) -> Option<InterruptHandle> {
        Some(self.interrupt.clone())
    }
}

fn map_eval_error(err: Box<EvalAltResult>) -> EvalError {
    match *err {
        EvalAltResult::ErrorTerminated(..) => EvalError::Interrupted,
        other => EvalError::Runtime(other.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> RhaiSession {
        RhaiEngine::default().create_session().unwrap()
    }

    fn eval(session: &mut RhaiSession, code: &str) -> Result<Option<String>, EvalError> {
        session.evaluate(code).map(|v| v.map(|v| v.to_string()))
    }

    #[test]
    fn arithmetic_returns_value() {
        let mut s = session();
        assert_eq!(eval(&mut s, "2+2").unwrap(), Some("4".to_string()));
    }

    #[test]
    fn statements_without_value_return_none() {
        let mut s = session();
        assert_eq!(eval(&mut s, "let x = 1;").unwrap(), None);
        assert_eq!(eval(&mut s, "print(\"hi\")").unwrap(), None);
    }

    #[test]
    fn variables_persist_across_evaluations() {
        let mut s = session();
        eval(&mut s, "let x = 40;").unwrap();
        assert_eq!(s.variable_count(), 1);
        assert_eq!(eval(&mut s, "x + 2").unwrap(), Some("42".to_string()));
    }

    #[test]
    fn functions_persist_across_evaluations() {
        let mut s = session();
        eval(&mut s, "fn double(n) { n * 2 }").unwrap();
        assert_eq!(eval(&mut s, "double(21)").unwrap(), Some("42".to_string()));
    }

    #[test]
    fn failed_evaluation_keeps_earlier_bindings() {
        let mut s = session();
        eval(&mut s, "let name = \"rhai\";").unwrap();
        assert!(eval(&mut s, "missing_fn()").is_err());
        assert_eq!(eval(&mut s, "name").unwrap(), Some("rhai".to_string()));
    }

    #[test]
    fn parse_errors_are_reported_as_syntax_errors() {
        let mut s = session();
        let err = eval(&mut s, "let = ;").unwrap_err();
        assert!(matches!(err, EvalError::Parse(_)), "{err:?}");
        assert!(err.to_string().starts_with("Syntax error:"));
    }

    #[test]
    fn runtime_errors_carry_engine_message() {
        let mut s = session();
        let err = eval(&mut s, "undefined_var + 1").unwrap_err();
        match err {
            EvalError::Runtime(msg) => assert!(msg.contains("undefined_var"), "{msg}"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn operation_limit_stops_runaway_loops() {
        let engine = RhaiEngine::new(EngineLimits {
            max_operations: 1_000,
            ..EngineLimits::default()
        });
        let mut s = engine.create_session().unwrap();
        let err = eval(&mut s, "let x = 0; loop { x += 1; }").unwrap_err();
        assert!(matches!(err, EvalError::Runtime(_)), "{err:?}");
    }

    #[test]
    fn interrupt_terminates_evaluation() {
        let mut s = session();
        let handle = s.interrupt_handle().unwrap();
        handle.interrupt();
        assert_eq!(eval(&mut s, "let x = 0; loop { x += 1; }").unwrap_err(), EvalError::Interrupted);

        handle.reset();
        assert_eq!(eval(&mut s, "1").unwrap(), Some("1".to_string()));
    }

    #[test]
    fn limits_are_read_from_config() {
        let mut cfg = Config::default();
        cfg.set("MAX_OPERATIONS", "500");
        let limits = EngineLimits::from_config(&cfg).unwrap();
        assert_eq!(limits.max_operations, 500);
        assert_eq!(limits.max_call_levels, 64);
    }

    #[test]
    fn malformed_limits_are_rejected() {
        let mut cfg = Config::default();
        cfg.set("MAX_CALL_LEVELS", "lots");
        let err = RhaiEngine::from_config(&cfg).err().unwrap();
        assert!(matches!(err, EngineError::InvalidSetting { ref key, .. } if key == "MAX_CALL_LEVELS"));
    }
}
