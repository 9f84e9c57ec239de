//! Trusted function evaluation (feature `trusted-eval`)
//!
//! Deserialized function sources are compiled and run inside a throwaway
//! QuickJS context. Arguments and results cross the boundary as JSON
//! produced by this crate's serializer, so only storable values can be passed.

use rquickjs::{Context, Ctx, Runtime};

use crate::{deserialize, CodecError, FunctionKind, FunctionSource, Value};

const MEMORY_LIMIT: usize = 8 * 1024 * 1024;

fn with_context<R>(f: impl FnOnce(Ctx<'_>) -> Result<R, CodecError>) -> Result<R, CodecError> {
    let runtime = Runtime::new().map_err(|e| CodecError::Eval(e.to_string()))?;
    runtime.set_memory_limit(MEMORY_LIMIT);
    let context = Context::full(&runtime).map_err(|e| CodecError::Eval(e.to_string()))?;
    context.with(f)
}

/// JavaScript expression evaluating to the function
fn expression(function: &FunctionSource) -> String {
    match function.kind() {
        FunctionKind::Method => format!(
            "(() => {{ const o = ({{ {} }}); return o[Object.keys(o)[0]]; }})()",
            function.source()
        ),
        FunctionKind::Declaration | FunctionKind::Arrow => format!("({})", function.source()),
    }
}

/// Whether the source evaluates to a callable
pub(crate) fn compiles(function: &FunctionSource) -> bool {
    let code = format!("typeof {} === 'function'", expression(function));
    with_context(|ctx| {
        ctx.eval::<bool, _>(code)
            .map_err(|e| CodecError::Eval(e.to_string()))
    })
    .unwrap_or(false)
}

impl FunctionSource {
    /// Call the function with storable arguments and deserialize its result
    pub fn call(&self, args: &[Value]) -> Result<Value, CodecError> {
        let args_json = crate::to_storage_string(&Value::Array(args.to_vec()))?;
        let args_literal = serde_json::to_string(&args_json)?;
        let code = format!(
            "(() => {{ const r = {}.apply(null, JSON.parse({})); \
             return r === undefined ? '{}' : JSON.stringify(r); }})()",
            expression(self),
            args_literal,
            crate::UNDEFINED,
        );
        let text = with_context(|ctx| {
            ctx.eval::<String, _>(code)
                .map_err(|e| CodecError::Eval(e.to_string()))
        })?;
        tracing::trace!("evaluated function returned {} byte(s)", text.len());
        Ok(deserialize(&text))
    }
}
