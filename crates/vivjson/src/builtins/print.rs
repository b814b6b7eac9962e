//! Implementation of the print() builtin.

use crate::{
    config::Config,
    error::{CodeLoc, Error},
    io::PrintWriter,
    value::Value,
};

/// print(*args): stringifies each argument, joins with `", "`, emits to the
/// host-supplied sink with a trailing newline. Returns Null.
pub(crate) fn builtin_print(
    args: &[Value],
    config: &Config,
    print: &mut dyn PrintWriter,
    loc: CodeLoc,
) -> Result<Value, Error> {
    let mut output = String::new();
    for (i, arg) in args.iter().enumerate() {
        if i > 0 {
            output.push_str(", ");
        }
        let text = arg.to_display(config).map_err(|err| match err.location() {
            Some(_) => err,
            None => Error::evaluate(err.message().to_owned(), loc),
        })?;
        output.push_str(&text);
    }
    print.stdout_write(&output);
    print.stdout_push('\n');
    Ok(Value::Null)
}
