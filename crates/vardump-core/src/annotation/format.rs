// # Positional Format Templates
//
// Value and label formats use positional templates:
//
// - `{0}` inserts the first argument
// - `{0,12}` right-aligns it in a field of 12 characters
// - `{0,-12}` left-aligns it
// - `{{` and `}}` are literal braces
//
// A `:spec` suffix inside a placeholder is accepted and ignored, so templates
// written as `{0:G}` still render the argument.

use crate::error::{Error, Result};

/// Widest accepted alignment field
pub const MAX_ALIGNMENT: usize = 1024;

/// Render `template` with positional `args`
///
/// # Returns
///
/// - `Ok(String)`: The rendered text
/// - `Err(Error::Format)`: Unbalanced braces, a non-numeric index, an index
///   with no matching argument, or a malformed or oversized alignment
pub fn apply(template: &str, args: &[&str]) -> Result<String> {
    let mut out = String::with_capacity(template.len() + 16);
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    out.push('{');
                    continue;
                }

                let mut spec = String::new();
                let mut closed = false;
                for c in chars.by_ref() {
                    if c == '}' {
                        closed = true;
                        break;
                    }
                    spec.push(c);
                }

                if !closed {
                    return Err(Error::format(format!(
                        "unclosed placeholder in '{}'",
                        template
                    )));
                }

                render_placeholder(&spec, args, &mut out)?;
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    out.push('}');
                } else {
                    return Err(Error::format(format!("unmatched '}}' in '{}'", template)));
                }
            }
            other => out.push(other),
        }
    }

    Ok(out)
}

fn render_placeholder(spec: &str, args: &[&str], out: &mut String) -> Result<()> {
    let head = spec.split_once(':').map_or(spec, |(head, _)| head);
    let (index, alignment) = match head.split_once(',') {
        Some((index, alignment)) => (index, Some(alignment)),
        None => (head, None),
    };

    let index: usize = index
        .trim()
        .parse()
        .map_err(|_| Error::format(format!("invalid placeholder index '{}'", index.trim())))?;

    let arg = args
        .get(index)
        .ok_or_else(|| Error::format(format!("no argument for placeholder {{{}}}", index)))?;

    let Some(alignment) = alignment else {
        out.push_str(arg);
        return Ok(());
    };

    let width: i64 = alignment
        .trim()
        .parse()
        .map_err(|_| Error::format(format!("invalid alignment '{}'", alignment.trim())))?;

    let target = usize::try_from(width.unsigned_abs())
        .ok()
        .filter(|target| *target <= MAX_ALIGNMENT)
        .ok_or_else(|| {
            Error::format(format!(
                "alignment {} exceeds {} characters",
                width, MAX_ALIGNMENT
            ))
        })?;

    let len = arg.chars().count();
    let padding = target.saturating_sub(len);

    if width < 0 {
        out.push_str(arg);
        out.extend(std::iter::repeat_n(' ', padding));
    } else {
        out.extend(std::iter::repeat_n(' ', padding));
        out.push_str(arg);
    }

    Ok(())
}
