use std::{
    io::Read as _,
    path::Path,
    process::ExitCode,
};

use indexmap::IndexMap;
use vivjson::{Config, Input, Object, run};

const USAGE: &str = "\
Usage: viv [options] [source or file ...]

Runs VivJson sources and files in order. A positional argument naming an
existing file is loaded from disk; anything else is treated as source text.
The file extension selects the parse mode: \".json\" is parsed as JSON only,
\".viv\" as a script, and anything else as a script with a JSON fallback.

Options:
  -i, --stdin        read stdin as an additional source
  -i=NAME            bind stdin content to the variable NAME (empty discards)
  -j, --json         parse subsequent arguments in JSON-only mode
  -v, --version      print version information
  +                  concatenate the neighboring source arguments

Example 1:
  viv '{\"foo\": 10, \"bar\": 30}' 'return(foo + bar)'

Example 2:
  viv data.json 'max=-1, for (pair in .) {if (max < pair[1]) {max = pair[1]}}, return(max)'
";

fn main() -> ExitCode {
    let args: Vec<String> = std::env::args().skip(1).collect();
    if args.is_empty() {
        print!("{USAGE}");
        return ExitCode::FAILURE;
    }

    let config = Config::default();
    let mut inputs: Vec<Input> = vec![];
    let mut json_mode = false;
    for arg in &args {
        match arg.as_str() {
            "-v" | "--version" => {
                println!("VivJson specification version {}", vivjson::SPEC_VERSION);
                println!("interpreter version {}", vivjson::INTERPRETER_VERSION);
                return ExitCode::SUCCESS;
            }
            "-j" | "--json" => json_mode = true,
            "-i" | "--stdin" => {
                let content = match read_stdin() {
                    Ok(content) => content,
                    Err(err) => {
                        println!("Error: cannot read stdin: {err}");
                        return ExitCode::FAILURE;
                    }
                };
                inputs.push(source_input(content, json_mode));
            }
            "+" => inputs.push(Input::Code("+".to_owned())),
            _ => {
                if let Some(name) = arg.strip_prefix("-i=").or_else(|| arg.strip_prefix("--stdin=")) {
                    let content = match read_stdin() {
                        Ok(content) => content,
                        Err(err) => {
                            println!("Error: cannot read stdin: {err}");
                            return ExitCode::FAILURE;
                        }
                    };
                    // An empty name discards the content.
                    if !name.is_empty() {
                        let mut variables = IndexMap::new();
                        variables.insert(name.to_owned(), Object::String(content));
                        inputs.push(Input::Variables(variables));
                    }
                } else if arg.starts_with('-') && arg.len() > 1 && !Path::new(arg).is_file() {
                    print!("{USAGE}");
                    return ExitCode::FAILURE;
                } else if Path::new(arg).is_file() {
                    if json_mode {
                        inputs.push(source_input(
                            match std::fs::read_to_string(arg) {
                                Ok(text) => text,
                                Err(err) => {
                                    println!("Error: cannot read file '{arg}': {err}");
                                    return ExitCode::FAILURE;
                                }
                            },
                            true,
                        ));
                    } else {
                        inputs.push(Input::file(arg));
                    }
                } else {
                    inputs.push(source_input(arg.clone(), json_mode));
                }
            }
        }
    }

    match run(&inputs, &config) {
        Ok(result) => {
            println!("{}", display(&result));
            ExitCode::SUCCESS
        }
        Err(err) => {
            if config.enable_stderr {
                eprintln!("{}", err.render(config.enable_tag_detail));
            } else {
                println!("{}", err.render(config.enable_tag_detail));
            }
            ExitCode::FAILURE
        }
    }
}

fn source_input(text: String, json_mode: bool) -> Input {
    if json_mode {
        Input::JsonCode(text)
    } else {
        Input::Code(text)
    }
}

fn read_stdin() -> std::io::Result<String> {
    let mut content = String::new();
    std::io::stdin().lock().read_to_string(&mut content)?;
    Ok(content)
}

/// Renders the final result: a String prints raw, everything else in JSON form.
fn display(result: &Object) -> String {
    match result {
        Object::String(text) => text.clone(),
        other => other.to_json_string(),
    }
}
