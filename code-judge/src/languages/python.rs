use regex::Regex;

use crate::{
    languages::{
        entry::{self, Decoding, EntryPlan, ParamKind, Receiver, SolveSignature, Width},
        quoted_literal, CommandSpec, Harness, LanguageAdapter, SourceFile, ToolCheck,
    },
    runner::ResultChannel,
    types::{Language, INPUT_ENV_VAR},
};

const SOLUTION_FILE: &str = "solution.py";
const MAIN_FILE: &str = "main.py";

pub struct PythonAdapter {
    interpreter: String,
    def_re: Regex,
    class_re: Regex,
}

impl PythonAdapter {
    pub fn new(interpreter: &str) -> Self {
        Self {
            interpreter: interpreter.to_string(),
            def_re: Regex::new(r"^(\s*)(?:async\s+)?def\s+solve\s*\(([^)]*)\)")
                .expect("solve definition pattern is valid"),
            class_re: Regex::new(r"^(\s*)class\s+(\w+)").expect("class pattern is valid"),
        }
    }

    /// Find every `solve` the module exposes, as a free function or as a
    /// method of `Solution`.
    fn scan_signatures(&self, code: &str) -> Vec<SolveSignature> {
        let mut signatures = Vec::new();
        // (class name, indentation of the `class` line)
        let mut enclosing: Option<(String, usize)> = None;

        for line in code.lines() {
            if line.trim().is_empty() || line.trim_start().starts_with('#') {
                continue;
            }
            let indent = indentation(line);
            if matches!(&enclosing, Some((_, class_indent)) if indent <= *class_indent) {
                enclosing = None;
            }

            if let Some(caps) = self.class_re.captures(line) {
                enclosing = Some((caps[2].to_string(), caps[1].len()));
                continue;
            }

            let Some(caps) = self.def_re.captures(line) else {
                continue;
            };
            let receiver = match (&enclosing, caps[1].len()) {
                (None, 0) => Receiver::Function,
                (Some((name, _)), _) if name == "Solution" => Receiver::SolutionMethod,
                _ => continue,
            };

            let mut params = entry::split_params(&caps[2]);
            if receiver == Receiver::SolutionMethod && !params.is_empty() {
                params.remove(0);
            }
            if params.iter().any(|p| p.starts_with('*')) {
                continue;
            }
            let kinds = params.iter().map(|p| classify_param(p)).collect();
            signatures.push(SolveSignature::new(receiver, kinds));
        }
        signatures
    }

    fn entry_source(&self, plan: &EntryPlan) -> String {
        let decode = match plan.decoding {
            Decoding::LengthPrefixedArrayAndTarget => {
                "    _nums = [int(t) for t in _input.split()]\n\
                 \x20   _n = max(0, min(_nums[0], len(_nums) - 2))\n\
                 \x20   _args = (_nums[1:1 + _n], _nums[-1])\n"
            }
            Decoding::IntArray => {
                "    _nums = [int(t) for t in _input.split()]\n\
                 \x20   if _nums[0] == len(_nums) - 1:\n\
                 \x20       _nums = _nums[1:]\n\
                 \x20   _args = (_nums,)\n"
            }
            Decoding::RawText => "    _args = (_input,)\n",
            Decoding::NoInput => "    _args = ()\n",
        };
        let callee = match plan.signature.receiver {
            Receiver::Function => "solution.solve",
            Receiver::SolutionMethod => "solution.Solution().solve",
        };

        format!(
            r#"import json
import os
import sys

_input = os.environ.get("{env}", "")

sys.stdout.flush()
_real_stdout = os.dup(1)
_devnull = os.open(os.devnull, os.O_WRONLY)
os.dup2(_devnull, 1)
try:
    import solution
{decode}    _result = {callee}(*_args)
finally:
    sys.stdout.flush()
    os.dup2(_real_stdout, 1)
    os.close(_devnull)


def _render(value):
    if value is None:
        return "null"
    if isinstance(value, bool):
        return "true" if value else "false"
    if isinstance(value, str):
        return value
    if isinstance(value, (list, tuple, dict, set, frozenset)):
        return json.dumps(value, separators=(",", ":"), default=list)
    return str(value)


sys.stdout.write(_render(_result))
sys.stdout.flush()
"#,
            env = INPUT_ENV_VAR,
            decode = decode,
            callee = callee,
        )
    }
}

impl ToolCheck for PythonAdapter {
    fn required_tools(&self) -> Vec<&str> {
        vec![self.interpreter.as_str()]
    }
}

impl LanguageAdapter for PythonAdapter {
    fn language(&self) -> Language {
        Language::Python
    }

    fn build_harness(&self, user_code: &str, input: &str) -> Harness {
        let main = match entry::select_entry(&self.scan_signatures(user_code), input) {
            Some(plan) => self.entry_source(&plan),
            None => format!(
                "import sys\n\nsys.stdout.write({})\nsys.exit(1)\n",
                quoted_literal(entry::NO_ENTRY_MESSAGE)
            ),
        };

        Harness {
            sources: vec![
                SourceFile::new(SOLUTION_FILE, user_code),
                SourceFile::new(MAIN_FILE, main),
            ],
            file_extension: "py",
            build_steps: Vec::new(),
            run_step: CommandSpec::new(&self.interpreter, [MAIN_FILE]),
            result_channel: ResultChannel::Stdout,
        }
    }
}

fn indentation(line: &str) -> usize {
    line.len() - line.trim_start().len()
}

/// `name`, `name: int`, `name: List[int] = None`
fn classify_param(param: &str) -> ParamKind {
    let without_default = param.split('=').next().unwrap_or(param);
    let Some((_, annotation)) = without_default.split_once(':') else {
        return ParamKind::Any;
    };
    let annotation: String = annotation.chars().filter(|c| !c.is_whitespace()).collect();
    match annotation.as_str() {
        "int" => ParamKind::Int(Width::I64),
        "str" => ParamKind::Text,
        "list[int]" | "List[int]" | "Sequence[int]" | "tuple[int,...]" => {
            ParamKind::IntArray(Width::I64)
        }
        "" | "Any" | "typing.Any" => ParamKind::Any,
        _ => ParamKind::Unsupported,
    }
}
