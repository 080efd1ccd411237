use regex::Regex;

use crate::{
    languages::{
        entry::{self, Decoding, EntryPlan, ParamKind, Receiver, SolveSignature},
        quoted_literal, CommandSpec, Harness, LanguageAdapter, SourceFile, ToolCheck,
    },
    runner::{ResultChannel, RESULT_FD},
    types::{Language, INPUT_ENV_VAR},
};

const MAIN_FILE: &str = "main.js";

// Node has no dup2. The runner points fd 1 at the null device instead and
// the rendered value goes to the result descriptor.
const TEMPLATE: &str = r#"const __fs = require("fs");
const __input = process.env.__INPUT_VAR__ || "";

function __render(value) {
  if (value === undefined || value === null) return "null";
  if (typeof value === "string") return value;
  if (typeof value === "boolean") return value ? "true" : "false";
  if (typeof value === "object") {
    return JSON.stringify(value, (key, v) => {
      if (v === undefined) return null;
      if (v instanceof Set) return Array.from(v);
      if (v instanceof Map) return Object.fromEntries(v);
      return v;
    });
  }
  return String(value);
}

function __emit(value) {
  __fs.writeSync(__RESULT_FD__, __render(value));
  process.exit(0);
}

const __entry = (function () {
__USER_CODE__
;
__RESOLVE__
})();

const __args = (function () {
__DECODE__
})();

const __result = __entry(...__args);
if (__result && typeof __result.then === "function") {
  __result.then(__emit);
} else {
  __emit(__result);
}
"#;

pub struct JavaScriptAdapter {
    node: String,
    patterns: Vec<(Regex, Receiver)>,
    arrow_single_re: Regex,
    solution_class_re: Regex,
}

impl JavaScriptAdapter {
    pub fn new(node: &str) -> Self {
        let patterns = [
            (r"\bfunction\s+solve\s*\(([^)]*)\)", Receiver::Function),
            (
                r"\b(?:const|let|var)\s+solve\s*=\s*(?:async\s*)?(?:function\s*\w*\s*)?\(([^)]*)\)",
                Receiver::Function,
            ),
            (
                r"(?m)^\s*(?:async\s+)?solve\s*\(([^)]*)\)\s*\{",
                Receiver::SolutionMethod,
            ),
        ]
        .into_iter()
        .map(|(pattern, receiver)| {
            (
                Regex::new(pattern).expect("solve pattern is valid"),
                receiver,
            )
        })
        .collect();

        Self {
            node: node.to_string(),
            patterns,
            arrow_single_re: Regex::new(
                r"\b(?:const|let|var)\s+solve\s*=\s*(?:async\s+)?[A-Za-z_$][\w$]*\s*=>",
            )
            .expect("arrow pattern is valid"),
            solution_class_re: Regex::new(r"\bclass\s+Solution\b")
                .expect("class pattern is valid"),
        }
    }

    fn scan_signatures(&self, code: &str) -> Vec<SolveSignature> {
        let has_solution_class = self.solution_class_re.is_match(code);
        let mut signatures = Vec::new();

        for (re, receiver) in &self.patterns {
            if *receiver == Receiver::SolutionMethod && !has_solution_class {
                continue;
            }
            for caps in re.captures_iter(code) {
                let params = entry::split_params(&caps[1]);
                if params.iter().any(|p| p.starts_with("...")) {
                    continue;
                }
                signatures.push(SolveSignature::new(
                    *receiver,
                    vec![ParamKind::Any; params.len()],
                ));
            }
        }
        if self.arrow_single_re.is_match(code) {
            signatures.push(SolveSignature::new(
                Receiver::Function,
                vec![ParamKind::Any],
            ));
        }
        signatures
    }

    fn entry_source(&self, user_code: &str, plan: &EntryPlan) -> String {
        let resolve = match plan.signature.receiver {
            Receiver::Function => "return solve;",
            Receiver::SolutionMethod => {
                "const __instance = new Solution();\nreturn (...args) => __instance.solve(...args);"
            }
        };
        let decode = match plan.decoding {
            Decoding::LengthPrefixedArrayAndTarget => {
                "  const nums = __input.split(/\\s+/).filter(Boolean).map(Number);\n  \
                 const n = Math.max(0, Math.min(nums[0], nums.length - 2));\n  \
                 return [nums.slice(1, 1 + n), nums[nums.length - 1]];"
            }
            Decoding::IntArray => {
                "  let nums = __input.split(/\\s+/).filter(Boolean).map(Number);\n  \
                 if (nums[0] === nums.length - 1) nums = nums.slice(1);\n  \
                 return [nums];"
            }
            Decoding::RawText => "  return [__input];",
            Decoding::NoInput => "  return [];",
        };

        TEMPLATE
            .replace("__INPUT_VAR__", INPUT_ENV_VAR)
            .replace("__RESULT_FD__", &RESULT_FD.to_string())
            .replace("__RESOLVE__", resolve)
            .replace("__DECODE__", decode)
            // Last, so user text is never rescanned for placeholders
            .replace("__USER_CODE__", user_code)
    }
}

impl ToolCheck for JavaScriptAdapter {
    fn required_tools(&self) -> Vec<&str> {
        vec![self.node.as_str()]
    }
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language(&self) -> Language {
        Language::JavaScript
    }

    fn build_harness(&self, user_code: &str, input: &str) -> Harness {
        let (main, result_channel) =
            match entry::select_entry(&self.scan_signatures(user_code), input) {
                Some(plan) => (self.entry_source(user_code, &plan), ResultChannel::ResultFd),
                None => (
                    format!(
                        "require(\"fs\").writeSync(1, {});\nprocess.exit(1);\n",
                        quoted_literal(entry::NO_ENTRY_MESSAGE)
                    ),
                    ResultChannel::Stdout,
                ),
            };

        Harness {
            sources: vec![SourceFile::new(MAIN_FILE, main)],
            file_extension: "js",
            build_steps: Vec::new(),
            run_step: CommandSpec::new(&self.node, [MAIN_FILE]),
            result_channel,
        }
    }
}
