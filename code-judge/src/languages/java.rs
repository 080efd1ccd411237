use regex::Regex;

use crate::{
    languages::{
        entry::{self, Decoding, EntryPlan, ParamKind, Receiver, SolveSignature, Width},
        brace_depth, quoted_literal, CommandSpec, Harness, LanguageAdapter, SourceFile, ToolCheck,
    },
    runner::{ResultChannel, RESULT_FD},
    types::{Language, INPUT_ENV_VAR},
};

const HARNESS_CLASS: &str = "Main";

// Stdout is the null device while this runs; the rendered value goes to the
// inherited result descriptor.
const TEMPLATE: &str = r#"import java.io.FileOutputStream;
import java.io.OutputStream;
import java.lang.reflect.Array;
import java.nio.charset.StandardCharsets;
import java.util.*;
__USER_IMPORTS__

public class Main {
    public static void main(String[] args) throws Throwable {
        String input = System.getenv("__INPUT_VAR__");
        if (input == null) {
            input = "";
        }
__DECODE__
        Object result = __CALL__;
        try (OutputStream out = new FileOutputStream("/dev/fd/__RESULT_FD__")) {
            out.write(render(result).getBytes(StandardCharsets.UTF_8));
        }
        System.exit(0);
    }

    static long[] tokens(String input) {
        String trimmed = input.trim();
        if (trimmed.isEmpty()) {
            return new long[0];
        }
        String[] parts = trimmed.split("\\s+");
        long[] values = new long[parts.length];
        for (int i = 0; i < parts.length; i++) {
            values[i] = Long.parseLong(parts[i]);
        }
        return values;
    }

    static String render(Object value) {
        if (value instanceof String || value instanceof Character) {
            return value.toString();
        }
        return json(value);
    }

    static String json(Object value) {
        if (value == null) {
            return "null";
        }
        if (value instanceof String || value instanceof Character) {
            return quote(value.toString());
        }
        StringBuilder out = new StringBuilder();
        if (value.getClass().isArray()) {
            out.append('[');
            for (int i = 0; i < Array.getLength(value); i++) {
                if (i > 0) out.append(',');
                out.append(json(Array.get(value, i)));
            }
            return out.append(']').toString();
        }
        if (value instanceof Collection) {
            out.append('[');
            boolean first = true;
            for (Object item : (Collection<?>) value) {
                if (!first) out.append(',');
                out.append(json(item));
                first = false;
            }
            return out.append(']').toString();
        }
        if (value instanceof Map) {
            out.append('{');
            boolean first = true;
            for (Map.Entry<?, ?> e : ((Map<?, ?>) value).entrySet()) {
                if (!first) out.append(',');
                out.append(quote(String.valueOf(e.getKey()))).append(':').append(json(e.getValue()));
                first = false;
            }
            return out.append('}').toString();
        }
        return String.valueOf(value);
    }

    static String quote(String s) {
        StringBuilder out = new StringBuilder("\"");
        for (char c : s.toCharArray()) {
            switch (c) {
                case '"': out.append("\\\""); break;
                case '\\': out.append("\\\\"); break;
                case '\n': out.append("\\n"); break;
                case '\r': out.append("\\r"); break;
                case '\t': out.append("\\t"); break;
                default: out.append(c);
            }
        }
        return out.append('"').toString();
    }
}

__USER_CODE__
"#;

pub struct JavaAdapter {
    javac: String,
    java: String,
    solve_re: Regex,
    main_re: Regex,
    public_class_re: Regex,
    any_class_re: Regex,
    solution_class_re: Regex,
    import_re: Regex,
    package_re: Regex,
    public_type_re: Regex,
}

impl JavaAdapter {
    pub fn new(javac: &str, java: &str) -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("java source pattern is valid");
        Self {
            javac: javac.to_string(),
            java: java.to_string(),
            solve_re: re(r"\bsolve\s*\(([^()]*)\)\s*(?:throws\s+[\w.,\s]+?)?\s*\{"),
            main_re: re(r"\bstatic\s+void\s+main\s*\(\s*(?:final\s+)?String"),
            public_class_re: re(r"(?m)^\s*public\s+(?:final\s+|abstract\s+)*class\s+(\w+)"),
            any_class_re: re(r"\bclass\s+(\w+)"),
            solution_class_re: re(r"\bclass\s+Solution\b[^{;]*\{"),
            import_re: re(r"(?m)^\s*import\s+(?:static\s+)?[\w.]+(?:\.\*)?\s*;[ \t]*\r?\n?"),
            package_re: re(r"(?m)^\s*package\s+[\w.]+\s*;[ \t]*\r?\n?"),
            public_type_re: re(
                r"(?m)^(\s*)public\s+((?:final\s+|abstract\s+|sealed\s+)*(?:class|interface|enum|record)\b)",
            ),
        }
    }

    fn is_self_contained(&self, code: &str) -> bool {
        self.main_re.is_match(code)
    }

    /// `solve` methods declared directly in `Solution`, or at the top level
    /// when there is no `Solution` class to hold them.
    fn scan_signatures(&self, code: &str) -> Vec<SolveSignature> {
        let solution_open = self.solution_class_re.find(code).map(|m| m.end() - 1);

        self.solve_re
            .captures_iter(code)
            .filter_map(|caps| {
                let at = caps.get(0)?.start();
                let in_place = match solution_open {
                    Some(open) => at > open && brace_depth(&code[open..at]) == 1,
                    None => brace_depth(&code[..at]) == 0,
                };
                if !in_place {
                    return None;
                }
                let params = entry::split_params(&caps[1])
                    .iter()
                    .map(|p| entry::classify_typed(entry::typed_param_type(p)))
                    .collect();
                Some(SolveSignature::new(Receiver::SolutionMethod, params))
            })
            .collect()
    }

    /// Compile a program that brings its own `main` as-is, in a file named
    /// after its public class.
    fn standalone_harness(&self, code: &str) -> Harness {
        let class_name = self
            .public_class_re
            .captures(code)
            .or_else(|| self.any_class_re.captures(code))
            .map(|caps| caps[1].to_string())
            .unwrap_or_else(|| HARNESS_CLASS.to_string());
        let source = self.package_re.replace_all(code, "").into_owned();
        self.harness(&class_name, source, ResultChannel::Stdout)
    }

    fn entry_source(&self, code: &str, plan: &EntryPlan) -> String {
        let imports: String = self
            .import_re
            .find_iter(code)
            .map(|m| format!("{}\n", m.as_str().trim()))
            .collect();
        let body = self.import_re.replace_all(code, "");
        let body = self.package_re.replace_all(&body, "");
        let body = self.public_type_re.replace_all(&body, "$1$2").into_owned();
        let body = if self.solution_class_re.is_match(&body) {
            body
        } else {
            format!("class Solution {{\n{}\n}}", body)
        };

        let (decode, args) = decode_arguments(plan);
        let call = format!("new Solution().solve({})", args);

        TEMPLATE
            .replace("__INPUT_VAR__", INPUT_ENV_VAR)
            .replace("__RESULT_FD__", &RESULT_FD.to_string())
            .replace("__DECODE__", &decode)
            .replace("__CALL__", &call)
            .replace("__USER_IMPORTS__", imports.trim_end())
            .replace("__USER_CODE__", &body)
    }

    fn harness(
        &self,
        class_name: &str,
        source: String,
        result_channel: ResultChannel,
    ) -> Harness {
        let file_name = format!("{}.java", class_name);
        Harness {
            sources: vec![SourceFile::new(&file_name, source)],
            file_extension: "java",
            build_steps: vec![CommandSpec::new(
                &self.javac,
                ["-encoding", "UTF-8", "-d", ".", file_name.as_str()],
            )],
            run_step: CommandSpec::new(&self.java, ["-cp", ".", class_name]),
            result_channel,
        }
    }
}

impl ToolCheck for JavaAdapter {
    fn required_tools(&self) -> Vec<&str> {
        vec![self.javac.as_str(), self.java.as_str()]
    }
}

impl LanguageAdapter for JavaAdapter {
    fn language(&self) -> Language {
        Language::Java
    }

    fn build_harness(&self, user_code: &str, input: &str) -> Harness {
        if self.is_self_contained(user_code) {
            return self.standalone_harness(user_code);
        }

        let (source, result_channel) =
            match entry::select_entry(&self.scan_signatures(user_code), input) {
                Some(plan) => (self.entry_source(user_code, &plan), ResultChannel::ResultFd),
                None => (
                    format!(
                        "public class Main {{\n    public static void main(String[] args) {{\n        \
                         System.out.print({});\n        System.exit(1);\n    }}\n}}\n",
                        quoted_literal(entry::NO_ENTRY_MESSAGE)
                    ),
                    ResultChannel::Stdout,
                ),
            };
        self.harness(HARNESS_CLASS, source, result_channel)
    }
}

fn element_type(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::IntArray(Width::I64) | ParamKind::Int(Width::I64) => "long",
        _ => "int",
    }
}

/// Statements binding `arg0..` from `input`, plus the argument list.
fn decode_arguments(plan: &EntryPlan) -> (String, String) {
    const INDENT: &str = "        ";
    let lines: Vec<String> = match plan.decoding {
        Decoding::LengthPrefixedArrayAndTarget => {
            let elem = element_type(plan.param(0));
            let scalar = element_type(plan.param(1));
            vec![
                "long[] t = tokens(input);".to_string(),
                "int n = (int) Math.max(0, Math.min(t[0], t.length - 2));".to_string(),
                format!("{elem}[] arg0 = new {elem}[n];"),
                format!("for (int i = 0; i < n; i++) arg0[i] = ({elem}) t[1 + i];"),
                format!("{scalar} arg1 = ({scalar}) t[t.length - 1];"),
            ]
        }
        Decoding::IntArray => {
            let elem = element_type(plan.param(0));
            vec![
                "long[] t = tokens(input);".to_string(),
                "int offset = t[0] == t.length - 1 ? 1 : 0;".to_string(),
                format!("{elem}[] arg0 = new {elem}[t.length - offset];"),
                format!("for (int i = 0; i < arg0.length; i++) arg0[i] = ({elem}) t[offset + i];"),
            ]
        }
        Decoding::RawText => vec!["String arg0 = input;".to_string()],
        Decoding::NoInput => Vec::new(),
    };
    let args = match plan.decoding {
        Decoding::LengthPrefixedArrayAndTarget => "arg0, arg1",
        Decoding::IntArray | Decoding::RawText => "arg0",
        Decoding::NoInput => "",
    };

    let decode = lines
        .iter()
        .map(|line| format!("{INDENT}{line}"))
        .collect::<Vec<_>>()
        .join("\n");
    (decode, args.to_string())
}
