use regex::Regex;

use crate::{
    languages::{
        entry::{self, Decoding, EntryPlan, ParamKind, Receiver, SolveSignature, Width},
        brace_depth, quoted_literal, CommandSpec, Harness, LanguageAdapter, SourceFile, ToolCheck,
    },
    runner::ResultChannel,
    types::{Language, INPUT_ENV_VAR},
};

const SOURCE_FILE: &str = "main.cpp";
const BINARY: &str = "solution";

const TEMPLATE: &str = r#"#include <bits/stdc++.h>
#include <fcntl.h>
#include <unistd.h>
using namespace std;

__USER_CODE__

namespace judge_harness {

std::string quote(const std::string& s) {
    std::string out = "\"";
    for (char c : s) {
        switch (c) {
            case '"': out += "\\\""; break;
            case '\\': out += "\\\\"; break;
            case '\n': out += "\\n"; break;
            case '\r': out += "\\r"; break;
            case '\t': out += "\\t"; break;
            default: out += c;
        }
    }
    return out + "\"";
}

std::string json(const std::string& s) { return quote(s); }
std::string json(const char* s) { return s ? quote(s) : "null"; }
std::string json(char c) { return quote(std::string(1, c)); }
std::string json(bool b) { return b ? "true" : "false"; }

template <typename T, typename std::enable_if<std::is_arithmetic<T>::value, int>::type = 0>
std::string json(T value) {
    std::ostringstream out;
    out << value;
    return out.str();
}

template <typename A, typename B> std::string json(const std::pair<A, B>& p);
template <typename T> std::string json(const std::vector<T>& items);
template <typename T> std::string json(const std::deque<T>& items);
template <typename T> std::string json(const std::set<T>& items);
template <typename T> std::string json(const std::unordered_set<T>& items);
template <typename K, typename V> std::string json(const std::map<K, V>& items);
template <typename K, typename V> std::string json(const std::unordered_map<K, V>& items);

template <typename It>
std::string json_list(It first, It last) {
    std::string out = "[";
    for (It it = first; it != last; ++it) {
        if (it != first) out += ",";
        out += json(*it);
    }
    return out + "]";
}

template <typename Key>
std::string json_key(const Key& key) {
    std::string rendered = json(key);
    return rendered.size() > 0 && rendered[0] == '"' ? rendered : quote(rendered);
}

template <typename It>
std::string json_object(It first, It last) {
    std::string out = "{";
    for (It it = first; it != last; ++it) {
        if (it != first) out += ",";
        out += json_key(it->first) + ":" + json(it->second);
    }
    return out + "}";
}

template <typename A, typename B> std::string json(const std::pair<A, B>& p) {
    return "[" + json(p.first) + "," + json(p.second) + "]";
}
template <typename T> std::string json(const std::vector<T>& items) { return json_list(items.begin(), items.end()); }
template <typename T> std::string json(const std::deque<T>& items) { return json_list(items.begin(), items.end()); }
template <typename T> std::string json(const std::set<T>& items) { return json_list(items.begin(), items.end()); }
template <typename T> std::string json(const std::unordered_set<T>& items) { return json_list(items.begin(), items.end()); }
template <typename K, typename V> std::string json(const std::map<K, V>& items) { return json_object(items.begin(), items.end()); }
template <typename K, typename V> std::string json(const std::unordered_map<K, V>& items) { return json_object(items.begin(), items.end()); }

template <typename T> std::string render(const T& value) { return json(value); }
std::string render(const std::string& s) { return s; }
std::string render(const char* s) { return s ? s : "null"; }
std::string render(char c) { return std::string(1, c); }

std::vector<long long> tokens(const std::string& input) {
    std::istringstream in(input);
    std::vector<long long> out;
    long long value;
    while (in >> value) out.push_back(value);
    return out;
}

}  // namespace judge_harness

int main() {
    const char* raw = std::getenv("__INPUT_VAR__");
    std::string input = raw ? raw : "";

    std::cout.flush();
    std::fflush(stdout);
    int real_stdout = dup(1);
    int devnull = open("/dev/null", O_WRONLY);
    dup2(devnull, 1);

__DECODE__
    auto result = __CALL__;

    std::cout.flush();
    std::fflush(stdout);
    dup2(real_stdout, 1);
    close(devnull);

    std::cout << judge_harness::render(result) << std::flush;
    return 0;
}
"#;

pub struct CppAdapter {
    compiler: String,
    std_version: String,
    solve_re: Regex,
    main_re: Regex,
    solution_re: Regex,
}

impl CppAdapter {
    pub fn new(compiler: &str, std_version: &str) -> Self {
        let re = |pattern: &str| Regex::new(pattern).expect("c++ source pattern is valid");
        Self {
            compiler: compiler.to_string(),
            std_version: std_version.to_string(),
            solve_re: re(r"\bsolve\s*\(([^()]*)\)\s*(?:const\s*)?(?:noexcept\s*)?\{"),
            main_re: re(r"\bint\s+main\s*\("),
            solution_re: re(r"\b(?:class|struct)\s+Solution\b[^{;]*\{"),
        }
    }

    fn scan_signatures(&self, code: &str) -> Vec<SolveSignature> {
        let solution_body = self.solution_re.find(code).and_then(|m| {
            let open = m.end() - 1;
            closing_brace(code, open).map(|close| open..close)
        });

        self.solve_re
            .captures_iter(code)
            .filter_map(|caps| {
                let at = caps.get(0)?.start();
                let receiver = if solution_body.as_ref().is_some_and(|body| body.contains(&at)) {
                    Receiver::SolutionMethod
                } else if brace_depth(&code[..at]) == 0 {
                    Receiver::Function
                } else {
                    return None;
                };
                let params = entry::split_params(&caps[1])
                    .iter()
                    .filter(|p| p.as_str() != "void")
                    .map(|p| entry::classify_typed(entry::typed_param_type(p)))
                    .collect();
                Some(SolveSignature::new(receiver, params))
            })
            .collect()
    }

    fn entry_source(&self, code: &str, plan: &EntryPlan) -> String {
        let (decode, args) = decode_arguments(plan);
        let call = match plan.signature.receiver {
            Receiver::Function => format!("solve({})", args),
            Receiver::SolutionMethod => format!("Solution().solve({})", args),
        };

        TEMPLATE
            .replace("__INPUT_VAR__", INPUT_ENV_VAR)
            .replace("__DECODE__", &decode)
            .replace("__CALL__", &call)
            .replace("__USER_CODE__", code)
    }

    fn harness(&self, source: String) -> Harness {
        Harness {
            sources: vec![SourceFile::new(SOURCE_FILE, source)],
            file_extension: "cpp",
            build_steps: vec![CommandSpec::new(
                &self.compiler,
                [
                    format!("-std={}", self.std_version),
                    "-O2".to_string(),
                    "-o".to_string(),
                    BINARY.to_string(),
                    SOURCE_FILE.to_string(),
                ],
            )],
            run_step: CommandSpec::new(format!("./{}", BINARY), Vec::<String>::new()),
            result_channel: ResultChannel::Stdout,
        }
    }
}

impl ToolCheck for CppAdapter {
    fn required_tools(&self) -> Vec<&str> {
        vec![self.compiler.as_str()]
    }
}

impl LanguageAdapter for CppAdapter {
    fn language(&self) -> Language {
        Language::Cpp
    }

    fn build_harness(&self, user_code: &str, input: &str) -> Harness {
        if self.main_re.is_match(user_code) {
            return self.harness(user_code.to_string());
        }

        let source = match entry::select_entry(&self.scan_signatures(user_code), input) {
            Some(plan) => self.entry_source(user_code, &plan),
            None => format!(
                "#include <cstdio>\n\nint main() {{\n    std::fputs({}, stdout);\n    return 1;\n}}\n",
                quoted_literal(entry::NO_ENTRY_MESSAGE)
            ),
        };
        self.harness(source)
    }
}

/// Byte offset of the brace closing the one at `open`.
fn closing_brace(code: &str, open: usize) -> Option<usize> {
    let mut depth = 0;
    for (offset, c) in code[open..].char_indices() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + offset);
                }
            }
            _ => {}
        }
    }
    None
}

fn scalar_type(kind: ParamKind) -> &'static str {
    match kind {
        ParamKind::IntArray(Width::I64) | ParamKind::Int(Width::I64) => "long long",
        _ => "int",
    }
}

/// Statements binding `arg0..` from `input`, plus the argument list.
fn decode_arguments(plan: &EntryPlan) -> (String, String) {
    let lines: Vec<String> = match plan.decoding {
        Decoding::LengthPrefixedArrayAndTarget => {
            let elem = scalar_type(plan.param(0));
            let scalar = scalar_type(plan.param(1));
            vec![
                "std::vector<long long> t = judge_harness::tokens(input);".to_string(),
                "long long n = std::max(0LL, std::min(t[0], (long long)t.size() - 2));"
                    .to_string(),
                format!("std::vector<{elem}> arg0(t.begin() + 1, t.begin() + 1 + n);"),
                format!("{scalar} arg1 = ({scalar})t.back();"),
            ]
        }
        Decoding::IntArray => {
            let elem = scalar_type(plan.param(0));
            vec![
                "std::vector<long long> t = judge_harness::tokens(input);".to_string(),
                "std::size_t offset = t[0] == (long long)t.size() - 1 ? 1 : 0;".to_string(),
                format!("std::vector<{elem}> arg0(t.begin() + offset, t.end());"),
            ]
        }
        Decoding::RawText => vec!["std::string arg0 = input;".to_string()],
        Decoding::NoInput => Vec::new(),
    };
    let args = match plan.decoding {
        Decoding::LengthPrefixedArrayAndTarget => "arg0, arg1",
        Decoding::IntArray | Decoding::RawText => "arg0",
        Decoding::NoInput => "",
    };

    let decode = lines
        .iter()
        .map(|line| format!("    {line}"))
        .collect::<Vec<_>>()
        .join("\n");
    (decode, args.to_string())
}
