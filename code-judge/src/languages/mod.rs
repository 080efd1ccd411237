//! Language-specific harness builders

mod cpp;
pub mod entry;
mod java;
mod javascript;
mod python;

pub use cpp::CppAdapter;
pub use java::JavaAdapter;
pub use javascript::JavaScriptAdapter;
pub use python::PythonAdapter;

use std::collections::HashMap;
use std::sync::Arc;
use which::which;

use crate::{config::Toolchains, error::Error, runner::ResultChannel, types::Language};

/// One file written into the workspace before any step runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFile {
    pub name: String,
    pub contents: String,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, contents: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            contents: contents.into(),
        }
    }
}

/// A program invocation. Commands starting with `./` live in the workspace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandSpec {
    pub command: String,
    pub args: Vec<String>,
}

impl CommandSpec {
    pub fn new<I, S>(command: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            command: command.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

/// Everything needed to compile and run one submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Harness {
    pub sources: Vec<SourceFile>,
    pub file_extension: &'static str,
    /// Compile steps, run in order before `run_step`. Empty for interpreters.
    pub build_steps: Vec<CommandSpec>,
    pub run_step: CommandSpec,
    /// Where the run step writes the value returned by `solve`.
    pub result_channel: ResultChannel,
}

impl Harness {
    pub fn source(&self, name: &str) -> Option<&str> {
        self.sources
            .iter()
            .find(|file| file.name == name)
            .map(|file| file.contents.as_str())
    }
}

pub trait ToolCheck {
    fn required_tools(&self) -> Vec<&str>;

    fn check_tools(&self) -> Result<(), Error> {
        let missing: Vec<_> = self
            .required_tools()
            .iter()
            .filter(|tool| !check_command(tool))
            .map(|s| (*s).to_string())
            .collect();

        if !missing.is_empty() {
            return Err(Error::CommandNotFound(missing.join(", ")));
        }
        Ok(())
    }
}

/// Turns raw user code into a harness with the uniform entry contract.
pub trait LanguageAdapter: ToolCheck + Send + Sync {
    fn language(&self) -> Language;

    /// Build the harness for `user_code`. `input` is the normalized input;
    /// it only steers which entry candidate is compiled in.
    fn build_harness(&self, user_code: &str, input: &str) -> Harness;
}

/// Adapter lookup table keyed by language.
#[derive(Clone)]
pub struct AdapterRegistry {
    adapters: HashMap<Language, Arc<dyn LanguageAdapter>>,
}

impl AdapterRegistry {
    pub fn new(toolchains: &Toolchains) -> Self {
        let adapters: [Arc<dyn LanguageAdapter>; 4] = [
            Arc::new(JavaScriptAdapter::new(&toolchains.node)),
            Arc::new(PythonAdapter::new(&toolchains.python)),
            Arc::new(JavaAdapter::new(&toolchains.javac, &toolchains.java)),
            Arc::new(CppAdapter::new(&toolchains.cxx, &toolchains.cpp_std)),
        ];
        Self {
            adapters: adapters
                .into_iter()
                .map(|adapter| (adapter.language(), adapter))
                .collect(),
        }
    }

    pub fn get(&self, language: Language) -> Option<Arc<dyn LanguageAdapter>> {
        self.adapters.get(&language).cloned()
    }

    /// Every supported language and whether its toolchain is installed.
    pub fn availability(&self) -> Vec<(Language, bool)> {
        Language::ALL
            .iter()
            .map(|language| {
                let available = self
                    .adapters
                    .get(language)
                    .is_some_and(|adapter| adapter.check_tools().is_ok());
                (*language, available)
            })
            .collect()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::new(&Toolchains::default())
    }
}

/// Escape `text` as a double-quoted literal valid in Python, JavaScript,
/// Java and C++ source.
pub(crate) fn quoted_literal(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('"');
    for c in text.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_ascii_control() => out.push(' '),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// Net count of unclosed `{` in `code`.
pub(crate) fn brace_depth(code: &str) -> i32 {
    code.chars().fold(0, |depth, c| match c {
        '{' => depth + 1,
        '}' => depth - 1,
        _ => depth,
    })
}

pub(crate) fn check_command(cmd: &str) -> bool {
    which(cmd).is_ok()
}

#[cfg(test)]
pub(crate) fn skip_if_not_available(tools: &[&str]) -> bool {
    let missing: Vec<_> = tools
        .iter()
        .filter(|tool| which(**tool).is_err())
        .map(|s| (*s).to_string())
        .collect();

    if !missing.is_empty() {
        eprintln!("Skipping test: {} not available", missing.join(", "));
        return true;
    }
    false
}
